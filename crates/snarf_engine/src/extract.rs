use chrono::{DateTime, NaiveDate};
use scraper::{ElementRef, Html, Selector};

use snarf_core::fallback_date;

/// The single element holding the article's body prose and media.
pub const CONTENT_SELECTOR: &str = "div.entry__content";

/// Paragraphs in the page's main content region, scanned for the byline.
const BYLINE_SELECTOR: &str = "div#site-content p";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageMeta {
    pub title: String,
    pub author: String,
    pub date: NaiveDate,
}

/// Extracts title, author and publish date from a parsed page.
///
/// Every field defaults independently (empty string / sentinel date); a
/// missing field is a content gap for the publisher, not a pipeline fault,
/// so this never errors.
pub fn page_meta(doc: &Html) -> PageMeta {
    PageMeta {
        title: extract_title(doc),
        author: extract_author(doc),
        date: extract_date(doc),
    }
}

/// The article's content container, or `None` when the page does not follow
/// the article template.
pub fn find_content(doc: &Html) -> Option<ElementRef<'_>> {
    let sel = Selector::parse(CONTENT_SELECTOR).ok()?;
    doc.select(&sel).next()
}

fn extract_title(doc: &Html) -> String {
    Selector::parse("h1")
        .ok()
        .as_ref()
        .and_then(|sel| doc.select(sel).next())
        .map(|h| collapse_whitespace(&h.text().collect::<String>()))
        .unwrap_or_default()
}

fn extract_author(doc: &Html) -> String {
    let Ok(sel) = Selector::parse(BYLINE_SELECTOR) else {
        return String::new();
    };
    for paragraph in doc.select(&sel) {
        let text = collapse_whitespace(&paragraph.text().collect::<String>());
        if !text.to_lowercase().contains("author") {
            continue;
        }
        if let Some((_, rest)) = text.split_once(": ") {
            return rest.trim().to_string();
        }
    }
    String::new()
}

fn extract_date(doc: &Html) -> NaiveDate {
    Selector::parse("time[datetime]")
        .ok()
        .as_ref()
        .and_then(|sel| doc.select(sel).next())
        .and_then(|t| t.value().attr("datetime"))
        .and_then(parse_date)
        .unwrap_or_else(fallback_date)
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    if let Ok(stamp) = DateTime::parse_from_rfc3339(raw) {
        return Some(stamp.date_naive());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}

pub(crate) fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
