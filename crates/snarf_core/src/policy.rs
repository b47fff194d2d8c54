use chrono::NaiveDate;

use crate::ArticleSummary;

/// Sentinel for pages whose publish date could not be determined.
///
/// Deliberately a fixed legacy date rather than the run time, so "unknown"
/// and "too old to trust" land in the same bucket below the cutoff.
pub fn fallback_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2018, 1, 1).expect("valid calendar date")
}

/// Dates at or before this are excluded from front matter; the target site
/// only sorts and displays confidently-known recent dates.
pub fn date_cutoff() -> NaiveDate {
    NaiveDate::from_ymd_opt(2018, 12, 31).expect("valid calendar date")
}

/// The `date:` front-matter value, or `None` when the date is gated out.
pub fn front_matter_date(date: NaiveDate) -> Option<String> {
    (date > date_cutoff()).then(|| date.format("%Y-%m-%d").to_string())
}

/// Human-readable date label for index entries, e.g. `July 5, 2023`.
pub fn index_date_label(date: NaiveDate) -> String {
    date.format("%B %-d, %Y").to_string()
}

/// Orders index entries newest first; ties break on slug so runs against an
/// unchanged source produce identical output.
pub fn sort_newest_first(summaries: &mut [ArticleSummary]) {
    summaries.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| a.slug.cmp(&b.slug)));
}
