use chrono::NaiveDate;

/// One source page on its way through the pipeline.
///
/// Constructed when translation of a page starts, populated incrementally
/// (metadata, featured image, figure list), written out once, then dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Article {
    /// Output path identifier, derived from the output file location.
    pub slug: String,
    /// First `h1` text; empty when the source markup has none.
    pub title: String,
    /// Byline remainder after the `"Author: "` marker; empty when absent.
    pub author: String,
    /// Publish date, or the fallback sentinel when unknown.
    pub date: NaiveDate,
    /// Local reference to the hero image (`./name.ext`), or empty.
    pub featured_image: String,
    /// Image sources in body order; positions assign 1-based figure indices.
    pub figures: Vec<String>,
}

impl Article {
    pub fn new(slug: impl Into<String>) -> Self {
        Self {
            slug: slug.into(),
            title: String::new(),
            author: String::new(),
            date: crate::fallback_date(),
            featured_image: String::new(),
            figures: Vec::new(),
        }
    }
}

/// The per-article record kept after translation, for the index document
/// and the run manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleSummary {
    pub slug: String,
    pub title: String,
    pub date: NaiveDate,
    /// Directory of the output document, relative to the output root.
    pub rel_dir: String,
}
