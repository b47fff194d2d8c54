use snarf_core::{index_date_label, sort_newest_first, ArticleSummary};

/// Renders the aggregated index document: one entry per translated article,
/// newest first. Sorts the summaries in place so the manifest shares the
/// same order.
pub fn build_index(summaries: &mut [ArticleSummary]) -> String {
    sort_newest_first(summaries);
    let mut doc = String::from("# Articles\n\n");
    for summary in summaries.iter() {
        let title = if summary.title.is_empty() {
            &summary.slug
        } else {
            &summary.title
        };
        let link = if summary.rel_dir.is_empty() {
            "./".to_string()
        } else {
            format!("./{}/", summary.rel_dir)
        };
        doc.push_str(&format!(
            "- {}: [{}]({})\n",
            index_date_label(summary.date),
            title,
            link
        ));
    }
    doc
}
