use std::sync::Once;

use chrono::NaiveDate;
use snarf_core::{
    fallback_date, front_matter_date, index_date_label, sort_newest_first, ArticleSummary,
};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(snarf_logging::initialize_for_tests);
}

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn summary(slug: &str, date: NaiveDate) -> ArticleSummary {
    ArticleSummary {
        slug: slug.to_string(),
        title: slug.to_uppercase(),
        date,
        rel_dir: format!("blog/{slug}"),
    }
}

#[test]
fn dates_at_or_before_cutoff_are_gated_out() {
    init_logging();
    assert_eq!(front_matter_date(day(2018, 12, 31)), None);
    assert_eq!(front_matter_date(fallback_date()), None);
    assert_eq!(
        front_matter_date(day(2019, 1, 1)),
        Some("2019-01-01".to_string())
    );
}

#[test]
fn date_label_is_human_readable() {
    init_logging();
    assert_eq!(index_date_label(day(2023, 7, 5)), "July 5, 2023");
}

#[test]
fn index_order_is_newest_first() {
    init_logging();
    let mut entries = vec![
        summary("a", day(2020, 1, 1)),
        summary("b", day(2022, 6, 15)),
        summary("c", day(2019, 12, 31)),
    ];
    sort_newest_first(&mut entries);
    let slugs: Vec<&str> = entries.iter().map(|s| s.slug.as_str()).collect();
    assert_eq!(slugs, ["b", "a", "c"]);
}

#[test]
fn equal_dates_order_by_slug_for_determinism() {
    init_logging();
    let mut entries = vec![
        summary("zebra", day(2021, 3, 3)),
        summary("apple", day(2021, 3, 3)),
    ];
    sort_newest_first(&mut entries);
    assert_eq!(entries[0].slug, "apple");
}
