//! Migration entry point.
//!
//! No flag surface: the run reads `sitemap.xml` from the working directory,
//! mirrors pages under `build/snarfed` and writes the content tree under
//! `build/translated`. The source host can be overridden with the
//! `SNARF_SITE` environment variable.

use anyhow::Context;
use snarf_engine::{Migration, MigrationOptions};
use snarf_logging::LogDestination;
use url::Url;

const DEFAULT_SITE: &str = "https://blog.example.com/";

fn main() -> anyhow::Result<()> {
    snarf_logging::initialize(LogDestination::Both("snarf.log"));

    let site = std::env::var("SNARF_SITE").unwrap_or_else(|_| DEFAULT_SITE.to_string());
    let site = Url::parse(&site).with_context(|| format!("invalid source site url: {site}"))?;

    let options = MigrationOptions::new(site);
    let summary = Migration::new(options).run().context("migration failed")?;

    log::info!(
        "run complete: {}/{} pages translated ({} fetch failures, {} skipped)",
        summary.articles_written,
        summary.pages_discovered,
        summary.fetch_failures,
        summary.pages_skipped
    );
    Ok(())
}
