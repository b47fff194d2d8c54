use std::path::{Path, PathBuf};

use log::{info, warn};
use scraper::Html;
use url::Url;

use snarf_core::{output_rel_dir, slug_for, Article, ArticleSummary};

use crate::assets::resolve_images;
use crate::cache::PageStore;
use crate::convert::ArticleConverter;
use crate::decode::decode_page;
use crate::extract::{find_content, page_meta, PageMeta};
use crate::fetch::{FetchSettings, Fetcher, ReqwestFetcher};
use crate::frontmatter::assemble_document;
use crate::index::build_index;
use crate::persist::{ensure_output_dir, AtomicFileWriter};
use crate::sitemap::read_urlset;
use crate::types::{ManifestEntry, MigrateError, RunSummary, TranslateError};

/// Index document written at the output root.
pub const INDEX_FILE: &str = "index.md";
/// Run manifest written next to the index.
pub const MANIFEST_FILE: &str = "manifest.json";
/// Per-article output document name.
pub const DOCUMENT_FILE: &str = "index.mdx";

#[derive(Debug, Clone)]
pub struct MigrationOptions {
    /// Root URL of the source site; site-relative image sources resolve
    /// against it.
    pub site: Url,
    /// Local sitemap seeding the crawl list, once per run.
    pub sitemap: PathBuf,
    /// Mirror root for raw page HTML.
    pub snarf_dir: PathBuf,
    /// Root of the generated content tree.
    pub out_dir: PathBuf,
    pub page_fetch: FetchSettings,
    pub image_fetch: FetchSettings,
}

impl MigrationOptions {
    pub fn new(site: Url) -> Self {
        Self {
            site,
            sitemap: PathBuf::from("sitemap.xml"),
            snarf_dir: PathBuf::from("build/snarfed"),
            out_dir: PathBuf::from("build/translated"),
            page_fetch: FetchSettings::pages(),
            image_fetch: FetchSettings::default(),
        }
    }
}

/// The sequential snarf -> translate -> index driver.
///
/// Owns its tokio runtime so callers stay synchronous. One page is fetched,
/// parsed, resolved, transformed and written before the next begins; every
/// per-item failure is logged and skipped, never fatal for the run.
pub struct Migration {
    options: MigrationOptions,
}

impl Migration {
    pub fn new(options: MigrationOptions) -> Self {
        Self { options }
    }

    pub fn run(&self) -> Result<RunSummary, MigrateError> {
        let runtime = tokio::runtime::Runtime::new()?;
        runtime.block_on(self.run_inner())
    }

    async fn run_inner(&self) -> Result<RunSummary, MigrateError> {
        let mut summary = RunSummary::default();

        let urls = read_urlset(&self.options.sitemap)?;
        summary.pages_discovered = urls.len();
        info!("{} pages in sitemap", urls.len());

        let pages = PageStore::new(self.options.snarf_dir.clone());
        let page_fetcher = ReqwestFetcher::new(self.options.page_fetch.clone());
        let image_fetcher = ReqwestFetcher::new(self.options.image_fetch.clone());

        let mut cached: Vec<(Url, PathBuf)> = Vec::new();
        for raw in &urls {
            let url = match Url::parse(raw) {
                Ok(url) => url,
                Err(err) => {
                    warn!("skipping unparseable sitemap entry {raw}: {err}");
                    summary.fetch_failures += 1;
                    continue;
                }
            };
            match pages.ensure_page(&page_fetcher, &url).await {
                Ok(path) => {
                    summary.pages_fetched += 1;
                    cached.push((url, path));
                }
                Err(err) => {
                    warn!("page fetch failed for {url}: {err}");
                    summary.fetch_failures += 1;
                }
            }
        }

        let mut articles: Vec<ArticleSummary> = Vec::new();
        for (url, path) in &cached {
            match self.translate_page(url, path, &image_fetcher).await {
                Ok(article) => {
                    summary.articles_written += 1;
                    articles.push(article);
                }
                Err(err) => {
                    warn!("skipping {url}: {err}");
                    summary.pages_skipped += 1;
                }
            }
        }

        let index = build_index(&mut articles);
        let writer = AtomicFileWriter::new(self.options.out_dir.clone());
        writer.write(INDEX_FILE, &index)?;

        summary.articles = articles
            .iter()
            .map(|a| ManifestEntry {
                slug: a.slug.clone(),
                title: a.title.clone(),
                date: a.date.format("%Y-%m-%d").to_string(),
                path: if a.rel_dir.is_empty() {
                    DOCUMENT_FILE.to_string()
                } else {
                    format!("{}/{DOCUMENT_FILE}", a.rel_dir)
                },
            })
            .collect();
        writer.write(MANIFEST_FILE, &serde_json::to_string_pretty(&summary)?)?;

        info!(
            "done: {} articles written, {} skipped, {} fetch failures",
            summary.articles_written, summary.pages_skipped, summary.fetch_failures
        );
        Ok(summary)
    }

    async fn translate_page(
        &self,
        url: &Url,
        cache_path: &Path,
        image_fetcher: &dyn Fetcher,
    ) -> Result<ArticleSummary, TranslateError> {
        let bytes = std::fs::read(cache_path)?;
        let decoded = decode_page(&bytes)?;
        let doc = Html::parse_document(&decoded.html);

        let Some(content) = find_content(&doc) else {
            return Err(TranslateError::MissingContent);
        };

        let rel_dir = output_rel_dir(url);
        let article_dir = self.options.out_dir.join(&rel_dir);
        ensure_output_dir(&article_dir)?;

        let mut article = Article::new(slug_for(url));
        let PageMeta { title, author, date } = page_meta(&doc);
        article.title = title;
        article.author = author;
        article.date = date;

        // Images must be resolved before conversion: the transformer's
        // figure and image rules consult the map built here.
        let map = resolve_images(
            content,
            &self.options.site,
            &mut article,
            &article_dir,
            image_fetcher,
        )
        .await;

        let output = ArticleConverter::new(&map).convert(content);
        article.figures = output.figures;

        let document = assemble_document(&article, &output.markdown, map.imports());
        AtomicFileWriter::new(article_dir).write(DOCUMENT_FILE, &document)?;
        info!("translated {url} -> {}/{DOCUMENT_FILE}", rel_dir.display());

        Ok(ArticleSummary {
            slug: article.slug,
            title: article.title,
            date: article.date,
            rel_dir: rel_dir.to_string_lossy().replace('\\', "/"),
        })
    }
}
