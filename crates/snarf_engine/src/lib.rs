//! Snarf engine: the migration IO pipeline.
//!
//! Fetch-or-reuse page caching, metadata extraction, asset mirroring, the
//! rule-driven markdown transformer and the document/index assembly. Pure
//! domain logic lives in `snarf_core`; this crate does the IO.
mod assets;
mod cache;
mod convert;
mod decode;
mod extract;
mod fetch;
mod frontmatter;
mod index;
mod persist;
mod pipeline;
mod sitemap;
mod types;

pub use assets::{resolve_images, ImageMap, ImageRef, HERO_CLASS};
pub use cache::{mirror_to, PageStore};
pub use convert::{ArticleConverter, ConvertOutput, FIGURE_WIDTH, PROMO_COMPONENT, PROMO_PHRASE};
pub use decode::{decode_page, DecodeError, DecodedHtml};
pub use extract::{find_content, page_meta, PageMeta, CONTENT_SELECTOR};
pub use fetch::{FetchSettings, Fetcher, ReqwestFetcher};
pub use frontmatter::{assemble_document, LAYOUT};
pub use index::build_index;
pub use persist::{ensure_output_dir, AtomicFileWriter, PersistError};
pub use pipeline::{Migration, MigrationOptions, DOCUMENT_FILE, INDEX_FILE, MANIFEST_FILE};
pub use sitemap::{parse_urlset, read_urlset, SitemapError};
pub use types::{
    CacheError, FailureKind, FetchError, FetchMetadata, FetchOutput, ManifestEntry, MigrateError,
    RunSummary, TranslateError,
};
