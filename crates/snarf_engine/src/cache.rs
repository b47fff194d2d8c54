use std::io;
use std::path::{Path, PathBuf};

use log::info;
use url::Url;

use snarf_core::cache_rel_path;

use crate::persist::AtomicFileWriter;
use crate::{CacheError, Fetcher};

/// Fetch-or-reuse a remote resource at an explicit local path.
///
/// Presence of the file is the sole cache-validity signal: no checksum, no
/// freshness check. A stale or corrupt file must be deleted manually to
/// force a refresh, and in exchange interrupted runs resume for free.
pub async fn mirror_to(
    fetcher: &dyn Fetcher,
    url: &str,
    target: &Path,
) -> Result<(), CacheError> {
    if target.exists() {
        info!("cache hit: {}", target.display());
        return Ok(());
    }
    info!("cache miss: {} <- {url}", target.display());

    let output = fetcher.fetch(url).await?;
    let dir = target.parent().unwrap_or_else(|| Path::new("."));
    let name = target
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "target has no file name"))?;
    AtomicFileWriter::new(dir.to_path_buf()).write_bytes(name, &output.bytes)?;
    Ok(())
}

/// The raw-HTML mirror of the source site, one file per article URL.
pub struct PageStore {
    root: PathBuf,
}

impl PageStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Local cache location for a page URL.
    pub fn page_path(&self, url: &Url) -> PathBuf {
        self.root.join(cache_rel_path(url))
    }

    /// `ensureCached(url) -> localPath`: returns without any network call
    /// when the file already exists, otherwise fetches and persists it.
    pub async fn ensure_page(
        &self,
        fetcher: &dyn Fetcher,
        url: &Url,
    ) -> Result<PathBuf, CacheError> {
        let target = self.page_path(url);
        mirror_to(fetcher, url.as_str(), &target).await?;
        Ok(target)
    }
}
