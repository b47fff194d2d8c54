use std::path::PathBuf;

use url::Url;

const DIR_DOCUMENT: &str = "index.html";

/// Maps a page URL to its cache location relative to the mirror root.
///
/// Directory-style URLs (trailing slash, or a final segment without an
/// extension) get `index.html` appended, mirroring how the live site serves
/// them; file-style paths are kept verbatim.
pub fn cache_rel_path(url: &Url) -> PathBuf {
    let path = url.path().trim_start_matches('/');
    if path.is_empty() {
        return PathBuf::from(DIR_DOCUMENT);
    }
    let mut rel = PathBuf::new();
    for segment in path.split('/').filter(|s| !s.is_empty()) {
        rel.push(segment);
    }
    let last = path.rsplit('/').find(|s| !s.is_empty()).unwrap_or("");
    if path.ends_with('/') || !last.contains('.') {
        rel.push(DIR_DOCUMENT);
    }
    rel
}

/// Directory of the page's output document, relative to the output root.
pub fn output_rel_dir(url: &Url) -> PathBuf {
    let mut rel = cache_rel_path(url);
    rel.pop();
    rel
}

/// Output path identifier: the last meaningful path segment of the URL,
/// without any document extension.
pub fn slug_for(url: &Url) -> String {
    let last = url.path().split('/').rev().find(|s| !s.is_empty());
    let slug = match last {
        Some(name) => name.split('.').next().unwrap_or(name),
        None => "",
    };
    if slug.is_empty() {
        "index".to_string()
    } else {
        slug.to_string()
    }
}

/// True for `src` values that resolve against the source host (a single
/// leading slash; protocol-relative `//` references are external).
pub fn is_site_relative(src: &str) -> bool {
    src.starts_with('/') && !src.starts_with("//")
}

/// Basename an image keeps when mirrored next to the output document.
pub fn image_file_name(url: &Url) -> Option<String> {
    url.path()
        .rsplit('/')
        .next()
        .filter(|name| !name.is_empty() && name.contains('.'))
        .map(str::to_string)
}
