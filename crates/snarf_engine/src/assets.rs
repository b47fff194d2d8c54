use std::collections::HashMap;
use std::path::Path;

use log::warn;
use scraper::{ElementRef, Selector};
use sha2::{Digest, Sha256};
use url::Url;

use snarf_core::{image_file_name, is_site_relative, Article};

use crate::cache::mirror_to;
use crate::Fetcher;

/// Class marking the one image per article surfaced via front matter.
pub const HERO_CLASS: &str = "wp-post-image";

/// One mirrored image: the generated import identifier and the basename it
/// keeps next to the output document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef {
    pub ident: String,
    pub file_name: String,
}

/// Per-article map from an image source string to its mirrored image.
///
/// Keys cover both the original site-relative `src` and the rewritten
/// basename-only reference, so the transformer can look up whichever form
/// an element carries. At most one identifier exists per unique source.
#[derive(Debug, Default)]
pub struct ImageMap {
    entries: Vec<ImageRef>,
    by_src: HashMap<String, usize>,
}

impl ImageMap {
    pub fn lookup(&self, src: &str) -> Option<&ImageRef> {
        self.by_src.get(src).map(|&idx| &self.entries[idx])
    }

    /// Import declarations in first-seen body order, one per unique source.
    pub fn imports(&self) -> &[ImageRef] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Registers a mirrored image under its original source and both forms
    /// of the rewritten basename reference.
    pub fn register(&mut self, original_src: &str, image: ImageRef) {
        let idx = self.entries.len();
        self.by_src.insert(original_src.to_string(), idx);
        self.by_src.insert(image.file_name.clone(), idx);
        self.by_src.insert(format!("./{}", image.file_name), idx);
        self.entries.push(image);
    }

    fn ident_taken(&self, ident: &str) -> bool {
        self.entries.iter().any(|e| e.ident == ident)
    }
}

/// `resolveImages(document, outputPath) -> importList`.
///
/// Walks `<img>` elements below the content container, mirrors every
/// site-relative source next to the eventual output document, registers one
/// identifier per unique source, and records the hero image on the article.
/// Must run before markdown conversion: the transformer's figure and image
/// rules consult the returned map.
pub async fn resolve_images(
    content: ElementRef<'_>,
    site: &Url,
    article: &mut Article,
    out_dir: &Path,
    fetcher: &dyn Fetcher,
) -> ImageMap {
    let mut map = ImageMap::default();
    let Ok(img_sel) = Selector::parse("img") else {
        return map;
    };

    for img in content.select(&img_sel) {
        let Some(src) = img.value().attr("src") else {
            continue;
        };
        if !is_site_relative(src) {
            continue;
        }

        let is_hero = img.value().classes().any(|c| c == HERO_CLASS);

        if let Some(existing) = map.lookup(src) {
            // Same source twice in one article: reuse the identifier.
            if is_hero && article.featured_image.is_empty() {
                article.featured_image = format!("./{}", existing.file_name);
            }
            continue;
        }

        let Ok(absolute) = site.join(src) else {
            warn!("unresolvable image src {src}");
            continue;
        };
        let Some(file_name) = image_file_name(&absolute) else {
            warn!("image url has no usable basename: {absolute}");
            continue;
        };

        let target = out_dir.join(&file_name);
        match mirror_to(fetcher, absolute.as_str(), &target).await {
            Ok(()) => {
                let ident = identifier_for(&map, &file_name, absolute.as_str());
                if is_hero {
                    article.featured_image = format!("./{file_name}");
                }
                map.register(src, ImageRef { ident, file_name });
            }
            Err(err) => {
                // The transformer must tolerate the remaining remote src.
                warn!("image fetch failed, leaving {src} unresolved: {err}");
            }
        }
    }
    map
}

/// Import identifier for a mirrored image, derived from the file stem.
/// Collisions between distinct sources get a short URL-hash suffix so the
/// identifier stays deterministic across runs.
fn identifier_for(map: &ImageMap, file_name: &str, url: &str) -> String {
    let stem = file_name.split('.').next().unwrap_or(file_name);
    let mut ident: String = stem
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    if ident.is_empty() || ident.starts_with(|c: char| c.is_ascii_digit()) {
        ident = format!("img_{ident}");
    }
    if map.ident_taken(&ident) {
        ident = format!("{ident}_{}", short_hash(url));
    }
    ident
}

fn short_hash(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    let digest = hasher.finalize();
    let mut hex = String::with_capacity(8);
    for byte in digest.iter().take(4) {
        use std::fmt::Write;
        let _ = write!(&mut hex, "{byte:02x}");
    }
    hex
}

#[cfg(test)]
mod tests {
    use super::{identifier_for, ImageMap, ImageRef};

    #[test]
    fn identifiers_are_sanitized_stems() {
        let map = ImageMap::default();
        assert_eq!(identifier_for(&map, "cable-layout.jpg", "u1"), "cable_layout");
        assert_eq!(identifier_for(&map, "2023-chart.png", "u2"), "img_2023_chart");
    }

    #[test]
    fn colliding_identifiers_get_a_hash_suffix() {
        let mut map = ImageMap::default();
        map.register(
            "/a/cable.jpg",
            ImageRef {
                ident: "cable".to_string(),
                file_name: "cable.jpg".to_string(),
            },
        );
        let second = identifier_for(&map, "cable.jpg", "https://blog.example.com/b/cable.jpg");
        assert!(second.starts_with("cable_"));
        assert_ne!(second, "cable");
    }

    #[test]
    fn map_answers_both_source_forms() {
        let mut map = ImageMap::default();
        map.register(
            "/uploads/cable.jpg",
            ImageRef {
                ident: "cable".to_string(),
                file_name: "cable.jpg".to_string(),
            },
        );
        assert!(map.lookup("/uploads/cable.jpg").is_some());
        assert!(map.lookup("cable.jpg").is_some());
        assert!(map.lookup("./cable.jpg").is_some());
        assert!(map.lookup("/elsewhere.jpg").is_none());
    }
}
