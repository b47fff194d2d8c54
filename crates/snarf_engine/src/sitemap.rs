use std::path::Path;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SitemapError {
    #[error("cannot read sitemap: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed sitemap xml: {0}")]
    Xml(#[from] quick_xml::Error),
}

/// Read a local sitemap file and return every `<loc>` URL in document order.
///
/// The sitemap seeds the crawl list once per run; filtering (if any) is the
/// caller's concern.
pub fn read_urlset(path: &Path) -> Result<Vec<String>, SitemapError> {
    let xml = std::fs::read_to_string(path)?;
    parse_urlset(&xml)
}

/// Parse a `urlset` XML document and return all `<loc>` URLs.
pub fn parse_urlset(xml: &str) -> Result<Vec<String>, SitemapError> {
    let mut reader = quick_xml::Reader::from_reader(xml.as_bytes());
    let mut urls = Vec::new();
    let mut in_url = false;
    let mut in_loc = false;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(quick_xml::events::Event::Start(e)) => match e.name().as_ref() {
                b"url" => in_url = true,
                b"loc" if in_url => in_loc = true,
                _ => {}
            },
            Ok(quick_xml::events::Event::Text(e)) if in_loc => {
                let loc = e.unescape().map_err(quick_xml::Error::from)?;
                urls.push(loc.trim().to_string());
            }
            Ok(quick_xml::events::Event::End(e)) => match e.name().as_ref() {
                b"loc" => in_loc = false,
                b"url" => in_url = false,
                _ => {}
            },
            Ok(quick_xml::events::Event::Eof) => break,
            Err(e) => return Err(e.into()),
            _ => {}
        }
        buf.clear();
    }
    Ok(urls)
}
