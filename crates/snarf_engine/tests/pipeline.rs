use std::fs;
use std::path::Path;
use std::sync::Once;

use snarf_engine::{Migration, MigrationOptions, DOCUMENT_FILE, INDEX_FILE, MANIFEST_FILE};
use tempfile::TempDir;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(snarf_logging::initialize_for_tests);
}

const ARTICLE_PAGE: &str = r#"<html><body>
<div id="site-content">
<h1 class="c-heading u-font-h2">Laying Out Cables</h1>
<p class="u-fz-h6"><time class="entry__published" datetime="2023-07-05T06:00:00-07:00">July 5, 2023</time>
<span class="entry__separator">|</span> <span>Author:  Jane Doe</span></p>
<div class="entry__content">
<p>Intro prose.</p>
<img class="wp-post-image" src="/uploads/hero.jpg"/>
<figure><img src="/uploads/cable.jpg"/><figcaption>Figure 1: The first cable</figcaption></figure>
<p>Same image again: <img src="/uploads/cable.jpg"/></p>
</div>
</div>
</body></html>"#;

fn sitemap_xml(base: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
<url><loc>{base}/2023/cable-layout/</loc></url>
<url><loc>{base}/2023/no-template/</loc></url>
<url><loc>{base}/2023/gone/</loc></url>
</urlset>"#
    )
}

async fn start_server() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/2023/cable-layout/"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(ARTICLE_PAGE, "text/html"))
        .expect(1)
        .mount(&server)
        .await;
    // A page without the article template: fetched, then skipped whole.
    Mock::given(method("GET"))
        .and(path("/2023/no-template/"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            "<html><body><main><p>free-form page</p></main></body></html>",
            "text/html",
        ))
        .expect(1)
        .mount(&server)
        .await;
    // A page that is gone: failed fetches leave no cache file, so every run
    // retries it.
    Mock::given(method("GET"))
        .and(path("/2023/gone/"))
        .respond_with(ResponseTemplate::new(404))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/uploads/hero.jpg"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"hero-bytes".to_vec()))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/uploads/cable.jpg"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"cable-bytes".to_vec()))
        .expect(1)
        .mount(&server)
        .await;
    server
}

fn options(base: &str, root: &Path) -> MigrationOptions {
    let mut options = MigrationOptions::new(Url::parse(base).unwrap());
    options.sitemap = root.join("sitemap.xml");
    options.snarf_dir = root.join("snarfed");
    options.out_dir = root.join("translated");
    options
}

fn read(root: &Path, rel: &str) -> String {
    fs::read_to_string(root.join(rel)).unwrap_or_else(|e| panic!("reading {rel}: {e}"))
}

#[test]
fn full_run_translates_skips_and_is_idempotent() {
    init_logging();
    // The migration driver owns its runtime, so the mock server lives on a
    // separate one kept alive for the duration of the test.
    let rt = tokio::runtime::Runtime::new().unwrap();
    let server = rt.block_on(start_server());

    let temp = TempDir::new().unwrap();
    let root = temp.path();
    fs::write(root.join("sitemap.xml"), sitemap_xml(&server.uri())).unwrap();

    let summary = Migration::new(options(&server.uri(), root)).run().unwrap();
    assert_eq!(summary.pages_discovered, 3);
    assert_eq!(summary.pages_fetched, 2);
    assert_eq!(summary.fetch_failures, 1);
    assert_eq!(summary.articles_written, 1);
    assert_eq!(summary.pages_skipped, 1);

    let out = root.join("translated");
    let doc = read(&out, &format!("2023/cable-layout/{DOCUMENT_FILE}"));
    assert!(doc.starts_with("---\n"));
    assert!(doc.contains("slug: cable-layout\n"));
    assert!(doc.contains("title: Laying Out Cables\n"));
    assert!(doc.contains("author: Jane Doe\n"));
    assert!(doc.contains("date: 2023-07-05\n"));
    assert!(doc.contains("featuredImage: ./hero.jpg\n"));
    // One import per unique image, hero first in body order.
    assert!(doc.contains("import hero from './hero.jpg';\n"));
    assert_eq!(doc.matches("import cable from './cable.jpg';").count(), 1);
    // Resolved figure renders the component form with its 1-based index.
    assert!(doc.contains(r#"<Figure src={cable} width={600} caption="The first cable" index={1} />"#));
    // The repeated occurrence reuses the identifier outside a figure.
    assert!(doc.contains("<img src={cable.src}"));
    // The hero image is front matter only.
    assert!(!doc.contains("hero.src"));

    // Images land next to the document.
    assert_eq!(
        fs::read(out.join("2023/cable-layout/cable.jpg")).unwrap(),
        b"cable-bytes"
    );
    assert_eq!(
        fs::read(out.join("2023/cable-layout/hero.jpg")).unwrap(),
        b"hero-bytes"
    );

    // The skipped page produced no output directory.
    assert!(!out.join("2023/no-template").exists());

    let index = read(&out, INDEX_FILE);
    assert!(index.contains("- July 5, 2023: [Laying Out Cables](./2023/cable-layout/)"));
    let manifest = read(&out, MANIFEST_FILE);
    assert!(manifest.contains("\"slug\": \"cable-layout\""));

    // Second run: every page mock above allows exactly one request, so the
    // cache must short-circuit all fetches; output stays byte-identical.
    let summary = Migration::new(options(&server.uri(), root)).run().unwrap();
    assert_eq!(summary.articles_written, 1);
    assert_eq!(
        read(&out, &format!("2023/cable-layout/{DOCUMENT_FILE}")),
        doc
    );
    assert_eq!(read(&out, INDEX_FILE), index);
    assert_eq!(read(&out, MANIFEST_FILE), manifest);

    drop(server);
}
