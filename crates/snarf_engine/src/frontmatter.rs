use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};

use snarf_core::{front_matter_date, Article};

use crate::assets::ImageRef;

/// Layout every generated document points at.
pub const LAYOUT: &str = "../../layouts/BlogPost.astro";

const COMPONENT_IMPORTS: &str = "import { Figure } from '../../components/Figure';\n\
                                 import { Newsletter } from '../../components/Newsletter';\n";

/// Characters percent-encoded inside front-matter titles; anything that
/// could be taken for key/value syntax by the downstream generator.
const TITLE_RESERVED: &AsciiSet = &CONTROLS.add(b'%').add(b':').add(b'"').add(b'#');

/// `assemble(article, markdownBody, imports) -> documentText`.
///
/// Front-matter block, fixed component imports, per-image imports, blank
/// line, body. The date line only appears for dates after the cutoff;
/// sentinel and legacy dates are deliberately excluded from date-based
/// site features.
pub fn assemble_document(article: &Article, body: &str, imports: &[ImageRef]) -> String {
    let mut doc = String::new();
    doc.push_str("---\n");
    doc.push_str(&format!("layout: {LAYOUT}\n"));
    doc.push_str(&format!("slug: {}\n", article.slug));
    doc.push_str(&format!(
        "title: {}\n",
        utf8_percent_encode(&article.title, TITLE_RESERVED)
    ));
    if !article.author.is_empty() {
        doc.push_str(&format!("author: {}\n", article.author));
    }
    if let Some(date) = front_matter_date(article.date) {
        doc.push_str(&format!("date: {date}\n"));
    }
    if !article.featured_image.is_empty() {
        doc.push_str(&format!("featuredImage: {}\n", article.featured_image));
    }
    doc.push_str("---\n");
    doc.push_str(COMPONENT_IMPORTS);
    for image in imports {
        doc.push_str(&format!("import {} from './{}';\n", image.ident, image.file_name));
    }
    doc.push('\n');
    doc.push_str(body.trim_end());
    doc.push('\n');
    doc
}
