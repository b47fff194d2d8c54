use std::sync::OnceLock;

use ego_tree::NodeRef;
use regex::Regex;
use scraper::node::Node;
use scraper::{ElementRef, Selector};

use crate::assets::{ImageMap, HERO_CLASS};
use crate::extract::collapse_whitespace;

/// Fixed display width carried by every emitted figure component.
pub const FIGURE_WIDTH: u32 = 600;

/// Marker phrase of the source site's promotional blockquote.
pub const PROMO_PHRASE: &str = "Sign up for the newsletter";

/// Component replacing the promotional blockquote.
pub const PROMO_COMPONENT: &str = "<Newsletter />";

const STRUCTURED_DATA_TYPE: &str = "application/ld+json";

/// The two code-block dialects the source template produces.
const CODE_DIALECTS: [&str; 2] = ["wp-block-code", "wp-block-syntaxhighlighter-code"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertOutput {
    pub markdown: String,
    /// Figure image sources in body order; a figure's 1-based position here
    /// is the index its component carries.
    pub figures: Vec<String>,
}

/// Element kinds with a dedicated rendering rule.
///
/// Selection is first-match by kind and exactly one rule fires per element;
/// anything unmatched falls through to the default flattening walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rule {
    Heading(usize),
    CodeBlock,
    Figure,
    Image,
    Script,
    Style,
    Blockquote,
    Anchor,
    Frame,
}

fn match_rule(element: &ElementRef) -> Option<Rule> {
    let tag = element.value().name().to_ascii_lowercase();
    match tag.as_str() {
        "h2" => Some(Rule::Heading(2)),
        "h3" => Some(Rule::Heading(3)),
        "h4" => Some(Rule::Heading(4)),
        "pre" if is_code_dialect(element) => Some(Rule::CodeBlock),
        "figure" => Some(Rule::Figure),
        "img" => Some(Rule::Image),
        "script" => Some(Rule::Script),
        "style" => Some(Rule::Style),
        "blockquote" => Some(Rule::Blockquote),
        "a" => Some(Rule::Anchor),
        "iframe" => Some(Rule::Frame),
        _ => None,
    }
}

fn is_code_dialect(element: &ElementRef) -> bool {
    element
        .value()
        .classes()
        .any(|c| CODE_DIALECTS.contains(&c))
}

/// `toMarkdown(contentNode) -> text`: one depth-first traversal of the
/// (already asset-resolved) body, children before parents.
pub struct ArticleConverter<'a> {
    images: &'a ImageMap,
}

impl<'a> ArticleConverter<'a> {
    pub fn new(images: &'a ImageMap) -> Self {
        Self { images }
    }

    pub fn convert(&self, content: ElementRef<'_>) -> ConvertOutput {
        let mut ctx = RenderContext::new();
        for child in content.children() {
            self.visit_node(child, &mut ctx);
        }
        ctx.into_output()
    }

    fn visit_node(&self, node: NodeRef<'_, Node>, ctx: &mut RenderContext) {
        match node.value() {
            Node::Text(text) => ctx.append_text(text),
            Node::Element(_) => {
                if let Some(element) = ElementRef::wrap(node) {
                    self.visit_element(element, ctx);
                }
            }
            _ => {
                for child in node.children() {
                    self.visit_node(child, ctx);
                }
            }
        }
    }

    fn visit_element(&self, element: ElementRef<'_>, ctx: &mut RenderContext) {
        if let Some(rule) = match_rule(&element) {
            self.apply_rule(rule, element, ctx);
            return;
        }

        // Default flattening for everything without a rule.
        let tag = element.value().name().to_ascii_lowercase();
        match tag.as_str() {
            "br" => ctx.ensure_newline(),
            "hr" => {
                ctx.ensure_blank_line();
                ctx.append_raw("---");
                ctx.ensure_blank_line();
            }
            "li" => {
                ctx.ensure_newline();
                ctx.append_raw("- ");
                self.visit_children(element, ctx);
                ctx.ensure_newline();
            }
            "p" | "div" | "section" | "header" | "footer" | "table" | "tr" | "ul" | "ol"
            | "h1" | "h5" | "h6" | "figcaption" | "address" => {
                ctx.ensure_blank_line();
                self.visit_children(element, ctx);
                ctx.ensure_blank_line();
            }
            _ => self.visit_children(element, ctx),
        }
    }

    fn visit_children(&self, element: ElementRef<'_>, ctx: &mut RenderContext) {
        for child in element.children() {
            self.visit_node(child, ctx);
        }
    }

    fn apply_rule(&self, rule: Rule, element: ElementRef<'_>, ctx: &mut RenderContext) {
        match rule {
            Rule::Heading(level) => {
                ctx.ensure_blank_line();
                for _ in 0..level {
                    ctx.append_raw("#");
                }
                ctx.append_raw(" ");
                self.visit_children(element, ctx);
                ctx.ensure_blank_line();
            }
            Rule::CodeBlock => self.render_code_block(element, ctx),
            Rule::Figure => self.render_figure(element, ctx),
            Rule::Image => self.render_image(element, ctx),
            Rule::Script => {
                let kind = element.value().attr("type").unwrap_or("");
                if kind.eq_ignore_ascii_case(STRUCTURED_DATA_TYPE) {
                    return;
                }
                ctx.ensure_blank_line();
                ctx.append_raw(&element.html());
                ctx.ensure_blank_line();
            }
            Rule::Style => {}
            Rule::Blockquote => {
                let text = collapse_whitespace(&element.text().collect::<String>());
                if text.contains(PROMO_PHRASE) {
                    ctx.ensure_blank_line();
                    ctx.append_raw(PROMO_COMPONENT);
                    ctx.ensure_blank_line();
                } else {
                    ctx.ensure_blank_line();
                    self.visit_children(element, ctx);
                    ctx.ensure_blank_line();
                }
            }
            Rule::Anchor => {
                // Kept as markup, not flattened to plain text.
                let href = element.value().attr("href").unwrap_or("");
                ctx.append_raw(&format!("<a href=\"{}\">", escape_attr(href)));
                self.visit_children(element, ctx);
                ctx.append_raw("</a>");
            }
            Rule::Frame => {
                ctx.ensure_blank_line();
                ctx.append_raw(&element.html());
                ctx.ensure_blank_line();
            }
        }
    }

    fn render_code_block(&self, element: ElementRef<'_>, ctx: &mut RenderContext) {
        let code = unescape_code(&element.text().collect::<String>());
        let lang = element.value().attr("data-language").unwrap_or("");
        ctx.ensure_blank_line();
        ctx.append_raw(&format!("```{lang}\n"));
        ctx.append_raw(code.trim_matches('\n'));
        ctx.append_raw("\n```");
        ctx.ensure_blank_line();
    }

    fn render_figure(&self, element: ElementRef<'_>, ctx: &mut RenderContext) {
        // Figures wrapping an embedded frame pass through unchanged.
        if select_first(element, "iframe").is_some() {
            ctx.ensure_blank_line();
            ctx.append_raw(&element.html());
            ctx.ensure_blank_line();
            return;
        }

        let Some(img) = select_first(element, "img") else {
            ctx.ensure_blank_line();
            self.visit_children(element, ctx);
            ctx.ensure_blank_line();
            return;
        };

        let src = img.value().attr("src").unwrap_or("");
        let caption = select_first(element, "figcaption")
            .map(|c| strip_caption_label(&collapse_whitespace(&c.text().collect::<String>())))
            .unwrap_or_default();

        ctx.ensure_blank_line();
        match self.images.lookup(src) {
            Some(image) => {
                ctx.figures.push(src.to_string());
                let index = ctx.figures.len();
                ctx.append_raw(&format!(
                    "<Figure src={{{}}} width={{{FIGURE_WIDTH}}} caption=\"{}\" index={{{index}}} />",
                    image.ident,
                    escape_attr(&caption),
                ));
            }
            None => {
                // Unresolved image: bare image-plus-caption fallback.
                ctx.append_raw(&format!("![{caption}]({src})"));
            }
        }
        ctx.ensure_blank_line();
    }

    fn render_image(&self, element: ElementRef<'_>, ctx: &mut RenderContext) {
        let value = element.value();
        // The hero image already reaches the page via front matter.
        if value.classes().any(|c| c == HERO_CLASS) {
            return;
        }
        let Some(src) = value.attr("src") else {
            return;
        };
        if let Some(image) = self.images.lookup(src) {
            ctx.ensure_blank_line();
            ctx.append_raw(&format!(
                "<img src={{{}.src}} alt=\"{}\" />",
                image.ident,
                escape_attr(value.attr("alt").unwrap_or("")),
            ));
            ctx.ensure_blank_line();
        }
        // Unresolved standalone images are suppressed.
    }
}

fn select_first<'a>(element: ElementRef<'a>, selector: &str) -> Option<ElementRef<'a>> {
    let sel = Selector::parse(selector).ok()?;
    element.select(&sel).next()
}

/// Reverses the source dialects' literal backslash-escaping.
fn unescape_code(code: &str) -> String {
    let mut out = String::with_capacity(code.len());
    let mut chars = code.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some(next @ ('\\' | '`' | '[' | ']' | '_')) => out.push(next),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

/// Drops the source theme's `Figure N:` caption label.
fn strip_caption_label(caption: &str) -> String {
    static LABEL: OnceLock<Regex> = OnceLock::new();
    let re = LABEL.get_or_init(|| Regex::new(r"^Figure\s+\d+\s*:\s*").expect("valid regex"));
    re.replace(caption, "").trim().to_string()
}

fn escape_attr(text: &str) -> String {
    text.replace('"', "&quot;")
}

struct RenderContext {
    builder: String,
    last_char: Option<char>,
    figures: Vec<String>,
}

impl RenderContext {
    fn new() -> Self {
        Self {
            builder: String::new(),
            last_char: None,
            figures: Vec::new(),
        }
    }

    fn into_output(self) -> ConvertOutput {
        ConvertOutput {
            markdown: self.builder.trim().to_string(),
            figures: self.figures,
        }
    }

    fn append_text(&mut self, text: &str) {
        for ch in text.chars() {
            if ch.is_whitespace() {
                if self.last_char == Some(' ') || self.last_char == Some('\n') {
                    continue;
                }
                self.push_char(' ');
            } else {
                self.push_char(ch);
            }
        }
    }

    fn append_raw(&mut self, text: &str) {
        for ch in text.chars() {
            self.push_char(ch);
        }
    }

    fn ensure_newline(&mut self) {
        if self.last_char == Some('\n') || self.builder.is_empty() {
            return;
        }
        self.push_char('\n');
    }

    fn ensure_blank_line(&mut self) {
        if self.builder.is_empty() {
            return;
        }
        while !self.builder.ends_with("\n\n") {
            self.push_char('\n');
        }
    }

    fn push_char(&mut self, ch: char) {
        self.builder.push(ch);
        self.last_char = Some(ch);
    }
}

#[cfg(test)]
mod tests {
    use super::{strip_caption_label, unescape_code};

    #[test]
    fn caption_label_is_stripped() {
        assert_eq!(strip_caption_label("Figure 3: A cable layout"), "A cable layout");
        assert_eq!(strip_caption_label("No label here"), "No label here");
    }

    #[test]
    fn code_unescaping_reverses_literal_backslashes() {
        assert_eq!(unescape_code(r"a \_b\_ \[c\] \` \\"), r"a _b_ [c] ` \");
        // Unknown escapes are kept verbatim.
        assert_eq!(unescape_code(r"\n"), r"\n");
    }
}
