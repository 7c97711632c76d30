//! Markdown rendering with per-block rules and sanitization
//!
//! Post bodies arrive from an external authoring source, so every render
//! ends with an ammonia pass. Rendering is a pure function of the input:
//! no random IDs, no time-dependent output.

use lazy_static::lazy_static;
use pulldown_cmark::{html, BlockQuoteKind, CodeBlockKind, CowStr, Event, Options, Parser, Tag, TagEnd};
use regex::Regex;
use syntect::html::{ClassStyle, ClassedHTMLGenerator};
use syntect::parsing::{SyntaxReference, SyntaxSet};
use syntect::util::LinesWithEndings;

lazy_static! {
    /// Language tag of a fenced code block, either bare ("python") or in
    /// the CSS-class form ("language-python")
    static ref LANG_RE: Regex = Regex::new(r"^(?:language-)?([A-Za-z0-9_+#.-]+)").unwrap();
    static ref DETAILS_RE: Regex = Regex::new(r"(?i)<details\b[^>]*>").unwrap();
    static ref SUMMARY_RE: Regex = Regex::new(r"(?i)<summary\b[^>]*>").unwrap();
    static ref SANITIZER: ammonia::Builder<'static> = {
        let mut builder = ammonia::Builder::default();
        builder.add_tags(["details", "summary", "input"]);
        builder.add_generic_attributes(["class"]);
        builder.add_tag_attributes("img", ["loading", "decoding"]);
        builder.add_tag_attributes("input", ["type", "checked", "disabled"]);
        builder
    };
}

/// A top-level markdown block, dispatched to one rendering rule each
enum RenderedBlock<'a> {
    /// Paragraph events, including the start and end tags
    Paragraph(Vec<Event<'a>>),
    /// Heading events, including the start and end tags
    Heading(Vec<Event<'a>>),
    /// A paragraph holding exactly one image
    Image {
        dest: String,
        title: String,
        alt: String,
    },
    /// Fenced or indented code block
    Code {
        lang: Option<String>,
        source: String,
    },
    /// Blockquote, rendered as a callout container
    Blockquote {
        kind: Option<BlockQuoteKind>,
        inner: Vec<Event<'a>>,
    },
    /// Table events, including the start and end tags
    Table(Vec<Event<'a>>),
    /// Raw HTML block opening a collapsible details section
    Details(String),
    /// Anything else passes through untouched
    Other(Vec<Event<'a>>),
}

/// Markdown renderer with syntax highlighting
pub struct MarkdownRenderer {
    syntax_set: SyntaxSet,
}

impl MarkdownRenderer {
    /// Create a new markdown renderer
    pub fn new() -> Self {
        Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
        }
    }

    /// Render markdown to sanitized HTML
    ///
    /// Never fails: malformed constructs degrade to default rendering and
    /// sanitization removes unsafe content silently.
    pub fn render(&self, markdown: &str) -> String {
        let options = Options::ENABLE_TABLES
            | Options::ENABLE_FOOTNOTES
            | Options::ENABLE_STRIKETHROUGH
            | Options::ENABLE_TASKLISTS
            | Options::ENABLE_SMART_PUNCTUATION
            | Options::ENABLE_GFM;
        let parser = Parser::new_ext(markdown, options);

        let rendered = self.render_blocks(group_blocks(parser.collect()));

        // Mandatory backstop: the author source is untrusted.
        SANITIZER.clean(&rendered).to_string()
    }

    fn render_blocks(&self, blocks: Vec<RenderedBlock>) -> String {
        let mut out = String::new();
        for block in blocks {
            out.push_str(&self.render_block(block));
        }
        out
    }

    fn render_block(&self, block: RenderedBlock) -> String {
        match block {
            RenderedBlock::Image { dest, title, alt } => figure_html(&dest, &title, &alt),
            RenderedBlock::Code { lang, source } => self.code_html(lang.as_deref(), &source),
            RenderedBlock::Blockquote { kind, inner } => {
                let class = match kind {
                    Some(kind) => format!("callout callout-{}", alert_kind(kind)),
                    None => "callout".to_string(),
                };
                // Recurse so a code block inside a callout still highlights
                let body = self.render_blocks(group_blocks(inner));
                format!("<div class=\"{}\">\n{}</div>\n", class, body)
            }
            RenderedBlock::Table(events) => {
                let html = render_events(events);
                html.replacen("<table>", "<table class=\"post-table\">", 1)
            }
            RenderedBlock::Details(raw) => normalize_details(&raw),
            RenderedBlock::Paragraph(events) => render_events(events),
            RenderedBlock::Heading(events) => render_events(events),
            RenderedBlock::Other(events) => render_events(events),
        }
    }

    /// Render a code block, highlighted when the language is known
    fn code_html(&self, lang: Option<&str>, source: &str) -> String {
        if let Some(name) = lang.and_then(extract_lang_name) {
            if let Some(syntax) = self
                .syntax_set
                .find_syntax_by_token(&name)
                .or_else(|| self.syntax_set.find_syntax_by_extension(&name))
            {
                if let Ok(spans) = self.highlight_classed(source, syntax) {
                    return format!(
                        "<pre class=\"highlight\"><code class=\"language-{}\">{}</code></pre>\n",
                        name, spans
                    );
                }
            }
        }

        // Unknown or missing language: plain code, text preserved exactly
        // apart from one trailing newline
        let trimmed = source.strip_suffix('\n').unwrap_or(source);
        format!("<pre><code>{}</code></pre>\n", html_escape(trimmed))
    }

    /// Class-based highlighting keeps the output deterministic and free of
    /// inline styles the sanitizer would strip
    fn highlight_classed(
        &self,
        source: &str,
        syntax: &SyntaxReference,
    ) -> Result<String, syntect::Error> {
        let mut generator =
            ClassedHTMLGenerator::new_with_class_style(syntax, &self.syntax_set, ClassStyle::Spaced);
        for line in LinesWithEndings::from(source) {
            generator.parse_html_for_line_which_includes_newline(line)?;
        }
        Ok(generator.finalize())
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Group a parsed event stream into top-level blocks
fn group_blocks(events: Vec<Event>) -> Vec<RenderedBlock> {
    let mut blocks = Vec::new();
    let mut iter = events.into_iter();

    while let Some(event) = iter.next() {
        match event {
            Event::Start(Tag::CodeBlock(kind)) => {
                let lang = match kind {
                    CodeBlockKind::Fenced(tag) if !tag.is_empty() => Some(tag.to_string()),
                    _ => None,
                };
                let mut source = String::new();
                for ev in iter.by_ref() {
                    match ev {
                        Event::Text(text) => source.push_str(&text),
                        Event::End(TagEnd::CodeBlock) => break,
                        _ => {}
                    }
                }
                blocks.push(RenderedBlock::Code { lang, source });
            }

            Event::Start(Tag::BlockQuote(kind)) => {
                let mut depth = 1usize;
                let mut inner = Vec::new();
                for ev in iter.by_ref() {
                    match &ev {
                        Event::Start(Tag::BlockQuote(_)) => depth += 1,
                        Event::End(TagEnd::BlockQuote(_)) => {
                            depth -= 1;
                            if depth == 0 {
                                break;
                            }
                        }
                        _ => {}
                    }
                    inner.push(ev);
                }
                blocks.push(RenderedBlock::Blockquote { kind, inner });
            }

            Event::Start(Tag::Table(_)) => {
                let mut group = vec![event];
                for ev in iter.by_ref() {
                    let done = matches!(ev, Event::End(TagEnd::Table));
                    group.push(ev);
                    if done {
                        break;
                    }
                }
                blocks.push(RenderedBlock::Table(group));
            }

            Event::Start(Tag::HtmlBlock) => {
                let mut raw = String::new();
                for ev in iter.by_ref() {
                    match ev {
                        Event::Html(text) | Event::Text(text) => raw.push_str(&text),
                        Event::End(TagEnd::HtmlBlock) => break,
                        _ => {}
                    }
                }
                if raw.trim_start().to_ascii_lowercase().starts_with("<details") {
                    blocks.push(RenderedBlock::Details(raw));
                } else {
                    blocks.push(RenderedBlock::Other(vec![Event::Html(CowStr::from(raw))]));
                }
            }

            Event::Start(Tag::Paragraph) => {
                let mut group = vec![event];
                for ev in iter.by_ref() {
                    let done = matches!(ev, Event::End(TagEnd::Paragraph));
                    group.push(ev);
                    if done {
                        break;
                    }
                }
                match as_image_block(&group) {
                    Some(image) => blocks.push(image),
                    None => blocks.push(RenderedBlock::Paragraph(group)),
                }
            }

            Event::Start(Tag::Heading { .. }) => {
                let mut group = vec![event];
                for ev in iter.by_ref() {
                    let done = matches!(ev, Event::End(TagEnd::Heading(_)));
                    group.push(ev);
                    if done {
                        break;
                    }
                }
                blocks.push(RenderedBlock::Heading(group));
            }

            // Lists, rules, footnote definitions and the rest pass through
            // as one balanced group
            Event::Start(tag) => {
                let mut depth = 1usize;
                let mut group = vec![Event::Start(tag)];
                for ev in iter.by_ref() {
                    match &ev {
                        Event::Start(_) => depth += 1,
                        Event::End(_) => depth -= 1,
                        _ => {}
                    }
                    group.push(ev);
                    if depth == 0 {
                        break;
                    }
                }
                blocks.push(RenderedBlock::Other(group));
            }

            ev => blocks.push(RenderedBlock::Other(vec![ev])),
        }
    }

    blocks
}

/// Recognize a paragraph that holds exactly one image
fn as_image_block<'a>(group: &[Event<'a>]) -> Option<RenderedBlock<'a>> {
    if group.len() < 4 {
        return None;
    }
    let (dest, title) = match &group[1] {
        Event::Start(Tag::Image {
            dest_url, title, ..
        }) => (dest_url.to_string(), title.to_string()),
        _ => return None,
    };
    if !matches!(&group[group.len() - 2], Event::End(TagEnd::Image)) {
        return None;
    }

    let mut alt = String::new();
    for ev in &group[2..group.len() - 2] {
        match ev {
            Event::Text(text) | Event::Code(text) => alt.push_str(text),
            Event::SoftBreak | Event::HardBreak => alt.push(' '),
            _ => return None,
        }
    }
    Some(RenderedBlock::Image { dest, title, alt })
}

/// Push events through the default HTML writer, rewriting inline images
fn render_events(events: Vec<Event>) -> String {
    let events = rewrite_inline_images(events);
    let mut out = String::new();
    html::push_html(&mut out, events.into_iter());
    out
}

/// Replace inline image events with a responsive image element; an empty
/// source emits nothing instead of a broken reference
fn rewrite_inline_images(events: Vec<Event>) -> Vec<Event> {
    let mut out = Vec::with_capacity(events.len());
    let mut iter = events.into_iter();

    while let Some(ev) = iter.next() {
        if let Event::Start(Tag::Image {
            dest_url, title, ..
        }) = ev
        {
            let mut alt = String::new();
            for inner in iter.by_ref() {
                match inner {
                    Event::Text(text) | Event::Code(text) => alt.push_str(&text),
                    Event::End(TagEnd::Image) => break,
                    _ => {}
                }
            }
            let img = image_html(&dest_url, &title, &alt);
            if !img.is_empty() {
                out.push(Event::Html(CowStr::from(img)));
            }
        } else {
            out.push(ev);
        }
    }

    out
}

/// Responsive image element, or nothing when the source is empty
fn image_html(src: &str, title: &str, alt: &str) -> String {
    if src.trim().is_empty() {
        return String::new();
    }
    let title_attr = if title.is_empty() {
        String::new()
    } else {
        format!(r#" title="{}""#, html_escape(title))
    };
    format!(
        r#"<img src="{}" alt="{}"{} loading="lazy" decoding="async">"#,
        html_escape(src),
        html_escape(alt),
        title_attr
    )
}

/// Image block wrapped as a figure, with the title as caption
fn figure_html(src: &str, title: &str, alt: &str) -> String {
    let img = image_html(src, title, alt);
    if img.is_empty() {
        return String::new();
    }
    if title.is_empty() {
        format!("<figure>{}</figure>\n", img)
    } else {
        format!(
            "<figure>{}<figcaption>{}</figcaption></figure>\n",
            img,
            html_escape(title)
        )
    }
}

/// Force details sections closed and attach the disclosure class
fn normalize_details(raw: &str) -> String {
    let out = DETAILS_RE.replace_all(raw, r#"<details class="disclosure">"#);
    let out = SUMMARY_RE.replace_all(&out, r#"<summary class="disclosure-summary">"#);
    out.into_owned()
}

/// Language name from a fence tag; a malformed tag is just "no language"
fn extract_lang_name(tag: &str) -> Option<String> {
    LANG_RE
        .captures(tag.trim())
        .map(|caps| caps[1].to_ascii_lowercase())
}

fn alert_kind(kind: BlockQuoteKind) -> &'static str {
    match kind {
        BlockQuoteKind::Note => "note",
        BlockQuoteKind::Tip => "tip",
        BlockQuoteKind::Important => "important",
        BlockQuoteKind::Warning => "warning",
        BlockQuoteKind::Caution => "caution",
    }
}

/// Simple HTML escaping
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
