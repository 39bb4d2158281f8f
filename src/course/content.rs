//! Lesson content conversion
//!
//! Lesson bodies arrive as HTML from the course editor or as Markdown from
//! drafted courses. Both are reduced to a small set of display blocks; the
//! payload is never interpreted beyond that.

use once_cell::sync::Lazy;
use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use regex::Regex;

/// Detects whether content looks like HTML
static HTML_TAG_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)</?(p|div|h[1-6]|ul|ol|li|br|strong|em|span|pre|code|blockquote)\b").unwrap()
});

/// Block-level HTML tags mapped to Markdown prefixes
static HTML_HEADING_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<h([1-6])[^>]*>(.*?)</h[1-6]>").unwrap());
static HTML_LIST_ITEM_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<li[^>]*>(.*?)</li>").unwrap());
static HTML_BREAK_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<br\s*/?>").unwrap());
static HTML_BLOCK_END_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)</(p|div|ul|ol|blockquote|pre)>").unwrap());
static HTML_STRONG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<(strong|b)\b[^>]*>(.*?)</(strong|b)>").unwrap());
static HTML_EM_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<(em|i)\b[^>]*>(.*?)</(em|i)>").unwrap());
static HTML_CODE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<code[^>]*>(.*?)</code>").unwrap());
static HTML_ANY_TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<[^>]+>").unwrap());
static BLANK_LINES_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").unwrap());

/// A displayable block of lesson content
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentBlock {
    /// A heading (level 1-6)
    Heading { level: u8, text: String },
    /// A paragraph with inline `**bold**`, `*em*` and `` `code` `` markers kept
    Paragraph(String),
    /// A fenced or indented code block
    Code { language: Option<String>, code: String },
    /// A list of items
    List { ordered: bool, items: Vec<String> },
    /// A quotation
    Blockquote(String),
    /// A horizontal rule
    Rule,
}

/// Check whether a payload should be treated as HTML
pub fn is_html(content: &str) -> bool {
    HTML_TAG_RE.is_match(content)
}

/// Convert a lesson payload into display blocks
pub fn to_blocks(content: &str) -> Vec<ContentBlock> {
    if is_html(content) {
        parse_markdown(&html_to_markdown(content))
    } else {
        parse_markdown(content)
    }
}

/// Rewrite the common editor HTML into equivalent Markdown
fn html_to_markdown(html: &str) -> String {
    let text = HTML_HEADING_RE.replace_all(html, |caps: &regex::Captures| {
        let level: usize = caps[1].parse().unwrap_or(2);
        format!("\n\n{} {}\n\n", "#".repeat(level), caps[2].trim())
    });
    let text = HTML_LIST_ITEM_RE.replace_all(&text, "\n- $1\n");
    let text = HTML_STRONG_RE.replace_all(&text, "**$2**");
    let text = HTML_EM_RE.replace_all(&text, "*$2*");
    let text = HTML_CODE_RE.replace_all(&text, "`$1`");
    let text = HTML_BREAK_RE.replace_all(&text, "\n");
    let text = HTML_BLOCK_END_RE.replace_all(&text, "\n\n");
    let text = HTML_ANY_TAG_RE.replace_all(&text, "");
    let text = decode_entities(&text);
    BLANK_LINES_RE.replace_all(text.trim(), "\n\n").into_owned()
}

fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

/// Parse Markdown into display blocks
fn parse_markdown(markdown: &str) -> Vec<ContentBlock> {
    let parser = Parser::new_ext(markdown, Options::ENABLE_STRIKETHROUGH);
    let mut blocks = Vec::new();

    let mut text = String::new();
    let mut heading: Option<u8> = None;
    let mut code: Option<(Option<String>, String)> = None;
    let mut list: Option<(bool, Vec<String>)> = None;
    let mut in_quote = false;
    let mut quote = String::new();

    for event in parser {
        match event {
            Event::Start(Tag::Heading { level, .. }) => {
                flush_paragraph(&mut text, &mut blocks);
                heading = Some(heading_level(level));
            }
            Event::End(TagEnd::Heading(_)) => {
                if let Some(level) = heading.take() {
                    let title = std::mem::take(&mut text).trim().to_string();
                    if !title.is_empty() {
                        blocks.push(ContentBlock::Heading { level, text: title });
                    }
                }
            }
            Event::End(TagEnd::Paragraph) => {
                if in_quote {
                    quote.push_str(text.trim());
                    quote.push('\n');
                    text.clear();
                } else if list.is_none() {
                    flush_paragraph(&mut text, &mut blocks);
                }
            }
            Event::Start(Tag::CodeBlock(kind)) => {
                flush_paragraph(&mut text, &mut blocks);
                let language = match kind {
                    CodeBlockKind::Fenced(lang) if !lang.is_empty() => Some(lang.to_string()),
                    _ => None,
                };
                code = Some((language, String::new()));
            }
            Event::End(TagEnd::CodeBlock) => {
                if let Some((language, body)) = code.take() {
                    blocks.push(ContentBlock::Code { language, code: body.trim_end().to_string() });
                }
            }
            Event::Start(Tag::List(first)) => {
                flush_paragraph(&mut text, &mut blocks);
                list = Some((first.is_some(), Vec::new()));
            }
            Event::End(TagEnd::Item) => {
                if let Some((_, items)) = list.as_mut() {
                    items.push(std::mem::take(&mut text).trim().to_string());
                }
            }
            Event::End(TagEnd::List(_)) => {
                if let Some((ordered, items)) = list.take() {
                    if !items.is_empty() {
                        blocks.push(ContentBlock::List { ordered, items });
                    }
                }
            }
            Event::Start(Tag::BlockQuote(_)) => {
                flush_paragraph(&mut text, &mut blocks);
                in_quote = true;
            }
            Event::End(TagEnd::BlockQuote(_)) => {
                in_quote = false;
                let body = std::mem::take(&mut quote).trim().to_string();
                if !body.is_empty() {
                    blocks.push(ContentBlock::Blockquote(body));
                }
            }
            Event::Start(Tag::Strong) | Event::End(TagEnd::Strong) => text.push_str("**"),
            Event::Start(Tag::Emphasis) | Event::End(TagEnd::Emphasis) => text.push('*'),
            Event::Text(t) => match code.as_mut() {
                Some((_, body)) => body.push_str(&t),
                None => text.push_str(&t),
            },
            Event::Code(c) => {
                text.push('`');
                text.push_str(&c);
                text.push('`');
            }
            Event::SoftBreak | Event::HardBreak => text.push(' '),
            Event::Rule => {
                flush_paragraph(&mut text, &mut blocks);
                blocks.push(ContentBlock::Rule);
            }
            _ => {}
        }
    }

    flush_paragraph(&mut text, &mut blocks);
    blocks
}

fn flush_paragraph(text: &mut String, blocks: &mut Vec<ContentBlock>) {
    let paragraph = std::mem::take(text).trim().to_string();
    if !paragraph.is_empty() {
        blocks.push(ContentBlock::Paragraph(paragraph));
    }
}

fn heading_level(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}
