//! HTML conversion utilities

use scraper::{ElementRef, Html, Node, Selector};

/// Elements whose content is never rendered
const SKIP_TAGS: &[&str] = &[
    "script", "style", "noscript", "iframe", "svg", "template", "head",
];

/// Elements that start and end on their own line
const BLOCK_TAGS: &[&str] = &[
    "p", "div", "section", "article", "main", "header", "footer", "nav", "aside", "form",
    "table", "tr", "figure", "figcaption", "dl", "dt", "dd", "address", "li", "ul", "ol",
    "h1", "h2", "h3", "h4", "h5", "h6", "pre", "blockquote", "hr",
];

fn is_block(name: &str) -> bool {
    BLOCK_TAGS.contains(&name)
}

/// Check if content is HTML based on content type and body
pub fn is_html(content_type: Option<&str>, body: &str) -> bool {
    if let Some(ct) = content_type {
        let ct_lower = ct.to_lowercase();
        if ct_lower.contains("text/html") || ct_lower.contains("application/xhtml") {
            return true;
        }
    }

    let trimmed = body.trim_start();
    trimmed.starts_with("<!DOCTYPE") || trimmed.starts_with("<!doctype") || trimmed.starts_with("<html")
}

/// `<body>` of the document, or the root element when there is none
fn content_root(doc: &Html) -> ElementRef<'_> {
    Selector::parse("body")
        .ok()
        .and_then(|sel| doc.select(&sel).next())
        .unwrap_or_else(|| doc.root_element())
}

/// Convert HTML to plain text
///
/// Keeps the visible text of the body, one trimmed line per block, with
/// blank lines dropped.
pub fn html_to_text(html: &str) -> String {
    let doc = Html::parse_document(html);
    let mut raw = String::new();
    collect_text(content_root(&doc), &mut raw);

    raw.lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn collect_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(el) => {
                let name = el.name();
                if SKIP_TAGS.contains(&name) {
                    continue;
                }
                if name == "br" {
                    out.push('\n');
                    continue;
                }
                if let Some(child_el) = ElementRef::wrap(child) {
                    let block = is_block(name) || matches!(name, "td" | "th");
                    if block {
                        out.push('\n');
                    }
                    collect_text(child_el, out);
                    if block {
                        out.push('\n');
                    }
                }
            }
            _ => {}
        }
    }
}

/// Convert HTML to markdown
pub fn html_to_markdown(html: &str) -> String {
    let doc = Html::parse_document(html);
    let mut md = Markdown::default();
    md.children(content_root(&doc));
    tidy(&md.out)
}

/// Markdown renderer state
#[derive(Default)]
struct Markdown {
    out: String,
    /// Open lists; `Some(n)` is an ordered list whose next item is `n`
    lists: Vec<Option<usize>>,
}

impl Markdown {
    fn children(&mut self, element: ElementRef<'_>) {
        for child in element.children() {
            match child.value() {
                Node::Text(text) => self.text(text),
                Node::Element(_) => {
                    if let Some(child_el) = ElementRef::wrap(child) {
                        self.element(child_el);
                    }
                }
                _ => {}
            }
        }
    }

    fn element(&mut self, el: ElementRef<'_>) {
        let name = el.value().name();
        match name {
            _ if SKIP_TAGS.contains(&name) => {}
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                let level = name[1..].parse::<usize>().unwrap_or(1);
                let title = self.inline(el);
                self.out.push_str("\n\n");
                self.out.push_str(&"#".repeat(level));
                self.out.push(' ');
                self.out.push_str(&title);
                self.out.push_str("\n\n");
            }
            "br" => self.out.push('\n'),
            "hr" => self.out.push_str("\n\n---\n\n"),
            "ul" | "ol" => {
                self.lists.push(if name == "ol" { Some(1) } else { None });
                self.out.push('\n');
                self.children(el);
                self.lists.pop();
                if self.lists.is_empty() {
                    self.out.push_str("\n\n");
                }
            }
            "li" => {
                let depth = self.lists.len().saturating_sub(1);
                let marker = match self.lists.last_mut() {
                    Some(Some(n)) => {
                        let marker = format!("{n}. ");
                        *n += 1;
                        marker
                    }
                    _ => "- ".to_string(),
                };
                self.out.push('\n');
                self.out.push_str(&"  ".repeat(depth));
                self.out.push_str(&marker);
                self.children(el);
            }
            "strong" | "b" => self.wrapped(el, "**"),
            "em" | "i" => self.wrapped(el, "*"),
            "code" => self.wrapped(el, "`"),
            "pre" => {
                let code: String = el.text().collect();
                self.out.push_str("\n\n```\n");
                self.out.push_str(code.trim_matches('\n'));
                self.out.push_str("\n```\n\n");
            }
            "a" => {
                let text = self.inline(el);
                match el.value().attr("href") {
                    Some(href) if !text.is_empty() && !href.starts_with("javascript:") => {
                        self.space_if_glued();
                        self.out.push_str(&format!("[{text}]({href})"));
                    }
                    _ => self.out.push_str(&text),
                }
            }
            "img" => {
                if let Some(src) = el.value().attr("src") {
                    let alt = el.value().attr("alt").unwrap_or_default();
                    self.out.push_str(&format!("![{alt}]({src})"));
                }
            }
            "blockquote" => {
                let mut inner = Markdown::default();
                inner.children(el);
                self.out.push_str("\n\n");
                for line in tidy(&inner.out).lines() {
                    self.out.push_str("> ");
                    self.out.push_str(line);
                    self.out.push('\n');
                }
                self.out.push('\n');
            }
            "tr" => {
                let cells: Vec<String> = el
                    .children()
                    .filter_map(ElementRef::wrap)
                    .filter(|cell| matches!(cell.value().name(), "td" | "th"))
                    .map(|cell| self.inline(cell))
                    .collect();
                self.out.push('\n');
                self.out.push_str(&cells.join(" | "));
                self.out.push('\n');
            }
            _ if is_block(name) => {
                self.out.push_str("\n\n");
                self.children(el);
                self.out.push_str("\n\n");
            }
            _ => self.children(el),
        }
    }

    /// Render an element's content on a single line
    fn inline(&self, el: ElementRef<'_>) -> String {
        let mut inner = Markdown {
            out: String::new(),
            lists: self.lists.clone(),
        };
        inner.children(el);
        inner.out.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    fn wrapped(&mut self, el: ElementRef<'_>, marker: &str) {
        let text = self.inline(el);
        if text.is_empty() {
            return;
        }
        self.space_if_glued();
        self.out.push_str(marker);
        self.out.push_str(&text);
        self.out.push_str(marker);
    }

    fn text(&mut self, text: &str) {
        let words: Vec<&str> = text.split_whitespace().collect();
        if words.is_empty() {
            if !text.is_empty() {
                self.space();
            }
            return;
        }
        if text.starts_with(char::is_whitespace) {
            self.space();
        }
        self.out.push_str(&words.join(" "));
        if text.ends_with(char::is_whitespace) {
            self.space();
        }
    }

    fn space(&mut self) {
        if !self.out.is_empty() && !self.out.ends_with(char::is_whitespace) {
            self.out.push(' ');
        }
    }

    /// Avoid gluing markup onto a preceding word character
    fn space_if_glued(&mut self) {
        if self.out.ends_with(|c: char| c.is_alphanumeric()) {
            self.out.push(' ');
        }
    }
}

/// Trim line ends and keep at most one blank line in a row
fn tidy(s: &str) -> String {
    let joined = s.lines().map(str::trim_end).collect::<Vec<_>>().join("\n");
    filter_excessive_newlines(&joined).trim().to_string()
}

/// Wrap non-HTML content in a fenced code block
pub fn fence(content: &str) -> String {
    format!("```\n{content}\n```")
}

/// Extract the document body, wrapped in a minimal document
///
/// Returns the input unchanged when the body is empty.
pub fn extract_html_body(html: &str) -> String {
    let doc = Html::parse_document(html);
    let body = content_root(&doc).inner_html();
    if body.trim().is_empty() {
        return html.to_string();
    }
    format!("<html>\n<body>\n{}\n</body>\n</html>", body.trim())
}

/// Filter excessive newlines: keep at most 2 consecutive newlines
pub fn filter_excessive_newlines(s: &str) -> String {
    let mut result = String::new();
    let mut newline_count = 0;

    for c in s.chars() {
        if c == '\n' {
            newline_count += 1;
            if newline_count <= 2 {
                result.push(c);
            }
        } else {
            newline_count = 0;
            result.push(c);
        }
    }

    result
}
