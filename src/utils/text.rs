// src/utils/text.rs

//! Markup-to-text helpers.
//!
//! Flattens an element into visual lines: block-level elements and `<br>`
//! start a new line, inline elements are joined into the current one.

use scraper::{ElementRef, Node};

const BLOCK_TAGS: &[&str] = &[
    "address", "article", "aside", "blockquote", "caption", "dd", "div", "dl", "dt",
    "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "header",
    "hr", "li", "main", "nav", "ol", "p", "pre", "section", "table", "tbody", "td", "tfoot",
    "th", "thead", "tr", "ul",
];

const HIDDEN_TAGS: &[&str] = &["script", "style", "noscript", "template", "head"];

/// Collapse runs of whitespace into single spaces and trim.
pub fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Visual text lines of an element, whitespace-normalized, empty lines dropped.
pub fn text_lines(element: ElementRef<'_>) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    collect_lines(element, &mut current, &mut lines);
    flush(&mut current, &mut lines);
    lines
}

/// Text of an element on a single line.
pub fn element_text(element: ElementRef<'_>) -> String {
    text_lines(element).join(" ")
}

fn collect_lines(element: ElementRef<'_>, current: &mut String, lines: &mut Vec<String>) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => current.push_str(text),
            Node::Element(el) => {
                let Some(child_ref) = ElementRef::wrap(child) else {
                    continue;
                };
                let name = el.name();
                if name == "br" {
                    flush(current, lines);
                } else if HIDDEN_TAGS.contains(&name) {
                    continue;
                } else if BLOCK_TAGS.contains(&name) {
                    flush(current, lines);
                    collect_lines(child_ref, current, lines);
                    flush(current, lines);
                } else {
                    collect_lines(child_ref, current, lines);
                }
            }
            _ => {}
        }
    }
}

fn flush(current: &mut String, lines: &mut Vec<String>) {
    let line = normalize_whitespace(current);
    if !line.is_empty() {
        lines.push(line);
    }
    current.clear();
}
