//! Rich-text HTML to plain text.
//!
//! Works on an offline parse of the fragment, so there is no layout: text
//! nodes are taken verbatim and structure is expressed only through the
//! newlines and bullets inserted here.

use std::sync::LazyLock;

use regex::Regex;
use scraper::node::Node;
use scraper::{ElementRef, Html};

/// Elements followed by a newline.
const BLOCK_ELEMENTS: &[&str] = &[
    "p", "div", "li", "ul", "ol", "pre", "blockquote", "h1", "h2", "h3", "h4", "h5", "h6",
];

const LIST_BULLET: &str = "• ";

static EXCESS_NEWLINES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{3,}").expect("static regex"));

/// Convert a rich-text HTML fragment to trimmed plain text.
pub fn to_plain_text(html: &str) -> String {
    let fragment = Html::parse_fragment(html);
    let mut out = String::with_capacity(html.len());
    walk(fragment.root_element(), &mut out);

    let text = out.replace('\u{00A0}', " ");
    EXCESS_NEWLINES
        .replace_all(&text, "\n\n")
        .trim()
        .to_string()
}

fn walk(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(el) => {
                let Some(child_el) = ElementRef::wrap(child) else {
                    continue;
                };
                match el.name() {
                    "br" => out.push('\n'),
                    "script" | "style" | "template" => {}
                    name => {
                        if name == "li" {
                            out.push_str(LIST_BULLET);
                        }
                        walk(child_el, out);
                        if BLOCK_ELEMENTS.contains(&name) {
                            out.push('\n');
                        }
                    }
                }
            }
            _ => {}
        }
    }
}
