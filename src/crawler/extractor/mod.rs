
use scraper::{ElementRef, Html, Node, Selector};
use tracing::debug;

/// Elements whose text content is never rendered by a browser
const HIDDEN_ELEMENTS: &[&str] = &["script", "style", "noscript", "template"];

/// Elements rendered on their own line, so their text never runs into a neighbour's
const BLOCK_ELEMENTS: &[&str] = &[
    "address", "article", "aside", "blockquote", "br", "dd", "details", "dialog", "div", "dl",
    "dt", "fieldset", "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5",
    "h6", "header", "hr", "li", "main", "nav", "ol", "p", "pre", "section", "summary", "table",
    "td", "th", "tr", "ul",
];

/// Extract every anchor `href` from an HTML document.
///
/// Values are returned verbatim and in document order. Duplicates are kept and
/// relative or malformed targets are not resolved against any base URL, so the
/// caller decides how to deduplicate. Anchors without an `href`, or with an
/// empty one, are skipped. Malformed HTML is parsed leniently and an input
/// without anchors yields an empty list.
#[inline]
pub fn extract_links(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let link_selector = Selector::parse("a[href]").expect("valid selector");

    let links: Vec<String> = document
        .select(&link_selector)
        .filter_map(|element| element.value().attr("href"))
        .filter(|href| !href.is_empty())
        .map(ToString::to_string)
        .collect();

    debug!("Extracted {} links", links.len());
    links
}

/// Extract the visible text of the document body with all markup removed.
///
/// Text nodes are joined as written, so inline markup never splits a word.
/// Block-level elements are separated by whitespace. Text nested inside
/// `script`, `style`, `noscript` and `template` elements is dropped. Runs of
/// whitespace collapse to a single space.
#[inline]
pub fn extract_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let body_selector = Selector::parse("body").expect("valid selector");

    let Some(body) = document.select(&body_selector).next() else {
        return String::new();
    };

    let mut text = String::new();
    collect_text(body, &mut text);

    clean_text(&text)
}

fn collect_text(element: ElementRef<'_>, text: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(fragment) => text.push_str(fragment),
            Node::Element(child_element) => {
                if HIDDEN_ELEMENTS.contains(&child_element.name()) {
                    continue;
                }
                let Some(child_ref) = ElementRef::wrap(child) else {
                    continue;
                };

                let block = BLOCK_ELEMENTS.contains(&child_element.name());
                if block {
                    text.push(' ');
                }
                collect_text(child_ref, text);
                if block {
                    text.push(' ');
                }
            }
            _ => {}
        }
    }
}

/// Collapse whitespace runs and trim
fn clean_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
