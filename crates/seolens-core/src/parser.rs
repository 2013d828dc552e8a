//! Markup parsing and SEO field extraction
//!
//! Extraction never fails: a missing or malformed element yields the default
//! value for its field, and an unparseable JSON-LD block is skipped without
//! affecting the rest of the document.

use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use serde_json::Value as JsonValue;
use tracing::debug;

use crate::predicates::{
    attr_equals, attr_has_prefix, is_canonical_rel, is_json_ld_script_type, is_robots_meta_name,
};
use crate::types::ExtractedFields;
use crate::url_utils::resolve_against;

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("static selector must parse")
}

static TITLE: Lazy<Selector> = Lazy::new(|| selector("title"));
static META: Lazy<Selector> = Lazy::new(|| selector("meta"));
static H1: Lazy<Selector> = Lazy::new(|| selector("h1"));
static LINK: Lazy<Selector> = Lazy::new(|| selector("link"));
static SCRIPT: Lazy<Selector> = Lazy::new(|| selector("script"));
static WITH_PROPERTY: Lazy<Selector> = Lazy::new(|| selector("[property]"));
static WITH_NAME: Lazy<Selector> = Lazy::new(|| selector("[name]"));

/// Extract every SEO field from `html`.
///
/// When `base` is given, a relative canonical link is resolved against it.
pub fn analyze(html: &str, base: Option<&str>) -> ExtractedFields {
    let document = Html::parse_document(html);

    let blocks = extract_json_ld_blocks(&document);
    let jsonld_types = blocks
        .iter()
        .filter_map(|block| json_ld_types(block))
        .flatten()
        .collect();

    ExtractedFields {
        title: extract_title(&document),
        meta_description: extract_meta_description(&document),
        h1: extract_h1(&document),
        canonical: extract_canonical(&document, base),
        robots: extract_robots(&document),
        viewport: has_viewport(&document),
        og_count: count_with_attr_prefix(&document, &WITH_PROPERTY, "property", "og:"),
        twitter_count: count_with_attr_prefix(&document, &WITH_NAME, "name", "twitter:"),
        jsonld_count: blocks.len(),
        jsonld_types,
        text_words: count_words(&document),
    }
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

fn first_meta<'a>(document: &'a Html, matches: impl Fn(Option<&str>) -> bool) -> Option<ElementRef<'a>> {
    document
        .select(&META)
        .find(|el| matches(el.value().attr("name")))
}

pub fn extract_title(document: &Html) -> String {
    document
        .select(&TITLE)
        .next()
        .map(element_text)
        .unwrap_or_default()
}

pub fn extract_meta_description(document: &Html) -> String {
    first_meta(document, |name| attr_equals(name, "description"))
        .and_then(|el| el.value().attr("content"))
        .unwrap_or_default()
        .to_string()
}

pub fn extract_h1(document: &Html) -> Vec<String> {
    document.select(&H1).map(element_text).collect()
}

pub fn extract_canonical(document: &Html, base: Option<&str>) -> Option<String> {
    document
        .select(&LINK)
        .find(|el| is_canonical_rel(el.value().attr("rel")))
        .and_then(|el| el.value().attr("href"))
        .map(|href| resolve_against(base, href))
}

pub fn extract_robots(document: &Html) -> Option<String> {
    first_meta(document, is_robots_meta_name)
        .map(|el| el.value().attr("content").unwrap_or_default().to_lowercase())
}

fn has_viewport(document: &Html) -> bool {
    first_meta(document, |name| attr_equals(name, "viewport")).is_some()
}

fn count_with_attr_prefix(document: &Html, candidates: &Selector, attr: &str, prefix: &str) -> usize {
    document
        .select(candidates)
        .filter(|el| attr_has_prefix(el.value().attr(attr), prefix))
        .count()
}

/// Whitespace-delimited tokens in the document's tag-stripped text.
pub fn count_words(document: &Html) -> usize {
    document
        .root_element()
        .text()
        .flat_map(|t| t.split_whitespace())
        .count()
}

/// Raw text of every JSON-LD script block, in document order.
///
/// Empty blocks are kept: they still count as structured-data candidates.
pub fn extract_json_ld_blocks(document: &Html) -> Vec<String> {
    document
        .select(&SCRIPT)
        .filter(|el| is_json_ld_script_type(el.value().attr("type")))
        .map(|el| el.text().collect::<String>())
        .collect()
}

/// Collect the `@type` values of one JSON-LD block.
///
/// Returns `None` when the block is not valid JSON. A top-level array is
/// inspected element by element; `@type` may be a single value or an array,
/// and non-string values are kept in their JSON form.
pub fn json_ld_types(block: &str) -> Option<Vec<String>> {
    let parsed: JsonValue = match serde_json::from_str(block.trim()) {
        Ok(value) => value,
        Err(e) => {
            debug!(error = %e, "skipping unparseable JSON-LD block");
            return None;
        }
    };

    let mut types = Vec::new();
    match &parsed {
        JsonValue::Array(items) => {
            for item in items {
                push_types(item, &mut types);
            }
        }
        other => push_types(other, &mut types),
    }
    Some(types)
}

fn push_types(node: &JsonValue, out: &mut Vec<String>) {
    let Some(declared) = node.as_object().and_then(|obj| obj.get("@type")) else {
        return;
    };

    match declared {
        JsonValue::Array(values) => out.extend(values.iter().map(stringify)),
        value => out.push(stringify(value)),
    }
}

fn stringify(value: &JsonValue) -> String {
    match value {
        JsonValue::String(s) => s.clone(),
        other => other.to_string(),
    }
}
