//! Deterministic text extraction helpers used by the hallucination
//! checker: a CSS-subset matcher, an XPath-subset matcher, and a plain
//! regex extractor, all over a document fetched at verify time.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html};
use sentrykit_core::error::ExtractError;
use std::collections::HashMap;

type Matcher = Box<dyn Fn(&str, &HashMap<String, String>) -> bool>;

static TOKEN_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"([#.])?([a-zA-Z0-9_-]+)").unwrap());
static XPATH_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^//([a-zA-Z0-9_-]+)(?:\[@([a-zA-Z0-9_-]+)='([^']*)'\])?$").unwrap()
});
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

fn element_attrs(element: ElementRef<'_>) -> HashMap<String, String> {
    element
        .value()
        .attrs()
        .map(|(name, value)| (name.to_lowercase(), value.to_string()))
        .collect()
}

fn css_matcher(selector: &str) -> Matcher {
    let normalized = selector.trim();
    let mut tag: Option<String> = None;
    let mut classes: Vec<String> = Vec::new();
    let mut element_id: Option<String> = None;
    let mut any_token = false;

    for caps in TOKEN_PATTERN.captures_iter(normalized) {
        any_token = true;
        let prefix = caps.get(1).map(|m| m.as_str());
        let value = caps[2].to_lowercase();
        match prefix {
            None if tag.is_none() => tag = Some(value),
            Some(".") => classes.push(value),
            Some("#") => element_id = Some(value),
            None => classes.push(value),
            _ => {}
        }
    }
    if !any_token && !normalized.is_empty() {
        tag = Some(normalized.to_lowercase());
    }

    Box::new(move |tag_name: &str, attrs: &HashMap<String, String>| {
        if let Some(t) = &tag {
            if tag_name.to_lowercase() != *t {
                return false;
            }
        }
        if let Some(id) = &element_id {
            if attrs.get("id").map(|v| v.to_lowercase()).as_deref() != Some(id.as_str()) {
                return false;
            }
        }
        if !classes.is_empty() {
            let attr_classes: std::collections::HashSet<String> = attrs
                .get("class")
                .map(|c| c.split_whitespace().map(str::to_lowercase).collect())
                .unwrap_or_default();
            if !classes.iter().all(|c| attr_classes.contains(c)) {
                return false;
            }
        }
        true
    })
}

fn xpath_matcher(expression: &str) -> Result<Matcher, ExtractError> {
    let normalized = expression.trim();
    let caps = XPATH_PATTERN
        .captures(normalized)
        .ok_or_else(|| ExtractError::new(format!("Unsupported XPath expression: {expression}")))?;
    let tag = caps[1].to_lowercase();
    let attr_name = caps.get(2).map(|m| m.as_str().to_string());
    let attr_value = caps.get(3).map(|m| m.as_str().to_string()).unwrap_or_default();

    Ok(Box::new(move |tag_name: &str, attrs: &HashMap<String, String>| {
        if tag_name.to_lowercase() != tag {
            return false;
        }
        match &attr_name {
            Some(name) => attrs.get(name.as_str()).map(String::as_str).unwrap_or("") == attr_value,
            None => true,
        }
    }))
}

fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn collect(document: &str, matcher: &Matcher, must_include: Option<&str>) -> Result<String, ExtractError> {
    let html = Html::parse_document(document);
    let mut matches = Vec::new();
    for node in html.tree.nodes() {
        let Some(element) = ElementRef::wrap(node) else { continue };
        let attrs = element_attrs(element);
        if !matcher(&element.value().name(), &attrs) {
            continue;
        }
        let text = element_text(element);
        if !text.is_empty() {
            matches.push(text);
        }
    }
    if matches.is_empty() {
        return Err(ExtractError::new("No elements matched selector"));
    }
    let text = matches.join(" ").trim().to_string();
    if text.is_empty() {
        return Err(ExtractError::new("Matched elements contained no text"));
    }
    if let Some(needle) = must_include {
        if !text.to_lowercase().contains(&needle.to_lowercase()) {
            return Err(ExtractError::new("Required text missing from extraction result"));
        }
    }
    Ok(text)
}

/// Extract text content from HTML using a limited CSS selector
/// (bare word = tag, `.class`, `#id`; no combinators).
pub fn extract_css(html: &str, selector: &str, must_include: Option<&str>) -> Result<String, ExtractError> {
    collect(html, &css_matcher(selector), must_include)
}

/// Extract text content from HTML using a limited XPath expression:
/// `//tag` or `//tag[@attr='value']`.
pub fn extract_xpath(html: &str, xpath: &str, must_include: Option<&str>) -> Result<String, ExtractError> {
    collect(html, &xpath_matcher(xpath)?, must_include)
}

/// Extract the first regex match from `text`, collapsing internal
/// whitespace runs to a single space.
pub fn extract_regex(text: &str, pattern: &str) -> Result<String, ExtractError> {
    let compiled = Regex::new(&format!("(?i){pattern}"))
        .map_err(|exc| ExtractError::new(format!("Invalid regular expression '{pattern}': {exc}")))?;
    let matched = compiled
        .find(text)
        .ok_or_else(|| ExtractError::new(format!("Regex '{pattern}' not found in corpus")))?;
    Ok(WHITESPACE.replace_all(matched.as_str(), " ").trim().to_string())
}
