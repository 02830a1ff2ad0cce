//! Merchant name resolution
//!
//! Tries, in strict priority order, structured data, copyright footer text,
//! meta tags, the page title and finally the hostname. Every step is a pure
//! function of the snapshot so it can be exercised on its own.

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::chain::{Chain, StepResult};
use crate::domain::{capitalize, extract_root_domain_with};
use crate::error::{LensError, Result, SourceError};
use crate::rules::ExtractionRules;
use crate::snapshot::PageSnapshot;

/// Structured-data entity types that name the site owner
pub const MERCHANT_ENTITY_TYPES: &[&str] = &["Organization", "WebSite", "Store", "Corporation"];

/// Meta tags naming the site, in priority order
pub const SITE_NAME_META_TAGS: &[&str] =
    &["og:site_name", "application-name", "apple-mobile-web-app-title"];

/// Title separators, in priority order (not position order)
pub const TITLE_SEPARATORS: &[char] = &['|', '-', ':', '•'];

/// Which source produced the merchant name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MerchantSource {
    StructuredData,
    Copyright,
    MetaTag,
    Title,
    Domain,
}

impl MerchantSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            MerchantSource::StructuredData => "structured data",
            MerchantSource::Copyright => "copyright notice",
            MerchantSource::MetaTag => "meta tag",
            MerchantSource::Title => "page title",
            MerchantSource::Domain => "domain",
        }
    }
}

/// A resolved merchant name and where it came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MerchantName {
    pub name: String,
    pub source: MerchantSource,
}

/// Resolves merchant names with a fixed set of rules
#[derive(Debug, Clone)]
pub struct MerchantResolver {
    rules: ExtractionRules,
    copyright_re: Regex,
}

impl MerchantResolver {
    /// Build a resolver, compiling the copyright pattern from the rule bounds
    pub fn new(rules: ExtractionRules) -> Result<Self> {
        rules.validate().map_err(LensError::ConfigError)?;
        let copyright_re = copyright_regex(rules.copyright_min_chars, rules.copyright_max_chars)
            .map_err(|e| LensError::ConfigError(format!("Invalid copyright pattern: {}", e)))?;
        Ok(Self { rules, copyright_re })
    }

    /// Resolve the merchant name; `None` only when every source is empty
    pub fn resolve(&self, snapshot: &PageSnapshot) -> Option<MerchantName> {
        Chain::new()
            .step(MerchantSource::StructuredData, || {
                from_structured_data(&snapshot.structured_data_blocks)
            })
            .step(MerchantSource::Copyright, || {
                from_copyright(&snapshot.body_text, &self.copyright_re, &self.rules)
            })
            .step(MerchantSource::MetaTag, || from_meta_tags(snapshot))
            .step(MerchantSource::Title, || from_title(&snapshot.title, &self.rules))
            .step(MerchantSource::Domain, || from_domain(&snapshot.hostname, &self.rules))
            .run()
            .map(|(source, name)| MerchantName { name, source })
    }
}

impl Default for MerchantResolver {
    fn default() -> Self {
        let rules = ExtractionRules::default();
        let copyright_re = copyright_regex(rules.copyright_min_chars, rules.copyright_max_chars)
            .expect("Invalid default copyright regex");
        Self { rules, copyright_re }
    }
}

/// Copyright marker, optional year or year range, then the captured name
pub fn copyright_regex(min_chars: usize, max_chars: usize) -> std::result::Result<Regex, regex::Error> {
    Regex::new(&format!(
        r"(?i)(?:©|\(c\)|copyright)\s*(?:20[0-9]{{2}})?(?:\s*[-–]\s*20[0-9]{{2}})?,?\s*([A-Za-z0-9\s.,'\-]{{{},{}}})",
        min_chars, max_chars
    ))
}

/// Name of the first Organization/WebSite/Store/Corporation entity.
///
/// Each block is parsed on its own; a malformed block is skipped.
pub fn from_structured_data(blocks: &[String]) -> StepResult<String> {
    let mut first_error = None;

    for (index, block) in blocks.iter().enumerate() {
        let json: Value = match serde_json::from_str(block) {
            Ok(json) => json,
            Err(e) => {
                let err = SourceError::StructuredDataParse {
                    index,
                    message: e.to_string(),
                };
                debug!(error = %err, "skipping structured data block");
                first_error.get_or_insert(err);
                continue;
            }
        };

        if let Some(name) = entities(&json).into_iter().find_map(merchant_entity_name) {
            return Ok(name);
        }
    }

    Err(first_error.unwrap_or(SourceError::SourceAbsent("organization entity")))
}

/// Top-level entities of a block: the object itself or each array member,
/// followed by any `@graph` members
fn entities(json: &Value) -> Vec<&Value> {
    let top: Vec<&Value> = match json {
        Value::Array(items) => items.iter().collect(),
        other => vec![other],
    };

    let mut all = Vec::new();
    for entity in top {
        all.push(entity);
        if let Some(Value::Array(graph)) = entity.get("@graph") {
            all.extend(graph.iter());
        }
    }
    all
}

fn merchant_entity_name(entity: &Value) -> Option<String> {
    let type_matches = match entity.get("@type")? {
        Value::String(t) => MERCHANT_ENTITY_TYPES.contains(&t.as_str()),
        Value::Array(types) => types
            .iter()
            .filter_map(Value::as_str)
            .any(|t| MERCHANT_ENTITY_TYPES.contains(&t)),
        _ => false,
    };
    if !type_matches {
        return None;
    }

    let name = entity.get("name")?.as_str()?.trim();
    (!name.is_empty()).then(|| name.to_string())
}

/// Name following a copyright marker in the body text.
///
/// Only the first marker is considered; captures that are too short or
/// start with boilerplate ("All rights reserved", a year) are rejected.
pub fn from_copyright(body_text: &str, pattern: &Regex, rules: &ExtractionRules) -> StepResult<String> {
    let captured = pattern
        .captures(body_text)
        .and_then(|caps| caps.get(1))
        .ok_or(SourceError::SourceAbsent("copyright notice"))?;

    let candidate = captured.as_str().trim();
    if candidate.chars().count() < rules.copyright_min_name_chars
        || rules.is_generic_copyright(&candidate.to_lowercase())
    {
        debug!(candidate, "rejecting generic copyright name");
        return Err(SourceError::SourceAbsent("usable copyright name"));
    }

    let cleaned = candidate.trim_end_matches(&['.', ','][..]);
    if cleaned.is_empty() {
        return Err(SourceError::SourceAbsent("usable copyright name"));
    }
    Ok(cleaned.to_string())
}

/// First non-empty site-name meta tag
pub fn from_meta_tags(snapshot: &PageSnapshot) -> StepResult<String> {
    SITE_NAME_META_TAGS
        .iter()
        .filter_map(|key| snapshot.meta_tags.get(*key))
        .find(|content| !content.is_empty())
        .cloned()
        .ok_or(SourceError::SourceAbsent("site name meta tag"))
}

/// Most informative segment of the page title.
///
/// Splits on the first separator (by priority) present in the title; a
/// generic first segment such as "Home" defers to the second one.
pub fn from_title(title: &str, rules: &ExtractionRules) -> StepResult<String> {
    let title = title.trim();
    if title.is_empty() {
        return Err(SourceError::SourceAbsent("title"));
    }

    let best = match TITLE_SEPARATORS.iter().find(|sep| title.contains(**sep)) {
        Some(sep) => {
            let segments: Vec<&str> = title.split(*sep).collect();
            let first = segments[0].trim();
            match segments.get(1) {
                Some(second) if rules.is_generic_title(first) => second.trim(),
                _ => first,
            }
        }
        None => title,
    };

    if best.is_empty() {
        return Err(SourceError::SourceAbsent("title segment"));
    }
    Ok(best.to_string())
}

/// Capitalized root label of the hostname
pub fn from_domain(hostname: &str, rules: &ExtractionRules) -> StepResult<String> {
    let root = extract_root_domain_with(hostname.trim(), rules);
    if root.is_empty() {
        return Err(SourceError::SourceAbsent("hostname"));
    }
    Ok(capitalize(&root))
}
