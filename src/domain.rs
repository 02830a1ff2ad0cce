//! Registrable "brand" label of a hostname, aware of compound TLDs

use once_cell::sync::Lazy;
use regex::Regex;

use crate::rules::ExtractionRules;

/// Leading protocol and/or `www.` prefix
static PREFIX_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:https?://)?(?:www\.)?").expect("Invalid host prefix regex")
});

static DEFAULT_RULES: Lazy<ExtractionRules> = Lazy::new(ExtractionRules::default);

/// Extract the root label of a hostname using the default compound SLD set.
///
/// `www.example.co.uk` -> `example`, `shop.acme.com` -> `acme`,
/// `localhost` -> `localhost`.
pub fn extract_root_domain(hostname: &str) -> String {
    extract_root_domain_with(hostname, &DEFAULT_RULES)
}

/// Extract the root label of a hostname with a custom compound SLD set
pub fn extract_root_domain_with(hostname: &str, rules: &ExtractionRules) -> String {
    let lower = hostname.to_lowercase();
    let domain = PREFIX_RE.replace(&lower, "");
    let labels: Vec<&str> = domain.split('.').collect();

    if labels.len() == 1 {
        return labels[0].to_string();
    }

    let tld_labels = tld_span(&labels, rules);
    if labels.len() > tld_labels {
        labels[labels.len() - tld_labels - 1].to_string()
    } else {
        labels[0].to_string()
    }
}

/// Number of trailing labels forming the TLD (1 or 2)
fn tld_span(labels: &[&str], rules: &ExtractionRules) -> usize {
    let last = labels[labels.len() - 1];
    let second_last = labels[labels.len() - 2];

    // A two-letter ccTLD preceded by a known or very short SLD (co.uk, com.au, gv.at)
    if last.chars().count() == 2
        && !second_last.is_empty()
        && (rules.is_compound_sld(second_last) || second_last.chars().count() <= 2)
    {
        2
    } else {
        1
    }
}

/// Uppercase the first character, leaving the rest untouched
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
