//! Tunable constants for the extraction heuristics
//!
//! The word lists and length bounds here are best-effort values. They live
//! in one serializable struct so they can be overridden from the config file
//! without touching the algorithms that consume them.

use serde::{Deserialize, Serialize};

/// Heuristic word lists and bounds used by the extractors
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionRules {
    /// Lowercase prefixes that mark a copyright capture as boilerplate
    pub generic_words: Vec<String>,
    /// Title segments too generic to name a merchant (exact match)
    pub generic_title_words: Vec<String>,
    /// Second-level labels that form two-label TLDs with a ccTLD (e.g. `co.uk`)
    pub compound_slds: Vec<String>,
    /// Minimum length of the raw copyright capture
    pub copyright_min_chars: usize,
    /// Maximum length of the raw copyright capture
    pub copyright_max_chars: usize,
    /// Trimmed copyright names shorter than this are rejected
    pub copyright_min_name_chars: usize,
}

impl Default for ExtractionRules {
    fn default() -> Self {
        Self {
            generic_words: to_strings(&[
                "all rights", "reserved", "copyright", "202", "inc", "ltd", "llc",
            ]),
            generic_title_words: to_strings(&[
                "Home", "Welcome", "Login", "Sign In", "Dashboard", "Index", "Open", "App",
                "Web Player", "Portal",
            ]),
            compound_slds: to_strings(&[
                "co", "com", "net", "org", "gov", "edu", "ac", "mil", "in", "us", "au", "uk",
                "sg", "jp", "br",
            ]),
            copyright_min_chars: 2,
            copyright_max_chars: 30,
            copyright_min_name_chars: 3,
        }
    }
}

impl ExtractionRules {
    /// Whether `label` is a known compound second-level label
    pub fn is_compound_sld(&self, label: &str) -> bool {
        self.compound_slds.iter().any(|sld| sld == label)
    }

    /// Whether a lowercased copyright capture starts with a generic word
    pub fn is_generic_copyright(&self, lower: &str) -> bool {
        self.generic_words.iter().any(|g| lower.starts_with(g.as_str()))
    }

    /// Whether a trimmed title segment is too generic to be a name
    pub fn is_generic_title(&self, segment: &str) -> bool {
        self.generic_title_words.iter().any(|g| g == segment)
    }

    /// Check the bounds are usable; the copyright pattern is built from them
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.copyright_min_chars == 0 {
            return Err("copyright_min_chars must be at least 1".into());
        }
        if self.copyright_min_chars > self.copyright_max_chars {
            return Err(format!(
                "copyright_min_chars ({}) exceeds copyright_max_chars ({})",
                self.copyright_min_chars, self.copyright_max_chars
            ));
        }
        Ok(())
    }
}

fn to_strings(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| w.to_string()).collect()
}
