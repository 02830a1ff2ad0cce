//! Extraction pipeline: snapshot in, merchant/amount/currency out
//!
//! The merchant resolver and the amount extractor read the same snapshot
//! independently; neither sees the other's output. Nothing is cached between
//! calls, so one [`Extractor`] can serve many snapshots from many threads.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::amount::{extract_amount, AmountSource};
use crate::error::Result;
use crate::identifier::normalize_identifier;
use crate::merchant::{MerchantResolver, MerchantSource};
use crate::rules::ExtractionRules;
use crate::snapshot::PageSnapshot;

static DEFAULT_EXTRACTOR: Lazy<Extractor> = Lazy::new(Extractor::default);

/// Best-effort facts about a checkout page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub merchant_name: Option<String>,
    /// Decimal string, `"0.00"` when nothing was found
    pub amount: String,
    /// Three-letter code, `"USD"` when nothing was found
    pub currency: String,
    pub hostname: String,
    pub merchant_source: Option<MerchantSource>,
    pub amount_source: AmountSource,
}

impl ExtractionResult {
    /// Machine-safe merchant identifier; empty when none can be derived
    pub fn merchant_id(&self) -> String {
        normalize_identifier(self.merchant_name.as_deref(), &self.hostname)
    }
}

/// Runs the extraction pipeline with a fixed set of rules
#[derive(Debug, Clone, Default)]
pub struct Extractor {
    merchant: MerchantResolver,
}

impl Extractor {
    pub fn new(rules: ExtractionRules) -> Result<Self> {
        Ok(Self {
            merchant: MerchantResolver::new(rules)?,
        })
    }

    /// Extract merchant, amount and currency. Never fails: every source that
    /// cannot contribute is skipped and defaults fill the gaps.
    pub fn extract(&self, snapshot: &PageSnapshot) -> ExtractionResult {
        let merchant = self.merchant.resolve(snapshot);
        let price = extract_amount(snapshot);

        debug!(
            host = %snapshot.hostname,
            merchant = ?merchant.as_ref().map(|m| &m.name),
            amount = %price.amount,
            currency = %price.currency,
            "extraction finished"
        );

        let (merchant_name, merchant_source) = match merchant {
            Some(m) => (Some(m.name), Some(m.source)),
            None => (None, None),
        };

        ExtractionResult {
            merchant_name,
            amount: price.amount,
            currency: price.currency,
            hostname: snapshot.hostname.clone(),
            merchant_source,
            amount_source: price.source,
        }
    }
}

/// Extract with the default rules
pub fn extract(snapshot: &PageSnapshot) -> ExtractionResult {
    DEFAULT_EXTRACTOR.extract(snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_snapshot_defaults() {
        let result = extract(&PageSnapshot::new("www.example.com"));
        assert_eq!(result.merchant_name.as_deref(), Some("Example"));
        assert_eq!(result.merchant_source, Some(MerchantSource::Domain));
        assert_eq!(result.amount, "0.00");
        assert_eq!(result.currency, "USD");
        assert_eq!(result.amount_source, AmountSource::Default);
        assert_eq!(result.hostname, "www.example.com");
        assert_eq!(result.merchant_id(), "example");
    }

    #[test]
    fn test_no_hostname_no_name() {
        let result = extract(&PageSnapshot::default());
        assert!(result.merchant_name.is_none());
        assert!(result.merchant_source.is_none());
        assert_eq!(result.merchant_id(), "");
    }

    #[test]
    fn test_meta_tag_when_no_structured_data_or_copyright() {
        let snapshot = PageSnapshot::new("foo.example.com")
            .with_meta("og:site_name", "Foo")
            .with_title("Checkout | Something Else")
            .with_body_text("Total: $49.99");
        let result = extract(&snapshot);
        assert_eq!(result.merchant_name.as_deref(), Some("Foo"));
        assert_eq!(result.amount, "49.99");
        assert_eq!(result.merchant_id(), "foo");
    }

    #[test]
    fn test_idempotent() {
        let snapshot = PageSnapshot::new("shop.acme.com")
            .with_structured_data(r#"{"@type":"Store","name":"Acme"}"#)
            .with_body_text("© 2024 Acme Inc. Total €12.00");
        assert_eq!(extract(&snapshot), extract(&snapshot));
    }

    #[test]
    fn test_custom_rules() {
        let rules = ExtractionRules {
            generic_title_words: vec!["Checkout".to_string()],
            ..Default::default()
        };
        let extractor = Extractor::new(rules).unwrap();
        let snapshot = PageSnapshot::new("x.example.com").with_title("Checkout | Acme");
        assert_eq!(extractor.extract(&snapshot).merchant_name.as_deref(), Some("Acme"));
        assert_eq!(extract(&snapshot).merchant_name.as_deref(), Some("Checkout"));
    }
}
