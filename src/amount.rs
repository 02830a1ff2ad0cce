//! Amount and currency extraction
//!
//! An explicit checkout-total element wins outright; otherwise the body text
//! is scanned for the first currency token followed by a conventionally
//! formatted number (`$1,234.56`). Comma is the thousands separator and dot
//! the decimal separator, so locales that swap them (`100,00`) are misread.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::chain::{Chain, StepResult};
use crate::error::SourceError;
use crate::snapshot::PageSnapshot;

/// Amount reported when no evidence is found
pub const DEFAULT_AMOUNT: &str = "0.00";

/// Currency reported when no evidence is found
pub const DEFAULT_CURRENCY: &str = "USD";

/// Currency tokens and their codes; order is scan priority
pub const CURRENCY_SYMBOLS: &[(&str, &str)] = &[
    ("$", "USD"),
    ("€", "EUR"),
    ("£", "GBP"),
    ("₹", "INR"),
    ("¥", "JPY"),
    ("USD", "USD"),
    ("EUR", "EUR"),
    ("INR", "INR"),
];

/// First run of digits and commas, with an optional two-digit decimal part
static AMOUNT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[0-9,]+(?:\.[0-9]{2})?").expect("Invalid amount regex")
});

/// Currency token, at most one whitespace character, thousands-grouped
/// ASCII number
static PRICE_RE: Lazy<Regex> = Lazy::new(|| {
    let tokens = CURRENCY_SYMBOLS
        .iter()
        .map(|(token, _)| regex::escape(token))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"(?:{})\s?[0-9]{{1,3}}(?:,[0-9]{{3}})*(?:\.[0-9]{{2}})?", tokens))
        .expect("Invalid price regex")
});

/// Which source produced the amount
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AmountSource {
    ExplicitTotal,
    BodyScan,
    Default,
}

impl AmountSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            AmountSource::ExplicitTotal => "checkout total",
            AmountSource::BodyScan => "page text",
            AmountSource::Default => "default",
        }
    }
}

/// An amount and currency, always defined
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Price {
    pub amount: String,
    pub currency: String,
    pub source: AmountSource,
}

impl Default for Price {
    fn default() -> Self {
        Self {
            amount: DEFAULT_AMOUNT.to_string(),
            currency: DEFAULT_CURRENCY.to_string(),
            source: AmountSource::Default,
        }
    }
}

/// What a piece of text says about price; `None` means "keep the default"
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedText {
    pub amount: Option<String>,
    pub currency: Option<String>,
}

impl ParsedText {
    /// Fill in whatever this text did not provide from the defaults
    fn into_price(self, source: AmountSource) -> Price {
        let defaults = Price::default();
        Price {
            amount: self.amount.unwrap_or(defaults.amount),
            currency: self.currency.unwrap_or(defaults.currency),
            source,
        }
    }
}

/// Extract amount and currency, defaulting to `("0.00", "USD")`
pub fn extract_amount(snapshot: &PageSnapshot) -> Price {
    Chain::new()
        .step(AmountSource::ExplicitTotal, || from_explicit_total(snapshot))
        .step(AmountSource::BodyScan, || from_body_scan(&snapshot.body_text))
        .run()
        .map(|(source, parsed)| parsed.into_price(source))
        .unwrap_or_default()
}

/// Parse the checkout-total element; its declared currency beats any symbol
pub fn from_explicit_total(snapshot: &PageSnapshot) -> StepResult<ParsedText> {
    let text = snapshot
        .explicit_total_text
        .as_deref()
        .ok_or(SourceError::SourceAbsent("checkout total element"))?;
    Ok(parse_text(text, snapshot.explicit_total_currency.as_deref()))
}

/// Parse the first currency-prefixed price in document order
pub fn from_body_scan(body_text: &str) -> StepResult<ParsedText> {
    let found = PRICE_RE
        .find(body_text)
        .ok_or(SourceError::SourceAbsent("price in page text"))?;
    Ok(parse_text(found.as_str(), None))
}

/// Resolve currency and amount from a piece of text.
///
/// Currency comes from the override if given, else from the first
/// [`CURRENCY_SYMBOLS`] entry (table order, not text order) found anywhere
/// in the text, else USD. Empty text yields nothing at all.
pub fn parse_text(text: &str, currency_override: Option<&str>) -> ParsedText {
    if text.trim().is_empty() {
        return ParsedText::default();
    }

    let currency = currency_override
        .map(|c| c.trim().to_uppercase())
        .filter(|c| !c.is_empty())
        .unwrap_or_else(|| detect_currency(text).to_string());

    let amount = match parse_amount(text) {
        Ok(amount) => Some(amount),
        Err(e) => {
            debug!(error = %e, "no amount in text");
            None
        }
    };

    ParsedText {
        amount,
        currency: Some(currency),
    }
}

/// Currency code of the highest-priority token present in `text`
pub fn detect_currency(text: &str) -> &'static str {
    CURRENCY_SYMBOLS
        .iter()
        .find(|(token, _)| text.contains(token))
        .map(|(_, code)| *code)
        .unwrap_or(DEFAULT_CURRENCY)
}

/// First numeric run in `text` with commas stripped
pub fn parse_amount(text: &str) -> StepResult<String> {
    let found = AMOUNT_RE
        .find(text)
        .ok_or(SourceError::SourceAbsent("numeric run"))?;

    let cleaned = found.as_str().replace(',', "");
    match cleaned.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(cleaned),
        _ => Err(SourceError::NumericParse(found.as_str().to_string())),
    }
}
