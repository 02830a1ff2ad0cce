//! Page commands: extract, score

use colored::{ColoredString, Colorize};

use merchant_lens::cli::PageArgs;
use merchant_lens::client::{Decision, FirewallClient, InvestigationRequest, ScoreResponse, TransactionRequest};
use merchant_lens::config::Config;
use merchant_lens::error::{LensError, Result};
use merchant_lens::extract::{ExtractionResult, Extractor};
use merchant_lens::fetch::{read_page, snapshot_of, PageSource};

/// Command-line overrides for scraped transaction fields
#[derive(Debug, Default)]
pub struct Overrides {
    pub merchant_id: Option<String>,
    pub merchant_name: Option<String>,
    pub amount: Option<String>,
    pub currency: Option<String>,
}

/// Read the page and run extraction with the configured rules
fn extract_page(page: &PageArgs, config: &Config) -> Result<ExtractionResult> {
    let source = PageSource::parse(&page.source);
    let content = read_page(&source, page.url.as_deref())?;
    let snapshot = snapshot_of(&content, page.snapshot)?;
    let extractor = Extractor::new(config.rules.clone())?;
    Ok(extractor.extract(&snapshot))
}

/// Extract merchant, amount and currency from a page
pub fn cmd_extract(page: &PageArgs, json: bool, verbose: bool) -> Result<()> {
    let config = Config::load()?;
    let result = extract_page(page, &config)?;

    if json {
        let mut value = serde_json::to_value(&result)?;
        value["merchant_id"] = serde_json::Value::String(result.merchant_id());
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    print_extraction(&result, verbose);
    Ok(())
}

fn print_extraction(result: &ExtractionResult, verbose: bool) {
    let merchant_id = result.merchant_id();
    println!();
    println!(
        "  Merchant:    {}",
        result.merchant_name.as_deref().unwrap_or("(unknown)").bold()
    );
    println!(
        "  Merchant ID: {}",
        if merchant_id.is_empty() { "(none)".dimmed() } else { merchant_id.normal() }
    );
    println!("  Amount:      {} {}", result.amount.bold(), result.currency);
    println!("  Host:        {}", result.hostname);

    if verbose {
        let merchant_source = result
            .merchant_source
            .map(|s| s.as_str())
            .unwrap_or("none");
        println!(
            "\n  {}",
            format!(
                "merchant from {}, amount from {}",
                merchant_source,
                result.amount_source.as_str()
            )
            .dimmed()
        );
    }
    println!();
}

/// Build the scoring request from extracted facts plus overrides
pub fn build_request(result: &ExtractionResult, overrides: Overrides) -> Result<TransactionRequest> {
    let mut request = match TransactionRequest::from_extraction(result) {
        Ok(request) => request,
        // An explicit id makes up for an unusable page
        Err(LensError::NoIdentifier(_)) if overrides.merchant_id.is_some() => TransactionRequest {
            merchant_id: String::new(),
            merchant_name: result.merchant_name.clone(),
            amount: result.amount.parse().unwrap_or(0.0),
            currency: result.currency.clone(),
        },
        Err(e) => return Err(e),
    };

    if let Some(id) = overrides.merchant_id {
        request.merchant_id = id;
    }
    if let Some(name) = overrides.merchant_name {
        request.merchant_name = Some(name);
    }
    if let Some(amount) = overrides.amount {
        request.amount = amount
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|a| a.is_finite() && *a >= 0.0)
            .ok_or_else(|| LensError::InvalidAmount(amount.clone()))?;
    }
    if let Some(currency) = overrides.currency {
        request.currency = currency.trim().to_uppercase();
    }
    Ok(request)
}

/// Extract from a page and submit the transaction for scoring
pub fn cmd_score(page: &PageArgs, overrides: Overrides, investigate: bool, json: bool) -> Result<()> {
    let config = Config::load()?;
    let result = extract_page(page, &config)?;
    let request = build_request(&result, overrides)?;

    let client = FirewallClient::new(&config);
    let score = client.score(&request)?;

    let investigation = if investigate {
        // The score we just received is passed along directly
        let follow_up = InvestigationRequest::from_score(&score, request.amount);
        Some(client.investigate(&follow_up)?)
    } else {
        None
    };

    if json {
        let output = serde_json::json!({
            "request": request,
            "score": score,
            "investigation": investigation,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    print_score(&request, &score);
    if let Some(response) = investigation {
        print_investigation(&response.investigation);
    }
    Ok(())
}

/// Decision text colored like the extension badge
pub fn colored_decision(decision: &str) -> ColoredString {
    match Decision::parse(decision) {
        Decision::Allow => decision.green().bold(),
        Decision::Review => decision.yellow().bold(),
        Decision::Block => decision.red().bold(),
        Decision::Unknown => decision.dimmed(),
    }
}

fn print_score(request: &TransactionRequest, score: &ScoreResponse) {
    println!();
    println!(
        "  {} {} {:.2} {}",
        request.merchant_id.bold(),
        request.merchant_name.as_deref().unwrap_or("").dimmed(),
        request.amount,
        request.currency
    );
    println!(
        "\n  Decision:    {} [{}]",
        colored_decision(&score.decision),
        score.decision().badge()
    );
    println!("  Trust score: {}", score.merchant_trust_score);
    if let Some(risk) = score.risk_score {
        println!("  Risk score:  {}", risk);
    }
    if !score.closest_company_match.is_empty() {
        println!(
            "  Closest:     {} (similarity {})",
            score.closest_company_match, score.rename_similarity_score
        );
    }
    let patterns = if score.patterns_detected.is_empty() {
        "None".to_string()
    } else {
        score.patterns_detected.join(", ")
    };
    println!("  Patterns:    {}", patterns);

    for reason in &score.reasons {
        println!("    - {}", reason);
    }
    if !score.user_guidance.is_empty() {
        println!("\n  {}", score.user_guidance);
    }
    println!();
}

fn print_investigation(info: &merchant_lens::client::Investigation) {
    println!("{}", "  Investigation".bold());

    if let Some(raw) = &info.raw_text {
        println!("  {}", info.error.as_deref().unwrap_or("Unstructured response").yellow());
        println!("  {}", raw);
        println!();
        return;
    }

    println!(
        "\n  Risk summary: {}",
        info.risk_summary.as_deref().unwrap_or("N/A")
    );
    print_list("Reasons", &info.key_reasons);
    print_list("Recommended action", &info.recommended_bank_action);
    print_list("Guidance", &info.customer_guidance);
    print_list("How to cancel", &info.cancellation_instructions);
    if let Some(confidence) = &info.confidence {
        println!("\n  Confidence: {}", confidence);
    }
    println!();
}

fn print_list(title: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    println!("\n  {}:", title);
    for item in items {
        println!("    - {}", item);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use merchant_lens::amount::AmountSource;

    fn result(name: Option<&str>, host: &str) -> ExtractionResult {
        ExtractionResult {
            merchant_name: name.map(String::from),
            amount: "19.99".to_string(),
            currency: "USD".to_string(),
            hostname: host.to_string(),
            merchant_source: None,
            amount_source: AmountSource::BodyScan,
        }
    }

    #[test]
    fn test_build_request_applies_overrides() {
        let request = build_request(
            &result(Some("Acme Store"), "acme.com"),
            Overrides {
                amount: Some("5.50".into()),
                currency: Some("eur".into()),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(request.merchant_id, "acmestore");
        assert_eq!(request.amount, 5.5);
        assert_eq!(request.currency, "EUR");
    }

    #[test]
    fn test_build_request_rejects_bad_amount() {
        let err = build_request(
            &result(Some("Acme"), "acme.com"),
            Overrides {
                amount: Some("12,50".into()),
                ..Default::default()
            },
        )
        .unwrap_err();
        assert!(matches!(err, LensError::InvalidAmount(_)));
    }

    #[test]
    fn test_build_request_merchant_id_rescues_empty_page() {
        let request = build_request(
            &result(None, ""),
            Overrides {
                merchant_id: Some("mer_netflix".into()),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(request.merchant_id, "mer_netflix");

        assert!(build_request(&result(None, ""), Overrides::default()).is_err());
    }
}
