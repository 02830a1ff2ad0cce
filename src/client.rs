//! Blocking client for the transaction scoring service
//!
//! The extraction engine knows nothing about this module; the CLI feeds an
//! [`ExtractionResult`] into a [`TransactionRequest`] and sends it here.
//! Requests are sent once and never retried.

use std::time::Duration;

use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::Config;
use crate::error::{LensError, Result};
use crate::extract::ExtractionResult;

/// Upper bound the service accepts for `recent-transactions?limit=`
pub const MAX_HISTORY_LIMIT: usize = 50;

/// Body of `POST /score-transaction`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRequest {
    pub merchant_id: String,
    pub merchant_name: Option<String>,
    pub amount: f64,
    pub currency: String,
}

impl TransactionRequest {
    /// Build a request from extracted page facts
    pub fn from_extraction(result: &ExtractionResult) -> Result<Self> {
        let merchant_id = result.merchant_id();
        if merchant_id.is_empty() {
            return Err(LensError::NoIdentifier(result.hostname.clone()));
        }

        Ok(Self {
            merchant_id,
            merchant_name: result.merchant_name.clone(),
            amount: result.amount.parse::<f64>().unwrap_or(0.0),
            currency: result.currency.clone(),
        })
    }
}

/// Verdict of the scoring service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Review,
    Block,
    Unknown,
}

impl Decision {
    pub fn parse(s: &str) -> Self {
        match s.trim().to_uppercase().as_str() {
            "ALLOW" => Decision::Allow,
            "REVIEW" => Decision::Review,
            "BLOCK" => Decision::Block,
            _ => Decision::Unknown,
        }
    }

    /// One-letter badge text; empty for unknown verdicts
    pub fn badge(&self) -> &'static str {
        match self {
            Decision::Allow => "A",
            Decision::Review => "R",
            Decision::Block => "B",
            Decision::Unknown => "",
        }
    }
}

/// Response of `POST /score-transaction`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreResponse {
    pub merchant_id: String,
    pub merchant_name: String,
    pub decision: String,
    pub merchant_trust_score: f64,
    pub risk_score: Option<f64>,
    pub rename_similarity_score: i64,
    pub closest_company_match: String,
    pub patterns_detected: Vec<String>,
    pub reasons: Vec<String>,
    pub user_guidance: String,
}

impl ScoreResponse {
    pub fn decision(&self) -> Decision {
        Decision::parse(&self.decision)
    }
}

/// Body of `POST /investigate-transaction`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvestigationRequest {
    pub merchant_id: String,
    pub merchant_name: String,
    pub amount: f64,
    pub decision: String,
    pub merchant_trust_score: f64,
    pub rename_similarity_score: i64,
    pub closest_company_match: String,
    pub patterns_detected: Vec<String>,
}

impl InvestigationRequest {
    /// Follow up on a score response for the same transaction
    pub fn from_score(score: &ScoreResponse, amount: f64) -> Self {
        Self {
            merchant_id: score.merchant_id.clone(),
            merchant_name: score.merchant_name.clone(),
            amount,
            decision: score.decision.clone(),
            merchant_trust_score: score.merchant_trust_score,
            rename_similarity_score: score.rename_similarity_score,
            closest_company_match: score.closest_company_match.clone(),
            patterns_detected: score.patterns_detected.clone(),
        }
    }
}

/// LLM-written investigation; any field may be missing
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Investigation {
    pub risk_summary: Option<String>,
    pub key_reasons: Vec<String>,
    pub recommended_bank_action: Vec<String>,
    pub customer_guidance: Vec<String>,
    pub cancellation_instructions: Vec<String>,
    pub confidence: Option<String>,
    /// Unparsed model output when the service could not read it as JSON
    pub raw_text: Option<String>,
    pub error: Option<String>,
}

/// Response of `POST /investigate-transaction`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InvestigationResponse {
    pub ok: bool,
    pub merchant_id: String,
    pub merchant_name: String,
    pub investigation: Investigation,
}

/// Response of `GET /mongo-status`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceStatus {
    pub mongo: String,
    pub ok: bool,
    pub db: Option<String>,
}

/// Nested score block used by newer service versions
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Scores {
    pub merchant_trust_score: Option<f64>,
}

/// One row of `GET /recent-transactions`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecentTransaction {
    pub merchant_id: Option<String>,
    pub merchant_name: Option<String>,
    pub decision: String,
    pub merchant_trust_score: Option<f64>,
    pub scores: Option<Scores>,
    pub timestamp: Option<String>,
}

impl RecentTransaction {
    /// Trust score from whichever field this service version fills
    pub fn trust_score(&self) -> f64 {
        self.scores
            .as_ref()
            .and_then(|s| s.merchant_trust_score)
            .or(self.merchant_trust_score)
            .unwrap_or(0.0)
    }

    /// `HH:MM` of the timestamp, or `--:--` if it is missing or unreadable
    pub fn time_label(&self) -> String {
        let Some(ts) = self.timestamp.as_deref() else {
            return "--:--".to_string();
        };
        if let Ok(dt) = DateTime::parse_from_rfc3339(ts) {
            return dt.format("%H:%M").to_string();
        }
        NaiveDateTime::parse_from_str(ts, "%Y-%m-%dT%H:%M:%S%.f")
            .map(|dt| dt.format("%H:%M").to_string())
            .unwrap_or_else(|_| "--:--".to_string())
    }
}

/// Response of `GET /recent-transactions`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecentTransactions {
    pub ok: bool,
    pub count: usize,
    pub history: Vec<RecentTransaction>,
}

/// Client for the scoring service
pub struct FirewallClient {
    base_url: String,
    score_agent: ureq::Agent,
    status_agent: ureq::Agent,
    investigate_agent: ureq::Agent,
}

impl FirewallClient {
    pub fn new(config: &Config) -> Self {
        Self {
            base_url: config.firewall_base_url.trim_end_matches('/').to_string(),
            score_agent: agent(config.score_timeout_secs),
            status_agent: agent(config.status_timeout_secs),
            investigate_agent: agent(config.investigate_timeout_secs),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Submit a transaction for scoring
    pub fn score(&self, request: &TransactionRequest) -> Result<ScoreResponse> {
        let url = self.endpoint("score-transaction");
        debug!(%url, merchant_id = %request.merchant_id, "scoring transaction");
        let response = self
            .score_agent
            .post(url.as_str())
            .header("Content-Type", "application/json")
            .send_json(request)
            .map_err(|e| service_error(&url, e))?;
        Ok(response.into_body().read_json()?)
    }

    /// Ask the service to investigate a scored transaction
    pub fn investigate(&self, request: &InvestigationRequest) -> Result<InvestigationResponse> {
        let url = self.endpoint("investigate-transaction");
        debug!(%url, merchant_id = %request.merchant_id, "requesting investigation");
        let response = self
            .investigate_agent
            .post(url.as_str())
            .header("Content-Type", "application/json")
            .send_json(request)
            .map_err(|e| service_error(&url, e))?;
        Ok(response.into_body().read_json()?)
    }

    /// Connectivity check
    pub fn status(&self) -> Result<ServiceStatus> {
        let url = self.endpoint("mongo-status");
        let response = self
            .status_agent
            .get(url.as_str())
            .call()
            .map_err(|e| service_error(&url, e))?;
        Ok(response.into_body().read_json()?)
    }

    /// Most recent scored transactions, newest first
    pub fn recent_transactions(&self, limit: usize) -> Result<RecentTransactions> {
        let limit = limit.clamp(1, MAX_HISTORY_LIMIT);
        let url = format!("{}?limit={}", self.endpoint("recent-transactions"), limit);
        let response = self
            .status_agent
            .get(url.as_str())
            .call()
            .map_err(|e| service_error(&url, e))?;
        Ok(response.into_body().read_json()?)
    }
}

fn agent(timeout_secs: u64) -> ureq::Agent {
    ureq::Agent::config_builder()
        .timeout_global(Some(Duration::from_secs(timeout_secs)))
        .build()
        .into()
}

/// Non-2xx responses become service errors; everything else stays an HTTP error
fn service_error(url: &str, error: ureq::Error) -> LensError {
    match error {
        ureq::Error::StatusCode(status) => LensError::ServiceError {
            endpoint: url.to_string(),
            status,
        },
        other => LensError::HttpError(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::amount::AmountSource;
    use crate::merchant::MerchantSource;

    fn extraction(name: Option<&str>, host: &str, amount: &str) -> ExtractionResult {
        ExtractionResult {
            merchant_name: name.map(String::from),
            amount: amount.to_string(),
            currency: "EUR".to_string(),
            hostname: host.to_string(),
            merchant_source: name.map(|_| MerchantSource::MetaTag),
            amount_source: AmountSource::BodyScan,
        }
    }

    #[test]
    fn test_request_from_extraction() {
        let request =
            TransactionRequest::from_extraction(&extraction(Some("Netfl1x Officia1 Ltd"), "netflix.com", "0.99"))
                .unwrap();
        assert_eq!(request.merchant_id, "netfl1xofficia1ltd");
        assert_eq!(request.merchant_name.as_deref(), Some("Netfl1x Officia1 Ltd"));
        assert_eq!(request.amount, 0.99);
        assert_eq!(request.currency, "EUR");

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["merchant_id"], "netfl1xofficia1ltd");
        assert_eq!(json["amount"], 0.99);
    }

    #[test]
    fn test_request_requires_identifier() {
        let err = TransactionRequest::from_extraction(&extraction(None, "", "1.00")).unwrap_err();
        assert!(matches!(err, LensError::NoIdentifier(_)));
    }

    #[test]
    fn test_decision_parse_and_badge() {
        assert_eq!(Decision::parse("ALLOW"), Decision::Allow);
        assert_eq!(Decision::parse("review"), Decision::Review);
        assert_eq!(Decision::parse("BLOCK").badge(), "B");
        assert_eq!(Decision::parse("???"), Decision::Unknown);
        assert_eq!(Decision::Unknown.badge(), "");
    }

    #[test]
    fn test_score_response_tolerates_missing_fields() {
        let score: ScoreResponse = serde_json::from_str(
            r#"{"merchant_id": "acme", "decision": "REVIEW", "merchant_trust_score": 55.5,
                "patterns_detected": ["rename"], "extra_field": true}"#,
        )
        .unwrap();
        assert_eq!(score.decision(), Decision::Review);
        assert_eq!(score.merchant_trust_score, 55.5);
        assert!(score.risk_score.is_none());

        let follow_up = InvestigationRequest::from_score(&score, 12.5);
        assert_eq!(follow_up.merchant_id, "acme");
        assert_eq!(follow_up.amount, 12.5);
        assert_eq!(follow_up.patterns_detected, vec!["rename".to_string()]);
    }

    #[test]
    fn test_investigation_fallback_shape() {
        let response: InvestigationResponse = serde_json::from_str(
            r#"{"ok": true, "merchant_id": "acme", "merchant_name": "Acme",
                "investigation": {"raw_text": "not json", "error": "LLM output not valid JSON"}}"#,
        )
        .unwrap();
        assert!(response.investigation.risk_summary.is_none());
        assert_eq!(response.investigation.raw_text.as_deref(), Some("not json"));
    }

    #[test]
    fn test_recent_transaction_scores() {
        let nested: RecentTransaction = serde_json::from_str(
            r#"{"decision": "ALLOW", "scores": {"merchant_trust_score": 81.2},
                "merchant_trust_score": 10, "timestamp": "2024-05-01T09:30:12.345"}"#,
        )
        .unwrap();
        assert_eq!(nested.trust_score(), 81.2);
        assert_eq!(nested.time_label(), "09:30");

        let flat: RecentTransaction =
            serde_json::from_str(r#"{"decision": "BLOCK", "merchant_trust_score": 12.0, "timestamp": "2024-05-01T18:05:00Z"}"#)
                .unwrap();
        assert_eq!(flat.trust_score(), 12.0);
        assert_eq!(flat.time_label(), "18:05");

        assert_eq!(RecentTransaction::default().trust_score(), 0.0);
        assert_eq!(RecentTransaction::default().time_label(), "--:--");
    }

    #[test]
    fn test_endpoint_joins_base_url() {
        let config = Config {
            firewall_base_url: "http://localhost:8000/".to_string(),
            ..Default::default()
        };
        let client = FirewallClient::new(&config);
        assert_eq!(client.base_url(), "http://localhost:8000");
        assert_eq!(client.endpoint("/score-transaction"), "http://localhost:8000/score-transaction");
    }
}
