//! Scoring service commands: status, history

use colored::Colorize;

use merchant_lens::client::FirewallClient;
use merchant_lens::config::Config;
use merchant_lens::error::Result;

use super::extract::colored_decision;

/// Ping the scoring service
pub fn cmd_status() -> Result<()> {
    let config = Config::load()?;
    let client = FirewallClient::new(&config);

    println!("\n  Service: {}", client.base_url());
    match client.status() {
        Ok(status) => {
            println!("  API:     {}", "CONNECTED".green().bold());
            let db = status.db.as_deref().unwrap_or("-");
            let mongo = if status.ok {
                status.mongo.green()
            } else {
                status.mongo.yellow()
            };
            println!("  Storage: {} ({})", mongo, db);
        }
        Err(e) => {
            println!("  API:     {}", "API OFFLINE".red().bold());
            println!("  {}", e.to_string().dimmed());
        }
    }
    println!();
    Ok(())
}

/// Show recently scored transactions
pub fn cmd_history(limit: usize, json: bool) -> Result<()> {
    let config = Config::load()?;
    let client = FirewallClient::new(&config);
    let recent = client.recent_transactions(limit)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&recent.history)?);
        return Ok(());
    }

    if recent.history.is_empty() {
        println!("No transactions scored yet.");
        return Ok(());
    }

    println!("\n  {:<6}  {:<8}  {:>5}  {}", "TIME", "DECISION", "SCORE", "MERCHANT");
    for tx in &recent.history {
        let merchant = tx
            .merchant_name
            .as_deref()
            .or(tx.merchant_id.as_deref())
            .unwrap_or("-");
        println!(
            "  {:<6}  {:<8}  {:>5}  {}",
            tx.time_label(),
            colored_decision(&tx.decision),
            tx.trust_score().round(),
            merchant
        );
    }
    println!();
    Ok(())
}
