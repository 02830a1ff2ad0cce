//! Miscellaneous commands: config, root-domain, normalize-id, completions

use clap::CommandFactory;
use clap_complete::{generate, Shell};
use colored::Colorize;
use std::io;

use merchant_lens::cli::{Cli, CompletionShell};
use merchant_lens::config::Config;
use merchant_lens::domain::extract_root_domain_with;
use merchant_lens::error::Result;
use merchant_lens::identifier::normalize_identifier;

/// Show current configuration
pub fn cmd_config_show() -> Result<()> {
    let config = Config::load()?;

    println!("\nConfiguration\n");
    println!("  Scoring service: {}", config.firewall_base_url.bold());
    println!(
        "  Timeouts:        score {}s, status {}s, investigate {}s",
        config.score_timeout_secs, config.status_timeout_secs, config.investigate_timeout_secs
    );
    println!(
        "  Copyright names: {}-{} chars (min {} after trim)",
        config.rules.copyright_min_chars,
        config.rules.copyright_max_chars,
        config.rules.copyright_min_name_chars
    );
    println!("  Compound SLDs:   {}", config.rules.compound_slds.join(", "));

    if let Ok(path) = Config::config_path() {
        println!("\n  Config file: {}", path.display());
    }
    Ok(())
}

/// Set the scoring service base URL
pub fn cmd_config_set_url(url: &str) -> Result<()> {
    let mut config = Config::load()?;
    config.set_base_url(url)?;
    config.save()?;
    println!("Scoring service set to {}", config.firewall_base_url.bold());
    Ok(())
}

/// Print the configuration file path
pub fn cmd_config_path() -> Result<()> {
    println!("{}", Config::config_path()?.display());
    Ok(())
}

/// Print the root label of each hostname
pub fn cmd_root_domain(hosts: &[String]) -> Result<()> {
    let config = Config::load()?;
    for host in hosts {
        println!("{}", extract_root_domain_with(host, &config.rules));
    }
    Ok(())
}

/// Print the merchant identifier
pub fn cmd_normalize_id(host: &str, name: Option<&str>) -> Result<()> {
    let id = normalize_identifier(name, host);
    if id.is_empty() {
        return Err(merchant_lens::LensError::NoIdentifier(host.to_string()));
    }
    println!("{}", id);
    Ok(())
}

/// Generate shell completions
pub fn cmd_completions(shell: CompletionShell) -> Result<()> {
    let mut cmd = Cli::command();
    let shell = match shell {
        CompletionShell::Bash => Shell::Bash,
        CompletionShell::Zsh => Shell::Zsh,
        CompletionShell::Fish => Shell::Fish,
        CompletionShell::Powershell => Shell::PowerShell,
    };
    generate(shell, &mut cmd, "merchant-lens", &mut io::stdout());
    Ok(())
}
