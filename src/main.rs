//! merchant-lens - Checkout page extraction and transaction scoring CLI

use clap::Parser;
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use merchant_lens::cli::{Cli, Commands, ConfigCommands};
use merchant_lens::error::Result;

mod commands;

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("{} {}", "Error:".red(), e);
        if let Some(hint) = e.hint() {
            eprintln!("\n{}", hint.dimmed());
        }
        std::process::exit(1);
    }
}

/// RUST_LOG wins; otherwise warnings only, or our debug output with --verbose
fn init_logging(verbose: bool) {
    let default = if verbose { "merchant_lens=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Extract { page, json } => commands::cmd_extract(&page, json, cli.verbose),

        Commands::Score {
            page,
            merchant_id,
            merchant_name,
            amount,
            currency,
            investigate,
            json,
        } => commands::cmd_score(
            &page,
            commands::Overrides {
                merchant_id,
                merchant_name,
                amount,
                currency,
            },
            investigate,
            json,
        ),

        Commands::Status => commands::cmd_status(),
        Commands::History { limit, json } => commands::cmd_history(limit, json),

        Commands::Config(ConfigCommands::Show) => commands::cmd_config_show(),
        Commands::Config(ConfigCommands::SetUrl { url }) => commands::cmd_config_set_url(&url),
        Commands::Config(ConfigCommands::Path) => commands::cmd_config_path(),

        Commands::RootDomain { hosts } => commands::cmd_root_domain(&hosts),
        Commands::NormalizeId { host, name } => commands::cmd_normalize_id(&host, name.as_deref()),
        Commands::Completions { shell } => commands::cmd_completions(shell),
    }
}
