use clap::{Args, Parser, Subcommand, ValueEnum};

/// Shell types for completion generation
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum CompletionShell {
    Bash,
    Zsh,
    Fish,
    Powershell,
}

#[derive(Parser)]
#[command(name = "merchant-lens")]
#[command(author, version, about = "Find the merchant, amount and currency on a checkout page", long_about = None)]
#[command(after_help = r#"Examples:
  merchant-lens extract https://shop.example.com/checkout     Extract from a live page
  merchant-lens extract page.html --url https://acme.co.uk    Extract from a saved page
  merchant-lens score page.html --url https://acme.co.uk      Score the transaction
  merchant-lens status                                        Check the scoring service
"#)]
pub struct Cli {
    /// Log extraction steps to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Where to read the page from
#[derive(Args, Debug, Clone)]
pub struct PageArgs {
    /// HTML file, `-` for stdin, or an http(s) URL to fetch
    #[arg(value_name = "SOURCE")]
    pub source: String,

    /// Page URL (sets the hostname when reading a file or stdin)
    #[arg(long)]
    pub url: Option<String>,

    /// Treat the input as a JSON page snapshot instead of HTML
    #[arg(long)]
    pub snapshot: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Extract merchant, amount and currency from a page
    #[command(after_help = r#"Examples:
  merchant-lens extract https://open.spotify.com/premium
  merchant-lens extract saved.html --url https://www.netflix.com/signup
  curl -s https://example.com | merchant-lens extract - --url https://example.com
  merchant-lens extract snapshot.json --snapshot --json
"#)]
    Extract {
        #[command(flatten)]
        page: PageArgs,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Extract from a page and submit the transaction for scoring
    Score {
        #[command(flatten)]
        page: PageArgs,

        /// Override the merchant identifier
        #[arg(long)]
        merchant_id: Option<String>,

        /// Override the merchant name
        #[arg(long)]
        merchant_name: Option<String>,

        /// Override the amount (e.g. 49.99)
        #[arg(long)]
        amount: Option<String>,

        /// Override the currency code
        #[arg(long)]
        currency: Option<String>,

        /// Also request an investigation of the scored transaction
        #[arg(long)]
        investigate: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check that the scoring service is reachable
    Status,

    /// Show recently scored transactions
    History {
        /// Number of transactions (1-50)
        #[arg(long, short = 'n', default_value = "10")]
        limit: usize,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Manage configuration
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Print the root label of hostnames (e.g. www.example.co.uk -> example)
    RootDomain {
        #[arg(required = true)]
        hosts: Vec<String>,
    },

    /// Print the merchant identifier for a name and/or hostname
    NormalizeId {
        /// Hostname used when no name is given
        host: String,

        /// Merchant name
        #[arg(long)]
        name: Option<String>,
    },

    /// Generate shell completions
    Completions {
        /// Shell type
        #[arg(value_enum)]
        shell: CompletionShell,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Set the scoring service base URL
    SetUrl {
        /// e.g. http://localhost:8000
        url: String,
    },

    /// Print the configuration file path
    Path,
}
