use thiserror::Error;

#[derive(Error, Debug)]
pub enum LensError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] ureq::Error),

    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("URL parse error: {0}")]
    UrlParseError(#[from] url::ParseError),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Scoring service returned HTTP {status} for {endpoint}")]
    ServiceError { endpoint: String, status: u16 },

    #[error("No usable merchant identifier for host '{0}'")]
    NoIdentifier(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
}

impl LensError {
    /// Get an actionable hint for how to resolve this error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            LensError::HttpError(_) => Some(
                "Is the scoring service running? Check with:\n  merchant-lens status"
            ),
            LensError::ServiceError { .. } => Some(
                "The scoring service rejected the request. Point at another instance with:\n  merchant-lens config set-url <URL>"
            ),
            LensError::NoIdentifier(_) => Some(
                "Pass a merchant identifier explicitly: merchant-lens score <page> --merchant-id <ID>"
            ),
            LensError::TomlError(_) | LensError::ConfigError(_) => Some(
                "Check your configuration file, see `merchant-lens config path`"
            ),
            LensError::InvalidAmount(_) => Some(
                "Amounts use a dot as decimal separator, e.g. --amount 49.99"
            ),
            _ => None,
        }
    }
}

/// Reasons a single extraction step produced nothing.
///
/// These never leave the pipeline: each step's failure is logged and the
/// chain moves on to the next source.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    #[error("structured data block {index} is not valid JSON: {message}")]
    StructuredDataParse { index: usize, message: String },

    #[error("{0} not present")]
    SourceAbsent(&'static str),

    #[error("numeric run '{0}' is not a finite number")]
    NumericParse(String),
}

pub type Result<T> = std::result::Result<T, LensError>;
