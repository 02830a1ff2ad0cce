pub mod amount;
pub mod chain;
pub mod cli;
pub mod client;
pub mod config;
pub mod domain;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod identifier;
pub mod merchant;
pub mod rules;
pub mod snapshot;

pub use domain::extract_root_domain;
pub use error::{LensError, Result};
pub use extract::{extract, ExtractionResult, Extractor};
pub use identifier::normalize_identifier;
pub use snapshot::PageSnapshot;
