//! Command implementations for merchant-lens CLI

mod extract;
mod misc;
mod service;

pub use extract::*;
pub use misc::*;
pub use service::*;
