//! Error types for the price rewriting engine.

use rust_decimal::Decimal;
use thiserror::Error;

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("No conversion rate available yet")]
    MissingRate,

    #[error("Invalid conversion rate: {0}")]
    InvalidRate(Decimal),

    #[error("Decimals must be between 0 and {max}, got {got}")]
    DecimalsOutOfRange { got: u32, max: u32 },

    #[error("Malformed preferences message: {0}")]
    Preferences(#[from] serde_json::Error),

    #[error("Document is unavailable: {0}")]
    DocumentUnavailable(String),
}
