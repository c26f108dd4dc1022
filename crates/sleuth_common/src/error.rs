//! Error types for mailsleuth.
//!
//! Probe failures are never errors: they are downgraded to `SourceResult`
//! records at the scheduler boundary. Only the two fail-fast cases below
//! abort a whole investigation.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SleuthError {
    /// Malformed email address. Raised before anything is scheduled.
    #[error("invalid email address: {0}")]
    Validation(String),

    /// Scoring or extractor weights missing or out of range. Raised at
    /// configuration time, before any run starts.
    #[error("scoring configuration error: {0}")]
    ScoringConfig(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),
}
