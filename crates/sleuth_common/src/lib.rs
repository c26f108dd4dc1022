//! Sleuth Common - Shared types and schemas for mailsleuth.
//!
//! Everything here is evidence-shaped data: candidates, source results,
//! aggregated records, reports. No I/O, no scheduling.

pub mod config;
pub mod error;
pub mod types;

pub use config::*;
pub use error::*;
pub use types::*;
