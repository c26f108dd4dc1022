//! Sleuth Engine - inference-and-aggregation core for mailsleuth.
//!
//! Turns raw, partial signals from many independent lookups into one
//! coherent, confidence-scored report. The pipeline:
//!
//! email -> pattern extractor (sync) + probe scheduler (async fan-out)
//!       -> evidence aggregator -> confidence scorer -> report assembler
//!
//! Network I/O lives behind the [`probe::SourceProbe`] trait; everything
//! else is pure and deterministic.

pub mod aggregate;
pub mod engine;
pub mod extractor;
pub mod probe;
pub mod probes;
pub mod report;
pub mod reputation;
pub mod scheduler;
pub mod score;

pub use engine::Engine;
pub use probe::SourceProbe;
pub use scheduler::{cancel_pair, CancelHandle, CancelToken, ProbeScheduler};
