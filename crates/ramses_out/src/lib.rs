//! Ramses Out - Review Delivery Library
//!
//! Core functionality for finding rendered previews in a Ramses pipeline
//! project, classifying their send-status, collecting review packages and
//! tracking deliveries. The binary in this crate puts a CLI on top; other
//! front-ends can embed the [`review`] module directly.

pub mod config;
pub mod review;

pub use config::OutConfig;
pub use review::{
    CollectCancelToken, CollectionResult, Collector, HistoryLog, Marker, PreviewRecord,
    ReviewError, ScanOutcome, Scanner, SendStatus, Tracker,
};
