//! Query pipeline for Duckie.
//!
//! This module isolates per-request validation, column resolution, and
//! execution from the HTTP layer.

pub mod service;

pub use service::{QueryOutcome, QueryService, CHOOSE_SOURCE_PROMPT};
