//! Duckie - ad-hoc SELECT queries against CSV files, in the browser.
//!
//! This library exposes the core modules for use in integration tests.

pub mod analyzer;
pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod query;
pub mod web;
