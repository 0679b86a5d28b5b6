//! Integration tests for Duckie.

pub mod http_test;
pub mod pipeline_test;
