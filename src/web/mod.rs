//! HTTP surface for Duckie.
//!
//! Serves the query page on `/` and `/query`, and adapts pipeline outcomes
//! into a page model rendered as HTML or JSON.

pub mod handlers;
pub mod page;
pub mod render;
pub mod server;

pub use page::PageModel;
pub use server::{router, HttpServer};
