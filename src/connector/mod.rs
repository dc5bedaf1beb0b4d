//! # Connector Layer
//!
//! External integrations implementing application interfaces:
//! - Stores (DuckDB, in-memory) with live message subscriptions
//! - Upstream LLM client (OpenRouter) and relay clients
//! - The relay HTTP server and the CLI dispatch

pub mod adapter;
pub mod api;
pub mod http;

pub use adapter::*;
