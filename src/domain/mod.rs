//! # Domain Layer
//!
//! Chat messages, cases, profiles and the advisory payload.
//! This layer is independent of the relay transport and the store backend.

mod error;
pub mod models;

pub use error::*;
pub use models::*;
