//! # Application Layer
//!
//! Use cases coordinating the domain with the store, the relay and the upstream model.

pub mod interfaces;
pub mod use_cases;

pub use interfaces::*;
pub use use_cases::*;
