//! Cross-module tests.
//!
//! - `determinism.rs`: identical inputs give identical states, and neutral
//!   turns only move money
//! - `integration.rs`: end-to-end scenarios through the engines
//! - `helpers.rs`: setup utilities shared by both

mod helpers;

pub use helpers::*;
