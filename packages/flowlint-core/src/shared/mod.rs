//! Shared module - Common types and utilities
//!
//! Types shared across all feature slices. Zero knowledge of any
//! concrete analysis.

pub mod models;

pub use models::*;
