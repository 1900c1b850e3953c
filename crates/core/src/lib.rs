//! Core traits and types for the onboarding assistant
//!
//! This crate provides foundational types used across all other crates:
//! - Chat modes and the reconciliation result contract
//! - The embedding provider trait (pluggable backend)
//! - Error types

pub mod error;
pub mod traits;
pub mod types;

pub use error::{Error, Result};
pub use traits::EmbeddingProvider;
pub use types::{ChatMode, ChecklistItem, ReconciliationResult};
