//! Shared types for the point-of-sale workspace
//!
//! Finalized sale records handed to the printing subsystem by the
//! surrounding application.

pub mod models;

// Re-exports
pub use serde::{Deserialize, Serialize};
