//! Data models
//!
//! Read-only inputs to receipt rendering. The printing subsystem never
//! mutates a sale.

pub mod product;
pub mod sale;

// Re-exports
pub use product::*;
pub use sale::*;
