//! Schema Type Definitions
//!
//! This crate contains the data model for protocol buffer schema files as
//! consumed by the Objective-C generator. It provides pure data structures
//! without any descriptor resolution or code generation logic.

pub mod types;

// Re-export commonly used types at the crate root
pub use types::*;
