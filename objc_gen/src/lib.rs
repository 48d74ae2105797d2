//! Objective-C code generation for protocol buffer enum fields.
//!
//! Schema files are loaded into a [`descriptor::DescriptorPool`], then each
//! enum field gets a [`codegen::FieldGenerator`] that derives its naming facts,
//! forward declarations and file dependencies, and emits raw value accessors
//! for open enums.

pub mod codegen;
pub mod config;
pub mod descriptor;
pub mod error;

pub use error::GenerateError;
