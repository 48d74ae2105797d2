use crate::codegen::printer::PrinterError;
use crate::descriptor::{DescriptorSetError, ResolutionError};
use std::path::PathBuf;
use thiserror::Error;

/// Errors produced while loading schemas and generating code.
#[derive(Debug, Error)]
pub enum GenerateError {
    /// Schema files could not be resolved into a descriptor pool.
    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    /// A binary descriptor set could not be decoded.
    #[error(transparent)]
    DescriptorSet(#[from] DescriptorSetError),

    /// The field kind has no generator; callers usually skip these fields.
    #[error("field '{field}' has no generator for {kind} fields")]
    UnsupportedField { field: String, kind: &'static str },

    /// A template referenced a variable its generator never derived.
    #[error("failed to emit code for '{field}': {source}")]
    Emit {
        field: String,
        #[source]
        source: PrinterError,
    },

    #[error("schema file '{0}' is not loaded")]
    UnknownFile(String),

    #[error("failed to write '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
