//! Configuration for the Objective-C generator

use crate::codegen::names::BundledFiles;
use crate::codegen::objc::{ObjcCodeGeneratorOptions, DEFAULT_OUTPUT_DIR};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("failed to read config '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Invalid config format
    #[error("invalid config format: {0}")]
    InvalidFormat(#[from] serde_yml::Error),

    /// Extra bundled entries must name schema files
    #[error("bundled file '{0}' is not a .proto file")]
    InvalidBundledFile(String),
}

/// Generator settings, usually read from a YAML file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct GeneratorConfig {
    /// Forward declare cross-file enums in headers instead of importing their headers
    pub headers_use_forward_declarations: bool,

    /// Schema files treated as shipped with the runtime, on top of the well-known types
    pub extra_bundled_files: Vec<String>,

    /// Output directory used when none is given on the command line
    pub output_dir: Option<PathBuf>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            headers_use_forward_declarations: true,
            extra_bundled_files: Vec::new(),
            output_dir: None,
        }
    }
}

impl GeneratorConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: GeneratorConfig = serde_yml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config file; a missing path means defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(bad) = self.extra_bundled_files.iter().find(|name| !name.ends_with(".proto")) {
            return Err(ConfigError::InvalidBundledFile(bad.clone()));
        }
        Ok(())
    }

    /// Build generator options; `output_dir` from the command line wins over the config.
    pub fn into_options(self, output_dir: Option<PathBuf>) -> ObjcCodeGeneratorOptions {
        ObjcCodeGeneratorOptions {
            output_dir: output_dir
                .or(self.output_dir)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR)),
            headers_use_forward_declarations: self.headers_use_forward_declarations,
            bundled_files: BundledFiles::well_known().with_files(self.extra_bundled_files),
        }
    }
}
