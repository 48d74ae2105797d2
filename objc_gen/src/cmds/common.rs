/* Input handling shared between the codegen and analyze commands */

use anyhow::Context;
use clap::Args;
use objc_gen::codegen::BundledFiles;
use objc_gen::descriptor::{decode_descriptor_set, DescriptorPool, File};
use objc_types::{SchemaFile, SchemaSet};
use std::path::PathBuf;
use tracing::{debug, info};

#[derive(Args, Debug)]
pub struct InputArgs {
  /// YAML schema files (a `files:` list of schema definitions)
  #[arg(short = 'f', long = "files", value_name = "FILE")]
  pub files: Vec<PathBuf>,

  /// Binary FileDescriptorSet files (protoc --descriptor_set_out --include_imports)
  #[arg(short = 'd', long = "descriptor-set", value_name = "FILE")]
  pub descriptor_sets: Vec<PathBuf>,

  /// Schema files to generate; defaults to every loaded file not bundled with the runtime
  #[arg(short = 't', long = "target", value_name = "PROTO")]
  pub targets: Vec<String>,
}

/* Load every input into one descriptor pool */
pub fn load_pool(input: &InputArgs) -> anyhow::Result<DescriptorPool> {
  if input.files.is_empty() && input.descriptor_sets.is_empty() {
    anyhow::bail!("no input: pass --files and/or --descriptor-set");
  }

  let mut schema_files: Vec<SchemaFile> = Vec::new();

  for path in &input.files {
    let content = std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    let set: SchemaSet =
      serde_yml::from_str(&content).with_context(|| format!("failed to parse YAML in {}", path.display()))?;
    debug!(path = %path.display(), files = set.files.len(), "loaded schema YAML");
    schema_files.extend(set.files);
  }

  for path in &input.descriptor_sets {
    let bytes = std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let files = decode_descriptor_set(&bytes).with_context(|| format!("failed to load {}", path.display()))?;
    debug!(path = %path.display(), files = files.len(), "loaded descriptor set");
    schema_files.extend(files);
  }

  let pool = DescriptorPool::build(schema_files).context("failed to resolve schema files")?;
  info!(files = pool.files().count(), "descriptor pool ready");
  Ok(pool)
}

/* Files named with --target, or every non-bundled file */
pub fn select_targets<'a>(
  pool: &'a DescriptorPool,
  targets: &[String],
  bundled_files: &BundledFiles,
) -> anyhow::Result<Vec<File<'a>>> {
  if targets.is_empty() {
    return Ok(pool.files().filter(|file| !bundled_files.contains(*file)).collect());
  }

  targets
    .iter()
    .map(|name| pool.file_by_name(name).with_context(|| format!("target '{}' is not among the loaded schema files", name)))
    .collect()
}
