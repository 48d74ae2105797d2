/* Codegen command - generate Objective-C sources for schema files */

use super::common::{load_pool, select_targets, InputArgs};
use anyhow::Context;
use objc_gen::codegen::ObjcCodeGenerator;
use objc_gen::config::GeneratorConfig;
use std::path::{Path, PathBuf};
use tracing::info;

/* Execute the codegen command */
pub fn run(input: &InputArgs, output_dir: Option<PathBuf>, config_path: Option<&Path>) -> anyhow::Result<()> {
  let config = GeneratorConfig::load(config_path).context("failed to load generator config")?;
  let options = config.into_options(output_dir);
  info!(
    output_dir = %options.output_dir.display(),
    forward_declarations = options.headers_use_forward_declarations,
    "generator configured"
  );

  let pool = load_pool(input)?;
  let targets = select_targets(&pool, &input.targets, &options.bundled_files)?;
  let generator = ObjcCodeGenerator::new(&pool, &options);

  for file in targets {
    let generated = generator.emit_code(file).with_context(|| format!("failed to generate {}", file.name()))?;
    println!(
      "[✓] {} -> {}, {}",
      generated.source_file,
      options.output_dir.join(&generated.header_path).display(),
      options.output_dir.join(&generated.implementation_path).display()
    );
  }

  Ok(())
}
