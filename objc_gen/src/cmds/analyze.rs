/* Analyze command - report what the generators derive for each enum field */

use super::common::{load_pool, select_targets, InputArgs};
use anyhow::Context;
use objc_gen::codegen::{GenerationFacts, MessageGenerator};
use objc_gen::config::GeneratorConfig;
use serde_derive::Serialize;
use std::collections::{BTreeSet, HashSet};
use std::path::Path;

#[derive(Serialize)]
struct FieldReport<'g> {
  field: String,
  repeated: bool,
  variables: &'g GenerationFacts,
  forward_declarations: Vec<String>,
  needed_files: Vec<String>,
}

#[derive(Serialize)]
struct FileReport<'g> {
  file: String,
  fields: Vec<FieldReport<'g>>,
}

/* Execute the analyze command */
pub fn run(input: &InputArgs, config_path: Option<&Path>) -> anyhow::Result<()> {
  let config = GeneratorConfig::load(config_path).context("failed to load generator config")?;
  let options = config.into_options(None);

  let pool = load_pool(input)?;
  let targets = select_targets(&pool, &input.targets, &options.bundled_files)?;

  let mut generators = Vec::new();
  for file in &targets {
    let messages = file
      .all_messages()
      .into_iter()
      .map(|message| MessageGenerator::new(message, &options.bundled_files))
      .collect::<Result<Vec<_>, _>>()
      .with_context(|| format!("failed to analyze {}", file.name()))?;
    generators.push((file.name(), messages));
  }

  let reports: Vec<FileReport<'_>> = generators
    .iter()
    .map(|(file_name, messages)| FileReport {
      file: file_name.to_string(),
      fields: messages
        .iter()
        .flat_map(|message| message.field_generators())
        .map(|generator| {
          let mut fwd_decls = BTreeSet::new();
          generator.determine_forward_declarations(&mut fwd_decls, options.headers_use_forward_declarations);

          let mut deps = HashSet::new();
          generator.determine_needed_files(&mut deps);
          let mut needed_files: Vec<String> = deps.into_iter().map(|id| pool.file(id).name().to_string()).collect();
          needed_files.sort();

          FieldReport {
            field: generator.field().full_name(),
            repeated: generator.field().is_repeated(),
            variables: generator.variables(),
            forward_declarations: fwd_decls.into_iter().collect(),
            needed_files,
          }
        })
        .collect(),
    })
    .collect();

  println!("{}", serde_json::to_string_pretty(&reports)?);
  Ok(())
}
