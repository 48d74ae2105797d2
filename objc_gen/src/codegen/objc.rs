use crate::codegen::message::MessageGenerator;
use crate::codegen::names::{self, BundledFiles};
use crate::codegen::printer::Printer;
use crate::descriptor::{DescriptorPool, File};
use crate::error::GenerateError;
use std::collections::{BTreeSet, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const DEFAULT_OUTPUT_DIR: &str = "generated";

const GENERATED_BANNER: &str = "// Generated by the protocol buffer compiler.  DO NOT EDIT!\n";

pub struct ObjcCodeGeneratorOptions {
    pub output_dir: PathBuf,
    /// Forward declare cross-file enums in headers and import their headers
    /// from the implementation file only. When false, headers import every
    /// needed file directly.
    pub headers_use_forward_declarations: bool,
    pub bundled_files: BundledFiles,
}

impl Default for ObjcCodeGeneratorOptions {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            headers_use_forward_declarations: true,
            bundled_files: BundledFiles::well_known(),
        }
    }
}

/// Header and implementation text generated for one schema file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    pub source_file: String,
    pub header_path: String,
    pub header: String,
    pub implementation_path: String,
    pub implementation: String,
    pub forward_declarations: Vec<String>,
    /// Schema files whose generated headers this file imports, sorted by name.
    pub needed_files: Vec<String>,
}

pub struct ObjcCodeGenerator<'a> {
    pool: &'a DescriptorPool,
    options: &'a ObjcCodeGeneratorOptions,
}

fn import_line(file: File<'_>) -> String {
    format!("#import \"{}.pbobjc.h\"\n", names::file_path(file))
}

impl<'a> ObjcCodeGenerator<'a> {
    pub fn new(pool: &'a DescriptorPool, options: &'a ObjcCodeGeneratorOptions) -> Self {
        Self { pool, options }
    }

    pub fn generate_by_name(&self, file_name: &str) -> Result<GeneratedFile, GenerateError> {
        let file = self
            .pool
            .file_by_name(file_name)
            .ok_or_else(|| GenerateError::UnknownFile(file_name.to_string()))?;
        self.generate_file(file)
    }

    pub fn generate_file(&self, file: File<'a>) -> Result<GeneratedFile, GenerateError> {
        debug!(file = file.name(), "generating Objective-C sources");
        let options = self.options;

        let messages = file
            .all_messages()
            .into_iter()
            .map(|message| MessageGenerator::new(message, &options.bundled_files))
            .collect::<Result<Vec<_>, _>>()?;

        let mut fwd_decls = BTreeSet::new();
        let mut deps = HashSet::new();
        for message in &messages {
            message.determine_forward_declarations(&mut fwd_decls, options.headers_use_forward_declarations);
            message.determine_needed_files(&mut deps);
        }

        let mut needed: Vec<File<'a>> = deps.into_iter().map(|id| self.pool.file(id)).collect();
        needed.sort_by_key(|dep| dep.name());
        debug!(
            file = file.name(),
            forward_declarations = fwd_decls.len(),
            needed_files = needed.len(),
            "resolved file coupling"
        );

        let base_path = names::file_path(file);
        let header_path = format!("{}.pbobjc.h", base_path);
        let implementation_path = format!("{}.pbobjc.m", base_path);

        /* Header: either forward declarations or direct imports of the needed files */
        let mut header = Printer::new();
        header.emit_raw(GENERATED_BANNER);
        header.emit_raw(&format!("// source: {}\n\n", file.name()));
        header.emit_raw("#import \"GPBDescriptor.h\"\n");
        header.emit_raw("#import \"GPBMessage.h\"\n");
        header.emit_raw("#import \"GPBRootObject.h\"\n");
        if !options.headers_use_forward_declarations {
            for dep in &needed {
                header.emit_raw(&import_line(*dep));
            }
        }
        header.emit_raw("\nCF_EXTERN_C_BEGIN\n\n");
        for decl in &fwd_decls {
            header.emit_raw(decl);
            header.emit_raw("\n");
        }
        if !fwd_decls.is_empty() {
            header.emit_raw("\n");
        }
        for message in &messages {
            message.generate_header_section(&mut header)?;
        }
        header.emit_raw("CF_EXTERN_C_END\n");

        /* Implementation: imports whatever the header only forward declared */
        let mut implementation = Printer::new();
        implementation.emit_raw(GENERATED_BANNER);
        implementation.emit_raw(&format!("// source: {}\n\n", file.name()));
        implementation.emit_raw("#import \"GPBProtocolBuffers_RuntimeSupport.h\"\n");
        implementation.emit_raw(&import_line(file));
        if options.headers_use_forward_declarations {
            for dep in &needed {
                implementation.emit_raw(&import_line(*dep));
            }
        }
        implementation.emit_raw("\n");
        for message in &messages {
            message.generate_source_section(&mut implementation)?;
        }

        Ok(GeneratedFile {
            source_file: file.name().to_string(),
            header_path,
            header: header.into_output(),
            implementation_path,
            implementation: implementation.into_output(),
            forward_declarations: fwd_decls.into_iter().collect(),
            needed_files: needed.iter().map(|dep| dep.name().to_string()).collect(),
        })
    }

    /// Write both generated files under the configured output directory.
    pub fn write_file(&self, generated: &GeneratedFile) -> Result<(), GenerateError> {
        write_output(&self.options.output_dir.join(&generated.header_path), &generated.header)?;
        write_output(&self.options.output_dir.join(&generated.implementation_path), &generated.implementation)?;
        info!(
            source = %generated.source_file,
            header = %generated.header_path,
            implementation = %generated.implementation_path,
            "wrote generated files"
        );
        Ok(())
    }

    pub fn emit_code(&self, file: File<'a>) -> Result<GeneratedFile, GenerateError> {
        let generated = self.generate_file(file)?;
        self.write_file(&generated)?;
        Ok(generated)
    }
}

fn write_output(path: &Path, contents: &str) -> Result<(), GenerateError> {
    let io_error = |source| GenerateError::Io { path: path.to_path_buf(), source };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(io_error)?;
    }
    fs::write(path, contents).map_err(io_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use objc_types::SchemaSet;

    fn pool() -> DescriptorPool {
        let set: SchemaSet = serde_yml::from_str(
            r#"
files:
  - name: "demo/colors.proto"
    package: "demo"
    syntax: proto3
    enums:
      - name: "Color"
  - name: "demo/widget.proto"
    package: "demo"
    syntax: proto3
    dependencies: ["demo/colors.proto"]
    messages:
      - name: "Widget"
        fields:
          - name: "color"
            number: 1
            field-type: { enum: "Color" }
"#,
        )
        .unwrap();
        DescriptorPool::build(set.files).unwrap()
    }

    #[test]
    fn test_forward_declared_header_imports_from_implementation() {
        let pool = pool();
        let options = ObjcCodeGeneratorOptions::default();
        let generated = ObjcCodeGenerator::new(&pool, &options).generate_by_name("demo/widget.proto").unwrap();

        assert_eq!(generated.header_path, "demo/Widget.pbobjc.h");
        assert_eq!(generated.implementation_path, "demo/Widget.pbobjc.m");
        assert_eq!(generated.forward_declarations, vec!["GPB_ENUM_FWD_DECLARE(Color);".to_string()]);
        assert_eq!(generated.needed_files, vec!["demo/colors.proto".to_string()]);

        assert!(generated.header.contains("CF_EXTERN_C_BEGIN\n\nGPB_ENUM_FWD_DECLARE(Color);\n\n#pragma mark - Widget\n"));
        assert!(!generated.header.contains("Colors.pbobjc.h"));
        assert!(generated.implementation.contains("#import \"demo/Widget.pbobjc.h\"\n#import \"demo/Colors.pbobjc.h\"\n"));
    }

    #[test]
    fn test_header_imports_when_not_forward_declaring() {
        let pool = pool();
        let options = ObjcCodeGeneratorOptions {
            headers_use_forward_declarations: false,
            ..Default::default()
        };
        let generated = ObjcCodeGenerator::new(&pool, &options).generate_by_name("demo/widget.proto").unwrap();

        assert!(generated.forward_declarations.is_empty());
        assert!(generated.header.contains("#import \"demo/Colors.pbobjc.h\"\n"));
        assert!(!generated.implementation.contains("Colors.pbobjc.h"));
    }

    #[test]
    fn test_unknown_file() {
        let pool = pool();
        let options = ObjcCodeGeneratorOptions::default();
        let err = ObjcCodeGenerator::new(&pool, &options).generate_by_name("missing.proto").unwrap_err();
        assert!(matches!(err, GenerateError::UnknownFile(name) if name == "missing.proto"));
    }
}
