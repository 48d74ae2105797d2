use crate::codegen::field::{make_field_generator, FieldGenerator};
use crate::codegen::names::{self, BundledFiles};
use crate::codegen::printer::{Printer, PrinterError};
use crate::descriptor::{FileId, Message};
use crate::error::GenerateError;
use std::collections::{BTreeSet, HashSet};
use tracing::trace;

/// Drives the field generators of one message, in field declaration order.
pub struct MessageGenerator<'a> {
    class_name: String,
    field_generators: Vec<Box<dyn FieldGenerator + 'a>>,
}

fn emit_error(generator: &dyn FieldGenerator, source: PrinterError) -> GenerateError {
    GenerateError::Emit {
        field: generator.field().full_name(),
        source,
    }
}

impl<'a> MessageGenerator<'a> {
    pub fn new(message: Message<'a>, bundled_files: &'a BundledFiles) -> Result<Self, GenerateError> {
        let mut field_generators = Vec::new();
        for field in message.fields() {
            match make_field_generator(field, bundled_files) {
                Ok(generator) => field_generators.push(generator),
                Err(GenerateError::UnsupportedField { field, kind }) => {
                    trace!(%field, kind, "no generator for field, skipping");
                }
                Err(err) => return Err(err),
            }
        }

        Ok(Self {
            class_name: names::class_name(message),
            field_generators,
        })
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    pub fn field_generators(&self) -> &[Box<dyn FieldGenerator + 'a>] {
        &self.field_generators
    }

    pub fn determine_forward_declarations(&self, fwd_decls: &mut BTreeSet<String>, include_external_types: bool) {
        for generator in &self.field_generators {
            generator.determine_forward_declarations(fwd_decls, include_external_types);
        }
    }

    pub fn determine_needed_files(&self, deps: &mut HashSet<FileId>) {
        for generator in &self.field_generators {
            generator.determine_needed_files(deps);
        }
    }

    /* Array comments and C function declarations; nothing at all when no field contributes */
    pub fn generate_header_section(&self, printer: &mut Printer) -> Result<(), GenerateError> {
        let mut comments = Printer::new();
        let mut declarations = Printer::new();
        for generator in &self.field_generators {
            let generator = generator.as_ref();
            generator
                .emit_array_comment(&mut comments)
                .map_err(|err| emit_error(generator, err))?;
            generator
                .generate_c_function_declarations(&mut declarations)
                .map_err(|err| emit_error(generator, err))?;
        }

        if comments.is_empty() && declarations.is_empty() {
            return Ok(());
        }

        printer.emit_raw(&format!("#pragma mark - {}\n\n", self.class_name));
        if !comments.is_empty() {
            printer.emit_raw(comments.output());
            printer.emit_raw("\n");
        }
        printer.emit_raw(declarations.output());
        Ok(())
    }

    pub fn generate_source_section(&self, printer: &mut Printer) -> Result<(), GenerateError> {
        let mut implementations = Printer::new();
        for generator in &self.field_generators {
            let generator = generator.as_ref();
            generator
                .generate_c_function_implementations(&mut implementations)
                .map_err(|err| emit_error(generator, err))?;
        }

        if implementations.is_empty() {
            return Ok(());
        }

        printer.emit_raw(&format!("#pragma mark - {}\n\n", self.class_name));
        printer.emit_raw(implementations.output());
        Ok(())
    }
}
