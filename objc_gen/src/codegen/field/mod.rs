pub mod enum_field;

pub use enum_field::{EnumFieldGenerator, RepeatedEnumFieldGenerator};

use crate::codegen::names::{self, BundledFiles};
use crate::codegen::printer::{Printer, PrinterError};
use crate::descriptor::{Field, FieldKind, FileId};
use crate::error::GenerateError;
use indexmap::IndexMap;
use serde_derive::Serialize;
use std::collections::{BTreeSet, HashSet};

/// Variables derived for one field, keyed by the placeholder names used in
/// emission templates. Filled in while a generator is constructed and
/// read-only afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct GenerationFacts {
    vars: IndexMap<&'static str, String>,
}

impl GenerationFacts {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&mut self, key: &'static str, value: impl Into<String>) {
        self.vars.insert(key, value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.vars.contains_key(key)
    }

    /// The type spelled in property declarations. Generators only record
    /// `property_type` when it differs from `storage_type`.
    pub fn property_type(&self) -> Option<&str> {
        self.get("property_type").or_else(|| self.get("storage_type"))
    }
}

/// Code generation rule for one field of a message.
///
/// The default methods are the base behavior shared by every field kind:
/// nothing to emit, nothing to forward declare, no file dependencies.
/// Field kinds override only what they contribute.
pub trait FieldGenerator {
    fn field(&self) -> Field<'_>;

    fn variables(&self) -> &GenerationFacts;

    fn variable(&self, key: &str) -> Option<&str> {
        self.variables().get(key)
    }

    /* C functions declared in the header after the message's class */
    fn generate_c_function_declarations(&self, _printer: &mut Printer) -> Result<(), PrinterError> {
        Ok(())
    }

    /* Bodies for the functions declared above */
    fn generate_c_function_implementations(&self, _printer: &mut Printer) -> Result<(), PrinterError> {
        Ok(())
    }

    /// Note on a repeated field's property describing the element type.
    fn emit_array_comment(&self, _printer: &mut Printer) -> Result<(), PrinterError> {
        Ok(())
    }

    fn determine_forward_declarations(&self, _fwd_decls: &mut BTreeSet<String>, _include_external_types: bool) {}

    fn determine_needed_files(&self, _deps: &mut HashSet<FileId>) {}
}

/// Variables every field generator starts from.
pub fn common_field_variables(field: Field<'_>) -> GenerationFacts {
    let classname = names::class_name(field.containing_type());
    let capitalized_name = names::field_name_capitalized(field);

    let mut facts = GenerationFacts::new();
    facts.insert("field_number_name", format!("{}_FieldNumber_{}", classname, capitalized_name));
    facts.insert("classname", classname);
    facts.insert("name", names::field_name(field));
    facts.insert("capitalized_name", capitalized_name);
    facts.insert("raw_field_name", field.name());
    facts.insert("field_number", field.number().to_string());
    facts
}

/// Pick the generator for a field.
///
/// Only enum fields have generators; other kinds are reported as
/// `GenerateError::UnsupportedField` so callers can skip them.
pub fn make_field_generator<'a>(
    field: Field<'a>,
    bundled_files: &'a BundledFiles,
) -> Result<Box<dyn FieldGenerator + 'a>, GenerateError> {
    match field.kind() {
        FieldKind::Enum(_) if field.is_repeated() => Ok(Box::new(RepeatedEnumFieldGenerator::new(field))),
        FieldKind::Enum(_) => Ok(Box::new(EnumFieldGenerator::new(field, bundled_files))),
        FieldKind::Scalar(_) => Err(GenerateError::UnsupportedField { field: field.full_name(), kind: "scalar" }),
        FieldKind::Message(_) => Err(GenerateError::UnsupportedField { field: field.full_name(), kind: "message" }),
    }
}
