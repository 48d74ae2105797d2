/* Generators for singular and repeated enum fields */

use super::{common_field_variables, FieldGenerator, GenerationFacts};
use crate::codegen::names::{self, BundledFiles};
use crate::codegen::printer::{Printer, PrinterError};
use crate::descriptor::{Enum, Field, FileId};
use std::collections::{BTreeSet, HashSet};

/// Container used for every repeated enum field, whatever the element type.
pub const ENUM_ARRAY_STORAGE_TYPE: &str = "GPBEnumArray";

const RAW_VALUE_DECLARATIONS: &str = r#"
    /**
     * Fetches the raw value of a @c $owning_message_class$'s @c $name$ property, even
     * if the value was not defined by the enum at the time the code was generated.
     **/
    int32_t $owning_message_class$_$capitalized_name$_RawValue($owning_message_class$ *message);
    /**
     * Sets the raw value of an @c $owning_message_class$'s @c $name$ property, allowing
     * it to be set to a value that was not defined by the enum at the time the code
     * was generated.
     **/
    void Set$owning_message_class$_$capitalized_name$_RawValue($owning_message_class$ *message, int32_t value);
"#;

const RAW_VALUE_IMPLEMENTATIONS: &str = r#"
    int32_t $owning_message_class$_$capitalized_name$_RawValue($owning_message_class$ *message) {
      GPBDescriptor *descriptor = [$owning_message_class$ descriptor];
      GPBFieldDescriptor *field = [descriptor fieldWithNumber:$field_number_name$];
      return GPBGetMessageRawEnumField(message, field);
    }

    void Set$owning_message_class$_$capitalized_name$_RawValue($owning_message_class$ *message, int32_t value) {
      GPBDescriptor *descriptor = [$owning_message_class$ descriptor];
      GPBFieldDescriptor *field = [descriptor fieldWithNumber:$field_number_name$];
      GPBSetMessageRawEnumField(message, field, value);
    }
"#;

const ARRAY_COMMENT: &str = r#"
    // |$name$| contains |$storage_type$|
"#;

fn enum_variables(field: Field<'_>, enum_type: Enum<'_>) -> GenerationFacts {
    let mut facts = common_field_variables(field);
    let type_name = names::enum_name(enum_type);
    let enum_desc_func = format!("{}_EnumDescriptor", type_name);

    facts.insert("storage_type", type_name.clone());
    /* Enums from other files are only forward declared, so singular properties need the `enum NAME` spelling */
    if !field.is_repeated() && field.file() != enum_type.file() {
        facts.insert("property_type", format!("enum {}", type_name));
    }
    facts.insert("enum_verifier", format!("{}_IsValidValue", type_name));
    facts.insert("enum_desc_func", enum_desc_func.clone());
    facts.insert("dataTypeSpecific_name", "enumDescFunc");
    facts.insert("dataTypeSpecific_value", enum_desc_func);
    facts.insert("owning_message_class", names::class_name(field.containing_type()));
    facts
}

fn enum_file_dependency(field: Field<'_>, enum_type: Enum<'_>, deps: &mut HashSet<FileId>) {
    if field.file() != enum_type.file() {
        deps.insert(enum_type.file().id());
    }
}

/// Generator for a singular enum field.
///
/// Open enums additionally get a raw accessor pair so values unknown when the
/// code was generated can still be read and written.
pub struct EnumFieldGenerator<'a> {
    field: Field<'a>,
    enum_type: Enum<'a>,
    bundled_files: &'a BundledFiles,
    variables: GenerationFacts,
}

impl<'a> EnumFieldGenerator<'a> {
    /// # Panics
    ///
    /// If `field` is repeated or not enum typed; use `RepeatedEnumFieldGenerator`
    /// or `make_field_generator` instead.
    pub fn new(field: Field<'a>, bundled_files: &'a BundledFiles) -> Self {
        assert!(!field.is_repeated(), "'{}' is repeated; it needs a RepeatedEnumFieldGenerator", field.full_name());
        let Some(enum_type) = field.enum_type() else {
            panic!("'{}' is not an enum field", field.full_name());
        };

        Self {
            field,
            enum_type,
            bundled_files,
            variables: enum_variables(field, enum_type),
        }
    }

    pub fn enum_type(&self) -> Enum<'a> {
        self.enum_type
    }
}

impl FieldGenerator for EnumFieldGenerator<'_> {
    fn field(&self) -> Field<'_> {
        self.field
    }

    fn variables(&self) -> &GenerationFacts {
        &self.variables
    }

    fn generate_c_function_declarations(&self, printer: &mut Printer) -> Result<(), PrinterError> {
        /* Every value of a closed enum is reachable through the typed accessors */
        if self.enum_type.is_closed() {
            return Ok(());
        }

        printer.emit(&self.variables, RAW_VALUE_DECLARATIONS)?;
        printer.emit_raw("\n");
        Ok(())
    }

    fn generate_c_function_implementations(&self, printer: &mut Printer) -> Result<(), PrinterError> {
        if self.enum_type.is_closed() {
            return Ok(());
        }

        printer.emit(&self.variables, RAW_VALUE_IMPLEMENTATIONS)?;
        printer.emit_raw("\n");
        Ok(())
    }

    fn determine_forward_declarations(&self, fwd_decls: &mut BTreeSet<String>, include_external_types: bool) {
        // Enums from the same file are emitted before the messages using them.
        if include_external_types
            && self.field.file() != self.enum_type.file()
            && !self.bundled_files.contains(self.enum_type.file())
        {
            let name = self.variables.get("storage_type").unwrap_or_default();
            fwd_decls.insert(format!("GPB_ENUM_FWD_DECLARE({});", name));
        }
    }

    fn determine_needed_files(&self, deps: &mut HashSet<FileId>) {
        enum_file_dependency(self.field, self.enum_type, deps);
    }
}

/// Generator for a repeated enum field, stored in a `GPBEnumArray`.
pub struct RepeatedEnumFieldGenerator<'a> {
    field: Field<'a>,
    enum_type: Enum<'a>,
    variables: GenerationFacts,
}

impl<'a> RepeatedEnumFieldGenerator<'a> {
    /// # Panics
    ///
    /// If `field` is singular or not enum typed.
    pub fn new(field: Field<'a>) -> Self {
        assert!(field.is_repeated(), "'{}' is not repeated; it needs an EnumFieldGenerator", field.full_name());
        let Some(enum_type) = field.enum_type() else {
            panic!("'{}' is not an enum field", field.full_name());
        };

        let mut variables = enum_variables(field, enum_type);
        variables.insert("array_storage_type", ENUM_ARRAY_STORAGE_TYPE);

        Self { field, enum_type, variables }
    }

    pub fn enum_type(&self) -> Enum<'a> {
        self.enum_type
    }
}

// No forward declarations: GPBEnumArray is not generic, so the header never
// names the element enum.
impl FieldGenerator for RepeatedEnumFieldGenerator<'_> {
    fn field(&self) -> Field<'_> {
        self.field
    }

    fn variables(&self) -> &GenerationFacts {
        &self.variables
    }

    fn emit_array_comment(&self, printer: &mut Printer) -> Result<(), PrinterError> {
        printer.emit(&self.variables, ARRAY_COMMENT)
    }

    fn determine_needed_files(&self, deps: &mut HashSet<FileId>) {
        enum_file_dependency(self.field, self.enum_type, deps);
    }
}
