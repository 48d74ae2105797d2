/* Objective-C identifier derivation for schema descriptors */

use crate::descriptor::{Enum, Field, File, Message};
use std::collections::BTreeSet;

/* Segments spelled fully upper-case when they appear inside an identifier */
const UPPER_SEGMENTS: &[&str] = &["url", "http", "https"];

/* Names that would collide with C/Objective-C keywords, runtime types or NSObject members */
const RESERVED_WORDS: &[&str] = &[
    "BOOL", "Class", "FALSE", "IMP", "NO", "NSObject", "NULL", "Nil", "Protocol", "SEL", "TRUE", "YES",
    "alloc", "auto", "autorelease", "bool", "break", "case", "char", "class", "const", "continue", "copy",
    "dealloc", "default", "delete", "description", "do", "double", "else", "enum", "extern", "float", "for",
    "goto", "hash", "id", "if", "init", "inline", "int", "long", "new", "nil", "register", "release",
    "retain", "return", "self", "short", "signed", "sizeof", "static", "struct", "super", "switch",
    "typedef", "union", "unsigned", "void", "volatile", "while", "zone",
];

/* Files shipped inside the Objective-C runtime, which always declares their types */
const WELL_KNOWN_FILES: &[&str] = &[
    "google/protobuf/any.proto",
    "google/protobuf/api.proto",
    "google/protobuf/duration.proto",
    "google/protobuf/empty.proto",
    "google/protobuf/field_mask.proto",
    "google/protobuf/source_context.proto",
    "google/protobuf/struct.proto",
    "google/protobuf/timestamp.proto",
    "google/protobuf/type.proto",
    "google/protobuf/wrappers.proto",
];

/// Convert `snake_case` (or mixed) schema names to camel case.
///
/// Input is split into segments on digit runs, on a lower-case letter
/// following anything but a letter, and on upper-case letters that do not
/// follow another upper-case letter. Each segment is capitalized; the
/// segments in `UPPER_SEGMENTS` are fully upper-cased, and a leading one keeps
/// the result upper-case even when `first_capitalized` is false.
pub fn underscores_to_camel_case(input: &str, first_capitalized: bool) -> String {
    let mut segments: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut last_was_digit = false;
    let mut last_was_lower = false;
    let mut last_was_upper = false;

    for c in input.chars() {
        if c.is_ascii_digit() {
            if !last_was_digit {
                segments.push(std::mem::take(&mut current));
            }
            current.push(c);
            (last_was_digit, last_was_lower, last_was_upper) = (true, false, false);
        } else if c.is_ascii_lowercase() {
            if !last_was_lower && !last_was_upper {
                segments.push(std::mem::take(&mut current));
            }
            current.push(c);
            (last_was_digit, last_was_lower, last_was_upper) = (false, true, false);
        } else if c.is_ascii_uppercase() {
            if !last_was_upper {
                segments.push(std::mem::take(&mut current));
            }
            current.push(c.to_ascii_lowercase());
            (last_was_digit, last_was_lower, last_was_upper) = (false, false, true);
        } else {
            (last_was_digit, last_was_lower, last_was_upper) = (false, false, false);
        }
    }
    segments.push(current);

    let mut result = String::new();
    let mut first_segment_forces_upper = false;
    for segment in segments.iter().filter(|segment| !segment.is_empty()) {
        if UPPER_SEGMENTS.contains(&segment.as_str()) {
            if result.is_empty() {
                first_segment_forces_upper = true;
            }
            result.push_str(&segment.to_ascii_uppercase());
        } else {
            let mut chars = segment.chars();
            if let Some(first) = chars.next() {
                result.push(first.to_ascii_uppercase());
                result.push_str(chars.as_str());
            }
        }
    }

    if !first_capitalized && !first_segment_forces_upper {
        if let Some(first) = result.get(..1) {
            let lowered = first.to_ascii_lowercase();
            result.replace_range(..1, &lowered);
        }
    }
    result
}

pub fn file_class_prefix(file: File<'_>) -> &str {
    file.objc_class_prefix()
}

/* Enclosing message names joined with '_', without the file prefix */
fn class_name_worker(message: Message<'_>) -> String {
    match message.containing_type() {
        Some(parent) => format!("{}_{}", class_name_worker(parent), message.name()),
        None => message.name().to_string(),
    }
}

/* Append `suffix` when a derived identifier is a reserved word */
fn sanitize_name(name: String, suffix: &str) -> String {
    if RESERVED_WORDS.contains(&name.as_str()) {
        name + suffix
    } else {
        name
    }
}

/// Objective-C class emitted for a message.
pub fn class_name(message: Message<'_>) -> String {
    let name = format!("{}{}", file_class_prefix(message.file()), class_name_worker(message));
    sanitize_name(name, "_Class")
}

/// Objective-C enum type emitted for a schema enum.
pub fn enum_name(enum_type: Enum<'_>) -> String {
    let scoped = match enum_type.containing_type() {
        Some(parent) => format!("{}_{}", class_name_worker(parent), enum_type.name()),
        None => enum_type.name().to_string(),
    };
    sanitize_name(format!("{}{}", file_class_prefix(enum_type.file()), scoped), "_Enum")
}

/// Property name for a field: lower camel case, `Array` suffixed when
/// repeated, and `_p` suffixed when it would shadow a reserved word or look
/// like a repeated field's name.
pub fn field_name(field: Field<'_>) -> String {
    let mut name = underscores_to_camel_case(field.name(), false);
    if field.is_repeated() {
        name.push_str("Array");
    } else if name.ends_with("Array") {
        name.push_str("_p");
    }
    sanitize_name(name, "_p")
}

/// `field_name` with its first letter upper-cased, used inside function names.
pub fn field_name_capitalized(field: Field<'_>) -> String {
    let mut name = field_name(field);
    if let Some(first) = name.get(..1) {
        let raised = first.to_ascii_uppercase();
        name.replace_range(..1, &raised);
    }
    name
}

/// Generated file path without extension: directories are kept and the base
/// name is camel cased, so `pkg/my_widget.proto` becomes `pkg/MyWidget`.
pub fn file_path(file: File<'_>) -> String {
    let name = file.name();
    let (directory, basename) = match name.rfind('/') {
        Some(split) => name.split_at(split + 1),
        None => ("", name),
    };
    let basename = basename.strip_suffix(".proto").unwrap_or(basename);
    format!("{}{}", directory, underscores_to_camel_case(basename, true))
}

/// Schema files whose generated code ships with the runtime library.
///
/// Types from these files never need a forward declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundledFiles {
    names: BTreeSet<String>,
}

impl BundledFiles {
    pub fn none() -> Self {
        Self { names: BTreeSet::new() }
    }

    pub fn well_known() -> Self {
        Self::none().with_files(WELL_KNOWN_FILES.iter().copied())
    }

    pub fn with_files<I, S>(mut self, files: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.names.extend(files.into_iter().map(Into::into));
        self
    }

    pub fn contains(&self, file: File<'_>) -> bool {
        self.names.contains(file.name())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

impl Default for BundledFiles {
    fn default() -> Self {
        Self::well_known()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::field::{make_field_generator, FieldGenerator};
    use crate::descriptor::DescriptorPool;
    use objc_types::SchemaSet;

    fn pool(yaml: &str) -> DescriptorPool {
        let set: SchemaSet = serde_yml::from_str(yaml).unwrap();
        DescriptorPool::build(set.files).unwrap()
    }

    #[test]
    fn test_camel_case_segments() {
        assert_eq!(underscores_to_camel_case("status", false), "status");
        assert_eq!(underscores_to_camel_case("status", true), "Status");
        assert_eq!(underscores_to_camel_case("foo_bar_baz", false), "fooBarBaz");
        assert_eq!(underscores_to_camel_case("fooBar", true), "FooBar");
        assert_eq!(underscores_to_camel_case("field_2d", false), "field2D");
        assert_eq!(underscores_to_camel_case("HTTPServer", true), "Httpserver");
    }

    #[test]
    fn test_camel_case_upper_segments() {
        assert_eq!(underscores_to_camel_case("url", false), "URL");
        assert_eq!(underscores_to_camel_case("home_url", false), "homeURL");
        assert_eq!(underscores_to_camel_case("https_port", true), "HTTPSPort");
    }

    const SCHEMA: &str = r#"
files:
  - name: "shop/my_widget.proto"
    package: "shop"
    objc-class-prefix: "SHP"
    messages:
      - name: "Widget"
        nested-enums:
          - name: "Kind"
        nested-messages:
          - name: "Part"
        fields:
          - name: "kind"
            number: 1
            field-type: { enum: "Kind" }
          - name: "kinds"
            number: 2
            label: repeated
            field-type: { enum: "Kind" }
          - name: "description"
            number: 3
            field-type: { scalar: string }
          - name: "value_array"
            number: 4
            field-type: { scalar: int32 }
          - name: "home_url"
            number: 5
            field-type: { scalar: string }
"#;

    #[test]
    fn test_class_and_enum_names_include_prefix_and_scope() {
        let pool = pool(SCHEMA);
        assert_eq!(class_name(pool.find_message("shop.Widget").unwrap()), "SHPWidget");
        assert_eq!(class_name(pool.find_message("shop.Widget.Part").unwrap()), "SHPWidget_Part");
        assert_eq!(enum_name(pool.find_enum("shop.Widget.Kind").unwrap()), "SHPWidget_Kind");
    }

    #[test]
    fn test_reserved_class_and_enum_names_get_suffixes() {
        let pool = pool(
            r#"
files:
  - name: "runtime.proto"
    syntax: proto3
    enums:
      - name: "Class"
    messages:
      - name: "Protocol"
        nested-enums:
          - name: "Kind"
        fields:
          - name: "kind"
            number: 1
            field-type: { enum: "Class" }
      - name: "id"
  - name: "prefixed.proto"
    package: "px"
    objc-class-prefix: "PX"
    messages:
      - name: "Protocol"
"#,
        );
        assert_eq!(class_name(pool.find_message("Protocol").unwrap()), "Protocol_Class");
        assert_eq!(class_name(pool.find_message("id").unwrap()), "id_Class");
        assert_eq!(enum_name(pool.find_enum("Class").unwrap()), "Class_Enum");
        assert_eq!(enum_name(pool.find_enum("Protocol.Kind").unwrap()), "Protocol_Kind");
        assert_eq!(class_name(pool.find_message("px.Protocol").unwrap()), "PXProtocol");

        let field = pool.find_message("Protocol").unwrap().find_field_by_name("kind").unwrap();
        let well_known = BundledFiles::well_known();
        let generator = make_field_generator(field, &well_known).unwrap();
        assert_eq!(generator.variable("owning_message_class"), Some("Protocol_Class"));
        assert_eq!(generator.variable("storage_type"), Some("Class_Enum"));
    }

    #[test]
    fn test_field_names() {
        let pool = pool(SCHEMA);
        let widget = pool.find_message("shop.Widget").unwrap();
        let name_of = |field: &str| field_name(widget.find_field_by_name(field).unwrap());
        let capitalized_of = |field: &str| field_name_capitalized(widget.find_field_by_name(field).unwrap());

        assert_eq!(name_of("kind"), "kind");
        assert_eq!(capitalized_of("kind"), "Kind");
        assert_eq!(name_of("kinds"), "kindsArray");
        assert_eq!(capitalized_of("kinds"), "KindsArray");
        assert_eq!(name_of("description"), "description_p");
        assert_eq!(capitalized_of("description"), "Description_p");
        assert_eq!(name_of("value_array"), "valueArray_p");
        assert_eq!(name_of("home_url"), "homeURL");
    }

    #[test]
    fn test_file_path_keeps_directories() {
        let pool = pool(SCHEMA);
        assert_eq!(file_path(pool.file_by_name("shop/my_widget.proto").unwrap()), "shop/MyWidget");
    }

    #[test]
    fn test_bundled_files() {
        let pool = pool(
            r#"
files:
  - name: "google/protobuf/timestamp.proto"
  - name: "google/protobuf/descriptor.proto"
  - name: "local.proto"
"#,
        );
        let bundled = BundledFiles::well_known();
        assert!(bundled.contains(pool.file_by_name("google/protobuf/timestamp.proto").unwrap()));
        assert!(!bundled.contains(pool.file_by_name("google/protobuf/descriptor.proto").unwrap()));
        assert!(!bundled.contains(pool.file_by_name("local.proto").unwrap()));

        let extended = BundledFiles::none().with_files(["local.proto"]);
        assert!(extended.contains(pool.file_by_name("local.proto").unwrap()));
        assert_eq!(BundledFiles::default(), bundled);
    }
}
