/* Conversion from protoc's binary FileDescriptorSet into the schema model */

use objc_types::{EnumDef, EnumValueDef, FieldDef, FieldType, Label, MessageDef, ScalarType, SchemaFile, Syntax};
use prost::Message as _;
use prost_types::field_descriptor_proto::{Label as ProtoLabel, Type as ProtoType};
use prost_types::{DescriptorProto, EnumDescriptorProto, FieldDescriptorProto, FileDescriptorProto, FileDescriptorSet};
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum DescriptorSetError {
    #[error("failed to decode FileDescriptorSet: {0}")]
    Decode(#[from] prost::DecodeError),

    #[error("field '{field}' in '{file}' has type {kind} but no type name")]
    MissingTypeName { file: String, field: String, kind: &'static str },
}

/// Decode the output of `protoc --descriptor_set_out` into schema files.
///
/// The set should be produced with `--include_imports` so every dependency is
/// present when the descriptor pool is built.
pub fn decode_descriptor_set(bytes: &[u8]) -> Result<Vec<SchemaFile>, DescriptorSetError> {
    let set = FileDescriptorSet::decode(bytes)?;
    set.file.iter().map(convert_file).collect()
}

fn convert_syntax(syntax: Option<&str>) -> Syntax {
    match syntax {
        Some("proto3") => Syntax::Proto3,
        Some("editions") => Syntax::Editions,
        _ => Syntax::Proto2,
    }
}

fn convert_file(file: &FileDescriptorProto) -> Result<SchemaFile, DescriptorSetError> {
    let syntax = convert_syntax(file.syntax.as_deref());
    if syntax == Syntax::Editions {
        // FeatureSet is not decoded, so `enum_type = CLOSED` features are lost
        warn!(file = file.name(), "editions file loaded from a descriptor set; its enums are treated as open");
    }

    let messages = file
        .message_type
        .iter()
        .map(|message| convert_message(file.name(), message))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(SchemaFile {
        name: file.name().to_string(),
        package: file.package().to_string(),
        syntax,
        objc_class_prefix: file
            .options
            .as_ref()
            .and_then(|options| options.objc_class_prefix.clone())
            .filter(|prefix| !prefix.is_empty()),
        dependencies: file.dependency.clone(),
        enums: file.enum_type.iter().map(convert_enum).collect(),
        messages,
    })
}

fn convert_enum(enum_type: &EnumDescriptorProto) -> EnumDef {
    EnumDef {
        name: enum_type.name().to_string(),
        values: enum_type
            .value
            .iter()
            .map(|value| EnumValueDef {
                name: value.name().to_string(),
                number: value.number(),
            })
            .collect(),
        closed: None,
    }
}

fn convert_message(file_name: &str, message: &DescriptorProto) -> Result<MessageDef, DescriptorSetError> {
    Ok(MessageDef {
        name: message.name().to_string(),
        fields: message
            .field
            .iter()
            .map(|field| convert_field(file_name, field))
            .collect::<Result<Vec<_>, _>>()?,
        nested_messages: message
            .nested_type
            .iter()
            .map(|nested| convert_message(file_name, nested))
            .collect::<Result<Vec<_>, _>>()?,
        nested_enums: message.enum_type.iter().map(convert_enum).collect(),
        map_entry: message.options.as_ref().is_some_and(|options| options.map_entry()),
    })
}

fn convert_field(file_name: &str, field: &FieldDescriptorProto) -> Result<FieldDef, DescriptorSetError> {
    let type_name = || -> Result<String, DescriptorSetError> {
        match field.type_name.as_deref() {
            Some(name) if !name.is_empty() => Ok(name.to_string()),
            _ => Err(DescriptorSetError::MissingTypeName {
                file: file_name.to_string(),
                field: field.name().to_string(),
                kind: field.r#type().as_str_name(),
            }),
        }
    };

    let field_type = match field.r#type() {
        ProtoType::Double => FieldType::Scalar(ScalarType::Double),
        ProtoType::Float => FieldType::Scalar(ScalarType::Float),
        ProtoType::Int64 => FieldType::Scalar(ScalarType::Int64),
        ProtoType::Uint64 => FieldType::Scalar(ScalarType::Uint64),
        ProtoType::Int32 => FieldType::Scalar(ScalarType::Int32),
        ProtoType::Fixed64 => FieldType::Scalar(ScalarType::Fixed64),
        ProtoType::Fixed32 => FieldType::Scalar(ScalarType::Fixed32),
        ProtoType::Bool => FieldType::Scalar(ScalarType::Bool),
        ProtoType::String => FieldType::Scalar(ScalarType::String),
        ProtoType::Bytes => FieldType::Scalar(ScalarType::Bytes),
        ProtoType::Uint32 => FieldType::Scalar(ScalarType::Uint32),
        ProtoType::Sfixed32 => FieldType::Scalar(ScalarType::Sfixed32),
        ProtoType::Sfixed64 => FieldType::Scalar(ScalarType::Sfixed64),
        ProtoType::Sint32 => FieldType::Scalar(ScalarType::Sint32),
        ProtoType::Sint64 => FieldType::Scalar(ScalarType::Sint64),
        ProtoType::Enum => FieldType::Enum(type_name()?),
        ProtoType::Message | ProtoType::Group => FieldType::Message(type_name()?),
    };

    let label = match field.label() {
        ProtoLabel::Optional => Label::Optional,
        ProtoLabel::Required => Label::Required,
        ProtoLabel::Repeated => Label::Repeated,
    };

    Ok(FieldDef {
        name: field.name().to_string(),
        number: field.number(),
        label,
        field_type,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use prost::Message;
    use crate::codegen::{ObjcCodeGenerator, ObjcCodeGeneratorOptions};
    use crate::descriptor::DescriptorPool;
    use prost_types::{EnumValueDescriptorProto, FileOptions, MessageOptions};

    fn enum_field(name: &str, number: i32, label: ProtoLabel, type_name: &str) -> FieldDescriptorProto {
        FieldDescriptorProto {
            name: Some(name.to_string()),
            number: Some(number),
            label: Some(label as i32),
            r#type: Some(ProtoType::Enum as i32),
            type_name: Some(type_name.to_string()),
            ..Default::default()
        }
    }

    fn sample_set() -> FileDescriptorSet {
        let colors = FileDescriptorProto {
            name: Some("colors.proto".to_string()),
            package: Some("demo".to_string()),
            enum_type: vec![EnumDescriptorProto {
                name: Some("Color".to_string()),
                value: vec![EnumValueDescriptorProto {
                    name: Some("COLOR_RED".to_string()),
                    number: Some(0),
                    ..Default::default()
                }],
                ..Default::default()
            }],
            ..Default::default()
        };

        let widget = FileDescriptorProto {
            name: Some("widget.proto".to_string()),
            package: Some("demo".to_string()),
            syntax: Some("proto3".to_string()),
            dependency: vec!["colors.proto".to_string()],
            options: Some(FileOptions {
                objc_class_prefix: Some("DM".to_string()),
                ..Default::default()
            }),
            message_type: vec![DescriptorProto {
                name: Some("Widget".to_string()),
                field: vec![
                    enum_field("status", 3, ProtoLabel::Optional, ".demo.Color"),
                    enum_field("colors", 4, ProtoLabel::Repeated, ".demo.Color"),
                ],
                ..Default::default()
            }],
            ..Default::default()
        };

        FileDescriptorSet { file: vec![colors, widget] }
    }

    #[test]
    fn test_decodes_files_messages_and_enum_fields() {
        let bytes = sample_set().encode_to_vec();
        let files = decode_descriptor_set(&bytes).unwrap();

        assert_eq!(files.len(), 2);
        assert_eq!(files[0].syntax, Syntax::Proto2);
        assert_eq!(files[0].enums[0].values[0].name, "COLOR_RED");

        let widget = &files[1];
        assert_eq!(widget.syntax, Syntax::Proto3);
        assert_eq!(widget.objc_class_prefix.as_deref(), Some("DM"));
        assert_eq!(widget.dependencies, vec!["colors.proto".to_string()]);

        let fields = &widget.messages[0].fields;
        assert_eq!(fields[0].field_type, FieldType::Enum(".demo.Color".to_string()));
        assert_eq!(fields[0].label, Label::Optional);
        assert_eq!(fields[1].label, Label::Repeated);
    }

    #[test]
    fn test_enum_field_without_type_name_is_rejected() {
        let mut set = sample_set();
        set.file[1].message_type[0].field[0].type_name = None;

        let err = decode_descriptor_set(&set.encode_to_vec()).unwrap_err();
        assert!(matches!(err, DescriptorSetError::MissingTypeName { kind: "TYPE_ENUM", .. }));
    }

    /* proto3 file with `map<string, Color> values = 1;` as protoc lowers it */
    fn map_of_enum_file(syntax: &str) -> FileDescriptorProto {
        let entry = DescriptorProto {
            name: Some("ValuesEntry".to_string()),
            field: vec![
                FieldDescriptorProto {
                    name: Some("key".to_string()),
                    number: Some(1),
                    label: Some(ProtoLabel::Optional as i32),
                    r#type: Some(ProtoType::String as i32),
                    ..Default::default()
                },
                enum_field("value", 2, ProtoLabel::Optional, ".demo.Color"),
            ],
            options: Some(MessageOptions {
                map_entry: Some(true),
                ..Default::default()
            }),
            ..Default::default()
        };

        FileDescriptorProto {
            name: Some("widget.proto".to_string()),
            package: Some("demo".to_string()),
            syntax: Some(syntax.to_string()),
            enum_type: vec![EnumDescriptorProto {
                name: Some("Color".to_string()),
                value: vec![EnumValueDescriptorProto {
                    name: Some("COLOR_RED".to_string()),
                    number: Some(0),
                    ..Default::default()
                }],
                ..Default::default()
            }],
            message_type: vec![DescriptorProto {
                name: Some("Widget".to_string()),
                field: vec![
                    FieldDescriptorProto {
                        name: Some("values".to_string()),
                        number: Some(1),
                        label: Some(ProtoLabel::Repeated as i32),
                        r#type: Some(ProtoType::Message as i32),
                        type_name: Some(".demo.Widget.ValuesEntry".to_string()),
                        ..Default::default()
                    },
                    enum_field("status", 2, ProtoLabel::Optional, ".demo.Color"),
                ],
                nested_type: vec![entry],
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    #[test]
    fn test_map_entry_messages_are_not_generated() {
        let set = FileDescriptorSet { file: vec![map_of_enum_file("proto3")] };
        let files = decode_descriptor_set(&set.encode_to_vec()).unwrap();

        let widget = &files[0].messages[0];
        assert!(!widget.map_entry);
        assert!(widget.nested_messages[0].map_entry);

        let pool = DescriptorPool::build(files).unwrap();
        let entry = pool.find_message("demo.Widget.ValuesEntry").unwrap();
        assert!(entry.is_map_entry());

        let file = pool.file_by_name("widget.proto").unwrap();
        let names: Vec<&str> = file.all_messages().iter().map(|message| message.full_name()).collect();
        assert_eq!(names, vec!["demo.Widget"]);

        let options = ObjcCodeGeneratorOptions::default();
        let generated = ObjcCodeGenerator::new(&pool, &options).generate_file(file).unwrap();
        assert!(!generated.header.contains("Widget_ValuesEntry"));
        assert!(!generated.implementation.contains("Widget_ValuesEntry"));
        assert!(generated.header.contains("int32_t Widget_Status_RawValue(Widget *message);\n"));
    }

    #[test]
    fn test_editions_enums_load_as_open() {
        let set = FileDescriptorSet { file: vec![map_of_enum_file("editions")] };
        let files = decode_descriptor_set(&set.encode_to_vec()).unwrap();
        assert_eq!(files[0].syntax, Syntax::Editions);
        assert_eq!(files[0].enums[0].closed, None);

        let pool = DescriptorPool::build(files).unwrap();
        assert!(!pool.find_enum("demo.Color").unwrap().is_closed());
    }

    #[test]
    fn test_garbage_bytes_fail_to_decode() {
        assert!(matches!(decode_descriptor_set(&[0xff, 0xff, 0xff]), Err(DescriptorSetError::Decode(_))));
    }
}
