use serde_derive::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone, Copy, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Syntax {
    #[default]
    Proto2,
    Proto3,
    Editions,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone, Copy, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Label {
    #[default]
    Optional,
    Required,
    Repeated,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "kebab-case")]
pub enum ScalarType {
    Double,
    Float,
    Int32,
    Int64,
    Uint32,
    Uint64,
    Sint32,
    Sint64,
    Fixed32,
    Fixed64,
    Sfixed32,
    Sfixed64,
    Bool,
    String,
    Bytes,
}

/// The type a field refers to. Enum and message references hold the type
/// name as written in the schema: either fully qualified with a leading `.`
/// or relative to the field's enclosing scope.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(rename_all = "kebab-case")]
pub enum FieldType {
    Scalar(ScalarType),
    Enum(String),
    Message(String),
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct FieldDef {
    pub name: String,
    pub number: i32,
    #[serde(default)]
    pub label: Label,
    #[serde(with = "serde_yml::with::singleton_map")]
    pub field_type: FieldType,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct EnumValueDef {
    pub name: String,
    pub number: i32,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct EnumDef {
    pub name: String,
    #[serde(default)]
    pub values: Vec<EnumValueDef>,
    /// Overrides the openness implied by the file syntax.
    #[serde(default)]
    pub closed: Option<bool>,
}

impl EnumDef {
    /* Proto2 enums are closed unless told otherwise; proto3 and editions enums are open */
    pub fn is_closed_in(&self, syntax: Syntax) -> bool {
        self.closed.unwrap_or(syntax == Syntax::Proto2)
    }
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct MessageDef {
    pub name: String,
    #[serde(default)]
    pub fields: Vec<FieldDef>,
    #[serde(default)]
    pub nested_messages: Vec<MessageDef>,
    #[serde(default)]
    pub nested_enums: Vec<EnumDef>,
    /// Set on the synthetic entry message protoc declares for a map field.
    #[serde(default)]
    pub map_entry: bool,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct SchemaFile {
    pub name: String,
    #[serde(default)]
    pub package: String,
    #[serde(default)]
    pub syntax: Syntax,
    #[serde(default)]
    pub objc_class_prefix: Option<String>,
    #[serde(default)]
    pub dependencies: Vec<String>,
    #[serde(default)]
    pub enums: Vec<EnumDef>,
    #[serde(default)]
    pub messages: Vec<MessageDef>,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone, Default)]
#[serde(rename_all = "kebab-case")]
pub struct SchemaSet {
    #[serde(default)]
    pub files: Vec<SchemaFile>,
}
