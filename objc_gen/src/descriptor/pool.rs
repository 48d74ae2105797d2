use objc_types::{EnumDef, FieldDef, FieldType, Label, MessageDef, ScalarType, SchemaFile, Syntax};
use serde_derive::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::ptr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct FileId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct MessageId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct EnumId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct FieldId(usize);

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ResolutionError {
  #[error("file '{0}' was loaded more than once")]
  DuplicateFile(String),

  #[error("symbol '{0}' is defined more than once")]
  DuplicateSymbol(String),

  #[error("file '{file}' imports '{dependency}' which was not loaded")]
  UnknownDependency { file: String, dependency: String },

  #[error("field '{field}' references unknown type '{type_name}'")]
  UnknownType { field: String, type_name: String },

  #[error("field '{field}' references '{type_name}' which is not {expected}")]
  KindMismatch { field: String, type_name: String, expected: &'static str },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
  Scalar(ScalarType),
  Enum(EnumId),
  Message(MessageId),
}

#[derive(Debug)]
struct FileEntry {
  name: String,
  package: String,
  syntax: Syntax,
  objc_class_prefix: String,
  dependencies: Vec<String>,
  messages: Vec<MessageId>,
}

#[derive(Debug)]
struct MessageEntry {
  name: String,
  full_name: String,
  file: FileId,
  containing_type: Option<MessageId>,
  map_entry: bool,
  fields: Vec<FieldId>,
  nested_messages: Vec<MessageId>,
}

#[derive(Debug)]
struct EnumEntry {
  name: String,
  full_name: String,
  file: FileId,
  containing_type: Option<MessageId>,
  closed: bool,
}

#[derive(Debug)]
struct FieldEntry {
  name: String,
  number: i32,
  label: Label,
  containing_type: MessageId,
  kind: FieldKind,
}

#[derive(Debug, Clone, Copy)]
enum Symbol {
  Message(MessageId),
  Enum(EnumId),
}

/// Resolved view over a set of schema files.
///
/// Symbols are registered for every file before any field type is resolved,
/// so fields may reference types declared later or in other loaded files.
#[derive(Debug, Default)]
pub struct DescriptorPool {
  files: Vec<FileEntry>,
  messages: Vec<MessageEntry>,
  enums: Vec<EnumEntry>,
  fields: Vec<FieldEntry>,
  symbols: HashMap<String, Symbol>,
  files_by_name: HashMap<String, FileId>,
}

fn qualify(scope: &str, name: &str) -> String {
  if scope.is_empty() { name.to_string() } else { format!("{}.{}", scope, name) }
}

impl DescriptorPool {
  pub fn build(schema_files: Vec<SchemaFile>) -> Result<Self, ResolutionError> {
    let mut pool = Self::default();
    let mut pending: Vec<(MessageId, FieldDef)> = Vec::new();

    for schema in schema_files {
      pool.add_file(schema, &mut pending)?;
    }

    pool.check_dependencies()?;

    // Field types can only be resolved once every symbol is known
    for (message, field) in pending {
      pool.resolve_field(message, field)?;
    }

    Ok(pool)
  }

  fn add_file(&mut self, schema: SchemaFile, pending: &mut Vec<(MessageId, FieldDef)>) -> Result<(), ResolutionError> {
    if self.files_by_name.contains_key(&schema.name) {
      return Err(ResolutionError::DuplicateFile(schema.name));
    }

    let file = FileId(self.files.len());
    self.files_by_name.insert(schema.name.clone(), file);
    self.files.push(FileEntry {
      name: schema.name,
      package: schema.package.clone(),
      syntax: schema.syntax,
      objc_class_prefix: schema.objc_class_prefix.unwrap_or_default(),
      dependencies: schema.dependencies,
      messages: Vec::new(),
    });

    let scope = schema.package;
    for enum_def in schema.enums {
      self.add_enum(file, None, &scope, enum_def)?;
    }
    for message_def in schema.messages {
      let id = self.add_message(file, None, &scope, message_def, pending)?;
      self.files[file.0].messages.push(id);
    }

    Ok(())
  }

  fn register_symbol(&mut self, full_name: &str, symbol: Symbol) -> Result<(), ResolutionError> {
    if self.symbols.contains_key(full_name) {
      return Err(ResolutionError::DuplicateSymbol(full_name.to_string()));
    }
    self.symbols.insert(full_name.to_string(), symbol);
    Ok(())
  }

  fn add_enum(
    &mut self,
    file: FileId,
    containing_type: Option<MessageId>,
    scope: &str,
    def: EnumDef,
  ) -> Result<EnumId, ResolutionError> {
    let id = EnumId(self.enums.len());
    let full_name = qualify(scope, &def.name);
    self.register_symbol(&full_name, Symbol::Enum(id))?;

    let closed = def.is_closed_in(self.files[file.0].syntax);
    self.enums.push(EnumEntry {
      name: def.name,
      full_name,
      file,
      containing_type,
      closed,
    });
    Ok(id)
  }

  fn add_message(
    &mut self,
    file: FileId,
    containing_type: Option<MessageId>,
    scope: &str,
    def: MessageDef,
    pending: &mut Vec<(MessageId, FieldDef)>,
  ) -> Result<MessageId, ResolutionError> {
    let id = MessageId(self.messages.len());
    let full_name = qualify(scope, &def.name);
    self.register_symbol(&full_name, Symbol::Message(id))?;

    self.messages.push(MessageEntry {
      name: def.name,
      full_name: full_name.clone(),
      file,
      containing_type,
      map_entry: def.map_entry,
      fields: Vec::new(),
      nested_messages: Vec::new(),
    });

    for enum_def in def.nested_enums {
      self.add_enum(file, Some(id), &full_name, enum_def)?;
    }
    for message_def in def.nested_messages {
      let nested = self.add_message(file, Some(id), &full_name, message_def, pending)?;
      self.messages[id.0].nested_messages.push(nested);
    }
    pending.extend(def.fields.into_iter().map(|field| (id, field)));

    Ok(id)
  }

  fn check_dependencies(&self) -> Result<(), ResolutionError> {
    for file in &self.files {
      for dependency in &file.dependencies {
        if !self.files_by_name.contains_key(dependency) {
          return Err(ResolutionError::UnknownDependency {
            file: file.name.clone(),
            dependency: dependency.clone(),
          });
        }
      }
    }
    Ok(())
  }

  /* Absolute names start with '.'; anything else is searched from the innermost scope outward */
  fn lookup(&self, scope: &str, type_name: &str) -> Option<Symbol> {
    if let Some(absolute) = type_name.strip_prefix('.') {
      return self.symbols.get(absolute).copied();
    }

    let mut scope = scope;
    loop {
      if let Some(symbol) = self.symbols.get(&qualify(scope, type_name)) {
        return Some(*symbol);
      }
      if scope.is_empty() {
        return None;
      }
      scope = scope.rsplit_once('.').map(|(parent, _)| parent).unwrap_or("");
    }
  }

  fn resolve_field(&mut self, message: MessageId, def: FieldDef) -> Result<(), ResolutionError> {
    let scope = &self.messages[message.0].full_name;
    let kind = match &def.field_type {
      FieldType::Scalar(scalar) => FieldKind::Scalar(*scalar),
      FieldType::Enum(type_name) => match self.lookup(scope, type_name) {
        Some(Symbol::Enum(id)) => FieldKind::Enum(id),
        Some(Symbol::Message(_)) => {
          return Err(ResolutionError::KindMismatch {
            field: qualify(scope, &def.name),
            type_name: type_name.clone(),
            expected: "an enum",
          });
        }
        None => {
          return Err(ResolutionError::UnknownType { field: qualify(scope, &def.name), type_name: type_name.clone() });
        }
      },
      FieldType::Message(type_name) => match self.lookup(scope, type_name) {
        Some(Symbol::Message(id)) => FieldKind::Message(id),
        Some(Symbol::Enum(_)) => {
          return Err(ResolutionError::KindMismatch {
            field: qualify(scope, &def.name),
            type_name: type_name.clone(),
            expected: "a message",
          });
        }
        None => {
          return Err(ResolutionError::UnknownType { field: qualify(scope, &def.name), type_name: type_name.clone() });
        }
      },
    };

    let id = FieldId(self.fields.len());
    self.fields.push(FieldEntry { name: def.name, number: def.number, label: def.label, containing_type: message, kind });
    self.messages[message.0].fields.push(id);
    Ok(())
  }

  pub fn files(&self) -> impl Iterator<Item = File<'_>> {
    (0..self.files.len()).map(move |index| File { pool: self, id: FileId(index) })
  }

  pub fn file(&self, id: FileId) -> File<'_> {
    File { pool: self, id }
  }

  pub fn file_by_name(&self, name: &str) -> Option<File<'_>> {
    self.files_by_name.get(name).map(|&id| File { pool: self, id })
  }

  pub fn find_message(&self, full_name: &str) -> Option<Message<'_>> {
    match self.symbols.get(full_name.trim_start_matches('.')) {
      Some(Symbol::Message(id)) => Some(Message { pool: self, id: *id }),
      _ => None,
    }
  }

  pub fn find_enum(&self, full_name: &str) -> Option<Enum<'_>> {
    match self.symbols.get(full_name.trim_start_matches('.')) {
      Some(Symbol::Enum(id)) => Some(Enum { pool: self, id: *id }),
      _ => None,
    }
  }
}

/* Handles compare by identity: same pool, same entry */
macro_rules! impl_handle_identity {
  ($handle:ident) => {
    impl PartialEq for $handle<'_> {
      fn eq(&self, other: &Self) -> bool {
        ptr::eq(self.pool, other.pool) && self.id == other.id
      }
    }

    impl Eq for $handle<'_> {}
  };
}

#[derive(Clone, Copy)]
pub struct File<'a> {
  pool: &'a DescriptorPool,
  id: FileId,
}

impl_handle_identity!(File);

impl<'a> File<'a> {
  fn entry(self) -> &'a FileEntry {
    &self.pool.files[self.id.0]
  }

  pub fn id(self) -> FileId {
    self.id
  }

  pub fn name(self) -> &'a str {
    &self.entry().name
  }

  pub fn package(self) -> &'a str {
    &self.entry().package
  }

  pub fn objc_class_prefix(self) -> &'a str {
    &self.entry().objc_class_prefix
  }

  pub fn dependencies(self) -> impl Iterator<Item = File<'a>> {
    let pool = self.pool;
    self.entry().dependencies.iter().filter_map(move |name| pool.file_by_name(name))
  }

  pub fn messages(self) -> impl Iterator<Item = Message<'a>> {
    let pool = self.pool;
    self.entry().messages.iter().map(move |&id| Message { pool, id })
  }

  /// Every message declared in the file, nested ones included, parents first.
  ///
  /// Map entry messages are left out: the runtime builds map fields itself and
  /// never generates a class for them.
  pub fn all_messages(self) -> Vec<Message<'a>> {
    fn collect<'a>(message: Message<'a>, out: &mut Vec<Message<'a>>) {
      if message.is_map_entry() {
        return;
      }
      out.push(message);
      for nested in message.nested_messages() {
        collect(nested, out);
      }
    }

    let mut out = Vec::new();
    for message in self.messages() {
      collect(message, &mut out);
    }
    out
  }
}

impl fmt::Debug for File<'_> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("File").field("name", &self.name()).finish()
  }
}

#[derive(Clone, Copy)]
pub struct Message<'a> {
  pool: &'a DescriptorPool,
  id: MessageId,
}

impl_handle_identity!(Message);

impl<'a> Message<'a> {
  fn entry(self) -> &'a MessageEntry {
    &self.pool.messages[self.id.0]
  }

  pub fn id(self) -> MessageId {
    self.id
  }

  pub fn name(self) -> &'a str {
    &self.entry().name
  }

  pub fn full_name(self) -> &'a str {
    &self.entry().full_name
  }

  pub fn file(self) -> File<'a> {
    File { pool: self.pool, id: self.entry().file }
  }

  pub fn containing_type(self) -> Option<Message<'a>> {
    let pool = self.pool;
    self.entry().containing_type.map(|id| Message { pool, id })
  }

  pub fn fields(self) -> impl Iterator<Item = Field<'a>> {
    let pool = self.pool;
    self.entry().fields.iter().map(move |&id| Field { pool, id })
  }

  pub fn nested_messages(self) -> impl Iterator<Item = Message<'a>> {
    let pool = self.pool;
    self.entry().nested_messages.iter().map(move |&id| Message { pool, id })
  }

  /// Synthetic `XxxEntry` message protoc declares for a map field.
  pub fn is_map_entry(self) -> bool {
    self.entry().map_entry
  }

  pub fn find_field_by_name(self, name: &str) -> Option<Field<'a>> {
    self.fields().find(|field| field.name() == name)
  }
}

impl fmt::Debug for Message<'_> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Message").field("full_name", &self.full_name()).finish()
  }
}

#[derive(Clone, Copy)]
pub struct Enum<'a> {
  pool: &'a DescriptorPool,
  id: EnumId,
}

impl_handle_identity!(Enum);

impl<'a> Enum<'a> {
  fn entry(self) -> &'a EnumEntry {
    &self.pool.enums[self.id.0]
  }

  pub fn id(self) -> EnumId {
    self.id
  }

  pub fn name(self) -> &'a str {
    &self.entry().name
  }

  pub fn full_name(self) -> &'a str {
    &self.entry().full_name
  }

  pub fn file(self) -> File<'a> {
    File { pool: self.pool, id: self.entry().file }
  }

  pub fn containing_type(self) -> Option<Message<'a>> {
    let pool = self.pool;
    self.entry().containing_type.map(|id| Message { pool, id })
  }

  /// Closed enums reject unknown values on decode; open enums keep them.
  pub fn is_closed(self) -> bool {
    self.entry().closed
  }
}

impl fmt::Debug for Enum<'_> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Enum").field("full_name", &self.full_name()).field("closed", &self.is_closed()).finish()
  }
}

#[derive(Clone, Copy)]
pub struct Field<'a> {
  pool: &'a DescriptorPool,
  id: FieldId,
}

impl_handle_identity!(Field);

impl<'a> Field<'a> {
  fn entry(self) -> &'a FieldEntry {
    &self.pool.fields[self.id.0]
  }

  pub fn id(self) -> FieldId {
    self.id
  }

  pub fn name(self) -> &'a str {
    &self.entry().name
  }

  pub fn full_name(self) -> String {
    qualify(self.containing_type().full_name(), self.name())
  }

  pub fn number(self) -> i32 {
    self.entry().number
  }

  pub fn label(self) -> Label {
    self.entry().label
  }

  pub fn is_repeated(self) -> bool {
    self.entry().label == Label::Repeated
  }

  pub fn kind(self) -> FieldKind {
    self.entry().kind
  }

  pub fn containing_type(self) -> Message<'a> {
    Message { pool: self.pool, id: self.entry().containing_type }
  }

  /// The file declaring the field, which is always its containing message's file.
  pub fn file(self) -> File<'a> {
    self.containing_type().file()
  }

  pub fn enum_type(self) -> Option<Enum<'a>> {
    match self.entry().kind {
      FieldKind::Enum(id) => Some(Enum { pool: self.pool, id }),
      _ => None,
    }
  }

  pub fn message_type(self) -> Option<Message<'a>> {
    match self.entry().kind {
      FieldKind::Message(id) => Some(Message { pool: self.pool, id }),
      _ => None,
    }
  }
}

impl fmt::Debug for Field<'_> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Field").field("full_name", &self.full_name()).field("number", &self.number()).finish()
  }
}
