pub mod descriptor_set;
pub mod pool;

pub use descriptor_set::{decode_descriptor_set, DescriptorSetError};
pub use pool::{
  DescriptorPool, Enum, EnumId, Field, FieldId, FieldKind, File, FileId, Message, MessageId, ResolutionError,
};
