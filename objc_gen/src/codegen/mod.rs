pub mod field;
pub mod message;
pub mod names;
pub mod objc;
pub mod printer;

pub use field::{make_field_generator, EnumFieldGenerator, FieldGenerator, GenerationFacts, RepeatedEnumFieldGenerator};
pub use message::MessageGenerator;
pub use names::BundledFiles;
pub use objc::{GeneratedFile, ObjcCodeGenerator, ObjcCodeGeneratorOptions};
pub use printer::{Printer, PrinterError};
