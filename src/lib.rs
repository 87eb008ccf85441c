//! # Dict Parser
//!
//! Deserializes delimited dictionary text files into typed trees of fields.
//!
//! Every line of a data file is one record. A record is split on its delimiter
//! (tab by default) and each piece is handed to the field at the same position.
//! Fields can be primitives, nested composites with their own delimiter, or
//! self-sized arrays written as `<count>:<item>,<item>,...`.
//!
//! ## Features
//!
//! - **Typed leaves**: `int`, `uint32`, `uint64`, `float` and `string` fields
//! - **Nesting**: composite fields split their token again on their own delimiter
//! - **Arrays**: item count is read from the input itself
//! - **Header files**: build a schema at runtime from a line of type names
//! - **JSON output**: parsed records serialize with serde
//!
//! ## Quick Start
//!
//! ```
//! use dict_parser::{ArrayField, CompositeField, Record, TypedField};
//!
//! let mut name = CompositeField::nested("name");
//! name.add_field(TypedField::<String>::new("first_name"))?;
//! name.add_field(TypedField::<String>::new("second_name"))?;
//!
//! let mut record = Record::record();
//! record.add_field(name)?;
//! record.add_field(TypedField::<u32>::new("age"))?;
//! record.add_field(TypedField::<i32>::new("height"))?;
//! record.add_field(ArrayField::of::<String>("items"))?;
//!
//! record.deserialize("san#zhang\t18\t180\t3:math,cs,physis")?;
//!
//! assert_eq!(record.data::<u32>("age"), Some(&18));
//! let items = record.get_field("items").and_then(|f| f.as_array()).unwrap();
//! assert_eq!(items.values::<String>().unwrap(), vec!["math", "cs", "physis"]);
//! # Ok::<(), dict_parser::FieldError>(())
//! ```
//!
//! ## Header Files
//!
//! A header file holds one tab-separated line of registered type names, such as
//! `Field<string>\tField<uint32>\tArrayField<int>`. Fields built from a header are
//! named by position: `"0"`, `"1"`, ...
//!
//! ```no_run
//! use dict_parser::RecordStream;
//!
//! let mut stream = RecordStream::with_header("data.txt", "header.txt")?;
//! let stats = stream.parse_file()?;
//!
//! println!("{}", stats.summary());
//! for record in stream.records() {
//!     println!("{:?}", record.data::<String>("0"));
//! }
//! # Ok::<(), dict_parser::Error>(())
//! ```
//!
//! Custom types are added to a [`FieldTypeRegistry`] before any parsing starts:
//!
//! ```
//! use dict_parser::{CompositeField, Field, FieldKind, FieldTypeRegistry};
//!
//! let mut builder = FieldTypeRegistry::builder();
//! builder.register("Money", |name| {
//!     let mut money = CompositeField::new(name, ",");
//!     let _ = money.add_field(FieldKind::Int.instantiate("income"));
//!     let _ = money.add_field(FieldKind::Int.instantiate("expense"));
//!     Field::from(money)
//! });
//! let registry = builder.build();
//!
//! let mut record = registry.build_record(&["Field<string>", "Money"]);
//! record.deserialize("wangwu\t199,20")?;
//! # Ok::<(), dict_parser::FieldError>(())
//! ```
//!
//! ## Error Handling
//!
//! Field operations return [`FieldError`]. File-level operations return [`Error`],
//! where only a source that cannot be opened aborts a whole parse; malformed lines
//! are counted, logged and skipped.

// Public API modules
pub mod error;
pub mod reader;
pub mod writer;

// Re-export commonly used types
pub use error::{Error, FieldError, Result};
pub use reader::{ParseStats, RecordStream, RecordStreamBuilder};
pub use writer::{JsonLinesWriter, WriteStats};

pub use composite::{ArrayField, CompositeField, NestedField, Record};
pub use field::{Field, FieldKind, Primitive, TypedField};
pub use registry::{FieldTypeRegistry, FieldTypeRegistryBuilder};

// Lower-level modules
pub mod composite;
pub mod field;
pub mod formats;
pub mod registry;
