//! Bind environment variables into typed configuration structs.
//!
//! Each field of a record is read from the variable named after it in upper
//! snake case (`max_workers` reads `MAX_WORKERS`), converted with a parser
//! chosen by the field's type, and falls back to a default record or to
//! `None` for `Option` fields. Every failing field is reported, not just the
//! first one.
//!
//! ```rust
//! use envbind::{ErrorKind, EnvRecord, Loader, MapEnv};
//!
//! #[derive(Debug, Default, EnvRecord)]
//! struct Config {
//!     field_a: f32,
//!     field_b: i32,
//! }
//!
//! let errors = Loader::<Config>::new()
//!     .bind_with(&MapEnv::new(), None)
//!     .into_result()
//!     .unwrap_err();
//!
//! assert_eq!(errors.keys(), vec!["FIELD_A", "FIELD_B"]);
//! assert!(errors.iter().all(|e| e.kind == ErrorKind::Required));
//! ```

pub mod docs;
pub mod error;
pub mod field;
pub mod loader;
pub mod naming;
pub mod parser;
pub mod source;

// Re-export main types
pub use error::{ErrorCollection, ErrorKind, FieldError, ValueTypeMismatch};
pub use field::{DefaultSource, EnvRecord, FieldDescriptor};
pub use loader::{Binding, FromEnv, Loader, bind};
pub use parser::{BoxedValue, ParseError, Parser, ParserChain, ParserMap};
pub use source::{EnvLookup, FnEnv, MapEnv, ProcessEnv};

// Re-export derives
pub use envbind_macros::{DefaultSource, EnvRecord};
