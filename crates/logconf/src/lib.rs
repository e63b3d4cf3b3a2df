#![allow(clippy::result_large_err)]

extern crate self as logconf;

pub mod block;
pub mod catalog;
pub mod compile;
pub mod config;
pub mod directive;
pub mod error;
pub mod field;
pub mod mapper;
pub mod params;
pub mod path;
pub mod record;
pub mod render;
pub mod secret;
pub mod selector;
pub mod tags;

pub use block::{render_blocks, Block, StatementKind};
pub use compile::{compile_block, compile_directive, destination_def, parser_def, Compiler};
pub use config::{resolve_dialect, Dialect, DialectOverrides, Grammar, KeyCase};
pub use directive::{render_directives, Directive};
pub use error::{CompileError, ErrorKind};
pub use field::{FieldDescriptor, FieldType, FieldValue, Shape};
pub use mapper::{annotate, AnnotatedField, MappedRecord, ParamMapper};
pub use params::{ParamValue, Params};
pub use path::RecordPath;
pub use record::{Record, RecordMeta};
pub use secret::{
    MountSecretLoader, MountedSecret, Secret, SecretError, SecretKeyRef, SecretLoader,
    StaticSecretLoader, ValueFrom,
};
pub use selector::{select_variant, ActiveVariant};
pub use tags::{FieldRole, TagErrorReason, TagParseError, TagSettings};

// Re-export the derive macro so users only need to depend on `logconf`
pub use logconf_derive::Record;
