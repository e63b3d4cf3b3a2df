use crate::config::{DialectOverrides, KeyCase};
use crate::field::FieldDescriptor;

/// Static, per-type description of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordMeta {
    /// Rust type name, used in error context.
    pub type_name: &'static str,
    /// Directive name (`match`, `buffer`) or brace driver name (`json-parser`).
    /// Records without one are transparent wrappers around a variant.
    pub name: Option<&'static str>,
    /// Fixed plugin type emitted as `@type`.
    pub plugin: Option<&'static str>,
    /// Fixed directive header argument, e.g. the `**` of `<match **>`.
    pub argument: Option<&'static str>,
    /// Suppress the synthesized `@id`.
    pub anonymous: bool,
    pub rename_all: Option<KeyCase>,
}

impl RecordMeta {
    pub const fn new(type_name: &'static str) -> Self {
        Self {
            type_name,
            name: None,
            plugin: None,
            argument: None,
            anonymous: false,
            rename_all: None,
        }
    }

    pub fn overrides(&self) -> DialectOverrides {
        DialectOverrides {
            key_case: self.rename_all,
        }
    }
}

/// A configuration record: a value whose fields can be enumerated as
/// [`FieldDescriptor`]s in declaration order.
///
/// Usually implemented with `#[derive(Record)]`; manual implementations build
/// the same table with [`FieldDescriptor::of`].
pub trait Record {
    fn meta(&self) -> &'static RecordMeta;

    fn fields(&self) -> Vec<FieldDescriptor<'_>>;
}

impl<T: Record + ?Sized> Record for Box<T> {
    fn meta(&self) -> &'static RecordMeta {
        (**self).meta()
    }

    fn fields(&self) -> Vec<FieldDescriptor<'_>> {
        (**self).fields()
    }
}
