//! Driver selection: which nested variant of a record is active.

use crate::error::CompileError;
use crate::field::{FieldValue, Shape};
use crate::mapper::AnnotatedField;
use crate::path::RecordPath;
use crate::record::{Record, RecordMeta};

/// The single active driver of a record.
pub struct ActiveVariant<'a> {
    pub field: &'static str,
    pub key: String,
    pub record: &'a dyn Record,
}

impl std::fmt::Debug for ActiveVariant<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActiveVariant")
            .field("field", &self.field)
            .field("key", &self.key)
            .field("record", &self.record.meta().type_name)
            .finish()
    }
}

/// Find the active variant among `driver`-tagged fields and variant-typed fields.
///
/// At most one may be set; more than one is reported with every offending
/// field named rather than resolved by position.
pub fn select_variant<'a>(
    meta: &RecordMeta,
    fields: &[AnnotatedField<'a>],
    path: &RecordPath,
) -> Result<Option<ActiveVariant<'a>>, CompileError> {
    let mut active = Vec::new();

    for field in fields {
        let descriptor = &field.descriptor;
        let settings = &field.settings;
        if settings.is_skipped() {
            continue;
        }

        let is_driver = settings.is_driver();
        if !is_driver && descriptor.shape != Shape::Variant {
            continue;
        }

        if is_driver && !(descriptor.optional && matches!(descriptor.shape, Shape::Record | Shape::Variant)) {
            return Err(CompileError::unsupported_field_type(
                meta.type_name,
                descriptor.name,
                path,
                descriptor.shape,
                "driver candidates must be optional records",
            ));
        }

        match &descriptor.value {
            Some(FieldValue::Record(record)) | Some(FieldValue::Variant(record)) => {
                active.push(ActiveVariant {
                    field: descriptor.name,
                    key: field.key.clone(),
                    record: *record,
                });
            }
            None if settings.is_required() => {
                return Err(CompileError::missing_required(
                    meta.type_name,
                    descriptor.name,
                    path,
                    field.key.clone(),
                ));
            }
            None => {}
            Some(other) => {
                return Err(CompileError::unsupported_field_type(
                    meta.type_name,
                    descriptor.name,
                    path,
                    other.shape(),
                    "driver value is not a record",
                ));
            }
        }
    }

    if active.len() > 1 {
        let fields = active.iter().map(|v| v.field.to_string()).collect();
        return Err(CompileError::multiple_active_variants(meta.type_name, path, fields));
    }

    let selected = active.pop();
    if let Some(variant) = &selected {
        tracing::trace!(record = meta.type_name, field = variant.field, "selected variant");
    }
    Ok(selected)
}
