use std::fmt;

use crate::field::Shape;
use crate::path::RecordPath;
use crate::secret::SecretError;
use crate::tags::TagParseError;

/// Failure of one compile call. Nothing is rendered when this is returned.
#[derive(Debug)]
pub struct CompileError {
    pub record: String,
    pub field: Option<String>,
    pub path: RecordPath,
    pub kind: ErrorKind,
}

#[derive(Debug)]
pub enum ErrorKind {
    TagParse(TagParseError),
    SecretResolution(SecretError),
    MultipleActiveVariants { fields: Vec<String> },
    UnsupportedFieldType { shape: Shape, reason: String },
    MissingRequired { key: String },
    MissingVariant,
    Custom(String),
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::TagParse(err) => write!(f, "{err}"),
            ErrorKind::SecretResolution(err) => write!(f, "secret resolution failed: {err}"),
            ErrorKind::MultipleActiveVariants { fields } => {
                write!(f, "multiple active variants: {}", fields.join(", "))
            }
            ErrorKind::UnsupportedFieldType { shape, reason } => {
                write!(f, "unsupported {shape} field: {reason}")
            }
            ErrorKind::MissingRequired { key } => {
                write!(f, "required value '{key}' is missing")
            }
            ErrorKind::MissingVariant => {
                write!(f, "record has no directive name and no active variant")
            }
            ErrorKind::Custom(msg) => write!(f, "{msg}"),
        }
    }
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "error compiling {}", self.record)?;

        if let Some(ref field) = self.field {
            write!(f, " field '{field}'")?;
        }

        if !self.path.is_empty() {
            write!(f, " (path: {})", self.path)?;
        }

        write!(f, ": {}", self.kind)
    }
}

impl std::error::Error for CompileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.kind {
            ErrorKind::TagParse(err) => Some(err),
            ErrorKind::SecretResolution(err) => Some(err),
            _ => None,
        }
    }
}

impl CompileError {
    pub fn new(record: impl Into<String>, path: &RecordPath, kind: ErrorKind) -> Self {
        Self {
            record: record.into(),
            field: None,
            path: path.clone(),
            kind,
        }
    }

    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    pub fn tag_parse(
        record: impl Into<String>,
        field: impl Into<String>,
        path: &RecordPath,
        err: TagParseError,
    ) -> Self {
        Self::new(record, path, ErrorKind::TagParse(err)).with_field(field)
    }

    pub fn secret_resolution(
        record: impl Into<String>,
        field: impl Into<String>,
        path: &RecordPath,
        err: SecretError,
    ) -> Self {
        Self::new(record, path, ErrorKind::SecretResolution(err)).with_field(field)
    }

    pub fn multiple_active_variants(
        record: impl Into<String>,
        path: &RecordPath,
        fields: Vec<String>,
    ) -> Self {
        Self::new(record, path, ErrorKind::MultipleActiveVariants { fields })
    }

    pub fn unsupported_field_type(
        record: impl Into<String>,
        field: impl Into<String>,
        path: &RecordPath,
        shape: Shape,
        reason: impl Into<String>,
    ) -> Self {
        Self::new(
            record,
            path,
            ErrorKind::UnsupportedFieldType {
                shape,
                reason: reason.into(),
            },
        )
        .with_field(field)
    }

    pub fn missing_required(
        record: impl Into<String>,
        field: impl Into<String>,
        path: &RecordPath,
        key: impl Into<String>,
    ) -> Self {
        Self::new(record, path, ErrorKind::MissingRequired { key: key.into() }).with_field(field)
    }

    pub fn missing_variant(record: impl Into<String>, path: &RecordPath) -> Self {
        Self::new(record, path, ErrorKind::MissingVariant)
    }

    pub fn custom(record: impl Into<String>, path: &RecordPath, message: impl Into<String>) -> Self {
        Self::new(record, path, ErrorKind::Custom(message.into()))
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error;

    use super::*;
    use crate::tags::TagSettings;

    #[test]
    fn display_localizes_the_fault() {
        let path = RecordPath::root("Destination").child("file");
        let err = CompileError::missing_required("FileDestination", "path", &path, "path");
        assert_eq!(
            err.to_string(),
            "error compiling FileDestination field 'path' (path: /Destination/file): required value 'path' is missing"
        );
    }

    #[test]
    fn exposes_the_leaf_error_as_source() {
        let tag_err = TagSettings::parse("name=").unwrap_err();
        let err = CompileError::tag_parse("Format", "kind", &RecordPath::root("Format"), tag_err);
        assert!(err.source().is_some());
        assert!(matches!(err.kind, ErrorKind::TagParse(_)));
    }
}
