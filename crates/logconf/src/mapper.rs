//! Record to parameter mapping.

use secrecy::ExposeSecret;

use crate::config::{Dialect, Grammar};
use crate::error::CompileError;
use crate::field::{FieldDescriptor, FieldValue, Shape};
use crate::params::{ParamValue, Params};
use crate::path::RecordPath;
use crate::record::{Record, RecordMeta};
use crate::secret::SecretLoader;
use crate::tags::{FieldRole, TagSettings};

/// A field descriptor together with its parsed annotation and output key.
#[derive(Debug, Clone)]
pub struct AnnotatedField<'a> {
    pub descriptor: FieldDescriptor<'a>,
    pub settings: TagSettings,
    pub key: String,
}

/// Parse every field annotation of a record and compute output keys.
pub fn annotate<'a>(
    meta: &RecordMeta,
    fields: Vec<FieldDescriptor<'a>>,
    dialect: &Dialect,
    path: &RecordPath,
) -> Result<Vec<AnnotatedField<'a>>, CompileError> {
    fields
        .into_iter()
        .map(|descriptor| -> Result<AnnotatedField<'a>, CompileError> {
            let settings = TagSettings::parse(descriptor.tag).map_err(|err| {
                CompileError::tag_parse(meta.type_name, descriptor.name, path, err)
            })?;
            let key = match settings.name() {
                Some(name) => name.to_string(),
                None => dialect.key_case.apply(descriptor.name),
            };
            Ok(AnnotatedField {
                descriptor,
                settings,
                key,
            })
        })
        .collect()
}

/// Parameters of one record plus the header values routed out of them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MappedRecord {
    pub params: Params,
    pub plugin_type: Option<String>,
    pub argument: Option<String>,
}

pub struct ParamMapper<'l, L: ?Sized> {
    loader: &'l L,
    dialect: Dialect,
}

impl<'l, L: SecretLoader + ?Sized> ParamMapper<'l, L> {
    pub fn new(loader: &'l L, dialect: Dialect) -> Self {
        Self { loader, dialect }
    }

    /// Map a whole record, ignoring header roles.
    pub fn map(&self, record: &dyn Record, path: &RecordPath) -> Result<Params, CompileError> {
        let meta = record.meta();
        let fields = annotate(meta, record.fields(), &self.dialect, path)?;
        Ok(self.map_fields(meta, &fields, path)?.params)
    }

    pub fn map_fields(
        &self,
        meta: &RecordMeta,
        fields: &[AnnotatedField<'_>],
        path: &RecordPath,
    ) -> Result<MappedRecord, CompileError> {
        let mut mapped = MappedRecord::default();

        for field in fields {
            let settings = &field.settings;
            if settings.is_skipped() || settings.is_driver() || field.descriptor.shape.is_record() {
                continue;
            }

            // Brace blocks have a positional argument but no type header.
            let role = match (self.dialect.grammar, settings.role()) {
                (Grammar::Directive, role) => role,
                (Grammar::Brace, Some(FieldRole::Argument)) => Some(FieldRole::Argument),
                (Grammar::Brace, _) => None,
            };
            if role.is_some() && !is_scalar(field.descriptor.shape) {
                return Err(CompileError::unsupported_field_type(
                    meta.type_name,
                    field.descriptor.name,
                    path,
                    field.descriptor.shape,
                    "header fields must be scalars",
                ));
            }

            let Some(value) = self.field_value(meta, field, path)? else {
                continue;
            };
            tracing::trace!(record = meta.type_name, key = %field.key, "mapped field");

            match role {
                Some(FieldRole::PluginType) => mapped.plugin_type = Some(value.to_string()),
                Some(FieldRole::Argument) => mapped.argument = Some(value.to_string()),
                None => mapped.params.insert(field.key.clone(), value),
            }
        }

        Ok(mapped)
    }

    fn field_value(
        &self,
        meta: &RecordMeta,
        field: &AnnotatedField<'_>,
        path: &RecordPath,
    ) -> Result<Option<ParamValue>, CompileError> {
        let descriptor = &field.descriptor;
        let settings = &field.settings;

        if let Some(value) = &descriptor.value {
            if value.shape() != descriptor.shape {
                return Err(CompileError::unsupported_field_type(
                    meta.type_name,
                    descriptor.name,
                    path,
                    descriptor.shape,
                    format!("value of shape {} does not match the declaration", value.shape()),
                ));
            }
        }

        let value = match &descriptor.value {
            Some(value) if !is_unset(descriptor, value, settings) => value,
            _ => {
                if let Some(default) = settings.default_value() {
                    return Ok(Some(ParamValue::Scalar(default.to_string())));
                }
                if settings.is_required() {
                    return Err(CompileError::missing_required(
                        meta.type_name,
                        descriptor.name,
                        path,
                        field.key.clone(),
                    ));
                }
                return Ok(None);
            }
        };

        if value.is_zero() && settings.omit_empty() {
            return Ok(None);
        }

        let rendered = match value {
            FieldValue::String(s) => ParamValue::Scalar(s.to_string()),
            FieldValue::Bool(b) => ParamValue::Scalar(self.dialect.bool_literal(*b).to_string()),
            FieldValue::Int(n) => ParamValue::Scalar(n.to_string()),
            FieldValue::Float(x) => ParamValue::Scalar(x.to_string()),
            FieldValue::Float32(x) => ParamValue::Scalar(x.to_string()),
            FieldValue::List(items) => ParamValue::List(items.to_vec()),
            FieldValue::Map(entries) => {
                if !self.dialect.allow_maps {
                    return Err(CompileError::unsupported_field_type(
                        meta.type_name,
                        descriptor.name,
                        path,
                        Shape::Map,
                        "this grammar has no map syntax",
                    ));
                }
                ParamValue::Map(
                    entries
                        .iter()
                        .map(|(k, v)| (k.to_string(), v.to_string()))
                        .collect(),
                )
            }
            FieldValue::Secret(secret) => {
                let resolved = self.loader.load(secret).map_err(|err| {
                    CompileError::secret_resolution(meta.type_name, descriptor.name, path, err)
                })?;
                tracing::trace!(record = meta.type_name, field = descriptor.name, "resolved secret");
                let resolved = resolved.expose_secret();
                if resolved.is_empty() && settings.omit_empty() {
                    return Ok(None);
                }
                ParamValue::Scalar(resolved.to_string())
            }
            FieldValue::Record(_) | FieldValue::RecordList(_) | FieldValue::Variant(_) => {
                return Err(CompileError::unsupported_field_type(
                    meta.type_name,
                    descriptor.name,
                    path,
                    value.shape(),
                    "nested records are rendered as blocks, not parameters",
                ));
            }
        };

        Ok(Some(rendered))
    }
}

/// A present value counts as unset when the field is not `Option`-typed, holds
/// its zero value, and the annotation gives the zero value a meaning.
fn is_unset(descriptor: &FieldDescriptor<'_>, value: &FieldValue<'_>, settings: &TagSettings) -> bool {
    !descriptor.optional
        && value.is_zero()
        && (settings.is_optional() || settings.default_value().is_some() || settings.is_required())
}

fn is_scalar(shape: Shape) -> bool {
    matches!(shape, Shape::String | Shape::Bool | Shape::Int | Shape::Float)
}

#[cfg(test)]
mod tests {
    use secrecy::SecretString;

    use super::*;
    use crate::error::ErrorKind;
    use crate::secret::{Secret, SecretError, StaticSecretLoader};

    static META: RecordMeta = RecordMeta::new("Sample");

    fn annotated<'a>(fields: Vec<FieldDescriptor<'a>>, dialect: &Dialect) -> Vec<AnnotatedField<'a>> {
        annotate(&META, fields, dialect, &RecordPath::root("Sample")).unwrap()
    }

    fn map(fields: Vec<FieldDescriptor<'_>>, dialect: Dialect) -> Result<MappedRecord, CompileError> {
        let loader = StaticSecretLoader::new();
        let fields = annotated(fields, &dialect);
        ParamMapper::new(&loader, dialect).map_fields(&META, &fields, &RecordPath::root("Sample"))
    }

    #[test]
    fn lowers_names_and_applies_renames() {
        let stream = "orders".to_string();
        let retries = 3u32;
        let mapped = map(
            vec![
                FieldDescriptor::of("stream_name", "", &stream),
                FieldDescriptor::of("retries", "name=aws_iam_retries", &retries),
            ],
            Dialect::directive(),
        )
        .unwrap();
        assert_eq!(
            mapped.params.keys().collect::<Vec<_>>(),
            vec!["stream_name", "aws_iam_retries"]
        );
        assert_eq!(mapped.params.get("aws_iam_retries"), Some(&ParamValue::from("3")));
    }

    #[test]
    fn nil_fields_fall_back_to_defaults() {
        let unset: Option<String> = None;
        let mapped = map(
            vec![
                FieldDescriptor::of("format", "default=json", &unset),
                FieldDescriptor::of("region", "", &unset),
            ],
            Dialect::directive(),
        )
        .unwrap();
        assert_eq!(mapped.params.get("format"), Some(&ParamValue::from("json")));
        assert!(!mapped.params.contains_key("region"));
    }

    #[test]
    fn optional_zero_values_are_unset() {
        let empty = String::new();
        let zero = 0i64;
        let mapped = map(
            vec![
                FieldDescriptor::of("prefix", "optional", &empty),
                FieldDescriptor::of("marker", "", &empty),
                FieldDescriptor::of("retries", "optional,default=5", &zero),
            ],
            Dialect::brace(),
        )
        .unwrap();
        assert!(!mapped.params.contains_key("prefix"));
        assert_eq!(mapped.params.get("marker"), Some(&ParamValue::from("")));
        assert_eq!(mapped.params.get("retries"), Some(&ParamValue::from("5")));
    }

    #[test]
    fn explicit_option_values_survive_zero() {
        let flag = Some(false);
        let mapped = map(
            vec![FieldDescriptor::of("reset_backoff", "default=true", &flag)],
            Dialect::directive(),
        )
        .unwrap();
        assert_eq!(mapped.params.get("reset_backoff"), Some(&ParamValue::from("false")));
    }

    #[test]
    fn omitempty_drops_zero_values() {
        let empty = String::new();
        let set = "key".to_string();
        let mapped = map(
            vec![
                FieldDescriptor::of("partition_key", "omitempty", &empty),
                FieldDescriptor::of("message_key", "omitempty", &set),
            ],
            Dialect::directive(),
        )
        .unwrap();
        assert_eq!(mapped.params.keys().collect::<Vec<_>>(), vec!["message_key"]);
    }

    #[test]
    fn required_fields_must_be_set() {
        let empty = String::new();
        let err = map(
            vec![FieldDescriptor::of("stream_name", "required", &empty)],
            Dialect::directive(),
        )
        .unwrap_err();
        assert!(matches!(err.kind, ErrorKind::MissingRequired { ref key } if key == "stream_name"));
        assert_eq!(err.field.as_deref(), Some("stream_name"));
    }

    #[test]
    fn booleans_follow_the_dialect() {
        let on = true;
        let directive = map(vec![FieldDescriptor::of("create_dirs", "", &on)], Dialect::directive())
            .unwrap();
        let brace = map(vec![FieldDescriptor::of("create_dirs", "", &on)], Dialect::brace()).unwrap();
        assert_eq!(directive.params.get("create_dirs"), Some(&ParamValue::from("true")));
        assert_eq!(brace.params.get("create-dirs"), Some(&ParamValue::from("yes")));
    }

    #[test]
    fn maps_are_rejected_by_the_brace_grammar() {
        let labels: std::collections::BTreeMap<String, String> =
            [("app".to_string(), "web".to_string())].into_iter().collect();
        let err = map(vec![FieldDescriptor::of("labels", "", &labels)], Dialect::brace()).unwrap_err();
        assert!(matches!(
            err.kind,
            ErrorKind::UnsupportedFieldType { shape: Shape::Map, .. }
        ));
        let ok = map(vec![FieldDescriptor::of("labels", "", &labels)], Dialect::directive()).unwrap();
        assert_eq!(
            ok.params.get("labels"),
            Some(&ParamValue::Map(vec![("app".into(), "web".into())]))
        );
    }

    #[test]
    fn roles_move_values_to_the_header() {
        let kind = String::new();
        let tags = "tag,time".to_string();
        let mapped = map(
            vec![
                FieldDescriptor::of("kind", "name=type,type,default=json", &kind),
                FieldDescriptor::of("tags", "arg", &tags),
            ],
            Dialect::directive(),
        )
        .unwrap();
        assert!(mapped.params.is_empty());
        assert_eq!(mapped.plugin_type.as_deref(), Some("json"));
        assert_eq!(mapped.argument.as_deref(), Some("tag,time"));
    }

    #[test]
    fn brace_grammar_keeps_only_the_positional_argument() {
        let kind = "raw".to_string();
        let path = "/var/log/app.log".to_string();
        let mapped = map(
            vec![
                FieldDescriptor::of("kind", "name=type,type", &kind),
                FieldDescriptor::of("path", "arg,required", &path),
            ],
            Dialect::brace(),
        )
        .unwrap();
        assert_eq!(mapped.plugin_type, None);
        assert_eq!(mapped.argument.as_deref(), Some("/var/log/app.log"));
        assert_eq!(mapped.params.keys().collect::<Vec<_>>(), vec!["type"]);
    }

    #[test]
    fn colliding_keys_keep_the_later_value_in_the_first_position() {
        let first = "a".to_string();
        let middle = "m".to_string();
        let second = "b".to_string();
        let mapped = map(
            vec![
                FieldDescriptor::of("primary", "name=key", &first),
                FieldDescriptor::of("region", "", &middle),
                FieldDescriptor::of("fallback", "name=key", &second),
            ],
            Dialect::directive(),
        )
        .unwrap();
        assert_eq!(mapped.params.keys().collect::<Vec<_>>(), vec!["key", "region"]);
        assert_eq!(mapped.params.get("key"), Some(&ParamValue::from("b")));
        assert_eq!(mapped.params.len(), 2);
    }

    #[test]
    fn single_precision_floats_render_their_shortest_form() {
        let ratio = 0.1f32;
        let limit = 2.5f32;
        let wide = 0.1f64;
        let mapped = map(
            vec![
                FieldDescriptor::of("ratio", "", &ratio),
                FieldDescriptor::of("limit", "", &limit),
                FieldDescriptor::of("wide", "", &wide),
            ],
            Dialect::directive(),
        )
        .unwrap();
        assert_eq!(mapped.params.get("ratio"), Some(&ParamValue::from("0.1")));
        assert_eq!(mapped.params.get("limit"), Some(&ParamValue::from("2.5")));
        assert_eq!(mapped.params.get("wide"), Some(&ParamValue::from("0.1")));
    }

    #[test]
    fn secrets_resolve_through_the_loader() {
        let loader = |_: &Secret| -> Result<SecretString, SecretError> {
            Ok(SecretString::from("abc".to_string()))
        };
        let secret = Some(Secret::from_key("aws", "id"));
        let dialect = Dialect::directive();
        let fields = annotated(vec![FieldDescriptor::of("aws_key_id", "", &secret)], &dialect);
        let mapped = ParamMapper::new(&loader, dialect)
            .map_fields(&META, &fields, &RecordPath::root("Sample"))
            .unwrap();
        assert_eq!(mapped.params.get("aws_key_id"), Some(&ParamValue::from("abc")));
    }

    #[test]
    fn secret_failures_propagate() {
        let secret = Some(Secret::from_key("aws", "missing"));
        let err = map(vec![FieldDescriptor::of("aws_key_id", "", &secret)], Dialect::directive())
            .unwrap_err();
        assert!(matches!(
            err.kind,
            ErrorKind::SecretResolution(SecretError::NotFound { .. })
        ));
    }

    #[test]
    fn malformed_tags_abort_annotation() {
        let value = String::new();
        let err = annotate(
            &META,
            vec![FieldDescriptor::of("prefix", "name=", &value)],
            &Dialect::brace(),
            &RecordPath::root("Sample"),
        )
        .unwrap_err();
        assert!(matches!(err.kind, ErrorKind::TagParse(_)));
    }
}
