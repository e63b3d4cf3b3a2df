//! Record to output tree assembly.
//!
//! A [`Compiler`] walks a record graph once and returns either a complete
//! [`Directive`] / [`Block`] tree or the first [`CompileError`] it meets. The
//! only side effect is the secret loader call.

use std::collections::BTreeSet;

use crate::block::{Block, StatementKind};
use crate::config::{resolve_dialect, Dialect, Grammar};
use crate::directive::Directive;
use crate::error::CompileError;
use crate::field::{FieldValue, Shape};
use crate::mapper::{annotate, MappedRecord, ParamMapper};
use crate::path::RecordPath;
use crate::record::{Record, RecordMeta};
use crate::secret::SecretLoader;
use crate::selector::{select_variant, ActiveVariant};

/// Nested records declared on a record, rendered after its variant.
struct SubBlock<'a> {
    key: String,
    field: &'static str,
    order: i32,
    records: Vec<&'a dyn Record>,
    repeated: bool,
}

struct Prepared<'a> {
    meta: &'static RecordMeta,
    mapped: MappedRecord,
    variant: Option<ActiveVariant<'a>>,
    sub_blocks: Vec<SubBlock<'a>>,
}

impl<'a> Prepared<'a> {
    /// Unwrap a nameless record that only exists to hold a variant.
    fn into_variant(self, path: &RecordPath) -> Result<ActiveVariant<'a>, CompileError> {
        let MappedRecord {
            params,
            plugin_type,
            argument,
        } = &self.mapped;
        if !params.is_empty() || plugin_type.is_some() || argument.is_some() || !self.sub_blocks.is_empty() {
            return Err(CompileError::custom(
                self.meta.type_name,
                path,
                "a record without a directive name may only wrap a variant",
            ));
        }
        let type_name = self.meta.type_name;
        self.variant
            .ok_or_else(|| CompileError::missing_variant(type_name, path))
    }
}

pub struct Compiler<'l, L: ?Sized> {
    loader: &'l L,
}

impl<'l, L: SecretLoader + ?Sized> Compiler<'l, L> {
    pub fn new(loader: &'l L) -> Self {
        Self { loader }
    }

    /// Compile `record` into a directive tree whose ids are namespaced under `id`.
    ///
    /// A root record without a directive name is a wrapper: its single active
    /// variant becomes the root instead.
    pub fn directive(&self, record: &dyn Record, id: &str) -> Result<Directive, CompileError> {
        let meta = record.meta();
        let path = RecordPath::root(meta.type_name);

        let mut ids = BTreeSet::new();
        if meta.name.is_some() {
            return self.directive_node(record, id, None, None, &path, &mut ids);
        }

        let variant = self.prepare(record, Grammar::Directive, &path)?.into_variant(&path)?;
        let child_path = path.child(variant.field);
        self.directive_node(variant.record, id, None, None, &child_path, &mut ids)
    }

    /// Compile `record` into a `kind name { ... };` statement.
    pub fn block(&self, kind: StatementKind, name: &str, record: &dyn Record) -> Result<Block, CompileError> {
        let meta = record.meta();
        let path = RecordPath::root(meta.type_name);
        let body = self.block_body(record, &path)?;
        if body.argument.is_some() {
            return Err(CompileError::custom(
                meta.type_name,
                &path,
                "a top-level statement takes no positional argument",
            ));
        }
        tracing::debug!(
            record = meta.type_name,
            kind = %kind,
            statement = name,
            children = body.children.len(),
            "compiled statement"
        );
        Ok(Block {
            kind: Some(kind),
            name: name.to_string(),
            ..body
        })
    }

    fn prepare<'a>(
        &self,
        record: &'a dyn Record,
        grammar: Grammar,
        path: &RecordPath,
    ) -> Result<Prepared<'a>, CompileError> {
        let meta = record.meta();
        let dialect = resolve_dialect(&Dialect::for_grammar(grammar), meta.overrides());
        let fields = annotate(meta, record.fields(), &dialect, path)?;

        let mapped = ParamMapper::new(self.loader, dialect).map_fields(meta, &fields, path)?;
        let variant = select_variant(meta, &fields, path)?;

        let mut sub_blocks = Vec::new();
        for field in &fields {
            let descriptor = &field.descriptor;
            let settings = &field.settings;
            if settings.is_skipped() || settings.is_driver() {
                continue;
            }
            if !matches!(descriptor.shape, Shape::Record | Shape::RecordList) {
                continue;
            }

            let (records, repeated) = match &descriptor.value {
                Some(FieldValue::Record(record)) => (vec![*record], false),
                Some(FieldValue::RecordList(records)) => (records.clone(), true),
                _ => (Vec::new(), descriptor.shape == Shape::RecordList),
            };
            if records.is_empty() {
                if settings.is_required() {
                    return Err(CompileError::missing_required(
                        meta.type_name,
                        descriptor.name,
                        path,
                        field.key.clone(),
                    ));
                }
                continue;
            }

            sub_blocks.push(SubBlock {
                key: field.key.clone(),
                field: descriptor.name,
                order: settings.order(),
                records,
                repeated,
            });
        }
        sub_blocks.sort_by(|a, b| (a.order, &a.key).cmp(&(b.order, &b.key)));

        Ok(Prepared {
            meta,
            mapped,
            variant,
            sub_blocks,
        })
    }

    fn directive_node(
        &self,
        record: &dyn Record,
        base: &str,
        index: Option<usize>,
        fallback_name: Option<&str>,
        path: &RecordPath,
        ids: &mut BTreeSet<String>,
    ) -> Result<Directive, CompileError> {
        let prepared = self.prepare(record, Grammar::Directive, path)?;
        let meta = prepared.meta;
        let Some(name) = meta.name.or(fallback_name) else {
            return Err(CompileError::custom(
                meta.type_name,
                path,
                "nested record has no directive name",
            ));
        };

        let plugin_type = prepared
            .mapped
            .plugin_type
            .or_else(|| meta.plugin.map(str::to_string));
        let argument = prepared
            .mapped
            .argument
            .or_else(|| meta.argument.map(str::to_string));

        let id = if meta.anonymous || base.is_empty() {
            None
        } else {
            let suffix = plugin_type.as_deref().unwrap_or(name);
            let candidate = match index {
                Some(index) => format!("{base}_{suffix}_{index}"),
                None => format!("{base}_{suffix}"),
            };
            Some(claim_id(ids, candidate))
        };
        let child_base = id.as_deref().unwrap_or(base);

        let mut children = Vec::new();
        if let Some(variant) = &prepared.variant {
            children.push(self.directive_node(
                variant.record,
                child_base,
                None,
                Some(variant.key.as_str()),
                &path.child(variant.field),
                ids,
            )?);
        }
        for sub_block in &prepared.sub_blocks {
            for (position, child) in sub_block.records.iter().enumerate() {
                let index = sub_block.repeated.then_some(position);
                let child_path = match index {
                    Some(index) => path.element(sub_block.field, index),
                    None => path.child(sub_block.field),
                };
                children.push(self.directive_node(
                    *child,
                    child_base,
                    index,
                    Some(sub_block.key.as_str()),
                    &child_path,
                    ids,
                )?);
            }
        }

        tracing::debug!(
            record = meta.type_name,
            directive = name,
            id = id.as_deref().unwrap_or(""),
            children = children.len(),
            "compiled directive"
        );

        Ok(Directive {
            name: name.to_string(),
            argument,
            plugin_type,
            id,
            params: prepared.mapped.params,
            children,
        })
    }

    /// Parameters, positional argument and children of a brace block, unnamed.
    fn block_body(&self, record: &dyn Record, path: &RecordPath) -> Result<Block, CompileError> {
        let prepared = self.prepare(record, Grammar::Brace, path)?;

        let mut children = Vec::new();
        if let Some(variant) = &prepared.variant {
            let label = variant.record.meta().name.unwrap_or(variant.key.as_str());
            children.push(self.nested_block(label, variant.record, &path.child(variant.field))?);
        }
        for sub_block in &prepared.sub_blocks {
            for (position, child) in sub_block.records.iter().enumerate() {
                let child_path = if sub_block.repeated {
                    path.element(sub_block.field, position)
                } else {
                    path.child(sub_block.field)
                };
                children.push(self.nested_block(&sub_block.key, *child, &child_path)?);
            }
        }

        Ok(Block {
            argument: prepared.mapped.argument,
            params: prepared.mapped.params,
            children,
            ..Default::default()
        })
    }

    fn nested_block(&self, label: &str, record: &dyn Record, path: &RecordPath) -> Result<Block, CompileError> {
        let body = self.block_body(record, path)?;
        tracing::debug!(record = record.meta().type_name, block = label, "compiled block");
        Ok(Block {
            name: label.to_string(),
            ..body
        })
    }
}

/// Reserve `candidate` in `taken`, appending `_1`, `_2`, ... until it is free.
fn claim_id(taken: &mut BTreeSet<String>, candidate: String) -> String {
    let mut id = candidate.clone();
    let mut n = 1;
    while taken.contains(&id) {
        id = format!("{candidate}_{n}");
        n += 1;
    }
    taken.insert(id.clone());
    id
}

pub fn compile_directive<L: SecretLoader + ?Sized>(
    loader: &L,
    record: &dyn Record,
    id: &str,
) -> Result<Directive, CompileError> {
    Compiler::new(loader).directive(record, id)
}

pub fn compile_block<L: SecretLoader + ?Sized>(
    loader: &L,
    kind: StatementKind,
    name: &str,
    record: &dyn Record,
) -> Result<Block, CompileError> {
    Compiler::new(loader).block(kind, name, record)
}

/// `destination <name> { ... };`
pub fn destination_def<L: SecretLoader + ?Sized>(
    loader: &L,
    name: &str,
    record: &dyn Record,
) -> Result<Block, CompileError> {
    compile_block(loader, StatementKind::Destination, name, record)
}

/// `parser <name> { ... };`
pub fn parser_def<L: SecretLoader + ?Sized>(
    loader: &L,
    name: &str,
    record: &dyn Record,
) -> Result<Block, CompileError> {
    compile_block(loader, StatementKind::Parser, name, record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::field::{FieldDescriptor, FieldType};
    use crate::secret::StaticSecretLoader;

    static LEAF_META: RecordMeta = RecordMeta {
        name: Some("format"),
        anonymous: true,
        ..RecordMeta::new("Leaf")
    };
    static WRAPPER_META: RecordMeta = RecordMeta::new("Wrapper");

    struct Leaf {
        kind: String,
    }

    impl Record for Leaf {
        fn meta(&self) -> &'static RecordMeta {
            &LEAF_META
        }

        fn fields(&self) -> Vec<FieldDescriptor<'_>> {
            vec![FieldDescriptor::of("kind", "name=type,type,default=json", &self.kind)]
        }
    }

    impl FieldType for Leaf {
        const SHAPE: Shape = Shape::Record;

        fn field_value(&self) -> Option<FieldValue<'_>> {
            Some(FieldValue::Record(self))
        }
    }

    struct Wrapper {
        extra: String,
        leaf: Option<Leaf>,
    }

    impl Record for Wrapper {
        fn meta(&self) -> &'static RecordMeta {
            &WRAPPER_META
        }

        fn fields(&self) -> Vec<FieldDescriptor<'_>> {
            vec![
                FieldDescriptor::of("extra", "omitempty", &self.extra),
                FieldDescriptor::of("leaf", "driver", &self.leaf),
            ]
        }
    }

    #[test]
    fn transparent_root_compiles_its_variant() {
        let loader = StaticSecretLoader::new();
        let wrapper = Wrapper {
            extra: String::new(),
            leaf: Some(Leaf { kind: String::new() }),
        };
        let directive = compile_directive(&loader, &wrapper, "out1").unwrap();
        assert_eq!(directive.name, "format");
        assert_eq!(directive.plugin_type.as_deref(), Some("json"));
        assert_eq!(directive.id, None);
    }

    #[test]
    fn transparent_root_needs_a_variant() {
        let loader = StaticSecretLoader::new();
        let wrapper = Wrapper {
            extra: String::new(),
            leaf: None,
        };
        let err = compile_directive(&loader, &wrapper, "out1").unwrap_err();
        assert!(matches!(err.kind, ErrorKind::MissingVariant));
    }

    #[test]
    fn transparent_root_rejects_its_own_params() {
        let loader = StaticSecretLoader::new();
        let wrapper = Wrapper {
            extra: "x".into(),
            leaf: Some(Leaf { kind: String::new() }),
        };
        let err = compile_directive(&loader, &wrapper, "out1").unwrap_err();
        assert!(matches!(err.kind, ErrorKind::Custom(_)));
    }

    #[test]
    fn brace_children_are_labelled_by_driver_name() {
        let loader = StaticSecretLoader::new();
        let wrapper = Wrapper {
            extra: String::new(),
            leaf: Some(Leaf { kind: "raw".into() }),
        };
        let block = parser_def(&loader, "p1", &wrapper).unwrap();
        assert_eq!(block.render(), "parser p1 {\n    format(\n        type(raw)\n    );\n};\n");
    }

    #[test]
    fn statements_reject_a_positional_argument() {
        static HOST_META: RecordMeta = RecordMeta::new("Host");
        struct Host {
            host: String,
        }
        impl Record for Host {
            fn meta(&self) -> &'static RecordMeta {
                &HOST_META
            }

            fn fields(&self) -> Vec<FieldDescriptor<'_>> {
                vec![FieldDescriptor::of("host", "arg", &self.host)]
            }
        }

        let host = Host { host: "collector".into() };
        let err = destination_def(&StaticSecretLoader::new(), "d1", &host).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::Custom(_)));
    }

    #[test]
    fn claimed_ids_get_a_counter_on_collision() {
        let mut taken = BTreeSet::new();
        assert_eq!(claim_id(&mut taken, "o_json".into()), "o_json");
        assert_eq!(claim_id(&mut taken, "o_json".into()), "o_json_1");
        assert_eq!(claim_id(&mut taken, "o_json".into()), "o_json_2");
        assert_eq!(claim_id(&mut taken, "o_json_1".into()), "o_json_1_1");
        assert_eq!(claim_id(&mut taken, "o_csv".into()), "o_csv");
    }
}
