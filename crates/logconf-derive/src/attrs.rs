//! `#[conf(...)]` attribute parsing.

use syn::{Attribute, Expr, ExprLit, Lit, LitStr};

/// Key lowering strategy named by `rename_all`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenameAll {
    None,
    SnakeCase,
    KebabCase,
    Lowercase,
}

impl RenameAll {
    fn parse(value: &str) -> Option<Self> {
        match value {
            "none" => Some(Self::None),
            "snake_case" => Some(Self::SnakeCase),
            "kebab-case" => Some(Self::KebabCase),
            "lowercase" => Some(Self::Lowercase),
            _ => None,
        }
    }

    pub fn variant_ident(&self) -> &'static str {
        match self {
            Self::None => "None",
            Self::SnakeCase => "SnakeCase",
            Self::KebabCase => "KebabCase",
            Self::Lowercase => "Lowercase",
        }
    }
}

/// Container attributes of a record struct.
#[derive(Debug, Default)]
pub struct ContainerAttrs {
    pub name: Option<String>,
    pub plugin: Option<String>,
    pub argument: Option<String>,
    pub anonymous: bool,
    pub rename_all: Option<RenameAll>,
}

impl ContainerAttrs {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.plugin.is_none()
            && self.argument.is_none()
            && !self.anonymous
            && self.rename_all.is_none()
    }
}

pub fn parse_container_attrs(attrs: &[Attribute]) -> syn::Result<ContainerAttrs> {
    let mut result = ContainerAttrs::default();

    for attr in attrs {
        if !attr.path().is_ident("conf") {
            continue;
        }

        attr.parse_nested_meta(|meta| {
            let ident = meta.path.get_ident().map(|i| i.to_string());
            match ident.as_deref() {
                Some("name") => result.name = Some(string_value(&meta)?.value()),
                Some("plugin") => result.plugin = Some(string_value(&meta)?.value()),
                Some("argument") => result.argument = Some(string_value(&meta)?.value()),
                Some("anonymous") => result.anonymous = true,
                Some("rename_all") => {
                    let s = string_value(&meta)?;
                    match RenameAll::parse(&s.value()) {
                        Some(strategy) => result.rename_all = Some(strategy),
                        None => {
                            return Err(syn::Error::new_spanned(
                                s,
                                "invalid rename_all value, expected one of: kebab-case, snake_case, lowercase, none",
                            ))
                        }
                    }
                }
                _ => {
                    return Err(meta.error(
                        "unknown conf container attribute, expected one of: name, plugin, argument, anonymous, rename_all",
                    ))
                }
            }
            Ok(())
        })?;
    }

    Ok(result)
}

/// Raw annotation of one field, `""` when absent.
pub fn parse_field_tag(attrs: &[Attribute]) -> syn::Result<String> {
    let mut tag: Option<LitStr> = None;

    for attr in attrs {
        if !attr.path().is_ident("conf") {
            continue;
        }

        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("tag") {
                let value = string_value(&meta)?;
                if tag.is_some() {
                    return Err(syn::Error::new_spanned(value, "duplicate conf tag"));
                }
                tag = Some(value);
                Ok(())
            } else {
                Err(meta.error("unknown conf field attribute, expected `tag = \"...\"`"))
            }
        })?;
    }

    Ok(tag.map(|s| s.value()).unwrap_or_default())
}

fn string_value(meta: &syn::meta::ParseNestedMeta) -> syn::Result<LitStr> {
    let value: Expr = meta.value()?.parse()?;
    match value {
        Expr::Lit(ExprLit {
            lit: Lit::Str(s), ..
        }) => Ok(s),
        other => Err(syn::Error::new_spanned(other, "expected a string literal")),
    }
}
