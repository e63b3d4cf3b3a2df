/// Output grammar a record is compiled into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Grammar {
    /// Nested `<directive arg>` sections with `key value` lines.
    Directive,
    /// `kind name { key(value); ... };` statements.
    Brace,
}

/// How a declared field name is lowered into an output key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum KeyCase {
    #[default]
    None,
    SnakeCase,
    KebabCase,
    Lowercase,
}

impl KeyCase {
    pub fn apply(&self, name: &str) -> String {
        match self {
            KeyCase::None => name.to_string(),
            KeyCase::SnakeCase => to_snake_case(name),
            KeyCase::KebabCase => to_kebab_case(name),
            KeyCase::Lowercase => name.to_lowercase(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dialect {
    pub grammar: Grammar,
    pub key_case: KeyCase,
    pub bool_literals: (&'static str, &'static str),
    pub allow_maps: bool,
}

impl Dialect {
    pub const fn directive() -> Self {
        Self {
            grammar: Grammar::Directive,
            key_case: KeyCase::SnakeCase,
            bool_literals: ("true", "false"),
            allow_maps: true,
        }
    }

    pub const fn brace() -> Self {
        Self {
            grammar: Grammar::Brace,
            key_case: KeyCase::KebabCase,
            bool_literals: ("yes", "no"),
            allow_maps: false,
        }
    }

    pub const fn for_grammar(grammar: Grammar) -> Self {
        match grammar {
            Grammar::Directive => Self::directive(),
            Grammar::Brace => Self::brace(),
        }
    }

    pub fn bool_literal(&self, value: bool) -> &'static str {
        if value {
            self.bool_literals.0
        } else {
            self.bool_literals.1
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DialectOverrides {
    pub key_case: Option<KeyCase>,
}

pub fn resolve_dialect(base: &Dialect, overrides: DialectOverrides) -> Dialect {
    Dialect {
        key_case: overrides.key_case.unwrap_or(base.key_case),
        ..*base
    }
}

fn to_kebab_case(s: &str) -> String {
    let mut result = String::with_capacity(s.len() + 4);
    let mut prev_lower = false;

    for c in s.chars() {
        if c == '_' {
            result.push('-');
            prev_lower = false;
        } else if c.is_ascii_uppercase() {
            if prev_lower {
                result.push('-');
            }
            result.push(c.to_ascii_lowercase());
            prev_lower = false;
        } else {
            result.push(c);
            prev_lower = c.is_ascii_lowercase() || c.is_ascii_digit();
        }
    }

    result
}

fn to_snake_case(s: &str) -> String {
    let mut result = String::with_capacity(s.len() + 4);
    let mut prev_lower = false;

    for c in s.chars() {
        if c == '-' {
            result.push('_');
            prev_lower = false;
        } else if c.is_ascii_uppercase() {
            if prev_lower {
                result.push('_');
            }
            result.push(c.to_ascii_lowercase());
            prev_lower = false;
        } else {
            result.push(c);
            prev_lower = c.is_ascii_lowercase() || c.is_ascii_digit();
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowers_declared_names() {
        assert_eq!(KeyCase::KebabCase.apply("extract_prefix"), "extract-prefix");
        assert_eq!(KeyCase::SnakeCase.apply("StreamName"), "stream_name");
        assert_eq!(KeyCase::SnakeCase.apply("aws_iam_retries"), "aws_iam_retries");
        assert_eq!(KeyCase::Lowercase.apply("Region"), "region");
        assert_eq!(KeyCase::None.apply("Region"), "Region");
    }

    #[test]
    fn overrides_replace_only_what_they_set() {
        let base = Dialect::brace();
        let resolved = resolve_dialect(
            &base,
            DialectOverrides {
                key_case: Some(KeyCase::SnakeCase),
            },
        );
        assert_eq!(resolved.key_case, KeyCase::SnakeCase);
        assert_eq!(resolved.bool_literals, ("yes", "no"));
        assert_eq!(resolve_dialect(&base, DialectOverrides::default()), base);
    }

    #[test]
    fn grammar_defaults() {
        assert_eq!(Dialect::for_grammar(Grammar::Directive).bool_literal(true), "true");
        assert_eq!(Dialect::for_grammar(Grammar::Brace).bool_literal(false), "no");
        assert!(!Dialect::brace().allow_maps);
    }
}
