//! Directive grammar: nested `<name arg>` sections.
//!
//! ```text
//! <match **>
//!   @type kinesis_streams
//!   @id out1_kinesis_streams
//!   stream_name orders
//!   <format>
//!     @type json
//!   </format>
//! </match>
//! ```

use std::fmt;

use crate::params::{ParamValue, Params};
use crate::render::{needs_quotes, quote_with, write_indent};

const INDENT: usize = 2;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Directive {
    pub name: String,
    pub argument: Option<String>,
    pub plugin_type: Option<String>,
    pub id: Option<String>,
    pub params: Params,
    pub children: Vec<Directive>,
}

impl Directive {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// First child section with the given name.
    pub fn child(&self, name: &str) -> Option<&Directive> {
        self.children.iter().find(|child| child.name == name)
    }

    pub fn render(&self) -> String {
        self.to_string()
    }

    fn write<W: fmt::Write>(&self, w: &mut W, indent: usize) -> fmt::Result {
        write_indent(w, indent, INDENT)?;
        write!(w, "<{}", self.name)?;
        if let Some(argument) = &self.argument {
            write!(w, " {argument}")?;
        }
        writeln!(w, ">")?;

        if let Some(plugin_type) = &self.plugin_type {
            write_indent(w, indent + 1, INDENT)?;
            writeln!(w, "@type {plugin_type}")?;
        }
        if let Some(id) = &self.id {
            write_indent(w, indent + 1, INDENT)?;
            writeln!(w, "@id {id}")?;
        }
        for (key, value) in self.params.iter() {
            write_indent(w, indent + 1, INDENT)?;
            writeln!(w, "{key} {}", render_value(value))?;
        }
        for child in &self.children {
            child.write(w, indent + 1)?;
        }

        write_indent(w, indent, INDENT)?;
        writeln!(w, "</{}>", self.name)
    }
}

impl fmt::Display for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write(f, 0)
    }
}

/// Escapes understood inside a double-quoted directive value. `#{` would
/// otherwise start an embedded expression.
fn escape_char(c: char, next: Option<char>) -> Option<&'static str> {
    match (c, next) {
        ('"', _) => Some("\\\""),
        ('\\', _) => Some("\\\\"),
        ('\n', _) => Some("\\n"),
        ('\r', _) => Some("\\r"),
        ('\t', _) => Some("\\t"),
        ('\x0c', _) => Some("\\f"),
        ('\x08', _) => Some("\\b"),
        ('\x1b', _) => Some("\\e"),
        ('#', Some('{')) => Some("\\#"),
        _ => None,
    }
}

pub fn render_value(value: &ParamValue) -> String {
    match value {
        ParamValue::Scalar(s) if needs_quotes(s) => quote_with(s, escape_char),
        ParamValue::Scalar(s) => s.clone(),
        ParamValue::List(items) => items.join(","),
        ParamValue::Map(entries) => {
            let object: serde_json::Map<String, serde_json::Value> = entries
                .iter()
                .map(|(k, v)| (k.clone(), serde_json::Value::String(v.clone())))
                .collect();
            serde_json::Value::Object(object).to_string()
        }
    }
}

/// Render several top-level directives as one document.
pub fn render_directives(directives: &[Directive]) -> String {
    directives
        .iter()
        .map(Directive::render)
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_nested_sections() {
        let mut format = Directive::new("format");
        format.plugin_type = Some("json".into());

        let mut output = Directive::new("match");
        output.argument = Some("**".into());
        output.plugin_type = Some("kinesis_streams".into());
        output.id = Some("out1_kinesis_streams".into());
        output.params.insert("stream_name", "orders");
        output.params.insert("region", "us-east-1");
        output.children.push(format);

        assert_eq!(
            output.render(),
            "<match **>\n  @type kinesis_streams\n  @id out1_kinesis_streams\n  stream_name orders\n  region us-east-1\n  <format>\n    @type json\n  </format>\n</match>\n"
        );
    }

    #[test]
    fn renders_lists_maps_and_empty_values() {
        let mut section = Directive::new("buffer");
        section.params.insert("keys", ParamValue::List(vec!["a".into(), "b".into()]));
        section.params.insert(
            "labels",
            ParamValue::Map(vec![("app".into(), "web".into()), ("tier".into(), "1".into())]),
        );
        section.params.insert("prefix", "");
        let rendered = section.render();
        assert!(rendered.contains("  keys a,b\n"));
        assert!(rendered.contains("  labels {\"app\":\"web\",\"tier\":\"1\"}\n"));
        assert!(rendered.contains("  prefix \"\"\n"));
    }

    #[test]
    fn quoted_values_use_directive_escapes() {
        assert_eq!(render_value(&ParamValue::from("a\nb")), "\"a\\nb\"");
        assert_eq!(
            render_value(&ParamValue::from(" \"x\" \\ ")),
            "\" \\\"x\\\" \\\\ \""
        );
        assert_eq!(render_value(&ParamValue::from("#{ENV}")), "\"\\#{ENV}\"");
        assert_eq!(render_value(&ParamValue::from("a # b")), "\"a # b\"");
        assert_eq!(render_value(&ParamValue::from("\u{1b}[0m\t")), "\"\\e[0m\\t\"");
    }

    #[test]
    fn joins_documents() {
        let doc = render_directives(&[Directive::new("source"), Directive::new("match")]);
        assert_eq!(doc, "<source>\n</source>\n\n<match>\n</match>\n");
    }
}
