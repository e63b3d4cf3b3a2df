//! Brace grammar: `kind name { ... };` statements holding drivers and options.
//!
//! ```text
//! destination d1 {
//!     file(
//!         "/var/log/app.log"
//!         create-dirs(yes)
//!     );
//! };
//! ```

use std::fmt;

use crate::params::{ParamValue, Params};
use crate::render::{is_bare_word, quote_with, write_indent};

const INDENT: usize = 4;

/// Top-level statement keywords.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatementKind {
    Source,
    Destination,
    Parser,
    Filter,
    Rewrite,
    Log,
}

impl StatementKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatementKind::Source => "source",
            StatementKind::Destination => "destination",
            StatementKind::Parser => "parser",
            StatementKind::Filter => "filter",
            StatementKind::Rewrite => "rewrite",
            StatementKind::Log => "log",
        }
    }
}

impl fmt::Display for StatementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One statement or nested driver block. Nested blocks have no `kind` and
/// may carry a positional `argument` written before their options.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Block {
    pub kind: Option<StatementKind>,
    pub name: String,
    pub argument: Option<String>,
    pub params: Params,
    pub children: Vec<Block>,
}

impl Block {
    pub fn new(kind: StatementKind, name: impl Into<String>) -> Self {
        Self {
            kind: Some(kind),
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn nested(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn child(&self, name: &str) -> Option<&Block> {
        self.children.iter().find(|child| child.name == name)
    }

    pub fn render(&self) -> String {
        self.to_string()
    }

    fn write<W: fmt::Write>(&self, w: &mut W, indent: usize) -> fmt::Result {
        // Only a driver sitting directly in a statement is terminated with `;`.
        let Some(kind) = self.kind else {
            self.write_call(w, indent)?;
            return writeln!(w, ";");
        };

        write_indent(w, indent, INDENT)?;
        writeln!(w, "{kind} {} {{", self.name)?;
        for (key, value) in self.params.iter() {
            write_indent(w, indent + 1, INDENT)?;
            writeln!(w, "{key}({});", render_value(value))?;
        }
        for child in &self.children {
            child.write(w, indent + 1)?;
        }
        write_indent(w, indent, INDENT)?;
        writeln!(w, "}};")
    }

    /// `name(arg option(value) ...)`, one item per line.
    fn write_call<W: fmt::Write>(&self, w: &mut W, indent: usize) -> fmt::Result {
        write_indent(w, indent, INDENT)?;
        if self.argument.is_none() && self.params.is_empty() && self.children.is_empty() {
            return write!(w, "{}()", self.name);
        }

        writeln!(w, "{}(", self.name)?;
        if let Some(argument) = &self.argument {
            write_indent(w, indent + 1, INDENT)?;
            writeln!(w, "{}", render_scalar(argument))?;
        }
        for (key, value) in self.params.iter() {
            write_indent(w, indent + 1, INDENT)?;
            writeln!(w, "{key}({})", render_value(value))?;
        }
        for child in &self.children {
            child.write_call(w, indent + 1)?;
            writeln!(w)?;
        }
        write_indent(w, indent, INDENT)?;
        write!(w, ")")
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write(f, 0)
    }
}

/// Escapes understood inside a double-quoted brace value.
fn escape_char(c: char, _next: Option<char>) -> Option<&'static str> {
    match c {
        '"' => Some("\\\""),
        '\\' => Some("\\\\"),
        '\n' => Some("\\n"),
        '\r' => Some("\\r"),
        '\t' => Some("\\t"),
        '\x07' => Some("\\a"),
        '\x08' => Some("\\b"),
        '\x0b' => Some("\\v"),
        '\x0c' => Some("\\f"),
        _ => None,
    }
}

fn render_scalar(s: &str) -> String {
    if is_bare_word(s) {
        s.to_string()
    } else {
        quote_with(s, escape_char)
    }
}

pub fn render_value(value: &ParamValue) -> String {
    match value {
        ParamValue::Scalar(s) => render_scalar(s),
        ParamValue::List(items) => items
            .iter()
            .map(|item| render_scalar(item))
            .collect::<Vec<_>>()
            .join(" "),
        ParamValue::Map(entries) => entries
            .iter()
            .map(|(k, v)| format!("{k}({})", render_scalar(v)))
            .collect::<Vec<_>>()
            .join(" "),
    }
}

pub fn render_blocks(blocks: &[Block]) -> String {
    blocks
        .iter()
        .map(Block::render)
        .collect::<Vec<_>>()
        .join("\n")
}
