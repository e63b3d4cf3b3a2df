//! Field annotation language.
//!
//! An annotation is a comma separated list of entries, each either a bare flag
//! (`omitempty`) or an assignment (`name=stream_name`). Keys the compiler does
//! not know are kept but never consulted, so newer annotations stay readable by
//! older builds.

use std::fmt;

pub const NAME: &str = "name";
pub const SKIP: &str = "skip";
pub const OPTIONAL: &str = "optional";
pub const OMIT_EMPTY: &str = "omitempty";
pub const DEFAULT: &str = "default";
pub const REQUIRED: &str = "required";
pub const DRIVER: &str = "driver";
pub const ORDER: &str = "order";
pub const TYPE: &str = "type";
pub const ARG: &str = "arg";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("malformed annotation `{tag}`: {reason} (entry `{entry}`)")]
pub struct TagParseError {
    pub tag: String,
    pub entry: String,
    pub reason: TagErrorReason,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagErrorReason {
    EmptyEntry,
    MissingKey,
    UnterminatedAssignment,
    InvalidKey,
    InvalidValue { expected: &'static str },
}

impl fmt::Display for TagErrorReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TagErrorReason::EmptyEntry => write!(f, "empty entry"),
            TagErrorReason::MissingKey => write!(f, "assignment without a key"),
            TagErrorReason::UnterminatedAssignment => write!(f, "assignment without a value"),
            TagErrorReason::InvalidKey => {
                write!(f, "keys may only contain ASCII letters, digits, '_' and '-'")
            }
            TagErrorReason::InvalidValue { expected } => write!(f, "expected {expected}"),
        }
    }
}

/// Parsed options of one field annotation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagSettings {
    entries: Vec<(String, Option<String>)>,
}

impl TagSettings {
    pub fn parse(raw: &str) -> Result<Self, TagParseError> {
        let mut settings = TagSettings::default();
        if raw.trim().is_empty() {
            return Ok(settings);
        }

        for entry in raw.split(',') {
            let entry = entry.trim();
            let error = |reason| TagParseError {
                tag: raw.to_string(),
                entry: entry.to_string(),
                reason,
            };

            if entry.is_empty() {
                return Err(error(TagErrorReason::EmptyEntry));
            }

            let (key, value) = match entry.split_once('=') {
                Some((key, value)) => {
                    let (key, value) = (key.trim(), value.trim());
                    if key.is_empty() {
                        return Err(error(TagErrorReason::MissingKey));
                    }
                    if value.is_empty() {
                        return Err(error(TagErrorReason::UnterminatedAssignment));
                    }
                    (key, Some(value.to_string()))
                }
                None => (entry, None),
            };

            if !is_valid_key(key) {
                return Err(error(TagErrorReason::InvalidKey));
            }

            settings.insert(key, value);
        }

        settings.validate(raw)?;
        Ok(settings)
    }

    fn insert(&mut self, key: &str, value: Option<String>) {
        match self.entries.iter_mut().find(|(existing, _)| existing == key) {
            Some(slot) => slot.1 = value,
            None => self.entries.push((key.to_string(), value)),
        }
    }

    fn validate(&self, raw: &str) -> Result<(), TagParseError> {
        if let Some(order) = self.get(ORDER) {
            if order.parse::<i32>().is_err() {
                return Err(TagParseError {
                    tag: raw.to_string(),
                    entry: format!("{ORDER}={order}"),
                    reason: TagErrorReason::InvalidValue {
                        expected: "an integer",
                    },
                });
            }
        }
        Ok(())
    }

    /// Whether `key` is present, as a flag or an assignment.
    pub fn has(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    /// The assigned value of `key`; flags have none.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .and_then(|(_, v)| v.as_deref())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_deref()))
    }

    pub fn name(&self) -> Option<&str> {
        self.get(NAME)
    }

    pub fn is_skipped(&self) -> bool {
        self.has(SKIP)
    }

    pub fn is_optional(&self) -> bool {
        self.has(OPTIONAL)
    }

    pub fn omit_empty(&self) -> bool {
        self.has(OMIT_EMPTY)
    }

    pub fn is_required(&self) -> bool {
        self.has(REQUIRED)
    }

    pub fn is_driver(&self) -> bool {
        self.has(DRIVER)
    }

    pub fn default_value(&self) -> Option<&str> {
        self.get(DEFAULT)
    }

    pub fn order(&self) -> i32 {
        self.get(ORDER).and_then(|v| v.parse().ok()).unwrap_or(0)
    }

    pub fn role(&self) -> Option<FieldRole> {
        if self.has(TYPE) {
            Some(FieldRole::PluginType)
        } else if self.has(ARG) {
            Some(FieldRole::Argument)
        } else {
            None
        }
    }
}

/// Header slot a field feeds instead of the parameter list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldRole {
    PluginType,
    Argument,
}

fn is_valid_key(key: &str) -> bool {
    key.chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}
