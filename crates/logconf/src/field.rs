//! Field descriptors: one snapshot per record field, taken during traversal.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use crate::record::Record;
use crate::secret::Secret;

/// Declared type shape of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shape {
    String,
    Bool,
    Int,
    Float,
    List,
    Map,
    Secret,
    Record,
    RecordList,
    Variant,
}

impl Shape {
    pub fn is_record(&self) -> bool {
        matches!(self, Shape::Record | Shape::RecordList | Shape::Variant)
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Shape::String => "string",
            Shape::Bool => "bool",
            Shape::Int => "integer",
            Shape::Float => "float",
            Shape::List => "string list",
            Shape::Map => "string map",
            Shape::Secret => "secret",
            Shape::Record => "record",
            Shape::RecordList => "record list",
            Shape::Variant => "variant",
        };
        f.write_str(name)
    }
}

/// Borrowed current value of a field.
#[derive(Clone)]
pub enum FieldValue<'a> {
    String(&'a str),
    Bool(bool),
    Int(i128),
    Float(f64),
    /// Kept narrow so it renders with single-precision digits.
    Float32(f32),
    List(&'a [String]),
    /// Entries sorted by key.
    Map(Vec<(&'a str, &'a str)>),
    Secret(&'a Secret),
    Record(&'a dyn Record),
    RecordList(Vec<&'a dyn Record>),
    Variant(&'a dyn Record),
}

impl<'a> FieldValue<'a> {
    pub fn shape(&self) -> Shape {
        match self {
            FieldValue::String(_) => Shape::String,
            FieldValue::Bool(_) => Shape::Bool,
            FieldValue::Int(_) => Shape::Int,
            FieldValue::Float(_) | FieldValue::Float32(_) => Shape::Float,
            FieldValue::List(_) => Shape::List,
            FieldValue::Map(_) => Shape::Map,
            FieldValue::Secret(_) => Shape::Secret,
            FieldValue::Record(_) => Shape::Record,
            FieldValue::RecordList(_) => Shape::RecordList,
            FieldValue::Variant(_) => Shape::Variant,
        }
    }

    /// Whether this is the zero value of its type.
    pub fn is_zero(&self) -> bool {
        match self {
            FieldValue::String(s) => s.is_empty(),
            FieldValue::Bool(b) => !b,
            FieldValue::Int(n) => *n == 0,
            FieldValue::Float(x) => *x == 0.0,
            FieldValue::Float32(x) => *x == 0.0,
            FieldValue::List(items) => items.is_empty(),
            FieldValue::Map(entries) => entries.is_empty(),
            FieldValue::Secret(secret) => secret.is_empty(),
            FieldValue::RecordList(records) => records.is_empty(),
            FieldValue::Record(_) | FieldValue::Variant(_) => false,
        }
    }
}

impl fmt::Debug for FieldValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::String(s) => f.debug_tuple("String").field(s).finish(),
            FieldValue::Bool(b) => f.debug_tuple("Bool").field(b).finish(),
            FieldValue::Int(n) => f.debug_tuple("Int").field(n).finish(),
            FieldValue::Float(x) => f.debug_tuple("Float").field(x).finish(),
            FieldValue::Float32(x) => f.debug_tuple("Float32").field(x).finish(),
            FieldValue::List(items) => f.debug_tuple("List").field(items).finish(),
            FieldValue::Map(entries) => f.debug_tuple("Map").field(entries).finish(),
            FieldValue::Secret(secret) => f.debug_tuple("Secret").field(secret).finish(),
            FieldValue::Record(r) => f.debug_tuple("Record").field(&r.meta().type_name).finish(),
            FieldValue::RecordList(rs) => f.debug_tuple("RecordList").field(&rs.len()).finish(),
            FieldValue::Variant(r) => {
                f.debug_tuple("Variant").field(&r.meta().type_name).finish()
            }
        }
    }
}

/// One field of a record: declared name, raw annotation, shape and value.
///
/// `value` is `None` when an optional field is unset.
#[derive(Debug, Clone)]
pub struct FieldDescriptor<'a> {
    pub name: &'static str,
    pub tag: &'static str,
    pub shape: Shape,
    pub optional: bool,
    pub value: Option<FieldValue<'a>>,
}

impl<'a> FieldDescriptor<'a> {
    pub fn of<T: FieldType + ?Sized>(name: &'static str, tag: &'static str, value: &'a T) -> Self {
        Self {
            name,
            tag,
            shape: T::SHAPE,
            optional: T::OPTIONAL,
            value: value.field_value(),
        }
    }

    pub fn is_nil(&self) -> bool {
        self.value.is_none()
    }
}

/// Types that can appear as record fields.
///
/// `#[derive(Record)]` implements this for records (`Shape::Record`) and for
/// variant enums (`Shape::Variant`).
pub trait FieldType {
    const SHAPE: Shape;
    const OPTIONAL: bool = false;

    fn field_value(&self) -> Option<FieldValue<'_>>;
}

impl FieldType for String {
    const SHAPE: Shape = Shape::String;

    fn field_value(&self) -> Option<FieldValue<'_>> {
        Some(FieldValue::String(self))
    }
}

impl FieldType for bool {
    const SHAPE: Shape = Shape::Bool;

    fn field_value(&self) -> Option<FieldValue<'_>> {
        Some(FieldValue::Bool(*self))
    }
}

macro_rules! int_field_type {
    ($($ty:ty),*) => {
        $(
            impl FieldType for $ty {
                const SHAPE: Shape = Shape::Int;

                fn field_value(&self) -> Option<FieldValue<'_>> {
                    Some(FieldValue::Int(i128::from(*self)))
                }
            }
        )*
    };
}

int_field_type!(i8, i16, i32, i64, u8, u16, u32, u64);

impl FieldType for usize {
    const SHAPE: Shape = Shape::Int;

    fn field_value(&self) -> Option<FieldValue<'_>> {
        Some(FieldValue::Int(*self as i128))
    }
}

impl FieldType for isize {
    const SHAPE: Shape = Shape::Int;

    fn field_value(&self) -> Option<FieldValue<'_>> {
        Some(FieldValue::Int(*self as i128))
    }
}

impl FieldType for f32 {
    const SHAPE: Shape = Shape::Float;

    fn field_value(&self) -> Option<FieldValue<'_>> {
        Some(FieldValue::Float32(*self))
    }
}

impl FieldType for f64 {
    const SHAPE: Shape = Shape::Float;

    fn field_value(&self) -> Option<FieldValue<'_>> {
        Some(FieldValue::Float(*self))
    }
}

impl FieldType for Vec<String> {
    const SHAPE: Shape = Shape::List;

    fn field_value(&self) -> Option<FieldValue<'_>> {
        Some(FieldValue::List(self))
    }
}

impl FieldType for BTreeMap<String, String> {
    const SHAPE: Shape = Shape::Map;

    fn field_value(&self) -> Option<FieldValue<'_>> {
        Some(FieldValue::Map(
            self.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect(),
        ))
    }
}

impl FieldType for HashMap<String, String> {
    const SHAPE: Shape = Shape::Map;

    fn field_value(&self) -> Option<FieldValue<'_>> {
        let mut entries: Vec<_> = self.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
        entries.sort_unstable();
        Some(FieldValue::Map(entries))
    }
}

impl FieldType for Secret {
    const SHAPE: Shape = Shape::Secret;

    fn field_value(&self) -> Option<FieldValue<'_>> {
        Some(FieldValue::Secret(self))
    }
}

impl<T: Record> FieldType for Vec<T> {
    const SHAPE: Shape = Shape::RecordList;

    fn field_value(&self) -> Option<FieldValue<'_>> {
        Some(FieldValue::RecordList(
            self.iter().map(|record| record as &dyn Record).collect(),
        ))
    }
}

impl<T: FieldType> FieldType for Option<T> {
    const SHAPE: Shape = T::SHAPE;
    const OPTIONAL: bool = true;

    fn field_value(&self) -> Option<FieldValue<'_>> {
        self.as_ref().and_then(|value| value.field_value())
    }
}

impl<T: FieldType + ?Sized> FieldType for Box<T> {
    const SHAPE: Shape = T::SHAPE;
    const OPTIONAL: bool = T::OPTIONAL;

    fn field_value(&self) -> Option<FieldValue<'_>> {
        (**self).field_value()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn option_marks_the_descriptor_optional() {
        let unset: Option<String> = None;
        let descriptor = FieldDescriptor::of("region", "", &unset);
        assert!(descriptor.optional);
        assert!(descriptor.is_nil());
        assert_eq!(descriptor.shape, Shape::String);

        let set = Some(3u32);
        let descriptor = FieldDescriptor::of("retries", "", &set);
        assert!(matches!(descriptor.value, Some(FieldValue::Int(3))));
    }

    #[test]
    fn hash_maps_are_exposed_sorted() {
        let map: HashMap<String, String> = [("b", "2"), ("a", "1"), ("c", "3")]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let Some(FieldValue::Map(entries)) = map.field_value() else {
            panic!("expected a map");
        };
        assert_eq!(entries, vec![("a", "1"), ("b", "2"), ("c", "3")]);
    }

    #[test]
    fn zero_values() {
        assert!(FieldValue::String("").is_zero());
        assert!(FieldValue::Bool(false).is_zero());
        assert!(FieldValue::Int(0).is_zero());
        assert!(!FieldValue::Int(-1).is_zero());
        assert!(FieldValue::List(&[]).is_zero());
        assert!(!FieldValue::Float(0.5).is_zero());
        assert!(FieldValue::Float32(0.0).is_zero());
        assert_eq!(FieldValue::Float32(0.1).shape(), Shape::Float);
    }
}
