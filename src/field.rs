//! Field tree nodes and typed leaf conversion.
//!
//! A [`Field`] is either a leaf holding one primitive value ([`TypedField`]) or a
//! container of child fields ([`CompositeField`], [`ArrayField`]). Every variant
//! deserializes from a single text token.

use log::warn;
use serde::{Serialize, Serializer};
use std::fmt;

use crate::composite::{ArrayField, CompositeField};
use crate::error::FieldError;

/// Primitive value kinds a leaf field or array element can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Int,
    UInt32,
    UInt64,
    Float,
    Str,
}

impl FieldKind {
    pub const ALL: [FieldKind; 5] = [
        FieldKind::Int,
        FieldKind::Float,
        FieldKind::UInt32,
        FieldKind::UInt64,
        FieldKind::Str,
    ];

    /// Short type name used in registry keys, e.g. `uint32` in `Field<uint32>`.
    pub fn type_name(self) -> &'static str {
        match self {
            FieldKind::Int => "int",
            FieldKind::UInt32 => "uint32",
            FieldKind::UInt64 => "uint64",
            FieldKind::Float => "float",
            FieldKind::Str => "string",
        }
    }

    /// Create an empty leaf field of this kind.
    pub fn instantiate(self, name: impl Into<String>) -> Field {
        match self {
            FieldKind::Int => Field::Int(TypedField::new(name)),
            FieldKind::UInt32 => Field::UInt32(TypedField::new(name)),
            FieldKind::UInt64 => Field::UInt64(TypedField::new(name)),
            FieldKind::Float => Field::Float(TypedField::new(name)),
            FieldKind::Str => Field::Str(TypedField::new(name)),
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

/// A value type that can live in a [`TypedField`].
///
/// Implemented for `i32`, `u32`, `u64`, `f32` and `String`. The associated
/// functions give checked access to the matching [`Field`] variant.
pub trait Primitive: Clone + Default + PartialEq + fmt::Debug + Serialize {
    const KIND: FieldKind;

    /// Convert a token, returning `None` if it is not valid data for this type.
    fn parse_token(token: &str) -> Option<Self>;

    fn into_field(field: TypedField<Self>) -> Field;

    fn from_field(field: &Field) -> Option<&TypedField<Self>>;

    fn from_field_mut(field: &mut Field) -> Option<&mut TypedField<Self>>;
}

macro_rules! impl_primitive {
    ($ty:ty, $variant:ident, |$token:ident| $parse:expr) => {
        impl Primitive for $ty {
            const KIND: FieldKind = FieldKind::$variant;

            fn parse_token($token: &str) -> Option<Self> {
                $parse
            }

            fn into_field(field: TypedField<Self>) -> Field {
                Field::$variant(field)
            }

            fn from_field(field: &Field) -> Option<&TypedField<Self>> {
                match field {
                    Field::$variant(typed) => Some(typed),
                    _ => None,
                }
            }

            fn from_field_mut(field: &mut Field) -> Option<&mut TypedField<Self>> {
                match field {
                    Field::$variant(typed) => Some(typed),
                    _ => None,
                }
            }
        }
    };
}

impl_primitive!(i32, Int, |token| token.parse().ok());
impl_primitive!(u32, UInt32, |token| token.parse().ok());
impl_primitive!(u64, UInt64, |token| token.parse().ok());
impl_primitive!(f32, Float, |token| token.parse().ok());
// An empty string is not valid data.
impl_primitive!(String, Str, |token| (!token.is_empty()).then(|| token.to_string()));

/// Leaf field holding one value of a primitive type.
#[derive(Debug, Clone, PartialEq)]
pub struct TypedField<T> {
    name: String,
    data: T,
}

impl<T: Primitive> TypedField<T> {
    /// Create a field holding the type's default value.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data: T::default(),
        }
    }

    pub fn with_value(name: impl Into<String>, value: T) -> Self {
        Self {
            name: name.into(),
            data: value,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The value written by the last `deserialize` call (default if it failed).
    pub fn data(&self) -> &T {
        &self.data
    }

    /// Convert `token` into the stored value.
    ///
    /// On failure the value is reset to the type's default and a
    /// [`FieldError::Conversion`] is returned.
    pub fn deserialize(&mut self, token: &str) -> Result<(), FieldError> {
        match T::parse_token(token) {
            Some(value) => {
                self.data = value;
                Ok(())
            }
            None => {
                self.data = T::default();
                warn!(
                    "field `{}`: {:?} is not a valid {}",
                    self.name,
                    token,
                    T::KIND
                );
                Err(FieldError::Conversion {
                    field: self.name.clone(),
                    type_name: T::KIND.type_name(),
                    token: token.to_string(),
                })
            }
        }
    }
}

/// A named node in a schema tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Field {
    Int(TypedField<i32>),
    UInt32(TypedField<u32>),
    UInt64(TypedField<u64>),
    Float(TypedField<f32>),
    Str(TypedField<String>),
    Composite(CompositeField),
    Array(ArrayField),
}

impl Field {
    pub fn name(&self) -> &str {
        match self {
            Field::Int(f) => f.name(),
            Field::UInt32(f) => f.name(),
            Field::UInt64(f) => f.name(),
            Field::Float(f) => f.name(),
            Field::Str(f) => f.name(),
            Field::Composite(f) => f.name(),
            Field::Array(f) => f.name(),
        }
    }

    pub fn deserialize(&mut self, token: &str) -> Result<(), FieldError> {
        match self {
            Field::Int(f) => f.deserialize(token),
            Field::UInt32(f) => f.deserialize(token),
            Field::UInt64(f) => f.deserialize(token),
            Field::Float(f) => f.deserialize(token),
            Field::Str(f) => f.deserialize(token),
            Field::Composite(f) => f.deserialize(token),
            Field::Array(f) => f.deserialize(token),
        }
    }

    /// Number of direct children, 0 for leaf fields.
    pub fn num_fields(&self) -> usize {
        match self {
            Field::Composite(f) => f.num_fields(),
            Field::Array(f) => f.num_fields(),
            _ => 0,
        }
    }

    pub fn is_leaf(&self) -> bool {
        !matches!(self, Field::Composite(_) | Field::Array(_))
    }

    /// The primitive kind of a leaf field.
    pub fn kind(&self) -> Option<FieldKind> {
        match self {
            Field::Int(_) => Some(FieldKind::Int),
            Field::UInt32(_) => Some(FieldKind::UInt32),
            Field::UInt64(_) => Some(FieldKind::UInt64),
            Field::Float(_) => Some(FieldKind::Float),
            Field::Str(_) => Some(FieldKind::Str),
            Field::Composite(_) | Field::Array(_) => None,
        }
    }

    /// Checked view of a leaf field as `TypedField<T>`.
    ///
    /// ```
    /// use dict_parser::FieldKind;
    ///
    /// let mut age = FieldKind::UInt32.instantiate("age");
    /// age.deserialize("18").unwrap();
    /// assert_eq!(age.as_typed::<u32>().map(|f| *f.data()), Some(18));
    /// assert!(age.as_typed::<i32>().is_none());
    /// ```
    pub fn as_typed<T: Primitive>(&self) -> Option<&TypedField<T>> {
        T::from_field(self)
    }

    pub fn as_typed_mut<T: Primitive>(&mut self) -> Option<&mut TypedField<T>> {
        T::from_field_mut(self)
    }

    /// Shortcut for `as_typed::<T>()` followed by `data()`.
    pub fn data<T: Primitive>(&self) -> Option<&T> {
        self.as_typed::<T>().map(TypedField::data)
    }

    pub fn as_composite(&self) -> Option<&CompositeField> {
        match self {
            Field::Composite(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_composite_mut(&mut self) -> Option<&mut CompositeField> {
        match self {
            Field::Composite(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&ArrayField> {
        match self {
            Field::Array(f) => Some(f),
            _ => None,
        }
    }

    /// Look up a direct child by name. Always `None` for leaf fields.
    pub fn get_field(&self, name: &str) -> Option<&Field> {
        match self {
            Field::Composite(f) => f.get_field(name),
            Field::Array(f) => f.get_field(name),
            _ => None,
        }
    }

    /// Look up a direct child by position. Always `None` for leaf fields.
    pub fn sub_field_at(&self, index: usize) -> Option<&Field> {
        match self {
            Field::Composite(f) => f.sub_field_at(index),
            Field::Array(f) => f.sub_field_at(index),
            _ => None,
        }
    }
}

impl<T: Primitive> From<TypedField<T>> for Field {
    fn from(field: TypedField<T>) -> Self {
        T::into_field(field)
    }
}

impl From<CompositeField> for Field {
    fn from(field: CompositeField) -> Self {
        Field::Composite(field)
    }
}

impl From<ArrayField> for Field {
    fn from(field: ArrayField) -> Self {
        Field::Array(field)
    }
}

impl Serialize for Field {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Field::Int(f) => f.data().serialize(serializer),
            Field::UInt32(f) => f.data().serialize(serializer),
            Field::UInt64(f) => f.data().serialize(serializer),
            Field::Float(f) => f.data().serialize(serializer),
            Field::Str(f) => f.data().serialize(serializer),
            Field::Composite(f) => f.serialize(serializer),
            Field::Array(f) => f.serialize(serializer),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_int_conversion() {
        let mut height = TypedField::<i32>::new("height");
        for (token, expected) in [("180", 180), ("-42", -42), ("0", 0), ("+7", 7)] {
            assert!(height.deserialize(token).is_ok(), "token {:?}", token);
            assert_eq!(*height.data(), expected);
        }
    }

    #[test]
    fn test_int_conversion_failure_resets_to_zero() {
        for token in ["abc", "", "18abc", " 18", "1.5", "99999999999"] {
            let mut height = TypedField::with_value("height", 99i32);
            let err = height.deserialize(token).unwrap_err();
            assert_eq!(*height.data(), 0, "token {:?}", token);
            assert!(matches!(err, FieldError::Conversion { type_name: "int", .. }));
        }
    }

    #[test]
    fn test_unsigned_conversions() {
        let mut age = TypedField::<u32>::new("age");
        assert!(age.deserialize("18").is_ok());
        assert_eq!(*age.data(), 18);
        assert!(age.deserialize("-1").is_err());
        assert_eq!(*age.data(), 0);
        assert!(age.deserialize("4294967296").is_err());

        let mut id = TypedField::<u64>::new("id");
        assert!(id.deserialize("18446744073709551615").is_ok());
        assert_eq!(*id.data(), u64::MAX);
        assert!(id.deserialize("x1").is_err());
        assert_eq!(*id.data(), 0);
    }

    #[test]
    fn test_float_conversion() {
        let mut weight = TypedField::<f32>::new("weight");
        assert!(weight.deserialize("170.5").is_ok());
        assert_eq!(*weight.data(), 170.5);
        assert!(weight.deserialize("heavy").is_err());
        assert_eq!(*weight.data(), 0.0);
    }

    #[test]
    fn test_string_conversion() {
        let mut info = TypedField::<String>::new("info");
        assert!(info.deserialize("hello world").is_ok());
        assert_eq!(info.data(), "hello world");

        let err = info.deserialize("").unwrap_err();
        assert_eq!(info.data(), "");
        assert_eq!(
            err,
            FieldError::Conversion {
                field: "info".to_string(),
                type_name: "string",
                token: String::new(),
            }
        );
    }

    #[test]
    fn test_checked_accessors() {
        let mut field: Field = TypedField::<f32>::new("weight").into();
        field.deserialize("1.25").unwrap();

        assert_eq!(field.name(), "weight");
        assert_eq!(field.kind(), Some(FieldKind::Float));
        assert_eq!(field.data::<f32>(), Some(&1.25));
        assert!(field.data::<i32>().is_none());
        assert!(field.as_composite().is_none());
        assert!(field.as_array().is_none());
        assert!(field.is_leaf());
        assert_eq!(field.num_fields(), 0);
        assert!(field.get_field("anything").is_none());
        assert!(field.sub_field_at(0).is_none());

        field.as_typed_mut::<f32>().unwrap().deserialize("2").unwrap();
        assert_eq!(field.data::<f32>(), Some(&2.0));
    }

    #[test]
    fn test_instantiate_every_kind() {
        for kind in FieldKind::ALL {
            let field = kind.instantiate("x");
            assert_eq!(field.kind(), Some(kind));
            assert_eq!(field.name(), "x");
        }
    }
}
