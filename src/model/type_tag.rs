//! Type metadata attached to fields, accessors and containers.
//!
//! Two views of the same information:
//! - [`TypeTag`]: the full declared type (nullable or not, element types,
//!   registered complex type names). Used by accessor resolution and
//!   instantiation.
//! - [`FieldType`]: the flat conversion key. Every `TypeTag` collapses onto
//!   exactly one `FieldType`.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::Value;

// ============================================================================
// PrimitiveKind
// ============================================================================

/// The fixed set of primitive kinds. A slot declared with one of these is
/// either non-nullable (`TypeTag::Primitive`) or nullable (`TypeTag::Boxed`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PrimitiveKind {
    Boolean,
    Byte,
    Char,
    Short,
    Int,
    Long,
    Float,
    Double,
}

impl PrimitiveKind {
    pub const ALL: [PrimitiveKind; 8] = [
        PrimitiveKind::Boolean,
        PrimitiveKind::Byte,
        PrimitiveKind::Char,
        PrimitiveKind::Short,
        PrimitiveKind::Int,
        PrimitiveKind::Long,
        PrimitiveKind::Float,
        PrimitiveKind::Double,
    ];

    pub fn name(self) -> &'static str {
        match self {
            PrimitiveKind::Boolean => "boolean",
            PrimitiveKind::Byte => "byte",
            PrimitiveKind::Char => "char",
            PrimitiveKind::Short => "short",
            PrimitiveKind::Int => "int",
            PrimitiveKind::Long => "long",
            PrimitiveKind::Float => "float",
            PrimitiveKind::Double => "double",
        }
    }

    pub fn field_type(self) -> FieldType {
        match self {
            PrimitiveKind::Boolean => FieldType::Boolean,
            PrimitiveKind::Byte => FieldType::Byte,
            PrimitiveKind::Char => FieldType::Char,
            PrimitiveKind::Short => FieldType::Short,
            PrimitiveKind::Int => FieldType::Integer,
            PrimitiveKind::Long => FieldType::Long,
            PrimitiveKind::Float => FieldType::Float,
            PrimitiveKind::Double => FieldType::Double,
        }
    }

    /// The value a non-nullable slot of this kind holds before anything is
    /// written to it.
    pub fn zero_value(self) -> Value {
        match self {
            PrimitiveKind::Boolean => Value::Bool(false),
            PrimitiveKind::Byte => Value::Byte(0),
            PrimitiveKind::Char => Value::Char('\0'),
            PrimitiveKind::Short => Value::Short(0),
            PrimitiveKind::Int => Value::Int(0),
            PrimitiveKind::Long => Value::Long(0),
            PrimitiveKind::Float => Value::Float(0.0),
            PrimitiveKind::Double => Value::Double(0.0),
        }
    }
}

// ============================================================================
// TypeTag
// ============================================================================

/// Declared type of a slot, accessor parameter or container element.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TypeTag {
    /// Non-nullable primitive slot.
    Primitive(PrimitiveKind),
    /// Nullable primitive slot.
    Boxed(PrimitiveKind),
    String,
    Date,
    Time,
    DateTime,
    LocalDateTime,
    /// A type registered in the `TypeRegistry` under this name.
    Complex(String),
    /// Fixed-length array; growing it reallocates.
    Array(Box<TypeTag>),
    /// Ordered list; grows in place.
    List(Box<TypeTag>),
    /// String-keyed map.
    Map(Box<TypeTag>),
    /// Unknown / dynamic.
    Any,
}

impl TypeTag {
    pub fn complex(name: impl Into<String>) -> Self {
        TypeTag::Complex(name.into())
    }

    pub fn array_of(element: TypeTag) -> Self {
        TypeTag::Array(Box::new(element))
    }

    pub fn list_of(element: TypeTag) -> Self {
        TypeTag::List(Box::new(element))
    }

    pub fn map_of(value: TypeTag) -> Self {
        TypeTag::Map(Box::new(value))
    }

    /// Collapse onto the flat conversion key.
    pub fn field_type(&self) -> FieldType {
        match self {
            TypeTag::Primitive(k) | TypeTag::Boxed(k) => k.field_type(),
            TypeTag::String => FieldType::String,
            TypeTag::Date => FieldType::Date,
            TypeTag::Time => FieldType::Time,
            TypeTag::DateTime => FieldType::DateTime,
            TypeTag::LocalDateTime => FieldType::LocalDateTime,
            TypeTag::Complex(_) | TypeTag::Array(_) | TypeTag::List(_) | TypeTag::Map(_) => {
                FieldType::Complex
            }
            TypeTag::Any => FieldType::Any,
        }
    }

    pub fn primitive_kind(&self) -> Option<PrimitiveKind> {
        match self {
            TypeTag::Primitive(k) | TypeTag::Boxed(k) => Some(*k),
            _ => None,
        }
    }

    /// `false` only for non-nullable primitive slots.
    pub fn is_nullable(&self) -> bool {
        !matches!(self, TypeTag::Primitive(_))
    }

    pub fn is_collection(&self) -> bool {
        matches!(self, TypeTag::Array(_) | TypeTag::List(_) | TypeTag::Map(_))
    }

    pub fn is_complex(&self) -> bool {
        self.field_type() == FieldType::Complex
    }

    pub fn element_type(&self) -> Option<&TypeTag> {
        match self {
            TypeTag::Array(e) | TypeTag::List(e) | TypeTag::Map(e) => Some(e),
            _ => None,
        }
    }

    /// Infer the tag of a concrete value. Scalars infer as nullable since a
    /// value that exists says nothing about the slot it came from.
    pub fn of(value: &Value) -> TypeTag {
        match value {
            Value::Null => TypeTag::Any,
            Value::Bool(_) => TypeTag::Boxed(PrimitiveKind::Boolean),
            Value::Byte(_) => TypeTag::Boxed(PrimitiveKind::Byte),
            Value::Char(_) => TypeTag::Boxed(PrimitiveKind::Char),
            Value::Short(_) => TypeTag::Boxed(PrimitiveKind::Short),
            Value::Int(_) => TypeTag::Boxed(PrimitiveKind::Int),
            Value::Long(_) => TypeTag::Boxed(PrimitiveKind::Long),
            Value::Float(_) => TypeTag::Boxed(PrimitiveKind::Float),
            Value::Double(_) => TypeTag::Boxed(PrimitiveKind::Double),
            Value::String(_) => TypeTag::String,
            Value::Date(_) => TypeTag::Date,
            Value::Time(_) => TypeTag::Time,
            Value::DateTime(_) => TypeTag::DateTime,
            Value::LocalDateTime(_) => TypeTag::LocalDateTime,
            Value::Array(seq) => TypeTag::Array(Box::new(seq.element_type())),
            Value::List(seq) => TypeTag::List(Box::new(seq.element_type())),
            Value::Map(map) => TypeTag::Map(Box::new(map.value_type())),
            Value::Object(obj) => TypeTag::Complex(obj.type_name()),
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeTag::Primitive(k) => write!(f, "{}", k.name()),
            TypeTag::Boxed(k) => write!(f, "{}?", k.name()),
            TypeTag::String => write!(f, "string"),
            TypeTag::Date => write!(f, "date"),
            TypeTag::Time => write!(f, "time"),
            TypeTag::DateTime => write!(f, "date-time"),
            TypeTag::LocalDateTime => write!(f, "local-date-time"),
            TypeTag::Complex(name) => write!(f, "{name}"),
            TypeTag::Array(e) => write!(f, "{e}[]"),
            TypeTag::List(e) => write!(f, "list<{e}>"),
            TypeTag::Map(e) => write!(f, "map<{e}>"),
            TypeTag::Any => write!(f, "any"),
        }
    }
}

// ============================================================================
// FieldType
// ============================================================================

/// Flat conversion key used by the `ConversionMatrix`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FieldType {
    Boolean,
    Byte,
    Char,
    Short,
    Integer,
    Long,
    Float,
    Double,
    String,
    Date,
    Time,
    DateTime,
    LocalDateTime,
    Complex,
    Any,
}

impl FieldType {
    pub const NUMERIC: [FieldType; 7] = [
        FieldType::Byte,
        FieldType::Char,
        FieldType::Short,
        FieldType::Integer,
        FieldType::Long,
        FieldType::Float,
        FieldType::Double,
    ];

    pub const TEMPORAL: [FieldType; 4] = [
        FieldType::Date,
        FieldType::Time,
        FieldType::DateTime,
        FieldType::LocalDateTime,
    ];

    /// Kind of a concrete value; `None` for `Null`.
    pub fn of(value: &Value) -> Option<FieldType> {
        match value {
            Value::Null => None,
            other => Some(TypeTag::of(other).field_type()),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            FieldType::Boolean => "boolean",
            FieldType::Byte => "byte",
            FieldType::Char => "char",
            FieldType::Short => "short",
            FieldType::Integer => "int",
            FieldType::Long => "long",
            FieldType::Float => "float",
            FieldType::Double => "double",
            FieldType::String => "string",
            FieldType::Date => "date",
            FieldType::Time => "time",
            FieldType::DateTime => "date-time",
            FieldType::LocalDateTime => "local-date-time",
            FieldType::Complex => "complex",
            FieldType::Any => "any",
        }
    }

    pub fn is_numeric(self) -> bool {
        Self::NUMERIC.contains(&self)
    }

    pub fn is_integral(self) -> bool {
        matches!(
            self,
            FieldType::Byte | FieldType::Char | FieldType::Short | FieldType::Integer | FieldType::Long
        )
    }

    pub fn is_floating(self) -> bool {
        matches!(self, FieldType::Float | FieldType::Double)
    }

    pub fn is_temporal(self) -> bool {
        Self::TEMPORAL.contains(&self)
    }

    /// Primitive-like: everything the matrix can convert to and from.
    pub fn is_primitive_like(self) -> bool {
        !matches!(self, FieldType::Complex | FieldType::Any)
    }

    pub fn primitive_kind(self) -> Option<PrimitiveKind> {
        PrimitiveKind::ALL.into_iter().find(|k| k.field_type() == self)
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_type_of_tags() {
        assert_eq!(TypeTag::Primitive(PrimitiveKind::Int).field_type(), FieldType::Integer);
        assert_eq!(TypeTag::Boxed(PrimitiveKind::Int).field_type(), FieldType::Integer);
        assert_eq!(TypeTag::list_of(TypeTag::String).field_type(), FieldType::Complex);
        assert_eq!(TypeTag::complex("Order").field_type(), FieldType::Complex);
        assert_eq!(TypeTag::Any.field_type(), FieldType::Any);
    }

    #[test]
    fn test_nullability() {
        assert!(!TypeTag::Primitive(PrimitiveKind::Long).is_nullable());
        assert!(TypeTag::Boxed(PrimitiveKind::Long).is_nullable());
        assert!(TypeTag::String.is_nullable());
    }

    #[test]
    fn test_primitive_kind_lookup() {
        assert_eq!(FieldType::Short.primitive_kind(), Some(PrimitiveKind::Short));
        assert_eq!(FieldType::String.primitive_kind(), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(TypeTag::list_of(TypeTag::complex("Order")).to_string(), "list<Order>");
        assert_eq!(TypeTag::Boxed(PrimitiveKind::Int).to_string(), "int?");
    }
}
