//! # Conversion Matrix
//!
//! Typed value conversion between every pair of primitive-like
//! [`FieldType`]s, with the hazards of each pair declared up front:
//!
//! | Concern | Raised when |
//! |---------|-------------|
//! | `Range` | the value does not fit the target domain |
//! | `Loss` | precision or information may be dropped (never an error by itself) |
//! | `Format` | a string does not parse as the target type |
//! | `Timezone` | a zone is needed and the given one is unknown |
//! | `Unsupported` | no converter is registered for the pair |
//!
//! The registry is built once per process ([`ConversionMatrix::global`]) and
//! is read-only afterwards.

mod numeric;
mod temporal;
mod text;

use std::sync::OnceLock;

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::model::{FieldType, TypeTag, Value};

// ============================================================================
// Errors
// ============================================================================

/// The hazard a conversion pair carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Concern {
    Range,
    Loss,
    Format,
    Timezone,
    Unsupported,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("cannot convert {source_type} to {target_type} ({concern:?}): {message}")]
pub struct ConversionError {
    pub concern: Concern,
    pub source_type: FieldType,
    pub target_type: FieldType,
    pub message: String,
}

/// Converter-local failure, promoted to a [`ConversionError`] by the matrix.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Failure {
    concern: Concern,
    message: String,
}

impl Failure {
    pub(crate) fn range(message: impl Into<String>) -> Self {
        Self { concern: Concern::Range, message: message.into() }
    }

    pub(crate) fn format(message: impl Into<String>) -> Self {
        Self { concern: Concern::Format, message: message.into() }
    }

    pub(crate) fn timezone(message: impl Into<String>) -> Self {
        Self { concern: Concern::Timezone, message: message.into() }
    }

    pub(crate) fn unsupported(value: &Value) -> Self {
        Self {
            concern: Concern::Unsupported,
            message: format!("unexpected {} value", value.type_name()),
        }
    }
}

/// `(value, timezone) -> converted`
pub(crate) type ConvertFn = fn(&Value, Option<&str>) -> Result<Value, Failure>;

#[derive(Clone, Copy)]
pub(crate) struct Converter {
    pub(crate) concerns: &'static [Concern],
    pub(crate) func: ConvertFn,
}

// ============================================================================
// Matrix
// ============================================================================

/// Registry of converters keyed by `(source, target)`.
pub struct ConversionMatrix {
    converters: HashMap<(FieldType, FieldType), Converter>,
}

static GLOBAL: OnceLock<ConversionMatrix> = OnceLock::new();

impl ConversionMatrix {
    fn build() -> Self {
        let mut matrix = Self { converters: HashMap::new() };
        numeric::register(&mut matrix);
        text::register(&mut matrix);
        temporal::register(&mut matrix);
        tracing::debug!(pairs = matrix.converters.len(), "conversion matrix built");
        matrix
    }

    /// The process-wide matrix.
    pub fn global() -> &'static ConversionMatrix {
        GLOBAL.get_or_init(Self::build)
    }

    pub(crate) fn add(
        &mut self,
        source: FieldType,
        target: FieldType,
        concerns: &'static [Concern],
        func: ConvertFn,
    ) {
        self.converters.insert((source, target), Converter { concerns, func });
    }

    pub fn supports(&self, source: FieldType, target: FieldType) -> bool {
        source == target || target == FieldType::Any || self.converters.contains_key(&(source, target))
    }

    /// Hazards of converting `source` into `target`. Identity pairs have none;
    /// unregistered pairs are `[Unsupported]`.
    pub fn concerns(&self, source: FieldType, target: FieldType) -> &'static [Concern] {
        if source == target || target == FieldType::Any {
            return &[];
        }
        match self.converters.get(&(source, target)) {
            Some(c) => c.concerns,
            None => &[Concern::Unsupported],
        }
    }

    /// Convert using the local zone for temporal pairs.
    pub fn convert(
        &self,
        value: &Value,
        source: Option<FieldType>,
        target: FieldType,
    ) -> Result<Value, ConversionError> {
        self.convert_with_zone(value, source, target, None)
    }

    /// Convert `value` to `target`.
    ///
    /// `Null` converts to `Null` for every target. When `source` is absent
    /// (or not primitive-like) it is taken from the value itself. Identity
    /// pairs and an `Any` target return a copy.
    pub fn convert_with_zone(
        &self,
        value: &Value,
        source: Option<FieldType>,
        target: FieldType,
        zone: Option<&str>,
    ) -> Result<Value, ConversionError> {
        let Some(actual) = FieldType::of(value) else {
            return Ok(Value::Null);
        };
        let source = source.filter(|s| s.is_primitive_like()).unwrap_or(actual);

        if source == target || actual == target || target == FieldType::Any {
            return Ok(copy_primitive_value(value));
        }

        let Some(converter) = self.converters.get(&(source, target)) else {
            return Err(ConversionError {
                concern: Concern::Unsupported,
                source_type: source,
                target_type: target,
                message: format!("no converter from {source} to {target}"),
            });
        };

        (converter.func)(value, zone).map_err(|f| {
            tracing::trace!(%source, %target, concern = ?f.concern, "conversion failed");
            ConversionError {
                concern: f.concern,
                source_type: source,
                target_type: target,
                message: f.message,
            }
        })
    }

    /// Convert towards a declared tag. Non primitive-like tags pass the value
    /// through unchanged.
    pub fn convert_to_tag(
        &self,
        value: &Value,
        tag: &TypeTag,
        zone: Option<&str>,
    ) -> Result<Value, ConversionError> {
        let target = tag.field_type();
        if !target.is_primitive_like() {
            return Ok(value.clone());
        }
        self.convert_with_zone(value, None, target, zone)
    }

    // ========================================================================
    // Boxing
    // ========================================================================

    /// Non-nullable primitive slot.
    pub fn is_primitive(tag: &TypeTag) -> bool {
        matches!(tag, TypeTag::Primitive(_))
    }

    /// Nullable primitive slot.
    pub fn is_boxed(tag: &TypeTag) -> bool {
        matches!(tag, TypeTag::Boxed(_))
    }

    /// Swap between the primitive and boxed form of a kind. Any other tag is
    /// returned unchanged, so applying this twice is the identity.
    pub fn box_or_unbox(tag: &TypeTag) -> TypeTag {
        match tag {
            TypeTag::Primitive(k) => TypeTag::Boxed(*k),
            TypeTag::Boxed(k) => TypeTag::Primitive(*k),
            other => other.clone(),
        }
    }
}

/// Copy of a value for handing out of a graph: scalars, strings and
/// temporals are copied, shared nodes keep pointing at the same node.
pub fn copy_primitive_value(value: &Value) -> Value {
    value.clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PrimitiveKind;

    #[test]
    fn test_null_converts_to_null() {
        let m = ConversionMatrix::global();
        for target in [FieldType::Integer, FieldType::String, FieldType::Date, FieldType::Boolean] {
            assert_eq!(m.convert(&Value::Null, Some(FieldType::Long), target).unwrap(), Value::Null);
        }
    }

    #[test]
    fn test_identity_and_any() {
        let m = ConversionMatrix::global();
        assert_eq!(m.convert(&Value::Int(4), None, FieldType::Integer).unwrap(), Value::Int(4));
        assert_eq!(m.convert(&Value::Int(4), None, FieldType::Any).unwrap(), Value::Int(4));
        assert!(m.concerns(FieldType::Integer, FieldType::Integer).is_empty());
    }

    #[test]
    fn test_unsupported_pair() {
        let m = ConversionMatrix::global();
        let err = m.convert(&Value::Int(1), None, FieldType::Complex).unwrap_err();
        assert_eq!(err.concern, Concern::Unsupported);
        assert_eq!(m.concerns(FieldType::Integer, FieldType::Complex), &[Concern::Unsupported]);
    }

    #[test]
    fn test_box_or_unbox_involution() {
        for kind in PrimitiveKind::ALL {
            let tag = TypeTag::Primitive(kind);
            let boxed = ConversionMatrix::box_or_unbox(&tag);
            assert!(ConversionMatrix::is_boxed(&boxed));
            assert_eq!(ConversionMatrix::box_or_unbox(&boxed), tag);
        }
        assert_eq!(ConversionMatrix::box_or_unbox(&TypeTag::String), TypeTag::String);
    }

    #[test]
    fn test_copy_keeps_shared_nodes() {
        use crate::model::{SeqRef, TypeTag};
        let seq = SeqRef::empty(TypeTag::Any);
        let copy = copy_primitive_value(&Value::List(seq.clone()));
        assert!(copy.as_sequence().unwrap().ptr_eq(&seq));
    }

    #[test]
    fn test_convert_to_tag_passes_complex_through() {
        let m = ConversionMatrix::global();
        let v = Value::from("x");
        assert_eq!(m.convert_to_tag(&v, &TypeTag::complex("Order"), None).unwrap(), v);
        assert_eq!(
            m.convert_to_tag(&Value::from("12"), &TypeTag::Primitive(PrimitiveKind::Int), None).unwrap(),
            Value::Int(12)
        );
    }
}
