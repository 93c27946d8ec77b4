//! Fields: a path plus the value found at (or destined for) it.

use crate::path::Path;
use crate::Result;

use super::{TypeTag, Value};

/// A single value bound to a concrete path.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub path: Path,
    /// Declared type; `None` lets readers infer from the value and writers
    /// resolve from the target accessor.
    pub field_type: Option<TypeTag>,
    pub value: Value,
    /// Element index when the field came out of a wildcard read.
    pub index: Option<usize>,
    /// Conversion failures on a required field are audited as errors.
    pub required: bool,
}

impl Field {
    pub fn new(path: Path) -> Self {
        Self { path, field_type: None, value: Value::Null, index: None, required: false }
    }

    /// Field for a path expression.
    pub fn parse(expression: &str) -> Result<Self> {
        Ok(Self::new(Path::parse(expression)?))
    }

    pub fn with_type(mut self, field_type: TypeTag) -> Self {
        self.field_type = Some(field_type);
        self
    }

    pub fn with_value(mut self, value: impl Into<Value>) -> Self {
        self.value = value.into();
        self
    }

    pub fn with_index(mut self, index: usize) -> Self {
        self.index = Some(index);
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// A new field at `path` carrying this field's type metadata, but no value.
    pub fn template(&self, path: Path) -> Field {
        Field {
            path,
            field_type: self.field_type.clone(),
            value: Value::Null,
            index: None,
            required: self.required,
        }
    }

    pub fn is_null(&self) -> bool {
        self.value.is_null()
    }
}

/// The fields matched by a path with wildcard segments, one per element.
/// Missing elements are kept as null fields.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldGroup {
    pub path: Path,
    pub field_type: Option<TypeTag>,
    pub fields: Vec<Field>,
}

impl FieldGroup {
    pub fn new(path: Path) -> Self {
        Self { path, field_type: None, fields: Vec::new() }
    }

    pub fn with_type(mut self, field_type: Option<TypeTag>) -> Self {
        self.field_type = field_type;
        self
    }

    pub fn push(&mut self, field: Field) {
        self.fields.push(field);
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Field> {
        self.fields.iter()
    }

    pub fn values(&self) -> Vec<Value> {
        self.fields.iter().map(|f| f.value.clone()).collect()
    }
}

impl<'a> IntoIterator for &'a FieldGroup {
    type Item = &'a Field;
    type IntoIter = std::slice::Iter<'a, Field>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}

/// Result of a read: a single field, or a group when the path had wildcards.
#[derive(Debug, Clone, PartialEq)]
pub enum Extracted {
    Field(Field),
    Group(FieldGroup),
}

impl Extracted {
    pub fn as_field(&self) -> Option<&Field> {
        match self {
            Extracted::Field(f) => Some(f),
            Extracted::Group(_) => None,
        }
    }

    pub fn as_group(&self) -> Option<&FieldGroup> {
        match self {
            Extracted::Group(g) => Some(g),
            Extracted::Field(_) => None,
        }
    }

    pub fn into_field(self) -> Option<Field> {
        match self {
            Extracted::Field(f) => Some(f),
            Extracted::Group(_) => None,
        }
    }

    pub fn into_group(self) -> Option<FieldGroup> {
        match self {
            Extracted::Group(g) => Some(g),
            Extracted::Field(_) => None,
        }
    }

    /// Every extracted value, in element order.
    pub fn values(&self) -> Vec<Value> {
        match self {
            Extracted::Field(f) => vec![f.value.clone()],
            Extracted::Group(g) => g.values(),
        }
    }
}
