//! Read side: extract one field, or one field per element, from a graph.

use super::{element_at, elements, slot_of, Navigator, Slot};
use crate::access::{AccessorResolver, TypeRegistry};
use crate::audit::AuditSink;
use crate::convert::copy_primitive_value;
use crate::model::{Extracted, Field, FieldGroup, TypeTag, Value};
use crate::path::Path;
use crate::{Error, Result};

/// Walks a source graph along a field path.
#[derive(Debug, Clone, Copy)]
pub struct GraphReader<'r> {
    nav: Navigator<'r>,
}

struct Walk<'a> {
    template: &'a Field,
    fields: Vec<Field>,
    audits: &'a mut dyn AuditSink,
}

impl<'r> GraphReader<'r> {
    pub fn new(registry: &'r TypeRegistry) -> Self {
        Self { nav: Navigator::new(AccessorResolver::new(registry)) }
    }

    /// Read a path expression with no declared type.
    pub fn read_path(&self, expression: &str, source: &Value, audits: &mut dyn AuditSink) -> Result<Extracted> {
        self.read(&Field::parse(expression)?, source, audits)
    }

    /// Read the value(s) `template.path` points at.
    ///
    /// Returns [`Extracted::Group`] iff the path has a wildcard segment; the
    /// group then holds one field per matched element, with null fields for
    /// elements that don't lead anywhere. Unreachable intermediate segments
    /// are audited as warnings.
    pub fn read(&self, template: &Field, source: &Value, audits: &mut dyn AuditSink) -> Result<Extracted> {
        if source.is_null() {
            return Err(Error::Document(format!("no source document to read {}", template.path)));
        }

        let path = &template.path;
        tracing::debug!(path = %path, "reading field");

        let mut walk = Walk { template, fields: Vec::new(), audits };
        let start = if path.has_collection_root() { 0 } else { 1 };
        self.walk(&mut walk, path.clone(), source.clone(), start, None);

        if path.has_wildcard() {
            let group = FieldGroup { path: path.clone(), field_type: template.field_type.clone(), fields: walk.fields };
            Ok(Extracted::Group(group))
        } else {
            let field = walk.fields.pop().unwrap_or_else(|| template.template(path.clone()));
            Ok(Extracted::Field(field))
        }
    }

    fn walk(&self, walk: &mut Walk<'_>, path: Path, current: Value, position: usize, index: Option<usize>) {
        if position >= path.len() {
            walk.emit(path, current, index);
            return;
        }

        let segment = &path.segments()[position];
        let terminal = position + 1 == path.len();

        if current.is_null() {
            let message = format!("no value to navigate into at '{segment}'");
            walk.unreachable(path, index, message);
            return;
        }

        let child = match self.nav.child(&current, segment) {
            Ok(child) => child,
            Err(e) if terminal => {
                tracing::trace!(path = %path, error = %e, "terminal accessor missing");
                walk.emit(path, Value::Null, index);
                return;
            }
            Err(e) => {
                walk.unreachable(path, index, e.to_string());
                return;
            }
        };

        if !segment.is_collection() {
            self.walk(walk, path, child, position + 1, index);
            return;
        }

        if child.is_null() {
            if terminal {
                walk.emit(path, Value::Null, index);
            } else {
                let message = format!("collection '{}' is absent", segment.name());
                walk.unreachable(path, index, message);
            }
            return;
        }
        if !matches!(child, Value::Array(_) | Value::List(_) | Value::Map(_)) {
            let message = format!("'{segment}' is not a collection");
            walk.unreachable(path, index, message);
            return;
        }

        match slot_of(segment) {
            Some(slot) => {
                let element = element_at(&child, &slot);
                self.walk(walk, path, element, position + 1, index);
            }
            None => {
                for (i, (slot, element)) in elements(&child).into_iter().enumerate() {
                    let concrete = match &slot {
                        Slot::Index(n) => path.with_collection_index_at(position, *n as i64),
                        Slot::Key(k) => path.with_collection_key_at(position, k),
                    };
                    // position always names a wildcard collection segment here
                    let Ok(concrete) = concrete else { continue };
                    self.walk(walk, concrete, element, position + 1, Some(i));
                }
            }
        }
    }
}

impl Walk<'_> {
    fn emit(&mut self, path: Path, value: Value, index: Option<usize>) {
        let mut field = self.template.template(path);
        field.field_type = field.field_type.or_else(|| match value {
            Value::Null => None,
            ref v => Some(TypeTag::of(v)),
        });
        field.value = copy_primitive_value(&value);
        field.index = index;
        self.fields.push(field);
    }

    /// Record a warning against the concrete path and emit a null field.
    fn unreachable(&mut self, path: Path, index: Option<usize>, message: String) {
        tracing::debug!(path = %path, "{message}");
        self.audits.warn(&path.to_string(), message);
        self.emit(path, Value::Null, index);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::Audits;
    use crate::model::{MapRef, Object, ObjectRef, SeqRef};
    use pretty_assertions::assert_eq;

    fn doc() -> Value {
        let address = ObjectRef::new(Object::new("Address").with_member("city", "Oslo"));
        let person = Object::new("Person").with_member("name", "Ada").with_member("address", address);
        let tags = MapRef::new(TypeTag::String);
        tags.insert("a", Value::from("x"));
        tags.insert("b", Value::from("y"));
        let root = MapRef::new(TypeTag::Any);
        root.insert("person", Value::Object(ObjectRef::new(person)));
        root.insert("nums", Value::List(SeqRef::new(TypeTag::Any, vec![Value::Int(1), Value::Int(2)])));
        root.insert("tags", Value::Map(tags));
        Value::Map(root)
    }

    #[test]
    fn test_read_plain_path() {
        let reg = TypeRegistry::new();
        let reader = GraphReader::new(&reg);
        let mut audits = Audits::new();
        let out = reader.read_path("/person/address/city", &doc(), &mut audits).unwrap();
        let field = out.into_field().unwrap();
        assert_eq!(field.value, Value::from("Oslo"));
        assert_eq!(field.field_type, Some(TypeTag::String));
        assert!(audits.is_empty());
    }

    #[test]
    fn test_read_indexed_and_wildcard() {
        let reg = TypeRegistry::new();
        let reader = GraphReader::new(&reg);
        let mut audits = Audits::new();
        let one = reader.read_path("/nums<1>", &doc(), &mut audits).unwrap();
        assert_eq!(one.values(), vec![Value::Int(2)]);

        let all = reader.read_path("/nums<>", &doc(), &mut audits).unwrap().into_group().unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all.fields[1].path.to_string(), "/nums<1>");
        assert_eq!(all.fields[1].index, Some(1));
    }

    #[test]
    fn test_read_map_wildcard_uses_keys() {
        let reg = TypeRegistry::new();
        let reader = GraphReader::new(&reg);
        let mut audits = Audits::new();
        let group = reader.read_path("/tags{}", &doc(), &mut audits).unwrap().into_group().unwrap();
        let paths: Vec<String> = group.iter().map(|f| f.path.to_string()).collect();
        assert_eq!(paths, vec!["/tags{a}", "/tags{b}"]);
    }

    #[test]
    fn test_missing_intermediate_warns() {
        let reg = TypeRegistry::new();
        let reader = GraphReader::new(&reg);
        let mut audits = Audits::new();
        let out = reader.read_path("/ghost/city", &doc(), &mut audits).unwrap();
        assert!(out.into_field().unwrap().is_null());
        assert_eq!(audits.warnings().len(), 1);
        assert_eq!(audits.warnings()[0].path, "/ghost/city");
    }

    #[test]
    fn test_missing_terminal_is_silent() {
        let reg = TypeRegistry::new();
        let reader = GraphReader::new(&reg);
        let mut audits = Audits::new();
        let out = reader.read_path("/person/nickname", &doc(), &mut audits).unwrap();
        assert!(out.into_field().unwrap().is_null());
        assert!(audits.is_empty());
    }

    #[test]
    fn test_collection_segment_over_scalar_warns() {
        let reg = TypeRegistry::new();
        let reader = GraphReader::new(&reg);
        let mut audits = Audits::new();
        let group = reader.read_path("/person/name<>", &doc(), &mut audits).unwrap().into_group().unwrap();
        assert_eq!(group.len(), 1);
        assert!(group.fields[0].is_null());
        assert_eq!(audits.warnings().len(), 1);
        assert_eq!(audits.warnings()[0].path, "/person/name<>");

        let mut audits = Audits::new();
        let one = reader.read_path("/person/name[0]", &doc(), &mut audits).unwrap();
        assert!(one.into_field().unwrap().is_null());
        assert_eq!(audits.warnings().len(), 1);
    }

    #[test]
    fn test_null_source_is_document_error() {
        let reg = TypeRegistry::new();
        let reader = GraphReader::new(&reg);
        let mut audits = Audits::new();
        assert!(matches!(reader.read_path("/a", &Value::Null, &mut audits), Err(Error::Document(_))));
    }

    #[test]
    fn test_read_root() {
        let reg = TypeRegistry::new();
        let reader = GraphReader::new(&reg);
        let mut audits = Audits::new();
        let out = reader.read_path("/", &Value::from("whole"), &mut audits).unwrap();
        assert_eq!(out.values(), vec![Value::from("whole")]);
    }
}
