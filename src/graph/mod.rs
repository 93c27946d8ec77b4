//! # Graph Walkers
//!
//! [`GraphReader`] pulls field values out of an object graph,
//! [`GraphWriter`] pushes them in, creating whatever is missing on the way.
//!
//! Both navigate the same way, one segment at a time:
//!
//! | Current node | Child lookup |
//! |--------------|--------------|
//! | registered object | getter, then direct member |
//! | unregistered object | raw member |
//! | map | entry by segment name |
//! | any node, empty segment name | the node itself |

pub mod reader;
pub mod writer;

pub use reader::GraphReader;
pub use writer::{GraphWriter, PendingWrite};

use crate::access::AccessorResolver;
use crate::model::{TypeTag, Value};
use crate::path::Segment;
use crate::{Error, Result};

/// An element position inside a collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Slot {
    Index(usize),
    Key(String),
}

/// Segment-level navigation shared by the reader and the writer.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Navigator<'r> {
    pub(crate) resolver: AccessorResolver<'r>,
}

impl<'r> Navigator<'r> {
    pub(crate) fn new(resolver: AccessorResolver<'r>) -> Self {
        Self { resolver }
    }

    /// The value `segment` names under `current`. Missing entries are `Null`;
    /// a node that cannot have children is an error.
    pub(crate) fn child(&self, current: &Value, segment: &Segment) -> Result<Value> {
        let name = segment.name();
        if name.is_empty() {
            return Ok(current.clone());
        }
        match current {
            Value::Object(obj) => {
                let type_name = obj.type_name();
                if !self.resolver.registry().contains(&type_name) {
                    return Ok(obj.member(name).unwrap_or(Value::Null));
                }
                if let Ok(getter) = self.resolver.find_getter(&type_name, name) {
                    return Ok(getter.accessor.get(&obj.read()));
                }
                self.resolver
                    .find_direct_member(&type_name, name)
                    .map(|m| obj.member(&m.name).unwrap_or(Value::Null))
            }
            Value::Map(map) => Ok(map.get(name).unwrap_or(Value::Null)),
            other => Err(Error::AccessorNotFound {
                type_name: other.type_name().to_string(),
                field: name.to_string(),
            }),
        }
    }

    /// Store `value` as the child `name` of `owner`. `Null` into a
    /// non-nullable primitive slot is skipped.
    pub(crate) fn set_child(
        &self,
        owner: &Value,
        name: &str,
        value: Value,
        hint: Option<&TypeTag>,
    ) -> Result<()> {
        match owner {
            Value::Object(obj) => {
                let type_name = obj.type_name();
                if !self.resolver.registry().contains(&type_name) {
                    obj.set_member(name, value);
                    return Ok(());
                }
                match self.resolver.find_setter(&type_name, name, hint) {
                    Ok(setter) => {
                        if value.is_null() && !setter.param_type.is_nullable() {
                            tracing::trace!(type_name = %type_name, field = name, "skipping null for primitive slot");
                            return Ok(());
                        }
                        setter.accessor.set(&mut obj.write(), value)
                    }
                    Err(Error::AccessorNotFound { .. }) => {
                        let member = self.resolver.find_direct_member(&type_name, name)?;
                        if value.is_null() && !member.declared_type.is_nullable() {
                            return Ok(());
                        }
                        obj.set_member(member.name.clone(), value);
                        Ok(())
                    }
                    Err(e) => Err(e),
                }
            }
            Value::Map(map) => {
                map.insert(name, value);
                Ok(())
            }
            other => Err(Error::AccessorNotFound {
                type_name: other.type_name().to_string(),
                field: name.to_string(),
            }),
        }
    }

    /// Declared type of the child `name` of `owner`, when known.
    pub(crate) fn child_type(&self, owner: &Value, name: &str, hint: Option<&TypeTag>) -> Option<TypeTag> {
        match owner {
            Value::Object(obj) => {
                let type_name = obj.type_name();
                if let Some(hint) = hint {
                    if let Ok(setter) = self.resolver.find_setter(&type_name, name, Some(hint)) {
                        return Some(setter.param_type.clone());
                    }
                }
                self.resolver.declared_type(&type_name, name)
            }
            Value::Map(map) => Some(map.value_type()).filter(|t| *t != TypeTag::Any),
            _ => None,
        }
    }

    /// Whether a registered object type has any way to store `name`.
    pub(crate) fn has_accessor(&self, owner: &Value, name: &str, hint: Option<&TypeTag>) -> Result<()> {
        let Value::Object(obj) = owner else {
            return Ok(());
        };
        let type_name = obj.type_name();
        if !self.resolver.registry().contains(&type_name) {
            return Ok(());
        }
        match self.resolver.find_setter(&type_name, name, hint) {
            Ok(_) => Ok(()),
            Err(Error::AccessorNotFound { .. }) => {
                self.resolver.find_direct_member(&type_name, name).map(|_| ())
            }
            Err(e) => Err(e),
        }
    }
}

// ============================================================================
// Collections
// ============================================================================

/// Where `segment` points inside a collection, if it is indexed.
pub(crate) fn slot_of(segment: &Segment) -> Option<Slot> {
    match (segment.index(), segment.key()) {
        (Some(i), _) => Some(Slot::Index(i)),
        (None, Some(k)) => Some(Slot::Key(k.to_string())),
        _ => None,
    }
}

/// Element at `slot`; `Null` when absent or the collection kind doesn't
/// match the slot.
pub(crate) fn element_at(collection: &Value, slot: &Slot) -> Value {
    match (collection, slot) {
        (Value::Array(seq) | Value::List(seq), Slot::Index(i)) => seq.get(*i).unwrap_or(Value::Null),
        (Value::Map(map), Slot::Key(k)) => map.get(k).unwrap_or(Value::Null),
        (Value::Map(map), Slot::Index(i)) => map.get(&i.to_string()).unwrap_or(Value::Null),
        _ => Value::Null,
    }
}

/// Every element with its slot, in order. Non-collections yield nothing.
pub(crate) fn elements(collection: &Value) -> Vec<(Slot, Value)> {
    match collection {
        Value::Array(seq) | Value::List(seq) => seq
            .items()
            .into_iter()
            .enumerate()
            .map(|(i, v)| (Slot::Index(i), v))
            .collect(),
        Value::Map(map) => map.entries().into_iter().map(|(k, v)| (Slot::Key(k), v)).collect(),
        _ => Vec::new(),
    }
}

/// Declared element type of a collection value.
pub(crate) fn element_type(collection: &Value) -> Option<TypeTag> {
    let tag = match collection {
        Value::Array(seq) | Value::List(seq) => seq.element_type(),
        Value::Map(map) => map.value_type(),
        _ => return None,
    };
    Some(tag).filter(|t| *t != TypeTag::Any)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::{TypeDescriptor, TypeRegistry};
    use crate::model::{MapRef, Object, ObjectRef, PrimitiveKind, SeqRef};
    use crate::path::Path;

    fn seg(expr: &str) -> Segment {
        Path::parse(&format!("/{expr}")).unwrap().last_segment().clone()
    }

    fn registry() -> TypeRegistry {
        TypeRegistry::new().with(
            TypeDescriptor::new("Counter")
                .property("count", TypeTag::Primitive(PrimitiveKind::Int))
                .member("label", TypeTag::String),
        )
    }

    #[test]
    fn test_child_through_getter_and_member() {
        let reg = registry();
        let nav = Navigator::new(AccessorResolver::new(&reg));
        let obj = Value::Object(ObjectRef::new(
            Object::new("Counter").with_member("count", 3).with_member("label", "hits"),
        ));
        assert_eq!(nav.child(&obj, &seg("count")).unwrap(), Value::Int(3));
        assert_eq!(nav.child(&obj, &seg("label")).unwrap(), Value::from("hits"));
        assert!(nav.child(&obj, &seg("nope")).is_err());
        assert!(nav.child(&Value::Int(1), &seg("x")).is_err());
    }

    #[test]
    fn test_unregistered_object_uses_raw_members() {
        let reg = TypeRegistry::new();
        let nav = Navigator::new(AccessorResolver::new(&reg));
        let obj = Value::Object(ObjectRef::new(Object::new("Loose")));
        nav.set_child(&obj, "x", Value::Int(1), None).unwrap();
        assert_eq!(nav.child(&obj, &seg("x")).unwrap(), Value::Int(1));
        assert_eq!(nav.child(&obj, &seg("y")).unwrap(), Value::Null);
    }

    #[test]
    fn test_null_into_primitive_is_skipped() {
        let reg = registry();
        let nav = Navigator::new(AccessorResolver::new(&reg));
        let obj = Value::Object(ObjectRef::new(Object::new("Counter").with_member("count", 9)));
        nav.set_child(&obj, "count", Value::Null, None).unwrap();
        assert_eq!(nav.child(&obj, &seg("count")).unwrap(), Value::Int(9));
    }

    #[test]
    fn test_elements_and_slots() {
        let list = Value::List(SeqRef::new(TypeTag::Any, vec![Value::Int(1), Value::Int(2)]));
        assert_eq!(elements(&list).len(), 2);
        assert_eq!(element_at(&list, &Slot::Index(1)), Value::Int(2));
        assert_eq!(element_at(&list, &Slot::Index(5)), Value::Null);
        let map = MapRef::new(TypeTag::String);
        map.insert("k", Value::from("v"));
        let map = Value::Map(map);
        assert_eq!(element_at(&map, &slot_of(&seg("m{k}")).unwrap()), Value::from("v"));
        assert_eq!(element_type(&map), Some(TypeTag::String));
        assert_eq!(element_type(&list), None);
    }
}
