//! Write side: store field values into a graph, creating intermediates.
//!
//! Writing is three-phase:
//!
//! 1. **prepare**: walk every non-terminal segment, get-or-create objects and
//!    collections, grow collections to the addressed index. Returns the owner
//!    of the terminal segment.
//! 2. **populate**: resolve the target type, convert, queue the write.
//! 3. **commit**: apply queued writes in order, re-fetching terminal
//!    collections from their owners since arrays may have been reallocated
//!    by later prepares.

use super::{element_at, element_type, slot_of, Navigator, Slot};
use crate::access::{AccessorResolver, TypeRegistry};
use crate::audit::{Audit, AuditStatus, AuditSink};
use crate::convert::ConversionMatrix;
use crate::model::{adjust_size, Field, FieldGroup, MapRef, SeqRef, TypeTag, Value};
use crate::path::{CollectionKind, Path, Segment};
use crate::{Error, Result};

/// A populated field waiting for commit.
#[derive(Debug, Clone)]
pub struct PendingWrite {
    pub field: Field,
    /// Owner of the terminal segment; `None` when the field is the root.
    pub owner: Option<Value>,
    pub target_type: Option<TypeTag>,
}

/// Stores fields into a root value. The root is created on demand.
#[derive(Debug)]
pub struct GraphWriter<'r> {
    nav: Navigator<'r>,
    root: Value,
    zone: Option<String>,
    pending: Vec<PendingWrite>,
}

impl<'r> GraphWriter<'r> {
    pub fn new(registry: &'r TypeRegistry, root: Value) -> Self {
        Self {
            nav: Navigator::new(AccessorResolver::new(registry)),
            root,
            zone: None,
            pending: Vec::new(),
        }
    }

    /// Writer over a fresh instance of a registered type.
    pub fn for_type(registry: &'r TypeRegistry, type_name: &str) -> Result<Self> {
        let root = registry.instantiate(&TypeTag::complex(type_name))?;
        Ok(Self::new(registry, root))
    }

    /// Zone used for temporal conversions; the local zone when unset.
    pub fn with_timezone(mut self, zone: Option<String>) -> Self {
        self.zone = zone;
        self
    }

    pub fn root(&self) -> &Value {
        &self.root
    }

    pub fn into_root(self) -> Value {
        self.root
    }

    pub fn pending(&self) -> &[PendingWrite] {
        &self.pending
    }

    fn registry(&self) -> &'r TypeRegistry {
        self.nav.resolver.registry()
    }

    // ========================================================================
    // Public protocol
    // ========================================================================

    /// Prepare and populate one field. Conversion failures are audited and
    /// the field is written as null; structural and accessor failures are
    /// returned.
    pub fn write(&mut self, field: Field, audits: &mut dyn AuditSink) -> Result<()> {
        let owner = self.prepare(&field.path)?;
        self.populate(field, owner, audits)
    }

    /// Write every member of a group. A failing member is audited as an
    /// error and does not stop the others. Returns how many were queued.
    pub fn write_group(&mut self, group: &FieldGroup, audits: &mut dyn AuditSink) -> usize {
        let mut queued = 0;
        for field in group {
            let path = field.path.to_string();
            match self.write(field.clone(), audits) {
                Ok(()) => queued += 1,
                Err(e) => audits.record(Audit::new(AuditStatus::Error, path, e.to_string())),
            }
        }
        queued
    }

    /// Walk `path` creating whatever is missing. Returns the owner of the
    /// terminal segment, `None` when the terminal segment is the root.
    pub fn prepare(&mut self, path: &Path) -> Result<Option<Value>> {
        if path.has_wildcard() {
            return Err(Error::Structural {
                path: path.to_string(),
                message: "cannot write through a wildcard segment".into(),
            });
        }
        tracing::debug!(path = %path, "preparing write");

        let root_segment = path.root_segment();
        self.ensure_root(root_segment)?;
        if path.is_root() {
            return Ok(None);
        }

        let mut current = if root_segment.is_collection() {
            let next = &path.segments()[1];
            self.element_or_create(&self.root.clone(), root_segment, Some(next), path)?
        } else {
            self.root.clone()
        };

        let last = path.len() - 1;
        for position in 1..path.len() {
            let segment = &path.segments()[position];
            let terminal = position == last;
            if terminal && !segment.is_collection() {
                break;
            }

            let next = path.segments().get(position + 1);
            let child = self.child_or_create(&current, segment, next, path)?;

            if !segment.is_collection() {
                current = child;
                continue;
            }

            let collection = self.grow(&current, segment, child, path)?;
            if terminal {
                break;
            }
            current = self.element_or_create(&collection, segment, next, path)?;
        }

        Ok(Some(current))
    }

    /// Resolve the target type, convert and queue `field`.
    pub fn populate(&mut self, mut field: Field, owner: Option<Value>, audits: &mut dyn AuditSink) -> Result<()> {
        let terminal = field.path.last_segment().clone();
        let hint = (!field.value.is_null()).then(|| TypeTag::of(&field.value));

        let target_type = match &field.field_type {
            Some(declared) => Some(declared.clone()),
            None => match &owner {
                None if terminal.is_collection() => element_type(&self.root),
                None => None,
                Some(owner) if terminal.is_collection() => {
                    element_type(&self.nav.child(owner, &terminal)?)
                }
                Some(owner) => self.nav.child_type(owner, terminal.name(), hint.as_ref()),
            },
        };

        if let (Some(owner), false) = (&owner, terminal.is_collection()) {
            self.nav.has_accessor(owner, terminal.name(), target_type.as_ref().or(hint.as_ref()))?;
        }

        field.value = self.coerce(&field, target_type.as_ref(), audits);
        tracing::trace!(path = %field.path, value = %field.value, "queued write");
        self.pending.push(PendingWrite { field, owner, target_type });
        Ok(())
    }

    /// Apply every queued write in insertion order. Returns how many were
    /// applied; failures are audited as errors.
    pub fn commit(&mut self, audits: &mut dyn AuditSink) -> usize {
        let pending = std::mem::take(&mut self.pending);
        let total = pending.len();
        let mut applied = 0;

        for write in pending {
            let path = write.field.path.to_string();
            let value = self.coerce(&write.field, write.target_type.as_ref(), audits);
            match self.apply(&write, value) {
                Ok(()) => applied += 1,
                Err(e) => {
                    tracing::warn!(path = %path, error = %e, "commit failed");
                    audits.record(Audit::new(AuditStatus::Error, path, e.to_string()));
                }
            }
        }

        tracing::debug!(applied, total, "commit finished");
        applied
    }

    // ========================================================================
    // Internals
    // ========================================================================

    /// Convert towards `target`. On failure the value becomes null and an
    /// audit is recorded: a warning, or an error for required fields.
    fn coerce(&self, field: &Field, target: Option<&TypeTag>, audits: &mut dyn AuditSink) -> Value {
        let Some(target) = target else {
            return field.value.clone();
        };
        if !target.field_type().is_primitive_like() {
            return field.value.clone();
        }
        match ConversionMatrix::global().convert_to_tag(&field.value, target, self.zone.as_deref()) {
            Ok(v) => v,
            Err(e) => {
                let status = if field.required { AuditStatus::Error } else { AuditStatus::Warn };
                audits.record(
                    Audit::new(status, field.path.to_string(), e.to_string()).with_value(&field.value),
                );
                Value::Null
            }
        }
    }

    fn ensure_root(&mut self, root: &Segment) -> Result<()> {
        if self.root.is_null() {
            self.root = if root.is_collection() {
                empty_collection(root.kind(), TypeTag::Any)
            } else {
                Value::Map(MapRef::new(TypeTag::Any))
            };
        }
        if let Some(Slot::Index(i)) = slot_of(root) {
            if let Some(grown) = adjust_size(&self.root, i) {
                self.root = grown;
            }
        }
        Ok(())
    }

    /// The child `segment` names under `current`, created from its declared
    /// type when absent.
    fn child_or_create(
        &self,
        current: &Value,
        segment: &Segment,
        next: Option<&Segment>,
        path: &Path,
    ) -> Result<Value> {
        if segment.name().is_empty() {
            return Ok(current.clone());
        }
        let existing = self.nav.child(current, segment)?;
        if !existing.is_null() {
            return Ok(existing);
        }

        let declared = self.nav.child_type(current, segment.name(), None);
        let created = if segment.is_collection() {
            match declared {
                Some(tag) if tag.is_collection() => self.registry().instantiate(&tag)?,
                _ => empty_collection(segment.kind(), TypeTag::Any),
            }
        } else {
            self.intermediate(declared.as_ref(), next, path)?
        };

        tracing::trace!(segment = %segment, "created intermediate");
        self.nav.set_child(current, segment.name(), created.clone(), Some(&TypeTag::of(&created)))?;
        Ok(created)
    }

    /// Make the segment's index addressable, re-storing reallocated arrays.
    fn grow(&self, owner: &Value, segment: &Segment, collection: Value, path: &Path) -> Result<Value> {
        let Some(Slot::Index(i)) = slot_of(segment) else {
            return Ok(collection);
        };
        let Some(grown) = adjust_size(&collection, i) else {
            return Ok(collection);
        };
        let reallocated = match (&grown, &collection) {
            (Value::Array(a), Value::Array(b)) => !a.ptr_eq(b),
            _ => false,
        };
        if reallocated {
            if segment.name().is_empty() {
                return Err(Error::Structural {
                    path: path.to_string(),
                    message: "a nested anonymous array cannot be resized".into(),
                });
            }
            self.nav.set_child(owner, segment.name(), grown.clone(), Some(&TypeTag::of(&grown)))?;
        }
        Ok(grown)
    }

    /// The element `segment` addresses inside `collection`, created from the
    /// element type when absent.
    fn element_or_create(
        &self,
        collection: &Value,
        segment: &Segment,
        next: Option<&Segment>,
        path: &Path,
    ) -> Result<Value> {
        let Some(slot) = slot_of(segment) else {
            return Ok(collection.clone());
        };
        let existing = element_at(collection, &slot);
        if !existing.is_null() {
            return Ok(existing);
        }

        let created = self.intermediate(element_type(collection).as_ref(), next, path)?;
        store_element(collection, &slot, created.clone(), path)?;
        Ok(created)
    }

    /// A node that can hold the `next` segment.
    fn intermediate(&self, declared: Option<&TypeTag>, next: Option<&Segment>, path: &Path) -> Result<Value> {
        match declared {
            Some(tag) if tag.is_complex() => self.registry().instantiate(tag),
            Some(TypeTag::Any) | None => match next {
                Some(next) if next.name().is_empty() && next.is_collection() => {
                    Ok(empty_collection(next.kind(), TypeTag::Any))
                }
                _ => Ok(Value::Map(MapRef::new(TypeTag::Any))),
            },
            Some(scalar) => Err(Error::Structural {
                path: path.to_string(),
                message: format!("cannot navigate into a {scalar} value"),
            }),
        }
    }

    fn apply(&mut self, write: &PendingWrite, value: Value) -> Result<()> {
        let terminal = write.field.path.last_segment();
        let Some(owner) = &write.owner else {
            return self.apply_root(terminal, value, &write.field.path);
        };

        if !terminal.is_collection() {
            let hint = (!value.is_null()).then(|| TypeTag::of(&value)).or(write.target_type.clone());
            return self.nav.set_child(owner, terminal.name(), value, hint.as_ref());
        }

        let Some(slot) = slot_of(terminal) else {
            return Err(Error::Structural {
                path: write.field.path.to_string(),
                message: "terminal collection segment has no index".into(),
            });
        };
        let collection = self.nav.child(owner, terminal)?;
        if collection.is_null() {
            return Err(Error::Document(format!("collection '{}' vanished before commit", terminal.name())));
        }
        let collection = self.grow(owner, terminal, collection, &write.field.path)?;
        store_element(&collection, &slot, value, &write.field.path)
    }

    fn apply_root(&mut self, root: &Segment, value: Value, path: &Path) -> Result<()> {
        match slot_of(root) {
            Some(slot) => {
                if let Slot::Index(i) = slot {
                    if let Some(grown) = adjust_size(&self.root, i) {
                        self.root = grown;
                    }
                }
                store_element(&self.root, &slot, value, path)
            }
            None => {
                self.root = value;
                Ok(())
            }
        }
    }
}

fn empty_collection(kind: CollectionKind, element: TypeTag) -> Value {
    match kind {
        CollectionKind::Array => Value::Array(SeqRef::empty(element)),
        CollectionKind::List => Value::List(SeqRef::empty(element)),
        _ => Value::Map(MapRef::new(element)),
    }
}

/// Store into an already-sized collection. A slot the container cannot hold
/// is a structural error.
fn store_element(collection: &Value, slot: &Slot, value: Value, path: &Path) -> Result<()> {
    match (collection, slot) {
        (Value::Array(seq) | Value::List(seq), Slot::Index(i)) => {
            if !seq.set(*i, value) {
                return Err(Error::Structural {
                    path: path.to_string(),
                    message: format!("index {i} is past the end of a collection of {}", seq.len()),
                });
            }
        }
        (Value::Map(map), Slot::Key(k)) => {
            map.insert(k.clone(), value);
        }
        (Value::Map(map), Slot::Index(i)) => {
            map.insert(i.to_string(), value);
        }
        (other, slot) => {
            let slot = match slot {
                Slot::Index(i) => format!("index {i}"),
                Slot::Key(k) => format!("key '{k}'"),
            };
            return Err(Error::Structural {
                path: path.to_string(),
                message: format!("a {} value cannot hold {slot}", TypeTag::of(other)),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::TypeDescriptor;
    use crate::audit::Audits;
    use crate::model::{Object, ObjectRef, PrimitiveKind};
    use pretty_assertions::assert_eq;

    fn registry() -> TypeRegistry {
        TypeRegistry::new()
            .with(
                TypeDescriptor::new("Item")
                    .property("sku", TypeTag::String)
                    .property("qty", TypeTag::Primitive(PrimitiveKind::Int)),
            )
            .with(
                TypeDescriptor::new("Cart")
                    .property("items", TypeTag::array_of(TypeTag::complex("Item")))
                    .property("owner", TypeTag::String),
            )
    }

    #[test]
    fn test_write_into_empty_root_creates_maps() {
        let reg = TypeRegistry::new();
        let mut writer = GraphWriter::new(&reg, Value::Null);
        let mut audits = Audits::new();
        writer.write(Field::parse("/a/b").unwrap().with_value(5), &mut audits).unwrap();
        assert_eq!(writer.commit(&mut audits), 1);
        let a = writer.root().as_map().unwrap().get("a").unwrap();
        assert_eq!(a.as_map().unwrap().get("b"), Some(Value::Int(5)));
    }

    #[test]
    fn test_array_growth_reassigns_owner() {
        let reg = registry();
        let mut writer = GraphWriter::for_type(&reg, "Cart").unwrap();
        let mut audits = Audits::new();
        writer.write(Field::parse("/items[0]/sku").unwrap().with_value("A"), &mut audits).unwrap();
        writer.write(Field::parse("/items[2]/sku").unwrap().with_value("C"), &mut audits).unwrap();
        assert_eq!(writer.commit(&mut audits), 2);

        let cart = writer.root().as_object().unwrap();
        let items = cart.member("items").unwrap();
        let seq = items.as_sequence().unwrap();
        assert_eq!(seq.len(), 3);
        assert!(seq.get(1).unwrap().is_null());
        let first = seq.get(0).unwrap();
        assert_eq!(first.as_object().unwrap().member("sku"), Some(Value::from("A")));
        assert!(audits.is_empty());
    }

    #[test]
    fn test_conversion_failure_is_audited_and_nulled() {
        let reg = registry();
        let mut writer = GraphWriter::for_type(&reg, "Item").unwrap();
        let mut audits = Audits::new();
        writer.write(Field::parse("/qty").unwrap().with_value("lots"), &mut audits).unwrap();
        writer.write(Field::parse("/sku").unwrap().with_value(12).required(), &mut audits).unwrap();
        writer.commit(&mut audits);
        assert_eq!(audits.warnings().len(), 1);
        let item = writer.root().as_object().unwrap();
        // null into a primitive slot leaves the zero value
        assert_eq!(item.member("qty"), Some(Value::Int(0)));
        assert_eq!(item.member("sku"), Some(Value::from("12")));
    }

    #[test]
    fn test_required_failure_is_error() {
        let reg = registry();
        let mut writer = GraphWriter::for_type(&reg, "Item").unwrap();
        let mut audits = Audits::new();
        writer.write(Field::parse("/qty").unwrap().with_value("x").required(), &mut audits).unwrap();
        assert!(audits.has_errors());
    }

    #[test]
    fn test_wildcard_write_rejected() {
        let reg = TypeRegistry::new();
        let mut writer = GraphWriter::new(&reg, Value::Null);
        let mut audits = Audits::new();
        let err = writer.write(Field::parse("/a<>/b").unwrap().with_value(1), &mut audits);
        assert!(matches!(err, Err(Error::Structural { .. })));
    }

    #[test]
    fn test_unknown_accessor_is_fatal() {
        let reg = registry();
        let mut writer = GraphWriter::for_type(&reg, "Item").unwrap();
        let mut audits = Audits::new();
        let err = writer.write(Field::parse("/colour").unwrap().with_value("red"), &mut audits);
        assert!(matches!(err, Err(Error::AccessorNotFound { .. })));
        assert!(writer.pending().is_empty());
    }

    #[test]
    fn test_root_collection_slot() {
        let reg = TypeRegistry::new();
        let mut writer = GraphWriter::new(&reg, Value::Null);
        let mut audits = Audits::new();
        writer.write(Field::parse("/[1]").unwrap().with_value("b"), &mut audits).unwrap();
        writer.commit(&mut audits);
        let seq = writer.root().as_sequence().unwrap();
        assert_eq!(seq.items(), vec![Value::Null, Value::from("b")]);
    }

    #[test]
    fn test_index_slot_on_object_root_is_structural() {
        let reg = TypeRegistry::new();
        let root = Value::Object(ObjectRef::new(Object::new("Loose")));
        let mut writer = GraphWriter::new(&reg, root);
        let mut audits = Audits::new();
        let err = writer.write(Field::parse("/[0]/x").unwrap().with_value(1), &mut audits);
        assert!(matches!(err, Err(Error::Structural { .. })));
        assert!(writer.pending().is_empty());
        assert_eq!(writer.root().as_object().unwrap().member("x"), None);
    }

    #[test]
    fn test_key_slot_on_list_is_not_dropped() {
        let reg = TypeRegistry::new();
        let mut writer = GraphWriter::new(&reg, Value::Null);
        let mut audits = Audits::new();
        writer.write(Field::parse("/tags<0>").unwrap().with_value("a"), &mut audits).unwrap();
        writer.write(Field::parse("/tags{colour}").unwrap().with_value("red"), &mut audits).unwrap();
        assert_eq!(writer.commit(&mut audits), 1);
        assert_eq!(audits.errors().len(), 1);

        let err = writer.write(Field::parse("/tags{colour}/shade").unwrap().with_value("dark"), &mut audits);
        assert!(matches!(err, Err(Error::Structural { .. })));

        let tags = writer.root().as_map().and_then(|m| m.get("tags")).unwrap();
        assert_eq!(tags.as_sequence().unwrap().items(), vec![Value::from("a")]);
    }

    #[test]
    fn test_write_group_continues_past_failures() {
        let reg = registry();
        let mut writer = GraphWriter::for_type(&reg, "Cart").unwrap();
        let mut audits = Audits::new();
        let mut group = FieldGroup::new(Path::parse("/items[]/sku").unwrap());
        group.push(Field::parse("/items[0]/sku").unwrap().with_value("A"));
        group.push(Field::parse("/items[1]/bogus").unwrap().with_value("B"));
        group.push(Field::parse("/items[2]/sku").unwrap().with_value("C"));
        assert_eq!(writer.write_group(&group, &mut audits), 2);
        assert_eq!(audits.errors().len(), 1);
        assert_eq!(writer.commit(&mut audits), 2);
    }
}
