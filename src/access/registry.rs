//! Type registry: descriptors for every type a path can navigate into.

use std::fmt;
use std::sync::Arc;

use hashbrown::{HashMap, HashSet};

use super::{Getter, GetterDescriptor, MemberAccess, MemberDescriptor, Setter, SetterDescriptor};
use crate::model::{MapRef, Object, ObjectRef, PrimitiveKind, SeqRef, TypeTag, Value};
use crate::{Error, Result};

/// Builds a fresh instance of a registered type.
pub type Factory = Arc<dyn Fn() -> Object + Send + Sync>;

// ============================================================================
// TypeDescriptor
// ============================================================================

/// Everything the engine knows about one named type.
#[derive(Clone)]
pub struct TypeDescriptor {
    pub name: String,
    /// Declared ancestors, nearest first.
    pub ancestors: Vec<String>,
    pub is_abstract: bool,
    pub factory: Option<Factory>,
    pub members: Vec<MemberDescriptor>,
    pub getters: HashMap<String, GetterDescriptor>,
    pub setters: HashMap<String, Vec<SetterDescriptor>>,
}

impl TypeDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ancestors: Vec::new(),
            is_abstract: false,
            factory: None,
            members: Vec::new(),
            getters: HashMap::new(),
            setters: HashMap::new(),
        }
    }

    pub fn extends(mut self, ancestor: impl Into<String>) -> Self {
        self.ancestors.push(ancestor.into());
        self
    }

    pub fn abstract_type(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    pub fn factory<F>(mut self, factory: F) -> Self
    where
        F: Fn() -> Object + Send + Sync + 'static,
    {
        self.factory = Some(Arc::new(factory));
        self
    }

    /// Register a direct member without accessors.
    pub fn member(mut self, name: impl Into<String>, declared_type: TypeTag) -> Self {
        let name = name.into();
        self.members.retain(|m| m.name != name);
        self.members.push(MemberDescriptor { name, declared_type });
        self
    }

    pub fn getter<G>(mut self, method: impl Into<String>, return_type: TypeTag, getter: G) -> Self
    where
        G: Getter + 'static,
    {
        let name = method.into();
        self.getters.insert(
            name.clone(),
            GetterDescriptor { name, return_type, accessor: Arc::new(getter) },
        );
        self
    }

    /// Register a setter. Calling this again with the same method name adds
    /// an overload.
    pub fn setter<S>(mut self, method: impl Into<String>, param_type: TypeTag, setter: S) -> Self
    where
        S: Setter + 'static,
    {
        let name = method.into();
        self.setters
            .entry(name.clone())
            .or_default()
            .push(SetterDescriptor { name, param_type, accessor: Arc::new(setter) });
        self
    }

    /// Member plus member-backed `get<Name>` (or `is<Name>` for a
    /// non-nullable boolean) and `set<Name>`.
    pub fn property(self, name: &str, declared_type: TypeTag) -> Self {
        let get_prefix = match declared_type {
            TypeTag::Primitive(PrimitiveKind::Boolean) => "is",
            _ => "get",
        };
        let getter_name = super::accessor_name(get_prefix, name);
        let setter_name = super::accessor_name("set", name);
        self.member(name, declared_type.clone())
            .getter(getter_name, declared_type.clone(), MemberAccess::new(name))
            .setter(setter_name, declared_type, MemberAccess::new(name))
    }

    pub fn find_member(&self, name: &str) -> Option<&MemberDescriptor> {
        self.members.iter().find(|m| m.name == name)
    }

    /// A default instance: primitive members at their zero value, everything
    /// else `Null`.
    fn default_object(&self) -> Object {
        let mut object = Object::new(self.name.clone());
        for member in &self.members {
            let initial = match member.declared_type {
                TypeTag::Primitive(kind) => kind.zero_value(),
                _ => Value::Null,
            };
            object.set_member(member.name.clone(), initial);
        }
        object
    }
}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("name", &self.name)
            .field("ancestors", &self.ancestors)
            .field("is_abstract", &self.is_abstract)
            .field("members", &self.members)
            .field("getters", &self.getters.values().collect::<Vec<_>>())
            .field("setters", &self.setters.values().flatten().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// TypeRegistry
// ============================================================================

/// Registry of [`TypeDescriptor`]s keyed by type name.
#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    types: HashMap<String, TypeDescriptor>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) a descriptor.
    pub fn register(&mut self, descriptor: TypeDescriptor) -> &mut Self {
        tracing::debug!(type_name = %descriptor.name, "registering type");
        self.types.insert(descriptor.name.clone(), descriptor);
        self
    }

    /// Builder form of [`TypeRegistry::register`].
    pub fn with(mut self, descriptor: TypeDescriptor) -> Self {
        self.register(descriptor);
        self
    }

    pub fn get(&self, type_name: &str) -> Option<&TypeDescriptor> {
        self.types.get(type_name)
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.types.contains_key(type_name)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// The type and all of its registered ancestors, most-derived first.
    /// Unregistered names are skipped; cycles are cut.
    pub fn lineage(&self, type_name: &str) -> Vec<&TypeDescriptor> {
        let mut out = Vec::new();
        let mut seen: HashSet<&str> = HashSet::new();
        let mut queue = std::collections::VecDeque::from([type_name]);

        while let Some(name) = queue.pop_front() {
            if !seen.insert(name) {
                continue;
            }
            if let Some(desc) = self.types.get(name) {
                out.push(desc);
                queue.extend(desc.ancestors.iter().map(String::as_str));
            }
        }
        out
    }

    /// `true` when `type_name` is `ancestor` or declares it somewhere up the
    /// chain. The ancestor itself need not be registered.
    pub fn is_assignable(&self, type_name: &str, ancestor: &str) -> bool {
        type_name == ancestor
            || self
                .lineage(type_name)
                .iter()
                .any(|d| d.name == ancestor || d.ancestors.iter().any(|a| a == ancestor))
    }

    /// Create a value for a declared type.
    ///
    /// | Tag | Result |
    /// |-----|--------|
    /// | `Complex(name)` | factory output or default instance |
    /// | `Array` / `List` | empty sequence of the element type |
    /// | `Map` | empty map of the value type |
    /// | `Any` | empty dynamic map |
    /// | `Primitive(k)` | zero value of `k` |
    /// | anything else | `Null` |
    pub fn instantiate(&self, tag: &TypeTag) -> Result<Value> {
        match tag {
            TypeTag::Complex(name) => {
                let desc = self.get(name).ok_or_else(|| Error::UnknownType(name.clone()))?;
                if desc.is_abstract {
                    return Err(Error::Instantiation {
                        type_name: name.clone(),
                        reason: "type is abstract".into(),
                    });
                }
                let object = match &desc.factory {
                    Some(factory) => (factory.as_ref())(),
                    None => desc.default_object(),
                };
                tracing::trace!(type_name = %name, "instantiated object");
                Ok(Value::Object(ObjectRef::new(object)))
            }
            TypeTag::Array(elem) => Ok(Value::Array(SeqRef::empty((**elem).clone()))),
            TypeTag::List(elem) => Ok(Value::List(SeqRef::empty((**elem).clone()))),
            TypeTag::Map(value) => Ok(Value::Map(MapRef::new((**value).clone()))),
            TypeTag::Any => Ok(Value::Map(MapRef::new(TypeTag::Any))),
            TypeTag::Primitive(kind) => Ok(kind.zero_value()),
            _ => Ok(Value::Null),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> TypeRegistry {
        TypeRegistry::new()
            .with(TypeDescriptor::new("Party").abstract_type().property("name", TypeTag::String))
            .with(
                TypeDescriptor::new("Person")
                    .extends("Party")
                    .property("age", TypeTag::Primitive(PrimitiveKind::Int))
                    .property("active", TypeTag::Primitive(PrimitiveKind::Boolean)),
            )
            .with(TypeDescriptor::new("Employee").extends("Person"))
    }

    #[test]
    fn test_lineage_most_derived_first() {
        let reg = registry();
        let names: Vec<&str> = reg.lineage("Employee").iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["Employee", "Person", "Party"]);
        assert!(reg.is_assignable("Employee", "Party"));
        assert!(!reg.is_assignable("Party", "Person"));
    }

    #[test]
    fn test_unregistered_ancestor_is_assignable() {
        let reg = TypeRegistry::new()
            .with(TypeDescriptor::new("Sub").extends("Super"))
            .with(TypeDescriptor::new("Leaf").extends("Sub"));
        assert!(reg.is_assignable("Sub", "Super"));
        assert!(reg.is_assignable("Leaf", "Super"));
        assert!(!reg.is_assignable("Super", "Sub"));
        assert!(!reg.is_assignable("Sub", "Other"));
    }

    #[test]
    fn test_lineage_survives_cycles() {
        let reg = TypeRegistry::new()
            .with(TypeDescriptor::new("A").extends("B"))
            .with(TypeDescriptor::new("B").extends("A"));
        assert_eq!(reg.lineage("A").len(), 2);
    }

    #[test]
    fn test_property_registers_accessors() {
        let reg = registry();
        let person = reg.get("Person").unwrap();
        assert!(person.getters.contains_key("getAge"));
        assert!(person.getters.contains_key("isActive"));
        assert_eq!(person.setters["setAge"].len(), 1);
    }

    #[test]
    fn test_instantiate_default_members() {
        let reg = registry();
        let value = reg.instantiate(&TypeTag::complex("Person")).unwrap();
        let obj = value.as_object().unwrap();
        assert_eq!(obj.member("age"), Some(Value::Int(0)));
        assert_eq!(obj.member("active"), Some(Value::Bool(false)));
    }

    #[test]
    fn test_instantiate_failures() {
        let reg = registry();
        assert!(matches!(
            reg.instantiate(&TypeTag::complex("Party")),
            Err(Error::Instantiation { .. })
        ));
        assert!(matches!(reg.instantiate(&TypeTag::complex("Nope")), Err(Error::UnknownType(_))));
    }

    #[test]
    fn test_instantiate_containers() {
        let reg = registry();
        let list = reg.instantiate(&TypeTag::list_of(TypeTag::complex("Person"))).unwrap();
        assert!(matches!(list, Value::List(ref s) if s.is_empty()));
        assert!(matches!(reg.instantiate(&TypeTag::Any).unwrap(), Value::Map(_)));
        assert_eq!(reg.instantiate(&TypeTag::String).unwrap(), Value::Null);
    }

    #[test]
    fn test_factory_wins() {
        let reg = TypeRegistry::new().with(
            TypeDescriptor::new("Order").factory(|| Object::new("Order").with_member("status", "NEW")),
        );
        let order = reg.instantiate(&TypeTag::complex("Order")).unwrap();
        assert_eq!(order.as_object().unwrap().member("status"), Some(Value::from("NEW")));
    }
}
