//! Accessor lookup with overload disambiguation.

use super::{GetterDescriptor, MemberDescriptor, SetterDescriptor, TypeRegistry};
use crate::model::TypeTag;
use crate::{Error, Result};

/// `accessor_name("get", "addressLine1") == "getAddressLine1"`.
pub fn accessor_name(prefix: &str, field: &str) -> String {
    let mut chars = field.chars();
    match chars.next() {
        Some(first) => {
            let mut name = String::with_capacity(prefix.len() + field.len());
            name.push_str(prefix);
            name.extend(first.to_uppercase());
            name.push_str(chars.as_str());
            name
        }
        None => prefix.to_string(),
    }
}

/// Resolves path segments to accessors over a [`TypeRegistry`].
#[derive(Debug, Clone, Copy)]
pub struct AccessorResolver<'r> {
    registry: &'r TypeRegistry,
}

impl<'r> AccessorResolver<'r> {
    pub fn new(registry: &'r TypeRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &'r TypeRegistry {
        self.registry
    }

    fn not_found(type_name: &str, field: &str) -> Error {
        Error::AccessorNotFound { type_name: type_name.to_string(), field: field.to_string() }
    }

    /// `get<Name>`, then `is<Name>`, most-derived type first.
    pub fn find_getter(&self, type_name: &str, field: &str) -> Result<&'r GetterDescriptor> {
        let get = accessor_name("get", field);
        let is = accessor_name("is", field);
        self.registry
            .lineage(type_name)
            .into_iter()
            .find_map(|desc| desc.getters.get(&get).or_else(|| desc.getters.get(&is)))
            .ok_or_else(|| Self::not_found(type_name, field))
    }

    /// Every `set<Name>` overload, most-derived type first.
    pub fn setter_candidates(&self, type_name: &str, field: &str) -> Vec<&'r SetterDescriptor> {
        let set = accessor_name("set", field);
        self.registry
            .lineage(type_name)
            .into_iter()
            .filter_map(|desc| desc.setters.get(&set))
            .flatten()
            .collect()
    }

    /// Pick the setter for `field`.
    ///
    /// With a `hint`, the first overload whose parameter accepts it wins.
    /// Without one: the only overload, else the overload whose parameter
    /// matches the getter's return type, else [`Error::AmbiguousSetter`].
    pub fn find_setter(
        &self,
        type_name: &str,
        field: &str,
        hint: Option<&TypeTag>,
    ) -> Result<&'r SetterDescriptor> {
        let candidates = self.setter_candidates(type_name, field);
        if candidates.is_empty() {
            return Err(Self::not_found(type_name, field));
        }

        if let Some(hint) = hint {
            return candidates
                .iter()
                .copied()
                .find(|s| self.accepts(&s.param_type, hint))
                .ok_or_else(|| Self::not_found(type_name, field));
        }

        if let [only] = candidates.as_slice() {
            return Ok(*only);
        }

        if let Ok(getter) = self.find_getter(type_name, field) {
            if let Some(paired) = candidates.iter().copied().find(|s| s.param_type == getter.return_type)
            {
                return Ok(paired);
            }
        }

        tracing::debug!(type_name, field, overloads = candidates.len(), "ambiguous setter");
        Err(Error::AmbiguousSetter {
            type_name: type_name.to_string(),
            field: field.to_string(),
            candidates: candidates.iter().map(|s| format!("{s:?}")).collect(),
        })
    }

    /// Direct member lookup, most-derived type first.
    pub fn find_direct_member(&self, type_name: &str, field: &str) -> Result<&'r MemberDescriptor> {
        self.registry
            .lineage(type_name)
            .into_iter()
            .find_map(|desc| desc.find_member(field))
            .ok_or_else(|| Self::not_found(type_name, field))
    }

    /// Declared type of `field`: getter return type, else setter parameter
    /// (unambiguous only), else member type.
    pub fn declared_type(&self, type_name: &str, field: &str) -> Option<TypeTag> {
        if let Ok(getter) = self.find_getter(type_name, field) {
            return Some(getter.return_type.clone());
        }
        if let Ok(setter) = self.find_setter(type_name, field, None) {
            return Some(setter.param_type.clone());
        }
        self.find_direct_member(type_name, field).ok().map(|m| m.declared_type.clone())
    }

    /// Whether a slot declared `param` can take a value of type `hint`.
    /// Boxing is ignored for primitives; complex types follow ancestry.
    pub fn accepts(&self, param: &TypeTag, hint: &TypeTag) -> bool {
        match (param, hint) {
            (TypeTag::Any, _) | (_, TypeTag::Any) => true,
            (
                TypeTag::Primitive(a) | TypeTag::Boxed(a),
                TypeTag::Primitive(b) | TypeTag::Boxed(b),
            ) => a == b,
            (TypeTag::Complex(a), TypeTag::Complex(b)) => self.registry.is_assignable(b, a),
            (TypeTag::Array(a), TypeTag::Array(b))
            | (TypeTag::List(a), TypeTag::List(b))
            | (TypeTag::Map(a), TypeTag::Map(b)) => self.accepts(a, b),
            (a, b) => a == b,
        }
    }
}
