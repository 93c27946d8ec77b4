//! Named-property lookup across ordered value sources.
//!
//! A mapping may refer to a property by name without saying where it lives.
//! The resolver asks each source kind in turn and the first one that knows
//! the name wins; ties are broken by order, never by value.

use hashbrown::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::convert::ConversionMatrix;
use crate::model::{FieldType, PropertyMap, Value};
use crate::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceKind {
    Environment,
    System,
    MappingDefined,
    Runtime,
}

impl SourceKind {
    pub const DEFAULT_ORDER: [SourceKind; 4] = [
        SourceKind::Environment,
        SourceKind::System,
        SourceKind::MappingDefined,
        SourceKind::Runtime,
    ];
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SourceKind::Environment => "environment",
            SourceKind::System => "system",
            SourceKind::MappingDefined => "mapping-defined",
            SourceKind::Runtime => "runtime",
        };
        f.write_str(name)
    }
}

/// A place properties can come from.
pub trait PropertySource: Send + Sync {
    fn kind(&self) -> SourceKind;

    /// The value for `name` and, if the source declares one, its type.
    fn lookup(&self, name: &str) -> Option<(Value, Option<FieldType>)>;
}

// ============================================================================
// Sources
// ============================================================================

/// Process environment. `db.user-name` also matches `DB_USER_NAME`.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvironmentSource;

impl EnvironmentSource {
    fn env_name(name: &str) -> String {
        name.chars()
            .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_uppercase() } else { '_' })
            .collect()
    }
}

impl PropertySource for EnvironmentSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Environment
    }

    fn lookup(&self, name: &str) -> Option<(Value, Option<FieldType>)> {
        std::env::var(name)
            .or_else(|_| std::env::var(Self::env_name(name)))
            .ok()
            .map(|v| (Value::String(v), Some(FieldType::String)))
    }
}

/// In-memory properties of one kind.
#[derive(Debug, Clone)]
pub struct MapSource {
    kind: SourceKind,
    entries: HashMap<String, (Value, Option<FieldType>)>,
}

impl MapSource {
    pub fn new(kind: SourceKind) -> Self {
        Self { kind, entries: HashMap::new() }
    }

    pub fn system() -> Self {
        Self::new(SourceKind::System)
    }

    pub fn mapping_defined() -> Self {
        Self::new(SourceKind::MappingDefined)
    }

    pub fn runtime() -> Self {
        Self::new(SourceKind::Runtime)
    }

    /// Source of `kind` over an existing property map. Types are inferred.
    pub fn from_properties(kind: SourceKind, properties: PropertyMap) -> Self {
        let entries = properties.into_iter().map(|(k, v)| (k, (v, None))).collect();
        Self { kind, entries }
    }

    /// Add an entry whose type is inferred from the value.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value.into(), None);
        self
    }

    pub fn with_typed(
        mut self,
        name: impl Into<String>,
        value: impl Into<Value>,
        field_type: FieldType,
    ) -> Self {
        self.insert(name, value.into(), Some(field_type));
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: Value, field_type: Option<FieldType>) {
        self.entries.insert(name.into(), (value, field_type));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl PropertySource for MapSource {
    fn kind(&self) -> SourceKind {
        self.kind
    }

    fn lookup(&self, name: &str) -> Option<(Value, Option<FieldType>)> {
        self.entries.get(name).cloned()
    }
}

// ============================================================================
// Resolver
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedProperty {
    pub name: String,
    pub value: Value,
    /// Declared by the source, else inferred from the value.
    pub field_type: Option<FieldType>,
    pub source: SourceKind,
}

pub struct PropertyResolver {
    sources: Vec<Box<dyn PropertySource>>,
    order: Vec<SourceKind>,
}

impl Default for PropertyResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for PropertyResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kinds: Vec<SourceKind> = self.sources.iter().map(|s| s.kind()).collect();
        f.debug_struct("PropertyResolver")
            .field("sources", &kinds)
            .field("order", &self.order)
            .finish()
    }
}

impl PropertyResolver {
    pub fn new() -> Self {
        Self { sources: Vec::new(), order: SourceKind::DEFAULT_ORDER.to_vec() }
    }

    pub fn with_source(mut self, source: impl PropertySource + 'static) -> Self {
        self.sources.push(Box::new(source));
        self
    }

    pub fn with_order(mut self, order: impl Into<Vec<SourceKind>>) -> Self {
        self.order = order.into();
        self
    }

    pub fn order(&self) -> &[SourceKind] {
        &self.order
    }

    /// Resolve using the configured order.
    pub fn resolve(&self, name: &str) -> Option<ResolvedProperty> {
        self.resolve_in(name, &self.order)
    }

    /// First source in `order` that defines `name`. Several sources of the
    /// same kind are asked in registration order.
    pub fn resolve_in(&self, name: &str, order: &[SourceKind]) -> Option<ResolvedProperty> {
        let hit = order.iter().find_map(|kind| {
            self.sources
                .iter()
                .filter(|s| s.kind() == *kind)
                .find_map(|s| s.lookup(name).map(|hit| (*kind, hit)))
        });

        match hit {
            Some((source, (value, declared))) => {
                tracing::trace!(name, %source, "property resolved");
                let field_type = declared.or_else(|| FieldType::of(&value));
                Some(ResolvedProperty { name: name.to_string(), value, field_type, source })
            }
            None => {
                tracing::debug!(name, ?order, "property not found");
                None
            }
        }
    }

    /// Resolve and convert to `target`. Not found is `Ok(None)`; a value that
    /// cannot be converted is an error.
    pub fn resolve_as(
        &self,
        name: &str,
        order: &[SourceKind],
        target: FieldType,
    ) -> Result<Option<ResolvedProperty>> {
        let Some(found) = self.resolve_in(name, order) else {
            return Ok(None);
        };
        let value = ConversionMatrix::global().convert(&found.value, found.field_type, target)?;
        Ok(Some(ResolvedProperty { field_type: Some(target), value, ..found }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::Concern;
    use crate::Error;

    fn resolver() -> PropertyResolver {
        PropertyResolver::new()
            .with_source(MapSource::runtime().with("dupe-string", "from-runtime").with("port", "8080"))
            .with_source(
                MapSource::mapping_defined()
                    .with("dupe-string", "from-mapping")
                    .with_typed("ratio", 0.5, FieldType::Double),
            )
    }

    #[test]
    fn test_order_decides_winner() {
        let r = resolver();
        let hit = r.resolve_in("dupe-string", &[SourceKind::Runtime, SourceKind::MappingDefined]).unwrap();
        assert_eq!(hit.value, Value::from("from-runtime"));
        assert_eq!(hit.source, SourceKind::Runtime);

        let hit = r.resolve_in("dupe-string", &[SourceKind::MappingDefined, SourceKind::Runtime]).unwrap();
        assert_eq!(hit.value, Value::from("from-mapping"));
    }

    #[test]
    fn test_missing_is_none() {
        assert_eq!(resolver().resolve("nope"), None);
        assert_eq!(resolver().resolve_in("port", &[SourceKind::MappingDefined]), None);
    }

    #[test]
    fn test_inferred_and_declared_types() {
        let r = resolver();
        assert_eq!(r.resolve("port").unwrap().field_type, Some(FieldType::String));
        assert_eq!(r.resolve("ratio").unwrap().field_type, Some(FieldType::Double));
    }

    #[test]
    fn test_resolve_as_converts() {
        let r = resolver();
        let hit = r.resolve_as("port", r.order(), FieldType::Integer).unwrap().unwrap();
        assert_eq!(hit.value, Value::Int(8080));
        assert_eq!(hit.field_type, Some(FieldType::Integer));
        assert_eq!(r.resolve_as("nope", r.order(), FieldType::Integer).unwrap(), None);
    }

    #[test]
    fn test_resolve_as_failure() {
        let r = PropertyResolver::new().with_source(MapSource::system().with("flag", "maybe"));
        let err = r.resolve_as("flag", &[SourceKind::System], FieldType::Boolean).unwrap_err();
        assert!(matches!(err, Error::Conversion(ref c) if c.concern == Concern::Format));
    }

    #[test]
    fn test_from_properties() {
        let mut props = PropertyMap::new();
        props.insert("limit".into(), Value::Long(10));
        let r = PropertyResolver::new().with_source(MapSource::from_properties(SourceKind::Runtime, props));
        let hit = r.resolve("limit").unwrap();
        assert_eq!(hit.source, SourceKind::Runtime);
        assert_eq!(hit.field_type, Some(FieldType::Long));
    }

    #[test]
    fn test_env_name() {
        assert_eq!(EnvironmentSource::env_name("db.user-name"), "DB_USER_NAME");
    }

    #[test]
    fn test_environment_source() {
        let path = std::env::var("PATH").ok();
        let hit = EnvironmentSource.lookup("PATH");
        assert_eq!(hit.map(|(v, _)| v), path.map(Value::String));
    }
}
