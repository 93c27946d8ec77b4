//! # pathbind: Field-Path Binding Engine
//!
//! Reads values out of, and writes values into, nested object graphs
//! addressed by slash-separated field paths such as
//! `/orders<4>/address/addressLine1`.
//!
//! ## Design Principles
//!
//! 1. **Paths are values**: parsing is a pure function, indexing returns a new `Path`
//! 2. **No reflection**: typed objects expose explicitly registered getters and setters
//! 3. **Diagnostics are data**: missing nodes and failed conversions become audits,
//!    only an unusable document or path is an `Err`
//! 4. **One conversion table**: every coercion goes through the `ConversionMatrix`
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pathbind::{Audits, Binder, Field, TypeDescriptor, TypeRegistry, TypeTag, Value};
//!
//! # fn example() -> pathbind::Result<()> {
//! let registry = TypeRegistry::new()
//!     .with(TypeDescriptor::new("Customer").property("name", TypeTag::String));
//! let binder = Binder::new(registry);
//!
//! let mut audits = Audits::new();
//! let mut writer = binder.writer_for("Customer")?;
//! writer.write(Field::parse("/name")?.with_value("Ada"), &mut audits)?;
//! writer.commit(&mut audits);
//! let customer = writer.into_root();
//!
//! let name = binder.read("/name", &customer, &mut audits)?;
//! assert_eq!(name.values(), vec![Value::from("Ada")]);
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! | Module | Role |
//! |--------|------|
//! | [`path`] | path grammar, segments, index algebra |
//! | [`model`] | values, objects, collections, fields |
//! | [`access`] | type registry and accessor resolution |
//! | [`convert`] | pairwise value conversion with declared concerns |
//! | [`graph`] | read and write walkers |
//! | [`strategy`] | combine / separate string strategies |
//! | [`property`] | named lookups across ordered sources |
//! | [`audit`] | non-fatal diagnostics |
//! | [`config`] | serde configuration |

// ============================================================================
// Modules
// ============================================================================

pub mod model;
pub mod path;
pub mod access;
pub mod convert;
pub mod graph;
pub mod strategy;
pub mod property;
pub mod audit;
pub mod config;

// ============================================================================
// Re-exports: Model
// ============================================================================

pub use model::{
    Extracted, Field, FieldGroup, FieldType, MapRef, Object, ObjectRef, PrimitiveKind,
    PropertyMap, SeqRef, TypeTag, Value,
};
pub use path::{CollectionKind, Path, Segment};

// ============================================================================
// Re-exports: Access, conversion, walkers
// ============================================================================

pub use access::{AccessorResolver, Getter, Setter, TypeDescriptor, TypeRegistry};
pub use convert::{Concern, ConversionError, ConversionMatrix};
pub use graph::{GraphReader, GraphWriter, PendingWrite};

// ============================================================================
// Re-exports: Strategies, properties, diagnostics, config
// ============================================================================

pub use strategy::{CombineOptions, SeparateOptions, StringDelimiter};
pub use property::{PropertyResolver, PropertySource, ResolvedProperty, SourceKind};
pub use audit::{Audit, AuditSink, AuditStatus, Audits};
pub use config::BindingConfig;

// ============================================================================
// Top-level Binder handle
// ============================================================================

/// The primary entry point. A `Binder` owns the type registry of a document
/// model together with its configuration and hands out readers and writers.
#[derive(Debug, Default)]
pub struct Binder {
    registry: TypeRegistry,
    config: BindingConfig,
}

impl Binder {
    pub fn new(registry: TypeRegistry) -> Self {
        Self { registry, config: BindingConfig::default() }
    }

    pub fn with_config(mut self, config: BindingConfig) -> Self {
        self.config = config;
        self
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    pub fn config(&self) -> &BindingConfig {
        &self.config
    }

    /// An empty audit collector stamped with the configured document id.
    pub fn audits(&self) -> Audits {
        match &self.config.doc_id {
            Some(id) => Audits::for_document(id.clone()),
            None => Audits::new(),
        }
    }

    /// Read a path expression from `source`.
    pub fn read(&self, expression: &str, source: &Value, audits: &mut dyn AuditSink) -> Result<Extracted> {
        GraphReader::new(&self.registry).read_path(expression, source, audits)
    }

    /// Read the path of `template`, carrying its type metadata onto the results.
    pub fn read_field(&self, template: &Field, source: &Value, audits: &mut dyn AuditSink) -> Result<Extracted> {
        GraphReader::new(&self.registry).read(template, source, audits)
    }

    /// Writer over an existing root (`Value::Null` lets the first write pick one).
    pub fn writer(&self, root: Value) -> GraphWriter<'_> {
        GraphWriter::new(&self.registry, root).with_timezone(self.config.timezone.clone())
    }

    /// Writer over a fresh instance of a registered type.
    pub fn writer_for(&self, type_name: &str) -> Result<GraphWriter<'_>> {
        Ok(GraphWriter::for_type(&self.registry, type_name)?.with_timezone(self.config.timezone.clone()))
    }

    /// Resolver using the configured source order. Sources are added by the caller.
    pub fn property_resolver(&self) -> PropertyResolver {
        PropertyResolver::new().with_order(self.config.property_order.clone())
    }

    /// Combine a group with the configured options.
    pub fn combine(&self, group: &FieldGroup) -> Option<String> {
        strategy::combine_fields(group, &self.config.combine)
    }

    /// Separate a field with the configured options.
    pub fn separate(&self, field: &Field) -> Result<FieldGroup> {
        strategy::separate_field(field, &self.config.separate)
    }
}

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Structural error at {path}: {message}")]
    Structural { path: String, message: String },

    #[error("No accessor for '{field}' on {type_name}")]
    AccessorNotFound { type_name: String, field: String },

    #[error("Ambiguous setter for '{field}' on {type_name}: {}", candidates.join(", "))]
    AmbiguousSetter { type_name: String, field: String, candidates: Vec<String> },

    #[error("Unknown type: {0}")]
    UnknownType(String),

    #[error(transparent)]
    Conversion(#[from] ConversionError),

    #[error("Cannot instantiate {type_name}: {reason}")]
    Instantiation { type_name: String, reason: String },

    #[error("Document error: {0}")]
    Document(String),

    #[error("Config error: {0}")]
    Config(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    fn binder() -> Binder {
        let registry = TypeRegistry::new().with(
            TypeDescriptor::new("Event")
                .property("name", TypeTag::String)
                .property("at", TypeTag::DateTime),
        );
        Binder::new(registry).with_config(BindingConfig::default().with_doc_id("doc-1").with_timezone("+02:00"))
    }

    #[test]
    fn test_write_then_read() {
        let binder = binder();
        let mut audits = binder.audits();
        let mut writer = binder.writer_for("Event").unwrap();
        writer.write(Field::parse("/name").unwrap().with_value("launch"), &mut audits).unwrap();
        writer.write(Field::parse("/at").unwrap().with_value("2024-01-01 10:00:00"), &mut audits).unwrap();
        assert_eq!(writer.commit(&mut audits), 2);
        let root = writer.into_root();

        let at = binder.read("/at", &root, &mut audits).unwrap().into_field().unwrap();
        assert_eq!(at.value.to_string(), "2024-01-01T10:00:00+02:00");
        assert!(audits.is_empty());
    }

    #[test]
    fn test_audits_carry_doc_id() {
        let binder = binder();
        let mut audits = binder.audits();
        let mut writer = binder.writer_for("Event").unwrap();
        writer.write(Field::parse("/at").unwrap().with_value("not a date"), &mut audits).unwrap();
        let audit = audits.iter().next().unwrap();
        assert_eq!(audit.doc_id.as_deref(), Some("doc-1"));
        assert_eq!(audit.status, AuditStatus::Warn);
    }

    #[test]
    fn test_strategies_use_config() {
        let binder = Binder::default().with_config(BindingConfig {
            combine: CombineOptions::default().with_delimiter(StringDelimiter::Comma),
            ..BindingConfig::default()
        });
        let field = Field::parse("/tags<>").unwrap().with_value("a  b c");
        let group = binder.separate(&field).unwrap();
        assert_eq!(group.len(), 3);
        assert_eq!(binder.combine(&group).as_deref(), Some("a,b,c"));
    }

    #[test]
    fn test_error_display() {
        let err = Error::AmbiguousSetter {
            type_name: "Order".into(),
            field: "total".into(),
            candidates: vec!["setTotal(int)".into(), "setTotal(string)".into()],
        };
        assert_eq!(err.to_string(), "Ambiguous setter for 'total' on Order: setTotal(int), setTotal(string)");
    }
}
