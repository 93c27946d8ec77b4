//! Binding configuration.
//!
//! ```json
//! {
//!   "doc-id": "invoice-7",
//!   "timezone": "+02:00",
//!   "property-order": ["runtime", "mapping-defined"],
//!   "combine": { "delimiter": "comma", "limit": 64 },
//!   "separate": { "delimiter": "multi-space" }
//! }
//! ```
//!
//! Every key is optional.

use serde::{Deserialize, Serialize};

use crate::property::SourceKind;
use crate::strategy::{CombineOptions, SeparateOptions};
use crate::Result;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct BindingConfig {
    /// Stamped on every audit recorded through a `Binder`.
    pub doc_id: Option<String>,
    /// Zone for temporal conversions that need one; `None` is local time.
    pub timezone: Option<String>,
    pub property_order: Vec<SourceKind>,
    pub combine: CombineOptions,
    pub separate: SeparateOptions,
}

impl Default for BindingConfig {
    fn default() -> Self {
        Self {
            doc_id: None,
            timezone: None,
            property_order: SourceKind::DEFAULT_ORDER.to_vec(),
            combine: CombineOptions::default(),
            separate: SeparateOptions::default(),
        }
    }
}

impl BindingConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: BindingConfig = serde_json::from_str(json)?;
        tracing::debug!(
            doc_id = ?config.doc_id,
            timezone = ?config.timezone,
            "binding config loaded"
        );
        Ok(config)
    }

    pub fn with_doc_id(mut self, doc_id: impl Into<String>) -> Self {
        self.doc_id = Some(doc_id.into());
        self
    }

    pub fn with_timezone(mut self, timezone: impl Into<String>) -> Self {
        self.timezone = Some(timezone.into());
        self
    }

    pub fn with_property_order(mut self, order: impl Into<Vec<SourceKind>>) -> Self {
        self.property_order = order.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::StringDelimiter;
    use crate::Error;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_json_is_default() {
        assert_eq!(BindingConfig::from_json("{}").unwrap(), BindingConfig::default());
    }

    #[test]
    fn test_full_json() {
        let config = BindingConfig::from_json(
            r#"{
                "doc-id": "invoice-7",
                "timezone": "+02:00",
                "property-order": ["runtime", "mapping-defined"],
                "combine": { "delimiter": "comma", "limit": 64 },
                "separate": { "delimiter": "pipe", "limit": 3 }
            }"#,
        )
        .unwrap();
        assert_eq!(config.doc_id.as_deref(), Some("invoice-7"));
        assert_eq!(config.timezone.as_deref(), Some("+02:00"));
        assert_eq!(config.property_order, vec![SourceKind::Runtime, SourceKind::MappingDefined]);
        assert_eq!(config.combine.delimiter, StringDelimiter::Comma);
        assert_eq!(config.combine.limit, Some(64));
        assert!(config.combine.trim);
        assert_eq!(config.separate.delimiter, StringDelimiter::Pipe);
        assert_eq!(config.separate.limit, Some(3));
    }

    #[test]
    fn test_bad_json() {
        let err = BindingConfig::from_json(r#"{"property-order": ["nowhere"]}"#).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
