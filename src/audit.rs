//! Audits: per-field diagnostics collected while reading and writing.
//!
//! Field-level problems never abort sibling fields. They are recorded into an
//! [`AuditSink`] and the operation carries on.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AuditStatus {
    Info,
    Warn,
    Error,
}

impl fmt::Display for AuditStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AuditStatus::Info => "INFO",
            AuditStatus::Warn => "WARN",
            AuditStatus::Error => "ERROR",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Audit {
    pub status: AuditStatus,
    pub doc_id: Option<String>,
    pub path: String,
    pub message: String,
    pub original_value: Option<String>,
}

impl Audit {
    pub fn new(status: AuditStatus, path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status,
            doc_id: None,
            path: path.into(),
            message: message.into(),
            original_value: None,
        }
    }

    pub fn with_value(mut self, value: impl fmt::Display) -> Self {
        self.original_value = Some(value.to_string());
        self
    }
}

impl fmt::Display for Audit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.status, self.path, self.message)?;
        if let Some(value) = &self.original_value {
            write!(f, " (value: {value})")?;
        }
        Ok(())
    }
}

/// Receives audits.
pub trait AuditSink {
    fn record(&mut self, audit: Audit);

    fn info(&mut self, path: &str, message: String) {
        self.record(Audit::new(AuditStatus::Info, path, message));
    }

    fn warn(&mut self, path: &str, message: String) {
        self.record(Audit::new(AuditStatus::Warn, path, message));
    }

    fn error(&mut self, path: &str, message: String) {
        self.record(Audit::new(AuditStatus::Error, path, message));
    }
}

// ============================================================================
// Collectors
// ============================================================================

/// In-memory collector. Stamps its `doc_id` on every audit it receives.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Audits {
    doc_id: Option<String>,
    entries: Vec<Audit>,
}

impl Audits {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn for_document(doc_id: impl Into<String>) -> Self {
        Self { doc_id: Some(doc_id.into()), entries: Vec::new() }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Audit> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn with_status(&self, status: AuditStatus) -> impl Iterator<Item = &Audit> {
        self.entries.iter().filter(move |a| a.status == status)
    }

    pub fn warnings(&self) -> Vec<&Audit> {
        self.with_status(AuditStatus::Warn).collect()
    }

    pub fn errors(&self) -> Vec<&Audit> {
        self.with_status(AuditStatus::Error).collect()
    }

    pub fn has_errors(&self) -> bool {
        self.with_status(AuditStatus::Error).next().is_some()
    }

    pub fn into_vec(self) -> Vec<Audit> {
        self.entries
    }
}

impl AuditSink for Audits {
    fn record(&mut self, mut audit: Audit) {
        if audit.doc_id.is_none() {
            audit.doc_id = self.doc_id.clone();
        }
        self.entries.push(audit);
    }
}

impl AuditSink for Vec<Audit> {
    fn record(&mut self, audit: Audit) {
        self.push(audit);
    }
}

impl<'a> IntoIterator for &'a Audits {
    type Item = &'a Audit;
    type IntoIter = std::slice::Iter<'a, Audit>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Forwards every audit to `tracing`, then to the wrapped sink.
#[derive(Debug, Default)]
pub struct TracingAuditSink<S> {
    inner: S,
}

impl<S: AuditSink> TracingAuditSink<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: AuditSink> AuditSink for TracingAuditSink<S> {
    fn record(&mut self, audit: Audit) {
        match audit.status {
            AuditStatus::Info => tracing::info!(path = %audit.path, "{}", audit.message),
            AuditStatus::Warn => tracing::warn!(path = %audit.path, "{}", audit.message),
            AuditStatus::Error => tracing::error!(path = %audit.path, "{}", audit.message),
        }
        self.inner.record(audit);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_doc_id_stamped() {
        let mut audits = Audits::for_document("doc-1");
        audits.warn("/a", "missing".into());
        assert_eq!(audits.len(), 1);
        assert_eq!(audits.iter().next().unwrap().doc_id.as_deref(), Some("doc-1"));
        assert!(!audits.has_errors());
    }

    #[test]
    fn test_status_filters() {
        let mut audits = Audits::new();
        audits.warn("/a", "w".into());
        audits.error("/b", "e".into());
        audits.info("/c", "i".into());
        assert_eq!(audits.warnings().len(), 1);
        assert_eq!(audits.errors()[0].path, "/b");
        assert!(audits.has_errors());
    }

    #[test]
    fn test_tracing_sink_forwards() {
        let mut sink = TracingAuditSink::new(Vec::new());
        sink.record(Audit::new(AuditStatus::Error, "/x", "bad").with_value(42));
        let inner = sink.into_inner();
        assert_eq!(inner[0].original_value.as_deref(), Some("42"));
        assert_eq!(inner[0].to_string(), "[ERROR] /x: bad (value: 42)");
    }

    #[test]
    fn test_serde_uppercase_status() {
        let json = serde_json::to_string(&AuditStatus::Warn).unwrap();
        assert_eq!(json, "\"WARN\"");
    }
}
