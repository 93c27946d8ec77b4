//! A single `/`-delimited unit of a path.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Collection semantics carried by a segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CollectionKind {
    None,
    /// `name[n]` / `name[]`
    Array,
    /// `name<n>` / `name<>`
    List,
    /// `name{key}` / `name{}`
    Map,
}

impl CollectionKind {
    /// Opening and closing bracket, `None` for plain segments.
    pub fn brackets(self) -> Option<(char, char)> {
        match self {
            CollectionKind::None => None,
            CollectionKind::Array => Some(('[', ']')),
            CollectionKind::List => Some(('<', '>')),
            CollectionKind::Map => Some(('{', '}')),
        }
    }

    pub(crate) fn from_close(close: char) -> Option<Self> {
        match close {
            ']' => Some(CollectionKind::Array),
            '>' => Some(CollectionKind::List),
            '}' => Some(CollectionKind::Map),
            _ => None,
        }
    }

    pub fn is_collection(self) -> bool {
        self != CollectionKind::None
    }
}

/// One parsed segment. Immutable; the `with_*` builders return new values.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Segment {
    pub(crate) name: String,
    pub(crate) kind: CollectionKind,
    pub(crate) index: Option<usize>,
    pub(crate) key: Option<String>,
    pub(crate) expression: String,
    pub(crate) root: bool,
}

impl Segment {
    /// The plain document-root segment (`""`).
    pub fn root() -> Self {
        Self {
            name: String::new(),
            kind: CollectionKind::None,
            index: None,
            key: None,
            expression: String::new(),
            root: true,
        }
    }

    /// A plain (non-collection) segment.
    pub fn field(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            expression: name.clone(),
            name,
            kind: CollectionKind::None,
            index: None,
            key: None,
            root: false,
        }
    }

    pub(crate) fn collection(
        name: String,
        kind: CollectionKind,
        index: Option<usize>,
        key: Option<String>,
        root: bool,
    ) -> Self {
        let mut seg = Self { name, kind, index, key, expression: String::new(), root };
        seg.expression = seg.render();
        seg
    }

    fn render(&self) -> String {
        match self.kind.brackets() {
            None => self.name.clone(),
            Some((open, close)) => {
                let inner = match (self.index, &self.key) {
                    (Some(i), _) => i.to_string(),
                    (None, Some(k)) => k.clone(),
                    (None, None) => String::new(),
                };
                format!("{}{open}{inner}{close}", self.name)
            }
        }
    }

    pub fn name(&self) -> &str { &self.name }
    pub fn kind(&self) -> CollectionKind { self.kind }
    pub fn index(&self) -> Option<usize> { self.index }
    pub fn key(&self) -> Option<&str> { self.key.as_deref() }
    pub fn expression(&self) -> &str { &self.expression }
    pub fn is_root(&self) -> bool { self.root }
    pub fn is_collection(&self) -> bool { self.kind.is_collection() }

    /// Collection segment with a concrete index or key.
    pub fn is_indexed(&self) -> bool {
        self.is_collection() && (self.index.is_some() || self.key.is_some())
    }

    /// Collection segment without index or key: matches every element.
    pub fn is_wildcard(&self) -> bool {
        self.is_collection() && !self.is_indexed()
    }

    /// Same segment addressing element `index`. For map segments the index
    /// becomes the key. Plain segments are returned unchanged.
    pub fn with_index(&self, index: usize) -> Segment {
        match self.kind {
            CollectionKind::None => self.clone(),
            CollectionKind::Map => self.with_key(index.to_string()),
            kind => Segment::collection(self.name.clone(), kind, Some(index), None, self.root),
        }
    }

    /// Same map segment addressing `key`. Non-map segments are returned
    /// unchanged.
    pub fn with_key(&self, key: impl Into<String>) -> Segment {
        match self.kind {
            CollectionKind::Map => {
                Segment::collection(self.name.clone(), self.kind, None, Some(key.into()), self.root)
            }
            _ => self.clone(),
        }
    }

    /// Drop collection kind and index, keeping the name.
    pub fn de_collectionify(&self) -> Segment {
        let mut seg = Segment::field(self.name.clone());
        seg.root = self.root;
        seg
    }

    pub(crate) fn as_root(mut self) -> Segment {
        self.root = true;
        self
    }

    pub(crate) fn as_child(mut self) -> Segment {
        self.root = false;
        self
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.expression)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_index_renders_expression() {
        let seg = Segment::collection("orders".into(), CollectionKind::List, None, None, false);
        assert!(seg.is_wildcard());
        let indexed = seg.with_index(4);
        assert_eq!(indexed.expression(), "orders<4>");
        assert_eq!(indexed.index(), Some(4));
        assert!(indexed.is_indexed());
    }

    #[test]
    fn test_map_index_becomes_key() {
        let seg = Segment::collection("props".into(), CollectionKind::Map, None, None, false);
        let keyed = seg.with_index(2);
        assert_eq!(keyed.key(), Some("2"));
        assert_eq!(keyed.expression(), "props{2}");
    }

    #[test]
    fn test_de_collectionify() {
        let seg = Segment::collection("items".into(), CollectionKind::Array, Some(1), None, false);
        let plain = seg.de_collectionify();
        assert_eq!(plain.expression(), "items");
        assert_eq!(plain.kind(), CollectionKind::None);
    }
}
