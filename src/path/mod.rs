//! Path model: parsing and algebra over `/`-delimited field paths.
//!
//! ```text
//! /orders<4>/address/addressLine1
//! │ │        │       └─ plain segment (terminal)
//! │ │        └─ plain segment
//! │ └─ list segment, index 4
//! └─ root segment ("")
//! ```
//!
//! | Brackets | Kind  | Indexed   | Wildcard |
//! |----------|-------|-----------|----------|
//! | `[ ]`    | Array | `items[2]`| `items[]`|
//! | `< >`    | List  | `items<2>`| `items<>`|
//! | `{ }`    | Map   | `props{k}`| `props{}`|
//!
//! Paths are values. Operations that "modify" a path return a new one; the
//! `set_*` variants are thin `&mut self` wrappers over the builders.

mod parser;
mod segment;

pub use segment::{CollectionKind, Segment};

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use parser::{Segments, SEPARATOR};
use crate::{Error, Result};

/// A parsed field path. Segment 0 is always the root segment.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Path {
    segments: Segments,
}

impl Path {
    /// Parse a path expression.
    pub fn parse(expression: &str) -> Result<Path> {
        Ok(Path { segments: parser::parse(expression)? })
    }

    /// The path consisting of the plain root only (`/`).
    pub fn root() -> Path {
        let mut segments = Segments::new();
        segments.push(Segment::root());
        Path { segments }
    }

    fn from_segments(segments: Segments) -> Path {
        debug_assert!(segments.first().is_some_and(Segment::is_root));
        Path { segments }
    }

    fn structural(&self, message: impl Into<String>) -> Error {
        Error::Structural { path: self.to_string(), message: message.into() }
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Number of segments, root included.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// A path always holds its root segment.
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn root_segment(&self) -> &Segment {
        &self.segments[0]
    }

    pub fn last_segment(&self) -> &Segment {
        &self.segments[self.segments.len() - 1]
    }

    /// `true` when the path addresses the document root itself.
    pub fn is_root(&self) -> bool {
        self.segments.len() == 1
    }

    pub fn has_collection_root(&self) -> bool {
        self.root_segment().is_collection()
    }

    pub fn has_collection(&self) -> bool {
        self.segments.iter().any(Segment::is_collection)
    }

    /// At least one collection segment carries a concrete index or key.
    pub fn is_indexed_collection(&self) -> bool {
        self.segments.iter().any(Segment::is_indexed)
    }

    /// At least one collection segment matches every element.
    pub fn has_wildcard(&self) -> bool {
        self.segments.iter().any(Segment::is_wildcard)
    }

    pub fn collection_segment_count(&self) -> usize {
        self.segments.iter().filter(|s| s.is_collection()).count()
    }

    pub fn last_collection_segment(&self) -> Option<&Segment> {
        self.segments.iter().rev().find(|s| s.is_collection())
    }

    fn position_of(&self, segment_expr: &str) -> Option<usize> {
        self.segments
            .iter()
            .position(|s| s.expression() == segment_expr)
            .or_else(|| self.segments.iter().position(|s| s.name() == segment_expr))
    }

    // ========================================================================
    // Collection indexes
    // ========================================================================

    /// Copy of this path with the collection segment matching `segment_expr`
    /// (by expression first, then by name) pointing at `index`.
    pub fn with_collection_index(&self, segment_expr: &str, index: i64) -> Result<Path> {
        let position = self
            .position_of(segment_expr)
            .ok_or_else(|| self.structural(format!("no segment matches '{segment_expr}'")))?;
        self.with_collection_index_at(position, index)
    }

    /// Positional form of [`Path::with_collection_index`].
    pub fn with_collection_index_at(&self, position: usize, index: i64) -> Result<Path> {
        let segment = self
            .segments
            .get(position)
            .ok_or_else(|| self.structural(format!("no segment at position {position}")))?;
        if !segment.is_collection() {
            return Err(self.structural(format!(
                "segment '{}' is not a collection segment",
                segment.expression()
            )));
        }
        let index = usize::try_from(index)
            .map_err(|_| self.structural(format!("negative collection index {index}")))?;

        let mut segments = self.segments.clone();
        segments[position] = segment.with_index(index);
        Ok(Path::from_segments(segments))
    }

    /// Copy of this path with the map segment at `position` addressing `key`.
    pub fn with_collection_key_at(&self, position: usize, key: &str) -> Result<Path> {
        match self.segments.get(position) {
            Some(segment) if segment.kind() == CollectionKind::Map => {
                let mut segments = self.segments.clone();
                segments[position] = segment.with_key(key);
                Ok(Path::from_segments(segments))
            }
            _ => Err(self.structural(format!("no map segment at position {position}"))),
        }
    }

    pub fn set_collection_index(&mut self, segment_expr: &str, index: i64) -> Result<()> {
        *self = self.with_collection_index(segment_expr, index)?;
        Ok(())
    }

    /// Give the first wildcard collection segment the concrete `index`.
    pub fn set_vacant_collection_index(&mut self, index: i64) -> Result<()> {
        let position = self
            .segments
            .iter()
            .position(Segment::is_wildcard)
            .ok_or_else(|| self.structural("no vacant collection segment"))?;
        *self = self.with_collection_index_at(position, index)?;
        Ok(())
    }

    // ========================================================================
    // Algebra
    // ========================================================================

    /// Path to the owner of the last segment. The root path is its own parent.
    pub fn last_segment_parent_path(&self) -> Path {
        let keep = self.segments.len().saturating_sub(1).max(1);
        Path::from_segments(self.segments[..keep].iter().cloned().collect())
    }

    /// Drop the first segment after the root.
    pub fn de_parentify(&self) -> Path {
        let mut segments = self.segments.clone();
        if segments.len() > 1 {
            segments.remove(1);
        }
        Path::from_segments(segments)
    }

    /// Turn the segment matching `segment_expr` into a plain segment.
    pub fn de_collectionify(&self, segment_expr: &str) -> Result<Path> {
        let position = self
            .position_of(segment_expr)
            .ok_or_else(|| self.structural(format!("no segment matches '{segment_expr}'")))?;
        let mut segments = self.segments.clone();
        segments[position] = segments[position].de_collectionify();
        Ok(Path::from_segments(segments))
    }

    /// Turn every non-root collection segment into a plain segment.
    pub fn de_collectionify_all(&self) -> Path {
        let segments = self
            .segments
            .iter()
            .enumerate()
            .map(|(i, s)| if i == 0 { s.clone() } else { s.de_collectionify() })
            .collect();
        Path::from_segments(segments)
    }

    /// Path relative to the segment at `position`: a plain root followed by
    /// every segment after it. Used to address a field inside one element of
    /// an ancestor collection.
    pub fn relative_to(&self, position: usize) -> Path {
        let mut segments = Segments::new();
        segments.push(Segment::root());
        segments.extend(self.segments.iter().skip(position + 1).cloned().map(Segment::as_child));
        Path::from_segments(segments)
    }

    /// Append a plain child segment.
    pub fn append_field(&self, name: &str) -> Path {
        let mut segments = self.segments.clone();
        segments.push(Segment::field(name));
        Path::from_segments(segments)
    }

    /// Prefix of this path up to and including `position`.
    pub fn segment_path(&self, position: usize) -> Path {
        let end = (position + 1).min(self.segments.len());
        Path::from_segments(self.segments[..end].iter().cloned().collect())
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::with_capacity(32);
        out.push(SEPARATOR);
        out.push_str(self.root_segment().expression());
        for segment in &self.segments[1..] {
            if !out.ends_with(SEPARATOR) {
                out.push(SEPARATOR);
            }
            out.push_str(segment.expression());
        }
        f.write_str(&out)
    }
}

impl FromStr for Path {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Path::parse(s)
    }
}

impl Serialize for Path {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Path {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Path::parse(&s).map_err(serde::de::Error::custom)
    }
}
