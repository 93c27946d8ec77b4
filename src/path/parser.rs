//! Path expression parser.
//!
//! Grammar (informal):
//!
//! ```text
//! path     := "/" [ root ] ( "/" segment )*
//! root     := collection-brackets           // document root is a collection
//! segment  := name [ collection-brackets ]
//! brackets := "[" [digits] "]" | "<" [digits] ">" | "{" [key] "}"
//! ```
//!
//! Segments whose brackets don't close, or whose array/list index is not a
//! number, are kept verbatim as plain names. Busted paths are not repaired.

use smallvec::SmallVec;

use super::segment::{CollectionKind, Segment};
use crate::{Error, Result};

pub(crate) type Segments = SmallVec<[Segment; 6]>;

pub(crate) const SEPARATOR: char = '/';

/// Parse one segment expression.
pub(crate) fn parse_segment(expr: &str, root: bool) -> Segment {
    let verbatim = || {
        let seg = Segment::field(expr);
        if root { seg.as_root() } else { seg }
    };

    let Some(close) = expr.chars().last() else {
        return verbatim();
    };
    let Some(kind) = CollectionKind::from_close(close) else {
        return verbatim();
    };
    let Some((open, _)) = kind.brackets() else {
        return verbatim();
    };
    let Some(open_at) = expr.rfind(open) else {
        return verbatim();
    };

    let name = &expr[..open_at];
    let inner = &expr[open_at + open.len_utf8()..expr.len() - close.len_utf8()];

    match kind {
        CollectionKind::Map => {
            let key = (!inner.is_empty()).then(|| inner.to_string());
            Segment::collection(name.to_string(), kind, None, key, root)
        }
        _ if inner.is_empty() => Segment::collection(name.to_string(), kind, None, None, root),
        _ => match canonical_index(inner) {
            Some(index) => Segment::collection(name.to_string(), kind, Some(index), None, root),
            None => verbatim(),
        },
    }
}

/// Plain decimal digits with no sign and no leading zero, so the index
/// prints back exactly as written.
fn canonical_index(inner: &str) -> Option<usize> {
    let digits = !inner.is_empty() && inner.bytes().all(|b| b.is_ascii_digit());
    if !digits || (inner.len() > 1 && inner.starts_with('0')) {
        return None;
    }
    inner.parse().ok()
}

/// Parse a full path expression into segments. Segment 0 is always the root.
pub(crate) fn parse(expression: &str) -> Result<Segments> {
    if expression.is_empty() {
        return Err(Error::Structural {
            path: expression.to_string(),
            message: "empty path expression".into(),
        });
    }

    let body = expression.strip_prefix(SEPARATOR).unwrap_or(expression);
    let mut segments = Segments::new();
    let mut parts = body.split(SEPARATOR).peekable();

    // A leading `[..]`, `<..>` or `{..}` with no name makes the root a collection.
    let root = match parts.peek() {
        Some(first) if !first.is_empty() => {
            let candidate = parse_segment(first, true);
            if candidate.name().is_empty() && candidate.is_collection() {
                parts.next();
                candidate
            } else {
                Segment::root()
            }
        }
        _ => Segment::root(),
    };
    segments.push(root);

    for part in parts.filter(|p| !p.is_empty()) {
        segments.push(parse_segment(part, false));
    }

    tracing::trace!(expression, segments = segments.len(), "parsed path");
    Ok(segments)
}
