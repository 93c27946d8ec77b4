//! Join several values into one delimited string.

use serde::{Deserialize, Serialize};

use super::StringDelimiter;
use crate::convert::ConversionMatrix;
use crate::model::{FieldGroup, FieldType, Value};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct CombineOptions {
    pub delimiter: StringDelimiter,
    /// Maximum number of characters kept from the joined string.
    pub limit: Option<usize>,
    /// Trim each item before joining.
    pub trim: bool,
}

impl Default for CombineOptions {
    fn default() -> Self {
        Self { delimiter: StringDelimiter::Space, limit: None, trim: true }
    }
}

impl CombineOptions {
    pub fn with_delimiter(mut self, delimiter: StringDelimiter) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn untrimmed(mut self) -> Self {
        self.trim = false;
        self
    }
}

/// Join `values` with the configured delimiter. `None` for empty input.
pub fn combine<I, S>(values: I, options: &CombineOptions) -> Option<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut joined: Option<String> = None;
    for value in values {
        let item = if options.trim { value.as_ref().trim() } else { value.as_ref() };
        match joined.as_mut() {
            Some(out) => {
                out.push_str(options.delimiter.value());
                out.push_str(item);
            }
            None => joined = Some(item.to_string()),
        }
    }

    let joined = joined?;
    Some(match options.limit {
        Some(limit) => joined.chars().take(limit).collect(),
        None => joined,
    })
}

/// Combine the members of a group. Null members are skipped; the rest are
/// converted to strings first.
pub fn combine_fields(group: &FieldGroup, options: &CombineOptions) -> Option<String> {
    let matrix = ConversionMatrix::global();
    let texts: Vec<String> = group
        .iter()
        .filter(|f| !f.is_null())
        .filter_map(|f| match matrix.convert(&f.value, None, FieldType::String) {
            Ok(Value::String(s)) => Some(s),
            Ok(_) => None,
            Err(e) => {
                tracing::debug!(path = %f.path, error = %e, "skipping member that has no string form");
                None
            }
        })
        .collect();
    combine(texts, options)
}
