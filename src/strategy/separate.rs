//! Split one string into several values.

use serde::{Deserialize, Serialize};

use super::delimiter::whitespace;
use super::StringDelimiter;
use crate::model::{Field, FieldGroup, TypeTag, Value};
use crate::Result;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct SeparateOptions {
    pub delimiter: StringDelimiter,
    /// Maximum number of parts; the last part keeps the remainder.
    /// `None` or `0` means unlimited.
    pub limit: Option<usize>,
}

impl Default for SeparateOptions {
    fn default() -> Self {
        Self { delimiter: StringDelimiter::MultiSpace, limit: None }
    }
}

impl SeparateOptions {
    pub fn with_delimiter(mut self, delimiter: StringDelimiter) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Split `value` on the configured delimiter. Empty for null or empty input;
/// trailing empty parts are dropped.
pub fn separate(value: Option<&str>, options: &SeparateOptions) -> Vec<String> {
    let Some(value) = value.filter(|v| !v.is_empty()) else {
        return Vec::new();
    };
    let limit = options.limit.filter(|l| *l > 0);

    let mut parts: Vec<String> = if options.delimiter.is_pattern() {
        let input = value.trim_start();
        match limit {
            Some(n) => whitespace().splitn(input, n).map(str::to_string).collect(),
            None => whitespace().split(input).map(str::to_string).collect(),
        }
    } else {
        let delimiter = options.delimiter.value();
        match limit {
            Some(n) => value.splitn(n, delimiter).map(str::to_string).collect(),
            None => value.split(delimiter).map(str::to_string).collect(),
        }
    };

    while parts.last().is_some_and(String::is_empty) {
        parts.pop();
    }
    parts
}

/// Separate a field's value into a group of string fields. Members of a
/// wildcard path get the element index filled in.
pub fn separate_field(field: &Field, options: &SeparateOptions) -> Result<FieldGroup> {
    let text = match &field.value {
        Value::Null => None,
        other => Some(other.to_string()),
    };
    let mut group = FieldGroup::new(field.path.clone()).with_type(Some(TypeTag::String));
    for (i, part) in separate(text.as_deref(), options).into_iter().enumerate() {
        let mut path = field.path.clone();
        if path.has_wildcard() {
            path.set_vacant_collection_index(i as i64)?;
        }
        let member = field.template(path).with_type(TypeTag::String).with_value(part).with_index(i);
        group.push(member);
    }
    Ok(group)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_separate_multi_space_default() {
        let parts = separate(Some("  John   Q  Public "), &SeparateOptions::default());
        assert_eq!(parts, vec!["John", "Q", "Public"]);
    }

    #[test]
    fn test_separate_multi_space_mixed_whitespace() {
        let parts = separate(Some("\tJohn\n Q\r\nPublic"), &SeparateOptions::default());
        assert_eq!(parts, vec!["John", "Q", "Public"]);
    }

    #[test]
    fn test_separate_empty() {
        assert!(separate(None, &SeparateOptions::default()).is_empty());
        assert!(separate(Some(""), &SeparateOptions::default()).is_empty());
    }

    #[test]
    fn test_separate_limit_keeps_remainder() {
        let opts = SeparateOptions::default().with_delimiter(StringDelimiter::Comma).with_limit(2);
        assert_eq!(separate(Some("a,b,c"), &opts), vec!["a", "b,c"]);
        let opts = SeparateOptions::default().with_limit(2);
        assert_eq!(separate(Some("a b  c"), &opts), vec!["a", "b  c"]);
    }

    #[test]
    fn test_separate_drops_trailing_empties() {
        let opts = SeparateOptions::default().with_delimiter(StringDelimiter::Comma);
        assert_eq!(separate(Some("a,,b,,"), &opts), vec!["a", "", "b"]);
    }

    #[test]
    fn test_separate_field_indexes_wildcard() {
        let field = Field::parse("/names<>").unwrap().with_value("x y");
        let group = separate_field(&field, &SeparateOptions::default()).unwrap();
        let paths: Vec<String> = group.iter().map(|f| f.path.to_string()).collect();
        assert_eq!(paths, vec!["/names<0>", "/names<1>"]);
        assert_eq!(group.values(), vec![Value::from("x"), Value::from("y")]);
    }
}
