//! # Composite Value Strategies
//!
//! | Strategy | Shape |
//! |----------|-------|
//! | [`combine`] | many values → one delimited string |
//! | [`separate`] | one string → many values |
//!
//! Both are configured through serde-friendly option structs so mapping
//! definitions can carry them verbatim.

mod combine;
mod delimiter;
mod separate;

pub use combine::{combine, combine_fields, CombineOptions};
pub use delimiter::StringDelimiter;
pub use separate::{separate, separate_field, SeparateOptions};
