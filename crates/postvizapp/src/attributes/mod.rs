//! # Attribute System
//!
//! Attributes are the computed, read-only facets of a property or object
//! definition: `allowed_values`, `range`, `is_active`, `help_str` and the
//! presentational hints. This module provides:
//!
//! - **Names**: the closed set of attribute names ([`AttributeName`])
//! - **Values**: what a property can hold ([`AttrValue`], [`ValueKind`])
//! - **Constraints**: argument validation against resolved attributes ([`Constraint`])
//!
//! | Kind | Examples | Description |
//! |------|----------|-------------|
//! | `Bool` | `filled`, `show_edges` | Simple true/false |
//! | `Float` | `iso_value`, `scale` | Numeric, may declare a range |
//! | `Str` | `field`, `creation_method` | Usually constrained by allowed values |
//! | `StrList` | `surfaces` | Every element constrained by allowed values |
//! | `Vector` | `direction_vector` | Three components |
//!
//! ```ignore
//! let attr: AttributeName = "allowed_values".parse()?;
//! Constraint::allowed(vec!["x".into()]).check("arg", &AttrValue::from("x"))?;
//! ```

mod constraint;
mod spec;
mod value;

pub use constraint::Constraint;
pub use spec::{valid_names, AttributeName, ATTRIBUTE_NAMES};
pub use value::{AttrValue, ValueKind};
