//! Argument constraints.
//!
//! A `Constraint` is a resolved `allowed_values` or `range` attribute of a
//! command argument. Commands check every argument before anything is written.

use super::AttrValue;
use crate::error::{PostvizError, Result};

/// A resolved restriction on an argument's value.
#[derive(Debug, Clone, PartialEq)]
pub enum Constraint {
    /// Value (or every list element) must be a member.
    AllowedValues(Vec<String>),
    /// Value must be numeric and within `[min, max]`.
    Range { min: f64, max: f64 },
}

impl Constraint {
    pub fn allowed(values: Vec<String>) -> Self {
        Constraint::AllowedValues(values)
    }

    pub fn range(min: f64, max: f64) -> Self {
        Constraint::Range { min, max }
    }

    /// Check `value` for the argument named `field`.
    ///
    /// Unset values are not checked.
    pub fn check(&self, field: &str, value: &AttrValue) -> Result<()> {
        if value.is_null() {
            return Ok(());
        }

        match self {
            Constraint::AllowedValues(allowed) => {
                let ok = match value {
                    AttrValue::List(items) => items.iter().all(|item| allowed.contains(item)),
                    other => other.members().iter().all(|m| allowed.contains(m)),
                };
                if ok {
                    Ok(())
                } else {
                    Err(PostvizError::DisallowedValues {
                        field: field.to_string(),
                        value: value.to_string(),
                        allowed: allowed.clone(),
                    })
                }
            }
            Constraint::Range { min, max } => {
                let Some(number) = value.as_f64() else {
                    return Err(PostvizError::NotNumeric {
                        field: field.to_string(),
                        value: value.to_string(),
                    });
                };
                if number < *min || number > *max {
                    return Err(PostvizError::OutOfRange {
                        field: field.to_string(),
                        value: number,
                        min: *min,
                        max: *max,
                    });
                }
                Ok(())
            }
        }
    }
}
