//! Attribute names and registry.
//!
//! This module defines the closed set of attribute names a definition may declare.
//! Which of them a particular property or object carries is decided by its
//! descriptor in [`crate::schema`].

use crate::error::{PostvizError, Result};
use std::fmt;
use std::str::FromStr;

/// The name of a computed, read-only facet of a property or object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AttributeName {
    Range,
    AllowedValues,
    DisplayNameAllowedValues,
    HelpStr,
    IsReadOnly,
    IsActive,
    OnCreate,
    OnChange,
    ShowAsSeparateObject,
    DisplayText,
    Layout,
    Previous,
    Next,
    Include,
    Exclude,
    SortBy,
    Style,
    Icon,
    ShowText,
    Widget,
    DirInfo,
    Extensions,
}

/// Registry of every valid attribute name, in canonical order.
///
/// This is the single source of truth for attribute names.
pub const ATTRIBUTE_NAMES: &[AttributeName] = &[
    AttributeName::Range,
    AttributeName::AllowedValues,
    AttributeName::DisplayNameAllowedValues,
    AttributeName::HelpStr,
    AttributeName::IsReadOnly,
    AttributeName::IsActive,
    AttributeName::OnCreate,
    AttributeName::OnChange,
    AttributeName::ShowAsSeparateObject,
    AttributeName::DisplayText,
    AttributeName::Layout,
    AttributeName::Previous,
    AttributeName::Next,
    AttributeName::Include,
    AttributeName::Exclude,
    AttributeName::SortBy,
    AttributeName::Style,
    AttributeName::Icon,
    AttributeName::ShowText,
    AttributeName::Widget,
    AttributeName::DirInfo,
    AttributeName::Extensions,
];

impl AttributeName {
    pub const fn as_str(self) -> &'static str {
        match self {
            AttributeName::Range => "range",
            AttributeName::AllowedValues => "allowed_values",
            AttributeName::DisplayNameAllowedValues => "display_name_allowed_values",
            AttributeName::HelpStr => "help_str",
            AttributeName::IsReadOnly => "is_read_only",
            AttributeName::IsActive => "is_active",
            AttributeName::OnCreate => "on_create",
            AttributeName::OnChange => "on_change",
            AttributeName::ShowAsSeparateObject => "show_as_separate_object",
            AttributeName::DisplayText => "display_text",
            AttributeName::Layout => "layout",
            AttributeName::Previous => "previous",
            AttributeName::Next => "next",
            AttributeName::Include => "include",
            AttributeName::Exclude => "exclude",
            AttributeName::SortBy => "sort_by",
            AttributeName::Style => "style",
            AttributeName::Icon => "icon",
            AttributeName::ShowText => "show_text",
            AttributeName::Widget => "widget",
            AttributeName::DirInfo => "dir_info",
            AttributeName::Extensions => "extensions",
        }
    }

    /// Attributes that are hooks rather than values; they never show up in
    /// serialized state.
    pub const fn is_hook(self) -> bool {
        matches!(self, AttributeName::OnCreate | AttributeName::OnChange)
    }

    /// Look up an attribute by name, failing with the full valid set.
    pub fn parse(name: &str) -> Result<Self> {
        ATTRIBUTE_NAMES
            .iter()
            .copied()
            .find(|attr| attr.as_str() == name)
            .ok_or_else(|| PostvizError::DisallowedValues {
                field: "attribute".to_string(),
                value: name.to_string(),
                allowed: valid_names().map(str::to_string).collect(),
            })
    }
}

impl fmt::Display for AttributeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AttributeName {
    type Err = PostvizError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Get all valid attribute names.
pub fn valid_names() -> impl Iterator<Item = &'static str> {
    ATTRIBUTE_NAMES.iter().map(|attr| attr.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_has_twenty_two_names() {
        assert_eq!(ATTRIBUTE_NAMES.len(), 22);
        assert_eq!(valid_names().count(), 22);
    }

    #[test]
    fn every_name_round_trips_through_parse() {
        for attr in ATTRIBUTE_NAMES {
            assert_eq!(AttributeName::parse(attr.as_str()).unwrap(), *attr);
        }
    }

    #[test]
    fn unknown_name_is_rejected_with_valid_set() {
        let err = AttributeName::parse("colour").unwrap_err();
        match err {
            PostvizError::DisallowedValues {
                field,
                value,
                allowed,
            } => {
                assert_eq!(field, "attribute");
                assert_eq!(value, "colour");
                assert!(allowed.contains(&"allowed_values".to_string()));
                assert_eq!(allowed.len(), 22);
            }
            other => panic!("Expected DisallowedValues, got {other:?}"),
        }
    }

    #[test]
    fn from_str_matches_parse() {
        let attr: AttributeName = "is_active".parse().unwrap();
        assert_eq!(attr, AttributeName::IsActive);
        assert!("isActive".parse::<AttributeName>().is_err());
    }

    #[test]
    fn hooks_are_flagged() {
        assert!(AttributeName::OnChange.is_hook());
        assert!(AttributeName::OnCreate.is_hook());
        assert!(!AttributeName::AllowedValues.is_hook());
    }
}
