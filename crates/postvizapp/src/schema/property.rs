use super::{ActiveFn, DefaultFn, GuardFn, Hook, Literal, PropRef, RangeFn, ValuesFn};
use crate::attributes::{AttributeName, ValueKind};
use std::fmt;

/// Descriptor of a property: a typed leaf value with optional constraints.
#[derive(Clone, Copy)]
pub struct PropertySpec {
    pub name: &'static str,
    pub help: &'static str,
    pub kind: ValueKind,

    /// Value stored when the node is built.
    pub default: Literal,

    /// Lazy default, computed on read while the stored value is unset and
    /// cached until something resets it.
    pub compute_default: Option<DefaultFn>,

    pub allowed_values: Option<ValuesFn>,

    pub range: Option<RangeFn>,

    pub is_active: Option<ActiveFn>,

    pub is_read_only: bool,

    /// Value reads report while the property is inactive.
    pub inactive_value: Option<Literal>,

    pub guard: Option<GuardFn>,

    /// Properties whose changes clear this property's value.
    pub reset_on: &'static [PropRef],

    pub on_change: Option<Hook>,

    /// Presentational attributes (`widget`, `display_text`, ...) as plain strings.
    pub presentation: &'static [(AttributeName, &'static str)],
}

impl PropertySpec {
    pub const fn new(name: &'static str, kind: ValueKind) -> Self {
        Self {
            name,
            help: "",
            kind,
            default: Literal::Null,
            compute_default: None,
            allowed_values: None,
            range: None,
            is_active: None,
            is_read_only: false,
            inactive_value: None,
            guard: None,
            reset_on: &[],
            on_change: None,
            presentation: &[],
        }
    }

    pub const fn help(mut self, help: &'static str) -> Self {
        self.help = help;
        self
    }

    pub const fn default(mut self, value: Literal) -> Self {
        self.default = value;
        self
    }

    pub const fn computed(mut self, f: DefaultFn) -> Self {
        self.compute_default = Some(f);
        self
    }

    pub const fn allowed(mut self, f: ValuesFn) -> Self {
        self.allowed_values = Some(f);
        self
    }

    pub const fn range(mut self, f: RangeFn) -> Self {
        self.range = Some(f);
        self
    }

    pub const fn active_when(mut self, f: ActiveFn) -> Self {
        self.is_active = Some(f);
        self
    }

    pub const fn read_only(mut self) -> Self {
        self.is_read_only = true;
        self
    }

    pub const fn when_inactive(mut self, value: Literal) -> Self {
        self.inactive_value = Some(value);
        self
    }

    pub const fn guard(mut self, f: GuardFn) -> Self {
        self.guard = Some(f);
        self
    }

    pub const fn reset_on(mut self, refs: &'static [PropRef]) -> Self {
        self.reset_on = refs;
        self
    }

    pub const fn on_change(mut self, f: Hook) -> Self {
        self.on_change = Some(f);
        self
    }

    pub const fn presentation(mut self, attrs: &'static [(AttributeName, &'static str)]) -> Self {
        self.presentation = attrs;
        self
    }

    /// Attributes this property declares, in canonical order.
    pub fn attributes(&self) -> Vec<AttributeName> {
        let mut attrs = Vec::new();
        if self.range.is_some() {
            attrs.push(AttributeName::Range);
        }
        if self.allowed_values.is_some() {
            attrs.push(AttributeName::AllowedValues);
        }
        if !self.help.is_empty() {
            attrs.push(AttributeName::HelpStr);
        }
        if self.is_read_only {
            attrs.push(AttributeName::IsReadOnly);
        }
        if self.is_active.is_some() {
            attrs.push(AttributeName::IsActive);
        }
        if self.on_change.is_some() {
            attrs.push(AttributeName::OnChange);
        }
        attrs.extend(self.presentation.iter().map(|(name, _)| *name));
        attrs
    }

    pub fn presentation_value(&self, attr: AttributeName) -> Option<&'static str> {
        self.presentation
            .iter()
            .find(|(name, _)| *name == attr)
            .map(|(_, value)| *value)
    }
}

impl fmt::Debug for PropertySpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertySpec")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("default", &self.default)
            .field("attributes", &self.attributes())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use crate::tree::NodeCtx;

    fn two_values(_: &mut NodeCtx<'_>) -> Result<Vec<String>> {
        Ok(vec!["a".into(), "b".into()])
    }

    static CHOICE: PropertySpec = PropertySpec::new("choice", ValueKind::Str)
        .help("Pick one.")
        .default(Literal::Str("a"))
        .allowed(two_values)
        .presentation(&[(AttributeName::Widget, "dropdown")]);

    #[test]
    fn builder_sets_fields() {
        assert_eq!(CHOICE.name, "choice");
        assert_eq!(CHOICE.default, Literal::Str("a"));
        assert!(CHOICE.allowed_values.is_some());
        assert!(CHOICE.range.is_none());
        assert!(!CHOICE.is_read_only);
    }

    #[test]
    fn declared_attributes_follow_fields() {
        assert_eq!(
            CHOICE.attributes(),
            vec![
                AttributeName::AllowedValues,
                AttributeName::HelpStr,
                AttributeName::Widget
            ]
        );
        assert_eq!(CHOICE.presentation_value(AttributeName::Widget), Some("dropdown"));
        assert_eq!(CHOICE.presentation_value(AttributeName::Icon), None);
    }

    #[test]
    fn bare_property_declares_nothing() {
        let spec = PropertySpec::new("x", ValueKind::Float);
        assert!(spec.attributes().is_empty());
    }
}
