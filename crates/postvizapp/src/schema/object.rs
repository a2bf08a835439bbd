use super::{ActiveFn, ChildSpec, DeleteHook, ExecuteFn, Hook, PropertySpec};
use crate::attributes::AttributeName;
use std::fmt;

/// Descriptor of an object: a composite of properties, sub-objects, commands
/// and named-object containers.
///
/// A spec with a `plural` is a named-object definition; it lives in a
/// container exposed under that plural, and `name` doubles as the prefix of
/// generated item names (`contour-0`, `contour-1`, ...).
#[derive(Clone, Copy)]
pub struct ObjectSpec {
    pub name: &'static str,
    pub plural: Option<&'static str>,
    pub help: &'static str,
    pub children: &'static [ChildSpec],
    /// Children declared here are inherited unless overridden by name.
    pub base: Option<&'static ObjectSpec>,
    pub is_active: Option<ActiveFn>,
    /// Keys applied first by `update`, in this order.
    pub sort_by: &'static [&'static str],
    /// Used for ordering when `sort_by` is empty.
    pub include: &'static [&'static str],
    pub on_create: Option<Hook>,
    pub on_delete: Option<DeleteHook>,
    pub presentation: &'static [(AttributeName, &'static str)],
}

impl ObjectSpec {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            plural: None,
            help: "",
            children: &[],
            base: None,
            is_active: None,
            sort_by: &[],
            include: &[],
            on_create: None,
            on_delete: None,
            presentation: &[],
        }
    }

    pub const fn named(name: &'static str, plural: &'static str) -> Self {
        let mut spec = Self::new(name);
        spec.plural = Some(plural);
        spec
    }

    pub const fn help(mut self, help: &'static str) -> Self {
        self.help = help;
        self
    }

    pub const fn children(mut self, children: &'static [ChildSpec]) -> Self {
        self.children = children;
        self
    }

    pub const fn base(mut self, base: &'static ObjectSpec) -> Self {
        self.base = Some(base);
        self
    }

    pub const fn active_when(mut self, f: ActiveFn) -> Self {
        self.is_active = Some(f);
        self
    }

    pub const fn sort_by(mut self, keys: &'static [&'static str]) -> Self {
        self.sort_by = keys;
        self
    }

    pub const fn include(mut self, keys: &'static [&'static str]) -> Self {
        self.include = keys;
        self
    }

    pub const fn on_create(mut self, f: Hook) -> Self {
        self.on_create = Some(f);
        self
    }

    pub const fn on_delete(mut self, f: DeleteHook) -> Self {
        self.on_delete = Some(f);
        self
    }

    pub const fn presentation(mut self, attrs: &'static [(AttributeName, &'static str)]) -> Self {
        self.presentation = attrs;
        self
    }

    pub fn is_named(&self) -> bool {
        self.plural.is_some()
    }

    /// Own children first, then inherited ones not overridden by name.
    pub fn all_children(&'static self) -> Vec<&'static ChildSpec> {
        let mut out: Vec<&'static ChildSpec> = self.children.iter().collect();
        let mut base = self.base;
        while let Some(spec) = base {
            for child in spec.children {
                if !out.iter().any(|c| c.name() == child.name()) {
                    out.push(child);
                }
            }
            base = spec.base;
        }
        out
    }

    pub fn child(&'static self, name: &str) -> Option<&'static ChildSpec> {
        self.all_children().into_iter().find(|c| c.name() == name)
    }

    /// Whether `other` is this spec or one of its bases.
    pub fn inherits(&'static self, other: &'static ObjectSpec) -> bool {
        let mut current = Some(self);
        while let Some(spec) = current {
            if std::ptr::eq(spec, other) {
                return true;
            }
            current = spec.base;
        }
        false
    }

    /// Key order `update` applies first.
    pub fn update_order(&self) -> &'static [&'static str] {
        if self.sort_by.is_empty() {
            self.include
        } else {
            self.sort_by
        }
    }

    pub fn attributes(&self) -> Vec<AttributeName> {
        let mut attrs = Vec::new();
        if !self.help.is_empty() {
            attrs.push(AttributeName::HelpStr);
        }
        if self.is_active.is_some() {
            attrs.push(AttributeName::IsActive);
        }
        if self.on_create.is_some() {
            attrs.push(AttributeName::OnCreate);
        }
        if !self.include.is_empty() {
            attrs.push(AttributeName::Include);
        }
        if !self.sort_by.is_empty() {
            attrs.push(AttributeName::SortBy);
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

impl fmt::Debug for ObjectSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectSpec")
            .field("name", &self.name)
            .field("plural", &self.plural)
            .field("children", &self.children)
            .finish()
    }
}

/// Descriptor of a command: validated arguments plus an execution function.
#[derive(Clone, Copy)]
pub struct CommandSpec {
    pub name: &'static str,
    pub help: &'static str,
    /// Arguments, in the order they are passed to `execute`.
    pub args: &'static [PropertySpec],
    pub execute: ExecuteFn,
}

impl CommandSpec {
    pub const fn new(name: &'static str, execute: ExecuteFn) -> Self {
        Self {
            name,
            help: "",
            args: &[],
            execute,
        }
    }

    pub const fn help(mut self, help: &'static str) -> Self {
        self.help = help;
        self
    }

    pub const fn args(mut self, args: &'static [PropertySpec]) -> Self {
        self.args = args;
        self
    }

    pub fn arg(&self, name: &str) -> Option<&'static PropertySpec> {
        self.args.iter().find(|a| a.name == name)
    }
}

impl fmt::Debug for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandSpec")
            .field("name", &self.name)
            .field("args", &self.args.iter().map(|a| a.name).collect::<Vec<_>>())
            .finish()
    }
}
