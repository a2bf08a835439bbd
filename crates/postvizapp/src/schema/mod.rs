//! # Schema
//!
//! Definitions are described once, as `static` descriptors, and instance trees
//! are built by walking them (see [`crate::tree`]). A descriptor carries every
//! attribute it supports as an explicit optional field; an absent attribute is
//! `None`, never a missing member.
//!
//! | Descriptor | Instance |
//! |------------|----------|
//! | [`PropertySpec`] | property node: typed value, change callbacks |
//! | [`ObjectSpec`] | object node, or a named object inside a container |
//! | [`CommandSpec`] | command node with argument properties |
//!
//! Computed attributes (`allowed_values`, `range`, `is_active`, lazy defaults)
//! are plain functions of a [`NodeCtx`], which gives them the session and
//! relative lookups into the tree.
//!
//! ```ignore
//! static FILLED: PropertySpec = PropertySpec::new("filled", ValueKind::Bool)
//!     .help("Draw filled contour.")
//!     .default(Literal::Bool(true));
//! ```

mod object;
mod property;

pub use object::{CommandSpec, ObjectSpec};
pub use property::PropertySpec;

use crate::attributes::AttrValue;
use crate::error::Result;
use crate::tree::{CommandArgs, NodeCtx};

/// Hook run with the context of the node it belongs to.
pub type Hook = fn(&mut NodeCtx<'_>) -> Result<()>;

/// Hook run on a container after one of its items was removed.
pub type DeleteHook = fn(&mut NodeCtx<'_>, &str) -> Result<()>;

pub type ValuesFn = fn(&mut NodeCtx<'_>) -> Result<Vec<String>>;

/// Returns `None` when the range cannot be known yet (e.g. no field chosen).
pub type RangeFn = fn(&mut NodeCtx<'_>) -> Result<Option<(f64, f64)>>;

pub type ActiveFn = fn(&mut NodeCtx<'_>) -> Result<bool>;

/// Computes a lazy default. Returning `Null` leaves the property unset.
pub type DefaultFn = fn(&mut NodeCtx<'_>) -> Result<AttrValue>;

/// Checks a write against cross-field invariants before it is stored.
pub type GuardFn = fn(&mut NodeCtx<'_>, &AttrValue) -> Result<()>;

/// Runs a command with its resolved arguments. The context is the command node.
pub type ExecuteFn = fn(&mut NodeCtx<'_>, &CommandArgs) -> Result<AttrValue>;

/// A constant value usable in `static` descriptors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Literal {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(&'static str),
    List(&'static [&'static str]),
    Vector([f64; 3]),
}

impl Literal {
    pub fn to_value(&self) -> AttrValue {
        match *self {
            Literal::Null => AttrValue::Null,
            Literal::Bool(v) => AttrValue::Bool(v),
            Literal::Int(v) => AttrValue::Int(v),
            Literal::Float(v) => AttrValue::Float(v),
            Literal::Str(s) => AttrValue::Str(s.to_string()),
            Literal::List(items) => AttrValue::List(items.iter().map(|s| s.to_string()).collect()),
            Literal::Vector(v) => AttrValue::Vector(v),
        }
    }
}

/// A reference from one node to a property elsewhere in the same tree.
///
/// Paths are `/`-separated child names.
#[derive(Debug, Clone, Copy)]
pub enum PropRef {
    /// Relative to the referring node's parent.
    Sibling(&'static str),
    /// Relative to the nearest named object above the referring node.
    Owner(&'static str),
    /// Relative to the nearest ancestor built from the given spec.
    Ancestor(&'static ObjectSpec, &'static str),
}

/// One declared child of an object definition.
#[derive(Clone, Copy)]
pub enum ChildSpec {
    Property(&'static PropertySpec),
    Object(&'static ObjectSpec),
    Command(&'static CommandSpec),
    /// A container of named objects, exposed under the object's plural name.
    Named(&'static ObjectSpec),
}

impl ChildSpec {
    pub fn name(&self) -> &'static str {
        match self {
            ChildSpec::Property(p) => p.name,
            ChildSpec::Object(o) => o.name,
            ChildSpec::Command(c) => c.name,
            ChildSpec::Named(o) => o.plural.unwrap_or(o.name),
        }
    }
}

impl std::fmt::Debug for ChildSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match self {
            ChildSpec::Property(_) => "Property",
            ChildSpec::Object(_) => "Object",
            ChildSpec::Command(_) => "Command",
            ChildSpec::Named(_) => "Named",
        };
        write!(f, "{}({})", kind, self.name())
    }
}
