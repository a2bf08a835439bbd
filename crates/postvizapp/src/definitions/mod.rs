//! # Definitions
//!
//! The concrete post-processing objects. Each definition set is a root
//! [`ObjectSpec`] whose children are named-object containers:
//!
//! | Set | Containers |
//! |-----|------------|
//! | [`GRAPHICS`] | `Meshes`, `Surfaces`, `Contours`, `Vectors`, `Pathlines` |
//! | [`PLOTS`] | `XYPlots`, `Monitors` |
//!
//! Graphics definitions derive from [`GRAPHICS_BASE`] and plots from
//! [`PLOT_BASE`]; the renderer dispatches on that.
//!
//! Allowed values and ranges that depend on the solver (field names, surface
//! names, coordinate ranges) are computed from the session on every read.

pub mod graphics;
pub mod plots;

pub use graphics::{CONTOUR, GRAPHICS, GRAPHICS_BASE, MESH, PATHLINES, SURFACE, VECTOR};
pub use plots::{MONITOR, PLOTS, PLOT_BASE, XY_PLOT};

use crate::error::{PostvizError, Result};
use crate::schema::{ChildSpec, ObjectSpec, PropRef};
use crate::tree::NodeCtx;
use once_cell::sync::Lazy;
use std::collections::BTreeMap;

static SETS: Lazy<BTreeMap<&'static str, &'static ObjectSpec>> = Lazy::new(|| {
    [&GRAPHICS, &PLOTS]
        .into_iter()
        .map(|spec| (spec.name, spec))
        .collect()
});

/// Names of the definition sets, e.g. `Graphics`.
pub fn set_names() -> Vec<&'static str> {
    SETS.keys().copied().collect()
}

/// Root spec of a definition set.
pub fn definition_set(name: &str) -> Result<&'static ObjectSpec> {
    SETS.get(name).copied().ok_or_else(|| PostvizError::DisallowedValues {
        field: "definition set".to_string(),
        value: name.to_string(),
        allowed: set_names().into_iter().map(String::from).collect(),
    })
}

/// Named-object definitions of a set, keyed by their plural.
pub fn named_definitions(set: &'static ObjectSpec) -> Vec<(&'static str, &'static ObjectSpec)> {
    set.all_children()
        .into_iter()
        .filter_map(|child| match child {
            ChildSpec::Named(spec) => Some((child.name(), *spec)),
            _ => None,
        })
        .collect()
}

// Shared attribute functions.

pub(crate) fn scalar_fields(ctx: &mut NodeCtx<'_>) -> Result<Vec<String>> {
    ctx.session().scalar_fields()
}

pub(crate) fn vector_fields(ctx: &mut NodeCtx<'_>) -> Result<Vec<String>> {
    ctx.session().vector_fields()
}

/// Solver surfaces plus the local surfaces visible to the tree.
pub(crate) fn surfaces(ctx: &mut NodeCtx<'_>) -> Result<Vec<String>> {
    ctx.all_surfaces()
}

pub(crate) fn range_options(_: &mut NodeCtx<'_>) -> Result<Vec<String>> {
    Ok(vec!["auto-range-on".to_string(), "auto-range-off".to_string()])
}

pub(crate) fn option_is(ctx: &mut NodeCtx<'_>, reference: PropRef, expected: &str) -> Result<bool> {
    Ok(ctx.read_str(reference)?.as_deref() == Some(expected))
}

fn node_range(ctx: &mut NodeCtx<'_>, field: &str) -> Result<Option<(f64, f64)>> {
    ctx.session().scalar_field_range(field, true).map(Some)
}

pub(crate) fn x_coordinate_range(ctx: &mut NodeCtx<'_>) -> Result<Option<(f64, f64)>> {
    node_range(ctx, "x-coordinate")
}

pub(crate) fn y_coordinate_range(ctx: &mut NodeCtx<'_>) -> Result<Option<(f64, f64)>> {
    node_range(ctx, "y-coordinate")
}

pub(crate) fn z_coordinate_range(ctx: &mut NodeCtx<'_>) -> Result<Option<(f64, f64)>> {
    node_range(ctx, "z-coordinate")
}

pub(crate) fn unit_range(_: &mut NodeCtx<'_>) -> Result<Option<(f64, f64)>> {
    Ok(Some((-1.0, 1.0)))
}
