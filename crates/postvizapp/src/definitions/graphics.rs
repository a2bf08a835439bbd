use super::{
    option_is, range_options, scalar_fields, surfaces, unit_range, vector_fields, x_coordinate_range,
    y_coordinate_range, z_coordinate_range,
};
use crate::attributes::{AttrValue, ValueKind};
use crate::error::{PostvizError, Result};
use crate::schema::{ChildSpec, Literal, ObjectSpec, PropRef, PropertySpec};
use crate::tree::NodeCtx;

/// Common base of everything the graphics renderer draws.
pub static GRAPHICS_BASE: ObjectSpec = ObjectSpec::new("graphics").help("Abstract base of graphics objects.");

pub static GRAPHICS: ObjectSpec = ObjectSpec::new("Graphics")
    .help("Graphics objects of one session.")
    .children(GRAPHICS_CHILDREN);

static GRAPHICS_CHILDREN: &[ChildSpec] = &[
    ChildSpec::Named(&MESH),
    ChildSpec::Named(&SURFACE),
    ChildSpec::Named(&CONTOUR),
    ChildSpec::Named(&VECTOR),
    ChildSpec::Named(&PATHLINES),
];

// Shared leaves.

static SURFACES: PropertySpec = PropertySpec::new("surfaces", ValueKind::StrList)
    .help("List of surfaces to draw on.")
    .default(Literal::List(&[]))
    .allowed(surfaces);

static FIELD: PropertySpec = PropertySpec::new("field", ValueKind::Str)
    .help("Field to color by.")
    .allowed(scalar_fields);

static SHOW_EDGES_OFF: PropertySpec = PropertySpec::new("show_edges", ValueKind::Bool)
    .help("Show edges.")
    .default(Literal::Bool(false));

static RANGE_OPTION: PropertySpec = PropertySpec::new("option", ValueKind::Str)
    .help("Range option.")
    .default(Literal::Str("auto-range-on"))
    .allowed(range_options);

static AUTO_RANGE_ON: ObjectSpec = ObjectSpec::new("auto_range_on")
    .help("Auto range on definition.")
    .active_when(auto_range_on_active)
    .children(AUTO_RANGE_ON_CHILDREN);

static AUTO_RANGE_ON_CHILDREN: &[ChildSpec] = &[ChildSpec::Property(&GLOBAL_RANGE)];

static GLOBAL_RANGE: PropertySpec = PropertySpec::new("global_range", ValueKind::Bool)
    .help("Show global range.")
    .default(Literal::Bool(false));

static CLIP_TO_RANGE: PropertySpec = PropertySpec::new("clip_to_range", ValueKind::Bool)
    .help("Clip within range.")
    .default(Literal::Bool(false));

fn auto_range_on_active(ctx: &mut NodeCtx<'_>) -> Result<bool> {
    option_is(ctx, PropRef::Sibling("option"), "auto-range-on")
}

fn auto_range_off_active(ctx: &mut NodeCtx<'_>) -> Result<bool> {
    option_is(ctx, PropRef::Sibling("option"), "auto-range-off")
}

// Mesh

pub static MESH: ObjectSpec = ObjectSpec::named("mesh", "Meshes")
    .help("Mesh graphics definition.")
    .base(&GRAPHICS_BASE)
    .children(MESH_CHILDREN);

static MESH_CHILDREN: &[ChildSpec] = &[
    ChildSpec::Property(&SURFACES),
    ChildSpec::Property(&SHOW_EDGES_OFF),
    ChildSpec::Property(&SHOW_NODES),
    ChildSpec::Property(&SHOW_FACES),
];

static SHOW_NODES: PropertySpec = PropertySpec::new("show_nodes", ValueKind::Bool)
    .help("Show nodes for mesh.")
    .default(Literal::Bool(false));

static SHOW_FACES: PropertySpec = PropertySpec::new("show_faces", ValueKind::Bool)
    .help("Show faces for mesh.")
    .default(Literal::Bool(true));

// Surface

/// A surface computed on the solver from a plane or iso-value definition.
pub static SURFACE: ObjectSpec = ObjectSpec::named("surface", "Surfaces")
    .help("Surface graphics definition.")
    .base(&GRAPHICS_BASE)
    .children(SURFACE_CHILDREN);

static SURFACE_CHILDREN: &[ChildSpec] = &[
    ChildSpec::Property(&SHOW_EDGES_ON),
    ChildSpec::Object(&SURFACE_DEFINITION),
];

static SHOW_EDGES_ON: PropertySpec = PropertySpec::new("show_edges", ValueKind::Bool)
    .help("Show edges for surface.")
    .default(Literal::Bool(true));

static SURFACE_DEFINITION: ObjectSpec = ObjectSpec::new("definition")
    .help("Specify surface definition type.")
    .children(SURFACE_DEFINITION_CHILDREN);

static SURFACE_DEFINITION_CHILDREN: &[ChildSpec] = &[
    ChildSpec::Property(&SURFACE_TYPE),
    ChildSpec::Object(&PLANE_SURFACE),
    ChildSpec::Object(&ISO_SURFACE),
];

static SURFACE_TYPE: PropertySpec = PropertySpec::new("type", ValueKind::Str)
    .help("Surface type.")
    .default(Literal::Str("iso-surface"))
    .allowed(surface_types);

fn surface_types(_: &mut NodeCtx<'_>) -> Result<Vec<String>> {
    Ok(vec!["plane-surface".to_string(), "iso-surface".to_string()])
}

static PLANE_SURFACE: ObjectSpec = ObjectSpec::new("plane_surface")
    .help("Plane surface definition.")
    .active_when(plane_surface_active)
    .children(PLANE_SURFACE_CHILDREN);

static PLANE_SURFACE_CHILDREN: &[ChildSpec] = &[
    ChildSpec::Property(&CREATION_METHOD),
    ChildSpec::Object(&POINT),
    ChildSpec::Object(&NORMAL),
    ChildSpec::Object(&XY_PLANE),
    ChildSpec::Object(&YZ_PLANE),
    ChildSpec::Object(&ZX_PLANE),
];

fn plane_surface_active(ctx: &mut NodeCtx<'_>) -> Result<bool> {
    option_is(ctx, PropRef::Sibling("type"), "plane-surface")
}

static CREATION_METHOD: PropertySpec = PropertySpec::new("creation_method", ValueKind::Str)
    .help("Creation Method.")
    .default(Literal::Str("xy-plane"))
    .allowed(creation_methods);

fn creation_methods(_: &mut NodeCtx<'_>) -> Result<Vec<String>> {
    Ok(["xy-plane", "yz-plane", "zx-plane", "point-and-normal"]
        .into_iter()
        .map(String::from)
        .collect())
}

static POINT: ObjectSpec = ObjectSpec::new("point")
    .help("Point entry for point-and-normal surface.")
    .active_when(point_and_normal_active)
    .children(POINT_CHILDREN);

static POINT_CHILDREN: &[ChildSpec] = &[
    ChildSpec::Property(&POINT_X),
    ChildSpec::Property(&POINT_Y),
    ChildSpec::Property(&POINT_Z),
];

static POINT_X: PropertySpec = coordinate("x", "X value.").range(x_coordinate_range);
static POINT_Y: PropertySpec = coordinate("y", "Y value.").range(y_coordinate_range);
static POINT_Z: PropertySpec = coordinate("z", "Z value.").range(z_coordinate_range);

static NORMAL: ObjectSpec = ObjectSpec::new("normal")
    .help("Normal entry for point-and-normal surface.")
    .active_when(point_and_normal_active)
    .children(NORMAL_CHILDREN);

static NORMAL_CHILDREN: &[ChildSpec] = &[
    ChildSpec::Property(&NORMAL_X),
    ChildSpec::Property(&NORMAL_Y),
    ChildSpec::Property(&NORMAL_Z),
];

static NORMAL_X: PropertySpec = coordinate("x", "X value.").range(unit_range);
static NORMAL_Y: PropertySpec = coordinate("y", "Y value.").range(unit_range);
static NORMAL_Z: PropertySpec = coordinate("z", "Z value.").range(unit_range);

fn point_and_normal_active(ctx: &mut NodeCtx<'_>) -> Result<bool> {
    option_is(ctx, PropRef::Sibling("creation_method"), "point-and-normal")
}

static XY_PLANE: ObjectSpec = ObjectSpec::new("xy_plane")
    .help("XY Plane definition.")
    .active_when(xy_plane_active)
    .children(XY_PLANE_CHILDREN);

static XY_PLANE_CHILDREN: &[ChildSpec] = &[ChildSpec::Property(&POINT_Z)];

static YZ_PLANE: ObjectSpec = ObjectSpec::new("yz_plane")
    .help("YZ Plane definition.")
    .active_when(yz_plane_active)
    .children(YZ_PLANE_CHILDREN);

static YZ_PLANE_CHILDREN: &[ChildSpec] = &[ChildSpec::Property(&POINT_X)];

static ZX_PLANE: ObjectSpec = ObjectSpec::new("zx_plane")
    .help("ZX Plane definition.")
    .active_when(zx_plane_active)
    .children(ZX_PLANE_CHILDREN);

static ZX_PLANE_CHILDREN: &[ChildSpec] = &[ChildSpec::Property(&POINT_Y)];

fn xy_plane_active(ctx: &mut NodeCtx<'_>) -> Result<bool> {
    option_is(ctx, PropRef::Sibling("creation_method"), "xy-plane")
}

fn yz_plane_active(ctx: &mut NodeCtx<'_>) -> Result<bool> {
    option_is(ctx, PropRef::Sibling("creation_method"), "yz-plane")
}

fn zx_plane_active(ctx: &mut NodeCtx<'_>) -> Result<bool> {
    option_is(ctx, PropRef::Sibling("creation_method"), "zx-plane")
}

const fn coordinate(name: &'static str, help: &'static str) -> PropertySpec {
    PropertySpec::new(name, ValueKind::Float)
        .help(help)
        .default(Literal::Float(0.0))
}

static ISO_SURFACE: ObjectSpec = ObjectSpec::new("iso_surface")
    .help("Iso surface definition.")
    .active_when(iso_surface_active)
    .children(ISO_SURFACE_CHILDREN);

static ISO_SURFACE_CHILDREN: &[ChildSpec] = &[
    ChildSpec::Property(&ISO_FIELD),
    ChildSpec::Property(&ISO_RENDERING),
    ChildSpec::Property(&ISO_VALUE),
];

fn iso_surface_active(ctx: &mut NodeCtx<'_>) -> Result<bool> {
    option_is(ctx, PropRef::Sibling("type"), "iso-surface")
}

static ISO_FIELD: PropertySpec = PropertySpec::new("field", ValueKind::Str)
    .help("Iso surface field.")
    .allowed(scalar_fields);

static ISO_RENDERING: PropertySpec = PropertySpec::new("rendering", ValueKind::Str)
    .help("Iso surface rendering.")
    .default(Literal::Str("mesh"))
    .allowed(iso_renderings);

fn iso_renderings(_: &mut NodeCtx<'_>) -> Result<Vec<String>> {
    Ok(vec!["mesh".to_string(), "contour".to_string()])
}

static ISO_VALUE_RESETS: &[PropRef] = &[PropRef::Sibling("field")];

static ISO_VALUE: PropertySpec = PropertySpec::new("iso_value", ValueKind::Float)
    .help("Iso value for field.")
    .computed(iso_value_default)
    .range(iso_value_range)
    .reset_on(ISO_VALUE_RESETS);

/// Node range of the chosen field; unknown until a field is chosen.
fn iso_value_range(ctx: &mut NodeCtx<'_>) -> Result<Option<(f64, f64)>> {
    match ctx.read_str(PropRef::Sibling("field"))? {
        Some(field) => ctx.session().scalar_field_range(&field, true).map(Some),
        None => Ok(None),
    }
}

/// Midpoint of the field range.
fn iso_value_default(ctx: &mut NodeCtx<'_>) -> Result<AttrValue> {
    let id = ctx.id();
    Ok(match ctx.tree().range(id)? {
        Some((min, max)) => AttrValue::Float((min + max) / 2.0),
        None => AttrValue::Null,
    })
}

// Contour

pub static CONTOUR: ObjectSpec = ObjectSpec::named("contour", "Contours")
    .help("Contour graphics definition.")
    .base(&GRAPHICS_BASE)
    .children(CONTOUR_CHILDREN)
    .sort_by(&["field", "filled", "node_values", "range"]);

static CONTOUR_CHILDREN: &[ChildSpec] = &[
    ChildSpec::Property(&FIELD),
    ChildSpec::Property(&SURFACES),
    ChildSpec::Property(&FILLED),
    ChildSpec::Property(&NODE_VALUES),
    ChildSpec::Property(&BOUNDARY_VALUES),
    ChildSpec::Property(&CONTOUR_LINES),
    ChildSpec::Property(&SHOW_EDGES_OFF),
    ChildSpec::Object(&CONTOUR_RANGE),
];

static FILLED: PropertySpec = PropertySpec::new("filled", ValueKind::Bool)
    .help("Draw filled contour.")
    .default(Literal::Bool(true));

/// Inactive, and then always `true`, for unfilled or clipped contours.
static NODE_VALUES: PropertySpec = PropertySpec::new("node_values", ValueKind::Bool)
    .help("Draw nodal data.")
    .default(Literal::Bool(true))
    .active_when(node_values_active)
    .when_inactive(Literal::Bool(true))
    .guard(node_values_guard);

static BOUNDARY_VALUES: PropertySpec = PropertySpec::new("boundary_values", ValueKind::Bool)
    .help("Draw boundary values.")
    .default(Literal::Bool(false));

static CONTOUR_LINES: PropertySpec = PropertySpec::new("contour_lines", ValueKind::Bool)
    .help("Draw contour lines.")
    .default(Literal::Bool(false));

fn node_values_active(ctx: &mut NodeCtx<'_>) -> Result<bool> {
    if ctx.read_bool(PropRef::Ancestor(&CONTOUR, "filled"))? == Some(false) {
        return Ok(false);
    }
    let clipped =
        ctx.read_bool(PropRef::Ancestor(&CONTOUR, "range/auto_range_off/clip_to_range"))? == Some(true);
    Ok(!clipped)
}

fn node_values_guard(ctx: &mut NodeCtx<'_>, value: &AttrValue) -> Result<()> {
    if value.as_bool() == Some(false) && !ctx.self_active()? {
        return Err(PostvizError::State(
            "For unfilled and clipped contours, node values must be displayed. ".to_string(),
        ));
    }
    Ok(())
}

static CONTOUR_RANGE: ObjectSpec = ObjectSpec::new("range")
    .help("Range definition.")
    .children(CONTOUR_RANGE_CHILDREN);

static CONTOUR_RANGE_CHILDREN: &[ChildSpec] = &[
    ChildSpec::Property(&RANGE_OPTION),
    ChildSpec::Object(&AUTO_RANGE_ON),
    ChildSpec::Object(&CONTOUR_AUTO_RANGE_OFF),
];

static CONTOUR_AUTO_RANGE_OFF: ObjectSpec = ObjectSpec::new("auto_range_off")
    .help("Auto range off definition.")
    .active_when(auto_range_off_active)
    .children(CONTOUR_AUTO_RANGE_OFF_CHILDREN);

static CONTOUR_AUTO_RANGE_OFF_CHILDREN: &[ChildSpec] = &[
    ChildSpec::Property(&CLIP_TO_RANGE),
    ChildSpec::Property(&CONTOUR_MINIMUM),
    ChildSpec::Property(&CONTOUR_MAXIMUM),
];

static CONTOUR_RANGE_RESETS: &[PropRef] = &[
    PropRef::Ancestor(&CONTOUR, "field"),
    PropRef::Ancestor(&CONTOUR, "node_values"),
];

static CONTOUR_MINIMUM: PropertySpec = PropertySpec::new("minimum", ValueKind::Float)
    .help("Range minimum.")
    .computed(contour_minimum)
    .reset_on(CONTOUR_RANGE_RESETS);

static CONTOUR_MAXIMUM: PropertySpec = PropertySpec::new("maximum", ValueKind::Float)
    .help("Range maximum.")
    .computed(contour_maximum)
    .reset_on(CONTOUR_RANGE_RESETS);

/// Range of the contour's field, on nodes or cells as the contour draws it.
fn contour_field_range(ctx: &mut NodeCtx<'_>) -> Result<Option<(f64, f64)>> {
    let Some(field) = ctx.read_str(PropRef::Ancestor(&CONTOUR, "field"))? else {
        return Ok(None);
    };
    let node_values = ctx
        .read_bool(PropRef::Ancestor(&CONTOUR, "node_values"))?
        .unwrap_or(true);
    ctx.session().scalar_field_range(&field, node_values).map(Some)
}

fn contour_minimum(ctx: &mut NodeCtx<'_>) -> Result<AttrValue> {
    Ok(contour_field_range(ctx)?.map_or(AttrValue::Null, |(min, _)| AttrValue::Float(min)))
}

fn contour_maximum(ctx: &mut NodeCtx<'_>) -> Result<AttrValue> {
    Ok(contour_field_range(ctx)?.map_or(AttrValue::Null, |(_, max)| AttrValue::Float(max)))
}

// Vector

pub static VECTOR: ObjectSpec = ObjectSpec::named("vector", "Vectors")
    .help("Vector graphics definition.")
    .base(&GRAPHICS_BASE)
    .children(VECTOR_CHILDREN);

static VECTOR_CHILDREN: &[ChildSpec] = &[
    ChildSpec::Property(&VECTORS_OF),
    ChildSpec::Property(&VECTOR_FIELD),
    ChildSpec::Property(&SURFACES),
    ChildSpec::Property(&SCALE),
    ChildSpec::Property(&SKIP),
    ChildSpec::Property(&SHOW_EDGES_OFF),
    ChildSpec::Object(&VECTOR_RANGE),
];

static VECTORS_OF: PropertySpec = PropertySpec::new("vectors_of", ValueKind::Str)
    .help("Vector type.")
    .default(Literal::Str("velocity"))
    .allowed(vector_fields);

static VECTOR_FIELD: PropertySpec = PropertySpec::new("field", ValueKind::Str)
    .help("Vector color field.")
    .allowed(scalar_fields);

static SCALE: PropertySpec = PropertySpec::new("scale", ValueKind::Float)
    .help("Vector scale.")
    .default(Literal::Float(1.0));

static SKIP: PropertySpec = PropertySpec::new("skip", ValueKind::Int)
    .help("Vector skip.")
    .default(Literal::Int(0));

static VECTOR_RANGE: ObjectSpec = ObjectSpec::new("range")
    .help("Range definition.")
    .children(VECTOR_RANGE_CHILDREN);

static VECTOR_RANGE_CHILDREN: &[ChildSpec] = &[
    ChildSpec::Property(&RANGE_OPTION),
    ChildSpec::Object(&AUTO_RANGE_ON),
    ChildSpec::Object(&VECTOR_AUTO_RANGE_OFF),
];

static VECTOR_AUTO_RANGE_OFF: ObjectSpec = ObjectSpec::new("auto_range_off")
    .help("Auto range off definition.")
    .active_when(auto_range_off_active)
    .children(VECTOR_AUTO_RANGE_OFF_CHILDREN);

static VECTOR_AUTO_RANGE_OFF_CHILDREN: &[ChildSpec] = &[
    ChildSpec::Property(&CLIP_TO_RANGE),
    ChildSpec::Property(&VECTOR_MINIMUM),
    ChildSpec::Property(&VECTOR_MAXIMUM),
];

static VECTOR_MINIMUM: PropertySpec = PropertySpec::new("minimum", ValueKind::Float)
    .help("Range minimum.")
    .computed(vector_minimum);

static VECTOR_MAXIMUM: PropertySpec = PropertySpec::new("maximum", ValueKind::Float)
    .help("Range maximum.")
    .computed(vector_maximum);

// Vectors are colored by magnitude on cells.
fn vector_minimum(ctx: &mut NodeCtx<'_>) -> Result<AttrValue> {
    let (min, _) = ctx.session().scalar_field_range("velocity-magnitude", false)?;
    Ok(AttrValue::Float(min))
}

fn vector_maximum(ctx: &mut NodeCtx<'_>) -> Result<AttrValue> {
    let (_, max) = ctx.session().scalar_field_range("velocity-magnitude", false)?;
    Ok(AttrValue::Float(max))
}

// Pathlines

pub static PATHLINES: ObjectSpec = ObjectSpec::named("pathlines", "Pathlines")
    .help("Pathlines definition.")
    .base(&GRAPHICS_BASE)
    .children(PATHLINES_CHILDREN);

static PATHLINES_CHILDREN: &[ChildSpec] = &[ChildSpec::Property(&FIELD), ChildSpec::Property(&SURFACES)];
