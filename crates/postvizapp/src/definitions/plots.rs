use super::{scalar_fields, surfaces};
use crate::attributes::ValueKind;
use crate::error::Result;
use crate::schema::{ChildSpec, Literal, ObjectSpec, PropertySpec};
use crate::tree::NodeCtx;

/// Common base of everything the plotter draws.
pub static PLOT_BASE: ObjectSpec = ObjectSpec::new("plot").help("Abstract base of plot objects.");

pub static PLOTS: ObjectSpec = ObjectSpec::new("Plots")
    .help("Plot objects of one session.")
    .children(PLOTS_CHILDREN);

static PLOTS_CHILDREN: &[ChildSpec] = &[ChildSpec::Named(&XY_PLOT), ChildSpec::Named(&MONITOR)];

pub static XY_PLOT: ObjectSpec = ObjectSpec::named("xyplot", "XYPlots")
    .help("XYPlot Definition.")
    .base(&PLOT_BASE)
    .children(XY_PLOT_CHILDREN);

static XY_PLOT_CHILDREN: &[ChildSpec] = &[
    ChildSpec::Property(&NODE_VALUES),
    ChildSpec::Property(&BOUNDARY_VALUES),
    ChildSpec::Property(&DIRECTION_VECTOR),
    ChildSpec::Property(&Y_AXIS_FUNCTION),
    ChildSpec::Property(&X_AXIS_FUNCTION),
    ChildSpec::Property(&SURFACES),
];

static NODE_VALUES: PropertySpec = PropertySpec::new("node_values", ValueKind::Bool)
    .help("Plot nodal values.")
    .default(Literal::Bool(true));

static BOUNDARY_VALUES: PropertySpec = PropertySpec::new("boundary_values", ValueKind::Bool)
    .help("Plot Boundary values.")
    .default(Literal::Bool(true));

static DIRECTION_VECTOR: PropertySpec = PropertySpec::new("direction_vector", ValueKind::Vector)
    .help("Direction Vector.")
    .default(Literal::Vector([1.0, 0.0, 0.0]));

static Y_AXIS_FUNCTION: PropertySpec = PropertySpec::new("y_axis_function", ValueKind::Str)
    .help("Y Axis Function.")
    .allowed(scalar_fields);

static X_AXIS_FUNCTION: PropertySpec = PropertySpec::new("x_axis_function", ValueKind::Str)
    .help("X Axis Function.")
    .default(Literal::Str("direction-vector"))
    .allowed(x_axis_functions);

fn x_axis_functions(_: &mut NodeCtx<'_>) -> Result<Vec<String>> {
    Ok(vec!["direction-vector".to_string()])
}

static SURFACES: PropertySpec = PropertySpec::new("surfaces", ValueKind::StrList)
    .help("List of surfaces for plotting.")
    .default(Literal::List(&[]))
    .allowed(surfaces);

pub static MONITOR: ObjectSpec = ObjectSpec::named("monitor", "Monitors")
    .help("Monitor Definition.")
    .base(&PLOT_BASE)
    .children(MONITOR_CHILDREN);

static MONITOR_CHILDREN: &[ChildSpec] = &[ChildSpec::Property(&MONITOR_SET_NAME)];

static MONITOR_SET_NAME: PropertySpec = PropertySpec::new("monitor_set_name", ValueKind::Str)
    .help("Monitor set name.")
    .allowed(monitor_set_names);

fn monitor_set_names(ctx: &mut NodeCtx<'_>) -> Result<Vec<String>> {
    ctx.session().monitor_set_names()
}
