use crate::session::SnapshotSession;

/// Solver state shared by unit tests: a small duct with five zones.
pub const SAMPLE_SNAPSHOT: &str = r#"{
  "id": "duct",
  "scalar_fields": [
    {"name": "pressure", "unit": "Pa", "node_range": [-120.0, 340.0], "cell_range": [-150.0, 360.0]},
    {"name": "velocity-magnitude", "unit": "m/s", "node_range": [0.0, 12.5], "cell_range": [0.0, 13.0]},
    {"name": "temperature", "unit": "K", "node_range": [280.0, 350.0], "cell_range": [275.0, 355.0]},
    {"name": "x-coordinate", "unit": "m", "node_range": [-1.0, 1.0], "cell_range": [-0.95, 0.95]},
    {"name": "y-coordinate", "unit": "m", "node_range": [-0.5, 0.5], "cell_range": [-0.45, 0.45]},
    {"name": "z-coordinate", "unit": "m", "node_range": [0.0, 2.0], "cell_range": [0.05, 1.95]}
  ],
  "vector_fields": ["velocity"],
  "surfaces": [
    {"name": "wall", "type": "zone-surf", "zone_type": "wall"},
    {"name": "inlet", "type": "zone-surf", "zone_type": "velocity-inlet"},
    {"name": "outlet", "type": "zone-surf", "zone_type": "pressure-outlet"},
    {"name": "interior-fluid", "type": "zone-surf", "zone_type": "interior"},
    {"name": "symmetry", "type": "zone-surf", "zone_type": "symmetry"}
  ],
  "monitors": [
    {
      "name": "residual",
      "iterations": [1.0, 2.0, 3.0, 4.0],
      "series": [
        {"name": "continuity", "values": [1.0, 0.4, 0.1, 0.02]},
        {"name": "x-velocity", "values": [0.8, 0.3, 0.05, 0.01]}
      ]
    },
    {
      "name": "mass-flow",
      "iterations": [1.0, 2.0, 3.0, 4.0],
      "series": [{"name": "outlet", "values": [0.9, 0.97, 0.99, 1.0]}]
    }
  ]
}"#;

pub fn sample_session() -> SnapshotSession {
    SnapshotSession::from_json(SAMPLE_SNAPSHOT).expect("sample snapshot parses")
}

/// A small schema exercising every tree feature without any solver data:
/// inheritance, lazy defaults, resets (sibling and ancestor), guards,
/// read-only and inactive properties, nested containers and a command.
pub mod toy {
    use crate::attributes::{AttrValue, AttributeName, ValueKind};
    use crate::error::{PostvizError, Result};
    use crate::schema::{ChildSpec, CommandSpec, Literal, ObjectSpec, PropRef, PropertySpec};
    use crate::tree::{CommandArgs, NodeCtx};

    pub static ROOT: ObjectSpec = ObjectSpec::new("Toys").children(ROOT_CHILDREN);

    static ROOT_CHILDREN: &[ChildSpec] = &[
        ChildSpec::Property(&CREATED),
        ChildSpec::Property(&DELETED),
        ChildSpec::Property(&CHANGES),
        ChildSpec::Named(&THING),
    ];

    static CREATED: PropertySpec = PropertySpec::new("created", ValueKind::Int).default(Literal::Int(0));
    static DELETED: PropertySpec = PropertySpec::new("deleted", ValueKind::Int).default(Literal::Int(0));
    static CHANGES: PropertySpec = PropertySpec::new("changes", ValueKind::Int).default(Literal::Int(0));

    pub static BASE_THING: ObjectSpec = ObjectSpec::new("thing").children(BASE_CHILDREN);

    static BASE_CHILDREN: &[ChildSpec] = &[
        ChildSpec::Property(&SIZE),
        ChildSpec::Property(&STAMP),
        ChildSpec::Command(&PAINT),
        ChildSpec::Property(&TAG),
    ];

    pub static THING: ObjectSpec = ObjectSpec::named("t", "Things")
        .help("A toy thing.")
        .base(&BASE_THING)
        .children(THING_CHILDREN)
        .sort_by(&["color"])
        .on_create(count_created)
        .on_delete(count_deleted);

    static THING_CHILDREN: &[ChildSpec] = &[
        ChildSpec::Property(&COLOR),
        ChildSpec::Property(&LABEL),
        ChildSpec::Object(&SHAPE),
    ];

    static COLOR: PropertySpec = PropertySpec::new("color", ValueKind::Str)
        .help("Color of the thing.")
        .default(Literal::Str("red"))
        .allowed(colors);

    static LABEL_RESETS: &[PropRef] = &[PropRef::Sibling("color")];

    static LABEL: PropertySpec = PropertySpec::new("label", ValueKind::Str)
        .computed(label_default)
        .reset_on(LABEL_RESETS);

    static SHAPE: ObjectSpec = ObjectSpec::new("shape").children(SHAPE_CHILDREN);

    static SHAPE_CHILDREN: &[ChildSpec] = &[ChildSpec::Property(&SIDES), ChildSpec::Named(&PART)];

    static SIDES: PropertySpec = PropertySpec::new("sides", ValueKind::Int)
        .default(Literal::Int(3))
        .range(sides_range)
        .presentation(&[(AttributeName::Widget, "spin")]);

    pub static PART: ObjectSpec = ObjectSpec::named("part", "Parts").children(PART_CHILDREN);

    static PART_CHILDREN: &[ChildSpec] = &[ChildSpec::Property(&WEIGHT), ChildSpec::Property(&RATIO)];

    static WEIGHT: PropertySpec = PropertySpec::new("weight", ValueKind::Float).default(Literal::Float(1.0));

    static RATIO_RESETS: &[PropRef] = &[PropRef::Ancestor(&THING, "size")];

    static RATIO: PropertySpec = PropertySpec::new("ratio", ValueKind::Float)
        .computed(ratio_default)
        .reset_on(RATIO_RESETS);

    static SIZE: PropertySpec = PropertySpec::new("size", ValueKind::Float)
        .default(Literal::Float(1.0))
        .guard(non_negative)
        .on_change(count_change);

    static STAMP: PropertySpec = PropertySpec::new("stamp", ValueKind::Str)
        .default(Literal::Str("v1"))
        .read_only();

    static TAG: PropertySpec = PropertySpec::new("tag", ValueKind::Bool)
        .default(Literal::Bool(true))
        .active_when(is_blue)
        .when_inactive(Literal::Bool(false));

    static PAINT_ARGS: &[PropertySpec] = &[
        PropertySpec::new("color", ValueKind::Str).allowed(colors),
        PropertySpec::new("coats", ValueKind::Float)
            .default(Literal::Float(1.0))
            .range(coats_range),
    ];

    static PAINT: CommandSpec = CommandSpec::new("paint", paint)
        .help("Repaint the thing.")
        .args(PAINT_ARGS);

    fn colors(_: &mut NodeCtx<'_>) -> Result<Vec<String>> {
        Ok(vec!["red".into(), "green".into(), "blue".into()])
    }

    fn label_default(ctx: &mut NodeCtx<'_>) -> Result<AttrValue> {
        let color = ctx.read_str(PropRef::Sibling("color"))?.unwrap_or_default();
        Ok(format!("{color} thing").into())
    }

    fn sides_range(_: &mut NodeCtx<'_>) -> Result<Option<(f64, f64)>> {
        Ok(Some((3.0, 12.0)))
    }

    fn coats_range(_: &mut NodeCtx<'_>) -> Result<Option<(f64, f64)>> {
        Ok(Some((1.0, 3.0)))
    }

    fn ratio_default(ctx: &mut NodeCtx<'_>) -> Result<AttrValue> {
        let size = ctx.read(PropRef::Ancestor(&THING, "size"))?.as_f64().unwrap_or(0.0);
        Ok(AttrValue::Float(size * 0.5))
    }

    fn non_negative(_: &mut NodeCtx<'_>, value: &AttrValue) -> Result<()> {
        match value.as_f64() {
            Some(v) if v < 0.0 => Err(PostvizError::State("size must not be negative".into())),
            _ => Ok(()),
        }
    }

    fn is_blue(ctx: &mut NodeCtx<'_>) -> Result<bool> {
        Ok(ctx.read_str(PropRef::Sibling("color"))?.as_deref() == Some("blue"))
    }

    fn bump(ctx: &mut NodeCtx<'_>, counter: &str) -> Result<()> {
        let tree = ctx.tree();
        let id = tree.child(tree.root(), counter)?;
        let next = tree.read(id)?.as_f64().unwrap_or(0.0) as i64 + 1;
        tree.set_state(id, AttrValue::Int(next))
    }

    fn count_created(ctx: &mut NodeCtx<'_>) -> Result<()> {
        bump(ctx, "created")
    }

    fn count_deleted(ctx: &mut NodeCtx<'_>, _name: &str) -> Result<()> {
        bump(ctx, "deleted")
    }

    fn count_change(ctx: &mut NodeCtx<'_>) -> Result<()> {
        if ctx.read(PropRef::Sibling("size"))?.as_f64().unwrap_or(0.0) > 100.0 {
            return Err(PostvizError::State("size is over the limit".into()));
        }
        bump(ctx, "changes")
    }

    fn paint(ctx: &mut NodeCtx<'_>, args: &CommandArgs) -> Result<AttrValue> {
        if let Some(color) = args.get("color").and_then(AttrValue::as_str) {
            let target = ctx.resolve(PropRef::Owner("color"))?;
            ctx.tree().set_state(target, color.into())?;
        }
        Ok(args.get("coats").cloned().unwrap_or(AttrValue::Null))
    }
}
