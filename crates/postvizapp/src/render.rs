//! # Rendering Boundary
//!
//! Drawing is done by an external backend behind the [`Renderer`] trait. The
//! library resolves everything a backend needs into a [`RenderRequest`]:
//! the object's state, the solver names of the surfaces it references and,
//! for monitors, the time series.
//!
//! ## Display lifecycle
//!
//! 1. Every local surface the object references (a Surface item displays
//!    itself) is created on the solver.
//! 2. The request is built and handed to the renderer.
//! 3. The surfaces created in step 1 are deleted again, whether or not
//!    rendering succeeded.

use crate::definitions::{GRAPHICS_BASE, MONITOR, PLOT_BASE, SURFACE};
use crate::error::{PostvizError, Result};
use crate::session::MonitorData;
use crate::surface;
use crate::tree::{NodeId, Tree};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderKind {
    Graphics,
    Plot,
}

/// Everything a backend needs to draw one object.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderRequest {
    pub kind: RenderKind,
    /// Definition name, e.g. `contour`.
    pub definition: &'static str,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub window_id: Option<String>,
    pub state: Value,
    /// Solver names of the referenced surfaces.
    pub surfaces: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monitor: Option<MonitorData>,
}

pub trait Renderer {
    fn render(&mut self, request: &RenderRequest) -> Result<()>;
}

/// Keeps every request; useful for tests and dry runs.
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    pub requests: Vec<RenderRequest>,
}

impl Renderer for RecordingRenderer {
    fn render(&mut self, request: &RenderRequest) -> Result<()> {
        self.requests.push(request.clone());
        Ok(())
    }
}

/// Writes each request as pretty JSON.
pub struct JsonRenderer<W: std::io::Write> {
    out: W,
}

impl<W: std::io::Write> JsonRenderer<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: std::io::Write> Renderer for JsonRenderer<W> {
    fn render(&mut self, request: &RenderRequest) -> Result<()> {
        serde_json::to_writer_pretty(&mut self.out, request)?;
        writeln!(self.out)?;
        Ok(())
    }
}

/// Display the graphics or plot object at `item`.
pub fn display(
    tree: &mut Tree,
    item: NodeId,
    renderer: &mut dyn Renderer,
    window_id: Option<&str>,
) -> Result<()> {
    let spec = tree.object_spec(item)?;
    let kind = if spec.inherits(&GRAPHICS_BASE) {
        RenderKind::Graphics
    } else if spec.inherits(&PLOT_BASE) {
        RenderKind::Plot
    } else {
        return Err(PostvizError::State(format!("{} cannot be displayed", tree.path(item))));
    };

    let name = tree.name(item)?.to_string();
    let referenced = if spec.inherits(&SURFACE) {
        vec![name.clone()]
    } else {
        referenced_surfaces(tree, item)?
    };
    let locals = tree.local_surface_names()?;
    let to_create: Vec<String> = referenced
        .iter()
        .filter(|s| locals.contains(s))
        .cloned()
        .collect();

    let mut created = Vec::new();
    let mut result = Ok(());
    for local in &to_create {
        match surface::with_local_surface(tree, local, surface::create_on_server) {
            Ok(_) => created.push(local.clone()),
            Err(e) => {
                result = Err(e);
                break;
            }
        }
    }

    if result.is_ok() {
        result = build_request(tree, item, kind, name, &referenced, window_id)
            .and_then(|request| {
                debug!(path = %tree.path(item), "rendering");
                renderer.render(&request)
            });
    }

    for local in &created {
        if let Err(e) = surface::with_local_surface(tree, local, surface::delete_on_server) {
            warn!(surface = %local, error = %e, "failed to delete surface after display");
            if result.is_ok() {
                result = Err(e);
            }
        }
    }
    result
}

fn referenced_surfaces(tree: &mut Tree, item: NodeId) -> Result<Vec<String>> {
    match tree.child(item, "surfaces") {
        Ok(surfaces) => Ok(tree.read(surfaces)?.members()),
        Err(PostvizError::UnknownChild { .. }) => Ok(Vec::new()),
        Err(e) => Err(e),
    }
}

fn build_request(
    tree: &mut Tree,
    item: NodeId,
    kind: RenderKind,
    name: String,
    referenced: &[String],
    window_id: Option<&str>,
) -> Result<RenderRequest> {
    let spec = tree.object_spec(item)?;
    let state = tree.get_state(item, false)?;
    let surfaces = referenced
        .iter()
        .map(|s| surface::remote_surface_name(tree, s))
        .collect::<Result<Vec<_>>>()?;

    let monitor = if spec.inherits(&MONITOR) {
        let set_name = tree.child(item, "monitor_set_name")?;
        match tree.read(set_name)?.as_str() {
            Some(set) => Some(tree.session().monitor_data(set)?),
            None => None,
        }
    } else {
        None
    };

    Ok(RenderRequest {
        kind,
        definition: spec.name,
        name,
        window_id: window_id.map(str::to_string),
        state,
        surfaces,
        monitor,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definitions::{GRAPHICS, PLOTS};
    use crate::session::{Session, SnapshotSession};
    use crate::test_utils::sample_session;
    use crate::tree::{LocalSurfaces, ReadPolicy};
    use serde_json::json;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Failing;

    impl Renderer for Failing {
        fn render(&mut self, _: &RenderRequest) -> Result<()> {
            Err(PostvizError::State("backend down".to_string()))
        }
    }

    fn setup() -> (Rc<SnapshotSession>, Tree) {
        let session = Rc::new(sample_session());
        let tree = Tree::new(&GRAPHICS, Rc::clone(&session) as _, ReadPolicy::Repair).unwrap();
        (session, tree)
    }

    #[test]
    fn local_surfaces_exist_only_while_rendering() {
        let (session, mut tree) = setup();
        tree.resolve("Surfaces/Cut", true).unwrap();
        let contour = tree.resolve("Contours/c", true).unwrap();
        let surfaces = tree.child(contour, "surfaces").unwrap();
        tree.set_json(surfaces, &json!(["wall", "Cut"])).unwrap();

        let mut renderer = RecordingRenderer::default();
        display(&mut tree, contour, &mut renderer, Some("w1")).unwrap();

        let request = &renderer.requests[0];
        assert_eq!(request.kind, RenderKind::Graphics);
        assert_eq!(request.definition, "contour");
        assert_eq!(request.surfaces, vec!["wall", "cut"]);
        assert_eq!(request.window_id.as_deref(), Some("w1"));
        assert!(!session.surface_names().unwrap().contains(&"cut".to_string()));
        let log = session.server_log();
        assert!(log[0].starts_with("create iso-surface cut"));
        assert_eq!(log[1], "delete surface cut");
    }

    #[test]
    fn surfaces_are_cleaned_up_when_rendering_fails() {
        let (session, mut tree) = setup();
        let surface = tree.resolve("Surfaces/s", true).unwrap();
        let err = display(&mut tree, surface, &mut Failing, None).unwrap_err();
        assert_eq!(err.to_string(), "backend down");
        assert!(!session.surface_names().unwrap().contains(&"s".to_string()));
    }

    #[test]
    fn monitors_carry_their_series() {
        let session: Rc<SnapshotSession> = Rc::new(sample_session());
        let mut plots = Tree::new(&PLOTS, Rc::clone(&session) as _, ReadPolicy::Repair).unwrap();
        let monitor = plots.resolve("Monitors/m", true).unwrap();
        let mut renderer = RecordingRenderer::default();
        display(&mut plots, monitor, &mut renderer, None).unwrap();

        let request = &renderer.requests[0];
        assert_eq!(request.kind, RenderKind::Plot);
        let data = request.monitor.as_ref().unwrap();
        assert_eq!(data.series[0].name, "continuity");
    }

    #[test]
    fn plots_create_surfaces_from_their_provider() {
        let session: Rc<SnapshotSession> = Rc::new(sample_session());
        let graphics = Rc::new(RefCell::new(
            Tree::new(&GRAPHICS, Rc::clone(&session) as _, ReadPolicy::Repair).unwrap(),
        ));
        graphics.borrow_mut().resolve("Surfaces/plane", true).unwrap();

        let mut plots = Tree::new(&PLOTS, Rc::clone(&session) as _, ReadPolicy::Repair).unwrap();
        plots.set_local_surfaces(LocalSurfaces::Shared(Rc::clone(&graphics)));
        let plot = plots.resolve("XYPlots/p", true).unwrap();
        let surfaces = plots.child(plot, "surfaces").unwrap();
        plots.set_json(surfaces, &json!(["plane"])).unwrap();

        let mut renderer = RecordingRenderer::default();
        display(&mut plots, plot, &mut renderer, None).unwrap();
        assert_eq!(renderer.requests[0].surfaces, vec!["plane"]);
        assert_eq!(session.server_log().len(), 2);
    }

    #[test]
    fn json_renderer_writes_one_document_per_request() {
        let (_, mut tree) = setup();
        let mesh = tree.resolve("Meshes/m", true).unwrap();
        let mut renderer = JsonRenderer::new(Vec::new());
        display(&mut tree, mesh, &mut renderer, None).unwrap();
        let written: Value = serde_json::from_slice(&renderer.into_inner()).unwrap();
        assert_eq!(written["definition"], json!("mesh"));
        assert_eq!(written["state"]["show_faces"], json!(true));
    }

    #[test]
    fn containers_cannot_be_displayed() {
        let (_, mut tree) = setup();
        let root = tree.root();
        assert!(display(&mut tree, root, &mut RecordingRenderer::default(), None).is_err());
    }
}
