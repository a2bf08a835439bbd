use postvizapp::api::PostvizApi;
use postvizapp::config::PostvizConfig;
use postvizapp::definitions::GRAPHICS;
use postvizapp::registry::SessionRegistry;
use postvizapp::render::{RecordingRenderer, RenderKind};
use postvizapp::session::{Session, SnapshotSession};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::cell::Cell;
use std::path::Path;
use std::rc::Rc;

fn session() -> Rc<dyn Session> {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/session.json");
    Rc::new(SnapshotSession::load(&path).unwrap())
}

#[test]
fn state_copies_between_sessions() {
    let source = PostvizApi::new(session(), PostvizConfig::default());
    source.create("Surfaces", Some("cut"), None).unwrap();
    source
        .create(
            "Contours",
            None,
            json!({"field": "temperature", "surfaces": ["cut"], "filled": false})
                .as_object(),
        )
        .unwrap();
    source.create("Monitors", Some("res"), None).unwrap();
    source.set("Plots/XYPlots/p/surfaces", &json!(["cut"])).unwrap();
    let state = source.state().unwrap();

    let target = PostvizApi::new(session(), PostvizConfig::default());
    target.load_state(&state).unwrap();
    assert_eq!(target.state().unwrap(), state);
    assert_eq!(
        target.get("Graphics/Contours/contour-0/field").unwrap().value,
        Some(json!("temperature"))
    );
}

#[test]
fn unexpected_initial_state_is_rejected() {
    let api = PostvizApi::new(session(), PostvizConfig::default());
    let err = api
        .create("XYPlots", None, json!({"title": "pressure"}).as_object())
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "create() got an unexpected keyword argument 'title'."
    );
    let state = api.state().unwrap();
    assert_eq!(state["Plots"]["XYPlots"], json!({}));
}

#[test]
fn monitors_render_their_series() {
    let api = PostvizApi::new(session(), PostvizConfig::default());
    api.set("Plots/Monitors/m/monitor_set_name", &json!("mass-flow")).unwrap();

    let mut renderer = RecordingRenderer::default();
    api.display("Plots/Monitors/m", &mut renderer, None).unwrap();
    let request = &renderer.requests[0];
    assert_eq!(request.kind, RenderKind::Plot);
    let monitor = request.monitor.as_ref().unwrap();
    assert_eq!(monitor.iterations, vec![1.0, 2.0, 3.0, 4.0]);
    assert_eq!(monitor.series[0].name, "outlet");
}

#[test]
fn change_callbacks_fire_for_every_write() {
    let registry = SessionRegistry::default();
    let tree = registry.open(&GRAPHICS, session()).unwrap();
    let mut tree = tree.borrow_mut();
    let field = tree.resolve("Contours/c/field", true).unwrap();

    let count = Rc::new(Cell::new(0));
    let seen = Rc::clone(&count);
    tree.observe(field, move |_| seen.set(seen.get() + 1)).unwrap();

    tree.set_json(field, &json!("temperature")).unwrap();
    tree.set_json(field, &json!("temperature")).unwrap();
    assert_eq!(count.get(), 2);
}

#[test]
fn sessions_do_not_share_objects() {
    let registry = SessionRegistry::default();
    let a = registry.open(&GRAPHICS, session()).unwrap();
    a.borrow_mut().resolve("Meshes/m", true).unwrap();

    let other: Rc<dyn Session> = Rc::new(
        SnapshotSession::from_json(r#"{"id": "other"}"#).unwrap(),
    );
    let b = registry.open(&GRAPHICS, other).unwrap();
    let mut b = b.borrow_mut();
    let root = b.root();
    assert_eq!(b.get_state(root, false).unwrap()["Meshes"], json!({}));
}
