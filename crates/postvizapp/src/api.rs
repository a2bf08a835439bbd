//! # API Facade
//!
//! The API layer is a **thin facade** over the command layer and the single
//! entry point for UI clients. It owns the [`SessionRegistry`], the session
//! and the configuration, turns user paths into a container plus a relative
//! path, and dispatches to `commands/*`.
//!
//! ## Paths
//!
//! Node paths start with the definition set: `Graphics/Contours/c/field`.
//! Container arguments (`create`, `delete`) accept either a full path
//! (`Plots/Monitors`) or a bare plural (`Monitors`), looked up across sets.
//!
//! ## Local surfaces
//!
//! Sets without a `Surfaces` container of their own (Plots) are opened with
//! the Graphics container of the same session as their local surface
//! provider.
//!
//! ## State documents
//!
//! [`PostvizApi::state`] and [`PostvizApi::load_state`] exchange one JSON
//! object keyed by set name; sets are applied in name order.

use crate::commands::{self, CmdResult};
use crate::config::PostvizConfig;
use crate::container::Container;
use crate::definitions::{self, GRAPHICS};
use crate::error::{PostvizError, Result};
use crate::registry::SessionRegistry;
use crate::render::Renderer;
use crate::schema::ObjectSpec;
use crate::session::Session;
use crate::tree::LOCAL_SURFACES_CONTAINER;
use serde_json::{Map, Value};
use std::rc::Rc;

pub struct PostvizApi {
    registry: SessionRegistry,
    session: Rc<dyn Session>,
    config: PostvizConfig,
}

impl PostvizApi {
    pub fn new(session: Rc<dyn Session>, config: PostvizConfig) -> Self {
        Self {
            registry: SessionRegistry::new(config.read_policy),
            session,
            config,
        }
    }

    pub fn config(&self) -> &PostvizConfig {
        &self.config
    }

    pub fn session(&self) -> Rc<dyn Session> {
        Rc::clone(&self.session)
    }

    /// Session-scoped container of the set named `set`.
    pub fn container(&self, set: &str) -> Result<Container> {
        self.open(definitions::definition_set(set)?)
    }

    fn open(&self, spec: &'static ObjectSpec) -> Result<Container> {
        let container = Container::open(&self.registry, spec, self.session())?;
        if spec.child(LOCAL_SURFACES_CONTAINER).is_none() {
            let provider = Container::open(&self.registry, &GRAPHICS, self.session())?;
            container.use_local_surfaces_of(&provider)?;
        }
        Ok(container)
    }

    /// State of every set, keyed by set name.
    pub fn state(&self) -> Result<Value> {
        let mut out = Map::new();
        for name in definitions::set_names() {
            out.insert(name.to_string(), self.container(name)?.state(false)?);
        }
        Ok(Value::Object(out))
    }

    pub fn load_state(&self, state: &Value) -> Result<()> {
        let Value::Object(sets) = state else {
            return Err(PostvizError::TypeMismatch {
                path: "state".to_string(),
                expected: "object".to_string(),
                found: "non-object".to_string(),
            });
        };
        for name in sets.keys() {
            definitions::definition_set(name)?;
        }
        for name in definitions::set_names() {
            if let Some(set_state) = sets.get(name) {
                self.container(name)?.update(set_state)?;
            }
        }
        Ok(())
    }

    /// State of one set, or of all of them.
    pub fn show(&self, set: Option<&str>, show_attributes: bool) -> Result<CmdResult> {
        match set {
            Some(set) => commands::show::run(&self.container(set)?, show_attributes),
            None if !show_attributes => Ok(CmdResult::default().with_value(self.state()?)),
            None => {
                let mut out = Map::new();
                for name in definitions::set_names() {
                    let container = self.container(name)?;
                    out.insert(name.to_string(), container.state(true)?);
                }
                Ok(CmdResult::default().with_value(Value::Object(out)))
            }
        }
    }

    pub fn get(&self, path: &str) -> Result<CmdResult> {
        let (container, rest) = self.split_path(path)?;
        commands::get::run(&container, rest)
    }

    pub fn set(&self, path: &str, value: &Value) -> Result<CmdResult> {
        let (container, rest) = self.split_path(path)?;
        commands::set::run(&container, rest, value)
    }

    pub fn attr(&self, path: &str, attribute: &str) -> Result<CmdResult> {
        let (container, rest) = self.split_path(path)?;
        commands::attr::run(&container, rest, attribute)
    }

    pub fn call(&self, path: &str, kwargs: &Map<String, Value>) -> Result<CmdResult> {
        let (container, rest) = self.split_path(path)?;
        commands::call::run(&container, rest, kwargs)
    }

    pub fn create(
        &self,
        plural: &str,
        name: Option<&str>,
        state: Option<&Map<String, Value>>,
    ) -> Result<CmdResult> {
        let (container, plural) = self.locate_plural(plural)?;
        commands::create::run(&container, plural, name, state)
    }

    pub fn delete<S: AsRef<str>>(&self, plural: &str, names: &[S]) -> Result<CmdResult> {
        let (container, plural) = self.locate_plural(plural)?;
        commands::delete::run(&container, plural, names)
    }

    pub fn update(&self, set: &str, state: &Value) -> Result<CmdResult> {
        commands::update::run(&self.container(set)?, state)
    }

    /// Outline mesh in the Graphics set, named from the configuration.
    pub fn outline(&self) -> Result<CmdResult> {
        let graphics = self.open(&GRAPHICS)?;
        commands::outline::run(&graphics, &self.config.outline_mesh_name)
    }

    pub fn display(
        &self,
        path: &str,
        renderer: &mut dyn Renderer,
        window_id: Option<&str>,
    ) -> Result<CmdResult> {
        let (container, rest) = self.split_path(path)?;
        commands::display::run(&container, rest, renderer, window_id)
    }

    pub fn schema(&self, set: &str) -> Result<CmdResult> {
        commands::schema::run(definitions::definition_set(set)?)
    }

    /// Forget the state held for this API's session.
    pub fn close(&self) -> usize {
        self.registry.evict(self.session.id())
    }

    fn split_path<'p>(&self, path: &'p str) -> Result<(Container, &'p str)> {
        let path = path.trim_matches('/');
        let (set, rest) = path.split_once('/').unwrap_or((path, ""));
        Ok((self.container(set)?, rest))
    }

    fn locate_plural<'p>(&self, plural: &'p str) -> Result<(Container, &'p str)> {
        if plural.contains('/') {
            return self.split_path(plural);
        }
        for name in definitions::set_names() {
            let spec = definitions::definition_set(name)?;
            if definitions::named_definitions(spec)
                .iter()
                .any(|(p, _)| *p == plural)
            {
                return Ok((self.open(spec)?, plural));
            }
        }
        Err(PostvizError::NotFound(plural.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::RecordingRenderer;
    use crate::test_utils::sample_session;
    use crate::tree::ReadPolicy;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn api() -> PostvizApi {
        PostvizApi::new(Rc::new(sample_session()), PostvizConfig::default())
    }

    #[test]
    fn bare_plurals_find_their_set() {
        let api = api();
        api.create("Monitors", Some("m"), None).unwrap();
        api.create("Graphics/Contours", Some("c"), None).unwrap();
        assert_eq!(api.get("Plots/Monitors/m/monitor_set_name").unwrap().value, Some(json!("residual")));
        assert_eq!(api.get("Graphics/Contours/c/filled").unwrap().value, Some(json!(true)));
        assert!(matches!(
            api.create("Lights", None, None),
            Err(PostvizError::NotFound(_))
        ));
    }

    #[test]
    fn unknown_set_lists_the_known_ones() {
        let err = api().get("Scenes/x").unwrap_err();
        assert_eq!(
            err.to_string(),
            "'definition set' has no value 'Scenes'. The allowed values are: 'Graphics', 'Plots'."
        );
    }

    #[test]
    fn state_documents_round_trip_between_sessions() {
        let source = api();
        source.set("Graphics/Contours/c/field", &json!("temperature")).unwrap();
        source.set("Graphics/Surfaces/cut/definition/type", &json!("plane-surface")).unwrap();
        source.set("Plots/XYPlots/p/surfaces", &json!(["cut"])).unwrap();
        let state = source.state().unwrap();

        let target = api();
        target.load_state(&state).unwrap();
        assert_eq!(target.state().unwrap(), state);
    }

    #[test]
    fn plots_reference_graphics_surfaces() {
        let api = api();
        api.create("Surfaces", Some("cut"), None).unwrap();
        api.create("XYPlots", Some("p"), None).unwrap();
        let allowed = api
            .attr("Plots/XYPlots/p/surfaces", "allowed_values")
            .unwrap()
            .value
            .unwrap();
        assert!(allowed.as_array().unwrap().contains(&json!("cut")));

        let mut renderer = RecordingRenderer::default();
        api.set("Plots/XYPlots/p/surfaces", &json!(["cut", "wall"])).unwrap();
        api.display("Plots/XYPlots/p", &mut renderer, None).unwrap();
        assert_eq!(renderer.requests[0].surfaces, vec!["cut", "wall"]);
    }

    #[test]
    fn outline_uses_the_configured_name() {
        let config = PostvizConfig {
            outline_mesh_name: "hull".to_string(),
            ..Default::default()
        };
        let api = PostvizApi::new(Rc::new(sample_session()), config);
        api.outline().unwrap();
        assert_eq!(
            api.container("Graphics").unwrap().item_names("Meshes").unwrap(),
            vec!["hull"]
        );
    }

    #[test]
    fn strict_policy_comes_from_config() {
        let config = PostvizConfig {
            read_policy: ReadPolicy::Strict,
            ..Default::default()
        };
        let api = PostvizApi::new(Rc::new(sample_session()), config);
        api.set("Graphics/Contours/c/field", &json!("vorticity")).unwrap();
        assert!(matches!(
            api.get("Graphics/Contours/c/field"),
            Err(PostvizError::InvalidValue { .. })
        ));
    }

    #[test]
    fn close_forgets_session_state() {
        let api = api();
        api.create("Meshes", Some("m"), None).unwrap();
        assert_eq!(api.close(), 1);
        assert!(api.container("Graphics").unwrap().item_names("Meshes").unwrap().is_empty());
    }

    #[test]
    fn load_state_rejects_unknown_sets() {
        let err = api().load_state(&json!({"Scenes": {}})).unwrap_err();
        assert!(matches!(err, PostvizError::DisallowedValues { .. }));
    }
}
