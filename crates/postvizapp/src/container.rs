//! # Session Containers
//!
//! A [`Container`] is the user-facing handle on one definition set (Graphics
//! or Plots) for one session. Handles are cheap: the tree behind them lives in
//! the [`SessionRegistry`], so every handle opened for the same set and
//! session sees the same objects.
//!
//! Paths passed to a container are relative to its root (`Contours/c/field`);
//! a leading set name (`Graphics/Contours/c/field`) is accepted too.
//!
//! | Operation | Missing items |
//! |-----------|---------------|
//! | [`Container::get`], [`Container::attribute`] | `NotFound` |
//! | [`Container::set`] | created with defaults, then written |
//!
//! Plots reference local surfaces only through an explicit provider, see
//! [`Container::use_local_surfaces_of`].

use crate::attributes::{AttrValue, AttributeName};
use crate::error::{PostvizError, Result};
use crate::registry::SessionRegistry;
use crate::render::{self, Renderer};
use crate::schema::ObjectSpec;
use crate::session::Session;
use crate::tree::{LocalSurfaces, NodeId, NodeType, Tree};
use serde_json::{Map, Value};
use std::cell::{RefCell, RefMut};
use std::rc::Rc;
use tracing::debug;

const MESHES: &str = "Meshes";

#[derive(Clone)]
pub struct Container {
    spec: &'static ObjectSpec,
    tree: Rc<RefCell<Tree>>,
}

impl Container {
    /// The container of `set` for `session`, shared through `registry`.
    pub fn open(
        registry: &SessionRegistry,
        set: &'static ObjectSpec,
        session: Rc<dyn Session>,
    ) -> Result<Self> {
        let tree = registry.open(set, session)?;
        Ok(Self { spec: set, tree })
    }

    pub fn name(&self) -> &'static str {
        self.spec.name
    }

    pub fn spec(&self) -> &'static ObjectSpec {
        self.spec
    }

    /// Let this container's objects reference the local surfaces of `provider`.
    pub fn use_local_surfaces_of(&self, provider: &Container) -> Result<()> {
        if Rc::ptr_eq(&self.tree, &provider.tree) {
            self.tree_mut()?.set_local_surfaces(LocalSurfaces::Own);
        } else {
            self.tree_mut()?
                .set_local_surfaces(LocalSurfaces::Shared(Rc::clone(&provider.tree)));
        }
        Ok(())
    }

    /// State of every active object, optionally with declared attributes.
    pub fn state(&self, show_attributes: bool) -> Result<Value> {
        let mut tree = self.tree_mut()?;
        let root = tree.root();
        tree.get_state(root, show_attributes)
    }

    /// Apply a (partial) state, creating missing items.
    pub fn update(&self, state: &Value) -> Result<()> {
        let mut tree = self.tree_mut()?;
        let root = tree.root();
        tree.update(root, state)
    }

    pub fn item_names(&self, plural: &str) -> Result<Vec<String>> {
        let tree = self.tree_mut()?;
        let container = named_container(&tree, plural)?;
        tree.item_names(container)
    }

    /// Create an item through the container's `create` command. Without a
    /// name, a unique one is generated. Returns the item name.
    pub fn create(&self, plural: &str, name: Option<&str>) -> Result<String> {
        let mut tree = self.tree_mut()?;
        let container = named_container(&tree, plural)?;
        let command = tree.container_command(container, "create")?;
        let mut kwargs = Map::new();
        if let Some(name) = name {
            kwargs.insert("name".to_string(), Value::from(name));
        }
        match tree.invoke(command, &kwargs)? {
            AttrValue::Str(created) => Ok(created),
            other => Err(PostvizError::State(format!(
                "create returned {} instead of a name",
                other.kind_name()
            ))),
        }
    }

    /// Create an item under a unique name with an initial state.
    ///
    /// Every key must be part of the new item's state; otherwise the item is
    /// removed again and the call fails with `UnexpectedArgument`. A failing
    /// write removes it too.
    pub fn create_with(&self, plural: &str, state: &Map<String, Value>) -> Result<String> {
        let mut tree = self.tree_mut()?;
        let container = named_container(&tree, plural)?;
        let name = tree.unique_name(container)?;
        let item = tree.item(container, &name)?;

        let known = tree.get_state(item, false)?;
        if let Some(key) = state
            .keys()
            .find(|key| known.get(key.as_str()).is_none())
        {
            tree.remove_item(container, &name)?;
            return Err(PostvizError::UnexpectedArgument(key.clone()));
        }

        let mut state = state.clone();
        if let Some(Value::String(single)) = state.get("surfaces") {
            let list = Value::Array(vec![Value::String(single.clone())]);
            state.insert("surfaces".to_string(), list);
        }
        if let Err(e) = tree.update(item, &Value::Object(state)) {
            tree.remove_item(container, &name)?;
            return Err(e);
        }
        debug!(item = %tree.path(item), "created item with state");
        Ok(name)
    }

    /// Delete items through the container's `delete` command. Every name must
    /// exist; nothing is deleted otherwise.
    pub fn delete<S: AsRef<str>>(&self, plural: &str, names: &[S]) -> Result<()> {
        let mut tree = self.tree_mut()?;
        let container = named_container(&tree, plural)?;
        let command = tree.container_command(container, "delete")?;
        let names: Vec<Value> = names.iter().map(|n| Value::from(n.as_ref())).collect();
        let mut kwargs = Map::new();
        kwargs.insert("names".to_string(), Value::Array(names));
        tree.invoke(command, &kwargs)?;
        Ok(())
    }

    /// Value of the node at `path`: a property's value, or an object's state.
    pub fn get(&self, path: &str) -> Result<Value> {
        let mut tree = self.tree_mut()?;
        let id = locate(&mut tree, path, false)?;
        match tree.node_type(id)? {
            NodeType::Property => Ok(tree.read(id)?.to_json()),
            NodeType::Command => Err(PostvizError::State(format!(
                "{} is a command; invoke it instead",
                tree.path(id)
            ))),
            _ => tree.get_state(id, false),
        }
    }

    /// Write the node at `path`, creating missing items on the way.
    pub fn set(&self, path: &str, value: &Value) -> Result<()> {
        let mut tree = self.tree_mut()?;
        let id = locate(&mut tree, path, true)?;
        match tree.node_type(id)? {
            NodeType::Property => tree.set_json(id, value),
            NodeType::Command => Err(PostvizError::State(format!(
                "{} is a command; invoke it instead",
                tree.path(id)
            ))),
            _ => tree.update(id, value),
        }
    }

    /// Declared attribute `attribute` of the node at `path`.
    pub fn attribute(&self, path: &str, attribute: &str) -> Result<Value> {
        let attr = AttributeName::parse(attribute)?;
        let mut tree = self.tree_mut()?;
        let id = locate(&mut tree, path, false)?;
        tree.attribute(id, attr)
    }

    /// Invoke the command at `path`. A container's own commands are addressed
    /// as `<plural>/create` and `<plural>/delete`.
    pub fn invoke(&self, path: &str, kwargs: &Map<String, Value>) -> Result<Value> {
        let mut tree = self.tree_mut()?;
        let id = match path.trim_matches('/').rsplit_once('/') {
            Some((parent, command @ ("create" | "delete"))) => {
                let parent = locate(&mut tree, parent, false)?;
                if tree.node_type(parent)? == NodeType::Container {
                    tree.container_command(parent, command)?
                } else {
                    locate(&mut tree, path, false)?
                }
            }
            _ => locate(&mut tree, path, false)?,
        };
        Ok(tree.invoke(id, kwargs)?.to_json())
    }

    /// Create, or reuse, the mesh `name` over every boundary zone of the
    /// solver.
    pub fn add_outline_mesh(&self, name: &str) -> Result<String> {
        let mut tree = self.tree_mut()?;
        let meshes = named_container(&tree, MESHES)?;
        let zones: Vec<String> = tree
            .session()
            .surfaces()?
            .into_iter()
            .filter(|s| s.is_boundary_zone())
            .map(|s| s.name)
            .collect();

        let mesh = tree.item(meshes, name)?;
        let surfaces = tree.child(mesh, "surfaces")?;
        tree.set_state(surfaces, AttrValue::List(zones))?;
        debug!(mesh = name, "outline mesh ready");
        Ok(name.to_string())
    }

    /// Render the graphics or plot object at `path`.
    pub fn display(
        &self,
        path: &str,
        renderer: &mut dyn Renderer,
        window_id: Option<&str>,
    ) -> Result<()> {
        let mut tree = self.tree_mut()?;
        let id = locate(&mut tree, path, false)?;
        render::display(&mut tree, id, renderer, window_id)
    }

    fn tree_mut(&self) -> Result<RefMut<'_, Tree>> {
        self.tree
            .try_borrow_mut()
            .map_err(|_| PostvizError::State(format!("{} is already in use", self.spec.name)))
    }
}

fn named_container(tree: &Tree, plural: &str) -> Result<NodeId> {
    let root = tree.root();
    let id = tree.child(root, plural).map_err(|_| {
        PostvizError::NotFound(format!("{}/{}", tree.path(root), plural))
    })?;
    if tree.node_type(id)? == NodeType::Container {
        Ok(id)
    } else {
        Err(PostvizError::NotFound(format!("{}/{}", tree.path(root), plural)))
    }
}

fn locate(tree: &mut Tree, path: &str, create_missing: bool) -> Result<NodeId> {
    let path = path.trim_matches('/');
    if path.is_empty() {
        return Ok(tree.root());
    }
    tree.resolve(path, create_missing)
}
