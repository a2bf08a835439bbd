//! # Instance Trees
//!
//! A [`Tree`] is the materialized form of a root [`ObjectSpec`] bound to one
//! session. Nodes live in an arena and refer to each other by [`NodeId`]: a
//! parent owns its children through the arena, a child only keeps its parent's
//! id for path and context resolution.
//!
//! ## Node kinds
//!
//! | Kind | Holds |
//! |------|-------|
//! | object | children in declaration order (own first, then inherited) |
//! | property | value plus change callbacks |
//! | container | named objects in insertion order, plus `create`/`delete` commands |
//! | command | argument properties |
//!
//! Every node also records its *owner*, the nearest named object above it,
//! resolved once at construction. Cross references such as "the contour's
//! field" resolve against it instead of searching by type at read time.
//!
//! ## Reactivity
//!
//! Writing a property fires its callbacks in registration order, without
//! comparing against the previous value. A property declaring `reset_on`
//! registers a reset callback on each referenced property: when one of them
//! changes, the value is cleared (so a lazy default recomputes) and the reset
//! property's own callbacks fire in turn.
//!
//! The tree is single-threaded; share it as `Rc<RefCell<Tree>>`.

mod command;
mod container;
mod ctx;
mod object;
mod property;

pub use command::CommandArgs;
pub use container::{CREATE_COMMAND, DELETE_COMMAND};
pub use ctx::NodeCtx;

use crate::attributes::AttrValue;
use crate::error::{PostvizError, Result};
use crate::schema::{ChildSpec, CommandSpec, ObjectSpec, PropRef, PropertySpec};
use crate::session::Session;
use property::Callback;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use tracing::debug;

/// Container whose items are the local surfaces of a tree.
pub const LOCAL_SURFACES_CONTAINER: &str = "Surfaces";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What a read does when the stored value is not among the allowed values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadPolicy {
    /// Snap to the first allowed value and persist the correction.
    #[default]
    Repair,
    /// Fail with `InvalidValue`. Unset values are still returned as-is.
    Strict,
}

impl std::str::FromStr for ReadPolicy {
    type Err = PostvizError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "repair" => Ok(ReadPolicy::Repair),
            "strict" => Ok(ReadPolicy::Strict),
            other => Err(PostvizError::DisallowedValues {
                field: "read_policy".to_string(),
                value: other.to_string(),
                allowed: vec!["repair".to_string(), "strict".to_string()],
            }),
        }
    }
}

/// Where a tree finds the surfaces it may reference besides the solver's own.
pub enum LocalSurfaces {
    /// Items of this tree's own `Surfaces` container, if it has one.
    Own,
    /// Items of another tree's `Surfaces` container.
    Shared(Rc<RefCell<Tree>>),
}

/// Public classification of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeType {
    Object,
    NamedObject,
    Property,
    Container,
    Command,
}

pub(crate) enum NodeKind {
    Object {
        spec: &'static ObjectSpec,
        children: Vec<NodeId>,
    },
    Property {
        spec: &'static PropertySpec,
        value: AttrValue,
        callbacks: Vec<Callback>,
    },
    Container {
        spec: &'static ObjectSpec,
        items: Vec<(String, NodeId)>,
        commands: Vec<NodeId>,
    },
    Command {
        spec: &'static CommandSpec,
        args: Vec<NodeId>,
    },
}

pub(crate) struct Node {
    name: String,
    parent: Option<NodeId>,
    owner: Option<NodeId>,
    kind: NodeKind,
}

pub struct Tree {
    nodes: Vec<Option<Node>>,
    /// Slots of removed nodes, reused by later pushes.
    free: Vec<NodeId>,
    root: NodeId,
    session: Rc<dyn Session>,
    policy: ReadPolicy,
    local_surfaces: LocalSurfaces,
}

impl Tree {
    pub fn new(spec: &'static ObjectSpec, session: Rc<dyn Session>, policy: ReadPolicy) -> Result<Self> {
        let mut tree = Self {
            nodes: Vec::new(),
            free: Vec::new(),
            root: NodeId(0),
            session,
            policy,
            local_surfaces: LocalSurfaces::Own,
        };
        tree.root = tree.build_object(spec, spec.name.to_string(), None, None);
        tree.wire_resets(tree.root)?;
        debug!(root = spec.name, session = tree.session.id(), "built tree");
        Ok(tree)
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn root_spec(&self) -> Result<&'static ObjectSpec> {
        self.object_spec(self.root)
    }

    pub fn session(&self) -> Rc<dyn Session> {
        Rc::clone(&self.session)
    }

    pub fn policy(&self) -> ReadPolicy {
        self.policy
    }

    pub fn set_policy(&mut self, policy: ReadPolicy) {
        self.policy = policy;
    }

    pub fn set_local_surfaces(&mut self, provider: LocalSurfaces) {
        self.local_surfaces = provider;
    }

    pub fn local_surfaces(&self) -> &LocalSurfaces {
        &self.local_surfaces
    }

    // --- Construction ---

    fn push(&mut self, node: Node) -> NodeId {
        if let Some(id) = self.free.pop() {
            self.nodes[id.0] = Some(node);
            return id;
        }
        let id = NodeId(self.nodes.len());
        self.nodes.push(Some(node));
        id
    }

    /// Drop `removed` from the arena and forget every reset aimed at them,
    /// so their slots can be handed out again.
    pub(crate) fn release(&mut self, removed: &[NodeId]) {
        for id in removed {
            if let Some(slot) = self.nodes.get_mut(id.0) {
                if slot.take().is_some() {
                    self.free.push(*id);
                }
            }
        }
        for node in self.nodes.iter_mut().flatten() {
            if let NodeKind::Property { callbacks, .. } = &mut node.kind {
                callbacks.retain(|c| !matches!(c, Callback::Reset(target) if removed.contains(target)));
            }
        }
    }

    pub(crate) fn build_object(
        &mut self,
        spec: &'static ObjectSpec,
        name: String,
        parent: Option<NodeId>,
        owner: Option<NodeId>,
    ) -> NodeId {
        let id = self.push(Node {
            name,
            parent,
            owner,
            kind: NodeKind::Object {
                spec,
                children: Vec::new(),
            },
        });
        let child_owner = if spec.is_named() { Some(id) } else { owner };

        let mut built = Vec::new();
        for child in spec.all_children() {
            let child_id = match *child {
                ChildSpec::Property(p) => self.build_property(p, id, child_owner),
                ChildSpec::Object(o) => self.build_object(o, o.name.to_string(), Some(id), child_owner),
                ChildSpec::Command(c) => self.build_command(c, id, child_owner),
                ChildSpec::Named(o) => self.build_container(o, id, child_owner),
            };
            built.push(child_id);
        }

        if let Some(Some(Node {
            kind: NodeKind::Object { children, .. },
            ..
        })) = self.nodes.get_mut(id.0)
        {
            *children = built;
        }
        id
    }

    fn build_property(&mut self, spec: &'static PropertySpec, parent: NodeId, owner: Option<NodeId>) -> NodeId {
        let mut callbacks = Vec::new();
        if let Some(hook) = spec.on_change {
            callbacks.push(Callback::Hook(hook));
        }
        self.push(Node {
            name: spec.name.to_string(),
            parent: Some(parent),
            owner,
            kind: NodeKind::Property {
                spec,
                value: spec.default.to_value(),
                callbacks,
            },
        })
    }

    fn build_command(&mut self, spec: &'static CommandSpec, parent: NodeId, owner: Option<NodeId>) -> NodeId {
        let id = self.push(Node {
            name: spec.name.to_string(),
            parent: Some(parent),
            owner,
            kind: NodeKind::Command {
                spec,
                args: Vec::new(),
            },
        });
        let built: Vec<NodeId> = spec
            .args
            .iter()
            .map(|arg| self.build_property(arg, id, owner))
            .collect();
        if let Some(Some(Node {
            kind: NodeKind::Command { args, .. },
            ..
        })) = self.nodes.get_mut(id.0)
        {
            *args = built;
        }
        id
    }

    fn build_container(&mut self, spec: &'static ObjectSpec, parent: NodeId, owner: Option<NodeId>) -> NodeId {
        let id = self.push(Node {
            name: spec.plural.unwrap_or(spec.name).to_string(),
            parent: Some(parent),
            owner,
            kind: NodeKind::Container {
                spec,
                items: Vec::new(),
                commands: Vec::new(),
            },
        });
        let built = vec![
            self.build_command(&CREATE_COMMAND, id, owner),
            self.build_command(&DELETE_COMMAND, id, owner),
        ];
        if let Some(Some(Node {
            kind: NodeKind::Container { commands, .. },
            ..
        })) = self.nodes.get_mut(id.0)
        {
            *commands = built;
        }
        id
    }

    /// Register reset callbacks for every property in the subtree at `id`.
    pub(crate) fn wire_resets(&mut self, id: NodeId) -> Result<()> {
        for node in self.descendants(id)? {
            let spec = match &self.node(node)?.kind {
                NodeKind::Property { spec, .. } if !spec.reset_on.is_empty() => *spec,
                _ => continue,
            };
            for reference in spec.reset_on {
                let source = self.resolve_ref(node, *reference)?;
                self.push_callback(source, Callback::Reset(node))?;
            }
        }
        Ok(())
    }

    // --- Access ---

    pub(crate) fn node(&self, id: NodeId) -> Result<&Node> {
        self.nodes
            .get(id.0)
            .and_then(Option::as_ref)
            .ok_or_else(|| PostvizError::NotFound(format!("node {}", id)))
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> Result<&mut Node> {
        self.nodes
            .get_mut(id.0)
            .and_then(Option::as_mut)
            .ok_or_else(|| PostvizError::NotFound(format!("node {}", id)))
    }

    pub fn contains(&self, id: NodeId) -> bool {
        matches!(self.nodes.get(id.0), Some(Some(_)))
    }

    pub fn name(&self, id: NodeId) -> Result<&str> {
        Ok(&self.node(id)?.name)
    }

    pub fn parent(&self, id: NodeId) -> Result<Option<NodeId>> {
        Ok(self.node(id)?.parent)
    }

    /// Nearest named object above `id`.
    pub fn owner(&self, id: NodeId) -> Result<Option<NodeId>> {
        Ok(self.node(id)?.owner)
    }

    pub fn node_type(&self, id: NodeId) -> Result<NodeType> {
        Ok(match &self.node(id)?.kind {
            NodeKind::Object { spec, .. } if spec.is_named() && id != self.root => NodeType::NamedObject,
            NodeKind::Object { .. } => NodeType::Object,
            NodeKind::Property { .. } => NodeType::Property,
            NodeKind::Container { .. } => NodeType::Container,
            NodeKind::Command { .. } => NodeType::Command,
        })
    }

    /// Spec of an object node, or of the items of a container node.
    pub fn object_spec(&self, id: NodeId) -> Result<&'static ObjectSpec> {
        match &self.node(id)?.kind {
            NodeKind::Object { spec, .. } | NodeKind::Container { spec, .. } => Ok(*spec),
            _ => Err(PostvizError::NotFound(format!("{} is not an object", self.path(id)))),
        }
    }

    /// Children in declaration order; items for containers, arguments for commands.
    pub fn children(&self, id: NodeId) -> Result<Vec<NodeId>> {
        Ok(match &self.node(id)?.kind {
            NodeKind::Object { children, .. } => children.clone(),
            NodeKind::Container { items, .. } => items.iter().map(|(_, item)| *item).collect(),
            NodeKind::Command { args, .. } => args.clone(),
            NodeKind::Property { .. } => Vec::new(),
        })
    }

    pub fn child(&self, id: NodeId, name: &str) -> Result<NodeId> {
        let found = match &self.node(id)?.kind {
            NodeKind::Object { children, .. } => children
                .iter()
                .copied()
                .find(|c| self.name(*c).map(|n| n == name).unwrap_or(false)),
            NodeKind::Container { items, .. } => items.iter().find(|(n, _)| n == name).map(|(_, item)| *item),
            NodeKind::Command { args, .. } => args
                .iter()
                .copied()
                .find(|a| self.name(*a).map(|n| n == name).unwrap_or(false)),
            NodeKind::Property { .. } => None,
        };
        found.ok_or_else(|| PostvizError::UnknownChild {
            path: self.path(id),
            name: name.to_string(),
        })
    }

    /// `id` and everything below it, parents before children.
    pub(crate) fn descendants(&self, id: NodeId) -> Result<Vec<NodeId>> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            out.push(current);
            let mut below = self.children(current)?;
            if let NodeKind::Container { commands, .. } = &self.node(current)?.kind {
                below.extend(commands.iter().copied());
            }
            stack.extend(below.into_iter().rev());
        }
        Ok(out)
    }

    /// Slash-separated names from the root, e.g. `Graphics/Contours/contour-0/field`.
    pub fn path(&self, id: NodeId) -> String {
        let mut names = Vec::new();
        let mut current = Some(id);
        while let Some(node_id) = current {
            match self.node(node_id) {
                Ok(node) => {
                    names.push(node.name.as_str());
                    current = node.parent;
                }
                Err(_) => {
                    names.push("?");
                    break;
                }
            }
        }
        names.reverse();
        names.join("/")
    }

    /// Resolve a slash-separated path; the root name may be omitted.
    ///
    /// With `create_missing`, unknown items of containers are created on the
    /// way, matching container item access.
    pub fn resolve(&mut self, path: &str, create_missing: bool) -> Result<NodeId> {
        let root_name = self.name(self.root)?.to_string();
        let mut segments = path.split('/').filter(|s| !s.is_empty()).peekable();
        if segments.peek() == Some(&root_name.as_str()) {
            segments.next();
        }

        let mut current = self.root;
        for segment in segments {
            current = match self.node_type(current)? {
                NodeType::Container => match self.find_item(current, segment)? {
                    Some(item) => item,
                    None if create_missing => self.item(current, segment)?,
                    None => {
                        return Err(PostvizError::NotFound(format!(
                            "{}/{}",
                            self.path(current),
                            segment
                        )))
                    }
                },
                _ => self.child(current, segment)?,
            };
        }
        Ok(current)
    }

    pub(crate) fn resolve_ref(&self, from: NodeId, reference: PropRef) -> Result<NodeId> {
        let (base, path) = match reference {
            PropRef::Sibling(path) => (self.parent(from)?, path),
            PropRef::Owner(path) => (self.owner(from)?, path),
            PropRef::Ancestor(spec, path) => (self.ancestor_by_spec(from, spec)?, path),
        };
        let mut current = base.ok_or_else(|| {
            PostvizError::NotFound(format!("{} has no anchor for '{}'", self.path(from), path))
        })?;
        for segment in path.split('/').filter(|s| !s.is_empty()) {
            current = self.child(current, segment)?;
        }
        Ok(current)
    }

    // --- Ancestors ---

    /// Topmost node above `id`: the tree's root.
    pub fn get_root(&self, id: NodeId) -> Result<NodeId> {
        let mut current = id;
        while let Some(parent) = self.parent(current)? {
            current = parent;
        }
        Ok(current)
    }

    /// Nearest object above `id` whose spec is, or derives from, `spec`.
    pub fn ancestor_by_spec(&self, id: NodeId, spec: &'static ObjectSpec) -> Result<Option<NodeId>> {
        let mut current = self.parent(id)?;
        while let Some(node_id) = current {
            let node = self.node(node_id)?;
            if let NodeKind::Object { spec: found, .. } = &node.kind {
                if found.inherits(spec) {
                    return Ok(Some(node_id));
                }
            }
            current = node.parent;
        }
        Ok(None)
    }

    // --- Local surfaces ---

    /// Names of the items of this tree's own `Surfaces` container.
    pub fn own_surface_names(&self) -> Result<Vec<String>> {
        match self.child(self.root, LOCAL_SURFACES_CONTAINER) {
            Ok(container) => self.item_names(container),
            Err(PostvizError::UnknownChild { .. }) => Ok(Vec::new()),
            Err(e) => Err(e),
        }
    }

    /// Local surfaces visible to this tree, from its configured provider.
    pub fn local_surface_names(&self) -> Result<Vec<String>> {
        match &self.local_surfaces {
            LocalSurfaces::Own => self.own_surface_names(),
            LocalSurfaces::Shared(provider) => provider
                .try_borrow()
                .map_err(|_| PostvizError::State("Local surface provider is busy".to_string()))?
                .own_surface_names(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{sample_session, toy};

    fn toy_tree() -> Tree {
        Tree::new(&toy::ROOT, Rc::new(sample_session()), ReadPolicy::Repair).unwrap()
    }

    #[test]
    fn root_is_named_after_spec() {
        let tree = toy_tree();
        assert_eq!(tree.name(tree.root()).unwrap(), "Toys");
        assert_eq!(tree.node_type(tree.root()).unwrap(), NodeType::Object);
    }

    #[test]
    fn containers_are_exposed_under_plural() {
        let tree = toy_tree();
        let container = tree.child(tree.root(), "Things").unwrap();
        assert_eq!(tree.node_type(container).unwrap(), NodeType::Container);
        assert!(tree.item_names(container).unwrap().is_empty());
    }

    #[test]
    fn paths_join_names_from_root() {
        let mut tree = toy_tree();
        let id = tree.resolve("Things/t-7/shape/sides", true).unwrap();
        assert_eq!(tree.path(id), "Toys/Things/t-7/shape/sides");
        assert_eq!(tree.resolve("Toys/Things/t-7/shape/sides", false).unwrap(), id);
    }

    #[test]
    fn resolve_without_create_reports_missing_item() {
        let mut tree = toy_tree();
        let err = tree.resolve("Things/ghost", false).unwrap_err();
        assert!(matches!(err, PostvizError::NotFound(_)));
    }

    #[test]
    fn unknown_child_names_parent_path() {
        let mut tree = toy_tree();
        let err = tree.resolve("Things/t-0/colour", true).unwrap_err();
        assert_eq!(err.to_string(), "Toys/Things/t-0 has no child named 'colour'");
    }

    #[test]
    fn owner_is_nearest_named_object() {
        let mut tree = toy_tree();
        let thing = tree.resolve("Things/t-0", true).unwrap();
        let sides = tree.resolve("Things/t-0/shape/sides", false).unwrap();
        assert_eq!(tree.owner(sides).unwrap(), Some(thing));
        assert_eq!(tree.ancestor_by_spec(sides, &toy::THING).unwrap(), Some(thing));
        assert_eq!(tree.get_root(sides).unwrap(), tree.root());
    }

    #[test]
    fn inherited_children_follow_own_children() {
        let mut tree = toy_tree();
        let thing = tree.resolve("Things/t-0", true).unwrap();
        let names: Vec<String> = tree
            .children(thing)
            .unwrap()
            .into_iter()
            .map(|c| tree.name(c).unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["color", "label", "shape", "size", "stamp", "paint", "tag"]);
    }

    #[test]
    fn own_surfaces_are_empty_without_container() {
        let tree = toy_tree();
        assert!(tree.own_surface_names().unwrap().is_empty());
        assert!(tree.local_surface_names().unwrap().is_empty());
    }

    #[test]
    fn read_policy_parses() {
        assert_eq!("strict".parse::<ReadPolicy>().unwrap(), ReadPolicy::Strict);
        assert!("lenient".parse::<ReadPolicy>().is_err());
        assert_eq!(ReadPolicy::default(), ReadPolicy::Repair);
    }
}
