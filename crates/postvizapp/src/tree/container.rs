use super::{CommandArgs, NodeCtx, NodeId, NodeKind, Tree};
use crate::attributes::{AttrValue, ValueKind};
use crate::error::{PostvizError, Result};
use crate::schema::{CommandSpec, Literal, PropertySpec};
use serde_json::Value;
use tracing::debug;

static CREATE_ARGS: &[PropertySpec] = &[PropertySpec::new("name", ValueKind::Str)
    .help("Name of the new object. Generated when omitted.")];

static DELETE_ARGS: &[PropertySpec] = &[PropertySpec::new("names", ValueKind::StrList)
    .help("Objects to delete.")
    .default(Literal::List(&[]))
    .allowed(container_keys)];

/// `create` command attached to every container.
pub static CREATE_COMMAND: CommandSpec = CommandSpec::new("create", execute_create)
    .help("Create a new object, optionally with a name.")
    .args(CREATE_ARGS);

/// `delete` command attached to every container.
pub static DELETE_COMMAND: CommandSpec = CommandSpec::new("delete", execute_delete)
    .help("Delete the named objects.")
    .args(DELETE_ARGS);

fn container_keys(ctx: &mut NodeCtx<'_>) -> Result<Vec<String>> {
    let command = ctx.parent()?;
    let container = ctx
        .tree()
        .parent(command)?
        .ok_or_else(|| PostvizError::NotFound(format!("{} has no container", ctx.path())))?;
    ctx.tree().item_names(container)
}

fn execute_create(ctx: &mut NodeCtx<'_>, args: &CommandArgs) -> Result<AttrValue> {
    let container = ctx.parent()?;
    let tree = ctx.tree();
    let name = match args.get("name").and_then(AttrValue::as_str) {
        Some(name) => name.to_string(),
        None => tree.unique_name(container)?,
    };
    tree.item(container, &name)?;
    Ok(AttrValue::Str(name))
}

fn execute_delete(ctx: &mut NodeCtx<'_>, args: &CommandArgs) -> Result<AttrValue> {
    let container = ctx.parent()?;
    let names = args
        .get("names")
        .map(AttrValue::members)
        .unwrap_or_default();
    for name in &names {
        ctx.tree().remove_item(container, name)?;
    }
    Ok(AttrValue::Null)
}

impl Tree {
    /// Item names in insertion order.
    pub fn item_names(&self, id: NodeId) -> Result<Vec<String>> {
        match &self.node(id)?.kind {
            NodeKind::Container { items, .. } => Ok(items.iter().map(|(name, _)| name.clone()).collect()),
            _ => Err(not_a_container(self, id)),
        }
    }

    pub fn find_item(&self, id: NodeId, name: &str) -> Result<Option<NodeId>> {
        match &self.node(id)?.kind {
            NodeKind::Container { items, .. } => {
                Ok(items.iter().find(|(n, _)| n == name).map(|(_, item)| *item))
            }
            _ => Err(not_a_container(self, id)),
        }
    }

    /// Item access: returns the named item, creating it with defaults on a miss.
    pub fn item(&mut self, id: NodeId, name: &str) -> Result<NodeId> {
        if let Some(existing) = self.find_item(id, name)? {
            return Ok(existing);
        }

        let spec = self.object_spec(id)?;
        let owner = self.owner(id)?;
        let item = self.build_object(spec, name.to_string(), Some(id), owner);
        if let NodeKind::Container { items, .. } = &mut self.node_mut(id)?.kind {
            items.push((name.to_string(), item));
        }
        self.wire_resets(item)?;
        debug!(path = %self.path(item), "created item");

        if let Some(hook) = spec.on_create {
            hook(&mut NodeCtx::new(self, item))?;
        }
        Ok(item)
    }

    /// Create or fetch the item `name` and apply `state` to it.
    pub fn set_item(&mut self, id: NodeId, name: &str, state: &Value) -> Result<NodeId> {
        let item = self.item(id, name)?;
        self.update(item, state)?;
        Ok(item)
    }

    /// Remove an item and everything below it.
    pub fn remove_item(&mut self, id: NodeId, name: &str) -> Result<()> {
        let spec = self.object_spec(id)?;
        let item = self
            .find_item(id, name)?
            .ok_or_else(|| PostvizError::NotFound(format!("{}/{}", self.path(id), name)))?;

        if let NodeKind::Container { items, .. } = &mut self.node_mut(id)?.kind {
            items.retain(|(n, _)| n != name);
        }
        let removed = self.descendants(item)?;
        self.release(&removed);
        debug!(container = %self.path(id), item = name, "removed item");

        if let Some(hook) = spec.on_delete {
            hook(&mut NodeCtx::new(self, id), name)?;
        }
        Ok(())
    }

    /// `<name>-<n>` with the lowest `n` not already taken.
    pub fn unique_name(&self, id: NodeId) -> Result<String> {
        let prefix = self.object_spec(id)?.name.to_lowercase();
        let taken = self.item_names(id)?;
        let mut n = 0usize;
        loop {
            let candidate = format!("{}-{}", prefix, n);
            if !taken.contains(&candidate) {
                return Ok(candidate);
            }
            n += 1;
        }
    }

    /// The `create` or `delete` command of a container.
    pub fn container_command(&self, id: NodeId, name: &str) -> Result<NodeId> {
        match &self.node(id)?.kind {
            NodeKind::Container { commands, .. } => commands
                .iter()
                .copied()
                .find(|c| self.name(*c).map(|n| n == name).unwrap_or(false))
                .ok_or_else(|| PostvizError::UnknownChild {
                    path: self.path(id),
                    name: name.to_string(),
                }),
            _ => Err(not_a_container(self, id)),
        }
    }
}

fn not_a_container(tree: &Tree, id: NodeId) -> PostvizError {
    PostvizError::NotFound(format!("{} is not a container", tree.path(id)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{sample_session, toy};
    use crate::tree::ReadPolicy;
    use pretty_assertions::assert_eq;
    use serde_json::{json, Map};
    use std::rc::Rc;

    fn things() -> (Tree, NodeId) {
        let tree = Tree::new(&toy::ROOT, Rc::new(sample_session()), ReadPolicy::Repair).unwrap();
        let things = tree.child(tree.root(), "Things").unwrap();
        (tree, things)
    }

    fn kwargs(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn item_access_creates_with_defaults() {
        let (mut tree, things) = things();
        let item = tree.item(things, "alpha").unwrap();
        assert_eq!(tree.item_names(things).unwrap(), vec!["alpha"]);
        assert_eq!(tree.item(things, "alpha").unwrap(), item);
        let color = tree.child(item, "color").unwrap();
        assert_eq!(tree.read(color).unwrap(), AttrValue::from("red"));
    }

    #[test]
    fn unique_name_fills_the_lowest_gap() {
        let (mut tree, things) = things();
        tree.item(things, "t-0").unwrap();
        tree.item(things, "t-2").unwrap();
        assert_eq!(tree.unique_name(things).unwrap(), "t-1");
    }

    #[test]
    fn create_command_generates_names() {
        let (mut tree, things) = things();
        let create = tree.container_command(things, "create").unwrap();
        assert_eq!(tree.invoke(create, &Map::new()).unwrap(), AttrValue::from("t-0"));
        assert_eq!(tree.invoke(create, &Map::new()).unwrap(), AttrValue::from("t-1"));
        assert_eq!(
            tree.invoke(create, &kwargs(json!({"name": "mine"}))).unwrap(),
            AttrValue::from("mine")
        );
        assert_eq!(tree.item_names(things).unwrap(), vec!["t-0", "t-1", "mine"]);
    }

    #[test]
    fn delete_command_only_accepts_existing_names() {
        let (mut tree, things) = things();
        tree.item(things, "a").unwrap();
        tree.item(things, "b").unwrap();
        let delete = tree.container_command(things, "delete").unwrap();

        let err = tree
            .invoke(delete, &kwargs(json!({"names": ["a", "zz"]})))
            .unwrap_err();
        assert!(matches!(err, PostvizError::DisallowedValues { .. }));
        assert_eq!(tree.item_names(things).unwrap(), vec!["a", "b"]);

        tree.invoke(delete, &kwargs(json!({"names": ["a"]}))).unwrap();
        assert_eq!(tree.item_names(things).unwrap(), vec!["b"]);
    }

    #[test]
    fn hooks_run_on_create_and_delete() {
        let (mut tree, things) = things();
        let created = tree.child(tree.root(), "created").unwrap();
        let deleted = tree.child(tree.root(), "deleted").unwrap();
        tree.item(things, "a").unwrap();
        tree.item(things, "a").unwrap();
        tree.item(things, "b").unwrap();
        tree.remove_item(things, "a").unwrap();
        assert_eq!(tree.read(created).unwrap(), AttrValue::Int(2));
        assert_eq!(tree.read(deleted).unwrap(), AttrValue::Int(1));
    }

    #[test]
    fn removed_items_are_gone_from_the_arena() {
        let (mut tree, things) = things();
        let item = tree.item(things, "a").unwrap();
        let sides = tree.resolve("Things/a/shape/sides", false).unwrap();
        tree.remove_item(things, "a").unwrap();
        assert!(!tree.contains(item));
        assert!(!tree.contains(sides));

        let err = tree.remove_item(things, "a").unwrap_err();
        assert_eq!(err.to_string(), "Not found: Toys/Things/a");
    }

    fn subtree(tree: &Tree, id: NodeId) -> Vec<NodeId> {
        let mut ids = tree.descendants(id).unwrap();
        ids.sort();
        ids
    }

    #[test]
    fn create_delete_cycles_reuse_arena_slots() {
        let (mut tree, things) = things();
        let first = tree.item(things, "a").unwrap();
        let slots = subtree(&tree, first);
        tree.remove_item(things, "a").unwrap();

        for _ in 0..50 {
            tree.item(things, "a").unwrap();
            tree.remove_item(things, "a").unwrap();
        }
        let again = tree.item(things, "b").unwrap();
        assert_eq!(subtree(&tree, again), slots);
    }

    #[test]
    fn removing_an_item_drops_resets_aimed_at_it() {
        let (mut tree, things) = things();
        let thing = tree.item(things, "a").unwrap();
        let size = tree.child(thing, "size").unwrap();
        let resets = |tree: &Tree| match &tree.node(size).unwrap().kind {
            NodeKind::Property { callbacks, .. } => callbacks.len(),
            _ => 0,
        };
        let before = resets(&tree);

        tree.resolve("Things/a/shape/Parts/p", true).unwrap();
        assert_eq!(resets(&tree), before + 1);

        let parts = tree.resolve("Things/a/shape/Parts", false).unwrap();
        tree.remove_item(parts, "p").unwrap();
        assert_eq!(resets(&tree), before);
        tree.set_state(size, AttrValue::Float(8.0)).unwrap();
    }

    #[test]
    fn set_item_applies_state() {
        let (mut tree, things) = things();
        let item = tree
            .set_item(things, "g", &json!({"color": "green"}))
            .unwrap();
        let color = tree.child(item, "color").unwrap();
        assert_eq!(tree.read(color).unwrap(), AttrValue::from("green"));
    }
}
