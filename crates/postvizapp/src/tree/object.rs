use super::{NodeCtx, NodeId, NodeKind, NodeType, Tree};
use crate::attributes::AttributeName;
use crate::error::{PostvizError, Result};
use serde_json::{json, Map, Value};
use tracing::trace;

impl Tree {
    /// Nodes are active unless their spec declares `is_active` and it says no.
    pub fn is_active(&mut self, id: NodeId) -> Result<bool> {
        let active_fn = match &self.node(id)?.kind {
            NodeKind::Object { spec, .. } => spec.is_active,
            NodeKind::Property { spec, .. } => spec.is_active,
            NodeKind::Container { .. } | NodeKind::Command { .. } => None,
        };
        match active_fn {
            Some(f) => f(&mut NodeCtx::new(self, id)),
            None => Ok(true),
        }
    }

    /// Apply a state mapping onto the node at `id`.
    ///
    /// Object keys listed in the object's `sort_by` (or `include`) are applied
    /// first, in that order, so interdependent properties are set safely. Every
    /// key is resolved before anything is written. Read-only properties are
    /// skipped so that a serialized state can be applied back.
    pub fn update(&mut self, id: NodeId, value: &Value) -> Result<()> {
        let node_type = self.node_type(id)?;
        if node_type == NodeType::Property {
            return self.set_json(id, value);
        }

        let map = value.as_object().ok_or_else(|| PostvizError::TypeMismatch {
            path: self.path(id),
            expected: "object".to_string(),
            found: json_kind(value).to_string(),
        })?;

        match node_type {
            NodeType::Container => {
                for (name, item_state) in map {
                    self.set_item(id, name, item_state)?;
                }
                Ok(())
            }
            _ => {
                let order = self.update_order(id)?;
                let mut keys: Vec<&String> = order
                    .iter()
                    .filter_map(|key| map.get_key_value(*key).map(|(k, _)| k))
                    .collect();
                keys.extend(map.keys().filter(|k| !order.contains(&k.as_str())));

                let targets = keys
                    .into_iter()
                    .map(|key| self.child(id, key).map(|child| (child, key)))
                    .collect::<Result<Vec<_>>>()?;

                for (child, key) in targets {
                    let Some(child_state) = map.get(key) else {
                        continue;
                    };
                    if self.node_type(child)? == NodeType::Property {
                        if self.property_spec(child)?.is_read_only {
                            trace!(path = %self.path(child), "skipping read-only property");
                            continue;
                        }
                        self.set_json(child, child_state)?;
                    } else {
                        self.update(child, child_state)?;
                    }
                }
                Ok(())
            }
        }
    }

    fn update_order(&self, id: NodeId) -> Result<&'static [&'static str]> {
        Ok(match &self.node(id)?.kind {
            NodeKind::Object { spec, .. } => spec.update_order(),
            _ => &[],
        })
    }

    /// Serialize the node at `id`.
    ///
    /// Objects map child names to child states, skipping inactive children and
    /// names starting with `_`; an inactive object serializes as `null`.
    /// Commands map argument names to their current values and containers map
    /// item names to the states of their active items. With `show_attributes`,
    /// every declared attribute of a property is added as `name.attribute`.
    pub fn get_state(&mut self, id: NodeId, show_attributes: bool) -> Result<Value> {
        match self.node_type(id)? {
            NodeType::Property => Ok(self.read(id)?.to_json()),
            NodeType::Command => self.command_state(id),
            NodeType::Container => self.container_state(id, show_attributes),
            NodeType::Object | NodeType::NamedObject => self.object_state(id, show_attributes),
        }
    }

    fn object_state(&mut self, id: NodeId, show_attributes: bool) -> Result<Value> {
        if !self.is_active(id)? {
            return Ok(Value::Null);
        }

        let mut state = Map::new();
        for child in self.children(id)? {
            let name = self.name(child)?.to_string();
            if name.starts_with('_') {
                continue;
            }
            match self.node_type(child)? {
                NodeType::Property => {
                    if !self.is_active(child)? {
                        continue;
                    }
                    let value = self.read(child)?;
                    state.insert(name.clone(), value.to_json());
                    if show_attributes {
                        for attr in self.declared_attributes(child)? {
                            if attr.is_hook() {
                                continue;
                            }
                            let attr_value = self.attribute(child, attr)?;
                            state.insert(format!("{}.{}", name, attr), attr_value);
                        }
                    }
                }
                NodeType::Object | NodeType::NamedObject => {
                    if self.is_active(child)? {
                        let child_state = self.object_state(child, show_attributes)?;
                        state.insert(name, child_state);
                    }
                }
                NodeType::Command => {
                    let args = self.command_state(child)?;
                    state.insert(name, args);
                }
                NodeType::Container => {
                    let items = self.container_state(child, show_attributes)?;
                    state.insert(name, items);
                }
            }
        }
        Ok(Value::Object(state))
    }

    fn command_state(&mut self, id: NodeId) -> Result<Value> {
        let mut args = Map::new();
        for arg in self.children(id)? {
            let name = self.name(arg)?.to_string();
            let value = self.read(arg)?;
            args.insert(name, value.to_json());
        }
        Ok(Value::Object(args))
    }

    fn container_state(&mut self, id: NodeId, show_attributes: bool) -> Result<Value> {
        let mut items = Map::new();
        for item in self.children(id)? {
            if !self.is_active(item)? {
                continue;
            }
            let name = self.name(item)?.to_string();
            let item_state = self.object_state(item, show_attributes)?;
            items.insert(name, item_state);
        }
        Ok(Value::Object(items))
    }

    /// Attributes the node at `id` declares.
    pub fn declared_attributes(&self, id: NodeId) -> Result<Vec<AttributeName>> {
        Ok(match &self.node(id)?.kind {
            NodeKind::Property { spec, .. } => spec.attributes(),
            NodeKind::Object { spec, .. } => spec.attributes(),
            NodeKind::Command { spec, .. } if !spec.help.is_empty() => vec![AttributeName::HelpStr],
            NodeKind::Command { .. } | NodeKind::Container { .. } => Vec::new(),
        })
    }

    /// Evaluate one attribute of the node at `id`.
    ///
    /// Fails with a disallowed-value error listing the declared attributes when
    /// the node does not declare `attr`.
    pub fn attribute(&mut self, id: NodeId, attr: AttributeName) -> Result<Value> {
        let declared = self.declared_attributes(id)?;
        if !declared.contains(&attr) {
            return Err(PostvizError::DisallowedValues {
                field: "attribute".to_string(),
                value: attr.to_string(),
                allowed: declared.iter().map(|a| a.to_string()).collect(),
            });
        }

        let value = match attr {
            AttributeName::Range => match self.range(id)? {
                Some((min, max)) => json!([min, max]),
                None => Value::Null,
            },
            AttributeName::AllowedValues => json!(self.allowed_values(id)?.unwrap_or_default()),
            AttributeName::IsActive => json!(self.is_active(id)?),
            AttributeName::IsReadOnly => json!(self.property_spec(id)?.is_read_only),
            AttributeName::HelpStr => json!(self.help(id)?),
            AttributeName::Include => json!(self.object_spec(id)?.include),
            AttributeName::SortBy => json!(self.object_spec(id)?.sort_by),
            // Hooks have no value; report that one is attached.
            AttributeName::OnChange | AttributeName::OnCreate => json!(true),
            presentational => json!(self.presentation(id, presentational)?),
        };
        Ok(value)
    }

    fn help(&self, id: NodeId) -> Result<&'static str> {
        Ok(match &self.node(id)?.kind {
            NodeKind::Property { spec, .. } => spec.help,
            NodeKind::Object { spec, .. } | NodeKind::Container { spec, .. } => spec.help,
            NodeKind::Command { spec, .. } => spec.help,
        })
    }

    fn presentation(&self, id: NodeId, attr: AttributeName) -> Result<Option<&'static str>> {
        Ok(match &self.node(id)?.kind {
            NodeKind::Property { spec, .. } => spec.presentation_value(attr),
            NodeKind::Object { spec, .. } => spec.presentation_value(attr),
            _ => None,
        })
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "str",
        Value::Array(_) => "list",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{sample_session, toy};
    use crate::attributes::AttrValue;
    use crate::tree::ReadPolicy;
    use pretty_assertions::assert_eq;
    use std::rc::Rc;

    fn tree() -> Tree {
        Tree::new(&toy::ROOT, Rc::new(sample_session()), ReadPolicy::Repair).unwrap()
    }

    #[test]
    fn state_lists_active_children_in_declaration_order() {
        let mut tree = tree();
        let thing = tree.resolve("Things/t-0", true).unwrap();
        let state = tree.get_state(thing, false).unwrap();
        assert_eq!(
            state,
            json!({
                "color": "red",
                "label": "red thing",
                "shape": {"sides": 3, "Parts": {}},
                "size": 1.0,
                "stamp": "v1",
                "paint": {"color": "red", "coats": 1.0}
            })
        );
    }

    #[test]
    fn inactive_property_is_omitted_until_activated() {
        let mut tree = tree();
        let thing = tree.resolve("Things/t-0", true).unwrap();
        let color = tree.child(thing, "color").unwrap();
        tree.set_state(color, "blue".into()).unwrap();
        let state = tree.get_state(thing, false).unwrap();
        assert_eq!(state["tag"], json!(true));
    }

    #[test]
    fn show_attributes_widens_keys() {
        let mut tree = tree();
        let thing = tree.resolve("Things/t-0", true).unwrap();
        let state = tree.get_state(thing, true).unwrap();
        assert_eq!(state["color.allowed_values"], json!(["red", "green", "blue"]));
        assert_eq!(state["color.help_str"], json!("Color of the thing."));
        assert_eq!(state["shape"]["sides.range"], json!([3.0, 12.0]));
        assert_eq!(state["shape"]["sides.widget"], json!("spin"));
        assert!(state.get("size.on_change").is_none());
    }

    #[test]
    fn update_round_trips_between_items() {
        let mut tree = tree();
        let a = tree.resolve("Things/a", true).unwrap();
        tree.update(
            a,
            &json!({"color": "green", "size": 3.0, "shape": {"sides": 5}}),
        )
        .unwrap();
        let state = tree.get_state(a, false).unwrap();

        let b = tree.resolve("Things/b", true).unwrap();
        tree.update(b, &state).unwrap();
        assert_eq!(tree.get_state(b, false).unwrap(), state);
    }

    #[test]
    fn update_rejects_unknown_keys_before_writing() {
        let mut tree = tree();
        let thing = tree.resolve("Things/t-0", true).unwrap();
        let err = tree
            .update(thing, &json!({"color": "green", "colour": "blue"}))
            .unwrap_err();
        assert!(matches!(err, PostvizError::UnknownChild { .. }));
        let color = tree.child(thing, "color").unwrap();
        assert_eq!(tree.read(color).unwrap(), AttrValue::from("red"));
    }

    #[test]
    fn update_applies_sort_by_keys_first() {
        let mut tree = tree();
        let thing = tree.resolve("Things/t-0", true).unwrap();
        // `label` is reset whenever `color` changes; applying `color` first
        // keeps the explicit label.
        tree.update(thing, &json!({"label": "mine", "color": "green"}))
            .unwrap();
        let label = tree.child(thing, "label").unwrap();
        assert_eq!(tree.read(label).unwrap(), AttrValue::from("mine"));
    }

    #[test]
    fn update_requires_a_mapping_for_objects() {
        let mut tree = tree();
        let thing = tree.resolve("Things/t-0", true).unwrap();
        let err = tree.update(thing, &json!(3)).unwrap_err();
        assert!(matches!(err, PostvizError::TypeMismatch { .. }));
    }

    #[test]
    fn undeclared_attribute_lists_declared_ones() {
        let mut tree = tree();
        let thing = tree.resolve("Things/t-0", true).unwrap();
        let size = tree.child(thing, "size").unwrap();
        let err = tree.attribute(size, AttributeName::AllowedValues).unwrap_err();
        assert_eq!(
            err.to_string(),
            "'attribute' has no value 'allowed_values'. The allowed values are: 'on_change'."
        );
    }

    #[test]
    fn object_attributes_are_available() {
        let mut tree = tree();
        let thing = tree.resolve("Things/t-0", true).unwrap();
        assert_eq!(
            tree.attribute(thing, AttributeName::SortBy).unwrap(),
            json!(["color"])
        );
        let tag = tree.child(thing, "tag").unwrap();
        assert_eq!(tree.attribute(tag, AttributeName::IsActive).unwrap(), json!(false));
    }

    #[test]
    fn container_state_maps_item_names() {
        let mut tree = tree();
        tree.resolve("Things/x", true).unwrap();
        tree.resolve("Things/y", true).unwrap();
        let state = tree.get_state(tree.root(), false).unwrap();
        let things = state["Things"].as_object().unwrap();
        assert_eq!(things.keys().collect::<Vec<_>>(), vec!["x", "y"]);
    }
}
