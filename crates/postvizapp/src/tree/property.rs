use super::{NodeCtx, NodeId, NodeKind, ReadPolicy, Tree};
use crate::attributes::AttrValue;
use crate::error::{PostvizError, Result};
use crate::schema::{Hook, PropertySpec};
use serde_json::Value;
use tracing::{debug, trace, warn};

/// Something to run when a property changes.
pub(crate) enum Callback {
    /// Clear another property's value and fire its callbacks.
    Reset(NodeId),
    /// The property's own `on_change` hook.
    Hook(Hook),
    /// External listener; receives the id of the changed property.
    Observer(Box<dyn FnMut(NodeId)>),
}

impl Tree {
    pub fn property_spec(&self, id: NodeId) -> Result<&'static PropertySpec> {
        match &self.node(id)?.kind {
            NodeKind::Property { spec, .. } => Ok(*spec),
            _ => Err(PostvizError::NotFound(format!("{} is not a property", self.path(id)))),
        }
    }

    /// Stored value, without defaults, activity or validation applied.
    pub fn raw_value(&self, id: NodeId) -> Result<AttrValue> {
        match &self.node(id)?.kind {
            NodeKind::Property { value, .. } => Ok(value.clone()),
            _ => Err(PostvizError::NotFound(format!("{} is not a property", self.path(id)))),
        }
    }

    /// Overwrite the stored value without notifying anyone.
    pub(crate) fn store(&mut self, id: NodeId, new_value: AttrValue) -> Result<()> {
        let path = self.path(id);
        match &mut self.node_mut(id)?.kind {
            NodeKind::Property { value, .. } => {
                *value = new_value;
                Ok(())
            }
            _ => Err(PostvizError::NotFound(format!("{} is not a property", path))),
        }
    }

    pub(crate) fn push_callback(&mut self, id: NodeId, callback: Callback) -> Result<()> {
        let path = self.path(id);
        match &mut self.node_mut(id)?.kind {
            NodeKind::Property { callbacks, .. } => {
                callbacks.push(callback);
                Ok(())
            }
            _ => Err(PostvizError::NotFound(format!("{} is not a property", path))),
        }
    }

    /// Listen to every write of a property, in registration order after the
    /// callbacks wired at construction.
    pub fn observe(&mut self, id: NodeId, listener: impl FnMut(NodeId) + 'static) -> Result<()> {
        self.push_callback(id, Callback::Observer(Box::new(listener)))
    }

    /// Read a property with the tree's read policy.
    pub fn read(&mut self, id: NodeId) -> Result<AttrValue> {
        self.read_with(id, self.policy)
    }

    /// Read a property, failing when the stored value is not allowed.
    pub fn read_strict(&mut self, id: NodeId) -> Result<AttrValue> {
        self.read_with(id, ReadPolicy::Strict)
    }

    /// Read a property, snapping a disallowed value to the first allowed one.
    pub fn read_or_repair(&mut self, id: NodeId) -> Result<AttrValue> {
        self.read_with(id, ReadPolicy::Repair)
    }

    fn read_with(&mut self, id: NodeId, policy: ReadPolicy) -> Result<AttrValue> {
        let spec = self.property_spec(id)?;

        if let Some(inactive) = spec.inactive_value {
            if !self.is_active(id)? {
                return Ok(inactive.to_value());
            }
        }

        let mut value = self.raw_value(id)?;
        if value.is_null() {
            if let Some(compute) = spec.compute_default {
                let path = self.path(id);
                value = compute(&mut NodeCtx::new(self, id))?.coerce(spec.kind, &path)?;
                if !value.is_null() {
                    trace!(path = %path, value = %value, "computed default");
                    self.store(id, value.clone())?;
                }
            }
        }

        let Some(allowed) = self.allowed_values(id)? else {
            return Ok(value);
        };
        if allowed.is_empty() || is_allowed(&value, &allowed) {
            return Ok(value);
        }

        let path = self.path(id);
        match policy {
            ReadPolicy::Repair => {
                let fixed = AttrValue::Str(allowed[0].clone()).coerce(spec.kind, &path)?;
                warn!(path = %path, from = %value, to = %fixed, "repaired disallowed value");
                self.write(id, fixed.clone())?;
                Ok(fixed)
            }
            ReadPolicy::Strict if value.is_null() => Ok(value),
            ReadPolicy::Strict => Err(PostvizError::InvalidValue {
                path,
                value: value.to_string(),
                allowed,
            }),
        }
    }

    /// Store a value and fire every callback, even if the value is unchanged.
    pub fn set_state(&mut self, id: NodeId, value: AttrValue) -> Result<()> {
        let spec = self.property_spec(id)?;
        if spec.is_read_only {
            return Err(PostvizError::ReadOnly(self.path(id)));
        }
        self.write(id, value)
    }

    pub fn set_json(&mut self, id: NodeId, value: &Value) -> Result<()> {
        let spec = self.property_spec(id)?;
        let value = AttrValue::from_json(value, spec.kind, &self.path(id))?;
        self.set_state(id, value)
    }

    fn write(&mut self, id: NodeId, value: AttrValue) -> Result<()> {
        let spec = self.property_spec(id)?;
        let path = self.path(id);
        let value = value.coerce(spec.kind, &path)?;
        if let Some(guard) = spec.guard {
            guard(&mut NodeCtx::new(self, id), &value)?;
        }
        debug!(path = %path, value = %value, "set_state");
        let previous = self.raw_value(id)?;
        self.store(id, value)?;
        if let Err(e) = self.fire(id) {
            // Resets already fired stay fired; only this value is restored.
            self.store(id, previous)?;
            return Err(e);
        }
        Ok(())
    }

    /// Clear a property so its lazy default recomputes, then notify.
    pub fn reset(&mut self, id: NodeId) -> Result<()> {
        trace!(path = %self.path(id), "reset");
        self.store(id, AttrValue::Null)?;
        self.fire(id)
    }

    fn fire(&mut self, id: NodeId) -> Result<()> {
        let mut callbacks = match &mut self.node_mut(id)?.kind {
            NodeKind::Property { callbacks, .. } => std::mem::take(callbacks),
            _ => return Ok(()),
        };

        let mut result = Ok(());
        for callback in callbacks.iter_mut() {
            result = match callback {
                Callback::Reset(target) => {
                    let target = *target;
                    if self.contains(target) {
                        self.reset(target)
                    } else {
                        Ok(())
                    }
                }
                Callback::Hook(hook) => {
                    let hook = *hook;
                    hook(&mut NodeCtx::new(self, id))
                }
                Callback::Observer(listener) => {
                    listener(id);
                    Ok(())
                }
            };
            if result.is_err() {
                break;
            }
        }

        // A hook may have removed reset targets while the list was taken out.
        callbacks.retain(|c| !matches!(c, Callback::Reset(target) if !self.contains(*target)));
        // Callbacks registered while firing go after the existing ones.
        if let Ok(node) = self.node_mut(id) {
            if let NodeKind::Property { callbacks: slot, .. } = &mut node.kind {
                callbacks.append(slot);
                *slot = callbacks;
            }
        }
        result
    }

    /// Resolved `allowed_values` attribute, `None` when not declared.
    pub fn allowed_values(&mut self, id: NodeId) -> Result<Option<Vec<String>>> {
        match self.property_spec(id)?.allowed_values {
            Some(f) => f(&mut NodeCtx::new(self, id)).map(Some),
            None => Ok(None),
        }
    }

    /// Resolved `range` attribute; `None` when not declared or not yet known.
    pub fn range(&mut self, id: NodeId) -> Result<Option<(f64, f64)>> {
        match self.property_spec(id)?.range {
            Some(f) => f(&mut NodeCtx::new(self, id)),
            None => Ok(None),
        }
    }
}

/// Lists are not checked on read, only on command input.
fn is_allowed(value: &AttrValue, allowed: &[String]) -> bool {
    match value {
        AttrValue::Null => false,
        AttrValue::List(_) => true,
        other => allowed.contains(&other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{sample_session, toy};
    use std::cell::Cell;
    use std::rc::Rc;

    fn thing(policy: ReadPolicy) -> (Tree, NodeId) {
        let mut tree = Tree::new(&toy::ROOT, Rc::new(sample_session()), policy).unwrap();
        let thing = tree.resolve("Things/t-0", true).unwrap();
        (tree, thing)
    }

    #[test]
    fn redundant_writes_fire_every_time() {
        let (mut tree, thing) = thing(ReadPolicy::Repair);
        let color = tree.child(thing, "color").unwrap();
        let count = Rc::new(Cell::new(0));
        let seen = Rc::clone(&count);
        tree.observe(color, move |_| seen.set(seen.get() + 1)).unwrap();

        tree.set_state(color, "green".into()).unwrap();
        tree.set_state(color, "green".into()).unwrap();
        tree.set_state(color, "green".into()).unwrap();
        assert_eq!(count.get(), 3);
    }

    #[test]
    fn repair_snaps_to_first_allowed_and_persists() {
        let (mut tree, thing) = thing(ReadPolicy::Repair);
        let color = tree.child(thing, "color").unwrap();
        tree.store(color, "purple".into()).unwrap();

        assert_eq!(tree.read(color).unwrap(), AttrValue::from("red"));
        assert_eq!(tree.raw_value(color).unwrap(), AttrValue::from("red"));
        assert_eq!(tree.read(color).unwrap(), AttrValue::from("red"));
    }

    #[test]
    fn strict_read_reports_invalid_value() {
        let (mut tree, thing) = thing(ReadPolicy::Strict);
        let color = tree.child(thing, "color").unwrap();
        tree.store(color, "purple".into()).unwrap();

        let err = tree.read(color).unwrap_err();
        assert!(matches!(err, PostvizError::InvalidValue { .. }));
        // Nothing was written.
        assert_eq!(tree.raw_value(color).unwrap(), AttrValue::from("purple"));
        // Explicit repair still available.
        assert_eq!(tree.read_or_repair(color).unwrap(), AttrValue::from("red"));
    }

    #[test]
    fn lazy_default_is_cached_until_reset() {
        let (mut tree, thing) = thing(ReadPolicy::Repair);
        let label = tree.child(thing, "label").unwrap();
        let color = tree.child(thing, "color").unwrap();

        assert_eq!(tree.raw_value(label).unwrap(), AttrValue::Null);
        assert_eq!(tree.read(label).unwrap(), AttrValue::from("red thing"));
        assert_eq!(tree.raw_value(label).unwrap(), AttrValue::from("red thing"));

        tree.set_state(color, "blue".into()).unwrap();
        assert_eq!(tree.raw_value(label).unwrap(), AttrValue::Null);
        assert_eq!(tree.read(label).unwrap(), AttrValue::from("blue thing"));
    }

    #[test]
    fn explicit_value_survives_until_dependency_changes() {
        let (mut tree, thing) = thing(ReadPolicy::Repair);
        let label = tree.child(thing, "label").unwrap();
        let color = tree.child(thing, "color").unwrap();

        tree.set_state(label, "custom".into()).unwrap();
        assert_eq!(tree.read(label).unwrap(), AttrValue::from("custom"));
        tree.set_state(color, "red".into()).unwrap();
        assert_eq!(tree.read(label).unwrap(), AttrValue::from("red thing"));
    }

    #[test]
    fn reset_fires_the_reset_property_callbacks() {
        let (mut tree, thing) = thing(ReadPolicy::Repair);
        let label = tree.child(thing, "label").unwrap();
        let color = tree.child(thing, "color").unwrap();
        let fired = Rc::new(Cell::new(false));
        let flag = Rc::clone(&fired);
        tree.observe(label, move |_| flag.set(true)).unwrap();

        tree.set_state(color, "green".into()).unwrap();
        assert!(fired.get());
    }

    #[test]
    fn guard_rejects_before_storing() {
        let (mut tree, thing) = thing(ReadPolicy::Repair);
        let size = tree.child(thing, "size").unwrap();
        let err = tree.set_state(size, AttrValue::Float(-1.0)).unwrap_err();
        assert!(matches!(err, PostvizError::State(_)));
        assert_eq!(tree.raw_value(size).unwrap(), AttrValue::Float(1.0));
    }

    #[test]
    fn writes_are_type_checked() {
        let (mut tree, thing) = thing(ReadPolicy::Repair);
        let size = tree.child(thing, "size").unwrap();
        let err = tree.set_state(size, "big".into()).unwrap_err();
        assert!(matches!(err, PostvizError::TypeMismatch { .. }));
        tree.set_state(size, AttrValue::Int(4)).unwrap();
        assert_eq!(tree.read(size).unwrap(), AttrValue::Float(4.0));
    }

    #[test]
    fn read_only_rejects_writes() {
        let (mut tree, thing) = thing(ReadPolicy::Repair);
        let stamp = tree.child(thing, "stamp").unwrap();
        let err = tree.set_state(stamp, "v2".into()).unwrap_err();
        assert_eq!(err.to_string(), "Toys/Things/t-0/stamp is read only.");
    }

    #[test]
    fn on_change_hook_runs_on_write() {
        let (mut tree, thing) = thing(ReadPolicy::Repair);
        let size = tree.child(thing, "size").unwrap();
        let changes = tree.child(tree.root(), "changes").unwrap();
        tree.set_state(size, AttrValue::Float(2.0)).unwrap();
        tree.set_state(size, AttrValue::Float(2.0)).unwrap();
        assert_eq!(tree.read(changes).unwrap(), AttrValue::Int(2));
    }

    #[test]
    fn failing_hook_restores_the_previous_value() {
        let (mut tree, thing) = thing(ReadPolicy::Repair);
        let size = tree.child(thing, "size").unwrap();
        let changes = tree.child(tree.root(), "changes").unwrap();
        tree.set_state(size, AttrValue::Float(3.0)).unwrap();

        let err = tree.set_state(size, AttrValue::Float(500.0)).unwrap_err();
        assert_eq!(err.to_string(), "size is over the limit");
        assert_eq!(tree.read(size).unwrap(), AttrValue::Float(3.0));
        assert_eq!(tree.read(changes).unwrap(), AttrValue::Int(1));
    }

    #[test]
    fn inactive_value_masks_stored_value() {
        let (mut tree, thing) = thing(ReadPolicy::Repair);
        let tag = tree.child(thing, "tag").unwrap();
        let color = tree.child(thing, "color").unwrap();

        assert_eq!(tree.read(tag).unwrap(), AttrValue::Bool(false));
        tree.set_state(color, "blue".into()).unwrap();
        assert_eq!(tree.read(tag).unwrap(), AttrValue::Bool(true));
    }

    #[test]
    fn owner_reference_resets_nested_named_items() {
        let (mut tree, thing) = thing(ReadPolicy::Repair);
        let part = tree.resolve("Things/t-0/shape/Parts/part-0", true).unwrap();
        let ratio = tree.child(part, "ratio").unwrap();
        let size = tree.child(thing, "size").unwrap();

        assert_eq!(tree.read(ratio).unwrap(), AttrValue::Float(0.5));
        tree.set_state(size, AttrValue::Float(4.0)).unwrap();
        assert_eq!(tree.read(ratio).unwrap(), AttrValue::Float(2.0));
    }
}
