use super::{NodeCtx, NodeId, NodeKind, Tree};
use crate::attributes::{AttrValue, Constraint};
use crate::error::{PostvizError, Result};
use crate::schema::CommandSpec;
use serde_json::{Map, Value};
use tracing::{debug, trace};

/// Resolved arguments handed to a command's execute function.
#[derive(Debug, Clone, Default)]
pub struct CommandArgs {
    values: Vec<(String, AttrValue)>,
    extra: Map<String, Value>,
}

impl CommandArgs {
    pub fn new(values: Vec<(String, AttrValue)>, extra: Map<String, Value>) -> Self {
        Self { values, extra }
    }

    pub fn get(&self, name: &str) -> Option<&AttrValue> {
        self.values.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Declared arguments in declaration order.
    pub fn values(&self) -> &[(String, AttrValue)] {
        &self.values
    }

    /// Keyword arguments the command does not declare, passed through as-is.
    pub fn extra(&self) -> &Map<String, Value> {
        &self.extra
    }
}

impl Tree {
    pub fn command_spec(&self, id: NodeId) -> Result<&'static CommandSpec> {
        match &self.node(id)?.kind {
            NodeKind::Command { spec, .. } => Ok(*spec),
            _ => Err(PostvizError::NotFound(format!("{} is not a command", self.path(id)))),
        }
    }

    /// Run a command with keyword arguments.
    ///
    /// Every declared argument is validated against its `allowed_values` and
    /// `range` before any of them is applied, so a rejected call leaves the
    /// tree untouched. After execution, successful or not, the arguments go
    /// back to their defaults.
    pub fn invoke(&mut self, id: NodeId, kwargs: &Map<String, Value>) -> Result<AttrValue> {
        let spec = self.command_spec(id)?;
        let args = self.children(id)?;

        let mut pending = Vec::new();
        let mut extra = Map::new();
        for (key, raw) in kwargs {
            let Some(arg) = self.find_arg(&args, key) else {
                extra.insert(key.clone(), raw.clone());
                continue;
            };
            let kind = self.property_spec(arg)?.kind;
            let value = AttrValue::from_json(raw, kind, &self.path(arg))?;
            self.check_argument(arg, key, &value)?;
            pending.push((arg, value));
        }

        debug!(command = %self.path(id), args = kwargs.len(), "invoke");
        let result = self.run_command(id, spec, &args, pending, extra);

        for arg in &args {
            let default = self.property_spec(*arg)?.default.to_value();
            self.store(*arg, default)?;
        }
        result
    }

    fn find_arg(&self, args: &[NodeId], name: &str) -> Option<NodeId> {
        args.iter()
            .copied()
            .find(|a| self.name(*a).map(|n| n == name).unwrap_or(false))
    }

    fn check_argument(&mut self, arg: NodeId, key: &str, value: &AttrValue) -> Result<()> {
        if let Some(allowed) = self.allowed_values(arg)? {
            Constraint::allowed(allowed).check(key, value)?;
        }
        if self.property_spec(arg)?.range.is_some() {
            match self.range(arg)? {
                Some((min, max)) => Constraint::range(min, max).check(key, value)?,
                // Bounds unknown yet; the value must still be a number.
                None if !value.is_null() && value.as_f64().is_none() => {
                    return Err(PostvizError::NotNumeric {
                        field: key.to_string(),
                        value: value.to_string(),
                    })
                }
                None => {}
            }
        }
        Ok(())
    }

    fn run_command(
        &mut self,
        id: NodeId,
        spec: &'static CommandSpec,
        args: &[NodeId],
        pending: Vec<(NodeId, AttrValue)>,
        extra: Map<String, Value>,
    ) -> Result<AttrValue> {
        for (arg, value) in pending {
            self.set_state(arg, value)?;
        }

        let mut values = Vec::with_capacity(args.len());
        for arg in args {
            let name = self.name(*arg)?.to_string();
            let value = self.read(*arg)?;
            values.push((name, value));
        }
        trace!(command = spec.name, ?values, "resolved arguments");

        let resolved = CommandArgs::new(values, extra);
        (spec.execute)(&mut NodeCtx::new(self, id), &resolved)
    }
}
