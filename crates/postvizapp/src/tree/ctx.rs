use super::{NodeId, Tree};
use crate::attributes::AttrValue;
use crate::error::{PostvizError, Result};
use crate::schema::{ObjectSpec, PropRef};
use crate::session::Session;
use std::rc::Rc;

/// The node a computed attribute, hook or command runs for, with access to
/// the rest of its tree and the bound session.
pub struct NodeCtx<'t> {
    tree: &'t mut Tree,
    id: NodeId,
}

impl<'t> NodeCtx<'t> {
    pub fn new(tree: &'t mut Tree, id: NodeId) -> Self {
        Self { tree, id }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn tree(&mut self) -> &mut Tree {
        &mut *self.tree
    }

    pub fn session(&self) -> Rc<dyn Session> {
        self.tree.session()
    }

    pub fn path(&self) -> String {
        self.tree.path(self.id)
    }

    pub fn parent(&self) -> Result<NodeId> {
        self.tree
            .parent(self.id)?
            .ok_or_else(|| PostvizError::NotFound(format!("{} has no parent", self.path())))
    }

    pub fn resolve(&self, reference: PropRef) -> Result<NodeId> {
        self.tree.resolve_ref(self.id, reference)
    }

    pub fn ancestor(&self, spec: &'static ObjectSpec) -> Result<Option<NodeId>> {
        self.tree.ancestor_by_spec(self.id, spec)
    }

    /// Read a referenced property with the tree's policy.
    pub fn read(&mut self, reference: PropRef) -> Result<AttrValue> {
        let id = self.resolve(reference)?;
        self.tree.read(id)
    }

    pub fn read_str(&mut self, reference: PropRef) -> Result<Option<String>> {
        Ok(self.read(reference)?.as_str().map(str::to_string))
    }

    pub fn read_bool(&mut self, reference: PropRef) -> Result<Option<bool>> {
        Ok(self.read(reference)?.as_bool())
    }

    /// Whether a referenced node is active.
    pub fn is_active(&mut self, reference: PropRef) -> Result<bool> {
        let id = self.resolve(reference)?;
        self.tree.is_active(id)
    }

    /// Whether this context's own node is active.
    pub fn self_active(&mut self) -> Result<bool> {
        self.tree.is_active(self.id)
    }

    /// Surfaces known to the solver followed by the local surfaces visible here.
    pub fn all_surfaces(&self) -> Result<Vec<String>> {
        let mut names = self.session().surface_names()?;
        for local in self.tree.local_surface_names()? {
            if !names.contains(&local) {
                names.push(local);
            }
        }
        Ok(names)
    }
}
