//! # Session Registry
//!
//! Containers are session scoped: opening the Graphics set twice for the same
//! session yields the same tree, so objects created through one handle are
//! visible through the other. The registry owns that memo explicitly.
//!
//! Entries are keyed by definition set and session id and live until
//! [`SessionRegistry::evict`] is called for the session. Nothing is evicted
//! implicitly.

use crate::error::Result;
use crate::schema::ObjectSpec;
use crate::session::Session;
use crate::tree::{ReadPolicy, Tree};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use tracing::debug;

type Key = (&'static str, String);

pub struct SessionRegistry {
    policy: ReadPolicy,
    trees: RefCell<HashMap<Key, Rc<RefCell<Tree>>>>,
}

impl SessionRegistry {
    pub fn new(policy: ReadPolicy) -> Self {
        Self {
            policy,
            trees: RefCell::new(HashMap::new()),
        }
    }

    pub fn policy(&self) -> ReadPolicy {
        self.policy
    }

    /// The tree of `set` bound to `session`, built on first use.
    pub fn open(&self, set: &'static ObjectSpec, session: Rc<dyn Session>) -> Result<Rc<RefCell<Tree>>> {
        let key = (set.name, session.id().to_string());
        if let Some(tree) = self.trees.borrow().get(&key) {
            return Ok(Rc::clone(tree));
        }

        let tree = Rc::new(RefCell::new(Tree::new(set, session, self.policy)?));
        debug!(set = key.0, session = %key.1, "registered session state");
        self.trees.borrow_mut().insert(key, Rc::clone(&tree));
        Ok(tree)
    }

    /// Drop every tree bound to `session_id`. Returns how many were dropped.
    ///
    /// Handles still holding a tree keep it alive, but reopening builds a
    /// fresh one.
    pub fn evict(&self, session_id: &str) -> usize {
        let mut trees = self.trees.borrow_mut();
        let before = trees.len();
        trees.retain(|(_, id), _| id != session_id);
        let dropped = before - trees.len();
        if dropped > 0 {
            debug!(session = session_id, dropped, "evicted session state");
        }
        dropped
    }

    pub fn len(&self) -> usize {
        self.trees.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.trees.borrow().is_empty()
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new(ReadPolicy::default())
    }
}
