//! # Command Layer
//!
//! One module per user operation. Commands run against a [`Container`] (or,
//! for `schema`, a bare definition set) and return a [`CmdResult`]; they never
//! print, parse arguments or decide exit codes.
//!
//! ## Structured Returns
//!
//! [`CmdResult`] carries:
//! - `value`: data to show (a state, a property value, a description)
//! - `affected`: paths of items created or removed
//! - `messages`: leveled messages for the UI
//! - `modified`: whether the state changed and should be persisted
//!
//! ## Command Modules
//!
//! - [`show`]: full state of a set
//! - [`get`] / [`set`]: read or write one node by path
//! - [`attr`]: read a declared attribute
//! - [`create`] / [`delete`]: manage named objects
//! - [`update`]: apply a partial state
//! - [`call`]: invoke a command node
//! - [`outline`]: the boundary outline mesh
//! - [`display`]: hand an object to a renderer
//! - [`schema`]: describe a definition set
//!
//! [`Container`]: crate::container::Container

use serde::Serialize;
use serde_json::Value;

pub mod attr;
pub mod call;
pub mod create;
pub mod delete;
pub mod display;
pub mod get;
pub mod outline;
pub mod schema;
pub mod set;
pub mod show;
pub mod update;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CmdMessage {
    pub level: MessageLevel,
    pub content: String,
}

impl CmdMessage {
    pub fn info(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Info,
            content: content.into(),
        }
    }

    pub fn success(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Success,
            content: content.into(),
        }
    }

    pub fn warning(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Warning,
            content: content.into(),
        }
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Error,
            content: content.into(),
        }
    }
}

#[derive(Debug, Default)]
pub struct CmdResult {
    pub value: Option<Value>,
    pub affected: Vec<String>,
    pub messages: Vec<CmdMessage>,
    pub modified: bool,
}

impl CmdResult {
    pub fn add_message(&mut self, message: CmdMessage) {
        self.messages.push(message);
    }

    pub fn with_value(mut self, value: Value) -> Self {
        self.value = Some(value);
        self
    }

    pub fn with_affected(mut self, affected: Vec<String>) -> Self {
        self.affected = affected;
        self
    }

    /// Mark the state as changed.
    pub fn modified(mut self) -> Self {
        self.modified = true;
        self
    }
}
