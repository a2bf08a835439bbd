use crate::commands::{CmdMessage, CmdResult};
use crate::container::Container;
use crate::error::Result;
use serde_json::Value;

/// Apply a partial state to the whole set.
pub fn run(container: &Container, state: &Value) -> Result<CmdResult> {
    container.update(state)?;
    let mut result = CmdResult::default().modified();
    result.add_message(CmdMessage::success(format!("Updated {}", container.name())));
    Ok(result)
}
