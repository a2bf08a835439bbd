use crate::commands::{CmdMessage, CmdResult};
use crate::container::Container;
use crate::error::Result;
use serde_json::Value;

/// Write `value` at `path`. Objects take a (partial) state mapping.
pub fn run(container: &Container, path: &str, value: &Value) -> Result<CmdResult> {
    container.set(path, value)?;
    let mut result = CmdResult::default().modified();
    result.add_message(CmdMessage::success(format!("Set {}", path)));
    Ok(result)
}
