use crate::commands::{CmdMessage, CmdResult};
use crate::container::Container;
use crate::error::Result;
use serde_json::{Map, Value};

/// Create an item in the `plural` container.
///
/// With `state`, the item gets a unique name and the state is applied to it;
/// `name` is ignored in that case.
pub fn run(
    container: &Container,
    plural: &str,
    name: Option<&str>,
    state: Option<&Map<String, Value>>,
) -> Result<CmdResult> {
    let created = match state {
        Some(state) => container.create_with(plural, state)?,
        None => container.create(plural, name)?,
    };
    let path = format!("{}/{}", plural, created);
    let mut result = CmdResult::default()
        .with_value(Value::String(created))
        .with_affected(vec![path.clone()])
        .modified();
    result.add_message(CmdMessage::success(format!("Created {}", path)));
    Ok(result)
}
