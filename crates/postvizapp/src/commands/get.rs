use crate::commands::CmdResult;
use crate::container::Container;
use crate::error::Result;

/// Value of a property, or state of an object, at `path`.
pub fn run(container: &Container, path: &str) -> Result<CmdResult> {
    let value = container.get(path)?;
    Ok(CmdResult::default().with_value(value))
}
