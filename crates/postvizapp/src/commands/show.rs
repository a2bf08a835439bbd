use crate::commands::CmdResult;
use crate::container::Container;
use crate::error::Result;

pub fn run(container: &Container, show_attributes: bool) -> Result<CmdResult> {
    let state = container.state(show_attributes)?;
    Ok(CmdResult::default().with_value(state))
}
