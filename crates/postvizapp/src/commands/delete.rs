use crate::commands::{CmdMessage, CmdResult};
use crate::container::Container;
use crate::error::Result;

/// Delete items from the `plural` container. All names are checked before
/// anything is removed.
pub fn run<S: AsRef<str>>(container: &Container, plural: &str, names: &[S]) -> Result<CmdResult> {
    container.delete(plural, names)?;

    let mut result = CmdResult::default().modified();
    for name in names {
        let path = format!("{}/{}", plural, name.as_ref());
        result.add_message(CmdMessage::success(format!("Deleted {}", path)));
        result.affected.push(path);
    }
    Ok(result)
}
