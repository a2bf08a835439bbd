use crate::commands::CmdResult;
use crate::container::Container;
use crate::error::Result;
use serde_json::{Map, Value};

/// Invoke the command node at `path` with keyword arguments.
pub fn run(container: &Container, path: &str, kwargs: &Map<String, Value>) -> Result<CmdResult> {
    let returned = container.invoke(path, kwargs)?;
    Ok(CmdResult::default().with_value(returned).modified())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definitions::GRAPHICS;
    use crate::error::PostvizError;
    use crate::registry::SessionRegistry;
    use crate::test_utils::sample_session;
    use serde_json::json;
    use std::rc::Rc;

    fn kwargs(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn container_commands_are_addressable() {
        let registry = SessionRegistry::default();
        let graphics = Container::open(&registry, &GRAPHICS, Rc::new(sample_session())).unwrap();
        let created = run(&graphics, "Contours/create", &kwargs(json!({"name": "c"}))).unwrap();
        assert_eq!(created.value, Some(json!("c")));

        run(&graphics, "Contours/delete", &kwargs(json!({"names": ["c"]}))).unwrap();
        assert!(graphics.item_names("Contours").unwrap().is_empty());
    }

    #[test]
    fn arguments_are_validated_before_running() {
        let registry = SessionRegistry::default();
        let graphics = Container::open(&registry, &GRAPHICS, Rc::new(sample_session())).unwrap();
        let err = run(&graphics, "Meshes/delete", &kwargs(json!({"names": ["ghost"]}))).unwrap_err();
        assert!(matches!(err, PostvizError::DisallowedValues { .. }));
    }
}
