use crate::commands::CmdResult;
use crate::container::Container;
use crate::error::Result;

pub fn run(container: &Container, path: &str, attribute: &str) -> Result<CmdResult> {
    let value = container.attribute(path, attribute)?;
    Ok(CmdResult::default().with_value(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definitions::GRAPHICS;
    use crate::registry::SessionRegistry;
    use crate::test_utils::sample_session;
    use serde_json::json;
    use std::rc::Rc;

    fn graphics() -> (SessionRegistry, Container) {
        let registry = SessionRegistry::default();
        let graphics = Container::open(&registry, &GRAPHICS, Rc::new(sample_session())).unwrap();
        graphics.create("Surfaces", Some("s")).unwrap();
        (registry, graphics)
    }

    #[test]
    fn range_follows_the_selected_field() {
        let (_registry, graphics) = graphics();
        let path = "Surfaces/s/definition/iso_surface/iso_value";
        assert_eq!(run(&graphics, path, "range").unwrap().value, Some(json!([-120.0, 340.0])));
        graphics
            .set("Surfaces/s/definition/iso_surface/field", &json!("temperature"))
            .unwrap();
        assert_eq!(run(&graphics, path, "range").unwrap().value, Some(json!([280.0, 350.0])));
    }

    #[test]
    fn activity_is_an_attribute() {
        let (_registry, graphics) = graphics();
        let result = run(&graphics, "Surfaces/s/definition/plane_surface", "is_active").unwrap();
        assert_eq!(result.value, Some(json!(false)));
    }

    #[test]
    fn unknown_attribute_lists_the_declared_ones() {
        let (_registry, graphics) = graphics();
        let err = run(&graphics, "Surfaces/s/show_edges", "range").unwrap_err();
        assert!(err.to_string().starts_with("'attribute' has no value 'range'."));
    }
}
