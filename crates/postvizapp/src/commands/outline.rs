use crate::commands::{CmdMessage, CmdResult};
use crate::container::Container;
use crate::error::Result;
use serde_json::Value;

/// Create or refresh the boundary outline mesh.
pub fn run(container: &Container, mesh_name: &str) -> Result<CmdResult> {
    let name = container.add_outline_mesh(mesh_name)?;
    let path = format!("Meshes/{}", name);
    let surfaces = container.get(&format!("{}/surfaces", path))?;
    let count = surfaces.as_array().map(Vec::len).unwrap_or_default();

    let mut result = CmdResult::default()
        .with_value(Value::String(name))
        .with_affected(vec![path.clone()])
        .modified();
    result.add_message(CmdMessage::success(format!(
        "Outline mesh {} covers {} surfaces",
        path, count
    )));
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definitions::{GRAPHICS, PLOTS};
    use crate::registry::SessionRegistry;
    use crate::test_utils::sample_session;
    use std::rc::Rc;

    #[test]
    fn reports_covered_surfaces() {
        let registry = SessionRegistry::default();
        let graphics = Container::open(&registry, &GRAPHICS, Rc::new(sample_session())).unwrap();
        let result = run(&graphics, "mesh-outline").unwrap();
        assert_eq!(
            result.messages[0].content,
            "Outline mesh Meshes/mesh-outline covers 4 surfaces"
        );
    }

    #[test]
    fn plots_have_no_meshes() {
        let registry = SessionRegistry::default();
        let plots = Container::open(&registry, &PLOTS, Rc::new(sample_session())).unwrap();
        assert!(run(&plots, "mesh-outline").is_err());
    }
}
