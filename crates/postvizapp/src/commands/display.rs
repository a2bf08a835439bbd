use crate::commands::{CmdMessage, CmdResult};
use crate::container::Container;
use crate::error::Result;
use crate::render::Renderer;

pub fn run(
    container: &Container,
    path: &str,
    renderer: &mut dyn Renderer,
    window_id: Option<&str>,
) -> Result<CmdResult> {
    container.display(path, renderer, window_id)?;
    let mut result = CmdResult::default();
    result.add_message(CmdMessage::info(format!("Displayed {}", path)));
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definitions::GRAPHICS;
    use crate::registry::SessionRegistry;
    use crate::render::RecordingRenderer;
    use crate::session::Session;
    use crate::test_utils::sample_session;
    use serde_json::json;
    use std::rc::Rc;

    #[test]
    fn surface_is_created_for_the_duration_of_display() {
        let registry = SessionRegistry::default();
        let session = Rc::new(sample_session());
        let graphics = Container::open(&registry, &GRAPHICS, Rc::clone(&session) as _).unwrap();
        graphics
            .set(
                "Surfaces/cut",
                &json!({"definition": {"type": "plane-surface"}}),
            )
            .unwrap();

        let mut renderer = RecordingRenderer::default();
        let result = run(&graphics, "Surfaces/cut", &mut renderer, Some("main")).unwrap();
        assert_eq!(result.messages[0].content, "Displayed Surfaces/cut");
        assert_eq!(renderer.requests[0].surfaces, vec!["cut"]);
        assert_eq!(
            session.server_log(),
            vec!["create plane-surface cut z=0".to_string(), "delete surface cut".to_string()]
        );
        assert!(!session.surface_names().unwrap().contains(&"cut".to_string()));
    }
}
