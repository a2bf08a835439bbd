//! Static description of a definition set.
//!
//! Walks the static [`ObjectSpec`] tree without a session, so solver-dependent attributes
//! (allowed values, ranges) are listed by name only.

use crate::commands::CmdResult;
use crate::error::Result;
use crate::schema::{ChildSpec, CommandSpec, ObjectSpec, PropertySpec};
use serde_json::{json, Map, Value};

pub fn run(set: &'static ObjectSpec) -> Result<CmdResult> {
    Ok(CmdResult::default().with_value(describe_object(set)))
}

fn describe_object(spec: &'static ObjectSpec) -> Value {
    let mut out = Map::new();
    out.insert("kind".into(), json!(if spec.is_named() { "named-object" } else { "object" }));
    if !spec.help.is_empty() {
        out.insert("help".into(), json!(spec.help));
    }
    if let Some(base) = spec.base {
        out.insert("base".into(), json!(base.name));
    }
    let attributes: Vec<String> = spec.attributes().iter().map(|a| a.to_string()).collect();
    if !attributes.is_empty() {
        out.insert("attributes".into(), json!(attributes));
    }

    let mut children = Map::new();
    for child in spec.all_children() {
        let description = match child {
            ChildSpec::Property(p) => describe_property(p),
            ChildSpec::Object(o) => describe_object(o),
            ChildSpec::Command(c) => describe_command(c),
            ChildSpec::Named(o) => json!({
                "kind": "container",
                "item": o.name,
                "definition": describe_object(o),
            }),
        };
        children.insert(child.name().to_string(), description);
    }
    out.insert("children".into(), Value::Object(children));
    Value::Object(out)
}

fn describe_property(spec: &'static PropertySpec) -> Value {
    let mut out = Map::new();
    out.insert("kind".into(), json!("property"));
    out.insert("type".into(), json!(spec.kind.as_str()));
    let default = spec.default.to_value();
    if !default.is_null() {
        out.insert("default".into(), default.to_json());
    } else if spec.compute_default.is_some() {
        out.insert("default".into(), json!("computed"));
    }
    if !spec.help.is_empty() {
        out.insert("help".into(), json!(spec.help));
    }
    let attributes: Vec<String> = spec.attributes().iter().map(|a| a.to_string()).collect();
    if !attributes.is_empty() {
        out.insert("attributes".into(), json!(attributes));
    }
    Value::Object(out)
}

fn describe_command(spec: &'static CommandSpec) -> Value {
    let args: Map<String, Value> = spec
        .args
        .iter()
        .map(|arg| (arg.name.to_string(), describe_property(arg)))
        .collect();
    json!({"kind": "command", "help": spec.help, "args": args})
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definitions::{GRAPHICS, PLOTS};

    #[test]
    fn lists_containers_and_their_definitions() {
        let value = run(&GRAPHICS).unwrap().value.unwrap();
        let contours = &value["children"]["Contours"];
        assert_eq!(contours["kind"], json!("container"));
        assert_eq!(contours["item"], json!("contour"));
        let field = &contours["definition"]["children"]["field"];
        assert_eq!(field["type"], json!("str"));
        assert!(field["attributes"]
            .as_array()
            .unwrap()
            .contains(&json!("allowed_values")));
    }

    #[test]
    fn lazy_defaults_are_marked() {
        let value = run(&PLOTS).unwrap().value.unwrap();
        let plot = &value["children"]["XYPlots"]["definition"];
        assert_eq!(plot["base"], json!("plot"));
        assert_eq!(plot["children"]["direction_vector"]["default"], json!([1.0, 0.0, 0.0]));

        let graphics = run(&GRAPHICS).unwrap().value.unwrap();
        let iso = &graphics["children"]["Surfaces"]["definition"]["children"]["definition"]["children"]
            ["iso_surface"]["children"]["iso_value"];
        assert_eq!(iso["default"], json!("computed"));
    }
}
