use super::print::{print_messages, print_result, print_value};
use super::setup::Commands;
use anyhow::{anyhow, Result};
use postvizapp::api::PostvizApi;
use postvizapp::commands;
use postvizapp::definitions::definition_set;
use postvizapp::render::JsonRenderer;
use serde_json::{Map, Value};

/// Run one command. Returns whether the state changed.
pub(super) fn dispatch(api: &PostvizApi, command: Commands) -> Result<bool> {
    let result = match command {
        Commands::Show { set, attributes } => api.show(set.as_deref(), attributes)?,
        Commands::Get { path } => api.get(&path)?,
        Commands::Set { path, value } => api.set(&path, &parse_value(&value))?,
        Commands::Attr { path, attribute } => api.attr(&path, &attribute)?,
        Commands::Create { plural, name, with } => {
            let state = with.as_deref().map(parse_object).transpose()?;
            let result = api.create(&plural, name.as_deref(), state.as_ref())?;
            print_messages(&result.messages);
            return Ok(result.modified);
        }
        Commands::Delete { plural, names } => api.delete(&plural, &names)?,
        Commands::Update { set, state } => api.update(&set, &parse_json(&state)?)?,
        Commands::Call { path, kwargs } => {
            let kwargs = match kwargs.as_deref() {
                Some(raw) => parse_object(raw)?,
                None => Map::new(),
            };
            api.call(&path, &kwargs)?
        }
        Commands::Outline => api.outline()?,
        Commands::Display { path, window } => {
            let mut renderer = JsonRenderer::new(std::io::stdout());
            api.display(&path, &mut renderer, window.as_deref())?
        }
        Commands::Schema { set } => {
            schema(&set)?;
            return Ok(false);
        }
    };
    print_result(&result);
    Ok(result.modified)
}

/// Schema needs no session.
pub(super) fn schema(set: &str) -> Result<()> {
    let result = commands::schema::run(definition_set(set)?)?;
    if let Some(value) = &result.value {
        print_value(value);
    }
    Ok(())
}

/// JSON when it parses, otherwise the raw text as a string.
fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

fn parse_json(raw: &str) -> Result<Value> {
    serde_json::from_str(raw).map_err(|e| anyhow!("Invalid JSON: {}", e))
}

fn parse_object(raw: &str) -> Result<Map<String, Value>> {
    match parse_json(raw)? {
        Value::Object(map) => Ok(map),
        _ => Err(anyhow!("Expected a JSON object, got: {}", raw)),
    }
}
