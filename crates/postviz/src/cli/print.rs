use colored::Colorize;
use postvizapp::commands::{CmdMessage, CmdResult, MessageLevel};
use serde_json::Value;

pub(super) fn print_messages(messages: &[CmdMessage]) {
    for message in messages {
        match message.level {
            MessageLevel::Info => println!("{}", message.content.dimmed()),
            MessageLevel::Success => println!("{}", message.content.green()),
            MessageLevel::Warning => println!("{}", message.content.yellow()),
            MessageLevel::Error => println!("{}", message.content.red()),
        }
    }
}

/// Strings print bare; everything else as pretty JSON.
pub(super) fn print_value(value: &Value) {
    match value {
        Value::String(s) => println!("{}", s),
        other => match serde_json::to_string_pretty(other) {
            Ok(text) => println!("{}", text),
            Err(_) => println!("{}", other),
        },
    }
}

pub(super) fn print_result(result: &CmdResult) {
    if let Some(value) = &result.value {
        print_value(value);
    }
    print_messages(&result.messages);
}
