//! # Postviz CLI
//!
//! The binary is intentionally thin: the CLI lives in `src/cli/`, while this
//! file only invokes `cli::run()` and handles process termination.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (crates/postviz/src/cli/)                        │
//! │  - clap argument parsing (setup.rs)                         │
//! │  - context wiring and dispatch (mod.rs, handlers.rs)        │
//! │  - colored terminal output (print.rs)                       │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (postvizapp::api)                                │
//! │  - Path parsing, dispatch, structured `CmdResult` values    │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! A run loads a session snapshot (`--session`) and, optionally, a state file
//! (`--state`). Commands that change the state write it back to the state
//! file, so consecutive invocations behave like one session.

mod cli;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
