//! # Postviz Architecture
//!
//! Postviz is a **declarative object model for CFD post-processing**: meshes,
//! surfaces, contours, vectors, pathlines, XY plots and monitors, each a tree
//! of typed, constrained properties whose allowed values and defaults come
//! from a live solver session. It is a library that happens to have a CLI
//! client.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI (crates/postviz)                                       │
//! │  - Parses arguments, prints results, owns exit codes        │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API (api.rs) + commands (commands/*.rs)                    │
//! │  - Path parsing, dispatch, structured CmdResult returns     │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Containers (container.rs, registry.rs)                     │
//! │  - Session-scoped Graphics / Plots handles                  │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Tree engine (tree/) over static schemas (schema/,          │
//! │  definitions/)                                              │
//! │  - Reads, writes, resets, validation, commands              │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Session (session/) and Renderer (render.rs) boundaries     │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Key Principle: No I/O Assumptions in Core
//!
//! Everything in this crate takes Rust values and returns `Result`s. Talking
//! to the solver goes through [`session::Session`]; drawing goes through
//! [`render::Renderer`]. Nothing here prints or exits.
//!
//! ## Module Overview
//!
//! - [`api`]: The API facade, entry point for all operations
//! - [`commands`]: One module per user operation
//! - [`container`]: Session-scoped definition-set handles
//! - [`registry`]: Per-session memo of container state
//! - [`definitions`]: Graphics and Plots definitions
//! - [`tree`]: Instance trees: properties, objects, containers, commands
//! - [`schema`]: Static descriptors the trees are built from
//! - [`attributes`]: Attribute names, runtime values, constraints
//! - [`session`]: Solver boundary and the JSON snapshot session
//! - [`surface`]: Server-side surface creation and deletion
//! - [`render`]: Renderer boundary and the display lifecycle
//! - [`config`]: Configuration management
//! - [`error`]: Error types

pub mod api;
pub mod attributes;
pub mod commands;
pub mod config;
pub mod container;
pub mod definitions;
pub mod error;
pub mod registry;
pub mod render;
pub mod schema;
pub mod session;
pub mod surface;
pub mod tree;

#[cfg(any(test, feature = "test_utils"))]
pub mod test_utils;
