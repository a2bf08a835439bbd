use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "postviz", version)]
#[command(about = "Inspect and edit CFD post-processing definitions", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Solver snapshot (JSON) the definitions are bound to
    #[arg(short, long, global = true, env = "POSTVIZ_SESSION")]
    pub session: Option<PathBuf>,

    /// State file to load before and save after the command
    #[arg(long, global = true)]
    pub state: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the state of one definition set, or of all of them
    Show {
        /// Definition set, e.g. Graphics
        set: Option<String>,

        /// Include declared attributes (allowed values, ranges, help)
        #[arg(short, long)]
        attributes: bool,
    },

    /// Print the value at a path, e.g. Graphics/Contours/c/field
    Get { path: String },

    /// Write a value at a path; the value is JSON, bare words are strings
    Set { path: String, value: String },

    /// Print one attribute of the node at a path
    Attr { path: String, attribute: String },

    /// Create a named object, e.g. `create Contours --name c`
    #[command(alias = "new")]
    Create {
        /// Container plural, optionally prefixed with its set
        plural: String,

        /// Item name (generated when omitted)
        #[arg(short, long, conflicts_with = "with")]
        name: Option<String>,

        /// Initial state as a JSON object
        #[arg(long)]
        with: Option<String>,
    },

    /// Delete named objects
    #[command(alias = "rm")]
    Delete {
        plural: String,

        #[arg(required = true, num_args = 1..)]
        names: Vec<String>,
    },

    /// Apply a partial state (JSON) to a definition set
    Update { set: String, state: String },

    /// Invoke a command node, e.g. `call Graphics/Meshes/create '{"name": "m"}'`
    Call {
        path: String,

        /// Keyword arguments as a JSON object
        kwargs: Option<String>,
    },

    /// Create the outline mesh over all boundary zones
    Outline,

    /// Render an object; the render request is printed as JSON
    Display {
        path: String,

        #[arg(short, long)]
        window: Option<String>,
    },

    /// Describe the definitions of a set
    Schema { set: String },
}
