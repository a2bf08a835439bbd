//! # Configuration
//!
//! Postviz configuration is derived with [`confique`] and resolved in priority
//! order:
//! 1. **Environment variables**: `POSTVIZ_READ_POLICY`, `POSTVIZ_OUTLINE_MESH_NAME`.
//! 2. **Config files**: `postviz.toml`, in the order the caller passes them
//!    (the CLI passes the working directory first, then the OS config dir).
//! 3. **Compiled Defaults**: via `#[config(default = ...)]`.
//!
//! ## Available Settings
//!
//! | Key | Default | Description |
//! |-----|---------|-------------|
//! | `read_policy` | `repair` | `repair` snaps invalid reads to the first allowed value; `strict` fails them |
//! | `outline_mesh_name` | `mesh-outline` | Mesh created by the outline command |

use crate::error::{PostvizError, Result};
use crate::tree::ReadPolicy;
use confique::Config;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const CONFIG_FILE_NAME: &str = "postviz.toml";

/// Configuration for postviz, stored in `postviz.toml`.
#[derive(Config, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PostvizConfig {
    /// What reads do with values that are no longer allowed.
    #[config(env = "POSTVIZ_READ_POLICY", default = "repair")]
    pub read_policy: ReadPolicy,

    /// Name of the mesh created by `add_outline_mesh`.
    #[config(env = "POSTVIZ_OUTLINE_MESH_NAME", default = "mesh-outline")]
    pub outline_mesh_name: String,
}

impl Default for PostvizConfig {
    fn default() -> Self {
        Self {
            read_policy: ReadPolicy::Repair,
            outline_mesh_name: "mesh-outline".to_string(),
        }
    }
}

impl PostvizConfig {
    /// Load from the environment and `files`; earlier files win, missing
    /// files are skipped.
    pub fn load<P: AsRef<Path>>(files: &[P]) -> Result<Self> {
        let mut builder = Self::builder().env();
        for file in files {
            builder = builder.file(file.as_ref());
        }
        builder
            .load()
            .map_err(|e| PostvizError::Config(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = PostvizConfig::default();
        assert_eq!(config.read_policy, ReadPolicy::Repair);
        assert_eq!(config.outline_mesh_name, "mesh-outline");
    }

    #[test]
    fn test_missing_files_fall_back_to_defaults() {
        let dir = tempdir().unwrap();
        let config = PostvizConfig::load(&[dir.path().join(CONFIG_FILE_NAME)]).unwrap();
        assert_eq!(config.outline_mesh_name, "mesh-outline");
    }

    #[test]
    fn test_first_file_wins() {
        let dir = tempdir().unwrap();
        let local = dir.path().join("local.toml");
        let global = dir.path().join("global.toml");
        fs::write(&local, "outline_mesh_name = \"outline\"\n").unwrap();
        fs::write(
            &global,
            "outline_mesh_name = \"ignored\"\nread_policy = \"strict\"\n",
        )
        .unwrap();

        let config = PostvizConfig::load(&[local, global]).unwrap();
        assert_eq!(config.outline_mesh_name, "outline");
        assert_eq!(config.read_policy, ReadPolicy::Strict);
    }

    #[test]
    fn test_unknown_policy_is_a_config_error() {
        let dir = tempdir().unwrap();
        let file = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&file, "read_policy = \"lenient\"\n").unwrap();
        assert!(matches!(
            PostvizConfig::load(&[file]),
            Err(PostvizError::Config(_))
        ));
    }
}
