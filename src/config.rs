//! Tree options with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults: `id`, `parentId`, `children`
//! 2. Global config: `$XDG_CONFIG_HOME/flattree/flattree.toml`
//! 3. Local config: file handed to [`TreeOptions::load`]
//! 4. Environment variables: `FLATTREE_*` prefix

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::errors::{TreeError, TreeResult};

pub const DEFAULT_ID_KEY: &str = "id";
pub const DEFAULT_PARENT_ID_KEY: &str = "parentId";
pub const DEFAULT_CHILDREN_KEY: &str = "children";

/// Prefix of the environment variables read by [`TreeOptions::load`].
pub const ENV_PREFIX: &str = "FLATTREE";

/// Field names used to read and write records.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TreeOptions {
    /// Identifier field on each record
    pub id_key: String,
    /// Field holding the parent's identifier
    pub parent_id_key: String,
    /// Field receiving nested children on reconstructed output
    pub children_key: String,
}

impl Default for TreeOptions {
    fn default() -> Self {
        Self {
            id_key: DEFAULT_ID_KEY.into(),
            parent_id_key: DEFAULT_PARENT_ID_KEY.into(),
            children_key: DEFAULT_CHILDREN_KEY.into(),
        }
    }
}

/// Partially specified options, merged over a base with [`TreeOptions::merge`].
///
/// `None` means "not specified, inherit from base".
#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct RawTreeOptions {
    #[serde(alias = "idKey")]
    pub id_key: Option<String>,
    #[serde(alias = "parentIdKey")]
    pub parent_id_key: Option<String>,
    #[serde(alias = "childrenKey")]
    pub children_key: Option<String>,
}

/// Get the XDG config directory for flattree.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "flattree").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("flattree.toml"))
}

fn config_err(e: ConfigError) -> TreeError {
    TreeError::Config {
        message: e.to_string(),
    }
}

/// Load a TOML file into RawTreeOptions for manual merging.
fn load_raw_options(path: &Path) -> TreeResult<RawTreeOptions> {
    let content = std::fs::read_to_string(path).map_err(|e| TreeError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| TreeError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl TreeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_id_key(mut self, key: impl Into<String>) -> Self {
        self.id_key = key.into();
        self
    }

    pub fn with_parent_id_key(mut self, key: impl Into<String>) -> Self {
        self.parent_id_key = key.into();
        self
    }

    pub fn with_children_key(mut self, key: impl Into<String>) -> Self {
        self.children_key = key.into();
        self
    }

    /// Overlay the fields set in `overlay`; unset fields keep the base value.
    pub fn merge(&self, overlay: &RawTreeOptions) -> Self {
        Self {
            id_key: overlay.id_key.clone().unwrap_or_else(|| self.id_key.clone()),
            parent_id_key: overlay
                .parent_id_key
                .clone()
                .unwrap_or_else(|| self.parent_id_key.clone()),
            children_key: overlay
                .children_key
                .clone()
                .unwrap_or_else(|| self.children_key.clone()),
        }
    }

    /// Reject empty keys and keys that would read or write the same field.
    pub fn validate(&self) -> TreeResult<()> {
        let fields = [
            ("id_key", &self.id_key),
            ("parent_id_key", &self.parent_id_key),
            ("children_key", &self.children_key),
        ];
        for (field, value) in fields {
            if value.trim().is_empty() {
                return Err(TreeError::InvalidOptions {
                    field,
                    reason: "must not be empty".into(),
                });
            }
        }
        if self.id_key == self.parent_id_key {
            return Err(TreeError::InvalidOptions {
                field: "parent_id_key",
                reason: format!("same field as id_key: {}", self.id_key),
            });
        }
        if self.children_key == self.id_key || self.children_key == self.parent_id_key {
            return Err(TreeError::InvalidOptions {
                field: "children_key",
                reason: format!("collides with an identifier field: {}", self.children_key),
            });
        }
        Ok(())
    }

    /// Load options with layered precedence.
    ///
    /// # Arguments
    /// * `local` - Optional project-local config file, skipped when missing
    ///
    /// # Precedence (lowest to highest)
    /// 1. Compiled defaults
    /// 2. Global config: `$XDG_CONFIG_HOME/flattree/flattree.toml`
    /// 3. Local config
    /// 4. Environment variables: `FLATTREE_ID_KEY`, `FLATTREE_PARENT_ID_KEY`, `FLATTREE_CHILDREN_KEY`
    pub fn load(local: Option<&Path>) -> TreeResult<Self> {
        let global = global_config_path();
        Self::load_layers(global.as_deref(), local, ENV_PREFIX)
    }

    /// Same pipeline as [`TreeOptions::load`] with every source named explicitly.
    #[instrument(level = "debug")]
    pub fn load_layers(
        global: Option<&Path>,
        local: Option<&Path>,
        env_prefix: &str,
    ) -> TreeResult<Self> {
        let mut current = Self::default();

        for path in [global, local].into_iter().flatten() {
            if path.exists() {
                let raw = load_raw_options(path)?;
                debug!("Applying config file {}: {:?}", path.display(), raw);
                current = current.merge(&raw);
            }
        }

        current = current.apply_env_overrides(env_prefix)?;
        current.validate()?;

        debug!("Resolved tree options: {:?}", current);
        Ok(current)
    }

    /// Apply `<PREFIX>_*` environment variables as explicit overrides.
    fn apply_env_overrides(self, env_prefix: &str) -> TreeResult<Self> {
        let config = Config::builder()
            .add_source(
                Environment::with_prefix(env_prefix)
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .map_err(config_err)?;

        let overlay = RawTreeOptions {
            id_key: config.get_string("id_key").ok(),
            parent_id_key: config.get_string("parent_id_key").ok(),
            children_key: config.get_string("children_key").ok(),
        };
        Ok(self.merge(&overlay))
    }
}
