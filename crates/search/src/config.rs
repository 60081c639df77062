//! Engine configuration via `typeahead.toml`
//!
//! Every field has a default, so an empty file (or no file at all) yields a
//! working engine on scope `sprompt`.

use crate::composite::CompositePolicy;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use typeahead_core::{Deadline, Error, Result};

/// Config file name
pub const CONFIG_FILE_NAME: &str = "typeahead.toml";

/// Scope used when none is configured
pub const DEFAULT_SCOPE: &str = "sprompt";

/// Result count used when a search does not ask for one
pub const DEFAULT_LIMIT: usize = 5;

/// Engine configuration loaded from `typeahead.toml`.
///
/// # Example
///
/// ```toml
/// scope = "places"
/// default_limit = 10
/// composite_policy = "persistent"
/// invalidate_composites_on_write = true
/// op_timeout_ms = 250
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TypeaheadConfig {
    /// Key scope; every store key embeds it
    #[serde(default = "default_scope")]
    pub scope: String,
    /// Results returned when a search sets no limit
    #[serde(default = "default_limit")]
    pub default_limit: usize,
    /// Composite set lifetime: `"ephemeral"` or `"persistent"`
    #[serde(default = "default_policy_str")]
    pub composite_policy: String,
    /// Drop persisted composites after every add, update and delete
    #[serde(default)]
    pub invalidate_composites_on_write: bool,
    /// Deadline applied to operations that do not carry their own
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub op_timeout_ms: Option<u64>,
}

fn default_scope() -> String {
    DEFAULT_SCOPE.to_string()
}

fn default_limit() -> usize {
    DEFAULT_LIMIT
}

fn default_policy_str() -> String {
    CompositePolicy::default().as_str().to_string()
}

impl Default for TypeaheadConfig {
    fn default() -> Self {
        Self {
            scope: default_scope(),
            default_limit: default_limit(),
            composite_policy: default_policy_str(),
            invalidate_composites_on_write: false,
            op_timeout_ms: None,
        }
    }
}

impl TypeaheadConfig {
    /// Config with everything default but the scope
    pub fn with_scope(scope: impl Into<String>) -> Self {
        Self {
            scope: scope.into(),
            ..Self::default()
        }
    }

    /// Parse the composite policy string.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not `"ephemeral"` or `"persistent"`.
    pub fn composite_policy(&self) -> Result<CompositePolicy> {
        CompositePolicy::parse(&self.composite_policy)
    }

    /// Deadline for an operation starting now, from `op_timeout_ms`
    pub fn default_deadline(&self) -> Deadline {
        match self.op_timeout_ms {
            Some(ms) => Deadline::after(Duration::from_millis(ms)),
            None => Deadline::none(),
        }
    }

    /// Check every field.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` for an empty scope, a scope containing `:`,
    /// or an unknown composite policy.
    pub fn validate(&self) -> Result<()> {
        if self.scope.trim().is_empty() {
            return Err(Error::InvalidConfig("scope must not be empty".to_string()));
        }
        if self.scope.contains(':') {
            return Err(Error::InvalidConfig(format!(
                "scope '{}' must not contain ':'",
                self.scope
            )));
        }
        self.composite_policy()?;
        Ok(())
    }

    /// Returns the default config file content with comments.
    pub fn default_toml() -> &'static str {
        r#"# Typeahead configuration
#
# Key scope. All keys live under db:{scope}, index:{scope}, hot:{scope}.
scope = "sprompt"

# Number of completions returned when a search does not set a limit.
default_limit = 5

# Lifetime of the derived sets used by fuzzy queries:
#   "ephemeral"  = recomputed per query and deleted after reading (never stale)
#   "persistent" = computed once and reused (fast, stale after writes)
composite_policy = "ephemeral"

# Drop persisted composite sets after every add/update/delete.
# Only meaningful with composite_policy = "persistent".
invalidate_composites_on_write = false

# Deadline in milliseconds for operations that do not carry their own.
# op_timeout_ms = 250
"#
    }

    /// Read and parse config from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::InvalidConfig(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        let config: TypeaheadConfig = toml::from_str(&content).map_err(|e| {
            Error::InvalidConfig(format!(
                "Failed to parse config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Write the default config file if it does not already exist.
    ///
    /// Returns `Ok(())` whether the file was created or already existed.
    pub fn write_default_if_missing(path: &Path) -> Result<()> {
        if !path.exists() {
            std::fs::write(path, Self::default_toml()).map_err(|e| {
                Error::InvalidConfig(format!(
                    "Failed to write default config file '{}': {}",
                    path.display(),
                    e
                ))
            })?;
        }
        Ok(())
    }

    /// Serialize this config to TOML and write it to the given path.
    pub fn write_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::InvalidConfig(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content).map_err(|e| {
            Error::InvalidConfig(format!(
                "Failed to write config file '{}': {}",
                path.display(),
                e
            ))
        })
    }
}
