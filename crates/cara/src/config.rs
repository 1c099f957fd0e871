// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Global configuration - single source of truth for constants.
//!
//! # Architecture
//!
//! - **Level 1 (Static)**: compile-time constants (codec tags, wire sizes)
//! - **Level 2 (Dynamic)**: `RuntimeConfig`, handed to each `Endpoint`
//!   and optionally loaded from YAML
//!
//! # Example
//!
//! ```ignore
//! use cara::config::RuntimeConfig;
//!
//! let config = RuntimeConfig::from_yaml_str("first_object_id: 1000")?;
//! config.apply_process_defaults();
//! let endpoint = cara::rpc::Endpoint::new(7, &config);
//! ```

// =======================================================================
// Codec translation-table tags
// =======================================================================

/// Translation-table tag for interface values implemented in this process.
pub const LOCAL_INTERFACE_TAG: u8 = 100;

/// Translation-table tag for remote handles held by this process.
pub const REMOTE_INTERFACE_TAG: u8 = 101;

/// Size of an encoded wire reference: object id (u64 LE) + owner peer (u64 LE).
pub const WIRE_REF_LEN: usize = 16;

// =======================================================================
// Object model
// =======================================================================

/// Separator for nested field paths in `ListValue::get` filters.
///
/// `position__x` means "field `position`, then its nested field `x`".
pub const FIELD_PATH_SEPARATOR: &str = "__";

/// First id handed out by an exposed-object table.
///
/// Id 0 is never assigned so a zeroed reference is always invalid.
pub const FIRST_OBJECT_ID: u64 = 1;

// =======================================================================
// Runtime Configuration
// =======================================================================

/// Runtime configuration shared by endpoints.
///
/// Cheap to clone; each `Endpoint` copies the values it needs at
/// construction time.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "config-loaders", derive(serde::Deserialize))]
#[cfg_attr(feature = "config-loaders", serde(default))]
pub struct RuntimeConfig {
    /// Tag used for local interface values in the codec translation table.
    pub local_interface_tag: u8,
    /// Tag used for remote handles in the codec translation table.
    pub remote_interface_tag: u8,
    /// First id assigned by exposed-object tables.
    pub first_object_id: u64,
    /// Check values converted to builtin kinds (None = debug builds only).
    pub check_builtins: Option<bool>,
}

impl RuntimeConfig {
    /// Create the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self {
            local_interface_tag: LOCAL_INTERFACE_TAG,
            remote_interface_tag: REMOTE_INTERFACE_TAG,
            first_object_id: FIRST_OBJECT_ID,
            check_builtins: None,
        }
    }

    /// Validate tag and id settings.
    pub fn validate(&self) -> crate::Result<()> {
        if self.local_interface_tag == self.remote_interface_tag {
            return Err(crate::Error::Config(format!(
                "local and remote interface tags must differ (both {})",
                self.local_interface_tag
            )));
        }
        if self.first_object_id == 0 {
            return Err(crate::Error::Config(
                "first_object_id must be non-zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Install process-wide settings (builtin checking).
    pub fn apply_process_defaults(&self) {
        if let Some(enabled) = self.check_builtins {
            crate::builtin::set_checking(enabled);
        }
    }

    /// Parse configuration from YAML.
    ///
    /// ```yaml
    /// local_interface_tag: 100
    /// remote_interface_tag: 101
    /// first_object_id: 1
    /// check_builtins: true
    /// ```
    #[cfg(feature = "config-loaders")]
    pub fn from_yaml_str(yaml_content: &str) -> crate::Result<Self> {
        let config: Self = serde_yaml::from_str(yaml_content)
            .map_err(|e| crate::Error::Config(format!("Failed to parse YAML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a YAML file.
    #[cfg(feature = "config-loaders")]
    pub fn load_from_file<P: AsRef<std::path::Path>>(path: P) -> crate::Result<Self> {
        let path = path.as_ref();
        let yaml_content = std::fs::read_to_string(path).map_err(|e| {
            crate::Error::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        log::debug!("[config] loading runtime config from {}", path.display());
        Self::from_yaml_str(&yaml_content)
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self::new()
    }
}
