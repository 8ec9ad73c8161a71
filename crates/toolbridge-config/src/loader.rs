// SPDX-FileCopyrightText: 2026 Toolbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./toolbridge.toml` > `~/.config/toolbridge/toolbridge.toml`
//! > `/etc/toolbridge/toolbridge.toml`, with environment variable overrides via
//! the `TOOLBRIDGE_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::ToolbridgeConfig;

/// System-wide configuration file.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/toolbridge/toolbridge.toml";

/// Configuration file looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "toolbridge.toml";

/// The per-user configuration file, when a config directory is known.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("toolbridge").join(LOCAL_CONFIG_FILE))
}

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/toolbridge/toolbridge.toml` (system-wide)
/// 3. `~/.config/toolbridge/toolbridge.toml` (user XDG config)
/// 4. `./toolbridge.toml` (local directory)
/// 5. `TOOLBRIDGE_*` environment variables
pub fn load_config() -> Result<ToolbridgeConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string over the compiled defaults.
pub fn load_config_from_str(toml_content: &str) -> Result<ToolbridgeConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ToolbridgeConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<ToolbridgeConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ToolbridgeConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used internally for config loading.
///
/// Returns the Figment before extraction so callers can inspect metadata.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(ToolbridgeConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG_PATH))
        .merge(Toml::file(user_config_path().unwrap_or_default()))
        .merge(Toml::file(LOCAL_CONFIG_FILE))
        .merge(env_provider())
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` because key names contain
/// underscores: `TOOLBRIDGE_AGENT_API_KEY` must map to `agent.api_key`, not
/// `agent.api.key`.
fn env_provider() -> Env {
    Env::prefixed("TOOLBRIDGE_").map(|key| {
        // `key` is the lowercased env var name with the prefix stripped.
        let key_str = key.as_str();
        let mapped = if key_str.starts_with("agent_") {
            key_str.replacen("agent_", "agent.", 1)
        } else if key_str.starts_with("tools_") {
            key_str.replacen("tools_", "tools.", 1)
        } else {
            key_str.to_string()
        };
        mapped.into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_overrides_defaults() {
        let config = load_config_from_str("[agent]\nname = \"calc\"\n").unwrap();
        assert_eq!(config.agent.name, "calc");
        assert_eq!(config.tools.default_version, "1.0.0");
    }

    #[test]
    fn env_keys_map_onto_sections() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("TOOLBRIDGE_AGENT_API_KEY", "sk-test");
            jail.set_env("TOOLBRIDGE_TOOLS_DEFAULT_AUTHOR", "Platform Team");
            let config: ToolbridgeConfig = Figment::new()
                .merge(Serialized::defaults(ToolbridgeConfig::default()))
                .merge(env_provider())
                .extract()?;
            assert_eq!(config.agent.api_key.as_deref(), Some("sk-test"));
            assert_eq!(config.tools.default_author, "Platform Team");
            Ok(())
        });
    }

    #[test]
    fn local_file_is_merged() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                LOCAL_CONFIG_FILE,
                "[tools]\ndefault_version = \"0.3.0\"\nserialize_calls = true\n",
            )?;
            let config = load_config()?;
            assert_eq!(config.tools.default_version, "0.3.0");
            assert!(config.tools.serialize_calls);
            Ok(())
        });
    }
}
