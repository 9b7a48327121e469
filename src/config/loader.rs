//! Configuration Loader (Figment-based)
//!
//! Loads and merges configuration from multiple sources using Figment:
//! 1. Built-in defaults (Serialized)
//! 2. Global config (platform config dir, e.g. ~/.config/repoglance/config.toml)
//! 3. Project config (.repoglance/config.toml)
//! 4. Environment variables (REPOGLANCE_* prefix, `__` between sections)

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::types::Config;
use crate::types::{GlanceError, Result};

const ENV_PREFIX: &str = "REPOGLANCE_";

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with full resolution chain using Figment:
    /// defaults → global → project → env vars
    pub fn load() -> Result<Config> {
        Self::load_from_paths(
            Self::global_config_path().as_deref(),
            &Self::project_config_path(),
        )
    }

    /// Same chain as [`load`](Self::load) with explicit file locations
    pub fn load_from_paths(global: Option<&Path>, project: &Path) -> Result<Config> {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

        if let Some(global_path) = global
            && global_path.exists()
        {
            debug!("Loading global config from: {}", global_path.display());
            figment = figment.merge(Toml::file(global_path));
        }

        if project.exists() {
            debug!("Loading project config from: {}", project.display());
            figment = figment.merge(Toml::file(project));
        }

        // e.g. REPOGLANCE_LLM__BULK_MODEL -> llm.bulk_model
        figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__").lowercase(true));

        let config: Config = figment
            .extract()
            .map_err(|e| GlanceError::Config(format!("Configuration error: {}", e)))?;

        config.validate()?;

        Ok(config)
    }

    /// Load configuration from a specific file only
    pub fn load_from_file(path: &Path) -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(path))
            .extract()
            .map_err(|e| GlanceError::Config(format!("Configuration error: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    // =========================================================================
    // Path Management
    // =========================================================================

    fn project_dirs() -> Option<ProjectDirs> {
        ProjectDirs::from("", "", "repoglance")
    }

    /// Platform config directory for repoglance
    pub fn global_dir() -> Option<PathBuf> {
        Self::project_dirs().map(|dirs| dirs.config_dir().to_path_buf())
    }

    pub fn global_config_path() -> Option<PathBuf> {
        Self::global_dir().map(|dir| dir.join("config.toml"))
    }

    pub fn project_dir() -> PathBuf {
        PathBuf::from(".repoglance")
    }

    pub fn project_config_path() -> PathBuf {
        Self::project_dir().join("config.toml")
    }

    // =========================================================================
    // Config Commands
    // =========================================================================

    /// Show config file paths
    pub fn show_path() {
        println!("Configuration paths:");
        println!();

        if let Some(global) = Self::global_config_path() {
            let exists = if global.exists() { "✓" } else { "✗" };
            println!("  Global:  {} {}", exists, global.display());
        } else {
            println!("  Global:  (not available)");
        }

        let project = Self::project_config_path();
        let exists = if project.exists() { "✓" } else { "✗" };
        println!("  Project: {} {}", exists, project.display());
    }

    /// Render the effective configuration (secrets omitted)
    pub fn render(config: &Config, as_json: bool) -> Result<String> {
        if as_json {
            Ok(serde_json::to_string_pretty(config)?)
        } else {
            toml::to_string_pretty(config).map_err(|e| GlanceError::Config(e.to_string()))
        }
    }

    pub fn show_config(as_json: bool) -> Result<()> {
        let config = Self::load()?;
        println!("{}", Self::render(&config, as_json)?);
        Ok(())
    }

    // =========================================================================
    // Initialization
    // =========================================================================

    /// Write a commented default config. Existing files are kept unless
    /// `force`. Returns the path and whether it was written.
    pub fn init(global: bool, force: bool) -> Result<(PathBuf, bool)> {
        let path = if global {
            Self::global_config_path().ok_or_else(|| {
                GlanceError::Config("Cannot determine global config path".to_string())
            })?
        } else {
            Self::project_config_path()
        };
        let written = Self::init_at(&path, force)?;
        Ok((path, written))
    }

    /// Returns whether a file was written
    pub fn init_at(path: &Path, force: bool) -> Result<bool> {
        if path.exists() && !force {
            info!("Config exists: {}", path.display());
            return Ok(false);
        }

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, Self::default_config())?;
        info!("Created config: {}", path.display());
        Ok(true)
    }

    // =========================================================================
    // Internal
    // =========================================================================

    fn default_config() -> String {
        r#"# repoglance configuration
# Project settings in .repoglance/config.toml override the global file.
# Environment overrides use REPOGLANCE_<SECTION>__<KEY>, e.g. REPOGLANCE_CACHE__TTL_SECS.

version = "1.0"

[llm]
provider = "anthropic"
bulk_model = "claude-haiku-4-5-20251001"
detail_model = "claude-sonnet-4-5-20250929"
timeout_secs = 120
# api_key = "..."        # or set ANTHROPIC_API_KEY

[github]
api_base = "https://api.github.com"
# token = "ghp_..."      # or set GITHUB_TOKEN

[cache]
capacity = 5000
ttl_secs = 1800

[explain]
chunk_size = 2
child_listing_cap = 10
show_hidden = false

# Dollars per million tokens
[pricing.bulk]
label = "Haiku"
input_per_mtok = 0.80
output_per_mtok = 4.0

[pricing.detail]
label = "Sonnet"
input_per_mtok = 3.0
output_per_mtok = 15.0

[pricing.ledger]
label = "Blended"
input_per_mtok = 3.0
output_per_mtok = 15.0
"#
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_without_files_gives_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config =
            ConfigLoader::load_from_paths(None, &temp_dir.path().join("missing.toml")).unwrap();
        assert_eq!(config.version, "1.0");
        assert_eq!(config.llm.provider, "anthropic");
    }

    #[test]
    fn test_default_file_matches_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        assert!(ConfigLoader::init_at(&path, false).unwrap());

        let loaded = ConfigLoader::load_from_file(&path).unwrap();
        let defaults = Config::default();
        assert_eq!(loaded.llm.bulk_model, defaults.llm.bulk_model);
        assert_eq!(loaded.llm.detail_model, defaults.llm.detail_model);
        assert_eq!(loaded.llm.timeout_secs, defaults.llm.timeout_secs);
        assert_eq!(loaded.cache.capacity, defaults.cache.capacity);
        assert_eq!(loaded.explain.chunk_size, defaults.explain.chunk_size);
        assert_eq!(loaded.pricing, defaults.pricing);
    }

    #[test]
    fn test_init_respects_force() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested/config.toml");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "version = \"custom\"\n").unwrap();

        assert!(!ConfigLoader::init_at(&path, false).unwrap());
        assert_eq!(fs::read_to_string(&path).unwrap(), "version = \"custom\"\n");

        assert!(ConfigLoader::init_at(&path, true).unwrap());
        assert!(fs::read_to_string(&path).unwrap().contains("[pricing.ledger]"));
    }

    #[test]
    fn test_project_overrides_global() {
        let temp_dir = TempDir::new().unwrap();
        let global = temp_dir.path().join("global.toml");
        let project = temp_dir.path().join("project.toml");
        fs::write(&global, "[cache]\ncapacity = 10\nttl_secs = 60\n").unwrap();
        fs::write(&project, "[cache]\nttl_secs = 90\n").unwrap();

        let config = ConfigLoader::load_from_paths(Some(&global), &project).unwrap();
        assert_eq!(config.cache.capacity, 10);
        assert_eq!(config.cache.ttl_secs, 90);
    }

    #[test]
    fn test_invalid_file_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "[explain]\nchunk_size = 0\n").unwrap();

        let err = ConfigLoader::load_from_file(&path).unwrap_err();
        assert!(err.to_string().contains("chunk_size"));
    }

    #[test]
    fn test_env_override() {
        let temp_dir = TempDir::new().unwrap();
        // SAFETY: no other test reads this variable
        unsafe {
            std::env::set_var("REPOGLANCE_LLM__BULK_MODEL", "test-model");
        }
        let config =
            ConfigLoader::load_from_paths(None, &temp_dir.path().join("missing.toml")).unwrap();
        unsafe {
            std::env::remove_var("REPOGLANCE_LLM__BULK_MODEL");
        }
        assert_eq!(config.llm.bulk_model, "test-model");
    }

    #[test]
    fn test_render_omits_secrets() {
        let mut config = Config::default();
        config.llm.api_key = Some("sk-ant-hidden".to_string());

        let toml = ConfigLoader::render(&config, false).unwrap();
        assert!(toml.contains("[llm]"));
        assert!(!toml.contains("sk-ant-hidden"));

        let json = ConfigLoader::render(&config, true).unwrap();
        assert!(json.contains("\"bulk_model\""));
        assert!(!json.contains("sk-ant-hidden"));
    }
}
