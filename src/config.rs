//! Configuration management for staysift
//!
//! Supports:
//! - TOML config file at XDG locations
//! - Environment variable overrides
//! - Command-line argument overrides

use std::env;
use std::fs;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use config::{Config, Environment, File, FileFormat};
use env_logger::fmt::WriteStyle;
use log::LevelFilter;
use serde::{Deserialize, Serialize};

use crate::cli::{GlobalOpts, OutputFormat};

const APP_NAME: &str = env!("CARGO_PKG_NAME");

/// Runtime context containing resolved configuration
#[derive(Debug, Clone)]
pub struct RuntimeContext {
    pub global: GlobalOpts,
    pub config: AppConfig,
    config_path: PathBuf,
}

impl RuntimeContext {
    pub fn new(global: &GlobalOpts) -> Result<Self> {
        let config_path = resolve_config_path(global.config.as_ref())?;
        let config = load_config(&config_path, global)?;

        Ok(Self {
            global: global.clone(),
            config,
            config_path,
        })
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn init_logging(&self) -> Result<()> {
        if self.global.quiet {
            log::set_max_level(LevelFilter::Off);
            return Ok(());
        }

        let mut builder = env_logger::Builder::from_env(
            env_logger::Env::default().default_filter_or(&self.config.logging.level),
        );

        builder.filter_level(self.effective_log_level());

        let force_color = env::var_os("FORCE_COLOR").is_some();
        let disable_color = self.global.no_color
            || env::var_os("NO_COLOR").is_some()
            || (!force_color && !std::io::stderr().is_terminal());

        if disable_color {
            builder.write_style(WriteStyle::Never);
        } else if force_color {
            builder.write_style(WriteStyle::Always);
        } else {
            builder.write_style(WriteStyle::Auto);
        }

        builder.try_init().or_else(|err| {
            if self.global.verbose > 0 {
                eprintln!("logger already initialized: {err}");
            }
            Ok(())
        })
    }

    fn effective_log_level(&self) -> LevelFilter {
        if self.global.trace {
            LevelFilter::Trace
        } else if self.global.debug {
            LevelFilter::Debug
        } else {
            match self.global.verbose {
                0 => self
                    .config
                    .logging
                    .level
                    .parse()
                    .unwrap_or(LevelFilter::Warn),
                1 => LevelFilter::Info,
                2 => LevelFilter::Debug,
                _ => LevelFilter::Trace,
            }
        }
    }

    /// Get the effective listing server URL
    pub fn server_url(&self) -> Result<&str> {
        self.global
            .server
            .as_deref()
            .or(self.config.source.server.as_deref())
            .ok_or_else(|| {
                anyhow!(
                    "No hotel listing server configured.\n\
                    Set via --server, STAYSIFT_SERVER env var, or in config file."
                )
            })
    }

    /// Get the local listing file, if one was given
    pub fn hotels_file(&self) -> Option<PathBuf> {
        self.global
            .hotels
            .clone()
            .or_else(|| self.config.source.file.as_ref().map(PathBuf::from))
    }

    /// Get the effective timeout in seconds
    pub fn timeout(&self) -> u64 {
        self.global.timeout.unwrap_or(self.config.source.timeout)
    }

    /// Check if SSL verification should be skipped
    pub fn insecure(&self) -> bool {
        self.global.insecure || self.config.source.insecure
    }

    /// Check if the on-disk listing cache may be used
    pub fn use_cache(&self) -> bool {
        self.config.cache.enabled && !self.global.no_cache
    }

    /// Get the effective output format
    pub fn output_format(&self) -> OutputFormat {
        if self.global.json {
            return OutputFormat::Json;
        }

        self.global
            .output_format
            .unwrap_or(match self.config.output.format.as_str() {
                "json" => OutputFormat::Json,
                "yaml" => OutputFormat::Yaml,
                "table" => OutputFormat::Table,
                _ => OutputFormat::Auto,
            })
    }
}

/// Application configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub source: SourceConfig,
    pub search: SearchConfig,
    pub cache: CacheConfig,
    pub output: OutputConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub server: Option<String>,
    pub file: Option<String>,
    pub timeout: u64,
    pub insecure: bool,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            server: None,
            file: None,
            timeout: 30,
            insecure: false,
        }
    }
}

/// Tuning for the search pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Loosest accepted fuzzy score (0.0 = exact only, 1.0 = anything)
    pub threshold: f64,
    /// Shortest query term that may match fuzzily
    pub min_match_char_length: usize,
    /// Top-rated hotels shown for vague queries
    pub vague_limit: usize,
    /// Autocomplete suggestions shown
    pub suggestion_limit: usize,
    /// Maximum hotels returned by recommendations
    pub recommendation_limit: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            threshold: 0.38,
            min_match_char_length: 2,
            vague_limit: 6,
            suggestion_limit: 7,
            recommendation_limit: 20,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub enabled: bool,
    /// Listing cache lifetime in seconds
    pub ttl: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl: crate::cache::ttl::HOTELS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub format: String,
    pub no_headers: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: "auto".to_string(),
            no_headers: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
        }
    }
}

fn resolve_config_path(override_path: Option<&PathBuf>) -> Result<PathBuf> {
    if let Some(path) = override_path {
        let expanded = expand_path(path)?;
        if expanded.is_dir() {
            return Ok(expanded.join("config.toml"));
        }
        return Ok(expanded);
    }

    Ok(default_config_dir()?.join("config.toml"))
}

fn load_config(config_path: &Path, global: &GlobalOpts) -> Result<AppConfig> {
    // Create default config if it doesn't exist
    if !config_path.exists() {
        write_default_config(config_path)?;
    }

    let defaults = SearchConfig::default();
    let config = Config::builder()
        // Set defaults
        .set_default("source.timeout", 30_i64)?
        .set_default("source.insecure", false)?
        .set_default("search.threshold", defaults.threshold)?
        .set_default("search.min_match_char_length", defaults.min_match_char_length as i64)?
        .set_default("search.vague_limit", defaults.vague_limit as i64)?
        .set_default("search.suggestion_limit", defaults.suggestion_limit as i64)?
        .set_default("search.recommendation_limit", defaults.recommendation_limit as i64)?
        .set_default("cache.enabled", true)?
        .set_default("cache.ttl", crate::cache::ttl::HOTELS as i64)?
        .set_default("output.format", "auto")?
        .set_default("output.no_headers", false)?
        .set_default("logging.level", "warn")?
        // Load from file
        .add_source(
            File::from(config_path)
                .format(FileFormat::Toml)
                .required(false),
        )
        // Environment variable overrides (STAYSIFT__SECTION__KEY)
        .add_source(
            Environment::with_prefix("STAYSIFT")
                .try_parsing(true)
                .separator("__"),
        )
        .build()?;

    let mut app_config: AppConfig = config.try_deserialize()?;

    // Apply CLI overrides
    if global.no_headers {
        app_config.output.no_headers = true;
    }

    Ok(app_config)
}

pub fn write_default_config(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating config directory {}", parent.display()))?;
    }

    let config = AppConfig::default();
    let toml = toml::to_string_pretty(&config).context("serializing default config")?;

    let content = format!(
        "# staysift configuration\n\
        # File: {}\n\
        #\n\
        # Environment variables:\n\
        #   STAYSIFT_SERVER - Hotel listing server URL\n\
        #   STAYSIFT_HOTELS - Local hotel listing (JSON array)\n\
        #   STAYSIFT__*     - Override any config value (e.g., STAYSIFT__SEARCH__THRESHOLD=0.3)\n\
        \n\
        {toml}",
        path.display()
    );

    fs::write(path, content).with_context(|| format!("writing config to {}", path.display()))
}

fn expand_path(path: &Path) -> Result<PathBuf> {
    if let Some(text) = path.to_str() {
        let expanded = shellexpand::full(text).context("expanding path")?;
        Ok(PathBuf::from(expanded.to_string()))
    } else {
        Ok(path.to_path_buf())
    }
}

fn default_config_dir() -> Result<PathBuf> {
    // Check XDG_CONFIG_HOME first
    if let Some(dir) = env::var_os("XDG_CONFIG_HOME").filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(dir).join(APP_NAME));
    }

    // Use platform-specific config directory
    if let Some(mut dir) = dirs::config_dir() {
        dir.push(APP_NAME);
        return Ok(dir);
    }

    // Fallback to ~/.config
    dirs::home_dir()
        .map(|home| home.join(".config").join(APP_NAME))
        .ok_or_else(|| anyhow!("unable to determine configuration directory"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.source.timeout, 30);
        assert!(!config.source.insecure);
        assert!(config.cache.enabled);
        assert_eq!(config.search.threshold, 0.38);
        assert_eq!(config.search.min_match_char_length, 2);
        assert_eq!(config.search.vague_limit, 6);
        assert_eq!(config.output.format, "auto");
    }

    #[test]
    fn test_config_serialization() {
        let config = AppConfig::default();
        let toml = toml::to_string_pretty(&config).unwrap();
        assert!(toml.contains("[source]"));
        assert!(toml.contains("[search]"));
        assert!(toml.contains("[cache]"));
        assert!(toml.contains("[output]"));
        assert!(toml.contains("[logging]"));
    }

    #[test]
    fn test_write_and_load_default_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        write_default_config(&path).unwrap();
        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("# staysift configuration"));

        let parsed: AppConfig = toml::from_str(&content).unwrap();
        assert_eq!(parsed.search.suggestion_limit, 7);
        assert_eq!(parsed.cache.ttl, crate::cache::ttl::HOTELS);
    }

    #[test]
    fn test_resolve_config_path_directory() {
        let dir = tempfile::tempdir().unwrap();
        let resolved = resolve_config_path(Some(&dir.path().to_path_buf())).unwrap();
        assert_eq!(resolved, dir.path().join("config.toml"));
    }
}
