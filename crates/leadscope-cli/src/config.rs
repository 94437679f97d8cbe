// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use leadscope_app::{
    DEFAULT_MAX_RESULTS, MAX_MAX_RESULTS, MIN_MAX_RESULTS, SearchParams, SearchPlatform,
};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

pub const APP_NAME: &str = "leadscope";
const CONFIG_VERSION: i64 = 1;
const DEFAULT_BASE_URL: &str = "http://localhost:8000";
const DEFAULT_EXPORT_FILE_NAME: &str = "leads.csv";
const DEFAULT_LOG_LEVEL: &str = "info";
const CONFIG_PATH_ENV: &str = "LEADSCOPE_CONFIG_PATH";
const BASE_URL_ENV: &str = "LEADSCOPE_BASE_URL";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub version: i64,
    #[serde(default)]
    pub server: Server,
    #[serde(default)]
    pub search: Search,
    #[serde(default)]
    pub export: Export,
    #[serde(default)]
    pub log: Log,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            server: Server::default(),
            search: Search::default(),
            export: Export::default(),
            log: Log::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Server {
    pub base_url: Option<String>,
    pub timeout: Option<String>,
}

impl Default for Server {
    fn default() -> Self {
        Self {
            base_url: Some(DEFAULT_BASE_URL.to_owned()),
            timeout: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Search {
    pub default_platform: Option<String>,
    pub default_max_results: Option<i64>,
}

impl Default for Search {
    fn default() -> Self {
        Self {
            default_platform: Some(SearchPlatform::default().as_str().to_owned()),
            default_max_results: Some(i64::from(DEFAULT_MAX_RESULTS)),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Export {
    pub dir: Option<String>,
    pub file_name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Log {
    pub file: Option<String>,
    pub level: Option<String>,
}

impl Config {
    pub fn default_path() -> Result<PathBuf> {
        if let Some(path) = env::var_os(CONFIG_PATH_ENV) {
            return Ok(PathBuf::from(path));
        }

        let config_root = dirs::config_dir().ok_or_else(|| {
            anyhow!("cannot resolve config directory; set {CONFIG_PATH_ENV} to the config file")
        })?;
        Ok(config_root.join(APP_NAME).join("config.toml"))
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(path)
            .with_context(|| format!("read config file {}", path.display()))?;
        let value: toml::Value = toml::from_str(&raw)
            .with_context(|| format!("parse TOML config {}", path.display()))?;

        let version = value
            .get("version")
            .and_then(toml::Value::as_integer)
            .ok_or_else(|| {
                anyhow!(
                    "config file {} is not versioned. Add `version = 1` and put values under [server], [search], [export], and [log]",
                    path.display()
                )
            })?;

        if version != CONFIG_VERSION {
            bail!(
                "unsupported config version {} in {}; expected version = 1",
                version,
                path.display()
            );
        }

        let config: Config = value
            .try_into()
            .with_context(|| format!("decode config {}", path.display()))?;
        config.validate(path)?;
        Ok(config)
    }

    /// Replaces `[server].base_url` when `LEADSCOPE_BASE_URL` is set and
    /// non-empty.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(base_url) = env::var(BASE_URL_ENV)
            && !base_url.trim().is_empty()
        {
            self.server.base_url = Some(base_url);
        }
    }

    fn validate(&self, path: &Path) -> Result<()> {
        validate_base_url(self.base_url())
            .with_context(|| format!("invalid [server] base_url in {}", path.display()))?;

        if let Some(timeout) = &self.server.timeout {
            let parsed = parse_duration(timeout)?;
            if parsed.is_zero() {
                bail!(
                    "server.timeout in {} must be positive, got {}",
                    path.display(),
                    timeout
                );
            }
        }

        if let Some(platform) = &self.search.default_platform
            && SearchPlatform::parse(platform).is_none()
        {
            bail!(
                "search.default_platform in {} must be \"linkedin\" or \"x\", got {:?}",
                path.display(),
                platform
            );
        }

        if let Some(max_results) = self.search.default_max_results
            && !(i64::from(MIN_MAX_RESULTS)..=i64::from(MAX_MAX_RESULTS)).contains(&max_results)
        {
            bail!(
                "search.default_max_results in {} must be between {} and {}, got {}",
                path.display(),
                MIN_MAX_RESULTS,
                MAX_MAX_RESULTS,
                max_results
            );
        }

        if let Some(file_name) = &self.export.file_name {
            let trimmed = file_name.trim();
            if trimmed.is_empty() || trimmed.contains(['/', '\\']) {
                bail!(
                    "export.file_name in {} must be a plain file name, got {:?}",
                    path.display(),
                    file_name
                );
            }
        }

        Ok(())
    }

    pub fn base_url(&self) -> &str {
        self.server
            .base_url
            .as_deref()
            .unwrap_or(DEFAULT_BASE_URL)
            .trim()
            .trim_end_matches('/')
    }

    pub fn set_base_url(&mut self, base_url: impl Into<String>) {
        self.server.base_url = Some(base_url.into());
    }

    /// `None` means requests never time out on the client side.
    pub fn timeout(&self) -> Result<Option<Duration>> {
        self.server
            .timeout
            .as_deref()
            .map(parse_duration)
            .transpose()
    }

    pub fn search_defaults(&self) -> SearchParams {
        let platform = self
            .search
            .default_platform
            .as_deref()
            .and_then(SearchPlatform::parse)
            .unwrap_or_default();
        let max_results = self
            .search
            .default_max_results
            .unwrap_or(i64::from(DEFAULT_MAX_RESULTS));
        SearchParams::new("", "", platform, max_results)
    }

    /// `[export].dir`, else the platform download directory, else the
    /// working directory.
    pub fn export_path(&self) -> PathBuf {
        let dir = match &self.export.dir {
            Some(dir) => PathBuf::from(dir),
            None => dirs::download_dir().unwrap_or_else(|| PathBuf::from(".")),
        };
        let file_name = self
            .export
            .file_name
            .as_deref()
            .map(str::trim)
            .unwrap_or(DEFAULT_EXPORT_FILE_NAME);
        dir.join(file_name)
    }

    pub fn log_path(&self) -> Result<PathBuf> {
        if let Some(file) = &self.log.file {
            return Ok(PathBuf::from(file));
        }
        let data_root = dirs::data_local_dir().ok_or_else(|| {
            anyhow!("cannot resolve data directory; set [log].file in the config")
        })?;
        Ok(data_root.join(APP_NAME).join("leadscope.log"))
    }

    pub fn log_level(&self) -> &str {
        self.log.level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL)
    }

    pub fn example_config(path: &Path) -> String {
        format!(
            "# leadscope config\n# Place this file at: {}\n\nversion = 1\n\n[server]\nbase_url = \"{}\"\n# Optional. Unset means no client-side timeout.\n# timeout = \"30s\"\n\n[search]\ndefault_platform = \"linkedin\"\ndefault_max_results = {}\n\n[export]\n# Optional. Default is the platform download dir, else the working directory.\n# dir = \"/absolute/path/to/exports\"\nfile_name = \"{}\"\n\n[log]\n# Optional. Default is the platform data dir (for example ~/.local/share/leadscope/leadscope.log)\n# file = \"/absolute/path/to/leadscope.log\"\nlevel = \"{}\"\n",
            path.display(),
            DEFAULT_BASE_URL,
            DEFAULT_MAX_RESULTS,
            DEFAULT_EXPORT_FILE_NAME,
            DEFAULT_LOG_LEVEL,
        )
    }
}

pub fn validate_base_url(raw: &str) -> Result<()> {
    let url = Url::parse(raw).with_context(|| format!("base_url {raw:?} is not a valid URL"))?;
    if !matches!(url.scheme(), "http" | "https") {
        bail!("base_url must use http or https, got {:?}", url.scheme());
    }
    Ok(())
}

fn parse_duration(raw: &str) -> Result<Duration> {
    if let Some(value) = raw.strip_suffix("ms") {
        let millis: u64 = value
            .parse()
            .with_context(|| format!("invalid timeout duration {raw:?}"))?;
        return Ok(Duration::from_millis(millis));
    }
    if let Some(value) = raw.strip_suffix('s') {
        let secs: u64 = value
            .parse()
            .with_context(|| format!("invalid timeout duration {raw:?}"))?;
        return Ok(Duration::from_secs(secs));
    }
    if let Some(value) = raw.strip_suffix('m') {
        let mins: u64 = value
            .parse()
            .with_context(|| format!("invalid timeout duration {raw:?}"))?;
        return Ok(Duration::from_secs(mins * 60));
    }

    bail!("invalid duration {raw:?}; use one of: <N>ms, <N>s, <N>m (for example 500ms or 30s)")
}
