use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use qparse_core::MAX_ENTITIES_PER_PAGE;
use serde::Deserialize;
use thiserror::Error;

const APP_DIR: &str = "qparse";
const CONFIG_FILENAME: &str = "config.toml";

pub const ACTIVE_PARSERS_ENV: &str = "QPARSE_ACTIVE_PARSERS";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppConfig {
    pub parsers: ParsersConfig,
    pub read: ReadConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsersConfig {
    /// `None` keeps every registered parser active.
    pub active: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadConfig {
    pub entities_per_page: u32,
    pub return_fields: Vec<String>,
}

impl Default for ReadConfig {
    fn default() -> Self {
        Self {
            entities_per_page: MAX_ENTITIES_PER_PAGE,
            return_fields: vec!["id".to_string()],
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing home directory")]
    MissingHomeDir,
    #[error("invalid config path: {0}")]
    InvalidConfigPath(PathBuf),
    #[error("config file not found: {0}")]
    MissingConfigFile(PathBuf),
    #[error("parser name cannot be empty")]
    EmptyParserName,
    #[error("duplicate parser name: {0}")]
    DuplicateParserName(String),
    #[error("invalid entities_per_page value: {0}")]
    InvalidEntitiesPerPage(u32),
    #[error("return field name cannot be empty")]
    EmptyReturnField,
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    parsers: Option<ParsersFile>,
    read: Option<ReadFile>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ParsersFile {
    active: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ReadFile {
    entities_per_page: Option<u32>,
    return_fields: Option<Vec<String>>,
}

/// Loads the config file, then applies `QPARSE_ACTIVE_PARSERS` on top.
pub fn load(config_path: Option<PathBuf>) -> Result<AppConfig> {
    let mut config = load_file(config_path)?;
    if let Some(raw) = env::var_os(ACTIVE_PARSERS_ENV) {
        let raw = raw.to_string_lossy();
        config.parsers.active = Some(parse_parser_list(&raw)?);
    }
    Ok(config)
}

fn load_file(config_path: Option<PathBuf>) -> Result<AppConfig> {
    let required = config_path.is_some();
    let path = match resolve_config_path(config_path) {
        Ok(path) => path,
        Err(ConfigError::MissingHomeDir) if !required => return Ok(AppConfig::default()),
        Err(ConfigError::InvalidConfigPath(_)) if !required => return Ok(AppConfig::default()),
        Err(err) => return Err(err),
    };
    match load_at_path(&path, required)? {
        Some(config) => Ok(config),
        None => Ok(AppConfig::default()),
    }
}

pub fn resolve_config_path(custom: Option<PathBuf>) -> Result<PathBuf> {
    match custom {
        Some(path) => {
            if path.as_os_str().is_empty() {
                return Err(ConfigError::InvalidConfigPath(path));
            }
            Ok(path)
        }
        None => {
            let base = if let Some(dir) = env::var_os("XDG_CONFIG_HOME") {
                let path = PathBuf::from(dir);
                if path.as_os_str().is_empty() {
                    return Err(ConfigError::InvalidConfigPath(path));
                }
                path
            } else {
                let home = dirs::home_dir().ok_or(ConfigError::MissingHomeDir)?;
                home.join(".config")
            };
            Ok(base.join(APP_DIR).join(CONFIG_FILENAME))
        }
    }
}

fn load_at_path(path: &Path, required: bool) -> Result<Option<AppConfig>> {
    if !path.exists() {
        if required {
            return Err(ConfigError::MissingConfigFile(path.to_path_buf()));
        }
        return Ok(None);
    }

    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let parsed: ConfigFile = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Some(merge_config(parsed)?))
}

fn merge_config(parsed: ConfigFile) -> Result<AppConfig> {
    let mut config = AppConfig::default();

    if let Some(parsers) = parsed.parsers {
        if let Some(active) = parsers.active {
            config.parsers.active = Some(normalize_parser_names(active)?);
        }
    }

    if let Some(read) = parsed.read {
        if let Some(per_page) = read.entities_per_page {
            if per_page == 0 || per_page > MAX_ENTITIES_PER_PAGE {
                return Err(ConfigError::InvalidEntitiesPerPage(per_page));
            }
            config.read.entities_per_page = per_page;
        }
        if let Some(fields) = read.return_fields {
            let mut normalized = Vec::with_capacity(fields.len());
            for field in fields {
                let trimmed = field.trim();
                if trimmed.is_empty() {
                    return Err(ConfigError::EmptyReturnField);
                }
                normalized.push(trimmed.to_string());
            }
            if !normalized.is_empty() {
                config.read.return_fields = normalized;
            }
        }
    }

    Ok(config)
}

/// Comma-separated parser names, as accepted by the environment override.
pub fn parse_parser_list(raw: &str) -> Result<Vec<String>> {
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }
    normalize_parser_names(raw.split(',').map(str::to_string).collect())
}

fn normalize_parser_names(names: Vec<String>) -> Result<Vec<String>> {
    let mut out: Vec<String> = Vec::with_capacity(names.len());
    for name in names {
        let normalized = name.trim().to_ascii_lowercase();
        if normalized.is_empty() {
            return Err(ConfigError::EmptyParserName);
        }
        if out.contains(&normalized) {
            return Err(ConfigError::DuplicateParserName(normalized));
        }
        out.push(normalized);
    }
    Ok(out)
}
