use std::{
    collections::BTreeMap,
    env, fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Name of the configuration file inside the configuration directory
pub const CONFIG_FILE: &str = "projects.yml";

/// Default orchestrator command
pub const DEFAULT_COMPOSE_COMMAND: &str = "docker-compose";

/// Get the configuration directory path
/// Checks DOCKER_MANAGER_DIR environment variable first,
/// then defaults to ~/.docker-manager
pub fn get_config_dir() -> Result<PathBuf> {
    if let Ok(custom_dir) = env::var("DOCKER_MANAGER_DIR") {
        return Ok(PathBuf::from(custom_dir));
    }

    let home_dir = dirs::home_dir().context("Failed to get home directory")?;

    Ok(home_dir.join(".docker-manager"))
}

/// Ensure the configuration directory exists and holds a config file
pub fn ensure_default_config(config_dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(config_dir).context("Failed to create config directory")?;

    let config_file = config_dir.join(CONFIG_FILE);
    if !config_file.exists() {
        let defaults = Config {
            search_path: Some("~/devwww/docker".to_string()),
            compose_command: Some(vec![DEFAULT_COMPOSE_COMMAND.to_string()]),
            projects: BTreeMap::new(),
        };
        save_config(&config_file, &defaults).context("Failed to write default config file")?;
    }

    Ok(config_file)
}

/// User configuration stored in projects.yml
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Config {
    /// Root directory scanned for projects
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_path: Option<String>,
    /// Orchestrator program followed by leading arguments
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compose_command: Option<Vec<String>>,
    #[serde(default)]
    pub projects: BTreeMap<String, ProjectConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct ProjectConfig {
    /// Extra environment variables for orchestrator commands
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub env: BTreeMap<String, String>,
}

impl Config {
    /// Settings of a project, or defaults when it has none
    pub fn project(&self, name: &str) -> ProjectConfig {
        self.projects.get(name).cloned().unwrap_or_default()
    }
}

/// Load configuration, returning defaults when the file does not exist
pub fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }

    let content =
        fs::read_to_string(path).context(format!("Failed to read config file: {:?}", path))?;

    // An empty file deserializes as null
    if content.trim().is_empty() {
        return Ok(Config::default());
    }

    serde_yaml::from_str(&content).context(format!("Failed to parse config file: {:?}", path))
}

/// Write configuration as YAML, creating the parent directory if needed
pub fn save_config(path: &Path, config: &Config) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("Failed to create config directory")?;
    }

    let content = serde_yaml::to_string(config).context("Failed to serialize config")?;
    fs::write(path, content).context(format!("Failed to write config file: {:?}", path))?;

    Ok(())
}

/// Values resolved once at startup and handed to every command
#[derive(Debug, Clone)]
pub struct Settings {
    pub config_dir: PathBuf,
    /// Directory scanned for docker-* projects
    pub search_root: PathBuf,
    /// Orchestrator argv prefix, never empty
    pub compose_command: Vec<String>,
    pub config: Config,
}

impl Settings {
    pub fn resolve(config_dir: PathBuf, config: Config) -> Result<Self> {
        let home_dir = dirs::home_dir().context("Failed to get home directory")?;

        let search_root = match &config.search_path {
            Some(path) => expand_home(path, &home_dir),
            None => home_dir.join("devwww").join("docker"),
        };

        let compose_command = match &config.compose_command {
            Some(cmd) if !cmd.is_empty() => cmd.clone(),
            _ => vec![DEFAULT_COMPOSE_COMMAND.to_string()],
        };

        Ok(Self {
            config_dir,
            search_root,
            compose_command,
            config,
        })
    }
}

/// Expand a leading `~` to the home directory
fn expand_home(path: &str, home_dir: &Path) -> PathBuf {
    if path == "~" {
        return home_dir.to_path_buf();
    }
    match path.strip_prefix("~/") {
        Some(rest) => home_dir.join(rest),
        None => PathBuf::from(path),
    }
}
