//! Project model and discovery
//!
//! A project is a `docker-<name>` directory holding a docker-compose.yml.

pub mod discovery;

use std::{
    collections::BTreeMap,
    fmt,
    path::{Path, PathBuf},
};

use anyhow::{Result, bail};
use serde::Serialize;

/// Directory name prefix marking a project
pub const PROJECT_PREFIX: &str = "docker-";

/// Descriptor file expected in every project directory
pub const COMPOSE_FILE: &str = "docker-compose.yml";

/// Container state reported by the runtime
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceState {
    Running,
    Exited,
    Created,
    /// Any other state, kept verbatim
    #[serde(untagged)]
    Other(String),
}

impl ServiceState {
    pub fn parse(state: &str) -> Self {
        match state.trim().to_lowercase().as_str() {
            "running" => Self::Running,
            "exited" => Self::Exited,
            "created" => Self::Created,
            _ => Self::Other(state.trim().to_string()),
        }
    }
}

impl fmt::Display for ServiceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Running => f.write_str("running"),
            Self::Exited => f.write_str("exited"),
            Self::Created => f.write_str("created"),
            Self::Other(state) => f.write_str(state),
        }
    }
}

/// One container of a project, as listed by the runtime
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Service {
    pub name: String,
    pub state: ServiceState,
    pub container: String,
    /// Raw `PORTS` column
    pub ports: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    pub name: String,
    pub path: PathBuf,
    pub compose_path: PathBuf,
    pub services: Vec<Service>,
    pub running: bool,
    pub service_count: usize,
    /// Extra environment for orchestrator commands
    pub env: BTreeMap<String, String>,
}

impl Project {
    /// Build a project from its directory; the name is the directory name
    /// without the prefix, lower-cased for docker-compose.
    pub fn from_dir(path: &Path) -> Option<Self> {
        let dir_name = path.file_name()?.to_str()?;
        let name = dir_name.strip_prefix(PROJECT_PREFIX)?.to_lowercase();
        if name.is_empty() {
            return None;
        }

        Some(Self {
            name,
            path: path.to_path_buf(),
            compose_path: path.join(COMPOSE_FILE),
            services: Vec::new(),
            running: false,
            service_count: 0,
            env: BTreeMap::new(),
        })
    }

    pub fn compose_exists(&self) -> bool {
        self.compose_path.is_file()
    }

    pub fn status_string(&self) -> String {
        if self.running {
            format!("▶ Running ({} services)", self.service_count)
        } else {
            "⏹ Stopped".to_string()
        }
    }
}

/// Find a project by name
pub fn find<'a>(projects: &'a [Project], name: &str) -> Result<&'a Project> {
    match projects.iter().find(|p| p.name == name) {
        Some(project) => Ok(project),
        None => bail!("Project '{}' not found", name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_dir() {
        let project = Project::from_dir(Path::new("/srv/docker-MyShop")).unwrap();
        assert_eq!(project.name, "myshop");
        assert_eq!(project.compose_path, PathBuf::from("/srv/docker-MyShop/docker-compose.yml"));
        assert!(!project.running);

        assert!(Project::from_dir(Path::new("/srv/shop")).is_none());
        assert!(Project::from_dir(Path::new("/srv/docker-")).is_none());
    }

    #[test]
    fn test_status_string() {
        let mut project = Project::from_dir(Path::new("/srv/docker-shop")).unwrap();
        assert_eq!(project.status_string(), "⏹ Stopped");

        project.running = true;
        project.service_count = 3;
        assert_eq!(project.status_string(), "▶ Running (3 services)");
    }

    #[test]
    fn test_service_state() {
        assert_eq!(ServiceState::parse("running"), ServiceState::Running);
        assert_eq!(ServiceState::parse("Exited"), ServiceState::Exited);
        assert_eq!(
            ServiceState::parse("restarting"),
            ServiceState::Other("restarting".to_string())
        );
        assert_eq!(ServiceState::parse("restarting").to_string(), "restarting");
    }

    #[test]
    fn test_find() {
        let projects = vec![
            Project::from_dir(Path::new("/srv/docker-shop")).unwrap(),
            Project::from_dir(Path::new("/srv/docker-blog")).unwrap(),
        ];
        assert_eq!(find(&projects, "blog").unwrap().name, "blog");

        let err = find(&projects, "wiki").unwrap_err();
        assert_eq!(err.to_string(), "Project 'wiki' not found");
    }
}
