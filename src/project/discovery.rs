//! Project discovery
//!
//! Scans a root directory for `docker-*` subdirectories that contain a
//! docker-compose.yml.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, bail};
use tracing::debug;

use super::Project;
use crate::config::Config;

pub struct Discoverer {
    root: PathBuf,
}

impl Discoverer {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Find all projects under the root, sorted by name
    pub fn discover(&self) -> Result<Vec<Project>> {
        let entries = fs::read_dir(&self.root)
            .context(format!("Failed to read directory: {:?}", self.root))?;

        let mut projects = Vec::new();

        for entry in entries {
            let entry = entry.context("Failed to read directory entry")?;
            let path = entry.path();

            if !path.is_dir() {
                continue;
            }

            let Some(project) = Project::from_dir(&path) else {
                continue;
            };

            if !project.compose_exists() {
                debug!(path = ?path, "skipping project without docker-compose.yml");
                continue;
            }

            projects.push(project);
        }

        projects.sort_by(|a, b| a.name.cmp(&b.name));
        // docker-Shop and docker-shop collapse to the same project name
        projects.dedup_by(|a, b| a.name == b.name);

        Ok(projects)
    }
}

/// Discover projects under `root` and attach their configured environment
pub fn discover_in(root: &Path, config: &Config) -> Result<Vec<Project>> {
    if !root.is_dir() {
        bail!("Docker directory not found: {}", root.display());
    }

    let mut projects = Discoverer::new(root).discover()?;
    for project in &mut projects {
        project.env = config.project(&project.name).env;
    }

    Ok(projects)
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;
    use crate::config::ProjectConfig;

    fn make_project(root: &Path, dir: &str, with_compose: bool) {
        let path = root.join(dir);
        fs::create_dir_all(&path).unwrap();
        if with_compose {
            fs::write(path.join("docker-compose.yml"), "services: {}\n").unwrap();
        }
    }

    #[test]
    fn test_discover_filters_and_sorts() {
        let dir = tempdir().unwrap();
        make_project(dir.path(), "docker-Shop", true);
        make_project(dir.path(), "docker-blog", true);
        make_project(dir.path(), "docker-empty", false);
        make_project(dir.path(), "website", true);
        fs::write(dir.path().join("docker-file"), "not a dir").unwrap();

        let projects = Discoverer::new(dir.path()).discover().unwrap();
        let names: Vec<&str> = projects.iter().map(|p| p.name.as_str()).collect();

        assert_eq!(names, vec!["blog", "shop"]);
        assert_eq!(projects[1].path, dir.path().join("docker-Shop"));
        assert_eq!(
            projects[1].compose_path,
            dir.path().join("docker-Shop").join("docker-compose.yml")
        );
    }

    #[test]
    fn test_discover_in_missing_root() {
        let dir = tempdir().unwrap();
        let err = discover_in(&dir.path().join("missing"), &Config::default()).unwrap_err();
        assert!(err.to_string().starts_with("Docker directory not found"));
    }

    #[test]
    fn test_discover_in_attaches_env() {
        let dir = tempdir().unwrap();
        make_project(dir.path(), "docker-shop", true);

        let mut config = Config::default();
        let mut project = ProjectConfig::default();
        project.env.insert("APP_ENV".to_string(), "dev".to_string());
        config.projects.insert("shop".to_string(), project);

        let projects = discover_in(dir.path(), &config).unwrap();
        assert_eq!(projects[0].env["APP_ENV"], "dev");
    }
}
