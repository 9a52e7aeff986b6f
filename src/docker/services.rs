//! Services and their URLs

use anyhow::{Context, Result, bail};
use serde::{Serialize, Serializer, ser::SerializeMap};

use super::{Manager, SERVICE_LABEL, ports::parse_ports, runner::CommandRunner};
use crate::project::{Project, Service, ServiceState};

/// Service name -> local URLs, keeping the order services were first seen
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceUrlMap {
    entries: Vec<(String, Vec<String>)>,
}

impl ServiceUrlMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from `<service>\t<ports>` lines
    pub fn from_listing(output: &str) -> Self {
        let mut map = Self::new();

        for line in output.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let (service, ports) = line.split_once('\t').unwrap_or((line, ""));
            map.extend(service.trim(), parse_ports(ports));
        }

        map
    }

    /// Append URLs not yet known for the service. An empty list adds
    /// nothing, not even the service.
    pub fn extend(&mut self, service: &str, urls: Vec<String>) {
        if urls.is_empty() {
            return;
        }

        let index = match self.entries.iter().position(|(name, _)| name == service) {
            Some(index) => index,
            None => {
                self.entries.push((service.to_string(), Vec::new()));
                self.entries.len() - 1
            }
        };

        let known = &mut self.entries[index].1;
        for url in urls {
            if !known.contains(&url) {
                known.push(url);
            }
        }
    }

    pub fn get(&self, service: &str) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|(name, _)| name == service)
            .map(|(_, urls)| urls.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(name, urls)| (name.as_str(), urls.as_slice()))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries for display. With declared services, every declared service
    /// comes first in declared order (with no URLs when nothing is
    /// published), followed by undeclared services that do publish ports.
    /// Without them, the map's own order is used.
    pub fn ordered(&self, declared: Option<&[String]>) -> Vec<(String, Vec<String>)> {
        let Some(declared) = declared else {
            return self.entries.clone();
        };

        let mut ordered: Vec<(String, Vec<String>)> = declared
            .iter()
            .map(|name| (name.clone(), self.get(name).map(<[String]>::to_vec).unwrap_or_default()))
            .collect();

        for (name, urls) in &self.entries {
            if !declared.contains(name) {
                ordered.push((name.clone(), urls.clone()));
            }
        }

        ordered
    }
}

impl Serialize for ServiceUrlMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, urls) in &self.entries {
            map.serialize_entry(name, urls)?;
        }
        map.end()
    }
}

/// Parse `<service>\t<state>\t<id>\t<ports>` lines
fn parse_service_listing(output: &str) -> Vec<Service> {
    output
        .lines()
        .filter_map(|line| {
            let mut fields = line.trim_end_matches('\r').splitn(4, '\t');
            let name = fields.next()?.trim();
            let state = fields.next()?;
            if name.is_empty() {
                return None;
            }

            Some(Service {
                name: name.to_string(),
                state: ServiceState::parse(state),
                container: fields.next().unwrap_or_default().trim().to_string(),
                ports: fields.next().unwrap_or_default().trim().to_string(),
            })
        })
        .collect()
}

impl<R: CommandRunner> Manager<R> {
    /// Local URLs published by the project's running containers
    pub fn service_urls(&self, project: &Project) -> Result<ServiceUrlMap> {
        let inv = self.project_containers(project).args([
            "--format".to_string(),
            format!("{{{{.Label \"{}\"}}}}\t{{{{.Ports}}}}", SERVICE_LABEL),
        ]);

        let output = self
            .runner
            .output(&inv)
            .context("Failed to list project ports")?;
        if !output.success {
            bail!("Failed to list project ports: {}", output.failure_message());
        }

        Ok(ServiceUrlMap::from_listing(&output.stdout))
    }

    /// Services declared in docker-compose.yml, running or not
    pub fn declared_services(&self, project: &Project) -> Result<Vec<String>> {
        let inv = self.compose_base(project).args(["config", "--services"]);

        let output = self
            .runner
            .output(&inv)
            .context("Failed to list project services")?;
        if !output.success {
            bail!("Failed to list project services: {}", output.failure_message());
        }

        Ok(output
            .stdout
            .split_whitespace()
            .map(str::to_string)
            .collect())
    }

    /// All containers of the project, stopped ones included
    pub fn inspect_services(&self, project: &Project) -> Result<Vec<Service>> {
        let inv = self.project_containers(project).args([
            "-a".to_string(),
            "--format".to_string(),
            format!(
                "{{{{.Label \"{}\"}}}}\t{{{{.State}}}}\t{{{{.ID}}}}\t{{{{.Ports}}}}",
                SERVICE_LABEL
            ),
        ]);

        let output = self
            .runner
            .output(&inv)
            .context("Failed to list project containers")?;
        if !output.success {
            bail!("Failed to list project containers: {}", output.failure_message());
        }

        Ok(parse_service_listing(&output.stdout))
    }
}
