use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::config::{BuildMetaConfig, ExecutionConfig, ProjectConfig, RuntimeConfig};
use crate::sections::selected::PropertySource;

/// Prefix under which environment variables appear among the execution
/// properties.
pub const ENV_PROPERTY_PREFIX: &str = "env.";

/// Everything providers read, assembled once per invocation.
///
/// The process environment is captured up front so a run never observes
/// changes made while it executes, and so tests can supply their own.
#[derive(Debug, Clone)]
pub struct BuildContext {
    pub config: BuildMetaConfig,
    /// Checkout root; relative output paths resolve against it.
    pub base_dir: PathBuf,
    pub start_time: DateTime<Utc>,
    environment: BTreeMap<String, String>,
    system_properties: BTreeMap<String, String>,
}

impl BuildContext {
    pub fn new(config: BuildMetaConfig, base_dir: impl Into<PathBuf>, start_time: DateTime<Utc>) -> Self {
        Self {
            config,
            base_dir: base_dir.into(),
            start_time,
            environment: BTreeMap::new(),
            system_properties: BTreeMap::new(),
        }
    }

    pub fn with_environment<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.environment = vars.into_iter().map(|(k, v)| (k.into(), v.into())).collect();
        self
    }

    /// Add a `key=value` definition from the command line.
    pub fn define(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.system_properties.insert(key.into(), value.into());
    }

    pub fn project(&self) -> &ProjectConfig {
        &self.config.project
    }

    pub fn execution(&self) -> &ExecutionConfig {
        &self.config.execution
    }

    pub fn runtime(&self) -> &RuntimeConfig {
        &self.config.runtime
    }

    pub fn env(&self, name: &str) -> Option<&str> {
        self.environment.get(name).map(String::as_str)
    }

    pub fn system_properties(&self) -> &BTreeMap<String, String> {
        &self.system_properties
    }

    /// Session properties: `env.<NAME>` for every environment variable,
    /// then command-line definitions, which win on collision.
    pub fn execution_properties(&self) -> BTreeMap<String, String> {
        let mut props: BTreeMap<String, String> = self
            .environment
            .iter()
            .map(|(k, v)| (format!("{ENV_PROPERTY_PREFIX}{k}"), v.clone()))
            .collect();
        props.extend(
            self.system_properties
                .iter()
                .map(|(k, v)| (k.clone(), v.clone())),
        );
        props
    }

    pub fn execution_property(&self, name: &str) -> Option<String> {
        if let Some(v) = self.system_properties.get(name) {
            return Some(v.clone());
        }
        name.strip_prefix(ENV_PROPERTY_PREFIX)
            .and_then(|var| self.env(var))
            .map(str::to_string)
    }

    /// Resolve `path` against the base directory unless it is absolute.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }

    pub fn properties_file(&self) -> PathBuf {
        self.resolve(&self.config.output.properties_file)
    }

    pub fn xml_file(&self) -> PathBuf {
        self.resolve(&self.config.output.xml_file)
    }
}

impl PropertySource for BuildContext {
    /// Project coordinates under `project.*`, then the project properties.
    fn project_property(&self, name: &str) -> Option<String> {
        let project = self.project();
        let value = match name {
            "project.groupId" => Some(project.group_id.clone()),
            "project.artifactId" => Some(project.artifact_id.clone()),
            "project.version" => Some(project.version.clone()),
            "project.url" => project.url.clone(),
            "project.inceptionYear" => project.inception_year.clone(),
            _ => None,
        };
        value.or_else(|| project.properties.get(name).cloned())
    }

    fn system_property(&self, name: &str) -> Option<String> {
        self.system_properties.get(name).cloned()
    }

    fn env_var(&self, name: &str) -> Option<String> {
        self.env(name).map(str::to_string)
    }
}
