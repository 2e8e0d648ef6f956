//! Configuration loading and validation.
//!
//! The configuration is a TOML file (`buildmeta.toml` by convention). Every
//! field is optional; an empty file yields [`BuildMetaConfig::default`].

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::scm::access::{
    DEFAULT_QUERY_RANGE_IN_DAYS, DEFAULT_RETRY_COUNT, ScmAccessInfo, ScmCredentials,
    ServerCredentials,
};
use crate::sections::selected::SelectedProperty;
use crate::util::dates::is_valid_pattern;
use crate::util::text::is_blank;
use crate::version::VersionFlags;

pub const DEFAULT_CONFIG_FILE: &str = "buildmeta.toml";
pub const DEFAULT_BUILD_DATE_PATTERN: &str = "%d.%m.%Y";
pub const DEFAULT_SCM_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S %z";

/// Widest change-log window the resolver may reach, about ten thousand years.
pub const MAX_QUERY_WINDOW_IN_DAYS: u64 = 3_652_500;

const CONNECTION: &str = "connection";
const DEVELOPER_CONNECTION: &str = "developerconnection";

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuildMetaConfig {
    /// Do nothing at all.
    pub skip: bool,

    /// Never contact the version-control backend.
    pub offline: bool,

    /// Recompute facts even when a properties file already exists.
    pub force_new_properties: bool,

    /// strftime pattern of `build.date` and `build.scmRevision.date`.
    pub build_date_pattern: String,

    /// Project property holding the build user; `USER` is used otherwise.
    pub build_user_property: Option<String>,

    pub providers: ProviderToggles,
    pub version: VersionFlags,
    pub scm: ScmConfig,
    pub output: OutputConfig,
    pub project: ProjectConfig,
    pub execution: ExecutionConfig,
    pub runtime: RuntimeConfig,

    /// Extra user-selected facts.
    pub properties: Vec<SelectedProperty>,
}

impl Default for BuildMetaConfig {
    fn default() -> Self {
        Self {
            skip: false,
            offline: false,
            force_new_properties: false,
            build_date_pattern: DEFAULT_BUILD_DATE_PATTERN.to_string(),
            build_user_property: None,
            providers: ProviderToggles::default(),
            version: VersionFlags::default(),
            scm: ScmConfig::default(),
            output: OutputConfig::default(),
            project: ProjectConfig::default(),
            execution: ExecutionConfig::default(),
            runtime: RuntimeConfig::default(),
            properties: Vec::new(),
        }
    }
}

impl BuildMetaConfig {
    /// Load and validate configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse and validate configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject contradictory settings before any I/O happens.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.scm.query_range_in_days == 0 {
            return Err(ConfigError::Validation(
                "scm.query_range_in_days must be greater than zero".to_string(),
            ));
        }
        let widest = u64::from(self.scm.query_range_in_days) * (u64::from(self.scm.retry_count) + 1);
        if widest > MAX_QUERY_WINDOW_IN_DAYS {
            return Err(ConfigError::Validation(format!(
                "scm.query_range_in_days * (scm.retry_count + 1) must not exceed {MAX_QUERY_WINDOW_IN_DAYS} days, got {widest}"
            )));
        }
        let kind = self.scm.connection_type.to_lowercase();
        if kind != CONNECTION && kind != DEVELOPER_CONNECTION {
            return Err(ConfigError::Validation(format!(
                "scm.connection_type must be 'connection' or 'developerConnection', got '{}'",
                self.scm.connection_type
            )));
        }
        if !is_valid_pattern(&self.build_date_pattern) {
            return Err(ConfigError::Validation(format!(
                "invalid build_date_pattern '{}'",
                self.build_date_pattern
            )));
        }
        if !is_valid_pattern(&self.scm.date_format) {
            return Err(ConfigError::Validation(format!(
                "invalid scm.date_format '{}'",
                self.scm.date_format
            )));
        }
        for p in &self.properties {
            if is_blank(&p.name) {
                return Err(ConfigError::Validation(
                    "every [[properties]] entry needs a name".to_string(),
                ));
            }
        }
        Ok(())
    }

    /// The connection URL selected by `scm.connection_type`.
    ///
    /// `Ok(None)` when the project declares no SCM at all; an error when it
    /// does but the selected URL is missing.
    pub fn scm_connection_url(&self) -> Result<Option<&str>, ConfigError> {
        let Some(scm) = &self.project.scm else {
            return Ok(None);
        };
        let kind = self.scm.connection_type.to_lowercase();
        let url = if kind == CONNECTION {
            scm.connection.as_deref()
        } else if kind == DEVELOPER_CONNECTION {
            scm.developer_connection.as_deref()
        } else {
            None
        };
        match url.filter(|u| !is_blank(u)) {
            Some(url) => Ok(Some(url)),
            None => Err(ConfigError::Validation(format!(
                "SCM connection is not set for connection type '{}'",
                self.scm.connection_type
            ))),
        }
    }

    /// Query settings rooted at `base_dir`.
    pub fn scm_access_info(&self, base_dir: &Path) -> ScmAccessInfo {
        ScmAccessInfo {
            root_dir: base_dir.to_path_buf(),
            date_format: self.scm.date_format.clone(),
            query_range_in_days: self.scm.query_range_in_days,
            retry_count: self.scm.retry_count,
            fail_on_local_modifications: self.scm.fail_on_local_modifications,
            ignore_dot_files_in_base_dir: self.scm.ignore_dot_files_in_base_dir,
        }
    }
}

/// Which provider groups contribute facts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProviderToggles {
    pub add_scm_info: bool,
    pub add_host_info: bool,
    pub add_env_info: bool,
    pub add_toolchain_info: bool,
    pub add_os_info: bool,
    pub add_execution_info: bool,
    pub add_project_info: bool,
    pub hide_command_line_info: bool,
    pub hide_tool_opts_info: bool,
    pub hide_toolchain_opts_info: bool,
}

impl Default for ProviderToggles {
    fn default() -> Self {
        Self {
            add_scm_info: true,
            add_host_info: true,
            add_env_info: false,
            add_toolchain_info: true,
            add_os_info: true,
            add_execution_info: true,
            add_project_info: false,
            hide_command_line_info: true,
            hide_tool_opts_info: true,
            hide_toolchain_opts_info: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScmConfig {
    /// `connection` or `developerConnection`, case-insensitive.
    pub connection_type: String,
    pub date_format: String,
    pub query_range_in_days: u32,
    pub retry_count: u32,
    pub validate_checkout: bool,
    pub fail_on_local_modifications: bool,
    pub ignore_dot_files_in_base_dir: bool,
    pub fail_on_missing_revision: bool,
    pub tag_base: Option<String>,
    pub credentials: ScmCredentials,
    pub servers: Vec<ServerCredentials>,
}

impl Default for ScmConfig {
    fn default() -> Self {
        Self {
            connection_type: CONNECTION.to_string(),
            date_format: DEFAULT_SCM_DATE_FORMAT.to_string(),
            query_range_in_days: DEFAULT_QUERY_RANGE_IN_DAYS,
            retry_count: DEFAULT_RETRY_COUNT,
            validate_checkout: true,
            fail_on_local_modifications: false,
            ignore_dot_files_in_base_dir: true,
            fail_on_missing_revision: false,
            tag_base: None,
            credentials: ScmCredentials::default(),
            servers: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    pub properties_file: PathBuf,
    pub xml_file: PathBuf,
    pub create_properties: bool,
    pub create_xml: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            properties_file: PathBuf::from("target/build.properties"),
            xml_file: PathBuf::from("target/buildmetadata.xml"),
            create_properties: true,
            create_xml: true,
        }
    }
}

/// Coordinates and descriptive data of the project being built.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProjectConfig {
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
    pub url: Option<String>,
    pub inception_year: Option<String>,
    pub properties: BTreeMap<String, String>,
    pub scm: Option<ProjectScm>,
}

impl ProjectConfig {
    /// `groupId:artifactId:version`.
    pub fn id(&self) -> String {
        format!("{}:{}:{}", self.group_id, self.artifact_id, self.version)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProjectScm {
    pub connection: Option<String>,
    pub developer_connection: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ActiveProfile {
    pub id: String,
    #[serde(default = "default_profile_source")]
    pub source: String,
}

fn default_profile_source() -> String {
    "settings".to_string()
}

/// What the build orchestrator is doing in this invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExecutionConfig {
    pub goals: Vec<String>,
    pub profiles: Vec<ActiveProfile>,
    pub filters: Vec<String>,
    pub execution_project: Option<String>,
    pub is_execution_root: bool,
    pub command_line: Option<String>,
    /// Execution property holding the build tool options.
    pub tool_opts_property: String,
    /// Execution property holding the toolchain options.
    pub toolchain_opts_property: String,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            goals: Vec::new(),
            profiles: Vec::new(),
            filters: Vec::new(),
            execution_project: None,
            is_execution_root: true,
            command_line: None,
            tool_opts_property: "env.BUILD_TOOL_OPTS".to_string(),
            toolchain_opts_property: "env.TOOLCHAIN_OPTS".to_string(),
        }
    }
}

/// Toolchain and build tool facts the host cannot discover by itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RuntimeConfig {
    pub tool_version: Option<String>,
    pub toolchain_name: Option<String>,
    pub toolchain_version: Option<String>,
    pub toolchain_vendor: Option<String>,
    pub toolchain_vm: Option<String>,
    pub toolchain_compiler: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// I/O error reading configuration file.
    #[error("failed to read configuration file '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// TOML parsing error.
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// Validation error.
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_yields_defaults() {
        let config = BuildMetaConfig::from_toml("").unwrap();
        assert_eq!(config, BuildMetaConfig::default());
        assert!(config.providers.add_scm_info);
        assert!(!config.providers.add_env_info);
        assert!(config.providers.hide_command_line_info);
        assert_eq!(config.scm.query_range_in_days, 30);
        assert_eq!(config.scm.retry_count, 5);
        assert_eq!(config.build_date_pattern, "%d.%m.%Y");
        assert_eq!(
            config.output.properties_file,
            PathBuf::from("target/build.properties")
        );
    }

    #[test]
    fn parses_full_config() {
        let config = BuildMetaConfig::from_toml(
            r#"
            offline = true
            build_date_pattern = "%Y-%m-%d"

            [providers]
            add_env_info = true
            add_host_info = false

            [version]
            add_build_date = false

            [scm]
            connection_type = "developerConnection"
            query_range_in_days = 7

            [scm.credentials]
            user_name = "ci"

            [[scm.servers]]
            id = "example.com"
            password = "secret"

            [project]
            group_id = "com.example"
            artifact_id = "app"
            version = "1.0.0-SNAPSHOT"
            inception_year = "2020"

            [project.properties]
            "project.category" = "tools"

            [project.scm]
            developer_connection = "scm:git:ssh://example.com/app.git"

            [execution]
            goals = ["clean", "install"]
            profiles = [{ id = "ci" }]

            [[properties]]
            name = "CI_JOB"
            section = "build.runtime"
            "#,
        )
        .unwrap();

        assert!(config.offline);
        assert!(config.providers.add_env_info);
        assert!(!config.providers.add_host_info);
        assert!(!config.version.add_build_date);
        assert!(config.version.add_release_number);
        assert_eq!(config.scm.query_range_in_days, 7);
        assert_eq!(config.scm.credentials.user_name.as_deref(), Some("ci"));
        assert_eq!(config.execution.profiles[0].source, "settings");
        assert_eq!(config.project.id(), "com.example:app:1.0.0-SNAPSHOT");
        assert_eq!(
            config.scm_connection_url().unwrap(),
            Some("scm:git:ssh://example.com/app.git")
        );
        assert_eq!(config.properties.len(), 1);
    }

    #[test]
    fn zero_range_is_rejected() {
        let err = BuildMetaConfig::from_toml("[scm]\nquery_range_in_days = 0").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn unrepresentable_query_window_is_rejected() {
        let err = BuildMetaConfig::from_toml("[scm]\nquery_range_in_days = 100000000\n").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));

        let err = BuildMetaConfig::from_toml("[scm]\nquery_range_in_days = 1000000\nretry_count = 5\n")
            .unwrap_err();
        assert!(err.to_string().contains("query_range_in_days"));

        assert!(BuildMetaConfig::from_toml("[scm]\nquery_range_in_days = 365\nretry_count = 9\n").is_ok());
    }

    #[test]
    fn unknown_connection_type_is_rejected() {
        let err = BuildMetaConfig::from_toml("[scm]\nconnection_type = \"ftp\"").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn invalid_date_pattern_is_rejected() {
        let err = BuildMetaConfig::from_toml("build_date_pattern = \"%Q%\"").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = BuildMetaConfig::from_toml("no_such_key = 1").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn connection_selection() {
        let mut config = BuildMetaConfig::default();
        assert_eq!(config.scm_connection_url().unwrap(), None);

        config.project.scm = Some(ProjectScm {
            connection: Some("scm:git:https://example.com/a.git".into()),
            developer_connection: None,
        });
        assert_eq!(
            config.scm_connection_url().unwrap(),
            Some("scm:git:https://example.com/a.git")
        );

        config.scm.connection_type = "DeveloperConnection".into();
        assert!(config.scm_connection_url().is_err());
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = BuildMetaConfig::from_file(Path::new("/definitely/missing.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
