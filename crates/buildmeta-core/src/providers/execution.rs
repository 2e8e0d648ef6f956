//! Facts about the current build invocation: goals, command line, options,
//! active profiles, filters and the raw execution properties.

use tracing::debug;

use crate::error::BuildMetaError;
use crate::facts::keys::*;
use crate::facts::store::FactStore;
use crate::providers::{BuildContext, MetaDataProvider};
use crate::util::text::{is_blank, join_list};

/// Execution property a wrapper script may set to the full command line.
pub const CMD_LINE_PROPERTY: &str = "env.BUILD_CMD_LINE_ARGS";

#[derive(Debug, Clone)]
pub struct ExecutionProvider {
    probe_process: bool,
}

impl Default for ExecutionProvider {
    fn default() -> Self {
        Self {
            probe_process: true,
        }
    }
}

impl ExecutionProvider {
    /// A provider that never spawns `ps` to find the command line.
    pub fn without_process_probe() -> Self {
        Self {
            probe_process: false,
        }
    }

    fn command_line(&self, ctx: &BuildContext) -> Option<String> {
        ctx.execution_property(CMD_LINE_PROPERTY)
            .filter(|c| !is_blank(c))
            .or_else(|| ctx.execution().command_line.clone().filter(|c| !is_blank(c)))
            .or_else(|| {
                if self.probe_process {
                    probe_parent_process()
                } else {
                    None
                }
            })
    }
}

/// Command line of the process that launched us, via `ps`.
/// Any failure yields `None`.
#[cfg(unix)]
fn probe_parent_process() -> Option<String> {
    use std::process::Command;

    let pid = std::os::unix::process::parent_id();
    let output = Command::new("ps")
        .args(["-o", "args=", "-p", &pid.to_string()])
        .output()
        .ok()?;
    if !output.status.success() {
        debug!(status = %output.status, "ps probe failed");
        return None;
    }
    let line = String::from_utf8_lossy(&output.stdout).trim().to_string();
    (!line.is_empty()).then_some(line)
}

#[cfg(not(unix))]
fn probe_parent_process() -> Option<String> {
    debug!("no process probe on this platform");
    None
}

impl MetaDataProvider for ExecutionProvider {
    fn name(&self) -> &'static str {
        "execution"
    }

    fn provide(&self, ctx: &BuildContext, store: &mut FactStore) -> Result<(), BuildMetaError> {
        let toggles = &ctx.config.providers;

        if toggles.add_env_info {
            for (key, value) in ctx.execution_properties() {
                store.set(execution_property_key(&key), value);
            }
        }

        if !toggles.add_execution_info {
            return Ok(());
        }
        let execution = ctx.execution();

        store.set_if_not_blank(TOOL_GOALS, Some(join_list(&execution.goals).as_str()));

        if !toggles.hide_command_line_info {
            store.set_if_not_blank(TOOL_CMDLINE, self.command_line(ctx).as_deref());
        }
        if !toggles.hide_tool_opts_info {
            store.set_if_not_blank(
                TOOL_OPTS,
                ctx.execution_property(&execution.tool_opts_property).as_deref(),
            );
        }
        if !toggles.hide_toolchain_opts_info {
            store.set_if_not_blank(
                TOOLCHAIN_OPTS,
                ctx.execution_property(&execution.toolchain_opts_property).as_deref(),
            );
        }

        let mut profile_ids: Vec<&str> = Vec::new();
        for profile in &execution.profiles {
            if profile_ids.contains(&profile.id.as_str()) {
                continue;
            }
            store.set(active_profile_key(&profile.id), profile.source.as_str());
            profile_ids.push(&profile.id);
        }
        if !profile_ids.is_empty() {
            store.set(TOOL_ACTIVE_PROFILES, join_list(&profile_ids));
        }

        store.set(TOOL_IS_EXECUTION_ROOT, execution.is_execution_root.to_string());
        let project = ctx.project();
        let execution_project = execution
            .execution_project
            .clone()
            .filter(|p| !is_blank(p))
            .or_else(|| (!is_blank(&project.artifact_id)).then(|| project.id()));
        store.set_if_not_blank(TOOL_EXECUTION_PROJECT, execution_project.as_deref());

        store.set_if_not_blank(TOOL_FILTERS, Some(join_list(&execution.filters).as_str()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::config::{ActiveProfile, BuildMetaConfig};

    fn config() -> BuildMetaConfig {
        let mut config = BuildMetaConfig::default();
        config.project.group_id = "com.example".into();
        config.project.artifact_id = "app".into();
        config.project.version = "1.0".into();
        config.execution.goals = vec!["clean".into(), "install".into()];
        config.execution.profiles = vec![
            ActiveProfile {
                id: "ci".into(),
                source: "settings".into(),
            },
            ActiveProfile {
                id: "release".into(),
                source: "pom".into(),
            },
            ActiveProfile {
                id: "ci".into(),
                source: "ignored".into(),
            },
        ];
        config.execution.filters = vec!["/work/app/src/filter.properties".into()];
        config
    }

    fn run(config: BuildMetaConfig, env: &[(&str, &str)]) -> FactStore {
        let ctx = BuildContext::new(config, "/work/app", Utc::now())
            .with_environment(env.iter().copied());
        let mut store = FactStore::new();
        ExecutionProvider::without_process_probe()
            .provide(&ctx, &mut store)
            .unwrap();
        store
    }

    #[test]
    fn records_goals_profiles_and_filters() {
        let store = run(config(), &[]);

        assert_eq!(store.get(TOOL_GOALS), Some("clean, install"));
        assert_eq!(store.get(TOOL_ACTIVE_PROFILES), Some("ci, release"));
        assert_eq!(store.get(&active_profile_key("ci")), Some("settings"));
        assert_eq!(store.get(&active_profile_key("release")), Some("pom"));
        assert_eq!(store.get(TOOL_IS_EXECUTION_ROOT), Some("true"));
        assert_eq!(store.get(TOOL_EXECUTION_PROJECT), Some("com.example:app:1.0"));
        assert_eq!(store.get(TOOL_FILTERS), Some("/work/app/src/filter.properties"));
    }

    #[test]
    fn hidden_values_stay_hidden_by_default() {
        let store = run(
            config(),
            &[("BUILD_CMD_LINE_ARGS", "build --release"), ("BUILD_TOOL_OPTS", "-Xmx1g")],
        );
        assert!(!store.contains(TOOL_CMDLINE));
        assert!(!store.contains(TOOL_OPTS));
        assert!(!store.contains(TOOLCHAIN_OPTS));
        assert!(store.with_prefix(EXECUTION_PROPERTY_PREFIX).next().is_none());
    }

    #[test]
    fn unhidden_values_come_from_execution_properties() {
        let mut config = config();
        config.providers.hide_command_line_info = false;
        config.providers.hide_tool_opts_info = false;
        config.providers.hide_toolchain_opts_info = false;
        config.execution.command_line = Some("from session".into());
        let store = run(
            config,
            &[
                ("BUILD_CMD_LINE_ARGS", "build --release"),
                ("BUILD_TOOL_OPTS", "-Xmx1g"),
                ("TOOLCHAIN_OPTS", "-C opt-level=3"),
            ],
        );
        assert_eq!(store.get(TOOL_CMDLINE), Some("build --release"));
        assert_eq!(store.get(TOOL_OPTS), Some("-Xmx1g"));
        assert_eq!(store.get(TOOLCHAIN_OPTS), Some("-C opt-level=3"));
    }

    #[test]
    fn session_command_line_is_second_choice() {
        let mut config = config();
        config.providers.hide_command_line_info = false;
        config.execution.command_line = Some("from session".into());
        let store = run(config, &[]);
        assert_eq!(store.get(TOOL_CMDLINE), Some("from session"));
    }

    #[test]
    fn env_info_copies_sorted_execution_properties() {
        let mut config = config();
        config.providers.add_env_info = true;
        config.providers.add_execution_info = false;
        let store = run(config, &[("B", "2"), ("A", "1")]);

        let keys: Vec<&str> = store.keys().collect();
        assert_eq!(
            keys,
            vec!["execution.property.env.A", "execution.property.env.B"]
        );
    }
}
