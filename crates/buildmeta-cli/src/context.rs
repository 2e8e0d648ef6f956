use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use buildmeta_core::config::BuildMetaConfig;
use buildmeta_core::providers::BuildContext;
use chrono::Utc;
use tracing::debug;

use crate::args::{Args, CollectArgs};

/// Checkout root: `--base-dir` or the current directory.
pub fn base_dir(args: &Args) -> Result<PathBuf> {
    match &args.base_dir {
        Some(dir) => Ok(dir.clone()),
        None => std::env::current_dir().context("cannot determine current directory"),
    }
}

/// Load the configuration file if present; defaults otherwise.
pub fn load_config(config: &Path, base_dir: &Path) -> Result<BuildMetaConfig> {
    let path = if config.is_absolute() {
        config.to_path_buf()
    } else {
        base_dir.join(config)
    };
    if !path.exists() {
        debug!(path = %path.display(), "no configuration file, using defaults");
        return Ok(BuildMetaConfig::default());
    }
    BuildMetaConfig::from_file(&path)
        .with_context(|| format!("failed to load configuration from {}", path.display()))
}

/// Apply command-line overrides on top of the file configuration.
pub fn apply_overrides(config: &mut BuildMetaConfig, flags: &CollectArgs) {
    if flags.offline {
        config.offline = true;
    }
    if flags.force {
        config.force_new_properties = true;
    }
    if flags.skip_scm {
        config.providers.add_scm_info = false;
    }
    if let Some(path) = &flags.properties_out {
        config.output.properties_file = path.clone();
    }
    if let Some(path) = &flags.xml_out {
        config.output.xml_file = path.clone();
    }
}

/// Build the invocation context from configuration, process environment
/// and `--define` values.
pub fn build_context(config: BuildMetaConfig, base_dir: PathBuf, flags: &CollectArgs) -> BuildContext {
    let mut ctx = BuildContext::new(config, base_dir, Utc::now()).with_environment(std::env::vars());
    for (key, value) in &flags.defines {
        ctx.define(key.as_str(), value.as_str());
    }
    ctx
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_config_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(Path::new("buildmeta.toml"), dir.path()).unwrap();
        assert_eq!(config, BuildMetaConfig::default());
    }

    #[test]
    fn invalid_config_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("buildmeta.toml"), "[scm]\nquery_range_in_days = 0\n").unwrap();
        let err = load_config(Path::new("buildmeta.toml"), dir.path()).unwrap_err();
        assert!(format!("{err:#}").contains("failed to load configuration"));
    }

    #[test]
    fn flags_override_file_settings() {
        let mut config = BuildMetaConfig::default();
        let flags = CollectArgs {
            offline: true,
            skip_scm: true,
            xml_out: Some(PathBuf::from("out/report.xml")),
            ..CollectArgs::default()
        };
        apply_overrides(&mut config, &flags);

        assert!(config.offline);
        assert!(!config.providers.add_scm_info);
        assert!(!config.force_new_properties);
        assert_eq!(config.output.xml_file, PathBuf::from("out/report.xml"));
    }
}
