//! Run modes: collect, reuse, skip and build points.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::error::BuildMetaError;
use crate::facts::keys::{BUILD_DURATION, BUILD_TIMESTAMP};
use crate::facts::store::FactStore;
use crate::output::document::write_document;
use crate::output::properties::{read_properties_file, write_properties_file};
use crate::providers::{BuildContext, standard_providers};
use crate::scm::query::RevisionQuery;
use crate::sections::{Classifier, SectionCatalog};
use crate::util::paths::FilePathNormalizer;

/// Suffix of the key holding the time since the previous build point.
pub const DIFF_SUFFIX: &str = ".diff";

/// Result of [`run`].
#[derive(Debug, Default)]
pub struct CollectOutcome {
    pub store: FactStore,
    /// Output files written successfully, in write order.
    pub written: Vec<PathBuf>,
    /// Output failures. One failing writer does not stop the other.
    pub errors: Vec<BuildMetaError>,
    /// Facts were read back from an existing properties file.
    pub reused: bool,
    pub skipped: bool,
}

impl CollectOutcome {
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Run every provider in order against a fresh store.
///
/// # Errors
///
/// Returns the first provider error; nothing is written.
pub fn collect(ctx: &BuildContext, query: &dyn RevisionQuery) -> Result<FactStore, BuildMetaError> {
    let mut store = FactStore::new();
    for provider in standard_providers(query) {
        debug!(provider = provider.name(), "running provider");
        provider.provide(ctx, &mut store)?;
    }
    debug!(facts = store.len(), "collection finished");
    Ok(store)
}

/// Collect (or reuse) the facts and write both outputs.
///
/// Configuration and provider failures abort the run. Writer failures are
/// gathered in [`CollectOutcome::errors`].
pub fn run(ctx: &BuildContext, query: &dyn RevisionQuery) -> Result<CollectOutcome, BuildMetaError> {
    let config = &ctx.config;
    if config.skip {
        info!("skipping build metadata collection");
        return Ok(CollectOutcome {
            skipped: true,
            ..CollectOutcome::default()
        });
    }
    config.validate()?;

    let properties_file = ctx.properties_file();
    let reuse = properties_file.exists() && !config.force_new_properties;
    let store = if reuse {
        info!(path = %properties_file.display(), "reusing existing build properties");
        read_properties_file(&properties_file)?
    } else {
        collect(ctx, query)?
    };

    let normalizer = FilePathNormalizer::from_path(&ctx.base_dir);
    let mut outcome = CollectOutcome {
        reused: reuse,
        ..CollectOutcome::default()
    };

    if !reuse && config.output.create_properties {
        match write_properties_file(&properties_file, &store, &normalizer) {
            Ok(()) => outcome.written.push(properties_file),
            Err(err) => {
                warn!(error = %err, "cannot write properties");
                outcome.errors.push(err);
            }
        }
    }

    if config.output.create_xml {
        let catalog = SectionCatalog::standard();
        let classifier = Classifier::new(&catalog, &config.properties);
        let xml_file = ctx.xml_file();
        match write_document(&xml_file, &store, &classifier, &normalizer) {
            Ok(()) => outcome.written.push(xml_file),
            Err(err) => {
                warn!(error = %err, "cannot write XML report");
                outcome.errors.push(err);
            }
        }
    }

    outcome.store = store;
    Ok(outcome)
}

/// A named point in the build at which the elapsed time is recorded.
#[derive(Debug, Clone)]
pub struct BuildPoint {
    pub name: Option<String>,
    pub now: DateTime<Utc>,
}

impl BuildPoint {
    pub fn new(name: Option<String>, now: DateTime<Utc>) -> Self {
        Self {
            name: name.filter(|n| !n.trim().is_empty()),
            now,
        }
    }

    /// `build.duration` or `build.duration.<name>`.
    pub fn duration_key(&self) -> String {
        match &self.name {
            Some(name) => format!("{BUILD_DURATION}.{name}"),
            None => BUILD_DURATION.to_string(),
        }
    }
}

/// Largest duration recorded so far, ignoring `skip_key` and diff entries.
fn previous_duration(store: &FactStore, skip_key: &str) -> Option<i64> {
    store
        .with_prefix(BUILD_DURATION)
        .filter(|(k, _)| *k != skip_key && !k.ends_with(DIFF_SUFFIX))
        .filter_map(|(_, v)| v.trim().parse::<i64>().ok())
        .max()
}

/// Record the elapsed build time in an existing properties file.
///
/// Returns `Ok(None)` when there is no properties file yet.
///
/// # Errors
///
/// Fails when the file cannot be read or rewritten.
pub fn record_build_point(
    path: &Path,
    base_dir: &Path,
    point: &BuildPoint,
) -> Result<Option<FactStore>, BuildMetaError> {
    if !path.exists() {
        info!(
            point = point.name.as_deref().unwrap_or_default(),
            path = %path.display(),
            "skipping build point, no build properties found"
        );
        return Ok(None);
    }

    let mut store = read_properties_file(path)?;
    let start = store
        .get(BUILD_TIMESTAMP)
        .and_then(|v| v.trim().parse::<i64>().ok())
        .ok_or_else(|| {
            BuildMetaError::Config(format!(
                "'{}' has no valid {BUILD_TIMESTAMP}",
                path.display()
            ))
        })?;

    let key = point.duration_key();
    let duration = point.now.timestamp_millis() - start;
    let diff = match previous_duration(&store, &key) {
        Some(previous) => duration - previous,
        None => duration,
    };
    store.set(key.as_str(), duration.to_string());
    store.set(format!("{key}{DIFF_SUFFIX}"), diff.to_string());
    debug!(key = %key, duration, diff, "recorded build point");

    write_properties_file(path, &store, &FilePathNormalizer::from_path(base_dir))?;
    Ok(Some(store))
}
