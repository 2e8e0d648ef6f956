//! Error kinds surfaced by the collection pipeline.
//!
//! Every failure names the stage it came from. Collaborator failures
//! (`ScmError`) never cross the pipeline boundary unwrapped.

use std::path::PathBuf;

use crate::config::ConfigError;
use crate::scm::query::ScmError;

#[derive(Debug, thiserror::Error)]
pub enum BuildMetaError {
    /// Missing or contradictory configuration; raised before any I/O.
    #[error("configuration error: {0}")]
    Config(String),

    /// Loading the configuration file failed.
    #[error(transparent)]
    ConfigFile(#[from] ConfigError),

    /// A fact provider failed; aborts the aggregation pass.
    #[error("provider '{provider}' failed: {message}")]
    Provider {
        provider: &'static str,
        message: String,
    },

    /// The version-control backend could not deliver a change log.
    #[error("cannot fetch revision information: {0}")]
    RevisionFetch(#[source] ScmError),

    /// A revision was required but none was found within the query budget.
    #[error("cannot fetch SCM revision. {0}")]
    MissingRevision(String),

    /// The working-copy status query failed under the strict policy.
    #[error("cannot check local modifications: {0}")]
    ModificationCheck(#[source] ScmError),

    /// Local modifications were found under the strict policy.
    #[error("local modifications detected ({0})")]
    LocalModifications(String),

    /// Writing one output target failed.
    #[error("cannot write {target} to '{}': {source}", path.display())]
    Serialization {
        target: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Reading a previously written properties file failed.
    #[error("cannot read properties file '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl BuildMetaError {
    pub fn provider(provider: &'static str, message: impl Into<String>) -> Self {
        Self::Provider {
            provider,
            message: message.into(),
        }
    }

    /// Short name of the pipeline stage that failed.
    pub fn stage(&self) -> &'static str {
        match self {
            Self::Config(_) | Self::ConfigFile(_) => "configuration",
            Self::Provider { .. } => "provider",
            Self::RevisionFetch(_) | Self::MissingRevision(_) => "revision",
            Self::ModificationCheck(_) | Self::LocalModifications(_) => "modification-check",
            Self::Serialization { .. } => "serialization",
            Self::Read { .. } => "reuse",
        }
    }
}
