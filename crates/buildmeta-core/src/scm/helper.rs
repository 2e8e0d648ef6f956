//! Writes revision and working-copy facts into the store.

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::error::BuildMetaError;
use crate::facts::keys::*;
use crate::facts::store::FactStore;
use crate::scm::access::{ScmAccessInfo, ScmConnectionInfo};
use crate::scm::modified;
use crate::scm::query::RevisionQuery;
use crate::scm::resolver::RevisionResolver;
use crate::scm::revision::Revision;
use crate::util::dates::format_date;

pub struct RevisionHelper<'a> {
    query: &'a dyn RevisionQuery,
    connection: &'a ScmConnectionInfo,
    access: &'a ScmAccessInfo,
    build_date_pattern: &'a str,
    pub validate_checkout: bool,
    pub fail_on_missing_revision: bool,
}

impl<'a> RevisionHelper<'a> {
    pub fn new(
        query: &'a dyn RevisionQuery,
        connection: &'a ScmConnectionInfo,
        access: &'a ScmAccessInfo,
        build_date_pattern: &'a str,
    ) -> Self {
        Self {
            query,
            connection,
            access,
            build_date_pattern,
            validate_checkout: true,
            fail_on_missing_revision: false,
        }
    }

    /// Resolve the latest revision and, when found, check the working copy.
    ///
    /// Returns the revision that was recorded, if any.
    pub fn provide_scm_build_info(
        &self,
        store: &mut FactStore,
        now: DateTime<Utc>,
    ) -> Result<Option<Revision>, BuildMetaError> {
        debug!(connection = %self.connection, access = %self.access, "fetching latest revision");

        let resolution = match RevisionResolver::new(self.query, self.access).resolve(now) {
            Ok(resolution) => resolution,
            Err(err) if self.fail_on_missing_revision => {
                return Err(BuildMetaError::RevisionFetch(err));
            }
            Err(err) => {
                warn!(error = %err, "cannot fetch SCM revision; continuing without revision facts");
                return Ok(None);
            }
        };

        let Some(revision) = resolution.revision else {
            if self.fail_on_missing_revision {
                return Err(BuildMetaError::MissingRevision(self.connection.to_string()));
            }
            info!(
                attempts = resolution.attempted_ranges.len(),
                "no SCM revision found; continuing without revision facts"
            );
            return Ok(None);
        };

        let date = format_date(&revision.date(), self.build_date_pattern).ok_or_else(|| {
            BuildMetaError::Config(format!(
                "invalid build date pattern '{}'",
                self.build_date_pattern
            ))
        })?;
        store.set(SCM_URL, self.connection.connection_url.as_str());
        store.set(SCM_REVISION_ID, revision.id());
        store.set(SCM_REVISION_DATE, date);

        if self.validate_checkout {
            self.provide_locally_modified_info(store)?;
        }
        Ok(Some(revision))
    }

    fn provide_locally_modified_info(&self, store: &mut FactStore) -> Result<(), BuildMetaError> {
        let strict = self.access.is_fail_indicated();
        match modified::detect(self.query, self.access) {
            Ok(info) => {
                store.set(SCM_LOCALLY_MODIFIED, info.is_modified().to_string());
                if let Some(files) = info.files() {
                    store.set(SCM_LOCALLY_MODIFIED_FILES, files);
                    if strict {
                        return Err(BuildMetaError::LocalModifications(files.to_string()));
                    }
                }
                Ok(())
            }
            Err(err) if strict => Err(BuildMetaError::ModificationCheck(err)),
            Err(err) => {
                info!(error = %err, "failed to check modification status");
                store.set(SCM_LOCALLY_MODIFIED, LOCALLY_MODIFIED_UNKNOWN);
                Ok(())
            }
        }
    }
}
