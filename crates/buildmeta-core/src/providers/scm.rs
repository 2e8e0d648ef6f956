use tracing::debug;

use crate::error::BuildMetaError;
use crate::facts::store::FactStore;
use crate::providers::{BuildContext, MetaDataProvider};
use crate::scm::access::{ScmConnectionInfo, host_of};
use crate::scm::helper::RevisionHelper;
use crate::scm::query::RevisionQuery;

/// Revision and working-copy facts from the version-control backend.
pub struct ScmProvider<'a> {
    query: &'a dyn RevisionQuery,
}

impl<'a> ScmProvider<'a> {
    pub fn new(query: &'a dyn RevisionQuery) -> Self {
        Self { query }
    }

    fn connection_info(ctx: &BuildContext, url: &str) -> ScmConnectionInfo {
        let scm = &ctx.config.scm;
        let mut credentials = scm.credentials.clone();
        if !credentials.is_complete() {
            if let Some(host) = host_of(url) {
                credentials.configure_by_server(&scm.servers, &host);
            }
        }
        ScmConnectionInfo {
            connection_url: url.to_string(),
            credentials,
            tag_base: scm.tag_base.clone(),
        }
    }
}

impl MetaDataProvider for ScmProvider<'_> {
    fn name(&self) -> &'static str {
        "scm"
    }

    fn provide(&self, ctx: &BuildContext, store: &mut FactStore) -> Result<(), BuildMetaError> {
        let config = &ctx.config;
        let declared = config.project.scm.is_some();
        if !config.providers.add_scm_info || config.offline || !declared {
            debug!(
                add_scm_info = config.providers.add_scm_info,
                offline = config.offline,
                scm_declared = declared,
                "skipping SCM data"
            );
            return Ok(());
        }

        let Some(url) = config
            .scm_connection_url()
            .map_err(|e| BuildMetaError::Config(e.to_string()))?
        else {
            return Ok(());
        };

        let connection = Self::connection_info(ctx, url);
        let access = config.scm_access_info(&ctx.base_dir);
        let mut helper =
            RevisionHelper::new(self.query, &connection, &access, &config.build_date_pattern);
        helper.validate_checkout = config.scm.validate_checkout;
        helper.fail_on_missing_revision = config.scm.fail_on_missing_revision;
        helper.provide_scm_build_info(store, ctx.start_time)?;
        Ok(())
    }
}
