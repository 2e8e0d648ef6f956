//! Fact providers.
//!
//! Each provider reads the [`BuildContext`] and writes its facts into the
//! shared store. Providers run in a fixed order; later providers may read
//! what earlier ones wrote (the build date provider composes the full
//! version from the SCM facts).

pub mod build_date;
pub mod build_user;
pub mod context;
pub mod execution;
pub mod host;
pub mod project;
pub mod runtime;
pub mod scm;
pub mod selected;

pub use context::BuildContext;

use crate::error::BuildMetaError;
use crate::facts::store::FactStore;
use crate::scm::query::RevisionQuery;

pub trait MetaDataProvider {
    /// Short name used in error messages and logs.
    fn name(&self) -> &'static str;

    fn provide(&self, ctx: &BuildContext, store: &mut FactStore) -> Result<(), BuildMetaError>;
}

/// The providers of a full collection pass, in execution order.
pub fn standard_providers<'a>(query: &'a dyn RevisionQuery) -> Vec<Box<dyn MetaDataProvider + 'a>> {
    vec![
        Box::new(build_user::BuildUserProvider),
        Box::new(runtime::RuntimeProvider),
        Box::new(execution::ExecutionProvider::default()),
        Box::new(project::ProjectProvider),
        Box::new(selected::SelectedPropertiesProvider),
        Box::new(host::HostProvider),
        Box::new(scm::ScmProvider::new(query)),
        Box::new(build_date::BuildDateProvider),
    ]
}
