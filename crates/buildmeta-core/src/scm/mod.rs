//! Version-control facts: latest revision and working-copy state.
//!
//! The core only talks to a [`query::RevisionQuery`]; `git` is the one
//! backend shipped here.

pub mod access;
pub mod git;
pub mod helper;
pub mod modified;
pub mod query;
pub mod resolver;
pub mod revision;

pub use access::{ScmAccessInfo, ScmConnectionInfo, ScmCredentials, ServerCredentials};
pub use helper::RevisionHelper;
pub use modified::LocallyModifiedInfo;
pub use query::{RevisionQuery, ScmError};
pub use revision::Revision;
