pub mod config;
pub mod error;
pub mod facts;
pub mod output;
pub mod pipeline;
pub mod providers;
pub mod scm;
pub mod sections;
pub mod util;
pub mod version;

pub use error::BuildMetaError;
pub use facts::store::FactStore;
pub use pipeline::{BuildPoint, CollectOutcome, collect, record_build_point, run};

pub const TOOL_NAME: &str = "buildmeta";

/// Comment written as the first line of every properties file.
pub const PROPERTIES_COMMENT: &str = "Created by buildmeta.";
