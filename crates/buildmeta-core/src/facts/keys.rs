//! Well-known fact keys and section title keys.
//!
//! These names are part of the persisted properties format; renaming one
//! breaks every consumer that reads a previously written file.

// Section titles, in catalog order.
pub const SECTION_SCM: &str = "build.scm";
pub const SECTION_ARTIFACT: &str = "build.artifact";
pub const SECTION_BUILD_DATE: &str = "build.timeAndDate";
pub const SECTION_RUNTIME: &str = "build.runtime";
pub const SECTION_TOOLCHAIN: &str = "build.toolchain";
pub const SECTION_BUILD_TOOL: &str = "build.tool";
pub const SECTION_PROJECT: &str = "project";
pub const SECTION_MISC: &str = "build.misc";

// SCM
pub const SCM_URL: &str = "build.scmRevision.url";
pub const SCM_REVISION_ID: &str = "build.scmRevision.id";
pub const SCM_REVISION_DATE: &str = "build.scmRevision.date";
pub const SCM_LOCALLY_MODIFIED: &str = "build.scmLocallyModified";
pub const SCM_LOCALLY_MODIFIED_FILES: &str = "build.scmLocallyModified.files";

// Artifact
pub const GROUP_ID: &str = "build.groupId";
pub const ARTIFACT_ID: &str = "build.artifactId";
pub const VERSION: &str = "build.version";
pub const FULL_VERSION: &str = "build.version.full";

// Build date
pub const BUILD_DATE: &str = "build.date";
pub const BUILD_TIMESTAMP: &str = "build.timestamp.millis";
pub const BUILD_DATE_PATTERN: &str = "build.date.pattern";
pub const BUILD_YEAR: &str = "build.year";
pub const COPYRIGHT_YEAR: &str = "build.copyright.year";

/// Base key of build-point durations; named points append `.<name>`.
pub const BUILD_DURATION: &str = "build.duration";

// Runtime (host)
pub const HOSTNAME: &str = "build.host.name";
pub const OS_NAME: &str = "build.os.name";
pub const OS_ARCH: &str = "build.os.arch";
pub const OS_VERSION: &str = "build.os.version";
pub const BUILD_USER: &str = "build.user";

// Toolchain executing the build
pub const TOOLCHAIN_NAME: &str = "build.toolchain.name";
pub const TOOLCHAIN_VERSION: &str = "build.toolchain.version";
pub const TOOLCHAIN_VENDOR: &str = "build.toolchain.vendor";
pub const TOOLCHAIN_VM: &str = "build.toolchain.vm";
pub const TOOLCHAIN_COMPILER: &str = "build.toolchain.compiler";
pub const TOOLCHAIN_OPTS: &str = "build.toolchain.opts";

// Build tool
pub const TOOL_VERSION: &str = "build.tool.version";
pub const TOOL_GOALS: &str = "build.tool.execution.goals";
pub const TOOL_CMDLINE: &str = "build.tool.execution.cmdline";
pub const TOOL_OPTS: &str = "build.tool.execution.opts";
pub const TOOL_IS_EXECUTION_ROOT: &str = "build.tool.execution.isRoot";
pub const TOOL_EXECUTION_PROJECT: &str = "build.tool.execution.project";
pub const TOOL_FILTERS: &str = "build.tool.execution.filters";
pub const TOOL_ACTIVE_PROFILES: &str = "build.tool.execution.profiles.active";

/// Prefix of the per-profile `<prefix>.<id> = <source>` entries.
pub const ACTIVE_PROFILE_PREFIX: &str = "build.tool.execution.profile.active";

/// Prefix of execution properties copied into the store.
pub const EXECUTION_PROPERTY_PREFIX: &str = "execution.property";

// Project
pub const PROJECT_HOMEPAGE: &str = "project.page.home.url";
pub const PROJECT_OPS: &str = "project.page.ops.url";
pub const PROJECT_CATEGORY: &str = "project.category";
pub const PROJECT_SUBCATEGORY: &str = "project.subcategory";
pub const PROJECT_TAGS: &str = "project.tags";

/// Value recorded for `build.scmLocallyModified` when the status query failed.
pub const LOCALLY_MODIFIED_UNKNOWN: &str = "unknown";

/// Separator used for every comma-joined multi-value fact.
pub const LIST_SEPARATOR: &str = ", ";

/// Key of the per-profile entry for `profile_id`.
pub fn active_profile_key(profile_id: &str) -> String {
    format!("{ACTIVE_PROFILE_PREFIX}.{profile_id}")
}

/// Key under which execution property `name` is stored.
pub fn execution_property_key(name: &str) -> String {
    format!("{EXECUTION_PROPERTY_PREFIX}.{name}")
}

/// Per-profile entries are side metadata and never render in misc.
pub fn is_intended_for_misc_section(key: &str) -> bool {
    !key.starts_with(ACTIVE_PROFILE_PREFIX)
}
