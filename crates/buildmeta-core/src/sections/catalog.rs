use std::collections::BTreeSet;

use crate::facts::keys::*;

/// A titled group of well-known fact keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    title: &'static str,
    keys: &'static [&'static str],
}

impl Section {
    pub const fn new(title: &'static str, keys: &'static [&'static str]) -> Self {
        Self { title, keys }
    }

    pub fn title(&self) -> &'static str {
        self.title
    }

    /// Keys in rendering order.
    pub fn keys(&self) -> &'static [&'static str] {
        self.keys
    }

    pub fn contains(&self, key: &str) -> bool {
        self.keys.contains(&key)
    }
}

const SCM_KEYS: &[&str] = &[
    SCM_REVISION_ID,
    SCM_REVISION_DATE,
    SCM_URL,
    SCM_LOCALLY_MODIFIED,
    SCM_LOCALLY_MODIFIED_FILES,
];

const ARTIFACT_KEYS: &[&str] = &[GROUP_ID, ARTIFACT_ID, VERSION, FULL_VERSION];

const BUILD_DATE_KEYS: &[&str] = &[
    BUILD_DATE,
    BUILD_TIMESTAMP,
    BUILD_DATE_PATTERN,
    BUILD_YEAR,
    COPYRIGHT_YEAR,
];

const RUNTIME_KEYS: &[&str] = &[HOSTNAME, BUILD_USER, OS_NAME, OS_ARCH, OS_VERSION];

const TOOLCHAIN_KEYS: &[&str] = &[
    TOOLCHAIN_NAME,
    TOOLCHAIN_VERSION,
    TOOLCHAIN_VENDOR,
    TOOLCHAIN_VM,
    TOOLCHAIN_COMPILER,
    TOOLCHAIN_OPTS,
];

const BUILD_TOOL_KEYS: &[&str] = &[
    TOOL_VERSION,
    TOOL_CMDLINE,
    TOOL_OPTS,
    TOOL_IS_EXECUTION_ROOT,
    TOOL_EXECUTION_PROJECT,
    TOOL_GOALS,
    TOOL_FILTERS,
    TOOL_ACTIVE_PROFILES,
];

const PROJECT_KEYS: &[&str] = &[
    PROJECT_HOMEPAGE,
    PROJECT_OPS,
    PROJECT_CATEGORY,
    PROJECT_SUBCATEGORY,
    PROJECT_TAGS,
];

/// Ordered, immutable list of sections. Catalog order is rendering order;
/// misc is not part of the catalog and always renders last.
#[derive(Debug, Clone)]
pub struct SectionCatalog {
    sections: Vec<Section>,
}

impl SectionCatalog {
    pub fn new(sections: Vec<Section>) -> Self {
        Self { sections }
    }

    /// The fixed catalog every serializer uses.
    pub fn standard() -> Self {
        Self::new(vec![
            Section::new(SECTION_SCM, SCM_KEYS),
            Section::new(SECTION_ARTIFACT, ARTIFACT_KEYS),
            Section::new(SECTION_BUILD_DATE, BUILD_DATE_KEYS),
            Section::new(SECTION_RUNTIME, RUNTIME_KEYS),
            Section::new(SECTION_TOOLCHAIN, TOOLCHAIN_KEYS),
            Section::new(SECTION_BUILD_TOOL, BUILD_TOOL_KEYS),
            Section::new(SECTION_PROJECT, PROJECT_KEYS),
        ])
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn get(&self, title: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.title == title)
    }

    /// The section whose static key list contains `key`.
    pub fn section_of(&self, key: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.contains(key))
    }

    /// Union of every section's keys.
    pub fn standard_keys(&self) -> BTreeSet<&'static str> {
        self.sections
            .iter()
            .flat_map(|s| s.keys.iter().copied())
            .collect()
    }
}

impl Default for SectionCatalog {
    fn default() -> Self {
        Self::standard()
    }
}
