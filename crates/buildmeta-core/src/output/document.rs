//! The XML build report.
//!
//! The document has a fixed shape; facts that are absent or blank produce no
//! element and container elements without children are dropped.

use std::path::Path;

use tracing::{debug, info};

use crate::error::BuildMetaError;
use crate::facts::keys::*;
use crate::facts::store::FactStore;
use crate::output::write_file;
use crate::output::xml::{Element, to_xml_string};
use crate::sections::classify::Classifier;
use crate::util::dates::{XML_DATE_PATTERN, parse_date};
use crate::util::paths::FilePathNormalizer;
use crate::util::text::split_list;

pub const CODE_URI: &str = "http://github.com/sbadakhc/buildmetadata-maven-plugin";
pub const XML_SCHEMA_INSTANCE: &str = "http://www.w3.org/2001/XMLSchema-instance";

pub struct DocumentBuilder<'a> {
    store: &'a FactStore,
    classifier: &'a Classifier<'a>,
    normalizer: &'a FilePathNormalizer,
}

impl<'a> DocumentBuilder<'a> {
    pub fn new(
        store: &'a FactStore,
        classifier: &'a Classifier<'a>,
        normalizer: &'a FilePathNormalizer,
    ) -> Self {
        Self {
            store,
            classifier,
            normalizer,
        }
    }

    pub fn build(&self) -> Element {
        let mut root = Element::new("buildmetadata")
            .with_attribute("xmlns:xsi", XML_SCHEMA_INSTANCE)
            .with_attribute("xmlns", CODE_URI)
            .with_attribute("xsi:schemaLocation", format!("{CODE_URI} {CODE_URI}"));

        self.content(&mut root, "name", FULL_VERSION);
        self.content(&mut root, "category", PROJECT_CATEGORY);
        self.content(&mut root, "subcategory", PROJECT_SUBCATEGORY);
        self.content(&mut root, "version", VERSION);
        self.content(&mut root, "groupId", GROUP_ID);
        self.content(&mut root, "artifactId", ARTIFACT_ID);
        self.date(&mut root, "date", BUILD_DATE);
        self.content(&mut root, "timestamp", BUILD_TIMESTAMP);
        root.push_if_not_empty(self.list("tags", "tag", PROJECT_TAGS));
        self.content(&mut root, "build-year", BUILD_YEAR);
        self.metadata(&mut root, SECTION_ARTIFACT);
        self.metadata(&mut root, SECTION_BUILD_DATE);

        root.push_if_not_empty(self.project());
        root.push_if_not_empty(self.scm());
        root.push_if_not_empty(self.runtime());
        root.push_if_not_empty(self.misc());
        root
    }

    fn value(&self, key: &str) -> Option<&'a str> {
        self.store.get_non_blank(key)
    }

    fn content(&self, parent: &mut Element, name: &str, key: &str) {
        if let Some(value) = self.value(key) {
            parent.push(Element::with_text(name, value));
        }
    }

    /// Re-emit a stored date in the report layout; unparseable dates are
    /// left out.
    fn date(&self, parent: &mut Element, name: &str, key: &str) {
        let Some(raw) = self.value(key) else {
            return;
        };
        let pattern = self.store.get(BUILD_DATE_PATTERN).unwrap_or_default();
        match parse_date(raw, pattern) {
            Some(date) => {
                parent.push(Element::with_text(name, date.format(XML_DATE_PATTERN).to_string()))
            }
            None => debug!(key, value = raw, "cannot parse date, skipping"),
        }
    }

    fn list(&self, name: &str, item: &str, key: &str) -> Element {
        let mut parent = Element::new(name);
        if let Some(value) = self.value(key) {
            for token in split_list(value) {
                parent.push(Element::with_text(item, token));
            }
        }
        parent
    }

    /// Selected properties declared for `section`, as `metadata` children.
    fn metadata(&self, parent: &mut Element, section: &str) {
        for property in self.classifier.selected_for(section) {
            let key = property.output_key();
            if let Some(value) = self.value(key) {
                parent.push(Element::with_text("metadata", value).with_attribute("name", key));
            }
        }
    }

    fn project(&self) -> Element {
        let mut project = Element::new("project");
        self.content(&mut project, "copyright-year", COPYRIGHT_YEAR);
        self.content(&mut project, "home-page-url", PROJECT_HOMEPAGE);
        self.content(&mut project, "ops-home-page-url", PROJECT_OPS);
        self.metadata(&mut project, SECTION_PROJECT);
        project
    }

    fn scm(&self) -> Element {
        let mut scm = Element::new("scm");
        self.content(&mut scm, "revision", SCM_REVISION_ID);
        self.date(&mut scm, "revision-date", SCM_REVISION_DATE);
        self.content(&mut scm, "url", SCM_URL);

        let mut files = Element::new("locally-modified-files");
        if let Some(value) = self.value(SCM_LOCALLY_MODIFIED_FILES) {
            for token in split_list(value) {
                let file = match token.rsplit_once(':') {
                    Some((path, modtype)) if !modtype.trim().is_empty() => {
                        Element::with_text("file", path.trim())
                            .with_attribute("modtype", modtype.trim())
                    }
                    Some((path, _)) => Element::with_text("file", path.trim()),
                    None => Element::with_text("file", token),
                };
                files.push(file);
            }
        }
        scm.push_if_not_empty(files);
        self.metadata(&mut scm, SECTION_SCM);
        scm
    }

    fn runtime(&self) -> Element {
        let mut runtime = Element::new("runtime");
        self.content(&mut runtime, "build-server", HOSTNAME);
        self.content(&mut runtime, "build-user", BUILD_USER);

        let mut os = Element::new("os");
        self.content(&mut os, "arch", OS_ARCH);
        self.content(&mut os, "name", OS_NAME);
        self.content(&mut os, "version", OS_VERSION);
        runtime.push_if_not_empty(os);

        runtime.push_if_not_empty(self.toolchain());
        runtime.push_if_not_empty(self.build_tool());

        let mut env = Element::new("env");
        let prefix = format!("{EXECUTION_PROPERTY_PREFIX}.");
        for (key, value) in self.store.with_prefix(&prefix) {
            env.push(Element::with_text("var", value).with_attribute("name", key));
        }
        runtime.push_if_not_empty(env);

        self.metadata(&mut runtime, SECTION_RUNTIME);
        runtime
    }

    fn toolchain(&self) -> Element {
        let mut toolchain = Element::new("toolchain");
        self.content(&mut toolchain, "name", TOOLCHAIN_NAME);
        self.content(&mut toolchain, "version", TOOLCHAIN_VERSION);
        self.content(&mut toolchain, "vendor", TOOLCHAIN_VENDOR);
        self.content(&mut toolchain, "vm", TOOLCHAIN_VM);
        self.content(&mut toolchain, "compiler", TOOLCHAIN_COMPILER);
        self.content(&mut toolchain, "options", TOOLCHAIN_OPTS);
        self.metadata(&mut toolchain, SECTION_TOOLCHAIN);
        toolchain
    }

    fn build_tool(&self) -> Element {
        let mut tool = Element::new("build-tool");
        self.content(&mut tool, "version", TOOL_VERSION);
        self.content(&mut tool, "commandline", TOOL_CMDLINE);
        self.content(&mut tool, "execution-project", TOOL_EXECUTION_PROJECT);
        self.content(&mut tool, "is-execution-root", TOOL_IS_EXECUTION_ROOT);
        tool.push_if_not_empty(self.list("goals", "goal", TOOL_GOALS));

        let mut filters = Element::new("filters");
        if let Some(value) = self.value(TOOL_FILTERS) {
            for token in split_list(value) {
                filters.push(Element::with_text("filter", self.normalizer.normalize(token)));
            }
        }
        tool.push_if_not_empty(filters);

        let mut profiles = Element::new("profiles");
        if let Some(value) = self.value(TOOL_ACTIVE_PROFILES) {
            for id in split_list(value) {
                let mut profile = Element::with_text("profile", id);
                if let Some(source) = self.store.get(&active_profile_key(id)) {
                    profile.set_attribute("source", source);
                }
                profiles.push(profile);
            }
        }
        tool.push_if_not_empty(profiles);

        self.content(&mut tool, "options", TOOL_OPTS);
        self.metadata(&mut tool, SECTION_BUILD_TOOL);
        tool
    }

    fn misc(&self) -> Element {
        let mut misc = Element::new("misc");
        for entry in self.classifier.misc(self.store) {
            misc.push(Element::with_text("metadata", entry.value).with_attribute("name", entry.key));
        }
        misc
    }
}

/// Render the report for `store` as a string.
pub fn render_document(
    store: &FactStore,
    classifier: &Classifier<'_>,
    normalizer: &FilePathNormalizer,
) -> String {
    to_xml_string(&DocumentBuilder::new(store, classifier, normalizer).build())
}

pub fn write_document(
    path: &Path,
    store: &FactStore,
    classifier: &Classifier<'_>,
    normalizer: &FilePathNormalizer,
) -> Result<(), BuildMetaError> {
    let content = render_document(store, classifier, normalizer);
    write_file(path, &content).map_err(|source| BuildMetaError::Serialization {
        target: "XML report",
        path: path.to_path_buf(),
        source,
    })?;
    info!(path = %path.display(), "wrote build report");
    Ok(())
}
