use serde::{Deserialize, Serialize};

use crate::util::text::is_blank;

/// Where a selected property looks for its value.
///
/// Lookups are tried in order: project property, system property,
/// environment variable.
pub trait PropertySource {
    fn project_property(&self, name: &str) -> Option<String>;
    fn system_property(&self, name: &str) -> Option<String>;
    fn env_var(&self, name: &str) -> Option<String>;
}

/// A user-declared extra fact.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SelectedProperty {
    /// Name looked up in the property sources.
    pub name: String,
    /// Key written to the store; defaults to `name`.
    pub property: Option<String>,
    /// Fixed value, used instead of any lookup.
    pub value: Option<String>,
    /// Title of the section the property renders in; misc when unset.
    pub section: Option<String>,
    /// Display label for console rendering.
    pub label: Option<String>,
}

impl SelectedProperty {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_property(mut self, property: impl Into<String>) -> Self {
        self.property = Some(property.into());
        self
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn with_section(mut self, section: impl Into<String>) -> Self {
        self.section = Some(section.into());
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// The store key: the mapped name if non-blank, else the name.
    pub fn output_key(&self) -> &str {
        match self.property.as_deref() {
            Some(p) if !is_blank(p) => p,
            _ => &self.name,
        }
    }

    pub fn section(&self) -> Option<&str> {
        self.section.as_deref().filter(|s| !is_blank(s))
    }

    /// First non-blank value among fixed value, project property, system
    /// property and environment variable.
    pub fn resolve(&self, source: &impl PropertySource) -> Option<String> {
        if let Some(v) = self.value.as_deref().filter(|v| !is_blank(v)) {
            return Some(v.to_string());
        }
        let name = self.name.as_str();
        source
            .project_property(name)
            .filter(|v| !is_blank(v))
            .or_else(|| source.system_property(name).filter(|v| !is_blank(v)))
            .or_else(|| source.env_var(name).filter(|v| !is_blank(v)))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    #[derive(Default)]
    struct MapSource {
        project: BTreeMap<String, String>,
        system: BTreeMap<String, String>,
        env: BTreeMap<String, String>,
    }

    impl PropertySource for MapSource {
        fn project_property(&self, name: &str) -> Option<String> {
            self.project.get(name).cloned()
        }
        fn system_property(&self, name: &str) -> Option<String> {
            self.system.get(name).cloned()
        }
        fn env_var(&self, name: &str) -> Option<String> {
            self.env.get(name).cloned()
        }
    }

    fn source() -> MapSource {
        let mut s = MapSource::default();
        s.project.insert("in.project".into(), "p".into());
        s.project.insert("blank.project".into(), "  ".into());
        s.system.insert("in.project".into(), "s".into());
        s.system.insert("blank.project".into(), "s".into());
        s.env.insert("only.env".into(), "e".into());
        s
    }

    #[test]
    fn fixed_value_wins() {
        let p = SelectedProperty::new("in.project").with_value("fixed");
        assert_eq!(p.resolve(&source()).as_deref(), Some("fixed"));
    }

    #[test]
    fn lookup_order_skips_blank_values() {
        let src = source();
        assert_eq!(
            SelectedProperty::new("in.project").resolve(&src).as_deref(),
            Some("p")
        );
        assert_eq!(
            SelectedProperty::new("blank.project").resolve(&src).as_deref(),
            Some("s")
        );
        assert_eq!(
            SelectedProperty::new("only.env").resolve(&src).as_deref(),
            Some("e")
        );
        assert_eq!(SelectedProperty::new("nowhere").resolve(&src), None);
    }

    #[test]
    fn blank_fixed_value_falls_through() {
        let p = SelectedProperty::new("only.env").with_value(" ");
        assert_eq!(p.resolve(&source()).as_deref(), Some("e"));
    }

    #[test]
    fn output_key_falls_back_to_name() {
        assert_eq!(SelectedProperty::new("a").output_key(), "a");
        assert_eq!(SelectedProperty::new("a").with_property("b").output_key(), "b");
        assert_eq!(SelectedProperty::new("a").with_property("").output_key(), "a");
    }

    #[test]
    fn deserializes_from_toml() {
        let p: SelectedProperty = toml::from_str(
            r#"
            name = "ci.job"
            property = "build.ci.job"
            section = "build.runtime"
            label = "CI job"
            "#,
        )
        .unwrap();
        assert_eq!(p.output_key(), "build.ci.job");
        assert_eq!(p.section(), Some("build.runtime"));
        assert_eq!(p.label.as_deref(), Some("CI job"));
    }
}
