//! Assigns every fact key to exactly one section.
//!
//! A catalog section claims its static keys first. Selected properties then
//! claim their output key for the section they name, first declaration
//! first. Whatever is left renders in misc, minus the per-profile entries.

use crate::facts::keys::{SECTION_MISC, is_intended_for_misc_section};
use crate::facts::store::FactStore;
use crate::sections::catalog::{Section, SectionCatalog};
use crate::sections::selected::SelectedProperty;

/// One fact placed in a section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedEntry {
    pub key: String,
    pub value: String,
    pub label: Option<String>,
}

/// A section with at least one present, non-blank fact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedSection {
    pub title: String,
    pub entries: Vec<ClassifiedEntry>,
}

pub struct Classifier<'a> {
    catalog: &'a SectionCatalog,
    selected: &'a [SelectedProperty],
}

impl<'a> Classifier<'a> {
    pub fn new(catalog: &'a SectionCatalog, selected: &'a [SelectedProperty]) -> Self {
        Self { catalog, selected }
    }

    pub fn catalog(&self) -> &'a SectionCatalog {
        self.catalog
    }

    /// First selected declaration of `key` that targets a catalog section.
    fn selected_declaration(&self, key: &str) -> Option<&'a SelectedProperty> {
        self.selected.iter().find(|p| {
            p.output_key() == key
                && p.section()
                    .is_some_and(|title| self.catalog.get(title).is_some())
        })
    }

    /// Title of the catalog section `key` renders in, or `None` for misc.
    pub fn section_of(&self, key: &str) -> Option<&'a str> {
        if let Some(section) = self.catalog.section_of(key) {
            return Some(section.title());
        }
        self.selected_declaration(key).and_then(SelectedProperty::section)
    }

    pub fn is_misc(&self, key: &str) -> bool {
        self.section_of(key).is_none() && is_intended_for_misc_section(key)
    }

    /// Selected properties rendered inside `section`, excluding any whose
    /// key the catalog already claims.
    pub fn selected_for(&self, section: &str) -> Vec<&'a SelectedProperty> {
        let mut out: Vec<&'a SelectedProperty> = Vec::new();
        for p in self.selected {
            let key = p.output_key();
            if self.section_of(key) == Some(section)
                && self.catalog.section_of(key).is_none()
                && !out.iter().any(|seen| seen.output_key() == key)
            {
                out.push(p);
            }
        }
        out
    }

    fn label_for(&self, key: &str) -> Option<String> {
        self.selected
            .iter()
            .find(|p| p.output_key() == key)
            .and_then(|p| p.label.clone())
    }

    fn entry(&self, store: &FactStore, key: &str) -> Option<ClassifiedEntry> {
        store.get_non_blank(key).map(|value| ClassifiedEntry {
            key: key.to_string(),
            value: value.to_string(),
            label: self.label_for(key),
        })
    }

    fn classify_section(&self, store: &FactStore, section: &Section) -> Option<ClassifiedSection> {
        let mut entries: Vec<ClassifiedEntry> = section
            .keys()
            .iter()
            .filter_map(|k| self.entry(store, k))
            .collect();
        entries.extend(
            self.selected_for(section.title())
                .into_iter()
                .filter_map(|p| self.entry(store, p.output_key())),
        );
        (!entries.is_empty()).then(|| ClassifiedSection {
            title: section.title().to_string(),
            entries,
        })
    }

    /// Non-blank misc facts in key order.
    pub fn misc(&self, store: &FactStore) -> Vec<ClassifiedEntry> {
        store
            .keys()
            .filter(|k| self.is_misc(k))
            .filter_map(|k| self.entry(store, k))
            .collect()
    }

    /// Every non-empty section in catalog order, misc last.
    pub fn classify(&self, store: &FactStore) -> Vec<ClassifiedSection> {
        let mut out: Vec<ClassifiedSection> = self
            .catalog
            .sections()
            .iter()
            .filter_map(|s| self.classify_section(store, s))
            .collect();

        let misc = self.misc(store);
        if !misc.is_empty() {
            out.push(ClassifiedSection {
                title: SECTION_MISC.to_string(),
                entries: misc,
            });
        }
        out
    }
}
