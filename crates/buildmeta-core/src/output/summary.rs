use serde::{Deserialize, Serialize};

use crate::facts::keys::*;
use crate::facts::store::FactStore;
use crate::sections::classify::{ClassifiedEntry, Classifier};
use crate::util::text::split_list;

/// Console view of one collection run.
///
/// Sections appear in catalog order with misc last, each holding only
/// non-blank facts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Summary {
    pub tool: ToolInfo,
    pub sections: Vec<SummarySection>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolInfo {
    pub name: String,
    pub version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummarySection {
    pub title: String,
    pub entries: Vec<SummaryEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryEntry {
    pub key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub value: String,
    /// Tokens of a multi-value fact; empty for single values.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<String>,
}

fn is_multi_value(key: &str) -> bool {
    matches!(
        key,
        SCM_LOCALLY_MODIFIED_FILES | TOOL_GOALS | TOOL_FILTERS | TOOL_ACTIVE_PROFILES | PROJECT_TAGS
    )
}

impl SummaryEntry {
    fn from_classified(entry: ClassifiedEntry, store: &FactStore) -> Self {
        let items = if entry.key == TOOL_ACTIVE_PROFILES {
            split_list(&entry.value)
                .into_iter()
                .map(|id| match store.get_non_blank(&active_profile_key(id)) {
                    Some(source) => format!("{id}:{source}"),
                    None => id.to_string(),
                })
                .collect()
        } else if is_multi_value(&entry.key) {
            split_list(&entry.value).into_iter().map(str::to_string).collect()
        } else {
            Vec::new()
        };
        Self {
            key: entry.key,
            label: entry.label,
            value: entry.value,
            items,
        }
    }

    /// Label if one was declared, else the key.
    pub fn display_name(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.key)
    }
}

impl Summary {
    pub fn new(tool: ToolInfo, store: &FactStore, classifier: &Classifier<'_>) -> Self {
        let sections = classifier
            .classify(store)
            .into_iter()
            .map(|section| SummarySection {
                title: section.title,
                entries: section
                    .entries
                    .into_iter()
                    .map(|e| SummaryEntry::from_classified(e, store))
                    .collect(),
            })
            .collect();
        Self { tool, sections }
    }
}
