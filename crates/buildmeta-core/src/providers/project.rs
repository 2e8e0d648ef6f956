use crate::error::BuildMetaError;
use crate::facts::keys::*;
use crate::facts::store::FactStore;
use crate::providers::{BuildContext, MetaDataProvider};

/// Descriptive project facts: home page and the well-known
/// `project.*` properties.
pub struct ProjectProvider;

const PROJECT_PROPERTY_KEYS: &[&str] = &[
    PROJECT_OPS,
    PROJECT_CATEGORY,
    PROJECT_SUBCATEGORY,
    PROJECT_TAGS,
];

impl MetaDataProvider for ProjectProvider {
    fn name(&self) -> &'static str {
        "project"
    }

    fn provide(&self, ctx: &BuildContext, store: &mut FactStore) -> Result<(), BuildMetaError> {
        if !ctx.config.providers.add_project_info {
            return Ok(());
        }
        let project = ctx.project();
        store.set_if_not_blank(PROJECT_HOMEPAGE, project.url.as_deref());
        for key in PROJECT_PROPERTY_KEYS {
            store.set_if_not_blank(key, project.properties.get(*key).map(String::as_str));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::config::BuildMetaConfig;

    fn config() -> BuildMetaConfig {
        let mut config = BuildMetaConfig::default();
        config.project.url = Some("https://example.com/app".into());
        for (k, v) in [
            (PROJECT_CATEGORY, "tools"),
            (PROJECT_TAGS, "cli, build"),
            (PROJECT_SUBCATEGORY, " "),
            ("unrelated", "x"),
        ] {
            config.project.properties.insert(k.into(), v.into());
        }
        config
    }

    #[test]
    fn disabled_by_default() {
        let ctx = BuildContext::new(config(), ".", Utc::now());
        let mut store = FactStore::new();
        ProjectProvider.provide(&ctx, &mut store).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn copies_non_blank_well_known_properties() {
        let mut config = config();
        config.providers.add_project_info = true;
        let ctx = BuildContext::new(config, ".", Utc::now());
        let mut store = FactStore::new();
        ProjectProvider.provide(&ctx, &mut store).unwrap();

        let keys: Vec<&str> = store.keys().collect();
        assert_eq!(keys, vec![PROJECT_CATEGORY, PROJECT_HOMEPAGE, PROJECT_TAGS]);
    }
}
