use crate::error::BuildMetaError;
use crate::facts::store::FactStore;
use crate::providers::{BuildContext, MetaDataProvider};

/// Materializes the user-selected properties under their output keys.
pub struct SelectedPropertiesProvider;

impl MetaDataProvider for SelectedPropertiesProvider {
    fn name(&self) -> &'static str {
        "selected-properties"
    }

    fn provide(&self, ctx: &BuildContext, store: &mut FactStore) -> Result<(), BuildMetaError> {
        for property in &ctx.config.properties {
            if let Some(value) = property.resolve(ctx) {
                store.set(property.output_key(), value);
            }
        }
        Ok(())
    }
}
