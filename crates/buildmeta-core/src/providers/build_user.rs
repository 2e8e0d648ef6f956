use crate::error::BuildMetaError;
use crate::facts::keys::BUILD_USER;
use crate::facts::store::FactStore;
use crate::providers::{BuildContext, MetaDataProvider};
use crate::sections::selected::PropertySource;
use crate::util::text::is_blank;

/// `build.user` from the configured project property, else `USER`
/// (`USERNAME` on Windows).
pub struct BuildUserProvider;

impl MetaDataProvider for BuildUserProvider {
    fn name(&self) -> &'static str {
        "build-user"
    }

    fn provide(&self, ctx: &BuildContext, store: &mut FactStore) -> Result<(), BuildMetaError> {
        let from_property = ctx
            .config
            .build_user_property
            .as_deref()
            .filter(|p| !is_blank(p))
            .and_then(|p| ctx.project_property(p));
        let user = from_property
            .filter(|u| !is_blank(u))
            .or_else(|| ctx.env("USER").map(str::to_string))
            .or_else(|| ctx.env("USERNAME").map(str::to_string));
        store.set_if_not_blank(BUILD_USER, user.as_deref());
        Ok(())
    }
}
