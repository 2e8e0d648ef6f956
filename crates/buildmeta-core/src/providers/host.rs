use crate::error::BuildMetaError;
use crate::facts::keys::HOSTNAME;
use crate::facts::store::FactStore;
use crate::providers::{BuildContext, MetaDataProvider};
use crate::util::text::is_blank;

/// `build.host.name` of the machine running the build.
pub struct HostProvider;

#[cfg(unix)]
fn system_hostname() -> Option<String> {
    nix::unistd::gethostname()
        .ok()
        .and_then(|name: std::ffi::OsString| name.into_string().ok())
}

#[cfg(not(unix))]
fn system_hostname() -> Option<String> {
    None
}

/// The system hostname, falling back to `HOSTNAME` and `COMPUTERNAME`.
pub fn capture_hostname(ctx: &BuildContext) -> Option<String> {
    system_hostname()
        .or_else(|| ctx.env("HOSTNAME").map(str::to_string))
        .or_else(|| ctx.env("COMPUTERNAME").map(str::to_string))
        .filter(|h| !is_blank(h))
}

impl MetaDataProvider for HostProvider {
    fn name(&self) -> &'static str {
        "host"
    }

    fn provide(&self, ctx: &BuildContext, store: &mut FactStore) -> Result<(), BuildMetaError> {
        if !ctx.config.providers.add_host_info {
            return Ok(());
        }
        let hostname = capture_hostname(ctx)
            .ok_or_else(|| BuildMetaError::provider(self.name(), "cannot determine host name"))?;
        store.set(HOSTNAME, hostname);
        Ok(())
    }
}
