//! Build tool version, toolchain and operating system facts.

use crate::error::BuildMetaError;
use crate::facts::keys::*;
use crate::facts::store::FactStore;
use crate::providers::{BuildContext, MetaDataProvider};

pub struct RuntimeProvider;

#[cfg(unix)]
fn os_version() -> Option<String> {
    nix::sys::utsname::uname()
        .ok()
        .and_then(|u| u.release().to_str().map(str::to_string))
}

#[cfg(not(unix))]
fn os_version() -> Option<String> {
    None
}

impl MetaDataProvider for RuntimeProvider {
    fn name(&self) -> &'static str {
        "runtime"
    }

    fn provide(&self, ctx: &BuildContext, store: &mut FactStore) -> Result<(), BuildMetaError> {
        let runtime = ctx.runtime();
        let toggles = &ctx.config.providers;

        store.set_if_not_blank(TOOL_VERSION, runtime.tool_version.as_deref());

        if toggles.add_toolchain_info {
            store.set_if_not_blank(TOOLCHAIN_NAME, runtime.toolchain_name.as_deref());
            store.set_if_not_blank(TOOLCHAIN_VERSION, runtime.toolchain_version.as_deref());
            store.set_if_not_blank(TOOLCHAIN_VENDOR, runtime.toolchain_vendor.as_deref());
            store.set_if_not_blank(TOOLCHAIN_VM, runtime.toolchain_vm.as_deref());
            store.set_if_not_blank(TOOLCHAIN_COMPILER, runtime.toolchain_compiler.as_deref());
        }

        if toggles.add_os_info {
            store.set_if_not_blank(OS_NAME, Some(std::env::consts::OS));
            store.set_if_not_blank(OS_ARCH, Some(std::env::consts::ARCH));
            store.set_if_not_blank(OS_VERSION, os_version().as_deref());
        }
        Ok(())
    }
}
