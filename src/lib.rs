/*!
libdragon: host-side helper for N64 projects built with the libdragon SDK.

A git repository is mapped onto one long-running Docker toolchain container
and onto one vendored copy of libdragon. The library holds the resolution and
caching logic; the binary (src/main.rs) is thin command glue on top.

Module map
- util::exec: ProcessRunner, the only way git and docker are invoked.
- repo: repository root detection (memoized per locator).
- vendor: vendored libdragon location and strategy (submodule or subtree).
- toolchain: toolchain image precedence (override, vendored file, cache, default).
- container: container record, find-or-create protocol, teardown, workdir mapping.
- docker / config / skeleton / color / errors: supporting pieces.
*/

mod color;
pub mod config;
pub mod container;
pub mod docker;
mod errors;
pub mod repo;
pub mod skeleton;
pub mod toolchain;
pub mod util;
pub mod vendor;

#[cfg(test)]
mod test_support;

pub use color::*;
pub use config::Settings;
pub use container::{container_workdir, ContainerSession};
pub use errors::*;
pub use repo::RepoLocator;
pub use toolchain::{ImageSource, ToolchainImage, ToolchainResolver};
pub use util::{CommandRunner, ProcessRunner};
pub use vendor::{VendorLocation, VendorResolver, VendorStrategy};
