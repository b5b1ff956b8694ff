use std::path::{Path, PathBuf};

use libdragon::util::argv;
use libdragon::{docker, LibdragonError, ToolchainResolver, VendorStrategy};

use super::Context;

pub(crate) fn run_update(
    ctx: &Context<'_>,
    directory: Option<&Path>,
    revision: Option<&str>,
    image: Option<String>,
) -> Result<(), LibdragonError> {
    let root = ctx.repo.must_locate()?.to_path_buf();
    let found = ctx.vendor.resolve_or_override(&root, directory)?;
    let vendor_dir = found.absolute(&root);
    if ctx.verbose() {
        println!("found libdragon: {} ({})", vendor_dir.display(), found.strategy);
    }

    let git = ctx.settings.git.as_str();
    let root_arg = root.display().to_string();
    let path_arg = found.path.display().to_string();

    ctx.progress("Updating libdragon...");
    match found.strategy {
        VendorStrategy::Submodule => {
            ctx.runner.run_visible_or_terminate(
                git,
                &argv(["-C", &root_arg, "submodule", "update", "--remote", "--merge", &path_arg]),
            )?;
            if let Some(rev) = revision {
                let dir = vendor_dir.display().to_string();
                ctx.runner
                    .run_visible_or_terminate(git, &argv(["-C", &dir, "checkout", rev]))?;
            }
        }
        VendorStrategy::Subtree => {
            let rev = revision.unwrap_or(&ctx.settings.vendor_branch);
            ctx.runner.run_visible_or_terminate(
                git,
                &argv([
                    "-C",
                    &root_arg,
                    "subtree",
                    "pull",
                    "--prefix",
                    &path_arg,
                    &ctx.settings.vendor_git,
                    rev,
                    "--squash",
                ]),
            )?;
        }
    }

    update_toolchain(ctx, &root, vendor_dir, image)
}

/// Resolve the toolchain image for the vendored tree and pull it.
///
/// An explicit `image` is persisted to the cache file for later runs.
pub(super) fn update_toolchain(
    ctx: &Context<'_>,
    root: &Path,
    vendor_dir: PathBuf,
    image: Option<String>,
) -> Result<(), LibdragonError> {
    let settings = ctx.docker_settings()?;
    let image = ToolchainResolver::new(&settings)
        .repo_root(root)
        .vendor_dir(vendor_dir)
        .override_image(image, true)
        .resolve_image();
    ctx.progress("\nUpdating toolchain...");
    if ctx.verbose() {
        println!("toolchain image: {} ({})", image.reference, image.source);
    }
    ctx.runner
        .run_visible_or_terminate(&settings.docker, &docker::pull_args(&image.reference))?;
    Ok(())
}
