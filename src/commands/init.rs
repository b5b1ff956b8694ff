use std::fs;
use std::path::Path;

use libdragon::util::argv;
use libdragon::{skeleton, LibdragonError};

use super::update::update_toolchain;
use super::Context;

pub(crate) fn run_init(
    ctx: &Context<'_>,
    force: bool,
    submodule: bool,
    image: Option<String>,
) -> Result<(), LibdragonError> {
    let root = ctx.repo.must_locate()?.to_path_buf();
    let git = ctx.settings.git.as_str();
    let s = &ctx.settings;

    ctx.progress("Create project skeleton...");
    skeleton::extract(&ctx.cwd, force, ctx.verbose())?;

    ctx.progress("Download libdragon...");
    if submodule {
        ctx.runner.run_visible_or_terminate(
            git,
            &argv([
                "submodule",
                "add",
                "--force",
                "--name",
                &s.vendor_name,
                "--branch",
                &s.vendor_branch,
                &s.vendor_git,
            ]),
        )?;
    } else {
        let prefix = subtree_prefix(&root, &ctx.cwd, &s.vendor_name);
        let root_arg = root.display().to_string();

        // git subtree refuses to work on a repository without commits.
        if ctx
            .runner
            .capture_lines(git, &argv(["-C", &root_arg, "rev-parse", "HEAD"]))
            .is_err()
        {
            ctx.runner.run_visible(
                git,
                &argv([
                    "-C",
                    &root_arg,
                    "commit",
                    "--allow-empty",
                    "-n",
                    "-m",
                    "Initial commit.",
                ]),
            )?;
        }

        ctx.runner.run_visible_or_terminate(
            git,
            &argv([
                "-C",
                &root_arg,
                "subtree",
                "add",
                "--prefix",
                &prefix,
                &s.vendor_git,
                &s.vendor_branch,
                "--squash",
            ]),
        )?;
    }

    update_toolchain(ctx, &root, ctx.cwd.join(&s.vendor_name), image)
}

/// Subtree prefix for vendoring into `cwd`, relative to the repository root with `/` separators.
fn subtree_prefix(root: &Path, cwd: &Path, name: &str) -> String {
    let root = fs::canonicalize(root).unwrap_or_else(|_| root.to_path_buf());
    let rel = match cwd.strip_prefix(&root) {
        Ok(rel) => rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect::<Vec<_>>(),
        Err(_) => Vec::new(),
    };
    if rel.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", rel.join("/"), name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subtree_prefix_follows_cwd() {
        let root = Path::new("/work/game");
        assert_eq!(subtree_prefix(root, root, "libdragon"), "libdragon");
        assert_eq!(
            subtree_prefix(root, &root.join("n64"), "libdragon"),
            "n64/libdragon"
        );
        assert_eq!(subtree_prefix(root, Path::new("/elsewhere"), "libdragon"), "libdragon");
    }
}
