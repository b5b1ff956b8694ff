#![allow(clippy::module_name_repetitions)]
//! Docker runtime discovery and argument construction for the container lifecycle.

use std::env;
use std::io;
use std::path::{Path, PathBuf};

use which::which;

use crate::config::{Settings, RUNTIME_MARKER};

pub fn container_runtime_path() -> io::Result<PathBuf> {
    // Allow tests or callers to explicitly disable Docker detection to avoid hard failures
    if env::var("LIBDRAGON_SKIP_DOCKER").ok().as_deref() == Some("1") {
        return Err(io::Error::new(
            io::ErrorKind::NotFound,
            "Docker disabled by environment override.",
        ));
    }

    if let Ok(p) = which("docker") {
        return Ok(p);
    }
    Err(io::Error::new(
        io::ErrorKind::NotFound,
        "Docker is required but was not found in PATH.",
    ))
}

fn own(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// `docker container start <id>` (idempotent for running containers).
pub fn start_args(id: &str) -> Vec<String> {
    own(&["container", "start", id])
}

pub fn list_by_id_args(id: &str) -> Vec<String> {
    own(&["container", "ls", "-qa", "-f", &format!("id={id}")])
}

/// Containers, running or not, with a mount whose source is `root`.
pub fn list_by_volume_args(root: &Path) -> Vec<String> {
    own(&["container", "ls", "-qa", "-f", &format!("volume={}", root.display())])
}

/// Detached container with `root` bind-mounted at the volume root, kept alive by `tail -f`.
pub fn create_args(settings: &Settings, root: &Path, image: &str) -> Vec<String> {
    let mount = format!(
        "type=bind,source={},target={}",
        root.display(),
        settings.volume_root
    );
    own(&[
        "run",
        "-e",
        RUNTIME_MARKER,
        "-d",
        "--mount",
        &mount,
        "-w",
        &settings.volume_root,
        image,
        "tail",
        "-f",
        "/dev/null",
    ])
}

pub fn remove_args(id: &str) -> Vec<String> {
    own(&["container", "rm", "--force", id])
}

pub fn exec_args(id: &str, workdir: &str, command: &[String]) -> Vec<String> {
    let mut args = own(&["exec", "--workdir", workdir, id]);
    args.extend(command.iter().cloned());
    args
}

pub fn pull_args(image: &str) -> Vec<String> {
    own(&["pull", image])
}

/// First non-empty line of a docker query, i.e. the most recent container id.
pub fn first_id(lines: &[String]) -> Option<String> {
    lines
        .iter()
        .map(|l| l.trim())
        .find(|l| !l.is_empty())
        .map(str::to_string)
}
