/*!
Container session: find or create the one Docker container bound to a repository root.

Resolution walks the same steps on every invocation, each only if the previous
yielded nothing:
1. Container record (`.git/libdragon-docker-container`): with auto-start, a
   successful `docker container start` confirms it and returns at once; without,
   `docker container ls -f id=` must still list it. A failure means the record is stale.
2. Volume scan: any container whose mount source is the root. With auto-start it
   is started and the record rewritten; without, it is returned untouched.
3. Without auto-start nothing more happens: "not found" is a normal outcome.
4. Creation: `docker run -d` with the root bind-mounted at the volume root, then
   the record is written (best-effort; a root without `.git` just has no record).

Probe failures in steps 1 and 2 are never surfaced. There is no locking around
the record file: two concurrent invocations may both create a container and the
last writer owns the record.
*/
use std::fs;
use std::io;
use std::path::{Component, Path};

use crate::config::Settings;
use crate::docker;
use crate::errors::LibdragonError;
use crate::toolchain::ToolchainResolver;
use crate::util::CommandRunner;

/// Read the persisted container id, if any.
pub fn read_record(path: &Path) -> Option<String> {
    fs::read_to_string(path)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

pub fn write_record(path: &Path, id: &str) -> io::Result<()> {
    fs::write(path, format!("{id}\n"))
}

/// Remove the record; a missing file is not an error.
pub fn remove_record(path: &Path) -> io::Result<()> {
    match fs::remove_file(path) {
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        other => other,
    }
}

pub struct ContainerSession<'a> {
    runner: &'a dyn CommandRunner,
    settings: &'a Settings,
    toolchain: &'a ToolchainResolver<'a>,
}

impl<'a> ContainerSession<'a> {
    /// `toolchain` is consulted only when a container has to be created.
    pub fn new(
        runner: &'a dyn CommandRunner,
        settings: &'a Settings,
        toolchain: &'a ToolchainResolver<'a>,
    ) -> Self {
        Self {
            runner,
            settings,
            toolchain,
        }
    }

    #[tracing::instrument(level = "debug", skip(self), fields(root = %repo_root.display()))]
    pub fn resolve(&self, repo_root: &Path, auto_start: bool) -> Result<Option<String>, LibdragonError> {
        let record = self.settings.container_record_path(repo_root);

        if let Some(id) = read_record(&record) {
            let alive = if auto_start {
                self.start(&id)
            } else {
                self.exists(&id)
            };
            if alive {
                self.notice(&id);
                return Ok(Some(id));
            }
            tracing::debug!(%id, "stale container record");
        }

        if let Some(id) = self.find_by_volume(repo_root) {
            self.notice(&id);
            if !auto_start {
                return Ok(Some(id));
            }
            if self.start(&id) {
                self.persist(&record, &id);
                return Ok(Some(id));
            }
            tracing::debug!(%id, "container bound to root did not start");
        }

        if !auto_start {
            return Ok(None);
        }

        let id = self.create(repo_root)?;
        self.persist(&record, &id);
        Ok(Some(id))
    }

    /// Force-remove the container bound to `repo_root` and its record.
    ///
    /// Returns the removed id; None (and no side effects) when there was nothing to remove.
    pub fn teardown(&self, repo_root: &Path) -> Result<Option<String>, LibdragonError> {
        let Some(id) = self.resolve(repo_root, false)? else {
            return Ok(None);
        };
        self.runner
            .run_visible(&self.settings.docker, &docker::remove_args(&id))?;
        if let Err(e) = remove_record(&self.settings.container_record_path(repo_root)) {
            tracing::debug!(error = %e, "could not remove container record");
        }
        Ok(Some(id))
    }

    /// Run `command` inside the container bound to `repo_root`, from the directory matching `cwd`.
    pub fn dispatch(&self, repo_root: &Path, cwd: &Path, command: &[String]) -> Result<(), LibdragonError> {
        let id = self
            .resolve(repo_root, true)?
            .ok_or(LibdragonError::ContainerNotCreated)?;
        let workdir = container_workdir(&self.settings.volume_root, repo_root, cwd);
        self.runner
            .run_visible_or_terminate(&self.settings.docker, &docker::exec_args(&id, &workdir, command))?;
        Ok(())
    }

    fn start(&self, id: &str) -> bool {
        self.runner
            .run_visible(&self.settings.docker, &docker::start_args(id))
            .map_err(|e| tracing::debug!(error = %e, "start probe failed"))
            .is_ok()
    }

    fn exists(&self, id: &str) -> bool {
        self.runner
            .capture_lines(&self.settings.docker, &docker::list_by_id_args(id))
            .map(|lines| docker::first_id(&lines).is_some())
            .unwrap_or(false)
    }

    fn find_by_volume(&self, repo_root: &Path) -> Option<String> {
        let lines = self
            .runner
            .capture_lines(&self.settings.docker, &docker::list_by_volume_args(repo_root))
            .map_err(|e| tracing::debug!(error = %e, "volume probe failed"))
            .ok()?;
        docker::first_id(&lines)
    }

    fn create(&self, repo_root: &Path) -> Result<String, LibdragonError> {
        let image = self.toolchain.resolve_image();
        let lines = self.runner.capture_lines(
            &self.settings.docker,
            &docker::create_args(self.settings, repo_root, &image.reference),
        )?;
        let id = docker::first_id(&lines).ok_or(LibdragonError::ContainerNotCreated)?;
        tracing::debug!(%id, image = %image.reference, "container created");
        Ok(id)
    }

    fn persist(&self, record: &Path, id: &str) {
        if let Err(e) = write_record(record, id) {
            tracing::debug!(error = %e, "container record not written");
        }
    }

    fn notice(&self, id: &str) {
        if self.runner.verbose() {
            println!("container found: {id}");
        }
    }
}

/// In-container working directory: volume root joined with `cwd` relative to `repo_root`.
///
/// Falls back to the volume root when `cwd` cannot be expressed relative to the root.
pub fn container_workdir(volume_root: &str, repo_root: &Path, cwd: &Path) -> String {
    let root = fs::canonicalize(repo_root).unwrap_or_else(|_| repo_root.to_path_buf());
    let here = fs::canonicalize(cwd).unwrap_or_else(|_| cwd.to_path_buf());
    let Ok(rel) = here.strip_prefix(&root) else {
        return volume_root.to_string();
    };
    let mut parts: Vec<String> = Vec::new();
    for c in rel.components() {
        match c {
            Component::Normal(s) => parts.push(s.to_string_lossy().into_owned()),
            Component::CurDir => {}
            _ => return volume_root.to_string(),
        }
    }
    if parts.is_empty() {
        volume_root.to_string()
    } else {
        format!("{}/{}", volume_root.trim_end_matches('/'), parts.join("/"))
    }
}
