//! Repository root detection, memoized for the lifetime of one locator.

use std::fs;
use std::path::{Path, PathBuf};

use once_cell::unsync::OnceCell;

use crate::errors::LibdragonError;
use crate::util::CommandRunner;

pub struct RepoLocator<'r> {
    runner: &'r dyn CommandRunner,
    git: String,
    start: PathBuf,
    root: OnceCell<Option<PathBuf>>,
}

impl<'r> RepoLocator<'r> {
    /// Locator for the repository containing `start` (normally the current directory).
    pub fn new(runner: &'r dyn CommandRunner, git: &str, start: impl Into<PathBuf>) -> Self {
        Self {
            runner,
            git: git.to_string(),
            start: start.into(),
            root: OnceCell::new(),
        }
    }

    /// Absolute top-level directory of the repository, or None outside one.
    ///
    /// Both outcomes are cached; git is asked at most once.
    pub fn locate(&self) -> Option<&Path> {
        self.root
            .get_or_init(|| show_toplevel(self.runner, &self.git, &self.start))
            .as_deref()
    }

    pub fn must_locate(&self) -> Result<&Path, LibdragonError> {
        self.locate().ok_or(LibdragonError::NotInRepository)
    }

    /// Repository root, or the starting directory itself when it is not in a repository.
    pub fn locate_or_start(&self) -> &Path {
        self.locate().unwrap_or(&self.start)
    }
}

fn show_toplevel(runner: &dyn CommandRunner, git: &str, start: &Path) -> Option<PathBuf> {
    let args = vec![
        "-C".to_string(),
        start.display().to_string(),
        "rev-parse".to_string(),
        "--show-toplevel".to_string(),
    ];
    let lines = match runner.capture_lines(git, &args) {
        Ok(lines) => lines,
        Err(e) => {
            tracing::debug!(error = %e, "not inside a git repository");
            return None;
        }
    };
    let top = lines
        .iter()
        .map(|l| l.trim())
        .find(|l| !l.is_empty())?;
    let p = PathBuf::from(top);
    // Prefer canonical absolute path if possible
    fs::canonicalize(&p).ok().or(Some(p))
}
