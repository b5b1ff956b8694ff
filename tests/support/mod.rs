/*!
Test support helpers shared across integration tests.

- have_git(): check git availability on PATH
- init_repo(dir): initialize a git repo with a default identity
- commit(dir, subject, body): record an empty commit with a message body
- libdragon(dir): the CLI binary with git confined to `dir`

These helpers do not print skip messages themselves so tests keep their own
"skipping: ..." outputs.
*/

use std::path::Path;
use std::process::{Command, Stdio};

/// Return true if `git` is available on PATH.
#[allow(dead_code)]
pub fn have_git() -> bool {
    Command::new("git")
        .arg("--version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

fn git(dir: &Path, args: &[&str]) -> bool {
    Command::new("git")
        .args(args)
        .current_dir(dir)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Initialize a git repository at `dir` and set a default user identity.
#[allow(dead_code)]
pub fn init_repo(dir: &Path) {
    std::fs::create_dir_all(dir).expect("create repo dir");
    assert!(git(dir, &["init", "-q"]), "git init failed");
    git(dir, &["config", "user.name", "Libdragon Test"]);
    git(dir, &["config", "user.email", "test@example.com"]);
    git(dir, &["config", "commit.gpgsign", "false"]);
}

/// Record an empty commit whose message carries `body` after the subject line.
#[allow(dead_code)]
pub fn commit(dir: &Path, subject: &str, body: &str) {
    assert!(
        git(dir, &["commit", "-q", "--allow-empty", "-m", subject, "-m", body]),
        "git commit failed"
    );
}

/// The CLI binary, run in `dir`, with git discovery stopped at `dir`'s parent
/// and docker detection disabled.
#[allow(dead_code)]
pub fn libdragon(dir: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_libdragon"));
    cmd.current_dir(dir)
        .env("GIT_CEILING_DIRECTORIES", dir.parent().unwrap_or(dir))
        .env("LIBDRAGON_SKIP_DOCKER", "1")
        .env("LIBDRAGON_COLOR", "never")
        .env_remove("LIBDRAGON_GIT")
        .env_remove("LIBDRAGON_BRANCH");
    cmd
}
