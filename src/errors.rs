//! Error mapping guide:
//! - Spawn failures with io::ErrorKind::NotFound map to exit code 127.
//! - A failed final action (`Terminate`) exits with the child's own status, 1 when it has none.
//! - Everything else maps to 1.
//! - Probe failures never reach this module: resolvers recover them locally.
use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::util::shell_join;

/// Failure of one external command: either it could not be spawned or it exited non-zero.
#[derive(Debug)]
pub struct ExecutionError {
    pub command: String,
    pub args: Vec<String>,
    /// Exit status of the child; None when it was never spawned or died from a signal.
    pub code: Option<i32>,
    /// Captured error stream, empty when the stream was attached to the terminal.
    pub stderr: String,
    spawn: Option<io::Error>,
}

impl ExecutionError {
    pub fn spawn(command: &str, args: &[String], err: io::Error) -> Self {
        Self {
            command: command.to_string(),
            args: args.to_vec(),
            code: None,
            stderr: String::new(),
            spawn: Some(err),
        }
    }

    pub fn exited(command: &str, args: &[String], code: Option<i32>, stderr: impl Into<String>) -> Self {
        Self {
            command: command.to_string(),
            args: args.to_vec(),
            code,
            stderr: stderr.into(),
            spawn: None,
        }
    }

    /// The io error kind of a spawn failure (binary not found, permission denied).
    pub fn spawn_kind(&self) -> Option<io::ErrorKind> {
        self.spawn.as_ref().map(io::Error::kind)
    }
}

impl fmt::Display for ExecutionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.command, shell_join(&self.args))?;
        match (&self.spawn, self.code) {
            (Some(e), _) => write!(f, ": {e}"),
            (None, Some(code)) => write!(f, ": exit status {code}"),
            (None, None) => write!(f, ": terminated by signal"),
        }
    }
}

impl std::error::Error for ExecutionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.spawn.as_ref().map(|e| e as _)
    }
}

/// Failure of the final, user-visible action of a command.
///
/// Only the binary turns this into a process exit; library code just returns it.
#[derive(Debug, Error)]
#[error(transparent)]
pub struct Terminate(#[from] pub ExecutionError);

#[derive(Debug, Error)]
pub enum LibdragonError {
    #[error("this command must be run from a git repository")]
    NotInRepository,
    #[error("cannot find libdragon in this repository\nuse --directory to specify the location")]
    VendorNotFound,
    #[error("{}: not a directory", .0.display())]
    NotADirectory(PathBuf),
    #[error("{}: not inside the repository {}", .path.display(), .root.display())]
    OutsideRepository { path: PathBuf, root: PathBuf },
    #[error("file already exists: {} (use --force to overwrite)", .0.display())]
    SkeletonExists(PathBuf),
    #[error("cannot find ELF file to disassemble -- use --file to specify")]
    ElfNotFound,
    #[error("multiple ELF files found in {} -- use --file to specify", .0.display())]
    ElfAmbiguous(PathBuf),
    #[error("docker run did not report a container id")]
    ContainerNotCreated,
    #[error("error running command: {0}")]
    Exec(#[from] ExecutionError),
    #[error("error running command: {0}")]
    Terminated(#[from] Terminate),
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl LibdragonError {
    /// Captured stderr of the failed child, if any was collected.
    pub fn child_stderr(&self) -> Option<&str> {
        let e = match self {
            LibdragonError::Exec(e) | LibdragonError::Terminated(Terminate(e)) => e,
            _ => return None,
        };
        let s = e.stderr.trim_end();
        (!s.is_empty()).then_some(s)
    }
}

/// Map an io::Error to a process exit code: 127 for NotFound, 1 otherwise.
pub fn exit_code_for_io_error(e: &io::Error) -> u8 {
    if e.kind() == io::ErrorKind::NotFound {
        127
    } else {
        1
    }
}

/// Convert a LibdragonError to the process exit code.
pub fn exit_code_for_error(e: &LibdragonError) -> u8 {
    match e {
        LibdragonError::Io(ioe) => exit_code_for_io_error(ioe),
        LibdragonError::Exec(ee) | LibdragonError::Terminated(Terminate(ee)) => {
            if ee.spawn_kind() == Some(io::ErrorKind::NotFound) {
                return 127;
            }
            match ee.code {
                Some(c) if (1..=255).contains(&c) => c as u8,
                _ => 1,
            }
        }
        _ => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_terminated_uses_child_exit_code() {
        let e: LibdragonError =
            Terminate(ExecutionError::exited("docker", &args(&["exec", "abc", "make"]), Some(2), ""))
                .into();
        assert_eq!(exit_code_for_error(&e), 2);
    }

    #[test]
    fn test_signal_and_setup_errors_map_to_one() {
        let e: LibdragonError = ExecutionError::exited("git", &[], None, "").into();
        assert_eq!(exit_code_for_error(&e), 1);
        assert_eq!(exit_code_for_error(&LibdragonError::NotInRepository), 1);
        assert_eq!(exit_code_for_error(&LibdragonError::VendorNotFound), 1);
    }

    #[test]
    fn test_spawn_not_found_maps_to_127() {
        let io = io::Error::new(io::ErrorKind::NotFound, "no such file");
        let e: LibdragonError = ExecutionError::spawn("docker", &args(&["ps"]), io).into();
        assert_eq!(exit_code_for_error(&e), 127);
        let io = io::Error::new(io::ErrorKind::NotFound, "missing");
        assert_eq!(exit_code_for_error(&LibdragonError::Io(io)), 127);
    }

    #[test]
    fn test_display_includes_command_and_status() {
        let e = ExecutionError::exited(
            "docker",
            &args(&["container", "rm", "--force", "abc123"]),
            Some(1),
            "Error: No such container: abc123\n",
        );
        assert_eq!(e.to_string(), "docker container rm --force abc123: exit status 1");
        let le = LibdragonError::Exec(e);
        assert_eq!(le.child_stderr(), Some("Error: No such container: abc123"));
    }
}
