//! External command execution in the three modes the resolvers and commands need.
//!
//! - `capture_lines`: query whose output drives a decision; never shown to the user.
//! - `run_visible`: side-effecting action; output attached only when verbose.
//! - `run_visible_or_terminate`: final user-visible action; output always attached and
//!   failure is returned as `Terminate` for the binary to turn into an exit.
//!
//! Every mode announces `launching: <cmd> [<args>]` on stdout first when verbose.

use std::process::{Command, Output, Stdio};

use crate::errors::{ExecutionError, Terminate};

/// Seam between the resolvers and the host's git/docker binaries.
pub trait CommandRunner {
    fn capture_lines(&self, program: &str, args: &[String]) -> Result<Vec<String>, ExecutionError>;

    fn run_visible(&self, program: &str, args: &[String]) -> Result<(), ExecutionError>;

    fn run_visible_or_terminate(&self, program: &str, args: &[String]) -> Result<(), Terminate>;

    /// Whether resolvers should print their "found ..." notices.
    fn verbose(&self) -> bool {
        false
    }
}

/// CommandRunner backed by std::process.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner {
    verbose: bool,
}

impl ProcessRunner {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    fn announce(&self, program: &str, args: &[String]) {
        tracing::debug!(program, ?args, "launching");
        if self.verbose {
            println!("launching: {} [{}]", program, args.join(" "));
        }
    }
}

fn check_output(program: &str, args: &[String], out: Output) -> Result<Output, ExecutionError> {
    if out.status.success() {
        Ok(out)
    } else {
        Err(ExecutionError::exited(
            program,
            args,
            out.status.code(),
            String::from_utf8_lossy(&out.stderr).into_owned(),
        ))
    }
}

impl CommandRunner for ProcessRunner {
    fn capture_lines(&self, program: &str, args: &[String]) -> Result<Vec<String>, ExecutionError> {
        self.announce(program, args);
        let out = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| ExecutionError::spawn(program, args, e))?;
        let out = check_output(program, args, out)?;
        Ok(String::from_utf8_lossy(&out.stdout)
            .lines()
            .map(str::to_string)
            .collect())
    }

    fn run_visible(&self, program: &str, args: &[String]) -> Result<(), ExecutionError> {
        self.announce(program, args);
        let mut cmd = Command::new(program);
        cmd.args(args);
        if self.verbose {
            let status = cmd
                .status()
                .map_err(|e| ExecutionError::spawn(program, args, e))?;
            if status.success() {
                return Ok(());
            }
            return Err(ExecutionError::exited(program, args, status.code(), ""));
        }
        let out = cmd
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| ExecutionError::spawn(program, args, e))?;
        check_output(program, args, out).map(|_| ())
    }

    fn run_visible_or_terminate(&self, program: &str, args: &[String]) -> Result<(), Terminate> {
        self.announce(program, args);
        let status = Command::new(program)
            .args(args)
            .status()
            .map_err(|e| ExecutionError::spawn(program, args, e))?;
        if status.success() {
            Ok(())
        } else {
            Err(ExecutionError::exited(program, args, status.code(), "").into())
        }
    }

    fn verbose(&self) -> bool {
        self.verbose
    }
}
