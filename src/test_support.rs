//! Scripted CommandRunner for unit tests: records every invocation and answers
//! through a closure keyed on the full argument vector (program first).

use std::cell::RefCell;

use crate::errors::{ExecutionError, Terminate};
use crate::util::CommandRunner;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Mode {
    Capture,
    Visible,
    Terminate,
}

#[derive(Debug, Clone)]
pub(crate) struct Call {
    pub mode: Mode,
    pub argv: Vec<String>,
}

pub(crate) enum Reply {
    Lines(Vec<String>),
    Fail(i32),
}

pub(crate) struct FakeRunner {
    calls: RefCell<Vec<Call>>,
    respond: Box<dyn Fn(&[String]) -> Reply>,
}

impl FakeRunner {
    pub fn new(respond: impl Fn(&[String]) -> Reply + 'static) -> Self {
        Self {
            calls: RefCell::new(Vec::new()),
            respond: Box::new(respond),
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn count(&self, pred: impl Fn(&[String]) -> bool) -> usize {
        self.calls.borrow().iter().filter(|c| pred(&c.argv)).count()
    }

    fn invoke(&self, mode: Mode, program: &str, args: &[String]) -> Result<Vec<String>, ExecutionError> {
        let mut argv = vec![program.to_string()];
        argv.extend(args.iter().cloned());
        self.calls.borrow_mut().push(Call {
            mode,
            argv: argv.clone(),
        });
        match (self.respond)(&argv) {
            Reply::Lines(lines) => Ok(lines),
            Reply::Fail(code) => Err(ExecutionError::exited(program, args, Some(code), "fake failure")),
        }
    }
}

impl CommandRunner for FakeRunner {
    fn capture_lines(&self, program: &str, args: &[String]) -> Result<Vec<String>, ExecutionError> {
        self.invoke(Mode::Capture, program, args)
    }

    fn run_visible(&self, program: &str, args: &[String]) -> Result<(), ExecutionError> {
        self.invoke(Mode::Visible, program, args).map(|_| ())
    }

    fn run_visible_or_terminate(&self, program: &str, args: &[String]) -> Result<(), Terminate> {
        self.invoke(Mode::Terminate, program, args)
            .map(|_| ())
            .map_err(Terminate)
    }
}
