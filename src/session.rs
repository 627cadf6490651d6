use std::path::PathBuf;

use anyhow::Result;

use crate::cli::GlobalArgs;
use crate::invoke::{Invocation, Invoker, ProcessInvoker, StdioMode, Tool};

/// Per-invocation context: working directory, verbosity, and the process
/// backend. Resolution and command code read ambient state from here, never
/// from the process environment directly.
pub struct Session {
  pub cwd: PathBuf,
  pub quiet: bool,
  pub stdio: StdioMode,
  invoker: Box<dyn Invoker>,
}

impl Session {
  pub fn from_globals(globals: &GlobalArgs) -> Result<Session> {
    let cwd = match &globals.cwd {
      Some(dir) => dir.clone(),
      None => std::env::current_dir()?,
    };

    Ok(Session {
      cwd,
      quiet: globals.quiet || globals.silent,
      stdio: if globals.silent { StdioMode::Ignore } else { StdioMode::Inherit },
      invoker: Box::new(ProcessInvoker),
    })
  }

  /// Wrapper-level status line; suppressed by --quiet/--silent.
  pub fn log(&self, line: &str) {
    if !self.quiet {
      println!("{}", line);
    }
  }

  pub fn invoke(&self, tool: Tool, args: Vec<String>) -> Result<i32> {
    self.invoker.invoke(&Invocation::new(tool, args), self.stdio, &self.cwd)
  }

  pub fn invoke_with_env(&self, tool: Tool, args: Vec<String>, env: Vec<(String, String)>) -> Result<i32> {
    let mut inv = Invocation::new(tool, args);
    inv.env = env;
    self.invoker.invoke(&inv, self.stdio, &self.cwd)
  }
}

/// Runs `per_doc` over every resolved document in order, never skipping later
/// documents after a failure, and folds the exit codes into one aggregate
/// (0 only when every document succeeded, else 1).
pub fn run_documents<F>(inputs: &[String], mut per_doc: F) -> Result<i32>
where
  F: FnMut(&str) -> Result<i32>,
{
  let mut failed = false;

  for input in inputs {
    if per_doc(input)? != 0 {
      failed = true;
    }
  }

  Ok(if failed { 1 } else { 0 })
}
