use std::path::Path;
use std::process::{Command, Stdio};

use anyhow::{Context, Result};

/// The delegated executables this wrapper fronts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tool {
  Spectral,
  Redocly,
  Asyncapi,
}

impl Tool {
  /// Executable to spawn: an env override when set, else the tool name on PATH.
  /// The override exists so tests can point commands at a recording stub.
  pub fn executable(self) -> String {
    let (var, fallback) = match self {
      Tool::Spectral => ("API_TOOLS_SPECTRAL_BIN", "spectral"),
      Tool::Redocly => ("API_TOOLS_REDOCLY_BIN", "redocly"),
      Tool::Asyncapi => ("API_TOOLS_ASYNCAPI_BIN", "asyncapi"),
    };
    std::env::var(var).unwrap_or_else(|_| fallback.to_string())
  }
}

/// How the delegated tool's stdio is wired: the user either sees its output
/// verbatim or nothing at all. There is no capture mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StdioMode {
  Inherit,
  Ignore,
}

/// One fully-specified delegated-tool call.
#[derive(Debug, Clone)]
pub struct Invocation {
  pub tool: Tool,
  pub args: Vec<String>,
  pub env: Vec<(String, String)>,
}

impl Invocation {
  pub fn new(tool: Tool, args: Vec<String>) -> Self {
    Invocation { tool, args, env: Vec::new() }
  }
}

/// Seam between command logic and the OS; tests swap in a recording fake.
pub trait Invoker {
  fn invoke(&self, inv: &Invocation, stdio: StdioMode, cwd: &Path) -> Result<i32>;
}

/// Spawns the delegated executable and blocks until it exits. Spawn failure
/// (missing executable) is a propagated error; a tool that runs and fails is
/// reported purely through its exit code.
pub struct ProcessInvoker;

impl Invoker for ProcessInvoker {
  fn invoke(&self, inv: &Invocation, stdio: StdioMode, cwd: &Path) -> Result<i32> {
    let exe = inv.tool.executable();
    let mut cmd = Command::new(&exe);
    cmd.args(&inv.args).current_dir(cwd);

    for (key, value) in &inv.env {
      cmd.env(key, value);
    }

    if stdio == StdioMode::Ignore {
      cmd.stdin(Stdio::null()).stdout(Stdio::null()).stderr(Stdio::null());
    }

    let status = cmd
      .status()
      .with_context(|| format!("spawning {} {:?}", exe, inv.args))?;

    // A signal-terminated child carries no code; fold it into plain failure.
    Ok(status.code().unwrap_or(1))
  }
}
