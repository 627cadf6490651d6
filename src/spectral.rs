use anyhow::Result;
use clap::{Args, Subcommand, ValueEnum};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::invoke::Tool;
use crate::resolve::{self, DocKindArgs, ResolvedConfig};
use crate::session::{run_documents, Session};
use crate::{defaults, util};

// Mirrors Spectral's own ruleset filename recognition.
static RULESET_PATTERN: Lazy<Regex> =
  Lazy::new(|| Regex::new(r"^\.?spectral\.(ya?ml|json|m?js)$").unwrap());

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
  Json,
  Stylish,
  Junit,
  Html,
  Text,
  Teamcity,
  Pretty,
  GithubActions,
  Sarif,
  Markdown,
  Gitlab,
}

impl OutputFormat {
  fn as_str(self) -> &'static str {
    match self {
      OutputFormat::Json => "json",
      OutputFormat::Stylish => "stylish",
      OutputFormat::Junit => "junit",
      OutputFormat::Html => "html",
      OutputFormat::Text => "text",
      OutputFormat::Teamcity => "teamcity",
      OutputFormat::Pretty => "pretty",
      OutputFormat::GithubActions => "github-actions",
      OutputFormat::Sarif => "sarif",
      OutputFormat::Markdown => "markdown",
      OutputFormat::Gitlab => "gitlab",
    }
  }
}

impl std::fmt::Display for OutputFormat {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailSeverity {
  Error,
  Warn,
  Info,
  Hint,
}

impl FailSeverity {
  fn as_str(self) -> &'static str {
    match self {
      FailSeverity::Error => "error",
      FailSeverity::Warn => "warn",
      FailSeverity::Info => "info",
      FailSeverity::Hint => "hint",
    }
  }
}

impl std::fmt::Display for FailSeverity {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

#[derive(Args, Debug)]
pub struct SpectralArgs {
  #[command(subcommand)]
  pub cmd: Option<SpectralCommand>,

  /// Raw arguments forwarded to the Spectral CLI (after `--`)
  #[arg(last = true)]
  pub passthrough: Vec<String>,
}

#[derive(Subcommand, Debug)]
pub enum SpectralCommand {
  /// Validate and lint OpenAPI, AsyncAPI, and Arazzo documents using Spectral
  Lint(LintArgs),
}

#[derive(Args, Debug)]
pub struct LintArgs {
  /// Document path (default: auto-detect)
  pub input: Option<String>,

  #[command(flatten)]
  pub kinds: DocKindArgs,

  /// Output format
  #[arg(long, value_enum, default_value_t = OutputFormat::Stylish)]
  pub format: OutputFormat,

  /// Write output to a file
  #[arg(long)]
  pub output: Option<String>,

  /// Ruleset file path (overrides auto/bundled)
  #[arg(long)]
  pub ruleset: Option<String>,

  /// Fail severity threshold
  #[arg(long, value_enum, default_value_t = FailSeverity::Warn)]
  pub fail_severity: FailSeverity,

  /// Display only failing results
  #[arg(long)]
  pub display_only_failures: bool,

  /// Enable verbose output
  #[arg(long)]
  pub verbose: bool,

  /// Raw arguments forwarded to the Spectral CLI (after `--`)
  #[arg(last = true)]
  pub passthrough: Vec<String>,
}

pub fn run(session: &Session, args: SpectralArgs) -> Result<i32> {
  match args.cmd {
    Some(SpectralCommand::Lint(lint)) => run_lint(session, lint),
    None => raw_passthrough(session, args.passthrough),
  }
}

fn raw_passthrough(session: &Session, passthrough: Vec<String>) -> Result<i32> {
  if passthrough.is_empty() {
    util::print_tool_help("spectral")?;
    return Ok(0);
  }

  session.invoke(Tool::Spectral, passthrough)
}

fn run_lint(session: &Session, args: LintArgs) -> Result<i32> {
  let resolved = resolve::resolve_documents(args.input.as_deref(), &args.kinds, &session.cwd);

  if resolved.inputs.is_empty() {
    eprintln!("{}", resolve::no_documents_message(&resolved));
    return Ok(1);
  }

  let bundled = defaults::spectral_ruleset_path()?;
  let ruleset =
    resolve::resolve_config(args.ruleset.as_deref(), &RULESET_PATTERN, &bundled, &session.cwd);

  run_documents(&resolved.inputs, |input| lint_one(session, input, &args, &ruleset))
}

fn lint_one(session: &Session, input: &str, args: &LintArgs, ruleset: &ResolvedConfig) -> Result<i32> {
  session.log("🔍 Spectral lint...");
  session.log(&format!("   Input: {}", input));
  session.log(&format!("   Format: {}", args.format));
  session.log(&format!("   Ruleset: {}", ruleset.display()));
  if let Some(output) = &args.output {
    session.log(&format!("   Output: {}", output));
  }
  session.log(&format!("   Fail Severity: {}", args.fail_severity));
  session.log(&format!("   Display Only Failures: {}", args.display_only_failures));
  session.log(&format!("   Verbose: {}", args.verbose));

  session.invoke(Tool::Spectral, build_lint_args(input, args, ruleset))
}

fn build_lint_args(input: &str, args: &LintArgs, ruleset: &ResolvedConfig) -> Vec<String> {
  let mut argv = vec![
    "lint".to_string(),
    input.to_string(),
    "--format".to_string(),
    args.format.to_string(),
    "--fail-severity".to_string(),
    args.fail_severity.to_string(),
  ];

  // only pass --ruleset when resolution produced a concrete path (cli or bundled)
  if let Some(path) = &ruleset.path {
    argv.push("--ruleset".to_string());
    argv.push(path.clone());
  }

  if let Some(output) = &args.output {
    argv.push("--output".to_string());
    argv.push(output.clone());
  }

  if args.display_only_failures {
    argv.push("--display-only-failures".to_string());
  }

  if args.verbose {
    argv.push("--verbose".to_string());
  }

  argv.extend(args.passthrough.iter().cloned());
  argv
}
