use std::path::Path;

use anyhow::Result;
use clap::{Args, Subcommand, ValueEnum};

use crate::invoke::Tool;
use crate::resolve;
use crate::session::Session;
use crate::{defaults, util};

const DEFAULT_INPUT: &str = "asyncapi/asyncapi.yaml";
const HTML_TEMPLATE: &str = "@asyncapi/html-template@latest";

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
  Json,
  Stylish,
  Junit,
  Html,
  Teamcity,
  Pretty,
  GithubActions,
  Sarif,
  CodeClimate,
  Gitlab,
  Markdown,
}

impl OutputFormat {
  fn as_str(self) -> &'static str {
    match self {
      OutputFormat::Json => "json",
      OutputFormat::Stylish => "stylish",
      OutputFormat::Junit => "junit",
      OutputFormat::Html => "html",
      OutputFormat::Teamcity => "teamcity",
      OutputFormat::Pretty => "pretty",
      OutputFormat::GithubActions => "github-actions",
      OutputFormat::Sarif => "sarif",
      OutputFormat::CodeClimate => "code-climate",
      OutputFormat::Gitlab => "gitlab",
      OutputFormat::Markdown => "markdown",
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

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputExtension {
  Json,
  Yaml,
  Yml,
}

impl OutputExtension {
  pub fn as_str(self) -> &'static str {
    match self {
      OutputExtension::Json => "json",
      OutputExtension::Yaml => "yaml",
      OutputExtension::Yml => "yml",
    }
  }
}

#[derive(Args, Debug)]
pub struct AsyncapiArgs {
  #[command(subcommand)]
  pub cmd: Option<AsyncapiCommand>,

  /// Raw arguments forwarded to the AsyncAPI CLI (after `--`)
  #[arg(last = true)]
  pub passthrough: Vec<String>,
}

#[derive(Subcommand, Debug)]
pub enum AsyncapiCommand {
  /// Validate AsyncAPI documents
  Validate(ValidateArgs),
  /// Lint AsyncAPI documents (same checks as validate)
  Lint(ValidateArgs),
  /// Bundle AsyncAPI documents into a single file
  Bundle(BundleArgs),
  /// Convert AsyncAPI documents from any format to yaml, yml or JSON
  Format(FormatArgs),
  /// Generate code or documentation from AsyncAPI documents
  Generate(GenerateArgs),
  /// Build HTML documentation from AsyncAPI document (alias for generate docs)
  BuildDocs(DocsArgs),
}

#[derive(Args, Debug)]
pub struct ValidateArgs {
  /// Document path (default: asyncapi/asyncapi.yaml)
  pub input: Option<String>,

  /// Output format
  #[arg(long, value_enum, default_value_t = OutputFormat::Stylish)]
  pub format: OutputFormat,

  /// Write output to a file
  #[arg(long)]
  pub output: Option<String>,

  /// Fail severity threshold
  #[arg(long, value_enum, default_value_t = FailSeverity::Warn)]
  pub fail_severity: FailSeverity,

  /// Raw arguments forwarded to the AsyncAPI CLI (after `--`)
  #[arg(last = true)]
  pub passthrough: Vec<String>,
}

#[derive(Args, Debug)]
pub struct BundleArgs {
  /// Document path (default: asyncapi/asyncapi.yaml)
  pub input: Option<String>,

  /// Output file or directory path
  #[arg(long, default_value = "dist/bundle/asyncapi.yaml")]
  pub output: String,

  /// Output file extension (overrides extension in --output)
  #[arg(long, value_enum)]
  pub ext: Option<OutputExtension>,

  /// Generate x-origin fields that contain historical values of dereferenced $ref's
  #[arg(long)]
  pub x_origin: bool,

  /// Raw arguments forwarded to the AsyncAPI CLI (after `--`)
  #[arg(last = true)]
  pub passthrough: Vec<String>,
}

#[derive(Args, Debug)]
pub struct FormatArgs {
  /// Document path (default: asyncapi/asyncapi.yaml)
  pub input: Option<String>,

  /// Output file path
  #[arg(long, default_value = "dist/format/asyncapi.json")]
  pub output: String,

  /// Output file extension (overrides extension in --output)
  #[arg(long, value_enum)]
  pub ext: Option<OutputExtension>,

  /// Raw arguments forwarded to the AsyncAPI CLI (after `--`)
  #[arg(last = true)]
  pub passthrough: Vec<String>,
}

#[derive(Args, Debug)]
pub struct GenerateArgs {
  #[command(subcommand)]
  pub cmd: GenerateCommand,
}

#[derive(Subcommand, Debug)]
pub enum GenerateCommand {
  /// Generates code or documentation from AsyncAPI documents using a template
  FromTemplate(FromTemplateArgs),
  /// Generate HTML documentation from AsyncAPI document (convenience wrapper around from-template with HTML template)
  Docs(DocsArgs),
}

#[derive(Args, Debug)]
pub struct FromTemplateArgs {
  /// Template name or URL (e.g., @asyncapi/html-template or https://github.com/asyncapi/html-template)
  pub template: String,

  /// Document path (default: asyncapi/asyncapi.yaml)
  pub input: Option<String>,

  /// Output file or directory path
  #[arg(long, default_value = "dist/generated/")]
  pub output: String,

  /// Template parameter (can be used multiple times)
  #[arg(long = "params", num_args = 1..)]
  pub params: Vec<String>,

  /// Overwrite existing files
  #[arg(long)]
  pub force_write: bool,

  /// Raw arguments forwarded to the AsyncAPI CLI (after `--`)
  #[arg(last = true)]
  pub passthrough: Vec<String>,
}

#[derive(Args, Debug)]
pub struct DocsArgs {
  /// AsyncAPI document path (default: asyncapi/asyncapi.yaml)
  pub input: Option<String>,

  /// Output HTML file path
  #[arg(long, default_value = "dist/docs/asyncapi.html")]
  pub output: String,

  /// Additional params to pass to the template
  #[arg(long = "params", num_args = 1..)]
  pub params: Vec<String>,

  /// Generate a single HTML file instead of multiple files
  #[arg(long, overrides_with = "no_single_file")]
  pub single_file: bool,

  /// Generate multiple files (overrides --single-file)
  #[arg(long)]
  pub no_single_file: bool,

  /// Raw arguments forwarded to the AsyncAPI CLI (after `--`)
  #[arg(last = true)]
  pub passthrough: Vec<String>,
}

impl DocsArgs {
  fn single_file(&self) -> bool {
    !self.no_single_file
  }
}

pub fn run(session: &Session, args: AsyncapiArgs) -> Result<i32> {
  match args.cmd {
    Some(AsyncapiCommand::Validate(validate)) => run_validate(session, validate, "validate"),
    Some(AsyncapiCommand::Lint(lint)) => run_validate(session, lint, "lint"),
    Some(AsyncapiCommand::Bundle(bundle)) => run_bundle(session, bundle),
    Some(AsyncapiCommand::Format(format)) => run_format(session, format),
    Some(AsyncapiCommand::Generate(generate)) => match generate.cmd {
      GenerateCommand::FromTemplate(from_template) => run_from_template(session, from_template),
      GenerateCommand::Docs(docs) => run_docs(session, docs),
    },
    Some(AsyncapiCommand::BuildDocs(docs)) => run_docs(session, docs),
    None => raw_passthrough(session, args.passthrough),
  }
}

fn raw_passthrough(session: &Session, passthrough: Vec<String>) -> Result<i32> {
  if passthrough.is_empty() {
    util::print_tool_help("asyncapi")?;
    return Ok(0);
  }

  invoke(session, passthrough)
}

/// Every AsyncAPI CLI call gets a scrubbed child environment: telemetry off
/// via the bundled analytics config, and node-config pointed at an empty
/// directory so it stops warning about missing configuration.
fn invoke(session: &Session, args: Vec<String>) -> Result<i32> {
  let env = vec![
    (
      "ASYNCAPI_METRICS_CONFIG_PATH".to_string(),
      defaults::asyncapi_analytics_path()?.to_string_lossy().to_string(),
    ),
    (
      "NODE_CONFIG_DIR".to_string(),
      defaults::node_config_dir()?.to_string_lossy().to_string(),
    ),
    ("SUPPRESS_NO_CONFIG_WARNING".to_string(), "true".to_string()),
  ];

  session.invoke_with_env(Tool::Asyncapi, args, env)
}

// `lint` and `validate` are the same delegated check; only the announced verb
// differs.
fn run_validate(session: &Session, args: ValidateArgs, verb: &str) -> Result<i32> {
  let Some(input) = resolve::resolve_single(args.input.as_deref(), DEFAULT_INPUT, &session.cwd)
  else {
    eprintln!("{}", resolve::NO_INPUT_MESSAGE);
    return Ok(1);
  };

  session.log(&format!("🔍 AsyncAPI {}...", verb));
  session.log(&format!("   Input: {}", input));
  session.log(&format!("   Format: {}", args.format));
  if let Some(output) = &args.output {
    session.log(&format!("   Output: {}", output));
  }
  session.log(&format!("   Fail severity: {}", args.fail_severity));

  invoke(session, build_validate_args(&input, &args))
}

fn build_validate_args(input: &str, args: &ValidateArgs) -> Vec<String> {
  let mut argv = vec![
    "validate".to_string(),
    input.to_string(),
    "--diagnostics-format".to_string(),
    args.format.to_string(),
    "--fail-severity".to_string(),
    args.fail_severity.to_string(),
  ];

  if let Some(output) = &args.output {
    argv.push("--save-output".to_string());
    argv.push(output.clone());
  }

  argv.extend(args.passthrough.iter().cloned());
  argv
}

fn run_bundle(session: &Session, args: BundleArgs) -> Result<i32> {
  let Some(input) = resolve::resolve_single(args.input.as_deref(), DEFAULT_INPUT, &session.cwd)
  else {
    eprintln!("{}", resolve::NO_INPUT_MESSAGE);
    return Ok(1);
  };

  util::ensure_parent_dir(&session.cwd, &args.output)?;
  let output = apply_ext(&args.output, args.ext);

  session.log("📦 AsyncAPI bundle...");
  session.log(&format!("   Input: {}", input));
  session.log(&format!("   Output: {}", output));
  if let Some(ext) = args.ext {
    session.log(&format!("   Extension: {}", ext.as_str()));
  }
  session.log(&format!("   xOrigin: {}", args.x_origin));

  invoke(session, build_bundle_args(&input, &output, &args))
}

/// An --ext override is folded into the output path; the token itself is
/// never forwarded to the delegated tool.
fn apply_ext(output: &str, ext: Option<OutputExtension>) -> String {
  match ext {
    Some(ext) => util::replace_extension(output, ext.as_str()),
    None => output.to_string(),
  }
}

fn build_bundle_args(input: &str, output: &str, args: &BundleArgs) -> Vec<String> {
  let mut argv = vec![
    "bundle".to_string(),
    input.to_string(),
    "--output".to_string(),
    output.to_string(),
  ];

  if args.x_origin {
    argv.push("--xOrigin".to_string());
  }

  argv.extend(args.passthrough.iter().cloned());
  argv
}

fn run_format(session: &Session, args: FormatArgs) -> Result<i32> {
  let Some(input) = resolve::resolve_single(args.input.as_deref(), DEFAULT_INPUT, &session.cwd)
  else {
    eprintln!("{}", resolve::NO_INPUT_MESSAGE);
    return Ok(1);
  };

  util::ensure_parent_dir(&session.cwd, &args.output)?;
  let output = apply_ext(&args.output, args.ext);

  session.log("📝 AsyncAPI format...");
  session.log(&format!("   Input: {}", input));
  session.log(&format!("   Output: {}", output));
  if let Some(ext) = args.ext {
    session.log(&format!("   Extension: {}", ext.as_str()));
  }

  invoke(session, build_format_args(&input, &output, &args))
}

fn build_format_args(input: &str, output: &str, args: &FormatArgs) -> Vec<String> {
  let mut argv = vec![
    "format".to_string(),
    input.to_string(),
    "--output".to_string(),
    output.to_string(),
  ];

  // the conversion target follows the overridden extension
  if let Some(ext) = args.ext {
    argv.push("--format".to_string());
    argv.push(ext.as_str().to_string());
  }

  argv.extend(args.passthrough.iter().cloned());
  argv
}

/// The from-template invocation shape shared by the explicit subcommand and
/// the docs convenience wrapper.
struct TemplateRun {
  template: String,
  output: String,
  params: Vec<String>,
  force_write: bool,
  passthrough: Vec<String>,
}

fn run_from_template(session: &Session, args: FromTemplateArgs) -> Result<i32> {
  let Some(input) = resolve::resolve_single(args.input.as_deref(), DEFAULT_INPUT, &session.cwd)
  else {
    eprintln!("{}", resolve::NO_INPUT_MESSAGE);
    return Ok(1);
  };

  let run = TemplateRun {
    template: args.template,
    output: args.output,
    params: args.params,
    force_write: args.force_write,
    passthrough: args.passthrough,
  };

  session.log("🔄 AsyncAPI generate fromTemplate...");
  session.log(&format!("   Template: {}", run.template));
  session.log(&format!("   Input: {}", input));
  session.log(&format!("   Output: {}", run.output));

  invoke(session, build_from_template_args(&input, &run))
}

fn build_from_template_args(input: &str, run: &TemplateRun) -> Vec<String> {
  let mut argv = vec![
    "generate".to_string(),
    "fromTemplate".to_string(),
    input.to_string(),
    run.template.clone(),
    "--output".to_string(),
    run.output.clone(),
    "--install".to_string(),
    "--no-interactive".to_string(),
  ];

  if run.force_write {
    argv.push("--force-write".to_string());
  }

  if !run.params.is_empty() {
    argv.push("--param".to_string());
    argv.extend(run.params.iter().cloned());
  }

  argv.extend(run.passthrough.iter().cloned());
  argv
}

fn run_docs(session: &Session, args: DocsArgs) -> Result<i32> {
  let Some(input) = resolve::resolve_single(args.input.as_deref(), DEFAULT_INPUT, &session.cwd)
  else {
    eprintln!("{}", resolve::NO_INPUT_MESSAGE);
    return Ok(1);
  };

  let run = docs_template_run(&args);

  session.log("📚 AsyncAPI generate docs...");
  session.log(&format!("   Input: {}", input));
  session.log(&format!(
    "   Output: {}",
    if args.single_file() { &args.output } else { &run.output }
  ));
  if !run.params.is_empty() {
    session.log(&format!("   Params: {}", run.params.join(", ")));
  }
  if !args.single_file() {
    session.log("   Single file: false");
  }

  invoke(session, build_from_template_args(&input, &run))
}

/// Translates the docs convenience options into a from-template run against
/// the stock HTML template. Single-file mode pins the output filename via a
/// template param; multi-file mode nests everything under an asyncapi/
/// subdirectory instead.
fn docs_template_run(args: &DocsArgs) -> TemplateRun {
  let path = Path::new(&args.output);
  let filename = path
    .file_name()
    .map(|name| name.to_string_lossy().to_string())
    .unwrap_or_else(|| "asyncapi.html".to_string());
  let parent = path
    .parent()
    .filter(|dir| !dir.as_os_str().is_empty())
    .map(|dir| dir.to_string_lossy().to_string())
    .unwrap_or_else(|| ".".to_string());

  let mut params = Vec::new();
  let output = if args.single_file() {
    params.push("singleFile=true".to_string());
    params.push(format!("outFilename={}", filename));
    parent
  } else {
    Path::new(&parent).join("asyncapi").to_string_lossy().to_string()
  };

  params.extend(args.params.iter().cloned());

  TemplateRun {
    template: HTML_TEMPLATE.to_string(),
    output,
    params,
    force_write: true,
    passthrough: args.passthrough.clone(),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::session::testing;

  fn docs_args() -> DocsArgs {
    DocsArgs {
      input: None,
      output: "dist/docs/asyncapi.html".into(),
      params: Vec::new(),
      single_file: false,
      no_single_file: false,
      passthrough: Vec::new(),
    }
  }

  #[test]
  fn validate_args_translate_flag_names() {
    let args = ValidateArgs {
      input: None,
      format: OutputFormat::Stylish,
      output: Some("report.txt".into()),
      fail_severity: FailSeverity::Error,
      passthrough: Vec::new(),
    };
    let argv = build_validate_args("asyncapi/asyncapi.yaml", &args);
    assert_eq!(
      argv,
      vec![
        "validate",
        "asyncapi/asyncapi.yaml",
        "--diagnostics-format",
        "stylish",
        "--fail-severity",
        "error",
        "--save-output",
        "report.txt",
      ]
    );
  }

  #[test]
  fn bundle_ext_folds_into_output_and_is_not_forwarded() {
    let args = BundleArgs {
      input: None,
      output: "dist/bundle/asyncapi.yaml".into(),
      ext: Some(OutputExtension::Json),
      x_origin: true,
      passthrough: Vec::new(),
    };
    let output = apply_ext(&args.output, args.ext);
    assert_eq!(output, "dist/bundle/asyncapi.json");

    let argv = build_bundle_args("x.yaml", &output, &args);
    assert_eq!(argv, vec!["bundle", "x.yaml", "--output", "dist/bundle/asyncapi.json", "--xOrigin"]);
  }

  #[test]
  fn format_ext_sets_both_output_path_and_target_format() {
    let args = FormatArgs {
      input: None,
      output: "dist/format/asyncapi.json".into(),
      ext: Some(OutputExtension::Yaml),
      passthrough: Vec::new(),
    };
    let output = apply_ext(&args.output, args.ext);
    let argv = build_format_args("x.yaml", &output, &args);
    assert_eq!(
      argv,
      vec!["format", "x.yaml", "--output", "dist/format/asyncapi.yaml", "--format", "yaml"]
    );
  }

  #[test]
  fn from_template_args_carry_install_and_no_interactive() {
    let run = TemplateRun {
      template: "@asyncapi/html-template".into(),
      output: "dist/generated/".into(),
      params: vec!["a=1".into(), "b=2".into()],
      force_write: true,
      passthrough: vec!["--debug".into()],
    };
    let argv = build_from_template_args("spec.yaml", &run);
    assert_eq!(
      argv,
      vec![
        "generate",
        "fromTemplate",
        "spec.yaml",
        "@asyncapi/html-template",
        "--output",
        "dist/generated/",
        "--install",
        "--no-interactive",
        "--force-write",
        "--param",
        "a=1",
        "b=2",
        "--debug",
      ]
    );
  }

  #[test]
  fn docs_single_file_pins_filename_via_template_param() {
    let run = docs_template_run(&docs_args());
    assert_eq!(run.template, HTML_TEMPLATE);
    assert_eq!(run.output, "dist/docs");
    assert_eq!(run.params, vec!["singleFile=true", "outFilename=asyncapi.html"]);
    assert!(run.force_write);
  }

  #[test]
  fn docs_multi_file_nests_output_directory() {
    let mut args = docs_args();
    args.no_single_file = true;
    args.params = vec!["theme=dark".into()];
    let run = docs_template_run(&args);
    assert_eq!(run.output, "dist/docs/asyncapi");
    assert_eq!(run.params, vec!["theme=dark"]);
  }

  #[test]
  fn docs_bare_filename_outputs_to_current_directory() {
    let mut args = docs_args();
    args.output = "index.html".into();
    let run = docs_template_run(&args);
    assert_eq!(run.output, ".");
    assert!(run.params.contains(&"outFilename=index.html".to_string()));
  }

  #[test]
  fn invocations_carry_telemetry_opt_out_env() {
    let dir = tempfile::TempDir::new().unwrap();
    std::fs::create_dir_all(dir.path().join("asyncapi")).unwrap();
    std::fs::write(dir.path().join("asyncapi/asyncapi.yaml"), "{}").unwrap();

    let (session, recorder) = testing::session_with(dir.path());
    let args = ValidateArgs {
      input: None,
      format: OutputFormat::Stylish,
      output: None,
      fail_severity: FailSeverity::Warn,
      passthrough: Vec::new(),
    };
    let code = run_validate(&session, args, "validate").unwrap();
    assert_eq!(code, 0);

    let calls = recorder.calls.borrow();
    assert_eq!(calls.len(), 1);
    let keys: Vec<&str> = calls[0].env.iter().map(|(k, _)| k.as_str()).collect();
    assert!(keys.contains(&"ASYNCAPI_METRICS_CONFIG_PATH"));
    assert!(keys.contains(&"NODE_CONFIG_DIR"));
    assert!(keys.contains(&"SUPPRESS_NO_CONFIG_WARNING"));
  }

  #[test]
  fn validate_without_input_or_default_is_a_resolution_error() {
    let dir = tempfile::TempDir::new().unwrap();
    let (session, recorder) = testing::session_with(dir.path());
    let args = ValidateArgs {
      input: None,
      format: OutputFormat::Stylish,
      output: None,
      fail_severity: FailSeverity::Warn,
      passthrough: Vec::new(),
    };
    let code = run_validate(&session, args, "validate").unwrap();
    assert_eq!(code, 1);
    assert!(recorder.calls.borrow().is_empty());
  }

  #[test]
  fn lint_delegates_the_same_validate_argv() {
    let dir = tempfile::TempDir::new().unwrap();
    std::fs::create_dir_all(dir.path().join("asyncapi")).unwrap();
    std::fs::write(dir.path().join("asyncapi/asyncapi.yaml"), "{}").unwrap();

    let (session, recorder) = testing::session_with(dir.path());
    let args = AsyncapiArgs {
      cmd: Some(AsyncapiCommand::Lint(ValidateArgs {
        input: None,
        format: OutputFormat::Stylish,
        output: None,
        fail_severity: FailSeverity::Warn,
        passthrough: Vec::new(),
      })),
      passthrough: Vec::new(),
    };
    let code = run(&session, args).unwrap();
    assert_eq!(code, 0);

    let calls = recorder.calls.borrow();
    assert_eq!(calls.len(), 1);
    assert_eq!(
      &calls[0].args[..4],
      &[
        "validate".to_string(),
        "asyncapi/asyncapi.yaml".to_string(),
        "--diagnostics-format".to_string(),
        "stylish".to_string(),
      ]
    );
  }
}
