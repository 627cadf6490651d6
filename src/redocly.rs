use anyhow::Result;
use clap::{Args, Subcommand, ValueEnum};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::invoke::Tool;
use crate::resolve::{self, ConfigSource, DocKindArgs, ResolvedConfig};
use crate::session::{run_documents, Session};
use crate::{defaults, util};

static CONFIG_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\.?redocly\.ya?ml$").unwrap());

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
  Codeframe,
  Stylish,
  Json,
  Checkstyle,
  Codeclimate,
  GithubActions,
  Markdown,
  Summary,
}

impl OutputFormat {
  fn as_str(self) -> &'static str {
    match self {
      OutputFormat::Codeframe => "codeframe",
      OutputFormat::Stylish => "stylish",
      OutputFormat::Json => "json",
      OutputFormat::Checkstyle => "checkstyle",
      OutputFormat::Codeclimate => "codeclimate",
      OutputFormat::GithubActions => "github-actions",
      OutputFormat::Markdown => "markdown",
      OutputFormat::Summary => "summary",
    }
  }
}

impl std::fmt::Display for OutputFormat {
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
pub struct RedoclyArgs {
  #[command(subcommand)]
  pub cmd: Option<RedoclyCommand>,

  /// Raw arguments forwarded to the Redocly CLI (after `--`)
  #[arg(last = true)]
  pub passthrough: Vec<String>,
}

#[derive(Subcommand, Debug)]
pub enum RedoclyCommand {
  /// Create a redocly.yaml in the current directory
  Init(InitArgs),
  /// Validate and lint OpenAPI, AsyncAPI, Arazzo documents using Redocly
  Lint(LintArgs),
  /// Build HTML documentation from OpenAPI documents using Redocly
  BuildDocs(BuildDocsArgs),
  /// Bundle API descriptions into a single file using Redocly
  Bundle(BundleArgs),
  /// Generate Arazzo workflow description from an OpenAPI document using Redocly (requires manual editing to be functional)
  GenerateArazzo(GenerateArazzoArgs),
  /// Execute Arazzo workflow tests using Redocly
  Respect(RespectArgs),
  /// Join multiple OpenAPI 3.x documents into a single file
  Join(JoinArgs),
}

#[derive(Args, Debug)]
pub struct InitArgs {
  /// Overwrite existing file
  #[arg(short, long)]
  pub force: bool,
}

#[derive(Args, Debug)]
pub struct LintArgs {
  /// Document path (default: auto-detect)
  pub input: Option<String>,

  #[command(flatten)]
  pub kinds: DocKindArgs,

  /// Output format
  #[arg(long, value_enum, default_value_t = OutputFormat::Codeframe)]
  pub format: OutputFormat,

  /// Config file path (overrides auto/bundled)
  #[arg(long)]
  pub config: Option<String>,

  /// Raw arguments forwarded to the Redocly CLI (after `--`)
  #[arg(last = true)]
  pub passthrough: Vec<String>,
}

#[derive(Args, Debug)]
pub struct BuildDocsArgs {
  /// OpenAPI document path (default: openapi/openapi.yaml)
  pub input: Option<String>,

  /// Output HTML file path
  #[arg(long, default_value = "dist/docs/openapi.html")]
  pub output: String,

  /// Config file path (overrides auto/bundled)
  #[arg(long)]
  pub config: Option<String>,

  /// Raw arguments forwarded to the Redocly CLI (after `--`)
  #[arg(last = true)]
  pub passthrough: Vec<String>,
}

#[derive(Args, Debug)]
pub struct BundleArgs {
  /// Document path (default: openapi/openapi.yaml)
  pub input: Option<String>,

  /// Output file or directory path
  #[arg(long, default_value = "dist/bundle/openapi.yaml")]
  pub output: String,

  /// Output file extension (overrides extension in --output)
  #[arg(long, value_enum)]
  pub ext: Option<OutputExtension>,

  /// Config file path (overrides auto/bundled)
  #[arg(long)]
  pub config: Option<String>,

  /// Generate fully dereferenced bundle (no $ref)
  #[arg(long)]
  pub dereferenced: bool,

  /// Raw arguments forwarded to the Redocly CLI (after `--`)
  #[arg(last = true)]
  pub passthrough: Vec<String>,
}

#[derive(Args, Debug)]
pub struct GenerateArazzoArgs {
  /// OpenAPI document path (default: openapi/openapi.yaml)
  pub input: Option<String>,

  /// Output file path
  #[arg(long, default_value = "arazzo/auto-generated.arazzo.yaml")]
  pub output: String,

  /// Raw arguments forwarded to the Redocly CLI (after `--`)
  #[arg(last = true)]
  pub passthrough: Vec<String>,
}

#[derive(Args, Debug)]
pub struct RespectArgs {
  /// Arazzo document path (default: arazzo/arazzo.yaml)
  pub input: Option<String>,

  /// Run only specified workflows
  #[arg(long, num_args = 1.., conflicts_with = "skip")]
  pub workflow: Vec<String>,

  /// Skip specified workflows
  #[arg(long, num_args = 1..)]
  pub skip: Vec<String>,

  /// Enable verbose output
  #[arg(long)]
  pub verbose: bool,

  /// Workflow input parameters (key=value or JSON)
  #[arg(long = "input", num_args = 1..)]
  pub input_params: Vec<String>,

  /// Server overrides (format: name=url)
  #[arg(long, num_args = 1..)]
  pub server: Vec<String>,

  /// Save results to JSON file
  #[arg(long)]
  pub json_output: Option<String>,

  /// Save HTTP interactions to HAR file
  #[arg(long)]
  pub har_output: Option<String>,

  /// Raw arguments forwarded to the Redocly CLI (after `--`)
  #[arg(last = true)]
  pub passthrough: Vec<String>,
}

#[derive(Args, Debug)]
pub struct JoinArgs {
  /// API documents to join (at least 2 required)
  pub apis: Vec<String>,

  /// Output file path
  #[arg(long, default_value = "dist/join/openapi.yaml")]
  pub output: String,

  /// Prefix component names with info property to resolve conflicts (e.g., version, title)
  #[arg(long)]
  pub prefix_components_with_info_prop: Option<String>,

  /// Prefix tag names with info property (e.g., title, version)
  #[arg(long, conflicts_with_all = ["prefix_tags_with_filename", "without_x_tag_groups"])]
  pub prefix_tags_with_info_prop: Option<String>,

  /// Prefix tag names with filename to resolve conflicts
  #[arg(long, conflicts_with = "without_x_tag_groups")]
  pub prefix_tags_with_filename: bool,

  /// Skip automated x-tagGroups creation (avoids tag duplication)
  #[arg(long)]
  pub without_x_tag_groups: bool,

  /// Config file path (overrides auto/bundled)
  #[arg(long)]
  pub config: Option<String>,

  /// Raw arguments forwarded to the Redocly CLI (after `--`)
  #[arg(last = true)]
  pub passthrough: Vec<String>,
}

pub fn run(session: &Session, args: RedoclyArgs) -> Result<i32> {
  match args.cmd {
    Some(RedoclyCommand::Init(init)) => run_init(session, init),
    Some(RedoclyCommand::Lint(lint)) => run_lint(session, lint),
    Some(RedoclyCommand::BuildDocs(docs)) => run_build_docs(session, docs),
    Some(RedoclyCommand::Bundle(bundle)) => run_bundle(session, bundle),
    Some(RedoclyCommand::GenerateArazzo(gen)) => run_generate_arazzo(session, gen),
    Some(RedoclyCommand::Respect(respect)) => run_respect(session, respect),
    Some(RedoclyCommand::Join(join)) => run_join(session, join),
    None => raw_passthrough(session, args.passthrough),
  }
}

fn raw_passthrough(session: &Session, passthrough: Vec<String>) -> Result<i32> {
  if passthrough.is_empty() {
    util::print_tool_help("redocly")?;
    return Ok(0);
  }

  session.invoke(Tool::Redocly, passthrough)
}

fn run_init(session: &Session, args: InitArgs) -> Result<i32> {
  let target = session.cwd.join(defaults::REDOCLY_CONFIG_FILENAME);

  if target.exists() && !args.force {
    eprintln!(
      "❌ Error: {} already exists\n\nUse --force to overwrite the existing file.",
      defaults::REDOCLY_CONFIG_FILENAME
    );
    return Ok(1);
  }

  match std::fs::write(&target, defaults::REDOCLY_CONFIG) {
    Ok(()) => {
      println!("✅ Created {}", defaults::REDOCLY_CONFIG_FILENAME);
      Ok(0)
    }
    Err(err) => {
      eprintln!("❌ Error: failed to create {}\n\n{}", defaults::REDOCLY_CONFIG_FILENAME, err);
      Ok(1)
    }
  }
}

fn resolve_tool_config(cli_config: Option<&str>, session: &Session) -> Result<ResolvedConfig> {
  let bundled = defaults::redocly_config_path()?;
  Ok(resolve::resolve_config(cli_config, &CONFIG_PATTERN, &bundled, &session.cwd))
}

fn run_lint(session: &Session, args: LintArgs) -> Result<i32> {
  let resolved = resolve::resolve_documents(args.input.as_deref(), &args.kinds, &session.cwd);

  if resolved.inputs.is_empty() {
    eprintln!("{}", resolve::no_documents_message(&resolved));
    return Ok(1);
  }

  let config = resolve_tool_config(args.config.as_deref(), session)?;

  // Redocly writes the generated ignore file next to the config it used,
  // which for the bundled config would land in the staging directory where
  // users will never find it.
  if config.source == ConfigSource::Bundled
    && args.passthrough.iter().any(|arg| arg.contains("--generate-ignore-file"))
  {
    eprintln!(
      "❌ Error: Cannot use --generate-ignore-file with bundled config\n\n\
       The --generate-ignore-file option requires a local Redocly configuration file, but no local config was found.\n\n\
       To generate a starter config, run:\n\n    api-tools redocly init\n\nThen re-run this command."
    );
    return Ok(1);
  }

  run_documents(&resolved.inputs, |input| lint_one(session, input, &args, &config))
}

fn lint_one(session: &Session, input: &str, args: &LintArgs, config: &ResolvedConfig) -> Result<i32> {
  session.log("🔍 Redocly lint...");
  session.log(&format!("   Input: {}", input));
  session.log(&format!("   Format: {}", args.format));
  session.log(&format!("   Config: {}", config.display()));

  session.invoke(Tool::Redocly, build_lint_args(input, args, config))
}

fn build_lint_args(input: &str, args: &LintArgs, config: &ResolvedConfig) -> Vec<String> {
  let mut argv = vec![
    "lint".to_string(),
    input.to_string(),
    "--format".to_string(),
    args.format.to_string(),
  ];

  // only pass --config when resolution produced a concrete path (cli or bundled)
  if let Some(path) = &config.path {
    argv.push("--config".to_string());
    argv.push(path.clone());
  }

  argv.extend(args.passthrough.iter().cloned());
  argv
}

fn run_build_docs(session: &Session, args: BuildDocsArgs) -> Result<i32> {
  let Some(input) = resolve::resolve_single(args.input.as_deref(), "openapi/openapi.yaml", &session.cwd)
  else {
    eprintln!("{}", resolve::NO_INPUT_MESSAGE);
    return Ok(1);
  };

  let config = resolve_tool_config(args.config.as_deref(), session)?;

  session.log("📚 Redocly build-docs...");
  session.log(&format!("   Input: {}", input));
  session.log(&format!("   Output: {}", args.output));
  session.log(&format!("   Config: {}", config.display()));

  session.invoke(Tool::Redocly, build_build_docs_args(&input, &args, &config))
}

fn build_build_docs_args(input: &str, args: &BuildDocsArgs, config: &ResolvedConfig) -> Vec<String> {
  let mut argv = vec![
    "build-docs".to_string(),
    input.to_string(),
    "--output".to_string(),
    args.output.clone(),
  ];

  if let Some(path) = &config.path {
    argv.push("--config".to_string());
    argv.push(path.clone());
  }

  argv.extend(args.passthrough.iter().cloned());
  argv
}

fn run_bundle(session: &Session, args: BundleArgs) -> Result<i32> {
  let Some(input) = resolve::resolve_single(args.input.as_deref(), "openapi/openapi.yaml", &session.cwd)
  else {
    eprintln!("{}", resolve::NO_INPUT_MESSAGE);
    return Ok(1);
  };

  let config = resolve_tool_config(args.config.as_deref(), session)?;
  let output = bundle_output_path(&args);

  session.log("📦 Redocly bundle...");
  session.log(&format!("   Input: {}", input));
  // the fold is reported on the Extension line; Output shows what the user asked for
  session.log(&format!("   Output: {}", args.output));
  if let Some(ext) = args.ext {
    session.log(&format!("   Extension: {}", ext.as_str()));
  }
  session.log(&format!("   Config: {}", config.display()));

  session.invoke(Tool::Redocly, build_bundle_args(&input, &output, &args, &config))
}

/// An --ext override is folded into the output path here; the token itself is
/// never forwarded to the delegated tool.
fn bundle_output_path(args: &BundleArgs) -> String {
  match args.ext {
    Some(ext) => util::replace_extension(&args.output, ext.as_str()),
    None => args.output.clone(),
  }
}

fn build_bundle_args(input: &str, output: &str, args: &BundleArgs, config: &ResolvedConfig) -> Vec<String> {
  let mut argv = vec![
    "bundle".to_string(),
    input.to_string(),
    "--output".to_string(),
    output.to_string(),
  ];

  if let Some(path) = &config.path {
    argv.push("--config".to_string());
    argv.push(path.clone());
  }

  if args.dereferenced {
    argv.push("--dereferenced".to_string());
  }

  argv.extend(args.passthrough.iter().cloned());
  argv
}

fn run_generate_arazzo(session: &Session, args: GenerateArazzoArgs) -> Result<i32> {
  let Some(input) = resolve::resolve_single(args.input.as_deref(), "openapi/openapi.yaml", &session.cwd)
  else {
    eprintln!("{}", resolve::NO_INPUT_MESSAGE);
    return Ok(1);
  };

  util::ensure_parent_dir(&session.cwd, &args.output)?;

  session.log("🔄 Redocly generate-arazzo...");
  session.log(&format!("   Input: {}", input));
  session.log(&format!("   Output: {}", args.output));

  let mut argv = vec![
    "generate-arazzo".to_string(),
    input,
    "--output-file".to_string(),
    args.output.clone(),
  ];
  argv.extend(args.passthrough.iter().cloned());

  session.invoke(Tool::Redocly, argv)
}

fn run_respect(session: &Session, args: RespectArgs) -> Result<i32> {
  let Some(input) = resolve::resolve_single(args.input.as_deref(), "arazzo/arazzo.yaml", &session.cwd)
  else {
    eprintln!("{}", resolve::NO_INPUT_MESSAGE);
    return Ok(1);
  };

  session.log("🧪 Redocly respect...");
  session.log(&format!("   Input: {}", input));
  if !args.workflow.is_empty() {
    session.log(&format!("   Workflows: {}", args.workflow.join(", ")));
  }
  if !args.skip.is_empty() {
    session.log(&format!("   Skipped Workflows: {}", args.skip.join(", ")));
  }
  if !args.server.is_empty() {
    session.log(&format!("   Server Overrides: {}", args.server.join(", ")));
  }
  if let Some(json_output) = &args.json_output {
    session.log(&format!("   JSON Output: {}", json_output));
  }
  if let Some(har_output) = &args.har_output {
    session.log(&format!("   HAR Output: {}", har_output));
  }

  session.invoke(Tool::Redocly, build_respect_args(&input, &args))
}

fn build_respect_args(input: &str, args: &RespectArgs) -> Vec<String> {
  let mut argv = vec!["respect".to_string(), input.to_string()];

  if !args.workflow.is_empty() {
    argv.push("--workflow".to_string());
    argv.extend(args.workflow.iter().cloned());
  }

  if !args.skip.is_empty() {
    argv.push("--skip".to_string());
    argv.extend(args.skip.iter().cloned());
  }

  if args.verbose {
    argv.push("--verbose".to_string());
  }

  // each workflow input parameter travels under its own --input flag
  for param in &args.input_params {
    argv.push("--input".to_string());
    argv.push(param.clone());
  }

  if !args.server.is_empty() {
    argv.push("--server".to_string());
    argv.extend(args.server.iter().cloned());
  }

  if let Some(json_output) = &args.json_output {
    argv.push("--json-output".to_string());
    argv.push(json_output.clone());
  }

  if let Some(har_output) = &args.har_output {
    argv.push("--har-output".to_string());
    argv.push(har_output.clone());
  }

  argv.extend(args.passthrough.iter().cloned());
  argv
}

fn run_join(session: &Session, args: JoinArgs) -> Result<i32> {
  if args.apis.len() < 2 {
    eprintln!(
      "❌ Error: at least 2 API documents are required to join\n\n\
       Provide two or more OpenAPI documents to combine."
    );
    return Ok(1);
  }

  let config = resolve_tool_config(args.config.as_deref(), session)?;

  session.log("🔗 Redocly join...");
  session.log(&format!("   Inputs: {}", args.apis.join(", ")));
  session.log(&format!("   Output: {}", args.output));
  if let Some(prop) = &args.prefix_components_with_info_prop {
    session.log(&format!("   Prefix Components With Info Prop: {}", prop));
  }
  if let Some(prop) = &args.prefix_tags_with_info_prop {
    session.log(&format!("   Prefix Tags With Info Prop: {}", prop));
  }
  if args.prefix_tags_with_filename {
    session.log("   Prefix Tags With Filename: true");
  }
  if args.without_x_tag_groups {
    session.log("   Without x-tagGroups: true");
  }
  session.log(&format!("   Config: {}", config.display()));

  session.invoke(Tool::Redocly, build_join_args(&args, &config))
}

fn build_join_args(args: &JoinArgs, config: &ResolvedConfig) -> Vec<String> {
  let mut argv = vec!["join".to_string()];
  argv.extend(args.apis.iter().cloned());
  argv.push("--output".to_string());
  argv.push(args.output.clone());

  if let Some(path) = &config.path {
    argv.push("--config".to_string());
    argv.push(path.clone());
  }

  if let Some(prop) = &args.prefix_components_with_info_prop {
    argv.push("--prefix-components-with-info-prop".to_string());
    argv.push(prop.clone());
  }

  if let Some(prop) = &args.prefix_tags_with_info_prop {
    argv.push("--prefix-tags-with-info-prop".to_string());
    argv.push(prop.clone());
  }

  if args.prefix_tags_with_filename {
    argv.push("--prefix-tags-with-filename".to_string());
  }

  if args.without_x_tag_groups {
    argv.push("--without-x-tag-groups".to_string());
  }

  argv.extend(args.passthrough.iter().cloned());
  argv
}
