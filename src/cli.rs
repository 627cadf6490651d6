use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::asyncapi::AsyncapiArgs;
use crate::redocly::RedoclyArgs;
use crate::session::Session;
use crate::spectral::SpectralArgs;
use crate::util;

#[derive(Parser, Debug)]
#[command(
    name = "api-tools",
    version,
    about = "Unified API tooling",
    long_about = None
)]
pub struct Cli {
  #[command(flatten)]
  pub globals: GlobalArgs,

  /// Emit a troff man page to stdout (internal; for packaging)
  #[arg(long, hide = true)]
  pub gen_man: bool,

  #[command(subcommand)]
  pub tool: Option<ToolCommand>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
  /// Disable wrapper logging (still shows underlying CLI output)
  #[arg(long, global = true)]
  pub quiet: bool,

  /// Disable wrapper logging and underlying CLI output
  #[arg(long, global = true)]
  pub silent: bool,

  /// Run as if started in this directory
  #[arg(long, global = true)]
  pub cwd: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum ToolCommand {
  /// Spectral-related commands
  Spectral(SpectralArgs),
  /// Redocly-related commands
  Redocly(RedoclyArgs),
  /// AsyncAPI-related commands
  Asyncapi(AsyncapiArgs),
}

pub fn run(cli: Cli) -> Result<i32> {
  if cli.gen_man {
    let page = util::render_man_page::<Cli>()?;
    print!("{}", page);
    return Ok(0);
  }

  let session = Session::from_globals(&cli.globals)?;

  match cli.tool {
    Some(ToolCommand::Spectral(args)) => crate::spectral::run(&session, args),
    Some(ToolCommand::Redocly(args)) => crate::redocly::run(&session, args),
    Some(ToolCommand::Asyncapi(args)) => crate::asyncapi::run(&session, args),
    None => {
      util::print_root_help()?;
      Ok(0)
    }
  }
}
