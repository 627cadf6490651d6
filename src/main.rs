use clap::Parser;
use std::process::ExitCode;

mod asyncapi;
mod cli;
mod defaults;
mod invoke;
mod redocly;
mod resolve;
mod session;
mod spectral;
mod util;

use crate::cli::Cli;

fn main() -> ExitCode {
  let cli = Cli::parse();

  match cli::run(cli) {
    Ok(code) => ExitCode::from(code.clamp(0, 255) as u8),
    Err(err) => {
      eprintln!("❌ Error: {:#}", err);
      ExitCode::FAILURE
    }
  }
}
