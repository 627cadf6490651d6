use std::path::Path;

use anyhow::{Context, Result};
use clap::CommandFactory;

/// Creates the parent directory of `output` (joined under `cwd` when
/// relative) so the delegated tool can write its artifact there.
pub fn ensure_parent_dir(cwd: &Path, output: &str) -> Result<()> {
  let full = cwd.join(output);

  if let Some(parent) = full.parent() {
    std::fs::create_dir_all(parent)
      .with_context(|| format!("creating directory {}", parent.display()))?;
  }

  Ok(())
}

/// Replaces the extension of `output`, keeping directory and file stem:
/// "dist/out.yaml" + "json" -> "dist/out.json".
pub fn replace_extension(output: &str, ext: &str) -> String {
  Path::new(output).with_extension(ext).to_string_lossy().to_string()
}

/// Render a section-1 man page for a clap `CommandFactory` implementor.
/// Returns the troff content as a UTF-8 string.
pub fn render_man_page<T: CommandFactory>() -> Result<String> {
  let cmd = T::command();
  let man = clap_mangen::Man::new(cmd);
  let mut buf: Vec<u8> = Vec::new();

  man.render(&mut buf)?;

  Ok(String::from_utf8_lossy(&buf).to_string())
}

pub fn print_root_help() -> Result<()> {
  crate::cli::Cli::command().print_long_help()?;
  Ok(())
}

/// Prints the long help for one of the top-level tool subcommands.
pub fn print_tool_help(name: &str) -> Result<()> {
  let mut root = crate::cli::Cli::command();
  let sub = root
    .find_subcommand_mut(name)
    .with_context(|| format!("unknown subcommand {}", name))?;
  sub.print_long_help()?;
  Ok(())
}
