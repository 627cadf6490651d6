use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;

#[allow(dead_code)]
pub fn bin() -> Command {
  Command::cargo_bin("api-tools").unwrap()
}

/// Writes an executable stub standing in for a delegated tool. The stub
/// appends its argv to $RECORD_FILE and then runs `tail` (use "exit 0" for a
/// tool that always succeeds).
#[allow(dead_code)]
pub fn fake_tool(dir: &Path, name: &str, tail: &str) -> PathBuf {
  use std::os::unix::fs::PermissionsExt;

  let path = dir.join(name);
  let script = format!("#!/bin/sh\nprintf '%s\\n' \"$*\" >> \"$RECORD_FILE\"\n{}\n", tail);

  fs::write(&path, script).unwrap();
  fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();

  path
}

#[allow(dead_code)]
pub fn record_lines(path: &Path) -> Vec<String> {
  match fs::read_to_string(path) {
    Ok(text) => text.lines().map(|line| line.to_string()).collect(),
    Err(_) => Vec::new(),
  }
}

#[allow(dead_code)]
pub fn write_doc(dir: &Path, rel: &str) {
  let full = dir.join(rel);
  fs::create_dir_all(full.parent().unwrap()).unwrap();
  fs::write(full, "openapi: 3.0.0\n").unwrap();
}
