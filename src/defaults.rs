//! Bundled fallback configuration shipped with the wrapper. The files live
//! under `defaults/` in the repo, are embedded at compile time, and are
//! staged to a scratch directory whenever a concrete file path has to be
//! handed to a delegated tool.

use std::path::PathBuf;

use anyhow::{Context, Result};

pub const SPECTRAL_RULESET: &str = include_str!("../defaults/spectral.yaml");
pub const REDOCLY_CONFIG: &str = include_str!("../defaults/redocly.yaml");
pub const ASYNCAPI_ANALYTICS: &str = include_str!("../defaults/asyncapi-analytics");

pub const REDOCLY_CONFIG_FILENAME: &str = "redocly.yaml";

fn staging_dir() -> Result<PathBuf> {
  let dir = std::env::temp_dir().join("api-tools-defaults");
  std::fs::create_dir_all(&dir).with_context(|| format!("creating {}", dir.display()))?;
  Ok(dir)
}

fn stage(name: &str, contents: &str) -> Result<PathBuf> {
  let path = staging_dir()?.join(name);
  std::fs::write(&path, contents).with_context(|| format!("writing {}", path.display()))?;
  Ok(path)
}

/// Path to the bundled Spectral ruleset, staged on demand.
pub fn spectral_ruleset_path() -> Result<PathBuf> {
  stage("spectral.yaml", SPECTRAL_RULESET)
}

/// Path to the bundled Redocly config, staged on demand.
pub fn redocly_config_path() -> Result<PathBuf> {
  stage(REDOCLY_CONFIG_FILENAME, REDOCLY_CONFIG)
}

/// Analytics config handed to the AsyncAPI CLI to keep telemetry off.
pub fn asyncapi_analytics_path() -> Result<PathBuf> {
  stage(".asyncapi-analytics", ASYNCAPI_ANALYTICS)
}

/// Empty directory satisfying node-config's NODE_CONFIG_DIR expectation,
/// which quiets its missing-configuration warnings.
pub fn node_config_dir() -> Result<PathBuf> {
  let dir = staging_dir()?.join("node-config");
  std::fs::create_dir_all(&dir).with_context(|| format!("creating {}", dir.display()))?;
  Ok(dir)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn staged_ruleset_matches_embedded_content() {
    let path = spectral_ruleset_path().unwrap();
    let on_disk = std::fs::read_to_string(&path).unwrap();
    assert_eq!(on_disk, SPECTRAL_RULESET);
  }

  #[test]
  fn node_config_dir_exists_after_staging() {
    let dir = node_config_dir().unwrap();
    assert!(dir.is_dir());
  }
}
