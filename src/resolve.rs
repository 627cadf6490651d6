use std::path::Path;

use clap::Args;
use regex::Regex;

/// The input document categories this wrapper recognizes. Table order is the
/// resolution order, a deliberate stable tie-break.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocKind {
  OpenApi,
  AsyncApi,
  Arazzo,
}

pub const DOC_KINDS: [DocKind; 3] = [DocKind::OpenApi, DocKind::AsyncApi, DocKind::Arazzo];

impl DocKind {
  pub fn default_path(self) -> &'static str {
    match self {
      DocKind::OpenApi => "openapi/openapi.yaml",
      DocKind::AsyncApi => "asyncapi/asyncapi.yaml",
      DocKind::Arazzo => "arazzo/arazzo.yaml",
    }
  }

  pub fn name(self) -> &'static str {
    match self {
      DocKind::OpenApi => "OpenAPI",
      DocKind::AsyncApi => "AsyncAPI",
      DocKind::Arazzo => "Arazzo",
    }
  }
}

/// Kind-restriction flags shared by the multi-document lint commands.
#[derive(Args, Debug, Clone, Default)]
pub struct DocKindArgs {
  /// Lint OpenAPI document at openapi/openapi.yaml
  #[arg(long)]
  pub openapi: bool,

  /// Lint AsyncAPI document at asyncapi/asyncapi.yaml
  #[arg(long)]
  pub asyncapi: bool,

  /// Lint Arazzo document at arazzo/arazzo.yaml
  #[arg(long)]
  pub arazzo: bool,
}

impl DocKindArgs {
  fn requested(&self, kind: DocKind) -> bool {
    match kind {
      DocKind::OpenApi => self.openapi,
      DocKind::AsyncApi => self.asyncapi,
      DocKind::Arazzo => self.arazzo,
    }
  }

  fn any(&self) -> bool {
    self.openapi || self.asyncapi || self.arazzo
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedDocuments {
  /// Documents to operate on, in table order.
  pub inputs: Vec<String>,
  /// Every candidate path that was probed; error reporting only.
  pub checked: Vec<String>,
  /// Human-readable names of the kinds in scope; error reporting only.
  pub requested: Vec<String>,
}

/// Determines which documents a multi-document command operates on.
///
/// An explicit input short-circuits discovery entirely. Otherwise the flagged
/// kinds (or all kinds when none are flagged) are probed at their conventional
/// paths under `cwd`. Probe failures (permissions and the like) count as
/// absent; an empty result is valid and surfaced by the caller.
pub fn resolve_documents(input: Option<&str>, flags: &DocKindArgs, cwd: &Path) -> ResolvedDocuments {
  if let Some(one) = input {
    return ResolvedDocuments {
      inputs: vec![one.to_string()],
      checked: vec![one.to_string()],
      requested: vec!["explicit".to_string()],
    };
  }

  let in_scope: Vec<DocKind> = if flags.any() {
    DOC_KINDS.iter().copied().filter(|kind| flags.requested(*kind)).collect()
  } else {
    DOC_KINDS.to_vec()
  };

  let checked = in_scope.iter().map(|kind| kind.default_path().to_string()).collect();
  let requested = in_scope.iter().map(|kind| kind.name().to_string()).collect();

  let inputs = in_scope
    .iter()
    .filter(|kind| cwd.join(kind.default_path()).exists())
    .map(|kind| kind.default_path().to_string())
    .collect();

  ResolvedDocuments { inputs, checked, requested }
}

/// Error text for an empty resolution, enumerating everything that was tried.
pub fn no_documents_message(resolved: &ResolvedDocuments) -> String {
  let checked: Vec<String> = resolved.checked.iter().map(|path| format!("  {}", path)).collect();

  let scope = match resolved.requested.first().map(String::as_str) {
    Some(first) if first != "explicit" => resolved.requested.join(", "),
    _ => "specification".to_string(),
  };

  format!(
    "❌ Error: no input documents found\n\n\
     No input was provided, and no default {} files were found in the current directory:\n\n\
     {}\n\n\
     Provide an input path or create one of the above files and try again.",
    scope,
    checked.join("\n")
  )
}

/// Resolves the one input for a single-document command: the explicit
/// argument, else the conventional default when it exists under `cwd`.
pub fn resolve_single(input: Option<&str>, default_input: &str, cwd: &Path) -> Option<String> {
  match input {
    Some(one) => Some(one.to_string()),
    None if cwd.join(default_input).exists() => Some(default_input.to_string()),
    None => None,
  }
}

pub const NO_INPUT_MESSAGE: &str =
  "❌ Error: no input document specified\n\nProvide an input path or run with --help for usage.";

/// Where a delegated tool's configuration comes from. Exactly one source per
/// resolution; `Local` never carries a path (the tool discovers the file
/// itself), `Cli` and `Bundled` always do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSource {
  Cli,
  Local,
  Bundled,
}

impl ConfigSource {
  pub fn label(self) -> &'static str {
    match self {
      ConfigSource::Cli => "cli",
      ConfigSource::Local => "local",
      ConfigSource::Bundled => "bundled",
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
  pub source: ConfigSource,
  pub path: Option<String>,
}

impl ResolvedConfig {
  /// Display form for wrapper log lines: the concrete path, or "auto" when
  /// the delegated tool's own discovery applies.
  pub fn display(&self) -> String {
    format!("{} ({})", self.path.as_deref().unwrap_or("auto"), self.source.label())
  }
}

/// Detects a config file by name in the top level of `cwd` only; no parent or
/// subdirectory search. Listing errors count as "no local config".
pub fn has_local_config(pattern: &Regex, cwd: &Path) -> bool {
  let entries = match std::fs::read_dir(cwd) {
    Ok(entries) => entries,
    Err(_) => return false,
  };

  entries.flatten().any(|entry| {
    let is_file = entry.file_type().map(|ty| ty.is_file()).unwrap_or(false);
    is_file && pattern.is_match(&entry.file_name().to_string_lossy())
  })
}

/// Picks the config the delegated tool should see, first match wins: the
/// explicit flag, then a local file (path withheld so the tool's own
/// discovery and relative-path semantics apply), then the bundled default.
pub fn resolve_config(
  cli_config: Option<&str>,
  local_pattern: &Regex,
  bundled_path: &Path,
  cwd: &Path,
) -> ResolvedConfig {
  if let Some(path) = cli_config {
    return ResolvedConfig { source: ConfigSource::Cli, path: Some(path.to_string()) };
  }

  if has_local_config(local_pattern, cwd) {
    return ResolvedConfig { source: ConfigSource::Local, path: None };
  }

  ResolvedConfig {
    source: ConfigSource::Bundled,
    path: Some(bundled_path.to_string_lossy().to_string()),
  }
}

#[cfg(test)]
mod tests {
  use std::path::PathBuf;

  use super::*;

  fn flags(openapi: bool, asyncapi: bool, arazzo: bool) -> DocKindArgs {
    DocKindArgs { openapi, asyncapi, arazzo }
  }

  fn tree_with(paths: &[&str]) -> tempfile::TempDir {
    let dir = tempfile::TempDir::new().unwrap();
    for path in paths {
      let full = dir.path().join(path);
      std::fs::create_dir_all(full.parent().unwrap()).unwrap();
      std::fs::write(full, "{}").unwrap();
    }
    dir
  }

  #[test]
  fn explicit_input_wins_regardless_of_flags() {
    let dir = tree_with(&["openapi/openapi.yaml"]);
    let resolved = resolve_documents(Some("my/spec.yaml"), &flags(true, true, true), dir.path());
    assert_eq!(resolved.inputs, vec!["my/spec.yaml"]);
    assert_eq!(resolved.checked, vec!["my/spec.yaml"]);
    assert_eq!(resolved.requested, vec!["explicit"]);
  }

  #[test]
  fn explicit_input_is_not_probed_for_existence() {
    let dir = tree_with(&[]);
    let resolved = resolve_documents(Some("missing.yaml"), &flags(false, false, false), dir.path());
    assert_eq!(resolved.inputs, vec!["missing.yaml"]);
  }

  #[test]
  fn no_flags_means_auto_detect_across_all_kinds() {
    let dir = tree_with(&["asyncapi/asyncapi.yaml"]);
    let resolved = resolve_documents(None, &flags(false, false, false), dir.path());
    assert_eq!(resolved.inputs, vec!["asyncapi/asyncapi.yaml"]);
    assert_eq!(
      resolved.checked,
      vec!["openapi/openapi.yaml", "asyncapi/asyncapi.yaml", "arazzo/arazzo.yaml"]
    );
    assert_eq!(resolved.requested, vec!["OpenAPI", "AsyncAPI", "Arazzo"]);
  }

  #[test]
  fn flags_restrict_the_probed_set() {
    let dir = tree_with(&["openapi/openapi.yaml", "arazzo/arazzo.yaml"]);
    let resolved = resolve_documents(None, &flags(false, false, true), dir.path());
    assert_eq!(resolved.inputs, vec!["arazzo/arazzo.yaml"]);
    assert_eq!(resolved.checked, vec!["arazzo/arazzo.yaml"]);
    assert_eq!(resolved.requested, vec!["Arazzo"]);
  }

  #[test]
  fn results_keep_table_order() {
    let dir = tree_with(&["arazzo/arazzo.yaml", "openapi/openapi.yaml", "asyncapi/asyncapi.yaml"]);
    let resolved = resolve_documents(None, &flags(true, true, true), dir.path());
    assert_eq!(
      resolved.inputs,
      vec!["openapi/openapi.yaml", "asyncapi/asyncapi.yaml", "arazzo/arazzo.yaml"]
    );
  }

  #[test]
  fn empty_resolution_is_valid() {
    let dir = tree_with(&[]);
    let resolved = resolve_documents(None, &flags(false, false, false), dir.path());
    assert!(resolved.inputs.is_empty());
    assert_eq!(resolved.checked.len(), 3);
  }

  #[test]
  fn no_documents_message_lists_checked_paths_and_scope() {
    let dir = tree_with(&[]);
    let resolved = resolve_documents(None, &flags(true, false, true), dir.path());
    let msg = no_documents_message(&resolved);
    assert!(msg.contains("no input documents found"));
    assert!(msg.contains("OpenAPI, Arazzo"));
    assert!(msg.contains("  openapi/openapi.yaml"));
    assert!(msg.contains("  arazzo/arazzo.yaml"));
    assert!(!msg.contains("asyncapi/asyncapi.yaml"));
  }

  #[test]
  fn resolve_single_prefers_explicit_input() {
    let dir = tree_with(&["openapi/openapi.yaml"]);
    let one = resolve_single(Some("other.yaml"), "openapi/openapi.yaml", dir.path());
    assert_eq!(one.as_deref(), Some("other.yaml"));
  }

  #[test]
  fn resolve_single_falls_back_to_existing_default() {
    let dir = tree_with(&["openapi/openapi.yaml"]);
    let one = resolve_single(None, "openapi/openapi.yaml", dir.path());
    assert_eq!(one.as_deref(), Some("openapi/openapi.yaml"));

    let none = resolve_single(None, "arazzo/arazzo.yaml", dir.path());
    assert_eq!(none, None);
  }

  #[test]
  fn config_precedence_cli_then_local_then_bundled() {
    let pattern = Regex::new(r"^\.?spectral\.(ya?ml|json|m?js)$").unwrap();
    let bundled = PathBuf::from("/defaults/cfg.yaml");

    let dir = tree_with(&[".spectral.yaml"]);
    let cli = resolve_config(Some("mine.yaml"), &pattern, &bundled, dir.path());
    assert_eq!(cli.source, ConfigSource::Cli);
    assert_eq!(cli.path.as_deref(), Some("mine.yaml"));

    let local = resolve_config(None, &pattern, &bundled, dir.path());
    assert_eq!(local.source, ConfigSource::Local);
    assert_eq!(local.path, None);

    let empty = tree_with(&[]);
    let bundled_res = resolve_config(None, &pattern, &bundled, empty.path());
    assert_eq!(bundled_res.source, ConfigSource::Bundled);
    assert_eq!(bundled_res.path.as_deref(), Some("/defaults/cfg.yaml"));
  }

  #[test]
  fn local_detection_matches_names_not_paths() {
    let pattern = Regex::new(r"^\.?redocly\.ya?ml$").unwrap();

    let dir = tree_with(&["redocly.yaml"]);
    assert!(has_local_config(&pattern, dir.path()));

    // a match below the top level does not count
    let nested = tree_with(&["sub/redocly.yaml"]);
    assert!(!has_local_config(&pattern, nested.path()));

    let near_miss = tree_with(&["not-redocly.yaml"]);
    assert!(!has_local_config(&pattern, near_miss.path()));
  }

  #[test]
  fn local_detection_ignores_matching_directories() {
    let pattern = Regex::new(r"^\.?redocly\.ya?ml$").unwrap();
    let dir = tempfile::TempDir::new().unwrap();
    std::fs::create_dir(dir.path().join("redocly.yaml")).unwrap();
    assert!(!has_local_config(&pattern, dir.path()));
  }

  #[test]
  fn unreadable_cwd_counts_as_no_local_config() {
    let pattern = Regex::new(r"^\.?redocly\.ya?ml$").unwrap();
    assert!(!has_local_config(&pattern, Path::new("/definitely/not/a/real/dir")));
  }

  #[test]
  fn config_display_shows_auto_for_local() {
    let local = ResolvedConfig { source: ConfigSource::Local, path: None };
    assert_eq!(local.display(), "auto (local)");

    let cli = ResolvedConfig { source: ConfigSource::Cli, path: Some("x.yaml".into()) };
    assert_eq!(cli.display(), "x.yaml (cli)");
  }
}
