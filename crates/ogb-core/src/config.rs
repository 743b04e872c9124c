use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::bundle::naming::FileNaming;
use crate::collate::UnknownTagPolicy;

/// Top-level project configuration loaded from `.ogb.yaml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OgbConfig {
    pub input: String,
    pub output: String,
    pub tags: TagsConfig,
    pub pages: PagesConfig,
    pub refs: RefsConfig,
}

impl Default for OgbConfig {
    fn default() -> Self {
        Self {
            input: "openapi.yaml".to_string(),
            output: "docs.tar.gz".to_string(),
            tags: TagsConfig::default(),
            pages: PagesConfig::default(),
            refs: RefsConfig::default(),
        }
    }
}

/// Tag resolution options.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TagsConfig {
    pub unknown: UnknownTagPolicy,
}

/// Page file options.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PagesConfig {
    pub file_naming: FileNaming,
}

/// `$ref` resolution options.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RefsConfig {
    /// Resolve references into other files next to the input spec.
    pub external: bool,
}

impl Default for RefsConfig {
    fn default() -> Self {
        Self { external: true }
    }
}

/// Default config file name.
pub const CONFIG_FILE_NAME: &str = ".ogb.yaml";

/// Load config from a YAML file. Returns `None` if the file doesn't exist.
pub fn load_config(path: &Path) -> Result<Option<OgbConfig>, String> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)
        .map_err(|e| format!("failed to read config {}: {}", path.display(), e))?;
    let config: OgbConfig = serde_yaml_ng::from_str(&content)
        .map_err(|e| format!("failed to parse config {}: {}", path.display(), e))?;
    Ok(Some(config))
}

/// Generate the default config file content.
pub fn default_config_content() -> &'static str {
    r#"# ogb configuration
input: openapi.yaml
output: docs.tar.gz

tags:
  unknown: reject          # reject | placeholder

pages:
  file_naming: verbatim    # verbatim | kebab

refs:
  external: true           # resolve $refs into files next to the input
"#
}
