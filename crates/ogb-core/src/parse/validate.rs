use std::collections::HashSet;

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;

use super::operation::{HttpMethod, Operation, PathItem};
use super::spec::{Info, ResolvedDocument, Tag};
use crate::error::SchemaError;

/// Top-level shape of a document before operations are typed.
#[derive(Debug, Deserialize)]
struct RawDocument {
    openapi: String,

    info: Info,

    #[serde(default)]
    paths: IndexMap<String, Value>,

    #[serde(default)]
    tags: Vec<Tag>,
}

/// Check a resolved tree against the parts of the OpenAPI schema this tool
/// depends on, producing the typed document.
pub fn validate(tree: Value) -> Result<ResolvedDocument, SchemaError> {
    let raw: RawDocument = serde_json::from_value(tree)?;
    validate_version(&raw.openapi)?;
    validate_tags(&raw.tags)?;

    let mut paths = IndexMap::with_capacity(raw.paths.len());
    for (path, item) in raw.paths {
        if path.starts_with("x-") {
            continue;
        }
        if !path.starts_with('/') {
            return Err(SchemaError::InvalidPath(path));
        }
        let item: IndexMap<String, Value> = serde_json::from_value(item)?;
        let item = build_path_item(&path, item)?;
        paths.insert(path, item);
    }

    Ok(ResolvedDocument {
        openapi: raw.openapi,
        info: raw.info,
        paths,
        tags: raw.tags,
    })
}

fn validate_version(version: &str) -> Result<(), SchemaError> {
    if !version.starts_with("3.") {
        return Err(SchemaError::UnsupportedVersion(version.to_string()));
    }
    Ok(())
}

fn validate_tags(tags: &[Tag]) -> Result<(), SchemaError> {
    let mut seen = HashSet::new();
    for tag in tags {
        if !seen.insert(tag.name.as_str()) {
            return Err(SchemaError::DuplicateTag(tag.name.clone()));
        }
    }
    Ok(())
}

/// Keep the method keys of a path item; `parameters`, `servers` and the rest
/// are not used for grouping.
fn build_path_item(path: &str, raw: IndexMap<String, Value>) -> Result<PathItem, SchemaError> {
    let mut operations = IndexMap::new();
    for (key, value) in raw {
        let Some(method) = HttpMethod::from_key(&key) else {
            continue;
        };
        let operation: Operation =
            serde_json::from_value(value).map_err(|source| SchemaError::Operation {
                method: key.clone(),
                path: path.to_string(),
                source,
            })?;
        operations.insert(method, operation);
    }
    Ok(PathItem { operations })
}
