pub mod operation;
pub mod ref_resolve;
pub mod spec;
pub mod validate;

use log::debug;
use serde_json::Value;

use crate::error::{ParseError, PipelineError};
use ref_resolve::{RefLoader, RefResolver};
use spec::ResolvedDocument;

/// Parse YAML or JSON text into a generic document tree.
///
/// JSON is valid YAML, so a single parser handles both syntaxes.
pub fn parse_document(input: &str) -> Result<Value, ParseError> {
    let value: Value = serde_yaml_ng::from_str(input)?;
    Ok(value)
}

/// Parse, resolve every `$ref` and validate an OpenAPI document.
pub fn load(input: &str, loader: &dyn RefLoader) -> Result<ResolvedDocument, PipelineError> {
    let tree = parse_document(input)?;
    let resolved = RefResolver::new(tree, loader).resolve()?;
    let doc = validate::validate(resolved)?;
    debug!(
        "loaded '{}' with {} path(s) and {} declared tag(s)",
        doc.info.title,
        doc.paths.len(),
        doc.tags.len()
    );
    Ok(doc)
}
