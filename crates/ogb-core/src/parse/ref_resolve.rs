use std::collections::HashMap;
use std::fs;
use std::path::{Component, Path, PathBuf};

use log::debug;
use serde_json::Value;

use super::parse_document;
use crate::error::ResolveError;

/// Source of documents referenced by external `$ref` locations.
pub trait RefLoader {
    /// Return the raw text of the document at `location`.
    fn load(&self, location: &str) -> Result<String, ResolveError>;
}

/// Loads external documents from the filesystem, relative to `base`.
#[derive(Debug, Clone)]
pub struct FsLoader {
    base: PathBuf,
}

impl FsLoader {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    /// Loader rooted at the directory containing `spec_path`.
    pub fn for_spec(spec_path: &Path) -> Self {
        let base = spec_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        Self::new(base)
    }
}

impl RefLoader for FsLoader {
    fn load(&self, location: &str) -> Result<String, ResolveError> {
        if location.contains("://") {
            return Err(ResolveError::UnsupportedLocation(location.to_string()));
        }
        let path = self.base.join(location);
        fs::read_to_string(&path).map_err(|source| ResolveError::Load {
            location: location.to_string(),
            source,
        })
    }
}

/// Rejects every external reference.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoExternalRefs;

impl RefLoader for NoExternalRefs {
    fn load(&self, location: &str) -> Result<String, ResolveError> {
        Err(ResolveError::ExternalRefsDisabled(location.to_string()))
    }
}

/// Maximum nesting of objects and arrays, counting followed references.
const MAX_DEPTH: usize = 256;

/// Resolved targets larger than this are inlined once, then kept as `$ref`.
const MAX_INLINE_NODES: usize = 50_000;

/// Replaces every `$ref` object in a document tree with its target.
///
/// References that are already being expanded (recursive schemas) are left
/// in place, so resolution always terminates. Each target is resolved once;
/// later references reuse the cached result.
pub struct RefResolver<'a> {
    loader: &'a dyn RefLoader,
    /// Parsed documents keyed by location; the root document is `""`.
    documents: HashMap<String, Value>,
    /// Resolved targets keyed like `active`; `None` when too large to repeat.
    resolved: HashMap<String, Option<Value>>,
    active: Vec<String>,
    depth: usize,
}

impl<'a> RefResolver<'a> {
    pub fn new(root: Value, loader: &'a dyn RefLoader) -> Self {
        let mut documents = HashMap::new();
        documents.insert(String::new(), root);
        Self {
            loader,
            documents,
            resolved: HashMap::new(),
            active: Vec::new(),
            depth: 0,
        }
    }

    /// Resolve the root document, returning a copy with references inlined.
    pub fn resolve(mut self) -> Result<Value, ResolveError> {
        let root = self.documents.get("").cloned().unwrap_or(Value::Null);
        let resolved = self.resolve_value(root, "")?;
        debug!(
            "resolved {} reference target(s) across {} document(s)",
            self.resolved.len(),
            self.documents.len()
        );
        Ok(resolved)
    }

    fn resolve_value(&mut self, value: Value, doc: &str) -> Result<Value, ResolveError> {
        if !value.is_object() && !value.is_array() {
            return Ok(value);
        }
        if self.depth >= MAX_DEPTH {
            let at = self.active.last().map_or(doc, String::as_str);
            return Err(ResolveError::TooDeep(at.to_string()));
        }
        self.depth += 1;
        let resolved = self.resolve_nested(value, doc);
        self.depth -= 1;
        resolved
    }

    fn resolve_nested(&mut self, value: Value, doc: &str) -> Result<Value, ResolveError> {
        match value {
            Value::Object(map) => {
                let reference = match map.get("$ref") {
                    Some(Value::String(reference)) => Some(reference.clone()),
                    _ => None,
                };
                if let Some(reference) = reference {
                    return self.resolve_ref(&reference, doc, Value::Object(map));
                }
                let mut resolved = serde_json::Map::with_capacity(map.len());
                for (key, child) in map {
                    resolved.insert(key, self.resolve_value(child, doc)?);
                }
                Ok(Value::Object(resolved))
            }
            Value::Array(items) => items
                .into_iter()
                .map(|item| self.resolve_value(item, doc))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),
            other => Ok(other),
        }
    }

    fn resolve_ref(
        &mut self,
        reference: &str,
        doc: &str,
        original: Value,
    ) -> Result<Value, ResolveError> {
        let (location, pointer) = split_ref(reference)?;
        let target_doc = match location {
            Some(loc) => join_location(doc, loc),
            None => doc.to_string(),
        };

        let key = format!("{target_doc}#{pointer}");
        match self.resolved.get(&key) {
            Some(Some(cached)) => return Ok(cached.clone()),
            Some(None) => return Ok(original),
            None => {}
        }
        if self.active.contains(&key) {
            return Ok(original);
        }

        let target = self
            .document(&target_doc)?
            .pointer(pointer)
            .cloned()
            .ok_or_else(|| ResolveError::RefTargetNotFound(reference.to_string()))?;

        self.active.push(key.clone());
        let resolved = self.resolve_value(target, &target_doc);
        self.active.pop();
        let resolved = resolved?;

        let reusable = (!exceeds(&resolved, MAX_INLINE_NODES)).then(|| resolved.clone());
        if reusable.is_none() {
            debug!("{key} is too large to inline repeatedly; later references stay as $ref");
        }
        self.resolved.insert(key, reusable);
        Ok(resolved)
    }

    fn document(&mut self, location: &str) -> Result<&Value, ResolveError> {
        if !self.documents.contains_key(location) {
            debug!("loading external document {location}");
            let text = self.loader.load(location)?;
            let value = parse_document(&text).map_err(|e| match e {
                crate::error::ParseError::Syntax(source) => ResolveError::ExternalSyntax {
                    location: location.to_string(),
                    source,
                },
            })?;
            self.documents.insert(location.to_string(), value);
        }
        self.documents
            .get(location)
            .ok_or_else(|| ResolveError::RefTargetNotFound(location.to_string()))
    }
}

/// Split `other.yaml#/a/b` into its location and JSON pointer.
fn split_ref(reference: &str) -> Result<(Option<&str>, &str), ResolveError> {
    let (location, pointer) = match reference.split_once('#') {
        Some((location, pointer)) => (location, pointer),
        None => (reference, ""),
    };
    if !pointer.is_empty() && !pointer.starts_with('/') {
        return Err(ResolveError::InvalidRefFormat(reference.to_string()));
    }
    if location.is_empty() {
        if pointer.is_empty() {
            return Err(ResolveError::InvalidRefFormat(reference.to_string()));
        }
        return Ok((None, pointer));
    }
    Ok((Some(location), pointer))
}

/// Resolve `location` relative to the document that referenced it.
fn join_location(current: &str, location: &str) -> String {
    if current.is_empty() || location.contains("://") || Path::new(location).is_absolute() {
        return location.to_string();
    }
    let joined = Path::new(current)
        .parent()
        .map(|dir| dir.join(location))
        .unwrap_or_else(|| PathBuf::from(location));

    let mut normalized = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir if normalized.file_name().is_some() => {
                normalized.pop();
            }
            other => normalized.push(other),
        }
    }
    normalized.to_string_lossy().replace('\\', "/")
}

/// Whether `value` holds more than `limit` nodes.
fn exceeds(value: &Value, limit: usize) -> bool {
    let mut count = 0;
    let mut pending = vec![value];
    while let Some(node) = pending.pop() {
        count += 1;
        if count > limit {
            return true;
        }
        match node {
            Value::Object(map) => pending.extend(map.values()),
            Value::Array(items) => pending.extend(items),
            _ => {}
        }
    }
    false
}
