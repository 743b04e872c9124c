use indexmap::IndexMap;
use serde::{Deserialize, Deserializer};

use super::operation::{Endpoint, PathItem};

/// Info object describing the API.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Info {
    pub title: String,

    #[serde(deserialize_with = "string_or_number")]
    pub version: String,

    pub description: Option<String>,
}

/// Accept `version: 1.0`, which YAML reads as a number.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected a version string, found {other}"
        ))),
    }
}

/// External documentation link attached to a tag.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ExternalDocs {
    pub url: String,

    pub description: Option<String>,
}

/// Tag definition.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Tag {
    pub name: String,

    pub description: Option<String>,

    #[serde(rename = "externalDocs")]
    pub external_docs: Option<ExternalDocs>,
}

impl Tag {
    /// A tag carrying only a name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            external_docs: None,
        }
    }
}

/// A validated OpenAPI 3.x document with every `$ref` resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedDocument {
    pub openapi: String,
    pub info: Info,
    pub paths: IndexMap<String, PathItem>,
    pub tags: Vec<Tag>,
}

impl ResolvedDocument {
    /// Flatten `paths` into endpoints, in path then method declaration order.
    pub fn endpoints(&self) -> impl Iterator<Item = Endpoint<'_>> {
        self.paths.iter().flat_map(|(path, item)| {
            item.operations.iter().map(move |(method, operation)| Endpoint {
                path: path.as_str(),
                method: *method,
                operation,
            })
        })
    }

    /// First declared tag with the given name.
    pub fn find_tag(&self, name: &str) -> Option<&Tag> {
        self.tags.iter().find(|t| t.name == name)
    }
}
