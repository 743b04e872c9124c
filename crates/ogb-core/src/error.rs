use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("failed to parse YAML/JSON: {0}")]
    Syntax(#[from] serde_yaml_ng::Error),
}

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("invalid reference format: {0}")]
    InvalidRefFormat(String),

    #[error("reference target not found: {0}")]
    RefTargetNotFound(String),

    #[error("external reference not allowed: {0}")]
    ExternalRefsDisabled(String),

    #[error("unsupported reference location: {0}")]
    UnsupportedLocation(String),

    #[error("references nest too deeply at {0}")]
    TooDeep(String),

    #[error("failed to load {location}: {source}")]
    Load {
        location: String,
        source: std::io::Error,
    },

    #[error("failed to parse {location}: {source}")]
    ExternalSyntax {
        location: String,
        source: serde_yaml_ng::Error,
    },
}

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("document does not match the OpenAPI schema: {0}")]
    Structure(#[from] serde_json::Error),

    #[error("invalid operation {method} {path}: {source}")]
    Operation {
        method: String,
        path: String,
        source: serde_json::Error,
    },

    #[error("unsupported OpenAPI version: {0}")]
    UnsupportedVersion(String),

    #[error("path must start with '/': {0}")]
    InvalidPath(String),

    #[error("duplicate tag name: {0}")]
    DuplicateTag(String),

    #[error("reference resolution failed: {0}")]
    Resolve(#[from] ResolveError),
}

#[derive(Debug, Error)]
pub enum CollateError {
    #[error("operation {method} {path} references undeclared tag '{tag}'")]
    UnknownTagReference {
        tag: String,
        method: String,
        path: String,
    },
}

#[derive(Debug, Error)]
pub enum BundleError {
    #[error("tag name {name:?} cannot be used as a page name: {reason}")]
    UnsafeTagName { name: String, reason: &'static str },

    #[error("failed to render page: {0}")]
    Render(#[from] minijinja::Error),

    #[error("failed to write archive: {0}")]
    Archive(#[from] std::io::Error),
}

/// Error taxonomy surfaced to callers of the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    SyntaxError,
    SchemaInvalid,
    UnknownTagReference,
    UnsafeTagName,
    Render,
    Archive,
}

/// A failed pipeline run. There is no partial output.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Collate(#[from] CollateError),

    #[error(transparent)]
    Bundle(#[from] BundleError),
}

impl From<ResolveError> for PipelineError {
    fn from(err: ResolveError) -> Self {
        PipelineError::Schema(SchemaError::Resolve(err))
    }
}

impl PipelineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PipelineError::Parse(_) => ErrorKind::SyntaxError,
            PipelineError::Schema(_) => ErrorKind::SchemaInvalid,
            PipelineError::Collate(CollateError::UnknownTagReference { .. }) => {
                ErrorKind::UnknownTagReference
            }
            PipelineError::Bundle(BundleError::UnsafeTagName { .. }) => ErrorKind::UnsafeTagName,
            PipelineError::Bundle(BundleError::Render(_)) => ErrorKind::Render,
            PipelineError::Bundle(BundleError::Archive(_)) => ErrorKind::Archive,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_errors_are_schema_invalid() {
        let err: PipelineError = ResolveError::RefTargetNotFound("#/x".into()).into();
        assert_eq!(err.kind(), ErrorKind::SchemaInvalid);
        assert!(err.to_string().contains("#/x"));
    }

    #[test]
    fn test_too_deep_is_schema_invalid() {
        let err: PipelineError = ResolveError::TooDeep("#/components/schemas/S9".into()).into();
        assert_eq!(err.kind(), ErrorKind::SchemaInvalid);
        assert!(err.to_string().contains("S9"));
    }

    #[test]
    fn test_unknown_tag_kind() {
        let err: PipelineError = CollateError::UnknownTagReference {
            tag: "missing".into(),
            method: "get".into(),
            path: "/pets".into(),
        }
        .into();
        assert_eq!(err.kind(), ErrorKind::UnknownTagReference);
        assert_eq!(
            err.to_string(),
            "operation get /pets references undeclared tag 'missing'"
        );
    }
}
