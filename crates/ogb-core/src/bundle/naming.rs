use heck::ToKebabCase;
use serde::Deserialize;

use super::{README_PATH, SUMMARY_PATH};
use crate::error::BundleError;

/// How page file names are derived from tag names.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileNaming {
    /// The tag name as written, with unsafe characters escaped.
    #[default]
    Verbatim,
    /// The tag name in kebab-case.
    Kebab,
}

/// Page path for a tag: its name plus `.md`, safe to use as an archive entry.
///
/// Path separators, characters reserved on Windows and control characters
/// become `_`.
pub fn page_path(tag_name: &str, naming: FileNaming) -> Result<String, BundleError> {
    let stem = match naming {
        FileNaming::Verbatim => escape(tag_name),
        FileNaming::Kebab => escape(&tag_name.to_kebab_case()),
    };

    if stem.trim().is_empty() {
        return Err(unsafe_name(tag_name, "name is empty"));
    }
    if stem == "." || stem == ".." {
        return Err(unsafe_name(tag_name, "name is a relative path component"));
    }

    let path = format!("{stem}.md");
    if path == SUMMARY_PATH || path == README_PATH {
        return Err(unsafe_name(tag_name, "name collides with a reserved bundle file"));
    }
    Ok(path)
}

fn escape(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect()
}

fn unsafe_name(name: &str, reason: &'static str) -> BundleError {
    BundleError::UnsafeTagName {
        name: name.to_string(),
        reason,
    }
}
