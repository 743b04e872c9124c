pub mod archive;
pub mod naming;

use indexmap::{IndexMap, IndexSet};
use log::{debug, warn};

use crate::GitBookFile;
use crate::error::BundleError;
use crate::parse::spec::ResolvedDocument;

/// Navigation index listing every page.
pub const SUMMARY_PATH: &str = "SUMMARY.md";
/// Root page carrying the API title.
pub const README_PATH: &str = "README.md";
/// Verbatim copy of the input spec, referenced by every page.
pub const SPEC_PATH: &str = ".gitbook/openapi.yaml";

/// The logical file tree of a documentation bundle, in archive order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bundle {
    files: IndexMap<String, String>,
}

impl Bundle {
    /// Insert a file. A later insert at the same path replaces the contents
    /// but keeps the original position.
    pub fn insert(&mut self, path: impl Into<String>, contents: impl Into<String>) {
        let path = path.into();
        if self.files.insert(path.clone(), contents.into()).is_some() {
            warn!("bundle file {path} written more than once; keeping the last version");
        }
    }

    pub fn get(&self, path: &str) -> Option<&str> {
        self.files.get(path).map(String::as_str)
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }

    pub fn files(&self) -> impl Iterator<Item = (&str, &str)> {
        self.files.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Serialize the bundle as a gzip-compressed tar archive.
    pub fn to_archive(&self) -> Result<Vec<u8>, BundleError> {
        archive::write_archive(self.files())
    }
}

/// Build the bundle for a set of rendered pages.
///
/// `raw_spec` is embedded byte-for-byte at [`SPEC_PATH`] whatever syntax it
/// was written in.
pub fn assemble(pages: &[GitBookFile], raw_spec: &str, doc: &ResolvedDocument) -> Bundle {
    let mut bundle = Bundle::default();
    bundle.insert(SUMMARY_PATH, summary(pages));
    bundle.insert(README_PATH, format!("# {}", doc.info.title));
    for page in pages {
        bundle.insert(page.path.clone(), page.contents.clone());
    }
    bundle.insert(SPEC_PATH, raw_spec);

    debug!("assembled bundle with {} page(s)", pages.len());
    bundle
}

/// One markdown link per distinct page path, in page order.
fn summary(pages: &[GitBookFile]) -> String {
    let paths: IndexSet<&str> = pages.iter().map(|page| page.path.as_str()).collect();
    paths
        .into_iter()
        .map(|path| format!("[{path}]({})\n", link_target(path)))
        .collect()
}

/// Markdown link destination for a page path. Paths with spaces or
/// parentheses are wrapped in `<>`; page paths never contain `<` or `>`.
fn link_target(path: &str) -> String {
    if path.contains(|c: char| c.is_whitespace() || c == '(' || c == ')') {
        format!("<{path}>")
    } else {
        path.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::spec::Info;

    fn doc(title: &str) -> ResolvedDocument {
        ResolvedDocument {
            openapi: "3.0.3".into(),
            info: Info {
                title: title.into(),
                version: "1.0".into(),
                description: None,
            },
            paths: IndexMap::new(),
            tags: Vec::new(),
        }
    }

    fn page(path: &str, contents: &str) -> GitBookFile {
        GitBookFile {
            path: path.into(),
            contents: contents.into(),
        }
    }

    #[test]
    fn test_layout() {
        let pages = vec![page("pets.md", "# pets\n"), page("store.md", "# store\n")];
        let bundle = assemble(&pages, "openapi: 3.0.3\n", &doc("Pet Store"));

        let paths: Vec<_> = bundle.paths().collect();
        assert_eq!(
            paths,
            vec![SUMMARY_PATH, README_PATH, "pets.md", "store.md", SPEC_PATH]
        );
        assert_eq!(bundle.get(README_PATH), Some("# Pet Store"));
        assert_eq!(bundle.get(SPEC_PATH), Some("openapi: 3.0.3\n"));
        insta::assert_snapshot!(bundle.get(SUMMARY_PATH).unwrap(), @r"
        [pets.md](pets.md)
        [store.md](store.md)
        ");
    }

    #[test]
    fn test_colliding_pages_last_write_wins() {
        let pages = vec![page("a_b.md", "first"), page("a_b.md", "second")];
        let bundle = assemble(&pages, "", &doc("T"));
        assert_eq!(bundle.get("a_b.md"), Some("second"));
        assert_eq!(bundle.get(SUMMARY_PATH), Some("[a_b.md](a_b.md)\n"));
        assert_eq!(bundle.len(), 4);
    }

    #[test]
    fn test_summary_links_with_spaces() {
        let pages = vec![page("Pet Store.md", ""), page("v2 (beta).md", ""), page("pets.md", "")];
        let bundle = assemble(&pages, "", &doc("T"));
        insta::assert_snapshot!(bundle.get(SUMMARY_PATH).unwrap(), @r"
        [Pet Store.md](<Pet Store.md>)
        [v2 (beta).md](<v2 (beta).md>)
        [pets.md](pets.md)
        ");
    }

    #[test]
    fn test_no_pages() {
        let bundle = assemble(&[], "{}", &doc("Empty"));
        assert_eq!(bundle.get(SUMMARY_PATH), Some(""));
        assert_eq!(bundle.len(), 3);
    }
}
