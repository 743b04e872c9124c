use log::info;

use crate::bundle::naming::FileNaming;
use crate::bundle::{self, Bundle};
use crate::collate::{self, UnknownTagPolicy};
use crate::config::OgbConfig;
use crate::error::PipelineError;
use crate::parse;
use crate::parse::ref_resolve::RefLoader;
use crate::render::PageRenderer;

/// Options for a single pipeline run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineOptions {
    pub unknown_tags: UnknownTagPolicy,
    pub file_naming: FileNaming,
}

impl From<&OgbConfig> for PipelineOptions {
    fn from(config: &OgbConfig) -> Self {
        Self {
            unknown_tags: config.tags.unknown,
            file_naming: config.pages.file_naming,
        }
    }
}

/// Turn raw spec text into a documentation bundle.
///
/// Either every stage succeeds or the first failure is returned; nothing is
/// produced in between.
pub fn build_bundle(
    raw: &str,
    loader: &dyn RefLoader,
    options: &PipelineOptions,
) -> Result<Bundle, PipelineError> {
    let doc = parse::load(raw, loader)?;
    let groups = collate::collate(&doc, options.unknown_tags)?;

    let renderer = PageRenderer::new(options.file_naming)?;
    let pages = groups
        .iter()
        .map(|(_, group)| renderer.render(&group.tag, &group.endpoints))
        .collect::<Result<Vec<_>, _>>()?;

    let bundle = bundle::assemble(&pages, raw, &doc);
    info!(
        "built bundle for '{}': {} page(s), {} file(s)",
        doc.info.title,
        pages.len(),
        bundle.len()
    );
    Ok(bundle)
}

/// Run the pipeline and serialize the bundle into archive bytes.
pub fn build_archive(
    raw: &str,
    loader: &dyn RefLoader,
    options: &PipelineOptions,
) -> Result<Vec<u8>, PipelineError> {
    let bundle = build_bundle(raw, loader, options)?;
    Ok(bundle.to_archive()?)
}
