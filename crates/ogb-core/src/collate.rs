use indexmap::IndexMap;
use log::debug;
use serde::Deserialize;

use crate::error::CollateError;
use crate::parse::operation::Endpoint;
use crate::parse::spec::{ResolvedDocument, Tag};

/// Name of the synthetic tag that collects operations declaring no tags.
pub const UNTAGGED_TAG_NAME: &str = "__internal-untagged";

/// What to do when an operation names a tag missing from the document's tag list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownTagPolicy {
    /// Fail the run.
    #[default]
    Reject,
    /// Group the operation under a name-only tag.
    Placeholder,
}

/// Stable grouping key: the tag name, or the untagged bucket.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GroupKey {
    Named(String),
    Untagged,
}

/// Endpoints sharing a tag, in document traversal order.
#[derive(Debug, Clone)]
pub struct TagGroup<'a> {
    pub tag: Tag,
    pub endpoints: Vec<Endpoint<'a>>,
}

/// Tag groups in the order each tag was first encountered.
#[derive(Debug, Clone, Default)]
pub struct TagGroups<'a> {
    groups: IndexMap<GroupKey, TagGroup<'a>>,
}

impl<'a> TagGroups<'a> {
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn get(&self, key: &GroupKey) -> Option<&TagGroup<'a>> {
        self.groups.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&GroupKey, &TagGroup<'a>)> {
        self.groups.iter()
    }

    fn push(&mut self, key: GroupKey, tag: impl FnOnce() -> Tag, endpoint: Endpoint<'a>) {
        self.groups
            .entry(key)
            .or_insert_with(|| TagGroup {
                tag: tag(),
                endpoints: Vec::new(),
            })
            .endpoints
            .push(endpoint);
    }
}

/// Group every operation in `doc` by the tags it declares.
///
/// An operation with several tags appears once in each of their groups;
/// one with no tags appears in the untagged group. Tags no operation uses
/// never get a group.
pub fn collate<'a>(
    doc: &'a ResolvedDocument,
    policy: UnknownTagPolicy,
) -> Result<TagGroups<'a>, CollateError> {
    let mut groups = TagGroups::default();

    for endpoint in doc.endpoints() {
        let names = &endpoint.operation.tags;
        if names.is_empty() {
            groups.push(GroupKey::Untagged, || Tag::named(UNTAGGED_TAG_NAME), endpoint);
            continue;
        }

        for name in names {
            let declared = doc.find_tag(name);
            if declared.is_none() && policy == UnknownTagPolicy::Reject {
                return Err(CollateError::UnknownTagReference {
                    tag: name.clone(),
                    method: endpoint.method.to_string(),
                    path: endpoint.path.to_string(),
                });
            }
            groups.push(
                GroupKey::Named(name.clone()),
                || declared.cloned().unwrap_or_else(|| Tag::named(name)),
                endpoint,
            );
        }
    }

    debug!("collated operations into {} tag group(s)", groups.len());
    Ok(groups)
}
