use minijinja::{Environment, context};

use crate::GitBookFile;
use crate::bundle::SPEC_PATH;
use crate::bundle::naming::{FileNaming, page_path};
use crate::error::BundleError;
use crate::parse::operation::Endpoint;
use crate::parse::spec::Tag;

const PAGE_TEMPLATE: &str = "page.md.j2";

/// Renders one markdown page per tag group.
///
/// Pages never inline operation details. Each endpoint becomes a GitBook
/// `swagger` block pointing at the bundled copy of the spec.
pub struct PageRenderer {
    env: Environment<'static>,
    naming: FileNaming,
}

impl PageRenderer {
    pub fn new(naming: FileNaming) -> Result<Self, BundleError> {
        let mut env = Environment::new();
        env.set_trim_blocks(true);
        env.add_template(PAGE_TEMPLATE, include_str!("../templates/page.md.j2"))?;
        Ok(Self { env, naming })
    }

    pub fn render(&self, tag: &Tag, endpoints: &[Endpoint<'_>]) -> Result<GitBookFile, BundleError> {
        let path = page_path(&tag.name, self.naming)?;

        let docs = tag.external_docs.as_ref().map(|docs| {
            context! {
                text => docs.description.as_deref().unwrap_or(&docs.url),
                url => docs.url,
            }
        });
        let endpoints: Vec<minijinja::Value> = endpoints
            .iter()
            .map(|e| context! { path => e.path, method => e.method.as_str() })
            .collect();

        let tmpl = self.env.get_template(PAGE_TEMPLATE)?;
        let contents = tmpl.render(context! {
            name => tag.name,
            description => tag.description.as_deref().map(str::trim_end),
            docs => docs,
            endpoints => endpoints,
            spec_src => format!("./{SPEC_PATH}"),
            open => "{%",
            close => "%}",
        })?;

        Ok(GitBookFile { path, contents })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::operation::{HttpMethod, Operation};
    use crate::parse::spec::ExternalDocs;
    use indexmap::IndexMap;

    fn operation() -> Operation {
        Operation {
            operation_id: None,
            summary: Some("ignored by the page".into()),
            description: None,
            tags: vec!["pets".into()],
            deprecated: false,
            extra: IndexMap::new(),
        }
    }

    #[test]
    fn test_render_page() {
        let op = operation();
        let endpoints = [
            Endpoint {
                path: "/pets",
                method: HttpMethod::Get,
                operation: &op,
            },
            Endpoint {
                path: "/pets/{petId}",
                method: HttpMethod::Delete,
                operation: &op,
            },
        ];
        let tag = Tag {
            name: "pets".into(),
            description: Some("Everything about your pets\n".into()),
            external_docs: Some(ExternalDocs {
                url: "https://example.com/pets".into(),
                description: Some("Find out more".into()),
            }),
        };

        let page = PageRenderer::new(FileNaming::Verbatim)
            .unwrap()
            .render(&tag, &endpoints)
            .unwrap();

        assert_eq!(page.path, "pets.md");
        assert_eq!(
            page.contents,
            "# pets\n\
             \n\
             Everything about your pets\n\
             \n\
             [Find out more](https://example.com/pets)\n\
             \n\
             {% swagger src=\"./.gitbook/openapi.yaml\" path=\"/pets\" method=\"get\" %}\n\
             [openapi.yaml](./.gitbook/openapi.yaml)\n\
             {% endswagger %}\n\
             \n\
             {% swagger src=\"./.gitbook/openapi.yaml\" path=\"/pets/{petId}\" method=\"delete\" %}\n\
             [openapi.yaml](./.gitbook/openapi.yaml)\n\
             {% endswagger %}\n"
        );
        assert!(!page.contents.contains("ignored by the page"));
    }

    #[test]
    fn test_render_bare_tag() {
        let op = operation();
        let endpoints = [Endpoint {
            path: "/health",
            method: HttpMethod::Get,
            operation: &op,
        }];
        let page = PageRenderer::new(FileNaming::Verbatim)
            .unwrap()
            .render(&Tag::named("__internal-untagged"), &endpoints)
            .unwrap();

        assert_eq!(page.path, "__internal-untagged.md");
        assert!(page.contents.starts_with("# __internal-untagged\n\n{% swagger "));
    }

    #[test]
    fn test_external_docs_without_description_uses_url() {
        let tag = Tag {
            name: "store".into(),
            description: None,
            external_docs: Some(ExternalDocs {
                url: "https://example.com/store".into(),
                description: None,
            }),
        };
        let page = PageRenderer::new(FileNaming::Kebab)
            .unwrap()
            .render(&tag, &[])
            .unwrap();
        assert_eq!(
            page.contents,
            "# store\n\n[https://example.com/store](https://example.com/store)\n"
        );
    }

    #[test]
    fn test_unsafe_name_fails() {
        let err = PageRenderer::new(FileNaming::Verbatim)
            .unwrap()
            .render(&Tag::named(".."), &[])
            .unwrap_err();
        assert!(matches!(err, BundleError::UnsafeTagName { .. }));
    }
}
