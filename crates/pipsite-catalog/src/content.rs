//! Read-only site content besides PIPs: the project showcase and the
//! whitepaper sections.

use std::cmp::Ordering;
use std::sync::Arc;

use pipsite_config::ContentSettings;
use pipsite_markdown::render_html;
use pipsite_store::{DocumentStore, StoreError};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{CatalogError, CatalogResult};

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Project {
    pub id: u32,
    pub title: String,
    /// Markdown source.
    pub description: String,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct RenderedProject {
    pub project: Project,
    pub html: String,
}

#[derive(Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawSection {
    title: String,
    #[serde(default)]
    icon: String,
    content: String,
    position: i32,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct WhitepaperSection {
    pub title: String,
    pub icon: String,
    pub position: i32,
    pub html: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawProjects {
    #[serde(default)]
    project: Vec<Project>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawWhitepaper {
    #[serde(default)]
    section: Vec<RawSection>,
}

/// Projects and whitepaper sections, read from the store on each call.
#[derive(Clone, Debug)]
pub struct ContentCatalog {
    store: Arc<dyn DocumentStore>,
    settings: ContentSettings,
}

impl ContentCatalog {
    pub fn new(store: Arc<dyn DocumentStore>, settings: ContentSettings) -> Self {
        Self { store, settings }
    }

    /// All projects ordered by title, ignoring case.
    pub fn projects(&self) -> CatalogResult<Vec<Project>> {
        let raw: Option<RawProjects> = self.load_optional(&self.settings.projects)?;
        let mut projects = raw.map(|raw| raw.project).unwrap_or_default();
        projects.sort_by(|a, b| compare_titles(&a.title, &b.title));
        Ok(projects)
    }

    /// One project with its description rendered.
    pub fn project(&self, id: u32) -> CatalogResult<RenderedProject> {
        let project = self
            .projects()?
            .into_iter()
            .find(|project| project.id == id)
            .ok_or(CatalogError::ProjectNotFound { id })?;
        let html = render_html(&project.description);
        Ok(RenderedProject { project, html })
    }

    /// Whitepaper sections by ascending position; ties keep file order.
    pub fn whitepaper(&self) -> CatalogResult<Vec<WhitepaperSection>> {
        let raw: Option<RawWhitepaper> = self.load_optional(&self.settings.whitepaper)?;
        let mut sections = raw.map(|raw| raw.section).unwrap_or_default();
        sections.sort_by_key(|section| section.position);

        Ok(sections
            .into_iter()
            .map(|section| WhitepaperSection {
                html: render_html(&section.content),
                title: section.title,
                icon: section.icon,
                position: section.position,
            })
            .collect())
    }

    /// Parse a TOML file from the store; a missing file yields `None`.
    fn load_optional<T: DeserializeOwned>(&self, key: &str) -> CatalogResult<Option<T>> {
        let contents = match self.store.read_to_string(key) {
            Ok(contents) => contents,
            Err(StoreError::NotFound { .. }) => {
                debug!(key, "content file absent");
                return Ok(None);
            }
            Err(err) => return Err(err.into()),
        };
        toml::from_str(&contents)
            .map(Some)
            .map_err(|source| CatalogError::Parse {
                key: key.to_owned(),
                source,
            })
    }
}

fn compare_titles(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pipsite_store::MemoryStore;

    fn content(store: MemoryStore) -> ContentCatalog {
        ContentCatalog::new(
            Arc::new(store),
            ContentSettings {
                projects: "projects.toml".into(),
                whitepaper: "whitepaper.toml".into(),
            },
        )
    }

    const PROJECTS: &str = r#"
        [[project]]
        id = 1
        title = "zeta wallet"
        description = "A *wallet*."

        [[project]]
        id = 2
        title = "Alpha Explorer"
        description = "Block explorer."

        [[project]]
        id = 3
        title = "beta pool"
        description = "Mining pool."
    "#;

    #[test]
    fn projects_sort_by_title_case_insensitively() {
        let store = MemoryStore::new().with("projects.toml", PROJECTS);
        let titles: Vec<_> = content(store)
            .projects()
            .unwrap()
            .into_iter()
            .map(|p| p.title)
            .collect();
        assert_eq!(titles, vec!["Alpha Explorer", "beta pool", "zeta wallet"]);
    }

    #[test]
    fn project_renders_description() {
        let store = MemoryStore::new().with("projects.toml", PROJECTS);
        let project = content(store).project(1).unwrap();
        assert_eq!(project.html, "<p>A <em>wallet</em>.</p>\n");
    }

    #[test]
    fn unknown_project_is_not_found() {
        let store = MemoryStore::new().with("projects.toml", PROJECTS);
        let err = content(store).project(9).unwrap_err();
        assert!(matches!(err, CatalogError::ProjectNotFound { id: 9 }));
    }

    #[test]
    fn missing_files_mean_no_content() {
        let catalog = content(MemoryStore::new());
        assert!(catalog.projects().unwrap().is_empty());
        assert!(catalog.whitepaper().unwrap().is_empty());
    }

    #[test]
    fn whitepaper_orders_by_position() {
        let store = MemoryStore::new().with(
            "whitepaper.toml",
            r##"
            [[section]]
            title = "Consensus"
            icon = "fa-cubes"
            content = "Proof of stake."
            position = 2

            [[section]]
            title = "Introduction"
            icon = "fa-book"
            content = "# Hello"
            position = 1
            "##,
        );
        let sections = content(store).whitepaper().unwrap();
        assert_eq!(sections[0].title, "Introduction");
        assert_eq!(sections[0].html, "<h1>Hello</h1>\n");
        assert_eq!(sections[1].icon, "fa-cubes");
    }

    #[test]
    fn malformed_content_is_a_parse_error() {
        let store = MemoryStore::new().with("projects.toml", "[[project]]\nid = \"x\"\n");
        let err = content(store).projects().unwrap_err();
        assert!(matches!(err, CatalogError::Parse { .. }));
    }
}
