//! Documentation content on disk: pre-rendered HTML pages with a YAML front
//! matter block, indexed by URL path and grouped into one menu per section.

use crate::menu::{MenuError, MenuNode, MenuTree};
use crate::page::{section_of, Heading, NavLink, PagePayload};
use scraper::{Html, Selector};
use serde::Deserialize;
use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};
use thiserror::Error;
use url::Url;
use walkdir::WalkDir;

const PAGE_EXTENSION: &str = "html";
const INDEX_STEM: &str = "index";

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to walk content directory: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("{path} has no front matter block")]
    MissingFrontMatter { path: String },
    #[error("invalid front matter in {path}: {source}")]
    FrontMatter {
        path: String,
        source: serde_yaml::Error,
    },
    #[error(transparent)]
    Menu(#[from] MenuError),
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct FrontMatter {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub menu_title: Option<String>,
    #[serde(default)]
    pub weight: i64,
}

impl FrontMatter {
    fn menu_label(&self) -> &str {
        self.menu_title.as_deref().unwrap_or(&self.title)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Page {
    pub href: String,
    pub front: FrontMatter,
    pub body_html: String,
    pub headings: Vec<Heading>,
}

#[derive(Debug, Default)]
pub struct ContentIndex {
    pages: BTreeMap<String, Page>,
    menus: BTreeMap<String, MenuTree>,
}

impl ContentIndex {
    pub fn load(dir: &Path) -> Result<Self, ContentError> {
        let mut pages = BTreeMap::new();
        let mut root = Level::default();

        for entry in WalkDir::new(dir).sort_by_file_name() {
            let entry = entry?;
            let path = entry.path();
            if !entry.file_type().is_file()
                || path.extension().and_then(|ext| ext.to_str()) != Some(PAGE_EXTENSION)
            {
                continue;
            }

            let Ok(relative) = path.strip_prefix(dir) else {
                continue;
            };
            let raw = fs::read_to_string(path).map_err(|source| ContentError::Io {
                path: path.to_path_buf(),
                source,
            })?;

            let href = href_for(relative);
            let page = parse_page(&href, &raw)?;
            let parts = relative
                .iter()
                .filter_map(|part| part.to_str())
                .collect::<Vec<_>>();
            root.insert(&parts, href.clone());
            pages.insert(href, page);
        }

        let mut menus = BTreeMap::new();
        for (section, level) in &root.nested {
            menus.insert(section.clone(), MenuTree::new(level.to_nodes(&pages))?);
        }

        Ok(Self { pages, menus })
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn page(&self, path: &str) -> Option<&Page> {
        self.pages.get(&normalize_request_path(path))
    }

    pub fn menu(&self, section: &str) -> Option<&MenuTree> {
        self.menus.get(section)
    }

    pub fn sections(&self) -> impl Iterator<Item = &str> {
        self.menus.keys().map(String::as_str)
    }

    pub fn page_payload(&self, path: &str, base_url: Option<&Url>) -> Option<PagePayload> {
        let page = self.page(path)?;
        let section = section_of(&page.href).to_string();
        let (prev, next) = self
            .menu(&section)
            .map(|menu| menu.neighbors(&page.href))
            .unwrap_or((None, None));

        Some(PagePayload {
            path: page.href.clone(),
            section,
            title: page.front.title.clone(),
            description: page.front.description.clone(),
            body_html: page.body_html.clone(),
            headings: page.headings.clone(),
            prev: prev.map(nav_link),
            next: next.map(nav_link),
            canonical_url: base_url
                .and_then(|base| base.join(page.href.trim_start_matches('/')).ok())
                .map(|url| url.to_string()),
        })
    }
}

fn nav_link(node: &MenuNode) -> NavLink {
    NavLink {
        title: node.title.clone(),
        href: node.href.clone(),
    }
}

/// Directory tree of pages, mirroring the on-disk layout.
#[derive(Debug, Default)]
struct Level {
    index: Option<String>,
    files: Vec<String>,
    nested: BTreeMap<String, Level>,
}

impl Level {
    fn insert(&mut self, parts: &[&str], href: String) {
        match parts {
            [] => {}
            [file] => {
                if file_stem(file) == INDEX_STEM {
                    self.index = Some(href);
                } else {
                    self.files.push(href);
                }
            }
            [dir, rest @ ..] => self
                .nested
                .entry((*dir).to_string())
                .or_default()
                .insert(rest, href),
        }
    }

    fn to_nodes(&self, pages: &BTreeMap<String, Page>) -> Vec<MenuNode> {
        let mut entries = Vec::new();

        for href in &self.files {
            if let Some(page) = pages.get(href) {
                let node = MenuNode::leaf(last_segment(href), page.front.menu_label(), href.clone());
                entries.push((page.front.weight, node));
            }
        }

        for (name, level) in &self.nested {
            let index = level.index.as_ref().and_then(|href| pages.get(href));
            let children = level.to_nodes(pages);
            if index.is_none() && children.is_empty() {
                continue;
            }

            let href = level
                .index
                .clone()
                .or_else(|| children.first().map(|child| parent_of(&child.href)))
                .unwrap_or_default();
            let (weight, node) = match index {
                Some(page) => (
                    page.front.weight,
                    MenuNode::leaf(name.clone(), page.front.menu_label(), href),
                ),
                None => (0, MenuNode::leaf(name.clone(), folder_title(name), href).without_page()),
            };

            entries.push((weight, node.with_children(children)));
        }

        entries.sort_by(|(left_weight, left), (right_weight, right)| {
            left_weight
                .cmp(right_weight)
                .then_with(|| left.title.cmp(&right.title))
        });
        entries.into_iter().map(|(_, node)| node).collect()
    }
}

pub fn split_front_matter(raw: &str) -> Option<(&str, &str)> {
    let raw = raw.strip_prefix('\u{feff}').unwrap_or(raw);
    let rest = raw
        .strip_prefix("---\n")
        .or_else(|| raw.strip_prefix("---\r\n"))?;

    let (front, after) = if let Some(after) = rest.strip_prefix("---") {
        ("", after)
    } else {
        let end = rest.find("\n---")?;
        (&rest[..end], &rest[end + 4..])
    };

    let body = after
        .strip_prefix("\r\n")
        .or_else(|| after.strip_prefix('\n'))
        .unwrap_or(after);
    Some((front, body))
}

pub fn parse_page(href: &str, raw: &str) -> Result<Page, ContentError> {
    let (front, body) = split_front_matter(raw).ok_or_else(|| ContentError::MissingFrontMatter {
        path: href.to_string(),
    })?;
    let front: FrontMatter =
        serde_yaml::from_str(front).map_err(|source| ContentError::FrontMatter {
            path: href.to_string(),
            source,
        })?;

    Ok(Page {
        href: href.to_string(),
        front,
        headings: extract_headings(body),
        body_html: body.to_string(),
    })
}

pub fn extract_headings(body_html: &str) -> Vec<Heading> {
    let Ok(selector) = Selector::parse("h2, h3") else {
        return Vec::new();
    };
    let fragment = Html::parse_fragment(body_html);

    fragment
        .select(&selector)
        .filter_map(|element| {
            let level = match element.value().name() {
                "h2" => 2,
                "h3" => 3,
                _ => return None,
            };
            let text = normalize_text(element.text().collect::<String>())?;

            Some(Heading {
                level,
                id: element.value().attr("id").map(ToString::to_string),
                text,
            })
        })
        .collect()
}

fn normalize_text(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    Some(trimmed.split_whitespace().collect::<Vec<_>>().join(" "))
}

fn href_for(relative: &Path) -> String {
    let mut segments = relative
        .iter()
        .filter_map(|part| part.to_str())
        .map(ToString::to_string)
        .collect::<Vec<_>>();

    if let Some(last) = segments.pop() {
        let stem = file_stem(&last);
        if stem != INDEX_STEM {
            segments.push(stem.to_string());
        }
    }

    format!("/{}", segments.join("/"))
}

fn file_stem(file: &str) -> &str {
    Path::new(file)
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or(file)
}

/// `shared-state` becomes `Shared state`.
fn folder_title(name: &str) -> String {
    let spaced = name.replace(['-', '_'], " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn last_segment(href: &str) -> &str {
    href.rsplit('/').next().unwrap_or(href)
}

fn parent_of(href: &str) -> String {
    match href.rsplit_once('/') {
        Some(("", _)) | None => "/".to_string(),
        Some((parent, _)) => parent.to_string(),
    }
}

fn normalize_request_path(path: &str) -> String {
    let trimmed = path.trim_matches('/');
    format!("/{trimmed}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(root: &Path, relative: &str, contents: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().expect("file has a parent")).expect("create dirs");
        fs::write(path, contents).expect("write fixture");
    }

    fn fixture() -> TempDir {
        let dir = TempDir::new().expect("temp dir");
        let root = dir.path();

        write(root, "index.html", "---\ntitle: Home\n---\n<p>home</p>\n");
        write(
            root,
            "tokio/tutorial/index.html",
            "---\ntitle: Tutorial\nweight: 20\n---\n<p>Welcome</p>\n",
        );
        write(
            root,
            "tokio/tutorial/hello-tokio.html",
            "---\ntitle: Hello Tokio\nweight: 2\n---\n<h2 id=\"the-code\">The   code</h2><p>..</p><h3>Breaking it down</h3>\n",
        );
        write(
            root,
            "tokio/tutorial/setup.html",
            "---\ntitle: Setup\nweight: 1\ndescription: Installing the toolchain\n---\n<p>setup</p>\n",
        );
        write(
            root,
            "tokio/overview.html",
            "---\ntitle: Overview of the runtime\nmenu_title: Overview\nweight: 10\n---\n<p>overview</p>\n",
        );
        write(root, "tokio/notes.txt", "not a page");
        dir
    }

    #[test]
    fn front_matter_is_split_from_body() {
        let (front, body) = split_front_matter("---\ntitle: A\n---\n<p>b</p>").expect("front matter");
        assert_eq!(front, "title: A");
        assert_eq!(body, "<p>b</p>");

        let (front, body) = split_front_matter("---\r\n---\r\nbody").expect("empty front matter");
        assert_eq!(front, "");
        assert_eq!(body, "body");

        assert!(split_front_matter("<p>no front matter</p>").is_none());
        assert!(split_front_matter("---\ntitle: unterminated\n").is_none());
    }

    #[test]
    fn headings_are_collected_with_ids() {
        let headings = extract_headings(
            "<h1>Title</h1><h2 id=\"a\">First  part</h2><h3>Detail</h3><h2>   </h2><h4>Skip</h4>",
        );

        assert_eq!(
            headings,
            vec![
                Heading {
                    level: 2,
                    id: Some("a".to_string()),
                    text: "First part".to_string(),
                },
                Heading {
                    level: 3,
                    id: None,
                    text: "Detail".to_string(),
                },
            ]
        );
    }

    #[test]
    fn missing_title_is_reported() {
        let result = parse_page("/tokio/broken", "---\nweight: 1\n---\n<p></p>");
        assert!(matches!(result, Err(ContentError::FrontMatter { .. })));

        let result = parse_page("/tokio/bare", "<p></p>");
        assert!(matches!(result, Err(ContentError::MissingFrontMatter { .. })));
    }

    #[test]
    fn hrefs_drop_extension_and_index() {
        assert_eq!(href_for(Path::new("tokio/tutorial/index.html")), "/tokio/tutorial");
        assert_eq!(href_for(Path::new("tokio/tutorial/spawning.html")), "/tokio/tutorial/spawning");
        assert_eq!(href_for(Path::new("index.html")), "/");
        assert_eq!(parent_of("/tokio/tutorial/spawning"), "/tokio/tutorial");
        assert_eq!(parent_of("/tokio"), "/");
    }

    #[test]
    fn loading_builds_pages_and_section_menus() {
        let dir = fixture();
        let index = ContentIndex::load(dir.path()).expect("content loads");

        assert_eq!(index.len(), 5);
        assert_eq!(index.sections().collect::<Vec<_>>(), vec!["tokio"]);
        assert_eq!(index.page("/").map(|page| page.front.title.as_str()), Some("Home"));

        let menu = index.menu("tokio").expect("tokio menu");
        let top = menu
            .nodes()
            .iter()
            .map(|node| node.title.as_str())
            .collect::<Vec<_>>();
        assert_eq!(top, vec!["Overview", "Tutorial"]);

        let tutorial = &menu.nodes()[1];
        assert_eq!(tutorial.href, "/tokio/tutorial");
        let children = tutorial
            .children
            .iter()
            .map(|node| node.key.as_str())
            .collect::<Vec<_>>();
        assert_eq!(children, vec!["setup", "hello-tokio"]);
    }

    #[test]
    fn payload_links_neighbors_and_canonical_url() {
        let dir = fixture();
        let index = ContentIndex::load(dir.path()).expect("content loads");
        let base = Url::parse("https://tokio.rs/").expect("valid URL");

        let payload = index
            .page_payload("tokio/tutorial/setup/", Some(&base))
            .expect("page exists");

        assert_eq!(payload.path, "/tokio/tutorial/setup");
        assert_eq!(payload.section, "tokio");
        assert_eq!(payload.description.as_deref(), Some("Installing the toolchain"));
        assert_eq!(payload.prev.map(|link| link.href), Some("/tokio/tutorial".to_string()));
        assert_eq!(
            payload.next.map(|link| link.title),
            Some("Hello Tokio".to_string())
        );
        assert_eq!(
            payload.canonical_url.as_deref(),
            Some("https://tokio.rs/tokio/tutorial/setup")
        );

        let hello = index
            .page_payload("/tokio/tutorial/hello-tokio", None)
            .expect("page exists");
        assert_eq!(hello.headings.len(), 2);
        assert_eq!(hello.headings[0].text, "The code");
        assert!(hello.next.is_none());
        assert!(hello.canonical_url.is_none());

        assert!(index.page_payload("/tokio/missing", None).is_none());
    }

    #[test]
    fn folder_without_index_groups_pages_but_is_not_linked() {
        let dir = TempDir::new().expect("temp dir");
        write(dir.path(), "tokio/intro.html", "---\ntitle: Intro\n---\n");
        write(dir.path(), "tokio/shared-topics/bridging.html", "---\ntitle: Bridging\n---\n");

        let index = ContentIndex::load(dir.path()).expect("content loads");
        let menu = index.menu("tokio").expect("tokio menu");
        let group = &menu.nodes()[1];
        assert_eq!(group.title, "Shared topics");
        assert!(!group.has_page);
        assert_eq!(group.children[0].href, "/tokio/shared-topics/bridging");

        let bridging = index
            .page_payload("/tokio/shared-topics/bridging", None)
            .expect("page exists");
        let prev = bridging.prev.expect("previous page");
        assert_eq!(prev.href, "/tokio/intro");
        assert!(index.page(&prev.href).is_some());

        let intro = index.page_payload("/tokio/intro", None).expect("page exists");
        let next = intro.next.expect("next page");
        assert_eq!(next.href, "/tokio/shared-topics/bridging");
        assert!(index.page(&next.href).is_some());
    }

    #[test]
    fn conflicting_file_and_directory_names_are_rejected() {
        let dir = TempDir::new().expect("temp dir");
        write(dir.path(), "tokio/io.html", "---\ntitle: I/O\n---\n");
        write(dir.path(), "tokio/io/index.html", "---\ntitle: I/O index\n---\n");
        write(dir.path(), "tokio/io/reading.html", "---\ntitle: Reading\n---\n");

        let result = ContentIndex::load(dir.path());
        assert!(matches!(result, Err(ContentError::Menu(MenuError::DuplicateKey { .. }))));
    }
}
