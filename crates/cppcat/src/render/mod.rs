//! Static site rendering.
//!
//! Rendering is a pure function of the catalog, the optional check report,
//! the options and the link resolver: the output is an ordered map from
//! relative path to content, with no timestamps, so identical input always
//! produces byte-identical output. Writing it to disk is the job of
//! [`crate::publish`].
//!
//! Output layout:
//!
//! ```text
//! index.html                 pages grouped by standard, oldest first
//! style.css
//! cpp11/core-language.html   one page per (standard, section)
//! cpp11/stl.html
//! search-index.json          optional
//! ```

mod html;
mod search;

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::path::PathBuf;

use serde::Serialize;
use tracing::{debug, info};

use crate::catalog::{slugify, Catalog, CatalogEntry, ExampleLink, Section, SourceRef, Standard};
use crate::checker::{FindingKind, Report};
use crate::config::RenderConfig;
use crate::error::Result;

pub use search::SearchRecord;

/// Path of the landing page.
pub const INDEX_PAGE: &str = "index.html";
/// Path of the stylesheet.
pub const STYLESHEET_PATH: &str = "style.css";
/// Path of the search index.
pub const SEARCH_INDEX_PATH: &str = "search-index.json";

/// Renderer options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    /// Title of the landing page.
    pub site_title: String,
    /// URL prefix for example files. Relative prefixes are resolved against
    /// the site root; absolute ones (`/x`, `https://...`) are used as is.
    pub example_url_base: String,
    /// Merge checker findings into pages as annotations.
    pub annotate_findings: bool,
    /// Emit `search-index.json`.
    pub search_index: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self::from(&RenderConfig::default())
    }
}

impl From<&RenderConfig> for RenderOptions {
    fn from(config: &RenderConfig) -> Self {
        Self {
            site_title: config.site_title.clone(),
            example_url_base: config.example_url_base.clone(),
            annotate_findings: config.annotate_findings,
            search_index: config.search_index,
        }
    }
}

/// Decides whether an example link points at an existing file.
pub trait LinkResolver {
    /// Check if `link` can be resolved.
    fn resolves(&self, link: &ExampleLink) -> bool;
}

/// Resolves example links against a directory on disk.
#[derive(Debug, Clone)]
pub struct FsLinkResolver {
    root: PathBuf,
}

impl FsLinkResolver {
    /// Create a resolver rooted at the example directory.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl LinkResolver for FsLinkResolver {
    fn resolves(&self, link: &ExampleLink) -> bool {
        self.root.join(link.as_path()).is_file()
    }
}

impl<F> LinkResolver for F
where
    F: Fn(&ExampleLink) -> bool,
{
    fn resolves(&self, link: &ExampleLink) -> bool {
        self(link)
    }
}

/// An example link that could not be resolved. Rendered as plain text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BrokenLink {
    /// Standard of the entry.
    pub standard: Standard,
    /// Section of the entry.
    pub section: Section,
    /// Entry name.
    pub name: String,
    /// The unresolved link.
    pub link: ExampleLink,
    /// Entry location.
    pub location: SourceRef,
}

impl fmt::Display for BrokenLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: broken example link '{}' for {} {} '{}'",
            self.location, self.link, self.standard, self.section, self.name
        )
    }
}

/// The rendered site: relative output path → content, in path order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Site {
    files: BTreeMap<String, String>,
}

impl Site {
    fn insert(&mut self, path: impl Into<String>, content: impl Into<String>) {
        self.files.insert(path.into(), content.into());
    }

    /// Content of one output file.
    #[must_use]
    pub fn get(&self, path: &str) -> Option<&str> {
        self.files.get(path).map(String::as_str)
    }

    /// Output files in path order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.files.iter().map(|(p, c)| (p.as_str(), c.as_str()))
    }

    /// Output paths in order.
    pub fn paths(&self) -> impl Iterator<Item = &str> + '_ {
        self.files.keys().map(String::as_str)
    }

    /// Number of output files.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Check if nothing was rendered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Everything the renderer produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderOutcome {
    /// The site.
    pub site: Site,
    /// Example links rendered as plain text.
    pub broken_links: Vec<BrokenLink>,
}

/// One page as listed on the landing page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PageSummary {
    pub section: Section,
    pub path: String,
    pub entries: usize,
    pub findings: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ExampleView {
    Absent,
    Linked { href: String, text: String },
    Unresolved { text: String },
}

#[derive(Debug)]
pub(crate) struct RenderedEntry<'a> {
    pub entry: &'a CatalogEntry,
    pub anchor: String,
    pub example: ExampleView,
    pub notes: Vec<String>,
}

/// Relative path of the page for one (standard, section) pair.
#[must_use]
pub fn page_path(standard: Standard, section: Section) -> String {
    format!("{}/{}.html", standard.slug(), section.slug())
}

/// Href of an example file as seen from a page one directory below the
/// site root.
fn example_href(base: &str, link: &ExampleLink) -> String {
    let base = base.trim_end_matches('/');
    let absolute = base.contains("://") || base.starts_with('/');
    let prefix = if absolute { "" } else { "../" };
    if base.is_empty() {
        format!("{prefix}{link}")
    } else {
        format!("{prefix}{base}/{link}")
    }
}

/// Hands out anchors that are unique within one page.
#[derive(Debug, Default)]
struct AnchorSet {
    emitted: HashSet<String>,
}

impl AnchorSet {
    fn unique(&mut self, name: &str) -> String {
        let slug = slugify(name);
        let mut candidate = slug.clone();
        let mut n = 1;
        // A suffixed slug may already belong to another entry (`foo 2`).
        while !self.emitted.insert(candidate.clone()) {
            n += 1;
            candidate = format!("{slug}-{n}");
        }
        candidate
    }
}

/// Render the catalog.
///
/// Broken example links never abort rendering; they are collected in
/// [`RenderOutcome::broken_links`].
///
/// # Errors
///
/// Returns an error only if the search index cannot be serialized.
pub fn render(
    catalog: &Catalog,
    report: Option<&Report>,
    options: &RenderOptions,
    resolver: &dyn LinkResolver,
) -> Result<RenderOutcome> {
    let report = report.filter(|_| options.annotate_findings);
    let mut site = Site::default();
    let mut broken_links = Vec::new();
    let mut records = Vec::new();
    let mut groups: BTreeMap<Standard, Vec<PageSummary>> = BTreeMap::new();

    for (standard, section) in catalog.pairs() {
        let path = page_path(standard, section);
        let mut anchors = AnchorSet::default();
        let mut entries = Vec::new();

        for entry in catalog.details_for(standard, section) {
            let anchor = anchors.unique(&entry.name);
            let example = match &entry.example_link {
                None => ExampleView::Absent,
                Some(link) if resolver.resolves(link) => ExampleView::Linked {
                    href: example_href(&options.example_url_base, link),
                    text: link.to_string(),
                },
                Some(link) => {
                    debug!(name = %entry.name, %link, "example link does not resolve");
                    broken_links.push(BrokenLink {
                        standard,
                        section,
                        name: entry.name.clone(),
                        link: link.clone(),
                        location: entry.location.clone(),
                    });
                    ExampleView::Unresolved {
                        text: link.to_string(),
                    }
                }
            };
            let key = entry.key();
            let notes: Vec<String> = report
                .map(|r| {
                    r.for_pair(standard, section)
                        .filter(|f| f.kind != FindingKind::MissingDetail && f.key() == key)
                        .map(|f| format!("{}: {}", f.kind, f.message()))
                        .collect()
                })
                .unwrap_or_default();

            records.push(SearchRecord {
                standard,
                section,
                name: entry.name.clone(),
                category: entry.category.clone(),
                status: entry.status,
                page: path.clone(),
                anchor: anchor.clone(),
            });
            entries.push(RenderedEntry {
                entry,
                anchor,
                example,
                notes,
            });
        }

        let page_notes: Vec<String> = report
            .map(|r| {
                r.for_pair(standard, section)
                    .filter(|f| f.kind == FindingKind::MissingDetail)
                    .map(|f| format!("'{}' is listed in the master index but not documented here", f.name))
                    .collect()
            })
            .unwrap_or_default();
        let findings = report.map_or(0, |r| r.for_pair(standard, section).count());

        let markup = html::section_page(options, standard, section, &entries, &page_notes);
        debug!(page = %path, entries = entries.len(), "rendered page");
        site.insert(path.clone(), markup.into_string());
        groups.entry(standard).or_default().push(PageSummary {
            section,
            path,
            entries: entries.len(),
            findings,
        });
    }

    let groups: Vec<(Standard, Vec<PageSummary>)> = groups.into_iter().collect();
    let totals = (
        catalog.details().len(),
        report.map_or(0, |r| r.findings().len()),
    );
    site.insert(
        INDEX_PAGE,
        html::index_page(options, &groups, totals).into_string(),
    );
    site.insert(STYLESHEET_PATH, html::STYLESHEET);
    if options.search_index {
        site.insert(SEARCH_INDEX_PATH, search::to_json(&records)?);
    }

    info!(
        files = site.len(),
        broken_links = broken_links.len(),
        "site rendered"
    );
    Ok(RenderOutcome { site, broken_links })
}
