//! Corpus loader.
//!
//! Turns the raw Markdown documents supplied by a [`DocumentSource`] into an
//! immutable [`Catalog`]:
//!
//! - each document is classified as the master index, a detail document for
//!   one (standard, section) pair, or unrelated;
//! - documents are read and parsed concurrently, one task per document, since
//!   no document's parse depends on another;
//! - results are merged in document-path order so the catalog does not depend
//!   on task scheduling.
//!
//! Malformed blocks never abort loading. They are collected as
//! [`MalformedEntry`] diagnostics alongside the catalog; only I/O failures
//! are errors.

mod detail;
mod index;
pub(crate) mod markdown;

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock};

use regex::Regex;
use serde::Serialize;
use thiserror::Error;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::catalog::{Catalog, CatalogEntry, IndexEntry, LinkError, Section, Standard};
use crate::error::{Error, Result};
use crate::source::DocumentSource;

/// Default file name of the master index, relative to the input root.
pub const DEFAULT_INDEX_FILE: &str = "README.md";

static DETAIL_STEM_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:cpp|c\+\+)?[ _-]?(98|03|11|14|17|20|23|26)[ _-]+(.+)$")
        .expect("valid regex")
});

/// A raw document handed to the loader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDocument {
    /// Path relative to the input root.
    pub path: PathBuf,
    /// Full text.
    pub text: String,
}

impl SourceDocument {
    /// Create a new source document.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            text: text.into(),
        }
    }
}

/// The part a document plays in the corpus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum DocumentRole {
    /// The master index listing every feature by name.
    MasterIndex,
    /// Full entries for one (standard, section) pair.
    Detail {
        /// Standard covered by the document.
        standard: Standard,
        /// Section covered by the document.
        section: Section,
    },
}

impl fmt::Display for DocumentRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MasterIndex => write!(f, "master index"),
            Self::Detail { standard, section } => write!(f, "{standard} {section}"),
        }
    }
}

/// Classify a document by its path and, failing that, its title.
///
/// The master index is matched by its path relative to the input root, so a
/// `README.md` in a subdirectory is not mistaken for it. Detail documents are
/// recognised from stems like `cpp11_core_language` or `cpp23-stl`, or from
/// a level-1 title naming both a standard and a section.
#[must_use]
pub fn classify(path: &Path, text: &str, index_file: &str) -> Option<DocumentRole> {
    let normalized = path.to_string_lossy().replace('\\', "/");
    if normalized.eq_ignore_ascii_case(index_file) {
        return Some(DocumentRole::MasterIndex);
    }

    if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
        if let Some(caps) = DETAIL_STEM_PATTERN.captures(stem) {
            let standard = Standard::from_short(&caps[1]);
            let section = Section::detect(&caps[2]);
            if let (Some(standard), Some(section)) = (standard, section) {
                return Some(DocumentRole::Detail { standard, section });
            }
        }
    }

    markdown::scan(text).iter().find_map(|line| match line.kind {
        markdown::LineKind::Heading { level: 1, text } => {
            match (Standard::detect(text), Section::detect(text)) {
                (Some(standard), Some(section)) => {
                    Some(DocumentRole::Detail { standard, section })
                }
                _ => None,
            }
        }
        _ => None,
    })
}

/// Why a block could not become an entry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedReason {
    /// The heading has no usable text.
    #[error("heading has no feature name")]
    EmptyHeading,
    /// A required field is missing or empty.
    #[error("missing required field '{0}'")]
    MissingField(&'static str),
    /// The status field is not a known status.
    #[error("unknown status '{0}'")]
    UnknownStatus(String),
    /// The example link is not a well-formed relative path.
    #[error("{0}")]
    BadExampleLink(LinkError),
    /// A master-index listing appears outside a (standard, section) context.
    #[error("listed outside of a standard/section heading")]
    OutsideSection,
}

/// A diagnostic for a block that could not be parsed into an entry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}:{line}: malformed entry '{heading}': {reason}", .document.display())]
pub struct MalformedEntry {
    /// Document containing the block.
    pub document: PathBuf,
    /// Heading (or list item) text as written.
    pub heading: String,
    /// 1-based line of the heading.
    pub line: usize,
    /// What is wrong with it.
    pub reason: MalformedReason,
}

/// Result of parsing a single document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedDocument {
    /// Document path.
    pub path: PathBuf,
    /// Role, or `None` if the document is not part of the catalog.
    pub role: Option<DocumentRole>,
    /// Listings, when the document is the master index.
    pub index: Vec<IndexEntry>,
    /// Entries, when the document is a detail document.
    pub details: Vec<CatalogEntry>,
    /// Malformed blocks found in the document.
    pub diagnostics: Vec<MalformedEntry>,
}

/// Parse one document. Pure: depends only on the document and the index
/// file name.
#[must_use]
pub fn parse_document(document: &SourceDocument, index_file: &str) -> ParsedDocument {
    let path = document.path.clone();
    let Some(role) = classify(&document.path, &document.text, index_file) else {
        return ParsedDocument {
            path,
            ..ParsedDocument::default()
        };
    };

    let lines = markdown::scan(&document.text);
    let mut parsed = ParsedDocument {
        path,
        role: Some(role),
        ..ParsedDocument::default()
    };
    match role {
        DocumentRole::MasterIndex => {
            let (index, diagnostics) = index::parse_index(&document.path, &lines);
            parsed.index = index;
            parsed.diagnostics = diagnostics;
        }
        DocumentRole::Detail { standard, section } => {
            let (details, diagnostics) =
                detail::parse_detail(&document.path, &lines, standard, section);
            parsed.details = details;
            parsed.diagnostics = diagnostics;
        }
    }
    parsed
}

/// Loader options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoaderOptions {
    /// Path of the master index relative to the input root.
    pub index_file: String,
}

impl Default for LoaderOptions {
    fn default() -> Self {
        Self {
            index_file: DEFAULT_INDEX_FILE.to_string(),
        }
    }
}

/// A document that took part in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentSummary {
    /// Document path.
    pub path: PathBuf,
    /// Its role.
    #[serde(flatten)]
    pub role: DocumentRole,
    /// Listings or entries parsed from it.
    pub entries: usize,
    /// Malformed blocks found in it.
    pub malformed: usize,
}

/// Everything the loader produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadOutcome {
    /// The catalog.
    pub catalog: Catalog,
    /// Malformed blocks from all documents, in document then line order.
    pub diagnostics: Vec<MalformedEntry>,
    /// Documents that were part of the catalog, in path order.
    pub documents: Vec<DocumentSummary>,
}

impl LoadOutcome {
    /// Check if a master index was found.
    #[must_use]
    pub fn has_master_index(&self) -> bool {
        self.documents
            .iter()
            .any(|d| d.role == DocumentRole::MasterIndex)
    }

    /// Merge per-document results, in path order.
    #[must_use]
    pub fn from_documents(mut parsed: Vec<ParsedDocument>) -> Self {
        parsed.sort_by(|a, b| a.path.cmp(&b.path));

        let mut index = Vec::new();
        let mut details = Vec::new();
        let mut diagnostics = Vec::new();
        let mut documents = Vec::new();

        for doc in parsed {
            let Some(role) = doc.role else {
                debug!(path = %doc.path.display(), "ignoring unclassified document");
                continue;
            };
            documents.push(DocumentSummary {
                path: doc.path,
                role,
                entries: doc.index.len() + doc.details.len(),
                malformed: doc.diagnostics.len(),
            });
            index.extend(doc.index);
            details.extend(doc.details);
            diagnostics.extend(doc.diagnostics);
        }

        Self {
            catalog: Catalog::new(index, details),
            diagnostics,
            documents,
        }
    }
}

/// Load the catalog from a document source.
///
/// # Errors
///
/// Returns an error if the source cannot list or read its documents.
/// Malformed content is reported in [`LoadOutcome::diagnostics`] instead.
pub async fn load<S>(source: Arc<S>, options: &LoaderOptions) -> Result<LoadOutcome>
where
    S: DocumentSource + 'static,
{
    let paths = source.list().await?;
    debug!(source = source.name(), documents = paths.len(), "loading corpus");

    let mut tasks = JoinSet::new();
    for path in paths {
        let source = Arc::clone(&source);
        let index_file = options.index_file.clone();
        tasks.spawn(async move {
            let text = source.read(&path).await?;
            let document = SourceDocument::new(path, text);
            Ok::<_, Error>(parse_document(&document, &index_file))
        });
    }

    let mut parsed = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        let doc = joined.map_err(|e| Error::internal(format!("document task failed: {e}")))??;
        if let Some(role) = doc.role {
            debug!(
                path = %doc.path.display(),
                %role,
                entries = doc.index.len() + doc.details.len(),
                malformed = doc.diagnostics.len(),
                "parsed document"
            );
        }
        parsed.push(doc);
    }

    let outcome = LoadOutcome::from_documents(parsed);
    if !outcome.has_master_index() {
        warn!(index_file = %options.index_file, "no master index found");
    }
    if outcome.catalog.is_empty() {
        warn!(source = source.name(), "corpus has no listings or entries");
    }
    info!(
        documents = outcome.documents.len(),
        listings = outcome.catalog.index().len(),
        entries = outcome.catalog.details().len(),
        malformed = outcome.diagnostics.len(),
        "corpus loaded"
    );
    Ok(outcome)
}
