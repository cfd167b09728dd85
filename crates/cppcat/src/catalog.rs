//! Core catalog types for cppcat.
//!
//! This module defines the structured, immutable representation of the C++
//! feature corpus: the standards and sections entries belong to, the entries
//! themselves (master index and detail side), and the keys used to
//! cross-reference them.

use std::collections::BTreeSet;
use std::fmt;
use std::path::{Component, Path, PathBuf};
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

static STANDARD_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bc(?:\+\+|pp)\s?(98|03|11|14|17|20|23|26)\b").expect("valid regex")
});

static STL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(stl|library)\b").expect("valid regex"));

static CORE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(core|language)\b").expect("valid regex"));

/// Error returned when a catalog enumeration cannot be parsed from text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind}: '{value}'")]
pub struct ParseEnumError {
    /// Which enumeration was being parsed.
    pub kind: &'static str,
    /// The rejected input.
    pub value: String,
}

impl ParseEnumError {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

/// A C++ language standard.
///
/// Variants are declared in chronological order, so the derived `Ord`
/// sorts C++98 first and C++26 last (C++03 comes after C++98, not before).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Standard {
    /// C++98.
    #[serde(rename = "98")]
    Cpp98,
    /// C++03.
    #[serde(rename = "03")]
    Cpp03,
    /// C++11.
    #[serde(rename = "11")]
    Cpp11,
    /// C++14.
    #[serde(rename = "14")]
    Cpp14,
    /// C++17.
    #[serde(rename = "17")]
    Cpp17,
    /// C++20.
    #[serde(rename = "20")]
    Cpp20,
    /// C++23.
    #[serde(rename = "23")]
    Cpp23,
    /// C++26.
    #[serde(rename = "26")]
    Cpp26,
}

impl Standard {
    /// Every standard, in chronological order.
    pub const ALL: [Self; 8] = [
        Self::Cpp98,
        Self::Cpp03,
        Self::Cpp11,
        Self::Cpp14,
        Self::Cpp17,
        Self::Cpp20,
        Self::Cpp23,
        Self::Cpp26,
    ];

    /// The two-digit year of the standard (`"11"`, `"03"`).
    #[must_use]
    pub fn short(self) -> &'static str {
        match self {
            Self::Cpp98 => "98",
            Self::Cpp03 => "03",
            Self::Cpp11 => "11",
            Self::Cpp14 => "14",
            Self::Cpp17 => "17",
            Self::Cpp20 => "20",
            Self::Cpp23 => "23",
            Self::Cpp26 => "26",
        }
    }

    /// Look up a standard from its two-digit year.
    #[must_use]
    pub fn from_short(short: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.short() == short)
    }

    /// Directory-safe identifier (`cpp11`).
    #[must_use]
    pub fn slug(self) -> String {
        format!("cpp{}", self.short())
    }

    /// Find the first standard mentioned in free text such as a heading
    /// (`C++17`, `cpp17`, `C++ 17`).
    #[must_use]
    pub fn detect(text: &str) -> Option<Self> {
        STANDARD_PATTERN
            .captures(text)
            .and_then(|caps| Self::from_short(&caps[1]))
    }
}

impl fmt::Display for Standard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "C++{}", self.short())
    }
}

impl FromStr for Standard {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let lower = trimmed.to_ascii_lowercase();
        let digits = lower
            .strip_prefix("c++")
            .or_else(|| lower.strip_prefix("cpp"))
            .unwrap_or(&lower)
            .trim();
        Self::from_short(digits).ok_or_else(|| ParseEnumError::new("standard", trimmed))
    }
}

/// The part of a standard an entry documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    /// Core language features.
    CoreLanguage,
    /// Standard library features.
    Stl,
}

impl Section {
    /// Every section, in rendering order.
    pub const ALL: [Self; 2] = [Self::CoreLanguage, Self::Stl];

    /// File-name-safe identifier (`core-language`, `stl`).
    #[must_use]
    pub fn slug(self) -> &'static str {
        match self {
            Self::CoreLanguage => "core-language",
            Self::Stl => "stl",
        }
    }

    /// Detect a section from a heading or file stem.
    ///
    /// Library keywords win over language keywords so that
    /// "Standard Library" and "Language Support Library" map to STL.
    #[must_use]
    pub fn detect(text: &str) -> Option<Self> {
        let spaced = text.replace(['_', '-'], " ");
        if STL_PATTERN.is_match(&spaced) {
            Some(Self::Stl)
        } else if CORE_PATTERN.is_match(&spaced) {
            Some(Self::CoreLanguage)
        } else {
            None
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CoreLanguage => write!(f, "Core Language"),
            Self::Stl => write!(f, "STL"),
        }
    }
}

impl FromStr for Section {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::detect(s).ok_or_else(|| ParseEnumError::new("section", s.trim()))
    }
}

/// Lifecycle status of a documented feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// New in the owning standard.
    Addition,
    /// An existing feature extended by the owning standard.
    Evolution,
    /// Proposed for a future standard.
    Proposed,
    /// Deprecated by the owning standard.
    Deprecated,
}

impl Status {
    /// Status assumed when an entry does not state one.
    #[must_use]
    pub fn default_for(standard: Standard) -> Self {
        if standard == Standard::Cpp26 {
            Self::Proposed
        } else {
            Self::Addition
        }
    }

    /// CSS class used by the renderer.
    #[must_use]
    pub fn css_class(self) -> &'static str {
        match self {
            Self::Addition => "addition",
            Self::Evolution => "evolution",
            Self::Proposed => "proposed",
            Self::Deprecated => "deprecated",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Addition => write!(f, "Addition"),
            Self::Evolution => write!(f, "Evolution"),
            Self::Proposed => write!(f, "Proposed"),
            Self::Deprecated => write!(f, "Deprecated"),
        }
    }
}

impl FromStr for Status {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "addition" | "added" | "new" => Ok(Self::Addition),
            "evolution" | "evolved" | "enhanced" | "changed" => Ok(Self::Evolution),
            "proposed" | "proposal" => Ok(Self::Proposed),
            "deprecated" => Ok(Self::Deprecated),
            _ => Err(ParseEnumError::new("status", s.trim())),
        }
    }
}

/// Where an entry came from: document path (relative to the input root)
/// and 1-based line of its heading or list item.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SourceRef {
    /// Document path.
    pub path: PathBuf,
    /// 1-based line number.
    pub line: usize,
}

impl SourceRef {
    /// Create a new source reference.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, line: usize) -> Self {
        Self {
            path: path.into(),
            line,
        }
    }
}

impl fmt::Display for SourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.path.display(), self.line)
    }
}

/// Why an example link was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LinkError {
    /// The link was empty.
    #[error("example link is empty")]
    Empty,
    /// The link was an absolute path.
    #[error("example link must be relative")]
    Absolute,
    /// The link carried a URL scheme.
    #[error("example link must be a path, not a URL")]
    Scheme,
    /// The link escaped its root with `..`.
    #[error("example link must not contain '..'")]
    ParentDir,
    /// The link contained whitespace or a backslash.
    #[error("example link contains whitespace or backslashes")]
    BadCharacter,
}

/// A well-formed relative path to an example file.
///
/// The file itself is not required to exist.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExampleLink(String);

impl ExampleLink {
    /// Validate a raw link target.
    ///
    /// # Errors
    ///
    /// Returns a [`LinkError`] describing the first rule the link breaks.
    pub fn parse(raw: &str) -> Result<Self, LinkError> {
        let link = raw.trim();
        if link.is_empty() {
            return Err(LinkError::Empty);
        }
        if link.contains("://") || link.starts_with("mailto:") {
            return Err(LinkError::Scheme);
        }
        if link.chars().any(|c| c.is_whitespace() || c == '\\') {
            return Err(LinkError::BadCharacter);
        }
        let path = Path::new(link);
        if path.is_absolute() || link.starts_with('/') {
            return Err(LinkError::Absolute);
        }
        if path.components().any(|c| matches!(c, Component::ParentDir)) {
            return Err(LinkError::ParentDir);
        }
        let link = link.strip_prefix("./").unwrap_or(link);
        Ok(Self(link.to_string()))
    }

    /// The link as written (minus any leading `./`).
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The link as a relative path.
    #[must_use]
    pub fn as_path(&self) -> &Path {
        Path::new(&self.0)
    }
}

impl fmt::Display for ExampleLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A fenced code block attached to an entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snippet {
    /// Fence info string, e.g. `cpp`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    /// Code between the fences. May be empty.
    pub code: String,
}

/// Cross-reference key: an entry's (standard, section, name).
///
/// Orders by standard (chronologically), then section, then name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct EntryKey {
    /// The standard.
    pub standard: Standard,
    /// The section.
    pub section: Section,
    /// Normalized feature name.
    pub name: String,
}

/// A feature listed in the master index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexEntry {
    /// The standard the listing appears under.
    pub standard: Standard,
    /// The section the listing appears under.
    pub section: Section,
    /// Nearest grouping heading, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Normalized feature name.
    pub name: String,
    /// Where the listing is.
    pub location: SourceRef,
}

impl IndexEntry {
    /// Cross-reference key of this listing.
    #[must_use]
    pub fn key(&self) -> EntryKey {
        EntryKey {
            standard: self.standard,
            section: self.section,
            name: self.name.clone(),
        }
    }
}

/// One fully documented feature from a detail document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogEntry {
    /// Owning standard.
    pub standard: Standard,
    /// Owning section.
    pub section: Section,
    /// Grouping label such as "Containers".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Normalized feature name.
    pub name: String,
    /// Lifecycle status.
    pub status: Status,
    /// Non-empty explanation.
    pub explanation: String,
    /// Non-empty real-world scenario.
    pub scenario: String,
    /// Optional code snippet.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snippet: Option<Snippet>,
    /// Optional relative link to an example file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example_link: Option<ExampleLink>,
    /// Where the entry heading is.
    pub location: SourceRef,
}

impl CatalogEntry {
    /// Cross-reference key of this entry.
    #[must_use]
    pub fn key(&self) -> EntryKey {
        EntryKey {
            standard: self.standard,
            section: self.section,
            name: self.name.clone(),
        }
    }

    /// Whether the explanation names the entry's own standard (`C++11`).
    #[must_use]
    pub fn mentions_own_standard(&self) -> bool {
        let needle = format!("c++{}", self.standard.short());
        self.explanation.to_ascii_lowercase().contains(&needle)
    }
}

/// The structured catalog produced by the loader.
///
/// Immutable once built; the checker and renderer only borrow it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Catalog {
    index: Vec<IndexEntry>,
    details: Vec<CatalogEntry>,
}

impl Catalog {
    /// Build a catalog from already ordered entries.
    #[must_use]
    pub fn new(index: Vec<IndexEntry>, details: Vec<CatalogEntry>) -> Self {
        Self { index, details }
    }

    /// Master index listings, in document order.
    #[must_use]
    pub fn index(&self) -> &[IndexEntry] {
        &self.index
    }

    /// Detail entries, in document order.
    #[must_use]
    pub fn details(&self) -> &[CatalogEntry] {
        &self.details
    }

    /// Every (standard, section) pair that has at least one listing or entry,
    /// in chronological order.
    #[must_use]
    pub fn pairs(&self) -> BTreeSet<(Standard, Section)> {
        self.index
            .iter()
            .map(|e| (e.standard, e.section))
            .chain(self.details.iter().map(|e| (e.standard, e.section)))
            .collect()
    }

    /// Detail entries of one pair, in source order.
    pub fn details_for(
        &self,
        standard: Standard,
        section: Section,
    ) -> impl Iterator<Item = &CatalogEntry> + '_ {
        self.details
            .iter()
            .filter(move |e| e.standard == standard && e.section == section)
    }

    /// Index listings of one pair, in source order.
    pub fn index_for(
        &self,
        standard: Standard,
        section: Section,
    ) -> impl Iterator<Item = &IndexEntry> + '_ {
        self.index
            .iter()
            .filter(move |e| e.standard == standard && e.section == section)
    }

    /// Detailed entries matching the optional filters, ordered by key.
    ///
    /// Entries with equal keys keep their source order.
    #[must_use]
    pub fn select(
        &self,
        standard: Option<Standard>,
        section: Option<Section>,
    ) -> Vec<&CatalogEntry> {
        let mut selected: Vec<_> = self
            .details
            .iter()
            .filter(|e| standard.map_or(true, |s| e.standard == s))
            .filter(|e| section.map_or(true, |s| e.section == s))
            .collect();
        selected.sort_by_key(|e| e.key());
        selected
    }

    /// Check if the catalog has no entries on either side.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty() && self.details.is_empty()
    }
}

/// Normalize a feature name for display and cross-referencing.
///
/// Drops backticks and bold markers and collapses whitespace, so
/// `` `std::optional` `` and `std::optional` compare equal.
#[must_use]
pub fn normalize_name(raw: &str) -> String {
    raw.replace('`', "")
        .replace("**", "")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Turn a feature name into an HTML anchor (`std::unique_ptr` →
/// `std-unique-ptr`).
#[must_use]
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    if slug.is_empty() {
        slug.push_str("entry");
    }
    slug
}
