//! `cppcat` - Consistency checker and static site renderer for a C++ feature
//! catalog
//!
//! The catalog is a Markdown corpus: a master index listing features per
//! standard and section, and detail documents describing each feature. The
//! pipeline is load → check → render → publish, each stage a plain function
//! over immutable data.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod catalog;
pub mod checker;
pub mod cli;
pub mod config;
pub mod error;
pub mod loader;
pub mod logging;
pub mod publish;
pub mod render;
pub mod source;

pub use catalog::{Catalog, CatalogEntry, IndexEntry, Section, Standard, Status};
pub use checker::{check, Finding, FindingKind, Report, Severity};
pub use config::Config;
pub use error::{Error, Result};
pub use loader::{load, LoadOutcome, LoaderOptions, MalformedEntry};
pub use logging::init_logging;
pub use publish::{publish, PublishSummary};
pub use render::{render, BrokenLink, FsLinkResolver, LinkResolver, RenderOptions, Site};
pub use source::{DocumentSource, FsSource, MemorySource};
