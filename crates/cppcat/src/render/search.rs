//! JSON search index.

use serde::Serialize;

use crate::catalog::{Section, Standard, Status};
use crate::error::Result;

/// One searchable entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchRecord {
    /// Owning standard.
    pub standard: Standard,
    /// Owning section.
    pub section: Section,
    /// Feature name.
    pub name: String,
    /// Grouping label.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Lifecycle status.
    pub status: Status,
    /// Page path relative to the site root.
    pub page: String,
    /// Anchor of the entry on its page.
    pub anchor: String,
}

/// Serialize records in the order given.
pub(super) fn to_json(records: &[SearchRecord]) -> Result<String> {
    let mut json = serde_json::to_string_pretty(records)?;
    json.push('\n');
    Ok(json)
}
