//! Consistency checking between the master index and the detail documents.
//!
//! The checker never fails and never touches the catalog. It returns a
//! [`Report`] whose findings are sorted by standard (chronologically),
//! section, name and kind, so that unchanged input always yields the same
//! report. Whether findings are fatal is the caller's decision.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use tracing::{debug, info};

use crate::catalog::{Catalog, EntryKey, Section, SourceRef, Standard, Status};

/// The kind of discrepancy a finding describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum FindingKind {
    /// Listed in the master index but not documented in a detail document.
    MissingDetail,
    /// Documented in a detail document but not listed in the master index.
    OrphanedDetail,
    /// The same (standard, section, name) appears more than once on one side.
    DuplicateEntry,
    /// A deprecated entry does not say in which standard it was deprecated.
    UndatedDeprecation,
}

impl FindingKind {
    /// Severity of findings of this kind.
    #[must_use]
    pub fn severity(self) -> Severity {
        match self {
            Self::MissingDetail | Self::OrphanedDetail | Self::DuplicateEntry => Severity::Error,
            Self::UndatedDeprecation => Severity::Warning,
        }
    }
}

impl fmt::Display for FindingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingDetail => write!(f, "MissingDetail"),
            Self::OrphanedDetail => write!(f, "OrphanedDetail"),
            Self::DuplicateEntry => write!(f, "DuplicateEntry"),
            Self::UndatedDeprecation => write!(f, "UndatedDeprecation"),
        }
    }
}

/// How serious a finding is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Advisory only.
    Warning,
    /// Breaks referential integrity.
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// One consistency-check result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    /// What is wrong.
    pub kind: FindingKind,
    /// How serious it is.
    pub severity: Severity,
    /// Standard of the affected entry.
    pub standard: Standard,
    /// Section of the affected entry.
    pub section: Section,
    /// Name of the affected entry.
    pub name: String,
    /// Every source location involved, sorted.
    pub locations: Vec<SourceRef>,
}

impl Finding {
    fn new(kind: FindingKind, key: &EntryKey, mut locations: Vec<SourceRef>) -> Self {
        locations.sort();
        Self {
            kind,
            severity: kind.severity(),
            standard: key.standard,
            section: key.section,
            name: key.name.clone(),
            locations,
        }
    }

    /// The (standard, section, name) this finding is about.
    #[must_use]
    pub fn key(&self) -> EntryKey {
        EntryKey {
            standard: self.standard,
            section: self.section,
            name: self.name.clone(),
        }
    }

    /// One-sentence description without location details.
    #[must_use]
    pub fn message(&self) -> String {
        match self.kind {
            FindingKind::MissingDetail => {
                "listed in the master index but has no detailed entry".to_string()
            }
            FindingKind::OrphanedDetail => {
                "documented but not listed in the master index".to_string()
            }
            FindingKind::DuplicateEntry => {
                format!("appears {} times", self.locations.len())
            }
            FindingKind::UndatedDeprecation => format!(
                "deprecated, but the explanation does not mention {}",
                self.standard
            ),
        }
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} {} {} '{}': {}",
            self.severity,
            self.kind,
            self.standard,
            self.section,
            self.name,
            self.message()
        )?;
        if !self.locations.is_empty() {
            let locations: Vec<String> = self.locations.iter().map(ToString::to_string).collect();
            write!(f, " ({})", locations.join(", "))?;
        }
        Ok(())
    }
}

/// Ordered list of findings from one check.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Report {
    findings: Vec<Finding>,
}

impl Report {
    /// The findings, in deterministic order.
    #[must_use]
    pub fn findings(&self) -> &[Finding] {
        &self.findings
    }

    /// Check if the report has no findings at all.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.findings.is_empty()
    }

    /// Number of error-severity findings.
    #[must_use]
    pub fn error_count(&self) -> usize {
        self.count(Severity::Error)
    }

    /// Number of warning-severity findings.
    #[must_use]
    pub fn warning_count(&self) -> usize {
        self.count(Severity::Warning)
    }

    fn count(&self, severity: Severity) -> usize {
        self.findings
            .iter()
            .filter(|f| f.severity == severity)
            .count()
    }

    /// Findings of one kind.
    pub fn of_kind(&self, kind: FindingKind) -> impl Iterator<Item = &Finding> + '_ {
        self.findings.iter().filter(move |f| f.kind == kind)
    }

    /// Findings about one (standard, section) pair.
    pub fn for_pair(
        &self,
        standard: Standard,
        section: Section,
    ) -> impl Iterator<Item = &Finding> + '_ {
        self.findings
            .iter()
            .filter(move |f| f.standard == standard && f.section == section)
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for finding in &self.findings {
            writeln!(f, "{finding}")?;
        }
        write!(
            f,
            "{} error(s), {} warning(s)",
            self.error_count(),
            self.warning_count()
        )
    }
}

fn group_locations<'a>(
    items: impl Iterator<Item = (EntryKey, &'a SourceRef)>,
) -> BTreeMap<EntryKey, Vec<SourceRef>> {
    let mut grouped: BTreeMap<EntryKey, Vec<SourceRef>> = BTreeMap::new();
    for (key, location) in items {
        grouped.entry(key).or_default().push(location.clone());
    }
    grouped
}

/// Cross-reference the master index against the detail documents.
#[must_use]
pub fn check(catalog: &Catalog) -> Report {
    let listed = group_locations(catalog.index().iter().map(|e| (e.key(), &e.location)));
    let documented = group_locations(catalog.details().iter().map(|e| (e.key(), &e.location)));

    let mut findings = Vec::new();

    for (key, locations) in &listed {
        if !documented.contains_key(key) {
            findings.push(Finding::new(
                FindingKind::MissingDetail,
                key,
                locations.clone(),
            ));
        }
        if locations.len() > 1 {
            findings.push(Finding::new(
                FindingKind::DuplicateEntry,
                key,
                locations.clone(),
            ));
        }
    }

    for (key, locations) in &documented {
        if !listed.contains_key(key) {
            findings.push(Finding::new(
                FindingKind::OrphanedDetail,
                key,
                locations.clone(),
            ));
        }
        if locations.len() > 1 {
            findings.push(Finding::new(
                FindingKind::DuplicateEntry,
                key,
                locations.clone(),
            ));
        }
    }

    for entry in catalog.details() {
        if entry.status == Status::Deprecated && !entry.mentions_own_standard() {
            debug!(name = %entry.name, standard = %entry.standard, "undated deprecation");
            findings.push(Finding::new(
                FindingKind::UndatedDeprecation,
                &entry.key(),
                vec![entry.location.clone()],
            ));
        }
    }

    findings.sort_by(|a, b| {
        (a.standard, a.section, &a.name, a.kind, &a.locations)
            .cmp(&(b.standard, b.section, &b.name, b.kind, &b.locations))
    });

    let report = Report { findings };
    info!(
        errors = report.error_count(),
        warnings = report.warning_count(),
        "consistency check complete"
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{CatalogEntry, IndexEntry};

    fn listing(standard: Standard, section: Section, name: &str, line: usize) -> IndexEntry {
        IndexEntry {
            standard,
            section,
            category: None,
            name: name.to_string(),
            location: SourceRef::new("README.md", line),
        }
    }

    fn entry(standard: Standard, section: Section, name: &str, line: usize) -> CatalogEntry {
        CatalogEntry {
            standard,
            section,
            category: None,
            name: name.to_string(),
            status: Status::Addition,
            explanation: format!("Added in {standard}."),
            scenario: "Used in production.".to_string(),
            snippet: None,
            example_link: None,
            location: SourceRef::new(format!("{}_{}.md", standard.slug(), section.slug()), line),
        }
    }

    #[test]
    fn test_consistent_catalog_is_clean() {
        let catalog = Catalog::new(
            vec![listing(Standard::Cpp11, Section::CoreLanguage, "auto", 3)],
            vec![entry(Standard::Cpp11, Section::CoreLanguage, "auto", 5)],
        );
        let report = check(&catalog);
        assert!(report.is_clean());
        assert_eq!(report.to_string(), "0 error(s), 0 warning(s)");
    }

    #[test]
    fn test_missing_detail() {
        let catalog = Catalog::new(
            vec![listing(Standard::Cpp23, Section::Stl, "std::expected", 10)],
            vec![],
        );
        let report = check(&catalog);
        assert_eq!(report.findings().len(), 1);
        let finding = &report.findings()[0];
        assert_eq!(finding.kind, FindingKind::MissingDetail);
        assert_eq!(finding.standard, Standard::Cpp23);
        assert_eq!(finding.section, Section::Stl);
        assert_eq!(finding.name, "std::expected");
        assert_eq!(finding.locations, vec![SourceRef::new("README.md", 10)]);
    }

    #[test]
    fn test_orphaned_detail() {
        let catalog = Catalog::new(
            vec![],
            vec![entry(Standard::Cpp17, Section::Stl, "std::any", 7)],
        );
        let report = check(&catalog);
        assert_eq!(report.of_kind(FindingKind::OrphanedDetail).count(), 1);
        assert_eq!(report.error_count(), 1);
    }

    #[test]
    fn test_same_name_in_other_section_does_not_match() {
        let catalog = Catalog::new(
            vec![listing(Standard::Cpp20, Section::CoreLanguage, "Ranges", 1)],
            vec![entry(Standard::Cpp20, Section::Stl, "Ranges", 1)],
        );
        let report = check(&catalog);
        let kinds: Vec<_> = report.findings().iter().map(|f| f.kind).collect();
        assert_eq!(
            kinds,
            vec![FindingKind::MissingDetail, FindingKind::OrphanedDetail]
        );
    }

    #[test]
    fn test_duplicate_in_one_document() {
        let catalog = Catalog::new(
            vec![listing(Standard::Cpp11, Section::Stl, "std::array", 2)],
            vec![
                entry(Standard::Cpp11, Section::Stl, "std::array", 9),
                entry(Standard::Cpp11, Section::Stl, "std::array", 3),
            ],
        );
        let report = check(&catalog);
        let duplicates: Vec<_> = report.of_kind(FindingKind::DuplicateEntry).collect();
        assert_eq!(duplicates.len(), 1);
        assert_eq!(
            duplicates[0].locations,
            vec![
                SourceRef::new("cpp11_stl.md", 3),
                SourceRef::new("cpp11_stl.md", 9)
            ]
        );
        assert_eq!(report.findings().len(), 1);
    }

    #[test]
    fn test_duplicate_in_master_index() {
        let catalog = Catalog::new(
            vec![
                listing(Standard::Cpp14, Section::CoreLanguage, "Generic lambdas", 4),
                listing(Standard::Cpp14, Section::CoreLanguage, "Generic lambdas", 8),
            ],
            vec![entry(
                Standard::Cpp14,
                Section::CoreLanguage,
                "Generic lambdas",
                2,
            )],
        );
        let report = check(&catalog);
        assert_eq!(report.findings().len(), 1);
        assert_eq!(report.findings()[0].kind, FindingKind::DuplicateEntry);
        assert_eq!(report.findings()[0].locations.len(), 2);
    }

    #[test]
    fn test_undated_deprecation_is_warning() {
        let mut deprecated = entry(Standard::Cpp11, Section::Stl, "std::auto_ptr", 4);
        deprecated.status = Status::Deprecated;
        deprecated.explanation = "Replaced by unique_ptr.".to_string();
        let mut dated = entry(Standard::Cpp17, Section::Stl, "std::iterator", 4);
        dated.status = Status::Deprecated;
        dated.explanation = "Deprecated in C++17.".to_string();

        let catalog = Catalog::new(
            vec![
                listing(Standard::Cpp11, Section::Stl, "std::auto_ptr", 1),
                listing(Standard::Cpp17, Section::Stl, "std::iterator", 2),
            ],
            vec![deprecated, dated],
        );
        let report = check(&catalog);
        assert_eq!(report.findings().len(), 1);
        assert_eq!(report.findings()[0].kind, FindingKind::UndatedDeprecation);
        assert_eq!(report.error_count(), 0);
        assert_eq!(report.warning_count(), 1);
    }

    #[test]
    fn test_findings_are_chronological() {
        let catalog = Catalog::new(
            vec![
                listing(Standard::Cpp26, Section::Stl, "std::hive", 1),
                listing(Standard::Cpp03, Section::CoreLanguage, "Value init", 2),
                listing(Standard::Cpp98, Section::Stl, "std::vector", 3),
                listing(Standard::Cpp11, Section::CoreLanguage, "auto", 4),
            ],
            vec![],
        );
        let report = check(&catalog);
        let order: Vec<_> = report.findings().iter().map(|f| f.standard).collect();
        assert_eq!(
            order,
            vec![
                Standard::Cpp98,
                Standard::Cpp03,
                Standard::Cpp11,
                Standard::Cpp26
            ]
        );
    }

    #[test]
    fn test_check_is_idempotent() {
        let catalog = Catalog::new(
            vec![listing(Standard::Cpp20, Section::Stl, "std::span", 1)],
            vec![
                entry(Standard::Cpp20, Section::Stl, "std::format", 1),
                entry(Standard::Cpp20, Section::Stl, "std::format", 9),
            ],
        );
        assert_eq!(check(&catalog), check(&catalog));
    }

    #[test]
    fn test_finding_display() {
        let catalog = Catalog::new(
            vec![listing(Standard::Cpp23, Section::Stl, "std::expected", 10)],
            vec![],
        );
        let report = check(&catalog);
        assert_eq!(
            report.findings()[0].to_string(),
            "error: MissingDetail C++23 STL 'std::expected': listed in the master index but has no detailed entry (README.md:10)"
        );
    }

    #[test]
    fn test_report_serializes_kind_names() {
        let catalog = Catalog::new(
            vec![listing(Standard::Cpp23, Section::Stl, "std::expected", 10)],
            vec![],
        );
        let json = serde_json::to_value(check(&catalog)).unwrap();
        let finding = &json["findings"][0];
        assert_eq!(finding["kind"], "MissingDetail");
        assert_eq!(finding["severity"], "error");
        assert_eq!(finding["standard"], "23");
        assert_eq!(finding["section"], "stl");
    }
}
