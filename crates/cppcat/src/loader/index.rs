//! Parsing of the master index document.

use std::path::Path;

use tracing::debug;

use super::markdown::{self, LineKind, ScannedLine};
use super::{MalformedEntry, MalformedReason};
use crate::catalog::{normalize_name, IndexEntry, Section, SourceRef, Standard};

/// Deepest heading level that may switch the section.
const SECTION_HEADING_MAX_LEVEL: usize = 3;

/// Parse the listings of the master index.
///
/// Headings naming a standard (`## C++17`) set the standard and reset the
/// section; headings naming a section (`### STL`) set the section. Any other
/// heading below the title is a category. List items under a known
/// (standard, section) become listings.
///
/// The standard applies until a heading at the same or a higher level that
/// names no standard (`## Contributing`). List items outside any standard
/// are skipped. A heading nested below the standard heading only switches
/// the standard when it also names a section, so `#### Deprecated since
/// C++17` stays a category.
pub(crate) fn parse_index(
    path: &Path,
    lines: &[ScannedLine<'_>],
) -> (Vec<IndexEntry>, Vec<MalformedEntry>) {
    let mut entries = Vec::new();
    let mut diagnostics = Vec::new();
    let mut standard: Option<Standard> = None;
    let mut standard_level = 0;
    let mut section: Option<Section> = None;
    let mut category: Option<String> = None;

    for line in lines {
        match &line.kind {
            LineKind::Heading { level, text } => {
                let level = *level;
                let nested = standard.is_some() && level > standard_level;
                let mentioned = Standard::detect(text);
                let shallow = level <= SECTION_HEADING_MAX_LEVEL;
                let named_section = (shallow || (mentioned.is_some() && !nested))
                    .then(|| Section::detect(text))
                    .flatten();
                let named_standard = mentioned.filter(|_| {
                    !nested || (shallow && named_section.is_some())
                });

                if named_standard.is_some() {
                    standard = named_standard;
                    standard_level = level;
                    section = named_section;
                    category = None;
                } else if named_section.is_some() && standard.is_some() {
                    section = named_section;
                    category = None;
                } else if !nested {
                    if standard.is_some() {
                        debug!(line = line.number, heading = %text, "leaving catalog listings");
                    }
                    standard = None;
                    section = None;
                    category = None;
                } else {
                    let name = normalize_name(text);
                    category = (!name.is_empty()).then_some(name);
                }
            }
            LineKind::Text => {
                let Some(item) = markdown::list_item(line.raw) else {
                    continue;
                };
                let name = normalize_name(markdown::item_name(item));
                if name.is_empty() {
                    continue;
                }
                match (standard, section) {
                    (Some(standard), Some(section)) => entries.push(IndexEntry {
                        standard,
                        section,
                        category: category.clone(),
                        name,
                        location: SourceRef::new(path, line.number),
                    }),
                    (None, _) => {
                        debug!(line = line.number, item = %name, "skipping list item outside the catalog");
                    }
                    (Some(_), None) => diagnostics.push(MalformedEntry {
                        document: path.to_path_buf(),
                        heading: name,
                        line: line.number,
                        reason: MalformedReason::OutsideSection,
                    }),
                }
            }
            LineKind::FenceOpen { .. } | LineKind::FenceClose | LineKind::Code => {}
        }
    }

    (entries, diagnostics)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::markdown::scan;

    fn parse(doc: &str) -> (Vec<IndexEntry>, Vec<MalformedEntry>) {
        let lines = scan(doc);
        parse_index(Path::new("README.md"), &lines)
    }

    const INDEX: &str = "\
# Modern C++ Features

- [C++11](#c11)
- [C++23](#c23)

## C++11

### Core Language
- `auto`
- [Lambdas](cpp11_core_language.md#lambdas) - anonymous functions

### STL
#### Smart Pointers
- std::unique_ptr

## C++23 STL
- std::expected
```cpp
- not an item
```
";

    #[test]
    fn test_parses_listings() {
        let (entries, diags) = parse(INDEX);
        assert!(diags.is_empty(), "{diags:?}");
        let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["auto", "Lambdas", "std::unique_ptr", "std::expected"]
        );

        assert_eq!(entries[0].standard, Standard::Cpp11);
        assert_eq!(entries[0].section, Section::CoreLanguage);
        assert_eq!(entries[0].location, SourceRef::new("README.md", 9));

        assert_eq!(entries[2].section, Section::Stl);
        assert_eq!(entries[2].category.as_deref(), Some("Smart Pointers"));

        assert_eq!(entries[3].standard, Standard::Cpp23);
        assert_eq!(entries[3].section, Section::Stl);
        assert!(entries[3].category.is_none());
    }

    #[test]
    fn test_item_without_section_is_malformed() {
        let doc = "## C++17\n- std::optional\n### STL\n- std::variant\n";
        let (entries, diags) = parse(doc);
        assert_eq!(entries.len(), 1);
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].heading, "std::optional");
        assert_eq!(diags[0].reason, MalformedReason::OutsideSection);
    }

    #[test]
    fn test_trailing_section_ends_listings() {
        let doc = "\
## C++11
### STL
- std::array

## Contributing
- Fork the repository
- Open a pull request
";
        let (entries, diags) = parse(doc);
        assert!(diags.is_empty(), "{diags:?}");
        let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["std::array"]);
    }

    #[test]
    fn test_title_level_heading_ends_listings() {
        let doc = "# Catalog\n## C++14\n### STL\n- std::make_unique\n# Appendix\n- notes\n";
        let (entries, _) = parse(doc);
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_nested_heading_mentioning_standard_is_category() {
        let doc = "\
## C++11
### Core Language
#### Deprecated since C++17
- `register`
### STL
- std::auto_ptr
";
        let (entries, diags) = parse(doc);
        assert!(diags.is_empty(), "{diags:?}");
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].standard, Standard::Cpp11);
        assert_eq!(entries[0].section, Section::CoreLanguage);
        assert_eq!(
            entries[0].category.as_deref(),
            Some("Deprecated since C++17")
        );
        assert_eq!(entries[1].standard, Standard::Cpp11);
        assert_eq!(entries[1].section, Section::Stl);
    }

    #[test]
    fn test_nested_heading_naming_standard_and_section_switches() {
        let doc = "## C++17\n### Core Language\n- Fold expressions\n### C++20 STL\n- std::span\n";
        let (entries, _) = parse(doc);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].standard, Standard::Cpp20);
        assert_eq!(entries[1].section, Section::Stl);
    }

    #[test]
    fn test_deep_heading_does_not_switch_section() {
        let doc = "## C++20\n### Core Language\n#### Library interaction\n- Modules\n";
        let (entries, _) = parse(doc);
        assert_eq!(entries[0].section, Section::CoreLanguage);
        assert_eq!(entries[0].category.as_deref(), Some("Library interaction"));
    }
}
