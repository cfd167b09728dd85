//! Parsing of per-standard detail documents.
//!
//! A detail document is split into heading blocks. A block that carries
//! labelled fields (`Explanation`, `Real-World Scenario`, ...) is an entry;
//! a block without fields that encloses deeper headings is a category.

use std::path::Path;

use tracing::trace;

use super::markdown::{self, Field, LineKind, ScannedLine};
use super::{MalformedEntry, MalformedReason};
use crate::catalog::{
    normalize_name, CatalogEntry, ExampleLink, Section, Snippet, SourceRef, Standard, Status,
};

/// What a finished block turned out to be.
enum Block {
    Entry(CatalogEntry),
    Malformed(MalformedEntry),
    Category { level: usize, name: String },
    Skip,
}

#[derive(Debug, Default)]
struct FieldText<'a> {
    explanation: Vec<&'a str>,
    scenario: Vec<&'a str>,
    snippet: Vec<&'a str>,
    example: Vec<&'a str>,
    status: Vec<&'a str>,
}

impl<'a> FieldText<'a> {
    fn buf(&mut self, field: Field) -> &mut Vec<&'a str> {
        match field {
            Field::Explanation => &mut self.explanation,
            Field::Scenario => &mut self.scenario,
            Field::Snippet => &mut self.snippet,
            Field::Example => &mut self.example,
            Field::Status => &mut self.status,
        }
    }
}

#[derive(Debug)]
struct OpenFence<'a> {
    language: Option<String>,
    code: Vec<&'a str>,
    for_snippet: bool,
}

#[derive(Debug)]
struct EntryBuilder<'a> {
    level: usize,
    heading: &'a str,
    line: usize,
    category: Option<String>,
    fields: FieldText<'a>,
    current: Option<Field>,
    saw_field: bool,
    fence: Option<OpenFence<'a>>,
    snippet: Option<Snippet>,
    first_code: Option<Snippet>,
}

impl<'a> EntryBuilder<'a> {
    fn new(level: usize, heading: &'a str, line: usize, category: Option<String>) -> Self {
        Self {
            level,
            heading,
            line,
            category,
            fields: FieldText::default(),
            current: None,
            saw_field: false,
            fence: None,
            snippet: None,
            first_code: None,
        }
    }

    fn start_field(&mut self, field: Field, inline: &'a str) {
        self.current = Some(field);
        self.saw_field = true;
        if !inline.is_empty() {
            self.fields.buf(field).push(inline);
        }
    }

    fn push_text(&mut self, text: &'a str) {
        if let Some(field) = self.current {
            self.fields.buf(field).push(text.trim());
        }
    }

    fn open_fence(&mut self, info: Option<&str>) {
        self.fence = Some(OpenFence {
            language: info.map(str::to_string),
            code: Vec::new(),
            for_snippet: self.current == Some(Field::Snippet),
        });
    }

    fn push_code(&mut self, raw: &'a str) {
        if let Some(fence) = self.fence.as_mut() {
            fence.code.push(raw);
        }
    }

    fn close_fence(&mut self) {
        let Some(fence) = self.fence.take() else {
            return;
        };
        let snippet = Snippet {
            language: fence.language,
            code: fence.code.join("\n"),
        };
        if fence.for_snippet && self.snippet.is_none() {
            self.snippet = Some(snippet);
        } else if self.first_code.is_none() {
            self.first_code = Some(snippet);
        }
    }

    fn finish(
        mut self,
        path: &Path,
        standard: Standard,
        section: Section,
        next_level: Option<usize>,
    ) -> Block {
        self.close_fence();

        if !self.saw_field {
            let encloses_deeper = next_level.is_some_and(|next| next > self.level);
            if self.level <= 2 || encloses_deeper {
                let name = normalize_name(markdown::heading_name(self.heading));
                return if name.is_empty() {
                    Block::Skip
                } else {
                    Block::Category {
                        level: self.level,
                        name,
                    }
                };
            }
        }

        match self.build(path, standard, section) {
            Ok(entry) => Block::Entry(entry),
            Err(reason) => Block::Malformed(MalformedEntry {
                document: path.to_path_buf(),
                heading: self.heading.to_string(),
                line: self.line,
                reason,
            }),
        }
    }

    fn build(
        &mut self,
        path: &Path,
        standard: Standard,
        section: Section,
    ) -> Result<CatalogEntry, MalformedReason> {
        let (heading, marker) = markdown::split_status_marker(self.heading);
        let name = normalize_name(markdown::heading_name(heading));
        if name.is_empty() {
            return Err(MalformedReason::EmptyHeading);
        }

        let explanation = join(&self.fields.explanation);
        if explanation.is_empty() {
            return Err(MalformedReason::MissingField(Field::Explanation.label()));
        }
        let scenario = join(&self.fields.scenario);
        if scenario.is_empty() {
            return Err(MalformedReason::MissingField(Field::Scenario.label()));
        }

        let status_text = join(&self.fields.status);
        let status = if !status_text.is_empty() {
            status_text
                .parse::<Status>()
                .map_err(|_| MalformedReason::UnknownStatus(status_text.clone()))?
        } else if let Some(marker) = marker {
            marker
                .parse::<Status>()
                .map_err(|_| MalformedReason::UnknownStatus(marker.to_string()))?
        } else {
            Status::default_for(standard)
        };

        let example_text = join(&self.fields.example);
        let example_link = markdown::example_target(&example_text)
            .map(ExampleLink::parse)
            .transpose()
            .map_err(MalformedReason::BadExampleLink)?;

        Ok(CatalogEntry {
            standard,
            section,
            category: self.category.take(),
            name,
            status,
            explanation,
            scenario,
            snippet: self.snippet.take().or_else(|| self.first_code.take()),
            example_link,
            location: SourceRef::new(path, self.line),
        })
    }
}

fn join(lines: &[&str]) -> String {
    lines.join("\n").trim().to_string()
}

/// Parse the entries of one detail document.
///
/// Never fails: malformed blocks become diagnostics and parsing continues
/// with the next heading.
pub(crate) fn parse_detail(
    path: &Path,
    lines: &[ScannedLine<'_>],
    standard: Standard,
    section: Section,
) -> (Vec<CatalogEntry>, Vec<MalformedEntry>) {
    let mut entries = Vec::new();
    let mut diagnostics = Vec::new();
    let mut categories: Vec<(usize, String)> = Vec::new();
    let mut current: Option<EntryBuilder<'_>> = None;

    let mut settle = |block: Block, categories: &mut Vec<(usize, String)>| match block {
        Block::Entry(entry) => {
            trace!(name = %entry.name, "parsed entry");
            entries.push(entry);
        }
        Block::Malformed(diag) => diagnostics.push(diag),
        Block::Category { level, name } => categories.push((level, name)),
        Block::Skip => {}
    };

    for line in lines {
        match &line.kind {
            LineKind::Heading { level, text } => {
                if let Some(builder) = current.as_mut() {
                    if *level > builder.level {
                        if let Some(field) = Field::from_heading(text) {
                            builder.start_field(field, "");
                            continue;
                        }
                    }
                }

                if let Some(builder) = current.take() {
                    let block = builder.finish(path, standard, section, Some(*level));
                    settle(block, &mut categories);
                }
                categories.retain(|(l, _)| l < level);

                if *level > 1 {
                    let category = categories.last().map(|(_, name)| name.clone());
                    current = Some(EntryBuilder::new(*level, *text, line.number, category));
                }
            }
            LineKind::FenceOpen { info } => {
                if let Some(builder) = current.as_mut() {
                    builder.open_fence(*info);
                }
            }
            LineKind::Code => {
                if let Some(builder) = current.as_mut() {
                    builder.push_code(line.raw);
                }
            }
            LineKind::FenceClose => {
                if let Some(builder) = current.as_mut() {
                    builder.close_fence();
                }
            }
            LineKind::Text => {
                if let Some(builder) = current.as_mut() {
                    match markdown::field(line.raw) {
                        Some((field, inline)) => builder.start_field(field, inline),
                        None => builder.push_text(line.raw),
                    }
                }
            }
        }
    }

    if let Some(builder) = current.take() {
        let block = builder.finish(path, standard, section, None);
        settle(block, &mut categories);
    }

    (entries, diagnostics)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::markdown::scan;

    fn parse(doc: &str) -> (Vec<CatalogEntry>, Vec<MalformedEntry>) {
        let lines = scan(doc);
        parse_detail(
            Path::new("cpp11_stl.md"),
            &lines,
            Standard::Cpp11,
            Section::Stl,
        )
    }

    const WELL_FORMED: &str = "\
# C++11 STL Features

## Smart Pointers

### `std::unique_ptr`

**Explanation:** Exclusive ownership of a heap object.
It cannot be copied.

**Real-World Scenario:** Owning a file handle in a parser.

**Snippet:**
```cpp
#include <memory>
auto p = std::make_unique<int>(4);
```

**Example:** [unique_ptr.cpp](examples/cpp11/unique_ptr.cpp)
";

    #[test]
    fn test_parses_full_entry() {
        let (entries, diags) = parse(WELL_FORMED);
        assert!(diags.is_empty(), "{diags:?}");
        assert_eq!(entries.len(), 1);

        let entry = &entries[0];
        assert_eq!(entry.name, "std::unique_ptr");
        assert_eq!(entry.category.as_deref(), Some("Smart Pointers"));
        assert_eq!(
            entry.explanation,
            "Exclusive ownership of a heap object.\nIt cannot be copied."
        );
        assert_eq!(entry.scenario, "Owning a file handle in a parser.");
        assert_eq!(entry.status, Status::Addition);
        assert_eq!(entry.location, SourceRef::new("cpp11_stl.md", 5));

        let snippet = entry.snippet.as_ref().unwrap();
        assert_eq!(snippet.language.as_deref(), Some("cpp"));
        assert!(snippet.code.starts_with("#include <memory>"));
        assert_eq!(
            entry.example_link.as_ref().unwrap().as_str(),
            "examples/cpp11/unique_ptr.cpp"
        );
    }

    #[test]
    fn test_missing_explanation_keeps_valid_entry() {
        let doc = "\
### std::array
**Explanation:** Fixed-size array.
**Real-World Scenario:** Lookup tables.

### std::forward_list
**Real-World Scenario:** Memory-tight queues.
";
        let (entries, diags) = parse(doc);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "std::array");
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].heading, "std::forward_list");
        assert_eq!(diags[0].line, 5);
        assert_eq!(
            diags[0].reason,
            MalformedReason::MissingField("Explanation")
        );
    }

    #[test]
    fn test_collects_every_malformed_block() {
        let doc = "\
### one
**Explanation:** only this.
### two
**Real-World Scenario:** only that.
### three
**Explanation:** fine.
**Real-World Scenario:** fine.
**Status:** sideways
";
        let (entries, diags) = parse(doc);
        assert!(entries.is_empty());
        assert_eq!(diags.len(), 3);
        assert_eq!(
            diags[2].reason,
            MalformedReason::UnknownStatus("sideways".to_string())
        );
    }

    #[test]
    fn test_status_from_heading_marker() {
        let doc = "\
### std::auto_ptr (deprecated)
**Explanation:** Deprecated in C++11 in favour of unique_ptr.
**Real-World Scenario:** Legacy code.
";
        let (entries, _) = parse(doc);
        assert_eq!(entries[0].name, "std::auto_ptr");
        assert_eq!(entries[0].status, Status::Deprecated);
    }

    #[test]
    fn test_field_sub_headings() {
        let doc = "\
### std::tuple
#### Explanation
Heterogeneous fixed-size collection.
#### Real-World Scenario
Returning several values.
";
        let (entries, diags) = parse(doc);
        assert!(diags.is_empty());
        assert_eq!(entries[0].explanation, "Heterogeneous fixed-size collection.");
        assert_eq!(entries[0].scenario, "Returning several values.");
    }

    #[test]
    fn test_nested_category_headings() {
        let doc = "\
## Containers
### Sequence
#### std::array
**Explanation:** Fixed array.
**Real-World Scenario:** Tables.
## Algorithms
### std::all_of
**Explanation:** Predicate over a range.
**Real-World Scenario:** Validation.
";
        let (entries, diags) = parse(doc);
        assert!(diags.is_empty(), "{diags:?}");
        assert_eq!(entries[0].category.as_deref(), Some("Sequence"));
        assert_eq!(entries[1].category.as_deref(), Some("Algorithms"));
    }

    #[test]
    fn test_heading_like_code_is_not_split() {
        let doc = "\
### std::function
**Explanation:** Type-erased callable.
**Real-World Scenario:** Callbacks.
**Snippet:**
```cpp
# define LEGACY 1
### not a heading
```
";
        let (entries, diags) = parse(doc);
        assert!(diags.is_empty());
        assert_eq!(entries.len(), 1);
        assert!(entries[0].snippet.as_ref().unwrap().code.contains("### not a heading"));
    }

    #[test]
    fn test_bad_example_link_is_malformed() {
        let doc = "\
### std::thread
**Explanation:** Threads.
**Real-World Scenario:** Workers.
**Example:** [thread](../outside/thread.cpp)
";
        let (entries, diags) = parse(doc);
        assert!(entries.is_empty());
        assert!(matches!(diags[0].reason, MalformedReason::BadExampleLink(_)));
    }

    #[test]
    fn test_empty_heading_is_malformed() {
        let doc = "### ``\n**Explanation:** x\n**Real-World Scenario:** y\n";
        let (_, diags) = parse(doc);
        assert_eq!(diags[0].reason, MalformedReason::EmptyHeading);
    }

    #[test]
    fn test_cpp26_defaults_to_proposed() {
        let doc = "### std::inplace_vector\n**Explanation:** x\n**Real-World Scenario:** y\n";
        let lines = scan(doc);
        let (entries, _) = parse_detail(
            Path::new("cpp26_stl.md"),
            &lines,
            Standard::Cpp26,
            Section::Stl,
        );
        assert_eq!(entries[0].status, Status::Proposed);
        assert!(entries[0].snippet.is_none());
        assert!(entries[0].example_link.is_none());
    }
}
