//! Line-level Markdown scanning.
//!
//! The corpus only needs ATX headings, fenced code blocks, list items,
//! inline links and labelled fields, so documents are scanned line by line
//! rather than through a full CommonMark parser. Fence state is tracked so
//! that `#include` lines inside code are never mistaken for headings.

use std::sync::LazyLock;

use regex::Regex;

static LINK_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\[([^\]]*)\]\(\s*<?([^)\s>]*)>?(?:\s+"[^"]*")?\s*\)"#).expect("valid regex")
});

static LIST_ITEM_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(?:[-*+]|\d+[.)])\s+(.*)$").expect("valid regex"));

static FIELD_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^\s*(?:[-*+]\s+)?(?:\*\*|__)?(explanation|real[- ]world scenario|scenario|snippet|code snippet|code|example file|example|status)(?:\*\*|__)?\s*:\s*(?:\*\*|__)?\s*(.*)$",
    )
    .expect("valid regex")
});

static HEADING_NUMBER_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+(?:\.\d+)*[.)]?\s+").expect("valid regex"));

static STATUS_MARKER_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\s*[(\[](addition|evolution|proposed|deprecated)[)\]]\s*$")
        .expect("valid regex")
});

/// What a scanned line is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum LineKind<'a> {
    /// An ATX heading outside of code.
    Heading {
        /// Number of leading `#`.
        level: usize,
        /// Heading text with closing `#`s removed.
        text: &'a str,
    },
    /// The opening fence of a code block.
    FenceOpen {
        /// Info string after the fence, if any.
        info: Option<&'a str>,
    },
    /// The closing fence of a code block.
    FenceClose,
    /// A line inside a fenced code block.
    Code,
    /// Any other line.
    Text,
}

/// One line of a document with its classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ScannedLine<'a> {
    /// 1-based line number.
    pub number: usize,
    /// The line without its terminator.
    pub raw: &'a str,
    /// Classification.
    pub kind: LineKind<'a>,
}

/// A field label recognised inside an entry block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Field {
    Explanation,
    Scenario,
    Snippet,
    Example,
    Status,
}

impl Field {
    fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "explanation" => Some(Self::Explanation),
            "real-world scenario" | "real world scenario" | "scenario" => Some(Self::Scenario),
            "snippet" | "code snippet" | "code" => Some(Self::Snippet),
            "example" | "example file" => Some(Self::Example),
            "status" => Some(Self::Status),
            _ => None,
        }
    }

    /// Field introduced by a sub-heading such as `#### Explanation`.
    pub(crate) fn from_heading(text: &str) -> Option<Self> {
        Self::from_label(text.trim().trim_end_matches(':'))
    }

    /// Human-readable label, used in diagnostics.
    pub(crate) fn label(self) -> &'static str {
        match self {
            Self::Explanation => "Explanation",
            Self::Scenario => "Real-World Scenario",
            Self::Snippet => "Snippet",
            Self::Example => "Example",
            Self::Status => "Status",
        }
    }
}

/// Scan a document into classified lines.
pub(crate) fn scan(text: &str) -> Vec<ScannedLine<'_>> {
    let mut open_fence: Option<(char, usize)> = None;
    let mut lines = Vec::new();

    for (idx, raw) in text.lines().enumerate() {
        let kind = match open_fence {
            Some((marker, len)) => {
                if is_closing_fence(raw, marker, len) {
                    open_fence = None;
                    LineKind::FenceClose
                } else {
                    LineKind::Code
                }
            }
            None => {
                if let Some((marker, len, info)) = opening_fence(raw) {
                    open_fence = Some((marker, len));
                    LineKind::FenceOpen { info }
                } else if let Some((level, text)) = heading(raw) {
                    LineKind::Heading { level, text }
                } else {
                    LineKind::Text
                }
            }
        };
        lines.push(ScannedLine {
            number: idx + 1,
            raw,
            kind,
        });
    }

    lines
}

fn leading_spaces(line: &str) -> usize {
    line.len() - line.trim_start_matches(' ').len()
}

fn opening_fence(line: &str) -> Option<(char, usize, Option<&str>)> {
    if leading_spaces(line) > 3 {
        return None;
    }
    let trimmed = line.trim_start();
    let marker = trimmed.chars().next().filter(|c| *c == '`' || *c == '~')?;
    let len = trimmed.chars().take_while(|c| *c == marker).count();
    if len < 3 {
        return None;
    }
    let info = trimmed[len..].trim();
    if marker == '`' && info.contains('`') {
        return None;
    }
    let info = info.split_whitespace().next();
    Some((marker, len, info))
}

fn is_closing_fence(line: &str, marker: char, open_len: usize) -> bool {
    if leading_spaces(line) > 3 {
        return false;
    }
    let trimmed = line.trim();
    let len = trimmed.chars().take_while(|c| *c == marker).count();
    len >= open_len && trimmed.chars().all(|c| c == marker)
}

fn heading(line: &str) -> Option<(usize, &str)> {
    if leading_spaces(line) > 3 {
        return None;
    }
    let trimmed = line.trim_start();
    let level = trimmed.chars().take_while(|c| *c == '#').count();
    if level == 0 || level > 6 {
        return None;
    }
    let rest = &trimmed[level..];
    if !rest.is_empty() && !rest.starts_with([' ', '\t']) {
        return None;
    }
    let text = rest.trim();
    let stripped = text.trim_end_matches('#');
    // A closing sequence only counts when preceded by whitespace (`C#` stays).
    let text = if stripped.is_empty() {
        stripped
    } else if stripped.len() < text.len() && stripped.ends_with([' ', '\t']) {
        stripped.trim_end()
    } else {
        text
    };
    Some((level, text))
}

/// Split a labelled field line into its field and the inline remainder.
pub(crate) fn field(line: &str) -> Option<(Field, &str)> {
    let caps = FIELD_PATTERN.captures(line)?;
    let field = Field::from_label(caps.get(1)?.as_str())?;
    let rest = caps.get(2).map_or("", |m| m.as_str());
    Some((field, rest.trim()))
}

/// Text of a list item, or `None` if the line is not a list item.
pub(crate) fn list_item(line: &str) -> Option<&str> {
    LIST_ITEM_PATTERN
        .captures(line)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
}

/// First inline link in `text` as `(label, target)`.
pub(crate) fn first_link(text: &str) -> Option<(&str, &str)> {
    let caps = LINK_PATTERN.captures(text)?;
    Some((caps.get(1)?.as_str(), caps.get(2)?.as_str()))
}

/// Extract the feature name from a master-index list item.
///
/// Uses the link label or leading code span when present, otherwise the
/// text up to a ` - `, ` – `, ` — ` or `: ` description separator.
pub(crate) fn item_name(item: &str) -> &str {
    let item = item.trim();
    if item.starts_with('[') {
        if let Some((label, _)) = first_link(item) {
            return label;
        }
    }
    if let Some(rest) = item.strip_prefix('`') {
        if let Some(end) = rest.find('`') {
            return &rest[..end];
        }
    }
    [" - ", " – ", " — ", ": "]
        .iter()
        .filter_map(|sep| item.find(sep))
        .min()
        .map_or(item, |pos| &item[..pos])
}

/// Strip a trailing status marker such as `(deprecated)` from a heading.
pub(crate) fn split_status_marker(heading: &str) -> (&str, Option<&str>) {
    match STATUS_MARKER_PATTERN.captures(heading) {
        Some(caps) => {
            let whole = caps.get(0).map_or(heading.len(), |m| m.start());
            (&heading[..whole], caps.get(1).map(|m| m.as_str()))
        }
        None => (heading, None),
    }
}

/// Clean an entry heading into a display name: drop numbering and link
/// syntax, keep the label text.
pub(crate) fn heading_name(heading: &str) -> &str {
    let heading = heading.trim();
    let heading = match HEADING_NUMBER_PATTERN.find(heading) {
        Some(m) => &heading[m.end()..],
        None => heading,
    };
    if heading.starts_with('[') {
        if let Some((label, _)) = first_link(heading) {
            return label;
        }
    }
    heading
}

/// Resolve the link target of an `Example` field value.
pub(crate) fn example_target(value: &str) -> Option<&str> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    if let Some((_, target)) = first_link(value) {
        return Some(target);
    }
    let value = value.trim_matches('`').trim();
    value.split_whitespace().next()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_headings_and_fences() {
        let doc = "# Title\n\n## Group\n```cpp\n#include <vector>\n```\n### Entry ###\ntext";
        let lines = scan(doc);
        assert_eq!(
            lines[0].kind,
            LineKind::Heading {
                level: 1,
                text: "Title"
            }
        );
        assert_eq!(lines[3].kind, LineKind::FenceOpen { info: Some("cpp") });
        assert_eq!(lines[4].kind, LineKind::Code);
        assert_eq!(lines[5].kind, LineKind::FenceClose);
        assert_eq!(
            lines[6].kind,
            LineKind::Heading {
                level: 3,
                text: "Entry"
            }
        );
        assert_eq!(lines[7].kind, LineKind::Text);
        assert_eq!(lines[6].number, 7);
    }

    #[test]
    fn test_hash_without_space_is_not_heading() {
        let lines = scan("#include <map>\n#pragma once");
        assert!(lines.iter().all(|l| l.kind == LineKind::Text));
    }

    #[test]
    fn test_tilde_fence_needs_matching_close() {
        let lines = scan("~~~~\n```\n# not a heading\n~~~~");
        assert_eq!(lines[1].kind, LineKind::Code);
        assert_eq!(lines[2].kind, LineKind::Code);
        assert_eq!(lines[3].kind, LineKind::FenceClose);
    }

    #[test]
    fn test_field_label_forms() {
        assert_eq!(
            field("**Explanation:** Deduces types."),
            Some((Field::Explanation, "Deduces types."))
        );
        assert_eq!(
            field("**Real-World Scenario**: Iterating maps."),
            Some((Field::Scenario, "Iterating maps."))
        );
        assert_eq!(
            field("- **Example:** [auto.cpp](examples/auto.cpp)"),
            Some((Field::Example, "[auto.cpp](examples/auto.cpp)"))
        );
        assert_eq!(field("Snippet:"), Some((Field::Snippet, "")));
        assert_eq!(field("status: Deprecated"), Some((Field::Status, "Deprecated")));
        assert_eq!(field("Just prose."), None);
    }

    #[test]
    fn test_item_name() {
        assert_eq!(item_name("[auto](cpp11_core_language.md#auto)"), "auto");
        assert_eq!(item_name("`std::optional` - maybe a value"), "std::optional");
        assert_eq!(item_name("Lambdas – anonymous functions"), "Lambdas");
        assert_eq!(item_name("std::move: casts to rvalue"), "std::move");
        assert_eq!(item_name("std::array"), "std::array");
    }

    #[test]
    fn test_heading_name_and_status_marker() {
        assert_eq!(heading_name("3. `constexpr`"), "`constexpr`");
        assert_eq!(heading_name("[auto](#auto)"), "auto");
        assert_eq!(
            split_status_marker("std::auto_ptr (Deprecated)"),
            ("std::auto_ptr", Some("Deprecated"))
        );
        assert_eq!(split_status_marker("std::print"), ("std::print", None));
    }

    #[test]
    fn test_example_target() {
        assert_eq!(
            example_target("[see](examples/cpp11/auto.cpp)"),
            Some("examples/cpp11/auto.cpp")
        );
        assert_eq!(example_target("`auto.cpp`"), Some("auto.cpp"));
        assert_eq!(example_target("   "), None);
    }

    #[test]
    fn test_list_item() {
        assert_eq!(list_item("  - std::span"), Some("std::span"));
        assert_eq!(list_item("2. Concepts"), Some("Concepts"));
        assert_eq!(list_item("-not a list"), None);
    }
}
