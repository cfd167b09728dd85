//! HTML templates.

use maud::{html, Markup, DOCTYPE};

use super::{ExampleView, PageSummary, RenderOptions, RenderedEntry};
use crate::catalog::{Section, Standard};

/// Stylesheet shared by every page.
pub(super) const STYLESHEET: &str = "\
body { font-family: system-ui, sans-serif; line-height: 1.5; margin: 0 auto; max-width: 52rem; padding: 1rem; }
nav { margin-bottom: 1rem; }
pre { background: #f5f5f5; overflow-x: auto; padding: 0.75rem; }
.status { border-radius: 0.25rem; font-size: 0.75rem; margin-left: 0.5rem; padding: 0.1rem 0.4rem; }
.status.addition { background: #dff5e1; }
.status.evolution { background: #e1ecff; }
.status.proposed { background: #fff4d6; }
.status.deprecated { background: #ffe0e0; }
.category { color: #555; }
.finding { border-left: 3px solid #d9822b; padding-left: 0.5rem; }
.broken { color: #a33; font-size: 0.85rem; }
.count { color: #666; font-size: 0.85rem; }
";

fn layout(title: &str, root: &str, body: &Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (title) }
                link rel="stylesheet" href={ (root) "style.css" };
            }
            body {
                (body)
            }
        }
    }
}

fn paragraphs(text: &str) -> Markup {
    html! {
        @for para in text.split("\n\n").map(str::trim).filter(|p| !p.is_empty()) {
            p { (para) }
        }
    }
}

/// The landing page: every page grouped by standard, oldest first.
pub(super) fn index_page(
    options: &RenderOptions,
    groups: &[(Standard, Vec<PageSummary>)],
    totals: (usize, usize),
) -> Markup {
    let (entries, findings) = totals;
    let body = html! {
        header {
            h1 { (options.site_title) }
            p.count {
                (entries) " documented features"
                @if options.annotate_findings && findings > 0 {
                    ", " (findings) " consistency findings"
                }
            }
        }
        @for (standard, pages) in groups {
            section.standard id=(standard.slug()) {
                h2 { (standard.to_string()) }
                ul {
                    @for page in pages {
                        li {
                            a href=(page.path) { (page.section.to_string()) }
                            " "
                            span.count {
                                (page.entries) " entries"
                                @if options.annotate_findings && page.findings > 0 {
                                    ", " (page.findings) " findings"
                                }
                            }
                        }
                    }
                }
            }
        }
    };
    layout(&options.site_title, "", &body)
}

/// One (standard, section) page listing its entries in source order.
pub(super) fn section_page(
    options: &RenderOptions,
    standard: Standard,
    section: Section,
    entries: &[RenderedEntry<'_>],
    page_notes: &[String],
) -> Markup {
    let title = format!("{standard} {section}");
    let body = html! {
        nav {
            a href="../index.html" { (options.site_title) }
        }
        h1 { (title) }
        @if !page_notes.is_empty() {
            section.findings {
                ul {
                    @for note in page_notes {
                        li.finding { (note) }
                    }
                }
            }
        }
        @if entries.is_empty() {
            p { "No detailed entries yet." }
        } @else {
            ul.toc {
                @for item in entries {
                    li { a href={ "#" (item.anchor) } { (item.entry.name) } }
                }
            }
        }
        @for (idx, item) in entries.iter().enumerate() {
            @let previous = idx.checked_sub(1).and_then(|p| entries[p].entry.category.as_ref());
            @if let Some(category) = &item.entry.category {
                @if previous != Some(category) {
                    h2.category { (category) }
                }
            }
            (entry(item))
        }
    };
    layout(&title, "../", &body)
}

fn entry(item: &RenderedEntry<'_>) -> Markup {
    let entry = item.entry;
    html! {
        article.entry id=(item.anchor) {
            h3 {
                (entry.name)
                span class={ "status " (entry.status.css_class()) } { (entry.status.to_string()) }
            }
            @for note in &item.notes {
                p.finding { (note) }
            }
            h4 { "Explanation" }
            (paragraphs(&entry.explanation))
            h4 { "Real-World Scenario" }
            (paragraphs(&entry.scenario))
            @if let Some(snippet) = &entry.snippet {
                pre {
                    code class=[snippet.language.as_ref().map(|lang| format!("language-{lang}"))] {
                        (snippet.code)
                    }
                }
            }
            @match &item.example {
                ExampleView::Linked { href, text } => {
                    p.example { "Example: " a href=(href) { (text) } }
                },
                ExampleView::Unresolved { text } => {
                    p.example {
                        "Example: " code { (text) }
                        " " span.broken { "(not yet available)" }
                    }
                },
                ExampleView::Absent => {},
            }
        }
    }
}
