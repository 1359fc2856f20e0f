//! Markdown output for a section tree.
//!
//! Each section becomes a heading whose level is its depth, followed by a
//! link reference definition named after the section path, so other text can
//! link to it as `[text][Some.path]`:
//!
//! ~~~text
//! ## Foo.bar
//! [Foo.bar]: #user-content-foobar
//! ```
//! function Foo.bar(x)
//! ```
//!
//! Returns x.
//! ~~~

use crate::section::{Section, SectionTree};

/// Options for rendering a section tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    /// Emit a table of contents after the first top-level section.
    pub toc: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self { toc: true }
    }
}

/// Prefix GitHub adds to heading ids in rendered Markdown.
const ANCHOR_PREFIX: &str = "#user-content-";

/// Render the tree as Markdown.
///
/// Returns an empty string for an empty tree.
#[must_use]
pub fn render_sections(tree: &SectionTree, options: &RenderOptions) -> String {
    let mut out = String::new();
    for (i, entry) in tree.walk().enumerate() {
        write_section(&mut out, entry.section, entry.depth + 1);
        if i == 0 && options.toc {
            write_toc(&mut out, tree);
        }
    }
    out
}

fn write_section(out: &mut String, section: &Section, level: usize) {
    out.push_str(&"#".repeat(level));
    out.push(' ');
    out.push_str(&section.heading);
    out.push('\n');

    out.push('[');
    out.push_str(&section.path);
    out.push_str("]: ");
    out.push_str(ANCHOR_PREFIX);
    out.push_str(&anchor_name(&section.heading));
    out.push('\n');

    if !section.definition.is_empty() {
        out.push_str("```\n");
        out.push_str(section.definition.trim());
        out.push_str("\n```\n");
    }
    out.push('\n');

    let document = section.document.trim();
    if !document.is_empty() {
        out.push_str(document);
        out.push_str("\n\n");
    }
}

fn write_toc(out: &mut String, tree: &SectionTree) {
    out.push_str("<table>\n");
    out.push_str("<thead><tr><th>Table of Contents</th></tr></thead>\n");
    out.push_str("<tbody><tr><td>\n\n");
    for entry in tree.walk() {
        out.push_str(&"\t".repeat(entry.depth));
        out.push_str(&(entry.position + 1).to_string());
        out.push_str(". [");
        out.push_str(&entry.section.heading);
        out.push_str("][");
        out.push_str(&entry.section.path);
        out.push_str("]\n");
    }
    out.push_str("\n</td></tr></tbody>\n");
    out.push_str("</table>\n\n");
}

/// Heading anchor as generated for rendered Markdown.
///
/// Lower-cases the heading, turns spaces into dashes, and drops every
/// character that is not a letter, digit, underscore or dash.
///
/// ```
/// use qdoc_core::anchor_name;
///
/// assert_eq!(anchor_name("Foo.bar(x, y)"), "foobarx-y");
/// assert_eq!(anchor_name("Table of Contents"), "table-of-contents");
/// ```
#[must_use]
pub fn anchor_name(heading: &str) -> String {
    heading
        .to_lowercase()
        .chars()
        .filter_map(|c| match c {
            ' ' | '-' => Some('-'),
            c if c.is_alphanumeric() || c == '_' => Some(c),
            _ => None,
        })
        .collect()
}
