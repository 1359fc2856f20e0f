//! Documentation extraction from Lua comments.
//!
//! Source text flows through four stages:
//!
//! 1. [`scan_comments`] finds comment groups, skipping string literals.
//! 2. [`DirectiveMap::parse`] splits each group into `@sec`, `@ord`, `@def`
//!    and `@doc` chunks.
//! 3. [`SectionTree::build`] turns the `@sec` paths into an ordered tree.
//! 4. [`render_sections`] writes the tree as Markdown.
//!
//! [`render_source`] runs the whole pipeline.
//!
//! # Example
//!
//! ```
//! use qdoc_core::{RenderOptions, render_markdown};
//!
//! let source = "\
//! -- @sec: Vector
//! -- @doc: A 2D vector.
//! local Vector = {}
//! ";
//! let markdown = render_markdown(source, &RenderOptions { toc: false });
//! assert_eq!(
//!     String::from_utf8(markdown).unwrap(),
//!     "# Vector\n[Vector]: #user-content-vector\n\nA 2D vector.\n\n"
//! );
//! ```

mod directive;
mod render;
mod scanner;
mod section;

pub use directive::{DEF, DOC, DirectiveMap, ORD, SEC};
pub use render::{RenderOptions, anchor_name, render_sections};
pub use scanner::{CommentGroup, GroupKind, scan_comments};
pub use section::{Section, SectionId, SectionTree, Walk, WalkEntry, parse_heading};

/// Markdown produced from one source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    /// UTF-8 Markdown.
    pub markdown: Vec<u8>,
    /// Number of sections in the document.
    pub section_count: usize,
}

impl Rendered {
    /// True when the output holds nothing but whitespace and should not be written.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        is_blank(&self.markdown)
    }
}

/// Run the full pipeline over one source file.
#[must_use]
pub fn render_source(source: &str, options: &RenderOptions) -> Rendered {
    let maps: Vec<DirectiveMap> = scan_comments(source)
        .iter()
        .map(|group| DirectiveMap::parse(&group.text()))
        .collect();
    tracing::debug!(maps = maps.len(), "Parsed directive maps");
    let tree = SectionTree::build(&maps);
    Rendered {
        markdown: render_sections(&tree, options).into_bytes(),
        section_count: tree.len(),
    }
}

/// Render source text to Markdown bytes.
///
/// Blank output means the file documents nothing.
#[must_use]
pub fn render_markdown(source: &str, options: &RenderOptions) -> Vec<u8> {
    render_source(source, options).markdown
}

/// True when `markdown` holds nothing but whitespace.
#[must_use]
pub fn is_blank(markdown: &[u8]) -> bool {
    markdown.trim_ascii().is_empty()
}
