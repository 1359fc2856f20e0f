//! Section tree assembly.
//!
//! Every directive map with a non-empty `@sec` becomes a [`Section`]. Sections
//! are attached under the section whose path is their dotted parent path,
//! provided that parent appeared earlier in the file. Otherwise they become
//! roots. Siblings are ordered by `(order, path)`.

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::directive::{DEF, DOC, DirectiveMap, ORD, SEC};

/// Index of a section within its [`SectionTree`].
pub type SectionId = usize;

/// One node of the output document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    /// Dot-separated path, used as the link reference name.
    pub path: String,
    /// Sibling order, ascending. Defaults to 0.
    pub order: i64,
    /// Heading text.
    pub heading: String,
    /// Verbatim `@def` content, empty when absent.
    pub definition: String,
    /// Verbatim `@doc` content, empty when absent.
    pub document: String,
    children: Vec<SectionId>,
}

impl Section {
    /// Build a section from a directive map.
    ///
    /// Returns `None` when the map has no `@sec` or its path is empty.
    #[must_use]
    pub fn from_directives(map: &DirectiveMap) -> Option<Self> {
        let sec = map.get(SEC).filter(|s| !s.is_empty())?;
        let (path, heading) = parse_heading(first_line(sec));
        if path.is_empty() {
            return None;
        }
        Some(Self {
            path: path.to_owned(),
            order: map.get(ORD).map_or(0, parse_order),
            heading: heading.to_owned(),
            definition: map.get(DEF).unwrap_or_default().to_owned(),
            document: map.get(DOC).unwrap_or_default().to_owned(),
            children: Vec::new(),
        })
    }

    /// Path of the would-be parent, or `None` for single-component paths.
    #[must_use]
    pub fn parent_path(&self) -> Option<&str> {
        self.path.rsplit_once('.').map(|(parent, _)| parent)
    }

    /// Child ids in sorted order.
    #[must_use]
    pub fn children(&self) -> &[SectionId] {
        &self.children
    }

    fn cmp_key(&self, other: &Self) -> Ordering {
        self.order
            .cmp(&other.order)
            .then_with(|| self.path.cmp(&other.path))
    }
}

/// Split a `@sec` line into `(path, heading)`.
///
/// `Heading text {Some.path}` yields a separate path; otherwise the trimmed
/// text serves as both. The path is taken from the last `{` up to the next
/// `}`; anything after that `}` is ignored.
#[must_use]
pub fn parse_heading(sec: &str) -> (&str, &str) {
    let sec = sec.trim();
    if let Some(open) = sec.rfind('{')
        && let Some(len) = sec[open + 1..].find('}')
    {
        let path = &sec[open + 1..open + 1 + len];
        return (path, sec[..open].trim());
    }
    (sec, sec)
}

fn first_line(s: &str) -> &str {
    s.split_once('\n').map_or(s, |(line, _)| line)
}

fn parse_order(ord: &str) -> i64 {
    first_line(ord.trim()).parse().unwrap_or(0)
}

/// Sections of one file arranged as an ordered forest.
#[derive(Debug, Clone, Default)]
pub struct SectionTree {
    nodes: Vec<Section>,
    roots: Vec<SectionId>,
}

impl SectionTree {
    /// Assemble the tree from directive maps in document order.
    ///
    /// Parent lookup uses the path index as built so far, so a section only
    /// nests under a parent that precedes it. When a path repeats, the index
    /// points at the latest section; earlier ones stay where they were attached.
    #[must_use]
    pub fn build(maps: &[DirectiveMap]) -> Self {
        let mut tree = Self::default();
        let mut index: HashMap<String, SectionId> = HashMap::new();
        let mut dropped = 0usize;

        for map in maps {
            let Some(section) = Section::from_directives(map) else {
                if map.get(SEC).is_some_and(|s| !s.is_empty()) {
                    dropped += 1;
                }
                continue;
            };
            let id = tree.nodes.len();
            let parent = section
                .parent_path()
                .and_then(|parent| index.get(parent).copied());
            index.insert(section.path.clone(), id);
            tree.nodes.push(section);
            match parent {
                Some(parent) => tree.nodes[parent].children.push(id),
                None => tree.roots.push(id),
            }
        }

        tree.sort();
        tracing::debug!(
            sections = tree.nodes.len(),
            roots = tree.roots.len(),
            dropped,
            "Assembled section tree"
        );
        tree
    }

    /// Stable-sort every child list and the root list by `(order, path)`.
    fn sort(&mut self) {
        let nodes = &self.nodes;
        let by_key = |a: &SectionId, b: &SectionId| nodes[*a].cmp_key(&nodes[*b]);

        let child_lists: Vec<Vec<SectionId>> = nodes
            .iter()
            .map(|section| {
                let mut children = section.children.clone();
                children.sort_by(by_key);
                children
            })
            .collect();
        self.roots.sort_by(by_key);

        for (section, children) in self.nodes.iter_mut().zip(child_lists) {
            section.children = children;
        }
    }

    /// Top-level section ids in sorted order.
    #[must_use]
    pub fn roots(&self) -> &[SectionId] {
        &self.roots
    }

    #[must_use]
    pub fn get(&self, id: SectionId) -> Option<&Section> {
        self.nodes.get(id)
    }

    /// Number of sections, attached anywhere in the tree.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Depth-first pre-order traversal in sorted order.
    #[must_use]
    pub fn walk(&self) -> Walk<'_> {
        Walk {
            tree: self,
            stack: self
                .roots
                .iter()
                .enumerate()
                .rev()
                .map(|(position, &id)| (id, 0, position))
                .collect(),
        }
    }
}

/// A section visited by [`SectionTree::walk`].
#[derive(Debug, Clone, Copy)]
pub struct WalkEntry<'a> {
    /// The visited section.
    pub section: &'a Section,
    /// Nesting depth, 0 for roots.
    pub depth: usize,
    /// Position among its siblings, 0-based.
    pub position: usize,
}

/// Iterator returned by [`SectionTree::walk`].
pub struct Walk<'a> {
    tree: &'a SectionTree,
    stack: Vec<(SectionId, usize, usize)>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = WalkEntry<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let (id, depth, position) = self.stack.pop()?;
        let section = &self.tree.nodes[id];
        self.stack.extend(
            section
                .children
                .iter()
                .enumerate()
                .rev()
                .map(|(position, &child)| (child, depth + 1, position)),
        );
        Some(WalkEntry {
            section,
            depth,
            position,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(groups: &[&str]) -> SectionTree {
        let maps: Vec<_> = groups.iter().map(|g| DirectiveMap::parse(g)).collect();
        SectionTree::build(&maps)
    }

    fn outline(tree: &SectionTree) -> Vec<(usize, String)> {
        tree.walk()
            .map(|e| (e.depth, e.section.path.clone()))
            .collect()
    }

    #[test]
    fn test_parse_heading_plain() {
        assert_eq!(parse_heading("  Foo.Bar  "), ("Foo.Bar", "Foo.Bar"));
    }

    #[test]
    fn test_parse_heading_with_path() {
        assert_eq!(
            parse_heading("Description of Foo.Bar {Foo.Bar}"),
            ("Foo.Bar", "Description of Foo.Bar")
        );
    }

    #[test]
    fn test_parse_heading_uses_last_brace() {
        assert_eq!(
            parse_heading("Table {a} literal {T.x}"),
            ("T.x", "Table {a} literal")
        );
    }

    #[test]
    fn test_parse_heading_unclosed_brace() {
        assert_eq!(parse_heading("Odd {thing"), ("Odd {thing", "Odd {thing"));
    }

    #[test]
    fn test_parse_heading_empty_path() {
        assert_eq!(parse_heading("Heading {}"), ("", "Heading"));
    }

    #[test]
    fn test_section_from_directives() {
        let map = DirectiveMap::parse("@sec: Foo\n@ord: -3\n@def: type Foo\n@doc: About foo.");
        let section = Section::from_directives(&map).unwrap();
        assert_eq!(section.path, "Foo");
        assert_eq!(section.heading, "Foo");
        assert_eq!(section.order, -3);
        assert_eq!(section.definition, "type Foo");
        assert_eq!(section.document, "About foo.");
    }

    #[test]
    fn test_section_uses_first_line_of_sec_and_ord() {
        let map = DirectiveMap::parse("@sec: Foo\n@sec: Bar\n@ord: 4\n@ord: 9");
        let section = Section::from_directives(&map).unwrap();
        assert_eq!(section.path, "Foo");
        assert_eq!(section.order, 4);
    }

    #[test]
    fn test_section_bad_order_defaults_to_zero() {
        let map = DirectiveMap::parse("@sec: Foo\n@ord: first");
        assert_eq!(Section::from_directives(&map).unwrap().order, 0);

        let map = DirectiveMap::parse("@sec: Foo\n@ord: +7");
        assert_eq!(Section::from_directives(&map).unwrap().order, 7);
    }

    #[test]
    fn test_section_requires_sec() {
        assert!(Section::from_directives(&DirectiveMap::parse("Only docs.")).is_none());
        assert!(Section::from_directives(&DirectiveMap::parse("@sec:")).is_none());
        assert!(Section::from_directives(&DirectiveMap::parse("@sec: Name {}")).is_none());
    }

    #[test]
    fn test_parent_path() {
        let map = DirectiveMap::parse("@sec: A.B.C");
        let section = Section::from_directives(&map).unwrap();
        assert_eq!(section.parent_path(), Some("A.B"));

        let map = DirectiveMap::parse("@sec: A");
        assert_eq!(Section::from_directives(&map).unwrap().parent_path(), None);
    }

    #[test]
    fn test_child_after_parent_nests() {
        let tree = build(&["@sec: A", "@sec: A.B", "@sec: A.C"]);
        assert_eq!(
            outline(&tree),
            vec![
                (0, "A".to_owned()),
                (1, "A.B".to_owned()),
                (1, "A.C".to_owned())
            ]
        );
    }

    #[test]
    fn test_child_before_parent_stays_at_root() {
        let tree = build(&["@sec: A.B", "@sec: A", "@sec: A.C"]);
        assert_eq!(
            outline(&tree),
            vec![
                (0, "A".to_owned()),
                (1, "A.C".to_owned()),
                (0, "A.B".to_owned())
            ]
        );
    }

    #[test]
    fn test_missing_intermediate_parent_goes_to_root() {
        let tree = build(&["@sec: A", "@sec: A.B.C"]);
        assert_eq!(tree.roots().len(), 2);
    }

    #[test]
    fn test_sibling_ordering() {
        let tree = build(&[
            "@sec: Z\n@ord: 5",
            "@sec: B",
            "@sec: Y\n@ord: -1",
            "@sec: A",
        ]);
        let paths: Vec<_> = tree.walk().map(|e| e.section.path.as_str()).collect();
        assert_eq!(paths, vec!["Y", "A", "B", "Z"]);
    }

    #[test]
    fn test_children_sorted_independently() {
        let tree = build(&[
            "@sec: M",
            "@sec: M.z\n@ord: -1",
            "@sec: M.b",
            "@sec: M.a",
        ]);
        let root = tree.get(tree.roots()[0]).unwrap();
        let children: Vec<_> = root
            .children()
            .iter()
            .map(|&id| tree.get(id).unwrap().path.as_str())
            .collect();
        assert_eq!(children, vec!["M.z", "M.a", "M.b"]);
    }

    #[test]
    fn test_duplicate_path_latest_wins_for_new_children() {
        let tree = build(&[
            "@sec: A\n@doc: first",
            "@sec: A.x",
            "@sec: A\n@doc: second",
            "@sec: A.y",
        ]);
        assert_eq!(tree.len(), 4);
        assert_eq!(tree.roots().len(), 2);
        let docs: Vec<_> = tree
            .walk()
            .map(|e| (e.depth, e.section.path.as_str(), e.section.document.as_str()))
            .collect();
        assert_eq!(
            docs,
            vec![
                (0, "A", "first"),
                (1, "A.x", ""),
                (0, "A", "second"),
                (1, "A.y", ""),
            ]
        );
    }

    #[test]
    fn test_groups_without_sec_are_ignored() {
        let tree = build(&["just a comment", "@doc: no section", "@sec: Real"]);
        assert_eq!(tree.len(), 1);
        assert!(!tree.is_empty());
    }

    #[test]
    fn test_walk_positions() {
        let tree = build(&["@sec: A", "@sec: B", "@sec: B.x", "@sec: B.y"]);
        let positions: Vec<_> = tree.walk().map(|e| (e.depth, e.position)).collect();
        assert_eq!(positions, vec![(0, 0), (0, 1), (1, 0), (1, 1)]);
    }

    #[test]
    fn test_every_section_has_path() {
        let tree = build(&["@sec: {}", "@sec: a {b}", "@sec:   ", "@sec: c"]);
        assert!(tree.walk().all(|e| !e.section.path.is_empty()));
        assert_eq!(tree.len(), 2);
    }

    #[test]
    fn test_sort_is_idempotent() {
        let mut tree = build(&["@sec: b", "@sec: a\n@ord: 1", "@sec: c\n@ord: -1"]);
        let first = outline(&tree);
        tree.sort();
        assert_eq!(outline(&tree), first);
    }

    #[test]
    fn test_empty_tree() {
        let tree = build(&[]);
        assert!(tree.is_empty());
        assert_eq!(tree.walk().count(), 0);
    }
}
