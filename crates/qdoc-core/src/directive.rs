//! Directive splitting for comment groups.
//!
//! A group is divided into chunks by `@name` tags that start a line. Text
//! before the first tag belongs to the `doc` directive:
//!
//! ```text
//! @sec: Foo.bar
//! @def: function Foo.bar(x)
//! Returns x.
//! ```
//!
//! The tag may be followed by an optional `:`. Chunk content is trimmed, and
//! repeated directives are joined with newlines in encounter order.

use std::collections::HashMap;

/// Section heading and path.
pub const SEC: &str = "sec";
/// Sibling order.
pub const ORD: &str = "ord";
/// Type definition shown in a code fence.
pub const DEF: &str = "def";
/// Markdown body; also the name given to untagged text.
pub const DOC: &str = "doc";

/// Directive contents of one comment group, keyed by directive name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectiveMap {
    entries: HashMap<String, String>,
}

impl DirectiveMap {
    /// Split raw group text into directives.
    #[must_use]
    pub fn parse(group: &str) -> Self {
        let mut map = Self::default();
        let mut rest = group;
        loop {
            let (name, body) = split_head(rest);
            match body.find("\n@") {
                Some(boundary) => {
                    map.append(name, &body[..boundary]);
                    rest = &body[boundary + 1..];
                }
                None => {
                    map.append(name, body);
                    return map;
                }
            }
        }
    }

    /// Content of a directive, if the group contained it.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(String::as_str)
    }

    /// Iterate over `(name, content)` pairs in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn append(&mut self, name: &str, content: &str) {
        match self.entries.get_mut(name) {
            Some(existing) => {
                existing.push('\n');
                existing.push_str(content);
            }
            None => {
                self.entries.insert(name.to_owned(), content.to_owned());
            }
        }
    }
}

/// Split a chunk into its directive name and trimmed content.
fn split_head(chunk: &str) -> (&str, &str) {
    match chunk.strip_prefix('@') {
        Some(tagged) => {
            let name = identifier_prefix(tagged);
            let body = &tagged[name.len()..];
            let body = body.strip_prefix(':').unwrap_or(body);
            (name, body.trim())
        }
        None => (DOC, chunk.trim()),
    }
}

/// Longest leading `[A-Za-z_][A-Za-z0-9_]*` run, or `""`.
fn identifier_prefix(s: &str) -> &str {
    let mut bytes = s.bytes();
    match bytes.next() {
        Some(b) if b.is_ascii_alphabetic() || b == b'_' => {}
        _ => return "",
    }
    let len = 1 + bytes
        .take_while(|b| b.is_ascii_alphanumeric() || *b == b'_')
        .count();
    &s[..len]
}
