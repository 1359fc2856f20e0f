//! Comment extraction from Lua-style source text.
//!
//! The scanner makes a single forward pass over the source and collects
//! comment groups. It understands just enough of the lexical structure to
//! keep comment markers inside string literals from being mistaken for
//! comments:
//!
//! - `--` line comments, merged into one group while adjacent
//! - `--[==[ ... ]==]` long comments, always a group of their own
//! - `[==[ ... ]==]` long strings, skipped
//! - `"..."` and `'...'` quoted strings, skipped
//!
//! Everything else is passed over. Unterminated constructs end at end of input.

/// How a comment group was written in the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupKind {
    /// One or more adjacent `--` line comments.
    Line,
    /// The body of a single long-bracket comment.
    Block,
}

/// A unit of comment text handed to the directive splitter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentGroup {
    /// Comment syntax that produced the group.
    pub kind: GroupKind,
    /// Raw fragments in source order: one per line comment, or a single block body.
    pub fragments: Vec<String>,
}

impl CommentGroup {
    fn line(text: &str) -> Self {
        Self {
            kind: GroupKind::Line,
            fragments: vec![text.to_owned()],
        }
    }

    fn block(body: String) -> Self {
        Self {
            kind: GroupKind::Block,
            fragments: vec![body],
        }
    }

    /// Raw group text: fragments joined with newlines.
    #[must_use]
    pub fn text(&self) -> String {
        self.fragments.join("\n")
    }
}

/// Extract comment groups from source text, in source order.
#[must_use]
pub fn scan_comments(source: &str) -> Vec<CommentGroup> {
    let mut scanner = Scanner::new(source);
    scanner.run();
    tracing::debug!(groups = scanner.groups.len(), "Scanned comment groups");
    scanner.groups
}

/// Read position over an immutable source buffer.
///
/// Supports peeking at the next character and pushing back the character
/// that was just read. Only one character of pushback is ever needed.
struct Cursor<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(src: &'a str) -> Self {
        Self { src, pos: 0 }
    }

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    /// Consume the next character if it equals `expected`.
    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos += expected.len_utf8();
            true
        } else {
            false
        }
    }

    /// Undo the last `advance` or successful `eat`, which returned `c`.
    fn putback(&mut self, c: char) {
        debug_assert!(self.src[..self.pos].ends_with(c));
        self.pos -= c.len_utf8();
    }

    /// Consume through the end of the current line.
    ///
    /// Returns the line without its terminating newline.
    fn rest_of_line(&mut self) -> &'a str {
        let rest = &self.src[self.pos..];
        match rest.find('\n') {
            Some(end) => {
                self.pos += end + 1;
                &rest[..end]
            }
            None => {
                self.pos = self.src.len();
                rest
            }
        }
    }
}

struct Scanner<'a> {
    cursor: Cursor<'a>,
    groups: Vec<CommentGroup>,
    /// True while only inert whitespace follows the last line comment.
    adjacent: bool,
}

impl<'a> Scanner<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            cursor: Cursor::new(source),
            groups: Vec::new(),
            adjacent: false,
        }
    }

    fn run(&mut self) {
        while let Some(c) = self.cursor.advance() {
            match c {
                '-' if self.cursor.eat('-') => {
                    self.comment();
                    self.adjacent = true;
                    continue;
                }
                '[' => {
                    if let Some(level) = self.long_bracket_level() {
                        // Long string: scanned for its closer, content dropped.
                        self.long_bracket_body(level);
                    }
                }
                '"' | '\'' => self.quoted_string(c),
                _ => {}
            }
            if !c.is_whitespace() || c == '\n' {
                self.adjacent = false;
            }
        }
    }

    /// Scan a comment whose `--` has been consumed.
    fn comment(&mut self) {
        if self.cursor.eat('[') {
            if let Some(level) = self.long_bracket_level() {
                let body = self.long_bracket_body(level);
                self.groups.push(CommentGroup::block(body));
                return;
            }
            self.cursor.putback('[');
        }

        let line = self.cursor.rest_of_line();
        let line = line.strip_prefix(' ').unwrap_or(line);
        match self.groups.last_mut() {
            Some(group) if self.adjacent && group.kind == GroupKind::Line => {
                group.fragments.push(line.to_owned());
            }
            _ => self.groups.push(CommentGroup::line(line)),
        }
    }

    /// Complete a long-bracket opener whose first `[` has been consumed.
    ///
    /// Returns the bracket level (number of `=`). On failure the cursor is
    /// left where it was.
    fn long_bracket_level(&mut self) -> Option<usize> {
        let start = self.cursor.pos;
        let mut level = 0;
        while self.cursor.eat('=') {
            level += 1;
        }
        if self.cursor.eat('[') {
            Some(level)
        } else {
            self.cursor.pos = start;
            None
        }
    }

    /// Read a long-bracket body up to the closer of the given level.
    ///
    /// A newline directly after the opener is dropped. Closers of any other
    /// level are kept as literal text.
    fn long_bracket_body(&mut self, level: usize) -> String {
        self.cursor.eat('\n');
        let mut body = String::new();
        while let Some(c) = self.cursor.advance() {
            if c != ']' {
                body.push(c);
                continue;
            }
            let mut equals = 0;
            while self.cursor.eat('=') {
                equals += 1;
            }
            if equals == level && self.cursor.eat(']') {
                return body;
            }
            // Not a closer. The following `]`, if any, is re-examined on the
            // next iteration.
            body.push(']');
            body.extend(std::iter::repeat_n('=', equals));
        }
        body
    }

    /// Skip a quoted string whose opening quote has been consumed.
    fn quoted_string(&mut self, quote: char) {
        while let Some(c) = self.cursor.advance() {
            match c {
                '\\' => {
                    let escaped = self
                        .cursor
                        .peek()
                        .is_some_and(|next| next == '\\' || next == '\n' || next == quote);
                    if escaped {
                        self.cursor.advance();
                    }
                }
                '\n' => return,
                c if c == quote => return,
                _ => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(source: &str) -> Vec<String> {
        scan_comments(source).iter().map(CommentGroup::text).collect()
    }

    #[test]
    fn test_no_comments() {
        assert!(scan_comments("local x = 1\nreturn x\n").is_empty());
        assert!(scan_comments("").is_empty());
    }

    #[test]
    fn test_single_line_comment() {
        let groups = scan_comments("-- hello\n");
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].kind, GroupKind::Line);
        assert_eq!(groups[0].fragments, vec!["hello"]);
    }

    #[test]
    fn test_line_comment_strips_only_one_space() {
        assert_eq!(texts("--   indented\n"), vec!["  indented"]);
        assert_eq!(texts("--tight\n"), vec!["tight"]);
    }

    #[test]
    fn test_line_comment_at_end_of_input() {
        assert_eq!(texts("x = 1 -- trailing"), vec!["trailing"]);
    }

    #[test]
    fn test_adjacent_line_comments_merge() {
        let groups = scan_comments("-- one\n-- two\n    -- three\n");
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].text(), "one\ntwo\nthree");
    }

    #[test]
    fn test_code_between_line_comments_splits() {
        assert_eq!(texts("-- one\nx = 1\n-- two\n"), vec!["one", "two"]);
    }

    #[test]
    fn test_blank_line_between_line_comments_splits() {
        assert_eq!(texts("-- one\n\n-- two\n"), vec!["one", "two"]);
    }

    #[test]
    fn test_trailing_comment_merges_with_following_line() {
        assert_eq!(texts("x = 1 -- one\n-- two\n"), vec!["one\ntwo"]);
    }

    #[test]
    fn test_long_comment() {
        let groups = scan_comments("--[[\nfirst\nsecond\n]]\n");
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].kind, GroupKind::Block);
        assert_eq!(groups[0].text(), "first\nsecond\n");
    }

    #[test]
    fn test_long_comment_keeps_mismatched_closers() {
        assert_eq!(
            texts("--[==[ text with ]=] inside ]==]"),
            vec![" text with ]=] inside "]
        );
    }

    #[test]
    fn test_long_comment_closer_after_mismatched_run() {
        assert_eq!(texts("--[[a]=]]"), vec!["a]="]);
        assert_eq!(texts("--[=[a]]]=]"), vec!["a]]"]);
    }

    #[test]
    fn test_long_comment_equal_run_without_bracket() {
        assert_eq!(texts("--[=[a]=b]=]"), vec!["a]=b"]);
    }

    #[test]
    fn test_long_comment_never_merges() {
        let groups = scan_comments("-- line\n--[[block]]\n-- after\n");
        let kinds: Vec<_> = groups.iter().map(|g| g.kind).collect();
        assert_eq!(
            kinds,
            vec![GroupKind::Line, GroupKind::Block, GroupKind::Line]
        );
    }

    #[test]
    fn test_unterminated_long_comment_runs_to_end() {
        assert_eq!(texts("--[[\nopen body ]="), vec!["open body ]="]);
    }

    #[test]
    fn test_incomplete_long_opener_is_line_comment() {
        assert_eq!(texts("--[= not long\n"), vec!["[= not long"]);
        assert_eq!(texts("--[x\n"), vec!["[x"]);
    }

    #[test]
    fn test_long_string_is_skipped() {
        let source = "s = [==[\n-- not a comment ]] still ]==]\n-- real\n";
        assert_eq!(texts(source), vec!["real"]);
    }

    #[test]
    fn test_comment_marker_in_string() {
        assert!(scan_comments("x = \"a -- b\"\n").is_empty());
        assert!(scan_comments("x = 'a -- b'\n").is_empty());
    }

    #[test]
    fn test_escaped_quote_in_string() {
        assert!(scan_comments(r#"x = "say \"--\" now""#).is_empty());
        assert_eq!(texts("x = 'it\\'s' -- done\n"), vec!["done"]);
    }

    #[test]
    fn test_escaped_backslash_ends_string() {
        assert_eq!(texts("x = \"\\\\\" -- after\n"), vec!["after"]);
    }

    #[test]
    fn test_unescaped_newline_ends_string() {
        assert_eq!(texts("x = \"open\n-- comment\n"), vec!["comment"]);
    }

    #[test]
    fn test_escaped_newline_continues_string() {
        assert!(scan_comments("x = \"a\\\n-- still string\"\n").is_empty());
    }

    #[test]
    fn test_other_quote_inside_string() {
        assert!(scan_comments("x = \"it's -- fine\"\n").is_empty());
    }

    #[test]
    fn test_single_dash_is_not_comment() {
        assert!(scan_comments("x = a - b\n").is_empty());
    }

    #[test]
    fn test_multibyte_text() {
        assert_eq!(texts("-- héllo wörld\n"), vec!["héllo wörld"]);
    }

    #[test]
    fn test_cursor_putback() {
        let mut cursor = Cursor::new("ab");
        assert_eq!(cursor.advance(), Some('a'));
        cursor.putback('a');
        assert_eq!(cursor.peek(), Some('a'));
        assert!(cursor.eat('a'));
        assert!(!cursor.eat('x'));
        assert_eq!(cursor.rest_of_line(), "b");
        assert_eq!(cursor.advance(), None);
    }
}
