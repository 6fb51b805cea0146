//! Cursor over source text: literal/regex matching, non-significant-text
//! consumption, and offset -> line/column translation.
//!
//! Every operation here is infallible in the sense that failing to match
//! never panics and never advances the cursor; callers above this layer
//! turn a `None` into a `ParseError` with a message appropriate to what
//! they were trying to match.

use corvid_core::{SourceIndex, SourceLocation};
use regex::Regex;

/// Default whitespace pattern used when a `Reader` is not configured
/// with one explicitly.
pub const DEFAULT_WHITESPACE_PATTERN: &str = r"[ \t]+";

pub struct Reader<'a> {
    text: &'a str,
    cursor: usize,
    whitespace: Option<Regex>,
    comments: Option<Regex>,
    source_index: SourceIndex<'a>,
}

impl<'a> Reader<'a> {
    pub fn new(text: &'a str) -> Self {
        Self::with_patterns(text, Some(DEFAULT_WHITESPACE_PATTERN), None)
    }

    /// `whitespace_pattern` / `comments_pattern` of `none` disable that
    /// kind of non-significant text entirely.
    pub fn with_patterns(
        text: &'a str,
        whitespace_pattern: Option<&str>,
        comments_pattern: Option<&str>,
    ) -> Self {
        let whitespace = whitespace_pattern.map(compile_anchored);
        let comments = comments_pattern.map(compile_anchored);
        Self {
            text,
            cursor: 0,
            whitespace,
            comments,
            source_index: SourceIndex::new(text),
        }
    }

    pub fn text(&self) -> &'a str {
        self.text
    }

    pub fn mark(&self) -> usize {
        self.cursor
    }

    pub fn rewind(&mut self, cursor: usize) {
        self.cursor = cursor;
    }

    pub fn eof(&self) -> bool {
        self.cursor == self.text.len()
    }

    pub fn location_from_offset(&mut self, offset: usize) -> SourceLocation {
        self.source_index.location_from_offset(offset)
    }

    pub fn current_location(&mut self) -> SourceLocation {
        let offset = self.cursor;
        self.location_from_offset(offset)
    }

    /// Matches `literal` exactly at the cursor, advancing past it on
    /// success. When `match_full_token` is true and `literal` is
    /// alphanumeric, the match also requires that the following
    /// character (if any) is not alphanumeric, so `"if"` does not match
    /// a prefix of `"ifx"`.
    pub fn expect_string(&mut self, literal: &str, match_full_token: bool) -> Option<String> {
        let pos = self.mark();
        if !self.text[self.cursor..].starts_with(literal) {
            return None;
        }
        self.cursor += literal.len();

        let needs_boundary = match_full_token && is_alphanumeric_str(literal);
        if needs_boundary {
            if let Some(next) = self.text[self.cursor..].chars().next() {
                if next.is_alphanumeric() {
                    self.rewind(pos);
                    return None;
                }
            }
        }
        Some(literal.to_string())
    }

    /// Anchors `pattern` at the cursor with DOTALL+MULTILINE-equivalent
    /// semantics (`.` matches newlines, `^`/`$` match at line
    /// boundaries), advancing past the match on success.
    pub fn expect_regex(&mut self, pattern: &Regex) -> Option<String> {
        let slice = &self.text[self.cursor..];
        let m = pattern.find(slice)?;
        if m.start() != 0 {
            return None;
        }
        let matched = m.as_str().to_string();
        self.cursor += m.end();
        Some(matched)
    }

    /// Alternately consumes a comment match and a whitespace match until
    /// neither advances the cursor.
    pub fn consume_non_significant(&mut self) {
        loop {
            let before = self.cursor;
            if let Some(comments) = &self.comments {
                let comments = comments.clone();
                self.expect_regex(&comments);
            }
            if let Some(whitespace) = &self.whitespace {
                let whitespace = whitespace.clone();
                self.expect_regex(&whitespace);
            }
            if self.cursor == before {
                break;
            }
        }
    }
}

fn is_alphanumeric_str(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_alphanumeric())
}

/// Compiles `pattern` anchored at the start of whatever slice it is
/// matched against, with DOTALL+MULTILINE-equivalent flags.
pub fn compile_anchored(pattern: &str) -> Regex {
    Regex::new(&format!("(?s)(?m)\\A(?:{pattern})")).expect("invalid reader pattern")
}
