//! The base every generated parser embeds: reader, memoization cache,
//! pattern cache, and an optional rule handler.

use std::collections::HashMap;

use corvid_core::SourceLocation;
use regex::Regex;

use crate::error::{ParseError, ParseFailure, ParseResult};
use crate::memo::MemoCache;
use crate::node::{Node, RuleHandler};
use crate::reader::{compile_anchored, Reader};

/// The operations `corvid_runtime::combinators` and the rule-invocation
/// wrappers need from a generated parser. A generated parser embeds a
/// [`ParserBase`] and implements this trait by delegating to it; item
/// methods like `expect_string`/`expect_regex`/rule calls stay inherent
/// methods on the generated type since they're called directly from rule
/// bodies, not generically from combinators.
pub trait RuntimeParser {
    fn mark(&self) -> usize;
    fn rewind(&mut self, pos: usize);
    fn current_location(&mut self) -> SourceLocation;
    fn consume_non_significant(&mut self);
    fn cache(&self) -> &MemoCache;
    fn cache_mut(&mut self) -> &mut MemoCache;
    fn rule_handler(&self) -> Option<&dyn RuleHandler>;
}

pub struct ParserBase<'a> {
    reader: Reader<'a>,
    cache: MemoCache,
    rule_handler: Option<&'a dyn RuleHandler>,
    pattern_cache: HashMap<String, Regex>,
}

impl<'a> ParserBase<'a> {
    pub fn new(text: &'a str, rule_count: usize) -> Self {
        Self::with_handler(text, rule_count, None, None, None)
    }

    pub fn with_handler(
        text: &'a str,
        rule_count: usize,
        rule_handler: Option<&'a dyn RuleHandler>,
        whitespace_pattern: Option<&str>,
        comments_pattern: Option<&str>,
    ) -> Self {
        Self {
            reader: Reader::with_patterns(text, whitespace_pattern, comments_pattern),
            cache: MemoCache::new(rule_count),
            rule_handler,
            pattern_cache: HashMap::new(),
        }
    }

    fn compiled(&mut self, pattern: &str) -> &Regex {
        self.pattern_cache
            .entry(pattern.to_string())
            .or_insert_with(|| compile_anchored(pattern))
    }

    pub fn expect_string(&mut self, literal: &str, match_full_token: bool) -> ParseResult<Node> {
        match self.reader.expect_string(literal, match_full_token) {
            Some(text) => Ok(Node::Text(text)),
            None => {
                let location = self.reader.current_location();
                Err(ParseFailure::Recoverable(ParseError::new(
                    format!("expected '{literal}'"),
                    location,
                )))
            }
        }
    }

    pub fn expect_regex(&mut self, pattern: &str, description: &str) -> ParseResult<Node> {
        let compiled = self.compiled(pattern).clone();
        match self.reader.expect_regex(&compiled) {
            Some(text) => Ok(Node::Text(text)),
            None => {
                let location = self.reader.current_location();
                Err(ParseFailure::Recoverable(ParseError::new(
                    format!("expected {description}"),
                    location,
                )))
            }
        }
    }

    pub fn expect_eof(&mut self) -> ParseResult<Node> {
        if self.reader.eof() {
            Ok(Node::Absent)
        } else {
            let location = self.reader.current_location();
            Err(ParseFailure::Recoverable(ParseError::new(
                "expected end of input",
                location,
            )))
        }
    }
}

impl<'a> RuntimeParser for ParserBase<'a> {
    fn mark(&self) -> usize {
        self.reader.mark()
    }

    fn rewind(&mut self, pos: usize) {
        self.reader.rewind(pos);
    }

    fn current_location(&mut self) -> SourceLocation {
        self.reader.current_location()
    }

    fn consume_non_significant(&mut self) {
        self.reader.consume_non_significant();
    }

    fn cache(&self) -> &MemoCache {
        &self.cache
    }

    fn cache_mut(&mut self) -> &mut MemoCache {
        &mut self.cache
    }

    fn rule_handler(&self) -> Option<&dyn RuleHandler> {
        self.rule_handler
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expect_string_wraps_match_in_text_node() {
        let mut base = ParserBase::new("hello", 0);
        assert_eq!(
            base.expect_string("hello", true).unwrap(),
            Node::Text("hello".into())
        );
    }

    #[test]
    fn expect_string_failure_reports_location() {
        let mut base = ParserBase::new("goodbye", 0);
        let err = base.expect_string("hello", true).unwrap_err();
        assert_eq!(err.location().offset, 0);
    }

    #[test]
    fn expect_eof_succeeds_at_end_of_input() {
        let mut base = ParserBase::new("", 0);
        assert!(base.expect_eof().is_ok());
    }

    #[test]
    fn expect_eof_fails_mid_input() {
        let mut base = ParserBase::new("abc", 0);
        assert!(base.expect_eof().is_err());
    }

    #[test]
    fn expect_regex_caches_compiled_pattern_across_calls() {
        let mut base = ParserBase::new("123 456", 0);
        assert_eq!(
            base.expect_regex("[0-9]+", "a number").unwrap(),
            Node::Text("123".into())
        );
        base.reader.consume_non_significant();
        assert_eq!(
            base.expect_regex("[0-9]+", "a number").unwrap(),
            Node::Text("456".into())
        );
    }
}
