//! Packrat parsing runtime: the reader, node-wrapping, memoization,
//! and combinators that generated parsers are built on top of.

mod base;
mod combinators;
mod error;
mod memo;
mod node;
mod reader;
mod rule;

pub use base::{ParserBase, RuntimeParser};
pub use combinators::{lookahead, maybe, maybe_sep_by, not_lookahead, repeat, sep_by};
pub use error::{CutError, ParseError, ParseFailure, ParseResult};
pub use memo::{CacheEntry, MemoCache};
pub use node::{wrap_node, Node, NoopRuleHandler, RuleHandler};
pub use reader::{compile_anchored, Reader, DEFAULT_WHITESPACE_PATTERN};
pub use rule::{left_recursive_parsing_rule, parsing_rule, rule_exhausted, try_alternative};
