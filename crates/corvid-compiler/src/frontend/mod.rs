//! The bootstrap grammar parser: a hand-written parser over the
//! grammar language of §4.4, built directly against `corvid_runtime`.
//! Structurally this is what running the code generator on a grammar
//! describing its own syntax would produce; it is maintained by hand
//! because nothing can generate it before it exists.

mod grammar;
mod items;

use corvid_core::{RuleId, RuleInterner};
use corvid_runtime::{MemoCache, ParseResult, ParserBase, RuleHandler, RuntimeParser};

/// Dense ids for the bootstrap parser's own rules, used as the rule
/// identity half of the memoization key. A code-generated parser
/// assigns these the same way, by a rule's position in the grammar's
/// rule list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(usize)]
enum RuleSlot {
    Grammar,
    VerbatimBlock,
    Setting,
    RuleName,
    Literal,
    Regex,
    Atom,
    Maybe,
    OneOrMore,
    ZeroOrMore,
    MaybeSepBy,
    SepBy,
    Lookahead,
    NegativeLookahead,
    Cut,
    Eof,
    Item,
    NamedItem,
    Alternative,
    Alternatives,
    Rule,
    NameColon,
    OptionalGap,
}

const RULE_COUNT: usize = 23;

pub(crate) struct GrammarParser<'a> {
    base: ParserBase<'a>,
    ids: [RuleId; RULE_COUNT],
}

impl<'a> GrammarParser<'a> {
    pub fn new(text: &'a str, rule_handler: Option<&'a dyn RuleHandler>) -> Self {
        let mut interner = RuleInterner::new();
        let ids = [
            interner.intern("grammar"),
            interner.intern("verbatim_block"),
            interner.intern("setting"),
            interner.intern("rule_name"),
            interner.intern("literal"),
            interner.intern("regex"),
            interner.intern("atom"),
            interner.intern("maybe"),
            interner.intern("one_or_more"),
            interner.intern("zero_or_more"),
            interner.intern("maybe_sep_by"),
            interner.intern("sep_by"),
            interner.intern("lookahead"),
            interner.intern("negative_lookahead"),
            interner.intern("cut"),
            interner.intern("eof_"),
            interner.intern("item"),
            interner.intern("named_item"),
            interner.intern("alternative"),
            interner.intern("alternatives"),
            interner.intern("rule"),
            interner.intern("name_colon"),
            interner.intern("optional_gap"),
        ];
        Self {
            base: ParserBase::with_handler(
                text,
                RULE_COUNT,
                rule_handler,
                Some(corvid_runtime::DEFAULT_WHITESPACE_PATTERN),
                Some("#[^\n]*"),
            ),
            ids,
        }
    }

    fn id(&self, slot: RuleSlot) -> RuleId {
        self.ids[slot as usize]
    }

    pub(crate) fn expect_string(&mut self, literal: &str, match_full_token: bool) -> ParseResult<corvid_runtime::Node> {
        self.base.expect_string(literal, match_full_token)
    }

    pub(crate) fn expect_regex(&mut self, pattern: &str, description: &str) -> ParseResult<corvid_runtime::Node> {
        self.base.expect_regex(pattern, description)
    }

    pub(crate) fn expect_eof(&mut self) -> ParseResult<corvid_runtime::Node> {
        self.base.expect_eof()
    }
}

impl<'a> RuntimeParser for GrammarParser<'a> {
    fn mark(&self) -> usize {
        self.base.mark()
    }

    fn rewind(&mut self, pos: usize) {
        self.base.rewind(pos);
    }

    fn current_location(&mut self) -> corvid_core::SourceLocation {
        self.base.current_location()
    }

    fn consume_non_significant(&mut self) {
        self.base.consume_non_significant();
    }

    fn cache(&self) -> &MemoCache {
        self.base.cache()
    }

    fn cache_mut(&mut self) -> &mut MemoCache {
        self.base.cache_mut()
    }

    fn rule_handler(&self) -> Option<&dyn RuleHandler> {
        self.base.rule_handler()
    }
}
