//! Structural rules: verbatim blocks, settings, alternatives, rules,
//! and the grammar entry point.

use corvid_runtime::{
    left_recursive_parsing_rule, maybe, parsing_rule, repeat, rule_exhausted, try_alternative,
    wrap_node, Node, ParseFailure, ParseResult, RuntimeParser,
};

use corvid_core::ItemAttributes;

use super::{GrammarParser, RuleSlot};

fn attrs() -> ItemAttributes {
    ItemAttributes::default()
}

impl<'a> GrammarParser<'a> {
    /// `[ \n\t]+?` — crosses a line break before a continuation `|`.
    /// Distinct from a rule's own trailing `"\n"+` terminator, which is
    /// matched literally and never optional.
    pub(crate) fn optional_gap(&mut self) -> ParseResult<Node> {
        let id = self.id(RuleSlot::OptionalGap);
        parsing_rule(self, id, |p| {
            let pos = p.mark();
            let result = try_alternative(p, pos, |p, _cut| {
                let gap = maybe(p, |p| p.expect_regex("[ \\n\\t]+", "whitespace"))?;
                Ok(wrap_node("__", vec![gap.into()], &[attrs()], p.rule_handler()))
            });
            rule_exhausted(p, "optional_gap", result)
        })
    }

    /// Collapses to the bare (un-dedented) block body text: `kw`,
    /// `open`, `close` and the trailing newlines are all ignored, so
    /// `block` is the only retained item and the node-shape law
    /// collapses the result to that single value.
    pub(crate) fn verbatim_block(&mut self) -> ParseResult<Node> {
        let id = self.id(RuleSlot::VerbatimBlock);
        parsing_rule(self, id, |p| {
            let pos = p.mark();
            let result = try_alternative(p, pos, |p, cut| {
                let kw = p.expect_string("@verbatim", true)?;
                *cut = true;
                let open = p.expect_string("%{", false)?;
                let block = p.expect_regex("(.*?)(?=%\\})", "a verbatim block body")?;
                let close = p.expect_string("%}", false)?;
                let newlines = repeat(p, 1, |p| p.expect_string("\n", false))?;
                Ok(wrap_node(
                    "verbatim_block",
                    vec![kw, open, block, close, Node::Seq(newlines)],
                    &[
                        ItemAttributes::ignored(),
                        ItemAttributes::ignored(),
                        attrs(),
                        ItemAttributes::ignored(),
                        ItemAttributes::ignored(),
                    ],
                    p.rule_handler(),
                ))
            });
            rule_exhausted(p, "verbatim_block", result)
        })
    }

    /// Collapses to the bare setting-name text, for the same reason
    /// `verbatim_block` collapses to its block body.
    pub(crate) fn setting(&mut self) -> ParseResult<Node> {
        let id = self.id(RuleSlot::Setting);
        parsing_rule(self, id, |p| {
            let pos = p.mark();
            let result = try_alternative(p, pos, |p, cut| {
                let kw = p.expect_string("@set", true)?;
                *cut = true;
                let gap = p.expect_regex("[ \\t]+", "whitespace after '@set'")?;
                let name = p.expect_regex("[a-zA-Z_][a-zA-Z0-9_]*", "a setting name")?;
                let newlines = repeat(p, 1, |p| p.expect_string("\n", false))?;
                Ok(wrap_node(
                    "setting",
                    vec![kw, gap, name, Node::Seq(newlines)],
                    &[
                        ItemAttributes::ignored(),
                        ItemAttributes::ignored(),
                        attrs(),
                        ItemAttributes::ignored(),
                    ],
                    p.rule_handler(),
                ))
            });
            rule_exhausted(p, "setting", result)
        })
    }

    pub(crate) fn alternative(&mut self) -> ParseResult<Node> {
        let id = self.id(RuleSlot::Alternative);
        parsing_rule(self, id, |p| {
            let pos = p.mark();
            let result = try_alternative(p, pos, |p, _cut| {
                let items = repeat(p, 1, |p| p.named_item())?;
                Ok(wrap_node(
                    "alternative",
                    vec![Node::Seq(items)],
                    &[attrs()],
                    p.rule_handler(),
                ))
            });
            rule_exhausted(p, "alternative", result)
        })
    }

    /// `alternatives := alternatives __ "|" ~ alternative | alternative`
    pub(crate) fn alternatives(&mut self) -> ParseResult<Node> {
        let id = self.id(RuleSlot::Alternatives);
        left_recursive_parsing_rule(self, id, |p| {
            let pos = p.mark();

            let first = try_alternative(p, pos, |p, cut| {
                let alts = p.alternatives()?;
                let _gap = p.optional_gap()?;
                let bar = p.expect_string("|", false)?;
                *cut = true;
                let alt = p.alternative()?;
                Ok(wrap_node(
                    "alternatives",
                    vec![alts, bar, alt],
                    &[
                        ItemAttributes::named("alts"),
                        ItemAttributes::ignored(),
                        ItemAttributes::named("alt"),
                    ],
                    p.rule_handler(),
                ))
            });
            if !matches!(first, Err(ParseFailure::Recoverable(_))) {
                return first;
            }

            let result = try_alternative(p, pos, |p, _cut| {
                let alt = p.alternative()?;
                Ok(wrap_node(
                    "alternatives",
                    vec![alt],
                    &[ItemAttributes::named("alt")],
                    p.rule_handler(),
                ))
            });
            rule_exhausted(p, "alternatives", result)
        })
    }

    pub(crate) fn rule(&mut self) -> ParseResult<Node> {
        let id = self.id(RuleSlot::Rule);
        parsing_rule(self, id, |p| {
            let pos = p.mark();
            let result = try_alternative(p, pos, |p, cut| {
                let name = p.rule_name()?;
                let colon = p.expect_string(":", false)?;
                *cut = true;
                let alts = p.alternatives()?;
                let newlines = repeat(p, 1, |p| p.expect_string("\n", false))?;
                Ok(wrap_node(
                    "rule",
                    vec![name, colon, alts, Node::Seq(newlines)],
                    &[
                        ItemAttributes::named("name"),
                        ItemAttributes::ignored(),
                        ItemAttributes::named("alts"),
                        attrs(),
                    ],
                    p.rule_handler(),
                ))
            });
            rule_exhausted(p, "rule", result)
        })
    }

    pub fn grammar(&mut self) -> ParseResult<Node> {
        let id = self.id(RuleSlot::Grammar);
        parsing_rule(self, id, |p| {
            let pos = p.mark();
            let result = try_alternative(p, pos, |p, cut| {
                let verbatim = repeat(p, 0, |p| p.verbatim_block())?;
                let settings = repeat(p, 0, |p| p.setting())?;
                let rules = repeat(p, 1, |p| p.rule())?;
                *cut = true;
                let eof = p.expect_eof()?;
                Ok(wrap_node(
                    "grammar",
                    vec![
                        Node::Seq(verbatim),
                        Node::Seq(settings),
                        Node::Seq(rules),
                        eof,
                    ],
                    &[
                        ItemAttributes::named("verbatim"),
                        ItemAttributes::named("settings"),
                        ItemAttributes::named("rules"),
                        ItemAttributes::ignored(),
                    ],
                    p.rule_handler(),
                ))
            });
            rule_exhausted(p, "grammar", result)
        })
    }
}
