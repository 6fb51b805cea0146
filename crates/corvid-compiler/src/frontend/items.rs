//! Leaf and quantifier rules: literals, regexes, atoms, and the item
//! wrappers (`?`, `+`, `*`, lookaheads, sep-by, cut, EOF).

use corvid_runtime::{
    maybe, parsing_rule, rule_exhausted, try_alternative, wrap_node, Node, ParseFailure,
    ParseResult, RuntimeParser,
};

use corvid_core::ItemAttributes;

use super::{GrammarParser, RuleSlot};

fn attrs() -> ItemAttributes {
    ItemAttributes::default()
}

impl<'a> GrammarParser<'a> {
    /// `(identifier ":")?` — the optional binding-name prefix of a
    /// `named_item`. Lifted out as its own memoized rule so `maybe`
    /// can cheaply probe it without re-matching the identifier twice.
    pub(crate) fn name_colon(&mut self) -> ParseResult<Node> {
        let id = self.id(RuleSlot::NameColon);
        parsing_rule(self, id, |p| {
            let pos = p.mark();
            let result = try_alternative(p, pos, |p, _cut| {
                let name = p.expect_regex("[a-zA-Z_][a-zA-Z0-9_]*", "an identifier")?;
                let colon = p.expect_string(":", false)?;
                Ok(wrap_node(
                    "name_colon",
                    vec![name, colon],
                    &[ItemAttributes::named("name"), attrs()],
                    p.rule_handler(),
                ))
            });
            rule_exhausted(p, "name_colon", result)
        })
    }

    pub(crate) fn rule_name(&mut self) -> ParseResult<Node> {
        let id = self.id(RuleSlot::RuleName);
        parsing_rule(self, id, |p| {
            let pos = p.mark();
            let result = try_alternative(p, pos, |p, _cut| {
                let name = p.expect_regex("[a-zA-Z_][a-zA-Z0-9_]*", "a rule name")?;
                Ok(wrap_node("rule_name", vec![name], &[attrs()], p.rule_handler()))
            });
            rule_exhausted(p, "rule_name", result)
        })
    }

    pub(crate) fn literal(&mut self) -> ParseResult<Node> {
        let id = self.id(RuleSlot::Literal);
        parsing_rule(self, id, |p| {
            let pos = p.mark();
            let first = try_alternative(p, pos, |p, _cut| {
                let open = p.expect_string("\"", false)?;
                let body = p.expect_regex("[^\"]*", "a double-quoted literal body")?;
                let close = p.expect_string("\"", false)?;
                Ok(wrap_node(
                    "literal",
                    vec![open, body, close],
                    &[attrs(), attrs(), attrs()],
                    p.rule_handler(),
                ))
            });
            if !matches!(first, Err(ParseFailure::Recoverable(_))) {
                return first;
            }
            let result = try_alternative(p, pos, |p, _cut| {
                let open = p.expect_string("'", false)?;
                let body = p.expect_regex("[^']*", "a single-quoted literal body")?;
                let close = p.expect_string("'", false)?;
                Ok(wrap_node(
                    "literal",
                    vec![open, body, close],
                    &[attrs(), attrs(), attrs()],
                    p.rule_handler(),
                ))
            });
            rule_exhausted(p, "literal", result)
        })
    }

    pub(crate) fn regex(&mut self) -> ParseResult<Node> {
        let id = self.id(RuleSlot::Regex);
        parsing_rule(self, id, |p| {
            let pos = p.mark();
            let result = try_alternative(p, pos, |p, _cut| {
                let r = p.expect_string("r", false)?;
                let lit = p.literal()?;
                Ok(wrap_node(
                    "regex",
                    vec![r, lit],
                    &[attrs(), attrs()],
                    p.rule_handler(),
                ))
            });
            rule_exhausted(p, "regex", result)
        })
    }

    pub(crate) fn atom(&mut self) -> ParseResult<Node> {
        let id = self.id(RuleSlot::Atom);
        parsing_rule(self, id, |p| {
            let pos = p.mark();

            let first = try_alternative(p, pos, |p, _cut| {
                let v = p.regex()?;
                Ok(wrap_node("atom", vec![v], &[attrs()], p.rule_handler()))
            });
            if !matches!(first, Err(ParseFailure::Recoverable(_))) {
                return first;
            }

            let second = try_alternative(p, pos, |p, _cut| {
                let v = p.literal()?;
                Ok(wrap_node("atom", vec![v], &[attrs()], p.rule_handler()))
            });
            if !matches!(second, Err(ParseFailure::Recoverable(_))) {
                return second;
            }

            let third = try_alternative(p, pos, |p, _cut| {
                let v = p.rule_name()?;
                Ok(wrap_node(
                    "atom",
                    vec![v],
                    &[ItemAttributes::named("rule_name")],
                    p.rule_handler(),
                ))
            });
            if !matches!(third, Err(ParseFailure::Recoverable(_))) {
                return third;
            }

            let result = try_alternative(p, pos, |p, cut| {
                let open = p.expect_string("(", false)?;
                *cut = true;
                let alts = p.alternatives()?;
                let close = p.expect_string(")", false)?;
                Ok(wrap_node(
                    "atom",
                    vec![open, alts, close],
                    &[
                        ItemAttributes::ignored(),
                        ItemAttributes::named("parenthesized_alts"),
                        attrs(),
                    ],
                    p.rule_handler(),
                ))
            });
            rule_exhausted(p, "atom", result)
        })
    }

    /// Names the trailing `?` so the lowering pass can tell this apart
    /// from `one_or_more`/`zero_or_more`, which otherwise produce the
    /// same `{atom}` shape.
    pub(crate) fn maybe_item(&mut self) -> ParseResult<Node> {
        let id = self.id(RuleSlot::Maybe);
        parsing_rule(self, id, |p| {
            let pos = p.mark();
            let result = try_alternative(p, pos, |p, _cut| {
                let atom = p.atom()?;
                let q = p.expect_string("?", false)?;
                Ok(wrap_node(
                    "maybe",
                    vec![atom, q],
                    &[ItemAttributes::named("atom"), ItemAttributes::named("q")],
                    p.rule_handler(),
                ))
            });
            rule_exhausted(p, "maybe", result)
        })
    }

    pub(crate) fn one_or_more(&mut self) -> ParseResult<Node> {
        let id = self.id(RuleSlot::OneOrMore);
        parsing_rule(self, id, |p| {
            let pos = p.mark();
            let result = try_alternative(p, pos, |p, _cut| {
                let atom = p.atom()?;
                let q = p.expect_string("+", false)?;
                Ok(wrap_node(
                    "one_or_more",
                    vec![atom, q],
                    &[ItemAttributes::named("atom"), ItemAttributes::named("q")],
                    p.rule_handler(),
                ))
            });
            rule_exhausted(p, "one_or_more", result)
        })
    }

    pub(crate) fn zero_or_more(&mut self) -> ParseResult<Node> {
        let id = self.id(RuleSlot::ZeroOrMore);
        parsing_rule(self, id, |p| {
            let pos = p.mark();
            let result = try_alternative(p, pos, |p, _cut| {
                let atom = p.atom()?;
                let q = p.expect_string("*", false)?;
                Ok(wrap_node(
                    "zero_or_more",
                    vec![atom, q],
                    &[ItemAttributes::named("atom"), ItemAttributes::named("q")],
                    p.rule_handler(),
                ))
            });
            rule_exhausted(p, "zero_or_more", result)
        })
    }

    pub(crate) fn maybe_sep_by_item(&mut self) -> ParseResult<Node> {
        let id = self.id(RuleSlot::MaybeSepBy);
        parsing_rule(self, id, |p| {
            let pos = p.mark();
            let result = try_alternative(p, pos, |p, _cut| {
                let open = p.expect_string("{", false)?;
                let element = p.item()?;
                let separator = p.atom()?;
                let dots = p.expect_string("...", false)?;
                let close = p.expect_string("}", false)?;
                let star = p.expect_string("*", false)?;
                Ok(wrap_node(
                    "maybe_sep_by",
                    vec![open, element, separator, dots, close, star],
                    &[
                        ItemAttributes::ignored(),
                        ItemAttributes::named("element"),
                        ItemAttributes::named("separator"),
                        ItemAttributes::ignored(),
                        ItemAttributes::ignored(),
                        ItemAttributes::named("quantifier"),
                    ],
                    p.rule_handler(),
                ))
            });
            rule_exhausted(p, "maybe_sep_by", result)
        })
    }

    pub(crate) fn sep_by_item(&mut self) -> ParseResult<Node> {
        let id = self.id(RuleSlot::SepBy);
        parsing_rule(self, id, |p| {
            let pos = p.mark();
            let result = try_alternative(p, pos, |p, _cut| {
                let open = p.expect_string("{", false)?;
                let element = p.item()?;
                let separator = p.atom()?;
                let dots = p.expect_string("...", false)?;
                let close = p.expect_string("}", false)?;
                let plus = p.expect_string("+", false)?;
                Ok(wrap_node(
                    "sep_by",
                    vec![open, element, separator, dots, close, plus],
                    &[
                        ItemAttributes::ignored(),
                        ItemAttributes::named("element"),
                        ItemAttributes::named("separator"),
                        ItemAttributes::ignored(),
                        ItemAttributes::ignored(),
                        ItemAttributes::named("quantifier"),
                    ],
                    p.rule_handler(),
                ))
            });
            rule_exhausted(p, "sep_by", result)
        })
    }

    pub(crate) fn lookahead_item(&mut self) -> ParseResult<Node> {
        let id = self.id(RuleSlot::Lookahead);
        parsing_rule(self, id, |p| {
            let pos = p.mark();
            let result = try_alternative(p, pos, |p, cut| {
                let amp = p.expect_string("&", false)?;
                *cut = true;
                let item = p.item()?;
                Ok(wrap_node(
                    "lookahead",
                    vec![amp, item],
                    &[ItemAttributes::named("marker"), ItemAttributes::named("item")],
                    p.rule_handler(),
                ))
            });
            rule_exhausted(p, "lookahead", result)
        })
    }

    pub(crate) fn negative_lookahead_item(&mut self) -> ParseResult<Node> {
        let id = self.id(RuleSlot::NegativeLookahead);
        parsing_rule(self, id, |p| {
            let pos = p.mark();
            let result = try_alternative(p, pos, |p, cut| {
                let bang = p.expect_string("!", false)?;
                *cut = true;
                let item = p.item()?;
                Ok(wrap_node(
                    "negative_lookahead",
                    vec![bang, item],
                    &[ItemAttributes::named("marker"), ItemAttributes::named("item")],
                    p.rule_handler(),
                ))
            });
            rule_exhausted(p, "negative_lookahead", result)
        })
    }

    pub(crate) fn cut_item(&mut self) -> ParseResult<Node> {
        let id = self.id(RuleSlot::Cut);
        parsing_rule(self, id, |p| {
            let pos = p.mark();
            let result = try_alternative(p, pos, |p, _cut| {
                let tilde = p.expect_string("~", false)?;
                Ok(wrap_node("cut", vec![tilde], &[attrs()], p.rule_handler()))
            });
            rule_exhausted(p, "cut", result)
        })
    }

    pub(crate) fn eof_item(&mut self) -> ParseResult<Node> {
        let id = self.id(RuleSlot::Eof);
        parsing_rule(self, id, |p| {
            let pos = p.mark();
            let result = try_alternative(p, pos, |p, _cut| {
                let kw = p.expect_string("EOF", true)?;
                Ok(wrap_node("eof_", vec![kw], &[attrs()], p.rule_handler()))
            });
            rule_exhausted(p, "eof_", result)
        })
    }

    /// `item := cut | eof_ | sep_by | maybe_sep_by | maybe | one_or_more
    ///        | zero_or_more | lookahead | negative_lookahead | atom`
    pub(crate) fn item(&mut self) -> ParseResult<Node> {
        let id = self.id(RuleSlot::Item);
        parsing_rule(self, id, |p| {
            let pos = p.mark();

            macro_rules! alt {
                ($make:expr) => {{
                    let result = try_alternative(p, pos, |p, _cut| {
                        let v = $make(p)?;
                        Ok(wrap_node("item", vec![v], &[attrs()], p.rule_handler()))
                    });
                    if !matches!(result, Err(ParseFailure::Recoverable(_))) {
                        return result;
                    }
                }};
            }

            alt!(GrammarParser::cut_item);
            alt!(GrammarParser::eof_item);
            alt!(GrammarParser::sep_by_item);
            alt!(GrammarParser::maybe_sep_by_item);
            alt!(GrammarParser::maybe_item);
            alt!(GrammarParser::one_or_more);
            alt!(GrammarParser::zero_or_more);
            alt!(GrammarParser::lookahead_item);
            alt!(GrammarParser::negative_lookahead_item);
            let result = try_alternative(p, pos, |p, _cut| {
                let v = p.atom()?;
                Ok(wrap_node("item", vec![v], &[attrs()], p.rule_handler()))
            });
            rule_exhausted(p, "item", result)
        })
    }

    pub(crate) fn named_item(&mut self) -> ParseResult<Node> {
        let id = self.id(RuleSlot::NamedItem);
        parsing_rule(self, id, |p| {
            let pos = p.mark();
            let result = try_alternative(p, pos, |p, _cut| {
                let name = maybe(p, |p| p.name_colon())?;
                let item = p.item()?;
                Ok(wrap_node(
                    "named_item",
                    vec![name.into(), item],
                    &[ItemAttributes::named("name"), ItemAttributes::named("item")],
                    p.rule_handler(),
                ))
            });
            rule_exhausted(p, "named_item", result)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn atom_parenthesized_alternative_commits_after_open_paren() {
        // "(x" opens a group, parses "x" as an atom, then runs out of
        // input looking for the closing ")" — a recoverable failure at
        // that point must not fall through to try a bare literal/rule-name
        // atom instead, since the cut already committed to this branch.
        let mut parser = GrammarParser::new("(x", None);
        let err = parser.atom().unwrap_err();
        assert!(matches!(err, ParseFailure::Cut(_)));
    }

    #[test]
    fn atom_exhaustion_reports_expected_a_atom() {
        let mut parser = GrammarParser::new("", None);
        match parser.atom().unwrap_err() {
            ParseFailure::Recoverable(e) => assert_eq!(e.message, "expected a atom"),
            other => panic!("expected a recoverable failure, got {other:?}"),
        }
    }

    #[test]
    fn literal_tries_single_quotes_after_double_quotes_fail() {
        let mut parser = GrammarParser::new("'abc'", None);
        let node = parser.literal().unwrap();
        let seq = node.as_seq().expect("literal collapses to open/body/close");
        assert_eq!(seq[1], Node::Text("abc".into()));
    }
}
