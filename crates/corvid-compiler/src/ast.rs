//! Lowers the raw `Node` tree the bootstrap grammar parser produces
//! into the typed `corvid_core` grammar AST.
//!
//! The bootstrap parser has no typed rule handler of its own (the
//! `RuleHandler` trait only rewrites `Node -> Node`, for generated
//! parsers' end users); instead this module performs one bottom-up
//! conversion pass over the finished parse tree, playing the same role
//! the original rule-handler dispatch plays during parsing.

use corvid_core::{Alternative, Grammar, Item, ItemAttributes, Rule};
use corvid_runtime::Node;

use crate::error::{malformed, Error, LowerResult};

fn text<'a>(node: &'a Node, what: &str) -> LowerResult<&'a str> {
    node.as_text()
        .ok_or_else(|| malformed(format!("expected text for {what}")))
}

fn seq<'a>(node: &'a Node, what: &str) -> LowerResult<&'a [Node]> {
    node.as_seq()
        .ok_or_else(|| malformed(format!("expected a sequence for {what}")))
}

fn map<'a>(
    node: &'a Node,
    what: &str,
) -> LowerResult<&'a indexmap::IndexMap<String, Node>> {
    node.as_map()
        .ok_or_else(|| malformed(format!("expected a mapping for {what}")))
}

fn field<'a>(
    map: &'a indexmap::IndexMap<String, Node>,
    name: &str,
    what: &str,
) -> LowerResult<&'a Node> {
    map.get(name)
        .ok_or_else(|| malformed(format!("missing field '{name}' in {what}")))
}

/// Lowers a finished `grammar` node into a validated `Grammar`.
pub(crate) fn lower_grammar(node: &Node) -> LowerResult<Grammar> {
    let top = map(node, "grammar")?;

    let verbatim = seq(field(top, "verbatim", "grammar")?, "verbatim blocks")?
        .iter()
        .map(|n| text(n, "a verbatim block").map(|s| dedent(s)))
        .collect::<LowerResult<Vec<_>>>()?;

    let settings = seq(field(top, "settings", "grammar")?, "settings")?
        .iter()
        .map(|n| text(n, "a setting name").map(|s| s.to_string()))
        .collect::<LowerResult<Vec<_>>>()?;

    let mut rules = Vec::new();
    for rule_node in seq(field(top, "rules", "grammar")?, "rules")? {
        lower_rule(rule_node, &mut rules)?;
    }

    let grammar = Grammar::with_settings(verbatim, settings, rules);
    grammar.validate().map_err(Error::Validation)?;
    Ok(grammar)
}

/// Dedents a verbatim block body the way `textwrap.dedent` would: strip
/// the longest common leading whitespace run shared by every
/// non-blank line.
fn dedent(block: &str) -> String {
    let common = block
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.len() - line.trim_start_matches([' ', '\t']).len())
        .min()
        .unwrap_or(0);

    block
        .lines()
        .map(|line| if line.len() >= common { &line[common..] } else { line })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Lowers one `rule` node, appending it (and any rules synthesized
/// while lowering its parenthesized atoms) to `rules`.
fn lower_rule(node: &Node, rules: &mut Vec<Rule>) -> LowerResult<()> {
    let m = map(node, "rule")?;
    let name = text(field(m, "name", "rule")?, "a rule name")?.to_string();
    let alts_node = field(m, "alts", "rule")?;
    let alternatives = lower_alternatives(alts_node, rules)?;
    rules.push(Rule::new(name, alternatives));
    Ok(())
}

/// `alternatives` is left-recursive: `{alts, alt}` for the recursive
/// case, or `{alt}` alone for the base case. Flattens either shape into
/// a plain ordered list.
fn lower_alternatives(node: &Node, rules: &mut Vec<Rule>) -> LowerResult<Vec<Alternative>> {
    let m = map(node, "alternatives")?;
    let mut out = if let Some(prior) = m.get("alts") {
        lower_alternatives(prior, rules)?
    } else {
        Vec::new()
    };
    let alt_node = field(m, "alt", "alternatives")?;
    out.push(lower_alternative(alt_node, rules)?);
    Ok(out)
}

fn lower_alternative(node: &Node, rules: &mut Vec<Rule>) -> LowerResult<Alternative> {
    let items = seq(node, "alternative")?;
    let mut lowered = Vec::with_capacity(items.len());
    for item_node in items {
        lowered.push(lower_named_item(item_node, rules)?);
    }
    Ok(Alternative::new(lowered))
}

fn lower_named_item(node: &Node, rules: &mut Vec<Rule>) -> LowerResult<Item> {
    let m = map(node, "named_item")?;
    let item_node = field(m, "item", "named_item")?;
    let mut item = lower_item(item_node, rules)?;

    if let Some(name_node) = m.get("name") {
        if !name_node.is_absent() {
            let name_map = map(name_node, "named_item name")?;
            let name = text(field(name_map, "name", "named_item name")?, "a binding name")?;
            item.attrs_mut().name = Some(name.to_string());
        }
    }
    Ok(item)
}

/// Lowers an `item` node to a typed `Item`. Parenthesized atoms are
/// lifted here into a fresh `synthesized_rule_<n>` appended to `rules`,
/// matching how the atom is recognized in the grammar language.
fn lower_item(node: &Node, rules: &mut Vec<Rule>) -> LowerResult<Item> {
    // `cut` and `eof_` collapse to a bare Text("~") / Text("EOF").
    if let Some(t) = node.as_text() {
        return match t {
            "~" => Ok(Item::Cut {
                attrs: ItemAttributes::ignored(),
            }),
            "EOF" => Ok(Item::Eof {
                attrs: ItemAttributes::ignored(),
            }),
            other => lower_literal_or_regex_text(other),
        };
    }

    // A literal's raw node is a 3-element sequence: open quote, body,
    // close quote.
    if let Some(items) = node.as_seq() {
        if items.len() == 3 {
            let body = text(&items[1], "a literal body")?;
            return Ok(Item::Literal {
                text: body.to_string(),
                attrs: ItemAttributes::default(),
            });
        }
        if items.len() == 2 {
            // regex := "r" literal
            let literal_seq = seq(&items[1], "a regex literal")?;
            let pattern = text(&literal_seq[1], "a regex pattern")?;
            return Ok(Item::Regex {
                pattern: pattern.to_string(),
                attrs: ItemAttributes::default(),
            });
        }
        return Err(malformed("unexpected sequence shape for item"));
    }

    let m = map(node, "item")?;

    if let Some(rule_name_node) = m.get("rule_name") {
        let name = text(rule_name_node, "a rule name reference")?;
        return Ok(Item::RuleRef {
            rule_name: name.to_string(),
            attrs: ItemAttributes::default(),
        });
    }

    if let Some(parenthesized) = m.get("parenthesized_alts") {
        let alternatives = lower_alternatives(parenthesized, rules)?;
        let synthesized_name = format!("synthesized_rule_{}", rules.len());
        rules.push(Rule::new(synthesized_name.clone(), alternatives));
        return Ok(Item::RuleRef {
            rule_name: synthesized_name,
            attrs: ItemAttributes::default(),
        });
    }

    // `maybe`/`one_or_more`/`zero_or_more` all wrap an `atom` and carry
    // the quantifier character in `q`, the only thing that tells them
    // apart.
    if let Some(atom_node) = m.get("atom") {
        let inner = Box::new(lower_item(atom_node, rules)?);
        let q = text(field(m, "q", "a quantified atom")?, "a quantifier")?;
        return match q {
            "?" => Ok(Item::Maybe {
                inner,
                attrs: ItemAttributes::default(),
            }),
            "+" => Ok(Item::OneOrMore {
                inner,
                attrs: ItemAttributes::default(),
            }),
            "*" => Ok(Item::ZeroOrMore {
                inner,
                attrs: ItemAttributes::default(),
            }),
            other => Err(malformed(format!("unknown quantifier '{other}'"))),
        };
    }

    // `sep_by`/`maybe_sep_by` both wrap `element`/`separator` and carry
    // the trailing `+`/`*` in `quantifier`.
    if m.contains_key("element") && m.contains_key("separator") {
        let element = Box::new(lower_item(field(m, "element", "a sep-by item")?, rules)?);
        let separator = Box::new(lower_item(field(m, "separator", "a sep-by item")?, rules)?);
        let quantifier = text(field(m, "quantifier", "a sep-by item")?, "a sep-by quantifier")?;
        return match quantifier {
            "+" => Ok(Item::SepBy {
                element,
                separator,
                attrs: ItemAttributes::default(),
            }),
            "*" => Ok(Item::MaybeSepBy {
                element,
                separator,
                attrs: ItemAttributes::default(),
            }),
            other => Err(malformed(format!("unknown sep-by quantifier '{other}'"))),
        };
    }

    // `lookahead`/`negative_lookahead` both wrap `item` and carry the
    // `&`/`!` marker character in `marker`.
    if let Some(item_node) = m.get("item") {
        let inner = Box::new(lower_item(item_node, rules)?);
        let marker = text(field(m, "marker", "a lookahead item")?, "a lookahead marker")?;
        return match marker {
            "&" => Ok(Item::Lookahead {
                inner,
                attrs: ItemAttributes::default(),
            }),
            "!" => Ok(Item::NegativeLookahead {
                inner,
                attrs: ItemAttributes::default(),
            }),
            other => Err(malformed(format!("unknown lookahead marker '{other}'"))),
        };
    }

    Err(malformed("item node did not match any known shape"))
}

fn lower_literal_or_regex_text(_s: &str) -> LowerResult<Item> {
    Err(malformed("bare text is not a valid top-level item"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;

    fn map_node(pairs: Vec<(&str, Node)>) -> Node {
        let mut m = IndexMap::new();
        for (k, v) in pairs {
            m.insert(k.to_string(), v);
        }
        Node::Map(m)
    }

    fn rule_name_item(name: &str) -> Node {
        map_node(vec![("rule_name", Node::Text(name.to_string()))])
    }

    fn named_item(item: Node) -> Node {
        map_node(vec![("name", Node::Absent), ("item", item)])
    }

    fn single_alternative(items: Vec<Node>) -> Node {
        // `alternatives := {alt}` for a single, non-recursive alternative.
        map_node(vec![("alt", Node::Seq(items))])
    }

    #[test]
    fn parenthesized_atom_is_lifted_into_a_synthesized_rule() {
        let mut rules = Vec::new();
        let parenthesized =
            map_node(vec![("parenthesized_alts", single_alternative(vec![named_item(rule_name_item("foo"))]))]);

        let item = lower_item(&parenthesized, &mut rules).unwrap();
        assert_eq!(
            item,
            Item::RuleRef {
                rule_name: "synthesized_rule_0".to_string(),
                attrs: ItemAttributes::default(),
            }
        );

        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].name, "synthesized_rule_0");
        assert_eq!(rules[0].alternatives.len(), 1);
        assert_eq!(
            rules[0].alternatives[0].items,
            vec![Item::RuleRef {
                rule_name: "foo".to_string(),
                attrs: ItemAttributes::default(),
            }]
        );
    }

    #[test]
    fn nested_parenthesized_atoms_each_get_their_own_synthesized_rule() {
        let mut rules = Vec::new();
        let inner =
            map_node(vec![("parenthesized_alts", single_alternative(vec![named_item(rule_name_item("a"))]))]);
        let outer = map_node(vec![(
            "parenthesized_alts",
            single_alternative(vec![named_item(inner)]),
        )]);

        lower_item(&outer, &mut rules).unwrap();
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].name, "synthesized_rule_0");
        assert_eq!(rules[1].name, "synthesized_rule_1");
        assert_eq!(
            rules[1].alternatives[0].items,
            vec![Item::RuleRef {
                rule_name: "synthesized_rule_0".to_string(),
                attrs: ItemAttributes::default(),
            }]
        );
    }

    #[test]
    fn lower_named_item_binds_the_name_colon_prefix() {
        let mut rules = Vec::new();
        let node = map_node(vec![
            ("name", map_node(vec![("name", Node::Text("lhs".to_string()))])),
            ("item", rule_name_item("term")),
        ]);
        let item = lower_named_item(&node, &mut rules).unwrap();
        assert_eq!(item.attrs().name.as_deref(), Some("lhs"));
    }
}
