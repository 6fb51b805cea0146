//! Lowers a [`Grammar`] into the source text of a parser struct built
//! directly on `corvid_runtime`. The emitted struct has the exact shape
//! the hand-written bootstrap parser in `frontend/` has: a
//! `ParserBase` plus a dense `Vec<RuleId>`, one method per rule.

use corvid_core::{Grammar, Item, Rule};

/// Emit the source of a parser struct named `class_name` for `grammar`.
pub fn generate(grammar: &Grammar, class_name: &str) -> String {
    Emitter::new(grammar, class_name).emit()
}

struct Emitter<'a> {
    grammar: &'a Grammar,
    class_name: String,
    output: String,
}

impl<'a> Emitter<'a> {
    fn new(grammar: &'a Grammar, class_name: &str) -> Self {
        Self {
            grammar,
            class_name: class_name.to_string(),
            output: String::new(),
        }
    }

    fn emit(mut self) -> String {
        self.emit_prelude();
        self.emit_header();
        self.emit_struct();
        self.emit_impl();

        self.output.truncate(self.output.trim_end().len());
        self.output.push('\n');
        self.output
    }

    fn emit_prelude(&mut self) {
        for block in &self.grammar.prelude {
            self.output.push_str(block.trim_end());
            self.output.push_str("\n\n");
        }
    }

    fn emit_header(&mut self) {
        self.output.push_str(&format!(
            "//! Generated by corvid-compiler. Do not edit by hand.\n\n\
             use corvid_core::{{ItemAttributes, RuleId, RuleInterner}};\n\
             use corvid_runtime::{{\n\
             \u{20}\u{20}\u{20}\u{20}left_recursive_parsing_rule, lookahead, maybe, maybe_sep_by, not_lookahead,\n\
             \u{20}\u{20}\u{20}\u{20}parsing_rule, repeat, rule_exhausted, sep_by, try_alternative, wrap_node, Node,\n\
             \u{20}\u{20}\u{20}\u{20}ParseFailure, ParseResult, ParserBase, RuleHandler, RuntimeParser,\n\
             }};\n\n"
        ));
    }

    fn emit_struct(&mut self) {
        self.output.push_str(&format!(
            "pub struct {name}<'a> {{\n    base: ParserBase<'a>,\n    ids: Vec<RuleId>,\n}}\n\n",
            name = self.class_name,
        ));
    }

    fn emit_impl(&mut self) {
        self.output
            .push_str(&format!("impl<'a> {}<'a> {{\n", self.class_name));
        self.emit_constructor();
        self.emit_accessors();
        for (index, rule) in self.grammar.rules.iter().enumerate() {
            self.emit_rule(index, rule);
        }
        self.output.push_str("}\n\n");
        self.emit_runtime_parser_impl();
    }

    fn emit_constructor(&mut self) {
        self.output.push_str(
            "    pub fn new(\n        \
             text: &'a str,\n        \
             rule_handler: Option<&'a dyn RuleHandler>,\n        \
             whitespace_pattern: Option<&str>,\n        \
             comments_pattern: Option<&str>,\n    \
             ) -> Self {\n        \
             let mut interner = RuleInterner::new();\n        \
             let ids = vec![\n",
        );
        for rule in &self.grammar.rules {
            self.output
                .push_str(&format!("            interner.intern({:?}),\n", rule.name));
        }
        self.output.push_str(
            "        ];\n        \
             Self {\n            \
             base: ParserBase::with_handler(\n                \
             text,\n                \
             ids.len(),\n                \
             rule_handler,\n                \
             whitespace_pattern,\n                \
             comments_pattern,\n            \
             ),\n            \
             ids,\n        \
             }\n    }\n\n",
        );
    }

    fn emit_accessors(&mut self) {
        self.output.push_str(
            "    fn id(&self, index: usize) -> RuleId {\n        self.ids[index]\n    }\n\n",
        );
    }

    fn emit_runtime_parser_impl(&mut self) {
        self.output.push_str(&format!(
            "impl<'a> RuntimeParser for {name}<'a> {{\n\
             \u{20}\u{20}\u{20}\u{20}fn mark(&self) -> usize {{\n        self.base.mark()\n    }}\n\n\
             \u{20}\u{20}\u{20}\u{20}fn rewind(&mut self, pos: usize) {{\n        self.base.rewind(pos);\n    }}\n\n\
             \u{20}\u{20}\u{20}\u{20}fn current_location(&mut self) -> corvid_core::SourceLocation {{\n        self.base.current_location()\n    }}\n\n\
             \u{20}\u{20}\u{20}\u{20}fn consume_non_significant(&mut self) {{\n        self.base.consume_non_significant();\n    }}\n\n\
             \u{20}\u{20}\u{20}\u{20}fn cache(&self) -> &corvid_runtime::MemoCache {{\n        self.base.cache()\n    }}\n\n\
             \u{20}\u{20}\u{20}\u{20}fn cache_mut(&mut self) -> &mut corvid_runtime::MemoCache {{\n        self.base.cache_mut()\n    }}\n\n\
             \u{20}\u{20}\u{20}\u{20}fn rule_handler(&self) -> Option<&dyn RuleHandler> {{\n        self.base.rule_handler()\n    }}\n\
             }}\n\n",
            name = self.class_name,
        ));
    }

    fn emit_rule(&mut self, index: usize, rule: &Rule) {
        let wrapper = if rule.is_left_recursive() {
            "left_recursive_parsing_rule"
        } else {
            "parsing_rule"
        };
        self.output.push_str(&format!(
            "    pub fn {name}(&mut self) -> ParseResult<Node> {{\n        \
             let id = self.id({index});\n        \
             {wrapper}(self, id, |p| {{\n            \
             let pos = p.mark();\n",
            name = rule.name,
        ));

        let last = rule.alternatives.len().saturating_sub(1);
        for (i, alt) in rule.alternatives.iter().enumerate() {
            let body = render_alternative(&rule.name, alt);
            if i == last {
                self.output
                    .push_str("            let result = try_alternative(p, pos, |p, cut| {\n");
                self.output.push_str(&indent(&body, 4));
                self.output.push_str("            });\n");
                self.output.push_str(&format!(
                    "            rule_exhausted(p, {name:?}, result)\n",
                    name = rule.name,
                ));
            } else {
                self.output.push_str(&format!(
                    "            let alt{i} = try_alternative(p, pos, |p, cut| {{\n"
                ));
                self.output.push_str(&indent(&body, 4));
                self.output.push_str("            });\n");
                self.output.push_str(&format!(
                    "            if !matches!(alt{i}, Err(ParseFailure::Recoverable(_))) {{\n                return alt{i};\n            }}\n"
                ));
            }
        }

        self.output.push_str("        })\n    }\n\n");
    }
}

/// The body of a single `try_alternative` closure: binds each item's
/// value in source order, then wraps the survivors into a `Node`.
fn render_alternative(rule_name: &str, alt: &corvid_core::Alternative) -> String {
    let mut stmts = String::new();
    let mut values = Vec::new();
    let mut attrs = Vec::new();

    for (i, item) in alt.items.iter().enumerate() {
        if matches!(item, Item::Cut { .. }) {
            stmts.push_str("*cut = true;\n");
            continue;
        }
        let var = format!("v{i}");
        stmts.push_str(&format!("let {var} = {}?;\n", render_item_expr(item)));
        values.push(var);
        attrs.push(render_attrs(item));
    }

    format!(
        "{stmts}Ok(wrap_node(\n    {name:?},\n    vec![{values}],\n    &[{attrs}],\n    p.rule_handler(),\n))\n",
        stmts = stmts,
        name = rule_name,
        values = values.join(", "),
        attrs = attrs.join(", "),
    )
}

/// An expression of type `ParseResult<Node>` for `item`, however deeply
/// it nests quantifiers/lookaheads/sep-by wrappers around its leaves.
/// Every combinator here is paired with the `Node::from` impl that
/// normalizes its raw return type back to `Node`, so composition needs
/// no per-shape special-casing.
fn render_item_expr(item: &Item) -> String {
    match item {
        Item::Literal { text, .. } => {
            format!("p.expect_string({:?}, {})", text, is_keyword_literal(text))
        }
        Item::Regex { pattern, .. } => {
            format!(
                "p.expect_regex({:?}, {:?})",
                pattern,
                format!("a match for {pattern}")
            )
        }
        Item::RuleRef { rule_name, .. } => format!("p.{rule_name}()"),
        Item::Eof { .. } => "p.expect_eof()".to_string(),
        Item::Cut { .. } => unreachable!("cut items are handled by render_alternative directly"),
        Item::Maybe { inner, .. } => format!(
            "maybe(p, |p| {}).map(Into::into)",
            render_item_expr(inner)
        ),
        Item::ZeroOrMore { inner, .. } => format!(
            "repeat(p, 0, |p| {}).map(Into::into)",
            render_item_expr(inner)
        ),
        Item::OneOrMore { inner, .. } => format!(
            "repeat(p, 1, |p| {}).map(Into::into)",
            render_item_expr(inner)
        ),
        Item::Lookahead { inner, .. } => {
            format!("lookahead(p, |p| {})", render_item_expr(inner))
        }
        Item::NegativeLookahead { inner, .. } => format!(
            "not_lookahead(p, |p| {}).map(Into::into)",
            render_item_expr(inner)
        ),
        Item::SepBy { element, separator, .. } => format!(
            "sep_by(p, |p| {}, |p| {}).map(Into::into)",
            render_item_expr(element),
            render_item_expr(separator)
        ),
        Item::MaybeSepBy { element, separator, .. } => format!(
            "maybe_sep_by(p, |p| {}, |p| {}).map(Into::into)",
            render_item_expr(element),
            render_item_expr(separator)
        ),
    }
}

fn render_attrs(item: &Item) -> String {
    let attrs = item.attrs();
    if let Some(name) = &attrs.name {
        format!("ItemAttributes::named({name:?})")
    } else if attrs.ignore {
        "ItemAttributes::ignored()".to_string()
    } else {
        "ItemAttributes::default()".to_string()
    }
}

/// A keyword-shaped literal (starts with an identifier character) gets
/// a full-token boundary check; punctuation does not.
fn is_keyword_literal(text: &str) -> bool {
    text.chars()
        .next()
        .is_some_and(|c| c.is_alphanumeric() || c == '_')
}

fn indent(text: &str, levels: usize) -> String {
    let pad = "    ".repeat(levels);
    text.lines()
        .map(|line| {
            if line.is_empty() {
                String::new()
            } else {
                format!("{pad}{line}\n")
            }
        })
        .collect()
}
