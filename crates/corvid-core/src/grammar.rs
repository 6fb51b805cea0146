//! The grammar AST: alternatives, rules, and the grammar as a whole.

use std::collections::HashSet;

use regex::Regex;

use crate::interner::RuleInterner;
use crate::item::Item;

/// An ordered list of items that must all match in sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alternative {
    pub items: Vec<Item>,
}

impl Alternative {
    pub fn new(items: Vec<Item>) -> Self {
        Self { items }
    }

    /// Names bound by this alternative's items, in source order.
    /// Per the grammar's item-name invariant these must be unique; this
    /// returns the first duplicate found, if any.
    pub fn duplicate_name(&self) -> Option<&str> {
        let mut seen = HashSet::new();
        for item in &self.items {
            if let Some(name) = &item.attrs().name {
                if !seen.insert(name.as_str()) {
                    return Some(name.as_str());
                }
            }
        }
        None
    }
}

/// A named production: `name := alt1 | alt2 | ...`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub name: String,
    pub alternatives: Vec<Alternative>,
}

impl Rule {
    pub fn new(name: impl Into<String>, alternatives: Vec<Alternative>) -> Self {
        Self {
            name: name.into(),
            alternatives,
        }
    }

    /// A rule is directly left-recursive iff the leading item of some
    /// alternative, after peeling quantifier/lookahead/sep-by wrappers,
    /// is a `RuleRef` back to this same rule.
    pub fn is_left_recursive(&self) -> bool {
        self.alternatives.iter().any(|alt| {
            alt.items
                .first()
                .map(|item| item.peel_to_leading_item().rule_ref_name() == Some(self.name.as_str()))
                .unwrap_or(false)
        })
    }

    /// Whether this is a "structural" rule: its name starts with `_`.
    /// Structural rules collapse away under the node-shape law just like
    /// any other rule with a single retained, unnamed item; the leading
    /// underscore is a naming convention for grammar authors, not a
    /// separate mechanism.
    pub fn is_structural(&self) -> bool {
        self.name.starts_with('_')
    }
}

/// A complete grammar: verbatim prelude blocks, `@set` flags, and the
/// rule set.
#[derive(Debug, Clone, Default)]
pub struct Grammar {
    pub prelude: Vec<String>,
    /// Boolean flags collected from `@set <name>` directives, supplied
    /// as keyword options to downstream tooling. The grammar language
    /// does not prescribe what any particular flag means; this layer
    /// only records which ones were set.
    pub settings: Vec<String>,
    pub rules: Vec<Rule>,
    interner: RuleInterner,
}

/// An error found while validating a constructed [`Grammar`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GrammarError {
    #[error("rule '{0}' is defined more than once")]
    DuplicateRule(String),
    #[error("item name '{item_name}' is used more than once in an alternative of rule '{rule_name}'")]
    DuplicateItemName { rule_name: String, item_name: String },
    #[error("rule '{0}' references undefined rule '{1}'")]
    UndefinedRuleRef(String, String),
    #[error("rule '{rule_name}' has an invalid regex pattern '{pattern}': {reason}")]
    InvalidRegex {
        rule_name: String,
        pattern: String,
        reason: String,
    },
}

impl Grammar {
    pub fn new(prelude: Vec<String>, rules: Vec<Rule>) -> Self {
        Self::with_settings(prelude, Vec::new(), rules)
    }

    pub fn with_settings(prelude: Vec<String>, settings: Vec<String>, rules: Vec<Rule>) -> Self {
        let mut interner = RuleInterner::new();
        for rule in &rules {
            interner.intern(&rule.name);
        }
        Self {
            prelude,
            settings,
            rules,
            interner,
        }
    }

    pub fn rule_named(&self, name: &str) -> Option<&Rule> {
        self.rules.iter().find(|r| r.name == name)
    }

    pub fn is_set(&self, name: &str) -> bool {
        self.settings.iter().any(|s| s == name)
    }

    pub fn interner(&self) -> &RuleInterner {
        &self.interner
    }

    /// Validate the grammar: no duplicate rule definitions, no duplicate
    /// item names within an alternative, and every `RuleRef` resolves to
    /// a defined rule.
    pub fn validate(&self) -> Result<(), GrammarError> {
        let mut seen_rules = HashSet::new();
        for rule in &self.rules {
            if !seen_rules.insert(rule.name.as_str()) {
                return Err(GrammarError::DuplicateRule(rule.name.clone()));
            }
        }

        for rule in &self.rules {
            for alt in &rule.alternatives {
                if let Some(dup) = alt.duplicate_name() {
                    return Err(GrammarError::DuplicateItemName {
                        rule_name: rule.name.clone(),
                        item_name: dup.to_string(),
                    });
                }
                for item in &alt.items {
                    self.check_refs(rule, item)?;
                }
            }
        }
        Ok(())
    }

    fn check_refs(&self, rule: &Rule, item: &Item) -> Result<(), GrammarError> {
        match item {
            Item::RuleRef { rule_name, .. } => {
                if self.interner.get(rule_name).is_none() {
                    return Err(GrammarError::UndefinedRuleRef(
                        rule.name.clone(),
                        rule_name.clone(),
                    ));
                }
                Ok(())
            }
            Item::Maybe { inner, .. }
            | Item::ZeroOrMore { inner, .. }
            | Item::OneOrMore { inner, .. }
            | Item::Lookahead { inner, .. }
            | Item::NegativeLookahead { inner, .. } => self.check_refs(rule, inner),
            Item::SepBy {
                element, separator, ..
            }
            | Item::MaybeSepBy {
                element, separator, ..
            } => {
                self.check_refs(rule, element)?;
                self.check_refs(rule, separator)
            }
            Item::Regex { pattern, .. } => {
                // Mirrors `corvid_runtime::reader::compile_anchored`'s anchoring
                // so a pattern that fails here is exactly one that would have
                // panicked the first time a generated parser tried to match it.
                if let Err(e) = Regex::new(&format!("(?s)(?m)\\A(?:{pattern})")) {
                    return Err(GrammarError::InvalidRegex {
                        rule_name: rule.name.clone(),
                        pattern: pattern.clone(),
                        reason: e.to_string(),
                    });
                }
                Ok(())
            }
            Item::Literal { .. } | Item::Cut { .. } | Item::Eof { .. } => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::ItemAttributes;

    fn rule_ref(name: &str) -> Item {
        Item::RuleRef {
            rule_name: name.to_string(),
            attrs: ItemAttributes::default(),
        }
    }

    fn literal(text: &str) -> Item {
        Item::Literal {
            text: text.to_string(),
            attrs: ItemAttributes::default(),
        }
    }

    #[test]
    fn left_recursive_rule_is_detected() {
        // expr := expr "+" term | term
        let expr = Rule::new(
            "expr",
            vec![
                Alternative::new(vec![rule_ref("expr"), literal("+"), rule_ref("term")]),
                Alternative::new(vec![rule_ref("term")]),
            ],
        );
        assert!(expr.is_left_recursive());
    }

    #[test]
    fn non_left_recursive_rule_is_not_flagged() {
        let term = Rule::new(
            "term",
            vec![Alternative::new(vec![Item::Regex {
                pattern: "[0-9]+".into(),
                attrs: ItemAttributes::default(),
            }])],
        );
        assert!(!term.is_left_recursive());
    }

    #[test]
    fn left_recursion_through_wrappers_is_detected() {
        // list := list? "," term
        let list = Rule::new(
            "list",
            vec![Alternative::new(vec![
                Item::Maybe {
                    inner: Box::new(rule_ref("list")),
                    attrs: ItemAttributes::default(),
                },
                literal(","),
            ])],
        );
        assert!(list.is_left_recursive());
    }

    #[test]
    fn grammar_validate_catches_duplicate_rule() {
        let g = Grammar::new(
            vec![],
            vec![
                Rule::new("a", vec![Alternative::new(vec![literal("x")])]),
                Rule::new("a", vec![Alternative::new(vec![literal("y")])]),
            ],
        );
        assert_eq!(g.validate(), Err(GrammarError::DuplicateRule("a".into())));
    }

    #[test]
    fn grammar_validate_catches_undefined_ref() {
        let g = Grammar::new(
            vec![],
            vec![Rule::new(
                "a",
                vec![Alternative::new(vec![rule_ref("missing")])],
            )],
        );
        assert_eq!(
            g.validate(),
            Err(GrammarError::UndefinedRuleRef("a".into(), "missing".into()))
        );
    }

    #[test]
    fn grammar_validate_catches_duplicate_item_name() {
        let mut item1 = literal("x");
        item1.attrs_mut().name = Some("v".into());
        let mut item2 = literal("y");
        item2.attrs_mut().name = Some("v".into());
        let g = Grammar::new(
            vec![],
            vec![Rule::new("a", vec![Alternative::new(vec![item1, item2])])],
        );
        assert_eq!(
            g.validate(),
            Err(GrammarError::DuplicateItemName {
                rule_name: "a".into(),
                item_name: "v".into(),
            })
        );
    }

    #[test]
    fn grammar_validate_catches_invalid_regex() {
        let g = Grammar::new(
            vec![],
            vec![Rule::new(
                "term",
                vec![Alternative::new(vec![Item::Regex {
                    pattern: "[0-9".into(),
                    attrs: ItemAttributes::default(),
                }])],
            )],
        );
        assert!(matches!(
            g.validate(),
            Err(GrammarError::InvalidRegex { rule_name, pattern, .. })
                if rule_name == "term" && pattern == "[0-9"
        ));
    }

    #[test]
    fn grammar_validate_accepts_well_formed_grammar() {
        let g = Grammar::new(
            vec![],
            vec![
                Rule::new(
                    "expr",
                    vec![
                        Alternative::new(vec![rule_ref("expr"), literal("+"), rule_ref("term")]),
                        Alternative::new(vec![rule_ref("term")]),
                    ],
                ),
                Rule::new(
                    "term",
                    vec![Alternative::new(vec![Item::Regex {
                        pattern: "[0-9]+".into(),
                        attrs: ItemAttributes::default(),
                    }])],
                ),
            ],
        );
        assert!(g.validate().is_ok());
    }
}
