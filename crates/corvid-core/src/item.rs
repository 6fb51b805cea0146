//! Grammar items: the atoms and combinators that make up an alternative.

/// Attributes shared by every item variant.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ItemAttributes {
    /// Binding name used to build a named field in the wrapped node.
    pub name: Option<String>,
    /// When true, the item's value is discarded during node construction.
    pub ignore: bool,
}

impl ItemAttributes {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ignore: false,
        }
    }

    pub fn ignored() -> Self {
        Self {
            name: None,
            ignore: true,
        }
    }

    pub fn is_named(&self) -> bool {
        self.name.is_some()
    }
}

/// A single item inside an alternative.
///
/// This is a flat tagged enum rather than a class hierarchy: code
/// generation becomes one `match` over the variant instead of a virtual
/// dispatch through a base type. Every variant carries its own
/// [`ItemAttributes`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Item {
    /// Match an exact string.
    Literal { text: String, attrs: ItemAttributes },
    /// Match a regular expression at the cursor.
    Regex { pattern: String, attrs: ItemAttributes },
    /// Invoke another rule by name.
    RuleRef { rule_name: String, attrs: ItemAttributes },
    /// `item?`
    Maybe { inner: Box<Item>, attrs: ItemAttributes },
    /// `item*`
    ZeroOrMore { inner: Box<Item>, attrs: ItemAttributes },
    /// `item+`
    OneOrMore { inner: Box<Item>, attrs: ItemAttributes },
    /// `&item`
    Lookahead { inner: Box<Item>, attrs: ItemAttributes },
    /// `!item`
    NegativeLookahead { inner: Box<Item>, attrs: ItemAttributes },
    /// `{ element separator ... }+`
    SepBy {
        element: Box<Item>,
        separator: Box<Item>,
        attrs: ItemAttributes,
    },
    /// `{ element separator ... }*`
    MaybeSepBy {
        element: Box<Item>,
        separator: Box<Item>,
        attrs: ItemAttributes,
    },
    /// `~`, the commit marker.
    Cut { attrs: ItemAttributes },
    /// `EOF`
    Eof { attrs: ItemAttributes },
}

impl Item {
    pub fn attrs(&self) -> &ItemAttributes {
        match self {
            Item::Literal { attrs, .. }
            | Item::Regex { attrs, .. }
            | Item::RuleRef { attrs, .. }
            | Item::Maybe { attrs, .. }
            | Item::ZeroOrMore { attrs, .. }
            | Item::OneOrMore { attrs, .. }
            | Item::Lookahead { attrs, .. }
            | Item::NegativeLookahead { attrs, .. }
            | Item::SepBy { attrs, .. }
            | Item::MaybeSepBy { attrs, .. }
            | Item::Cut { attrs }
            | Item::Eof { attrs } => attrs,
        }
    }

    pub fn attrs_mut(&mut self) -> &mut ItemAttributes {
        match self {
            Item::Literal { attrs, .. }
            | Item::Regex { attrs, .. }
            | Item::RuleRef { attrs, .. }
            | Item::Maybe { attrs, .. }
            | Item::ZeroOrMore { attrs, .. }
            | Item::OneOrMore { attrs, .. }
            | Item::Lookahead { attrs, .. }
            | Item::NegativeLookahead { attrs, .. }
            | Item::SepBy { attrs, .. }
            | Item::MaybeSepBy { attrs, .. }
            | Item::Cut { attrs }
            | Item::Eof { attrs } => attrs,
        }
    }

    /// The single item this one wraps, for the quantifier/lookahead/sep-by
    /// variants that nest exactly one "first" item. Used when peeling
    /// wrappers to find the leading item of an alternative (left-recursion
    /// detection).
    fn nested_first(&self) -> Option<&Item> {
        match self {
            Item::Maybe { inner, .. }
            | Item::ZeroOrMore { inner, .. }
            | Item::OneOrMore { inner, .. }
            | Item::Lookahead { inner, .. }
            | Item::NegativeLookahead { inner, .. } => Some(inner),
            Item::SepBy { element, .. } | Item::MaybeSepBy { element, .. } => Some(element),
            _ => None,
        }
    }

    /// Peel quantifier/lookahead/sep-by wrappers to find the leading item,
    /// per the left-recursion detection rule in the design notes.
    pub fn peel_to_leading_item(&self) -> &Item {
        let mut current = self;
        while let Some(inner) = current.nested_first() {
            current = inner;
        }
        current
    }

    /// Name of the rule this item refers to, if it refers to one
    /// directly (not peeled through wrappers).
    pub fn rule_ref_name(&self) -> Option<&str> {
        match self {
            Item::RuleRef { rule_name, .. } => Some(rule_name.as_str()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule_ref(name: &str) -> Item {
        Item::RuleRef {
            rule_name: name.to_string(),
            attrs: ItemAttributes::default(),
        }
    }

    #[test]
    fn peels_through_nested_wrappers() {
        let item = Item::Maybe {
            inner: Box::new(Item::ZeroOrMore {
                inner: Box::new(rule_ref("expr")),
                attrs: ItemAttributes::default(),
            }),
            attrs: ItemAttributes::default(),
        };
        assert_eq!(item.peel_to_leading_item().rule_ref_name(), Some("expr"));
    }

    #[test]
    fn sep_by_peels_to_its_element() {
        let item = Item::SepBy {
            element: Box::new(rule_ref("expr")),
            separator: Box::new(Item::Literal {
                text: ",".into(),
                attrs: ItemAttributes::default(),
            }),
            attrs: ItemAttributes::default(),
        };
        assert_eq!(item.peel_to_leading_item().rule_ref_name(), Some("expr"));
    }

    #[test]
    fn literal_peels_to_itself() {
        let item = Item::Literal {
            text: "x".into(),
            attrs: ItemAttributes::default(),
        };
        assert!(std::ptr::eq(item.peel_to_leading_item(), &item));
    }
}
