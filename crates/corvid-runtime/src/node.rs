//! The parse-tree value type `_wrap_node` produces, and the rule-handler
//! hook that can rewrite it.

use corvid_core::ItemAttributes;
use indexmap::IndexMap;

/// A wrapped parse result: a mapping (when an alternative names its
/// items), a sequence (when it retains more than one unnamed item), a
/// single leaf value (when exactly one item is retained), or the
/// distinguished absence sentinel a failed `Maybe` collapses to.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Matched text from a literal or regex item.
    Text(String),
    /// The ordered values of an alternative that retains more than one
    /// unnamed item, or the elements of a repeat/sep-by.
    Seq(Vec<Node>),
    /// The named fields of an alternative where at least one item has a
    /// binding name.
    Map(IndexMap<String, Node>),
    /// What a `Maybe` collapses to when its inner item did not match.
    Absent,
}

impl Node {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Node::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_seq(&self) -> Option<&[Node]> {
        match self {
            Node::Seq(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&IndexMap<String, Node>> {
        match self {
            Node::Map(fields) => Some(fields),
            _ => None,
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Node::Absent)
    }
}

impl From<String> for Node {
    fn from(s: String) -> Self {
        Node::Text(s)
    }
}

impl From<Vec<Node>> for Node {
    fn from(items: Vec<Node>) -> Self {
        Node::Seq(items)
    }
}

impl From<Option<Node>> for Node {
    fn from(value: Option<Node>) -> Self {
        value.unwrap_or(Node::Absent)
    }
}

impl From<()> for Node {
    fn from(_: ()) -> Self {
        Node::Absent
    }
}

/// Post-processes the node a rule produces. Generated parsers hold an
/// optional `&dyn RuleHandler`; each rule method, after `_wrap_node`,
/// dispatches through it by rule name. The default method returns the
/// node unchanged, so implementors only override the rules they care
/// about.
pub trait RuleHandler {
    fn handle(&self, rule_name: &str, node: Node) -> Node {
        let _ = rule_name;
        node
    }
}

/// A handler that never rewrites anything, used when a generated parser
/// is constructed without one.
pub struct NoopRuleHandler;

impl RuleHandler for NoopRuleHandler {}

/// Builds the node for a matched alternative: filters out `ignore`d
/// items, collects named items into a mapping (names are unique by the
/// grammar's own item-name invariant), else collapses a single retained
/// value, else returns the ordered sequence. Then dispatches through the
/// rule handler, if any.
pub fn wrap_node(
    rule_name: &str,
    values: Vec<Node>,
    attributes: &[ItemAttributes],
    handler: Option<&dyn RuleHandler>,
) -> Node {
    debug_assert_eq!(values.len(), attributes.len());

    let mut named = IndexMap::new();
    let mut unnamed = Vec::new();
    for (value, attrs) in values.into_iter().zip(attributes) {
        if attrs.ignore {
            continue;
        }
        if let Some(name) = &attrs.name {
            let previous = named.insert(name.clone(), value);
            debug_assert!(previous.is_none(), "duplicate item name '{name}'");
        } else {
            unnamed.push(value);
        }
    }

    let node = if !named.is_empty() {
        Node::Map(named)
    } else if unnamed.len() == 1 {
        unnamed.into_iter().next().unwrap()
    } else {
        Node::Seq(unnamed)
    };

    match handler {
        Some(h) => h.handle(rule_name, node),
        None => node,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn option_none_collapses_to_absent() {
        let node: Node = None.into();
        assert!(node.is_absent());
    }

    #[test]
    fn option_some_unwraps() {
        let node: Node = Some(Node::Text("x".into())).into();
        assert_eq!(node.as_text(), Some("x"));
    }

    #[test]
    fn noop_handler_returns_node_unchanged() {
        let handler = NoopRuleHandler;
        let node = Node::Text("a".into());
        assert_eq!(handler.handle("whatever", node.clone()), node);
    }

    #[test]
    fn wrap_node_collapses_single_retained_value() {
        let values = vec![
            Node::Text("[".into()),
            Node::Seq(vec![]),
            Node::Text("]".into()),
        ];
        let attrs = vec![
            ItemAttributes::default(),
            ItemAttributes::default(),
            ItemAttributes::default(),
        ];
        let result = wrap_node("list", values, &attrs, None);
        assert_eq!(
            result,
            Node::Seq(vec![
                Node::Text("[".into()),
                Node::Seq(vec![]),
                Node::Text("]".into()),
            ])
        );
    }

    #[test]
    fn wrap_node_drops_ignored_items() {
        let values = vec![Node::Text("(".into()), Node::Text("x".into())];
        let attrs = vec![ItemAttributes::ignored(), ItemAttributes::default()];
        let result = wrap_node("paren", values, &attrs, None);
        assert_eq!(result, Node::Text("x".into()));
    }

    #[test]
    fn wrap_node_builds_map_when_any_item_is_named() {
        let values = vec![Node::Text("(".into()), Node::Text("x".into())];
        let attrs = vec![ItemAttributes::ignored(), ItemAttributes::named("inner")];
        let result = wrap_node("paren", values, &attrs, None);
        let map = result.as_map().expect("expected a map");
        assert_eq!(map.get("inner").and_then(Node::as_text), Some("x"));
    }

    #[test]
    fn wrap_node_dispatches_through_handler() {
        struct Uppercase;
        impl RuleHandler for Uppercase {
            fn handle(&self, rule_name: &str, node: Node) -> Node {
                if rule_name == "word" {
                    if let Node::Text(s) = node {
                        return Node::Text(s.to_uppercase());
                    }
                }
                node
            }
        }
        let result = wrap_node(
            "word",
            vec![Node::Text("hi".into())],
            &[ItemAttributes::default()],
            Some(&Uppercase),
        );
        assert_eq!(result, Node::Text("HI".into()));
    }
}
