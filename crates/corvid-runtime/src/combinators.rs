//! The six runtime combinators generated parser code composes items
//! with: `maybe`, `repeat`, `lookahead`, `not_lookahead`, `sep_by`, and
//! `maybe_sep_by`. Each takes closures over a generic parser `P` so it
//! can be called with any generated parser type, not just one concrete
//! struct.

use crate::base::RuntimeParser;
use crate::error::{ParseError, ParseFailure, ParseResult};
use crate::node::Node;

/// `item?` — absent is not a failure, it is the distinguished `None`.
pub fn maybe<P: RuntimeParser, T>(
    parser: &mut P,
    f: impl FnOnce(&mut P) -> ParseResult<T>,
) -> ParseResult<Option<T>> {
    let pos = parser.mark();
    match f(parser) {
        Ok(value) => Ok(Some(value)),
        Err(ParseFailure::Cut(e)) => Err(ParseFailure::Cut(e)),
        Err(ParseFailure::Recoverable(_)) => {
            parser.rewind(pos);
            Ok(None)
        }
    }
}

/// `item*` (`min == 0`) or `item+` (`min == 1`).
pub fn repeat<P: RuntimeParser, T>(
    parser: &mut P,
    min: usize,
    mut f: impl FnMut(&mut P) -> ParseResult<T>,
) -> ParseResult<Vec<T>> {
    let start = parser.mark();
    let mut items = Vec::new();
    loop {
        let pos = parser.mark();
        match f(parser) {
            Ok(value) => items.push(value),
            Err(ParseFailure::Cut(e)) => return Err(ParseFailure::Cut(e)),
            Err(ParseFailure::Recoverable(_)) => {
                parser.rewind(pos);
                break;
            }
        }
    }

    if items.len() >= min {
        Ok(items)
    } else {
        parser.rewind(start);
        let location = parser.current_location();
        Err(ParseFailure::Recoverable(ParseError::new(
            format!("expected at least {min} repetition(s)"),
            location,
        )))
    }
}

/// `&item` — a zero-width assertion; the cursor is restored regardless
/// of outcome.
pub fn lookahead<P: RuntimeParser, T>(
    parser: &mut P,
    f: impl FnOnce(&mut P) -> ParseResult<T>,
) -> ParseResult<T> {
    let pos = parser.mark();
    let result = f(parser);
    parser.rewind(pos);
    result
}

/// `!item` — succeeds iff `item` would fail, consuming nothing either
/// way. Propagates a cut unconditionally, same as its underlying
/// `lookahead`.
pub fn not_lookahead<P: RuntimeParser, T>(
    parser: &mut P,
    f: impl FnOnce(&mut P) -> ParseResult<T>,
) -> ParseResult<()> {
    match lookahead(parser, f) {
        Ok(_) => {
            let location = parser.current_location();
            Err(ParseFailure::Recoverable(ParseError::new(
                "negative lookahead matched",
                location,
            )))
        }
        Err(ParseFailure::Cut(e)) => Err(ParseFailure::Cut(e)),
        Err(ParseFailure::Recoverable(_)) => Ok(()),
    }
}

/// `{ elem sep ... }+` — requires at least one element; elements and
/// separators are returned interleaved, in match order.
pub fn sep_by<P: RuntimeParser>(
    parser: &mut P,
    mut elem: impl FnMut(&mut P) -> ParseResult<Node>,
    mut sep: impl FnMut(&mut P) -> ParseResult<Node>,
) -> ParseResult<Vec<Node>> {
    let outer_start = parser.mark();
    let first = elem(parser)?;
    let mut items = vec![first];

    loop {
        let pos = parser.mark();
        match sep(parser) {
            Ok(sep_value) => match elem(parser) {
                Ok(elem_value) => {
                    items.push(sep_value);
                    items.push(elem_value);
                }
                Err(ParseFailure::Cut(e)) => return Err(ParseFailure::Cut(e)),
                Err(ParseFailure::Recoverable(_)) => {
                    parser.rewind(outer_start);
                    let location = parser.current_location();
                    return Err(ParseFailure::Recoverable(ParseError::new(
                        "expected an element after separator",
                        location,
                    )));
                }
            },
            Err(ParseFailure::Cut(e)) => return Err(ParseFailure::Cut(e)),
            Err(ParseFailure::Recoverable(_)) => {
                parser.rewind(pos);
                break;
            }
        }
    }

    Ok(items)
}

/// `{ elem sep ... }*` — as [`sep_by`] but an empty sequence is not a
/// failure.
pub fn maybe_sep_by<P: RuntimeParser>(
    parser: &mut P,
    mut elem: impl FnMut(&mut P) -> ParseResult<Node>,
    mut sep: impl FnMut(&mut P) -> ParseResult<Node>,
) -> ParseResult<Vec<Node>> {
    let pos = parser.mark();
    match sep_by(parser, &mut elem, &mut sep) {
        Ok(items) => Ok(items),
        Err(ParseFailure::Cut(e)) => Err(ParseFailure::Cut(e)),
        Err(ParseFailure::Recoverable(_)) => {
            parser.rewind(pos);
            Ok(Vec::new())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::ParserBase;

    fn digits(p: &mut ParserBase) -> ParseResult<Node> {
        p.expect_regex("[0-9]+", "a digit run")
    }

    fn comma(p: &mut ParserBase) -> ParseResult<Node> {
        p.expect_string(",", false)
    }

    #[test]
    fn maybe_returns_none_without_consuming_on_failure() {
        let mut base = ParserBase::new("abc", 0);
        let result = maybe(&mut base, |p| p.expect_string("xyz", false)).unwrap();
        assert_eq!(result, None);
        assert_eq!(base.mark(), 0);
    }

    #[test]
    fn maybe_returns_some_on_success() {
        let mut base = ParserBase::new("abc", 0);
        let result = maybe(&mut base, |p| p.expect_string("abc", false)).unwrap();
        assert_eq!(result, Some(Node::Text("abc".into())));
    }

    #[test]
    fn repeat_zero_or_more_collects_all_matches() {
        let mut base = ParserBase::new("aaab", 0);
        let result = repeat(&mut base, 0, |p| p.expect_string("a", false)).unwrap();
        assert_eq!(result.len(), 3);
        assert_eq!(base.mark(), 3);
    }

    #[test]
    fn repeat_one_or_more_fails_below_minimum() {
        let mut base = ParserBase::new("b", 0);
        let err = repeat(&mut base, 1, |p| p.expect_string("a", false)).unwrap_err();
        assert!(matches!(err, ParseFailure::Recoverable(_)));
        assert_eq!(base.mark(), 0);
    }

    #[test]
    fn lookahead_restores_cursor_on_success() {
        let mut base = ParserBase::new("abc", 0);
        lookahead(&mut base, |p| p.expect_string("abc", false)).unwrap();
        assert_eq!(base.mark(), 0);
    }

    #[test]
    fn not_lookahead_succeeds_when_inner_fails() {
        let mut base = ParserBase::new("abc", 0);
        not_lookahead(&mut base, |p| p.expect_string("xyz", false)).unwrap();
        assert_eq!(base.mark(), 0);
    }

    #[test]
    fn not_lookahead_fails_when_inner_succeeds() {
        let mut base = ParserBase::new("abc", 0);
        assert!(not_lookahead(&mut base, |p| p.expect_string("abc", false)).is_err());
    }

    #[test]
    fn sep_by_interleaves_elements_and_separators() {
        let mut base = ParserBase::new("a,b,c", 0);
        let items = sep_by(
            &mut base,
            |p| p.expect_regex("[a-z]+", "a letter run"),
            comma,
        )
        .unwrap();
        let rendered: Vec<&str> = items.iter().map(|n| n.as_text().unwrap()).collect();
        assert_eq!(rendered, vec!["a", ",", "b", ",", "c"]);
    }

    #[test]
    fn sep_by_fails_on_trailing_separator() {
        let mut base = ParserBase::new("a,", 0);
        let err = sep_by(
            &mut base,
            |p| p.expect_regex("[a-z]+", "a letter run"),
            comma,
        )
        .unwrap_err();
        assert!(matches!(err, ParseFailure::Recoverable(_)));
        assert_eq!(base.mark(), 0);
    }

    #[test]
    fn maybe_sep_by_returns_empty_when_nothing_matches() {
        let mut base = ParserBase::new("!!!", 0);
        let items = maybe_sep_by(
            &mut base,
            |p| p.expect_regex("[a-z]+", "a letter run"),
            comma,
        )
        .unwrap();
        assert!(items.is_empty());
        assert_eq!(base.mark(), 0);
    }

    #[test]
    fn digits_helper_is_reused_across_tests() {
        let mut base = ParserBase::new("42", 0);
        assert_eq!(digits(&mut base).unwrap(), Node::Text("42".into()));
    }
}
