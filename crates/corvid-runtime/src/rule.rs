//! Memoized rule invocation: plain packrat caching for non-recursive
//! rules, and seed-and-grow for rules that are left-recursive.

use corvid_core::RuleId;

use crate::base::RuntimeParser;
use crate::error::{CutError, ParseError, ParseFailure, ParseResult};
use crate::memo::CacheEntry;
use crate::node::Node;

/// Runs one alternative's body inside the backtracking scope every
/// alternative needs: on a recoverable failure the cursor rewinds to
/// `pos`, and the failure is promoted to a `CutError` if `body` set its
/// `cut` flag before failing. A generated rule method tries each of its
/// alternatives through this in source order, stopping at the first
/// `Ok` or `Cut`.
pub fn try_alternative<P: RuntimeParser>(
    parser: &mut P,
    pos: usize,
    body: impl FnOnce(&mut P, &mut bool) -> Result<Node, ParseFailure>,
) -> Result<Node, ParseFailure> {
    let mut cut = false;
    match body(parser, &mut cut) {
        Ok(node) => Ok(node),
        Err(ParseFailure::Cut(e)) => Err(ParseFailure::Cut(e)),
        Err(ParseFailure::Recoverable(e)) => {
            parser.rewind(pos);
            if cut {
                Err(ParseFailure::Cut(CutError::from(e)))
            } else {
                Err(ParseFailure::Recoverable(e))
            }
        }
    }
}

/// Invokes `body` at the cursor, memoized by `(position, rule_id)`. On
/// a cache hit, replays the stored outcome and restores the stored end
/// position without re-running `body`.
pub fn parsing_rule<P: RuntimeParser>(
    parser: &mut P,
    rule_id: RuleId,
    body: impl FnOnce(&mut P) -> Result<Node, ParseFailure>,
) -> Result<Node, ParseFailure> {
    parser.consume_non_significant();
    let position = parser.mark();
    let id = rule_id.as_u32() as usize;

    if let Some(entry) = parser.cache().get(position, id) {
        let outcome = entry.outcome.clone();
        let end_position = entry.end_position;
        parser.rewind(end_position);
        return outcome;
    }

    let outcome = body(parser);
    let end_position = parser.mark();
    parser.rewind(position);
    parser.cache_mut().set(
        position,
        id,
        CacheEntry {
            outcome: outcome.clone(),
            end_position,
        },
    );
    parser.rewind(end_position);
    outcome
}

/// After a rule's last alternative has been tried, turns a recoverable
/// failure into the rule-exhaustion error every rule raises once none
/// of its alternatives match: `"expected a <rule_name>"` at the
/// position the rule started trying alternatives from. `Cut` failures
/// and successes pass through unchanged.
pub fn rule_exhausted<P: RuntimeParser>(
    parser: &mut P,
    rule_name: &str,
    result: ParseResult<Node>,
) -> ParseResult<Node> {
    match result {
        Err(ParseFailure::Recoverable(_)) => {
            let location = parser.current_location();
            Err(ParseFailure::Recoverable(ParseError::new(
                format!("expected a {rule_name}"),
                location,
            )))
        }
        other => other,
    }
}

/// Invokes a left-recursive rule's body using Warth/Medeiros
/// seed-and-grow: seed the cache with a failing outcome at `position`
/// so the first recursive call into the same rule at the same position
/// fails immediately (preventing infinite recursion), then repeatedly
/// re-run `body` from `position` — each run can see the previous run's
/// cached result through the recursive call — replacing the cached
/// outcome as long as the end position strictly grows. Stops and
/// replays the last successful growth once a run fails to advance
/// further.
pub fn left_recursive_parsing_rule<P: RuntimeParser>(
    parser: &mut P,
    rule_id: RuleId,
    mut body: impl FnMut(&mut P) -> Result<Node, ParseFailure>,
) -> Result<Node, ParseFailure> {
    parser.consume_non_significant();
    let position = parser.mark();
    let id = rule_id.as_u32() as usize;

    if let Some(entry) = parser.cache().get(position, id) {
        let outcome = entry.outcome.clone();
        let end_position = entry.end_position;
        parser.rewind(end_position);
        return outcome;
    }

    let seed_location = {
        parser.rewind(position);
        parser.current_location()
    };
    parser.cache_mut().set(
        position,
        id,
        CacheEntry {
            outcome: Err(ParseFailure::Recoverable(crate::error::ParseError::new(
                "left-recursive rule has no seed yet",
                seed_location,
            ))),
            end_position: position,
        },
    );

    let mut best_outcome;
    let mut best_end = position;

    loop {
        parser.rewind(position);
        let outcome = body(parser);
        let end_position = parser.mark();

        let grew = match &outcome {
            Ok(_) => end_position > best_end,
            Err(_) => false,
        };

        if !grew {
            break;
        }

        best_outcome = outcome;
        best_end = end_position;
        parser.cache_mut().set(
            position,
            id,
            CacheEntry {
                outcome: best_outcome.clone(),
                end_position: best_end,
            },
        );
    }

    let final_entry = parser
        .cache()
        .get(position, id)
        .expect("seed was just inserted")
        .clone();
    parser.rewind(final_entry.end_position);
    final_entry.outcome
}
