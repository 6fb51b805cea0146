//! Compiles grammar text (§4.4 syntax) into `corvid_core::Grammar`, and
//! lowers a `Grammar` into the source of a standalone parser struct
//! built on `corvid_runtime`.

mod ast;
mod codegen;
mod error;
mod frontend;

use corvid_core::Grammar;

pub use error::Error;

/// Parses and validates grammar text, producing a typed `Grammar`.
///
/// Fails with [`Error::Parse`] if the text does not conform to the
/// grammar language's syntax, or [`Error::Validation`] if it parses
/// but violates a structural invariant (duplicate rule or item name,
/// undefined rule reference).
pub fn compile(grammar_text: &str) -> Result<Grammar, Error> {
    let mut parser = frontend::GrammarParser::new(grammar_text, None);
    let node = parser.grammar()?;
    ast::lower_grammar(&node)
}

/// Lowers a validated `Grammar` into the source text of a parser
/// struct named `class_name`.
pub fn generate(grammar: &Grammar, class_name: &str) -> String {
    codegen::generate(grammar, class_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compiles_a_small_grammar() {
        let grammar = compile("expr: term\nterm: r\"[0-9]+\"\n").unwrap();
        assert_eq!(grammar.rules.len(), 2);
        assert_eq!(grammar.rules[0].name, "expr");
        assert_eq!(grammar.rules[1].name, "term");
    }

    #[test]
    fn compiles_left_recursion_and_alternation() {
        let grammar = compile("expr: expr \"+\" term | term\nterm: r\"[0-9]+\"\n").unwrap();
        assert!(grammar.rules[0].is_left_recursive());
    }

    #[test]
    fn rejects_undefined_rule_references() {
        let err = compile("expr: missing\n").unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn rejects_invalid_regex_patterns() {
        let err = compile("term: r\"[0-9\"\n").unwrap_err();
        assert!(matches!(
            err,
            Error::Validation(corvid_core::GrammarError::InvalidRegex { .. })
        ));
    }

    #[test]
    fn rejects_malformed_grammar_text() {
        let err = compile("expr :=\n").unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
    }

    #[test]
    fn settings_and_verbatim_blocks_round_trip() {
        let text = "@verbatim\n%{\nfn helper() {}\n%}\n@set trace\nexpr: r\"[0-9]+\"\n";
        let grammar = compile(text).unwrap();
        assert_eq!(grammar.prelude, vec!["fn helper() {}".to_string()]);
        assert!(grammar.is_set("trace"));
    }

    #[test]
    fn generates_a_parser_struct_from_a_compiled_grammar() {
        let grammar = compile("expr: term\nterm: r\"[0-9]+\"\n").unwrap();
        let src = generate(&grammar, "ExampleParser");
        assert!(src.contains("pub struct ExampleParser<'a>"));
        assert!(src.contains("pub fn expr(&mut self) -> ParseResult<Node>"));
    }
}
