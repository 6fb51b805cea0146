//! CLI entry point: reads a grammar file, compiles it, and either
//! validates it (`--check`) or emits a generated parser's source.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

/// Generate a packrat PEG parser from a grammar file.
#[derive(Parser, Debug)]
#[command(name = "corvid", version, about)]
struct Cli {
    /// Path to the grammar file to compile.
    grammar: PathBuf,

    /// Name of the generated parser struct.
    #[arg(long, default_value = "GeneratedParser")]
    class_name: String,

    /// Write the generated source to this file instead of stdout.
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// Parse and validate the grammar without emitting code.
    #[arg(long)]
    check: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let text = match std::fs::read_to_string(&cli.grammar) {
        Ok(text) => text,
        Err(e) => {
            eprintln!("error: could not read {}: {e}", cli.grammar.display());
            return ExitCode::FAILURE;
        }
    };

    let grammar = match corvid_compiler::compile(&text) {
        Ok(grammar) => grammar,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };

    if cli.check {
        return ExitCode::SUCCESS;
    }

    let source = corvid_compiler::generate(&grammar, &cli.class_name);

    match cli.output {
        Some(path) => {
            if let Err(e) = std::fs::write(&path, source) {
                eprintln!("error: could not write {}: {e}", path.display());
                return ExitCode::FAILURE;
            }
        }
        None => print!("{source}"),
    }

    ExitCode::SUCCESS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_grammar_path_with_defaults() {
        let cli = Cli::try_parse_from(["corvid", "grammar.peg"]).unwrap();
        assert_eq!(cli.grammar, PathBuf::from("grammar.peg"));
        assert_eq!(cli.class_name, "GeneratedParser");
        assert_eq!(cli.output, None);
        assert!(!cli.check);
    }

    #[test]
    fn parses_all_flags() {
        let cli = Cli::try_parse_from([
            "corvid",
            "grammar.peg",
            "--class-name",
            "ArithParser",
            "--output",
            "out.rs",
            "--check",
        ])
        .unwrap();
        assert_eq!(cli.class_name, "ArithParser");
        assert_eq!(cli.output, Some(PathBuf::from("out.rs")));
        assert!(cli.check);
    }

    #[test]
    fn rejects_missing_grammar_argument() {
        assert!(Cli::try_parse_from(["corvid"]).is_err());
    }
}
