//! The crate-boundary error type: distinguishes a grammar that failed
//! to *parse* from one that parsed but failed *validation*.

use corvid_core::GrammarError;
use corvid_runtime::ParseFailure;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The grammar text itself did not conform to the grammar
    /// language's syntax.
    #[error("{0}")]
    Parse(#[from] ParseFailure),

    /// The grammar parsed but violates a structural invariant
    /// (duplicate rule, duplicate item name, undefined rule reference).
    #[error(transparent)]
    Validation(#[from] GrammarError),

    /// The parse tree produced by the bootstrap grammar parser did not
    /// have the shape its own grammar rules guarantee. Reaching this
    /// indicates a bug in the bootstrap parser, not a malformed input
    /// grammar.
    #[error("malformed parse tree: {0}")]
    MalformedParseTree(String),
}

impl Error {
    /// The `line:column` location to report for a parse failure, if
    /// this error carries one.
    pub fn location(&self) -> Option<corvid_core::SourceLocation> {
        match self {
            Error::Parse(e) => Some(e.location()),
            Error::Validation(_) | Error::MalformedParseTree(_) => None,
        }
    }
}

pub(crate) type LowerResult<T> = Result<T, Error>;

pub(crate) fn malformed(message: impl Into<String>) -> Error {
    Error::MalformedParseTree(message.into())
}
