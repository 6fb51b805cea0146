//! The two error kinds a generated parser can raise, and the unified
//! failure type combinators and rule bodies propagate.

use corvid_core::SourceLocation;

/// A recoverable parse failure: the enclosing ordered choice may still try
/// another alternative.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message} (at {location})")]
pub struct ParseError {
    pub message: String,
    pub location: SourceLocation,
}

impl ParseError {
    pub fn new(message: impl Into<String>, location: SourceLocation) -> Self {
        Self {
            message: message.into(),
            location,
        }
    }
}

/// A fatal parse failure produced once an alternative has executed a cut.
/// It carries the same payload as the `ParseError` that triggered it but
/// is never caught by ordered-choice recovery.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message} (at {location})")]
pub struct CutError {
    pub message: String,
    pub location: SourceLocation,
}

impl CutError {
    pub fn new(message: impl Into<String>, location: SourceLocation) -> Self {
        Self {
            message: message.into(),
            location,
        }
    }
}

impl From<ParseError> for CutError {
    fn from(e: ParseError) -> Self {
        Self {
            message: e.message,
            location: e.location,
        }
    }
}

/// The error type every fallible runtime and generated-parser operation
/// returns. Combinators catch only the `Recoverable` variant; `Cut`
/// propagates through them unconditionally.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseFailure {
    #[error(transparent)]
    Recoverable(#[from] ParseError),
    #[error(transparent)]
    Cut(#[from] CutError),
}

impl ParseFailure {
    pub fn location(&self) -> SourceLocation {
        match self {
            ParseFailure::Recoverable(e) => e.location,
            ParseFailure::Cut(e) => e.location,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ParseFailure::Recoverable(e) => &e.message,
            ParseFailure::Cut(e) => &e.message,
        }
    }

    /// The `"parse error: <message> (at <line>:<column>)"` user-facing
    /// rendering, distinct from the `Display` impl used for error chains.
    pub fn render(&self) -> String {
        format!("parse error: {} (at {})", self.message(), self.location())
    }
}

pub type ParseResult<T> = Result<T, ParseFailure>;

#[cfg(test)]
mod tests {
    use super::*;

    fn loc() -> SourceLocation {
        SourceLocation {
            offset: 3,
            line: 1,
            column: 4,
        }
    }

    #[test]
    fn cut_from_parse_error_preserves_payload() {
        let pe = ParseError::new("expected ')'", loc());
        let ce: CutError = pe.clone().into();
        assert_eq!(ce.message, pe.message);
        assert_eq!(ce.location, pe.location);
    }

    #[test]
    fn render_matches_user_facing_format() {
        let failure = ParseFailure::Recoverable(ParseError::new("expected a term", loc()));
        assert_eq!(failure.render(), "parse error: expected a term (at 1:4)");
    }
}
