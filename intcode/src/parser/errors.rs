use std::num::ParseIntError;

use miette::SourceSpan;
use nom::error::ErrorKind;
use nom::Offset;

pub trait ParseError<I>:
    nom::error::ParseError<I> + nom::error::FromExternalError<I, ParseIntError>
{
}

impl<I, E> ParseError<I> for E where
    E: nom::error::ParseError<I> + nom::error::FromExternalError<I, ParseIntError>
{
}

/// Error accumulated by the parsers, pointing into the input
#[derive(Debug)]
pub enum Error<I> {
    Char {
        input: I,
        needed: char,
    },
    Nom {
        input: I,
        kind: ErrorKind,
    },
    ParseIntError {
        input: I,
        inner: ParseIntError,
    },
}

impl<I> Error<I> {
    pub fn input(&self) -> &I {
        match self {
            Self::Char { input, .. }
            | Self::Nom { input, .. }
            | Self::ParseIntError { input, .. } => input,
        }
    }
}

impl Error<&str> {
    /// Locate the error in the source it was produced from
    pub(crate) fn to_syntax_error(&self, source: &str) -> SyntaxError {
        let input = *self.input();
        let offset = source.offset(input);
        let (reason, len) = match self {
            Self::Char { needed, .. } => (Reason::ExpectedChar(*needed), 1),
            Self::Nom {
                kind: ErrorKind::Eof,
                ..
            } => (Reason::TrailingInput, 1),
            Self::Nom { .. } => (Reason::ExpectedWord, 1),
            Self::ParseIntError { inner, .. } => {
                let len = input
                    .find(|c: char| !(c.is_ascii_digit() || c == '-' || c == '+'))
                    .unwrap_or(input.len());
                (Reason::OutOfRange(inner.clone()), len)
            }
        };

        // Do not point past the end of the source
        let len = len.min(input.len());
        SyntaxError {
            span: (offset, len).into(),
            reason,
        }
    }
}

impl<I> nom::error::ParseError<I> for Error<I> {
    fn from_error_kind(input: I, kind: ErrorKind) -> Self {
        Self::Nom { input, kind }
    }

    fn append(_input: I, _kind: ErrorKind, other: Self) -> Self {
        // Keep the innermost error, it is the most precise one
        other
    }

    fn from_char(input: I, needed: char) -> Self {
        Self::Char { input, needed }
    }
}

impl<I> nom::error::FromExternalError<I, ParseIntError> for Error<I> {
    fn from_external_error(input: I, _kind: ErrorKind, inner: ParseIntError) -> Self {
        Self::ParseIntError { input, inner }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Reason {
    #[error("expected '{0}'")]
    ExpectedChar(char),

    #[error("expected a number")]
    ExpectedWord,

    #[error("unexpected trailing input")]
    TrailingInput,

    #[error("number out of range ({0})")]
    OutOfRange(ParseIntError),
}

/// A program text could not be parsed
///
/// The source code is not embedded in the diagnostic, attach it when
/// reporting with [`miette::Report::with_source_code`].
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
#[error("invalid program: {reason}")]
#[diagnostic(code(intcode::parse))]
pub struct SyntaxError {
    #[label("{reason}")]
    span: SourceSpan,

    reason: Reason,
}

impl SyntaxError {
    /// Byte offset of the error in the source
    #[must_use]
    pub fn offset(&self) -> usize {
        self.span.offset()
    }

    #[must_use]
    pub fn reason(&self) -> &Reason {
        &self.reason
    }
}
