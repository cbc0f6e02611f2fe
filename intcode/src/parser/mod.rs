//! Program text parsing
//!
//! A program is a list of signed decimal numbers separated by commas, with
//! any amount of whitespace (newlines included) around them. The parsing is
//! handled by the `nom` library.

use nom::character::complete::{char, digit1, multispace0, one_of};
use nom::combinator::{all_consuming, cut, map_res, opt, recognize};
use nom::multi::separated_list1;
use nom::sequence::{delimited, pair};
use nom::{Finish, IResult};

use crate::constants::Word;

mod errors;

pub use errors::{Error, ParseError, Reason, SyntaxError};

/// Parse a signed decimal number
pub(crate) fn parse_word<'a, Error: ParseError<&'a str>>(
    input: &'a str,
) -> IResult<&'a str, Word, Error> {
    map_res(recognize(pair(opt(one_of("+-")), digit1)), str::parse::<Word>)(input)
}

fn parse_separator<'a, Error: ParseError<&'a str>>(
    input: &'a str,
) -> IResult<&'a str, char, Error> {
    delimited(multispace0, char(','), multispace0)(input)
}

/// Parse a comma-separated list of numbers, surrounded by whitespace
///
/// A separator must be followed by a number, so trailing commas are rejected.
pub(crate) fn parse_program<'a, Error: ParseError<&'a str>>(
    input: &'a str,
) -> IResult<&'a str, Vec<Word>, Error> {
    delimited(
        multispace0,
        separated_list1(parse_separator, cut(parse_word)),
        multispace0,
    )(input)
}

/// Parse a program text into a memory image
///
/// # Errors
///
/// This function will return an error if the text is not a valid program
pub fn parse(input: &str) -> Result<Vec<Word>, SyntaxError> {
    let (_, program) = all_consuming(parse_program::<Error<&str>>)(input)
        .finish()
        .map_err(|e| e.to_syntax_error(input))?;

    Ok(program)
}

#[cfg(test)]
mod tests {
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn parse_word_test() {
        type R<'a> = IResult<&'a str, Word, ()>;
        assert_eq!(parse_word("42"), R::Ok(("", 42)));
        assert_eq!(parse_word("-34,"), R::Ok((",", -34)));
        assert_eq!(parse_word("+7"), R::Ok(("", 7)));
        assert_eq!(
            parse_word("1125899906842624"),
            R::Ok(("", 1_125_899_906_842_624))
        );
        assert_eq!(parse_word("abc"), R::Err(nom::Err::Error(())));
        assert_eq!(parse_word("-"), R::Err(nom::Err::Error(())));
    }

    #[test]
    fn parse_test() {
        assert_eq!(parse("1,0,0,3,99").unwrap(), vec![1, 0, 0, 3, 99]);
        assert_eq!(parse("104,-1,99\n").unwrap(), vec![104, -1, 99]);
        assert_eq!(parse("  3 , 0 ,4,0,99  ").unwrap(), vec![3, 0, 4, 0, 99]);

        let source = indoc! {"
            3,9,8,9,
            10,9,4,9,
            99,-1,8
        "};
        assert_eq!(
            parse(source).unwrap(),
            vec![3, 9, 8, 9, 10, 9, 4, 9, 99, -1, 8]
        );
    }

    #[test]
    fn parse_error_test() {
        // Trailing comma
        let err = parse("1,2,").unwrap_err();
        assert_eq!(err.reason(), &Reason::ExpectedWord);
        assert_eq!(err.offset(), 4);

        let err = parse("1,,2").unwrap_err();
        assert_eq!(err.reason(), &Reason::ExpectedWord);
        assert_eq!(err.offset(), 2);

        let err = parse("1,2;3").unwrap_err();
        assert_eq!(err.reason(), &Reason::TrailingInput);
        assert_eq!(err.offset(), 3);

        let err = parse("").unwrap_err();
        assert_eq!(err.reason(), &Reason::ExpectedWord);
        assert_eq!(err.offset(), 0);

        let err = parse("1,99999999999999999999").unwrap_err();
        assert!(matches!(err.reason(), Reason::OutOfRange(_)));
        assert_eq!(err.offset(), 2);
    }
}
