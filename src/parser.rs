//! Query string parser using nom.
//!
//! Parses Lucene-style syntax into a raw parse tree that still mirrors the surface
//! grammar. Operator mapping, unescaping and range rewriting are left to the
//! normalizer.
//!
//! # Syntax Overview
//!
//! ```text
//! (title:"rust book" AND price:[*;30]) OR stock:>10
//! ┬──── ─┬ ─────┬─── ─┬─ ─────┬───── ─┬ ───┬─ ┬ ┬
//! │      │      │     │       │       │    │  │ └── Value
//! │      │      │     │       │       │    │  └── Atom operator (: :> :<)
//! │      │      │     │       │       │    └── Field
//! │      │      │     │       │       └── Boolean operator (AND OR ANDNOT)
//! │      │      │     │       └── Range, * marks an open side
//! │      │      │     └── Boolean operator
//! │      │      └── Quoted value
//! │      └── Atom operator
//! └── Group
//! ```

use nom::{
    branch::alt,
    bytes::complete::{tag, tag_no_case, take_while, take_while1},
    character::complete::{char, digit0, digit1, satisfy},
    combinator::{opt, recognize},
    error::{ErrorKind, ParseError},
    sequence::pair,
    IResult,
};

use crate::config::DEFAULT_MAX_DEPTH;
use crate::error::{ConvertError, ConvertResult, SyntaxReason};

/// A parsed query: one expression followed by operator/expression pairs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawQuery<'a> {
    /// First expression.
    pub head: RawExpr<'a>,
    /// Every following expression with the keyword joining it to the previous one.
    pub tail: Vec<(RawBoolOp<'a>, RawExpr<'a>)>,
}

/// A single atom or a parenthesized sub-query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawExpr<'a> {
    Atom(RawAtom<'a>),
    Group(Box<RawQuery<'a>>),
}

/// `field`, operator lexeme and value as written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawAtom<'a> {
    pub field: &'a str,
    /// `:`, `:>` or `:<`.
    pub operator: &'a str,
    pub value: RawValue<'a>,
    /// Byte offset of the field name in the query.
    pub position: usize,
}

/// Boolean keyword as written, in its original case.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawBoolOp<'a> {
    pub keyword: &'a str,
    /// Byte offset of the keyword in the query.
    pub position: usize,
}

/// An atom value, still carrying its quotes and escapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawValue<'a> {
    /// `[left;right]`, bounds still escaped.
    Range { left: &'a str, right: &'a str },
    /// Includes the surrounding quotes.
    Quoted(&'a str),
    /// A bare run that is not a number.
    Unquoted(&'a str),
    /// A bare run that reads as `digits ("." digits?)?`.
    Number(&'a str),
}

/// nom error carrying the reason once a parser has committed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrammarError<'a> {
    pub input: &'a str,
    pub reason: Option<SyntaxReason>,
}

impl<'a> ParseError<&'a str> for GrammarError<'a> {
    fn from_error_kind(input: &'a str, _kind: ErrorKind) -> Self {
        Self {
            input,
            reason: None,
        }
    }

    fn append(_input: &'a str, _kind: ErrorKind, other: Self) -> Self {
        other
    }
}

type PResult<'a, O> = IResult<&'a str, O, GrammarError<'a>>;

/// Parse a complete query string with the default nesting limit.
pub fn parse(input: &str) -> ConvertResult<RawQuery<'_>> {
    QueryParser::new(DEFAULT_MAX_DEPTH).parse(input)
}

/// Grammar parser with a bound on parenthesis nesting.
#[derive(Debug, Clone, Copy)]
pub struct QueryParser {
    max_depth: usize,
}

impl QueryParser {
    pub fn new(max_depth: usize) -> Self {
        Self { max_depth }
    }

    /// Parse the whole input; anything left over is an error.
    pub fn parse<'a>(&self, input: &'a str) -> ConvertResult<RawQuery<'a>> {
        let grammar = Grammar {
            source: input,
            max_depth: self.max_depth,
        };

        let error = match grammar.query(input, 0) {
            Ok(("", query)) => return Ok(query),
            Ok((remaining, _)) => trailing_error(remaining),
            Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => e,
            Err(nom::Err::Incomplete(_)) => GrammarError {
                input: &input[input.len()..],
                reason: Some(SyntaxReason::UnexpectedEnd),
            },
        };

        let position = grammar.offset(error.input);
        let reason = error
            .reason
            .unwrap_or_else(|| unexpected_input(error.input));
        Err(ConvertError::syntax(position, reason))
    }
}

/// Per-call parsing state: the full source for offsets, plus the depth limit.
struct Grammar<'a> {
    source: &'a str,
    max_depth: usize,
}

impl<'a> Grammar<'a> {
    fn offset(&self, rest: &'a str) -> usize {
        self.source.len() - rest.len()
    }

    /// query := expr (WS boolOp WS expr)*
    fn query(&self, input: &'a str, depth: usize) -> PResult<'a, RawQuery<'a>> {
        let (input, head) = self.expression(input, depth)?;
        let mut tail = Vec::new();

        let mut remaining = input;
        loop {
            let Ok((input, _)) = separator(remaining) else {
                break;
            };
            let position = self.offset(input);
            let Ok((after_op, keyword)) = bool_op(input) else {
                break;
            };
            // An operator glued to the next token (`ANDx:1`) is not an operator.
            let Ok((input, _)) = separator(after_op) else {
                break;
            };
            let op = RawBoolOp { keyword, position };
            let (input, expr) = self.expression(input, depth)?;
            tail.push((op, expr));
            remaining = input;
        }

        Ok((remaining, RawQuery { head, tail }))
    }

    /// expr := atom | "(" query ")"
    fn expression(&self, input: &'a str, depth: usize) -> PResult<'a, RawExpr<'a>> {
        if input.starts_with('(') {
            return self.group(input, depth);
        }

        let position = self.offset(input);
        match atom(input) {
            Ok((rest, (field, operator, value))) => Ok((
                rest,
                RawExpr::Atom(RawAtom {
                    field,
                    operator,
                    value,
                    position,
                }),
            )),
            Err(nom::Err::Error(_)) => failure(input, expected_expression(input)),
            Err(e) => Err(e),
        }
    }

    fn group(&self, input: &'a str, depth: usize) -> PResult<'a, RawExpr<'a>> {
        let (inner, _) = char('(')(input)?;
        if depth >= self.max_depth {
            return failure(
                input,
                SyntaxReason::NestingTooDeep {
                    max: self.max_depth,
                },
            );
        }

        let (rest, query) = self.query(inner, depth + 1)?;
        match char::<_, GrammarError<'a>>(')')(rest) {
            Ok((rest, _)) => Ok((rest, RawExpr::Group(Box::new(query)))),
            Err(_) => Err(nom::Err::Failure(trailing_error(rest))),
        }
    }
}

/// Whitespace between expressions and keywords. Value runs stop at the same
/// characters.
fn is_whitespace(c: char) -> bool {
    c.is_ascii_whitespace() || c == '\x0b'
}

fn separator(input: &str) -> PResult<'_, &str> {
    take_while1(is_whitespace)(input)
}

/// atom := field atomOp value
fn atom(input: &str) -> PResult<'_, (&str, &str, RawValue<'_>)> {
    let (input, field) = field(input)?;
    let (input, operator) = commit(atom_operator, SyntaxReason::MissingAtomOperator)(input)?;
    let (input, value) = commit(value, SyntaxReason::MissingValue)(input)?;
    Ok((input, (field, operator, value)))
}

/// Parse a field name: a letter or underscore, then word characters.
fn field(input: &str) -> PResult<'_, &str> {
    recognize(pair(
        satisfy(|c| c.is_ascii_alphabetic() || c == '_'),
        take_while(|c: char| c.is_ascii_alphanumeric() || c == '_'),
    ))(input)
}

/// Longest operator first, so `:>` is not read as `:` followed by `>value`.
fn atom_operator(input: &str) -> PResult<'_, &str> {
    alt((tag(":>"), tag(":<"), tag(":")))(input)
}

/// `ANDNOT` must be tried before `AND`.
fn bool_op(input: &str) -> PResult<'_, &str> {
    alt((
        tag_no_case("OR"),
        tag_no_case("ANDNOT"),
        tag_no_case("AND"),
    ))(input)
}

fn value(input: &str) -> PResult<'_, RawValue<'_>> {
    alt((range, quoted_string, bare_value))(input)
}

/// range := "[" rangeValue ";" rangeValue "]"
fn range(input: &str) -> PResult<'_, RawValue<'_>> {
    let (input, _) = char('[')(input)?;
    let (input, (left, right)) = commit(range_bounds, SyntaxReason::MalformedRange)(input)?;
    Ok((input, RawValue::Range { left, right }))
}

fn range_bounds(input: &str) -> PResult<'_, (&str, &str)> {
    let (input, left) = range_value(input)?;
    let (input, _) = char(';')(input)?;
    let (input, right) = range_value(input)?;
    let (input, _) = char(']')(input)?;
    Ok((input, (left, right)))
}

fn range_value(input: &str) -> PResult<'_, &str> {
    take_while1(|c: char| !is_whitespace(c) && !matches!(c, '[' | ']' | '(' | ')' | ';'))(input)
}

/// Parse a double-quoted string; `\` escapes any following character.
///
/// `""` is not a quoted string and is left for [`bare_value`].
fn quoted_string(input: &str) -> PResult<'_, RawValue<'_>> {
    let (body, _) = char('"')(input)?;

    let mut chars = body.char_indices();
    while let Some((i, c)) = chars.next() {
        match c {
            '\\' => {
                chars.next();
            }
            '"' if i == 0 => {
                return Err(nom::Err::Error(GrammarError {
                    input,
                    reason: None,
                }));
            }
            '"' => {
                let end = 1 + i + 1;
                return Ok((&input[end..], RawValue::Quoted(&input[..end])));
            }
            _ => {}
        }
    }

    failure(&input[input.len()..], SyntaxReason::UnterminatedQuote)
}

/// An unquoted run; it is a number when the whole run reads as one.
fn bare_value(input: &str) -> PResult<'_, RawValue<'_>> {
    let (rest, text) =
        take_while1(|c: char| !is_whitespace(c) && !matches!(c, '(' | ')' | '[' | ']'))(input)?;

    let value = match number(text) {
        Ok(("", _)) => RawValue::Number(text),
        _ => RawValue::Unquoted(text),
    };
    Ok((rest, value))
}

/// number := digits ("." digits?)?
fn number(input: &str) -> PResult<'_, &str> {
    recognize(pair(digit1, opt(pair(char('.'), digit0))))(input)
}

/// Turn a recoverable error into a committed failure with `reason`.
fn commit<'a, O, F>(mut parser: F, reason: SyntaxReason) -> impl FnMut(&'a str) -> PResult<'a, O>
where
    F: FnMut(&'a str) -> PResult<'a, O>,
{
    move |input: &'a str| match parser(input) {
        Err(nom::Err::Error(e)) => Err(nom::Err::Failure(GrammarError {
            input: e.input,
            reason: Some(reason.clone()),
        })),
        other => other,
    }
}

fn failure<'a, O>(input: &'a str, reason: SyntaxReason) -> PResult<'a, O> {
    Err(nom::Err::Failure(GrammarError {
        input,
        reason: Some(reason),
    }))
}

/// Explain input left over after a complete expression sequence.
fn trailing_error(rest: &str) -> GrammarError<'_> {
    let token = rest.trim_start_matches(is_whitespace);
    let reason = if token.starts_with(')') || rest.is_empty() {
        SyntaxReason::UnbalancedParenthesis
    } else if token.is_empty() {
        SyntaxReason::UnexpectedEnd
    } else if token.len() == rest.len() {
        unexpected_input(rest)
    } else {
        match bool_op(token) {
            Ok(("", _)) => SyntaxReason::UnexpectedEnd,
            _ => SyntaxReason::MissingOperator,
        }
    };

    let input = match reason {
        SyntaxReason::UnexpectedEnd => &rest[rest.len()..],
        _ => token,
    };
    GrammarError {
        input,
        reason: Some(reason),
    }
}

fn expected_expression(input: &str) -> SyntaxReason {
    match input.chars().next() {
        None => SyntaxReason::UnexpectedEnd,
        Some(':') => SyntaxReason::MissingField,
        Some(c) => SyntaxReason::ExpectedExpression {
            found: c.to_string(),
        },
    }
}

fn unexpected_input(input: &str) -> SyntaxReason {
    match input.chars().next() {
        None => SyntaxReason::UnexpectedEnd,
        Some(c) => SyntaxReason::UnexpectedInput {
            found: c.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn syntax_error(input: &str) -> (usize, SyntaxReason) {
        match parse(input) {
            Err(ConvertError::Syntax { position, reason }) => (position, reason),
            other => panic!("expected syntax error for {input:?}, got {other:?}"),
        }
    }

    fn single_atom(input: &str) -> RawAtom<'_> {
        let query = parse(input).unwrap();
        assert!(query.tail.is_empty());
        match query.head {
            RawExpr::Atom(atom) => atom,
            other => panic!("expected atom, got {other:?}"),
        }
    }

    #[test]
    fn test_simple_atom() {
        let atom = single_atom("name:bob");
        assert_eq!(atom.field, "name");
        assert_eq!(atom.operator, ":");
        assert_eq!(atom.value, RawValue::Unquoted("bob"));
        assert_eq!(atom.position, 0);
    }

    #[test]
    fn test_comparison_operators() {
        assert_eq!(single_atom("count:>5").operator, ":>");
        assert_eq!(single_atom("count:<5").operator, ":<");
        assert_eq!(single_atom("count:>5").value, RawValue::Number("5"));
    }

    #[test]
    fn test_numbers() {
        assert_eq!(single_atom("a:42").value, RawValue::Number("42"));
        assert_eq!(single_atom("a:4.2").value, RawValue::Number("4.2"));
        assert_eq!(single_atom("a:4.").value, RawValue::Number("4."));
        assert_eq!(single_atom("a:4x").value, RawValue::Unquoted("4x"));
        assert_eq!(single_atom("a:4.2.1").value, RawValue::Unquoted("4.2.1"));
    }

    #[test]
    fn test_quoted_string_keeps_quotes_and_escapes() {
        assert_eq!(
            single_atom(r#"title:"value one""#).value,
            RawValue::Quoted(r#""value one""#)
        );
        assert_eq!(
            single_atom(r#"title:"say \"hi\"""#).value,
            RawValue::Quoted(r#""say \"hi\"""#)
        );
    }

    #[test]
    fn test_range() {
        assert_eq!(
            single_atom("price:[4;10]").value,
            RawValue::Range {
                left: "4",
                right: "10"
            }
        );
        assert_eq!(
            single_atom("price:[*;10]").value,
            RawValue::Range {
                left: "*",
                right: "10"
            }
        );
    }

    #[test]
    fn test_boolean_sequence() {
        let query = parse("a:1 AND b:2 or c:3 ANDNOT d:4").unwrap();
        let keywords: Vec<&str> = query.tail.iter().map(|(op, _)| op.keyword).collect();
        assert_eq!(keywords, vec!["AND", "or", "ANDNOT"]);
        assert_eq!(query.tail[0].0.position, 4);
        assert_eq!(query.tail[1].1, RawExpr::Atom(RawAtom {
            field: "c",
            operator: ":",
            value: RawValue::Number("3"),
            position: 15,
        }));
    }

    #[test]
    fn test_nested_groups() {
        let query = parse("((a:1) OR b:2)").unwrap();
        let RawExpr::Group(outer) = query.head else {
            panic!("expected group");
        };
        assert_eq!(outer.tail.len(), 1);
        assert!(matches!(outer.head, RawExpr::Group(_)));
    }

    #[test]
    fn test_unterminated_quote() {
        assert_eq!(
            syntax_error(r#"name:"bob"#),
            (9, SyntaxReason::UnterminatedQuote)
        );
        assert_eq!(
            syntax_error(r#"name:"bob\""#).1,
            SyntaxReason::UnterminatedQuote
        );
    }

    #[test]
    fn test_empty_quotes_are_an_unquoted_value() {
        assert_eq!(single_atom(r#"name:"""#).value, RawValue::Unquoted(r#""""#));
        assert_eq!(single_atom(r#"name:""x"#).value, RawValue::Unquoted(r#"""x"#));
        assert_eq!(
            syntax_error(r#"name:"" b:1"#),
            (8, SyntaxReason::MissingOperator)
        );
    }

    #[test]
    fn test_form_feed_and_vertical_tab_separate() {
        let query = parse("a:1\x0cAND\x0cb:2\x0bOR c:3").unwrap();
        let keywords: Vec<&str> = query.tail.iter().map(|(op, _)| op.keyword).collect();
        assert_eq!(keywords, vec!["AND", "OR"]);
        assert_eq!(query.tail[1].0.position, 12);
        assert_eq!(syntax_error("a:[1\x0b;2]"), (4, SyntaxReason::MalformedRange));
    }

    #[test]
    fn test_non_ascii_whitespace_is_part_of_a_value() {
        assert_eq!(
            single_atom("name:a\u{a0}b").value,
            RawValue::Unquoted("a\u{a0}b")
        );
    }

    #[test]
    fn test_unbalanced_parentheses() {
        assert_eq!(
            syntax_error("(a:1 AND b:2"),
            (12, SyntaxReason::UnbalancedParenthesis)
        );
        assert_eq!(syntax_error("a:1)"), (3, SyntaxReason::UnbalancedParenthesis));
    }

    #[test]
    fn test_missing_operator() {
        assert_eq!(syntax_error("a:1 b:2"), (4, SyntaxReason::MissingOperator));
        assert_eq!(syntax_error("(a:1 b:2)"), (5, SyntaxReason::MissingOperator));
        // `or` followed by more letters is a field, not an operator
        assert_eq!(
            syntax_error("a:1 order:2"),
            (4, SyntaxReason::MissingOperator)
        );
    }

    #[test]
    fn test_dangling_operator() {
        assert_eq!(syntax_error("a:1 AND"), (7, SyntaxReason::UnexpectedEnd));
        assert_eq!(syntax_error("a:1 AND "), (8, SyntaxReason::UnexpectedEnd));
    }

    #[test]
    fn test_malformed_range() {
        assert_eq!(syntax_error("a:[1;2"), (6, SyntaxReason::MalformedRange));
        assert_eq!(syntax_error("a:[1 TO 2]"), (4, SyntaxReason::MalformedRange));
        assert_eq!(syntax_error("a:[;2]"), (3, SyntaxReason::MalformedRange));
    }

    #[test]
    fn test_field_errors() {
        assert_eq!(syntax_error(":bob"), (0, SyntaxReason::MissingField));
        assert_eq!(
            syntax_error("name bob"),
            (4, SyntaxReason::MissingAtomOperator)
        );
        assert_eq!(syntax_error("name:"), (5, SyntaxReason::MissingValue));
        assert_eq!(
            syntax_error("1name:bob"),
            (
                0,
                SyntaxReason::ExpectedExpression {
                    found: "1".to_string()
                }
            )
        );
    }

    #[test]
    fn test_empty_group() {
        assert_eq!(
            syntax_error("()"),
            (
                1,
                SyntaxReason::ExpectedExpression {
                    found: ")".to_string()
                }
            )
        );
    }

    #[test]
    fn test_whitespace_is_not_trimmed() {
        assert_eq!(
            syntax_error(" a:1"),
            (
                0,
                SyntaxReason::ExpectedExpression {
                    found: " ".to_string()
                }
            )
        );
        assert_eq!(syntax_error("a:1 "), (4, SyntaxReason::UnexpectedEnd));
    }

    #[test]
    fn test_trailing_garbage() {
        assert_eq!(
            syntax_error("a:[1;2]x"),
            (
                7,
                SyntaxReason::UnexpectedInput {
                    found: "x".to_string()
                }
            )
        );
    }

    #[test]
    fn test_nesting_limit() {
        let parser = QueryParser::new(2);
        assert!(parser.parse("((a:1))").is_ok());
        assert_eq!(
            parser.parse("(((a:1)))"),
            Err(ConvertError::syntax(
                2,
                SyntaxReason::NestingTooDeep { max: 2 }
            ))
        );
    }

    #[test]
    fn test_deep_nesting_default_limit() {
        let depth = DEFAULT_MAX_DEPTH + 1;
        let input = format!("{}a:1{}", "(".repeat(depth), ")".repeat(depth));
        assert_eq!(
            syntax_error(&input).1,
            SyntaxReason::NestingTooDeep {
                max: DEFAULT_MAX_DEPTH
            }
        );
    }
}
