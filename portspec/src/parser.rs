// Parser for port notation.
//
// Grammar:
//   notation := dtype? shape '?'? '...'?
//   dtype    := IDENT ('.' IDENT)*
//   shape    := '[' (dim (',' dim)* ','?)? ']'
//   dim      := INT | IDENT
//
// `parse_spec`, `parse_target` and `parse_shape` restrict the general form to
// what each caller accepts. Uses chumsky combinators over the logos tokens.
//
// Preconditions: none.
// Postconditions: returns the notation plus any errors (non-fatal).
// Failure modes: syntax errors produce `Rich` diagnostics; misplaced parts
//   (a dtype on a bare shape, `...` on a source spec) produce `NotationError`.
// Side effects: none.

use chumsky::input::{Stream, ValueInput};
use chumsky::prelude::*;
use chumsky::span::SimpleSpan;
use thiserror::Error;

use crate::dim::Dim;
use crate::dtype::Dtype;
use crate::lexer::Token;
use crate::spec::{InputSpec, PortSpec};

/// Parsed notation before it is checked against what the caller expects.
#[derive(Debug, Clone, PartialEq)]
pub struct Notation {
    pub dtype: Option<String>,
    pub shape: Vec<Dim>,
    pub optional: bool,
    pub variadic: bool,
}

/// Result of parsing: notation plus any errors.
#[derive(Debug)]
pub struct ParseResult {
    pub notation: Option<Notation>,
    pub errors: Vec<Rich<'static, Token, SimpleSpan>>,
}

/// Notation that failed to parse or is not valid where it was used.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid port notation '{input}': {}", .messages.join("; "))]
pub struct NotationError {
    pub input: String,
    pub messages: Vec<String>,
}

impl NotationError {
    fn new(input: &str, message: impl Into<String>) -> Self {
        NotationError {
            input: input.to_string(),
            messages: vec![message.into()],
        }
    }
}

/// Lex and parse a notation string.
pub fn parse(source: &str) -> ParseResult {
    let lex_result = crate::lexer::lex(source);
    let len = source.len();

    let token_iter = lex_result.tokens.into_iter().map(|(tok, span)| {
        let cspan: SimpleSpan = (span.start..span.end).into();
        (tok, cspan)
    });
    let eoi: SimpleSpan = (len..len).into();
    let stream = Stream::from_iter(token_iter).map(eoi, |(t, s): (_, _)| (t, s));

    let parser = notation_parser(source);
    let (notation, parse_errors) = parser.parse(stream).into_output_errors();

    let mut all_errors: Vec<Rich<'static, Token, SimpleSpan>> = lex_result
        .errors
        .into_iter()
        .map(|e| {
            let span: SimpleSpan = (e.span.start..e.span.end).into();
            Rich::custom(span, e.message)
        })
        .collect();
    all_errors.extend(parse_errors.into_iter().map(|e| e.into_owned()));

    ParseResult {
        notation,
        errors: all_errors,
    }
}

fn parse_checked(source: &str) -> Result<Notation, NotationError> {
    let result = parse(source);
    if !result.errors.is_empty() {
        return Err(NotationError {
            input: source.to_string(),
            messages: result
                .errors
                .iter()
                .map(|e| format!("{} at {}..{}", e, e.span().start, e.span().end))
                .collect(),
        });
    }
    result
        .notation
        .ok_or_else(|| NotationError::new(source, "parse failed with no output"))
}

/// Parse a single port spec, e.g. `float32[-1, bands]`.
pub fn parse_spec(source: &str) -> Result<PortSpec, NotationError> {
    let notation = parse_checked(source)?;
    if notation.variadic {
        return Err(NotationError::new(source, "'...' is only valid on input ports"));
    }
    into_spec(source, notation)
}

/// Parse an input port declaration; a trailing `...` makes it variadic.
pub fn parse_target(source: &str) -> Result<InputSpec, NotationError> {
    let notation = parse_checked(source)?;
    let variadic = notation.variadic;
    let spec = into_spec(source, notation)?;
    Ok(if variadic {
        InputSpec::Variadic(vec![spec])
    } else {
        InputSpec::Single(spec)
    })
}

/// Parse a bare shape, e.g. `[batch, 3, -1]`.
pub fn parse_shape(source: &str) -> Result<Vec<Dim>, NotationError> {
    let notation = parse_checked(source)?;
    if notation.dtype.is_some() || notation.optional || notation.variadic {
        return Err(NotationError::new(source, "expected a bare shape like [batch, 3]"));
    }
    Ok(notation.shape)
}

fn into_spec(source: &str, notation: Notation) -> Result<PortSpec, NotationError> {
    let dtype = notation
        .dtype
        .ok_or_else(|| NotationError::new(source, "missing dtype before shape"))?;
    let mut spec = PortSpec::new(Dtype::from(dtype), notation.shape);
    spec.optional = notation.optional;
    Ok(spec)
}

// ── Parser builder ──

fn notation_parser<'tokens, 'src: 'tokens, I>(
    source: &'src str,
) -> impl Parser<'tokens, I, Notation, extra::Err<Rich<'tokens, Token, SimpleSpan>>> + 'src
where
    'tokens: 'src,
    I: ValueInput<'tokens, Token = Token, Span = SimpleSpan>,
{
    let ident = just(Token::Ident).map_with(move |_, e| {
        let span: SimpleSpan = e.span();
        source[span.start..span.end].to_string()
    });

    let dtype = ident
        .clone()
        .separated_by(just(Token::Dot))
        .at_least(1)
        .collect::<Vec<_>>()
        .map(|parts| parts.join("."));

    let dim = select! {
        Token::Int(n) => Dim::Size(n),
    }
    .or(ident.map(Dim::Symbol));

    let shape = dim
        .separated_by(just(Token::Comma))
        .allow_trailing()
        .collect::<Vec<_>>()
        .delimited_by(just(Token::LBracket), just(Token::RBracket));

    dtype
        .or_not()
        .then(shape)
        .then(just(Token::Question).or_not())
        .then(just(Token::Ellipsis).or_not())
        .then_ignore(end())
        .map(|(((dtype, shape), question), ellipsis)| Notation {
            dtype,
            shape,
            optional: question.is_some(),
            variadic: ellipsis.is_some(),
        })
}
