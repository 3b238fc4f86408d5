use winnow::combinator::{alt, repeat};
use winnow::error::ModalResult;
use winnow::prelude::*;
use winnow::token::{one_of, take_till};

use crate::types::{Token, TokenKind};

fn punct(input: &mut &str) -> ModalResult<Option<Token>> {
    let c = one_of(['(', ')', ',']).parse_next(input)?;
    let kind = match c {
        '(' => TokenKind::LParen,
        ')' => TokenKind::RParen,
        _ => TokenKind::Comma,
    };
    Ok(Some(Token::punct(kind, c)))
}

fn ident(input: &mut &str) -> ModalResult<Option<Token>> {
    let run = take_till(1.., |c: char| matches!(c, '(' | ')' | ',')).parse_next(input)?;
    let text = run.trim();
    // A run that is all whitespace produces no token.
    Ok((!text.is_empty()).then(|| Token::ident(text)))
}

/// Lex a rule line into parentheses, commas and identifiers.
///
/// Whitespace outside identifiers is discarded and identifiers are trimmed.
/// Lexing never fails; malformed structure surfaces later as a parse failure.
#[must_use]
pub fn tokenize(raw: &str) -> Vec<Token> {
    let tokens: Result<Vec<Option<Token>>, _> = repeat(0.., alt((punct, ident))).parse(raw);
    tokens
        .map(|t| t.into_iter().flatten().collect())
        .unwrap_or_default()
}
