use crate::types::{LogicOp, RuleNode, Token, TokenKind};

use super::error::ParseError;
use super::lexer::tokenize;

/// Bound on logic nesting. Deeply nested input is adversarial-shaped;
/// the recursion must not be allowed to exhaust the stack.
const MAX_DEPTH: usize = 64;

/// Recursive-descent parser over the token stream of one rule line.
pub(crate) struct RuleParser {
    tokens: Vec<Token>,
    pos: usize,
}

impl RuleParser {
    pub(crate) fn new(input: &str) -> Self {
        Self {
            tokens: tokenize(input),
            pos: 0,
        }
    }

    /// Top level: `Type "," ( LogicBody | Value ) ( "," Target )? ( "," Extra )*`.
    pub(crate) fn parse(&mut self) -> Result<RuleNode, ParseError> {
        let kind = self.expect_ident("rule type")?.to_ascii_uppercase();
        self.expect(TokenKind::Comma, "','")?;

        let mut node = if let Some(op) = LogicOp::parse(&kind) {
            RuleNode::Logic {
                op,
                children: self.parse_body(0)?,
                target: None,
            }
        } else {
            RuleNode::Atomic {
                kind,
                value: self.expect_ident("rule value")?,
                target: None,
                extras: Vec::new(),
            }
        };

        // Target and trailing extras exist only at the top level.
        let found_target = if self.eat(TokenKind::Comma) {
            self.consume_ident()
        } else {
            None
        };
        let mut found_extras = Vec::new();
        while self.eat(TokenKind::Comma) {
            if let Some(extra) = self.consume_ident() {
                found_extras.push(extra);
            }
        }

        match &mut node {
            RuleNode::Atomic { target, extras, .. } => {
                *target = found_target;
                *extras = found_extras;
            }
            // Logic rules carry a target but never extras.
            RuleNode::Logic { target, .. } => *target = found_target,
        }
        Ok(node)
    }

    /// `LogicBody := "(" SubRule ( "," SubRule )* ")"` where each SubRule is
    /// itself parenthesized.
    fn parse_body(&mut self, depth: usize) -> Result<Vec<RuleNode>, ParseError> {
        if depth >= MAX_DEPTH {
            return Err(ParseError::NestingTooDeep(MAX_DEPTH));
        }
        self.expect(TokenKind::LParen, "'('")?;
        let mut children = Vec::new();
        loop {
            self.expect(TokenKind::LParen, "'('")?;
            children.push(self.parse_subrule(depth + 1)?);
            self.expect(TokenKind::RParen, "')'")?;
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::RParen, "')'")?;
        Ok(children)
    }

    /// `SubRule := LogicType "," LogicBody | Type "," Value`.
    fn parse_subrule(&mut self, depth: usize) -> Result<RuleNode, ParseError> {
        let kind = self.expect_ident("rule type")?.to_ascii_uppercase();
        self.expect(TokenKind::Comma, "','")?;
        if let Some(op) = LogicOp::parse(&kind) {
            Ok(RuleNode::Logic {
                op,
                children: self.parse_body(depth)?,
                target: None,
            })
        } else {
            Ok(RuleNode::Atomic {
                kind,
                value: self.expect_ident("rule value")?,
                target: None,
                extras: Vec::new(),
            })
        }
    }

    fn expect(&mut self, kind: TokenKind, expected: &'static str) -> Result<(), ParseError> {
        match self.tokens.get(self.pos) {
            Some(token) if token.kind == kind => {
                self.pos += 1;
                Ok(())
            }
            Some(token) => Err(ParseError::UnexpectedToken {
                expected,
                found: token.to_string(),
                index: self.pos,
            }),
            None => Err(ParseError::UnexpectedEnd {
                expected,
                index: self.pos,
            }),
        }
    }

    fn expect_ident(&mut self, expected: &'static str) -> Result<String, ParseError> {
        match self.tokens.get(self.pos) {
            Some(token) if token.kind == TokenKind::Ident => {
                let text = token.text.clone();
                self.pos += 1;
                Ok(text)
            }
            Some(token) => Err(ParseError::UnexpectedToken {
                expected,
                found: token.to_string(),
                index: self.pos,
            }),
            None => Err(ParseError::UnexpectedEnd {
                expected,
                index: self.pos,
            }),
        }
    }

    /// Consume the next token if it has the given kind.
    fn eat(&mut self, kind: TokenKind) -> bool {
        match self.tokens.get(self.pos) {
            Some(token) if token.kind == kind => {
                self.pos += 1;
                true
            }
            _ => false,
        }
    }

    /// Consume the next token if it is an identifier.
    fn consume_ident(&mut self) -> Option<String> {
        match self.tokens.get(self.pos) {
            Some(token) if token.kind == TokenKind::Ident => {
                let text = token.text.clone();
                self.pos += 1;
                Some(text)
            }
            _ => None,
        }
    }
}
