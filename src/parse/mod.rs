mod error;
mod grammar;
mod lexer;

pub use error::ParseError;
pub use lexer::tokenize;

use crate::types::RuleNode;

/// Parse one rule line into a [`RuleNode`].
///
/// Both logic rules (`AND,((..),(..)),TARGET`) and atomic rules
/// (`TYPE,value[,target][,extras...]`) are accepted.
///
/// # Errors
///
/// Returns [`ParseError`] when the line does not match the rule grammar.
pub fn parse_rule(input: &str) -> Result<RuleNode, ParseError> {
    grammar::RuleParser::new(input).parse()
}
