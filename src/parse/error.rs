use thiserror::Error;

/// Errors produced when parsing a rule line.
///
/// The index is the position of the offending token in the lexed stream.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("expected {expected} at token {index}, found {found}")]
    UnexpectedToken {
        expected: &'static str,
        found: String,
        index: usize,
    },

    #[error("expected {expected} at token {index}, found end of input")]
    UnexpectedEnd {
        expected: &'static str,
        index: usize,
    },

    #[error("rule nesting deeper than {0} levels")]
    NestingTooDeep(usize),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unexpected_token_message() {
        let err = ParseError::UnexpectedToken {
            expected: "','",
            found: "'('".to_owned(),
            index: 3,
        };
        assert_eq!(err.to_string(), "expected ',' at token 3, found '('");
    }

    #[test]
    fn unexpected_end_message() {
        let err = ParseError::UnexpectedEnd {
            expected: "rule value",
            index: 2,
        };
        assert_eq!(
            err.to_string(),
            "expected rule value at token 2, found end of input"
        );
    }
}
