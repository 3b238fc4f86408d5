use std::fmt;

/// Boolean operators accepted at the head of a logic rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicOp {
    And,
    Or,
    Not,
}

impl LogicOp {
    /// Classify an identifier as a logic operator, case-insensitively.
    /// Anything else is an atomic predicate type.
    #[must_use]
    pub fn parse(ident: &str) -> Option<LogicOp> {
        if ident.eq_ignore_ascii_case("AND") {
            Some(LogicOp::And)
        } else if ident.eq_ignore_ascii_case("OR") {
            Some(LogicOp::Or)
        } else if ident.eq_ignore_ascii_case("NOT") {
            Some(LogicOp::Not)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            LogicOp::And => "AND",
            LogicOp::Or => "OR",
            LogicOp::Not => "NOT",
        }
    }
}

impl fmt::Display for LogicOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One parsed rule: an atomic predicate or a boolean combination of rules.
///
/// `target` is populated only on the outermost node of a top-level rule;
/// nested children never carry one. `extras` (trailing modifiers such as
/// `no-resolve`) survive only on atomic top-level rules.
#[derive(Debug, Clone, PartialEq)]
pub enum RuleNode {
    Atomic {
        kind: String,
        value: String,
        target: Option<String>,
        extras: Vec<String>,
    },
    Logic {
        op: LogicOp,
        children: Vec<RuleNode>,
        target: Option<String>,
    },
}

impl RuleNode {
    /// An atomic predicate node without target or extras.
    #[must_use]
    pub fn atomic(kind: impl Into<String>, value: impl Into<String>) -> RuleNode {
        RuleNode::Atomic {
            kind: kind.into(),
            value: value.into(),
            target: None,
            extras: Vec::new(),
        }
    }

    /// A logic node without a target.
    #[must_use]
    pub fn logic(op: LogicOp, children: Vec<RuleNode>) -> RuleNode {
        RuleNode::Logic {
            op,
            children,
            target: None,
        }
    }

    /// Attach a target, returning the node. Meaningful only on the outermost
    /// node of a top-level rule.
    #[must_use]
    pub fn with_target(mut self, new_target: impl Into<String>) -> RuleNode {
        match &mut self {
            RuleNode::Atomic { target, .. } | RuleNode::Logic { target, .. } => {
                *target = Some(new_target.into());
            }
        }
        self
    }

    #[must_use]
    pub fn target(&self) -> Option<&str> {
        match self {
            RuleNode::Atomic { target, .. } | RuleNode::Logic { target, .. } => target.as_deref(),
        }
    }

    #[must_use]
    pub fn is_logic(&self) -> bool {
        matches!(self, RuleNode::Logic { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_operators_case_insensitive() {
        assert_eq!(LogicOp::parse("AND"), Some(LogicOp::And));
        assert_eq!(LogicOp::parse("or"), Some(LogicOp::Or));
        assert_eq!(LogicOp::parse("Not"), Some(LogicOp::Not));
        assert_eq!(LogicOp::parse("DOMAIN"), None);
        assert_eq!(LogicOp::parse("ANDS"), None);
    }

    #[test]
    fn atomic_builder() {
        let node = RuleNode::atomic("DOMAIN", "example.com").with_target("DIRECT");
        assert_eq!(
            node,
            RuleNode::Atomic {
                kind: "DOMAIN".to_owned(),
                value: "example.com".to_owned(),
                target: Some("DIRECT".to_owned()),
                extras: Vec::new(),
            }
        );
    }

    #[test]
    fn logic_builder_has_no_target() {
        let node = RuleNode::logic(
            LogicOp::And,
            vec![
                RuleNode::atomic("DOMAIN", "a.com"),
                RuleNode::atomic("NETWORK", "UDP"),
            ],
        );
        assert!(node.is_logic());
        assert_eq!(node.target(), None);
    }
}
