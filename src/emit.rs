//! Rendering of parsed rules into Loon's textual rule form.

use crate::geosite::GeositeDb;
use crate::types::RuleNode;

/// The atomic type whose value names a domain-list reference to expand
/// rather than a literal match pattern.
pub(crate) const GEOSITE_TYPE: &str = "GEOSITE";

/// Ordered mapping from Mihomo rule types to their Loon spellings. Types
/// absent from the table either pass through unmapped (when the rule still
/// has a value and a target) or are commented out by the pipeline.
pub(crate) const RULE_TYPE_MAP: &[(&str, &str)] = &[
    ("DOMAIN", "DOMAIN"),
    ("DOMAIN-SUFFIX", "DOMAIN-SUFFIX"),
    ("DOMAIN-KEYWORD", "DOMAIN-KEYWORD"),
    ("GEOIP", "GEOIP"),
    ("IP-CIDR", "IP-CIDR"),
    ("IP-CIDR6", "IP-CIDR6"),
    ("SRC-IP-CIDR", "SRC-IP-CIDR"),
    ("PROCESS-NAME", "PROCESS-NAME"),
    ("MATCH", "FINAL"),
    ("GEOSITE", "GEOSITE"),
    ("NETWORK", "PROTOCOL"),
    ("DST-PORT", "DEST-PORT"),
    ("SRC-PORT", "SRC-PORT"),
];

/// Look up the Loon spelling for a Mihomo rule type.
pub(crate) fn map_rule_type(kind: &str) -> Option<&'static str> {
    RULE_TYPE_MAP
        .iter()
        .find(|(from, _)| *from == kind)
        .map(|(_, to)| *to)
}

/// Render a parsed rule tree as one Loon rule line.
///
/// Logic nodes render recursively as `OP,((child),(child),...)`, with the
/// target appended only on the outermost node. GEOSITE atoms are expanded
/// through the resolver in place.
#[must_use]
pub fn emit_rule(node: &RuleNode, db: &GeositeDb) -> String {
    match node {
        RuleNode::Logic {
            op,
            children,
            target,
        } => {
            let subs: Vec<String> = children
                .iter()
                .map(|child| format!("({})", emit_rule(child, db)))
                .collect();
            let mut line = format!("{op},({})", subs.join(","));
            if let Some(target) = target {
                line.push(',');
                line.push_str(target);
            }
            line
        }
        RuleNode::Atomic { kind, value, .. } if kind == GEOSITE_TYPE => {
            expand_geosite(db, value)
        }
        RuleNode::Atomic {
            kind,
            value,
            target,
            extras,
        } => {
            let mapped = map_rule_type(kind).unwrap_or(kind);
            let mut line = format!("{mapped},{value}");
            if let Some(target) = target {
                line.push(',');
                line.push_str(target);
            }
            for extra in extras {
                line.push(',');
                line.push_str(extra);
            }
            line
        }
    }
}

/// Expand a GEOSITE atom into concrete match rules.
///
/// Zero records become a visible comment marker, a single record a single
/// parenthesized atom, and multiple records a synthesized OR. The expansion
/// never carries a target; in externalized mode the routing policy lives on
/// the reference descriptor instead.
fn expand_geosite(db: &GeositeDb, reference: &str) -> String {
    let records = db.resolve(reference);
    match records.as_slice() {
        [] => format!("# GEOSITE {reference}: empty or missing list"),
        [only] => format!("({only})"),
        many => {
            let subs: Vec<String> = many.iter().map(|record| format!("({record})")).collect();
            format!("OR,({})", subs.join(","))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;
    use crate::types::LogicOp;

    fn empty_db() -> (TempDir, GeositeDb) {
        let dir = TempDir::new().unwrap();
        let db = GeositeDb::new(dir.path());
        (dir, db)
    }

    #[test]
    fn mapping_table_rewrites() {
        assert_eq!(map_rule_type("MATCH"), Some("FINAL"));
        assert_eq!(map_rule_type("NETWORK"), Some("PROTOCOL"));
        assert_eq!(map_rule_type("DST-PORT"), Some("DEST-PORT"));
        assert_eq!(map_rule_type("DOMAIN"), Some("DOMAIN"));
        assert_eq!(map_rule_type("RULE-SET"), None);
    }

    #[test]
    fn atomic_field_order_is_fixed() {
        let (_dir, db) = empty_db();
        let node = RuleNode::Atomic {
            kind: "IP-CIDR".to_owned(),
            value: "10.0.0.0/8".to_owned(),
            target: Some("DIRECT".to_owned()),
            extras: vec!["no-resolve".to_owned()],
        };
        assert_eq!(emit_rule(&node, &db), "IP-CIDR,10.0.0.0/8,DIRECT,no-resolve");
    }

    #[test]
    fn unmapped_atomic_passes_through() {
        let (_dir, db) = empty_db();
        let node = RuleNode::atomic("RULE-SET", "mylist").with_target("Proxy");
        assert_eq!(emit_rule(&node, &db), "RULE-SET,mylist,Proxy");
    }

    #[test]
    fn logic_rule_renders_operator_and_children() {
        let (_dir, db) = empty_db();
        let node = RuleNode::logic(
            LogicOp::And,
            vec![
                RuleNode::atomic("DOMAIN", "baidu.com"),
                RuleNode::atomic("NETWORK", "UDP"),
            ],
        )
        .with_target("DIRECT");
        assert_eq!(
            emit_rule(&node, &db),
            "AND,((DOMAIN,baidu.com),(PROTOCOL,UDP)),DIRECT"
        );
    }

    #[test]
    fn nested_logic_renders_without_inner_targets() {
        let (_dir, db) = empty_db();
        let node = RuleNode::logic(
            LogicOp::Or,
            vec![
                RuleNode::logic(LogicOp::Not, vec![RuleNode::atomic("DOMAIN", "test.com")]),
                RuleNode::atomic("SRC-IP-CIDR", "192.168.1.0/24"),
            ],
        )
        .with_target("REJECT");
        assert_eq!(
            emit_rule(&node, &db),
            "OR,((NOT,((DOMAIN,test.com))),(SRC-IP-CIDR,192.168.1.0/24)),REJECT"
        );
    }

    #[test]
    fn empty_geosite_becomes_comment_marker() {
        let (_dir, db) = empty_db();
        let node = RuleNode::atomic("GEOSITE", "unknown-site").with_target("DIRECT");
        assert_eq!(
            emit_rule(&node, &db),
            "# GEOSITE unknown-site: empty or missing list"
        );
    }

    #[test]
    fn single_record_geosite_is_one_parenthesized_atom() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("single"), "full:goo.gl\n").unwrap();
        let db = GeositeDb::new(dir.path());
        let node = RuleNode::atomic("GEOSITE", "single");
        assert_eq!(emit_rule(&node, &db), "(DOMAIN,goo.gl)");
    }

    #[test]
    fn multi_record_geosite_synthesizes_an_or() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("google"), "google.com\nfull:goo.gl\n").unwrap();
        let db = GeositeDb::new(dir.path());
        let node = RuleNode::atomic("GEOSITE", "google").with_target("Proxy");
        // The synthesized OR carries no target.
        assert_eq!(
            emit_rule(&node, &db),
            "OR,((DOMAIN-SUFFIX,google.com),(DOMAIN,goo.gl))"
        );
    }

    #[test]
    fn empty_geosite_inside_logic_keeps_tree_shape() {
        let (_dir, db) = empty_db();
        let node = RuleNode::logic(
            LogicOp::And,
            vec![RuleNode::atomic("GEOSITE", "missing")],
        )
        .with_target("DIRECT");
        assert_eq!(
            emit_rule(&node, &db),
            "AND,((# GEOSITE missing: empty or missing list)),DIRECT"
        );
    }
}
