//! Per-rule dispatch and assembly of the output document.

use crate::config::MihomoConfig;
use crate::dns::convert_dns;
use crate::emit::{emit_rule, map_rule_type, GEOSITE_TYPE};
use crate::geosite::GeositeDb;
use crate::group::convert_group;
use crate::parse::parse_rule;
use crate::proxy::{convert_proxy, ProxyError};
use crate::types::{LogicOp, RuleNode};

/// Policy applied to an externalized GEOSITE rule that names no target.
pub const DEFAULT_FALLBACK_POLICY: &str = "DIRECT";

/// Options controlling document assembly.
#[derive(Debug, Clone, Default)]
pub struct ConvertOptions {
    /// Base URL under which geosite lists are hosted. When set, top-level
    /// GEOSITE rules become [Remote Rule] entries instead of being expanded
    /// inline.
    pub base_url: Option<String>,
    /// Overrides [`DEFAULT_FALLBACK_POLICY`] for externalized rules without
    /// a target.
    pub fallback_policy: Option<String>,
    /// MITM material for the optional [MITM] section.
    pub mitm: Option<MitmOptions>,
}

impl ConvertOptions {
    fn fallback_policy(&self) -> &str {
        self.fallback_policy
            .as_deref()
            .unwrap_or(DEFAULT_FALLBACK_POLICY)
    }
}

/// CA material and hostname list for the [MITM] section.
#[derive(Debug, Clone, Default)]
pub struct MitmOptions {
    pub ca_p12: Option<String>,
    pub ca_passphrase: Option<String>,
    pub hostnames: Vec<String>,
}

/// An externalized geosite expansion: the reference name plus the routing
/// policy, expanded on demand by the hosting service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteRule {
    pub name: String,
    pub policy: String,
}

impl RemoteRule {
    /// Render as a [Remote Rule] line pointing at the hosted list.
    #[must_use]
    pub fn render(&self, base_url: &str) -> String {
        format!(
            "{base_url}/geosite/{name}.list,policy={policy},enabled=true,tag={name}",
            name = self.name,
            policy = self.policy,
        )
    }
}

/// The two output streams of rule translation. Relative order is preserved
/// within each stream; the streams are independent.
#[derive(Debug, Default)]
pub struct RuleStreams {
    pub inline: Vec<String>,
    pub remote: Vec<RemoteRule>,
}

/// Translate a rule list into inline lines and remote-rule descriptors.
///
/// Every input rule produces exactly one entry in exactly one stream;
/// failures become inline comment lines, never errors.
#[must_use]
pub fn translate_rules(rules: &[String], db: &GeositeDb, opts: &ConvertOptions) -> RuleStreams {
    let mut streams = RuleStreams::default();
    for raw in rules {
        translate_line(raw, db, opts, &mut streams);
    }
    streams
}

fn translate_line(raw: &str, db: &GeositeDb, opts: &ConvertOptions, out: &mut RuleStreams) {
    let line = raw.trim();

    // Logic rules go through the parser and are always emitted inline; only
    // top-level, non-nested GEOSITE rules are eligible for externalization.
    if outermost_is_logic(line) {
        match parse_rule(line) {
            Ok(node) => out.inline.push(emit_rule(&node, db)),
            Err(err) => out
                .inline
                .push(format!("# Error converting logic rule: {err} | Input: {line}")),
        }
        return;
    }

    // Atomic rule: type,value[,target][,extras...]
    let parts: Vec<&str> = line.split(',').map(str::trim).collect();
    if parts.len() < 2 || parts[0].is_empty() {
        out.inline.push(format!("# Unknown rule: {line}"));
        return;
    }
    let kind = parts[0].to_ascii_uppercase();
    let value = parts[1];
    let target = parts.get(2).copied().filter(|t| !t.is_empty());
    let extras: Vec<String> = parts.iter().skip(3).map(|s| (*s).to_owned()).collect();

    if kind == GEOSITE_TYPE {
        if opts.base_url.is_some() {
            out.remote.push(RemoteRule {
                name: value.to_owned(),
                policy: target.unwrap_or(opts.fallback_policy()).to_owned(),
            });
        } else {
            let node = RuleNode::Atomic {
                kind,
                value: value.to_owned(),
                target: target.map(str::to_owned),
                extras,
            };
            out.inline.push(emit_rule(&node, db));
        }
        return;
    }

    match map_rule_type(&kind) {
        Some(mapped) => out.inline.push(render_atomic(mapped, value, target, &extras)),
        // Unknown but complete rules pass through unmapped so operator rules
        // the table has not covered yet are not lost.
        None if parts.len() >= 3 => {
            out.inline.push(render_atomic(&kind, value, target, &extras));
        }
        None => out.inline.push(format!("# Unknown rule: {line}")),
    }
}

fn render_atomic(kind: &str, value: &str, target: Option<&str>, extras: &[String]) -> String {
    let mut line = format!("{kind},{value}");
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

/// True when the first comma-separated field of the line is a logic operator.
fn outermost_is_logic(line: &str) -> bool {
    line.split(',')
        .next()
        .map(str::trim)
        .and_then(LogicOp::parse)
        .is_some()
}

/// Translate a whole Mihomo document into a Loon configuration.
///
/// Proxies that cannot be mapped are skipped with a warning; per-rule
/// failures surface as comment lines. The output is always a complete
/// document.
#[must_use]
pub fn convert(config: &MihomoConfig, db: &GeositeDb, opts: &ConvertOptions) -> String {
    let mut lines = Vec::new();
    let dns = convert_dns(&config.dns, db);

    lines.push("[General]".to_owned());
    if config.ipv6 {
        lines.push("ipv6 = true".to_owned());
    }
    if config.allow_lan {
        lines.push("allow-wifi-access = true".to_owned());
    }
    if !dns.general.dns_server.is_empty() {
        lines.push(format!("dns-server = {}", dns.general.dns_server));
    }
    if !dns.general.doh_server.is_empty() {
        lines.push(format!("doh-server = {}", dns.general.doh_server));
    }
    if !dns.general.doq_server.is_empty() {
        lines.push(format!("doq-server = {}", dns.general.doq_server));
    }
    lines.push(String::new());

    lines.push("[Proxy]".to_owned());
    for proxy in &config.proxies {
        match convert_proxy(proxy) {
            Ok(line) => lines.push(line),
            Err(err @ ProxyError::UnsupportedType { .. }) => {
                tracing::debug!("skipping proxy: {err}");
            }
            Err(err) => tracing::warn!("skipping proxy: {err}"),
        }
    }
    lines.push(String::new());

    lines.push("[Proxy Group]".to_owned());
    for group in &config.proxy_groups {
        lines.push(convert_group(group));
    }
    lines.push(String::new());

    let streams = translate_rules(&config.rules, db, opts);

    lines.push("[Rule]".to_owned());
    lines.extend(streams.inline);
    lines.push(String::new());

    if let Some(base_url) = &opts.base_url {
        if !streams.remote.is_empty() {
            lines.push("[Remote Rule]".to_owned());
            for remote in &streams.remote {
                lines.push(remote.render(base_url));
            }
            lines.push(String::new());
        }
    }

    if !dns.hosts.is_empty() {
        lines.push("[Host]".to_owned());
        lines.extend(dns.hosts);
    }

    if let Some(mitm) = &opts.mitm {
        lines.push(String::new());
        lines.push("[MITM]".to_owned());
        lines.push("enable = true".to_owned());
        lines.push("skip-server-cert-verify = true".to_owned());
        if let Some(p12) = &mitm.ca_p12 {
            lines.push(format!("ca-p12 = {p12}"));
        }
        if let Some(passphrase) = &mitm.ca_passphrase {
            lines.push(format!("ca-passphrase = {passphrase}"));
        }
        if !mitm.hostnames.is_empty() {
            lines.push(format!("hostname = {}", mitm.hostnames.join(",")));
        }
    }

    lines.join("\n")
}
