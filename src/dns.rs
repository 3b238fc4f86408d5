//! Translation of the `dns:` block into [General] resolver settings and
//! [Host] mapping lines.

use serde_yaml::Value;

use crate::config::DnsConfig;
use crate::geosite::GeositeDb;
use crate::types::MatchKind;

/// Upstream resolver settings for the [General] section. Each field is a
/// comma-joined server list; empty when no server of that scheme is present.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeneralDns {
    pub dns_server: String,
    pub doh_server: String,
    pub doq_server: String,
}

/// Output of DNS translation.
#[derive(Debug, Clone, Default)]
pub struct DnsBlocks {
    pub general: GeneralDns,
    pub hosts: Vec<String>,
}

/// Translate the DNS block. Disabled DNS yields empty output.
///
/// Nameservers are categorized by scheme. `nameserver-policy` entries map to
/// `[Host]` lines; `geosite:` keys expand through the resolver, with suffix
/// records emitting both a wildcard and an exact mapping and keyword records
/// a comment placeholder (they are not representable in [Host]).
#[must_use]
pub fn convert_dns(dns: &DnsConfig, db: &GeositeDb) -> DnsBlocks {
    let mut blocks = DnsBlocks::default();
    if !dns.enable {
        return blocks;
    }

    let mut udp = Vec::new();
    let mut doh = Vec::new();
    let mut doq = Vec::new();
    for ns in &dns.nameserver {
        if ns.starts_with("https://") {
            doh.push(ns.as_str());
        } else if ns.starts_with("quic://") {
            doq.push(ns.as_str());
        } else {
            udp.push(ns.as_str());
        }
    }
    blocks.general.dns_server = udp.join(",");
    blocks.general.doh_server = doh.join(",");
    blocks.general.doq_server = doq.join(",");

    for (key, value) in &dns.nameserver_policy {
        let Some(key) = key.as_str() else { continue };
        let Some(server) = policy_server(value) else {
            continue;
        };
        let server = format!("server:{server}");

        if let Some(reference) = key.strip_prefix("geosite:") {
            for record in db.resolve(reference) {
                match record.kind {
                    MatchKind::Exact => {
                        blocks.hosts.push(format!("{} = {server}", record.pattern));
                    }
                    MatchKind::Suffix => {
                        blocks.hosts.push(format!("*.{} = {server}", record.pattern));
                        blocks.hosts.push(format!("{} = {server}", record.pattern));
                    }
                    MatchKind::Keyword => {
                        blocks
                            .hosts
                            .push(format!("# Keyword rule skipped for Host: {}", record.pattern));
                    }
                    // URL regexes have no [Host] representation.
                    MatchKind::UrlRegex => {}
                }
            }
        } else {
            blocks.hosts.push(format!("{key} = {server}"));
        }
    }

    blocks
}

/// A policy value is a server string or a list of them; only the first entry
/// of a list is kept.
fn policy_server(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Sequence(seq) => seq.first().and_then(Value::as_str).map(str::to_owned),
        _ => None,
    }
}
