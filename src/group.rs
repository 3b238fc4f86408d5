//! Mapping of Mihomo proxy groups to Loon [Proxy Group] lines.

use crate::config::ProxyGroupConfig;

const DEFAULT_PROBE_URL: &str = "http://www.gstatic.com/generate_204";
const DEFAULT_PROBE_INTERVAL: u64 = 300;

/// Render one proxy group as a Loon [Proxy Group] line.
///
/// Unknown group types degrade to `select` so the member list survives.
#[must_use]
pub fn convert_group(g: &ProxyGroupConfig) -> String {
    let members = g.proxies.join(",");
    let mut parts = Vec::new();
    let mut opts = Vec::new();

    match g.kind.as_str() {
        "url-test" => {
            parts.push(format!("{} = url-test", g.name));
            parts.push(members);
            opts.push(probe_url(g));
            opts.push(probe_interval(g));
            if let Some(tolerance) = g.tolerance {
                opts.push(format!("tolerance={tolerance}"));
            }
        }
        "fallback" => {
            parts.push(format!("{} = fallback", g.name));
            parts.push(members);
            opts.push(probe_url(g));
            opts.push(probe_interval(g));
        }
        "load-balance" => {
            parts.push(format!("{} = load-balance", g.name));
            parts.push(members);
            opts.push(probe_url(g));
            opts.push(probe_interval(g));
            opts.push(format!("algorithm={}", algorithm(g.strategy.as_deref())));
        }
        // `select` and anything unrecognized.
        _ => {
            parts.push(format!("{} = select", g.name));
            parts.push(members);
        }
    }

    let mut line = parts.join(",");
    if !opts.is_empty() {
        line.push(',');
        line.push_str(&opts.join(","));
    }
    line
}

fn probe_url(g: &ProxyGroupConfig) -> String {
    format!("url={}", g.url.as_deref().unwrap_or(DEFAULT_PROBE_URL))
}

fn probe_interval(g: &ProxyGroupConfig) -> String {
    format!("interval={}", g.interval.unwrap_or(DEFAULT_PROBE_INTERVAL))
}

fn algorithm(strategy: Option<&str>) -> &'static str {
    match strategy {
        Some("consistent-hashing") => "PCC",
        Some("round-robin") => "Round-Robin",
        _ => "Random",
    }
}
