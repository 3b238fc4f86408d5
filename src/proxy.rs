//! Mapping of Mihomo proxy entries to Loon [Proxy] lines.
//!
//! Each supported type renders as `name = Type,positional...,key=value...`.
//! Secrets (passwords, UUIDs, keys) are quoted the way Loon expects.

use thiserror::Error;

use crate::config::{ProxyConfig, WireguardPeer};

/// A proxy entry that cannot be rendered.
#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("proxy '{name}': missing required field '{field}'")]
    MissingField { name: String, field: &'static str },

    #[error("proxy '{name}': unsupported type '{kind}'")]
    UnsupportedType { name: String, kind: String },
}

/// Accumulates the positional parts and trailing `key=value` options of one
/// output line.
struct Line {
    parts: Vec<String>,
    opts: Vec<String>,
}

impl Line {
    fn new(name: &str, loon_type: &str) -> Self {
        Self {
            parts: vec![format!("{name} = {loon_type}")],
            opts: Vec::new(),
        }
    }

    fn push(&mut self, part: impl ToString) {
        self.parts.push(part.to_string());
    }

    fn quoted(&mut self, part: &str) {
        self.parts.push(format!("\"{part}\""));
    }

    fn opt(&mut self, key: &str, value: impl AsRef<str>) {
        let value = value.as_ref();
        if !value.is_empty() {
            self.opts.push(format!("{key}={value}"));
        }
    }

    fn finish(mut self) -> String {
        self.parts.append(&mut self.opts);
        self.parts.join(",")
    }
}

fn required<'a>(
    p: &ProxyConfig,
    field: &'static str,
    value: Option<&'a str>,
) -> Result<&'a str, ProxyError> {
    value.ok_or_else(|| ProxyError::MissingField {
        name: p.name.clone(),
        field,
    })
}

fn required_port(p: &ProxyConfig) -> Result<u16, ProxyError> {
    p.port.ok_or_else(|| ProxyError::MissingField {
        name: p.name.clone(),
        field: "port",
    })
}

/// Render one proxy entry as a Loon [Proxy] line.
///
/// # Errors
///
/// Returns [`ProxyError`] when a required field is absent or the type has no
/// Loon counterpart. Callers log and skip such entries.
pub fn convert_proxy(p: &ProxyConfig) -> Result<String, ProxyError> {
    match p.kind.as_str() {
        "ss" => shadowsocks(p),
        "socks5" => socks5(p),
        "http" => http(p),
        "vmess" => vmess(p),
        "vless" => vless(p),
        "trojan" => trojan(p),
        "hysteria2" => hysteria2(p),
        "wireguard" => wireguard(p),
        other => Err(ProxyError::UnsupportedType {
            name: p.name.clone(),
            kind: other.to_owned(),
        }),
    }
}

/// Options shared by every proxy type.
fn common_opts(p: &ProxyConfig, line: &mut Line) {
    if p.udp == Some(true) {
        line.opt("udp", "true");
    }
    if p.skip_cert_verify == Some(true) {
        line.opt("skip-cert-verify", "true");
    }
    if p.tfo == Some(true) {
        line.opt("fast-open", "true");
    }
}

fn shadowsocks(p: &ProxyConfig) -> Result<String, ProxyError> {
    let mut line = Line::new(&p.name, "Shadowsocks");
    line.push(required(p, "server", p.server.as_deref())?);
    line.push(required_port(p)?);
    line.push(required(p, "cipher", p.cipher.as_deref())?);
    line.quoted(required(p, "password", p.password.as_deref())?);
    common_opts(p, &mut line);
    if p.plugin.as_deref() == Some("obfs") {
        if let Some(opts) = &p.plugin_opts {
            if let Some(host) = &opts.host {
                line.opt("obfs-host", host);
            }
            if let Some(mode) = &opts.mode {
                line.opt("obfs-name", mode);
            }
        }
    }
    Ok(line.finish())
}

fn socks5(p: &ProxyConfig) -> Result<String, ProxyError> {
    let mut line = Line::new(&p.name, "Socks5");
    line.push(required(p, "server", p.server.as_deref())?);
    line.push(required_port(p)?);
    if let Some(username) = &p.username {
        line.push(username);
    }
    if let Some(password) = &p.password {
        line.quoted(password);
    }
    common_opts(p, &mut line);
    if p.tls == Some(true) {
        line.opt("tls", "true");
    }
    Ok(line.finish())
}

fn http(p: &ProxyConfig) -> Result<String, ProxyError> {
    let mut line = Line::new(&p.name, "http");
    line.push(required(p, "server", p.server.as_deref())?);
    line.push(required_port(p)?);
    if let Some(username) = &p.username {
        line.push(username);
    }
    if let Some(password) = &p.password {
        line.quoted(password);
    }
    common_opts(p, &mut line);
    if p.tls == Some(true) {
        line.opt("over-tls", "true");
    }
    Ok(line.finish())
}

fn vmess(p: &ProxyConfig) -> Result<String, ProxyError> {
    let mut line = Line::new(&p.name, "vmess");
    line.push(required(p, "server", p.server.as_deref())?);
    line.push(required_port(p)?);
    line.push(p.cipher.as_deref().unwrap_or("auto"));
    line.quoted(required(p, "uuid", p.uuid.as_deref())?);
    common_opts(p, &mut line);
    if let Some(network) = &p.network {
        line.opt("transport", network);
    }
    if p.tls == Some(true) {
        line.opt("over-tls", "true");
    }
    if let Some(servername) = &p.servername {
        line.opt("tls-name", servername);
    }
    if let Some(ws) = &p.ws_opts {
        if let Some(path) = &ws.path {
            line.opt("path", path);
        }
        if let Some(host) = ws.headers.get("Host") {
            line.opt("host", host);
        }
    }
    if let Some(http) = &p.http_opts {
        if let Some(path) = http.path.first() {
            line.opt("path", path);
        }
        if let Some(host) = http.headers.get("Host").and_then(|h| h.first()) {
            line.opt("host", host);
        }
    }
    if let Some(grpc) = &p.grpc_opts {
        if let Some(service) = &grpc.grpc_service_name {
            line.opt("service-name", service);
        }
    }
    Ok(line.finish())
}

fn vless(p: &ProxyConfig) -> Result<String, ProxyError> {
    let mut line = Line::new(&p.name, "VLESS");
    line.push(required(p, "server", p.server.as_deref())?);
    line.push(required_port(p)?);
    line.quoted(required(p, "uuid", p.uuid.as_deref())?);
    common_opts(p, &mut line);
    if let Some(network) = &p.network {
        line.opt("transport", network);
    }
    if p.tls == Some(true) {
        line.opt("over-tls", "true");
    }
    if let Some(servername) = &p.servername {
        line.opt("tls-name", servername);
    }
    if let Some(flow) = &p.flow {
        line.opt("flow", flow);
    }
    if let Some(ws) = &p.ws_opts {
        if let Some(path) = &ws.path {
            line.opt("path", path);
        }
        if let Some(host) = ws.headers.get("Host") {
            line.opt("host", host);
        }
    }
    if let Some(grpc) = &p.grpc_opts {
        if let Some(service) = &grpc.grpc_service_name {
            line.opt("service-name", service);
        }
    }
    if let Some(reality) = &p.reality_opts {
        if let Some(key) = &reality.public_key {
            line.opt("public-key", key);
        }
        if let Some(id) = &reality.short_id {
            line.opt("short-id", id);
        }
    }
    if let Some(fingerprint) = &p.client_fingerprint {
        line.opt("client-fingerprint", fingerprint);
    }
    Ok(line.finish())
}

fn trojan(p: &ProxyConfig) -> Result<String, ProxyError> {
    let mut line = Line::new(&p.name, "trojan");
    line.push(required(p, "server", p.server.as_deref())?);
    line.push(required_port(p)?);
    line.quoted(required(p, "password", p.password.as_deref())?);
    common_opts(p, &mut line);
    if let Some(sni) = &p.sni {
        line.opt("tls-name", sni);
    }
    if let Some(alpn) = &p.alpn {
        line.opt("alpn", alpn.join(","));
    }
    if let Some(ws) = &p.ws_opts {
        line.opt("transport", "ws");
        if let Some(path) = &ws.path {
            line.opt("path", path);
        }
        if let Some(host) = ws.headers.get("Host") {
            line.opt("host", host);
        }
    }
    Ok(line.finish())
}

fn hysteria2(p: &ProxyConfig) -> Result<String, ProxyError> {
    let mut line = Line::new(&p.name, "Hysteria2");
    line.push(required(p, "server", p.server.as_deref())?);
    line.push(required_port(p)?);
    if let Some(password) = &p.password {
        line.quoted(password);
    }
    common_opts(p, &mut line);
    if let Some(sni) = &p.sni {
        line.opt("sni", sni);
    }
    // Mihomo spells the salamander secret either way.
    if let Some(obfs) = &p.obfs {
        line.opt("salamander-password", obfs);
    }
    if let Some(obfs_password) = &p.obfs_password {
        line.opt("salamander-password", obfs_password);
    }
    Ok(line.finish())
}

fn wireguard(p: &ProxyConfig) -> Result<String, ProxyError> {
    let mut line = Line::new(&p.name, "wireguard");
    common_opts(p, &mut line);
    if let Some(ip) = &p.ip {
        line.opt("interface-ip", ip);
    }
    if let Some(ipv6) = &p.ipv6 {
        line.opt("interface-ipV6", ipv6);
    }
    if let Some(key) = &p.private_key {
        line.opt("private-key", format!("\"{key}\""));
    }
    if let Some(mtu) = p.mtu {
        line.opt("mtu", mtu.to_string());
    }
    if let Some(dns) = p.dns.as_ref().and_then(|list| list.first()) {
        line.opt("dns", dns);
    }
    if let Some(peers) = &p.peers {
        if !peers.is_empty() {
            let rendered: Vec<String> = peers.iter().map(render_peer).collect();
            line.push(format!("peers=[{}]", rendered.join(",")));
        }
    }
    Ok(line.finish())
}

fn render_peer(peer: &WireguardPeer) -> String {
    let mut props = Vec::new();
    if let Some(key) = &peer.public_key {
        props.push(format!("public-key=\"{key}\""));
    }
    if let Some(key) = &peer.preshared_key {
        props.push(format!("preshared-key=\"{key}\""));
    }
    if let Some(allowed) = &peer.allowed_ips {
        props.push(format!("allowed-ips=\"{}\"", allowed.join(",")));
    }
    if let (Some(server), Some(port)) = (&peer.server, peer.port) {
        props.push(format!("endpoint={server}:{port}"));
    }
    format!("{{{}}}", props.join(","))
}
