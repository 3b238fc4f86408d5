//! Serde model of the Mihomo configuration document.
//!
//! Only the fields the translation consumes are modeled; everything else in
//! the source document is ignored. Field names follow Mihomo's kebab-case
//! spelling.

use std::path::Path;

use serde::Deserialize;

use crate::error::ConvertError;

/// The parsed source document.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct MihomoConfig {
    #[serde(default)]
    pub ipv6: bool,
    #[serde(default)]
    pub allow_lan: bool,
    #[serde(default)]
    pub dns: DnsConfig,
    #[serde(default)]
    pub proxies: Vec<ProxyConfig>,
    #[serde(default)]
    pub proxy_groups: Vec<ProxyGroupConfig>,
    #[serde(default)]
    pub rules: Vec<String>,
}

impl MihomoConfig {
    /// Parse a YAML document.
    ///
    /// # Errors
    ///
    /// Returns [`ConvertError`] when the input is not valid YAML or does not
    /// match the document shape.
    pub fn from_yaml(input: &str) -> Result<Self, ConvertError> {
        Ok(serde_yaml::from_str(input)?)
    }

    /// Read and parse a YAML document from a file.
    ///
    /// # Errors
    ///
    /// Returns [`ConvertError`] on I/O or parse failure.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConvertError> {
        let input = std::fs::read_to_string(path)?;
        Self::from_yaml(&input)
    }
}

/// The `dns:` block. `nameserver-policy` stays an ordered YAML mapping so the
/// emitted `[Host]` block follows the source order.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct DnsConfig {
    #[serde(default)]
    pub enable: bool,
    #[serde(default)]
    pub nameserver: Vec<String>,
    #[serde(default)]
    pub nameserver_policy: serde_yaml::Mapping,
}

/// A value that may be written as a single string or a list of strings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum StringOrList {
    One(String),
    Many(Vec<String>),
}

impl StringOrList {
    #[must_use]
    pub fn first(&self) -> Option<&str> {
        match self {
            StringOrList::One(s) => Some(s),
            StringOrList::Many(list) => list.first().map(String::as_str),
        }
    }

    #[must_use]
    pub fn join(&self, sep: &str) -> String {
        match self {
            StringOrList::One(s) => s.clone(),
            StringOrList::Many(list) => list.join(sep),
        }
    }
}

/// One entry of the `proxies:` list. A single struct with optional fields
/// covers the per-type vocabularies; the mapper checks what each type needs.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ProxyConfig {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub server: Option<String>,
    pub port: Option<u16>,
    pub cipher: Option<String>,
    pub password: Option<String>,
    pub uuid: Option<String>,
    pub username: Option<String>,
    pub udp: Option<bool>,
    pub skip_cert_verify: Option<bool>,
    pub tfo: Option<bool>,
    pub tls: Option<bool>,
    pub network: Option<String>,
    pub servername: Option<String>,
    pub sni: Option<String>,
    pub flow: Option<String>,
    pub alpn: Option<StringOrList>,
    pub client_fingerprint: Option<String>,
    pub plugin: Option<String>,
    pub plugin_opts: Option<PluginOpts>,
    pub ws_opts: Option<WsOpts>,
    pub http_opts: Option<HttpOpts>,
    pub grpc_opts: Option<GrpcOpts>,
    pub reality_opts: Option<RealityOpts>,
    pub obfs: Option<String>,
    pub obfs_password: Option<String>,
    // wireguard
    pub ip: Option<String>,
    pub ipv6: Option<String>,
    pub private_key: Option<String>,
    pub mtu: Option<u32>,
    pub dns: Option<Vec<String>>,
    pub peers: Option<Vec<WireguardPeer>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PluginOpts {
    pub host: Option<String>,
    pub mode: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct WsOpts {
    pub path: Option<String>,
    #[serde(default)]
    pub headers: std::collections::HashMap<String, String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct HttpOpts {
    #[serde(default)]
    pub path: Vec<String>,
    #[serde(default)]
    pub headers: std::collections::HashMap<String, StringOrList>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct GrpcOpts {
    pub grpc_service_name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RealityOpts {
    pub public_key: Option<String>,
    pub short_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct WireguardPeer {
    pub server: Option<String>,
    pub port: Option<u16>,
    pub public_key: Option<String>,
    pub preshared_key: Option<String>,
    pub allowed_ips: Option<StringOrList>,
}

/// One entry of the `proxy-groups:` list.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ProxyGroupConfig {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub proxies: Vec<String>,
    pub url: Option<String>,
    pub interval: Option<u64>,
    pub tolerance: Option<u64>,
    pub strategy: Option<String>,
}
