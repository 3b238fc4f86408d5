mod config;
mod convert;
mod dns;
mod emit;
mod error;
mod geosite;
mod group;
mod parse;
mod proxy;
mod types;

pub use config::{
    DnsConfig, GrpcOpts, HttpOpts, MihomoConfig, PluginOpts, ProxyConfig, ProxyGroupConfig,
    RealityOpts, StringOrList, WireguardPeer, WsOpts,
};
pub use convert::{
    convert, translate_rules, ConvertOptions, MitmOptions, RemoteRule, RuleStreams,
    DEFAULT_FALLBACK_POLICY,
};
pub use dns::{convert_dns, DnsBlocks, GeneralDns};
pub use emit::emit_rule;
pub use error::ConvertError;
pub use geosite::{AttrFilter, GeositeDb, GeositeRef};
pub use group::convert_group;
pub use parse::{parse_rule, tokenize, ParseError};
pub use proxy::{convert_proxy, ProxyError};
pub use types::{LogicOp, MatchKind, MatchRecord, RuleNode, Token, TokenKind};
