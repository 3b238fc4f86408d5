use std::fs;

use tempfile::TempDir;

use mihomo2loon::{convert, ConvertOptions, GeositeDb, MihomoConfig, MitmOptions};

fn empty_db() -> (TempDir, GeositeDb) {
    let dir = TempDir::new().unwrap();
    let db = GeositeDb::new(dir.path());
    (dir, db)
}

#[test]
fn generates_a_complete_configuration() {
    let config = MihomoConfig::from_yaml(
        r"
allow-lan: true
ipv6: false
dns:
  enable: true
  nameserver: [1.1.1.1]
  nameserver-policy:
    google.com: 8.8.8.8
proxies:
  - name: p1
    type: ss
    server: 1.1.1.1
    port: 80
    cipher: aes-128-gcm
    password: pass
proxy-groups:
  - name: g1
    type: select
    proxies: [p1]
rules:
  - DOMAIN,example.com,p1
  - MATCH,DIRECT
",
    )
    .unwrap();

    let (_dir, db) = empty_db();
    let result = convert(&config, &db, &ConvertOptions::default());

    assert!(result.contains("[General]"));
    assert!(result.contains("[Proxy]"));
    assert!(result.contains("[Proxy Group]"));
    assert!(result.contains("[Rule]"));
    assert!(result.contains("[Host]"));

    assert!(result.contains("allow-wifi-access = true"));
    assert!(!result.contains("ipv6 = true"));
    assert!(result.contains("dns-server = 1.1.1.1"));
    assert!(result.contains("google.com = server:8.8.8.8"));
    assert!(result.contains("p1 = Shadowsocks,1.1.1.1,80,aes-128-gcm,\"pass\""));
    assert!(result.contains("g1 = select,p1"));
    assert!(result.contains("DOMAIN,example.com,p1"));
    assert!(result.contains("FINAL,DIRECT"));
}

#[test]
fn sections_appear_in_fixed_order() {
    let config = MihomoConfig::from_yaml(
        r"
dns:
  enable: true
  nameserver-policy:
    a.example: 1.1.1.1
rules:
  - MATCH,DIRECT
",
    )
    .unwrap();
    let (_dir, db) = empty_db();
    let result = convert(&config, &db, &ConvertOptions::default());

    let general = result.find("[General]").unwrap();
    let proxy = result.find("[Proxy]").unwrap();
    let group = result.find("[Proxy Group]").unwrap();
    let rule = result.find("[Rule]").unwrap();
    let host = result.find("[Host]").unwrap();
    assert!(general < proxy && proxy < group && group < rule && rule < host);
}

#[test]
fn appends_mitm_section_when_configured() {
    let config = MihomoConfig::from_yaml("rules: []").unwrap();
    let (_dir, db) = empty_db();
    let opts = ConvertOptions {
        mitm: Some(MitmOptions {
            ca_p12: Some("base64data".to_owned()),
            ca_passphrase: Some("pass".to_owned()),
            hostnames: vec!["*.example.com".to_owned()],
        }),
        ..ConvertOptions::default()
    };
    let result = convert(&config, &db, &opts);

    assert!(result.contains("[MITM]"));
    assert!(result.contains("enable = true"));
    assert!(result.contains("skip-server-cert-verify = true"));
    assert!(result.contains("ca-p12 = base64data"));
    assert!(result.contains("ca-passphrase = pass"));
    assert!(result.contains("hostname = *.example.com"));
}

#[test]
fn no_mitm_section_without_options() {
    let config = MihomoConfig::from_yaml("rules: []").unwrap();
    let (_dir, db) = empty_db();
    let result = convert(&config, &db, &ConvertOptions::default());
    assert!(!result.contains("[MITM]"));
}

#[test]
fn generates_remote_rules_for_geosites() {
    let config = MihomoConfig::from_yaml(
        r"
rules:
  - GEOSITE,google,Proxy
  - GEOSITE,youtube,DIRECT
  - DOMAIN,example.com,Proxy
",
    )
    .unwrap();
    let (_dir, db) = empty_db();
    let opts = ConvertOptions {
        base_url: Some("http://localhost:8080".to_owned()),
        ..ConvertOptions::default()
    };
    let result = convert(&config, &db, &opts);

    assert!(result.contains("[Remote Rule]"));
    assert!(result.contains(
        "http://localhost:8080/geosite/google.list,policy=Proxy,enabled=true,tag=google"
    ));
    assert!(result.contains(
        "http://localhost:8080/geosite/youtube.list,policy=DIRECT,enabled=true,tag=youtube"
    ));

    // Plain rules stay in [Rule]; externalized GEOSITEs leave no inline trace.
    assert!(result.contains("[Rule]"));
    assert!(result.contains("DOMAIN,example.com,Proxy"));
    assert!(!result.contains("GEOSITE,google,Proxy"));
}

#[test]
fn no_remote_rule_section_without_base_url() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("google"), "google.com\nfull:goo.gl\n").unwrap();
    let db = GeositeDb::new(dir.path());

    let config = MihomoConfig::from_yaml("rules: [\"GEOSITE,google,Proxy\"]").unwrap();
    let result = convert(&config, &db, &ConvertOptions::default());

    assert!(!result.contains("[Remote Rule]"));
    assert!(result.contains("OR,((DOMAIN-SUFFIX,google.com),(DOMAIN,goo.gl))"));
}

#[test]
fn nested_geosite_stays_inline_in_externalized_mode() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("google"), "google.com\n").unwrap();
    let db = GeositeDb::new(dir.path());

    let config =
        MihomoConfig::from_yaml("rules: [\"AND,((GEOSITE,google),(NETWORK,UDP)),Proxy\"]")
            .unwrap();
    let opts = ConvertOptions {
        base_url: Some("http://localhost:8080".to_owned()),
        ..ConvertOptions::default()
    };
    let result = convert(&config, &db, &opts);

    assert!(!result.contains("[Remote Rule]"));
    assert!(result.contains("AND,(((DOMAIN-SUFFIX,google.com)),(PROTOCOL,UDP)),Proxy"));
}

#[test]
fn unmappable_proxy_is_skipped_not_fatal() {
    let config = MihomoConfig::from_yaml(
        r"
proxies:
  - name: broken
    type: ss
    port: 80
  - name: ok
    type: socks5
    server: 1.1.1.1
    port: 1080
rules: []
",
    )
    .unwrap();
    let (_dir, db) = empty_db();
    let result = convert(&config, &db, &ConvertOptions::default());

    assert!(!result.contains("broken"));
    assert!(result.contains("ok = Socks5,1.1.1.1,1080"));
}

#[test]
fn failed_rules_still_yield_a_complete_document() {
    let config = MihomoConfig::from_yaml(
        r#"
rules:
  - "AND,((DOMAIN,a.com)"
  - "MATCH,DIRECT"
"#,
    )
    .unwrap();
    let (_dir, db) = empty_db();
    let result = convert(&config, &db, &ConvertOptions::default());

    assert!(result.contains("# Error converting logic rule:"));
    assert!(result.contains("FINAL,DIRECT"));
    assert!(result.contains("[Rule]"));
}
