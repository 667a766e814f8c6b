use super::*;

#[test]
fn url_with_defaults() {
    let config = Config::new("wsd.example.com");
    assert_eq!(config.url(), "wss://wsd.example.com/api/websocketd/?version=2");
}

#[test]
fn url_includes_explicit_port() {
    let config = Config::new("wsd.example.com").with_port(9502);
    assert_eq!(config.url(), "wss://wsd.example.com:9502/api/websocketd/?version=2");
}

#[test]
fn url_uses_ws_scheme_when_insecure() {
    let config = Config::new("localhost").with_port(9502).with_secure(false);
    assert_eq!(config.url(), "ws://localhost:9502/api/websocketd/?version=2");
}

#[test]
fn url_honors_custom_prefix() {
    let config = Config::new("wsd.example.com").with_prefix("/ws");
    assert_eq!(config.url(), "wss://wsd.example.com/ws/?version=2");
}

#[test]
fn new_applies_documented_defaults() {
    let config = Config::new("wsd.example.com");
    assert_eq!(config.prefix, DEFAULT_PREFIX);
    assert!(config.port.is_none());
    assert!(config.token.is_none());
    assert!(config.verify_certificate);
    assert!(config.secure);
    assert!(!config.debug);
}

#[test]
fn builders_override_defaults() {
    let config = Config::new("wsd.example.com")
        .with_token("tok")
        .with_verify_certificate(false)
        .with_debug(true);
    assert_eq!(config.token.as_deref(), Some("tok"));
    assert!(!config.verify_certificate);
    assert!(config.debug);
}
