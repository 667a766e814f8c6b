//! Connection configuration and URL computation.

/// Default path prefix under which the server mounts its websocket endpoint.
pub const DEFAULT_PREFIX: &str = "/api/websocketd";

/// Protocol version requested in the connection URL query string.
pub const PROTOCOL_VERSION: u32 = 2;

/// Settings for one client. Fixed for the life of a connection; the token is
/// the one exception and is replaced through
/// [`Client::set_token`](crate::Client::set_token) between runs.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server hostname or address.
    pub host: String,
    /// Explicit port; omitted from the URL when `None`.
    pub port: Option<u16>,
    /// Path prefix of the websocket endpoint.
    pub prefix: String,
    /// Initial auth token, sent as the `X-Auth-Token` header at connect time.
    pub token: Option<String>,
    /// When false, the TLS connector accepts self-signed certificates.
    pub verify_certificate: bool,
    /// When false, connect over `ws://` instead of `wss://`.
    pub secure: bool,
    /// When true, every wire frame is logged at debug level.
    pub debug: bool,
}

impl Config {
    /// Config for `host` with the defaults: no port, [`DEFAULT_PREFIX`],
    /// no token, certificate verification on, `wss://`, frame logging off.
    #[must_use]
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: None,
            prefix: DEFAULT_PREFIX.to_owned(),
            token: None,
            verify_certificate: true,
            secure: true,
            debug: false,
        }
    }

    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    #[must_use]
    pub fn with_verify_certificate(mut self, verify: bool) -> Self {
        self.verify_certificate = verify;
        self
    }

    #[must_use]
    pub fn with_secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    #[must_use]
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// The connection URL: `{scheme}://{host}{:port}{prefix}/?version=N`.
    #[must_use]
    pub fn url(&self) -> String {
        let scheme = if self.secure { "wss" } else { "ws" };
        let port = self.port.map(|port| format!(":{port}")).unwrap_or_default();
        format!(
            "{scheme}://{host}{port}{prefix}/?version={PROTOCOL_VERSION}",
            host = self.host,
            prefix = self.prefix,
        )
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
