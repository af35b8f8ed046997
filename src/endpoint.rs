//! Endpoint resolution for generation service addresses.
//!
//! User-supplied addresses come in three shapes: a full URL with an optional
//! path prefix, a `host:port` pair, or a bare hostname. All three resolve to
//! the same canonical [`Endpoint`]. Resolution is total; an address that makes
//! no sense still yields a best-effort endpoint that the first connection
//! attempt will fail against.

use std::fmt;

/// Port assumed when an address names neither a port nor a scheme.
pub const DEFAULT_PORT: u16 = 11434;

/// URL scheme of a resolved endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheme {
    Http,
    Https,
}

impl Scheme {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Http => "http",
            Self::Https => "https",
        }
    }

    const fn default_port(&self) -> u16 {
        match self {
            Self::Http => 80,
            Self::Https => 443,
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical address of a generation service instance.
///
/// Immutable once resolved. `base_path` is empty or starts with `/` and never
/// ends with one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub scheme: Scheme,
    pub host: String,
    pub port: u16,
    pub base_path: String,
}

impl Endpoint {
    /// Resolve a raw address into an endpoint.
    ///
    /// `fallback_port` applies only to bare hostnames; addresses that carry
    /// their own port (explicitly or through the URL scheme) ignore it.
    pub fn resolve(address: &str, fallback_port: Option<u16>) -> Self {
        let address = address.trim();

        if (address.starts_with("http://") || address.starts_with("https://"))
            && let Some(endpoint) = Self::from_url(address)
        {
            return endpoint;
        }
        // A malformed URL falls through and is treated like a plain host.

        if let Some((host, port)) = split_host_port(address) {
            return Self {
                scheme: Scheme::Http,
                host: host.to_string(),
                port,
                base_path: String::new(),
            };
        }

        Self {
            scheme: Scheme::Http,
            host: address.to_string(),
            port: fallback_port.unwrap_or(DEFAULT_PORT),
            base_path: String::new(),
        }
    }

    fn from_url(address: &str) -> Option<Self> {
        let url = reqwest::Url::parse(address).ok()?;
        let scheme = match url.scheme() {
            "http" => Scheme::Http,
            "https" => Scheme::Https,
            _ => return None,
        };
        let host = url.host_str()?.to_string();
        let port = url.port().unwrap_or(scheme.default_port());
        let base_path = url.path().trim_end_matches('/').to_string();
        Some(Self {
            scheme,
            host,
            port,
            base_path,
        })
    }

    /// `scheme://host:port{base_path}`, with IPv6 hosts bracketed.
    pub fn base_url(&self) -> String {
        let host: &str = &self.host;
        if host.contains(':') && !host.starts_with('[') {
            format!("{}://[{}]:{}{}", self.scheme, host, self.port, self.base_path)
        } else {
            format!("{}://{}:{}{}", self.scheme, host, self.port, self.base_path)
        }
    }

    /// Full URL for an API route, e.g. `api_url("generate")`.
    pub fn api_url(&self, route: &str) -> String {
        format!("{}/api/{}", self.base_url(), route)
    }
}

/// Split `host:port` at the last colon so IPv6-style literals keep their
/// embedded colons. Returns `None` when the right-hand side is not a usable
/// port, in which case the whole string is a hostname.
fn split_host_port(address: &str) -> Option<(&str, u16)> {
    let (host, port) = address.rsplit_once(':')?;
    if host.is_empty() {
        return None;
    }
    let port = port.parse::<u16>().ok().filter(|port| *port != 0)?;
    Some((host, port))
}

/// Fold the legacy split host/port representation into the combined-address
/// form. Applies only when the stored host has neither a scheme nor an
/// embedded colon; anything else is already in the combined form and is
/// returned untouched.
pub fn fold_legacy_host_port(host: &str, port: Option<u16>) -> String {
    match port {
        Some(port) if !host.is_empty() && !host.contains(':') && !host.starts_with("http") => {
            format!("{host}:{port}")
        }
        _ => host.to_string(),
    }
}
