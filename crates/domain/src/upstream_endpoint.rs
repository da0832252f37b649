use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UrlScheme {
    Https,
    /// Plain HTTP, only accepted for local test doubles.
    Http,
}

impl UrlScheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Https => "https",
            Self::Http => "http",
        }
    }

    pub fn default_port(&self) -> u16 {
        match self {
            Self::Https => 443,
            Self::Http => 80,
        }
    }
}

/// A parsed DoH endpoint URL (RFC 8484 URI template without variables).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UpstreamEndpoint {
    url: Arc<str>,
    scheme: UrlScheme,
    host: Arc<str>,
    port: u16,
    path: Arc<str>,
}

impl UpstreamEndpoint {
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn scheme(&self) -> UrlScheme {
        self.scheme
    }

    /// Host part without IPv6 brackets.
    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the IP address when the host is an IP literal.
    pub fn ip_literal(&self) -> Option<IpAddr> {
        self.host.parse::<IpAddr>().ok()
    }

    pub fn is_ip_literal(&self) -> bool {
        self.ip_literal().is_some()
    }
}

fn split_host_port(authority: &str) -> Result<(&str, Option<u16>), String> {
    if let Some(rest) = authority.strip_prefix('[') {
        let end = rest
            .find(']')
            .ok_or_else(|| format!("Unterminated IPv6 literal in '{}'", authority))?;
        let host = &rest[..end];
        let tail = &rest[end + 1..];
        if tail.is_empty() {
            return Ok((host, None));
        }
        let port_str = tail
            .strip_prefix(':')
            .ok_or_else(|| format!("Unexpected characters after IPv6 literal in '{}'", authority))?;
        let port = port_str
            .parse::<u16>()
            .map_err(|e| format!("Invalid port '{}': {}", port_str, e))?;
        return Ok((host, Some(port)));
    }

    match authority.rsplit_once(':') {
        Some((host, port_str)) => {
            let port = port_str
                .parse::<u16>()
                .map_err(|e| format!("Invalid port '{}': {}", port_str, e))?;
            Ok((host, Some(port)))
        }
        None => Ok((authority, None)),
    }
}

impl FromStr for UpstreamEndpoint {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (scheme, rest) = if let Some(rest) = s.strip_prefix("https://") {
            (UrlScheme::Https, rest)
        } else if let Some(rest) = s.strip_prefix("http://") {
            (UrlScheme::Http, rest)
        } else {
            return Err(format!(
                "Invalid DoH URL '{}'. Expected: https://HOST[:PORT]/PATH",
                s
            ));
        };

        let (authority, path) = match rest.find('/') {
            Some(idx) => (&rest[..idx], &rest[idx..]),
            None => (rest, "/"),
        };

        if authority.is_empty() {
            return Err(format!("Missing host in DoH URL '{}'", s));
        }
        if authority.contains('@') {
            return Err(format!("Credentials are not supported in DoH URL '{}'", s));
        }

        let (host, port) = split_host_port(authority)?;
        if host.is_empty() {
            return Err(format!("Missing host in DoH URL '{}'", s));
        }

        Ok(Self {
            url: s.into(),
            scheme,
            host: host.into(),
            port: port.unwrap_or_else(|| scheme.default_port()),
            path: path.into(),
        })
    }
}

impl fmt::Display for UpstreamEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.url)
    }
}
