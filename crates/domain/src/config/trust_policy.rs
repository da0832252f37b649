use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const PIN_PREFIX: &str = "sha256/";

/// SHA-256 digest of a certificate's DER-encoded SubjectPublicKeyInfo
/// (the HPKP `pin-sha256` value).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(try_from = "String", into = "String")]
pub struct PublicKeyPin([u8; 32]);

impl PublicKeyPin {
    pub fn from_digest(digest: [u8; 32]) -> Self {
        Self(digest)
    }

    pub fn digest(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn matches(&self, digest: &[u8]) -> bool {
        self.0.as_slice() == digest
    }
}

impl FromStr for PublicKeyPin {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let encoded = s.trim();
        let encoded = encoded.strip_prefix(PIN_PREFIX).unwrap_or(encoded);
        let bytes = STANDARD
            .decode(encoded)
            .map_err(|e| format!("Invalid public key pin '{}': {}", s, e))?;
        let digest: [u8; 32] = bytes.try_into().map_err(|b: Vec<u8>| {
            format!(
                "Invalid public key pin '{}': expected 32-byte SHA-256 digest, got {} bytes",
                s,
                b.len()
            )
        })?;
        Ok(Self(digest))
    }
}

impl TryFrom<String> for PublicKeyPin {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PublicKeyPin> for String {
    fn from(pin: PublicKeyPin) -> Self {
        pin.to_string()
    }
}

impl fmt::Display for PublicKeyPin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", PIN_PREFIX, STANDARD.encode(self.0))
    }
}

impl fmt::Debug for PublicKeyPin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKeyPin({})", self)
    }
}

/// How the upstream TLS certificate is trusted.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum TrustPolicy {
    /// Web PKI roots with hostname verification.
    StandardPki,

    /// Any certificate is accepted. Meant for upstreams addressed by a bare IP
    /// that is not listed in their certificate.
    #[default]
    InsecureIpLiteral,

    /// Leaf certificate must carry one of the listed public keys. The hostname
    /// is not checked.
    PinnedPublicKey { pins: Vec<PublicKeyPin> },
}

impl TrustPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::StandardPki => "standard_pki",
            Self::InsecureIpLiteral => "insecure_ip_literal",
            Self::PinnedPublicKey { .. } => "pinned_public_key",
        }
    }

    pub fn verifies_hostname(&self) -> bool {
        matches!(self, Self::StandardPki)
    }
}
