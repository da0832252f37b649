//! TLS client configuration for the DoH upstream, one per trust policy.
//!
//! - `StandardPki`: webpki roots, hostname verified against the certificate.
//! - `InsecureIpLiteral`: any certificate accepted. Used when the upstream is
//!   addressed by a bare IP that its certificate does not list.
//! - `PinnedPublicKey`: the leaf's SubjectPublicKeyInfo SHA-256 must match a
//!   configured pin; hostname not checked.
//!
//! In every mode the handshake signature is still verified against the
//! presented certificate's key.

use ferrous_doh_domain::{DomainError, PublicKeyPin, TrustPolicy};
use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::crypto::{verify_tls12_signature, verify_tls13_signature, CryptoProvider};
use rustls::pki_types::{CertificateDer, ServerName, UnixTime};
use rustls::{
    CertificateError, ClientConfig, DigitallySignedStruct, Error as TlsError, RootCertStore,
    SignatureScheme,
};
use sha2::{Digest, Sha256};
use std::sync::Arc;
use tracing::debug;
use x509_parser::prelude::{parse_x509_certificate, ASN1Time};

/// ALPN offer: HTTP/2 first, HTTP/1.1 as fallback.
const ALPN_PROTOCOLS: [&[u8]; 2] = [b"h2", b"http/1.1"];

pub fn build_client_config(policy: &TrustPolicy) -> Result<ClientConfig, DomainError> {
    let provider = Arc::new(rustls::crypto::ring::default_provider());

    let builder = ClientConfig::builder_with_provider(provider.clone())
        .with_safe_default_protocol_versions()
        .map_err(|e| DomainError::TlsConfig(e.to_string()))?;

    let mut config = match policy {
        TrustPolicy::StandardPki => {
            let mut root_store = RootCertStore::empty();
            root_store.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
            builder
                .with_root_certificates(root_store)
                .with_no_client_auth()
        }
        TrustPolicy::InsecureIpLiteral => builder
            .dangerous()
            .with_custom_certificate_verifier(Arc::new(AnyCertificate { provider }))
            .with_no_client_auth(),
        TrustPolicy::PinnedPublicKey { pins } => {
            if pins.is_empty() {
                return Err(DomainError::TlsConfig(
                    "pinned_public_key policy needs at least one pin".to_string(),
                ));
            }
            builder
                .dangerous()
                .with_custom_certificate_verifier(Arc::new(PinnedPublicKey {
                    pins: pins.clone(),
                    provider,
                }))
                .with_no_client_auth()
        }
    };

    config.alpn_protocols = ALPN_PROTOCOLS.iter().map(|p| p.to_vec()).collect();
    Ok(config)
}

/// SHA-256 of the certificate's DER-encoded SubjectPublicKeyInfo.
pub fn spki_sha256(cert_der: &[u8]) -> Result<[u8; 32], DomainError> {
    let (_, cert) = parse_x509_certificate(cert_der)
        .map_err(|e| DomainError::TlsConfig(format!("Unparseable certificate: {}", e)))?;
    Ok(Sha256::digest(cert.public_key().raw).into())
}

fn verify_tls12(
    provider: &CryptoProvider,
    message: &[u8],
    cert: &CertificateDer<'_>,
    dss: &DigitallySignedStruct,
) -> Result<HandshakeSignatureValid, TlsError> {
    verify_tls12_signature(message, cert, dss, &provider.signature_verification_algorithms)
}

fn verify_tls13(
    provider: &CryptoProvider,
    message: &[u8],
    cert: &CertificateDer<'_>,
    dss: &DigitallySignedStruct,
) -> Result<HandshakeSignatureValid, TlsError> {
    verify_tls13_signature(message, cert, dss, &provider.signature_verification_algorithms)
}

#[derive(Debug)]
struct AnyCertificate {
    provider: Arc<CryptoProvider>,
}

impl ServerCertVerifier for AnyCertificate {
    fn verify_server_cert(
        &self,
        _end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime,
    ) -> Result<ServerCertVerified, TlsError> {
        Ok(ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, TlsError> {
        verify_tls12(&self.provider, message, cert, dss)
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, TlsError> {
        verify_tls13(&self.provider, message, cert, dss)
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.provider
            .signature_verification_algorithms
            .supported_schemes()
    }
}

#[derive(Debug)]
struct PinnedPublicKey {
    pins: Vec<PublicKeyPin>,
    provider: Arc<CryptoProvider>,
}

impl ServerCertVerifier for PinnedPublicKey {
    fn verify_server_cert(
        &self,
        end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        now: UnixTime,
    ) -> Result<ServerCertVerified, TlsError> {
        let (_, cert) = parse_x509_certificate(end_entity.as_ref())
            .map_err(|_| TlsError::InvalidCertificate(CertificateError::BadEncoding))?;

        let now = ASN1Time::from_timestamp(now.as_secs() as i64)
            .map_err(|_| TlsError::InvalidCertificate(CertificateError::BadEncoding))?;
        if !cert.validity().is_valid_at(now) {
            return Err(TlsError::InvalidCertificate(CertificateError::Expired));
        }

        let digest = Sha256::digest(cert.public_key().raw);
        if self.pins.iter().any(|pin| pin.matches(&digest)) {
            Ok(ServerCertVerified::assertion())
        } else {
            debug!(
                presented = %PublicKeyPin::from_digest(digest.into()),
                "Upstream public key does not match any pin"
            );
            Err(TlsError::InvalidCertificate(
                CertificateError::ApplicationVerificationFailure,
            ))
        }
    }

    fn verify_tls12_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, TlsError> {
        verify_tls12(&self.provider, message, cert, dss)
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, TlsError> {
        verify_tls13(&self.provider, message, cert, dss)
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.provider
            .signature_verification_algorithms
            .supported_schemes()
    }
}
