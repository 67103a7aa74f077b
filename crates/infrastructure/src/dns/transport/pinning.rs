//! SPKI pinning on top of regular WebPKI chain validation.
//!
//! A pin is the SHA-256 of the certificate's DER SubjectPublicKeyInfo. The
//! chain must validate against the bundled roots *and* some certificate in
//! it must match a pin.

use dnstrap_domain::{CertPin, DomainError};
use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::client::WebPkiServerVerifier;
use rustls::crypto::CryptoProvider;
use rustls::pki_types::{CertificateDer, ServerName, UnixTime};
use rustls::{CertificateError, DigitallySignedStruct, RootCertStore, SignatureScheme};
use sha2::{Digest, Sha256};
use std::sync::Arc;

pub fn crypto_provider() -> Arc<CryptoProvider> {
    Arc::new(rustls::crypto::aws_lc_rs::default_provider())
}

fn webpki_roots() -> Arc<RootCertStore> {
    let mut root_store = RootCertStore::empty();
    root_store.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
    Arc::new(root_store)
}

fn webpki_verifier(provider: Arc<CryptoProvider>) -> Result<Arc<WebPkiServerVerifier>, DomainError> {
    WebPkiServerVerifier::builder_with_provider(webpki_roots(), provider)
        .build()
        .map_err(|e| DomainError::ConfigError(format!("TLS verifier: {}", e)))
}

/// SHA-256 over the certificate's SubjectPublicKeyInfo.
pub fn spki_sha256(cert: &[u8]) -> Option<[u8; 32]> {
    let (_, parsed) = x509_parser::parse_x509_certificate(cert).ok()?;
    Some(Sha256::digest(parsed.public_key().raw).into())
}

#[derive(Debug)]
pub struct PinnedCertVerifier {
    inner: Arc<WebPkiServerVerifier>,
    pins: Vec<CertPin>,
}

impl PinnedCertVerifier {
    pub fn new(pins: Vec<CertPin>, provider: Arc<CryptoProvider>) -> Result<Self, DomainError> {
        Ok(Self {
            inner: webpki_verifier(provider)?,
            pins,
        })
    }

    pub fn matches_any<'a>(&self, certs: impl IntoIterator<Item = &'a CertificateDer<'a>>) -> bool {
        certs
            .into_iter()
            .filter_map(|c| spki_sha256(c.as_ref()))
            .any(|digest| self.pins.iter().any(|pin| pin.matches(&digest)))
    }

    /// Pin step of [`ServerCertVerifier::verify_server_cert`], run once the
    /// chain itself has validated.
    fn check_pins(
        &self,
        end_entity: &CertificateDer<'_>,
        intermediates: &[CertificateDer<'_>],
    ) -> Result<ServerCertVerified, rustls::Error> {
        if self.matches_any(std::iter::once(end_entity).chain(intermediates)) {
            Ok(ServerCertVerified::assertion())
        } else {
            Err(rustls::Error::InvalidCertificate(
                CertificateError::ApplicationVerificationFailure,
            ))
        }
    }
}

impl ServerCertVerifier for PinnedCertVerifier {
    fn verify_server_cert(
        &self,
        end_entity: &CertificateDer<'_>,
        intermediates: &[CertificateDer<'_>],
        server_name: &ServerName<'_>,
        ocsp_response: &[u8],
        now: UnixTime,
    ) -> Result<ServerCertVerified, rustls::Error> {
        self.inner
            .verify_server_cert(end_entity, intermediates, server_name, ocsp_response, now)?;
        self.check_pins(end_entity, intermediates)
    }

    fn verify_tls12_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        self.inner.verify_tls12_signature(message, cert, dss)
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        self.inner.verify_tls13_signature(message, cert, dss)
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.inner.supported_verify_schemes()
    }
}

/// Client config that enforces `pins`.
pub fn pinned_client_config(pins: Vec<CertPin>) -> Result<rustls::ClientConfig, DomainError> {
    let provider = crypto_provider();
    let verifier = PinnedCertVerifier::new(pins, provider.clone())?;
    let config = rustls::ClientConfig::builder_with_provider(provider)
        .with_safe_default_protocol_versions()
        .map_err(|e| DomainError::ConfigError(format!("TLS versions: {}", e)))?
        .dangerous()
        .with_custom_certificate_verifier(Arc::new(verifier))
        .with_no_client_auth();
    Ok(config)
}

/// Client config that only checks the CA chain. Last-resort fallback.
pub fn unpinned_client_config() -> Result<rustls::ClientConfig, DomainError> {
    let config = rustls::ClientConfig::builder_with_provider(crypto_provider())
        .with_safe_default_protocol_versions()
        .map_err(|e| DomainError::ConfigError(format!("TLS versions: {}", e)))?
        .with_root_certificates(webpki_roots())
        .with_no_client_auth();
    Ok(config)
}

/// True if the error chain carries the rustls rejection raised on a pin
/// mismatch.
pub fn is_pin_rejection(error: &(dyn std::error::Error + 'static)) -> bool {
    let mut current = Some(error);
    while let Some(err) = current {
        if let Some(tls) = err.downcast_ref::<rustls::Error>() {
            return is_pin_error(tls);
        }
        if let Some(io) = err.downcast_ref::<std::io::Error>() {
            if let Some(tls) = io.get_ref().and_then(|e| e.downcast_ref::<rustls::Error>()) {
                return is_pin_error(tls);
            }
        }
        current = err.source();
    }
    false
}

fn is_pin_error(error: &rustls::Error) -> bool {
    matches!(
        error,
        rustls::Error::InvalidCertificate(CertificateError::ApplicationVerificationFailure)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_garbage_certificate_has_no_digest() {
        assert!(spki_sha256(&[0x30, 0x03, 0x02, 0x01]).is_none());
    }

    /// Self-signed P-256 certificate for `dns.pinning.test`.
    const LEAF_DER: &[u8] = include_bytes!("testdata/leaf.der");
    const LEAF_PIN: &str = "sha256/swHGQL+sgHl2CgKK7w7463FPToT1ZOo6bvcbAgDmsJE=";

    #[test]
    fn test_spki_digest_of_real_certificate() {
        let pin: CertPin = LEAF_PIN.parse().unwrap();
        let digest = spki_sha256(LEAF_DER).unwrap();
        assert!(pin.matches(&digest));
        assert_eq!(pin, CertPin::from_digest(digest));
    }

    #[test]
    fn test_verifier_matches_only_configured_pins() {
        let leaf = CertificateDer::from(LEAF_DER);

        let pinned = PinnedCertVerifier::new(vec![LEAF_PIN.parse().unwrap()], crypto_provider()).unwrap();
        assert!(pinned.matches_any([&leaf]));
        assert!(pinned.check_pins(&leaf, &[]).is_ok());

        let other = PinnedCertVerifier::new(vec![CertPin::from_digest([9u8; 32])], crypto_provider()).unwrap();
        assert!(!other.matches_any([&leaf]));
        let rejected = other.check_pins(&leaf, &[]).unwrap_err();
        assert!(is_pin_rejection(&rejected));
    }

    #[test]
    fn test_intermediate_can_carry_the_pin() {
        let leaf = CertificateDer::from(LEAF_DER);
        let garbage = CertificateDer::from(&[0x30u8, 0x03, 0x02, 0x01][..]);
        let verifier = PinnedCertVerifier::new(vec![LEAF_PIN.parse().unwrap()], crypto_provider()).unwrap();

        assert!(verifier.check_pins(&garbage, &[leaf]).is_ok());
        assert!(verifier.check_pins(&garbage, &[]).is_err());
    }

    #[test]
    fn test_configs_build() {
        let pin = CertPin::from_digest([7u8; 32]);
        assert!(pinned_client_config(vec![pin]).is_ok());
        assert!(unpinned_client_config().is_ok());
    }

    #[test]
    fn test_pin_error_detected_through_io_error() {
        let tls = rustls::Error::InvalidCertificate(CertificateError::ApplicationVerificationFailure);
        let io = std::io::Error::new(std::io::ErrorKind::InvalidData, tls);
        assert!(is_pin_rejection(&io));

        let other = std::io::Error::new(std::io::ErrorKind::InvalidData, rustls::Error::DecryptError);
        assert!(!is_pin_rejection(&other));
    }
}
