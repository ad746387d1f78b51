// TLS module
// Loads PEM certificate material and builds the acceptor for the secure listener

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use rustls::pki_types::{CertificateDer, PrivateKeyDer};
use rustls::ServerConfig;
use tokio_rustls::TlsAcceptor;

use crate::error::ServerError;

/// Certificate chain and private key for `serve_secure`
pub struct TlsMaterial {
    cert_chain: Vec<CertificateDer<'static>>,
    key: PrivateKeyDer<'static>,
}

impl TlsMaterial {
    /// Read a PEM certificate chain and a PEM private key from disk
    pub fn from_pem_files(cert_path: &Path, key_path: &Path) -> Result<Self, ServerError> {
        let cert_pem = std::fs::read(cert_path).map_err(|e| {
            ServerError::Tls(format!("cannot read certificate '{}': {e}", cert_path.display()))
        })?;
        let key_pem = std::fs::read(key_path).map_err(|e| {
            ServerError::Tls(format!("cannot read private key '{}': {e}", key_path.display()))
        })?;
        Self::from_pem(&cert_pem, &key_pem)
    }

    /// Parse in-memory PEM data
    ///
    /// The key may be PKCS#1, PKCS#8 or SEC1; the first key found is used.
    pub fn from_pem(cert_pem: &[u8], key_pem: &[u8]) -> Result<Self, ServerError> {
        let cert_chain = rustls_pemfile::certs(&mut &cert_pem[..])
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| ServerError::Tls(format!("invalid certificate PEM: {e}")))?;
        if cert_chain.is_empty() {
            return Err(ServerError::Tls("no certificates found in PEM data".to_string()));
        }

        let key = rustls_pemfile::private_key(&mut &key_pem[..])
            .map_err(|e| ServerError::Tls(format!("invalid private key PEM: {e}")))?
            .ok_or_else(|| ServerError::Tls("no private key found in PEM data".to_string()))?;

        Ok(Self { cert_chain, key })
    }

    /// Build a rustls server config (ring provider, HTTP/1.1 ALPN)
    pub fn server_config(self) -> Result<Arc<ServerConfig>, ServerError> {
        let provider = Arc::new(rustls::crypto::ring::default_provider());
        let mut config = ServerConfig::builder_with_provider(provider)
            .with_safe_default_protocol_versions()?
            .with_no_client_auth()
            .with_single_cert(self.cert_chain, self.key)?;
        config.alpn_protocols = vec![b"http/1.1".to_vec()];
        Ok(Arc::new(config))
    }

    pub fn acceptor(self) -> Result<TlsAcceptor, ServerError> {
        Ok(TlsAcceptor::from(self.server_config()?))
    }
}

impl fmt::Debug for TlsMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TlsMaterial")
            .field("certs", &self.cert_chain.len())
            .field("key", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub const TEST_CERT: &[u8] = include_bytes!("../../tests/fixtures/localhost.crt");
    pub const TEST_KEY: &[u8] = include_bytes!("../../tests/fixtures/localhost.key");

    #[test]
    fn test_load_pem() {
        let material = TlsMaterial::from_pem(TEST_CERT, TEST_KEY).unwrap();
        assert_eq!(material.cert_chain.len(), 1);
        assert!(format!("{material:?}").contains("<redacted>"));
        assert!(material.acceptor().is_ok());
    }

    #[test]
    fn test_load_pem_files() {
        let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures");
        let material = TlsMaterial::from_pem_files(
            &fixtures.join("localhost.crt"),
            &fixtures.join("localhost.key"),
        )
        .unwrap();
        let config = material.server_config().unwrap();
        assert_eq!(config.alpn_protocols, vec![b"http/1.1".to_vec()]);
    }

    #[test]
    fn test_missing_files() {
        let err = TlsMaterial::from_pem_files(
            Path::new("/nonexistent/cert.pem"),
            Path::new("/nonexistent/key.pem"),
        )
        .unwrap_err();
        assert!(matches!(err, ServerError::Tls(msg) if msg.contains("cannot read certificate")));
    }

    #[test]
    fn test_garbage_pem() {
        let err = TlsMaterial::from_pem(b"not a certificate", TEST_KEY).unwrap_err();
        assert!(matches!(err, ServerError::Tls(msg) if msg.contains("no certificates")));

        let err = TlsMaterial::from_pem(TEST_CERT, b"not a key").unwrap_err();
        assert!(matches!(err, ServerError::Tls(msg) if msg.contains("no private key")));
    }

    #[test]
    fn test_key_in_cert_slot() {
        // A key-only PEM carries no certificate sections
        let err = TlsMaterial::from_pem(TEST_KEY, TEST_KEY).unwrap_err();
        assert!(matches!(err, ServerError::Tls(_)));
    }
}
