// HTTPS listener support
use rustls_pki_types::{pem::PemObject, CertificateDer, PrivateKeyDer};
use std::path::Path;
use std::sync::Arc;
use tokio_rustls::{rustls, TlsAcceptor};

use crate::error::{AppError, AppResult};

/// Build a TLS acceptor from PEM certificate chain and private key files
pub fn load_acceptor(cert_file: &Path, key_file: &Path) -> AppResult<TlsAcceptor> {
    let certs = CertificateDer::pem_file_iter(cert_file)
        .and_then(|iter| iter.collect::<Result<Vec<_>, _>>())
        .map_err(|e| AppError::Tls(format!("Failed to read certificate {:?}: {}", cert_file, e)))?;
    if certs.is_empty() {
        return Err(AppError::Tls(format!("No certificate found in {:?}", cert_file)));
    }

    let key = PrivateKeyDer::from_pem_file(key_file)
        .map_err(|e| AppError::Tls(format!("Failed to read private key {:?}: {}", key_file, e)))?;

    let provider = Arc::new(rustls::crypto::aws_lc_rs::default_provider());
    let mut config = rustls::ServerConfig::builder_with_provider(provider)
        .with_safe_default_protocol_versions()
        .map_err(|e| AppError::Tls(e.to_string()))?
        .with_no_client_auth()
        .with_single_cert(certs, key)
        .map_err(|e| AppError::Tls(format!("Invalid certificate/key pair: {}", e)))?;

    // The connection loop only speaks HTTP/1.1
    config.alpn_protocols = vec![b"http/1.1".to_vec()];

    Ok(TlsAcceptor::from(Arc::new(config)))
}
