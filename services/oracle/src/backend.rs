use crate::key::parse_private_key;
use ocisign_core::{Error, Result};
use rsa::pkcs1v15::SigningKey;
use rsa::sha2::Sha256;
use rsa::signature::{SignatureEncoding, Signer};
use std::fmt::Debug;

/// SignatureBackend produces RSA-SHA256 PKCS#1 v1.5 signatures.
///
/// Implementations must produce the exact bytes a standard RSA-SHA256
/// PKCS#1 v1.5 signer would for the same key and data.
pub trait SignatureBackend: Debug + Send + Sync + 'static {
    /// Sign `data` with the PEM encoded private key.
    fn sign(&self, data: &[u8], key_pem: &str, pass_phrase: Option<&str>) -> Result<Vec<u8>>;
}

/// SignatureBackend built on the RustCrypto `rsa` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct RsaSignatureBackend;

impl SignatureBackend for RsaSignatureBackend {
    fn sign(&self, data: &[u8], key_pem: &str, pass_phrase: Option<&str>) -> Result<Vec<u8>> {
        if data.is_empty() {
            return Err(Error::crypto_failed("cannot sign empty data"));
        }

        let key = parse_private_key(key_pem, pass_phrase)?;
        let signing_key = SigningKey::<Sha256>::new(key);
        let signature = signing_key
            .try_sign(data)
            .map_err(|e| Error::crypto_failed("failed to sign data").with_source(e))?;

        Ok(signature.to_vec())
    }
}
