//! Oracle Cloud service support with convenience APIs
//!
//! This module provides Oracle Cloud signing functionality along with convenience
//! functions for common use cases.

// Re-export all Oracle Cloud signing types
pub use ocisign_oracle::*;

#[cfg(feature = "default-context")]
use crate::{default_context, http_context, HttpOptions, Result, Signer};

/// Default Oracle Cloud Signer type with commonly used components
#[cfg(feature = "default-context")]
pub type DefaultSigner = Signer<Credential>;

/// Create a default Oracle Cloud signer with standard configuration
///
/// This function creates a signer with:
/// - Default context (with Tokio file reader, reqwest HTTP client, OS environment)
/// - Default credential provider (environment, then `~/.oci/config`)
/// - Request signer for Oracle Cloud
///
/// # Example
///
/// ```no_run
/// # #[tokio::main]
/// # async fn main() -> ocisign::Result<()> {
/// let signer = ocisign::oracle::default_signer();
///
/// let mut req = http::Request::builder()
///     .method("GET")
///     .uri("https://objectstorage.us-phoenix-1.oraclecloud.com/n/namespace/b/bucket/o/object")
///     .body(())
///     .unwrap()
///     .into_parts()
///     .0;
///
/// signer.sign(&mut req).await?;
/// # Ok(())
/// # }
/// ```
#[cfg(feature = "default-context")]
pub fn default_signer() -> DefaultSigner {
    let ctx = default_context();
    let provider = DefaultCredentialProvider::new();
    let signer = RequestSigner::new();
    Signer::new(ctx, provider, signer)
}

/// Create an Object Storage client with the default signer.
///
/// The region comes from the loaded credential.
#[cfg(feature = "default-context")]
pub fn default_client() -> ObjectStorageClient {
    ObjectStorageClient::new(default_signer())
}

/// Create an Object Storage client whose HTTP client is built from `opts`.
///
/// # Example
///
/// ```no_run
/// use std::time::Duration;
///
/// use ocisign::{HttpOptions, TlsTrust};
///
/// # fn main() -> ocisign::Result<()> {
/// let client = ocisign::oracle::client_with_options(
///     HttpOptions::default()
///         .with_tls(TlsTrust::CaBundle("/etc/ssl/cacert.pem".into()))
///         .with_timeout(Duration::from_secs(30)),
/// )?
/// .with_region("us-phoenix-1");
/// # Ok(())
/// # }
/// ```
#[cfg(feature = "default-context")]
pub fn client_with_options(opts: HttpOptions) -> Result<ObjectStorageClient> {
    let ctx = http_context(opts)?;
    let signer = Signer::new(ctx, DefaultCredentialProvider::new(), RequestSigner::new());
    Ok(ObjectStorageClient::new(signer))
}
