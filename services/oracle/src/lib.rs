//! Oracle Cloud Infrastructure request signing.
//!
//! This crate signs requests with the OCI HTTP signature scheme (RSA-SHA256,
//! PKCS#1 v1.5) and ships a small Object Storage client built on top of it.
//!
//! ## Quick Start
//!
//! ```no_run
//! use ocisign_core::{Context, OsEnv, Result, Signer};
//! use ocisign_file_read_tokio::TokioFileRead;
//! use ocisign_http_send_reqwest::ReqwestHttpSend;
//! use ocisign_oracle::{DefaultCredentialProvider, ObjectStorageClient, RequestSigner};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let ctx = Context::new()
//!         .with_file_read(TokioFileRead)
//!         .with_http_send(ReqwestHttpSend::default())
//!         .with_env(OsEnv);
//!
//!     let signer = Signer::new(ctx, DefaultCredentialProvider::new(), RequestSigner::new());
//!     let client = ObjectStorageClient::new(signer);
//!
//!     let namespace = client.get_namespace().await?;
//!     let content = client.get_object(&namespace, "bucket", "objprefix/My File.exe").await?;
//!     println!("downloaded {} bytes", content.len());
//!     Ok(())
//! }
//! ```
//!
//! ## Credential Sources
//!
//! [`DefaultCredentialProvider`] tries, in order:
//!
//! 1. Environment variables: `OCI_USER`, `OCI_TENANCY`, `OCI_FINGERPRINT`,
//!    `OCI_REGION`, `OCI_KEY` or `OCI_KEY_FILE`, `OCI_PASS_PHRASE`
//! 2. The config file `~/.oci/config` (`OCI_CONFIG_FILE`), profile `DEFAULT`
//!    (`OCI_PROFILE`)
//!
//! Use [`StaticCredentialProvider`] to pass a credential directly.

mod constants;

mod backend;
pub use backend::{RsaSignatureBackend, SignatureBackend};

mod config;
pub use config::Config;

mod credential;
pub use credential::Credential;

mod key;
pub use key::{parse_private_key, PrivateKeyRef};

mod sign_request;
pub use sign_request::{RequestSigner, SignedHeaders, StringToSign};

mod object_storage;
pub use object_storage::{encode_path_segment, object_path, ObjectStorageClient};

mod provide_credential;
pub use provide_credential::*;

#[cfg(test)]
mod testing;
