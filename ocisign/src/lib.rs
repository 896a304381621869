//! Signing Oracle Cloud Object Storage requests without effort.
//!
//! `ocisign` bundles [`ocisign_core`], the Oracle Cloud signer and the default
//! context implementations into one crate.
//!
//! ## Quick Start
//!
//! ```no_run
//! # #[tokio::main]
//! # async fn main() -> ocisign::Result<()> {
//! let client = ocisign::oracle::default_client();
//!
//! let namespace = client.get_namespace().await?;
//! let content = client
//!     .get_object(&namespace, "bucket", "objprefix/My File.exe")
//!     .await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Features
//!
//! - `default-context` (enabled by default): [`default_context`] and the
//!   `default_*` helpers, built on `tokio` and `reqwest`.

pub use ocisign_core::*;

#[cfg(feature = "default-context")]
mod context;
#[cfg(feature = "default-context")]
pub use context::{default_context, http_context};
#[cfg(feature = "default-context")]
pub use ocisign_http_send_reqwest::{HttpOptions, TlsTrust};

pub mod oracle;
