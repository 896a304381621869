//! Reqwest-based HTTP sending implementation for ocisign.
//!
//! `ReqwestHttpSend` implements the `HttpSend` trait from `ocisign_core` on
//! top of a [`reqwest::Client`]. Besides wrapping an existing client, it can
//! build one from [`HttpOptions`], which covers the TLS trust, timeout and
//! verbose settings an object storage client needs.
//!
//! ## Example
//!
//! ```no_run
//! use std::time::Duration;
//!
//! use ocisign_core::Context;
//! use ocisign_http_send_reqwest::{HttpOptions, ReqwestHttpSend, TlsTrust};
//!
//! # fn main() -> ocisign_core::Result<()> {
//! let http = ReqwestHttpSend::from_options(
//!     HttpOptions::default()
//!         .with_tls(TlsTrust::CaBundle("/etc/ssl/cacert.pem".into()))
//!         .with_timeout(Duration::from_secs(30)),
//! )?;
//! let ctx = Context::new().with_http_send(http);
//! # Ok(())
//! # }
//! ```

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use bytes::Bytes;
use http_body_util::BodyExt;
use log::{debug, warn};
use ocisign_core::{Error, HttpSend, Result};
use reqwest::{Certificate, Client, Request};

/// Where the server certificate is verified against.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsTrust {
    /// Use the platform trust store.
    #[default]
    Platform,
    /// Trust the certificates in the given PEM bundle, in addition to the
    /// platform trust store.
    CaBundle(PathBuf),
    /// Disable certificate verification entirely.
    ///
    /// Any certificate is accepted, including self-signed and expired ones.
    /// This is unsafe for production use and only meant for local testing.
    Insecure,
}

/// Options used to build the underlying [`reqwest::Client`].
#[derive(Debug, Clone, Default)]
pub struct HttpOptions {
    /// TLS trust configuration.
    pub tls: TlsTrust,
    /// Timeout for the whole request, from connect until the body is read.
    pub timeout: Option<Duration>,
    /// Emit transport diagnostics (connection trace, timing, response headers)
    /// through the `log` facade.
    pub verbose: bool,
}

impl HttpOptions {
    /// Set the TLS trust configuration.
    pub fn with_tls(mut self, tls: TlsTrust) -> Self {
        self.tls = tls;
        self
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Enable or disable verbose transport diagnostics.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
}

/// Reqwest-based implementation of the `HttpSend` trait.
#[derive(Debug, Default, Clone)]
pub struct ReqwestHttpSend {
    client: Client,
    verbose: bool,
}

impl ReqwestHttpSend {
    /// Create a new ReqwestHttpSend with a reqwest::Client.
    pub fn new(client: Client) -> Self {
        Self {
            client,
            verbose: false,
        }
    }

    /// Build a new ReqwestHttpSend from options.
    ///
    /// Returns [`ocisign_core::ErrorKind::ConfigInvalid`] if the CA bundle
    /// does not exist or holds no certificate. Nothing is sent over the
    /// network here.
    pub fn from_options(opts: HttpOptions) -> Result<Self> {
        let mut builder = Client::builder().connection_verbose(opts.verbose);

        if let Some(timeout) = opts.timeout {
            builder = builder.timeout(timeout);
        }

        match &opts.tls {
            TlsTrust::Platform => {}
            TlsTrust::CaBundle(path) => {
                for cert in load_ca_bundle(path)? {
                    builder = builder.add_root_certificate(cert);
                }
            }
            TlsTrust::Insecure => {
                warn!("tls certificate verification is disabled, do not use in production");
                builder = builder.danger_accept_invalid_certs(true);
            }
        }

        let client = builder.build().map_err(|e| {
            Error::config_invalid("failed to build http client").with_source(e)
        })?;

        Ok(Self {
            client,
            verbose: opts.verbose,
        })
    }
}

fn load_ca_bundle(path: &Path) -> Result<Vec<Certificate>> {
    if !path.exists() {
        return Err(Error::config_invalid(format!(
            "CA bundle {} does not exist",
            path.display()
        )));
    }

    let content = std::fs::read(path).map_err(|e| {
        Error::config_invalid(format!("failed to read CA bundle {}", path.display()))
            .with_source(e)
    })?;
    let certs = Certificate::from_pem_bundle(&content).map_err(|e| {
        Error::config_invalid(format!("invalid CA bundle {}", path.display())).with_source(e)
    })?;
    if certs.is_empty() {
        return Err(Error::config_invalid(format!(
            "CA bundle {} contains no certificate",
            path.display()
        )));
    }

    debug!("loaded {} certificates from {}", certs.len(), path.display());
    Ok(certs)
}

#[async_trait]
impl HttpSend for ReqwestHttpSend {
    async fn http_send(&self, req: http::Request<Bytes>) -> Result<http::Response<Bytes>> {
        let method = req.method().clone();
        let uri = req.uri().clone();
        let req = Request::try_from(req)
            .map_err(|e| Error::request_invalid("invalid http request").with_source(e))?;

        let start = Instant::now();
        let resp: http::Response<_> = self
            .client
            .execute(req)
            .await
            .map_err(|e| transport_error(&method, &uri, e))?
            .into();

        let (parts, body) = resp.into_parts();
        let bs = BodyExt::collect(body)
            .await
            .map(|buf| buf.to_bytes())
            .map_err(|e| transport_error(&method, &uri, e))?;

        if self.verbose {
            debug!(
                "{method} {uri} -> {} in {:?}, {} bytes",
                parts.status,
                start.elapsed(),
                bs.len()
            );
            for (name, value) in &parts.headers {
                debug!("< {name}: {value:?}");
            }
        }

        Ok(http::Response::from_parts(parts, bs))
    }
}

fn transport_error(method: &http::Method, uri: &http::Uri, err: reqwest::Error) -> Error {
    let reason = if err.is_timeout() {
        "timed out"
    } else if err.is_connect() {
        "failed to connect"
    } else {
        "failed"
    };
    Error::transport_failed(format!("{method} {uri} {reason}")).with_source(err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ocisign_core::ErrorKind;
    use std::io::Write;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    #[test]
    fn test_missing_ca_bundle_is_config_error() {
        let err = ReqwestHttpSend::from_options(
            HttpOptions::default().with_tls(TlsTrust::CaBundle("/not/exist/cacert.pem".into())),
        )
        .expect_err("missing CA bundle must fail");
        assert_eq!(err.kind(), ErrorKind::ConfigInvalid);
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn test_garbage_ca_bundle_is_config_error() -> Result<()> {
        let mut file = tempfile::NamedTempFile::new()?;
        file.write_all(b"this is not a certificate")?;

        let err = ReqwestHttpSend::from_options(
            HttpOptions::default().with_tls(TlsTrust::CaBundle(file.path().to_path_buf())),
        )
        .expect_err("garbage CA bundle must fail");
        assert_eq!(err.kind(), ErrorKind::ConfigInvalid);
        Ok(())
    }

    #[test]
    fn test_insecure_client_builds() -> Result<()> {
        ReqwestHttpSend::from_options(
            HttpOptions::default()
                .with_tls(TlsTrust::Insecure)
                .with_timeout(Duration::from_secs(5))
                .with_verbose(true),
        )?;
        Ok(())
    }

    #[tokio::test]
    async fn test_connection_refused_is_transport_error() -> Result<()> {
        init_logger();

        let addr = {
            let listener = TcpListener::bind("127.0.0.1:0").await?;
            listener.local_addr()?
        };

        let http = ReqwestHttpSend::from_options(
            HttpOptions::default().with_timeout(Duration::from_secs(5)),
        )?;
        let req = http::Request::get(format!("http://{addr}/n/"))
            .body(Bytes::new())
            .expect("request must be valid");

        let err = http
            .http_send(req)
            .await
            .expect_err("closed port must fail");
        assert_eq!(err.kind(), ErrorKind::TransportFailed);
        assert!(err.status().is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_error_status_is_returned_as_response() -> Result<()> {
        init_logger();

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.expect("accept must succeed");
            let mut buf = [0u8; 4096];
            let _ = stream.read(&mut buf).await;
            let _ = stream
                .write_all(
                    b"HTTP/1.1 404 Not Found\r\ncontent-length: 7\r\nconnection: close\r\n\r\nmissing",
                )
                .await;
        });

        let http = ReqwestHttpSend::from_options(HttpOptions::default().with_verbose(true))?;
        let req = http::Request::get(format!("http://{addr}/n/ns/b/bucket/o/file.txt"))
            .body(Bytes::new())
            .expect("request must be valid");

        let resp = http.http_send(req).await?;
        assert_eq!(resp.status(), http::StatusCode::NOT_FOUND);
        assert_eq!(resp.body().as_ref(), b"missing");
        Ok(())
    }
}
