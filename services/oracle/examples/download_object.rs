//! Download one object, logging how the credential got resolved.
//!
//! ```shell
//! RUST_LOG=debug cargo run --example download_object -- <bucket> <object> [ca-bundle]
//! ```
//!
//! Pass `insecure` as the CA bundle to skip certificate verification.

use async_trait::async_trait;
use log::{debug, info};
use ocisign_core::{Context, Error, OsEnv, ProvideCredential, ProvideCredentialChain, Result, Signer};
use ocisign_file_read_tokio::TokioFileRead;
use ocisign_http_send_reqwest::{HttpOptions, ReqwestHttpSend, TlsTrust};
use ocisign_oracle::{
    ConfigFileCredentialProvider, Credential, EnvCredentialProvider, ObjectStorageClient,
    RequestSigner,
};
use std::time::Duration;

/// Wrapper that logs when credentials are loaded
#[derive(Debug)]
struct LoggingProvider<P> {
    name: &'static str,
    inner: P,
}

#[async_trait]
impl<P> ProvideCredential for LoggingProvider<P>
where
    P: ProvideCredential<Credential = Credential>,
{
    type Credential = Credential;

    async fn provide_credential(&self, ctx: &Context) -> Result<Option<Self::Credential>> {
        info!("attempting to load credential from: {}", self.name);

        let cred = self.inner.provide_credential(ctx).await?;
        match &cred {
            Some(cred) => {
                info!("loaded credential from: {}", self.name);
                debug!("credential: {cred:?}");
            }
            None => info!("no credential found in: {}", self.name),
        }
        Ok(cred)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let (Some(bucket), Some(object)) = (args.next(), args.next()) else {
        return Err(Error::config_invalid(
            "usage: download_object <bucket> <object> [ca-bundle|insecure]",
        ));
    };
    let tls = match args.next().as_deref() {
        None => TlsTrust::Platform,
        Some("insecure") => TlsTrust::Insecure,
        Some(path) => TlsTrust::CaBundle(path.into()),
    };

    let http = ReqwestHttpSend::from_options(
        HttpOptions::default()
            .with_tls(tls)
            .with_timeout(Duration::from_secs(60))
            .with_verbose(log::log_enabled!(log::Level::Trace)),
    )?;
    let ctx = Context::new()
        .with_file_read(TokioFileRead)
        .with_http_send(http)
        .with_env(OsEnv);

    let chain = ProvideCredentialChain::new()
        .push(LoggingProvider {
            name: "env",
            inner: EnvCredentialProvider::new(),
        })
        .push(LoggingProvider {
            name: "config file",
            inner: ConfigFileCredentialProvider::new(),
        });

    let client = ObjectStorageClient::new(Signer::new(ctx, chain, RequestSigner::new()));
    let namespace = client.get_namespace().await?;
    info!("using namespace {namespace}");

    let content = client.get_object(&namespace, &bucket, &object).await?;
    println!("downloaded {} bytes from {bucket}/{object}", content.len());
    Ok(())
}
