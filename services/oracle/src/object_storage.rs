use crate::constants::{ORACLE_DEFAULT_DOMAIN, PATH_SEGMENT_ENCODE_SET};
use crate::Credential;
use bytes::Bytes;
use http::{HeaderMap, Method, Request, Response};
use log::debug;
use ocisign_core::{Error, Result, Signer};
use percent_encoding::utf8_percent_encode;
use std::time::Instant;

/// Percent-encode one path segment.
///
/// The segment is treated as opaque: `/` is encoded like any other reserved
/// character, so `objprefix/My File.exe` becomes `objprefix%2FMy%20File.exe`.
pub fn encode_path_segment(segment: &str) -> String {
    utf8_percent_encode(segment, &PATH_SEGMENT_ENCODE_SET).to_string()
}

/// Build the path of an object: `/n/{namespace}/b/{bucket}/o/{object}`.
pub fn object_path(namespace: &str, bucket: &str, object: &str) -> String {
    format!(
        "/n/{}/b/{}/o/{}",
        encode_path_segment(namespace),
        encode_path_segment(bucket),
        encode_path_segment(object)
    )
}

/// Client for the Oracle Cloud Object Storage API.
///
/// Every request is signed through the given [`Signer`] and sent with the
/// signer's context, so TLS trust, timeouts and verbosity come from the
/// `HttpSend` configured there.
///
/// ```no_run
/// use ocisign_core::{Context, Signer};
/// use ocisign_oracle::{DefaultCredentialProvider, ObjectStorageClient, RequestSigner};
///
/// # async fn example(ctx: Context) -> ocisign_core::Result<()> {
/// let signer = Signer::new(ctx, DefaultCredentialProvider::new(), RequestSigner::new());
/// let client = ObjectStorageClient::new(signer).with_region("us-phoenix-1");
///
/// let content = client.get_object("ns", "bucket", "objprefix/My File.exe").await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ObjectStorageClient {
    signer: Signer<Credential>,
    region: Option<String>,
    domain: String,
    endpoint: Option<String>,
}

impl ObjectStorageClient {
    /// Create a new client.
    ///
    /// The region is taken from the credential unless set explicitly.
    pub fn new(signer: Signer<Credential>) -> Self {
        Self {
            signer,
            region: None,
            domain: ORACLE_DEFAULT_DOMAIN.to_string(),
            endpoint: None,
        }
    }

    /// Set the region, `us-phoenix-1` for example.
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// Set the cloud domain, defaults to `oraclecloud.com`.
    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = domain.into();
        self
    }

    /// Send requests to this endpoint instead of `https://<host>`.
    ///
    /// The request is signed for the endpoint's own authority.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into().trim_end_matches('/').to_string());
        self
    }

    /// The object storage host, `objectstorage.<region>.<domain>`.
    pub async fn host(&self) -> Result<String> {
        let region = match &self.region {
            Some(region) => region.clone(),
            None => self
                .signer
                .credential()
                .await?
                .and_then(|cred| cred.region)
                .ok_or_else(|| Error::config_invalid("region is not configured"))?,
        };

        Ok(format!("objectstorage.{region}.{}", self.domain))
    }

    /// Send a signed request and return the response body.
    ///
    /// `path` must already be encoded and start with `/`, see
    /// [`object_path`]. Non-2xx
    /// responses are returned as [`ocisign_core::ErrorKind::HttpStatus`]
    /// errors carrying the status and body.
    pub async fn execute(&self, method: Method, path: &str) -> Result<Bytes> {
        let resp = self.send(method, path).await?;
        Ok(resp.into_body())
    }

    /// Download an object.
    pub async fn get_object(&self, namespace: &str, bucket: &str, object: &str) -> Result<Bytes> {
        self.execute(Method::GET, &object_path(namespace, bucket, object))
            .await
    }

    /// Fetch the metadata of an object without its content.
    pub async fn head_object(
        &self,
        namespace: &str,
        bucket: &str,
        object: &str,
    ) -> Result<HeaderMap> {
        let resp = self
            .send(Method::HEAD, &object_path(namespace, bucket, object))
            .await?;
        Ok(resp.into_parts().0.headers)
    }

    /// Fetch the object storage namespace of the tenancy.
    pub async fn get_namespace(&self) -> Result<String> {
        let body = self.execute(Method::GET, "/n/").await?;
        serde_json::from_slice::<String>(&body)
            .map_err(|e| Error::unexpected("failed to parse namespace response").with_source(e))
    }

    async fn send(&self, method: Method, path: &str) -> Result<Response<Bytes>> {
        if !path.starts_with('/') {
            return Err(Error::request_invalid(format!(
                "path must start with '/', got {path:?}"
            )));
        }

        let url = match &self.endpoint {
            Some(endpoint) => format!("{endpoint}{path}"),
            None => format!("https://{}{path}", self.host().await?),
        };

        let (mut parts, body) = Request::builder()
            .method(method)
            .uri(&url)
            .body(Bytes::new())?
            .into_parts();
        self.signer.sign(&mut parts).await?;

        debug!("sending {} {url}", parts.method);
        for name in parts.headers.keys() {
            debug!("> {name}");
        }

        let start = Instant::now();
        let resp = self
            .signer
            .context()
            .http_send(Request::from_parts(parts, body))
            .await?;
        debug!("received {} in {:?}", resp.status(), start.elapsed());

        if !resp.status().is_success() {
            let (parts, body) = resp.into_parts();
            return Err(Error::http_status(parts.status, body));
        }
        Ok(resp)
    }
}
