//! Shared fixtures for unit tests.

use crate::key::PrivateKeyRef;
use crate::Credential;
use async_trait::async_trait;
use bytes::Bytes;
use http::{HeaderName, HeaderValue, StatusCode};
use ocisign_core::{Context, HttpSend, Result, StaticEnv};
use ocisign_file_read_tokio::TokioFileRead;
use once_cell::sync::Lazy;
use rsa::pkcs1::EncodeRsaPrivateKey;
use rsa::pkcs8::LineEnding;
use rsa::RsaPrivateKey;
use std::sync::{Arc, Mutex};

pub static TEST_KEY: Lazy<RsaPrivateKey> = Lazy::new(|| {
    RsaPrivateKey::new(&mut rand::thread_rng(), 1024).expect("key generation must succeed")
});

pub fn test_context() -> Context {
    Context::new()
        .with_file_read(TokioFileRead)
        .with_env(StaticEnv {
            home_dir: Some(std::env::temp_dir()),
            envs: Default::default(),
        })
}

pub fn test_credential() -> Credential {
    let pem = TEST_KEY
        .to_pkcs1_pem(LineEnding::LF)
        .expect("key must encode")
        .to_string();

    Credential {
        tenancy: "ocid1.tenancy.oc1..aaaaaaaaba3pv6wkcr4jqae5f15p2b2m2yt2j6rx32uzr4h25vqstifsfdsq"
            .to_string(),
        user: "ocid1.user.oc1..aaaaaaaat5nvwcna5j6aqzjcaty5eqbb6qt2jvpkanghtgdaqedqw3rynjq"
            .to_string(),
        fingerprint: "20:3b:97:13:55:1c:5b:0d:d3:37:d8:50:4e:c5:3a:34".to_string(),
        region: Some("us-phoenix-1".to_string()),
        key: PrivateKeyRef::Inline(pem),
        pass_phrase: None,
        expires_in: None,
    }
}

/// Request seen by [`MockHttpSend`].
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: http::Method,
    pub uri: http::Uri,
    pub headers: http::HeaderMap,
}

/// HttpSend that records requests and replies with a canned response.
#[derive(Debug, Clone)]
pub struct MockHttpSend {
    status: StatusCode,
    headers: Vec<(HeaderName, HeaderValue)>,
    body: Bytes,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockHttpSend {
    pub fn new(status: StatusCode, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
            requests: Arc::default(),
        }
    }

    pub fn with_header(mut self, name: HeaderName, value: &'static str) -> Self {
        self.headers.push((name, HeaderValue::from_static(value)));
        self
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl HttpSend for MockHttpSend {
    async fn http_send(&self, req: http::Request<Bytes>) -> Result<http::Response<Bytes>> {
        let (parts, _) = req.into_parts();
        self.requests.lock().unwrap().push(RecordedRequest {
            method: parts.method,
            uri: parts.uri,
            headers: parts.headers,
        });

        let mut resp = http::Response::builder().status(self.status);
        for (name, value) in &self.headers {
            resp = resp.header(name, value);
        }
        Ok(resp.body(self.body.clone())?)
    }
}
