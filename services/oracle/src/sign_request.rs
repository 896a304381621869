use crate::backend::{RsaSignatureBackend, SignatureBackend};
use crate::constants::*;
use crate::Credential;
use async_trait::async_trait;
use http::header::{AUTHORIZATION, DATE};
use http::request::Parts;
use http::{HeaderName, HeaderValue, Method};
use log::debug;
use ocisign_core::hash::base64_encode;
use ocisign_core::time::{format_http_date, now, DateTime};
use ocisign_core::{Context, Error, Result, SignRequest};
use std::fmt::Write;
use std::sync::Arc;

/// Headers produced by signing one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedHeaders {
    /// Value of the `Date` header, `Tue, 01 Mar 2022 08:12:34 GMT`.
    pub date: String,
    /// Value of the `Authorization` header.
    pub authorization: String,
}

/// The canonical text signed for a request, along with the names of the
/// components it is made of.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringToSign {
    /// Component names, in signing order.
    pub headers: Vec<String>,
    /// Components joined with `\n`.
    pub value: String,
}

impl StringToSign {
    /// Build the string to sign.
    ///
    /// The components are always `host`, `date` and `(request-target)`, in
    /// that order, followed by `extra_headers` in the order given. Extra
    /// header names and values are lowercased, a value that already starts
    /// with `<name>:` is used as is. An extra header reusing a component name
    /// replaces that component in place.
    pub fn build(
        host: &str,
        date: &str,
        method: &Method,
        path: &str,
        extra_headers: &[(String, String)],
    ) -> Self {
        let mut parts: Vec<(String, String)> = vec![
            ("host".to_string(), format!("host: {host}")),
            ("date".to_string(), format!("date: {date}")),
            (
                REQUEST_TARGET.to_string(),
                format!(
                    "{REQUEST_TARGET}: {} {path}",
                    method.as_str().to_lowercase()
                ),
            ),
        ];

        for (name, value) in extra_headers {
            let name = name.to_lowercase();
            let mut value = value.to_lowercase();
            if !value.starts_with(&format!("{name}:")) {
                value = format!("{name}: {value}");
            }

            match parts.iter_mut().find(|(k, _)| *k == name) {
                Some(part) => part.1 = value,
                None => parts.push((name, value)),
            }
        }

        let mut s = String::new();
        for (idx, (_, v)) in parts.iter().enumerate() {
            if idx > 0 {
                s.push('\n');
            }
            s.push_str(v);
        }

        Self {
            headers: parts.into_iter().map(|(k, _)| k).collect(),
            value: s,
        }
    }
}

/// RequestSigner that implements Oracle Cloud Infrastructure API signing.
///
/// - [Oracle Cloud Infrastructure API Signing](https://docs.oracle.com/en-us/iaas/Content/API/Concepts/signingrequests.htm)
#[derive(Debug, Clone)]
pub struct RequestSigner {
    backend: Arc<dyn SignatureBackend>,
    headers: Vec<HeaderName>,
    time: Option<DateTime>,
}

impl Default for RequestSigner {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestSigner {
    /// Create a new RequestSigner backed by [`RsaSignatureBackend`].
    pub fn new() -> Self {
        Self {
            backend: Arc::new(RsaSignatureBackend),
            headers: Vec::new(),
            time: None,
        }
    }

    /// Use another signature backend.
    pub fn with_backend(mut self, backend: impl SignatureBackend) -> Self {
        self.backend = Arc::new(backend);
        self
    }

    /// Sign these request headers too, after `host date (request-target)`.
    ///
    /// Requests with a body usually add `x-content-sha256`, `content-length`
    /// and `content-type`. Headers missing from the request are skipped.
    pub fn with_signed_headers(mut self, headers: impl IntoIterator<Item = HeaderName>) -> Self {
        self.headers = headers.into_iter().collect();
        self
    }

    /// Specify the signing time.
    ///
    /// # Note
    ///
    /// We should always take current time to sign requests.
    /// Only use this function for testing.
    #[cfg(test)]
    pub fn with_time(mut self, time: DateTime) -> Self {
        self.time = Some(time);
        self
    }

    /// Build the `Date` and `Authorization` header values for a request.
    ///
    /// Fails with `RequestInvalid` for methods other than GET, PUT, POST,
    /// DELETE and HEAD or for values containing a line break, with `KeyInvalid` if the key can't be loaded or
    /// parsed, and with `CryptoFailed` if signing itself fails.
    pub async fn build_auth_headers(
        &self,
        ctx: &Context,
        cred: &Credential,
        host: &str,
        method: &Method,
        path: &str,
        extra_headers: &[(String, String)],
    ) -> Result<SignedHeaders> {
        check_method(method)?;
        check_line(host)?;
        check_line(path)?;
        for (name, value) in extra_headers {
            check_line(name)?;
            check_line(value)?;
        }

        let date = format_http_date(self.time.unwrap_or_else(now));
        let string_to_sign = StringToSign::build(host, &date, method, path, extra_headers);
        debug!("calculated string to sign: {}", string_to_sign.value);

        let pem = cred.key.load_pem(ctx).await?;
        let signature = self.backend.sign(
            string_to_sign.value.as_bytes(),
            &pem,
            cred.pass_phrase.as_deref(),
        )?;

        let mut authorization = String::new();
        write!(
            authorization,
            "Signature version=\"{SIGNATURE_VERSION}\",keyId=\"{}\",algorithm=\"{SIGNATURE_ALGORITHM}\",headers=\"{}\",signature=\"{}\"",
            cred.key_id(),
            string_to_sign.headers.join(" "),
            base64_encode(&signature)
        )?;

        Ok(SignedHeaders {
            date,
            authorization,
        })
    }
}

fn check_method(method: &Method) -> Result<()> {
    match *method {
        Method::GET | Method::PUT | Method::POST | Method::DELETE | Method::HEAD => Ok(()),
        _ => Err(Error::request_invalid(format!(
            "method {method} is not supported for signing"
        ))),
    }
}

/// Every component is one line of the signing string.
fn check_line(v: &str) -> Result<()> {
    if v.contains(['\r', '\n']) {
        return Err(Error::request_invalid(format!(
            "line break is not allowed in signed value {v:?}"
        )));
    }
    Ok(())
}

#[async_trait]
impl SignRequest for RequestSigner {
    type Credential = Credential;

    async fn sign_request(
        &self,
        ctx: &Context,
        req: &mut Parts,
        credential: Option<&Self::Credential>,
    ) -> Result<()> {
        let Some(cred) = credential else {
            return Err(Error::config_invalid("no credential to sign the request with"));
        };

        let host = req
            .uri
            .authority()
            .ok_or_else(|| Error::request_invalid("request uri has no host"))?
            .as_str()
            .to_string();
        let path = req
            .uri
            .path_and_query()
            .map(|v| v.as_str())
            .unwrap_or("/")
            .to_string();

        let mut extra_headers = Vec::with_capacity(self.headers.len());
        for name in &self.headers {
            if let Some(value) = req.headers.get(name) {
                extra_headers.push((name.as_str().to_string(), value.to_str()?.to_string()));
            }
        }

        let signed = self
            .build_auth_headers(ctx, cred, &host, &req.method, &path, &extra_headers)
            .await?;

        // Convert both before touching the request so a failure leaves it unsigned.
        let date = HeaderValue::from_str(&signed.date)?;
        let mut authorization = HeaderValue::from_str(&signed.authorization)?;
        authorization.set_sensitive(true);

        req.headers.insert(DATE, date);
        req.headers.insert(AUTHORIZATION, authorization);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::PrivateKeyRef;
    use crate::testing::{test_context, test_credential, TEST_KEY};
    use chrono::TimeZone;
    use http::header::CONTENT_LENGTH;
    use ocisign_core::hash::base64_decode;
    use ocisign_core::ErrorKind;
    use pretty_assertions::assert_eq;
    use rsa::pkcs1v15::{Signature, VerifyingKey};
    use rsa::sha2::Sha256;
    use rsa::signature::Verifier;
    use test_case::test_case;

    const HOST: &str = "objectstorage.us-phoenix-1.example.com";
    const TEST_DATE: &str = "Tue, 01 Mar 2022 08:12:34 GMT";

    fn test_time() -> DateTime {
        chrono::Utc
            .with_ymd_and_hms(2022, 3, 1, 8, 12, 34)
            .single()
            .expect("time must be valid")
    }

    fn signature_of(authorization: &str) -> Vec<u8> {
        let b64 = authorization
            .rsplit_once("signature=\"")
            .and_then(|(_, v)| v.strip_suffix('"'))
            .expect("authorization must carry a signature");
        base64_decode(b64).expect("signature must be base64")
    }

    #[test]
    fn test_string_to_sign_without_extra_headers() {
        let s = StringToSign::build(HOST, TEST_DATE, &Method::GET, "/n/ns1/b/bucket1/o/file.txt", &[]);

        assert_eq!(
            s.value,
            "host: objectstorage.us-phoenix-1.example.com\n\
             date: Tue, 01 Mar 2022 08:12:34 GMT\n\
             (request-target): get /n/ns1/b/bucket1/o/file.txt"
        );
        assert_eq!(s.headers, vec!["host", "date", "(request-target)"]);
    }

    #[test]
    fn test_string_to_sign_is_deterministic() {
        let extra = vec![("X-Content-SHA256".to_string(), "abc=".to_string())];

        let a = StringToSign::build(HOST, TEST_DATE, &Method::PUT, "/n/ns/b/b/o/a", &extra);
        let b = StringToSign::build(HOST, TEST_DATE, &Method::PUT, "/n/ns/b/b/o/a", &extra);
        assert_eq!(a, b);
    }

    #[test]
    fn test_string_to_sign_keeps_extra_header_order() {
        let extra = vec![
            ("Content-Type".to_string(), "Application/JSON".to_string()),
            ("x-content-sha256".to_string(), "x-content-sha256: ABC=".to_string()),
            ("Content-Length".to_string(), "42".to_string()),
        ];

        let s = StringToSign::build(HOST, TEST_DATE, &Method::POST, "/n/", &extra);
        assert_eq!(
            s.headers,
            vec![
                "host",
                "date",
                "(request-target)",
                "content-type",
                "x-content-sha256",
                "content-length"
            ]
        );
        assert!(s.value.ends_with(
            "(request-target): post /n/\n\
             content-type: application/json\n\
             x-content-sha256: abc=\n\
             content-length: 42"
        ));
    }

    #[test_case("content-type", "content-type: text/plain", "content-type: text/plain"; "already prefixed")]
    #[test_case("Content-Type", "Content-Type:text/plain", "content-type:text/plain"; "prefixed without space")]
    #[test_case("content-type", "text/plain; x=content-type:a", "content-type: text/plain; x=content-type:a"; "name inside value")]
    #[test_case("opc-meta-tag", "", "opc-meta-tag: "; "empty value")]
    fn test_string_to_sign_extra_header_prefix(name: &str, value: &str, expected: &str) {
        let extra = vec![(name.to_string(), value.to_string())];

        let s = StringToSign::build(HOST, TEST_DATE, &Method::GET, "/n/", &extra);
        assert_eq!(s.value.lines().last(), Some(expected));
    }

    #[test]
    fn test_string_to_sign_extra_header_replaces_component() {
        let extra = vec![("Host".to_string(), "other.example.com".to_string())];

        let s = StringToSign::build(HOST, TEST_DATE, &Method::GET, "/n/", &extra);
        assert_eq!(s.headers, vec!["host", "date", "(request-target)"]);
        assert!(s.value.starts_with("host: other.example.com\n"));
    }

    #[tokio::test]
    async fn test_build_auth_headers() -> Result<()> {
        let cred = test_credential();
        let signer = RequestSigner::new().with_time(test_time());

        let signed = signer
            .build_auth_headers(
                &test_context(),
                &cred,
                HOST,
                &Method::GET,
                "/n/ns1/b/bucket1/o/file.txt",
                &[],
            )
            .await?;

        assert_eq!(signed.date, TEST_DATE);
        let prefix = format!(
            "Signature version=\"1\",keyId=\"{}\",algorithm=\"rsa-sha256\",headers=\"host date (request-target)\",signature=\"",
            cred.key_id()
        );
        assert!(
            signed.authorization.starts_with(&prefix),
            "{}",
            signed.authorization
        );

        let expected = StringToSign::build(
            HOST,
            TEST_DATE,
            &Method::GET,
            "/n/ns1/b/bucket1/o/file.txt",
            &[],
        );
        let verifying_key = VerifyingKey::<Sha256>::new(TEST_KEY.to_public_key());
        let sig = Signature::try_from(signature_of(&signed.authorization).as_slice())
            .expect("signature must be valid");
        assert!(verifying_key.verify(expected.value.as_bytes(), &sig).is_ok());
        Ok(())
    }

    #[tokio::test]
    async fn test_build_auth_headers_with_extra_headers() -> Result<()> {
        let signer = RequestSigner::new().with_time(test_time());
        let extra = vec![
            ("x-content-sha256".to_string(), "47DEQpj8HBSa+/TImW+5JCeuQeRkm5NMpJWZG3hSuFU=".to_string()),
            ("content-length".to_string(), "0".to_string()),
        ];

        let signed = signer
            .build_auth_headers(
                &test_context(),
                &test_credential(),
                HOST,
                &Method::PUT,
                "/n/ns/b/bucket/o/a.txt",
                &extra,
            )
            .await?;

        assert!(signed
            .authorization
            .contains("headers=\"host date (request-target) x-content-sha256 content-length\""));
        Ok(())
    }

    #[tokio::test]
    async fn test_build_auth_headers_rejects_method() {
        let err = RequestSigner::new()
            .build_auth_headers(
                &test_context(),
                &test_credential(),
                HOST,
                &Method::PATCH,
                "/n/",
                &[],
            )
            .await
            .expect_err("patch must be rejected");
        assert_eq!(err.kind(), ErrorKind::RequestInvalid);
    }

    #[test_case("x-a", "v\nhost: evil"; "newline in value")]
    #[test_case("x-a", "v\r"; "carriage return in value")]
    #[test_case("x-a\nhost", "v"; "newline in name")]
    #[tokio::test]
    async fn test_build_auth_headers_rejects_line_breaks(name: &str, value: &str) {
        let err = RequestSigner::new()
            .build_auth_headers(
                &test_context(),
                &test_credential(),
                HOST,
                &Method::GET,
                "/n/",
                &[(name.to_string(), value.to_string())],
            )
            .await
            .expect_err("line break must be rejected");
        assert_eq!(err.kind(), ErrorKind::RequestInvalid);
    }

    #[tokio::test]
    async fn test_sign_request() -> Result<()> {
        let signer = RequestSigner::new()
            .with_time(test_time())
            .with_signed_headers([CONTENT_LENGTH]);

        let mut req = http::Request::put(format!("https://{HOST}/n/ns/b/bucket/o/a.txt?versionId=1"))
            .header(CONTENT_LENGTH, "5")
            .body(())
            .expect("request must be valid")
            .into_parts()
            .0;

        signer
            .sign_request(&test_context(), &mut req, Some(&test_credential()))
            .await?;

        assert_eq!(req.headers[DATE], TEST_DATE);
        let authorization = req.headers[AUTHORIZATION].to_str().unwrap().to_string();
        assert!(req.headers[AUTHORIZATION].is_sensitive());
        assert!(authorization.contains("headers=\"host date (request-target) content-length\""));

        let expected = StringToSign::build(
            HOST,
            TEST_DATE,
            &Method::PUT,
            "/n/ns/b/bucket/o/a.txt?versionId=1",
            &[("content-length".to_string(), "5".to_string())],
        );
        let verifying_key = VerifyingKey::<Sha256>::new(TEST_KEY.to_public_key());
        let sig = Signature::try_from(signature_of(&authorization).as_slice())
            .expect("signature must be valid");
        assert!(verifying_key.verify(expected.value.as_bytes(), &sig).is_ok());
        Ok(())
    }

    #[tokio::test]
    async fn test_sign_request_with_unavailable_key() {
        let mut cred = test_credential();
        cred.key = PrivateKeyRef::parse("/not/exist/oci_api_key.pem");

        let mut req = http::Request::get(format!("https://{HOST}/n/"))
            .body(())
            .expect("request must be valid")
            .into_parts()
            .0;

        let err = RequestSigner::new()
            .sign_request(&test_context(), &mut req, Some(&cred))
            .await
            .expect_err("unavailable key must fail");
        assert_eq!(err.kind(), ErrorKind::KeyInvalid);
        assert!(req.headers.get(AUTHORIZATION).is_none());
        assert!(req.headers.get(DATE).is_none());
    }

    #[tokio::test]
    async fn test_sign_request_without_credential() {
        let mut req = http::Request::get(format!("https://{HOST}/n/"))
            .body(())
            .expect("request must be valid")
            .into_parts()
            .0;

        let err = RequestSigner::new()
            .sign_request(&test_context(), &mut req, None)
            .await
            .expect_err("missing credential must fail");
        assert_eq!(err.kind(), ErrorKind::ConfigInvalid);
        assert!(req.headers.get(AUTHORIZATION).is_none());
    }

    #[derive(Debug)]
    struct EmptySignature;

    impl SignatureBackend for EmptySignature {
        fn sign(&self, _: &[u8], _: &str, _: Option<&str>) -> Result<Vec<u8>> {
            Err(Error::crypto_failed("backend unavailable"))
        }
    }

    #[tokio::test]
    async fn test_backend_failure_is_surfaced() {
        let err = RequestSigner::new()
            .with_backend(EmptySignature)
            .build_auth_headers(
                &test_context(),
                &test_credential(),
                HOST,
                &Method::GET,
                "/n/",
                &[],
            )
            .await
            .expect_err("backend failure must surface");
        assert_eq!(err.kind(), ErrorKind::CryptoFailed);
    }
}
