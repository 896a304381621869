use crate::key::PrivateKeyRef;
use crate::Credential;
use async_trait::async_trait;
use ocisign_core::{Context, ProvideCredential, Result};

/// StaticCredentialProvider provides static credentials that are provided at initialization time.
#[derive(Debug)]
pub struct StaticCredentialProvider {
    credential: Credential,
}

impl StaticCredentialProvider {
    /// Create a new StaticCredentialProvider with the given credential.
    pub fn new(credential: Credential) -> Self {
        Self { credential }
    }

    /// Create a new StaticCredentialProvider from plain strings.
    ///
    /// `key` is either inline PEM content or a path to a PEM file.
    pub fn from_parts(tenancy: &str, user: &str, fingerprint: &str, region: &str, key: &str) -> Self {
        Self::new(Credential {
            tenancy: tenancy.to_string(),
            user: user.to_string(),
            fingerprint: fingerprint.to_string(),
            region: Some(region.to_string()),
            key: PrivateKeyRef::parse(key),
            pass_phrase: None,
            expires_in: None,
        })
    }
}

#[async_trait]
impl ProvideCredential for StaticCredentialProvider {
    type Credential = Credential;

    async fn provide_credential(&self, _ctx: &Context) -> Result<Option<Self::Credential>> {
        Ok(Some(self.credential.clone()))
    }
}
