// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

use crate::key::PrivateKeyRef;
use ocisign_core::time::{now, DateTime};
use ocisign_core::SigningCredential;
use std::fmt::{Debug, Formatter};

/// Credential that holds the API signing key information.
#[derive(Default, Clone)]
pub struct Credential {
    /// TenancyID for Oracle Cloud Infrastructure.
    pub tenancy: String,
    /// UserID for Oracle Cloud Infrastructure.
    pub user: String,
    /// Fingerprint of the API Key.
    pub fingerprint: String,
    /// Region the credential belongs to, used to derive service hosts.
    pub region: Option<String>,
    /// API private key, inline PEM or a file path.
    pub key: PrivateKeyRef,
    /// Pass phrase of an encrypted private key.
    pub pass_phrase: Option<String>,
    /// Expiration time for this credential.
    pub expires_in: Option<DateTime>,
}

impl Credential {
    /// The `keyId` the server looks the public key up with.
    pub fn key_id(&self) -> String {
        format!("{}/{}/{}", self.tenancy, self.user, self.fingerprint)
    }
}

impl Debug for Credential {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("tenancy", &self.tenancy)
            .field("user", &self.user)
            .field("fingerprint", &self.fingerprint)
            .field("region", &self.region)
            .field("key", &self.key)
            .field("pass_phrase", &self.pass_phrase.as_ref().map(|_| "***"))
            .field("expires_in", &self.expires_in)
            .finish()
    }
}

impl SigningCredential for Credential {
    fn is_valid(&self) -> bool {
        if self.tenancy.is_empty()
            || self.user.is_empty()
            || self.fingerprint.is_empty()
            || self.key.is_empty()
        {
            return false;
        }
        // Take 120s as buffer to avoid edge cases.
        if let Some(valid) = self
            .expires_in
            .map(|v| v > now() + chrono::TimeDelta::minutes(2))
        {
            return valid;
        }

        true
    }
}
