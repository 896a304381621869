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

use crate::constants::*;
use crate::key::PrivateKeyRef;
use crate::Credential;
use ini::Ini;
use ocisign_core::utils::Redact;
use ocisign_core::{Context, Error, Result};
use std::fmt::{Debug, Formatter};

/// Config for Oracle Cloud Infrastructure services.
///
/// Every field is optional so partial sources can be merged, a credential is
/// only built once `tenancy`, `user`, `fingerprint` and `key` are all set.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Config {
    /// UserID for Oracle Cloud Infrastructure.
    pub user: Option<String>,
    /// TenancyID for Oracle Cloud Infrastructure.
    pub tenancy: Option<String>,
    /// Region for Oracle Cloud Infrastructure.
    pub region: Option<String>,
    /// Private key, either inline PEM content or a file path.
    pub key: Option<String>,
    /// Fingerprint for the key.
    pub fingerprint: Option<String>,
    /// Pass phrase for an encrypted key.
    pub pass_phrase: Option<String>,
    /// Config file path to load credentials.
    pub config_file: Option<String>,
    /// Profile name in the config file.
    pub profile: Option<String>,
}

impl Debug for Config {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("user", &self.user)
            .field("tenancy", &self.tenancy)
            .field("region", &self.region)
            .field("key", &Redact::from(&self.key))
            .field("fingerprint", &self.fingerprint)
            .field("pass_phrase", &Redact::from(&self.pass_phrase))
            .field("config_file", &self.config_file)
            .field("profile", &self.profile)
            .finish()
    }
}

impl Config {
    /// Load config from environment variables.
    ///
    /// `OCI_KEY` carries inline key content and wins over `OCI_KEY_FILE`
    /// unless it is blank.
    pub fn from_env(ctx: &Context) -> Self {
        let envs = ctx.env_vars();

        Self {
            user: envs.get(ORACLE_USER).cloned(),
            tenancy: envs.get(ORACLE_TENANCY).cloned(),
            region: envs.get(ORACLE_REGION).cloned(),
            key: envs
                .get(ORACLE_KEY)
                .filter(|v| !v.trim().is_empty())
                .or_else(|| envs.get(ORACLE_KEY_FILE))
                .cloned(),
            fingerprint: envs.get(ORACLE_FINGERPRINT).cloned(),
            pass_phrase: envs.get(ORACLE_PASS_PHRASE).cloned(),
            config_file: envs.get(ORACLE_CONFIG_FILE).cloned(),
            profile: envs.get(ORACLE_PROFILE).cloned(),
        }
    }

    /// Load config from an Oracle config file.
    ///
    /// `path` must already be expanded. Returns `ConfigInvalid` if the file
    /// can't be parsed and `None` if the profile doesn't exist.
    pub async fn from_config_file(ctx: &Context, path: &str, profile: &str) -> Result<Option<Self>> {
        let content = ctx.file_read_as_string(path).await?;
        Self::from_ini(&content, path, profile)
    }

    pub(crate) fn from_ini(content: &str, path: &str, profile: &str) -> Result<Option<Self>> {
        let ini = Ini::load_from_str(content).map_err(|e| {
            Error::config_invalid(format!("failed to parse config file {path}")).with_source(e)
        })?;
        let Some(section) = ini.section(Some(profile)) else {
            return Ok(None);
        };

        let get = |k: &str| section.get(k).map(|v| v.trim().to_string());
        Ok(Some(Self {
            user: get("user"),
            tenancy: get("tenancy"),
            region: get("region"),
            key: get("key_file"),
            fingerprint: get("fingerprint"),
            pass_phrase: get("pass_phrase"),
            config_file: Some(path.to_string()),
            profile: Some(profile.to_string()),
        }))
    }

    /// Build a credential out of this config.
    ///
    /// Returns `None` while any of the required fields is still missing.
    pub fn to_credential(&self) -> Option<Credential> {
        match (&self.tenancy, &self.user, &self.fingerprint, &self.key) {
            (Some(tenancy), Some(user), Some(fingerprint), Some(key))
                if !tenancy.is_empty() && !user.is_empty() && !fingerprint.is_empty() =>
            {
                let key = PrivateKeyRef::parse(key);
                if key.is_empty() {
                    return None;
                }
                Some(Credential {
                    tenancy: tenancy.clone(),
                    user: user.clone(),
                    fingerprint: fingerprint.clone(),
                    region: self.region.clone(),
                    key,
                    pass_phrase: self.pass_phrase.clone(),
                    expires_in: None,
                })
            }
            _ => None,
        }
    }
}
