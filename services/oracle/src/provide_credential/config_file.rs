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

use crate::constants::{
    ORACLE_CONFIG_FILE, ORACLE_CONFIG_PATH, ORACLE_DEFAULT_PROFILE, ORACLE_PROFILE,
};
use crate::{Config, Credential};
use async_trait::async_trait;
use log::debug;
use ocisign_core::time::now;
use ocisign_core::{Context, Error, ProvideCredential, Result};

/// ConfigFileCredentialProvider loads credentials from Oracle config file (~/.oci/config).
///
/// The config file path and profile name can be overridden using environment variables:
/// - `OCI_CONFIG_FILE`: Override the config file path
/// - `OCI_PROFILE`: Override the profile name (default is "DEFAULT")
///
/// A missing file or profile yields no credential, a file that can't be
/// parsed is an error.
#[derive(Debug, Default, Clone)]
pub struct ConfigFileCredentialProvider {
    config_file: Option<String>,
    profile: Option<String>,
}

impl ConfigFileCredentialProvider {
    /// Create a new ConfigFileCredentialProvider.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read this config file instead of the default one.
    pub fn with_config_file(mut self, path: impl Into<String>) -> Self {
        self.config_file = Some(path.into());
        self
    }

    /// Use this profile instead of the default one.
    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = Some(profile.into());
        self
    }
}

#[async_trait]
impl ProvideCredential for ConfigFileCredentialProvider {
    type Credential = Credential;

    async fn provide_credential(&self, ctx: &Context) -> Result<Option<Self::Credential>> {
        let envs = ctx.env_vars();

        let config_file = self
            .config_file
            .as_deref()
            .or_else(|| envs.get(ORACLE_CONFIG_FILE).map(|s| s.as_str()))
            .unwrap_or(ORACLE_CONFIG_PATH);
        let profile = self
            .profile
            .as_deref()
            .or_else(|| envs.get(ORACLE_PROFILE).map(|s| s.as_str()))
            .unwrap_or(ORACLE_DEFAULT_PROFILE);

        let path = ctx
            .expand_home_dir(config_file)
            .ok_or_else(|| Error::config_invalid("failed to expand home directory"))?;

        let content = match ctx.file_read_as_string(&path).await {
            Ok(content) => content,
            Err(err) => {
                debug!("oracle config file not found at {path}: {err}");
                return Ok(None);
            }
        };

        let Some(config) = Config::from_ini(&content, &path, profile)? else {
            debug!("profile {profile} not found in config file {path}");
            return Ok(None);
        };

        let Some(mut cred) = config.to_credential() else {
            debug!("incomplete profile {profile} in config file {path}, skipping");
            return Ok(None);
        };

        debug!("loading credential from config file {path} with profile {profile}");
        cred.expires_in = Some(now() + chrono::TimeDelta::minutes(10));
        Ok(Some(cred))
    }
}
