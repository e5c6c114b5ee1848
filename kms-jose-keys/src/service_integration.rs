//! Service integration helpers for building KMS keys from configuration
// Copyright 2025 Francisco F. Pinochet
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.


use crate::aws::AwsKmsClient;
use crate::error::{KmsError, KmsResult};
use crate::kms::KmsClient;
use crate::signing_key::KmsAsymmetricSigningKey;
use crate::symmetric_cek::KmsSymmetricCek;
use crate::symmetric_key::KmsSymmetricKey;
use kms_jose_config::KmsJoseConfig;
use std::sync::Arc;
use tracing::{info, warn};

/// Initialize the AWS KMS client for a service
pub async fn init_kms_client(config: &KmsJoseConfig) -> Arc<dyn KmsClient> {
    info!(
        region = config.region.as_deref().unwrap_or("default"),
        "Initializing KMS client"
    );

    let client =
        AwsKmsClient::load(config.region.as_deref(), config.endpoint_url.as_deref()).await;
    Arc::new(client)
}

fn required_key_id<'a>(key_id: Option<&'a str>, setting: &str) -> KmsResult<&'a str> {
    key_id.ok_or_else(|| {
        warn!(setting = setting, "KMS key id not configured");
        KmsError::InvalidKeyFormat(format!("No KMS key id configured ({})", setting))
    })
}

/// Signing key from `KMS_JOSE_SIGNING_KEY_ID`
pub fn signing_key_from_config(
    config: &KmsJoseConfig,
    client: Arc<dyn KmsClient>,
) -> KmsResult<KmsAsymmetricSigningKey> {
    let key_id = required_key_id(config.signing_key_id.as_deref(), "KMS_JOSE_SIGNING_KEY_ID")?;
    KmsAsymmetricSigningKey::new(key_id, client)
}

/// Wrapping key from `KMS_JOSE_WRAPPING_KEY_ID`
pub fn wrapping_key_from_config(
    config: &KmsJoseConfig,
    client: Arc<dyn KmsClient>,
) -> KmsResult<KmsSymmetricKey> {
    let key_id = required_key_id(config.wrapping_key_id.as_deref(), "KMS_JOSE_WRAPPING_KEY_ID")?;
    KmsSymmetricKey::new(key_id, client)
}

/// Content encryption key from `KMS_JOSE_CEK_KEY_ID` and `KMS_JOSE_DATA_KEY_SPEC`
pub fn cek_from_config(
    config: &KmsJoseConfig,
    client: Arc<dyn KmsClient>,
) -> KmsResult<KmsSymmetricCek> {
    let key_id = required_key_id(config.cek_key_id.as_deref(), "KMS_JOSE_CEK_KEY_ID")?;
    KmsSymmetricCek::new(key_id, client, &config.data_key_spec)
}
