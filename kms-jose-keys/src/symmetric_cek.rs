//! Content encryption keys generated by KMS
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


use crate::engine::{CipherOutput, EncryptProperties, JoseEngine, NativeEngine};
use crate::error::{classify, KmsError, KmsResult};
use crate::key_types::{DataKeyGenerationResult, KeyIdentifier};
use crate::kms::{GenerateDataKeyRequest, KmsClient};
use std::fmt;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, error};
use zeroize::Zeroizing;

pub use kms_jose_config::DEFAULT_DATA_KEY_SPEC;

/// Plaintext data key held between `generate` and `encrypt`
enum DataKeyState {
    Uninitialized,
    Ready(Zeroizing<Vec<u8>>),
}

/// Generates a data key with KMS `GenerateDataKey` and encrypts content with it.
///
/// The plaintext half of the data key stays in memory (zeroized on drop) and
/// is used by [`encrypt`](Self::encrypt); the ciphertext half is returned to
/// the caller as the wrapped key.
pub struct KmsSymmetricCek {
    key_id: KeyIdentifier,
    client: Arc<dyn KmsClient>,
    engine: Arc<dyn JoseEngine>,
    key_spec: String,
    state: RwLock<DataKeyState>,
}

impl KmsSymmetricCek {
    pub fn new(key_id: &str, client: Arc<dyn KmsClient>, key_spec: &str) -> KmsResult<Self> {
        Self::with_engine(key_id, client, key_spec, Arc::new(NativeEngine::new()))
    }

    pub fn with_engine(
        key_id: &str,
        client: Arc<dyn KmsClient>,
        key_spec: &str,
        engine: Arc<dyn JoseEngine>,
    ) -> KmsResult<Self> {
        let key_id = KeyIdentifier::parse(key_id)?;
        Ok(Self {
            key_id,
            client,
            engine,
            key_spec: key_spec.to_string(),
            state: RwLock::new(DataKeyState::Uninitialized),
        })
    }

    pub fn key_id(&self) -> &KeyIdentifier {
        &self.key_id
    }

    pub fn key_spec(&self) -> &str {
        &self.key_spec
    }

    /// Whether a data key is available for [`encrypt`](Self::encrypt)
    pub async fn is_ready(&self) -> bool {
        matches!(*self.state.read().await, DataKeyState::Ready(_))
    }

    /// Generate a fresh data key and return its wrapped form
    pub async fn generate(&self) -> KmsResult<DataKeyGenerationResult> {
        let request = GenerateDataKeyRequest {
            key_id: self.key_id.to_string(),
            key_spec: self.key_spec.clone(),
        };

        debug!(key_id = %self.key_id, key_spec = %self.key_spec, "Generating data key with KMS");

        let response = match self.client.generate_data_key(request).await {
            Ok(response) => response,
            Err(e) => {
                error!(key_id = %self.key_id, error = %e, "Error while generating data key from KMS");
                return Err(classify(&e));
            }
        };

        let mut state = self.state.write().await;
        *state = match response.plaintext {
            Some(plaintext) => DataKeyState::Ready(Zeroizing::new(plaintext)),
            None => DataKeyState::Uninitialized,
        };

        Ok(DataKeyGenerationResult { data: response.ciphertext_blob })
    }

    /// Encrypt content locally with the generated data key
    pub async fn encrypt(
        &self,
        encryption_algorithm: &str,
        data: &[u8],
        props: &EncryptProperties,
    ) -> KmsResult<CipherOutput> {
        let state = self.state.read().await;
        match &*state {
            DataKeyState::Ready(key) => {
                self.engine.encrypt(encryption_algorithm, key.as_slice(), data, props)
            }
            DataKeyState::Uninitialized => Err(KmsError::DataKeyNotGenerated),
        }
    }
}

impl fmt::Debug for KmsSymmetricCek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KmsSymmetricCek")
            .field("key_id", &self.key_id)
            .field("key_spec", &self.key_spec)
            .finish_non_exhaustive()
    }
}
