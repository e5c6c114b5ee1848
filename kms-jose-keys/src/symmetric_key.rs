//! Symmetric key-wrapping key held in KMS
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


use crate::error::{classify, KmsResult};
use crate::key_types::{DataKeyGenerationResult, KeyIdentifier};
use crate::kms::{DecryptRequest, KmsClient};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error};

/// Unwraps content keys with KMS `Decrypt`.
///
/// Wrapping has already happened by the time a JWE is assembled: the
/// ciphertext blob from [`KmsSymmetricCek::generate`](crate::symmetric_cek::KmsSymmetricCek::generate)
/// is the wrapped key, so [`wrap`](Self::wrap) passes it through.
#[derive(Clone)]
pub struct KmsSymmetricKey {
    key_id: KeyIdentifier,
    client: Arc<dyn KmsClient>,
}

impl KmsSymmetricKey {
    pub fn new(key_id: &str, client: Arc<dyn KmsClient>) -> KmsResult<Self> {
        let key_id = KeyIdentifier::parse(key_id)?;
        Ok(Self { key_id, client })
    }

    pub fn key_id(&self) -> &KeyIdentifier {
        &self.key_id
    }

    pub fn wrap(
        &self,
        _encryption_algorithm: &str,
        data_key: DataKeyGenerationResult,
    ) -> DataKeyGenerationResult {
        data_key
    }

    /// Decrypt a wrapped content key
    pub async fn unwrap(
        &self,
        encryption_algorithm: &str,
        wrapped_key: &[u8],
    ) -> KmsResult<Option<Vec<u8>>> {
        let request = DecryptRequest {
            ciphertext_blob: wrapped_key.to_vec(),
            key_id: self.key_id.to_string(),
            encryption_algorithm: encryption_algorithm.to_string(),
        };

        debug!(key_id = %self.key_id, algorithm = encryption_algorithm, "Unwrapping key with KMS");

        match self.client.decrypt(request).await {
            Ok(response) => Ok(response.plaintext),
            Err(e) => {
                error!(key_id = %self.key_id, error = %e, "Error while unwrapping key from KMS");
                Err(classify(&e))
            }
        }
    }
}

impl fmt::Debug for KmsSymmetricKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KmsSymmetricKey")
            .field("key_id", &self.key_id)
            .finish_non_exhaustive()
    }
}
