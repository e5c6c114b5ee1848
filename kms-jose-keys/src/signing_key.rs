//! Asymmetric signing key held in KMS
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


use crate::algorithms::DIGEST_MESSAGE_TYPE;
use crate::digest::digest_data;
use crate::engine::{JoseEngine, NativeEngine};
use crate::error::{classify, KmsResult};
use crate::key_types::{KeyIdentifier, SigningResult, VerificationResult};
use crate::kms::{KmsClient, SignRequest, VerifyRequest};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error};

/// Signs and verifies with a private key that never leaves KMS.
///
/// Payloads are digested locally and only the digest is sent, flagged with
/// message type `DIGEST`.
#[derive(Clone)]
pub struct KmsAsymmetricSigningKey {
    key_id: KeyIdentifier,
    client: Arc<dyn KmsClient>,
    engine: Arc<dyn JoseEngine>,
}

impl KmsAsymmetricSigningKey {
    /// Create a signing key using the native engine for digests
    pub fn new(key_id: &str, client: Arc<dyn KmsClient>) -> KmsResult<Self> {
        Self::with_engine(key_id, client, Arc::new(NativeEngine::new()))
    }

    pub fn with_engine(
        key_id: &str,
        client: Arc<dyn KmsClient>,
        engine: Arc<dyn JoseEngine>,
    ) -> KmsResult<Self> {
        let key_id = KeyIdentifier::parse(key_id)?;
        Ok(Self { key_id, client, engine })
    }

    pub fn key_id(&self) -> &KeyIdentifier {
        &self.key_id
    }

    /// Sign `data` with KMS `Sign`
    pub async fn sign(&self, signing_algorithm: &str, data: &[u8]) -> KmsResult<SigningResult> {
        let digest = digest_data(self.engine.as_ref(), signing_algorithm, data)?;

        let request = SignRequest {
            key_id: self.key_id.to_string(),
            message: digest,
            message_type: DIGEST_MESSAGE_TYPE.to_string(),
            signing_algorithm: signing_algorithm.to_string(),
        };

        debug!(key_id = %self.key_id, algorithm = signing_algorithm, "Signing digest with KMS");

        match self.client.sign(request).await {
            Ok(response) => Ok(SigningResult { mac: response.signature }),
            Err(e) => {
                error!(key_id = %self.key_id, error = %e, "Error while signing from KMS");
                Err(classify(&e))
            }
        }
    }

    /// Verify `signature` over `data` with KMS `Verify`
    pub async fn verify(
        &self,
        signing_algorithm: &str,
        data: &[u8],
        signature: &[u8],
    ) -> KmsResult<VerificationResult> {
        let digest = digest_data(self.engine.as_ref(), signing_algorithm, data)?;

        let request = VerifyRequest {
            key_id: self.key_id.to_string(),
            message: digest,
            message_type: DIGEST_MESSAGE_TYPE.to_string(),
            signature: signature.to_vec(),
            signing_algorithm: signing_algorithm.to_string(),
        };

        debug!(key_id = %self.key_id, algorithm = signing_algorithm, "Verifying digest with KMS");

        match self.client.verify(request).await {
            Ok(response) => Ok(VerificationResult { mac: response.signature_valid }),
            Err(e) => {
                error!(key_id = %self.key_id, error = %e, "Error while verifying from KMS");
                Err(classify(&e))
            }
        }
    }
}

impl fmt::Debug for KmsAsymmetricSigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KmsAsymmetricSigningKey")
            .field("key_id", &self.key_id)
            .finish_non_exhaustive()
    }
}
