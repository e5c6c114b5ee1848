//! KMS transport interface
//!
//! The adapters talk to the key-management service through [`KmsClient`],
//! one request per operation. Implementations:
//! - AWS KMS via `aws-sdk-kms` ([`crate::aws::AwsKmsClient`])
//! - In-memory mock for tests (`testing::MockKmsClient`)
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


use crate::error::KmsServiceError;
use async_trait::async_trait;

/// `Sign` request over a pre-computed digest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignRequest {
    pub key_id: String,
    pub message: Vec<u8>,
    pub message_type: String,
    pub signing_algorithm: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignResponse {
    pub signature: Option<Vec<u8>>,
}

/// `Verify` request over a pre-computed digest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifyRequest {
    pub key_id: String,
    pub message: Vec<u8>,
    pub message_type: String,
    pub signature: Vec<u8>,
    pub signing_algorithm: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VerifyResponse {
    pub signature_valid: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateDataKeyRequest {
    pub key_id: String,
    pub key_spec: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerateDataKeyResponse {
    pub plaintext: Option<Vec<u8>>,
    pub ciphertext_blob: Option<Vec<u8>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecryptRequest {
    pub ciphertext_blob: Vec<u8>,
    pub key_id: String,
    pub encryption_algorithm: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecryptResponse {
    pub plaintext: Option<Vec<u8>>,
}

/// Trait for key-management service transports
#[async_trait]
pub trait KmsClient: Send + Sync {
    /// Sign a digest with an asymmetric key
    async fn sign(&self, request: SignRequest) -> Result<SignResponse, KmsServiceError>;

    /// Verify a signature over a digest
    async fn verify(&self, request: VerifyRequest) -> Result<VerifyResponse, KmsServiceError>;

    /// Generate a data key, returned both in plaintext and wrapped
    async fn generate_data_key(
        &self,
        request: GenerateDataKeyRequest,
    ) -> Result<GenerateDataKeyResponse, KmsServiceError>;

    /// Decrypt a ciphertext blob
    async fn decrypt(&self, request: DecryptRequest) -> Result<DecryptResponse, KmsServiceError>;
}
