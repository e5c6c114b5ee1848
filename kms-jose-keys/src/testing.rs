//! Test doubles for the KMS transport and the JOSE engine
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


use crate::algorithms::DigestAlgorithm;
use crate::engine::{CipherOutput, EncryptProperties, JoseEngine};
use crate::error::{KmsResult, KmsServiceError};
use crate::kms::{
    DecryptRequest, DecryptResponse, GenerateDataKeyRequest, GenerateDataKeyResponse, KmsClient,
    SignRequest, SignResponse, VerifyRequest, VerifyResponse,
};
use async_trait::async_trait;
use std::sync::{Mutex, MutexGuard, PoisonError};

pub const VALID_KMS_KEY_ID: &str = "arn:aws:kms:eu-west-1:112233445566:alias/AliasName";
pub const INVALID_KMS_KEY_ID: &str = "654679365 78897";
pub const MOCKED_CIPHER_DATA_KEY: &[u8] = b"mocked-ciphertext";
pub const MOCKED_PLAIN_DATA_KEY: &[u8] = b"mocked-plaint-key";

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Default)]
struct MockState {
    sign_requests: Vec<SignRequest>,
    verify_requests: Vec<VerifyRequest>,
    generate_requests: Vec<GenerateDataKeyRequest>,
    decrypt_requests: Vec<DecryptRequest>,
    next_failure: Option<KmsServiceError>,
    next_data_key: Option<GenerateDataKeyResponse>,
}

/// In-memory [`KmsClient`] returning canned responses and recording requests
#[derive(Default)]
pub struct MockKmsClient {
    signature: Option<Vec<u8>>,
    signature_valid: Option<bool>,
    data_key: GenerateDataKeyResponse,
    decrypted: Option<Vec<u8>>,
    failure: Option<KmsServiceError>,
    state: Mutex<MockState>,
}

impl MockKmsClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_signature(mut self, signature: Vec<u8>) -> Self {
        self.signature = Some(signature);
        self
    }

    pub fn with_signature_valid(mut self, valid: bool) -> Self {
        self.signature_valid = Some(valid);
        self
    }

    pub fn with_data_key(mut self, plaintext: Vec<u8>, ciphertext_blob: Vec<u8>) -> Self {
        self.data_key = GenerateDataKeyResponse {
            plaintext: Some(plaintext),
            ciphertext_blob: Some(ciphertext_blob),
        };
        self
    }

    pub fn with_decrypted(mut self, plaintext: Vec<u8>) -> Self {
        self.decrypted = Some(plaintext);
        self
    }

    /// Fail every request with `error`
    pub fn failing_with(mut self, error: KmsServiceError) -> Self {
        self.failure = Some(error);
        self
    }

    /// Fail only the next request with `error`
    pub fn fail_next(&self, error: KmsServiceError) {
        lock(&self.state).next_failure = Some(error);
    }

    /// Answer only the next `GenerateDataKey` request with `response`
    pub fn respond_next_data_key(&self, response: GenerateDataKeyResponse) {
        lock(&self.state).next_data_key = Some(response);
    }

    /// Number of requests received across all operations
    pub fn call_count(&self) -> usize {
        let state = lock(&self.state);
        state.sign_requests.len()
            + state.verify_requests.len()
            + state.generate_requests.len()
            + state.decrypt_requests.len()
    }

    pub fn sign_requests(&self) -> Vec<SignRequest> {
        lock(&self.state).sign_requests.clone()
    }

    pub fn verify_requests(&self) -> Vec<VerifyRequest> {
        lock(&self.state).verify_requests.clone()
    }

    pub fn generate_requests(&self) -> Vec<GenerateDataKeyRequest> {
        lock(&self.state).generate_requests.clone()
    }

    pub fn decrypt_requests(&self) -> Vec<DecryptRequest> {
        lock(&self.state).decrypt_requests.clone()
    }

    fn outcome<T>(&self, state: &mut MockState, response: T) -> Result<T, KmsServiceError> {
        if let Some(error) = state.next_failure.take() {
            return Err(error);
        }
        match &self.failure {
            Some(error) => Err(error.clone()),
            None => Ok(response),
        }
    }
}

#[async_trait]
impl KmsClient for MockKmsClient {
    async fn sign(&self, request: SignRequest) -> Result<SignResponse, KmsServiceError> {
        let mut state = lock(&self.state);
        state.sign_requests.push(request);
        self.outcome(&mut state, SignResponse { signature: self.signature.clone() })
    }

    async fn verify(&self, request: VerifyRequest) -> Result<VerifyResponse, KmsServiceError> {
        let mut state = lock(&self.state);
        state.verify_requests.push(request);
        self.outcome(&mut state, VerifyResponse { signature_valid: self.signature_valid })
    }

    async fn generate_data_key(
        &self,
        request: GenerateDataKeyRequest,
    ) -> Result<GenerateDataKeyResponse, KmsServiceError> {
        let mut state = lock(&self.state);
        state.generate_requests.push(request);
        let response = state.next_data_key.take().unwrap_or_else(|| self.data_key.clone());
        self.outcome(&mut state, response)
    }

    async fn decrypt(&self, request: DecryptRequest) -> Result<DecryptResponse, KmsServiceError> {
        let mut state = lock(&self.state);
        state.decrypt_requests.push(request);
        self.outcome(&mut state, DecryptResponse { plaintext: self.decrypted.clone() })
    }
}

/// Arguments of one [`JoseEngine::encrypt`] call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptCall {
    pub algorithm: String,
    pub key: Vec<u8>,
    pub plaintext: Vec<u8>,
    pub props: EncryptProperties,
}

/// [`JoseEngine`] that records its inputs and returns fixed outputs
#[derive(Default)]
pub struct RecordingEngine {
    digest: Vec<u8>,
    digest_calls: Mutex<Vec<(DigestAlgorithm, Vec<u8>)>>,
    encrypt_calls: Mutex<Vec<EncryptCall>>,
}

impl RecordingEngine {
    pub fn new() -> Self {
        Self { digest: b"DIGEST".to_vec(), ..Default::default() }
    }

    pub fn with_digest(mut self, digest: Vec<u8>) -> Self {
        self.digest = digest;
        self
    }

    /// The output every `encrypt` call returns
    pub fn encrypted_content() -> CipherOutput {
        CipherOutput {
            iv: b"iv".to_vec(),
            data: b"encrypted-content".to_vec(),
            tag: b"tag".to_vec(),
        }
    }

    pub fn digest_calls(&self) -> Vec<(DigestAlgorithm, Vec<u8>)> {
        lock(&self.digest_calls).clone()
    }

    pub fn encrypt_calls(&self) -> Vec<EncryptCall> {
        lock(&self.encrypt_calls).clone()
    }
}

impl JoseEngine for RecordingEngine {
    fn digest(&self, algorithm: DigestAlgorithm, data: &[u8]) -> KmsResult<Vec<u8>> {
        lock(&self.digest_calls).push((algorithm, data.to_vec()));
        Ok(self.digest.clone())
    }

    fn encrypt(
        &self,
        algorithm: &str,
        key: &[u8],
        plaintext: &[u8],
        props: &EncryptProperties,
    ) -> KmsResult<CipherOutput> {
        lock(&self.encrypt_calls).push(EncryptCall {
            algorithm: algorithm.to_string(),
            key: key.to_vec(),
            plaintext: plaintext.to_vec(),
            props: props.clone(),
        });
        Ok(Self::encrypted_content())
    }
}
