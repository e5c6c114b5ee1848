//! AWS KMS transport built on `aws-sdk-kms`
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
use crate::kms::{
    DecryptRequest, DecryptResponse, GenerateDataKeyRequest, GenerateDataKeyResponse, KmsClient,
    SignRequest, SignResponse, VerifyRequest, VerifyResponse,
};
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_kms::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_kms::primitives::Blob;
use aws_sdk_kms::types::{DataKeySpec, EncryptionAlgorithmSpec, MessageType, SigningAlgorithmSpec};
use std::error::Error;
use std::fmt::Debug;
use tracing::info;

/// [`KmsClient`] backed by the AWS SDK
#[derive(Debug, Clone)]
pub struct AwsKmsClient {
    client: aws_sdk_kms::Client,
}

impl AwsKmsClient {
    pub fn new(client: aws_sdk_kms::Client) -> Self {
        Self { client }
    }

    /// Load credentials and region from the environment.
    ///
    /// `region` and `endpoint_url` override what the default provider chain
    /// resolves; the endpoint is mostly useful against local KMS emulators.
    pub async fn load(region: Option<&str>, endpoint_url: Option<&str>) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = region {
            loader = loader.region(aws_config::Region::new(region.to_string()));
        }
        if let Some(endpoint_url) = endpoint_url {
            loader = loader.endpoint_url(endpoint_url);
        }
        let sdk_config = loader.load().await;

        info!(
            region = ?sdk_config.region(),
            endpoint = endpoint_url.unwrap_or("default"),
            "AWS KMS client initialized"
        );

        Self::new(aws_sdk_kms::Client::new(&sdk_config))
    }
}

/// Turn an SDK failure into the closed provider error set
fn service_error<E, R>(error: SdkError<E, R>) -> KmsServiceError
where
    E: ProvideErrorMetadata + Error + 'static,
    R: Debug,
{
    match error.as_service_error() {
        Some(service) => KmsServiceError::from_code(service.code(), service.message()),
        None => KmsServiceError::Other {
            code: None,
            message: Some(DisplayErrorContext(&error).to_string()),
        },
    }
}

#[async_trait]
impl KmsClient for AwsKmsClient {
    async fn sign(&self, request: SignRequest) -> Result<SignResponse, KmsServiceError> {
        let output = self
            .client
            .sign()
            .key_id(request.key_id)
            .message(Blob::new(request.message))
            .message_type(MessageType::from(request.message_type.as_str()))
            .signing_algorithm(SigningAlgorithmSpec::from(request.signing_algorithm.as_str()))
            .send()
            .await
            .map_err(service_error)?;

        Ok(SignResponse {
            signature: output.signature().map(|blob| blob.as_ref().to_vec()),
        })
    }

    async fn verify(&self, request: VerifyRequest) -> Result<VerifyResponse, KmsServiceError> {
        let output = self
            .client
            .verify()
            .key_id(request.key_id)
            .message(Blob::new(request.message))
            .message_type(MessageType::from(request.message_type.as_str()))
            .signature(Blob::new(request.signature))
            .signing_algorithm(SigningAlgorithmSpec::from(request.signing_algorithm.as_str()))
            .send()
            .await
            .map_err(service_error)?;

        Ok(VerifyResponse {
            signature_valid: Some(output.signature_valid()),
        })
    }

    async fn generate_data_key(
        &self,
        request: GenerateDataKeyRequest,
    ) -> Result<GenerateDataKeyResponse, KmsServiceError> {
        let output = self
            .client
            .generate_data_key()
            .key_id(request.key_id)
            .key_spec(DataKeySpec::from(request.key_spec.as_str()))
            .send()
            .await
            .map_err(service_error)?;

        Ok(GenerateDataKeyResponse {
            plaintext: output.plaintext().map(|blob| blob.as_ref().to_vec()),
            ciphertext_blob: output.ciphertext_blob().map(|blob| blob.as_ref().to_vec()),
        })
    }

    async fn decrypt(&self, request: DecryptRequest) -> Result<DecryptResponse, KmsServiceError> {
        let output = self
            .client
            .decrypt()
            .ciphertext_blob(Blob::new(request.ciphertext_blob))
            .key_id(request.key_id)
            .encryption_algorithm(EncryptionAlgorithmSpec::from(
                request.encryption_algorithm.as_str(),
            ))
            .send()
            .await
            .map_err(service_error)?;

        Ok(DecryptResponse {
            plaintext: output.plaintext().map(|blob| blob.as_ref().to_vec()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{classify, KmsError};

    #[tokio::test]
    #[ignore] // Requires AWS credentials and a KMS signing key in KMS_JOSE_SIGNING_KEY_ID
    async fn test_sign_against_aws() {
        let key_id = std::env::var("KMS_JOSE_SIGNING_KEY_ID").expect("KMS_JOSE_SIGNING_KEY_ID");
        let client = AwsKmsClient::load(None, None).await;

        let response = client
            .sign(SignRequest {
                key_id,
                message: vec![0u8; 32],
                message_type: "DIGEST".to_string(),
                signing_algorithm: "RSASSA_PSS_SHA_256".to_string(),
            })
            .await
            .expect("sign failed");

        assert!(response.signature.is_some());
    }

    #[tokio::test]
    #[ignore] // Requires AWS credentials
    async fn test_unknown_key_is_validation_error() {
        let client = AwsKmsClient::load(None, None).await;

        let error = client
            .decrypt(DecryptRequest {
                ciphertext_blob: vec![1, 2, 3],
                key_id: "alias/kms-jose-does-not-exist".to_string(),
                encryption_algorithm: "SYMMETRIC_DEFAULT".to_string(),
            })
            .await
            .expect_err("decrypt should fail");

        assert!(matches!(classify(&error), KmsError::Validation(_) | KmsError::Generic(_)));
    }
}
