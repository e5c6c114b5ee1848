//! Error types for KMS-backed keys
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


use thiserror::Error;

pub const TRANSIENT_MESSAGE: &str = "A temporary exception was thrown from KMS.";
pub const VALIDATION_MESSAGE: &str = "A validation exception was thrown from KMS.";
pub const UNKNOWN_MESSAGE: &str = "An unknown exception was thrown from KMS.";

/// Errors surfaced to callers of the KMS key adapters
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KmsError {
    #[error("Invalid key format: {0}")]
    InvalidKeyFormat(String),

    #[error("Unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("Transient KMS error: {0}")]
    Transient(String),

    #[error("KMS validation error: {0}")]
    Validation(String),

    #[error("KMS error: {0}")]
    Generic(String),

    #[error("Data key not generated: call generate before encrypt")]
    DataKeyNotGenerated,

    #[error("Engine error: {0}")]
    Engine(String),

    #[error("Invalid key: {0}")]
    InvalidKey(String),
}

impl KmsError {
    /// Whether the caller may retry the failed operation with backoff
    pub fn is_retryable(&self) -> bool {
        matches!(self, KmsError::Transient(_))
    }
}

/// Result type for KMS key operations
pub type KmsResult<T> = Result<T, KmsError>;

/// Failures reported by the remote key-management service.
///
/// This is the closed set of provider exceptions the adapters understand;
/// anything the transport cannot place lands in [`KmsServiceError::Other`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KmsServiceError {
    #[error("DependencyTimeoutException: {0}")]
    DependencyTimeout(String),

    #[error("KeyUnavailableException: {0}")]
    KeyUnavailable(String),

    #[error("KMSInternalException: {0}")]
    KmsInternal(String),

    #[error("DisabledException: {0}")]
    Disabled(String),

    #[error("DryRunOperationException: {0}")]
    DryRunOperation(String),

    #[error("IncorrectKeyException: {0}")]
    IncorrectKey(String),

    #[error("InvalidGrantTokenException: {0}")]
    InvalidGrantToken(String),

    #[error("InvalidKeyUsageException: {0}")]
    InvalidKeyUsage(String),

    #[error("KMSInvalidSignatureException: {0}")]
    KmsInvalidSignature(String),

    #[error("KMSInvalidStateException: {0}")]
    KmsInvalidState(String),

    #[error("NotFoundException: {0}")]
    NotFound(String),

    #[error("{}", .message.as_deref().unwrap_or(UNKNOWN_MESSAGE))]
    Other {
        code: Option<String>,
        message: Option<String>,
    },
}

impl KmsServiceError {
    /// Map a provider error code (e.g. `KMSInternalException`) onto a variant
    pub fn from_code(code: Option<&str>, message: Option<&str>) -> Self {
        let msg = message.unwrap_or_default().to_string();
        match code {
            Some("DependencyTimeoutException") => KmsServiceError::DependencyTimeout(msg),
            Some("KeyUnavailableException") => KmsServiceError::KeyUnavailable(msg),
            Some("KMSInternalException") | Some("KmsInternalException") => {
                KmsServiceError::KmsInternal(msg)
            }
            Some("DisabledException") => KmsServiceError::Disabled(msg),
            Some("DryRunOperationException") => KmsServiceError::DryRunOperation(msg),
            Some("IncorrectKeyException") => KmsServiceError::IncorrectKey(msg),
            Some("InvalidGrantTokenException") => KmsServiceError::InvalidGrantToken(msg),
            Some("InvalidKeyUsageException") => KmsServiceError::InvalidKeyUsage(msg),
            Some("KMSInvalidSignatureException") | Some("KmsInvalidSignatureException") => {
                KmsServiceError::KmsInvalidSignature(msg)
            }
            Some("KMSInvalidStateException") | Some("KmsInvalidStateException") => {
                KmsServiceError::KmsInvalidState(msg)
            }
            Some("NotFoundException") => KmsServiceError::NotFound(msg),
            other => KmsServiceError::Other {
                code: other.map(str::to_string),
                message: message.map(str::to_string),
            },
        }
    }
}

/// Collapse a provider failure into the caller-facing taxonomy.
///
/// Transient conditions win over validation ones; everything else becomes
/// [`KmsError::Generic`] carrying the provider's message when there is one.
pub fn classify(error: &KmsServiceError) -> KmsError {
    use KmsServiceError::*;

    match error {
        DependencyTimeout(_) | KeyUnavailable(_) | KmsInternal(_) => {
            KmsError::Transient(TRANSIENT_MESSAGE.to_string())
        }
        Disabled(_)
        | DryRunOperation(_)
        | IncorrectKey(_)
        | InvalidGrantToken(_)
        | InvalidKeyUsage(_)
        | KmsInvalidSignature(_)
        | KmsInvalidState(_)
        | NotFound(_) => KmsError::Validation(VALIDATION_MESSAGE.to_string()),
        Other { message, .. } => KmsError::Generic(
            message
                .clone()
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| UNKNOWN_MESSAGE.to_string()),
        ),
    }
}

impl From<KmsServiceError> for KmsError {
    fn from(error: KmsServiceError) -> Self {
        classify(&error)
    }
}
