//! Key capabilities and key resolution for the JOSE pipeline
//!
//! The pipeline works against [`Key`] rather than a concrete key type. Native
//! JWKs and the three KMS adapters all implement it, and [`KeyResolver`]
//! decides what counts as a key and turns raw input into one.
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


use crate::engine::{CipherOutput, EncryptProperties};
use crate::error::{KmsError, KmsResult};
use crate::key_types::{DataKeyGenerationResult, SigningResult, VerificationResult};
use crate::signing_key::KmsAsymmetricSigningKey;
use crate::symmetric_cek::KmsSymmetricCek;
use crate::symmetric_key::KmsSymmetricKey;
use async_trait::async_trait;
use serde_json::Value;
use std::fmt;
use std::sync::{Arc, OnceLock};
use tracing::debug;

/// What a key is backed by
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyKind {
    Native,
    KmsAsymmetricSigning,
    KmsSymmetricWrapping,
    KmsSymmetricCek,
}

impl KeyKind {
    pub fn is_kms(&self) -> bool {
        !matches!(self, KeyKind::Native)
    }
}

/// Sign and verify capability
#[async_trait]
pub trait SigningKey: Send + Sync {
    async fn sign(&self, algorithm: &str, data: &[u8]) -> KmsResult<SigningResult>;

    async fn verify(
        &self,
        algorithm: &str,
        data: &[u8],
        signature: &[u8],
    ) -> KmsResult<VerificationResult>;
}

/// Wrap and unwrap capability for content keys
#[async_trait]
pub trait WrappingKey: Send + Sync {
    fn wrap(&self, algorithm: &str, data_key: DataKeyGenerationResult) -> DataKeyGenerationResult;

    async fn unwrap(&self, algorithm: &str, wrapped_key: &[u8]) -> KmsResult<Option<Vec<u8>>>;
}

/// Generate-then-encrypt capability for content encryption keys
#[async_trait]
pub trait ContentKey: Send + Sync {
    async fn generate(&self) -> KmsResult<DataKeyGenerationResult>;

    async fn encrypt(
        &self,
        algorithm: &str,
        data: &[u8],
        props: &EncryptProperties,
    ) -> KmsResult<CipherOutput>;
}

/// A key the JOSE pipeline accepts
pub trait Key: Send + Sync + fmt::Debug {
    fn kind(&self) -> KeyKind;

    /// Key id (`kid`) when the key has one
    fn kid(&self) -> Option<&str>;

    fn as_signing_key(&self) -> Option<&dyn SigningKey> {
        None
    }

    fn as_wrapping_key(&self) -> Option<&dyn WrappingKey> {
        None
    }

    fn as_content_key(&self) -> Option<&dyn ContentKey> {
        None
    }
}

#[async_trait]
impl SigningKey for KmsAsymmetricSigningKey {
    async fn sign(&self, algorithm: &str, data: &[u8]) -> KmsResult<SigningResult> {
        KmsAsymmetricSigningKey::sign(self, algorithm, data).await
    }

    async fn verify(
        &self,
        algorithm: &str,
        data: &[u8],
        signature: &[u8],
    ) -> KmsResult<VerificationResult> {
        KmsAsymmetricSigningKey::verify(self, algorithm, data, signature).await
    }
}

impl Key for KmsAsymmetricSigningKey {
    fn kind(&self) -> KeyKind {
        KeyKind::KmsAsymmetricSigning
    }

    fn kid(&self) -> Option<&str> {
        Some(self.key_id().as_str())
    }

    fn as_signing_key(&self) -> Option<&dyn SigningKey> {
        Some(self)
    }
}

#[async_trait]
impl WrappingKey for KmsSymmetricKey {
    fn wrap(&self, algorithm: &str, data_key: DataKeyGenerationResult) -> DataKeyGenerationResult {
        KmsSymmetricKey::wrap(self, algorithm, data_key)
    }

    async fn unwrap(&self, algorithm: &str, wrapped_key: &[u8]) -> KmsResult<Option<Vec<u8>>> {
        KmsSymmetricKey::unwrap(self, algorithm, wrapped_key).await
    }
}

impl Key for KmsSymmetricKey {
    fn kind(&self) -> KeyKind {
        KeyKind::KmsSymmetricWrapping
    }

    fn kid(&self) -> Option<&str> {
        Some(self.key_id().as_str())
    }

    fn as_wrapping_key(&self) -> Option<&dyn WrappingKey> {
        Some(self)
    }
}

#[async_trait]
impl ContentKey for KmsSymmetricCek {
    async fn generate(&self) -> KmsResult<DataKeyGenerationResult> {
        KmsSymmetricCek::generate(self).await
    }

    async fn encrypt(
        &self,
        algorithm: &str,
        data: &[u8],
        props: &EncryptProperties,
    ) -> KmsResult<CipherOutput> {
        KmsSymmetricCek::encrypt(self, algorithm, data, props).await
    }
}

impl Key for KmsSymmetricCek {
    fn kind(&self) -> KeyKind {
        KeyKind::KmsSymmetricCek
    }

    fn kid(&self) -> Option<&str> {
        Some(self.key_id().as_str())
    }

    fn as_content_key(&self) -> Option<&dyn ContentKey> {
        Some(self)
    }
}

const KNOWN_KEY_TYPES: [&str; 4] = ["oct", "RSA", "EC", "OKP"];

/// A JSON Web Key handled by the engine itself
#[derive(Debug, Clone, PartialEq)]
pub struct Jwk {
    kty: String,
    kid: Option<String>,
}

impl Jwk {
    pub fn from_value(value: &Value) -> KmsResult<Self> {
        let params = value
            .as_object()
            .ok_or_else(|| KmsError::InvalidKey("JWK must be a JSON object".to_string()))?;

        let kty = params
            .get("kty")
            .and_then(Value::as_str)
            .ok_or_else(|| KmsError::InvalidKey("JWK is missing \"kty\"".to_string()))?;

        if !KNOWN_KEY_TYPES.contains(&kty) {
            return Err(KmsError::InvalidKey(format!("Unsupported key type: {}", kty)));
        }

        Ok(Self {
            kty: kty.to_string(),
            kid: params.get("kid").and_then(Value::as_str).map(str::to_string),
        })
    }

    pub fn kty(&self) -> &str {
        &self.kty
    }
}

impl Key for Jwk {
    fn kind(&self) -> KeyKind {
        KeyKind::Native
    }

    fn kid(&self) -> Option<&str> {
        self.kid.as_deref()
    }
}

/// Input handed to the pipeline wherever it expects a key
#[derive(Debug, Clone)]
pub enum KeyInput {
    /// An already constructed key
    Key(Arc<dyn Key>),
    /// Raw JWK material
    Jwk(Value),
}

impl From<Arc<KmsAsymmetricSigningKey>> for KeyInput {
    fn from(key: Arc<KmsAsymmetricSigningKey>) -> Self {
        KeyInput::Key(key)
    }
}

impl From<Arc<KmsSymmetricKey>> for KeyInput {
    fn from(key: Arc<KmsSymmetricKey>) -> Self {
        KeyInput::Key(key)
    }
}

impl From<Arc<KmsSymmetricCek>> for KeyInput {
    fn from(key: Arc<KmsSymmetricCek>) -> Self {
        KeyInput::Key(key)
    }
}

impl From<Arc<dyn Key>> for KeyInput {
    fn from(key: Arc<dyn Key>) -> Self {
        KeyInput::Key(key)
    }
}

impl From<Value> for KeyInput {
    fn from(value: Value) -> Self {
        KeyInput::Jwk(value)
    }
}

static INSTALLED: OnceLock<KeyResolver> = OnceLock::new();

/// Decides what the pipeline accepts as a key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyResolver {
    kms_keys: bool,
}

impl KeyResolver {
    /// Resolver that only knows the engine's own keys
    pub fn native() -> Self {
        Self { kms_keys: false }
    }

    /// Also accept the KMS adapters. Applying it twice changes nothing.
    pub fn with_kms_keys(self) -> Self {
        Self { kms_keys: true }
    }

    /// The process-wide resolver with KMS keys enabled.
    ///
    /// Initialized on first call; later calls return the same instance.
    pub fn install() -> &'static KeyResolver {
        INSTALLED.get_or_init(|| {
            debug!("Installing KMS key resolver");
            KeyResolver::native().with_kms_keys()
        })
    }

    pub fn accepts_kms_keys(&self) -> bool {
        self.kms_keys
    }

    pub fn is_key(&self, input: &KeyInput) -> bool {
        match input {
            KeyInput::Key(key) if key.kind().is_kms() => self.kms_keys,
            KeyInput::Key(_) => true,
            KeyInput::Jwk(value) => Jwk::from_value(value).is_ok(),
        }
    }

    /// Coerce input into a key; KMS adapters come back as the same instance
    pub fn as_key(&self, input: KeyInput) -> KmsResult<Arc<dyn Key>> {
        match input {
            KeyInput::Key(key) if key.kind().is_kms() && !self.kms_keys => Err(
                KmsError::InvalidKey("KMS-backed keys are not enabled on this resolver".to_string()),
            ),
            KeyInput::Key(key) => Ok(key),
            KeyInput::Jwk(value) => Ok(Arc::new(Jwk::from_value(&value)?)),
        }
    }
}

impl Default for KeyResolver {
    fn default() -> Self {
        Self::native()
    }
}
