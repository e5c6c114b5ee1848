//! Key identifier and operation result types
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


use crate::error::{KmsError, KmsResult};
use serde::{Deserialize, Serialize};
use std::fmt;

const KEY_FORMAT_MESSAGE: &str = "Provided key isn't supported by KMS. \
    Expected a string with key-id, key-id ARN, key-alias, or key-alias ARN.";

/// Whitespace as matched by `\s` in JavaScript regular expressions.
///
/// Unicode `White_Space` minus U+0085, plus the byte order mark U+FEFF.
fn is_js_whitespace(c: char) -> bool {
    match c {
        '\u{FEFF}' => true,
        '\u{0085}' => false,
        c => c.is_whitespace(),
    }
}

/// Check that an identifier can be sent to KMS as a `KeyId`
pub fn validate_key_format(key: &str) -> KmsResult<()> {
    if key.is_empty() || key.chars().any(is_js_whitespace) {
        return Err(KmsError::InvalidKeyFormat(KEY_FORMAT_MESSAGE.to_string()));
    }
    Ok(())
}

/// A KMS key id, key ARN, alias name, or alias ARN.
///
/// Only constructible through validation, so holding one means the
/// identifier is non-empty and free of whitespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct KeyIdentifier(String);

impl KeyIdentifier {
    pub fn parse(key: impl Into<String>) -> KmsResult<Self> {
        let key = key.into();
        validate_key_format(&key)?;
        Ok(Self(key))
    }

    /// Validate an identifier coming from untyped JSON input
    pub fn from_value(value: &serde_json::Value) -> KmsResult<Self> {
        match value {
            serde_json::Value::String(s) => Self::parse(s.as_str()),
            _ => Err(KmsError::InvalidKeyFormat(KEY_FORMAT_MESSAGE.to_string())),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<&str> for KeyIdentifier {
    type Error = KmsError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl TryFrom<String> for KeyIdentifier {
    type Error = KmsError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl<'de> Deserialize<'de> for KeyIdentifier {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Self::parse(raw).map_err(serde::de::Error::custom)
    }
}

impl AsRef<str> for KeyIdentifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for KeyIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Outcome of a remote sign call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SigningResult {
    pub mac: Option<Vec<u8>>,
}

/// Outcome of a remote verify call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationResult {
    pub mac: Option<bool>,
}

/// Ciphertext blob of a freshly generated data key.
///
/// This is also the wrapped-key form handed back by
/// [`KmsSymmetricKey::wrap`](crate::symmetric_key::KmsSymmetricKey::wrap).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataKeyGenerationResult {
    pub data: Option<Vec<u8>>,
}
