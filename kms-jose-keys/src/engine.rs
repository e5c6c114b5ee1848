//! JOSE engine primitives the adapters delegate to
//!
//! The adapters never hash or encrypt by themselves. Digesting before a remote
//! sign and sealing content with a generated data key both go through a
//! [`JoseEngine`], so a pipeline can plug in its own primitive library.
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
use crate::error::{KmsError, KmsResult};
use aes_gcm::{
    aead::{consts::U12, Aead, AeadCore, KeyInit, OsRng, Payload},
    Aes128Gcm, Aes256Gcm, Nonce,
};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256, Sha384, Sha512};

const GCM_IV_LEN: usize = 12;
const GCM_TAG_LEN: usize = 16;

/// Extra inputs for content encryption
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptProperties {
    /// Initialization vector; generated when absent
    pub iv: Option<Vec<u8>>,
    /// Additional authenticated data (the JWE protected header)
    pub aad: Option<Vec<u8>>,
}

/// Sealed content as produced by the engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CipherOutput {
    pub iv: Vec<u8>,
    pub data: Vec<u8>,
    pub tag: Vec<u8>,
}

/// Digest and cipher primitives of a JOSE engine
pub trait JoseEngine: Send + Sync {
    /// Hash `data` with the given digest algorithm
    fn digest(&self, algorithm: DigestAlgorithm, data: &[u8]) -> KmsResult<Vec<u8>>;

    /// Encrypt `plaintext` under `key` with a JWE content encryption algorithm
    fn encrypt(
        &self,
        algorithm: &str,
        key: &[u8],
        plaintext: &[u8],
        props: &EncryptProperties,
    ) -> KmsResult<CipherOutput>;
}

/// Engine backed by the RustCrypto `sha2` and `aes-gcm` crates.
///
/// Supports the `A128GCM` and `A256GCM` content encryption algorithms.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeEngine;

impl NativeEngine {
    pub fn new() -> Self {
        Self
    }

    /// Open content sealed by [`JoseEngine::encrypt`]
    pub fn decrypt(
        &self,
        algorithm: &str,
        key: &[u8],
        output: &CipherOutput,
        aad: Option<&[u8]>,
    ) -> KmsResult<Vec<u8>> {
        match algorithm {
            "A128GCM" => open::<Aes128Gcm>(key, output, aad),
            "A256GCM" => open::<Aes256Gcm>(key, output, aad),
            other => Err(KmsError::Engine(format!(
                "Unsupported content encryption algorithm: {}",
                other
            ))),
        }
    }
}

impl JoseEngine for NativeEngine {
    fn digest(&self, algorithm: DigestAlgorithm, data: &[u8]) -> KmsResult<Vec<u8>> {
        let digest = match algorithm {
            DigestAlgorithm::Sha256 => Sha256::digest(data).to_vec(),
            DigestAlgorithm::Sha384 => Sha384::digest(data).to_vec(),
            DigestAlgorithm::Sha512 => Sha512::digest(data).to_vec(),
        };
        Ok(digest)
    }

    fn encrypt(
        &self,
        algorithm: &str,
        key: &[u8],
        plaintext: &[u8],
        props: &EncryptProperties,
    ) -> KmsResult<CipherOutput> {
        match algorithm {
            "A128GCM" => seal::<Aes128Gcm>(key, plaintext, props),
            "A256GCM" => seal::<Aes256Gcm>(key, plaintext, props),
            other => Err(KmsError::Engine(format!(
                "Unsupported content encryption algorithm: {}",
                other
            ))),
        }
    }
}

fn seal<C>(key: &[u8], plaintext: &[u8], props: &EncryptProperties) -> KmsResult<CipherOutput>
where
    C: Aead + AeadCore<NonceSize = U12> + KeyInit,
{
    let cipher = C::new_from_slice(key)
        .map_err(|_| KmsError::Engine(format!("Invalid content key length: {}", key.len())))?;

    let iv = match &props.iv {
        Some(iv) if iv.len() == GCM_IV_LEN => iv.clone(),
        Some(iv) => {
            return Err(KmsError::Engine(format!("Invalid IV length: {}", iv.len())));
        }
        None => C::generate_nonce(&mut OsRng).to_vec(),
    };

    let payload = Payload {
        msg: plaintext,
        aad: props.aad.as_deref().unwrap_or_default(),
    };
    let mut sealed = cipher
        .encrypt(Nonce::from_slice(&iv), payload)
        .map_err(|e| KmsError::Engine(format!("Encryption failed: {}", e)))?;

    // aes-gcm appends the tag to the ciphertext
    let tag = sealed.split_off(sealed.len() - GCM_TAG_LEN);

    Ok(CipherOutput { iv, data: sealed, tag })
}

fn open<C>(key: &[u8], output: &CipherOutput, aad: Option<&[u8]>) -> KmsResult<Vec<u8>>
where
    C: Aead + AeadCore<NonceSize = U12> + KeyInit,
{
    if output.iv.len() != GCM_IV_LEN {
        return Err(KmsError::Engine(format!("Invalid IV length: {}", output.iv.len())));
    }
    let cipher = C::new_from_slice(key)
        .map_err(|_| KmsError::Engine(format!("Invalid content key length: {}", key.len())))?;

    let mut sealed = output.data.clone();
    sealed.extend_from_slice(&output.tag);

    cipher
        .decrypt(
            Nonce::from_slice(&output.iv),
            Payload { msg: &sealed, aad: aad.unwrap_or_default() },
        )
        .map_err(|e| KmsError::Engine(format!("Decryption failed: {}", e)))
}
