//! KMS-backed keys for a JOSE engine
//!
//! Adapts AWS KMS keys so they can stand in for local keys when producing
//! JWS signatures and JWE content encryption:
//! - [`KmsAsymmetricSigningKey`]: KMS `Sign`/`Verify` over a locally computed digest
//! - [`KmsSymmetricKey`]: unwraps content keys with KMS `Decrypt`
//! - [`KmsSymmetricCek`]: content keys from KMS `GenerateDataKey`
//!
//! [`KeyResolver`] lets the engine treat these adapters as keys.
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


pub mod algorithms;
pub mod aws;
pub mod digest;
pub mod engine;
pub mod error;
pub mod key_types;
pub mod kms;
pub mod resolver;
pub mod service_integration;
pub mod signing_key;
pub mod symmetric_cek;
pub mod symmetric_key;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use algorithms::{DigestAlgorithm, SigningAlgorithm, DIGEST_MESSAGE_TYPE};
pub use aws::AwsKmsClient;
pub use digest::digest_data;
pub use engine::{CipherOutput, EncryptProperties, JoseEngine, NativeEngine};
pub use error::{classify, KmsError, KmsResult, KmsServiceError};
pub use key_types::{DataKeyGenerationResult, KeyIdentifier, SigningResult, VerificationResult};
pub use kms::KmsClient;
pub use resolver::{ContentKey, Jwk, Key, KeyInput, KeyKind, KeyResolver, SigningKey, WrappingKey};
pub use service_integration::*;
pub use signing_key::KmsAsymmetricSigningKey;
pub use symmetric_cek::KmsSymmetricCek;
pub use symmetric_key::KmsSymmetricKey;
