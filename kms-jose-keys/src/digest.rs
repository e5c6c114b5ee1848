//! Pre-hashing of payloads before they are sent to KMS
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


use crate::algorithms::digest_algorithm_for;
use crate::engine::JoseEngine;
use crate::error::{KmsError, KmsResult};

/// Digest `data` the way KMS expects it for `signing_algorithm`.
///
/// KMS only receives digests (message type `DIGEST`), never raw payloads.
pub fn digest_data(
    engine: &dyn JoseEngine,
    signing_algorithm: &str,
    data: &[u8],
) -> KmsResult<Vec<u8>> {
    let digest_alg = digest_algorithm_for(signing_algorithm).ok_or_else(|| {
        KmsError::UnsupportedAlgorithm(format!("Unsupported algorithm: {}", signing_algorithm))
    })?;

    engine.digest(digest_alg, data)
}
