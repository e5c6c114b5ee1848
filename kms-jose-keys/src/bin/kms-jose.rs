//! kms-jose command line
//!
//! Runs single KMS key operations using the `KMS_JOSE_*` configuration.
//! Binary inputs and outputs are hex encoded.
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


use anyhow::{bail, Context, Result};
use kms_jose_config::KmsJoseConfig;
use kms_jose_keys::{
    cek_from_config, init_kms_client, signing_key_from_config, wrapping_key_from_config,
};
use kms_jose_logging::{init_logging, LogFormat};
use std::env;
use tracing::info;

const USAGE: &str = "usage: kms-jose <command> [args]

commands:
  sign <payload>                 sign a UTF-8 payload, print the signature
  verify <payload> <sig-hex>     verify a signature over a UTF-8 payload
  generate-data-key              generate a data key, print its wrapped form
  unwrap <blob-hex>              decrypt a wrapped data key";

/// A parsed command line, validated before any AWS configuration is loaded
#[derive(Debug, PartialEq, Eq)]
enum Command {
    Sign { payload: String },
    Verify { payload: String, signature: Vec<u8> },
    GenerateDataKey,
    Unwrap { blob: Vec<u8> },
}

impl Command {
    fn parse(args: &[String]) -> Result<Self> {
        let Some((name, rest)) = args.split_first() else {
            bail!(USAGE);
        };

        let command = match (name.as_str(), rest) {
            ("sign", [payload]) => Command::Sign { payload: payload.clone() },
            ("verify", [payload, signature]) => Command::Verify {
                payload: payload.clone(),
                signature: hex::decode(signature).context("Signature is not valid hex")?,
            },
            ("generate-data-key", []) => Command::GenerateDataKey,
            ("unwrap", [blob]) => Command::Unwrap {
                blob: hex::decode(blob).context("Wrapped key is not valid hex")?,
            },
            _ => bail!(USAGE),
        };
        Ok(command)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = env::args().skip(1).collect();
    let command = Command::parse(&args)?;

    // Load configuration
    let config = KmsJoseConfig::from_env().context("Failed to load configuration")?;

    let format: LogFormat = config.log_format.parse()?;
    init_logging("kms-jose", config.log_level(), format)?;

    let client = init_kms_client(&config).await;

    match &command {
        Command::Sign { payload } => {
            let key = signing_key_from_config(&config, client)?;
            let result = key.sign(&config.signing_algorithm, payload.as_bytes()).await?;
            let signature = result.mac.context("KMS returned no signature")?;
            println!("{}", hex::encode(signature));
        }
        Command::Verify { payload, signature } => {
            let key = signing_key_from_config(&config, client)?;
            let result = key
                .verify(&config.signing_algorithm, payload.as_bytes(), signature)
                .await?;
            let verdict = match result.mac {
                Some(true) => "valid",
                Some(false) => "invalid",
                None => "unknown",
            };
            println!("{}", verdict);
        }
        Command::GenerateDataKey => {
            let cek = cek_from_config(&config, client)?;
            let result = cek.generate().await?;
            let blob = result.data.context("KMS returned no ciphertext blob")?;
            println!("{}", hex::encode(blob));
        }
        Command::Unwrap { blob } => {
            let key = wrapping_key_from_config(&config, client)?;
            let plaintext = key
                .unwrap(&config.encryption_algorithm, blob)
                .await?
                .context("KMS returned no plaintext")?;
            println!("{}", hex::encode(plaintext));
        }
    }

    info!(command = ?command, "Command completed");
    Ok(())
}
