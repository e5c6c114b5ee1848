//! Integration tests against a real KMS
//!
//! These tests require:
//! - AWS credentials in the environment
//! - KMS_JOSE_SIGNING_KEY_ID: an RSA_2048 SIGN_VERIFY key
//! - KMS_JOSE_CEK_KEY_ID and KMS_JOSE_WRAPPING_KEY_ID: the same symmetric key

use kms_jose_config::KmsJoseConfig;
use kms_jose_keys::{
    cek_from_config, init_kms_client, signing_key_from_config, wrapping_key_from_config,
    EncryptProperties, NativeEngine,
};

#[tokio::test]
#[ignore] // Requires AWS credentials and KMS keys
async fn test_sign_and_verify_with_kms() {
    let config = KmsJoseConfig::from_env().expect("Failed to load configuration");
    let client = init_kms_client(&config).await;
    let key = signing_key_from_config(&config, client).expect("signing key");

    let signed = key.sign("RSASSA_PSS_SHA_256", b"payload").await.expect("sign");
    let signature = signed.mac.expect("signature");

    let verified = key.verify("RSASSA_PSS_SHA_256", b"payload", &signature).await.expect("verify");
    assert_eq!(verified.mac, Some(true));

    let tampered = key.verify("RSASSA_PSS_SHA_256", b"other", &signature).await;
    // KMS reports a bad signature as KMSInvalidSignatureException
    assert!(tampered.is_err() || tampered.unwrap().mac == Some(false));
}

#[tokio::test]
#[ignore] // Requires AWS credentials and KMS keys
async fn test_data_key_round_trip_with_kms() {
    let config = KmsJoseConfig::from_env().expect("Failed to load configuration");
    let client = init_kms_client(&config).await;
    let cek = cek_from_config(&config, client.clone()).expect("cek");
    let wrapping = wrapping_key_from_config(&config, client).expect("wrapping key");

    let generated = cek.generate().await.expect("generate");
    let sealed = cek
        .encrypt("A256GCM", b"content", &EncryptProperties::default())
        .await
        .expect("encrypt");

    let blob = generated.data.expect("ciphertext blob");
    let key = wrapping
        .unwrap(&config.encryption_algorithm, &blob)
        .await
        .expect("unwrap")
        .expect("plaintext");

    let opened = NativeEngine::new().decrypt("A256GCM", &key, &sealed, None).expect("decrypt");
    assert_eq!(opened, b"content".to_vec());
}
