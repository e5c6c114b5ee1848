//! Integration tests for content encryption with KMS data keys
//!
//! Covers the generate, encrypt, wrap and unwrap sequence a JWE producer and
//! consumer go through, using the in-memory KMS client.

use kms_jose_config::KmsJoseConfig;
use kms_jose_keys::testing::{MockKmsClient, INVALID_KMS_KEY_ID, VALID_KMS_KEY_ID};
use kms_jose_keys::{
    cek_from_config, wrapping_key_from_config, EncryptProperties, Key, KeyKind, KeyResolver,
    KmsClient, KmsError, KmsServiceError, KmsSymmetricCek, KmsSymmetricKey, NativeEngine,
};
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;

const DATA_KEY: [u8; 32] = [7u8; 32];
const WRAPPED_KEY: &[u8] = b"kms-ciphertext-blob";
const CONTENT: &[u8] = b"signed compact JWS goes here";
const PROTECTED_HEADER: &[u8] = b"eyJhbGciOiJkaXIiLCJlbmMiOiJBMjU2R0NNIn0";

fn kms() -> Arc<MockKmsClient> {
    Arc::new(
        MockKmsClient::new()
            .with_data_key(DATA_KEY.to_vec(), WRAPPED_KEY.to_vec())
            .with_decrypted(DATA_KEY.to_vec()),
    )
}

#[tokio::test]
async fn test_encrypt_then_unwrap_and_decrypt() {
    let client = kms();
    let cek = KmsSymmetricCek::new(VALID_KMS_KEY_ID, client.clone(), "AES_256").unwrap();
    let wrapping = KmsSymmetricKey::new(VALID_KMS_KEY_ID, client.clone()).unwrap();

    // Producer side
    let generated = cek.generate().await.unwrap();
    let props = EncryptProperties { iv: None, aad: Some(PROTECTED_HEADER.to_vec()) };
    let sealed = cek.encrypt("A256GCM", CONTENT, &props).await.unwrap();
    let wrapped = wrapping.wrap("SYMMETRIC_DEFAULT", generated.clone());
    assert_eq!(wrapped, generated);
    assert_eq!(wrapped.data.as_deref(), Some(WRAPPED_KEY));
    assert_ne!(sealed.data, CONTENT.to_vec());

    // Consumer side
    let unwrapped = wrapping
        .unwrap("SYMMETRIC_DEFAULT", wrapped.data.as_deref().unwrap())
        .await
        .unwrap()
        .unwrap();
    let opened = NativeEngine::new()
        .decrypt("A256GCM", &unwrapped, &sealed, Some(PROTECTED_HEADER))
        .unwrap();
    assert_eq!(opened, CONTENT.to_vec());

    let decrypt = client.decrypt_requests().pop().unwrap();
    assert_eq!(decrypt.ciphertext_blob, WRAPPED_KEY.to_vec());
    assert_eq!(decrypt.key_id, VALID_KMS_KEY_ID);
    assert_eq!(decrypt.encryption_algorithm, "SYMMETRIC_DEFAULT");
    assert_eq!(client.generate_requests()[0].key_spec, "AES_256");
}

#[tokio::test]
async fn test_tampered_header_fails_to_decrypt() {
    let client = kms();
    let cek = KmsSymmetricCek::new(VALID_KMS_KEY_ID, client, "AES_256").unwrap();
    cek.generate().await.unwrap();

    let props = EncryptProperties { iv: None, aad: Some(PROTECTED_HEADER.to_vec()) };
    let sealed = cek.encrypt("A256GCM", CONTENT, &props).await.unwrap();

    let result = NativeEngine::new().decrypt("A256GCM", &DATA_KEY, &sealed, Some(b"other"));
    assert!(matches!(result, Err(KmsError::Engine(_))));
}

#[tokio::test]
async fn test_encrypt_requires_generated_data_key() {
    let cek = KmsSymmetricCek::new(VALID_KMS_KEY_ID, kms(), "AES_256").unwrap();

    let result = cek.encrypt("A256GCM", CONTENT, &EncryptProperties::default()).await;
    assert_eq!(result, Err(KmsError::DataKeyNotGenerated));
}

#[tokio::test]
async fn test_regenerate_replaces_data_key() {
    let client = kms();
    let cek = KmsSymmetricCek::new(VALID_KMS_KEY_ID, client.clone(), "AES_256").unwrap();

    cek.generate().await.unwrap();
    cek.generate().await.unwrap();

    assert_eq!(client.generate_requests().len(), 2);
    assert!(cek.is_ready().await);
}

#[tokio::test]
async fn test_unwrap_failure_is_classified() {
    let client = Arc::new(
        MockKmsClient::new().failing_with(KmsServiceError::IncorrectKey("wrong key".into())),
    );
    let wrapping = KmsSymmetricKey::new(VALID_KMS_KEY_ID, client).unwrap();

    let result = wrapping.unwrap("SYMMETRIC_DEFAULT", WRAPPED_KEY).await;
    assert!(matches!(result, Err(KmsError::Validation(_))));

    let client = Arc::new(MockKmsClient::new().failing_with(KmsServiceError::Other {
        code: Some("ThrottlingException".into()),
        message: Some("Rate exceeded".into()),
    }));
    let wrapping = KmsSymmetricKey::new(VALID_KMS_KEY_ID, client).unwrap();

    let result = wrapping.unwrap("SYMMETRIC_DEFAULT", WRAPPED_KEY).await;
    assert_eq!(result, Err(KmsError::Generic("Rate exceeded".into())));
}

#[tokio::test]
async fn test_resolver_hands_out_kms_capabilities() {
    let client = kms();
    let cek: Arc<dyn Key> =
        Arc::new(KmsSymmetricCek::new(VALID_KMS_KEY_ID, client.clone(), "AES_256").unwrap());
    let wrapping: Arc<dyn Key> =
        Arc::new(KmsSymmetricKey::new(VALID_KMS_KEY_ID, client.clone()).unwrap());

    let resolver = KeyResolver::install();
    let cek = resolver.as_key(cek.into()).unwrap();
    let wrapping = resolver.as_key(wrapping.into()).unwrap();
    assert_eq!(cek.kind(), KeyKind::KmsSymmetricCek);
    assert_eq!(wrapping.kind(), KeyKind::KmsSymmetricWrapping);

    let content_key = cek.as_content_key().unwrap();
    let generated = content_key.generate().await.unwrap();
    let sealed = content_key
        .encrypt("A256GCM", CONTENT, &EncryptProperties::default())
        .await
        .unwrap();

    let key_wrapper = wrapping.as_wrapping_key().unwrap();
    let wrapped = key_wrapper.wrap("SYMMETRIC_DEFAULT", generated);
    let unwrapped = key_wrapper
        .unwrap("SYMMETRIC_DEFAULT", wrapped.data.as_deref().unwrap())
        .await
        .unwrap()
        .unwrap();

    let opened = NativeEngine::new().decrypt("A256GCM", &unwrapped, &sealed, None).unwrap();
    assert_eq!(opened, CONTENT.to_vec());

    // Native JWKs still resolve after installation
    let native = resolver.as_key(json!({ "kty": "oct", "k": "AAAA" }).into()).unwrap();
    assert_eq!(native.kind(), KeyKind::Native);
}

#[tokio::test]
async fn test_keys_built_from_configuration() {
    let vars: HashMap<String, String> = [
        ("KMS_JOSE_WRAPPING_KEY_ID", VALID_KMS_KEY_ID),
        ("KMS_JOSE_CEK_KEY_ID", VALID_KMS_KEY_ID),
        ("KMS_JOSE_DATA_KEY_SPEC", "AES_128"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();
    let config = KmsJoseConfig::from_vars(vars).unwrap();

    let client = Arc::new(
        MockKmsClient::new()
            .with_data_key(vec![3u8; 16], WRAPPED_KEY.to_vec())
            .with_decrypted(vec![3u8; 16]),
    );
    let shared: Arc<dyn KmsClient> = client.clone();

    let cek = cek_from_config(&config, shared.clone()).unwrap();
    let wrapping = wrapping_key_from_config(&config, shared).unwrap();

    cek.generate().await.unwrap();
    let sealed = cek.encrypt("A128GCM", CONTENT, &EncryptProperties::default()).await.unwrap();
    let key = wrapping.unwrap(&config.encryption_algorithm, WRAPPED_KEY).await.unwrap().unwrap();

    assert_eq!(NativeEngine::new().decrypt("A128GCM", &key, &sealed, None).unwrap(), CONTENT);
    assert_eq!(client.generate_requests()[0].key_spec, "AES_128");
}

#[test]
fn test_invalid_key_ids_rejected_for_all_adapters() {
    let client = kms();
    assert!(matches!(
        KmsSymmetricKey::new(INVALID_KMS_KEY_ID, client.clone()),
        Err(KmsError::InvalidKeyFormat(_))
    ));
    assert!(matches!(
        KmsSymmetricCek::new(INVALID_KMS_KEY_ID, client, "AES_256"),
        Err(KmsError::InvalidKeyFormat(_))
    ));
}
