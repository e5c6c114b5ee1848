//! Integration tests for signing through KMS
//!
//! Use the in-memory KMS client; no AWS account needed.

use kms_jose_keys::testing::{MockKmsClient, INVALID_KMS_KEY_ID, VALID_KMS_KEY_ID};
use kms_jose_keys::{
    DigestAlgorithm, JoseEngine, Key, KeyInput, KeyResolver, KmsAsymmetricSigningKey, KmsError,
    KmsServiceError, NativeEngine, SigningAlgorithm, DIGEST_MESSAGE_TYPE,
};
use std::sync::Arc;

const PAYLOAD: &[u8] = b"{\"iss\":\"kms-jose\",\"sub\":\"integration\"}";

#[tokio::test]
async fn test_sign_sends_digest_for_jws_alg() {
    let client = Arc::new(MockKmsClient::new().with_signature(b"KMS_SIGNATURE".to_vec()));
    let key = KmsAsymmetricSigningKey::new(VALID_KMS_KEY_ID, client.clone()).unwrap();

    for alg in ["PS256", "PS384", "PS512", "RS256", "RS384", "RS512"] {
        let algorithm = SigningAlgorithm::from_jws_alg(alg).unwrap();
        let result = key.sign(algorithm.kms_name(), PAYLOAD).await.unwrap();
        assert_eq!(result.mac, Some(b"KMS_SIGNATURE".to_vec()));

        let request = client.sign_requests().pop().unwrap();
        let expected = NativeEngine::new().digest(algorithm.digest(), PAYLOAD).unwrap();
        assert_eq!(request.key_id, VALID_KMS_KEY_ID);
        assert_eq!(request.message_type, DIGEST_MESSAGE_TYPE);
        assert_eq!(request.signing_algorithm, algorithm.kms_name());
        assert_eq!(request.message, expected);
        assert_eq!(request.message.len(), algorithm.digest().output_len());
    }

    assert_eq!(client.call_count(), 6);
}

#[tokio::test]
async fn test_verify_reports_kms_verdict() {
    let client = Arc::new(MockKmsClient::new().with_signature_valid(false));
    let key = KmsAsymmetricSigningKey::new(VALID_KMS_KEY_ID, client.clone()).unwrap();

    let result = key.verify("RSASSA_PKCS1_V1_5_SHA_512", PAYLOAD, b"forged").await.unwrap();

    assert_eq!(result.mac, Some(false));
    let request = client.verify_requests().pop().unwrap();
    assert_eq!(request.signature, b"forged".to_vec());
    assert_eq!(
        request.message,
        NativeEngine::new().digest(DigestAlgorithm::Sha512, PAYLOAD).unwrap()
    );
}

#[tokio::test]
async fn test_unsupported_algorithm_never_reaches_kms() {
    let client = Arc::new(MockKmsClient::new().with_signature(b"unused".to_vec()));
    let key = KmsAsymmetricSigningKey::new(VALID_KMS_KEY_ID, client.clone()).unwrap();

    for algorithm in ["ECDSA_SHA_256", "ES256", "PS256", ""] {
        let result = key.sign(algorithm, PAYLOAD).await;
        assert!(matches!(result, Err(KmsError::UnsupportedAlgorithm(_))), "{}", algorithm);
    }

    assert_eq!(client.call_count(), 0);
}

#[tokio::test]
async fn test_transient_failures_are_retryable() {
    let client = Arc::new(MockKmsClient::new().with_signature(b"SIG".to_vec()));
    let key = KmsAsymmetricSigningKey::new(VALID_KMS_KEY_ID, client.clone()).unwrap();

    client.fail_next(KmsServiceError::DependencyTimeout("timeout".into()));
    let error = key.sign("RSASSA_PSS_SHA_256", PAYLOAD).await.unwrap_err();
    assert!(error.is_retryable());

    // A retry after the transient failure goes through
    let result = key.sign("RSASSA_PSS_SHA_256", PAYLOAD).await.unwrap();
    assert_eq!(result.mac, Some(b"SIG".to_vec()));

    client.fail_next(KmsServiceError::Disabled("key disabled".into()));
    let error = key.sign("RSASSA_PSS_SHA_256", PAYLOAD).await.unwrap_err();
    assert!(!error.is_retryable());
    assert!(matches!(error, KmsError::Validation(_)));
}

#[test]
fn test_invalid_key_id_is_rejected_at_construction() {
    let client = Arc::new(MockKmsClient::new());
    let result = KmsAsymmetricSigningKey::new(INVALID_KMS_KEY_ID, client.clone());
    assert!(matches!(result, Err(KmsError::InvalidKeyFormat(_))));

    let result = KmsAsymmetricSigningKey::new("", client.clone());
    assert!(matches!(result, Err(KmsError::InvalidKeyFormat(_))));
    assert_eq!(client.call_count(), 0);
}

#[tokio::test]
async fn test_installed_resolver_signs_with_kms_key() {
    let client = Arc::new(MockKmsClient::new().with_signature(b"SIG".to_vec()));
    let key: Arc<dyn Key> =
        Arc::new(KmsAsymmetricSigningKey::new(VALID_KMS_KEY_ID, client.clone()).unwrap());

    let resolver = KeyResolver::install();
    assert!(resolver.is_key(&KeyInput::Key(key.clone())));

    let resolved = resolver.as_key(key.clone().into()).unwrap();
    assert!(Arc::ptr_eq(&resolved, &key));

    let signer = resolved.as_signing_key().unwrap();
    let result = signer.sign("RSASSA_PSS_SHA_384", PAYLOAD).await.unwrap();
    assert_eq!(result.mac, Some(b"SIG".to_vec()));
    assert_eq!(client.sign_requests()[0].message.len(), 48);
}
