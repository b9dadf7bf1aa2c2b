//! Key rotation against the in-memory ledger

use near_access_keys::account::mock::InjectedFailure;
use near_access_keys::account::{LedgerOp, MockLedger};
use near_access_keys::{
    AccessKeyPermission, AccessKeyStore, AccountDirectory, Ed25519Generator, InMemoryKeyStore,
    KeyManager, KeyPair, KeyPairGenerator, KeyScheme, KeysError, RotationOptions,
    RotationOutcome, SecretSink, WriterSecretSink,
};
use std::collections::HashSet;
use std::sync::Arc;

const ACCOUNT: &str = "pivortex.testnet";

struct Harness {
    ledger: MockLedger,
    store: Arc<InMemoryKeyStore>,
    secrets: Arc<WriterSecretSink<Vec<u8>>>,
    manager: KeyManager,
    old_key: KeyPair,
}

fn setup() -> Harness {
    let ledger = MockLedger::new();
    let old_key = Ed25519Generator.generate(KeyScheme::Ed25519).unwrap();
    ledger.create_account(ACCOUNT, &old_key.public_key());

    let store = Arc::new(InMemoryKeyStore::new());
    store.set_key("testnet", ACCOUNT, &old_key).unwrap();

    let secrets = Arc::new(WriterSecretSink::new(Vec::new()));
    let manager = KeyManager::new("testnet", Arc::new(ledger.clone()), store.clone())
        .with_secret_sink(secrets.clone() as Arc<dyn SecretSink>);

    Harness {
        ledger,
        store,
        secrets,
        manager,
        old_key,
    }
}

#[tokio::test]
async fn test_rotation_replaces_old_key() {
    let h = setup();
    let before = h.ledger.public_keys(ACCOUNT);

    let rotation = h
        .manager
        .rotator(RotationOptions::default())
        .rotate(ACCOUNT, &h.old_key.public_key())
        .await
        .unwrap();

    assert_eq!(rotation.outcome, RotationOutcome::OldKeyRemoved);
    assert!(rotation.is_complete());

    let new_key = rotation.key_pair.public_key();
    let mut expected: HashSet<String> = before;
    expected.remove(&h.old_key.public_key());
    expected.insert(new_key.clone());
    assert_eq!(h.ledger.public_keys(ACCOUNT), expected);
    assert_eq!(h.ledger.public_keys(ACCOUNT), HashSet::from([new_key]));

    let ops: Vec<LedgerOp> = h.ledger.calls().into_iter().map(|c| c.op).collect();
    assert_eq!(ops, vec![LedgerOp::AddKey, LedgerOp::ListKeys, LedgerOp::DeleteKey]);
}

#[tokio::test]
async fn test_rotation_keeps_other_keys() {
    let h = setup();
    let account = h.ledger.account(ACCOUNT).await.unwrap();
    let extra = Ed25519Generator.generate(KeyScheme::Ed25519).unwrap();
    account
        .add_key(&extra.public_key(), &AccessKeyPermission::FullAccess)
        .await
        .unwrap();

    let rotation = h
        .manager
        .rotator(RotationOptions::default())
        .rotate(ACCOUNT, &h.old_key.public_key())
        .await
        .unwrap();

    assert_eq!(
        h.ledger.public_keys(ACCOUNT),
        HashSet::from([extra.public_key(), rotation.key_pair.public_key()])
    );
}

#[tokio::test]
async fn test_add_failure_leaves_key_set_unchanged() {
    let h = setup();
    h.ledger.fail(LedgerOp::AddKey, InjectedFailure::Rpc);

    let result = h
        .manager
        .rotator(RotationOptions::default())
        .rotate(ACCOUNT, &h.old_key.public_key())
        .await;

    assert!(matches!(result, Err(KeysError::Rpc(_))));
    assert_eq!(h.ledger.call_count(LedgerOp::ListKeys), 0);
    assert_eq!(h.ledger.call_count(LedgerOp::DeleteKey), 0);
    assert_eq!(
        h.ledger.public_keys(ACCOUNT),
        HashSet::from([h.old_key.public_key()])
    );
    assert!(h.secrets.contents().is_empty());
}

#[tokio::test]
async fn test_unlisted_new_key_retains_old_key() {
    let h = setup();
    h.ledger.set_lagging(true);

    let rotation = h
        .manager
        .rotator(RotationOptions::default())
        .rotate(ACCOUNT, &h.old_key.public_key())
        .await
        .unwrap();

    assert_eq!(rotation.outcome, RotationOutcome::OldKeyRetained);
    assert_eq!(h.ledger.call_count(LedgerOp::DeleteKey), 0);
    assert_eq!(
        h.ledger.public_keys(ACCOUNT),
        HashSet::from([h.old_key.public_key(), rotation.key_pair.public_key()])
    );
}

#[tokio::test]
async fn test_delete_failure_leaves_both_keys() {
    let h = setup();
    h.ledger.fail(LedgerOp::DeleteKey, InjectedFailure::Rpc);

    let result = h
        .manager
        .rotator(RotationOptions::default())
        .rotate(ACCOUNT, &h.old_key.public_key())
        .await;

    assert!(matches!(result, Err(KeysError::Rpc(_))));
    assert_eq!(h.ledger.public_keys(ACCOUNT).len(), 2);
    assert!(h
        .ledger
        .public_keys(ACCOUNT)
        .contains(&h.old_key.public_key()));
    // the new pair was already handed out
    assert!(h.secrets.contents().starts_with("Public key ed25519:"));
}

#[tokio::test]
async fn test_list_failure_skips_delete() {
    let h = setup();
    h.ledger.fail(LedgerOp::ListKeys, InjectedFailure::Rpc);

    let result = h
        .manager
        .rotator(RotationOptions::default())
        .rotate(ACCOUNT, &h.old_key.public_key())
        .await;

    assert!(matches!(result, Err(KeysError::Rpc(_))));
    assert_eq!(h.ledger.call_count(LedgerOp::DeleteKey), 0);
    assert!(h
        .ledger
        .public_keys(ACCOUNT)
        .contains(&h.old_key.public_key()));
}

#[tokio::test]
async fn test_invalid_account_id_rejected_before_network() {
    let h = setup();

    let result = h
        .manager
        .rotator(RotationOptions::default())
        .rotate("Not An Account", &h.old_key.public_key())
        .await;

    assert!(matches!(result, Err(KeysError::Config(_))));
    assert!(h.ledger.calls().is_empty());
}

#[tokio::test]
async fn test_unknown_old_key_is_not_found() {
    let h = setup();
    let stranger = Ed25519Generator.generate(KeyScheme::Ed25519).unwrap();

    let result = h
        .manager
        .rotator(RotationOptions::default())
        .rotate(ACCOUNT, &stranger.public_key())
        .await;

    assert!(matches!(result, Err(KeysError::NotFound(_))));
    assert!(h
        .ledger
        .public_keys(ACCOUNT)
        .contains(&h.old_key.public_key()));
}

#[tokio::test]
async fn test_signer_without_full_access_is_unauthorized() {
    let h = setup();
    let stranger = Ed25519Generator.generate(KeyScheme::Ed25519).unwrap();
    h.ledger.set_signer(ACCOUNT, &stranger.public_key());

    let result = h
        .manager
        .rotator(RotationOptions::default())
        .rotate(ACCOUNT, &h.old_key.public_key())
        .await;

    assert!(matches!(result, Err(KeysError::Unauthorized(_))));
    assert_eq!(
        h.ledger.public_keys(ACCOUNT),
        HashSet::from([h.old_key.public_key()])
    );
}

#[tokio::test]
async fn test_missing_account_is_not_found() {
    let h = setup();

    let result = h
        .manager
        .rotator(RotationOptions::default())
        .rotate("nobody.testnet", &h.old_key.public_key())
        .await;

    assert!(matches!(result, Err(KeysError::NotFound(_))));
    assert!(h.ledger.calls().is_empty());
}

#[tokio::test]
async fn test_store_new_key_after_removal() {
    let h = setup();

    let rotation = h
        .manager
        .rotator(RotationOptions {
            store_new_key: true,
        })
        .rotate(ACCOUNT, &h.old_key.public_key())
        .await
        .unwrap();

    let stored = h.store.get_key("testnet", ACCOUNT).unwrap().unwrap();
    assert_eq!(stored.public_key(), rotation.key_pair.public_key());
}

#[tokio::test]
async fn test_store_new_key_skipped_when_old_key_retained() {
    let h = setup();
    h.ledger.set_lagging(true);

    h.manager
        .rotator(RotationOptions {
            store_new_key: true,
        })
        .rotate(ACCOUNT, &h.old_key.public_key())
        .await
        .unwrap();

    let stored = h.store.get_key("testnet", ACCOUNT).unwrap().unwrap();
    assert_eq!(stored.public_key(), h.old_key.public_key());
}

#[tokio::test]
async fn test_default_rotation_leaves_store_untouched() {
    let h = setup();

    h.manager
        .rotator(RotationOptions::default())
        .rotate(ACCOUNT, &h.old_key.public_key())
        .await
        .unwrap();

    let stored = h.store.get_key("testnet", ACCOUNT).unwrap().unwrap();
    assert_eq!(stored.public_key(), h.old_key.public_key());
}

#[tokio::test]
async fn test_new_secret_emitted_once() {
    let h = setup();

    let rotation = h
        .manager
        .rotator(RotationOptions::default())
        .rotate(ACCOUNT, &h.old_key.public_key())
        .await
        .unwrap();

    let output = h.secrets.contents();
    let lines: Vec<&str> = output.lines().collect();
    assert_eq!(
        lines,
        vec![
            format!("Public key {}", rotation.key_pair.public_key()),
            format!("Private key {}", rotation.key_pair.secret_key().as_str()),
        ]
    );
}

#[tokio::test]
async fn test_repeated_rotations_use_distinct_keys() {
    let h = setup();
    let rotator = h.manager.rotator(RotationOptions::default());

    let mut current = h.old_key.public_key();
    let mut seen = HashSet::from([current.clone()]);
    for _ in 0..5 {
        h.ledger.set_signer(ACCOUNT, &current);
        let rotation = rotator.rotate(ACCOUNT, &current).await.unwrap();
        current = rotation.key_pair.public_key();
        assert!(seen.insert(current.clone()), "key {} reused", current);
    }

    assert_eq!(h.ledger.public_keys(ACCOUNT), HashSet::from([current]));
}
