use std::sync::Arc;
use std::thread;

use vault_core::{
    calculate_strength, generate_secure_password, MemoryStore, StrengthLevel, VaultConfig,
    VaultError, VaultKeyManager, VaultStore,
};

fn fast_config() -> VaultConfig {
    VaultConfig {
        kdf_iterations: 1_000,
        verifier_iterations: 1_000,
        auto_lock_seconds: 0,
    }
}

fn manager_over(store: Arc<dyn VaultStore>) -> VaultKeyManager {
    VaultKeyManager::new(store, &fast_config()).unwrap()
}

#[test]
fn test_full_lifecycle() {
    let manager = manager_over(Arc::new(MemoryStore::new()));

    manager.initialize_vault_key("Secret123!", "user1").unwrap();
    assert!(manager.is_vault_unlocked());
    assert_eq!(manager.current_user_id().as_deref(), Some("user1"));

    let blob = manager.encrypt_password("MySitePassword123!").unwrap();
    assert!(!blob.as_str().contains("MySitePassword123!"));

    manager.lock_vault();
    assert!(!manager.is_vault_unlocked());
    assert!(manager.current_user_id().is_none());

    manager.unlock_vault("Secret123!", "user1").unwrap();
    assert_eq!(
        manager.decrypt_password(&blob).unwrap().as_str(),
        "MySitePassword123!"
    );
}

#[test]
fn test_records_survive_a_fresh_manager_over_the_same_store() {
    let store: Arc<dyn VaultStore> = Arc::new(MemoryStore::new());

    let blob = {
        let first = manager_over(store.clone());
        first.initialize_vault_key("Secret123!", "user1").unwrap();
        first.encrypt_password("carried-over").unwrap()
    };

    let second = manager_over(store);
    assert!(second.is_vault_initialized("user1").unwrap());
    second.unlock_vault("Secret123!", "user1").unwrap();
    assert_eq!(
        second.decrypt_password(&blob).unwrap().as_str(),
        "carried-over"
    );
}

#[test]
fn test_wrong_secret_leaves_vault_locked() {
    let manager = manager_over(Arc::new(MemoryStore::new()));
    manager.initialize_vault_key("Secret123!", "user1").unwrap();
    let blob = manager.encrypt_password("hidden").unwrap();
    manager.lock_vault();

    let err = manager.unlock_vault("WrongPass", "user1").unwrap_err();
    assert!(matches!(err, VaultError::InvalidCredentials));
    assert!(err.is_recoverable());
    assert!(!manager.is_vault_unlocked());
    assert!(matches!(
        manager.decrypt_password(&blob),
        Err(VaultError::VaultLocked)
    ));
}

#[test]
fn test_users_are_isolated() {
    let manager = manager_over(Arc::new(MemoryStore::new()));

    manager.initialize_vault_key("Alice-Secret1", "alice").unwrap();
    let alice_blob = manager.encrypt_password("alice-site").unwrap();
    manager.lock_vault();

    manager.initialize_vault_key("Bobby-Secret2", "bob").unwrap();
    let bob_blob = manager.encrypt_password("bob-site").unwrap();

    let err = manager.decrypt_password(&alice_blob).unwrap_err();
    assert!(matches!(err, VaultError::DecryptionFailed(_)));
    assert_eq!(err.to_string(), "Decryption failed");
    manager.lock_vault();

    // Each user's secret only opens that user's vault.
    assert!(matches!(
        manager.unlock_vault("Bobby-Secret2", "alice"),
        Err(VaultError::InvalidCredentials)
    ));

    manager.unlock_vault("Alice-Secret1", "alice").unwrap();
    assert_eq!(
        manager.decrypt_password(&alice_blob).unwrap().as_str(),
        "alice-site"
    );
    assert!(manager.decrypt_password(&bob_blob).is_err());
}

#[test]
fn test_same_secret_for_two_users_stores_distinct_verifiers() {
    let store = Arc::new(MemoryStore::new());
    let manager = manager_over(store.clone());

    manager.initialize_vault_key("Shared-Secret1", "alice").unwrap();
    let alice_blob = manager.encrypt_password("alice-site").unwrap();
    manager.lock_vault();
    manager.initialize_vault_key("Shared-Secret1", "bob").unwrap();
    manager.lock_vault();

    let alice_hash = store.load_master_secret_hash("alice").unwrap().unwrap();
    let bob_hash = store.load_master_secret_hash("bob").unwrap().unwrap();
    assert_ne!(alice_hash.as_str(), bob_hash.as_str());
    assert_ne!(
        store.load_salt("alice").unwrap(),
        store.load_salt("bob").unwrap()
    );

    manager.unlock_vault("Shared-Secret1", "bob").unwrap();
    assert!(matches!(
        manager.decrypt_password(&alice_blob),
        Err(VaultError::DecryptionFailed(_))
    ));
}

#[test]
fn test_identical_plaintexts_encrypt_differently() {
    let manager = manager_over(Arc::new(MemoryStore::new()));
    manager.initialize_vault_key("Secret123!", "user1").unwrap();

    let a = manager.encrypt_password("same").unwrap();
    let b = manager.encrypt_password("same").unwrap();
    assert_ne!(a, b);
    assert_eq!(manager.decrypt_password(&a).unwrap().as_str(), "same");
    assert_eq!(manager.decrypt_password(&b).unwrap().as_str(), "same");
}

#[test]
fn test_unicode_and_empty_plaintexts() {
    let manager = manager_over(Arc::new(MemoryStore::new()));
    manager.initialize_vault_key("Secret123!", "user1").unwrap();

    for plaintext in ["", "pässwörd 🔐", "日本語のパスワード"] {
        let blob = manager.encrypt_password(plaintext).unwrap();
        assert_eq!(manager.decrypt_password(&blob).unwrap().as_str(), plaintext);
    }
}

#[test]
fn test_concurrent_encrypts_while_locking() {
    let manager = Arc::new(manager_over(Arc::new(MemoryStore::new())));
    manager.initialize_vault_key("Secret123!", "user1").unwrap();

    let workers: Vec<_> = (0..8)
        .map(|i| {
            let manager = Arc::clone(&manager);
            thread::spawn(move || {
                let mut produced = Vec::new();
                for j in 0..25 {
                    match manager.encrypt_password(&format!("secret-{}-{}", i, j)) {
                        Ok(blob) => produced.push((format!("secret-{}-{}", i, j), blob)),
                        Err(VaultError::VaultLocked) => {}
                        Err(other) => panic!("unexpected error: {other:?}"),
                    }
                }
                produced
            })
        })
        .collect();

    manager.lock_vault();
    assert!(matches!(
        manager.encrypt_password("after-lock"),
        Err(VaultError::VaultLocked)
    ));

    let produced: Vec<_> = workers
        .into_iter()
        .flat_map(|worker| worker.join().unwrap())
        .collect();

    // Everything produced before the lock is a valid record under the key.
    manager.unlock_vault("Secret123!", "user1").unwrap();
    for (plaintext, blob) in produced {
        assert_eq!(manager.decrypt_password(&blob).unwrap().as_str(), plaintext);
    }
}

#[test]
fn test_generated_passwords_are_strong() {
    for length in [12, 16, 32, 64] {
        let password = generate_secure_password(length).unwrap();
        assert_eq!(password.chars().count(), length);
        assert_eq!(
            StrengthLevel::from_score(calculate_strength(&password)),
            StrengthLevel::Strong
        );
    }
}
