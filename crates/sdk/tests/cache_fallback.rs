mod common;

use common::{harness, START};
use pulse_sdk::{
    cache::keys, ErrorCategory, Follow, IndexState, KeyValueStore, LedgerError, SdkError,
    UserProfile,
};
use solana_sdk::pubkey::Pubkey;

fn profile(owner: Pubkey, username: &str) -> UserProfile {
    UserProfile {
        owner,
        followers_count: 3,
        following_count: 1,
        posts_count: 12,
        created_at: START - 1_000,
        bump: 254,
        username: username.to_string(),
        bio: "building in public".to_string(),
    }
}

#[tokio::test]
async fn test_fresh_hit_skips_the_ledger() {
    let h = harness();
    let owner = Pubkey::new_unique();
    let address = h.pda.user_profile(&owner).unwrap().address;
    h.ledger.put(address, &profile(owner, "alice"));

    let first = h.client.social.profile(&owner).await.unwrap();
    assert!(!first.is_stale());
    let reads = h.ledger.reads();

    h.clock.advance(10);
    let second = h.client.social.profile(&owner).await.unwrap();
    assert_eq!(second.value, first.value);
    assert_eq!(h.ledger.reads(), reads);
}

#[tokio::test]
async fn test_expired_entry_is_refetched() {
    let h = harness();
    let owner = Pubkey::new_unique();
    let address = h.pda.user_profile(&owner).unwrap().address;
    h.ledger.put(address, &profile(owner, "alice"));
    h.client.social.profile(&owner).await.unwrap();

    h.ledger.put(address, &profile(owner, "alice2"));
    h.clock.advance(60);

    let refreshed = h.client.social.profile(&owner).await.unwrap();
    assert!(!refreshed.is_stale());
    assert_eq!(refreshed.value.username, "alice2");
}

#[tokio::test]
async fn test_offline_ledger_serves_stale_value() {
    let h = harness();
    let owner = Pubkey::new_unique();
    let address = h.pda.user_profile(&owner).unwrap().address;
    h.ledger.put(address, &profile(owner, "alice"));
    h.client.social.profile(&owner).await.unwrap();

    h.clock.advance(3_600);
    h.ledger.set_offline(true);

    let cached = h.client.social.profile(&owner).await.unwrap();
    assert!(cached.is_stale());
    assert_eq!(cached.value.username, "alice");
}

#[tokio::test]
async fn test_offline_without_history_is_a_transport_error() {
    let h = harness();
    h.ledger.set_offline(true);

    let err = h
        .client
        .social
        .profile(&Pubkey::new_unique())
        .await
        .unwrap_err();
    assert!(matches!(err, SdkError::Transport { .. }));
    assert_eq!(err.category(), ErrorCategory::Transport);
    assert!(err.is_recoverable());
}

#[tokio::test]
async fn test_missing_account_is_not_masked_by_stale_value() {
    let h = harness();
    let owner = Pubkey::new_unique();
    let address = h.pda.user_profile(&owner).unwrap().address;
    h.ledger.put(address, &profile(owner, "alice"));
    h.client.social.profile(&owner).await.unwrap();

    h.clock.advance(3_600);
    h.ledger.remove(&address);

    let err = h.client.social.profile(&owner).await.unwrap_err();
    assert_eq!(err, SdkError::AccountNotFound { address });
}

#[tokio::test]
async fn test_refused_request_is_not_masked_by_stale_value() {
    let h = harness();
    let owner = Pubkey::new_unique();
    let address = h.pda.user_profile(&owner).unwrap().address;
    h.ledger.put(address, &profile(owner, "alice"));
    h.client.social.profile(&owner).await.unwrap();

    h.clock.advance(3_600);
    h.ledger.fail_with(Some(LedgerError::Rpc {
        code: -32602,
        message: "Invalid params".to_string(),
    }));

    let err = h.client.social.profile(&owner).await.unwrap_err();
    assert_eq!(
        err,
        SdkError::Rpc {
            code: -32602,
            message: "Invalid params".to_string(),
        }
    );
    assert_ne!(err.category(), ErrorCategory::Transport);
}

#[tokio::test]
async fn test_unhealthy_node_serves_stale_value() {
    let h = harness();
    let owner = Pubkey::new_unique();
    let address = h.pda.user_profile(&owner).unwrap().address;
    h.ledger.put(address, &profile(owner, "alice"));
    h.client.social.profile(&owner).await.unwrap();

    h.clock.advance(3_600);
    h.ledger.fail_with(Some(LedgerError::Rpc {
        code: -32005,
        message: "Node is unhealthy".to_string(),
    }));

    let cached = h.client.social.profile(&owner).await.unwrap();
    assert!(cached.is_stale());
    assert_eq!(cached.value.username, "alice");
}

#[tokio::test]
async fn test_not_indexed_differs_from_empty() {
    let h = harness();
    let user = Pubkey::new_unique();

    h.ledger.set_not_indexed(true);
    let unknown = h.client.social.followers(&user).await.unwrap();
    assert_eq!(unknown.value, IndexState::NotIndexed);

    h.client.base.cache().invalidate(&keys::followers(&user));
    h.ledger.set_not_indexed(false);
    let empty = h.client.social.followers(&user).await.unwrap();
    assert_eq!(empty.value, IndexState::Ready(Vec::new()));
}

#[tokio::test]
async fn test_follow_invalidates_relationship_lists() {
    let h = harness();
    let followed = Pubkey::new_unique();

    let before = h.client.social.followers(&followed).await.unwrap();
    assert_eq!(before.value, IndexState::Ready(Vec::new()));

    let follow_account = Pubkey::new_unique();
    h.ledger.put(
        follow_account,
        &Follow {
            follower: h.user,
            followed,
            created_at: START,
        },
    );
    h.client.social.follow(followed, follow_account).await.unwrap();

    let after = h.client.social.followers(&followed).await.unwrap();
    assert_eq!(after.value, IndexState::Ready(vec![h.user]));
}

#[tokio::test]
async fn test_clear_keeps_foreign_keys() {
    let h = harness();
    let owner = Pubkey::new_unique();
    let address = h.pda.user_profile(&owner).unwrap().address;
    h.ledger.put(address, &profile(owner, "alice"));
    h.client.social.profile(&owner).await.unwrap();

    h.store.set("wallet:last_account", "\"abc\"".to_string());
    h.client.base.cache().clear();

    assert_eq!(
        h.store.get("wallet:last_account"),
        Some("\"abc\"".to_string())
    );
    assert!(h.store.keys().iter().all(|k| !k.starts_with("pulse:")));

    // nothing left to fall back on
    h.ledger.set_offline(true);
    assert!(h.client.social.profile(&owner).await.is_err());
}
