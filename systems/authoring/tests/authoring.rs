use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use knapsack_arena_core::{
    ChallengeId, CoreError, Difficulty, ItemId, NotFound, UserId, ValidationError,
};
use knapsack_arena_memory::{ManualClock, MemoryChallengeStore};
use knapsack_arena_system_authoring::{Authoring, AuthoringConfig, ChallengeDraft, ItemDraft};

fn opening() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 2, 10, 14, 0, 0)
        .single()
        .expect("valid instant")
}

fn draft(pairs: &[(u32, u32)], capacity: u32) -> ChallengeDraft {
    ChallengeDraft {
        difficulty: Difficulty::Easy,
        items: pairs
            .iter()
            .map(|&(weight, value)| ItemDraft {
                id: None,
                weight,
                value,
            })
            .collect(),
        max_capacity: capacity,
        max_duration_seconds: None,
        blank_count: None,
    }
}

fn textbook() -> ChallengeDraft {
    draft(&[(2, 3), (3, 4), (4, 5)], 5)
}

struct Harness {
    authoring: Authoring,
    store: Arc<MemoryChallengeStore>,
    clock: Arc<ManualClock>,
}

fn harness() -> Harness {
    let store = Arc::new(MemoryChallengeStore::new());
    let clock = Arc::new(ManualClock::new(opening()));
    let authoring = Authoring::new(store.clone(), clock.clone(), AuthoringConfig::default())
        .with_seed(17);
    Harness {
        authoring,
        store,
        clock,
    }
}

fn operator() -> UserId {
    UserId::new("admin")
}

#[tokio::test]
async fn created_challenges_carry_a_full_puzzle() {
    let harness = harness();

    let id = harness
        .authoring
        .create(textbook(), &operator())
        .await
        .expect("create");
    let stored = harness.authoring.get(&id).await.expect("stored");

    assert!(id.as_str().starts_with("KSC-"));
    assert_eq!(id.as_str().len(), 10);
    assert!(stored
        .items
        .iter()
        .all(|item| item.id.as_str().starts_with("ITM-")));
    assert_eq!(stored.dp_table.final_value(), 7);
    assert_eq!(stored.optimal_selection.len(), 2);
    assert_eq!(stored.blank_count, 5, "requested count is kept as authored");
    assert_eq!(stored.blank_cells.len(), 4, "only four cells are eligible");
    assert_eq!(stored.max_duration_seconds, 3000);
    assert_eq!(stored.created_at, opening());
    assert_eq!(stored.created_by, operator());
}

#[tokio::test]
async fn authored_item_ids_are_kept() {
    let harness = harness();
    let mut with_ids = textbook();
    with_ids.items[0].id = Some(ItemId::new("gold"));

    let id = harness
        .authoring
        .create(with_ids, &operator())
        .await
        .expect("create");
    let stored = harness.authoring.get(&id).await.expect("stored");

    assert_eq!(stored.items[0].id, ItemId::new("gold"));
}

#[tokio::test]
async fn edits_recompute_the_puzzle_and_keep_creation_metadata() {
    let harness = harness();
    let id = harness
        .authoring
        .create(textbook(), &operator())
        .await
        .expect("create");
    harness.clock.advance(Duration::minutes(5));

    let mut edited = draft(&[(1, 1), (5, 10)], 6);
    edited.difficulty = Difficulty::Hard;
    edited.blank_count = Some(1);
    let updated = harness
        .authoring
        .update(&id, edited, &UserId::new("editor"))
        .await
        .expect("update");

    assert_eq!(updated.dp_table.final_value(), 11);
    assert_eq!(updated.dp_table.rows(), 3);
    assert_eq!(updated.blank_cells.len(), 1);
    assert_eq!(updated.difficulty, Difficulty::Hard);
    assert_eq!(updated.created_at, opening());
    assert_eq!(updated.created_by, operator());
    assert_eq!(updated.updated_at, opening() + Duration::minutes(5));
    assert_eq!(updated.updated_by, UserId::new("editor"));
    assert_eq!(harness.authoring.get(&id).await, Ok(updated));
}

#[tokio::test]
async fn editing_an_unknown_challenge_fails() {
    let harness = harness();
    let ghost = ChallengeId::new("KSC-000000");

    let result = harness
        .authoring
        .update(&ghost, textbook(), &operator())
        .await;

    assert_eq!(result, Err(NotFound::Challenge(ghost).into()));
}

#[tokio::test]
async fn malformed_drafts_are_not_stored() {
    let harness = harness();
    let mut no_duration = textbook();
    no_duration.max_duration_seconds = Some(0);
    let mut duplicated = textbook();
    duplicated.items[0].id = Some(ItemId::new("x"));
    duplicated.items[1].id = Some(ItemId::new("x"));

    let cases = [
        (draft(&[], 5), ValidationError::EmptyItems),
        (draft(&[(2, 3)], 0), ValidationError::ZeroCapacity),
        (no_duration, ValidationError::ZeroDuration),
        (
            duplicated,
            ValidationError::DuplicateItemId {
                item: ItemId::new("x"),
            },
        ),
    ];
    for (draft, expected) in cases {
        let result = harness.authoring.create(draft, &operator()).await;
        assert_eq!(result, Err(CoreError::Validation(expected)));
    }

    let zero_weight = harness
        .authoring
        .create(draft(&[(0, 3)], 5), &operator())
        .await;
    assert!(matches!(
        zero_weight,
        Err(CoreError::Validation(ValidationError::ZeroWeight { .. }))
    ));
    assert!(harness.store.is_empty().await, "nothing may be persisted");
}

#[tokio::test]
async fn deleting_is_idempotent() {
    let harness = harness();
    let id = harness
        .authoring
        .create(textbook(), &operator())
        .await
        .expect("create");

    harness.authoring.delete(&id).await.expect("delete");
    harness.authoring.delete(&id).await.expect("repeat delete");

    assert_eq!(
        harness.authoring.get(&id).await,
        Err(NotFound::Challenge(id).into())
    );
}

#[tokio::test]
async fn random_selection_honours_difficulty() {
    let harness = harness();
    let id = harness
        .authoring
        .create(textbook(), &operator())
        .await
        .expect("create");

    let any_easy = harness
        .authoring
        .random(Difficulty::Easy, None)
        .await
        .expect("easy challenge");
    let wrong_tier = harness.authoring.random(Difficulty::Hard, Some(&id)).await;
    let none_hard = harness.authoring.random(Difficulty::Hard, None).await;

    assert_eq!(any_easy.id, id);
    assert_eq!(wrong_tier, Err(NotFound::Challenge(id).into()));
    assert_eq!(none_hard, Err(NotFound::Difficulty(Difficulty::Hard).into()));
}

#[tokio::test]
async fn pages_are_one_based() {
    let harness = harness();
    for _ in 0..3 {
        let _ = harness
            .authoring
            .create(textbook(), &operator())
            .await
            .expect("create");
        harness.clock.advance(Duration::seconds(1));
    }

    let page = harness
        .authoring
        .paginate(1, 2, Some("easy"))
        .await
        .expect("page");
    let invalid = harness.authoring.paginate(0, 2, None).await;

    assert_eq!(page.total, 3);
    assert_eq!(page.items.len(), 2);
    assert!(
        page.items[0].created_at > page.items[1].created_at,
        "newest challenges come first"
    );
    assert_eq!(
        invalid,
        Err(ValidationError::InvalidPage { index: 0, size: 2 }.into())
    );
}

#[test]
fn drafts_accept_minimal_json() {
    let parsed: ChallengeDraft = serde_json::from_str(
        r#"{"difficulty":"medium","items":[{"weight":2,"value":3}],"max_capacity":4}"#,
    )
    .expect("draft");

    assert_eq!(parsed.difficulty, Difficulty::Medium);
    assert_eq!(parsed.items[0].id, None);
    assert_eq!(parsed.blank_count, None);
}
