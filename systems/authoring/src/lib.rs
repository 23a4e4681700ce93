#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoring of knapsack challenges.
//!
//! Every create or edit runs the full puzzle generator over the submitted items, so
//! the stored table, optimal selection and blank cells always agree with the items.

use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};
use knapsack_arena_core::{
    Challenge, ChallengeId, ChallengeStore, Clock, CoreError, Difficulty, Item, ItemId, NotFound,
    Page, Puzzle, UserId, ValidationError,
};
use knapsack_arena_system_puzzle::PuzzleGenerator;
use serde::{Deserialize, Serialize};
use tracing::info;

const DEFAULT_MAX_DURATION_SECONDS: u32 = 3000;
const DEFAULT_BLANK_COUNT: u32 = 5;

/// Defaults applied to drafts that leave optional fields empty.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AuthoringConfig {
    /// Time budget used when a draft omits one.
    pub default_max_duration_seconds: u32,
    /// Number of blanks requested when a draft omits one.
    pub default_blank_count: u32,
}

impl Default for AuthoringConfig {
    fn default() -> Self {
        Self {
            default_max_duration_seconds: DEFAULT_MAX_DURATION_SECONDS,
            default_blank_count: DEFAULT_BLANK_COUNT,
        }
    }
}

/// Item as submitted by an author; the identifier is assigned when absent.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemDraft {
    /// Author-chosen identifier, if any.
    #[serde(default)]
    pub id: Option<ItemId>,
    /// Weight of the item.
    pub weight: u32,
    /// Value of the item.
    pub value: u32,
}

/// Challenge as submitted by an author.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChallengeDraft {
    /// Tier the challenge is offered under.
    pub difficulty: Difficulty,
    /// Items available to the player.
    pub items: Vec<ItemDraft>,
    /// Knapsack capacity.
    pub max_capacity: u32,
    /// Time budget; the configured default applies when absent.
    #[serde(default)]
    pub max_duration_seconds: Option<u32>,
    /// Number of blanks to hide; the configured default applies when absent.
    #[serde(default)]
    pub blank_count: Option<u32>,
}

struct Prepared {
    difficulty: Difficulty,
    items: Vec<Item>,
    puzzle: Puzzle,
    blank_count: u32,
    max_capacity: u32,
    max_duration_seconds: u32,
}

/// Challenge catalogue operations over a [`ChallengeStore`].
pub struct Authoring {
    store: Arc<dyn ChallengeStore>,
    clock: Arc<dyn Clock>,
    config: AuthoringConfig,
    generator: Mutex<PuzzleGenerator>,
}

impl Authoring {
    /// Creates the authoring service with an entropy-seeded generator.
    #[must_use]
    pub fn new(
        store: Arc<dyn ChallengeStore>,
        clock: Arc<dyn Clock>,
        config: AuthoringConfig,
    ) -> Self {
        Self {
            store,
            clock,
            config,
            generator: Mutex::new(PuzzleGenerator::from_entropy()),
        }
    }

    /// Makes identifiers and blank selection reproducible.
    #[must_use]
    pub fn with_seed(self, seed: u64) -> Self {
        Self {
            generator: Mutex::new(PuzzleGenerator::from_seed(seed)),
            ..self
        }
    }

    /// Defaults applied to drafts.
    #[must_use]
    pub const fn config(&self) -> AuthoringConfig {
        self.config
    }

    /// Generates and stores a new challenge.
    pub async fn create(
        &self,
        draft: ChallengeDraft,
        operator: &UserId,
    ) -> Result<ChallengeId, CoreError> {
        let (id, prepared) = {
            let mut generator = self.generator.lock().unwrap_or_else(PoisonError::into_inner);
            let prepared = self.prepare(&mut generator, draft, operator)?;
            (ChallengeId::generate(generator.rng_mut()), prepared)
        };
        let now = self.clock.now();
        let challenge = assemble(id, prepared, operator.clone(), operator.clone(), now, now);
        let blanks = challenge.blank_cells.len();
        let difficulty = challenge.difficulty;

        let id = self.store.create(challenge).await?;
        info!(challenge = %id, %difficulty, blanks, operator = %operator, "challenge created");
        Ok(id)
    }

    /// Replaces a challenge's parameters and regenerates its puzzle.
    ///
    /// Creation metadata is preserved.
    pub async fn update(
        &self,
        id: &ChallengeId,
        draft: ChallengeDraft,
        operator: &UserId,
    ) -> Result<Challenge, CoreError> {
        let existing = self.get(id).await?;
        let prepared = {
            let mut generator = self.generator.lock().unwrap_or_else(PoisonError::into_inner);
            self.prepare(&mut generator, draft, operator)?
        };
        let challenge = assemble(
            id.clone(),
            prepared,
            existing.created_by,
            operator.clone(),
            existing.created_at,
            self.clock.now(),
        );

        if !self.store.update(challenge.clone()).await? {
            return Err(NotFound::Challenge(id.clone()).into());
        }
        info!(challenge = %id, operator = %operator, "challenge updated");
        Ok(challenge)
    }

    /// Removes a challenge; unknown identifiers are ignored.
    pub async fn delete(&self, id: &ChallengeId) -> Result<(), CoreError> {
        self.store.delete(id).await?;
        info!(challenge = %id, "challenge deleted");
        Ok(())
    }

    /// Loads a challenge.
    pub async fn get(&self, id: &ChallengeId) -> Result<Challenge, CoreError> {
        self.store
            .get_by_id(id)
            .await?
            .ok_or_else(|| NotFound::Challenge(id.clone()).into())
    }

    /// Picks the requested challenge when it matches `difficulty`, or any challenge
    /// of that tier when no identifier is given.
    pub async fn random(
        &self,
        difficulty: Difficulty,
        specific: Option<&ChallengeId>,
    ) -> Result<Challenge, CoreError> {
        match specific {
            Some(id) => self
                .store
                .get_by_id(id)
                .await?
                .filter(|challenge| challenge.difficulty == difficulty)
                .ok_or_else(|| NotFound::Challenge(id.clone()).into()),
            None => self
                .store
                .get_random_by_difficulty(difficulty)
                .await?
                .ok_or_else(|| NotFound::Difficulty(difficulty).into()),
        }
    }

    /// Lists one page of challenges, `page_index` starting at one.
    pub async fn paginate(
        &self,
        page_index: usize,
        page_size: usize,
        search: Option<&str>,
    ) -> Result<Page<Challenge>, CoreError> {
        if page_index == 0 || page_size == 0 {
            return Err(ValidationError::InvalidPage {
                index: page_index,
                size: page_size,
            }
            .into());
        }
        Ok(self.store.paginate(page_index, page_size, search).await?)
    }

    fn prepare(
        &self,
        generator: &mut PuzzleGenerator,
        draft: ChallengeDraft,
        operator: &UserId,
    ) -> Result<Prepared, ValidationError> {
        if operator.is_blank() {
            return Err(ValidationError::MissingField { field: "operator" });
        }
        if draft.items.is_empty() {
            return Err(ValidationError::EmptyItems);
        }
        if draft.max_capacity == 0 {
            return Err(ValidationError::ZeroCapacity);
        }
        let max_duration_seconds = draft
            .max_duration_seconds
            .unwrap_or(self.config.default_max_duration_seconds);
        if max_duration_seconds == 0 {
            return Err(ValidationError::ZeroDuration);
        }
        let blank_count = draft.blank_count.unwrap_or(self.config.default_blank_count);

        let items: Vec<Item> = draft
            .items
            .into_iter()
            .map(|item| {
                let id = match item.id {
                    Some(id) if !id.is_blank() => id,
                    _ => ItemId::generate(generator.rng_mut()),
                };
                Item::new(id, item.weight, item.value)
            })
            .collect();
        let puzzle = generator.generate(&items, draft.max_capacity, blank_count as usize)?;

        Ok(Prepared {
            difficulty: draft.difficulty,
            items,
            puzzle,
            blank_count,
            max_capacity: draft.max_capacity,
            max_duration_seconds,
        })
    }
}

fn assemble(
    id: ChallengeId,
    prepared: Prepared,
    created_by: UserId,
    updated_by: UserId,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
) -> Challenge {
    let Prepared {
        difficulty,
        items,
        puzzle,
        blank_count,
        max_capacity,
        max_duration_seconds,
    } = prepared;
    Challenge {
        id,
        difficulty,
        items,
        dp_table: puzzle.dp_table,
        optimal_selection: puzzle.optimal_selection,
        blank_cells: puzzle.blank_cells,
        blank_count,
        max_capacity,
        max_duration_seconds,
        created_by,
        updated_by,
        created_at,
        updated_at,
    }
}
