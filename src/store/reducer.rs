//! Pure state transitions for the progress store.
//!
//! Nothing in this module performs I/O: every function takes the in-memory
//! state and returns either the applied change or a [`StoreError`] leaving
//! the state untouched. The store wrapper in `super` decides what to do with
//! the outcome (log, persist, report).

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::error::StoreError;
use crate::models::{
    CreateQuestInput, Quest, QuestInstance, QuestStatus, QuestType, UpdateCharacterInput,
};

use super::defaults;
use super::progression;
use super::ProgressState;

/// Construct a quest from user input and append it to the collection.
pub fn add_quest(state: &mut ProgressState, input: CreateQuestInput) -> Quest {
    let quest = Quest {
        id: Uuid::new_v4(),
        title: input.title,
        description: input.description,
        quest_type: input.quest_type,
        xp_reward: input.xp_reward,
        stat_boosts: input.stat_boosts,
        is_persistent: input.is_persistent,
        max_completions: input.max_completions.unwrap_or(1).max(1),
        status: QuestStatus::Active,
        completion_count: 0,
        completed_instances: Vec::new(),
        failed_instances: Vec::new(),
        created_at: Utc::now(),
    };
    state.quests.push(quest.clone());
    quest
}

/// Record a completion of `id` for `date`, awarding XP and stat boosts.
///
/// Rejected when the quest is unknown, already has an instance for `date`,
/// or already reached its completion cap. On success the character's streak
/// is updated and the quest status is settled: `Completed` at the cap,
/// otherwise `Active` (which reopens a previously failed quest).
pub fn complete_quest(
    state: &mut ProgressState,
    id: Uuid,
    date: NaiveDate,
    now: DateTime<Utc>,
) -> Result<(), StoreError> {
    let quest = state
        .quests
        .iter_mut()
        .find(|q| q.id == id)
        .ok_or(StoreError::QuestNotFound(id))?;

    if quest.completed_on(date) {
        return Err(StoreError::DuplicateCompletion { id, date });
    }
    if quest.completion_count >= quest.max_completions {
        return Err(StoreError::CompletionCapReached {
            id,
            max_completions: quest.max_completions,
        });
    }

    quest.completed_instances.push(QuestInstance {
        date,
        timestamp: now,
        xp: quest.xp_reward,
        stat_boosts: quest.stat_boosts,
    });
    quest.completion_count += 1;
    // A completion always settles the status: back to Active for a quest
    // that was Failed, Completed once the cap is reached.
    quest.status = if quest.completion_count >= quest.max_completions {
        QuestStatus::Completed
    } else {
        QuestStatus::Active
    };

    let character = &mut state.character;
    character.stats.apply(&quest.stat_boosts);
    progression::award_xp(character, quest.xp_reward);
    character.streak =
        progression::next_streak(character.streak, character.last_completed_date, date);
    character.last_quest_completed = Some(now);
    character.last_completed_date = Some(date);

    Ok(())
}

/// Undo a completion of `id` recorded for `date`.
///
/// Removes exactly the matching instance, takes back the XP it granted and
/// the stat boosts it applied, and reopens the quest. The streak and any
/// level-ups the completion caused are deliberately left alone.
pub fn uncheck_quest(
    state: &mut ProgressState,
    id: Uuid,
    date: NaiveDate,
) -> Result<(), StoreError> {
    let quest = state
        .quests
        .iter_mut()
        .find(|q| q.id == id)
        .ok_or(StoreError::QuestNotFound(id))?;

    let pos = quest
        .completed_instances
        .iter()
        .position(|i| i.date == date)
        .ok_or(StoreError::InstanceNotFound { id, date })?;

    let instance = quest.completed_instances.remove(pos);
    quest.completion_count = quest.completion_count.saturating_sub(1);
    quest.status = QuestStatus::Active;

    let character = &mut state.character;
    progression::revoke_xp(character, instance.xp);
    character.stats.revert(&instance.stat_boosts);

    Ok(())
}

/// Record a failure of `id` for `date`. Zero XP, breaks the streak,
/// leaves completed history untouched.
pub fn fail_quest(
    state: &mut ProgressState,
    id: Uuid,
    date: NaiveDate,
    now: DateTime<Utc>,
) -> Result<(), StoreError> {
    let quest = state
        .quests
        .iter_mut()
        .find(|q| q.id == id)
        .ok_or(StoreError::QuestNotFound(id))?;

    quest.failed_instances.push(QuestInstance {
        date,
        timestamp: now,
        xp: 0,
        stat_boosts: Default::default(),
    });
    quest.status = QuestStatus::Failed;
    state.character.streak = 0;

    Ok(())
}

/// Remove a quest from the collection. The character is unaffected even if
/// the quest had granted XP.
pub fn delete_quest(state: &mut ProgressState, id: Uuid) -> Result<(), StoreError> {
    let before = state.quests.len();
    state.quests.retain(|q| q.id != id);
    if state.quests.len() == before {
        return Err(StoreError::QuestNotFound(id));
    }
    Ok(())
}

/// Apply a partial character update. `xp_to_next_level` is re-derived when
/// the level changes so the pair cannot drift apart.
pub fn update_character(state: &mut ProgressState, input: UpdateCharacterInput) {
    let character = &mut state.character;
    if let Some(level) = input.level {
        character.level = level.max(1);
        character.xp_to_next_level = progression::xp_to_next_level(character.level);
    }
    if let Some(xp) = input.xp {
        character.xp = xp;
    }
    if let Some(stats) = input.stats {
        character.stats = stats;
    }
    if let Some(streak) = input.streak {
        character.streak = streak;
    }
}

/// Roll daily quests over to a new day: instances from other days are
/// cleared and the count and status recomputed from what remains, so a quest
/// already completed `today` stays completed.
pub fn refresh_daily_quests(state: &mut ProgressState, today: NaiveDate) {
    for quest in state
        .quests
        .iter_mut()
        .filter(|q| q.quest_type == QuestType::Daily)
    {
        quest.completed_instances.retain(|i| i.date == today);
        quest.failed_instances.retain(|i| i.date == today);
        quest.completion_count = quest.completed_instances.len() as u32;
        quest.status = if quest.completion_count >= quest.max_completions {
            QuestStatus::Completed
        } else if !quest.failed_instances.is_empty() {
            QuestStatus::Failed
        } else {
            QuestStatus::Active
        };
    }
}

/// Recovery path: throw away all daily quests (history included) and re-seed
/// the canonical dailies. Weekly, monthly, and custom quests are preserved.
pub fn force_refresh_daily_quests(state: &mut ProgressState) {
    state.quests.retain(|q| q.quest_type != QuestType::Daily);
    state.quests.extend(defaults::default_daily_quests());
}

/// Full factory reset: fresh character, fresh starter catalog.
pub fn reset(state: &mut ProgressState) {
    state.character = defaults::default_character();
    state.quests = defaults::default_quests();
}

/// Seed the starter catalog into a collection that has never been seeded.
/// Safe to call repeatedly: the guard checks for any persistent quest.
pub fn seed_default_quests(state: &mut ProgressState) {
    if defaults::needs_seeding(&state.quests) {
        state.quests.extend(defaults::default_quests());
    }
}
