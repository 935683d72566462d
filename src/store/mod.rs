//! The progress store: single source of truth for a user's character and
//! quest collection.
//!
//! All mutation goes through [`ProgressStore`], which applies a pure
//! transition from [`reducer`] and then snapshots the whole state to the
//! persistence adapter. Persistence failures are logged and swallowed; the
//! in-memory state stays authoritative for the session.

pub mod defaults;
pub mod progression;
pub mod reducer;

use std::sync::Arc;

use chrono::{Local, NaiveDate, Utc};
use uuid::Uuid;

use crate::error::StoreError;
use crate::models::{Character, CreateQuestInput, Quest, QuestType, UpdateCharacterInput};
use crate::storage::{KeyValueStore, Namespace};

/// The in-memory state the reducer transitions operate on.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressState {
    pub character: Character,
    pub quests: Vec<Quest>,
}

impl Default for ProgressState {
    fn default() -> Self {
        Self {
            character: defaults::default_character(),
            quests: Vec::new(),
        }
    }
}

/// Today's calendar date in the user's local timezone. Quest completion is
/// keyed by local days, not UTC days.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

pub struct ProgressStore {
    state: ProgressState,
    storage: Arc<dyn KeyValueStore>,
    namespace: Option<Namespace>,
}

impl ProgressStore {
    /// A store with default state and no user context. Mutations before
    /// [`initialize`](Self::initialize) work on in-memory defaults and are
    /// not persisted.
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self {
            state: ProgressState::default(),
            storage,
            namespace: None,
        }
    }

    /// Load (or seed) state for `user_id`.
    ///
    /// Idempotent per user: a second call with the same id is a no-op. A
    /// missing or unparsable snapshot falls back to defaults with a log
    /// line. Also seeds the starter catalog on first contact and runs the
    /// day-boundary refresh, which is what actually rolls daily quests over
    /// when the midnight timer never fired.
    pub fn initialize(&mut self, user_id: &str) {
        if self
            .namespace
            .as_ref()
            .is_some_and(|n| n.user_id() == user_id)
        {
            return;
        }

        let namespace = Namespace::for_user(user_id);
        self.state = self.load_snapshot(&namespace);
        self.namespace = Some(namespace);

        reducer::seed_default_quests(&mut self.state);
        reducer::refresh_daily_quests(&mut self.state, today());
        self.persist();
    }

    pub fn is_initialized(&self) -> bool {
        self.namespace.is_some()
    }

    pub fn character(&self) -> &Character {
        &self.state.character
    }

    pub fn quests(&self) -> &[Quest] {
        &self.state.quests
    }

    pub fn quest(&self, id: Uuid) -> Option<&Quest> {
        self.state.quests.iter().find(|q| q.id == id)
    }

    /// All quests of the given type, in collection order.
    pub fn quests_by_type(&self, quest_type: QuestType) -> Vec<Quest> {
        self.state
            .quests
            .iter()
            .filter(|q| q.quest_type == quest_type)
            .cloned()
            .collect()
    }

    pub fn add_quest(&mut self, input: CreateQuestInput) -> Quest {
        let quest = reducer::add_quest(&mut self.state, input);
        self.persist();
        quest
    }

    /// Complete a quest for `date` (today when omitted). Unknown ids,
    /// duplicate dates, and capped quests are logged no-ops.
    pub fn complete_quest(&mut self, id: Uuid, date: Option<NaiveDate>) -> Result<(), StoreError> {
        let date = date.unwrap_or_else(today);
        match reducer::complete_quest(&mut self.state, id, date, Utc::now()) {
            Ok(()) => {
                self.persist();
                Ok(())
            }
            Err(e) => {
                tracing::warn!("complete_quest skipped: {}", e);
                Err(e)
            }
        }
    }

    /// Undo a completion recorded for `date`.
    pub fn uncheck_quest(&mut self, id: Uuid, date: NaiveDate) -> Result<(), StoreError> {
        match reducer::uncheck_quest(&mut self.state, id, date) {
            Ok(()) => {
                self.persist();
                Ok(())
            }
            Err(e) => {
                tracing::warn!("uncheck_quest skipped: {}", e);
                Err(e)
            }
        }
    }

    /// Mark a quest failed for `date` (today when omitted). Always resets
    /// the streak.
    pub fn fail_quest(&mut self, id: Uuid, date: Option<NaiveDate>) -> Result<(), StoreError> {
        let date = date.unwrap_or_else(today);
        match reducer::fail_quest(&mut self.state, id, date, Utc::now()) {
            Ok(()) => {
                self.persist();
                Ok(())
            }
            Err(e) => {
                tracing::warn!("fail_quest skipped: {}", e);
                Err(e)
            }
        }
    }

    pub fn delete_quest(&mut self, id: Uuid) -> Result<(), StoreError> {
        match reducer::delete_quest(&mut self.state, id) {
            Ok(()) => {
                self.persist();
                Ok(())
            }
            Err(e) => {
                tracing::warn!("delete_quest skipped: {}", e);
                Err(e)
            }
        }
    }

    pub fn update_character(&mut self, input: UpdateCharacterInput) {
        reducer::update_character(&mut self.state, input);
        self.persist();
    }

    /// Roll daily quests over to today. Scheduled by the owner at local
    /// midnight; `initialize` runs the same transition on load.
    pub fn refresh_daily_quests(&mut self) {
        reducer::refresh_daily_quests(&mut self.state, today());
        self.persist();
    }

    /// Recovery path: drop all daily quests and re-seed the canonical
    /// dailies, preserving everything else.
    pub fn force_refresh_daily_quests(&mut self) {
        reducer::force_refresh_daily_quests(&mut self.state);
        self.persist();
    }

    /// Full account wipe for the current user: factory character, factory
    /// catalog, snapshot overwritten.
    pub fn reset_progress(&mut self) {
        reducer::reset(&mut self.state);
        self.persist();
    }

    fn load_snapshot(&self, namespace: &Namespace) -> ProgressState {
        let character = self
            .read_key(&namespace.character_key())
            .unwrap_or_else(defaults::default_character);
        let quests = self
            .read_key(&namespace.quests_key())
            .unwrap_or_default();
        ProgressState { character, quests }
    }

    fn read_key<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.storage.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!("failed to read {}: {}", key, e);
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!("discarding corrupt snapshot at {}: {}", key, e);
                None
            }
        }
    }

    /// Snapshot the whole state under the user's namespace. Serialization
    /// and storage errors are logged, never propagated: the session keeps
    /// running on in-memory state.
    fn persist(&self) {
        let Some(namespace) = &self.namespace else {
            return;
        };
        self.write_key(&namespace.character_key(), &self.state.character);
        self.write_key(&namespace.quests_key(), &self.state.quests);
    }

    fn write_key<T: serde::Serialize>(&self, key: &str, value: &T) {
        let raw = match serde_json::to_string(value) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::error!("failed to serialize {}: {}", key, e);
                return;
            }
        };
        if let Err(e) = self.storage.set(key, &raw) {
            tracing::error!("failed to persist {}: {}", key, e);
        }
    }
}
