use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::StatBoosts;

/// A trackable habit with a reward and a recurrence policy.
///
/// Quests carry their own completion history: every completion (and failure)
/// appends a dated [`QuestInstance`]. A quest may be completed at most once
/// per calendar date, and at most `max_completions` times overall before its
/// status becomes terminally `Completed`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quest {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub quest_type: QuestType,
    /// XP awarded to the character per completion.
    pub xp_reward: u32,
    /// Stat deltas applied to the character per completion.
    pub stat_boosts: StatBoosts,
    /// Whether the quest recurs rather than being a one-off. The starter
    /// catalog's seeding guard keys off this flag.
    pub is_persistent: bool,
    /// Completions allowed before the quest terminates. Always ≥ 1.
    pub max_completions: u32,
    pub status: QuestStatus,
    pub completion_count: u32,
    pub completed_instances: Vec<QuestInstance>,
    pub failed_instances: Vec<QuestInstance>,
    pub created_at: DateTime<Utc>,
}

impl Quest {
    /// Whether a completed instance already exists for `date`.
    pub fn completed_on(&self, date: NaiveDate) -> bool {
        self.completed_instances.iter().any(|i| i.date == date)
    }
}

/// One dated occurrence of a completion or failure.
///
/// `date` is the calendar day the occurrence counts for (the idempotence key:
/// a quest can complete at most once per date); `timestamp` is the instant it
/// was recorded, which may differ when back-filling a past day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestInstance {
    pub date: NaiveDate,
    pub timestamp: DateTime<Utc>,
    /// XP this instance granted; `uncheck` subtracts exactly this amount.
    pub xp: u32,
    /// Stat deltas this instance applied.
    pub stat_boosts: StatBoosts,
}

/// The recurrence class of a quest.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum QuestType {
    Daily,
    Weekly,
    Monthly,
    Custom,
}

impl QuestType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Custom => "custom",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "daily" => Some(Self::Daily),
            "weekly" => Some(Self::Weekly),
            "monthly" => Some(Self::Monthly),
            "custom" => Some(Self::Custom),
            _ => None,
        }
    }
}

/// The lifecycle status of a quest.
///
/// - `Active`: completable today
/// - `Completed`: reached `max_completions`
/// - `Failed`: explicitly marked failed (resets the streak)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum QuestStatus {
    Active,
    Completed,
    Failed,
}

impl QuestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "active" => Some(Self::Active),
            "completed" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}

/// Input for creating a new quest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateQuestInput {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub quest_type: QuestType,
    pub xp_reward: u32,
    #[serde(default)]
    pub stat_boosts: StatBoosts,
    #[serde(default)]
    pub is_persistent: bool,
    /// Defaults to 1 when omitted; values below 1 are clamped up.
    pub max_completions: Option<u32>,
}
