use chrono::Utc;
use uuid::Uuid;

use crate::models::{
    Character, CharacterStats, Quest, QuestStatus, QuestType, StatBoosts,
};

use super::progression::xp_to_next_level;

/// One entry in the canonical starter catalog.
struct DefaultQuest {
    title: &'static str,
    description: &'static str,
    quest_type: QuestType,
    xp_reward: u32,
    stat_boosts: fn(u32) -> StatBoosts,
    boost_amount: u32,
    max_completions: u32,
}

/// The starter catalog: five daily habits, one weekly, one monthly.
const DEFAULT_QUESTS: &[DefaultQuest] = &[
    DefaultQuest {
        title: "Meditation",
        description: "Sit in stillness for at least ten minutes",
        quest_type: QuestType::Daily,
        xp_reward: 20,
        stat_boosts: StatBoosts::spirit,
        boost_amount: 1,
        max_completions: 1,
    },
    DefaultQuest {
        title: "Journaling",
        description: "Write down the day's thoughts and intentions",
        quest_type: QuestType::Daily,
        xp_reward: 20,
        stat_boosts: StatBoosts::wisdom,
        boost_amount: 1,
        max_completions: 1,
    },
    DefaultQuest {
        title: "Learning & Practicing",
        description: "Work on a craft or skill",
        quest_type: QuestType::Daily,
        xp_reward: 20,
        stat_boosts: StatBoosts::skill,
        boost_amount: 1,
        max_completions: 1,
    },
    DefaultQuest {
        title: "Yoga",
        description: "Move through a yoga session",
        quest_type: QuestType::Daily,
        xp_reward: 20,
        stat_boosts: StatBoosts::strength,
        boost_amount: 1,
        max_completions: 1,
    },
    DefaultQuest {
        title: "Reading",
        description: "Read something that stretches the mind",
        quest_type: QuestType::Daily,
        xp_reward: 20,
        stat_boosts: StatBoosts::intelligence,
        boost_amount: 1,
        max_completions: 1,
    },
    DefaultQuest {
        title: "Workout 3x",
        description: "Three training sessions over the week",
        quest_type: QuestType::Weekly,
        xp_reward: 50,
        stat_boosts: StatBoosts::strength,
        boost_amount: 2,
        max_completions: 3,
    },
    DefaultQuest {
        title: "Monthly Review",
        description: "Review the month: wins, misses, and adjustments",
        quest_type: QuestType::Monthly,
        xp_reward: 100,
        stat_boosts: StatBoosts::wisdom,
        boost_amount: 3,
        max_completions: 1,
    },
];

/// A fresh character: level 1, no XP, all stats at 10.
pub fn default_character() -> Character {
    Character {
        level: 1,
        xp: 0,
        xp_to_next_level: xp_to_next_level(1),
        stats: CharacterStats::default(),
        streak: 0,
        last_quest_completed: None,
        last_completed_date: None,
    }
}

/// Build the full starter catalog with fresh ids and timestamps.
pub fn default_quests() -> Vec<Quest> {
    DEFAULT_QUESTS.iter().map(build_quest).collect()
}

/// Build only the daily portion of the starter catalog (used by the forced
/// daily refresh, which re-seeds dailies but keeps everything else).
pub fn default_daily_quests() -> Vec<Quest> {
    DEFAULT_QUESTS
        .iter()
        .filter(|d| d.quest_type == QuestType::Daily)
        .map(build_quest)
        .collect()
}

/// Whether the collection still needs seeding. Default quests are all
/// persistent, so the presence of any persistent quest means seeding already
/// happened (or the user created recurring quests of their own, which is
/// treated the same to avoid piling defaults onto an established account).
pub fn needs_seeding(quests: &[Quest]) -> bool {
    !quests.iter().any(|q| q.is_persistent)
}

fn build_quest(d: &DefaultQuest) -> Quest {
    Quest {
        id: Uuid::new_v4(),
        title: d.title.to_string(),
        description: d.description.to_string(),
        quest_type: d.quest_type,
        xp_reward: d.xp_reward,
        stat_boosts: (d.stat_boosts)(d.boost_amount),
        is_persistent: true,
        max_completions: d.max_completions,
        status: QuestStatus::Active,
        completion_count: 0,
        completed_instances: Vec::new(),
        failed_instances: Vec::new(),
        created_at: Utc::now(),
    }
}
