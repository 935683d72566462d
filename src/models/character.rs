use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// The user's progression profile.
///
/// There is exactly one character per user. It is created with fixed defaults
/// on first load and mutated in place by the progress store; completing quests
/// awards XP and stat boosts, failing quests breaks the streak.
///
/// `xp` counts progress *within* the current level: when it crosses
/// [`xp_to_next_level`](Character::xp_to_next_level) the level increments and
/// the threshold is subtracted, so multi-level jumps from a single large
/// reward work naturally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Character {
    pub level: u32,
    pub xp: u32,
    pub xp_to_next_level: u32,
    pub stats: CharacterStats,
    /// Consecutive calendar days with at least one completion.
    pub streak: u32,
    /// Instant of the most recent completion, if any.
    pub last_quest_completed: Option<DateTime<Utc>>,
    /// Calendar day of the most recent completion. Kept separately from the
    /// timestamp because completions can be recorded for a past date.
    pub last_completed_date: Option<NaiveDate>,
}

/// The five trainable attributes. All start at 10.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterStats {
    pub strength: u32,
    pub intelligence: u32,
    pub skill: u32,
    pub wisdom: u32,
    pub spirit: u32,
}

impl Default for CharacterStats {
    fn default() -> Self {
        Self {
            strength: 10,
            intelligence: 10,
            skill: 10,
            wisdom: 10,
            spirit: 10,
        }
    }
}

impl CharacterStats {
    /// Apply a set of boosts (from completing a quest). Saturates at
    /// `u32::MAX` rather than overflowing, mirroring the revert path.
    pub fn apply(&mut self, boosts: &StatBoosts) {
        self.strength = self.strength.saturating_add(boosts.strength);
        self.intelligence = self.intelligence.saturating_add(boosts.intelligence);
        self.skill = self.skill.saturating_add(boosts.skill);
        self.wisdom = self.wisdom.saturating_add(boosts.wisdom);
        self.spirit = self.spirit.saturating_add(boosts.spirit);
    }

    /// Undo a previously applied set of boosts (from unchecking a quest).
    /// Saturates at zero rather than underflowing.
    pub fn revert(&mut self, boosts: &StatBoosts) {
        self.strength = self.strength.saturating_sub(boosts.strength);
        self.intelligence = self.intelligence.saturating_sub(boosts.intelligence);
        self.skill = self.skill.saturating_sub(boosts.skill);
        self.wisdom = self.wisdom.saturating_sub(boosts.wisdom);
        self.spirit = self.spirit.saturating_sub(boosts.spirit);
    }
}

/// Per-stat deltas granted by a quest completion. Every field defaults to 0
/// so quest definitions only name the stats they train.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatBoosts {
    pub strength: u32,
    pub intelligence: u32,
    pub skill: u32,
    pub wisdom: u32,
    pub spirit: u32,
}

impl StatBoosts {
    pub fn strength(n: u32) -> Self {
        Self {
            strength: n,
            ..Self::default()
        }
    }

    pub fn intelligence(n: u32) -> Self {
        Self {
            intelligence: n,
            ..Self::default()
        }
    }

    pub fn skill(n: u32) -> Self {
        Self {
            skill: n,
            ..Self::default()
        }
    }

    pub fn wisdom(n: u32) -> Self {
        Self {
            wisdom: n,
            ..Self::default()
        }
    }

    pub fn spirit(n: u32) -> Self {
        Self {
            spirit: n,
            ..Self::default()
        }
    }
}

/// Input for a partial character update. Omitted fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateCharacterInput {
    pub level: Option<u32>,
    pub xp: Option<u32>,
    pub stats: Option<CharacterStats>,
    pub streak: Option<u32>,
}
