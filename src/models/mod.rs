//! Domain models for Habit Berserk.
//!
//! # Core Concepts
//!
//! - [`Character`]: the user's progression profile — level, XP, stats, and
//!   streak. One per user, mutated only through the progress store.
//! - [`Quest`]: a trackable habit with an XP reward, stat boosts, and a
//!   recurrence policy (daily/weekly/monthly/custom).
//! - [`QuestInstance`]: one dated completion or failure record. The `date`
//!   field is the idempotence key: at most one completed instance exists per
//!   quest per calendar day.

mod character;
mod quest;

pub use character::*;
pub use quest::*;
