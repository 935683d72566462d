use chrono::{Days, NaiveDate};

use crate::models::Character;

/// XP required to advance past `level`: `floor(100 * 1.2^(level-1))`.
///
/// Level 1 → 100, level 2 → 120, level 3 → 144, and so on. The threshold is
/// always ≥ 1: the exponent saturates instead of wrapping for levels beyond
/// `i32::MAX`, and the float-to-int cast saturates at `u32::MAX` once the
/// curve outgrows it (around level 120).
pub fn xp_to_next_level(level: u32) -> u32 {
    let exponent = level.saturating_sub(1).try_into().unwrap_or(i32::MAX);
    (100.0 * 1.2_f64.powi(exponent)).floor() as u32
}

/// Award XP to the character, leveling up as many times as the total allows.
///
/// The threshold is subtracted on each level-up, so `xp` always measures
/// progress within the current level. A single large award can produce
/// multiple level-ups.
pub fn award_xp(character: &mut Character, amount: u32) {
    character.xp = character.xp.saturating_add(amount);
    while character.xp >= character.xp_to_next_level {
        character.xp -= character.xp_to_next_level;
        character.level = character.level.saturating_add(1);
        character.xp_to_next_level = xp_to_next_level(character.level);
    }
}

/// Take XP back from the character (when a completion is unchecked).
///
/// Only the XP counter is reverted: past level-ups are not replayed
/// downward, and `xp_to_next_level` stays derived from the current level.
pub fn revoke_xp(character: &mut Character, amount: u32) {
    character.xp = character.xp.saturating_sub(amount);
    character.xp_to_next_level = xp_to_next_level(character.level);
}

/// The streak value after recording a completion on `date`.
///
/// - no prior completion → 1
/// - prior completion was yesterday → streak + 1
/// - prior completion was today → unchanged
/// - anything else (gap, or a back-filled older date) → 1
pub fn next_streak(current: u32, last_completed: Option<NaiveDate>, date: NaiveDate) -> u32 {
    match last_completed {
        None => 1,
        Some(prev) if prev == date => current,
        Some(prev) if prev.checked_add_days(Days::new(1)) == Some(date) => current + 1,
        Some(_) => 1,
    }
}
