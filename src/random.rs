//! Difficulty tables and weighted random picks used by the spawners.

use bracket_random::prelude::RandomNumberGenerator;

/// Inclusive `[min, max]` roll.
pub fn randint(rng: &mut RandomNumberGenerator, min: i32, max: i32) -> i32 {
    if max <= min {
        return min;
    }
    rng.range(min, max + 1)
}

/// Picks the value of the last `(value, min_level)` entry whose level
/// requirement is met. Tables are ordered by ascending level.
pub fn from_dungeon_level(table: &[(i32, i32)], dungeon_level: i32) -> i32 {
    table
        .iter()
        .rev()
        .find(|(_, level)| dungeon_level >= *level)
        .map(|(value, _)| *value)
        .unwrap_or(0)
}

/// Rolls `1..=sum(chances)` and returns the first index whose running sum
/// reaches the roll. Returns `None` when every weight is zero.
pub fn random_choice_index(rng: &mut RandomNumberGenerator, chances: &[i32]) -> Option<usize> {
    let total: i32 = chances.iter().copied().filter(|c| *c > 0).sum();
    if total <= 0 {
        return None;
    }
    let roll = randint(rng, 1, total);
    let mut running_sum = 0;
    for (idx, chance) in chances.iter().enumerate() {
        if *chance <= 0 {
            continue;
        }
        running_sum += chance;
        if roll <= running_sum {
            return Some(idx);
        }
    }
    None
}

pub fn random_choice<T: Copy>(rng: &mut RandomNumberGenerator, table: &[(T, i32)]) -> Option<T> {
    let chances: Vec<i32> = table.iter().map(|(_, chance)| *chance).collect();
    random_choice_index(rng, &chances).map(|idx| table[idx].0)
}
