//! Spawn templates and the per-level chance tables that weight them.

pub mod items;
pub mod monsters;

use crate::random::from_dungeon_level;

use self::{items::ItemKind, monsters::MonsterKind};

pub fn max_monsters_per_room(dungeon_level: i32) -> i32 {
    from_dungeon_level(&[(2, 1), (3, 4), (5, 6)], dungeon_level)
}

pub fn max_items_per_room(dungeon_level: i32) -> i32 {
    from_dungeon_level(&[(1, 1), (2, 4)], dungeon_level)
}

pub fn monster_chances(dungeon_level: i32) -> Vec<(MonsterKind, i32)> {
    vec![
        (MonsterKind::Orc, 80),
        (
            MonsterKind::Troll,
            from_dungeon_level(&[(15, 3), (30, 5), (60, 7)], dungeon_level),
        ),
    ]
}

pub fn item_chances(dungeon_level: i32) -> Vec<(ItemKind, i32)> {
    vec![
        (ItemKind::HealingPotion, 35),
        (ItemKind::Sword, from_dungeon_level(&[(5, 4)], dungeon_level)),
        (ItemKind::Shield, from_dungeon_level(&[(15, 8)], dungeon_level)),
        (
            ItemKind::LightningScroll,
            from_dungeon_level(&[(25, 4)], dungeon_level),
        ),
        (
            ItemKind::FireballScroll,
            from_dungeon_level(&[(25, 6)], dungeon_level),
        ),
        (
            ItemKind::ConfusionScroll,
            from_dungeon_level(&[(10, 2)], dungeon_level),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chance_of<T: PartialEq + Copy>(table: &[(T, i32)], kind: T) -> i32 {
        table
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, c)| *c)
            .unwrap_or_default()
    }

    #[test]
    fn first_floor_only_spawns_orcs_and_potions() {
        let monsters = monster_chances(1);
        assert_eq!(chance_of(&monsters, MonsterKind::Troll), 0);
        let items = item_chances(1);
        let live: Vec<ItemKind> = items.iter().filter(|(_, c)| *c > 0).map(|(k, _)| *k).collect();
        assert_eq!(live, vec![ItemKind::HealingPotion]);
    }

    #[test]
    fn deeper_floors_unlock_trolls_and_scrolls() {
        assert_eq!(chance_of(&monster_chances(5), MonsterKind::Troll), 30);
        assert_eq!(chance_of(&monster_chances(7), MonsterKind::Troll), 60);
        assert_eq!(chance_of(&item_chances(2), ItemKind::ConfusionScroll), 10);
        assert_eq!(chance_of(&item_chances(6), ItemKind::FireballScroll), 25);
        assert_eq!(chance_of(&item_chances(8), ItemKind::Shield), 15);
        assert_eq!(max_monsters_per_room(6), 5);
        assert_eq!(max_items_per_room(4), 2);
    }
}
