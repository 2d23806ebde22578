use bracket_geometry::prelude::Point;
use serde::{Deserialize, Serialize};
use specs::prelude::{Component, Entity, NullStorage, VecStorage};

use crate::{messages::Message, palette::Color};

#[derive(Clone, Debug, PartialEq)]
pub struct Position {
    pub point: Point,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self {
            point: Point::new(x, y),
        }
    }
}

impl Component for Position {
    type Storage = VecStorage<Self>;
}

/// Draw priority; later variants are drawn on top.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RenderOrder {
    Stairs = 1,
    Corpse = 2,
    Item = 3,
    Actor = 4,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Renderable {
    pub glyph: char,
    pub color: Color,
    pub order: RenderOrder,
}

impl Component for Renderable {
    type Storage = VecStorage<Self>;
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Named {
    pub name: String,
}

impl Component for Named {
    type Storage = VecStorage<Self>;
}

#[derive(Default)]
pub struct BlocksTile;

impl Component for BlocksTile {
    type Storage = NullStorage<Self>;
}

#[derive(Default)]
pub struct PlayerTag;

impl Component for PlayerTag {
    type Storage = NullStorage<Self>;
}

#[derive(Clone, Debug, Default)]
pub struct Viewshed {
    pub radius: i32,
    pub dirty: bool,
    pub visible: Vec<Point>,
}

impl Component for Viewshed {
    type Storage = VecStorage<Self>;
}

/// Base combat numbers; equipment bonuses are added on top.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Fighter {
    pub base_max_hp: i32,
    pub hp: i32,
    pub base_defense: i32,
    pub base_power: i32,
    pub xp: i32,
}

impl Fighter {
    pub fn new(hp: i32, defense: i32, power: i32, xp: i32) -> Self {
        Self {
            base_max_hp: hp,
            hp,
            base_defense: defense,
            base_power: power,
            xp,
        }
    }
}

impl Component for Fighter {
    type Storage = VecStorage<Self>;
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Ai {
    Basic,
    Confused { previous: Box<Ai>, turns_left: i32 },
}

impl Ai {
    pub fn confuse(self, turns: i32) -> Self {
        Ai::Confused {
            previous: Box::new(self),
            turns_left: turns,
        }
    }
}

impl Component for Ai {
    type Storage = VecStorage<Self>;
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ItemEffect {
    Heal { amount: i32 },
    Lightning { damage: i32, maximum_range: i32 },
    Fireball { damage: i32, radius: i32 },
    Confuse { turns: i32 },
}

/// Anything that can be picked up. `targeting` carries the prompt shown when
/// the item needs a tile before it can be used.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub effect: Option<ItemEffect>,
    pub targeting: Option<Message>,
}

impl Component for Item {
    type Storage = VecStorage<Self>;
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EquipmentSlot {
    MainHand,
    OffHand,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Equippable {
    pub slot: EquipmentSlot,
    pub power_bonus: i32,
    pub defense_bonus: i32,
    pub max_hp_bonus: i32,
}

impl Equippable {
    pub fn new(slot: EquipmentSlot) -> Self {
        Self {
            slot,
            power_bonus: 0,
            defense_bonus: 0,
            max_hp_bonus: 0,
        }
    }
}

impl Component for Equippable {
    type Storage = VecStorage<Self>;
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Equipment {
    pub main_hand: Option<Entity>,
    pub off_hand: Option<Entity>,
}

impl Equipment {
    pub fn slot(&self, slot: EquipmentSlot) -> Option<Entity> {
        match slot {
            EquipmentSlot::MainHand => self.main_hand,
            EquipmentSlot::OffHand => self.off_hand,
        }
    }

    pub fn slot_mut(&mut self, slot: EquipmentSlot) -> &mut Option<Entity> {
        match slot {
            EquipmentSlot::MainHand => &mut self.main_hand,
            EquipmentSlot::OffHand => &mut self.off_hand,
        }
    }

    pub fn is_equipped(&self, item: Entity) -> bool {
        self.main_hand == Some(item) || self.off_hand == Some(item)
    }

    pub fn equipped(&self) -> impl Iterator<Item = Entity> + '_ {
        self.main_hand.into_iter().chain(self.off_hand)
    }
}

impl Component for Equipment {
    type Storage = VecStorage<Self>;
}

#[derive(Clone, Debug, PartialEq)]
pub struct Inventory {
    pub capacity: usize,
    pub items: Vec<Entity>,
}

impl Inventory {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            items: Vec::new(),
        }
    }

    pub fn is_full(&self) -> bool {
        self.items.len() >= self.capacity
    }
}

impl Component for Inventory {
    type Storage = VecStorage<Self>;
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Level {
    pub current_level: i32,
    pub current_xp: i32,
    pub level_up_base: i32,
    pub level_up_factor: i32,
}

impl Default for Level {
    fn default() -> Self {
        Self {
            current_level: 1,
            current_xp: 0,
            level_up_base: 200,
            level_up_factor: 150,
        }
    }
}

impl Level {
    pub fn experience_to_next_level(&self) -> i32 {
        self.level_up_base + self.current_level * self.level_up_factor
    }

    /// Returns true when the gain crossed a level threshold. Surplus
    /// experience carries into the new level.
    pub fn add_xp(&mut self, xp: i32) -> bool {
        self.current_xp += xp;
        let needed = self.experience_to_next_level();
        if self.current_xp > needed {
            self.current_xp -= needed;
            self.current_level += 1;
            true
        } else {
            false
        }
    }
}

impl Component for Level {
    type Storage = VecStorage<Self>;
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Stairs {
    pub floor: i32,
}

impl Component for Stairs {
    type Storage = VecStorage<Self>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_threshold_grows_with_level() {
        let mut level = Level::default();
        assert_eq!(level.experience_to_next_level(), 350);
        assert!(!level.add_xp(350));
        assert!(level.add_xp(35));
        assert_eq!(level.current_level, 2);
        assert_eq!(level.current_xp, 35);
        assert_eq!(level.experience_to_next_level(), 500);
    }

    #[test]
    fn confusion_wraps_previous_ai() {
        let ai = Ai::Basic.confuse(10);
        match ai {
            Ai::Confused {
                previous,
                turns_left,
            } => {
                assert_eq!(*previous, Ai::Basic);
                assert_eq!(turns_left, 10);
            }
            Ai::Basic => unreachable!(),
        }
    }
}
