use bracket_geometry::prelude::Point;
use specs::prelude::Entity;

use crate::{map::GameMap, messages::Message};

/// Walkability and opacity of the current floor, copied out of the
/// `GameMap` so systems can read it without borrowing the game.
#[derive(Clone, Debug, Default)]
pub struct MapContext {
    pub width: i32,
    pub height: i32,
    blocked: Vec<bool>,
    opaque: Vec<bool>,
}

impl MapContext {
    pub fn from_map(map: &GameMap) -> Self {
        let blocked = map.tiles.iter().map(|tile| tile.blocked).collect();
        let opaque = map.tiles.iter().map(|tile| tile.block_sight).collect();
        Self {
            width: map.width,
            height: map.height,
            blocked,
            opaque,
        }
    }

    pub fn is_blocked(&self, point: Point) -> bool {
        if !self.in_bounds(point) {
            return true;
        }
        let idx = (point.y * self.width + point.x) as usize;
        self.blocked.get(idx).copied().unwrap_or(true)
    }

    pub fn blocks_sight(&self, point: Point) -> bool {
        if !self.in_bounds(point) {
            return true;
        }
        let idx = (point.y * self.width + point.x) as usize;
        self.opaque.get(idx).copied().unwrap_or(true)
    }

    pub fn in_bounds(&self, point: Point) -> bool {
        point.x >= 0 && point.x < self.width && point.y >= 0 && point.y < self.height
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PlayerEntity(pub Entity);

/// Everything a turn can report back to the engine, in order.
#[derive(Clone, Debug, PartialEq)]
pub enum TurnEvent {
    Message(Message),
    Dead { entity: Entity, xp: i32 },
    ItemAdded(Entity),
    ItemConsumed(Entity),
    ItemDropped(Entity),
    Equip(Entity),
    Equipped(Entity),
    Dequipped(Entity),
    Targeting(Entity),
    TargetingCancelled,
}

impl From<Message> for TurnEvent {
    fn from(message: Message) -> Self {
        TurnEvent::Message(message)
    }
}

#[derive(Default)]
pub struct TurnLog {
    pub events: Vec<TurnEvent>,
}

impl TurnLog {
    pub fn push<E: Into<TurnEvent>>(&mut self, event: E) {
        self.events.push(event.into());
    }

    pub fn extend<I: IntoIterator<Item = TurnEvent>>(&mut self, events: I) {
        self.events.extend(events);
    }
}
