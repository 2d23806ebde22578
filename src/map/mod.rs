pub mod bsp;
pub mod populate;
pub mod rooms;

use bracket_geometry::prelude::{Point, Rect};
use bracket_random::prelude::RandomNumberGenerator;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::{
    config::{Config, MapAlgorithm},
    ecs::EcsWorld,
    messages::{Message, MessageLog},
    palette,
};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MapError {
    #[error("no room could be placed on a {width}x{height} map")]
    NoRooms { width: i32, height: i32 },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    pub blocked: bool,
    pub block_sight: bool,
    pub explored: bool,
}

impl Default for Tile {
    fn default() -> Self {
        Tile::wall()
    }
}

impl Tile {
    pub const fn wall() -> Self {
        Self {
            blocked: true,
            block_sight: true,
            explored: false,
        }
    }

    pub const fn floor() -> Self {
        Self {
            blocked: false,
            block_sight: false,
            explored: false,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GameMap {
    pub width: i32,
    pub height: i32,
    pub dungeon_level: i32,
    pub tiles: Vec<Tile>,
}

impl GameMap {
    pub fn new(width: i32, height: i32, dungeon_level: i32) -> Self {
        let size = (width.max(0) * height.max(0)) as usize;
        Self {
            width,
            height,
            dungeon_level,
            tiles: vec![Tile::wall(); size],
        }
    }

    /// Fills a fresh floor of the configured kind, placing the player and
    /// populating rooms. Returns the rooms carved.
    pub fn generate(
        &mut self,
        config: &Config,
        ecs: &mut EcsWorld,
        rng: &mut RandomNumberGenerator,
    ) -> Result<Vec<Rect>, MapError> {
        self.reset_tiles();
        let rooms = match config.map_algorithm {
            MapAlgorithm::Rooms => rooms::make_map(self, config, ecs, rng)?,
            MapAlgorithm::Bsp => bsp::make_bsp(self, config, ecs, rng)?,
        };
        info!(
            level = self.dungeon_level,
            rooms = rooms.len(),
            algorithm = ?config.map_algorithm,
            "generated floor"
        );
        Ok(rooms)
    }

    /// Descends one level: everything but the player and their pack is
    /// discarded and a new floor is built.
    pub fn next_floor(
        &mut self,
        config: &Config,
        ecs: &mut EcsWorld,
        log: &mut MessageLog,
        rng: &mut RandomNumberGenerator,
    ) -> Result<(), MapError> {
        self.dungeon_level += 1;
        ecs.clear_floor();
        self.generate(config, ecs, rng)?;
        ecs.heal_player_fraction(2);
        log.add_message(Message::new(
            "You take a moment to rest, and recover your strength.",
            palette::LIGHT_VIOLET,
        ));
        Ok(())
    }

    pub fn reset_tiles(&mut self) {
        self.tiles.iter_mut().for_each(|tile| *tile = Tile::wall());
    }

    fn idx(&self, point: Point) -> Option<usize> {
        self.in_bounds(point)
            .then(|| (point.y * self.width + point.x) as usize)
    }

    pub fn in_bounds(&self, point: Point) -> bool {
        point.x >= 0 && point.x < self.width && point.y >= 0 && point.y < self.height
    }

    pub fn tile(&self, point: Point) -> Option<&Tile> {
        self.idx(point).map(|idx| &self.tiles[idx])
    }

    pub fn is_blocked(&self, point: Point) -> bool {
        self.tile(point).is_none_or(|tile| tile.blocked)
    }

    pub fn is_explored(&self, point: Point) -> bool {
        self.tile(point).is_some_and(|tile| tile.explored)
    }

    pub fn dig(&mut self, point: Point) {
        if let Some(idx) = self.idx(point) {
            self.tiles[idx].blocked = false;
            self.tiles[idx].block_sight = false;
        }
    }

    pub fn mark_explored<'a, I: IntoIterator<Item = &'a Point>>(&mut self, points: I) {
        for point in points {
            if let Some(idx) = self.idx(*point) {
                self.tiles[idx].explored = true;
            }
        }
    }

    /// Opens the interior of `room`, leaving its outline as wall.
    pub fn create_room(&mut self, room: &Rect) {
        for y in room.y1 + 1..room.y2 {
            for x in room.x1 + 1..room.x2 {
                self.dig(Point::new(x, y));
            }
        }
    }

    pub fn create_h_tunnel(&mut self, x1: i32, x2: i32, y: i32) {
        for x in x1.min(x2)..=x1.max(x2) {
            self.dig(Point::new(x, y));
        }
    }

    pub fn create_v_tunnel(&mut self, y1: i32, y2: i32, x: i32) {
        for y in y1.min(y2)..=y1.max(y2) {
            self.dig(Point::new(x, y));
        }
    }

    pub fn floor_points(&self) -> Vec<Point> {
        let mut points = Vec::new();
        for y in 0..self.height {
            for x in 0..self.width {
                let point = Point::new(x, y);
                if !self.is_blocked(point) {
                    points.push(point);
                }
            }
        }
        points
    }
}
