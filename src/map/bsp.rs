//! Binary space partition floors: the map is split recursively, every leaf
//! gets a room and every split is bridged by a corridor that digs until it
//! meets open floor.

use bracket_geometry::prelude::{Point, Rect};
use bracket_random::prelude::RandomNumberGenerator;

use crate::{config::Config, ecs::EcsWorld, random::randint};

use super::{GameMap, MapError, populate::place_entities};

const MAX_RATIO: f32 = 1.5;

#[derive(Clone, Debug)]
struct BspNode {
    x: i32,
    y: i32,
    w: i32,
    h: i32,
    /// Split line runs horizontally: the first child is above the second.
    horizontal: bool,
    children: Option<Box<(BspNode, BspNode)>>,
}

impl BspNode {
    fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self {
            x,
            y,
            w,
            h,
            horizontal: false,
            children: None,
        }
    }

    fn split_recursive(
        &mut self,
        rng: &mut RandomNumberGenerator,
        depth: u32,
        min_w: i32,
        min_h: i32,
    ) {
        if depth == 0 || (self.w < 2 * min_w && self.h < 2 * min_h) {
            return;
        }
        let horizontal = if self.h < 2 * min_h || self.w as f32 > self.h as f32 * MAX_RATIO {
            false
        } else if self.w < 2 * min_w || self.h as f32 > self.w as f32 * MAX_RATIO {
            true
        } else {
            randint(rng, 0, 1) == 0
        };

        let (first, second) = if horizontal {
            let pos = randint(rng, self.y + min_h, self.y + self.h - min_h);
            (
                BspNode::new(self.x, self.y, self.w, pos - self.y),
                BspNode::new(self.x, pos, self.w, self.y + self.h - pos),
            )
        } else {
            let pos = randint(rng, self.x + min_w, self.x + self.w - min_w);
            (
                BspNode::new(self.x, self.y, pos - self.x, self.h),
                BspNode::new(pos, self.y, self.x + self.w - pos, self.h),
            )
        };
        self.horizontal = horizontal;
        let mut children = Box::new((first, second));
        children.0.split_recursive(rng, depth - 1, min_w, min_h);
        children.1.split_recursive(rng, depth - 1, min_w, min_h);
        self.children = Some(children);
    }

    /// Children before parents, so every corridor sees its children's
    /// final extents.
    fn carve(
        &mut self,
        map: &mut GameMap,
        rng: &mut RandomNumberGenerator,
        config: &Config,
        rooms: &mut Vec<Rect>,
    ) {
        if self.children.is_none() {
            self.carve_leaf(map, rng, config, rooms);
            return;
        }
        let Some(children) = self.children.as_mut() else {
            return;
        };
        children.0.carve(map, rng, config, rooms);
        children.1.carve(map, rng, config, rooms);
        let (left, right) = (&children.0, &children.1);
        self.x = left.x.min(right.x);
        self.y = left.y.min(right.y);
        self.w = (left.x + left.w).max(right.x + right.w) - self.x;
        self.h = (left.y + left.h).max(right.y + right.h) - self.y;
        connect(map, rng, self.horizontal, left, right);
    }

    fn carve_leaf(
        &mut self,
        map: &mut GameMap,
        rng: &mut RandomNumberGenerator,
        config: &Config,
        rooms: &mut Vec<Rect>,
    ) {
        let min_size = config.bsp_min_size;
        let mut min_x = self.x + 1;
        let mut max_x = self.x + self.w - 1;
        let mut min_y = self.y + 1;
        let mut max_y = self.y + self.h - 1;
        // Rooms never touch the map edge.
        if max_x >= map.width - 1 {
            max_x = map.width - 2;
        }
        if max_y >= map.height - 1 {
            max_y = map.height - 2;
        }
        if max_x < min_x || max_y < min_y {
            return;
        }

        if !config.bsp_full_rooms {
            let leaf_max_x = max_x;
            let leaf_max_y = max_y;
            min_x = randint(rng, min_x, max_x - min_size + 1);
            min_y = randint(rng, min_y, max_y - min_size + 1);
            max_x = randint(rng, min_x + min_size - 2, leaf_max_x).min(leaf_max_x);
            max_y = randint(rng, min_y + min_size - 2, leaf_max_y).min(leaf_max_y);
        }

        self.x = min_x;
        self.y = min_y;
        self.w = max_x - min_x + 1;
        self.h = max_y - min_y + 1;

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                map.dig(Point::new(x, y));
            }
        }
        // Stored with a one-tile outline so the interior is exactly the dug area.
        rooms.push(Rect::with_size(
            min_x - 1,
            min_y - 1,
            max_x - min_x + 2,
            max_y - min_y + 2,
        ));
    }
}

fn connect(
    map: &mut GameMap,
    rng: &mut RandomNumberGenerator,
    horizontal: bool,
    left: &BspNode,
    right: &BspNode,
) {
    if horizontal {
        if left.x + left.w - 1 < right.x || right.x + right.w - 1 < left.x {
            let x1 = randint(rng, left.x, left.x + left.w - 1);
            let x2 = randint(rng, right.x, right.x + right.w - 1);
            let y = randint(rng, left.y + left.h, right.y);
            dig_until_open(map, Point::new(x1, y - 1), Point::new(0, -1));
            map.create_h_tunnel(x1, x2, y);
            dig_until_open(map, Point::new(x2, y + 1), Point::new(0, 1));
        } else {
            let min_x = left.x.max(right.x);
            let max_x = (left.x + left.w - 1).min(right.x + right.w - 1);
            let x = randint(rng, min_x, max_x).min(map.width - 1);
            dig_until_open(map, Point::new(x, right.y), Point::new(0, 1));
            dig_until_open(map, Point::new(x, right.y - 1), Point::new(0, -1));
        }
    } else if left.y + left.h - 1 < right.y || right.y + right.h - 1 < left.y {
        let y1 = randint(rng, left.y, left.y + left.h - 1);
        let y2 = randint(rng, right.y, right.y + right.h - 1);
        let x = randint(rng, left.x + left.w, right.x);
        dig_until_open(map, Point::new(x - 1, y1), Point::new(-1, 0));
        map.create_v_tunnel(y1, y2, x);
        dig_until_open(map, Point::new(x + 1, y2), Point::new(1, 0));
    } else {
        let min_y = left.y.max(right.y);
        let max_y = (left.y + left.h - 1).min(right.y + right.h - 1);
        let y = randint(rng, min_y, max_y).min(map.height - 1);
        dig_until_open(map, Point::new(right.x - 1, y), Point::new(-1, 0));
        dig_until_open(map, Point::new(right.x, y), Point::new(1, 0));
    }
}

/// Digs from `start` in direction `step` for as long as the tiles are wall.
fn dig_until_open(map: &mut GameMap, start: Point, step: Point) {
    let mut cursor = start;
    while map.in_bounds(cursor) && map.is_blocked(cursor) {
        map.dig(cursor);
        cursor = Point::new(cursor.x + step.x, cursor.y + step.y);
    }
}

/// Builds a BSP floor. One random room gets the stairs, another the
/// player, the rest are populated. Returns every room carved.
pub fn make_bsp(
    map: &mut GameMap,
    config: &Config,
    ecs: &mut EcsWorld,
    rng: &mut RandomNumberGenerator,
) -> Result<Vec<Rect>, MapError> {
    let min_size = config.bsp_min_size + 1;
    let mut root = BspNode::new(0, 0, map.width, map.height);
    root.split_recursive(rng, config.bsp_depth, min_size, min_size);

    let mut rooms = Vec::new();
    root.carve(map, rng, config, &mut rooms);
    if rooms.len() < 2 {
        return Err(MapError::NoRooms {
            width: map.width,
            height: map.height,
        });
    }

    let mut order: Vec<usize> = (0..rooms.len()).collect();
    let stairs_room = order.swap_remove(rng.range(0, order.len() as i32) as usize);
    let player_room = order.swap_remove(rng.range(0, order.len() as i32) as usize);
    ecs.set_player_position(rooms[player_room].center());
    ecs.spawn_stairs(rooms[stairs_room].center(), map.dungeon_level + 1);

    for idx in order {
        place_entities(&rooms[idx], map.dungeon_level, ecs, rng);
    }
    Ok(rooms)
}
