//! Movement decisions for monsters: A* chase with a straight-line fallback,
//! and the stumbling walk of a confused monster.

use std::collections::HashSet;

use bracket_geometry::prelude::Point;
use bracket_pathfinding::prelude::{Algorithm2D, BaseMap, DistanceAlg, a_star_search};
use bracket_random::prelude::RandomNumberGenerator;
use smallvec::SmallVec;

use crate::ecs::resources::MapContext;

/// Paths at least this long are ignored in favour of a direct step.
pub const MAX_PATH_LENGTH: usize = 25;

const DIRECTIONS: [(i32, i32); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// The floor as seen by a monster planning a path: walls and other
/// blocking entities are impassable, the destination itself is not.
struct PathingMap<'a> {
    ctx: &'a MapContext,
    occupied: &'a HashSet<Point>,
    goal: Point,
}

impl PathingMap<'_> {
    fn passable(&self, point: Point) -> bool {
        !self.ctx.is_blocked(point) && (point == self.goal || !self.occupied.contains(&point))
    }
}

impl BaseMap for PathingMap<'_> {
    fn is_opaque(&self, idx: usize) -> bool {
        self.ctx.blocks_sight(self.index_to_point2d(idx))
    }

    fn get_available_exits(&self, idx: usize) -> SmallVec<[(usize, f32); 10]> {
        let mut exits = SmallVec::new();
        let point = self.index_to_point2d(idx);
        for (dx, dy) in DIRECTIONS {
            let dest = Point::new(point.x + dx, point.y + dy);
            if self.in_bounds(dest) && self.passable(dest) {
                let cost = if dx != 0 && dy != 0 { 1.41 } else { 1.0 };
                exits.push((self.point2d_to_index(dest), cost));
            }
        }
        exits
    }

    fn get_pathing_distance(&self, idx1: usize, idx2: usize) -> f32 {
        let p1 = self.index_to_point2d(idx1);
        let p2 = self.index_to_point2d(idx2);
        DistanceAlg::Pythagoras.distance2d(p1, p2)
    }
}

impl Algorithm2D for PathingMap<'_> {
    fn dimensions(&self) -> Point {
        Point::new(self.ctx.width, self.ctx.height)
    }

    fn in_bounds(&self, point: Point) -> bool {
        self.ctx.in_bounds(point)
    }
}

fn is_free(point: Point, ctx: &MapContext, occupied: &HashSet<Point>) -> bool {
    !ctx.is_blocked(point) && !occupied.contains(&point)
}

/// Next tile on the way from `from` to `to`, or `None` to stay put.
pub fn chase_step(
    from: Point,
    to: Point,
    ctx: &MapContext,
    occupied: &HashSet<Point>,
) -> Option<Point> {
    let map = PathingMap {
        ctx,
        occupied,
        goal: to,
    };
    let path = a_star_search(map.point2d_to_index(from), map.point2d_to_index(to), &map);
    // `steps` starts with the origin tile.
    if path.success && path.steps.len() > 1 && path.steps.len() - 1 < MAX_PATH_LENGTH {
        let next = map.index_to_point2d(path.steps[1]);
        if is_free(next, ctx, occupied) {
            return Some(next);
        }
        return None;
    }
    step_towards(from, to, ctx, occupied)
}

/// A single step along the straight line to `to`.
pub fn step_towards(
    from: Point,
    to: Point,
    ctx: &MapContext,
    occupied: &HashSet<Point>,
) -> Option<Point> {
    let dx = (to.x - from.x) as f32;
    let dy = (to.y - from.y) as f32;
    let distance = (dx * dx + dy * dy).sqrt();
    if distance == 0.0 {
        return None;
    }
    let step = Point::new(
        (dx / distance).round() as i32,
        (dy / distance).round() as i32,
    );
    let dest = Point::new(from.x + step.x, from.y + step.y);
    (dest != from && is_free(dest, ctx, occupied)).then_some(dest)
}

/// A random neighbouring tile for a confused monster, if it can move there.
pub fn stumble_step(
    from: Point,
    rng: &mut RandomNumberGenerator,
    ctx: &MapContext,
    occupied: &HashSet<Point>,
) -> Option<Point> {
    let target = Point::new(from.x + rng.range(0, 3) - 1, from.y + rng.range(0, 3) - 1);
    if target == from {
        return None;
    }
    step_towards(from, target, ctx, occupied)
}

#[cfg(test)]
mod tests {
    use bracket_geometry::prelude::Rect;

    use super::*;
    use crate::map::GameMap;

    fn open_room() -> MapContext {
        let mut map = GameMap::new(12, 12, 1);
        map.create_room(&Rect::with_size(0, 0, 11, 11));
        MapContext::from_map(&map)
    }

    #[test]
    fn chase_moves_one_tile_closer() {
        let ctx = open_room();
        let from = Point::new(2, 2);
        let to = Point::new(8, 2);
        let next = chase_step(from, to, &ctx, &HashSet::new()).expect("step");
        assert_eq!(next.y - from.y, 0);
        assert_eq!(next.x, 3);
    }

    #[test]
    fn chase_routes_around_blocking_entities() {
        let ctx = open_room();
        let occupied: HashSet<Point> = [Point::new(3, 2)].into_iter().collect();
        let next = chase_step(Point::new(2, 2), Point::new(6, 2), &ctx, &occupied).expect("step");
        assert_ne!(next, Point::new(3, 2));
        assert_eq!(next.x, 3);
    }

    #[test]
    fn straight_step_refuses_walls() {
        let ctx = open_room();
        // (0, 5) is the room's wall ring.
        assert_eq!(step_towards(Point::new(1, 5), Point::new(-5, 5), &ctx, &HashSet::new()), None);
    }
}
