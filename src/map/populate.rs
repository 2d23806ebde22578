use bracket_geometry::prelude::{Point, Rect};
use bracket_random::prelude::RandomNumberGenerator;
use tracing::trace;

use crate::{
    data::{item_chances, max_items_per_room, max_monsters_per_room, monster_chances},
    ecs::EcsWorld,
    random::{randint, random_choice},
};

/// Scatters monsters and items inside `room`, weighted by `dungeon_level`.
/// Tiles that already hold an entity are skipped rather than retried.
pub fn place_entities(
    room: &Rect,
    dungeon_level: i32,
    ecs: &mut EcsWorld,
    rng: &mut RandomNumberGenerator,
) {
    let number_of_monsters = randint(rng, 0, max_monsters_per_room(dungeon_level));
    let number_of_items = randint(rng, 0, max_items_per_room(dungeon_level));
    let monster_table = monster_chances(dungeon_level);
    let item_table = item_chances(dungeon_level);

    for _ in 0..number_of_monsters {
        let point = random_interior_point(room, rng);
        if ecs.any_entity_at(point) {
            continue;
        }
        if let Some(kind) = random_choice(rng, &monster_table) {
            trace!(?kind, x = point.x, y = point.y, "spawn monster");
            ecs.spawn_monster(kind, point);
        }
    }

    for _ in 0..number_of_items {
        let point = random_interior_point(room, rng);
        if ecs.any_entity_at(point) {
            continue;
        }
        if let Some(kind) = random_choice(rng, &item_table) {
            trace!(?kind, x = point.x, y = point.y, "spawn item");
            ecs.spawn_item(kind, point);
        }
    }
}

fn random_interior_point(room: &Rect, rng: &mut RandomNumberGenerator) -> Point {
    Point::new(
        randint(rng, room.x1 + 1, room.x2 - 1),
        randint(rng, room.y1 + 1, room.y2 - 1),
    )
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::config::Config;

    #[test]
    fn spawns_stay_inside_the_room_and_never_stack() {
        let config = Config::default();
        let mut ecs = EcsWorld::new(&config, 3);
        ecs.set_player_position(Point::new(5, 5));
        let room = Rect::with_size(1, 1, 8, 8);
        let mut rng = RandomNumberGenerator::seeded(99);
        for level in [1, 4, 6, 8] {
            for _ in 0..20 {
                place_entities(&room, level, &mut ecs, &mut rng);
            }
        }
        let points = ecs.positioned_points();
        let unique: HashSet<Point> = points.iter().copied().collect();
        assert_eq!(points.len(), unique.len());
        for point in points {
            assert!(point.x > room.x1 && point.x <= room.x2 - 1, "{point:?}");
            assert!(point.y > room.y1 && point.y <= room.y2 - 1, "{point:?}");
        }
    }
}
