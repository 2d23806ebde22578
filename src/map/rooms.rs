use bracket_geometry::prelude::{Point, Rect};
use bracket_random::prelude::RandomNumberGenerator;

use crate::{config::Config, ecs::EcsWorld, random::randint};

use super::{GameMap, MapError, populate::place_entities};

/// Rooms-and-corridors: random rectangles, rejected on overlap, each joined
/// to the previously accepted one by an L-shaped tunnel. Returns the rooms
/// carved, in the order they were dug.
pub fn make_map(
    map: &mut GameMap,
    config: &Config,
    ecs: &mut EcsWorld,
    rng: &mut RandomNumberGenerator,
) -> Result<Vec<Rect>, MapError> {
    let mut rooms: Vec<Rect> = Vec::new();

    for _ in 0..config.max_rooms {
        let w = randint(rng, config.room_min_size, config.room_max_size);
        let h = randint(rng, config.room_min_size, config.room_max_size);
        let x = randint(rng, 0, map.width - w - 1);
        let y = randint(rng, 0, map.height - h - 1);
        let new_room = Rect::with_size(x, y, w, h);

        if rooms.iter().any(|other| new_room.intersect(other)) {
            continue;
        }

        map.create_room(&new_room);
        let new_center = new_room.center();

        match rooms.last() {
            None => ecs.set_player_position(new_center),
            Some(prev) => {
                let prev_center = prev.center();
                if randint(rng, 0, 1) == 1 {
                    map.create_h_tunnel(prev_center.x, new_center.x, prev_center.y);
                    map.create_v_tunnel(prev_center.y, new_center.y, new_center.x);
                } else {
                    map.create_v_tunnel(prev_center.y, new_center.y, prev_center.x);
                    map.create_h_tunnel(prev_center.x, new_center.x, new_center.y);
                }
            }
        }

        place_entities(&new_room, map.dungeon_level, ecs, rng);
        rooms.push(new_room);
    }

    let last_center: Point = rooms
        .last()
        .map(Rect::center)
        .ok_or(MapError::NoRooms {
            width: map.width,
            height: map.height,
        })?;
    ecs.spawn_stairs(last_center, map.dungeon_level + 1);
    Ok(rooms)
}
