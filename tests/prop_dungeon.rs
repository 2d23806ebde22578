use std::collections::{HashSet, VecDeque};

use bracket_geometry::prelude::{Point, Rect};
use bracket_random::prelude::RandomNumberGenerator;
use proptest::prelude::*;
use tunnelrogue::{
    config::{Config, MapAlgorithm},
    ecs::EcsWorld,
    map::GameMap,
};

fn generate(config: &Config, seed: u64, level: i32) -> (GameMap, EcsWorld, Vec<Rect>) {
    let mut ecs = EcsWorld::new(config, seed);
    let mut map = GameMap::new(config.map_width, config.map_height, level);
    let mut rng = RandomNumberGenerator::seeded(seed);
    let rooms = map
        .generate(config, &mut ecs, &mut rng)
        .expect("dungeon generation");
    (map, ecs, rooms)
}

// 4-way flood fill over open tiles.
fn reachable_from(map: &GameMap, start: Point) -> HashSet<Point> {
    let mut seen = HashSet::from([start]);
    let mut queue = VecDeque::from([start]);
    while let Some(point) = queue.pop_front() {
        for (dx, dy) in [(1, 0), (-1, 0), (0, 1), (0, -1)] {
            let next = Point::new(point.x + dx, point.y + dy);
            if !map.is_blocked(next) && seen.insert(next) {
                queue.push_back(next);
            }
        }
    }
    seen
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    /// Accepted rooms never share a tile, walls included.
    #[test]
    fn prop_rooms_never_overlap(seed in any::<u64>()) {
        let config = Config::default();
        let (_, _, rooms) = generate(&config, seed, 1);
        prop_assert!(!rooms.is_empty());
        for (i, a) in rooms.iter().enumerate() {
            for b in rooms.iter().skip(i + 1) {
                prop_assert!(!a.intersect(b), "{:?} overlaps {:?}", a, b);
            }
        }
    }

    /// Every open tile, the stairs included, can be walked to from the start.
    #[test]
    fn prop_all_floor_reachable_from_player(seed in any::<u64>()) {
        let config = Config::default();
        let (map, ecs, _) = generate(&config, seed, 1);
        let start = ecs.player_point();
        prop_assert!(!map.is_blocked(start));
        let reachable = reachable_from(&map, start);
        let floor: HashSet<Point> = map.floor_points().into_iter().collect();
        prop_assert_eq!(reachable, floor);
    }

    /// Monsters and items only ever land on open floor, one per tile. The
    /// stairs go down last and may share a tile with an item.
    #[test]
    fn prop_entities_spawn_on_distinct_floor_tiles(seed in any::<u64>(), level in 1i32..10) {
        let config = Config::default();
        let (map, ecs, _) = generate(&config, seed, level);
        let stairs: Vec<Point> = ecs.stairs().into_iter().map(|(point, _)| point).collect();
        let points: Vec<Point> = ecs
            .positioned_points()
            .into_iter()
            .filter(|point| !stairs.contains(point))
            .collect();
        let unique: HashSet<Point> = points.iter().copied().collect();
        prop_assert_eq!(unique.len(), points.len());
        for point in points {
            prop_assert!(!map.is_blocked(point), "entity on wall at {:?}", point);
        }
    }

    #[test]
    fn prop_bsp_places_player_and_stairs_on_floor(seed in any::<u64>()) {
        let config = Config {
            map_algorithm: MapAlgorithm::Bsp,
            ..Config::default()
        };
        let (map, ecs, rooms) = generate(&config, seed, 1);
        prop_assert!(rooms.len() >= 2);
        prop_assert!(!map.is_blocked(ecs.player_point()));
        let stairs = ecs.stairs();
        prop_assert_eq!(stairs.len(), 1);
        prop_assert!(!map.is_blocked(stairs[0].0));
        for point in ecs.positioned_points() {
            prop_assert!(!map.is_blocked(point));
        }
    }
}
