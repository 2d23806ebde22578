use std::collections::HashSet;

use bracket_geometry::prelude::Point;
use bracket_pathfinding::prelude::{Algorithm2D, BaseMap, DistanceAlg, field_of_view};
use bracket_random::prelude::RandomNumberGenerator;
use specs::prelude::*;
use tracing::debug;

use crate::{
    ai::{chase_step, stumble_step},
    fov::FovMap,
    messages::Message,
    palette,
};

use super::{
    combat::{self, display_name},
    components::{
        Ai, BlocksTile, Equipment, Equippable, Fighter, Named, PlayerTag, Position, Viewshed,
    },
    resources::{MapContext, PlayerEntity, TurnLog},
};

#[derive(Default)]
pub struct FovSystem;

impl<'a> System<'a> for FovSystem {
    type SystemData = (
        ReadExpect<'a, MapContext>,
        WriteStorage<'a, Viewshed>,
        ReadStorage<'a, Position>,
        ReadStorage<'a, PlayerTag>,
        WriteExpect<'a, FovMap>,
    );

    fn run(&mut self, (ctx, mut viewsheds, positions, players, mut fov): Self::SystemData) {
        let map = SightMap { ctx: &ctx };
        for (viewshed, pos, player) in (&mut viewsheds, &positions, players.maybe()).join() {
            if !viewshed.dirty {
                continue;
            }
            viewshed.visible = field_of_view(pos.point, viewshed.radius, &map)
                .into_iter()
                .filter(|point| ctx.in_bounds(*point))
                .collect();
            viewshed.dirty = false;
            if player.is_some() {
                *fov = FovMap::from_points(viewshed.visible.iter().copied());
            }
        }
    }
}

struct SightMap<'a> {
    ctx: &'a MapContext,
}

impl BaseMap for SightMap<'_> {
    fn is_opaque(&self, idx: usize) -> bool {
        let point = self.index_to_point2d(idx);
        self.ctx.blocks_sight(point)
    }
}

impl Algorithm2D for SightMap<'_> {
    fn dimensions(&self) -> Point {
        Point::new(self.ctx.width, self.ctx.height)
    }

    fn in_bounds(&self, point: Point) -> bool {
        self.ctx.in_bounds(point)
    }
}

/// Runs every monster's AI once, in entity order. Stops as soon as the
/// player is dead.
#[derive(Default)]
pub struct MonsterAiSystem;

impl<'a> System<'a> for MonsterAiSystem {
    type SystemData = (
        Entities<'a>,
        WriteStorage<'a, Position>,
        WriteStorage<'a, Ai>,
        WriteStorage<'a, Fighter>,
        ReadStorage<'a, BlocksTile>,
        ReadStorage<'a, Named>,
        ReadStorage<'a, Equipment>,
        ReadStorage<'a, Equippable>,
        ReadExpect<'a, MapContext>,
        ReadExpect<'a, FovMap>,
        ReadExpect<'a, PlayerEntity>,
        WriteExpect<'a, RandomNumberGenerator>,
        WriteExpect<'a, TurnLog>,
    );

    fn run(
        &mut self,
        (
            entities,
            mut positions,
            mut ais,
            mut fighters,
            blockers,
            names,
            equipment,
            equippables,
            ctx,
            fov,
            player,
            mut rng,
            mut log,
        ): Self::SystemData,
    ) {
        let player = player.0;
        let monsters: Vec<Entity> = (&entities, &ais, &positions)
            .join()
            .map(|(entity, _, _)| entity)
            .filter(|entity| *entity != player)
            .collect();

        for monster in monsters {
            if fighters.get(player).is_none_or(|f| f.hp <= 0) {
                break;
            }
            let (Some(ai), Some(origin), Some(target)) = (
                ais.get(monster).cloned(),
                positions.get(monster).map(|p| p.point),
                positions.get(player).map(|p| p.point),
            ) else {
                continue;
            };

            let occupied = occupied_tiles(&entities, &positions, &blockers, monster);
            match ai {
                Ai::Basic => {
                    if !fov.is_in_fov(origin) {
                        continue;
                    }
                    if DistanceAlg::Pythagoras.distance2d(origin, target) >= 2.0 {
                        if let Some(next) = chase_step(origin, target, &ctx, &occupied) {
                            if let Some(pos) = positions.get_mut(monster) {
                                pos.point = next;
                            }
                        }
                    } else if fighters.get(player).is_some_and(|f| f.hp > 0) {
                        log.extend(combat::attack(
                            monster,
                            player,
                            &mut fighters,
                            &names,
                            &equipment,
                            &equippables,
                        ));
                    }
                }
                Ai::Confused {
                    previous,
                    turns_left,
                } => {
                    if turns_left > 0 {
                        if let Some(next) = stumble_step(origin, &mut rng, &ctx, &occupied) {
                            if let Some(pos) = positions.get_mut(monster) {
                                pos.point = next;
                            }
                        }
                        let countdown = Ai::Confused {
                            previous,
                            turns_left: turns_left - 1,
                        };
                        if let Err(err) = ais.insert(monster, countdown) {
                            debug!(?err, "confused monster vanished mid-turn");
                        }
                    } else {
                        if let Err(err) = ais.insert(monster, *previous) {
                            debug!(?err, "could not restore monster ai");
                        }
                        log.push(Message::new(
                            format!("The {} is no longer confused!", display_name(monster, &names)),
                            palette::RED,
                        ));
                    }
                }
            }
        }
    }
}

fn occupied_tiles(
    entities: &Entities,
    positions: &WriteStorage<Position>,
    blockers: &ReadStorage<BlocksTile>,
    except: Entity,
) -> HashSet<Point> {
    (entities, positions, blockers)
        .join()
        .filter(|(entity, _, _)| *entity != except)
        .map(|(_, pos, _)| pos.point)
        .collect()
}
