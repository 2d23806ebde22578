//! Whole-game snapshots on disk as JSON.
//!
//! Entities are written as plain component bundles; references between them
//! (pack contents, worn gear) are stored as indices into the bundle list.

use std::{
    collections::HashMap,
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use bracket_geometry::prelude::Point;
use bracket_random::prelude::RandomNumberGenerator;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use specs::prelude::{Builder, Entity, Join, WorldExt};
use thiserror::Error;
use tracing::info;

use crate::{
    config::Config,
    ecs::{
        EcsWorld,
        components::{
            Ai, BlocksTile, Equipment, Equippable, Fighter, Inventory, Item, Level, Named,
            PlayerTag, Position, Renderable, Stairs, Viewshed,
        },
    },
    engine::{Game, GameState},
    map::GameMap,
    messages::MessageLog,
};

pub const SAVE_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum SaveError {
    #[error("save file i/o failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("save file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("no save file at {0}")]
    NotFound(PathBuf),

    #[error("save format version {found} is not supported (expected {expected})")]
    Version { found: u32, expected: u32 },

    #[error("save file is inconsistent: {0}")]
    Corrupt(String),
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EntitySnapshot {
    pub position: Option<(i32, i32)>,
    pub renderable: Option<Renderable>,
    pub name: Option<String>,
    pub blocks: bool,
    pub player: bool,
    pub sight_radius: Option<i32>,
    pub fighter: Option<Fighter>,
    pub ai: Option<Ai>,
    pub item: Option<Item>,
    pub equippable: Option<Equippable>,
    pub stairs: Option<Stairs>,
    pub level: Option<Level>,
    /// Capacity and carried entity indices.
    pub inventory: Option<(usize, Vec<usize>)>,
    /// Main hand and off hand entity indices.
    pub equipment: Option<(Option<usize>, Option<usize>)>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SaveGame {
    pub version: u32,
    pub saved_at: DateTime<Utc>,
    pub map: GameMap,
    pub log: MessageLog,
    pub state: GameState,
    pub previous_state: GameState,
    pub player: usize,
    pub targeting_item: Option<usize>,
    pub entities: Vec<EntitySnapshot>,
}

impl SaveGame {
    pub fn capture(game: &Game) -> Self {
        let world = game.ecs.world();
        let entities = world.entities();
        let alive: Vec<Entity> = (&entities).join().collect();
        let index: HashMap<Entity, usize> =
            alive.iter().enumerate().map(|(i, e)| (*e, i)).collect();

        let positions = world.read_storage::<Position>();
        let renderables = world.read_storage::<Renderable>();
        let names = world.read_storage::<Named>();
        let blockers = world.read_storage::<BlocksTile>();
        let players = world.read_storage::<PlayerTag>();
        let viewsheds = world.read_storage::<Viewshed>();
        let fighters = world.read_storage::<Fighter>();
        let ais = world.read_storage::<Ai>();
        let items = world.read_storage::<Item>();
        let equippables = world.read_storage::<Equippable>();
        let stairs = world.read_storage::<Stairs>();
        let levels = world.read_storage::<Level>();
        let inventories = world.read_storage::<Inventory>();
        let equipment = world.read_storage::<Equipment>();

        let lookup = |entity: Entity| index.get(&entity).copied();
        let snapshots = alive
            .iter()
            .map(|&entity| EntitySnapshot {
                position: positions.get(entity).map(|p| (p.point.x, p.point.y)),
                renderable: renderables.get(entity).cloned(),
                name: names.get(entity).map(|n| n.name.clone()),
                blocks: blockers.contains(entity),
                player: players.contains(entity),
                sight_radius: viewsheds.get(entity).map(|v| v.radius),
                fighter: fighters.get(entity).cloned(),
                ai: ais.get(entity).cloned(),
                item: items.get(entity).cloned(),
                equippable: equippables.get(entity).cloned(),
                stairs: stairs.get(entity).cloned(),
                level: levels.get(entity).cloned(),
                inventory: inventories.get(entity).map(|inv| {
                    (inv.capacity, inv.items.iter().filter_map(|e| lookup(*e)).collect())
                }),
                equipment: equipment
                    .get(entity)
                    .map(|eq| (eq.main_hand.and_then(lookup), eq.off_hand.and_then(lookup))),
            })
            .collect();

        Self {
            version: SAVE_VERSION,
            saved_at: Utc::now(),
            map: game.map.clone(),
            log: game.log.clone(),
            state: game.state,
            previous_state: game.previous_state,
            player: lookup(game.ecs.player_entity()).unwrap_or_default(),
            targeting_item: game.targeting_item.and_then(lookup),
            entities: snapshots,
        }
    }

    /// Rebuilds a playable game. The dungeon RNG is reseeded from `config`
    /// (or the clock), so floors after the current one differ from the
    /// original run.
    pub fn restore(self, config: Config) -> Result<Game, SaveError> {
        if self.version != SAVE_VERSION {
            return Err(SaveError::Version {
                found: self.version,
                expected: SAVE_VERSION,
            });
        }
        if self.player >= self.entities.len() {
            return Err(SaveError::Corrupt(format!(
                "player index {} out of {} entities",
                self.player,
                self.entities.len()
            )));
        }

        let mut rng = match config.seed {
            Some(seed) => RandomNumberGenerator::seeded(seed),
            None => RandomNumberGenerator::new(),
        };
        let mut ecs = EcsWorld::empty(rng.next_u64());
        let created: Vec<Entity> = self
            .entities
            .iter()
            .map(|snapshot| build_entity(&mut ecs, snapshot))
            .collect();
        let resolve = |idx: usize| -> Result<Entity, SaveError> {
            created
                .get(idx)
                .copied()
                .ok_or_else(|| SaveError::Corrupt(format!("entity index {idx} out of range")))
        };

        {
            let world = ecs.world();
            let mut inventories = world.write_storage::<Inventory>();
            let mut equipment = world.write_storage::<Equipment>();
            for (snapshot, &entity) in self.entities.iter().zip(&created) {
                if let Some((capacity, held)) = &snapshot.inventory {
                    let items = held.iter().map(|i| resolve(*i)).collect::<Result<_, _>>()?;
                    let _ = inventories.insert(
                        entity,
                        Inventory {
                            capacity: *capacity,
                            items,
                        },
                    );
                }
                if let Some((main, off)) = snapshot.equipment {
                    let _ = equipment.insert(
                        entity,
                        Equipment {
                            main_hand: main.map(resolve).transpose()?,
                            off_hand: off.map(resolve).transpose()?,
                        },
                    );
                }
            }
        }

        ecs.set_player(resolve(self.player)?);
        let targeting_item = self.targeting_item.map(resolve).transpose()?;
        let mut game = Game::from_parts(config, self.map, ecs, self.log, rng);
        game.state = self.state;
        game.previous_state = self.previous_state;
        game.targeting_item = targeting_item;
        Ok(game)
    }
}

fn build_entity(ecs: &mut EcsWorld, snapshot: &EntitySnapshot) -> Entity {
    let mut builder = ecs.world_mut().create_entity();
    if let Some((x, y)) = snapshot.position {
        builder = builder.with(Position {
            point: Point::new(x, y),
        });
    }
    if let Some(renderable) = &snapshot.renderable {
        builder = builder.with(renderable.clone());
    }
    if let Some(name) = &snapshot.name {
        builder = builder.with(Named { name: name.clone() });
    }
    if snapshot.blocks {
        builder = builder.with(BlocksTile);
    }
    if snapshot.player {
        builder = builder.with(PlayerTag);
    }
    if let Some(radius) = snapshot.sight_radius {
        builder = builder.with(Viewshed {
            radius,
            dirty: true,
            visible: Vec::new(),
        });
    }
    if let Some(fighter) = &snapshot.fighter {
        builder = builder.with(fighter.clone());
    }
    if let Some(ai) = &snapshot.ai {
        builder = builder.with(ai.clone());
    }
    if let Some(item) = &snapshot.item {
        builder = builder.with(item.clone());
    }
    if let Some(equippable) = &snapshot.equippable {
        builder = builder.with(equippable.clone());
    }
    if let Some(stairs) = &snapshot.stairs {
        builder = builder.with(stairs.clone());
    }
    if let Some(level) = &snapshot.level {
        builder = builder.with(level.clone());
    }
    builder.build()
}

pub fn save_game<P: AsRef<Path>>(path: P, game: &Game) -> Result<(), SaveError> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let save = SaveGame::capture(game);
    let json = serde_json::to_string_pretty(&save)?;
    fs::write(path, json)?;
    info!(path = %path.display(), entities = save.entities.len(), "game saved");
    Ok(())
}

pub fn load_game<P: AsRef<Path>>(path: P, config: Config) -> Result<Game, SaveError> {
    let path = path.as_ref();
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            return Err(SaveError::NotFound(path.to_path_buf()));
        }
        Err(err) => return Err(err.into()),
    };
    let save: SaveGame = serde_json::from_str(&raw)?;
    info!(path = %path.display(), saved_at = %save.saved_at, "loading game");
    save.restore(config)
}

/// Removes the save at `path`; a missing file is not an error.
pub fn delete_save<P: AsRef<Path>>(path: P) -> Result<(), SaveError> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
        Err(err) => Err(err.into()),
    }
}
