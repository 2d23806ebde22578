pub mod combat;
pub mod components;
pub mod inventory;
pub mod resources;
pub mod systems;

use bracket_geometry::prelude::Point;
use bracket_random::prelude::RandomNumberGenerator;
use specs::prelude::{
    Builder, Dispatcher, DispatcherBuilder, Entity, Join, RunNow, World as SpecsWorld, WorldExt,
};

use crate::{
    config::Config,
    data::{items::ItemKind, monsters::MonsterKind},
    fov::FovMap,
    map::GameMap,
    palette,
};

use self::{
    combat::{Stats, equipment_bonus},
    components::{
        Ai, BlocksTile, Equipment, Equippable, Fighter, Inventory, Item, Level, Named, PlayerTag,
        Position, RenderOrder, Renderable, Stairs, Viewshed,
    },
    resources::{MapContext, PlayerEntity, TurnEvent, TurnLog},
    systems::{FovSystem, MonsterAiSystem},
};

pub struct EcsWorld {
    specs_world: SpecsWorld,
    dispatcher: Dispatcher<'static, 'static>,
    player: Entity,
}

/// Player numbers shown on the HUD and the character screen.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PlayerStats {
    pub hp: i32,
    pub max_hp: i32,
    pub power: i32,
    pub defense: i32,
    pub level: i32,
    pub xp: i32,
    pub xp_to_next_level: i32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InventoryEntry {
    pub item: Entity,
    pub name: String,
    pub equipped_in: Option<components::EquipmentSlot>,
}

impl EcsWorld {
    /// A world holding only the player (at the origin) and their starting
    /// dagger.
    pub fn new(config: &Config, ai_seed: u64) -> Self {
        let mut ecs = Self::empty(ai_seed);
        let player = Self::spawn_player(&mut ecs.specs_world, config);
        ecs.set_player(player);
        ecs.give_starting_kit();
        ecs
    }

    /// A world with registered components but no entities. The player must
    /// be set with [`EcsWorld::set_player`] before the world is used.
    pub fn empty(ai_seed: u64) -> Self {
        let mut specs_world = SpecsWorld::new();
        Self::register_components(&mut specs_world);
        specs_world.insert(RandomNumberGenerator::seeded(ai_seed));
        specs_world.insert(TurnLog::default());
        specs_world.insert(FovMap::default());
        specs_world.insert(MapContext::default());
        let placeholder = specs_world.create_entity().build();
        specs_world.insert(PlayerEntity(placeholder));
        let dispatcher = DispatcherBuilder::new()
            .with(MonsterAiSystem, "monster_ai", &[])
            .with(FovSystem, "fov", &["monster_ai"])
            .build();

        Self {
            specs_world,
            dispatcher,
            player: placeholder,
        }
    }

    fn register_components(world: &mut SpecsWorld) {
        world.register::<Position>();
        world.register::<Renderable>();
        world.register::<Named>();
        world.register::<BlocksTile>();
        world.register::<PlayerTag>();
        world.register::<Viewshed>();
        world.register::<Fighter>();
        world.register::<Ai>();
        world.register::<Item>();
        world.register::<Equippable>();
        world.register::<Equipment>();
        world.register::<Inventory>();
        world.register::<Level>();
        world.register::<Stairs>();
    }

    fn spawn_player(world: &mut SpecsWorld, config: &Config) -> Entity {
        world
            .create_entity()
            .with(Position::new(0, 0))
            .with(Renderable {
                glyph: '@',
                color: palette::WHITE,
                order: RenderOrder::Actor,
            })
            .with(Named {
                name: "Player".to_string(),
            })
            .with(BlocksTile)
            .with(PlayerTag)
            .with(Viewshed {
                radius: config.fov_radius,
                dirty: true,
                visible: Vec::new(),
            })
            .with(Fighter::new(100, 1, 2, 0))
            .with(Inventory::new(config.inventory_capacity))
            .with(Equipment::default())
            .with(Level::default())
            .build()
    }

    fn give_starting_kit(&mut self) {
        let dagger = self.spawn_item(ItemKind::Dagger, Point::new(0, 0));
        let _ = self.specs_world.write_component::<Position>().remove(dagger);
        inventory::stow(&self.specs_world, self.player, dagger);
        inventory::toggle_equip(&self.specs_world, self.player, dagger);
    }

    pub fn set_player(&mut self, player: Entity) {
        if self.player != player {
            let placeholder = self.player;
            if !self.specs_world.read_component::<PlayerTag>().contains(placeholder) {
                let _ = self.specs_world.delete_entity(placeholder);
            }
        }
        self.player = player;
        self.specs_world.insert(PlayerEntity(player));
    }

    pub fn world(&self) -> &SpecsWorld {
        &self.specs_world
    }

    pub fn world_mut(&mut self) -> &mut SpecsWorld {
        &mut self.specs_world
    }

    pub fn maintain(&mut self) {
        self.specs_world.maintain();
    }

    pub fn player_entity(&self) -> Entity {
        self.player
    }

    pub fn player_point(&self) -> Point {
        self.specs_world
            .read_component::<Position>()
            .get(self.player)
            .map(|pos| pos.point)
            .unwrap_or(Point::new(0, 0))
    }

    pub fn set_player_position(&mut self, point: Point) {
        self.set_position(self.player, point);
    }

    pub fn set_position(&mut self, entity: Entity, point: Point) {
        {
            let mut positions = self.specs_world.write_component::<Position>();
            let _ = positions.insert(entity, Position { point });
        }
        let mut viewsheds = self.specs_world.write_component::<Viewshed>();
        if let Some(vs) = viewsheds.get_mut(entity) {
            vs.dirty = true;
        }
    }

    pub fn player_is_alive(&self) -> bool {
        self.specs_world
            .read_component::<Fighter>()
            .get(self.player)
            .is_some_and(|f| f.hp > 0)
    }

    pub fn stats(&self, entity: Entity) -> Option<Stats> {
        let fighters = self.specs_world.read_component::<Fighter>();
        let equipment = self.specs_world.read_component::<Equipment>();
        let equippables = self.specs_world.read_component::<Equippable>();
        fighters
            .get(entity)
            .map(|f| Stats::of(f, equipment_bonus(entity, &equipment, &equippables)))
    }

    pub fn player_stats(&self) -> Option<PlayerStats> {
        let stats = self.stats(self.player)?;
        let levels = self.specs_world.read_component::<Level>();
        let level = levels.get(self.player).cloned().unwrap_or_default();
        Some(PlayerStats {
            hp: stats.hp,
            max_hp: stats.max_hp,
            power: stats.power,
            defense: stats.defense,
            level: level.current_level,
            xp: level.current_xp,
            xp_to_next_level: level.experience_to_next_level(),
        })
    }

    pub fn heal_player_fraction(&mut self, divisor: i32) {
        let Some(stats) = self.stats(self.player) else {
            return;
        };
        let mut fighters = self.specs_world.write_component::<Fighter>();
        if let Some(fighter) = fighters.get_mut(self.player) {
            combat::heal(fighter, stats.max_hp / divisor.max(1), stats.max_hp);
        }
    }

    /// Whether the player crossed a level threshold, and their level after
    /// the gain.
    pub fn grant_player_xp(&mut self, xp: i32) -> Option<(bool, i32)> {
        let mut levels = self.specs_world.write_component::<Level>();
        let level = levels.get_mut(self.player)?;
        let leveled_up = level.add_xp(xp);
        Some((leveled_up, level.current_level))
    }

    pub fn any_entity_at(&self, point: Point) -> bool {
        let positions = self.specs_world.read_component::<Position>();
        (&positions).join().any(|pos| pos.point == point)
    }

    pub fn blocking_entity_at(&self, point: Point) -> Option<Entity> {
        let entities = self.specs_world.entities();
        let positions = self.specs_world.read_component::<Position>();
        let blockers = self.specs_world.read_component::<BlocksTile>();
        (&entities, &positions, &blockers)
            .join()
            .find(|(_, pos, _)| pos.point == point)
            .map(|(entity, _, _)| entity)
    }

    pub fn item_at(&self, point: Point) -> Option<Entity> {
        let entities = self.specs_world.entities();
        let positions = self.specs_world.read_component::<Position>();
        let items = self.specs_world.read_component::<Item>();
        (&entities, &positions, &items)
            .join()
            .find(|(_, pos, _)| pos.point == point)
            .map(|(entity, _, _)| entity)
    }

    pub fn stairs_at(&self, point: Point) -> Option<Stairs> {
        let positions = self.specs_world.read_component::<Position>();
        let stairs = self.specs_world.read_component::<Stairs>();
        (&positions, &stairs)
            .join()
            .find(|(pos, _)| pos.point == point)
            .map(|(_, stairs)| stairs.clone())
    }

    pub fn stairs(&self) -> Vec<(Point, Stairs)> {
        let positions = self.specs_world.read_component::<Position>();
        let stairs = self.specs_world.read_component::<Stairs>();
        (&positions, &stairs)
            .join()
            .map(|(pos, stairs)| (pos.point, stairs.clone()))
            .collect()
    }

    pub fn positioned_points(&self) -> Vec<Point> {
        let positions = self.specs_world.read_component::<Position>();
        (&positions).join().map(|pos| pos.point).collect()
    }

    pub fn name_of(&self, entity: Entity) -> String {
        combat::display_name(entity, &self.specs_world.read_component::<Named>())
    }

    /// Names of everything on `point`, for the mouse-look line.
    pub fn names_at(&self, point: Point) -> Vec<String> {
        let positions = self.specs_world.read_component::<Position>();
        let names = self.specs_world.read_component::<Named>();
        (&positions, &names)
            .join()
            .filter(|(pos, _)| pos.point == point)
            .map(|(_, named)| named.name.clone())
            .collect()
    }

    pub fn spawn_monster(&mut self, kind: MonsterKind, point: Point) -> Entity {
        let template = kind.template();
        self.specs_world
            .create_entity()
            .with(Position { point })
            .with(Renderable {
                glyph: template.glyph,
                color: template.color,
                order: RenderOrder::Actor,
            })
            .with(Named {
                name: template.name.to_string(),
            })
            .with(BlocksTile)
            .with(Fighter::new(
                template.hp,
                template.defense,
                template.power,
                template.xp,
            ))
            .with(Ai::Basic)
            .build()
    }

    pub fn spawn_item(&mut self, kind: ItemKind, point: Point) -> Entity {
        let template = kind.template();
        let mut builder = self
            .specs_world
            .create_entity()
            .with(Position { point })
            .with(Renderable {
                glyph: template.glyph,
                color: template.color,
                order: RenderOrder::Item,
            })
            .with(Named {
                name: template.name.to_string(),
            })
            .with(Item {
                effect: template.effect,
                targeting: template.targeting,
            });
        if let Some(equippable) = template.equippable {
            builder = builder.with(equippable);
        }
        builder.build()
    }

    pub fn spawn_stairs(&mut self, point: Point, floor: i32) -> Entity {
        self.specs_world
            .create_entity()
            .with(Position { point })
            .with(Renderable {
                glyph: '>',
                color: palette::WHITE,
                order: RenderOrder::Stairs,
            })
            .with(Named {
                name: "Stairs".to_string(),
            })
            .with(Stairs { floor })
            .build()
    }

    /// Deletes every entity except the player and what they carry.
    pub fn clear_floor(&mut self) {
        let keep: Vec<Entity> = {
            let inventories = self.specs_world.read_component::<Inventory>();
            let mut keep = vec![self.player];
            if let Some(inv) = inventories.get(self.player) {
                keep.extend(inv.items.iter().copied());
            }
            keep
        };
        let doomed: Vec<Entity> = {
            let entities = self.specs_world.entities();
            (&entities)
                .join()
                .filter(|entity| !keep.contains(entity))
                .collect()
        };
        let _ = self.specs_world.delete_entities(&doomed);
        self.specs_world.maintain();
        self.mark_player_fov_dirty();
    }

    pub fn mark_player_fov_dirty(&mut self) {
        let mut viewsheds = self.specs_world.write_component::<Viewshed>();
        if let Some(vs) = viewsheds.get_mut(self.player) {
            vs.dirty = true;
        }
    }

    /// Publishes the walkability of `map` to the systems.
    pub fn update_map_context(&mut self, map: &GameMap) {
        self.specs_world.insert(MapContext::from_map(map));
    }

    /// Recomputes the player's field of view if it moved.
    pub fn refresh_fov(&mut self) {
        let mut fov = FovSystem;
        fov.run_now(&self.specs_world);
    }

    pub fn fov(&self) -> FovMap {
        (*self.specs_world.read_resource::<FovMap>()).clone()
    }

    pub fn is_in_fov(&self, point: Point) -> bool {
        self.specs_world.read_resource::<FovMap>().is_in_fov(point)
    }

    /// One round of monster turns.
    pub fn run_enemy_turn(&mut self) -> Vec<TurnEvent> {
        self.dispatcher.dispatch(&self.specs_world);
        self.specs_world.maintain();
        self.drain_events()
    }

    pub fn drain_events(&mut self) -> Vec<TurnEvent> {
        let mut log = self.specs_world.write_resource::<TurnLog>();
        std::mem::take(&mut log.events)
    }

    pub fn player_inventory(&self) -> Vec<InventoryEntry> {
        let inventories = self.specs_world.read_component::<Inventory>();
        let names = self.specs_world.read_component::<Named>();
        let equipment = self.specs_world.read_component::<Equipment>();
        let slots = equipment.get(self.player);
        inventories
            .get(self.player)
            .map(|inv| {
                inv.items
                    .iter()
                    .map(|item| InventoryEntry {
                        item: *item,
                        name: combat::display_name(*item, &names),
                        equipped_in: slots.and_then(|eq| {
                            [
                                components::EquipmentSlot::MainHand,
                                components::EquipmentSlot::OffHand,
                            ]
                            .into_iter()
                            .find(|slot| eq.slot(*slot) == Some(*item))
                        }),
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Everything drawable on the floor, lowest render order first.
    pub fn renderables(&self) -> Vec<(Point, Renderable, bool)> {
        let positions = self.specs_world.read_component::<Position>();
        let renderables = self.specs_world.read_component::<Renderable>();
        let stairs = self.specs_world.read_component::<Stairs>();
        let entities = self.specs_world.entities();
        let mut drawn: Vec<(Point, Renderable, bool)> = (&entities, &positions, &renderables)
            .join()
            .map(|(entity, pos, render)| (pos.point, render.clone(), stairs.contains(entity)))
            .collect();
        drawn.sort_by_key(|(_, render, _)| render.order);
        drawn
    }
}

#[cfg(test)]
mod tests {
    use bracket_geometry::prelude::Rect;

    use super::*;
    use crate::messages::Message;

    fn world_with_room() -> (EcsWorld, GameMap) {
        let config = Config::default();
        let mut ecs = EcsWorld::new(&config, 1);
        let mut map = GameMap::new(20, 20, 1);
        map.create_room(&Rect::with_size(0, 0, 19, 19));
        ecs.update_map_context(&map);
        (ecs, map)
    }

    #[test]
    fn player_starts_with_an_equipped_dagger() {
        let config = Config::default();
        let ecs = EcsWorld::new(&config, 1);
        let pack = ecs.player_inventory();
        assert_eq!(pack.len(), 1);
        assert_eq!(pack[0].name, "Dagger");
        assert_eq!(
            pack[0].equipped_in,
            Some(components::EquipmentSlot::MainHand)
        );
        let stats = ecs.player_stats().expect("stats");
        assert_eq!(stats.power, 4);
        assert_eq!(stats.defense, 1);
        assert_eq!(stats.max_hp, 100);
    }

    #[test]
    fn fov_follows_the_player() {
        let (mut ecs, _) = world_with_room();
        ecs.set_player_position(Point::new(5, 5));
        ecs.refresh_fov();
        assert!(ecs.is_in_fov(Point::new(5, 5)));
        assert!(ecs.is_in_fov(Point::new(8, 5)));
        assert!(!ecs.is_in_fov(Point::new(18, 18)));

        let snapshot = ecs.fov();
        assert!(snapshot.is_in_fov(Point::new(8, 5)));
        assert!(!snapshot.is_in_fov(Point::new(18, 18)));
    }

    #[test]
    fn monsters_in_view_close_in_and_attack() {
        let (mut ecs, _) = world_with_room();
        ecs.set_player_position(Point::new(5, 5));
        let orc = ecs.spawn_monster(MonsterKind::Orc, Point::new(9, 5));
        ecs.refresh_fov();

        ecs.run_enemy_turn();
        let after_one = ecs
            .world()
            .read_component::<Position>()
            .get(orc)
            .map(|p| p.point);
        assert_eq!(after_one, Some(Point::new(8, 5)));

        ecs.set_position(orc, Point::new(6, 5));
        let events = ecs.run_enemy_turn();
        assert!(events.iter().any(|e| matches!(
            e,
            TurnEvent::Message(m) if m.text == "Orc attacks Player for 3 hit points."
        )));
        assert_eq!(ecs.player_stats().map(|s| s.hp), Some(97));
    }

    #[test]
    fn monsters_out_of_view_stay_put() {
        let (mut ecs, mut map) = world_with_room();
        // Wall between the player and the orc.
        map.tiles.iter_mut().enumerate().for_each(|(idx, tile)| {
            if idx as i32 % 20 == 10 {
                *tile = crate::map::Tile::wall();
            }
        });
        ecs.update_map_context(&map);
        ecs.set_player_position(Point::new(5, 5));
        let orc = ecs.spawn_monster(MonsterKind::Orc, Point::new(15, 5));
        ecs.refresh_fov();
        ecs.run_enemy_turn();
        let point = ecs
            .world()
            .read_component::<Position>()
            .get(orc)
            .map(|p| p.point);
        assert_eq!(point, Some(Point::new(15, 5)));
    }

    #[test]
    fn confusion_wears_off_and_restores_the_old_ai() {
        let (mut ecs, _) = world_with_room();
        ecs.set_player_position(Point::new(5, 5));
        let orc = ecs.spawn_monster(MonsterKind::Orc, Point::new(12, 12));
        ecs.refresh_fov();
        if let Some(ai) = ecs.world().write_component::<Ai>().get_mut(orc) {
            *ai = Ai::Basic.confuse(3);
        }
        let ai_of = |ecs: &EcsWorld| ecs.world().read_component::<Ai>().get(orc).cloned();

        for turns_left in [2, 1, 0] {
            let events = ecs.run_enemy_turn();
            assert!(events.is_empty());
            assert_eq!(ai_of(&ecs), Some(Ai::Basic.confuse(turns_left)));
        }

        let events = ecs.run_enemy_turn();
        assert_eq!(ai_of(&ecs), Some(Ai::Basic));
        assert_eq!(
            events,
            vec![TurnEvent::Message(Message::new(
                "The Orc is no longer confused!",
                palette::RED
            ))]
        );
    }

    #[test]
    fn monsters_stop_once_the_player_is_dead() {
        let (mut ecs, _) = world_with_room();
        ecs.set_player_position(Point::new(5, 5));
        ecs.spawn_monster(MonsterKind::Troll, Point::new(6, 5));
        ecs.spawn_monster(MonsterKind::Troll, Point::new(4, 5));
        ecs.refresh_fov();
        let player = ecs.player_entity();
        if let Some(fighter) = ecs.world().write_component::<Fighter>().get_mut(player) {
            fighter.hp = 1;
        }

        let events = ecs.run_enemy_turn();
        let attacks = events
            .iter()
            .filter(|e| matches!(e, TurnEvent::Message(m) if m.text.contains("attacks Player")))
            .count();
        assert_eq!(attacks, 1);
        assert!(
            events
                .iter()
                .any(|e| matches!(e, TurnEvent::Dead { entity, .. } if *entity == player))
        );
    }

    #[test]
    fn clearing_the_floor_keeps_the_pack() {
        let (mut ecs, _) = world_with_room();
        ecs.spawn_monster(MonsterKind::Troll, Point::new(3, 3));
        ecs.spawn_item(ItemKind::HealingPotion, Point::new(4, 4));
        ecs.spawn_stairs(Point::new(6, 6), 2);
        ecs.clear_floor();
        assert_eq!(ecs.positioned_points(), vec![ecs.player_point()]);
        assert_eq!(ecs.player_inventory().len(), 1);
    }
}
