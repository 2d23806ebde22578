//! Turn flow: the player acts, their results are applied in order, then
//! every monster gets a turn.

pub mod input;

use std::collections::VecDeque;

use bracket_geometry::prelude::Point;
use bracket_random::prelude::RandomNumberGenerator;
use serde::{Deserialize, Serialize};
use specs::prelude::{Entity, WorldExt};
use tracing::{debug, info};

use crate::{
    config::Config,
    death::{kill_monster, kill_player},
    ecs::{
        EcsWorld,
        combat,
        components::{Fighter, Item},
        inventory,
        resources::TurnEvent,
    },
    map::{GameMap, MapError},
    messages::{Message, MessageLog},
    palette,
};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameState {
    PlayersTurn,
    EnemyTurn,
    PlayerDead,
    ShowInventory,
    DropInventory,
    Targeting,
    LevelUp,
    CharacterScreen,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LevelUpChoice {
    /// +20 max HP and HP.
    Constitution,
    /// +1 attack.
    Strength,
    /// +1 defense.
    Agility,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Action {
    Move { dx: i32, dy: i32 },
    Wait,
    Pickup,
    ShowInventory,
    DropInventory,
    InventoryIndex(usize),
    TakeStairs,
    LevelUp(LevelUpChoice),
    ShowCharacterScreen,
    Target(Point),
    CancelTargeting,
    Exit,
}

/// What the caller should do after an action.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Control {
    Continue,
    Quit,
}

pub struct Game {
    pub config: Config,
    pub map: GameMap,
    pub ecs: EcsWorld,
    pub log: MessageLog,
    pub state: GameState,
    pub previous_state: GameState,
    pub targeting_item: Option<Entity>,
    rng: RandomNumberGenerator,
}

impl Game {
    /// Starts a fresh run on dungeon level 1.
    pub fn new(config: Config) -> Result<Self, MapError> {
        let mut rng = match config.seed {
            Some(seed) => RandomNumberGenerator::seeded(seed),
            None => RandomNumberGenerator::new(),
        };
        let mut ecs = EcsWorld::new(&config, rng.next_u64());
        let mut map = GameMap::new(config.map_width, config.map_height, 1);
        map.generate(&config, &mut ecs, &mut rng)?;
        let log = MessageLog::new(
            config.message_x(),
            config.message_width(),
            config.message_height(),
        );
        let mut game = Self::from_parts(config, map, ecs, log, rng);
        game.refresh_view();
        info!(seed = ?game.config.seed, "new game");
        Ok(game)
    }

    /// Reassembles a game from restored pieces. The map context and field of
    /// view are rebuilt from `map`.
    pub fn from_parts(
        config: Config,
        map: GameMap,
        mut ecs: EcsWorld,
        log: MessageLog,
        rng: RandomNumberGenerator,
    ) -> Self {
        ecs.update_map_context(&map);
        ecs.mark_player_fov_dirty();
        let mut game = Self {
            config,
            map,
            ecs,
            log,
            state: GameState::PlayersTurn,
            previous_state: GameState::PlayersTurn,
            targeting_item: None,
            rng,
        };
        game.refresh_view();
        game
    }

    pub fn player_is_dead(&self) -> bool {
        self.state == GameState::PlayerDead
    }

    /// Applies one player action and, if it ended the player's turn, the
    /// monsters' reply.
    pub fn handle(&mut self, action: Action) -> Control {
        let mut events = Vec::new();
        match (self.state, action) {
            (GameState::PlayersTurn, Action::Move { dx, dy }) => {
                events = self.move_or_attack(dx, dy);
            }
            (GameState::PlayersTurn, Action::Wait) => self.state = GameState::EnemyTurn,
            (GameState::PlayersTurn, Action::Pickup) => {
                let player = self.ecs.player_entity();
                match self.ecs.item_at(self.ecs.player_point()) {
                    Some(item) => events = inventory::add_item(self.ecs.world(), player, item),
                    None => self.log.add_message(Message::new(
                        "There is nothing here to pick up.",
                        palette::YELLOW,
                    )),
                }
            }
            (GameState::PlayersTurn | GameState::PlayerDead, Action::ShowInventory) => {
                self.enter_menu(GameState::ShowInventory);
            }
            (GameState::PlayersTurn, Action::DropInventory) => {
                self.enter_menu(GameState::DropInventory);
            }
            (GameState::PlayersTurn | GameState::PlayerDead, Action::ShowCharacterScreen) => {
                self.enter_menu(GameState::CharacterScreen);
            }
            (
                state @ (GameState::ShowInventory | GameState::DropInventory),
                Action::InventoryIndex(index),
            ) if self.previous_state != GameState::PlayerDead => {
                events = self.choose_item(state, index);
            }
            (GameState::PlayersTurn, Action::TakeStairs) => {
                if let Err(err) = self.take_stairs() {
                    tracing::error!(%err, "could not build the next floor");
                    self.log.add_message(Message::new(
                        "The stairs lead nowhere.",
                        palette::RED,
                    ));
                }
            }
            (GameState::LevelUp, Action::LevelUp(choice)) => {
                self.level_up(choice);
                self.state = self.previous_state;
            }
            (GameState::Targeting, Action::Target(point)) => {
                if let Some(item) = self.targeting_item {
                    let fov = self.ecs.fov();
                    events = inventory::use_item(
                        self.ecs.world(),
                        self.ecs.player_entity(),
                        item,
                        &fov,
                        Some(point),
                    );
                }
            }
            (GameState::Targeting, Action::CancelTargeting | Action::Exit) => {
                events.push(TurnEvent::TargetingCancelled);
            }
            (
                GameState::ShowInventory | GameState::DropInventory | GameState::CharacterScreen,
                Action::Exit,
            ) => self.state = self.previous_state,
            (_, Action::Exit) => return Control::Quit,
            (state, action) => debug!(?state, ?action, "ignored action"),
        }

        self.process_player_events(events);
        if self.state == GameState::EnemyTurn {
            self.enemy_turn();
        }
        self.ecs.maintain();
        self.refresh_view();
        Control::Continue
    }

    fn enter_menu(&mut self, menu: GameState) {
        self.previous_state = self.state;
        self.state = menu;
    }

    fn move_or_attack(&mut self, dx: i32, dy: i32) -> Vec<TurnEvent> {
        let origin = self.ecs.player_point();
        let destination = Point::new(origin.x + dx, origin.y + dy);
        if self.map.is_blocked(destination) {
            return Vec::new();
        }
        let player = self.ecs.player_entity();
        let events = match self.ecs.blocking_entity_at(destination) {
            Some(target) if target != player => {
                let world = self.ecs.world();
                combat::attack(
                    player,
                    target,
                    &mut world.write_storage::<Fighter>(),
                    &world.read_storage(),
                    &world.read_storage(),
                    &world.read_storage(),
                )
            }
            _ => {
                self.ecs.set_player_position(destination);
                Vec::new()
            }
        };
        self.state = GameState::EnemyTurn;
        events
    }

    fn choose_item(&mut self, menu: GameState, index: usize) -> Vec<TurnEvent> {
        let Some(entry) = self.ecs.player_inventory().into_iter().nth(index) else {
            return Vec::new();
        };
        let player = self.ecs.player_entity();
        if menu == GameState::DropInventory {
            inventory::drop_item(self.ecs.world(), player, entry.item)
        } else {
            let fov = self.ecs.fov();
            inventory::use_item(self.ecs.world(), player, entry.item, &fov, None)
        }
    }

    fn take_stairs(&mut self) -> Result<(), MapError> {
        if self.ecs.stairs_at(self.ecs.player_point()).is_none() {
            self.log.add_message(Message::new(
                "There are no stairs here.",
                palette::YELLOW,
            ));
            return Ok(());
        }
        self.map
            .next_floor(&self.config, &mut self.ecs, &mut self.log, &mut self.rng)?;
        self.ecs.update_map_context(&self.map);
        info!(level = self.map.dungeon_level, "descended");
        Ok(())
    }

    fn level_up(&mut self, choice: LevelUpChoice) {
        let player = self.ecs.player_entity();
        let mut fighters = self.ecs.world().write_storage::<Fighter>();
        let Some(fighter) = fighters.get_mut(player) else {
            return;
        };
        match choice {
            LevelUpChoice::Constitution => {
                fighter.base_max_hp += 20;
                fighter.hp += 20;
            }
            LevelUpChoice::Strength => fighter.base_power += 1,
            LevelUpChoice::Agility => fighter.base_defense += 1,
        }
        info!(?choice, "level up");
    }

    /// Ends the player's turn unless they died or a level-up is pending, in
    /// which case the monsters move once the level-up menu closes.
    fn end_player_turn(&mut self) {
        match self.state {
            GameState::PlayerDead => {}
            GameState::LevelUp => self.previous_state = GameState::EnemyTurn,
            _ => self.state = GameState::EnemyTurn,
        }
    }

    fn process_player_events(&mut self, events: Vec<TurnEvent>) {
        let player = self.ecs.player_entity();
        let mut queue: VecDeque<TurnEvent> = events.into();
        while let Some(event) = queue.pop_front() {
            match event {
                TurnEvent::Message(message) => self.log.add_message(message),
                TurnEvent::Dead { entity, .. } if entity == player => {
                    let (message, state) = kill_player(self.ecs.world(), entity);
                    self.log.add_message(message);
                    self.state = state;
                }
                TurnEvent::Dead { entity, xp } => {
                    let message = kill_monster(self.ecs.world(), entity);
                    self.log.add_message(message);
                    self.grant_xp(xp);
                }
                TurnEvent::ItemAdded(_)
                | TurnEvent::ItemConsumed(_)
                | TurnEvent::ItemDropped(_)
                | TurnEvent::Equipped(_)
                | TurnEvent::Dequipped(_) => self.end_player_turn(),
                TurnEvent::Equip(item) => {
                    queue.extend(inventory::toggle_equip(self.ecs.world(), player, item));
                }
                TurnEvent::Targeting(item) => {
                    self.previous_state = GameState::PlayersTurn;
                    self.state = GameState::Targeting;
                    self.targeting_item = Some(item);
                    let prompt = self
                        .ecs
                        .world()
                        .read_storage::<Item>()
                        .get(item)
                        .and_then(|i| i.targeting.clone());
                    if let Some(prompt) = prompt {
                        self.log.add_message(prompt);
                    }
                }
                TurnEvent::TargetingCancelled => {
                    self.state = self.previous_state;
                    self.targeting_item = None;
                    self.log.add_message(Message::plain("Targeting cancelled"));
                }
            }
        }
        if self.state != GameState::Targeting {
            self.targeting_item = None;
        }
    }

    fn grant_xp(&mut self, xp: i32) {
        let Some((leveled_up, level)) = self.ecs.grant_player_xp(xp) else {
            return;
        };
        self.log.add_message(Message::plain(format!(
            "You gain {xp} experience points."
        )));
        if leveled_up {
            self.log.add_message(Message::new(
                format!("Your battle skills grow stronger! You reached level {level}!"),
                palette::YELLOW,
            ));
            if self.state != GameState::PlayerDead {
                self.previous_state = self.state;
                self.state = GameState::LevelUp;
            }
        }
    }

    fn enemy_turn(&mut self) {
        let player = self.ecs.player_entity();
        for event in self.ecs.run_enemy_turn() {
            match event {
                TurnEvent::Message(message) => self.log.add_message(message),
                TurnEvent::Dead { entity, .. } if entity == player => {
                    let (message, state) = kill_player(self.ecs.world(), entity);
                    self.log.add_message(message);
                    self.state = state;
                }
                TurnEvent::Dead { entity, .. } => {
                    let message = kill_monster(self.ecs.world(), entity);
                    self.log.add_message(message);
                }
                other => debug!(?other, "unexpected event during enemy turn"),
            }
        }
        if self.state != GameState::PlayerDead {
            self.state = GameState::PlayersTurn;
        }
    }

    /// Recomputes the player's view and remembers what it revealed.
    pub fn refresh_view(&mut self) {
        self.ecs.refresh_fov();
        let fov = self.ecs.fov();
        self.map.mark_explored(fov.iter());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        data::{items::ItemKind, monsters::MonsterKind},
        ecs::components::Position,
        map::Tile,
    };

    /// A single open 20x20 room with the player in the middle and nothing
    /// else.
    fn arena() -> Game {
        let config = Config {
            seed: Some(3),
            ..Config::default()
        };
        let mut ecs = EcsWorld::new(&config, 3);
        let mut map = GameMap::new(config.map_width, config.map_height, 1);
        for y in 1..20 {
            for x in 1..20 {
                map.tiles[(y * map.width + x) as usize] = Tile::floor();
            }
        }
        ecs.set_player_position(Point::new(10, 10));
        let log = MessageLog::new(0, 60, 6);
        Game::from_parts(config, map, ecs, log, RandomNumberGenerator::seeded(3))
    }

    fn log_lines(game: &Game) -> Vec<String> {
        game.log.iter().map(|m| m.text.clone()).collect()
    }

    #[test]
    fn new_game_starts_on_the_players_turn_with_the_start_visible() {
        let config = Config {
            seed: Some(9),
            ..Config::default()
        };
        let game = Game::new(config).expect("new game");
        assert_eq!(game.state, GameState::PlayersTurn);
        assert_eq!(game.map.dungeon_level, 1);
        assert!(game.ecs.is_in_fov(game.ecs.player_point()));
        assert!(game.map.is_explored(game.ecs.player_point()));
    }

    #[test]
    fn walls_do_not_cost_a_turn() {
        let mut game = arena();
        game.ecs.set_player_position(Point::new(1, 1));
        game.handle(Action::Move { dx: -1, dy: 0 });
        assert_eq!(game.ecs.player_point(), Point::new(1, 1));
        assert_eq!(game.state, GameState::PlayersTurn);
    }

    #[test]
    fn bumping_a_monster_attacks_it() {
        let mut game = arena();
        let orc = game.ecs.spawn_monster(MonsterKind::Orc, Point::new(11, 10));
        game.handle(Action::Move { dx: 1, dy: 0 });
        assert_eq!(game.ecs.player_point(), Point::new(10, 10));
        let lines = log_lines(&game);
        assert_eq!(lines[0], "Player attacks Orc for 4 hit points.");
        assert_eq!(lines[1], "Orc attacks Player for 3 hit points.");
        let orc_hp = game
            .ecs
            .world()
            .read_storage::<Fighter>()
            .get(orc)
            .map(|f| f.hp);
        assert_eq!(orc_hp, Some(16));
    }

    #[test]
    fn killing_a_monster_grants_its_xp() {
        let mut game = arena();
        let orc = game.ecs.spawn_monster(MonsterKind::Orc, Point::new(11, 10));
        if let Some(f) = game.ecs.world().write_storage::<Fighter>().get_mut(orc) {
            f.hp = 1;
        }
        game.handle(Action::Move { dx: 1, dy: 0 });
        let lines = log_lines(&game);
        assert!(lines.contains(&"Orc is dead!".to_string()));
        assert!(lines.contains(&"You gain 35 experience points.".to_string()));
        assert_eq!(game.ecs.player_stats().map(|s| s.xp), Some(35));
        assert_eq!(game.ecs.name_of(orc), "remains of Orc");
        assert_eq!(game.state, GameState::PlayersTurn);
    }

    #[test]
    fn level_up_waits_for_a_choice_before_monsters_move() {
        let mut game = arena();
        let troll = game.ecs.spawn_monster(MonsterKind::Troll, Point::new(11, 10));
        game.ecs.grant_player_xp(300);
        if let Some(f) = game.ecs.world().write_storage::<Fighter>().get_mut(troll) {
            f.hp = 1;
        }
        game.handle(Action::Move { dx: 1, dy: 0 });
        assert_eq!(game.state, GameState::LevelUp);
        assert_eq!(game.previous_state, GameState::EnemyTurn);

        game.handle(Action::LevelUp(LevelUpChoice::Constitution));
        assert_eq!(game.state, GameState::PlayersTurn);
        let stats = game.ecs.player_stats().expect("stats");
        assert_eq!((stats.hp, stats.max_hp, stats.level), (120, 120, 2));
    }

    #[test]
    fn picking_up_ends_the_turn() {
        let mut game = arena();
        game.ecs.spawn_item(ItemKind::HealingPotion, Point::new(10, 10));
        game.handle(Action::Pickup);
        assert_eq!(game.ecs.player_inventory().len(), 2);
        assert_eq!(game.state, GameState::PlayersTurn);
        assert!(log_lines(&game).contains(&"You pick up the Healing Potion!".to_string()));

        game.handle(Action::Pickup);
        assert!(log_lines(&game).contains(&"There is nothing here to pick up.".to_string()));
    }

    #[test]
    fn targeting_then_firing_consumes_the_scroll() {
        let mut game = arena();
        let orc = game.ecs.spawn_monster(MonsterKind::Orc, Point::new(14, 10));
        let scroll = game.ecs.spawn_item(ItemKind::FireballScroll, Point::new(10, 10));
        game.handle(Action::Pickup);

        game.handle(Action::ShowInventory);
        assert_eq!(game.state, GameState::ShowInventory);
        game.handle(Action::InventoryIndex(1));
        assert_eq!(game.state, GameState::Targeting);
        assert_eq!(game.targeting_item, Some(scroll));

        game.handle(Action::Target(Point::new(15, 10)));
        assert_eq!(game.state, GameState::PlayersTurn);
        assert_eq!(game.targeting_item, None);
        assert!(!game.ecs.world().is_alive(scroll));
        assert!(log_lines(&game).contains(&"Orc is dead!".to_string()));
        assert!(!game.ecs.world().read_storage::<Fighter>().contains(orc));
    }

    #[test]
    fn escape_backs_out_of_targeting_and_menus() {
        let mut game = arena();
        game.ecs.spawn_item(ItemKind::ConfusionScroll, Point::new(10, 10));
        game.handle(Action::Pickup);
        game.handle(Action::ShowInventory);
        game.handle(Action::InventoryIndex(1));
        assert_eq!(game.state, GameState::Targeting);
        assert_eq!(game.handle(Action::Exit), Control::Continue);
        assert_eq!(game.state, GameState::PlayersTurn);
        assert!(log_lines(&game).contains(&"Targeting cancelled".to_string()));
        assert_eq!(game.ecs.player_inventory().len(), 2);

        game.handle(Action::ShowCharacterScreen);
        assert_eq!(game.handle(Action::Exit), Control::Continue);
        assert_eq!(game.state, GameState::PlayersTurn);
        assert_eq!(game.handle(Action::Exit), Control::Quit);
    }

    #[test]
    fn dying_to_a_monster_ends_the_run() {
        let mut game = arena();
        game.ecs.spawn_monster(MonsterKind::Troll, Point::new(11, 10));
        let player = game.ecs.player_entity();
        if let Some(f) = game.ecs.world().write_storage::<Fighter>().get_mut(player) {
            f.hp = 1;
        }
        game.handle(Action::Wait);
        assert!(game.player_is_dead());
        assert!(log_lines(&game).contains(&"You died!".to_string()));

        game.handle(Action::Move { dx: -1, dy: 0 });
        assert_eq!(game.ecs.player_point(), Point::new(10, 10));
        game.handle(Action::ShowInventory);
        assert_eq!(game.state, GameState::ShowInventory);
        game.handle(Action::InventoryIndex(0));
        assert_eq!(game.state, GameState::ShowInventory);
    }

    #[test]
    fn stairs_lead_to_a_fresh_floor() {
        let mut game = arena();
        game.ecs.spawn_stairs(Point::new(10, 10), 2);
        let dagger = game.ecs.player_inventory()[0].item;
        game.handle(Action::TakeStairs);
        assert_eq!(game.map.dungeon_level, 2);
        assert_eq!(game.ecs.player_inventory()[0].item, dagger);
        assert!(!game.map.is_blocked(game.ecs.player_point()));
        assert!(
            log_lines(&game)
                .contains(&"You take a moment to rest, and recover your strength.".to_string())
        );
        let stairs = game.ecs.stairs();
        assert_eq!(stairs.len(), 1);
        assert_eq!(stairs[0].1.floor, 3);
        let positioned = game.ecs.world().read_storage::<Position>().contains(dagger);
        assert!(!positioned);
    }

    #[test]
    fn stairs_are_required_to_descend() {
        let mut game = arena();
        game.handle(Action::TakeStairs);
        assert_eq!(game.map.dungeon_level, 1);
        assert!(log_lines(&game).contains(&"There are no stairs here.".to_string()));
    }
}
