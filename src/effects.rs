//! What scrolls and potions do. Every function reports whether the item was
//! used up; a refusal is not an error, just `consumed = false` and a message
//! for the player.

use bracket_geometry::prelude::{DistanceAlg, Point};
use specs::prelude::{Entity, Join, World, WorldExt};
use tracing::debug;

use crate::{
    ecs::{
        combat::{self, Stats, display_name, equipment_bonus, take_damage},
        components::{Ai, Equipment, Equippable, Fighter, ItemEffect, Named, Position},
        resources::TurnEvent,
    },
    fov::FovMap,
    messages::Message,
    palette,
};

#[derive(Clone, Debug, Default, PartialEq)]
pub struct UseOutcome {
    pub consumed: bool,
    pub target: Option<Entity>,
    pub events: Vec<TurnEvent>,
}

impl UseOutcome {
    fn refused(message: Message) -> Self {
        Self {
            consumed: false,
            target: None,
            events: vec![message.into()],
        }
    }

    fn consumed(events: Vec<TurnEvent>) -> Self {
        Self {
            consumed: true,
            target: None,
            events,
        }
    }
}

/// Runs `effect` for `user`. Effects that need a tile refuse when `target`
/// is missing.
pub fn apply(
    world: &World,
    user: Entity,
    effect: ItemEffect,
    fov: &FovMap,
    target: Option<Point>,
) -> UseOutcome {
    match (effect, target) {
        (ItemEffect::Heal { amount }, _) => heal(world, user, amount),
        (
            ItemEffect::Lightning {
                damage,
                maximum_range,
            },
            _,
        ) => cast_lightning(world, user, fov, damage, maximum_range),
        (ItemEffect::Fireball { damage, radius }, Some(point)) => {
            cast_fireball(world, fov, damage, radius, point)
        }
        (ItemEffect::Confuse { turns }, Some(point)) => cast_confuse(world, fov, point, turns),
        (ItemEffect::Fireball { .. } | ItemEffect::Confuse { .. }, None) => {
            UseOutcome::refused(outside_fov())
        }
    }
}

pub fn heal(world: &World, user: Entity, amount: i32) -> UseOutcome {
    let equipment = world.read_component::<Equipment>();
    let equippables = world.read_component::<Equippable>();
    let mut fighters = world.write_component::<Fighter>();
    let bonus = equipment_bonus(user, &equipment, &equippables);
    let Some(fighter) = fighters.get_mut(user) else {
        return UseOutcome::default();
    };
    let max_hp = Stats::of(fighter, bonus).max_hp;
    if fighter.hp >= max_hp {
        return UseOutcome::refused(Message::new(
            "You are already at full health",
            palette::YELLOW,
        ));
    }
    combat::heal(fighter, amount, max_hp);
    UseOutcome::consumed(vec![
        Message::new("Your wounds start to feel better!", palette::GREEN).into(),
    ])
}

/// Strikes the closest visible fighter within range. Ties keep whichever
/// was found first.
pub fn cast_lightning(
    world: &World,
    caster: Entity,
    fov: &FovMap,
    damage: i32,
    maximum_range: i32,
) -> UseOutcome {
    let entities = world.entities();
    let positions = world.read_component::<Position>();
    let names = world.read_component::<Named>();
    let mut fighters = world.write_component::<Fighter>();
    let Some(origin) = positions.get(caster).map(|p| p.point) else {
        return UseOutcome::default();
    };

    let mut target = None;
    let mut closest_distance = (maximum_range + 1) as f32;
    for (entity, pos, _) in (&entities, &positions, &fighters).join() {
        if entity == caster || !fov.is_in_fov(pos.point) {
            continue;
        }
        let distance = DistanceAlg::Pythagoras.distance2d(origin, pos.point);
        if distance < closest_distance {
            target = Some(entity);
            closest_distance = distance;
        }
    }

    let Some(target) = target else {
        return UseOutcome::refused(Message::new(
            "No enemy is close enough to strike.",
            palette::RED,
        ));
    };
    let mut events: Vec<TurnEvent> = vec![
        Message::plain(format!(
            "A lightning bolt strikes the {} with a loud thunder! The damage is {damage}",
            display_name(target, &names)
        ))
        .into(),
    ];
    if let Some(fighter) = fighters.get_mut(target) {
        events.extend(take_damage(fighter, target, damage));
    }
    UseOutcome {
        consumed: true,
        target: Some(target),
        events,
    }
}

/// Burns every fighter within `radius` of `target`, the caster included.
pub fn cast_fireball(
    world: &World,
    fov: &FovMap,
    damage: i32,
    radius: i32,
    target: Point,
) -> UseOutcome {
    if !fov.is_in_fov(target) {
        return UseOutcome::refused(outside_fov());
    }
    let entities = world.entities();
    let positions = world.read_component::<Position>();
    let names = world.read_component::<Named>();
    let mut fighters = world.write_component::<Fighter>();

    let mut events: Vec<TurnEvent> = vec![
        Message::new(
            format!("The fireball explodes, burning everything within {radius} tiles!"),
            palette::ORANGE,
        )
        .into(),
    ];
    for (entity, pos, fighter) in (&entities, &positions, &mut fighters).join() {
        if DistanceAlg::Pythagoras.distance2d(pos.point, target) > radius as f32 {
            continue;
        }
        events.push(
            Message::new(
                format!(
                    "The {} gets burned for {damage} hit points.",
                    display_name(entity, &names)
                ),
                palette::ORANGE,
            )
            .into(),
        );
        events.extend(take_damage(fighter, entity, damage));
    }
    UseOutcome::consumed(events)
}

pub fn cast_confuse(world: &World, fov: &FovMap, target: Point, turns: i32) -> UseOutcome {
    if !fov.is_in_fov(target) {
        return UseOutcome::refused(outside_fov());
    }
    let entities = world.entities();
    let positions = world.read_component::<Position>();
    let names = world.read_component::<Named>();
    let mut ais = world.write_component::<Ai>();

    let victim = (&entities, &positions, &ais)
        .join()
        .find(|(_, pos, _)| pos.point == target)
        .map(|(entity, _, ai)| (entity, ai.clone()));
    let Some((victim, ai)) = victim else {
        return UseOutcome::refused(Message::new(
            "There is no targetable enemy at that location.",
            palette::YELLOW,
        ));
    };
    if let Err(err) = ais.insert(victim, ai.confuse(turns)) {
        debug!(?err, "confusion target vanished");
    }
    UseOutcome {
        consumed: true,
        target: Some(victim),
        events: vec![
            Message::new(
                format!(
                    "The eyes of the {} look vacant, as he starts to stumble around!",
                    display_name(victim, &names)
                ),
                palette::LIGHT_GREEN,
            )
            .into(),
        ],
    }
}

fn outside_fov() -> Message {
    Message::new(
        "You cannot target a tile outside your field of view.",
        palette::YELLOW,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::Config,
        data::{items::ItemKind, monsters::MonsterKind},
        ecs::EcsWorld,
    };

    fn arena() -> (EcsWorld, FovMap) {
        let config = Config::default();
        let mut ecs = EcsWorld::new(&config, 7);
        ecs.set_player_position(Point::new(10, 10));
        let mut visible = Vec::new();
        for y in 0..21 {
            for x in 0..21 {
                visible.push(Point::new(x, y));
            }
        }
        (ecs, FovMap::from_points(visible))
    }

    fn hp(ecs: &EcsWorld, entity: Entity) -> Option<i32> {
        ecs.world()
            .read_component::<Fighter>()
            .get(entity)
            .map(|f| f.hp)
    }

    #[test]
    fn healing_at_full_health_is_refused() {
        let (ecs, _) = arena();
        let outcome = heal(ecs.world(), ecs.player_entity(), 40);
        assert!(!outcome.consumed);
        assert_eq!(
            outcome.events,
            vec![TurnEvent::Message(Message::new(
                "You are already at full health",
                palette::YELLOW
            ))]
        );
        assert_eq!(hp(&ecs, ecs.player_entity()), Some(100));
    }

    #[test]
    fn healing_is_capped_at_max_hp() {
        let (ecs, _) = arena();
        let player = ecs.player_entity();
        if let Some(f) = ecs.world().write_component::<Fighter>().get_mut(player) {
            f.hp = 90;
        }
        let outcome = heal(ecs.world(), player, 40);
        assert!(outcome.consumed);
        assert_eq!(hp(&ecs, player), Some(100));
    }

    #[test]
    fn lightning_hits_the_closest_visible_monster() {
        let (mut ecs, fov) = arena();
        let near = ecs.spawn_monster(MonsterKind::Orc, Point::new(12, 10));
        let far = ecs.spawn_monster(MonsterKind::Orc, Point::new(15, 10));
        let outcome = cast_lightning(ecs.world(), ecs.player_entity(), &fov, 40, 5);
        assert!(outcome.consumed);
        assert_eq!(outcome.target, Some(near));
        assert!(
            outcome
                .events
                .iter()
                .any(|e| matches!(e, TurnEvent::Dead { entity, xp: 35 } if *entity == near))
        );
        assert_eq!(hp(&ecs, far), Some(20));
    }

    #[test]
    fn lightning_without_a_target_in_range_is_refused() {
        let (mut ecs, fov) = arena();
        ecs.spawn_monster(MonsterKind::Troll, Point::new(17, 10));
        let outcome = cast_lightning(ecs.world(), ecs.player_entity(), &fov, 40, 5);
        assert!(!outcome.consumed);
        assert_eq!(outcome.target, None);
        assert_eq!(
            outcome.events,
            vec![TurnEvent::Message(Message::new(
                "No enemy is close enough to strike.",
                palette::RED
            ))]
        );
    }

    #[test]
    fn lightning_range_stops_short_of_range_plus_one() {
        let (mut ecs, fov) = arena();
        ecs.spawn_monster(MonsterKind::Orc, Point::new(16, 10));
        let outcome = cast_lightning(ecs.world(), ecs.player_entity(), &fov, 40, 5);
        assert!(!outcome.consumed);

        let diagonal = ecs.spawn_monster(MonsterKind::Orc, Point::new(15, 13));
        let outcome = cast_lightning(ecs.world(), ecs.player_entity(), &fov, 40, 5);
        assert!(outcome.consumed);
        assert_eq!(outcome.target, Some(diagonal));
    }

    #[test]
    fn lightning_ties_go_to_the_first_monster_found() {
        let (mut ecs, fov) = arena();
        let west = ecs.spawn_monster(MonsterKind::Orc, Point::new(8, 10));
        let east = ecs.spawn_monster(MonsterKind::Orc, Point::new(12, 10));
        let first = if west.id() < east.id() { west } else { east };
        let outcome = cast_lightning(ecs.world(), ecs.player_entity(), &fov, 40, 5);
        assert_eq!(outcome.target, Some(first));
    }

    #[test]
    fn lightning_ignores_monsters_out_of_sight() {
        let (mut ecs, _) = arena();
        ecs.spawn_monster(MonsterKind::Orc, Point::new(12, 10));
        let fov = FovMap::from_points([Point::new(10, 10)]);
        let outcome = cast_lightning(ecs.world(), ecs.player_entity(), &fov, 40, 5);
        assert!(!outcome.consumed);
    }

    #[test]
    fn fireball_burns_everything_in_radius_including_the_caster() {
        let (mut ecs, fov) = arena();
        let orc = ecs.spawn_monster(MonsterKind::Orc, Point::new(12, 10));
        let troll = ecs.spawn_monster(MonsterKind::Troll, Point::new(16, 10));
        let outcome = cast_fireball(ecs.world(), &fov, 12, 3, Point::new(11, 10));
        assert!(outcome.consumed);
        assert_eq!(hp(&ecs, orc), Some(8));
        assert_eq!(hp(&ecs, ecs.player_entity()), Some(88));
        assert_eq!(hp(&ecs, troll), Some(30));
        let burns = outcome
            .events
            .iter()
            .filter(|e| matches!(e, TurnEvent::Message(m) if m.text.contains("gets burned")))
            .count();
        assert_eq!(burns, 2);
    }

    #[test]
    fn fireball_radius_is_inclusive() {
        let (mut ecs, fov) = arena();
        let edge = ecs.spawn_monster(MonsterKind::Orc, Point::new(17, 10));
        let beyond = ecs.spawn_monster(MonsterKind::Troll, Point::new(14, 14));
        let outcome = cast_fireball(ecs.world(), &fov, 5, 3, Point::new(14, 10));
        assert!(outcome.consumed);
        assert_eq!(hp(&ecs, edge), Some(15));
        assert_eq!(hp(&ecs, beyond), Some(30));
        assert_eq!(hp(&ecs, ecs.player_entity()), Some(100));
    }

    #[test]
    fn fireball_outside_fov_is_refused() {
        let (ecs, _) = arena();
        let fov = FovMap::from_points([Point::new(10, 10)]);
        let outcome = cast_fireball(ecs.world(), &fov, 12, 3, Point::new(15, 15));
        assert!(!outcome.consumed);
        assert_eq!(hp(&ecs, ecs.player_entity()), Some(100));
    }

    #[test]
    fn confusion_wraps_the_target_ai() {
        let (mut ecs, fov) = arena();
        let orc = ecs.spawn_monster(MonsterKind::Orc, Point::new(13, 12));
        let outcome = cast_confuse(ecs.world(), &fov, Point::new(13, 12), 10);
        assert!(outcome.consumed);
        assert_eq!(outcome.target, Some(orc));
        let ai = ecs.world().read_component::<Ai>().get(orc).cloned();
        assert_eq!(ai, Some(Ai::Basic.confuse(10)));
    }

    #[test]
    fn confusion_needs_a_monster_on_the_tile() {
        let (mut ecs, fov) = arena();
        ecs.spawn_item(ItemKind::HealingPotion, Point::new(13, 12));
        let outcome = cast_confuse(ecs.world(), &fov, Point::new(13, 12), 10);
        assert!(!outcome.consumed);
        assert_eq!(
            outcome.events,
            vec![TurnEvent::Message(Message::new(
                "There is no targetable enemy at that location.",
                palette::YELLOW
            ))]
        );
    }
}
