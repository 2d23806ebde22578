use specs::prelude::{Entity, ReadStorage, WriteStorage};

use crate::{
    messages::Message,
    palette,
};

use super::{
    components::{Equipment, Equippable, Fighter, Named},
    resources::TurnEvent,
};

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Bonus {
    pub power: i32,
    pub defense: i32,
    pub max_hp: i32,
}

/// Effective combat numbers of a fighter once equipment is counted.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Stats {
    pub hp: i32,
    pub max_hp: i32,
    pub power: i32,
    pub defense: i32,
}

impl Stats {
    pub fn of(fighter: &Fighter, bonus: Bonus) -> Self {
        Self {
            hp: fighter.hp,
            max_hp: fighter.base_max_hp + bonus.max_hp,
            power: fighter.base_power + bonus.power,
            defense: fighter.base_defense + bonus.defense,
        }
    }
}

pub fn equipment_bonus(
    entity: Entity,
    equipment: &ReadStorage<Equipment>,
    equippables: &ReadStorage<Equippable>,
) -> Bonus {
    let Some(slots) = equipment.get(entity) else {
        return Bonus::default();
    };
    slots
        .equipped()
        .filter_map(|item| equippables.get(item))
        .fold(Bonus::default(), |acc, gear| Bonus {
            power: acc.power + gear.power_bonus,
            defense: acc.defense + gear.defense_bonus,
            max_hp: acc.max_hp + gear.max_hp_bonus,
        })
}

pub fn take_damage(fighter: &mut Fighter, owner: Entity, amount: i32) -> Vec<TurnEvent> {
    fighter.hp -= amount;
    if fighter.hp <= 0 {
        vec![TurnEvent::Dead {
            entity: owner,
            xp: fighter.xp,
        }]
    } else {
        Vec::new()
    }
}

pub fn heal(fighter: &mut Fighter, amount: i32, max_hp: i32) {
    fighter.hp = (fighter.hp + amount).min(max_hp);
}

pub fn display_name(entity: Entity, names: &ReadStorage<Named>) -> String {
    names
        .get(entity)
        .map(|n| n.name.clone())
        .unwrap_or_else(|| "something".to_string())
}

pub fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

pub fn attack(
    attacker: Entity,
    target: Entity,
    fighters: &mut WriteStorage<Fighter>,
    names: &ReadStorage<Named>,
    equipment: &ReadStorage<Equipment>,
    equippables: &ReadStorage<Equippable>,
) -> Vec<TurnEvent> {
    let Some(attacker_stats) = fighters
        .get(attacker)
        .map(|f| Stats::of(f, equipment_bonus(attacker, equipment, equippables)))
    else {
        return Vec::new();
    };
    let target_bonus = equipment_bonus(target, equipment, equippables);
    let Some(target_fighter) = fighters.get_mut(target) else {
        return Vec::new();
    };
    let damage = attacker_stats.power - Stats::of(target_fighter, target_bonus).defense;
    let attacker_name = capitalize(&display_name(attacker, names));
    let target_name = display_name(target, names);

    let mut events = Vec::new();
    if damage > 0 {
        events.push(
            Message::new(
                format!("{attacker_name} attacks {target_name} for {damage} hit points."),
                palette::WHITE,
            )
            .into(),
        );
        events.extend(take_damage(target_fighter, target, damage));
    } else {
        events.push(
            Message::new(
                format!("{attacker_name} attacks {target_name} but does no damage."),
                palette::WHITE,
            )
            .into(),
        );
    }
    events
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capitalize_lowers_the_tail() {
        assert_eq!(capitalize("orc"), "Orc");
        assert_eq!(capitalize("remains of ORC"), "Remains of orc");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn heal_is_capped_at_max() {
        let mut fighter = Fighter::new(30, 0, 1, 0);
        fighter.hp = 25;
        heal(&mut fighter, 40, 30);
        assert_eq!(fighter.hp, 30);
    }

    #[test]
    fn stats_add_equipment_bonus() {
        let fighter = Fighter::new(100, 1, 2, 0);
        let stats = Stats::of(
            &fighter,
            Bonus {
                power: 3,
                defense: 1,
                max_hp: 0,
            },
        );
        assert_eq!(stats.power, 5);
        assert_eq!(stats.defense, 2);
        assert_eq!(stats.max_hp, 100);
    }
}
