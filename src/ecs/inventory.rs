use bracket_geometry::prelude::Point;
use specs::prelude::{Entity, ReadStorage, World, WorldExt};
use tracing::debug;

use crate::{effects, fov::FovMap, messages::Message, palette};

use super::{
    combat::display_name,
    components::{Equipment, Equippable, Inventory, Item, Named, Position},
    resources::TurnEvent,
};

/// Puts `item` in `owner`'s pack without taking it off the floor or saying
/// anything. Used for starting gear and restored saves.
pub fn stow(world: &World, owner: Entity, item: Entity) -> bool {
    let mut inventories = world.write_component::<Inventory>();
    let Some(inventory) = inventories.get_mut(owner) else {
        return false;
    };
    if inventory.is_full() {
        return false;
    }
    inventory.items.push(item);
    true
}

pub fn add_item(world: &World, owner: Entity, item: Entity) -> Vec<TurnEvent> {
    let name = display_name(item, &world.read_component::<Named>());
    if !stow(world, owner, item) {
        return vec![
            Message::new(
                "You cannot carry any more, your inventory is full",
                palette::YELLOW,
            )
            .into(),
        ];
    }
    let _ = world.write_component::<Position>().remove(item);
    debug!(item = %name, "picked up");
    vec![
        TurnEvent::ItemAdded(item),
        Message::new(format!("You pick up the {name}!"), palette::BLUE).into(),
    ]
}

/// Uses `item` from `user`'s pack. Items that need a tile and were given
/// none report `Targeting` instead of doing anything.
pub fn use_item(
    world: &World,
    user: Entity,
    item: Entity,
    fov: &FovMap,
    target: Option<Point>,
) -> Vec<TurnEvent> {
    let Some(component) = world.read_component::<Item>().get(item).cloned() else {
        return Vec::new();
    };
    let Some(effect) = component.effect else {
        if world.read_component::<Equippable>().contains(item) {
            return vec![TurnEvent::Equip(item)];
        }
        let name = display_name(item, &world.read_component::<Named>());
        return vec![Message::new(format!("The {name} cannot be used"), palette::YELLOW).into()];
    };
    if component.targeting.is_some() && target.is_none() {
        return vec![TurnEvent::Targeting(item)];
    }

    let outcome = effects::apply(world, user, effect, fov, target);
    let mut events = outcome.events;
    if outcome.consumed {
        remove_from_pack(world, user, item);
        let _ = world.entities().delete(item);
        events.push(TurnEvent::ItemConsumed(item));
    }
    events
}

/// Drops `item` at `owner`'s feet, taking it off first if it is worn.
pub fn drop_item(world: &World, owner: Entity, item: Entity) -> Vec<TurnEvent> {
    let mut events = Vec::new();
    let worn = world
        .read_component::<Equipment>()
        .get(owner)
        .is_some_and(|eq| eq.is_equipped(item));
    if worn {
        events.extend(toggle_equip(world, owner, item));
    }

    remove_from_pack(world, owner, item);
    let point = world
        .read_component::<Position>()
        .get(owner)
        .map(|p| p.point)
        .unwrap_or(Point::new(0, 0));
    let _ = world
        .write_component::<Position>()
        .insert(item, Position { point });

    let name = display_name(item, &world.read_component::<Named>());
    events.push(TurnEvent::ItemDropped(item));
    events.push(Message::new(format!("You dropped the {name}"), palette::YELLOW).into());
    events
}

/// Equips `item` in its slot, or takes it off if it is already there.
/// Whatever was in the slot before is taken off first.
pub fn toggle_equip(world: &World, owner: Entity, item: Entity) -> Vec<TurnEvent> {
    let Some(slot) = world
        .read_component::<Equippable>()
        .get(item)
        .map(|gear| gear.slot)
    else {
        return Vec::new();
    };
    let names = world.read_component::<Named>();
    let mut equipment = world.write_component::<Equipment>();
    let Some(slots) = equipment.get_mut(owner) else {
        return Vec::new();
    };

    let mut events = Vec::new();
    let current = slots.slot_mut(slot);
    let previous = *current;
    match previous {
        Some(worn) if worn == item => {
            *current = None;
            events.push(dequipped(worn, &names));
        }
        Some(worn) => {
            *current = Some(item);
            events.push(dequipped(worn, &names));
            events.push(equipped(item, &names));
        }
        None => {
            *current = Some(item);
            events.push(equipped(item, &names));
        }
    }
    events
        .into_iter()
        .flat_map(|(event, message)| [event, message.into()])
        .collect()
}

fn equipped(item: Entity, names: &ReadStorage<Named>) -> (TurnEvent, Message) {
    (
        TurnEvent::Equipped(item),
        Message::plain(format!("You equipped the {}", display_name(item, names))),
    )
}

fn dequipped(item: Entity, names: &ReadStorage<Named>) -> (TurnEvent, Message) {
    (
        TurnEvent::Dequipped(item),
        Message::plain(format!("You dequipped the {}", display_name(item, names))),
    )
}

fn remove_from_pack(world: &World, owner: Entity, item: Entity) {
    if let Some(inventory) = world.write_component::<Inventory>().get_mut(owner) {
        inventory.items.retain(|held| *held != item);
    }
}
