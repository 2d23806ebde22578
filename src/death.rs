//! What happens to the body once a fighter drops to zero hit points.

use specs::prelude::{Entity, World, WorldExt};
use tracing::info;

use crate::{
    ecs::{
        combat::{capitalize, display_name},
        components::{Ai, BlocksTile, Fighter, Named, RenderOrder, Renderable},
    },
    engine::GameState,
    messages::Message,
    palette,
};

pub fn kill_player(world: &World, player: Entity) -> (Message, GameState) {
    if let Some(render) = world.write_component::<Renderable>().get_mut(player) {
        render.glyph = '%';
        render.color = palette::DARK_RED;
    }
    info!("player died");
    (Message::new("You died!", palette::RED), GameState::PlayerDead)
}

/// Turns `monster` into an inert corpse that no longer blocks, fights or
/// thinks.
pub fn kill_monster(world: &World, monster: Entity) -> Message {
    let name = display_name(monster, &world.read_component::<Named>());
    let message = Message::new(format!("{} is dead!", capitalize(&name)), palette::ORANGE);

    if let Some(render) = world.write_component::<Renderable>().get_mut(monster) {
        render.glyph = '%';
        render.color = palette::DARK_RED;
        render.order = RenderOrder::Corpse;
    }
    world.write_component::<BlocksTile>().remove(monster);
    world.write_component::<Fighter>().remove(monster);
    world.write_component::<Ai>().remove(monster);
    if let Some(named) = world.write_component::<Named>().get_mut(monster) {
        named.name = format!("remains of {name}");
    }
    message
}
