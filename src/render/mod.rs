pub mod menus;

use bracket_geometry::prelude::Point;
use bracket_terminal::prelude::*;

use crate::{
    engine::{Game, GameState},
    palette::{self, Color},
};

pub use menus::{MainMenuChoice, main_menu, message_box};

/// Draws the whole frame for `game`: floor, entities, the bottom panel and
/// whichever menu the current state calls for.
pub fn render_all(ctx: &mut BTerm, game: &Game, mouse: Point) {
    ctx.cls();
    draw_map(ctx, game);
    draw_entities(ctx, game);
    draw_panel(ctx, game, mouse);

    match game.state {
        GameState::ShowInventory => menus::inventory_menu(
            ctx,
            game,
            "Press the key next to an item to use it, or Esc to cancel.",
        ),
        GameState::DropInventory => menus::inventory_menu(
            ctx,
            game,
            "Press the key next to an item to drop it, or Esc to cancel.",
        ),
        GameState::LevelUp => menus::level_up_menu(ctx, game),
        GameState::CharacterScreen => menus::character_screen(ctx, game),
        _ => {}
    }
}

pub fn draw_map(ctx: &mut BTerm, game: &Game) {
    let map = &game.map;
    for y in 0..map.height {
        for x in 0..map.width {
            if let Some(bg) = tile_background(game, Point::new(x, y)) {
                ctx.set_bg(x, y, bg.rgb());
            }
        }
    }
}

/// Lit colors in view, dark colors from memory, nothing for unexplored
/// tiles.
fn tile_background(game: &Game, point: Point) -> Option<Color> {
    let tile = game.map.tile(point)?;
    let lit = game.ecs.is_in_fov(point);
    if !lit && !tile.explored {
        return None;
    }
    Some(match (lit, tile.block_sight) {
        (true, true) => palette::LIGHT_WALL,
        (true, false) => palette::LIGHT_GROUND,
        (false, true) => palette::DARK_WALL,
        (false, false) => palette::DARK_GROUND,
    })
}

/// Entities in view, lowest render order first so actors end up on top.
/// Stairs stay drawn once their tile has been seen.
pub fn draw_entities(ctx: &mut BTerm, game: &Game) {
    for (point, renderable, is_stairs) in game.ecs.renderables() {
        let remembered = is_stairs && game.map.is_explored(point);
        if !game.ecs.is_in_fov(point) && !remembered {
            continue;
        }
        let bg = tile_background(game, point).unwrap_or(palette::BLACK);
        ctx.set(
            point.x,
            point.y,
            renderable.color.rgb(),
            bg.rgb(),
            to_cp437(renderable.glyph),
        );
    }
}

pub fn draw_panel(ctx: &mut BTerm, game: &Game, mouse: Point) {
    let config = &game.config;
    let panel_y = config.panel_y();
    let black = palette::BLACK.rgb();

    for y in panel_y..config.screen_height {
        for x in 0..config.screen_width {
            ctx.set_bg(x, y, black);
        }
    }

    if let Some(stats) = game.ecs.player_stats() {
        render_bar(
            ctx,
            1,
            panel_y + 1,
            config.bar_width,
            "HP",
            stats.hp,
            stats.max_hp,
            palette::LIGHT_RED,
            palette::DARKER_RED,
        );
    }
    ctx.print_color(
        1,
        panel_y + 3,
        palette::WHITE.rgb(),
        black,
        format!("Dungeon level: {}", game.map.dungeon_level),
    );

    for (row, message) in game.log.iter().enumerate() {
        ctx.print_color(
            game.log.x,
            panel_y + 1 + row as i32,
            message.color.rgb(),
            black,
            &message.text,
        );
    }

    ctx.print_color(
        1,
        panel_y,
        palette::LIGHT_GRAY.rgb(),
        black,
        names_under_mouse(game, mouse),
    );
}

/// Comma-separated names of the visible entities on `mouse`.
pub fn names_under_mouse(game: &Game, mouse: Point) -> String {
    if !game.ecs.is_in_fov(mouse) {
        return String::new();
    }
    game.ecs.names_at(mouse).join(", ")
}

#[allow(clippy::too_many_arguments)]
pub fn render_bar(
    ctx: &mut BTerm,
    x: i32,
    y: i32,
    total_width: i32,
    name: &str,
    value: i32,
    maximum: i32,
    bar_color: Color,
    back_color: Color,
) {
    ctx.draw_bar_horizontal(
        x,
        y,
        total_width,
        value.max(0),
        maximum.max(1),
        bar_color.rgb(),
        back_color.rgb(),
    );
    let label = format!("{name}: {value}/{maximum}");
    let label_x = x + (total_width - label.len() as i32) / 2;
    ctx.print_color(label_x.max(x), y, palette::WHITE.rgb(), bar_color.rgb(), label);
}
