use bracket_terminal::prelude::*;

use crate::{ecs::components::EquipmentSlot, engine::Game, palette};

const INVENTORY_WIDTH: i32 = 50;
const LEVEL_UP_WIDTH: i32 = 40;
const CHARACTER_SCREEN_WIDTH: i32 = 30;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MainMenuChoice {
    NewGame,
    Continue,
    Quit,
}

/// A centred box with a header and lettered options. More than 26 options
/// are cut off.
pub fn menu<S: AsRef<str>>(ctx: &mut BTerm, header: &str, options: &[S], width: i32) {
    let (screen_w, screen_h) = ctx.get_char_size();
    let header_lines = wrap_lines(header, (width - 2).max(1) as usize);
    let height = header_lines.len() as i32 + options.len().min(26) as i32;
    let x = (screen_w as i32 - width) / 2;
    let y = (screen_h as i32 - height) / 2;
    let fg = palette::WHITE.rgb();
    let bg = palette::BLACK.rgb();

    ctx.draw_box(x - 1, y - 1, width + 1, height + 1, fg, bg);
    for (row, line) in header_lines.iter().enumerate() {
        ctx.print_color(x, y + row as i32, fg, bg, line);
    }
    let top = y + header_lines.len() as i32;
    for (idx, option) in options.iter().take(26).enumerate() {
        let letter = (b'a' + idx as u8) as char;
        ctx.print_color(
            x,
            top + idx as i32,
            fg,
            bg,
            format!("({letter}) {}", option.as_ref()),
        );
    }
}

pub fn inventory_menu(ctx: &mut BTerm, game: &Game, header: &str) {
    let entries = game.ecs.player_inventory();
    if entries.is_empty() {
        menu::<&str>(ctx, header, &["Inventory is empty."], INVENTORY_WIDTH);
        return;
    }
    let options: Vec<String> = entries
        .iter()
        .map(|entry| match entry.equipped_in {
            Some(slot) => format!("{} (on {})", entry.name, slot_label(slot)),
            None => entry.name.clone(),
        })
        .collect();
    menu(ctx, header, &options, INVENTORY_WIDTH);
}

fn slot_label(slot: EquipmentSlot) -> &'static str {
    match slot {
        EquipmentSlot::MainHand => "main hand",
        EquipmentSlot::OffHand => "off hand",
    }
}

pub fn level_up_menu(ctx: &mut BTerm, game: &Game) {
    let Some(stats) = game.ecs.player_stats() else {
        return;
    };
    let options = [
        format!("Constitution (+20 HP, from {})", stats.max_hp),
        format!("Strength (+1 attack, from {})", stats.power),
        format!("Agility (+1 defense, from {})", stats.defense),
    ];
    menu(ctx, "Level up! Choose a stat to raise:", &options, LEVEL_UP_WIDTH);
}

pub fn character_screen(ctx: &mut BTerm, game: &Game) {
    let Some(stats) = game.ecs.player_stats() else {
        return;
    };
    let (screen_w, screen_h) = ctx.get_char_size();
    let lines = [
        "Character Information".to_string(),
        format!("Level: {}", stats.level),
        format!("Experience: {}", stats.xp),
        format!("Experience to Level: {}", stats.xp_to_next_level),
        format!("Maximum HP: {}", stats.max_hp),
        format!("Attack: {}", stats.power),
        format!("Defense: {}", stats.defense),
    ];
    let height = lines.len() as i32 + 3;
    let x = screen_w as i32 / 2 - CHARACTER_SCREEN_WIDTH / 2;
    let y = screen_h as i32 / 2 - height / 2;
    let fg = palette::WHITE.rgb();
    let bg = palette::BLACK.rgb();
    ctx.draw_box(x, y, CHARACTER_SCREEN_WIDTH, height, fg, bg);
    for (row, line) in lines.iter().enumerate() {
        ctx.print_color(x + 1, y + 1 + row as i32 + (row > 0) as i32, fg, bg, line);
    }
}

pub fn main_menu(ctx: &mut BTerm, title: &str) {
    let (_, screen_h) = ctx.get_char_size();
    ctx.cls();
    let center_y = screen_h as i32 / 2;
    ctx.print_color_centered(
        center_y - 4,
        palette::LIGHT_GRAY.rgb(),
        palette::BLACK.rgb(),
        title.to_uppercase(),
    );
    ctx.print_color_centered(
        screen_h as i32 - 2,
        palette::LIGHT_GRAY.rgb(),
        palette::BLACK.rgb(),
        "A descent through procedurally dug tunnels",
    );
    menu(ctx, "", &["Play a new game", "Continue last game", "Quit"], 24);
}

pub fn main_menu_choice(key: VirtualKeyCode) -> Option<MainMenuChoice> {
    match key {
        VirtualKeyCode::A => Some(MainMenuChoice::NewGame),
        VirtualKeyCode::B => Some(MainMenuChoice::Continue),
        VirtualKeyCode::C | VirtualKeyCode::Escape => Some(MainMenuChoice::Quit),
        _ => None,
    }
}

/// A single-line popup, e.g. "No save game to load.".
pub fn message_box(ctx: &mut BTerm, text: &str, width: i32) {
    menu::<&str>(ctx, text, &[], width);
}

fn wrap_lines(text: &str, width: usize) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();
    for word in text.split_whitespace() {
        match lines.last_mut() {
            Some(line) if line.len() + 1 + word.len() <= width => {
                line.push(' ');
                line.push_str(word);
            }
            _ => lines.push(word.to_string()),
        }
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn menu_headers_wrap_on_words() {
        assert_eq!(
            wrap_lines("Press the key next to an item", 12),
            vec!["Press the", "key next to", "an item"]
        );
        assert!(wrap_lines("", 10).is_empty());
    }

    #[test]
    fn main_menu_letters() {
        assert_eq!(main_menu_choice(VirtualKeyCode::A), Some(MainMenuChoice::NewGame));
        assert_eq!(main_menu_choice(VirtualKeyCode::Escape), Some(MainMenuChoice::Quit));
        assert_eq!(main_menu_choice(VirtualKeyCode::X), None);
    }
}
