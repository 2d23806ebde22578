//! Key and mouse bindings, per game state.

use bracket_geometry::prelude::Point;
use bracket_terminal::prelude::{VirtualKeyCode, letter_to_option};

use super::{Action, GameState, LevelUpChoice};

pub fn action_for_key(state: GameState, key: VirtualKeyCode) -> Option<Action> {
    match state {
        GameState::PlayersTurn => players_turn_key(key),
        GameState::PlayerDead => match key {
            VirtualKeyCode::I => Some(Action::ShowInventory),
            VirtualKeyCode::C => Some(Action::ShowCharacterScreen),
            VirtualKeyCode::Escape => Some(Action::Exit),
            _ => None,
        },
        GameState::Targeting => match key {
            VirtualKeyCode::Escape => Some(Action::Exit),
            _ => None,
        },
        GameState::ShowInventory | GameState::DropInventory => match key {
            VirtualKeyCode::Escape => Some(Action::Exit),
            other => usize::try_from(letter_to_option(other))
                .ok()
                .map(Action::InventoryIndex),
        },
        GameState::LevelUp => match key {
            VirtualKeyCode::A => Some(Action::LevelUp(LevelUpChoice::Constitution)),
            VirtualKeyCode::B => Some(Action::LevelUp(LevelUpChoice::Strength)),
            VirtualKeyCode::C => Some(Action::LevelUp(LevelUpChoice::Agility)),
            _ => None,
        },
        GameState::CharacterScreen => match key {
            VirtualKeyCode::Escape => Some(Action::Exit),
            _ => None,
        },
        GameState::EnemyTurn => None,
    }
}

fn players_turn_key(key: VirtualKeyCode) -> Option<Action> {
    let step = |dx, dy| Some(Action::Move { dx, dy });
    match key {
        VirtualKeyCode::Up | VirtualKeyCode::K | VirtualKeyCode::Numpad8 => step(0, -1),
        VirtualKeyCode::Down | VirtualKeyCode::J | VirtualKeyCode::Numpad2 => step(0, 1),
        VirtualKeyCode::Left | VirtualKeyCode::H | VirtualKeyCode::Numpad4 => step(-1, 0),
        VirtualKeyCode::Right | VirtualKeyCode::L | VirtualKeyCode::Numpad6 => step(1, 0),
        VirtualKeyCode::Y | VirtualKeyCode::Numpad7 => step(-1, -1),
        VirtualKeyCode::U | VirtualKeyCode::Numpad9 => step(1, -1),
        VirtualKeyCode::B | VirtualKeyCode::Numpad1 => step(-1, 1),
        VirtualKeyCode::N | VirtualKeyCode::Numpad3 => step(1, 1),
        VirtualKeyCode::Z | VirtualKeyCode::Numpad5 => Some(Action::Wait),
        VirtualKeyCode::G => Some(Action::Pickup),
        VirtualKeyCode::I => Some(Action::ShowInventory),
        VirtualKeyCode::D => Some(Action::DropInventory),
        VirtualKeyCode::Return | VirtualKeyCode::Period => Some(Action::TakeStairs),
        VirtualKeyCode::C => Some(Action::ShowCharacterScreen),
        VirtualKeyCode::Escape => Some(Action::Exit),
        _ => None,
    }
}

/// Left click picks a target; right click cancels. Clicks mean nothing
/// outside targeting mode.
pub fn action_for_click(state: GameState, point: Point, left: bool) -> Option<Action> {
    match (state, left) {
        (GameState::Targeting, true) => Some(Action::Target(point)),
        (GameState::Targeting, false) => Some(Action::CancelTargeting),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vi_keys_move_on_the_players_turn() {
        assert_eq!(
            action_for_key(GameState::PlayersTurn, VirtualKeyCode::Y),
            Some(Action::Move { dx: -1, dy: -1 })
        );
        assert_eq!(
            action_for_key(GameState::PlayersTurn, VirtualKeyCode::L),
            Some(Action::Move { dx: 1, dy: 0 })
        );
        assert_eq!(action_for_key(GameState::PlayerDead, VirtualKeyCode::L), None);
    }

    #[test]
    fn menu_letters_become_indices() {
        assert_eq!(
            action_for_key(GameState::ShowInventory, VirtualKeyCode::A),
            Some(Action::InventoryIndex(0))
        );
        assert_eq!(
            action_for_key(GameState::DropInventory, VirtualKeyCode::Z),
            Some(Action::InventoryIndex(25))
        );
        assert_eq!(
            action_for_key(GameState::ShowInventory, VirtualKeyCode::Key1),
            None
        );
    }

    #[test]
    fn level_up_menu_offers_three_choices() {
        assert_eq!(
            action_for_key(GameState::LevelUp, VirtualKeyCode::B),
            Some(Action::LevelUp(LevelUpChoice::Strength))
        );
        assert_eq!(
            action_for_key(GameState::LevelUp, VirtualKeyCode::Escape),
            None
        );
    }

    #[test]
    fn clicks_only_matter_while_targeting() {
        let point = Point::new(3, 4);
        assert_eq!(
            action_for_click(GameState::Targeting, point, true),
            Some(Action::Target(point))
        );
        assert_eq!(
            action_for_click(GameState::Targeting, point, false),
            Some(Action::CancelTargeting)
        );
        assert_eq!(action_for_click(GameState::PlayersTurn, point, true), None);
    }
}
