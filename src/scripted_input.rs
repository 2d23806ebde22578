//! Replays a text file of keypresses and mouse clicks, so the game can run
//! without a window.
//!
//! Each line is either `click X Y` / `rclick X Y` (map coordinates) or a run
//! of key characters. Blank lines and `#` comments are skipped.

use std::{
    collections::VecDeque,
    fs::File,
    io::{self, BufRead, BufReader, Read},
    path::Path,
};

use bracket_geometry::prelude::Point;
use bracket_terminal::prelude::VirtualKeyCode;
use tracing::warn;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ScriptEvent {
    Key(VirtualKeyCode),
    Click { point: Point, left: bool },
}

pub struct ScriptedInput {
    events: VecDeque<ScriptEvent>,
}

impl ScriptedInput {
    pub fn from_file<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        Self::from_reader(File::open(path)?)
    }

    pub fn from_reader<R: Read>(reader: R) -> io::Result<Self> {
        let mut events = VecDeque::new();
        for (number, line) in BufReader::new(reader).lines().enumerate() {
            let line = line?;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            if let Some(click) = parse_click(trimmed) {
                events.push_back(click);
                continue;
            }
            for c in trimmed.chars() {
                match char_to_virtualkeycode(c) {
                    Some(key) => events.push_back(ScriptEvent::Key(key)),
                    None => warn!(line = number + 1, key = %c, "unknown key in script"),
                }
            }
        }
        Ok(Self { events })
    }

    pub fn next_event(&mut self) -> Option<ScriptEvent> {
        self.events.pop_front()
    }

    pub fn remaining(&self) -> usize {
        self.events.len()
    }
}

fn parse_click(line: &str) -> Option<ScriptEvent> {
    let mut parts = line.split_whitespace();
    let left = match parts.next()? {
        "click" => true,
        "rclick" => false,
        _ => return None,
    };
    let x = parts.next()?.parse::<i32>().ok()?;
    let y = parts.next()?.parse::<i32>().ok()?;
    Some(ScriptEvent::Click {
        point: Point::new(x, y),
        left,
    })
}

fn char_to_virtualkeycode(c: char) -> Option<VirtualKeyCode> {
    let key = match c.to_ascii_lowercase() {
        'a' => VirtualKeyCode::A,
        'b' => VirtualKeyCode::B,
        'c' => VirtualKeyCode::C,
        'd' => VirtualKeyCode::D,
        'e' => VirtualKeyCode::E,
        'f' => VirtualKeyCode::F,
        'g' => VirtualKeyCode::G,
        'h' => VirtualKeyCode::H,
        'i' => VirtualKeyCode::I,
        'j' => VirtualKeyCode::J,
        'k' => VirtualKeyCode::K,
        'l' => VirtualKeyCode::L,
        'm' => VirtualKeyCode::M,
        'n' => VirtualKeyCode::N,
        'o' => VirtualKeyCode::O,
        'p' => VirtualKeyCode::P,
        'q' => VirtualKeyCode::Q,
        'r' => VirtualKeyCode::R,
        's' => VirtualKeyCode::S,
        't' => VirtualKeyCode::T,
        'u' => VirtualKeyCode::U,
        'v' => VirtualKeyCode::V,
        'w' => VirtualKeyCode::W,
        'x' => VirtualKeyCode::X,
        'y' => VirtualKeyCode::Y,
        'z' => VirtualKeyCode::Z,
        '.' => VirtualKeyCode::Period,
        '>' => VirtualKeyCode::Return, // take stairs
        '~' => VirtualKeyCode::Escape,
        '\x1B' => VirtualKeyCode::Escape,
        _ => return None,
    };
    Some(key)
}
