use crate::palette::{self, Color};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MonsterKind {
    Orc,
    Troll,
}

#[derive(Clone, Debug)]
pub struct MonsterTemplate {
    pub name: &'static str,
    pub glyph: char,
    pub color: Color,
    pub hp: i32,
    pub defense: i32,
    pub power: i32,
    pub xp: i32,
}

impl MonsterKind {
    pub fn template(self) -> MonsterTemplate {
        match self {
            MonsterKind::Orc => {
                MonsterTemplate::new("Orc", 'o', palette::DESATURATED_GREEN, 20, 0, 4, 35)
            }
            MonsterKind::Troll => {
                MonsterTemplate::new("Troll", 'T', palette::DARKER_GREEN, 30, 2, 8, 100)
            }
        }
    }
}

impl MonsterTemplate {
    const fn new(
        name: &'static str,
        glyph: char,
        color: Color,
        hp: i32,
        defense: i32,
        power: i32,
        xp: i32,
    ) -> Self {
        Self {
            name,
            glyph,
            color,
            hp,
            defense,
            power,
            xp,
        }
    }
}
