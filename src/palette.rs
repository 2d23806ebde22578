use bracket_terminal::prelude::RGB;
use serde::{Deserialize, Serialize};

/// A serializable 8-bit color. Converted to `RGB` at draw time.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color(pub u8, pub u8, pub u8);

impl Color {
    pub fn rgb(self) -> RGB {
        RGB::from_u8(self.0, self.1, self.2)
    }
}

impl From<Color> for RGB {
    fn from(color: Color) -> Self {
        color.rgb()
    }
}

pub const WHITE: Color = Color(255, 255, 255);
pub const BLACK: Color = Color(0, 0, 0);
pub const RED: Color = Color(255, 0, 0);
pub const GREEN: Color = Color(0, 255, 0);
pub const BLUE: Color = Color(0, 0, 255);
pub const YELLOW: Color = Color(255, 255, 0);
pub const ORANGE: Color = Color(255, 127, 0);
pub const VIOLET: Color = Color(127, 0, 255);
pub const SKY: Color = Color(0, 191, 255);

pub const LIGHT_GREEN: Color = Color(114, 255, 114);
pub const LIGHT_CYAN: Color = Color(114, 255, 255);
pub const LIGHT_PINK: Color = Color(255, 114, 184);
pub const LIGHT_VIOLET: Color = Color(184, 114, 255);
pub const LIGHT_RED: Color = Color(255, 114, 114);
pub const LIGHT_GRAY: Color = Color(159, 159, 159);

pub const DARK_RED: Color = Color(191, 0, 0);
pub const DARKER_RED: Color = Color(127, 0, 0);
pub const DARKER_GREEN: Color = Color(0, 127, 0);
pub const DARKER_ORANGE: Color = Color(127, 63, 0);
pub const DESATURATED_GREEN: Color = Color(63, 127, 63);

pub const DARK_WALL: Color = Color(0, 0, 100);
pub const DARK_GROUND: Color = Color(50, 50, 150);
pub const LIGHT_WALL: Color = Color(130, 110, 50);
pub const LIGHT_GROUND: Color = Color(200, 180, 50);
