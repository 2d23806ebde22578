//! Game constants, loadable from an optional JSON file.

use std::{fs, path::Path};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed config file: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MapAlgorithm {
    #[default]
    Rooms,
    Bsp,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub window_title: String,
    pub screen_width: i32,
    pub screen_height: i32,

    pub bar_width: i32,
    pub panel_height: i32,

    pub map_width: i32,
    pub map_height: i32,
    pub map_algorithm: MapAlgorithm,

    pub room_min_size: i32,
    pub room_max_size: i32,
    pub max_rooms: usize,

    pub bsp_depth: u32,
    pub bsp_min_size: i32,
    pub bsp_full_rooms: bool,

    pub fov_radius: i32,
    pub inventory_capacity: usize,

    /// Fixed seed for reproducible dungeons; `None` draws one from the clock.
    pub seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            window_title: "tunnelrogue".to_string(),
            screen_width: 80,
            screen_height: 50,
            bar_width: 20,
            panel_height: 7,
            map_width: 80,
            map_height: 43,
            map_algorithm: MapAlgorithm::Rooms,
            room_min_size: 6,
            room_max_size: 10,
            max_rooms: 30,
            bsp_depth: 10,
            bsp_min_size: 6,
            bsp_full_rooms: false,
            fov_radius: 10,
            inventory_capacity: 26,
            seed: None,
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.room_min_size < 3 {
            return Err(ConfigError::Invalid(format!(
                "room_min_size must be at least 3, got {}",
                self.room_min_size
            )));
        }
        if self.room_min_size > self.room_max_size {
            return Err(ConfigError::Invalid(format!(
                "room_min_size {} exceeds room_max_size {}",
                self.room_min_size, self.room_max_size
            )));
        }
        if self.room_max_size >= self.map_width - 1 || self.room_max_size >= self.map_height - 1 {
            return Err(ConfigError::Invalid(format!(
                "rooms of size {} do not fit a {}x{} map",
                self.room_max_size, self.map_width, self.map_height
            )));
        }
        if self.max_rooms == 0 {
            return Err(ConfigError::Invalid("max_rooms must be positive".into()));
        }
        if self.bsp_min_size < 3 {
            return Err(ConfigError::Invalid(format!(
                "bsp_min_size must be at least 3, got {}",
                self.bsp_min_size
            )));
        }
        if self.map_height + self.panel_height > self.screen_height {
            return Err(ConfigError::Invalid(format!(
                "map height {} plus panel {} exceeds screen height {}",
                self.map_height, self.panel_height, self.screen_height
            )));
        }
        Ok(())
    }

    pub fn panel_y(&self) -> i32 {
        self.screen_height - self.panel_height
    }

    pub fn message_x(&self) -> i32 {
        self.bar_width + 2
    }

    pub fn message_width(&self) -> usize {
        (self.screen_width - self.bar_width - 2).max(1) as usize
    }

    pub fn message_height(&self) -> usize {
        (self.panel_height - 1).max(1) as usize
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.panel_y(), 43);
        assert_eq!(config.message_x(), 22);
        assert_eq!(config.message_width(), 58);
        assert_eq!(config.message_height(), 6);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(file, r#"{{ "max_rooms": 5, "map_algorithm": "bsp", "seed": 9 }}"#).expect("write");
        let config = Config::load(file.path()).expect("load");
        assert_eq!(config.max_rooms, 5);
        assert_eq!(config.map_algorithm, MapAlgorithm::Bsp);
        assert_eq!(config.seed, Some(9));
        assert_eq!(config.map_width, 80);
    }

    #[test]
    fn inverted_room_sizes_are_rejected() {
        let config = Config {
            room_min_size: 12,
            room_max_size: 8,
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn garbage_file_is_a_json_error() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(file, "not json").expect("write");
        assert!(matches!(Config::load(file.path()), Err(ConfigError::Json(_))));
    }
}
