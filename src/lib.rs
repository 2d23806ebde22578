//! A turn-based dungeon crawler: rooms-and-corridors (or BSP) floors,
//! orcs and trolls, potions and scrolls, and a specs world driving it all.

pub mod ai;
pub mod config;
pub mod data;
pub mod death;
pub mod ecs;
pub mod effects;
pub mod engine;
pub mod fov;
pub mod map;
pub mod messages;
pub mod palette;
pub mod random;
pub mod render;
pub mod save;
pub mod scripted_input;
pub mod telemetry;

pub use config::Config;
pub use engine::{Action, Control, Game, GameState};
