//! Terminal input module.
//!
//! Maps `crossterm` key and mouse events into [`crate::types::InputCommand`].
//! Turn-based play needs no repeat handling: every key press is one command.

pub mod map;

pub use block_album_types as types;

pub use map::{left_click, map_key, should_quit};
