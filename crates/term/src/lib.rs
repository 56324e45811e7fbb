//! Terminal "game renderer" module.
//!
//! Renders a [`engine::SessionSnapshot`] into a simple framebuffer that is
//! flushed to the terminal as diffs. It avoids widget toolkits so the board
//! keeps an exact 2x1 cell aspect and screen positions map back to grid cells
//! for mouse input.

pub mod fb;
pub mod game_view;
pub mod renderer;

pub use block_album_core as core;
pub use block_album_engine as engine;
pub use block_album_types as types;

pub use fb::{CellStyle, FrameBuffer, Glyph, Rgb};
pub use game_view::{feed_line, AnchorY, GameView, ViewOverlay, Viewport};
pub use renderer::{encode_diff_into, encode_full_into, TerminalRenderer};
