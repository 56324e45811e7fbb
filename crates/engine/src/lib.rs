//! Match layer on top of the turn engine.
//!
//! [`session::MatchSession`] drives one run: it routes tray placements and
//! booster uses into [`block_album_core::TurnEngine`], tracks the score goal
//! and level progression, and decides when a run is won or lost. The
//! [`hint`] module ranks every legal move for the current tray.

pub mod boosters;
pub mod error;
pub mod hint;
pub mod session;

pub use block_album_core as core;
pub use block_album_types as types;

pub use boosters::{BoosterConfig, BoosterKind, BoosterStatus, Boosters};
pub use error::SessionError;
pub use hint::{suggest, HintSuggestion};
pub use session::{LossReason, MatchSession, RunState, SessionConfig, SessionSnapshot};
