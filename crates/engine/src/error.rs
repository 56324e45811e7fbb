//! Session command rejections.

use thiserror::Error;

use crate::boosters::BoosterKind;

/// Why a session command was refused.
///
/// State is unchanged, except after a failed second chance: the tray has been
/// redrawn and a cell may have been opened, but the second chance stays
/// available.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("the run is over")]
    RunOver,
    #[error("tray slot {0} is empty")]
    SlotEmpty(usize),
    #[error("tray slot {0} does not exist")]
    SlotOutOfRange(usize),
    #[error("the shape does not fit there")]
    IllegalPlacement,
    #[error("no {} charges left", .0.label())]
    NoCharges(BoosterKind),
    #[error("not enough power: need {needed}, have {available}")]
    InsufficientPower { needed: u32, available: u32 },
    #[error("nothing to clear at the target")]
    NothingToClear,
    #[error("second chance is not available")]
    SecondChanceUnavailable,
}

impl SessionError {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            SessionError::RunOver => "run_over",
            SessionError::SlotEmpty(_) => "slot_empty",
            SessionError::SlotOutOfRange(_) => "slot_out_of_range",
            SessionError::IllegalPlacement => "illegal_placement",
            SessionError::NoCharges(_) => "no_charges",
            SessionError::InsufficientPower { .. } => "insufficient_power",
            SessionError::NothingToClear => "nothing_to_clear",
            SessionError::SecondChanceUnavailable => "second_chance_unavailable",
        }
    }
}
