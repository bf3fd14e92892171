//! Funnel steps and the progress indicator.

use crate::step_enum;

step_enum! {
    /// Position of a session in the enrollment funnel.
    pub enum Step {
        ConfirmTrack = 1 => "CONFIRM_TRACK",
        SelectPlan = 2 => "SELECT_PLAN",
        Payment = 3 => "PAYMENT",
        Unlocked = 4 => "UNLOCKED",
    }
    final: [Unlocked]
}

/// Number of markers on the progress bar.
pub const TOTAL_STEPS: u8 = 4;

impl Step {
    /// Filled share of the progress bar: 0, 33.3, 66.6 or 100.
    pub fn progress_percent(self) -> f64 {
        f64::from(self.index() - 1) / f64::from(TOTAL_STEPS - 1) * 100.0
    }
}

impl Default for Step {
    fn default() -> Self {
        Self::ConfirmTrack
    }
}
