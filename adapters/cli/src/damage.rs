use contagion_board::{query, Board};
use contagion_core::TileStatus;

/// Decides when contamination has overwhelmed the board.
#[derive(Clone, Copy, Debug)]
pub(crate) struct DamageMonitor {
    threshold: f32,
    tripped: bool,
}

impl DamageMonitor {
    /// Creates a monitor that trips once the malignant share of live tiles reaches `threshold`.
    pub(crate) fn new(threshold: f32) -> Self {
        Self {
            threshold,
            tripped: false,
        }
    }

    /// Re-arms the monitor for a freshly started level.
    pub(crate) fn reset(&mut self) {
        self.tripped = false;
    }

    /// Inspects the board, returning `true` the first time the threshold is reached.
    pub(crate) fn observe(&mut self, board: &Board) -> bool {
        if self.tripped {
            return false;
        }

        let malignant = query::count_status(board, TileStatus::Malignant);
        let live = malignant + query::count_status(board, TileStatus::Healthy);
        if live == 0 {
            return false;
        }

        let share = malignant as f32 / live as f32;
        if share >= self.threshold {
            log::info!(
                "contamination at {:.0}% reached the {:.0}% limit",
                share * 100.0,
                self.threshold * 100.0
            );
            self.tripped = true;
        }
        self.tripped
    }
}
