// Views - per-chart ephemeral state and the reset epoch that clears it
// Drill levels, expanded Others lists, the collaboration explorer

pub mod drill; // drill-down state machine + other view-local states
pub mod epoch; // reset epoch, coordinator, epoch-bound wrapper

pub use drill::{ArchaeologyState, ArchaeologyTab, DrillError, DrillState, ExpandedOthers, OthersExpansion};
pub use epoch::{ResetCoordinator, ResetEpoch, ViewLocal};

use crate::filter::YearRange;

/// Every chart's local state, each bound to the reset epoch independently
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewStates {
    pub sunburst: ViewLocal<DrillState>,
    pub others: ViewLocal<OthersExpansion>,
    pub archaeology: ViewLocal<ArchaeologyState>,
}

impl ViewStates {
    pub fn new(archaeology_window: YearRange, epoch: ResetEpoch) -> Self {
        Self {
            sunburst: ViewLocal::default_at(epoch),
            others: ViewLocal::default_at(epoch),
            archaeology: ViewLocal::new(ArchaeologyState::new(archaeology_window), epoch),
        }
    }

    /// Bring every view up to `epoch`
    pub fn observe(&mut self, epoch: ResetEpoch) {
        self.sunburst.observe(epoch);
        self.others.observe(epoch);
        self.archaeology.observe(epoch);
    }

    pub fn all_initial(&self) -> bool {
        self.sunburst.is_initial() && self.others.is_initial() && self.archaeology.is_initial()
    }
}
