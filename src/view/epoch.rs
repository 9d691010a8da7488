use crate::filter::FilterState;
use serde::Serialize;
use std::fmt;
use tracing::{debug, info};

/// Monotonic reset counter. Views compare it against the epoch they last saw.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct ResetEpoch(u64);

impl ResetEpoch {
    pub fn value(self) -> u64 {
        self.0
    }

    fn bump(self) -> Self {
        ResetEpoch(self.0.wrapping_add(1))
    }
}

impl fmt::Display for ResetEpoch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "epoch {}", self.0)
    }
}

/// Owner of the reset epoch ("Reset All")
#[derive(Debug, Default)]
pub struct ResetCoordinator {
    epoch: ResetEpoch,
}

impl ResetCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn epoch(&self) -> ResetEpoch {
        self.epoch
    }

    /// Fresh filters plus the next epoch
    pub fn reset(&mut self) -> (FilterState, ResetEpoch) {
        self.epoch = self.epoch.bump();
        info!("Reset all filters and views ({})", self.epoch);
        (FilterState::default(), self.epoch)
    }
}

/// A view's private state tied to the epoch it was last synced with.
///
/// Any access with a different epoch first restores the initial value, so a
/// reset reaches every view without the views knowing about each other.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewLocal<T> {
    initial: T,
    value: T,
    epoch: ResetEpoch,
}

impl<T: Clone + PartialEq> ViewLocal<T> {
    pub fn new(initial: T, epoch: ResetEpoch) -> Self {
        Self {
            value: initial.clone(),
            initial,
            epoch,
        }
    }

    /// Catch up with `epoch`; returns whether the value was reset
    pub fn observe(&mut self, epoch: ResetEpoch) -> bool {
        if epoch == self.epoch {
            return false;
        }
        self.epoch = epoch;
        if self.value != self.initial {
            debug!("View state restored to initial value ({})", epoch);
        }
        self.value = self.initial.clone();
        true
    }

    pub fn get(&mut self, epoch: ResetEpoch) -> &T {
        self.observe(epoch);
        &self.value
    }

    pub fn get_mut(&mut self, epoch: ResetEpoch) -> &mut T {
        self.observe(epoch);
        &mut self.value
    }

    /// Current value without syncing
    pub fn peek(&self) -> &T {
        &self.value
    }

    pub fn epoch(&self) -> ResetEpoch {
        self.epoch
    }

    pub fn is_initial(&self) -> bool {
        self.value == self.initial
    }
}

impl<T: Clone + PartialEq + Default> ViewLocal<T> {
    pub fn default_at(epoch: ResetEpoch) -> Self {
        Self::new(T::default(), epoch)
    }
}
