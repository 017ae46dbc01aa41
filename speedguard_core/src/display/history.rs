// speedguard_core/src/display/history.rs

use std::collections::VecDeque;

use crate::messages::DisplayState;

/// Number of points the speed chart keeps by default.
pub const DEFAULT_HISTORY_LEN: usize = 30;

/// Fixed-size rolling buffer of display states, oldest first.
#[derive(Debug, Clone)]
pub struct SpeedHistory {
    points: VecDeque<DisplayState>,
    capacity: usize,
}

impl SpeedHistory {
    /// A zero capacity is bumped to one so the latest point is always kept.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            points: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, state: DisplayState) {
        if self.points.len() == self.capacity {
            self.points.pop_front();
        }
        self.points.push_back(state);
    }

    pub fn latest(&self) -> Option<&DisplayState> {
        self.points.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DisplayState> {
        self.points.iter()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }
}

impl Default for SpeedHistory {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_HISTORY_LEN)
    }
}
