/// Unchanged cycles tolerated before the current color is re-sent.
pub const REASSERT_AFTER_CYCLES: u32 = 11;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateDecision {
    /// Count changed: blink, then go solid.
    Changed,
    /// Count unchanged but the flag has not been written for too long.
    Periodic,
    Skip,
}

impl UpdateDecision {
    pub fn is_update(&self) -> bool {
        !matches!(self, UpdateDecision::Skip)
    }
}

#[derive(Debug, Clone, Default)]
pub struct CycleState {
    previous_count: usize,
    cycles_since_update: u32,
}

impl CycleState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn decide(&self, count: usize) -> UpdateDecision {
        if count != self.previous_count {
            UpdateDecision::Changed
        } else if self.cycles_since_update > REASSERT_AFTER_CYCLES {
            UpdateDecision::Periodic
        } else {
            UpdateDecision::Skip
        }
    }

    pub fn record(&mut self, count: usize, decision: UpdateDecision) {
        self.previous_count = count;
        if decision.is_update() {
            self.cycles_since_update = 0;
        } else {
            self.cycles_since_update = self.cycles_since_update.saturating_add(1);
        }
    }

    pub fn previous_count(&self) -> usize {
        self.previous_count
    }

    pub fn cycles_since_update(&self) -> u32 {
        self.cycles_since_update
    }

    #[cfg(test)]
    pub fn with(previous_count: usize, cycles_since_update: u32) -> Self {
        Self {
            previous_count,
            cycles_since_update,
        }
    }
}
