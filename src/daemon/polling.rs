use crate::core::cycle::{CycleState, UpdateDecision};
use crate::core::models::{ColorTier, FlagAction, QueueReading, Thresholds};
use crate::core::settings::Settings;
use crate::indicator::FlagGroup;
use crate::providers::TicketSource;
use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;

pub const POLL_INTERVAL: Duration = Duration::from_secs(300);
/// Gap between the blink batch and the solid batch.
pub const BLINK_SPACING: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy)]
pub struct Timing {
    pub poll_interval: Duration,
    pub blink_spacing: Duration,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            poll_interval: POLL_INTERVAL,
            blink_spacing: BLINK_SPACING,
        }
    }
}

pub struct Reconciler {
    source: Arc<dyn TicketSource>,
    flags: FlagGroup,
    thresholds: Thresholds,
    hold_on_upstream_error: bool,
    timing: Timing,
    state: CycleState,
}

impl Reconciler {
    pub fn new(
        settings: &Settings,
        source: Arc<dyn TicketSource>,
        flags: FlagGroup,
        timing: Timing,
    ) -> Self {
        Self {
            source,
            flags,
            thresholds: settings.thresholds,
            hold_on_upstream_error: settings.hold_on_upstream_error,
            timing,
            state: CycleState::new(),
        }
    }

    /// Runs until a flag write fails. The first poll happens immediately.
    pub async fn run(mut self) -> Result<()> {
        tracing::info!(interval = ?self.timing.poll_interval, "Polling loop started");

        let mut first = true;
        loop {
            if !first {
                tokio::time::sleep(self.timing.poll_interval).await;
            }
            first = false;

            self.run_cycle().await?;
        }
    }

    /// One poll and, if the count was read, one reaction.
    pub async fn run_cycle(&mut self) -> Result<Option<UpdateDecision>> {
        match self.poll().await {
            Some(count) => self.react(count).await.map(Some),
            None => Ok(None),
        }
    }

    /// Returns `None` when this cycle should not touch the flags.
    async fn poll(&self) -> Option<usize> {
        let reading = match self.source.fetch_queue().await {
            Ok(reading) => reading,
            Err(e) => {
                tracing::error!(source = self.source.name(), error = %e, "API call failed");
                return None;
            }
        };

        match reading {
            QueueReading::Counted(count) => Some(count),
            QueueReading::Unauthorized(status) | QueueReading::Unavailable(status)
                if self.hold_on_upstream_error =>
            {
                tracing::warn!(%status, "Keeping previous flag state");
                None
            }
            QueueReading::Unauthorized(status) | QueueReading::Unavailable(status) => {
                tracing::warn!(%status, "Treating failed read as an empty queue");
                Some(0)
            }
        }
    }

    async fn react(&mut self, count: usize) -> Result<UpdateDecision> {
        let tier = ColorTier::from_count(count, self.thresholds);
        let decision = self.state.decide(count);

        match decision {
            UpdateDecision::Changed => {
                self.write(tier, FlagAction::Blink).await?;
                tokio::time::sleep(self.timing.blink_spacing).await;
                self.write(tier, FlagAction::SolidColor).await?;
                tracing::info!(
                    tier = tier.name(),
                    previous = self.state.previous_count(),
                    "{} tickets in queue (flag update)",
                    count
                );
            }
            UpdateDecision::Periodic => {
                self.write(tier, FlagAction::SolidColor).await?;
                tracing::info!(
                    tier = tier.name(),
                    "{} tickets in queue (periodic flag update)",
                    count
                );
            }
            UpdateDecision::Skip => {
                tracing::info!(
                    cycles = self.state.cycles_since_update(),
                    "{} tickets in queue (no update)",
                    count
                );
            }
        }

        self.state.record(count, decision);
        Ok(decision)
    }

    async fn write(&self, tier: ColorTier, action: FlagAction) -> Result<()> {
        self.flags
            .apply(tier, action)
            .await
            .with_context(|| format!("Failed to update flag to {}", tier.name()))
    }

    #[cfg(test)]
    fn with_state(mut self, state: CycleState) -> Self {
        self.state = state;
        self
    }

    #[cfg(test)]
    fn state(&self) -> &CycleState {
        &self.state
    }
}
