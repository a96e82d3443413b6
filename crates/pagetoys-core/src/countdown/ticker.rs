//! Once-per-second countdown driver.
//!
//! Like the rest of the widgets there is no internal thread; the caller
//! invokes `tick_at()` on its own interval.
//!
//! ```text
//! Running -> Finished
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Countdown;
use crate::events::Event;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TickerState {
    Running,
    Finished,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountdownTicker {
    countdown: Countdown,
    state: TickerState,
    ticks: u64,
}

impl CountdownTicker {
    pub fn new(countdown: Countdown) -> Self {
        Self {
            countdown,
            state: TickerState::Running,
            ticks: 0,
        }
    }

    pub fn state(&self) -> TickerState {
        self.state
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn countdown(&self) -> &Countdown {
        &self.countdown
    }

    /// Returns `CountdownTick` while running, `CountdownFinished` exactly
    /// once, then `None` forever.
    pub fn tick_at(&mut self, now: DateTime<Utc>) -> Option<Event> {
        if self.state == TickerState::Finished {
            return None;
        }
        self.ticks += 1;

        match self.countdown.remaining_at(now) {
            Some(remaining) => Some(Event::CountdownTick {
                remaining_secs: remaining.total_secs(),
                text: remaining.render(&self.countdown.format),
                at: now,
            }),
            None => {
                self.state = TickerState::Finished;
                tracing::info!(target_at = %self.countdown.target, "countdown finished");
                Some(Event::CountdownFinished {
                    text: self.countdown.end_text.clone(),
                    at: now,
                })
            }
        }
    }

    pub fn tick(&mut self) -> Option<Event> {
        self.tick_at(Utc::now())
    }
}
