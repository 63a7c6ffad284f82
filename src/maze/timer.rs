/*
timer.rs

Copyright 2025 Hervé Quatremain

This file is part of Mazewalk.

Mazewalk is free software: you can redistribute it and/or modify it under the
terms of the GNU General Public License as published by the Free Software
Foundation, either version 3 of the License, or (at your option) any later
version.

Mazewalk is distributed in the hope that it will be useful, but WITHOUT ANY
WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR
A PARTICULAR PURPOSE. See the GNU General Public License for more details.

You should have received a copy of the GNU General Public License along with
Mazewalk. If not, see <https://www.gnu.org/licenses/>.

SPDX-License-Identifier: GPL-3.0-or-later
*/

//! Delayed self-events for the machines running in automatic mode.
//!
//! A machine in automatic mode arms its [`Timer`] after each step. The session driver (see
//! [`crate::session`]) waits for the earliest deadline of the machine tree and then delivers
//! the step. Pausing a machine cancels its pending deadline.

use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use strum_macros::Display;

/// How a machine advances.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, Default, PartialEq, Eq, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum RunMode {
    /// One step per command.
    #[default]
    Manual,

    /// One step per timer expiration.
    Auto,
}

impl RunMode {
    /// Return the other mode.
    pub fn toggled(self) -> Self {
        match self {
            RunMode::Manual => RunMode::Auto,
            RunMode::Auto => RunMode::Manual,
        }
    }
}

/// Pending delayed step.
#[derive(Debug, Clone)]
pub struct Timer {
    /// Delay between two steps.
    delay: Duration,

    /// When the next step is due, if one is scheduled.
    deadline: Option<Instant>,
}

impl Timer {
    /// Create a [`Timer`] object with nothing scheduled.
    pub fn new(delay_ms: u64) -> Self {
        Self {
            delay: Duration::from_millis(delay_ms),
            deadline: None,
        }
    }

    /// Change the delay. An already scheduled step keeps its deadline.
    pub fn set_delay(&mut self, delay_ms: u64) {
        self.delay = Duration::from_millis(delay_ms);
    }

    /// Schedule the next step.
    pub fn schedule(&mut self) {
        self.deadline = Some(Instant::now() + self.delay);
    }

    /// Cancel the pending step.
    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    /// When the next step is due.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Consume the pending step if it is due at `now`.
    pub fn take_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(d) if d <= now => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

/// Return the earliest of two optional deadlines.
pub fn earliest(a: Option<Instant>, b: Option<Instant>) -> Option<Instant> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, None) => a,
        (None, b) => b,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_delay_is_due_immediately() {
        let mut timer: Timer = Timer::new(0);
        assert!(!timer.take_due(Instant::now()));

        timer.schedule();
        assert!(timer.deadline().is_some());
        assert!(timer.take_due(Instant::now()));
        assert!(timer.deadline().is_none());
    }

    #[test]
    fn cancel_drops_the_deadline() {
        let mut timer: Timer = Timer::new(10_000);
        timer.schedule();
        assert!(!timer.take_due(Instant::now()));

        timer.cancel();
        assert_eq!(timer.deadline(), None);
    }

    #[test]
    fn earliest_deadline() {
        let now: Instant = Instant::now();
        let later: Instant = now + Duration::from_millis(5);

        assert_eq!(earliest(Some(later), Some(now)), Some(now));
        assert_eq!(earliest(None, Some(later)), Some(later));
        assert_eq!(earliest(None, None), None);
        assert_eq!(RunMode::Manual.toggled(), RunMode::Auto);
    }
}
