// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Periodic telemetry refresh deadline.

use std::time::Duration;

use tokio::time::Instant;

/// Deadline for the next periodic telemetry request.
///
/// The next deadline is always computed from the moment the request was
/// sent, not from the previous deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshSchedule {
    interval: Duration,
    deadline: Instant,
}

impl RefreshSchedule {
    /// Creates a schedule that is due at `first`.
    #[must_use]
    pub fn new(interval: Duration, first: Instant) -> Self {
        Self {
            interval,
            deadline: first,
        }
    }

    /// Returns the refresh interval.
    #[must_use]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Returns the current deadline.
    #[must_use]
    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    /// Returns `true` if the deadline has been reached at `now`.
    #[must_use]
    pub fn is_due(&self, now: Instant) -> bool {
        now >= self.deadline
    }

    /// Moves the deadline to one interval after `now`.
    pub fn reschedule(&mut self, now: Instant) {
        self.deadline = now + self.interval;
    }
}
