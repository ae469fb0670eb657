//! Pause flashing — cooperative recurring toggle with token-based cancel.
//!
//! Cancellation is cooperative, not preemptive: the scheduler presents its
//! token each time the timer fires, and the toggle callback answers
//! [`Recurrence::Stop`] once that token is no longer the live one. The
//! controller is the single source of truth for token liveness.

use std::time::Duration;

use crate::color::Color;
use crate::connection::{DeviceConnection, DeviceSource};
use crate::status::Status;

/// Identifies one scheduled recurring toggle. At most one is live at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlashToken(u64);

/// Answer from the toggle callback: keep the timer recurring or stop it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recurrence {
    Continue,
    Stop,
}

/// Drives the paused-state blink and routes all other applies straight
/// through to the device connection.
pub struct FlashController {
    token: Option<FlashToken>,
    next_id: u64,
    pause_color: Color,
    interval: Duration,
}

impl FlashController {
    pub fn new(pause_color: Color, interval: Duration) -> Self {
        FlashController {
            token: None,
            next_id: 0,
            pause_color,
            interval,
        }
    }

    /// Apply a status transition's color.
    ///
    /// Entering Paused mints a flash token and returns without touching the
    /// device: the first visual change happens on the first timer firing
    /// (blink starts on the next tick). Re-entering Paused while already
    /// flashing is a no-op. Any non-Paused status cancels a live token
    /// before the color goes out directly.
    pub fn apply<S: DeviceSource>(
        &mut self,
        status: Status,
        color: Color,
        conn: &mut DeviceConnection<S>,
    ) {
        if status == Status::Paused {
            if self.token.is_none() {
                let token = FlashToken(self.next_id);
                self.next_id += 1;
                self.token = Some(token);
                log::debug!("pause flash scheduled every {:?}", self.interval);
            }
            return;
        }

        if self.token.take().is_some() {
            log::debug!("pause flash cancelled");
        }
        conn.apply(color, false);
    }

    /// One timer firing. Sends the pause color through the connection in
    /// flashing mode (the connection substitutes the alternate color on a
    /// re-send, producing the blink) and reports whether the timer should
    /// keep recurring.
    pub fn toggle<S: DeviceSource>(
        &mut self,
        token: FlashToken,
        conn: &mut DeviceConnection<S>,
    ) -> Recurrence {
        if self.token != Some(token) {
            return Recurrence::Stop;
        }
        conn.apply(self.pause_color, true);
        Recurrence::Continue
    }

    /// The live token, if a flash is currently scheduled.
    pub fn active(&self) -> Option<FlashToken> {
        self.token
    }

    pub fn is_flashing(&self) -> bool {
        self.token.is_some()
    }

    /// Drop the live token without touching the device.
    pub fn cancel(&mut self) {
        self.token = None;
    }

    /// Toggle interval (the configured pause delay).
    pub fn interval(&self) -> Duration {
        self.interval
    }
}
