//! Status coordinator — the state machine binding host events to the light.
//!
//! Holds the current logical state (Off until the host reports anything),
//! resolves colors through [`ColorPolicy`], and dispatches every change
//! through [`FlashController`] and [`DeviceConnection`]. Transitions never
//! fail; a failed downstream apply only makes the visual representation lag
//! behind the logical state.

use std::time::{Duration, SystemTime};

use crate::color::Color;
use crate::config::Palette;
use crate::connection::{DeviceConnection, DeviceSource};
use crate::flash::{FlashController, FlashToken, Recurrence};
use crate::policy::ColorPolicy;
use crate::status::Status;

/// Where the next scheduled recording's start time comes from.
pub trait ScheduleSource {
    /// Start time of the next scheduled recording, or `None` if nothing is
    /// scheduled.
    fn next_recording_start(&self) -> Option<SystemTime>;
}

/// A fixed schedule; handy for tests and one-shot commands.
impl ScheduleSource for Option<SystemTime> {
    fn next_recording_start(&self) -> Option<SystemTime> {
        *self
    }
}

/// Reactive controller: host events in, LED colors out.
///
/// `state == None` is Off, the initial state and the terminal state entered
/// on shutdown. `Status::Upcoming` is synthesized here from the schedule;
/// the host never pushes it (a pushed `Upcoming` is accepted as force-enter
/// for symmetry with the dedicated upcoming notification).
pub struct StatusCoordinator<S: DeviceSource> {
    state: Option<Status>,
    current_color: Color,
    policy: ColorPolicy,
    flash: FlashController,
    conn: DeviceConnection<S>,
    off_color: Color,
    lookahead: Duration,
    done: bool,
}

impl<S: DeviceSource> StatusCoordinator<S> {
    pub fn new(palette: &Palette, source: S) -> Self {
        StatusCoordinator {
            state: None,
            current_color: palette.off,
            policy: ColorPolicy::new(palette),
            flash: FlashController::new(palette.pause, palette.pause_delay),
            conn: DeviceConnection::new(source, palette.preview),
            off_color: palette.off,
            lookahead: palette.upcoming_lookahead,
            done: false,
        }
    }

    /// Periodic tick: re-resolve and re-send the current color so the light
    /// stays correct even if the stick was unplugged when the status last
    /// changed. While previewing, also recompute the upcoming window from
    /// the schedule. Skipped entirely while the flash is driving the light.
    pub fn handle_tick(&mut self, schedule: &impl ScheduleSource) {
        if self.done || self.flash.is_flashing() {
            return;
        }
        if matches!(self.state, Some(Status::Preview | Status::Upcoming)) {
            let upcoming = schedule
                .next_recording_start()
                .is_some_and(|start| within_lookahead(start, self.lookahead));
            self.state = Some(if upcoming {
                Status::Upcoming
            } else {
                Status::Preview
            });
        }
        self.apply_current();
    }

    /// Host reported a new recorder status.
    pub fn handle_status_change(&mut self, status: Status) {
        if self.done {
            return;
        }
        log::debug!("recorder status -> {status}");
        self.state = Some(status);
        self.apply_current();
    }

    /// Host scheduling logic says a recording is imminent: force-enter
    /// Upcoming, independent of the tick-based recomputation.
    pub fn handle_upcoming(&mut self) {
        if self.done {
            return;
        }
        self.state = Some(Status::Upcoming);
        self.apply_current();
    }

    /// Shutdown: cancel any flash, darken the light, go Off. Terminal.
    pub fn handle_shutdown(&mut self) {
        if self.done {
            return;
        }
        self.flash.cancel();
        self.conn.apply(self.off_color, false);
        self.state = None;
        self.current_color = self.off_color;
        self.done = true;
        log::debug!("indicator shut down");
    }

    /// One flash-timer firing, forwarded to the flash controller.
    pub fn handle_flash_tick(&mut self, token: FlashToken) -> Recurrence {
        if self.done {
            return Recurrence::Stop;
        }
        self.flash.toggle(token, &mut self.conn)
    }

    fn apply_current(&mut self) {
        match self.state {
            None => {
                self.flash.cancel();
                self.current_color = self.off_color;
                self.conn.apply(self.off_color, false);
            }
            Some(status) => {
                let color = self.policy.resolve(status, false);
                self.current_color = color;
                self.flash.apply(status, color, &mut self.conn);
            }
        }
    }

    // ── observable state ──

    /// Current logical status; `None` is Off.
    pub fn status(&self) -> Option<Status> {
        self.state
    }

    /// The policy's latest output (what the light should be showing).
    pub fn current_color(&self) -> Color {
        self.current_color
    }

    /// Live flash token, if the pause blink is scheduled.
    pub fn flash_token(&self) -> Option<FlashToken> {
        self.flash.active()
    }

    /// Pause flash interval.
    pub fn flash_interval(&self) -> Duration {
        self.flash.interval()
    }

    /// Whether shutdown has been processed.
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// The device connection (read access, e.g. for diagnostics).
    pub fn connection(&self) -> &DeviceConnection<S> {
        &self.conn
    }
}

/// Whether a start time falls inside the lookahead window. A start already
/// in the past still counts as upcoming.
fn within_lookahead(start: SystemTime, lookahead: Duration) -> bool {
    match start.duration_since(SystemTime::now()) {
        Ok(delta) => delta <= lookahead,
        Err(_) => true,
    }
}
