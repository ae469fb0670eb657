//! Event loop — single-threaded cooperative runtime.
//!
//! One thread owns the coordinator and therefore the device handle. Host
//! events arrive over a channel; the periodic tick and the pause flash are
//! driven by `recv_timeout` deadlines, so no timer threads exist and no
//! callback can race a status change. The flash deadline re-arms from its
//! previous due time, not from `now`, so the blink does not drift.

use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};

use crate::connection::DeviceSource;
use crate::coordinator::{ScheduleSource, StatusCoordinator};
use crate::flash::{FlashToken, Recurrence};
use crate::status::Status;

/// Everything the loop reacts to besides its own deadlines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// Force an immediate periodic tick (normally deadline-driven).
    Tick,
    /// The host recorder changed status.
    Status(Status),
    /// The host says a recording is imminent.
    Upcoming,
    /// Stop: darken the light and return.
    Shutdown,
}

/// Run the indicator until shutdown.
///
/// Consumes the coordinator; it is terminal after this returns. A closed
/// event channel counts as shutdown so an orphaned loop cannot keep a
/// stale color lit.
pub fn run<S: DeviceSource>(
    mut coordinator: StatusCoordinator<S>,
    events: &Receiver<Event>,
    schedule: &impl ScheduleSource,
    tick_interval: Duration,
) {
    // First paint before any event: show Off rather than whatever the
    // stick was left displaying.
    coordinator.handle_tick(schedule);

    let mut next_tick = Instant::now() + tick_interval;
    let mut flash_deadline: Option<(FlashToken, Instant)> = None;

    loop {
        if coordinator.is_done() {
            return;
        }

        let wake = match flash_deadline {
            Some((_, due)) => next_tick.min(due),
            None => next_tick,
        };
        let timeout = wake.saturating_duration_since(Instant::now());

        match events.recv_timeout(timeout) {
            Ok(Event::Shutdown) => {
                coordinator.handle_shutdown();
                return;
            }
            Ok(Event::Status(status)) => {
                coordinator.handle_status_change(status);
                sync_flash(&coordinator, &mut flash_deadline);
            }
            Ok(Event::Upcoming) => {
                coordinator.handle_upcoming();
                sync_flash(&coordinator, &mut flash_deadline);
            }
            Ok(Event::Tick) => {
                coordinator.handle_tick(schedule);
                next_tick = Instant::now() + tick_interval;
                sync_flash(&coordinator, &mut flash_deadline);
            }
            Err(RecvTimeoutError::Timeout) => {
                let now = Instant::now();
                if let Some((token, due)) = flash_deadline {
                    if due <= now {
                        flash_deadline = match coordinator.handle_flash_tick(token) {
                            Recurrence::Continue => Some((token, due + coordinator.flash_interval())),
                            Recurrence::Stop => None,
                        };
                    }
                }
                if next_tick <= now {
                    coordinator.handle_tick(schedule);
                    next_tick += tick_interval;
                    sync_flash(&coordinator, &mut flash_deadline);
                }
            }
            Err(RecvTimeoutError::Disconnected) => {
                log::debug!("event channel closed, shutting down");
                coordinator.handle_shutdown();
                return;
            }
        }
    }
}

/// Bring the armed deadline in line with the coordinator's live token:
/// arm a fresh token one interval out, keep a still-live one untouched,
/// disarm when no token is live.
fn sync_flash<S: DeviceSource>(
    coordinator: &StatusCoordinator<S>,
    deadline: &mut Option<(FlashToken, Instant)>,
) {
    match coordinator.flash_token() {
        Some(token) => {
            if deadline.map(|(armed, _)| armed) != Some(token) {
                *deadline = Some((token, Instant::now() + coordinator.flash_interval()));
            }
        }
        None => *deadline = None,
    }
}
