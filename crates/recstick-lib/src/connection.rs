//! Device connection — lazy acquisition, per-LED fault recovery.
//!
//! [`DeviceConnection`] owns the optional device handle and the whole-device
//! apply loop. All faults are absorbed here: an unplugged stick is an
//! expected state, transient USB I/O errors are retried in place, and
//! anything else poisons the handle and triggers re-acquisition. Nothing
//! propagates to the event-loop caller.
//!
//! Color state is tracked purely in memory (`last_applied`); it is never
//! read back from the hardware. Reading it back proved less stable than the
//! device itself, so the in-memory cache is the single source of truth and
//! is only used to pick the next flash toggle value.

use crate::color::Color;
use crate::device::{DeviceError, IndicatorDevice};
use crate::protocol::LED_COUNT;

/// Hands out device handles. Acquisition failure is not an error; it means
/// the peripheral is currently unusable and the next apply cycle retries.
pub trait DeviceSource {
    type Device: IndicatorDevice;

    fn acquire(&mut self) -> Option<Self::Device>;
}

/// Production source: locate the BlinkStick by vendor/product identity;
/// on failure, issue a best-effort USB link reset and report absence.
pub struct UsbSource;

impl DeviceSource for UsbSource {
    type Device = crate::device::PlatformStick;

    fn acquire(&mut self) -> Option<Self::Device> {
        match crate::device::open_device() {
            Ok(dev) => {
                log::debug!("acquired BlinkStick handle");
                Some(dev)
            }
            Err(DeviceError::NotFound) => {
                // Unplugged is routine; keep it out of the warn log.
                log::debug!("no BlinkStick attached");
                crate::device::reset_usb_link();
                None
            }
            Err(e) => {
                log::warn!("could not acquire BlinkStick ({e}), trying USB link reset");
                crate::device::reset_usb_link();
                None
            }
        }
    }
}

/// Owns the (possibly absent) device handle and pushes colors to all LEDs.
pub struct DeviceConnection<S: DeviceSource> {
    source: S,
    handle: Option<S::Device>,
    last_applied: Option<Color>,
    /// Alternate color substituted during flash toggling (the preview color).
    alt_color: Color,
    /// True while inside a fault streak; suppresses repeated error logs.
    fault_streak: bool,
}

impl<S: DeviceSource> DeviceConnection<S> {
    pub fn new(source: S, alt_color: Color) -> Self {
        DeviceConnection {
            source,
            handle: None,
            last_applied: None,
            alt_color,
            fault_streak: false,
        }
    }

    /// Push `color` to every LED, absorbing all faults.
    ///
    /// With `flashing` set, a request equal to the last applied color is
    /// swapped for the alternate color — that substitution is what produces
    /// the visible blink instead of a static re-send.
    ///
    /// If no device can be acquired the apply is silently aborted and
    /// `last_applied` stays untouched.
    pub fn apply(&mut self, color: Color, flashing: bool) {
        if self.handle.is_none() {
            self.handle = self.source.acquire();
        }
        if self.handle.is_none() {
            return;
        }

        let mut color = color;
        if flashing && self.last_applied == Some(color) {
            color = self.alt_color;
        }

        let mut index: u8 = 0;
        while index < LED_COUNT {
            let Some(dev) = self.handle.as_mut() else {
                // Lost the handle mid-apply and re-acquisition failed;
                // absent until the next apply cycle.
                break;
            };
            match dev.set_led(index, color) {
                Ok(()) => {
                    self.fault_streak = false;
                    index += 1;
                }
                Err(DeviceError::Io(e)) => {
                    // Occasional USB I/O hiccups are expected on flaky
                    // links; retry the same index, no cap.
                    log::warn!("USB I/O error on LED {index} ({e}), retrying");
                }
                Err(e) => {
                    if !self.fault_streak {
                        log::error!("BlinkStick fault on LED {index}: {e}");
                        self.fault_streak = true;
                        self.handle = self.source.acquire();
                    }
                    index += 1;
                }
            }
        }

        self.last_applied = Some(color);
    }

    /// The color most recently sent (best-effort cache; the device does not
    /// confirm state).
    pub fn last_applied(&self) -> Option<Color> {
        self.last_applied
    }

    /// Whether a device handle is currently held.
    pub fn is_connected(&self) -> bool {
        self.handle.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::mock::{MockSource, MockStick};

    const RED: Color = Color::new(0xff, 0, 0);
    const DARK: Color = Color::OFF;

    fn connection_with(device: MockStick) -> DeviceConnection<MockSource> {
        DeviceConnection::new(MockSource::with_device(device), DARK)
    }

    // ── plain apply ──

    #[test]
    fn apply_writes_every_led_once() {
        let dev = MockStick::new();
        let log = dev.log();
        let mut conn = connection_with(dev);

        conn.apply(RED, false);

        let writes = log.borrow();
        assert_eq!(writes.len(), 8);
        for (i, &(index, color)) in writes.iter().enumerate() {
            assert_eq!(index, i as u8);
            assert_eq!(color, RED);
        }
        drop(writes);
        assert_eq!(conn.last_applied(), Some(RED));
    }

    #[test]
    fn apply_acquires_lazily_once() {
        let mut source = MockSource::with_device(MockStick::new());
        let attempts = source.attempt_counter();
        let mut conn = DeviceConnection::new(source, DARK);

        assert_eq!(attempts.get(), 0, "construction must not touch the device");
        conn.apply(RED, false);
        conn.apply(DARK, false);
        assert_eq!(attempts.get(), 1, "handle should be reused across applies");
    }

    // ── device absent ──

    #[test]
    fn apply_with_no_device_is_silent_and_keeps_last() {
        let mut conn = DeviceConnection::new(MockSource::new(), DARK);
        conn.apply(RED, false);
        assert_eq!(conn.last_applied(), None);
        assert!(!conn.is_connected());
    }

    #[test]
    fn device_plugged_in_later_is_picked_up() {
        let dev = MockStick::new();
        let log = dev.log();
        let mut source = MockSource::new();
        source.push_absent();
        source.push_device(dev);
        let mut conn = DeviceConnection::new(source, DARK);

        conn.apply(RED, false); // absent
        assert_eq!(log.borrow().len(), 0);
        assert_eq!(conn.last_applied(), None);

        conn.apply(RED, false); // now present
        assert_eq!(log.borrow().len(), 8);
        assert_eq!(conn.last_applied(), Some(RED));
    }

    // ── flash toggle substitution ──

    #[test]
    fn flashing_resend_substitutes_alternate() {
        let dev = MockStick::new();
        let log = dev.log();
        let mut conn = connection_with(dev);

        conn.apply(RED, false);
        assert_eq!(conn.last_applied(), Some(RED));

        // Same color while flashing: alternate (preview) goes out instead.
        conn.apply(RED, true);
        assert_eq!(conn.last_applied(), Some(DARK));

        // And back again.
        conn.apply(RED, true);
        assert_eq!(conn.last_applied(), Some(RED));

        let writes = log.borrow();
        assert_eq!(writes.len(), 24);
        assert_eq!(writes[0].1, RED);
        assert_eq!(writes[8].1, DARK);
        assert_eq!(writes[16].1, RED);
    }

    #[test]
    fn flashing_different_color_goes_out_unchanged() {
        let dev = MockStick::new();
        let log = dev.log();
        let mut conn = connection_with(dev);

        conn.apply(RED, false);
        conn.apply(Color::new(0, 0xff, 0), true);
        assert_eq!(log.borrow()[8].1, Color::new(0, 0xff, 0));
    }

    // ── transient I/O retry ──

    #[test]
    fn io_fault_retries_same_index_then_resumes() {
        let mut dev = MockStick::new();
        let log = dev.log();
        // Indices 0,1 ok; index 2 glitches twice; rest ok.
        dev.script_ok(2);
        dev.script_outcome(Some(DeviceError::Io("pipe".into())));
        dev.script_outcome(Some(DeviceError::Io("pipe".into())));
        let mut conn = connection_with(dev);

        conn.apply(RED, false);

        let writes = log.borrow();
        let indices: Vec<u8> = writes.iter().map(|&(i, _)| i).collect();
        assert_eq!(
            indices,
            vec![0, 1, 2, 3, 4, 5, 6, 7],
            "index 2 retried in place, normal indexing resumed"
        );
        drop(writes);
        assert_eq!(conn.last_applied(), Some(RED));
    }

    // ── unexpected faults ──

    #[test]
    fn fault_reacquires_and_continues_on_next_index() {
        let mut bad = MockStick::new();
        let log = bad.log();
        bad.script_ok(3);
        bad.script_outcome(Some(DeviceError::Fault("babble".into())));

        // Replacement device shares the write log.
        let good = MockStick::with_log(bad.log());
        let mut source = MockSource::with_device(bad);
        source.push_device(good);
        let mut conn = DeviceConnection::new(source, DARK);

        conn.apply(RED, false);

        let writes = log.borrow();
        let indices: Vec<u8> = writes.iter().map(|&(i, _)| i).collect();
        // Index 3 faulted and is skipped; the fresh handle finishes 4..8.
        assert_eq!(indices, vec![0, 1, 2, 4, 5, 6, 7]);
        drop(writes);
        assert_eq!(conn.last_applied(), Some(RED));
    }

    #[test]
    fn fault_with_failed_reacquire_aborts_remaining_writes() {
        let mut dev = MockStick::new();
        let log = dev.log();
        dev.script_ok(2);
        dev.wedge();
        let mut conn = connection_with(dev); // no replacement queued

        conn.apply(RED, false);

        // Two successes, then the wedge: one re-acquire attempt fails and
        // the rest of the apply is abandoned.
        assert_eq!(log.borrow().len(), 2);
        assert!(!conn.is_connected());
        // A partially failed apply still records the attempt.
        assert_eq!(conn.last_applied(), Some(RED));
    }

    #[test]
    fn fault_streak_clears_on_success() {
        let mut bad = MockStick::new();
        bad.wedge();
        let good = MockStick::with_log(bad.log());
        let mut source = MockSource::with_device(bad);
        source.push_device(good);
        let mut conn = DeviceConnection::new(source, DARK);

        conn.apply(RED, false);
        assert!(!conn.fault_streak, "first success should end the streak");
    }
}
