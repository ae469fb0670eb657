//! Device communication — trait + Linux USB backend.

use std::fmt;

use serde::Serialize;

use crate::color::Color;

// ── Error type ──

/// Device communication errors.
///
/// [`DeviceError::Io`] is the transient per-transfer fault the connection
/// layer retries in place; everything else triggers handle re-acquisition.
/// String payloads follow the convention **"context: details"** where
/// *context* identifies the operation (e.g. `"USB open"`) and *details*
/// describes what went wrong.
#[derive(Debug)]
pub enum DeviceError {
    NotFound,
    OpenFailed(String),
    /// Transient USB I/O fault (stall, timeout). Retry is expected to work.
    Io(String),
    /// Any other device fault. The handle is considered poisoned.
    Fault(String),
}

impl fmt::Display for DeviceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceError::NotFound => write!(f, "BlinkStick device not found"),
            DeviceError::OpenFailed(e) => write!(f, "Failed to open device: {e}"),
            DeviceError::Io(e) => write!(f, "USB I/O error: {e}"),
            DeviceError::Fault(e) => write!(f, "Device fault: {e}"),
        }
    }
}

impl std::error::Error for DeviceError {}

pub type Result<T> = std::result::Result<T, DeviceError>;

// ── Trait ──

/// A connected indicator peripheral.
///
/// One method is all the controller needs: the whole-device "apply" loop
/// lives in [`crate::connection::DeviceConnection`], which owns fault
/// handling and recovery around these per-LED writes.
pub trait IndicatorDevice {
    /// Write one LED's color. May fault; never blocks beyond the USB timeout.
    fn set_led(&mut self, index: u8, color: Color) -> Result<()>;
}

// ── Linux implementation ──

#[cfg(target_os = "linux")]
mod linux_impl {
    use std::time::Duration;

    use nusb::transfer::{Control, ControlType, Recipient, TransferError};

    use super::*;
    use crate::protocol::{
        BLINKSTICK_PID, BLINKSTICK_VID, HID_FEATURE_REPORT, HID_SET_REPORT, LED_CHANNEL,
        REPORT_SET_INDEXED, USB_TIMEOUT_MS,
    };

    pub struct UsbStick {
        interface: nusb::Interface,
    }

    /// Sort transfer errors into the transient/poisoned split the
    /// connection layer acts on.
    fn classify(e: TransferError) -> DeviceError {
        match e {
            TransferError::Stall | TransferError::Cancelled | TransferError::Unknown => {
                DeviceError::Io(e.to_string())
            }
            TransferError::Disconnected | TransferError::Fault => {
                DeviceError::Fault(e.to_string())
            }
        }
    }

    impl UsbStick {
        /// Locate and claim the first attached BlinkStick.
        pub fn open() -> Result<Self> {
            let device_info = nusb::list_devices()
                .map_err(|e| DeviceError::OpenFailed(format!("USB enumeration: {e}")))?
                .find(|dev| {
                    dev.vendor_id() == BLINKSTICK_VID && dev.product_id() == BLINKSTICK_PID
                })
                .ok_or(DeviceError::NotFound)?;

            let usb_device = device_info
                .open()
                .map_err(|e| DeviceError::OpenFailed(format!("USB open: {e}")))?;

            // Claim interface 0 (nusb auto-detaches the kernel hid driver)
            let interface = usb_device
                .claim_interface(0)
                .map_err(|e| DeviceError::OpenFailed(format!("claim interface 0: {e}")))?;

            Ok(UsbStick { interface })
        }
    }

    impl IndicatorDevice for UsbStick {
        fn set_led(&mut self, index: u8, color: Color) -> Result<()> {
            let report = [
                REPORT_SET_INDEXED,
                LED_CHANNEL,
                index,
                color.r,
                color.g,
                color.b,
            ];
            let control = Control {
                control_type: ControlType::Class,
                recipient: Recipient::Interface,
                request: HID_SET_REPORT,
                value: HID_FEATURE_REPORT | REPORT_SET_INDEXED as u16,
                index: 0,
            };
            self.interface
                .control_out_blocking(control, &report, Duration::from_millis(USB_TIMEOUT_MS))
                .map_err(classify)?;
            Ok(())
        }
    }

    /// Best-effort reset of the USB link for the BlinkStick vendor/product
    /// identity. Absence of the link is not an error; any outcome is logged
    /// and swallowed. The next acquisition attempt retries from scratch.
    pub fn reset_usb_link() {
        let Ok(mut devices) = nusb::list_devices() else {
            return;
        };
        let Some(info) = devices
            .find(|dev| dev.vendor_id() == BLINKSTICK_VID && dev.product_id() == BLINKSTICK_PID)
        else {
            return;
        };
        match info.open() {
            Ok(dev) => match dev.reset() {
                Ok(()) => log::warn!("reset BlinkStick USB link"),
                Err(e) => log::warn!("BlinkStick USB reset failed: {e}"),
            },
            Err(e) => log::warn!("could not open BlinkStick for reset: {e}"),
        }
    }

    pub fn enumerate() -> Vec<DiscoveredStick> {
        let Ok(devices) = nusb::list_devices() else {
            return Vec::new();
        };
        devices
            .filter(|dev| {
                dev.vendor_id() == BLINKSTICK_VID && dev.product_id() == BLINKSTICK_PID
            })
            .map(|dev| DiscoveredStick {
                path: format!(
                    "usb:{:03}/{:03} [{:04x}:{:04x}]",
                    dev.bus_number(),
                    dev.device_address(),
                    dev.vendor_id(),
                    dev.product_id(),
                ),
                serial: dev.serial_number().map(|s| s.to_string()),
            })
            .collect()
    }
}

#[cfg(target_os = "linux")]
pub use linux_impl::UsbStick;

// ── Stub device for unsupported platforms ──

/// Placeholder device that always returns `NotFound`.
/// Enables compilation and `cargo test` on unsupported hosts.
#[cfg(not(target_os = "linux"))]
pub struct StubStick;

#[cfg(not(target_os = "linux"))]
impl StubStick {
    pub fn open() -> Result<Self> {
        Err(DeviceError::NotFound)
    }
}

#[cfg(not(target_os = "linux"))]
impl IndicatorDevice for StubStick {
    fn set_led(&mut self, _index: u8, _color: Color) -> Result<()> {
        unreachable!()
    }
}

/// Concrete device type for the current platform.
#[cfg(target_os = "linux")]
pub type PlatformStick = UsbStick;
#[cfg(not(target_os = "linux"))]
pub type PlatformStick = StubStick;

/// Open the platform-appropriate BlinkStick.
pub fn open_device() -> Result<PlatformStick> {
    PlatformStick::open()
}

/// Best-effort USB link reset for the BlinkStick identity.
/// No-op on platforms without a USB backend.
pub fn reset_usb_link() {
    #[cfg(target_os = "linux")]
    linux_impl::reset_usb_link();
}

// ── Device enumeration ──

/// A discovered BlinkStick interface (not yet opened).
#[derive(Debug, Clone, Serialize)]
pub struct DiscoveredStick {
    /// Bus path, e.g. `usb:001/004 [20a0:41e5]`.
    pub path: String,
    /// USB serial number, if available.
    pub serial: Option<String>,
}

/// Enumerate attached BlinkStick interfaces without opening them.
/// On unsupported platforms, always returns an empty list.
pub fn enumerate_devices() -> Vec<DiscoveredStick> {
    #[cfg(target_os = "linux")]
    {
        linux_impl::enumerate()
    }
    #[cfg(not(target_os = "linux"))]
    {
        Vec::new()
    }
}

// ── Mock device for testing ──

/// In-memory mock device for unit and integration tests.
///
/// Always compiled (zero runtime cost), hidden from public docs.
#[doc(hidden)]
pub mod mock {
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::rc::Rc;

    use super::*;
    use crate::connection::DeviceSource;

    /// Shared record of every successful LED write, as `(index, color)`.
    pub type WriteLog = Rc<RefCell<Vec<(u8, Color)>>>;

    /// In-memory indicator device. Successful writes land in a shared
    /// [`WriteLog`]; faults are injected by scripting per-call outcomes.
    pub struct MockStick {
        log: WriteLog,
        /// Outcome of the next calls, in order: `None` = success,
        /// `Some(e)` = that error. Once drained, calls succeed (or fault
        /// permanently if `wedged`).
        script: VecDeque<Option<DeviceError>>,
        wedged: bool,
    }

    impl Default for MockStick {
        fn default() -> Self {
            Self::new()
        }
    }

    impl MockStick {
        pub fn new() -> Self {
            Self::with_log(Rc::new(RefCell::new(Vec::new())))
        }

        /// Build a stick writing into an existing log — lets a test share
        /// one log across successive devices handed out by a source.
        pub fn with_log(log: WriteLog) -> Self {
            MockStick {
                log,
                script: VecDeque::new(),
                wedged: false,
            }
        }

        /// Clone a handle to the write log.
        pub fn log(&self) -> WriteLog {
            Rc::clone(&self.log)
        }

        /// Append one scripted outcome for the next unscripted call.
        pub fn script_outcome(&mut self, outcome: Option<DeviceError>) {
            self.script.push_back(outcome);
        }

        /// Append `n` scripted successes.
        pub fn script_ok(&mut self, n: usize) {
            for _ in 0..n {
                self.script.push_back(None);
            }
        }

        /// Every call after the script drains returns `Fault`.
        pub fn wedge(&mut self) {
            self.wedged = true;
        }
    }

    impl IndicatorDevice for MockStick {
        fn set_led(&mut self, index: u8, color: Color) -> Result<()> {
            match self.script.pop_front() {
                Some(Some(err)) => return Err(err),
                Some(None) => {}
                None => {
                    if self.wedged {
                        return Err(DeviceError::Fault("mock: device wedged".into()));
                    }
                }
            }
            self.log.borrow_mut().push((index, color));
            Ok(())
        }
    }

    /// Device source handing out a scripted queue of acquisition outcomes.
    /// A `None` slot models a failed attempt (device unplugged); an empty
    /// queue keeps failing.
    pub struct MockSource {
        devices: VecDeque<Option<MockStick>>,
        attempts: Rc<std::cell::Cell<u32>>,
    }

    impl Default for MockSource {
        fn default() -> Self {
            Self::new()
        }
    }

    impl MockSource {
        pub fn new() -> Self {
            MockSource {
                devices: VecDeque::new(),
                attempts: Rc::new(std::cell::Cell::new(0)),
            }
        }

        pub fn with_device(device: MockStick) -> Self {
            let mut source = Self::new();
            source.push_device(device);
            source
        }

        pub fn push_device(&mut self, device: MockStick) {
            self.devices.push_back(Some(device));
        }

        /// Queue one failed acquisition attempt.
        pub fn push_absent(&mut self) {
            self.devices.push_back(None);
        }

        /// Shared counter of acquisition attempts.
        pub fn attempt_counter(&self) -> Rc<std::cell::Cell<u32>> {
            Rc::clone(&self.attempts)
        }
    }

    impl DeviceSource for MockSource {
        type Device = MockStick;

        fn acquire(&mut self) -> Option<MockStick> {
            self.attempts.set(self.attempts.get() + 1);
            self.devices.pop_front().flatten()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mock::{MockSource, MockStick};
    use super::*;
    use crate::connection::DeviceSource;

    // ── DeviceError display ──

    #[test]
    fn display_not_found() {
        assert_eq!(
            DeviceError::NotFound.to_string(),
            "BlinkStick device not found"
        );
    }

    #[test]
    fn display_io_carries_detail() {
        let e = DeviceError::Io("endpoint stall".into());
        assert!(e.to_string().contains("endpoint stall"));
    }

    // ── DiscoveredStick ──

    #[test]
    fn discovered_stick_serializes() {
        let d = DiscoveredStick {
            path: "usb:001/004 [20a0:41e5]".into(),
            serial: Some("BS012345".into()),
        };
        let json = serde_json::to_string(&d).expect("serialize DiscoveredStick");
        assert!(json.contains("\"path\""));
        assert!(json.contains("BS012345"));
    }

    #[test]
    fn enumerate_devices_returns_vec() {
        // On test hosts with no stick attached this is just empty.
        let _devices = enumerate_devices();
    }

    // ── MockStick ──

    #[test]
    fn mock_records_writes() {
        let mut dev = MockStick::new();
        let log = dev.log();
        dev.set_led(0, Color::new(1, 2, 3)).unwrap();
        dev.set_led(7, Color::OFF).unwrap();
        assert_eq!(
            *log.borrow(),
            vec![(0, Color::new(1, 2, 3)), (7, Color::OFF)]
        );
    }

    #[test]
    fn mock_scripted_fault_then_success() {
        let mut dev = MockStick::new();
        let log = dev.log();
        dev.script_outcome(Some(DeviceError::Io("glitch".into())));
        assert!(matches!(
            dev.set_led(0, Color::OFF),
            Err(DeviceError::Io(_))
        ));
        dev.set_led(0, Color::OFF).unwrap();
        assert_eq!(log.borrow().len(), 1);
    }

    #[test]
    fn mock_wedged_faults_after_script() {
        let mut dev = MockStick::new();
        dev.script_ok(1);
        dev.wedge();
        dev.set_led(0, Color::OFF).unwrap();
        assert!(matches!(
            dev.set_led(1, Color::OFF),
            Err(DeviceError::Fault(_))
        ));
    }

    // ── MockSource ──

    #[test]
    fn mock_source_hands_out_queue_then_none() {
        let mut source = MockSource::with_device(MockStick::new());
        let attempts = source.attempt_counter();
        assert!(source.acquire().is_some());
        assert!(source.acquire().is_none());
        assert_eq!(attempts.get(), 2);
    }
}
