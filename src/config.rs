//! Application-wide constants and compile-time configuration.
//!
//! USB identity, endpoint layout, report sizes and blink-rate limits live
//! here so they can be tuned in one place.

// USB

/// USB VID/PID - use the "pid.codes" open-source test VID.
/// Replace with your own allocated VID/PID for production.
pub const USB_VID: u16 = 0x1209;
pub const USB_PID: u16 = 0x0001;

/// USB device strings.
pub const USB_MANUFACTURER: &str = "custom-hid";
pub const USB_PRODUCT: &str = "Custom HID Button/LED";
pub const USB_SERIAL_NUMBER: &str = "000001";

/// EP0 maximum packet size.
pub const EP0_MAX_PACKET: usize = 64;

/// Interrupt IN endpoint (device → host button reports).
pub const HID_EP_IN: u8 = 0x81;

/// Interrupt OUT endpoint (host → device LED reports).
pub const HID_EP_OUT: u8 = 0x01;

/// Interrupt endpoint polling interval (ms).
pub const USB_HID_POLL_MS: u8 = 10;

/// Every report (input, output, feature) is a single byte.
pub const HID_REPORT_SIZE: usize = 1;

// Blink rate (feature report)

/// Slowest accepted blink rate (blinks per second).
pub const BLINK_RATE_MIN: u8 = 1;

/// Fastest accepted blink rate (blinks per second).
pub const BLINK_RATE_MAX: u8 = 20;

/// Blink rate used until the host sends a feature report.
pub const DEFAULT_BLINK_RATE: u8 = 10;

// GPIO pin assignments (nRF52840-DK defaults)
//
//   Button (SW2 role)     → P0.11, active-low, falling edge = press
//   LED (output report)   → P0.13, active-low
//   LED (blink rate)      → P0.14, active-low

/// Button debounce time (ms).
pub const BUTTON_DEBOUNCE_MS: u64 = 20;
