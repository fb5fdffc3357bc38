//! Functional layer of a vendor-defined USB HID device.
//!
//! One button, two LEDs and a single one-byte report of each kind:
//!
//! - Input: button presses, each followed by a release report
//! - Output: LED on/off from bit 0
//! - Feature: blink rate of the second LED
//!
//! The protocol logic is `no_std` and hardware-independent, so it builds
//! and tests on the host (`cargo test`).  The nRF52840 firmware glue in
//! [`firmware`] and the binary in `main.rs` need the `embedded` feature.

#![cfg_attr(not(test), no_std)]

// Logging macros: `debug!`, `info!`, `warning!`.
mod fmt;

pub mod blink;
pub mod config;
pub mod error;
pub mod hid;
pub mod led;
pub mod usb;

#[cfg(feature = "embedded")]
pub mod firmware;

pub use error::{Error, Result};

// Host tests use the `std` critical-section implementation.
#[cfg(test)]
use critical_section as _;
