//! nRF52840 firmware glue (feature `embedded`).
//!
//! Embassy owns the USB peripheral and EP0 sequencing.  This module maps
//! its callbacks and endpoint futures onto the HID layer:
//!
//! - bus events → [`crate::hid::HidDevice::on_bus_event`] and [`GATE`]
//! - class requests → [`crate::hid::control::ControlHandler`]
//! - interrupt IN / OUT → [`crate::hid::endpoint::EndpointHandler`]
//! - button edges → [`crate::hid::HidDevice::on_button_edge`]
//!
//! All HID state lives in one [`Shared`] device, locked per event.
//!
//! EP0 never passes through [`crate::usb::ep0_guard::Ep0Guard`] or
//! [`crate::usb::control_pipe::ClassPipe`] here: embassy-nrf arms EP0
//! itself and hands class requests over already decoded.

pub mod blink;
pub mod button;
pub mod usb;

use crate::blink::RateControl;
use crate::hid::shared::Shared;
use crate::hid::HidDevice;
use crate::led::ActiveLow;
use crate::usb::activity::ActivityGate;
use crate::usb::EndpointIo;
use embassy_nrf::gpio::Output;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;

/// Device activity, written by the USB bus handler.
pub static GATE: ActivityGate = ActivityGate::new();

/// Value of the next interrupt IN report, consumed by the IN writer task.
static IN_REPORT: Signal<CriticalSectionRawMutex, u8> = Signal::new();

/// Blink rate from the feature report, consumed by the blink task.
static BLINK_RATE: Signal<CriticalSectionRawMutex, u8> = Signal::new();

pub type Device = HidDevice<ActiveLow<Output<'static>>, RateSignal>;
pub type SharedDevice = Shared<Device>;

/// [`RateControl`] that hands the rate to the blink task.
pub struct RateSignal;

impl RateControl for RateSignal {
    fn set_rate(&mut self, rate: u8) {
        BLINK_RATE.signal(rate);
    }
}

/// Endpoint primitives on top of Embassy's endpoint futures.
///
/// `write_ep` queues the IN report for the writer task.  OUT buffers are
/// armed by the reader itself, so `read_req_ep` has nothing to do and
/// `read_ep` copies out the packet the reader already received.
pub(crate) struct Endpoints<'a> {
    rx: &'a [u8],
}

impl<'a> Endpoints<'a> {
    pub(crate) fn new(rx: &'a [u8]) -> Self {
        Self { rx }
    }
}

impl EndpointIo for Endpoints<'_> {
    fn write_ep(&mut self, _addr: u8, data: &[u8]) -> usize {
        match data.first() {
            Some(&value) => {
                IN_REPORT.signal(value);
                1
            }
            None => 0,
        }
    }

    fn read_ep(&mut self, _addr: u8, buf: &mut [u8]) -> usize {
        let n = self.rx.len().min(buf.len());
        buf[..n].copy_from_slice(&self.rx[..n]);
        n
    }

    fn read_req_ep(&mut self, _addr: u8, _len: usize) {}
}
