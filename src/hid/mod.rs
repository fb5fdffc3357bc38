//! HID interface state and event handling.
//!
//! [`HidDevice`] is the one device context of the HID layer.  It is
//! created when the interface is attached to the USB core and is passed by
//! exclusive reference into every handler:
//!
//! - control requests through [`control::ControlHandler`]
//! - interrupt endpoint events through [`endpoint::EndpointHandler`]
//! - button edges through [`HidDevice::on_button_edge`]
//! - bus events through [`HidDevice::on_bus_event`]
//!
//! Use [`shared::Shared`] when the button and USB interrupts can preempt
//! each other.

pub mod control;
pub mod endpoint;
pub mod input;
pub mod report;
pub mod request;
pub mod shared;


use crate::blink::RateControl;
use crate::error::Result;
use crate::fmt::{debug, warning};
use crate::usb::activity::{ActivityGate, BusEvent};
use crate::usb::descriptor::{self, HidEndpoints};
use crate::usb::EndpointIo;
use embedded_hal::digital::{OutputPin, PinState};
use input::InputReporter;
use report::ReportState;

/// HID layer context: report bytes, press/release bookkeeping and the two
/// output collaborators (`led` for the output report, `rate` for the
/// feature report).
pub struct HidDevice<L, R> {
    reports: ReportState,
    input: InputReporter,
    /// SET_IDLE duration, 4 ms units; 0 = report only on change.
    idle: u8,
    endpoints: HidEndpoints,
    led: L,
    rate: R,
}

impl<L: OutputPin, R: RateControl> HidDevice<L, R> {
    pub fn new(endpoints: HidEndpoints, led: L, rate: R) -> Self {
        Self {
            reports: ReportState::new(),
            input: InputReporter::new(),
            idle: 0,
            endpoints,
            led,
            rate,
        }
    }

    /// Attach to the HID interface described in `config_descriptor`.
    ///
    /// Fails with [`crate::Error::NotHidInterface`] when the configuration
    /// has no HID interface.
    pub fn attach(config_descriptor: &[u8], led: L, rate: R) -> Result<Self> {
        let (interface, endpoints) = descriptor::find_hid_interface(config_descriptor)?;
        debug!(
            "HID: attached to interface {}, IN {}, OUT {}",
            interface.number, endpoints.in_addr, endpoints.out_addr
        );
        Ok(Self::new(endpoints, led, rate))
    }

    /// Handle a falling edge of the button (hardware-edge interrupt).
    ///
    /// Returns `false` when the edge was dropped because the device is not
    /// active.
    pub fn on_button_edge<E: EndpointIo>(&mut self, gate: &ActivityGate, ep: &mut E) -> bool {
        self.input
            .on_edge(gate, &mut self.reports, ep, self.endpoints.in_addr)
    }

    /// Handle a bus event from the device core: update `gate` and, when
    /// the event discards queued transfers, restart the input side so no
    /// press survives into the next session.
    pub fn on_bus_event(&mut self, gate: &ActivityGate, event: BusEvent) {
        gate.on_event(event);
        if event.ends_session() {
            self.input.restart(&mut self.reports);
        }
    }

    pub fn reports(&self) -> ReportState {
        self.reports
    }

    /// Presses not yet followed by a release report.
    pub fn pending_presses(&self) -> u32 {
        self.input.pending()
    }

    pub fn endpoints(&self) -> HidEndpoints {
        self.endpoints
    }

    pub fn idle(&self) -> u8 {
        self.idle
    }

    pub fn led(&self) -> &L {
        &self.led
    }

    pub fn rate(&self) -> &R {
        &self.rate
    }

    /// Store an output report and drive the LED from bit 0.
    ///
    /// Shared by SET_REPORT(Output) and the interrupt OUT endpoint.
    fn apply_output(&mut self, value: u8) {
        self.reports.output = value;
        let level = PinState::from(self.reports.led_on());
        if self.led.set_state(level).is_err() {
            warning!("HID: LED write failed");
        }
    }
}
