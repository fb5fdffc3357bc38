//! Interrupt endpoint events.
//!
//! - `InComplete`: the queued IN report was taken by the host; send the
//!   release (or a deferred press) if one is due.
//! - `OutNak`: the host polled OUT before a buffer was queued; queue one.
//! - `OutComplete`: an output report arrived; apply it exactly like
//!   SET_REPORT(Output).

use super::HidDevice;
use crate::blink::RateControl;
use crate::config::HID_REPORT_SIZE;
use crate::fmt::debug;
use crate::usb::EndpointIo;
use embedded_hal::digital::OutputPin;

/// Event on the interrupt IN / OUT endpoints of the HID interface.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EndpointEvent {
    InComplete,
    OutNak,
    OutComplete,
}

/// Data-endpoint side of a HID interface.
pub trait EndpointHandler {
    fn endpoint_event<E: EndpointIo>(&mut self, event: EndpointEvent, ep: &mut E);
}

impl<L: OutputPin, R: RateControl> EndpointHandler for HidDevice<L, R> {
    fn endpoint_event<E: EndpointIo>(&mut self, event: EndpointEvent, ep: &mut E) {
        match event {
            EndpointEvent::InComplete => {
                self.input
                    .on_in_complete(&mut self.reports, ep, self.endpoints.in_addr);
            }
            EndpointEvent::OutNak => {
                ep.read_req_ep(self.endpoints.out_addr, HID_REPORT_SIZE);
            }
            EndpointEvent::OutComplete => {
                let mut buf = [0u8; HID_REPORT_SIZE];
                match ep.read_ep(self.endpoints.out_addr, &mut buf) {
                    0 => debug!("HID: empty OUT packet"),
                    _ => self.apply_output(buf[0]),
                }
            }
        }
    }
}
