//! Button edge → interrupt IN report.
//!
//! Every accepted press is sent as a nonzero byte and followed by exactly
//! one release byte (`0`) on the next IN completion, so the host sees a
//! clean press/release pair even though presses are edge-triggered.
//!
//! Only one IN transfer is ever queued.  An edge that arrives while a
//! transfer is still in flight does not touch the endpoint:
//!
//! - press in flight: the edge is coalesced into that press;
//! - release in flight: the press waits in a single-slot buffer and is
//!   sent on the release's completion (latest edge wins).  It is neither
//!   counted nor stored as the input report until it is sent.
//!
//! The press value is the session's press sequence number truncated to a
//! byte, skipping `0`, so the host can tell coalesced presses from gaps in
//! the sequence.

use super::report::ReportState;
use crate::fmt::debug;
use crate::usb::activity::{ActivityGate, Session};
use crate::usb::EndpointIo;

/// Release value on the wire.
pub const RELEASED: u8 = 0;

/// Press/release state of the interrupt IN endpoint.
#[derive(Debug)]
pub struct InputReporter {
    /// Presses not yet acknowledged by a release report.
    pending: u32,
    /// Wire value of the most recent press.
    last_press: u8,
    /// Value of the queued IN transfer, if any.
    in_flight: Option<u8>,
    /// Press waiting for an in-flight release to complete.
    deferred: Option<u8>,
    /// Edges folded into `deferred`.
    deferred_edges: u32,
    session: Session,
}

impl InputReporter {
    pub const fn new() -> Self {
        Self {
            pending: 0,
            last_press: 0,
            in_flight: None,
            deferred: None,
            deferred_edges: 0,
            session: Session::NONE,
        }
    }

    /// Presses not yet followed by a release report.
    pub fn pending(&self) -> u32 {
        self.pending
    }

    /// Value of the IN transfer currently queued.
    pub fn in_flight(&self) -> Option<u8> {
        self.in_flight
    }

    /// Drop all press state; the input report reads as released.
    ///
    /// Called when the bus discards queued transfers (reset, new
    /// configuration).
    pub fn restart(&mut self, reports: &mut ReportState) {
        *self = Self::new();
        reports.input = RELEASED;
    }

    /// Handle one falling edge of the button.
    ///
    /// Returns `false` when the edge was dropped because the device is not
    /// active; nothing is counted or queued in that case.
    pub fn on_edge<E: EndpointIo>(
        &mut self,
        gate: &ActivityGate,
        reports: &mut ReportState,
        ep: &mut E,
        ep_in: u8,
    ) -> bool {
        let Some(session) = gate.active_session() else {
            debug!("Button: edge dropped, device inactive");
            return false;
        };
        if session != self.session {
            // Transfers of an earlier session were discarded by the bus reset.
            self.restart(reports);
            self.session = session;
        }

        let press = next_press(self.last_press);
        self.last_press = press;

        match self.in_flight {
            Some(RELEASED) => {
                debug!("Button: press {} deferred behind release", press);
                self.deferred = Some(press);
                self.deferred_edges = self.deferred_edges.saturating_add(1);
            }
            in_flight => {
                self.pending = self.pending.saturating_add(1);
                reports.input = press;
                match in_flight {
                    None => self.send(ep, ep_in, press),
                    Some(_) => debug!("Button: press {} coalesced", press),
                }
            }
        }
        true
    }

    /// Handle completion of the queued IN transfer.
    pub fn on_in_complete<E: EndpointIo>(
        &mut self,
        reports: &mut ReportState,
        ep: &mut E,
        ep_in: u8,
    ) {
        let completed = self.in_flight.take();

        if let Some(press) = self.deferred.take() {
            self.pending = self
                .pending
                .saturating_add(core::mem::take(&mut self.deferred_edges));
            reports.input = press;
            self.send(ep, ep_in, press);
        } else if self.pending > 0 {
            reports.input = RELEASED;
            self.send(ep, ep_in, RELEASED);
            self.pending = 0;
        } else if completed.is_none() {
            debug!("HID: IN complete with nothing queued");
        }
    }

    fn send<E: EndpointIo>(&mut self, ep: &mut E, ep_in: u8, value: u8) {
        self.in_flight = Some(value);
        ep.write_ep(ep_in, &[value]);
        debug!("HID: IN report {}", value);
    }
}

impl Default for InputReporter {
    fn default() -> Self {
        Self::new()
    }
}

/// Next press value: wraps 255 → 1, never yields the release value.
fn next_press(prev: u8) -> u8 {
    match prev.wrapping_add(1) {
        RELEASED => 1,
        n => n,
    }
}
