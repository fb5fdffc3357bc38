//! GET_REPORT / SET_REPORT / GET_IDLE / SET_IDLE handling.
//!
//! | request        | Input        | Output            | Feature             |
//! |----------------|--------------|-------------------|---------------------|
//! | GET_REPORT     | input byte   | STALL             | STALL               |
//! | SET_REPORT     | STALL        | LED from bit 0    | blink rate, clamped |
//!
//! A zero-length SET_REPORT(Output/Feature) is accepted and changes
//! nothing.  Report IDs other than [`REPORT_ID`] stall.

use super::report::{ReportId, ReportKind, REPORT_ID};
use super::HidDevice;
use crate::blink::{clamp_rate, RateControl};
use crate::error::{Error, Result};
use crate::fmt::{debug, warning};
use embedded_hal::digital::OutputPin;

/// Class-request side of a HID interface, called from the EP0 stage
/// handler after the setup packet is decoded.
pub trait ControlHandler {
    /// Fill `buf` with the requested report and return its length.
    fn get_report(&mut self, report: ReportId, buf: &mut [u8]) -> Result<usize>;

    /// Accept a report sent by the host.
    fn set_report(&mut self, report: ReportId, data: &[u8]) -> Result<()>;

    /// Idle duration in 4 ms units.
    fn get_idle(&mut self, report_id: u8) -> Result<u8>;

    fn set_idle(&mut self, report_id: u8, duration: u8) -> Result<()>;
}

impl<L: OutputPin, R: RateControl> ControlHandler for HidDevice<L, R> {
    fn get_report(&mut self, report: ReportId, buf: &mut [u8]) -> Result<usize> {
        check_report_id(report.id)?;

        match report.kind {
            ReportKind::Input => {
                let first = buf.first_mut().ok_or(Error::BufferOverflow)?;
                *first = self.reports.input;
                Ok(1)
            }
            ReportKind::Output | ReportKind::Feature => {
                warning!("HID: GET_REPORT {:?} not supported", report.kind);
                Err(Error::Stall)
            }
        }
    }

    fn set_report(&mut self, report: ReportId, data: &[u8]) -> Result<()> {
        check_report_id(report.id)?;

        match (report.kind, data.first()) {
            (ReportKind::Input, _) => {
                warning!("HID: SET_REPORT Input not supported");
                Err(Error::Stall)
            }
            // Zero-length SET_REPORT is valid and carries nothing to apply.
            (_, None) => Ok(()),
            (ReportKind::Output, Some(&value)) => {
                debug!("HID: output report {}", value);
                self.apply_output(value);
                Ok(())
            }
            (ReportKind::Feature, Some(&requested)) => {
                let rate = clamp_rate(requested);
                debug!("HID: blink rate {} (requested {})", rate, requested);
                self.rate.set_rate(rate);
                Ok(())
            }
        }
    }

    fn get_idle(&mut self, report_id: u8) -> Result<u8> {
        check_report_id(report_id)?;
        Ok(self.idle)
    }

    fn set_idle(&mut self, report_id: u8, duration: u8) -> Result<()> {
        check_report_id(report_id)?;
        debug!("HID: idle {} x 4 ms", duration);
        self.idle = duration;
        Ok(())
    }
}

fn check_report_id(id: u8) -> Result<()> {
    if id == REPORT_ID {
        Ok(())
    } else {
        warning!("HID: unknown report ID {}", id);
        Err(Error::Stall)
    }
}
