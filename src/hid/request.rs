//! Setup packet decoding.
//!
//! The 8-byte setup header is decoded once, at the EP0 boundary, into a
//! [`HidRequest`].  Nothing past this module looks at `bmRequestType` bits.
//!
//! ```text
//! Byte 0:   bmRequestType  (bit 7 direction, bits 6..5 type, bits 4..0 recipient)
//! Byte 1:   bRequest
//! Byte 2-3: wValue         (GET/SET_REPORT: high = report kind, low = report ID)
//! Byte 4-5: wIndex         (interface number)
//! Byte 6-7: wLength
//! ```

use super::report::{ReportId, ReportKind};
use crate::error::{Error, Result};

/// Setup packet size in bytes.
pub const SETUP_PACKET_SIZE: usize = 8;

// HID class request codes
const GET_REPORT: u8 = 0x01;
const GET_IDLE: u8 = 0x02;
const GET_PROTOCOL: u8 = 0x03;
const SET_REPORT: u8 = 0x09;
const SET_IDLE: u8 = 0x0A;
const SET_PROTOCOL: u8 = 0x0B;

// bmRequestType fields
const DIR_DEVICE_TO_HOST: u8 = 0x80;
const TYPE_MASK: u8 = 0x60;
const TYPE_CLASS: u8 = 0x20;
const RECIPIENT_MASK: u8 = 0x1F;
const RECIPIENT_INTERFACE: u8 = 0x01;

/// Data-stage direction of a control transfer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    HostToDevice,
    DeviceToHost,
}

/// Raw setup packet, fields in host byte order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SetupPacket {
    pub request_type: u8,
    pub request: u8,
    pub value: u16,
    pub index: u16,
    pub length: u16,
}

impl SetupPacket {
    pub fn parse(raw: &[u8; SETUP_PACKET_SIZE]) -> Self {
        Self {
            request_type: raw[0],
            request: raw[1],
            value: u16::from_le_bytes([raw[2], raw[3]]),
            index: u16::from_le_bytes([raw[4], raw[5]]),
            length: u16::from_le_bytes([raw[6], raw[7]]),
        }
    }

    pub fn direction(&self) -> Direction {
        if self.request_type & DIR_DEVICE_TO_HOST != 0 {
            Direction::DeviceToHost
        } else {
            Direction::HostToDevice
        }
    }

    fn is_class_interface(&self) -> bool {
        self.request_type & TYPE_MASK == TYPE_CLASS
            && self.request_type & RECIPIENT_MASK == RECIPIENT_INTERFACE
    }

    fn value_high(&self) -> u8 {
        (self.value >> 8) as u8
    }

    fn value_low(&self) -> u8 {
        self.value as u8
    }
}

/// Decoded HID class request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HidRequest {
    /// GET_REPORT: answer with at most `length` bytes.
    GetReport { report: ReportId, length: u16 },
    /// SET_REPORT: `length` bytes follow in the data stage.
    SetReport { report: ReportId, length: u16 },
    /// GET_IDLE: one byte, idle duration in 4 ms units.
    GetIdle { report_id: u8 },
    /// SET_IDLE: duration in 4 ms units, no data stage.
    SetIdle { report_id: u8, duration: u8 },
}

impl HidRequest {
    /// Decode a setup packet.
    ///
    /// Requests that are not class/interface requests are returned as
    /// [`Error::NotClassRequest`]; class requests we do not implement
    /// (protocol requests, unknown codes, unknown report kinds, wrong
    /// direction) are [`Error::Stall`].
    pub fn decode(setup: &SetupPacket) -> Result<Self> {
        if !setup.is_class_interface() {
            return Err(Error::NotClassRequest);
        }

        let dir = setup.direction();
        match (setup.request, dir) {
            (GET_REPORT, Direction::DeviceToHost) => Ok(HidRequest::GetReport {
                report: report_id_of(setup)?,
                length: setup.length,
            }),
            (SET_REPORT, Direction::HostToDevice) => Ok(HidRequest::SetReport {
                report: report_id_of(setup)?,
                length: setup.length,
            }),
            (GET_IDLE, Direction::DeviceToHost) => Ok(HidRequest::GetIdle {
                report_id: setup.value_low(),
            }),
            (SET_IDLE, Direction::HostToDevice) => Ok(HidRequest::SetIdle {
                report_id: setup.value_low(),
                duration: setup.value_high(),
            }),
            // Not a boot device: protocol switching is unsupported.
            (GET_PROTOCOL, _) | (SET_PROTOCOL, _) => Err(Error::Stall),
            _ => Err(Error::Stall),
        }
    }

    /// Length of the host-to-device data stage, 0 when there is none.
    pub fn out_data_len(&self) -> u16 {
        match self {
            HidRequest::SetReport { length, .. } => *length,
            _ => 0,
        }
    }
}

fn report_id_of(setup: &SetupPacket) -> Result<ReportId> {
    let kind = ReportKind::from_wire(setup.value_high()).ok_or(Error::Stall)?;
    Ok(ReportId::new(kind, setup.value_low()))
}
