//! Report kinds, report IDs and the report state store.
//!
//! The interface declares a single vendor-defined report (ID 0) made of
//! three one-byte fields:
//! ```text
//! Input   (device → host): press value, nonzero = pressed, 0 = released
//! Output  (host → device): LED bitmask, bit 0 drives the LED
//! Feature (host → device): blink rate in blinks per second (1..=20)
//! ```

/// HID report kind, the high byte of `wValue` in GET/SET_REPORT.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReportKind {
    Input,
    Output,
    Feature,
}

impl ReportKind {
    /// Decode the wire value (`Input = 1`, `Output = 2`, `Feature = 3`).
    pub fn from_wire(value: u8) -> Option<Self> {
        match value {
            0x01 => Some(ReportKind::Input),
            0x02 => Some(ReportKind::Output),
            0x03 => Some(ReportKind::Feature),
            _ => None,
        }
    }
}

/// A report selector: kind plus report ID.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ReportId {
    pub kind: ReportKind,
    pub id: u8,
}

impl ReportId {
    pub const fn new(kind: ReportKind, id: u8) -> Self {
        Self { kind, id }
    }
}

/// The only report ID this interface declares.
pub const REPORT_ID: u8 = 0;

/// Current report bytes.
///
/// `output` is written by SET_REPORT(Output) and by the interrupt OUT
/// endpoint; `input` is written by the edge reporter and the IN completion
/// handler.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ReportState {
    pub output: u8,
    pub input: u8,
}

impl ReportState {
    pub const fn new() -> Self {
        Self {
            output: 0,
            input: 0,
        }
    }

    /// Level of the LED selected by the output report.
    pub fn led_on(&self) -> bool {
        self.output & 0x01 != 0
    }
}

// USB HID report descriptor

/// Vendor-defined report descriptor: one input, one output and one feature
/// byte, no report IDs.
pub const REPORT_DESCRIPTOR: &[u8] = &[
    0x06, 0x00, 0xFF, // Usage Page (Vendor Defined 0xFF00)
    0x09, 0x01, // Usage (Vendor Usage 1)
    0xA1, 0x01, // Collection (Application)
    0x15, 0x00, //   Logical Minimum (0)
    0x26, 0xFF, 0x00, // Logical Maximum (255)
    0x75, 0x08, //   Report Size (8)
    0x95, 0x01, //   Report Count (1)
    //
    //   - Button press value -
    0x09, 0x01, //   Usage (Vendor Usage 1)
    0x81, 0x02, //   Input (Data, Variable, Absolute)
    //
    //   - LED bitmask -
    0x09, 0x02, //   Usage (Vendor Usage 2)
    0x91, 0x02, //   Output (Data, Variable, Absolute)
    //
    //   - Blink rate -
    0x09, 0x03, //   Usage (Vendor Usage 3)
    0xB1, 0x02, //   Feature (Data, Variable, Absolute)
    //
    0xC0, // End Collection
];
