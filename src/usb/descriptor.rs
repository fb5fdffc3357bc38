//! Configuration descriptor walk.
//!
//! Finds the HID interface and its interrupt endpoints.  Descriptors are
//! chained by `bLength`; the walk stops at a zero length or at a
//! descriptor that runs past the end of the buffer.
//!
//! ```text
//! Interface descriptor (9 bytes)
//!   [0] bLength  [1] bDescriptorType = 0x04  [2] bInterfaceNumber
//!   [3] bAlternateSetting  [4] bNumEndpoints  [5] bInterfaceClass
//!   [6] bInterfaceSubClass [7] bInterfaceProtocol [8] iInterface
//! Endpoint descriptor (7 bytes)
//!   [0] bLength  [1] bDescriptorType = 0x05  [2] bEndpointAddress
//!   [3] bmAttributes  [4-5] wMaxPacketSize  [6] bInterval
//! ```

use crate::config::{HID_EP_IN, HID_EP_OUT};
use crate::error::{Error, Result};

const DESC_INTERFACE: u8 = 0x04;
const DESC_ENDPOINT: u8 = 0x05;

/// `bInterfaceClass` of a HID interface.
pub const CLASS_HID: u8 = 0x03;

const EP_DIR_IN: u8 = 0x80;
const EP_TYPE_MASK: u8 = 0x03;
const EP_TYPE_INTERRUPT: u8 = 0x03;

/// Interface descriptor fields the HID layer cares about.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InterfaceInfo {
    pub number: u8,
    pub alternate: u8,
    pub num_endpoints: u8,
    pub class: u8,
    pub subclass: u8,
    pub protocol: u8,
}

/// Interrupt endpoint addresses of the HID interface.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct HidEndpoints {
    pub in_addr: u8,
    pub out_addr: u8,
}

impl Default for HidEndpoints {
    fn default() -> Self {
        Self {
            in_addr: HID_EP_IN,
            out_addr: HID_EP_OUT,
        }
    }
}

/// Iterator over the descriptors of a configuration, one slice each.
struct Descriptors<'a> {
    rest: &'a [u8],
}

impl<'a> Iterator for Descriptors<'a> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<Self::Item> {
        let len = usize::from(*self.rest.first()?);
        if len < 2 || len > self.rest.len() {
            return None;
        }
        let (desc, rest) = self.rest.split_at(len);
        self.rest = rest;
        Some(desc)
    }
}

/// Locate the first HID interface and the interrupt endpoints that follow
/// it.  An endpoint direction the interface does not declare keeps its
/// default address from [`HidEndpoints::default`].
pub fn find_hid_interface(config: &[u8]) -> Result<(InterfaceInfo, HidEndpoints)> {
    let mut found: Option<InterfaceInfo> = None;
    let mut endpoints = HidEndpoints::default();

    for desc in (Descriptors { rest: config }) {
        match desc[1] {
            DESC_INTERFACE if desc.len() >= 9 => {
                if found.is_some() {
                    // Next interface: our endpoint list is complete.
                    break;
                }
                if desc[5] == CLASS_HID {
                    found = Some(InterfaceInfo {
                        number: desc[2],
                        alternate: desc[3],
                        num_endpoints: desc[4],
                        class: desc[5],
                        subclass: desc[6],
                        protocol: desc[7],
                    });
                }
            }
            DESC_ENDPOINT if found.is_some() && desc.len() >= 7 => {
                let addr = desc[2];
                if desc[3] & EP_TYPE_MASK != EP_TYPE_INTERRUPT {
                    continue;
                }
                if addr & EP_DIR_IN != 0 {
                    endpoints.in_addr = addr;
                } else {
                    endpoints.out_addr = addr;
                }
            }
            _ => {}
        }
    }

    found
        .map(|interface| (interface, endpoints))
        .ok_or(Error::NotHidInterface)
}
