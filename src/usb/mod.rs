//! USB device-core boundary.
//!
//! The device core (enumeration, descriptors, endpoint DMA) is not part of
//! this crate.  It is reached through [`EndpointIo`], and it delivers
//! events that end up in:
//!
//! - [`ep0_guard::Ep0Guard`] - every EP0 OUT-side event, first
//! - [`control_pipe::ClassPipe`] - HID class requests on EP0
//! - [`activity::ActivityGate`] - configured / suspended / reset
//!
//! [`descriptor`] locates the HID interface at attach time.

pub mod activity;
pub mod control_pipe;
pub mod descriptor;
pub mod ep0_guard;

/// EP0 OUT address.
pub const EP0_OUT: u8 = 0x00;

/// EP0 IN address.
pub const EP0_IN: u8 = 0x80;

/// Endpoint transfer primitives exposed by the device core.
///
/// None of them block: `write_ep` and `read_req_ep` only queue a buffer,
/// completion is reported later as an endpoint event.
pub trait EndpointIo {
    /// Queue `data` for transmission on IN endpoint `addr`.  Returns the
    /// number of bytes queued.
    fn write_ep(&mut self, addr: u8, data: &[u8]) -> usize;

    /// Copy the packet received on OUT endpoint `addr` into `buf`.
    /// Returns its length.
    fn read_ep(&mut self, addr: u8, buf: &mut [u8]) -> usize;

    /// Queue a receive buffer of `len` bytes on OUT endpoint `addr`.
    fn read_req_ep(&mut self, addr: u8, len: usize);
}

impl<T: EndpointIo + ?Sized> EndpointIo for &mut T {
    fn write_ep(&mut self, addr: u8, data: &[u8]) -> usize {
        (**self).write_ep(addr, data)
    }

    fn read_ep(&mut self, addr: u8, buf: &mut [u8]) -> usize {
        (**self).read_ep(addr, buf)
    }

    fn read_req_ep(&mut self, addr: u8, len: usize) {
        (**self).read_req_ep(addr, len)
    }
}
