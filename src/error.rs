//! Unified error type for custom-hid.
//!
//! We avoid `alloc` - all error variants carry only fixed-size data.
//! Implements `defmt::Format` (with the `defmt` feature) for efficient
//! on-target logging.

/// Top-level error type used across the HID layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    // Control pipe
    /// The request is addressed to us but not supported.  The device core
    /// answers it with a STALL handshake; no state was changed.
    Stall,

    /// The setup packet is not a HID class request to an interface.  It
    /// belongs to the device core (chapter-9 standard requests etc.).
    NotClassRequest,

    // Attach
    /// The configuration descriptor has no HID-class interface.
    NotHidInterface,

    // Generic
    /// Buffer too small for the requested operation.
    BufferOverflow,
}

impl Error {
    /// Whether the device core should answer the transfer with STALL.
    pub fn is_stall(&self) -> bool {
        !matches!(self, Error::NotClassRequest)
    }
}

/// Crate-wide result alias.
pub type Result<T> = core::result::Result<T, Error>;
