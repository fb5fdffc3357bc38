//! EP0 OUT NAK guard.
//!
//! Some USB engines report a second OUT NAK on EP0 before the stage-0
//! handler has finished queueing the receive buffer for the first one.
//! Queueing the buffer twice leaves the DMA descriptor half-written and
//! the controller hangs.  The guard sits in front of the stage-0 handler
//! and lets only the first NAK of a transfer through:
//!
//! ```text
//! Idle --OUT_NAK--------> Busy   forwarded
//! Busy --OUT_NAK--------> Busy   absorbed
//! any  --SETUP----------> Idle   forwarded
//! any  --OUT_COMPLETE---> Idle   forwarded
//! ```

use crate::error::Result;
use crate::fmt::debug;
use crate::hid::request::SetupPacket;

/// Event delivered by the device core for the EP0 OUT direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Ep0Event {
    /// A setup packet arrived; a new control transfer starts.
    Setup(SetupPacket),
    /// The host sent an OUT token and was NAKed: no buffer is queued.
    OutNak,
    /// An OUT packet (data or status stage) was received.
    OutComplete,
}

/// The stage-0 handler behind the guard.
pub trait Ep0Handler {
    fn handle_ep0(&mut self, event: Ep0Event) -> Result<()>;
}

/// Guard state, OUT direction only.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GuardState {
    /// No receive buffer queued by us.
    #[default]
    Idle,
    /// A NAK was forwarded; the buffer is (being) queued.
    Busy,
}

#[derive(Debug, Default)]
pub struct Ep0Guard {
    state: GuardState,
}

impl Ep0Guard {
    pub const fn new() -> Self {
        Self {
            state: GuardState::Idle,
        }
    }

    pub fn state(&self) -> GuardState {
        self.state
    }

    /// Pass `event` to `base` unless it is a duplicate OUT NAK.
    ///
    /// Returns whatever `base` returns; an absorbed NAK is `Ok(())`.
    pub fn dispatch<H: Ep0Handler + ?Sized>(&mut self, event: Ep0Event, base: &mut H) -> Result<()> {
        match (self.state, event) {
            (GuardState::Busy, Ep0Event::OutNak) => {
                debug!("EP0: duplicate OUT NAK absorbed");
                return Ok(());
            }
            (GuardState::Idle, Ep0Event::OutNak) => self.state = GuardState::Busy,
            (_, Ep0Event::Setup(_)) | (_, Ep0Event::OutComplete) => self.state = GuardState::Idle,
        }
        base.handle_ep0(event)
    }
}
