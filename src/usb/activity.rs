//! Device activity gate.
//!
//! Tracks the host-side bus state that decides whether button edges may
//! produce reports.  The device is *active* while it is configured and the
//! bus is not suspended.
//!
//! The gate is written from the USB bus-event context and read from the
//! button context, so it is a single atomic word: stores use `Release`,
//! loads use `Acquire`.
//!
//! ```text
//! bit 0      configured
//! bit 1      suspended
//! bits 2..   session generation (bumped on every configured event)
//! ```

use crate::fmt::info;
use core::sync::atomic::{AtomicU32, Ordering};

const CONFIGURED: u32 = 1 << 0;
const SUSPENDED: u32 = 1 << 1;
const GENERATION_SHIFT: u32 = 2;

/// Identifies one configured session.  A new session starts every time the
/// host (re)configures the device.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Session(u32);

impl Session {
    /// The session before the first configuration.
    pub const NONE: Session = Session(0);
}

/// Bus state change reported by the device core.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BusEvent {
    Reset,
    Configured,
    Deconfigured,
    Suspended,
    Resumed,
}

impl BusEvent {
    /// Whether the event discards every transfer queued before it.
    pub fn ends_session(self) -> bool {
        matches!(
            self,
            BusEvent::Reset | BusEvent::Configured | BusEvent::Deconfigured
        )
    }
}

/// State word after a configured event: next generation, configured, not
/// suspended.
fn configured(state: u32) -> u32 {
    let generation = (state >> GENERATION_SHIFT).wrapping_add(1);
    (generation << GENERATION_SHIFT) | CONFIGURED
}

/// Process-wide activity flag driven by bus events.
pub struct ActivityGate {
    state: AtomicU32,
}

impl ActivityGate {
    pub const fn new() -> Self {
        Self {
            state: AtomicU32::new(0),
        }
    }

    /// Host selected a configuration: the device becomes active and a new
    /// session starts.  Returns that session.
    pub fn on_configured(&self) -> Session {
        let prev = self
            .state
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |s| Some(configured(s)))
            .unwrap_or_else(|s| s);
        let session = Session(configured(prev) >> GENERATION_SHIFT);
        info!("USB: configured, session {}", session.0);
        session
    }

    /// Host cleared the configuration (SET_CONFIGURATION 0).
    pub fn on_deconfigured(&self) {
        self.state.fetch_and(!CONFIGURED, Ordering::AcqRel);
        info!("USB: deconfigured, device inactive");
    }

    /// Bus suspended: inactive until resumed.
    pub fn on_suspended(&self) {
        self.state.fetch_or(SUSPENDED, Ordering::AcqRel);
        info!("USB: suspended, device inactive");
    }

    /// Bus resumed: active again if the configuration survived the suspend.
    pub fn on_resumed(&self) {
        let prev = self.state.fetch_and(!SUSPENDED, Ordering::AcqRel);
        info!("USB: resumed, configured={}", prev & CONFIGURED != 0);
    }

    /// Bus reset: the configuration is gone.
    pub fn on_reset(&self) {
        self.state
            .fetch_and(!(CONFIGURED | SUSPENDED), Ordering::AcqRel);
        info!("USB: reset, device inactive");
    }

    /// Apply one bus event.
    pub fn on_event(&self, event: BusEvent) {
        match event {
            BusEvent::Reset => self.on_reset(),
            BusEvent::Configured => {
                self.on_configured();
            }
            BusEvent::Deconfigured => self.on_deconfigured(),
            BusEvent::Suspended => self.on_suspended(),
            BusEvent::Resumed => self.on_resumed(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.active_session().is_some()
    }

    /// The current session when the device is active.
    pub fn active_session(&self) -> Option<Session> {
        let s = self.state.load(Ordering::Acquire);
        if s & CONFIGURED != 0 && s & SUSPENDED == 0 {
            Some(Session(s >> GENERATION_SHIFT))
        } else {
            None
        }
    }
}

impl Default for ActivityGate {
    fn default() -> Self {
        Self::new()
    }
}
