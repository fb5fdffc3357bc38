//! Stage-0 handler for HID class requests.
//!
//! Sequences a class control transfer over the EP0 primitives and leaves
//! the report semantics to a [`ControlHandler`]:
//!
//! ```text
//! SETUP (device-to-host)  → answer on EP0 IN, clipped to wLength
//! SETUP (no data stage)   → run request, zero-length status on EP0 IN
//! SETUP (with data stage) → park request
//!   OUT_NAK               → queue EP0 OUT receive buffer (wLength bytes)
//!   OUT_COMPLETE          → read EP0 OUT, run request, zero-length status
//! ```
//!
//! Errors are returned to the caller; every error except
//! [`Error::NotClassRequest`] must be answered with STALL by the core.

use super::ep0_guard::{Ep0Event, Ep0Handler};
use super::{EndpointIo, EP0_IN, EP0_OUT};
use crate::config::EP0_MAX_PACKET;
use crate::error::{Error, Result};
use crate::fmt::{debug, warning};
use crate::hid::control::ControlHandler;
use crate::hid::request::{HidRequest, SetupPacket};

/// EP0 class-request state.
pub struct ClassPipe {
    /// Request waiting for its data stage.
    parked: Option<HidRequest>,
    buf: [u8; EP0_MAX_PACKET],
}

impl ClassPipe {
    pub const fn new() -> Self {
        Self {
            parked: None,
            buf: [0; EP0_MAX_PACKET],
        }
    }

    /// Request waiting for its data stage, if any.
    pub fn parked(&self) -> Option<HidRequest> {
        self.parked
    }

    /// Pair the pipe with the interface and the core's endpoints for one
    /// event dispatch.
    pub fn bind<'a, C, E>(&'a mut self, class: &'a mut C, ep: &'a mut E) -> BoundPipe<'a, C, E> {
        BoundPipe {
            pipe: self,
            class,
            ep,
        }
    }

    pub fn handle<C, E>(&mut self, event: Ep0Event, class: &mut C, ep: &mut E) -> Result<()>
    where
        C: ControlHandler + ?Sized,
        E: EndpointIo + ?Sized,
    {
        match event {
            Ep0Event::Setup(setup) => {
                // A new setup packet aborts whatever transfer was in progress.
                self.parked = None;
                self.on_setup(&setup, class, ep)
            }
            Ep0Event::OutNak => {
                let len = self
                    .parked
                    .map_or(0, |req| usize::from(req.out_data_len()));
                ep.read_req_ep(EP0_OUT, len);
                Ok(())
            }
            Ep0Event::OutComplete => match self.parked.take() {
                Some(req) => self.on_data(req, class, ep),
                None => {
                    // Status stage of a device-to-host transfer.
                    ep.read_ep(EP0_OUT, &mut []);
                    Ok(())
                }
            },
        }
    }

    fn on_setup<C, E>(&mut self, setup: &SetupPacket, class: &mut C, ep: &mut E) -> Result<()>
    where
        C: ControlHandler + ?Sized,
        E: EndpointIo + ?Sized,
    {
        let req = HidRequest::decode(setup)?;
        debug!("EP0: {:?}", req);

        match req {
            HidRequest::GetReport { report, length } => {
                let n = class.get_report(report, &mut self.buf)?;
                let n = n.min(usize::from(length));
                ep.write_ep(EP0_IN, &self.buf[..n]);
            }
            HidRequest::GetIdle { report_id } => {
                let idle = class.get_idle(report_id)?;
                let n = usize::from(setup.length.min(1));
                ep.write_ep(EP0_IN, &[idle][..n]);
            }
            HidRequest::SetIdle {
                report_id,
                duration,
            } => {
                class.set_idle(report_id, duration)?;
                ep.write_ep(EP0_IN, &[]);
            }
            HidRequest::SetReport { report, length: 0 } => {
                class.set_report(report, &[])?;
                ep.write_ep(EP0_IN, &[]);
            }
            HidRequest::SetReport { length, .. } if usize::from(length) > EP0_MAX_PACKET => {
                warning!("EP0: SET_REPORT of {} bytes does not fit", length);
                return Err(Error::BufferOverflow);
            }
            HidRequest::SetReport { .. } => self.parked = Some(req),
        }
        Ok(())
    }

    fn on_data<C, E>(&mut self, req: HidRequest, class: &mut C, ep: &mut E) -> Result<()>
    where
        C: ControlHandler + ?Sized,
        E: EndpointIo + ?Sized,
    {
        let HidRequest::SetReport { report, length } = req else {
            return Err(Error::Stall);
        };
        let n = ep.read_ep(EP0_OUT, &mut self.buf[..usize::from(length)]);
        class.set_report(report, &self.buf[..n])?;
        ep.write_ep(EP0_IN, &[]);
        Ok(())
    }
}

impl Default for ClassPipe {
    fn default() -> Self {
        Self::new()
    }
}

/// A [`ClassPipe`] bound to its interface and endpoints; this is what the
/// [`super::ep0_guard::Ep0Guard`] forwards to.
pub struct BoundPipe<'a, C: ?Sized, E: ?Sized> {
    pipe: &'a mut ClassPipe,
    class: &'a mut C,
    ep: &'a mut E,
}

impl<C, E> Ep0Handler for BoundPipe<'_, C, E>
where
    C: ControlHandler + ?Sized,
    E: EndpointIo + ?Sized,
{
    fn handle_ep0(&mut self, event: Ep0Event) -> Result<()> {
        self.pipe.handle(event, &mut *self.class, &mut *self.ep)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hid::report::{ReportId, ReportKind};
    use heapless::Vec;

    /// EP0 side of a device core.
    #[derive(Default)]
    struct Core {
        written: Vec<Vec<u8, EP0_MAX_PACKET>, 8>,
        queued: Vec<usize, 8>,
        rx: Vec<u8, EP0_MAX_PACKET>,
    }

    impl EndpointIo for Core {
        fn write_ep(&mut self, addr: u8, data: &[u8]) -> usize {
            assert_eq!(addr, EP0_IN);
            self.written.push(Vec::from_slice(data).unwrap()).unwrap();
            data.len()
        }

        fn read_ep(&mut self, addr: u8, buf: &mut [u8]) -> usize {
            assert_eq!(addr, EP0_OUT);
            let n = self.rx.len().min(buf.len());
            buf[..n].copy_from_slice(&self.rx[..n]);
            n
        }

        fn read_req_ep(&mut self, addr: u8, len: usize) {
            assert_eq!(addr, EP0_OUT);
            self.queued.push(len).unwrap();
        }
    }

    /// Interface that answers GET_REPORT with three bytes and records sets.
    #[derive(Default)]
    struct Iface {
        set: Option<(ReportId, Vec<u8, EP0_MAX_PACKET>)>,
        idle: u8,
    }

    impl ControlHandler for Iface {
        fn get_report(&mut self, _report: ReportId, buf: &mut [u8]) -> Result<usize> {
            buf[..3].copy_from_slice(&[7, 8, 9]);
            Ok(3)
        }

        fn set_report(&mut self, report: ReportId, data: &[u8]) -> Result<()> {
            if report.kind == ReportKind::Input {
                return Err(Error::Stall);
            }
            self.set = Some((report, Vec::from_slice(data).unwrap()));
            Ok(())
        }

        fn get_idle(&mut self, _report_id: u8) -> Result<u8> {
            Ok(self.idle)
        }

        fn set_idle(&mut self, _report_id: u8, duration: u8) -> Result<()> {
            self.idle = duration;
            Ok(())
        }
    }

    fn setup(raw: [u8; 8]) -> Ep0Event {
        Ep0Event::Setup(SetupPacket::parse(&raw))
    }

    #[test]
    fn get_report_is_clipped_to_wlength() {
        let (mut pipe, mut iface, mut core) = (ClassPipe::new(), Iface::default(), Core::default());
        let get_in_2 = setup([0xA1, 0x01, 0x00, 0x01, 0x00, 0x00, 0x02, 0x00]);

        pipe.handle(get_in_2, &mut iface, &mut core).unwrap();
        pipe.handle(Ep0Event::OutComplete, &mut iface, &mut core).unwrap();

        assert_eq!(core.written.len(), 1);
        assert_eq!(core.written[0].as_slice(), &[7, 8]);
    }

    #[test]
    fn set_report_runs_after_data_stage() {
        let (mut pipe, mut iface, mut core) = (ClassPipe::new(), Iface::default(), Core::default());
        let set_feature_1 = setup([0x21, 0x09, 0x00, 0x03, 0x00, 0x00, 0x01, 0x00]);

        pipe.handle(set_feature_1, &mut iface, &mut core).unwrap();
        assert!(pipe.parked().is_some());
        assert!(iface.set.is_none());

        pipe.handle(Ep0Event::OutNak, &mut iface, &mut core).unwrap();
        assert_eq!(core.queued.as_slice(), &[1]);

        core.rx.push(15).unwrap();
        pipe.handle(Ep0Event::OutComplete, &mut iface, &mut core).unwrap();

        let (report, data) = iface.set.take().unwrap();
        assert_eq!(report, ReportId::new(ReportKind::Feature, 0));
        assert_eq!(data.as_slice(), &[15]);
        // Zero-length status stage.
        assert_eq!(core.written.len(), 1);
        assert!(core.written[0].is_empty());
        assert!(pipe.parked().is_none());
    }

    #[test]
    fn zero_length_set_report_completes_in_setup() {
        let (mut pipe, mut iface, mut core) = (ClassPipe::new(), Iface::default(), Core::default());
        let set_output_0 = setup([0x21, 0x09, 0x00, 0x02, 0x00, 0x00, 0x00, 0x00]);

        pipe.handle(set_output_0, &mut iface, &mut core).unwrap();

        assert!(pipe.parked().is_none());
        assert_eq!(iface.set.as_ref().map(|(_, d)| d.len()), Some(0));
        assert_eq!(core.written.len(), 1);
    }

    #[test]
    fn set_and_get_idle() {
        let (mut pipe, mut iface, mut core) = (ClassPipe::new(), Iface::default(), Core::default());

        pipe.handle(setup([0x21, 0x0A, 0x00, 0x7D, 0x00, 0x00, 0x00, 0x00]), &mut iface, &mut core)
            .unwrap();
        pipe.handle(setup([0xA1, 0x02, 0x00, 0x00, 0x00, 0x00, 0x01, 0x00]), &mut iface, &mut core)
            .unwrap();

        assert_eq!(iface.idle, 0x7D);
        assert!(core.written[0].is_empty());
        assert_eq!(core.written[1].as_slice(), &[0x7D]);
    }

    #[test]
    fn errors_leave_endpoint_untouched() {
        let (mut pipe, mut iface, mut core) = (ClassPipe::new(), Iface::default(), Core::default());

        let get_descriptor = setup([0x80, 0x06, 0x00, 0x01, 0x00, 0x00, 0x12, 0x00]);
        assert_eq!(
            pipe.handle(get_descriptor, &mut iface, &mut core),
            Err(Error::NotClassRequest)
        );

        let set_protocol = setup([0x21, 0x0B, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00]);
        assert_eq!(pipe.handle(set_protocol, &mut iface, &mut core), Err(Error::Stall));

        let set_input_0 = setup([0x21, 0x09, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00]);
        assert_eq!(pipe.handle(set_input_0, &mut iface, &mut core), Err(Error::Stall));

        assert!(core.written.is_empty());
    }

    #[test]
    fn oversized_set_report_stalls() {
        let (mut pipe, mut iface, mut core) = (ClassPipe::new(), Iface::default(), Core::default());
        let set_output_big = setup([0x21, 0x09, 0x00, 0x02, 0x00, 0x00, 0x00, 0x01]);

        let err = pipe.handle(set_output_big, &mut iface, &mut core).unwrap_err();
        assert_eq!(err, Error::BufferOverflow);
        assert!(err.is_stall());
        assert!(pipe.parked().is_none());
    }

    #[test]
    fn new_setup_drops_parked_request() {
        let (mut pipe, mut iface, mut core) = (ClassPipe::new(), Iface::default(), Core::default());

        pipe.handle(setup([0x21, 0x09, 0x00, 0x02, 0x00, 0x00, 0x01, 0x00]), &mut iface, &mut core)
            .unwrap();
        pipe.handle(setup([0xA1, 0x01, 0x00, 0x01, 0x00, 0x00, 0x01, 0x00]), &mut iface, &mut core)
            .unwrap();

        assert!(pipe.parked().is_none());
        pipe.handle(Ep0Event::OutNak, &mut iface, &mut core).unwrap();
        assert_eq!(core.queued.as_slice(), &[0]);
    }
}
