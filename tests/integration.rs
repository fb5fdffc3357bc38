//! Integration tests: a simulated device core driving the EP0 guard, the
//! class pipe and the HID interface together.

use custom_hid::blink::{BlinkTiming, RateControl};
use custom_hid::config::{HID_EP_IN, HID_EP_OUT};
use custom_hid::hid::endpoint::{EndpointEvent, EndpointHandler};
use custom_hid::hid::shared::Shared;
use custom_hid::hid::HidDevice;
use custom_hid::usb::activity::{ActivityGate, BusEvent};
use custom_hid::usb::control_pipe::ClassPipe;
use custom_hid::usb::descriptor::HidEndpoints;
use custom_hid::usb::ep0_guard::{Ep0Event, Ep0Guard};
use custom_hid::usb::{EndpointIo, EP0_IN, EP0_OUT};
use custom_hid::Error;
use core::convert::Infallible;
use embedded_hal::digital::{ErrorType, OutputPin};
use heapless::Vec;

#[derive(Default)]
struct Led(bool);

impl ErrorType for Led {
    type Error = Infallible;
}

impl OutputPin for Led {
    fn set_low(&mut self) -> Result<(), Infallible> {
        self.0 = false;
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        self.0 = true;
        Ok(())
    }
}

#[derive(Default)]
struct Rate(Option<u8>);

impl RateControl for Rate {
    fn set_rate(&mut self, rate: u8) {
        self.0 = Some(rate);
    }
}

/// Every endpoint of the simulated core.
#[derive(Default)]
struct Core {
    ep0_in: Vec<Vec<u8, 64>, 8>,
    ep0_queued: u32,
    ep0_rx: Vec<u8, 64>,
    hid_in: Vec<u8, 32>,
    hid_rx: Vec<u8, 64>,
}

impl EndpointIo for Core {
    fn write_ep(&mut self, addr: u8, data: &[u8]) -> usize {
        match addr {
            EP0_IN => self.ep0_in.push(Vec::from_slice(data).unwrap()).unwrap(),
            HID_EP_IN => self.hid_in.extend_from_slice(data).unwrap(),
            _ => panic!("write to unexpected endpoint {addr:#x}"),
        }
        data.len()
    }

    fn read_ep(&mut self, addr: u8, buf: &mut [u8]) -> usize {
        let rx = match addr {
            EP0_OUT => &mut self.ep0_rx,
            HID_EP_OUT => &mut self.hid_rx,
            _ => panic!("read from unexpected endpoint {addr:#x}"),
        };
        let n = rx.len().min(buf.len());
        buf[..n].copy_from_slice(&rx[..n]);
        rx.clear();
        n
    }

    fn read_req_ep(&mut self, addr: u8, _len: usize) {
        if addr == EP0_OUT {
            self.ep0_queued += 1;
        }
    }
}

type Device = HidDevice<Led, Rate>;

/// The EP0 chain as the device core's interrupt handler would run it.
struct Ep0 {
    guard: Ep0Guard,
    pipe: ClassPipe,
}

impl Ep0 {
    fn new() -> Self {
        Self {
            guard: Ep0Guard::new(),
            pipe: ClassPipe::new(),
        }
    }

    fn event(&mut self, event: Ep0Event, dev: &mut Device, core: &mut Core) -> Result<(), Error> {
        self.guard.dispatch(event, &mut self.pipe.bind(dev, core))
    }

    fn setup(&mut self, raw: [u8; 8], dev: &mut Device, core: &mut Core) -> Result<(), Error> {
        let setup = custom_hid::hid::request::SetupPacket::parse(&raw);
        self.event(Ep0Event::Setup(setup), dev, core)
    }
}

fn device() -> Device {
    HidDevice::new(HidEndpoints::default(), Led::default(), Rate::default())
}

const SET_OUTPUT_1: [u8; 8] = [0x21, 0x09, 0x00, 0x02, 0x00, 0x00, 0x01, 0x00];
const SET_FEATURE_1: [u8; 8] = [0x21, 0x09, 0x00, 0x03, 0x00, 0x00, 0x01, 0x00];
const GET_INPUT_1: [u8; 8] = [0xA1, 0x01, 0x00, 0x01, 0x00, 0x00, 0x01, 0x00];

#[test]
fn duplicate_nak_queues_ep0_buffer_once() {
    let (mut ep0, mut dev, mut core) = (Ep0::new(), device(), Core::default());

    ep0.setup(SET_OUTPUT_1, &mut dev, &mut core).unwrap();
    ep0.event(Ep0Event::OutNak, &mut dev, &mut core).unwrap();
    ep0.event(Ep0Event::OutNak, &mut dev, &mut core).unwrap();
    assert_eq!(core.ep0_queued, 1);

    core.ep0_rx.push(0x01).unwrap();
    ep0.event(Ep0Event::OutComplete, &mut dev, &mut core).unwrap();

    assert!(dev.led().0);
    assert_eq!(dev.reports().output, 0x01);
    // Status stage.
    assert_eq!(core.ep0_in.len(), 1);
    assert!(core.ep0_in[0].is_empty());

    // The next transfer gets its own NAK through.
    ep0.setup(SET_OUTPUT_1, &mut dev, &mut core).unwrap();
    ep0.event(Ep0Event::OutNak, &mut dev, &mut core).unwrap();
    assert_eq!(core.ep0_queued, 2);
}

#[test]
fn feature_report_sets_clamped_blink_rate() {
    let (mut ep0, mut dev, mut core) = (Ep0::new(), device(), Core::default());

    ep0.setup(SET_FEATURE_1, &mut dev, &mut core).unwrap();
    ep0.event(Ep0Event::OutNak, &mut dev, &mut core).unwrap();
    core.ep0_rx.push(50).unwrap();
    ep0.event(Ep0Event::OutComplete, &mut dev, &mut core).unwrap();

    let rate = dev.rate().0.unwrap();
    assert_eq!(rate, 20);
    let timing = BlinkTiming::from_rate(rate);
    assert_eq!((timing.period_ms, timing.on_ms), (50, 25));
}

#[test]
fn host_polls_press_then_release() {
    let gate = ActivityGate::new();
    let (mut ep0, mut core) = (Ep0::new(), Core::default());
    let shared = Shared::new(device());

    gate.on_configured();
    assert!(shared.lock(|dev| dev.on_button_edge(&gate, &mut core)));

    shared
        .lock(|dev| ep0.setup(GET_INPUT_1, dev, &mut core))
        .unwrap();
    assert_eq!(core.ep0_in[0].as_slice(), &[1]);

    shared.lock(|dev| dev.endpoint_event(EndpointEvent::InComplete, &mut core));
    shared.lock(|dev| dev.endpoint_event(EndpointEvent::InComplete, &mut core));
    assert_eq!(core.hid_in.as_slice(), &[1, 0]);

    shared
        .lock(|dev| ep0.setup(GET_INPUT_1, dev, &mut core))
        .unwrap();
    assert_eq!(core.ep0_in[1].as_slice(), &[0]);
}

#[test]
fn interrupt_out_and_control_out_agree() {
    let (mut ep0, mut core) = (Ep0::new(), Core::default());
    let mut a = device();
    let mut b = device();

    a.endpoint_event(EndpointEvent::OutNak, &mut core);
    core.hid_rx.push(0x01).unwrap();
    a.endpoint_event(EndpointEvent::OutComplete, &mut core);

    ep0.setup(SET_OUTPUT_1, &mut b, &mut core).unwrap();
    ep0.event(Ep0Event::OutNak, &mut b, &mut core).unwrap();
    core.ep0_rx.push(0x01).unwrap();
    ep0.event(Ep0Event::OutComplete, &mut b, &mut core).unwrap();

    assert_eq!(a.reports(), b.reports());
    assert_eq!(a.led().0, b.led().0);
}

#[test]
fn standard_and_unsupported_requests() {
    let (mut ep0, mut dev, mut core) = (Ep0::new(), device(), Core::default());

    // GET_DESCRIPTOR(Device) belongs to the core.
    let get_descriptor = [0x80, 0x06, 0x00, 0x01, 0x00, 0x00, 0x12, 0x00];
    let err = ep0.setup(get_descriptor, &mut dev, &mut core).unwrap_err();
    assert_eq!(err, Error::NotClassRequest);
    assert!(!err.is_stall());

    // GET_PROTOCOL and GET_REPORT(Output) stall.
    for raw in [
        [0xA1, 0x03, 0x00, 0x00, 0x00, 0x00, 0x01, 0x00],
        [0xA1, 0x01, 0x00, 0x02, 0x00, 0x00, 0x01, 0x00],
    ] {
        let err = ep0.setup(raw, &mut dev, &mut core).unwrap_err();
        assert!(err.is_stall());
    }

    assert!(core.ep0_in.is_empty());
}

#[test]
fn bus_reset_drops_presses_until_reconfigured() {
    let gate = ActivityGate::new();
    let mut dev = device();
    let mut core = Core::default();

    gate.on_configured();
    dev.on_button_edge(&gate, &mut core);
    gate.on_reset();
    assert!(!dev.on_button_edge(&gate, &mut core));

    gate.on_configured();
    assert!(dev.on_button_edge(&gate, &mut core));
    dev.endpoint_event(EndpointEvent::InComplete, &mut core);
    assert_eq!(core.hid_in.as_slice(), &[1, 1, 0]);
}

#[test]
fn host_sees_release_after_reset_and_reconfigure() {
    let gate = ActivityGate::new();
    let (mut ep0, mut core) = (Ep0::new(), Core::default());
    let shared = Shared::new(device());

    shared.lock(|dev| dev.on_bus_event(&gate, BusEvent::Configured));
    shared.lock(|dev| dev.on_button_edge(&gate, &mut core));
    shared.lock(|dev| dev.on_bus_event(&gate, BusEvent::Reset));
    shared.lock(|dev| dev.on_bus_event(&gate, BusEvent::Configured));

    shared
        .lock(|dev| ep0.setup(GET_INPUT_1, dev, &mut core))
        .unwrap();
    assert_eq!(core.ep0_in[0].as_slice(), &[0]);
    assert_eq!(shared.lock(|dev| dev.pending_presses()), 0);
}
