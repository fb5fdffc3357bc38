//! USB HID device on the nRF52840 USBD peripheral.
//!
//! One HID interface with an interrupt IN and an interrupt OUT endpoint.
//! Embassy answers the standard requests; HID class requests reach the
//! device through [`ControlBridge`].

use super::{Endpoints, SharedDevice, GATE, IN_REPORT};
use crate::config;
use crate::fmt::{info, warning};
use crate::hid::control::ControlHandler;
use crate::hid::endpoint::{EndpointEvent, EndpointHandler};
use crate::hid::report::{self, ReportKind, REPORT_DESCRIPTOR};
use crate::usb::activity::BusEvent;
use embassy_nrf::usb::vbus_detect::HardwareVbusDetect;
use embassy_nrf::usb::Driver;
use embassy_nrf::{self, bind_interrupts, peripherals};
use embassy_usb::class::hid::{
    Config as HidConfig, HidReader, HidReaderWriter, HidWriter, ReportId, RequestHandler, State,
};
use embassy_usb::control::OutResponse;
use embassy_usb::{Builder, Config, Handler, UsbDevice};
use static_cell::StaticCell;

bind_interrupts!(struct Irqs {
    USBD => embassy_nrf::usb::InterruptHandler<peripherals::USBD>;
    CLOCK_POWER => embassy_nrf::usb::vbus_detect::InterruptHandler;
});

pub type UsbDriver = Driver<'static, peripherals::USBD, HardwareVbusDetect>;

const REPORT_N: usize = config::HID_REPORT_SIZE;

static HID_STATE: StaticCell<State> = StaticCell::new();
static USB_CONFIG_DESC: StaticCell<[u8; 256]> = StaticCell::new();
static USB_BOS_DESC: StaticCell<[u8; 256]> = StaticCell::new();
static USB_MSOS_DESC: StaticCell<[u8; 256]> = StaticCell::new();
static USB_CTRL_BUF: StaticCell<[u8; 128]> = StaticCell::new();
static BUS_HANDLER: StaticCell<BusEvents> = StaticCell::new();
static CONTROL_BRIDGE: StaticCell<ControlBridge> = StaticCell::new();

/// Bus state callbacks → the shared device and the activity gate.
struct BusEvents {
    device: &'static SharedDevice,
}

impl BusEvents {
    fn dispatch(&self, event: BusEvent) {
        self.device.lock(|dev| dev.on_bus_event(&GATE, event));
    }
}

impl Handler for BusEvents {
    fn reset(&mut self) {
        self.dispatch(BusEvent::Reset);
    }

    fn configured(&mut self, configured: bool) {
        self.dispatch(if configured {
            BusEvent::Configured
        } else {
            BusEvent::Deconfigured
        });
    }

    fn suspended(&mut self, suspended: bool) {
        self.dispatch(if suspended {
            BusEvent::Suspended
        } else {
            BusEvent::Resumed
        });
    }
}

/// HID class requests → the shared device.
struct ControlBridge {
    device: &'static SharedDevice,
}

fn to_report(id: ReportId) -> report::ReportId {
    match id {
        ReportId::In(id) => report::ReportId::new(ReportKind::Input, id),
        ReportId::Out(id) => report::ReportId::new(ReportKind::Output, id),
        ReportId::Feature(id) => report::ReportId::new(ReportKind::Feature, id),
    }
}

fn report_id_byte(id: Option<ReportId>) -> u8 {
    id.map_or(report::REPORT_ID, |id| to_report(id).id)
}

impl RequestHandler for ControlBridge {
    fn get_report(&mut self, id: ReportId, buf: &mut [u8]) -> Option<usize> {
        self.device
            .lock(|dev| dev.get_report(to_report(id), buf))
            .ok()
    }

    fn set_report(&mut self, id: ReportId, data: &[u8]) -> OutResponse {
        match self.device.lock(|dev| dev.set_report(to_report(id), data)) {
            Ok(()) => OutResponse::Accepted,
            Err(_) => OutResponse::Rejected,
        }
    }

    fn get_idle_ms(&mut self, id: Option<ReportId>) -> Option<u32> {
        self.device
            .lock(|dev| dev.get_idle(report_id_byte(id)))
            .ok()
            .map(|units| u32::from(units) * 4)
    }

    fn set_idle_ms(&mut self, id: Option<ReportId>, duration_ms: u32) {
        let units = u8::try_from(duration_ms / 4).unwrap_or(u8::MAX);
        if self
            .device
            .lock(|dev| dev.set_idle(report_id_byte(id), units))
            .is_err()
        {
            warning!("USB: SET_IDLE rejected");
        }
    }
}

/// Build result: the USB device runner and the two HID endpoint halves.
pub struct UsbHid {
    pub device: UsbDevice<'static, UsbDriver>,
    pub reader: HidReader<'static, UsbDriver, REPORT_N>,
    pub writer: HidWriter<'static, UsbDriver, REPORT_N>,
}

/// Initialise the USB stack with the HID interface.
///
/// Must be called exactly once.  All static buffers are consumed here.
pub fn init(usbd: peripherals::USBD, hid: &'static SharedDevice) -> UsbHid {
    let driver = Driver::new(usbd, Irqs, HardwareVbusDetect::new(Irqs));

    let mut usb_config = Config::new(config::USB_VID, config::USB_PID);
    usb_config.manufacturer = Some(config::USB_MANUFACTURER);
    usb_config.product = Some(config::USB_PRODUCT);
    usb_config.serial_number = Some(config::USB_SERIAL_NUMBER);
    usb_config.max_power = 100; // mA
    usb_config.max_packet_size_0 = config::EP0_MAX_PACKET as u8;

    let mut builder = Builder::new(
        driver,
        usb_config,
        USB_CONFIG_DESC.init([0u8; 256]),
        USB_BOS_DESC.init([0u8; 256]),
        USB_MSOS_DESC.init([0u8; 256]),
        USB_CTRL_BUF.init([0u8; 128]),
    );
    builder.handler(BUS_HANDLER.init(BusEvents { device: hid }));

    let hid_config = HidConfig {
        report_descriptor: REPORT_DESCRIPTOR,
        request_handler: Some(CONTROL_BRIDGE.init(ControlBridge { device: hid })),
        poll_ms: config::USB_HID_POLL_MS,
        max_packet_size: 8,
    };
    let hid_state = HID_STATE.init(State::new());
    let (reader, writer) =
        HidReaderWriter::<_, REPORT_N, REPORT_N>::new(&mut builder, hid_state, hid_config).split();

    let device = builder.build();
    info!("USB HID device initialised");

    UsbHid {
        device,
        reader,
        writer,
    }
}

/// Run the USB device stack; spawn as a dedicated task.
pub async fn run_usb_device(mut device: UsbDevice<'static, UsbDriver>) -> ! {
    info!("USB device task started");
    device.run().await
}

/// Send queued input reports.  Each finished transfer is reported back as
/// an IN completion, which may queue the release report.
pub async fn in_writer_task(
    mut writer: HidWriter<'static, UsbDriver, REPORT_N>,
    hid: &'static SharedDevice,
) -> ! {
    loop {
        let value = IN_REPORT.wait().await;
        if writer.write(&[value]).await.is_err() {
            // Endpoint disabled by a reset; the next session starts clean.
            warning!("USB: IN report {} dropped", value);
            continue;
        }
        hid.lock(|dev| {
            dev.endpoint_event(EndpointEvent::InComplete, &mut Endpoints::new(&[]));
        });
    }
}

/// Receive output reports on the interrupt OUT endpoint.
pub async fn out_reader_task(
    mut reader: HidReader<'static, UsbDriver, REPORT_N>,
    hid: &'static SharedDevice,
) -> ! {
    let mut buf = [0u8; REPORT_N];
    loop {
        hid.lock(|dev| {
            dev.endpoint_event(EndpointEvent::OutNak, &mut Endpoints::new(&[]));
        });
        match reader.read(&mut buf).await {
            Ok(n) => {
                let rx = &buf[..n];
                hid.lock(|dev| {
                    dev.endpoint_event(EndpointEvent::OutComplete, &mut Endpoints::new(rx));
                });
            }
            Err(_) => {
                warning!("USB: OUT read failed");
                reader.ready().await;
            }
        }
    }
}
