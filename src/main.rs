//! custom-hid firmware entry point (nRF52840).
//!
//! Tasks:
//!   - USB device stack (enumeration, EP0, bus events)
//!   - interrupt IN writer and interrupt OUT reader
//!   - button edge reporter
//!   - blink-rate LED

#![no_std]
#![no_main]

use custom_hid::firmware::usb::{self, UsbDriver};
use custom_hid::firmware::{blink, button, RateSignal, SharedDevice};
use custom_hid::hid::shared::Shared;
use custom_hid::hid::HidDevice;
use custom_hid::led::ActiveLow;
use custom_hid::usb::descriptor::HidEndpoints;
use defmt::info;
use embassy_executor::Spawner;
use embassy_nrf::config::{Config as NrfConfig, HfclkSource};
use embassy_nrf::gpio::{AnyPin, Level, Output, OutputDrive, Pin};
use embassy_usb::class::hid::{HidReader, HidWriter};
use embassy_usb::UsbDevice;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

const REPORT_N: usize = custom_hid::config::HID_REPORT_SIZE;

static DEVICE: StaticCell<SharedDevice> = StaticCell::new();

#[embassy_executor::task]
async fn usb_task(device: UsbDevice<'static, UsbDriver>) -> ! {
    usb::run_usb_device(device).await
}

#[embassy_executor::task]
async fn in_task(writer: HidWriter<'static, UsbDriver, REPORT_N>, hid: &'static SharedDevice) -> ! {
    usb::in_writer_task(writer, hid).await
}

#[embassy_executor::task]
async fn out_task(reader: HidReader<'static, UsbDriver, REPORT_N>, hid: &'static SharedDevice) -> ! {
    usb::out_reader_task(reader, hid).await
}

#[embassy_executor::task]
async fn button_task(pin: AnyPin, hid: &'static SharedDevice) -> ! {
    button::button_task(pin, hid).await
}

#[embassy_executor::task]
async fn blink_task(pin: AnyPin) -> ! {
    blink::blink_task(pin).await
}

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("custom-hid starting");

    // USBD needs the external high-frequency crystal.
    let mut nrf_config = NrfConfig::default();
    nrf_config.hfclk_source = HfclkSource::ExternalXtal;
    let p = embassy_nrf::init(nrf_config);

    // Output-report LED, P0.13, active-low: start dark.
    let led = ActiveLow(Output::new(p.P0_13, Level::High, OutputDrive::Standard));
    let hid = DEVICE.init(Shared::new(HidDevice::new(
        HidEndpoints::default(),
        led,
        RateSignal,
    )));
    let hid: &'static SharedDevice = hid;

    let usb = usb::init(p.USBD, hid);

    spawner.must_spawn(usb_task(usb.device));
    spawner.must_spawn(in_task(usb.writer, hid));
    spawner.must_spawn(out_task(usb.reader, hid));
    spawner.must_spawn(button_task(p.P0_11.degrade(), hid));
    spawner.must_spawn(blink_task(p.P0_14.degrade()));

    info!("All tasks spawned");
}
