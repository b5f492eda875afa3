//! RN2483 example with an explicit device EUI
//!
//! Same wiring as the `ping` example. The module is started without joining,
//! configured with a device EUI chosen on the network console, then joined
//! with a retry loop owned by the application. Once joined it sends "." every
//! 5 seconds.

#![no_std]
#![no_main]

use atsamd_hal as hal;
use cortex_m_rt::entry;
use panic_halt as _;

use embedded_hal::blocking::delay::{DelayMs, DelayUs};
use hal::clock::GenericClockController;
use hal::delay::Delay;
use hal::gpio::v2::Pins;
use hal::pac::{CorePeripherals, Peripherals};
use hal::prelude::*;
use hal::sercom::v2::{uart, Sercom0};

use rn2483::{
    config::Identity,
    device::Rn2483,
    transport::{SerialLink, BAUD_RATE},
};

// OTAA credentials from the network console
const APP_EUI: &str = "0000000000000000";
const APP_KEY: &str = "00000000000000000000000000000000";
const DEV_EUI: &str = "0000000000000000";

const CPU_MHZ: u32 = 48;

struct CycleDelay;

impl DelayUs<u32> for CycleDelay {
    fn delay_us(&mut self, us: u32) {
        cortex_m::asm::delay(us * CPU_MHZ);
    }
}

impl DelayMs<u32> for CycleDelay {
    fn delay_ms(&mut self, ms: u32) {
        self.delay_us(ms * 1_000);
    }
}

#[entry]
fn main() -> ! {
    let mut peripherals = Peripherals::take().unwrap();
    let core = CorePeripherals::take().unwrap();
    let mut clocks = GenericClockController::with_internal_32kosc(
        peripherals.GCLK,
        &mut peripherals.PM,
        &mut peripherals.SYSCTRL,
        &mut peripherals.NVMCTRL,
    );
    let pins = Pins::new(peripherals.PORT);
    let mut led = pins.pa17.into_push_pull_output();
    let mut reset = pins.pa08.into_push_pull_output();

    let gclk0 = clocks.gclk0();
    let sercom_clock = clocks.sercom0_core(&gclk0).unwrap();
    let pads = uart::Pads::<Sercom0>::default().rx(pins.pa11).tx(pins.pa10);
    let serial = uart::Config::new(
        &peripherals.PM,
        peripherals.SERCOM0,
        pads,
        sercom_clock.freq(),
    )
    .baud(
        BAUD_RATE.hz(),
        uart::BaudMode::Fractional(uart::Oversampling::Bits16),
    )
    .enable();

    let mut delay = Delay::new(core.SYST, &mut clocks);
    let mut module = Rn2483::new(SerialLink::new(serial, CycleDelay), CycleDelay);

    // Reset only, credentials come next
    if module.init(&mut reset, None, false).is_err() {
        loop {
            led.toggle().ok();
            delay.delay_ms(100u32);
        }
    }

    let identity = Identity::new(APP_EUI, APP_KEY).with_dev_eui(DEV_EUI);
    if module.configure(identity).is_err() {
        // Malformed credentials, solid LED
        led.set_high().ok();
        loop {
            cortex_m::asm::wfi();
        }
    }

    // Every attempt runs a full join procedure; errors are retried too
    led.set_high().ok();
    while !matches!(module.join(), Ok(true)) {
        led.toggle().ok();
        delay.delay_ms(5_000u32);
    }
    led.set_low().ok();

    loop {
        led.set_high().ok();
        module.transmit_unconfirmed(".").ok();
        led.set_low().ok();
        delay.delay_ms(5_000u32);
    }
}
