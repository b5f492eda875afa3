//! RN2483 "ping" example
//!
//! Adafruit Feather M0 with an RN2483 on SERCOM0 (TX on D1, RX on D0) and the
//! module reset line on D4:
//! - Resets the module and joins over OTAA, using the hardware EUI
//! - Sends "TTN" once, then "." every 5 seconds
//! - LED status indication:
//!   * Solid LED: Joining or transmitting
//!   * Triple blink: Join failed
//!   * Single blink: Transmit failed

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

use rn2483::{config::Identity, device::Rn2483, transport::SerialLink, transport::BAUD_RATE};

// OTAA credentials from the network console
const APP_EUI: &str = "0000000000000000";
const APP_KEY: &str = "00000000000000000000000000000000";

const CPU_MHZ: u32 = 48;

/// Busy-wait delay used while polling the UART
struct CycleDelay;

impl DelayUs<u32> for CycleDelay {
    fn delay_us(&mut self, us: u32) {
        cortex_m::asm::delay(us * CPU_MHZ);
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

    // Module UART, 57600 8N1
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

    let mut module = Rn2483::new(
        SerialLink::new(serial, CycleDelay),
        Delay::new(core.SYST, &mut clocks),
    );

    // Join network
    led.set_high().ok();
    let identity = Identity::new(APP_EUI, APP_KEY);
    match module.init(&mut reset, Some(identity), true) {
        Ok(true) => led.set_low().ok(),
        _ => loop {
            // Triple blink on join failure
            let mut delay = CycleDelay;
            for _ in 0..3 {
                led.toggle().ok();
                delay.delay_us(100_000);
            }
            delay.delay_us(500_000);
        },
    };

    send(&mut module, &mut led, "TTN");
    loop {
        let mut delay = CycleDelay;
        send(&mut module, &mut led, ".");
        for _ in 0..5 {
            delay.delay_us(1_000_000);
        }
    }
}

fn send<T, D, L>(module: &mut Rn2483<T, D>, led: &mut L, message: &str)
where
    T: rn2483::transport::Transport,
    D: DelayMs<u32>,
    L: embedded_hal::digital::v2::OutputPin,
{
    led.set_high().ok();
    let sent = module.transmit_unconfirmed(message).is_ok();
    led.set_low().ok();

    if !sent {
        // Single blink on transmit failure
        let mut delay = CycleDelay;
        delay.delay_us(200_000);
        led.set_high().ok();
        delay.delay_us(200_000);
        led.set_low().ok();
    }
}
