//! Read the RN2483 hardware EUI
//!
//! Same wiring as the `ping` example. Resets the module and reads the EUI
//! needed to register the device on the network console. The EUI is left in
//! `eui` at a breakpoint; the LED lights up when it was read.

#![no_std]
#![no_main]

use atsamd_hal as hal;
use cortex_m_rt::entry;
use panic_halt as _;

use embedded_hal::blocking::delay::DelayUs;
use hal::clock::GenericClockController;
use hal::delay::Delay;
use hal::gpio::v2::Pins;
use hal::pac::{CorePeripherals, Peripherals};
use hal::prelude::*;
use hal::sercom::v2::{uart, Sercom0};

use rn2483::{
    device::Rn2483,
    transport::{SerialLink, BAUD_RATE},
};

const CPU_MHZ: u32 = 48;

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

    let eui = module
        .startup(&mut reset)
        .and_then(|_| module.hardware_eui());
    if eui.is_ok() {
        led.set_high().ok();
    }
    cortex_m::asm::bkpt();

    loop {
        cortex_m::asm::wfi();
    }
}
