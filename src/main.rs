#![cfg_attr(target_arch = "avr", no_std, no_main)]

#[cfg(target_arch = "avr")]
use panic_halt as _;

#[cfg(target_arch = "avr")]
#[avr_device::entry]
fn main() -> ! {
    use avr_device::atmega328p::Peripherals;
    use twi_scanner::drivers::SerialConsole;
    use twi_scanner::hal::{Twi, TwiConfig};
    use twi_scanner::scanner::scan_bus;

    let dp = Peripherals::take().unwrap();

    // Console first: the report sink must be live before probing starts
    let mut console = SerialConsole::new(dp.USART0);
    let mut twi = Twi::new(dp.TWI, &dp.PORTC, TwiConfig::default());

    // One pass over the address space; detected devices go to the console
    let _ = scan_bus(&mut twi, &mut console);

    #[allow(clippy::empty_loop)]
    loop {}
}

// Host builds only exist so `cargo test` can link the workspace.
#[cfg(not(target_arch = "avr"))]
fn main() {}
