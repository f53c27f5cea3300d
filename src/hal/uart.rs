//! Polling USART0 transmitter
//!
//! TX-only: the scanner writes its report and reads nothing back. No
//! interrupts, matching the rest of this firmware.

use core::convert::Infallible;

use avr_device::atmega328p::USART0;
use embedded_hal::prelude::*;

use crate::config::{CPU_FREQ_HZ, UART_BAUD};

/// UBRR value for the given baud rate with the U2X double-speed bit set.
/// 115200 at 16 MHz needs U2X to stay within 1% baud error.
pub const fn ubrr(cpu_hz: u32, baud: u32) -> u16 {
    (cpu_hz / (8 * baud) - 1) as u16
}

pub struct Uart {
    usart: USART0,
}

impl Uart {
    /// Take ownership of USART0 and configure it for 8N1 at the
    /// compile-time baud rate.
    pub fn new(usart: USART0) -> Self {
        usart
            .ubrr0
            .write(|w| unsafe { w.bits(ubrr(CPU_FREQ_HZ, UART_BAUD)) });
        usart.ucsr0a.write(|w| w.u2x0().set_bit());
        // 8 data bits, no parity, 1 stop bit
        usart.ucsr0c.write(|w| unsafe { w.bits(0x06) });
        usart.ucsr0b.write(|w| w.txen0().set_bit());

        Self { usart }
    }

    /// Blocking byte write: spin until the data register is free.
    pub fn write_byte(&mut self, byte: u8) {
        let _ = nb::block!(self.write(byte));
    }

    pub fn write_str(&mut self, s: &str) {
        for byte in s.bytes() {
            self.write_byte(byte);
        }
    }
}

impl embedded_hal::serial::Write<u8> for Uart {
    type Error = Infallible;

    fn write(&mut self, byte: u8) -> nb::Result<(), Infallible> {
        if self.usart.ucsr0a.read().udre0().bit_is_clear() {
            return Err(nb::Error::WouldBlock);
        }
        self.usart.udr0.write(|w| unsafe { w.bits(byte) });
        Ok(())
    }

    fn flush(&mut self) -> nb::Result<(), Infallible> {
        if self.usart.ucsr0a.read().udre0().bit_is_clear() {
            Err(nb::Error::WouldBlock)
        } else {
            Ok(())
        }
    }
}
