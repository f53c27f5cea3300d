//! TWI (I2C) master HAL implementation

use crate::config::{CPU_FREQ_HZ, TWI_FREQ_HZ};

#[cfg(feature = "atmega328p")]
use avr_device::atmega328p::{PORTC, TWI};
#[cfg(feature = "atmega328p")]
use embedded_hal::blocking::i2c;

/// TWI status codes (TWSR with the prescaler bits masked off)
#[derive(Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum TwiStatus {
    StartTransmitted = 0x08,
    RepStartTransmitted = 0x10,
    AddrWriteAck = 0x18,
    AddrWriteNack = 0x20,
    DataWriteAck = 0x28,
    DataWriteNack = 0x30,
    ArbitrationLost = 0x38,
    AddrReadAck = 0x40,
    AddrReadNack = 0x48,
    DataReadAck = 0x50,
    DataReadNack = 0x58,
}

/// Outcome of a byte transfer, and the acknowledge policy for reads.
///
/// `Nack` is a catch-all: the status register does not let this layer
/// tell a genuine NACK apart from arbitration loss or a bus error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TwiAck {
    Ack,
    Nack,
}

impl TwiAck {
    /// Classify a masked TWSR value into ACK or NACK.
    pub fn from_status(status: u8) -> Self {
        if status == TwiStatus::AddrWriteAck as u8
            || status == TwiStatus::DataWriteAck as u8
            || status == TwiStatus::AddrReadAck as u8
        {
            TwiAck::Ack
        } else {
            TwiAck::Nack
        }
    }
}

/// Data direction encoded in the R/W bit of an SLA header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Direction {
    Write = 0,
    Read = 1,
}

/// Compose an SLA+R/W header byte from a 7-bit address and a direction.
pub const fn sla(address: u8, direction: Direction) -> u8 {
    (address << 1) | direction as u8
}

/// TWBR value for the requested SCL frequency, prescaler 1
pub const fn bitrate(cpu_hz: u32, scl_hz: u32) -> u8 {
    ((cpu_hz / scl_hz - 16) / 2) as u8
}

/// Bus configuration, applied once at init
#[derive(Clone, Copy)]
pub struct TwiConfig {
    /// Target SCL frequency in Hz
    pub scl_hz: u32,
    /// Drive the bus lines through the internal pull-up resistors
    pub internal_pullups: bool,
}

impl Default for TwiConfig {
    fn default() -> Self {
        Self {
            scl_hz: TWI_FREQ_HZ,
            internal_pullups: true,
        }
    }
}

/// The four blocking bus primitives.
///
/// Legal call sequence is `start` → any number of `write_byte`/`read_byte`
/// → `stop`; calls outside that window are not checked here, matching the
/// hardware. Every call spins on the TWINT flag until the bus operation
/// physically completes, so a stuck bus hangs the caller.
pub trait TwiBus {
    /// Assert a start condition and wait until it has been sent.
    fn start(&mut self);

    /// Send one byte (SLA header or data) and report ACK or NACK.
    fn write_byte(&mut self, byte: u8) -> TwiAck;

    /// Receive one byte, answering with the given acknowledge policy.
    /// `Nack` tells the transmitter this is the last byte wanted.
    fn read_byte(&mut self, ack: TwiAck) -> u8;

    /// Assert a stop condition. Returns immediately; the caller may begin
    /// a new `start` right away.
    fn stop(&mut self);
}

/// SDA/SCL pin positions on PORTC
#[cfg(feature = "atmega328p")]
const SDA_PIN: u8 = 4;
#[cfg(feature = "atmega328p")]
const SCL_PIN: u8 = 5;

/// TWI peripheral driver.
///
/// Owns the peripheral handle, so there is exactly one logical bus master
/// for the lifetime of the process.
#[cfg(feature = "atmega328p")]
pub struct Twi {
    twi: TWI,
}

#[cfg(feature = "atmega328p")]
impl Twi {
    /// Take ownership of the TWI peripheral and program it for the given
    /// configuration. PORTC is only borrowed to set up the bus lines.
    pub fn new(twi: TWI, portc: &PORTC, config: TwiConfig) -> Self {
        let mask = (1 << SDA_PIN) | (1 << SCL_PIN);
        if config.internal_pullups {
            // Bus lines as inputs with internal pull-ups
            portc.ddrc.modify(|r, w| unsafe { w.bits(r.bits() & !mask) });
            portc.portc.modify(|r, w| unsafe { w.bits(r.bits() | mask) });
        }

        // Prescaler 1, then the bit-rate divisor for the target SCL
        twi.twsr.write(|w| unsafe { w.bits(0) });
        twi.twbr
            .write(|w| unsafe { w.bits(bitrate(CPU_FREQ_HZ, config.scl_hz)) });

        Self { twi }
    }

    /// Spin until the hardware raises TWINT for the current operation.
    fn wait(&self) {
        while self.twi.twcr.read().twint().bit_is_clear() {}
    }

    /// Masked status of the last bus operation
    fn status(&self) -> u8 {
        self.twi.twsr.read().bits() & 0xF8
    }
}

#[cfg(feature = "atmega328p")]
impl TwiBus for Twi {
    fn start(&mut self) {
        self.twi
            .twcr
            .write(|w| w.twint().set_bit().twsta().set_bit().twen().set_bit());
        self.wait();
    }

    fn write_byte(&mut self, byte: u8) -> TwiAck {
        self.twi.twdr.write(|w| unsafe { w.bits(byte) });
        self.twi.twcr.write(|w| w.twint().set_bit().twen().set_bit());
        self.wait();
        TwiAck::from_status(self.status())
    }

    fn read_byte(&mut self, ack: TwiAck) -> u8 {
        self.twi.twcr.write(|w| {
            let w = w.twint().set_bit().twen().set_bit();
            match ack {
                TwiAck::Ack => w.twea().set_bit(),
                TwiAck::Nack => w,
            }
        });
        self.wait();
        self.twi.twdr.read().bits()
    }

    fn stop(&mut self) {
        self.twi
            .twcr
            .write(|w| w.twint().set_bit().twsto().set_bit().twen().set_bit());
    }
}

/// Transaction-level error for the embedded-hal impls. Deliberately no
/// finer than the phase the NACK arrived in.
#[cfg(feature = "atmega328p")]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TwiError {
    AddressNack,
    DataNack,
}

#[cfg(feature = "atmega328p")]
impl i2c::Write for Twi {
    type Error = TwiError;

    fn write(&mut self, address: u8, bytes: &[u8]) -> Result<(), TwiError> {
        self.start();
        if self.write_byte(sla(address, Direction::Write)) == TwiAck::Nack {
            self.stop();
            return Err(TwiError::AddressNack);
        }
        for &byte in bytes {
            if self.write_byte(byte) == TwiAck::Nack {
                self.stop();
                return Err(TwiError::DataNack);
            }
        }
        self.stop();
        Ok(())
    }
}

#[cfg(feature = "atmega328p")]
impl i2c::Read for Twi {
    type Error = TwiError;

    fn read(&mut self, address: u8, buffer: &mut [u8]) -> Result<(), TwiError> {
        self.start();
        if self.write_byte(sla(address, Direction::Read)) == TwiAck::Nack {
            self.stop();
            return Err(TwiError::AddressNack);
        }
        let last = buffer.len().saturating_sub(1);
        for (i, slot) in buffer.iter_mut().enumerate() {
            let policy = if i == last { TwiAck::Nack } else { TwiAck::Ack };
            *slot = self.read_byte(policy);
        }
        self.stop();
        Ok(())
    }
}
