//! TWI (I2C) master driver and bus scanner for the ATmega328P.
#![no_std]

#[cfg(test)]
extern crate std;

pub mod config;
pub mod hal;
pub mod scanner;

#[cfg(feature = "atmega328p")]
pub mod drivers;
