//! TWI bus scanner
//!
//! Probes every legal 7-bit address with an empty SLA+W transaction and
//! reports the ones that acknowledge. Known responders on the lab bus:
//! 0x3c OLED, 0x57 EEPROM, 0x5c temp/humid, 0x68 RTC or GY-521, 0x76 BME280.

use ufmt::uWrite;

use crate::hal::twi::{sla, Direction, TwiAck, TwiBus};

/// First address probed; 0x00..=0x07 are reserved (general call etc.)
pub const FIRST_ADDRESS: u8 = 0x08;
/// Last address probed; 0x78..=0x7F are reserved (10-bit extension etc.)
pub const LAST_ADDRESS: u8 = 0x77;

const HEX_CHARS: [u8; 16] = *b"0123456789abcdef";

/// Probe each address in `FIRST_ADDRESS..=LAST_ADDRESS` exactly once with
/// a start / SLA+W / stop sequence. Each acknowledging address is written
/// to `console` as a line break followed by its two lowercase hex digits.
/// A NACK produces no output for that address and is not retried.
pub fn scan_bus<B, W>(bus: &mut B, console: &mut W) -> Result<(), W::Error>
where
    B: TwiBus,
    W: uWrite,
{
    for address in FIRST_ADDRESS..=LAST_ADDRESS {
        bus.start();
        let ack = bus.write_byte(sla(address, Direction::Write));
        bus.stop();

        if ack == TwiAck::Ack {
            console.write_str("\r\n")?;
            console.write_char(HEX_CHARS[(address >> 4) as usize] as char)?;
            console.write_char(HEX_CHARS[(address & 0xF) as usize] as char)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use core::convert::Infallible;
    use std::string::String;
    use std::vec::Vec;

    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum BusOp {
        Start,
        Write(u8),
        Stop,
    }

    /// Bus with a fixed set of responding devices; records every primitive.
    struct SimBus {
        devices: Vec<u8>,
        ops: Vec<BusOp>,
    }

    impl SimBus {
        fn with_devices(devices: &[u8]) -> Self {
            Self {
                devices: devices.to_vec(),
                ops: Vec::new(),
            }
        }

        fn probed_addresses(&self) -> Vec<u8> {
            self.ops
                .iter()
                .filter_map(|op| match op {
                    BusOp::Write(byte) => Some(byte >> 1),
                    _ => None,
                })
                .collect()
        }
    }

    impl TwiBus for SimBus {
        fn start(&mut self) {
            self.ops.push(BusOp::Start);
        }

        fn write_byte(&mut self, byte: u8) -> TwiAck {
            self.ops.push(BusOp::Write(byte));
            if self.devices.contains(&(byte >> 1)) {
                TwiAck::Ack
            } else {
                TwiAck::Nack
            }
        }

        fn read_byte(&mut self, _ack: TwiAck) -> u8 {
            0xFF
        }

        fn stop(&mut self) {
            self.ops.push(BusOp::Stop);
        }
    }

    struct Sink(String);

    impl uWrite for Sink {
        type Error = Infallible;

        fn write_str(&mut self, s: &str) -> Result<(), Infallible> {
            self.0.push_str(s);
            Ok(())
        }
    }

    fn run(devices: &[u8]) -> (SimBus, String) {
        let mut bus = SimBus::with_devices(devices);
        let mut sink = Sink(String::new());
        scan_bus(&mut bus, &mut sink).unwrap();
        (bus, sink.0)
    }

    #[test]
    fn single_device_reports_one_line() {
        let (_, out) = run(&[0x3C]);
        assert_eq!(out, "\r\n3c");
    }

    #[test]
    fn two_devices_report_in_ascending_order() {
        let (_, out) = run(&[0x68, 0x57]);
        assert_eq!(out, "\r\n57\r\n68");
    }

    #[test]
    fn silent_bus_reports_nothing() {
        let (_, out) = run(&[]);
        assert_eq!(out, "");
    }

    #[test]
    fn low_addresses_are_zero_padded() {
        let (_, out) = run(&[0x08]);
        assert_eq!(out, "\r\n08");
    }

    #[test]
    fn reserved_addresses_are_never_probed() {
        // Devices parked on reserved addresses must stay invisible.
        let (bus, out) = run(&[0x07, 0x78]);
        assert_eq!(out, "");
        for addr in bus.probed_addresses() {
            assert!((FIRST_ADDRESS..=LAST_ADDRESS).contains(&addr));
        }
    }

    #[test]
    fn each_address_probed_exactly_once() {
        let (bus, _) = run(&[0x3C]);
        let probed = bus.probed_addresses();
        let expected: Vec<u8> = (FIRST_ADDRESS..=LAST_ADDRESS).collect();
        assert_eq!(probed, expected);
    }

    #[test]
    fn every_probe_is_start_slaw_stop() {
        let (bus, _) = run(&[0x57]);
        assert_eq!(bus.ops.len(), 3 * (LAST_ADDRESS - FIRST_ADDRESS + 1) as usize);
        for (chunk, address) in bus.ops.chunks(3).zip(FIRST_ADDRESS..=LAST_ADDRESS) {
            assert_eq!(
                chunk,
                [
                    BusOp::Start,
                    BusOp::Write(sla(address, Direction::Write)),
                    BusOp::Stop
                ]
            );
        }
    }

    #[test]
    fn rescanning_an_unchanged_bus_is_idempotent() {
        let (_, first) = run(&[0x3C, 0x76]);
        let (_, second) = run(&[0x3C, 0x76]);
        assert_eq!(first, second);
    }
}
