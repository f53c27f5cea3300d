//! Configuration constants for the TWI scanner firmware

/// CPU frequency in Hz
pub const CPU_FREQ_HZ: u32 = 16_000_000;

/// TWI bus clock (SCL) frequency in Hz
pub const TWI_FREQ_HZ: u32 = 100_000;

/// UART baud rate. 115200 keeps the console well ahead of the bus probes.
pub const UART_BAUD: u32 = 115_200;
