pub mod twi;

#[cfg(feature = "atmega328p")]
pub mod uart;

// Re-export commonly used types
pub use twi::{sla, Direction, TwiAck, TwiBus, TwiConfig, TwiStatus};

#[cfg(feature = "atmega328p")]
pub use twi::{Twi, TwiError};
#[cfg(feature = "atmega328p")]
pub use uart::Uart;
