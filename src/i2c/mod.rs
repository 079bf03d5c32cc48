//! Transport seam between the EEPROM driver and an I²C bus master.
//!
//! The driver only needs three atomic transaction shapes (write, read and
//! write-then-read with a repeated start); everything below that (clock
//! generation, arbitration, electrical retries) belongs to the transport.

mod address;
mod bus;
mod delay;
pub mod memory;

#[cfg(target_os = "linux")]
pub mod linux;

pub use self::address::I2cAddress;

pub use self::bus::{
	BusError,
	I2cBus,
};

pub use self::delay::{
	Delay,
	NoDelay,
	StdDelay,
	reliable_sleep,
};

pub use self::memory::MemoryEeprom;
