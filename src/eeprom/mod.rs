//! Driver for 24C32 serial EEPROMs (32 Kbit, organized as 4096 x 8 bit).
//!
//! Addressing: every transaction starts with a 2-byte big-endian word
//! address. Reads can span the whole array in one transaction; writes are
//! limited to a single 32-byte page (the device rolls over within the page
//! instead of advancing to the next one). After each page write the device
//! runs an internal write cycle (max. 5ms) during which it doesn't
//! acknowledge its address; `write` polls for the end of that cycle before
//! the next page.
//!
//! A failed multi-page `write` leaves all pages written before the failure
//! in the EEPROM; nothing is rolled back.
//!
//! The handle doesn't synchronize anything; concurrent users have to lock
//! around it.

mod cursor;
mod error;
mod pages;

pub use self::cursor::EepromCursor;

pub use self::error::Error;

pub use self::pages::{
	Chunk,
	Chunks,
	check_range,
	page_of,
	page_start,
};

use crate::i2c::{
	Delay,
	I2cAddress,
	I2cBus,
	StdDelay,
};

pub const SIZE_BYTES: usize = 4096;
pub const PAGE_SIZE_BYTES: usize = 32;
pub const WRITE_CYCLE_TIME_MS: u32 = 5;
pub const DEFAULT_ADDRESS: u8 = 0x50;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Config {
	/// How long to poll for the end of a write cycle before giving up
	pub write_cycle_time_ms: u32,
	/// Delay between two readiness polls; must not be zero
	pub poll_interval_ms: u32,
}

impl Default for Config {
	fn default() -> Self {
		Config {
			write_cycle_time_ms: WRITE_CYCLE_TIME_MS,
			poll_interval_ms: 1,
		}
	}
}

pub struct Eeprom24c32<B, D = StdDelay> {
	bus: B,
	address: I2cAddress,
	delay: D,
	config: Config,
}

impl<B: I2cBus> Eeprom24c32<B> {
	/// `address` is the 7-bit bus address (usually `DEFAULT_ADDRESS`, the
	/// lower three bits depend on the A0..A2 pins).
	///
	/// Pass `&mut bus` to keep ownership of the transport.
	pub fn new(bus: B, address: u8) -> Result<Self> {
		Self::with_config(bus, address, StdDelay, Config::default())
	}
}

impl<B: I2cBus, D: Delay> Eeprom24c32<B, D> {
	pub fn with_config(bus: B, address: u8, delay: D, config: Config) -> Result<Self> {
		let address = I2cAddress::new(address).ok_or(Error::InvalidArgument)?;
		if 0 == config.poll_interval_ms {
			return Err(Error::InvalidArgument);
		}
		Ok(Eeprom24c32 {
			bus,
			address,
			delay,
			config,
		})
	}

	pub fn address(&self) -> I2cAddress {
		self.address
	}

	pub fn config(&self) -> &Config {
		&self.config
	}

	/// Give the transport back
	pub fn release(self) -> B {
		self.bus
	}

	/// Read `data.len()` bytes starting at `address` (single transaction)
	pub fn read(&mut self, address: u16, data: &mut [u8]) -> Result<()> {
		check_range(address, data.len())?;

		trace!("I2C {}: read {} bytes at 0x{:04x}", self.address, data.len(), address);
		let prefix = address.to_be_bytes();
		self.bus.write_read(self.address, &prefix, data).map_err(|e| {
			debug!("I2C {}: read at 0x{:04x} failed: {}", self.address, address, e);
			Error::from(e)
		})
	}

	pub fn read_byte(&mut self, address: u16) -> Result<u8> {
		let mut data = [0u8];
		self.read(address, &mut data)?;
		Ok(data[0])
	}

	/// Write at most one page; `address..address+data.len()` must not cross a
	/// page boundary.
	///
	/// Doesn't wait for the write cycle: the device won't respond until it is
	/// done (see `is_ready` and `wait_ready`).
	pub fn write_page(&mut self, address: u16, data: &[u8]) -> Result<()> {
		check_range(address, data.len())?;

		let len = data.len();
		if len > PAGE_SIZE_BYTES {
			return Err(Error::InvalidArgument);
		}
		if usize::from(address) + len > page_start(address) + PAGE_SIZE_BYTES {
			return Err(Error::InvalidArgument);
		}

		let mut buffer = [0u8; 2 + PAGE_SIZE_BYTES];
		buffer[..2].copy_from_slice(&address.to_be_bytes());
		buffer[2..2 + len].copy_from_slice(data);

		trace!("I2C {}: page write of {} bytes at 0x{:04x}", self.address, len, address);
		self.bus.write(self.address, &buffer[..2 + len]).map_err(|e| {
			debug!("I2C {}: page write at 0x{:04x} failed: {}", self.address, address, e);
			Error::from(e)
		})
	}

	/// Write `data` starting at `address`, splitting it at page boundaries
	/// and waiting for each write cycle to complete.
	///
	/// Stops at the first failing page; earlier pages stay written.
	pub fn write(&mut self, address: u16, data: &[u8]) -> Result<()> {
		check_range(address, data.len())?;

		for chunk in Chunks::new(address, data.len()) {
			self.write_page(chunk.address, &data[chunk.range()])?;
			self.wait_ready()?;
		}
		Ok(())
	}

	pub fn write_byte(&mut self, address: u16, data: u8) -> Result<()> {
		self.write(address, &[data])
	}

	/// Whether the device acknowledges a (one byte) read.
	///
	/// Not acknowledging (or similar bus failures) means the device is busy
	/// with a write cycle; other bus errors count as ready so the next real
	/// transaction reports them.
	pub fn is_ready(&mut self) -> bool {
		let mut dummy = [0u8];
		match self.bus.read(self.address, &mut dummy) {
			Ok(()) => true,
			Err(e) if e.indicates_busy_device() => {
				trace!("I2C {}: busy ({})", self.address, e);
				false
			},
			Err(e) => {
				debug!("I2C {}: readiness probe failed: {}", self.address, e);
				true
			},
		}
	}

	/// Poll `is_ready` until it succeeds or the write cycle time is used up.
	///
	/// Elapsed time is only counted through the configured delay; with a
	/// delay that doesn't sleep the budget is just an iteration limit.
	pub fn wait_ready(&mut self) -> Result<()> {
		let mut elapsed_ms = 0u32;
		while !self.is_ready() {
			if elapsed_ms >= self.config.write_cycle_time_ms {
				warn!("I2C {}: still busy after {}ms write cycle", self.address, elapsed_ms);
				return Err(Error::WriteTimeout);
			}
			self.delay.delay_ms(self.config.poll_interval_ms);
			elapsed_ms = elapsed_ms.saturating_add(self.config.poll_interval_ms);
		}
		Ok(())
	}

	/// `std::io` view of the EEPROM starting at `position`
	pub fn cursor(&mut self, position: u16) -> EepromCursor<'_, B, D> {
		EepromCursor::new(self, position)
	}
}
