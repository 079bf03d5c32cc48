use std::fmt;
use std::str;

/// 7-bit I²C device address (without the R/W bit)
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct I2cAddress(u8);

impl I2cAddress {
	pub const MAX: u8 = 0x7f;

	pub fn new(address: u8) -> Option<Self> {
		if address > Self::MAX {
			None
		} else {
			Some(I2cAddress(address))
		}
	}

	pub fn get(&self) -> u8 {
		self.0
	}
}

impl fmt::Display for I2cAddress {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "0x{:02x}", self.0)
	}
}

impl str::FromStr for I2cAddress {
	type Err = ::failure::Error;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let value = with_context!(("invalid I2C address: {}", s),
			crate::parse_number(s)
		)?;
		ensure!(value <= u32::from(Self::MAX), "invalid I2C address: {} (not a 7-bit address)", s);
		Ok(I2cAddress(value as u8))
	}
}
