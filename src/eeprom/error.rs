use failure::Fail;

use crate::i2c::BusError;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Fail)]
pub enum Error {
	/// Empty request, oversized or page-crossing page write, invalid bus address
	#[fail(display = "invalid argument")]
	InvalidArgument,
	/// Request exceeds the EEPROM capacity
	#[fail(display = "address out of range")]
	AddressOutOfRange,
	#[fail(display = "I2C communication error: {}", _0)]
	I2c(BusError),
	/// Device didn't become ready within the write cycle time, or the bus
	/// timed out
	#[fail(display = "write timeout")]
	WriteTimeout,
}

impl From<BusError> for Error {
	fn from(e: BusError) -> Self {
		match e {
			BusError::Timeout => Error::WriteTimeout,
			BusError::InvalidArgument => Error::InvalidArgument,
			BusError::NoResponse
			| BusError::TransmissionError
			| BusError::Busy
			| BusError::NotInitialized
			| BusError::NotConfigured
			| BusError::HardwareFailure
			| BusError::Other => Error::I2c(e),
		}
	}
}
