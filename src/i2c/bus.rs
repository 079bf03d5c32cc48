use failure::Fail;

use super::I2cAddress;

/// Outcome of a failed bus transaction
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Fail)]
pub enum BusError {
	#[fail(display = "bus transaction timed out")]
	Timeout,
	#[fail(display = "no acknowledge from device")]
	NoResponse,
	#[fail(display = "transmission error")]
	TransmissionError,
	#[fail(display = "bus busy")]
	Busy,
	#[fail(display = "bus not initialized")]
	NotInitialized,
	#[fail(display = "bus not configured")]
	NotConfigured,
	#[fail(display = "invalid argument for bus transaction")]
	InvalidArgument,
	#[fail(display = "bus hardware failure")]
	HardwareFailure,
	#[fail(display = "unspecified bus error")]
	Other,
}

impl BusError {
	/// Whether a failed probe means the device didn't answer because it is
	/// still busy (e.g. with an internal write cycle)
	pub fn indicates_busy_device(&self) -> bool {
		match *self {
			BusError::NoResponse
			| BusError::TransmissionError
			| BusError::Busy
			| BusError::Timeout => true,
			BusError::NotInitialized
			| BusError::NotConfigured
			| BusError::InvalidArgument
			| BusError::HardwareFailure
			| BusError::Other => false,
		}
	}
}

/// I²C bus master; each call is a single atomic transaction (START ... STOP).
///
/// Implementations are expected to serialize transactions themselves.
pub trait I2cBus {
	/// Send `bytes` to the device.
	fn write(&mut self, address: I2cAddress, bytes: &[u8]) -> Result<(), BusError>;

	/// Fill `buffer` with bytes received from the device.
	fn read(&mut self, address: I2cAddress, buffer: &mut [u8]) -> Result<(), BusError>;

	/// Send `bytes`, then (repeated START) fill `buffer` from the device.
	fn write_read(&mut self, address: I2cAddress, bytes: &[u8], buffer: &mut [u8]) -> Result<(), BusError>;
}

impl<'a, B: ?Sized + I2cBus> I2cBus for &'a mut B {
	fn write(&mut self, address: I2cAddress, bytes: &[u8]) -> Result<(), BusError> {
		B::write(*self, address, bytes)
	}
	fn read(&mut self, address: I2cAddress, buffer: &mut [u8]) -> Result<(), BusError> {
		B::read(*self, address, buffer)
	}
	fn write_read(&mut self, address: I2cAddress, bytes: &[u8], buffer: &mut [u8]) -> Result<(), BusError> {
		B::write_read(*self, address, bytes, buffer)
	}
}

#[cfg(test)]
mod test {
	use super::BusError;

	#[test]
	fn busy_classification() {
		assert!(BusError::NoResponse.indicates_busy_device());
		assert!(BusError::TransmissionError.indicates_busy_device());
		assert!(BusError::Busy.indicates_busy_device());
		assert!(BusError::Timeout.indicates_busy_device());
		assert!(!BusError::HardwareFailure.indicates_busy_device());
		assert!(!BusError::NotInitialized.indicates_busy_device());
		assert!(!BusError::NotConfigured.indicates_busy_device());
		assert!(!BusError::InvalidArgument.indicates_busy_device());
		assert!(!BusError::Other.indicates_busy_device());
	}
}
