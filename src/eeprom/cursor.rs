use std::cmp;
use std::io;

use super::{
	Eeprom24c32,
	Error,
	PAGE_SIZE_BYTES,
	SIZE_BYTES,
	page_start,
};
use crate::i2c::{
	Delay,
	I2cBus,
};

fn to_io_error(e: Error) -> io::Error {
	let kind = match e {
		Error::InvalidArgument | Error::AddressOutOfRange => io::ErrorKind::InvalidInput,
		Error::WriteTimeout => io::ErrorKind::TimedOut,
		Error::I2c(_) => io::ErrorKind::Other,
	};
	io::Error::new(kind, e.to_string())
}

/// Positioned `Read`/`Write`/`Seek` access; reads and writes stop at the end
/// of the EEPROM (short counts, then 0).
///
/// A single `write` call stores at most up to the end of the current page,
/// so an error always means nothing of that call was written.
pub struct EepromCursor<'a, B: 'a, D: 'a> {
	eeprom: &'a mut Eeprom24c32<B, D>,
	position: u64,
}

impl<'a, B: I2cBus, D: Delay> EepromCursor<'a, B, D> {
	pub(super) fn new(eeprom: &'a mut Eeprom24c32<B, D>, position: u16) -> Self {
		EepromCursor {
			eeprom,
			position: u64::from(position),
		}
	}

	pub fn position(&self) -> u64 {
		self.position
	}

	// (address, len) of the next transfer, None at the end
	fn next_span(&self, requested: usize) -> Option<(u16, usize)> {
		if 0 == requested || self.position >= SIZE_BYTES as u64 {
			return None;
		}
		let address = self.position as usize;
		Some((address as u16, cmp::min(requested, SIZE_BYTES - address)))
	}
}

impl<'a, B: I2cBus, D: Delay> io::Read for EepromCursor<'a, B, D> {
	fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
		let (address, len) = match self.next_span(buf.len()) {
			None => return Ok(0),
			Some(span) => span,
		};
		self.eeprom.read(address, &mut buf[..len]).map_err(to_io_error)?;
		self.position += len as u64;
		Ok(len)
	}
}

impl<'a, B: I2cBus, D: Delay> io::Write for EepromCursor<'a, B, D> {
	fn write(&mut self, data: &[u8]) -> io::Result<usize> {
		let (address, len) = match self.next_span(data.len()) {
			None => return Ok(0),
			Some(span) => span,
		};
		let len = cmp::min(len, page_start(address) + PAGE_SIZE_BYTES - usize::from(address));
		self.eeprom.write(address, &data[..len]).map_err(to_io_error)?;
		self.position += len as u64;
		Ok(len)
	}

	fn flush(&mut self) -> io::Result<()> {
		// `write` waits for the write cycles already
		Ok(())
	}
}

impl<'a, B: I2cBus, D: Delay> io::Seek for EepromCursor<'a, B, D> {
	fn seek(&mut self, pos: io::SeekFrom) -> io::Result<u64> {
		let (base, offset) = match pos {
			io::SeekFrom::Start(n) => {
				self.position = n;
				return Ok(n);
			},
			io::SeekFrom::End(n) => (SIZE_BYTES as u64, n),
			io::SeekFrom::Current(n) => (self.position, n),
		};
		let new_position = if offset >= 0 {
			base.checked_add(offset as u64)
		} else {
			base.checked_sub(offset.wrapping_neg() as u64)
		};
		match new_position {
			Some(n) => {
				self.position = n;
				Ok(n)
			},
			None => Err(io::Error::new(
				io::ErrorKind::InvalidInput,
				"invalid seek to a negative or overflowing position",
			)),
		}
	}
}

#[cfg(test)]
mod test {
	use std::io::{
		self,
		Read,
		Seek,
		SeekFrom,
		Write,
	};

	use crate::eeprom::{
		Config,
		Eeprom24c32,
		SIZE_BYTES,
	};
	use crate::i2c::{
		BusError,
		I2cAddress,
		MemoryEeprom,
		NoDelay,
	};

	fn device() -> MemoryEeprom {
		let mut dev = MemoryEeprom::new(I2cAddress::new(0x50).unwrap());
		dev.set_busy_cycles(1);
		dev
	}

	#[test]
	fn write_and_read() {
		let mut dev = device();
		{
			let mut ee = Eeprom24c32::with_config(&mut dev, 0x50, NoDelay, Config::default()).unwrap();
			{
				let mut c = ee.cursor(0x0020);
				c.write_all(b"hello ").unwrap();
				c.write_all(b"world").unwrap();
				assert_eq!(c.position(), 0x0020 + 11);
			}
			let mut c = ee.cursor(0x0020);
			let mut s = String::new();
			(&mut c).take(11).read_to_string(&mut s).unwrap();
			assert_eq!(s, "hello world");
		}
		assert_eq!(&dev.contents()[0x20..0x2b], b"hello world");
	}

	#[test]
	fn stops_at_end() {
		let mut dev = device();
		let mut ee = Eeprom24c32::with_config(&mut dev, 0x50, NoDelay, Config::default()).unwrap();
		let mut c = ee.cursor(0);
		assert_eq!(c.seek(SeekFrom::End(-4)).unwrap(), (SIZE_BYTES - 4) as u64);
		assert_eq!(c.write(&[1, 2, 3, 4, 5, 6]).unwrap(), 4);
		assert_eq!(c.write(&[7]).unwrap(), 0);
		let err = c.write_all(&[7]).unwrap_err();
		assert_eq!(err.kind(), io::ErrorKind::WriteZero);

		c.seek(SeekFrom::Current(-2)).unwrap();
		let mut buf = [0u8; 8];
		assert_eq!(c.read(&mut buf).unwrap(), 2);
		assert_eq!(&buf[..2], &[3, 4]);
		assert_eq!(c.read(&mut buf).unwrap(), 0);
	}

	#[test]
	fn read_whole_device() {
		let mut dev = device();
		dev.contents_mut()[SIZE_BYTES - 1] = 0x42;
		let mut ee = Eeprom24c32::with_config(&mut dev, 0x50, NoDelay, Config::default()).unwrap();
		let mut all = Vec::new();
		ee.cursor(0).read_to_end(&mut all).unwrap();
		assert_eq!(all.len(), SIZE_BYTES);
		assert_eq!(all[SIZE_BYTES - 1], 0x42);
	}

	#[test]
	fn seek_errors() {
		let mut dev = device();
		let mut ee = Eeprom24c32::with_config(&mut dev, 0x50, NoDelay, Config::default()).unwrap();
		let mut c = ee.cursor(10);
		assert!(c.seek(SeekFrom::Current(-11)).is_err());
		assert_eq!(c.position(), 10);
		assert_eq!(c.seek(SeekFrom::Start(5000)).unwrap(), 5000);
		let mut buf = [0u8; 1];
		assert_eq!(c.read(&mut buf).unwrap(), 0);
	}

	#[test]
	fn driver_errors() {
		let mut dev = device();
		dev.fail_page_write(0, BusError::HardwareFailure);
		let mut ee = Eeprom24c32::with_config(&mut dev, 0x50, NoDelay, Config::default()).unwrap();
		let err = ee.cursor(0).write(&[1]).unwrap_err();
		assert_eq!(err.kind(), io::ErrorKind::Other);
		assert_eq!(err.to_string(), "I2C communication error: bus hardware failure");
	}

	#[test]
	fn write_stops_at_page_end() {
		let mut dev = device();
		dev.fail_page_write(1, BusError::TransmissionError);
		{
			let mut ee = Eeprom24c32::with_config(&mut dev, 0x50, NoDelay, Config::default()).unwrap();
			let mut c = ee.cursor(0x0010);
			assert_eq!(c.write(&[0x11; 64]).unwrap(), 16);
			assert_eq!(c.position(), 0x0020);
			assert!(c.write(&[0x22; 48]).is_err());
			assert_eq!(c.position(), 0x0020);
		}
		assert!(dev.contents()[0x10..0x20].iter().all(|&b| b == 0x11));
		assert!(dev.contents()[0x20..0x40].iter().all(|&b| b == 0xff));
		assert_eq!(dev.page_writes(), 1);
	}

	#[test]
	fn write_all_spans_pages() {
		let mut dev = device();
		let data: Vec<u8> = (0..100u8).collect();
		{
			let mut ee = Eeprom24c32::with_config(&mut dev, 0x50, NoDelay, Config::default()).unwrap();
			ee.cursor(0x0018).write_all(&data).unwrap();
		}
		assert_eq!(&dev.contents()[0x18..0x18 + 100], &data[..]);
		assert_eq!(dev.page_writes(), 4);
	}

	#[test]
	fn timeout_maps_to_timed_out() {
		let mut dev = device();
		dev.set_busy_cycles(100);
		let mut ee = Eeprom24c32::with_config(&mut dev, 0x50, NoDelay, Config::default()).unwrap();
		let err = ee.cursor(0).write(&[1]).unwrap_err();
		assert_eq!(err.kind(), io::ErrorKind::TimedOut);
	}
}
