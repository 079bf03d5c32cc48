//! In-memory model of a 24C32 on its own bus.
//!
//! Behaves like the real part where the driver can tell the difference:
//! - the first two bytes of every write latch the (12-bit) address counter
//! - payload bytes roll over within the addressed page
//! - reads continue from the address counter and roll over at the array end
//! - after a page write the device doesn't acknowledge anything for a while
//!
//! Every transaction (including NACKed ones) is recorded.

use super::{
	BusError,
	I2cAddress,
	I2cBus,
};
use crate::eeprom::{
	PAGE_SIZE_BYTES,
	SIZE_BYTES,
};

const ADDRESS_MASK: usize = SIZE_BYTES - 1;

#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum Transaction {
	Write {
		address: I2cAddress,
		bytes: Vec<u8>,
	},
	Read {
		address: I2cAddress,
		len: usize,
	},
	WriteRead {
		address: I2cAddress,
		bytes: Vec<u8>,
		len: usize,
	},
}

#[derive(Clone, Debug)]
pub struct MemoryEeprom {
	address: I2cAddress,
	data: Vec<u8>,
	counter: usize,
	busy_cycles: u32,
	busy_remaining: u32,
	page_writes: usize,
	fail_write: Option<(usize, BusError)>,
	transactions: Vec<Transaction>,
}

impl MemoryEeprom {
	/// Erased (all 0xff) device answering at `address`
	pub fn new(address: I2cAddress) -> Self {
		MemoryEeprom {
			address,
			data: vec![0xff; SIZE_BYTES],
			counter: 0,
			busy_cycles: 0,
			busy_remaining: 0,
			page_writes: 0,
			fail_write: None,
			transactions: Vec::new(),
		}
	}

	/// Number of transactions NACKed after each page write
	pub fn set_busy_cycles(&mut self, cycles: u32) -> &mut Self {
		self.busy_cycles = cycles;
		self
	}

	/// Let the page write with index `index` (counting from zero) fail with
	/// `error` without storing anything
	pub fn fail_page_write(&mut self, index: usize, error: BusError) -> &mut Self {
		self.fail_write = Some((index, error));
		self
	}

	pub fn contents(&self) -> &[u8] {
		&self.data
	}

	pub fn contents_mut(&mut self) -> &mut [u8] {
		&mut self.data
	}

	pub fn transactions(&self) -> &[Transaction] {
		&self.transactions
	}

	pub fn clear_transactions(&mut self) {
		self.transactions.clear();
	}

	/// Page writes the device accepted
	pub fn page_writes(&self) -> usize {
		self.page_writes
	}

	pub fn is_busy(&self) -> bool {
		self.busy_remaining > 0
	}

	// returns Err if the device doesn't acknowledge its address
	fn select(&mut self, address: I2cAddress) -> Result<(), BusError> {
		if address != self.address {
			return Err(BusError::NoResponse);
		}
		if self.busy_remaining > 0 {
			self.busy_remaining -= 1;
			return Err(BusError::NoResponse);
		}
		Ok(())
	}

	fn latch_address(&mut self, bytes: &[u8]) {
		if bytes.len() >= 2 {
			self.counter = ((usize::from(bytes[0]) << 8) | usize::from(bytes[1])) & ADDRESS_MASK;
		}
	}

	fn store(&mut self, payload: &[u8]) {
		let page_start = self.counter & !(PAGE_SIZE_BYTES - 1);
		let mut in_page = self.counter - page_start;
		for &b in payload {
			self.data[page_start + in_page] = b;
			in_page = (in_page + 1) % PAGE_SIZE_BYTES;
		}
		self.counter = page_start + in_page;
	}

	fn fetch(&mut self, buffer: &mut [u8]) {
		for b in buffer.iter_mut() {
			*b = self.data[self.counter];
			self.counter = (self.counter + 1) & ADDRESS_MASK;
		}
	}
}

impl I2cBus for MemoryEeprom {
	fn write(&mut self, address: I2cAddress, bytes: &[u8]) -> Result<(), BusError> {
		self.transactions.push(Transaction::Write {
			address,
			bytes: bytes.to_vec(),
		});
		self.select(address)?;
		if bytes.len() <= 2 {
			// address only ("dummy write")
			self.latch_address(bytes);
			return Ok(());
		}

		let index = self.page_writes;
		if let Some((fail_index, error)) = self.fail_write {
			if fail_index == index {
				self.fail_write = None;
				return Err(error);
			}
		}

		self.latch_address(bytes);
		self.store(&bytes[2..]);
		self.page_writes += 1;
		self.busy_remaining = self.busy_cycles;
		Ok(())
	}

	fn read(&mut self, address: I2cAddress, buffer: &mut [u8]) -> Result<(), BusError> {
		self.transactions.push(Transaction::Read {
			address,
			len: buffer.len(),
		});
		self.select(address)?;
		self.fetch(buffer);
		Ok(())
	}

	fn write_read(&mut self, address: I2cAddress, bytes: &[u8], buffer: &mut [u8]) -> Result<(), BusError> {
		self.transactions.push(Transaction::WriteRead {
			address,
			bytes: bytes.to_vec(),
			len: buffer.len(),
		});
		self.select(address)?;
		self.latch_address(bytes);
		self.fetch(buffer);
		Ok(())
	}
}

#[cfg(test)]
mod test {
	use super::*;

	fn device() -> (MemoryEeprom, I2cAddress) {
		let address = I2cAddress::new(0x50).unwrap();
		(MemoryEeprom::new(address), address)
	}

	#[test]
	fn write_then_read_back() {
		let (mut dev, a) = device();
		dev.write(a, &[0x01, 0x00, 0xaa, 0xbb, 0xcc]).unwrap();
		let mut buf = [0u8; 4];
		dev.write_read(a, &[0x01, 0x00], &mut buf).unwrap();
		assert_eq!(buf, [0xaa, 0xbb, 0xcc, 0xff]);
		assert_eq!(dev.page_writes(), 1);
	}

	#[test]
	fn payload_rolls_over_within_page() {
		let (mut dev, a) = device();
		dev.write(a, &[0x00, 0x1e, 1, 2, 3, 4]).unwrap();
		assert_eq!(&dev.contents()[0x1e..0x20], &[1, 2]);
		assert_eq!(&dev.contents()[0x00..0x02], &[3, 4]);
		assert_eq!(dev.contents()[0x20], 0xff);
	}

	#[test]
	fn high_address_bits_ignored() {
		let (mut dev, a) = device();
		dev.write(a, &[0xf0, 0x05, 0x42]).unwrap();
		assert_eq!(dev.contents()[0x005], 0x42);
	}

	#[test]
	fn sequential_read_wraps_at_end() {
		let (mut dev, a) = device();
		dev.contents_mut()[SIZE_BYTES - 1] = 0x11;
		dev.contents_mut()[0] = 0x22;
		let mut buf = [0u8; 2];
		dev.write_read(a, &[0x0f, 0xff], &mut buf).unwrap();
		assert_eq!(buf, [0x11, 0x22]);
		// current address read continues
		let mut next = [0u8; 1];
		dev.read(a, &mut next).unwrap();
		assert_eq!(next, [0xff]);
	}

	#[test]
	fn busy_after_write() {
		let (mut dev, a) = device();
		dev.set_busy_cycles(2);
		dev.write(a, &[0x00, 0x00, 0x01]).unwrap();
		assert!(dev.is_busy());
		let mut buf = [0u8; 1];
		assert_eq!(dev.read(a, &mut buf), Err(BusError::NoResponse));
		assert_eq!(dev.read(a, &mut buf), Err(BusError::NoResponse));
		assert_eq!(dev.read(a, &mut buf), Ok(()));
		assert!(!dev.is_busy());
		assert_eq!(dev.transactions().len(), 4);
	}

	#[test]
	fn wrong_address_not_acknowledged() {
		let (mut dev, _) = device();
		let other = I2cAddress::new(0x51).unwrap();
		assert_eq!(dev.write(other, &[0x00, 0x00, 0x01]), Err(BusError::NoResponse));
		assert_eq!(dev.page_writes(), 0);
		assert_eq!(dev.contents()[0], 0xff);
	}

	#[test]
	fn injected_failure() {
		let (mut dev, a) = device();
		dev.fail_page_write(1, BusError::HardwareFailure);
		dev.write(a, &[0x00, 0x00, 0x01]).unwrap();
		assert_eq!(dev.write(a, &[0x00, 0x20, 0x02]), Err(BusError::HardwareFailure));
		assert_eq!(dev.contents()[0x00], 0x01);
		assert_eq!(dev.contents()[0x20], 0xff);
		assert_eq!(dev.page_writes(), 1);
	}
}
