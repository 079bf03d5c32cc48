use std::cmp;
use std::ops::Range;

use super::{
	Error,
	PAGE_SIZE_BYTES,
	SIZE_BYTES,
};

/// Validates `length` bytes starting at `address` against the capacity.
///
/// Rejects empty requests with `InvalidArgument`; never computes
/// `address + length` (no overflow for huge lengths).
pub fn check_range(address: u16, length: usize) -> Result<(), Error> {
	if length == 0 {
		return Err(Error::InvalidArgument);
	}
	let address = usize::from(address);
	if address >= SIZE_BYTES || length > SIZE_BYTES - address {
		return Err(Error::AddressOutOfRange);
	}
	Ok(())
}

/// Index of the page containing `address`
pub fn page_of(address: u16) -> usize {
	usize::from(address) / PAGE_SIZE_BYTES
}

/// First address of the page containing `address`
pub fn page_start(address: u16) -> usize {
	usize::from(address) & !(PAGE_SIZE_BYTES - 1)
}

/// Part of a request that fits into a single page
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Chunk {
	/// EEPROM address of the first byte
	pub address: u16,
	/// offset of the first byte within the request data
	pub offset: usize,
	pub len: usize,
}

impl Chunk {
	/// Range of the request data covered by this chunk
	pub fn range(&self) -> Range<usize> {
		self.offset..self.offset + self.len
	}
}

/// Splits a request into page-aligned chunks: the first one runs up to the
/// end of its page, the following ones are full pages (except maybe the
/// last).
///
/// The request must have passed `check_range`.
#[derive(Clone, Debug)]
pub struct Chunks {
	address: usize,
	offset: usize,
	remaining: usize,
}

impl Chunks {
	pub fn new(address: u16, length: usize) -> Self {
		Chunks {
			address: usize::from(address),
			offset: 0,
			remaining: length,
		}
	}
}

impl Iterator for Chunks {
	type Item = Chunk;

	fn next(&mut self) -> Option<Self::Item> {
		if 0 == self.remaining {
			return None;
		}
		let bytes_to_page_end = PAGE_SIZE_BYTES - (self.address % PAGE_SIZE_BYTES);
		let len = cmp::min(self.remaining, bytes_to_page_end);
		let chunk = Chunk {
			address: self.address as u16,
			offset: self.offset,
			len,
		};
		self.address += len;
		self.offset += len;
		self.remaining -= len;
		Some(chunk)
	}

	fn size_hint(&self) -> (usize, Option<usize>) {
		if 0 == self.remaining {
			return (0, Some(0));
		}
		let first_page = self.address / PAGE_SIZE_BYTES;
		let last_page = (self.address + self.remaining - 1) / PAGE_SIZE_BYTES;
		let n = last_page - first_page + 1;
		(n, Some(n))
	}
}

impl ExactSizeIterator for Chunks {}
