//! Whole-device helpers on top of the driver: program with verify, dump,
//! erase and hex dump output.

use std::io;

use crate::eeprom::{
	Eeprom24c32,
	PAGE_SIZE_BYTES,
	SIZE_BYTES,
};
use crate::i2c::{
	Delay,
	I2cBus,
};

/// Write `image` at `address` and verify it by reading it back
pub fn program<B, D>(eeprom: &mut Eeprom24c32<B, D>, address: u16, image: &[u8]) -> crate::AResult<()>
where
	B: I2cBus,
	D: Delay,
{
	ensure!(!image.is_empty(), "Empty image");
	ensure!(usize::from(address) + image.len() <= SIZE_BYTES,
		"Image of {} bytes at 0x{:04x} doesn't fit into EEPROM ({} bytes)", image.len(), address, SIZE_BYTES
	);

	let device = eeprom.address();
	with_context!(("I2C {}: write image at 0x{:04x}", device, address), {
		eeprom.write(address, image)?;
		Ok(())
	})?;

	let mut flash = vec![0u8; image.len()];
	with_context!(("I2C {}: read back image at 0x{:04x}", device, address), {
		eeprom.read(address, &mut flash)?;
		Ok(())
	})?;
	for (offset, (&expected, &actual)) in image.iter().zip(flash.iter()).enumerate() {
		ensure!(expected == actual,
			"Verify failed at {:04x}: expected {:02x}, EEPROM is {:02x}", usize::from(address) + offset, expected, actual
		);
	}

	info!("I2C {}: wrote and verified {} bytes at 0x{:04x}", device, image.len(), address);
	Ok(())
}

/// Read the full EEPROM contents
pub fn dump<B, D>(eeprom: &mut Eeprom24c32<B, D>) -> crate::AResult<Vec<u8>>
where
	B: I2cBus,
	D: Delay,
{
	let device = eeprom.address();
	let mut buf = vec![0u8; SIZE_BYTES];
	with_context!(("I2C {}: read EEPROM", device), {
		eeprom.read(0, &mut buf)?;
		Ok(())
	})?;
	Ok(buf)
}

/// Fill the whole EEPROM with `fill`; pages already filled aren't written.
///
/// Returns the number of pages written.
pub fn erase<B, D>(eeprom: &mut Eeprom24c32<B, D>, fill: u8) -> crate::AResult<usize>
where
	B: I2cBus,
	D: Delay,
{
	let device = eeprom.address();
	let current = dump(eeprom)?;
	let page = [fill; PAGE_SIZE_BYTES];
	let mut written = 0;

	for (index, data) in current.chunks(PAGE_SIZE_BYTES).enumerate() {
		if data.iter().all(|&b| b == fill) {
			continue;
		}
		let address = (index * PAGE_SIZE_BYTES) as u16;
		with_context!(("I2C {}: erase page at 0x{:04x}", device, address), {
			eeprom.write(address, &page)?;
			Ok(())
		})?;
		written += 1;
	}

	debug!("I2C {}: erased {} pages with 0x{:02x}", device, written, fill);
	Ok(written)
}

/// 16 bytes per line, offset column relative to `base`
pub fn hexdump<W: io::Write>(w: &mut W, base: usize, data: &[u8]) -> io::Result<()> {
	for (line, bytes) in data.chunks(16).enumerate() {
		write!(w, "{:04x} ", base + line * 16)?;
		for (i, b) in bytes.iter().enumerate() {
			if 8 == i {
				write!(w, " ")?;
			}
			write!(w, " {:02x}", b)?;
		}
		writeln!(w)?;
	}
	Ok(())
}
