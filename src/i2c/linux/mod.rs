//! I²C bus masters exposed by the linux `i2c-dev` driver (`/dev/i2c-N`)

use std::path::Path;

mod dev;

pub use self::dev::I2cDev;

pub fn open_bus<P: AsRef<Path>>(path: P) -> crate::AResult<I2cDev> {
	let path = path.as_ref();
	with_context!(("open I2C bus {}", path.display()), {
		Ok(dev::inner_open(path)?)
	})
}

pub fn open_bus_number(bus: u32) -> crate::AResult<I2cDev> {
	open_bus(format!("/dev/i2c-{}", bus))
}

/// Accepts either a device path or a bare bus number
pub fn open_bus_by_name(name: &str) -> crate::AResult<I2cDev> {
	match name.parse::<u32>() {
		Ok(bus) => open_bus_number(bus),
		Err(_) => open_bus(name),
	}
}
