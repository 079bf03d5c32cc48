use std::fs;
use std::io;
use std::os::unix::io::AsRawFd;
use std::path::{
	Path,
	PathBuf,
};

use libc::{
	c_int,
	c_ulong,
	ioctl,
};

use crate::i2c::{
	BusError,
	I2cAddress,
	I2cBus,
};

// <linux/i2c-dev.h>, <linux/i2c.h>
const I2C_FUNCS: c_ulong = 0x0705;
const I2C_RDWR: c_ulong = 0x0707;
const I2C_M_RD: u16 = 0x0001;
const I2C_FUNC_I2C: c_ulong = 0x0000_0001;

#[repr(C)]
struct I2cMsg {
	addr: u16,
	flags: u16,
	len: u16,
	buf: *mut u8,
}

#[repr(C)]
struct I2cRdwrIoctlData {
	msgs: *mut I2cMsg,
	nmsgs: u32,
}

pub(crate) fn errno_to_bus_error(errno: c_int) -> BusError {
	match errno {
		libc::ENXIO | libc::EREMOTEIO => BusError::NoResponse,
		libc::ETIMEDOUT => BusError::Timeout,
		libc::EBUSY | libc::EAGAIN => BusError::Busy,
		libc::EINVAL => BusError::InvalidArgument,
		libc::EIO | libc::EPROTO => BusError::TransmissionError,
		libc::ENODEV => BusError::NotInitialized,
		libc::EOPNOTSUPP => BusError::NotConfigured,
		_ => BusError::Other,
	}
}

fn msg_len(len: usize) -> Result<u16, BusError> {
	if len > usize::from(u16::max_value()) {
		return Err(BusError::InvalidArgument);
	}
	Ok(len as u16)
}

#[derive(Debug)]
pub struct I2cDev {
	file: fs::File,
	path: PathBuf,
}

impl I2cDev {
	pub fn path(&self) -> &Path {
		&self.path
	}

	fn transfer(&mut self, msgs: &mut [I2cMsg]) -> Result<(), BusError> {
		let mut data = I2cRdwrIoctlData {
			msgs: msgs.as_mut_ptr(),
			nmsgs: msgs.len() as u32,
		};
		let res = unsafe {
			ioctl(self.file.as_raw_fd(), I2C_RDWR as _, &mut data as *mut I2cRdwrIoctlData)
		};
		if res < 0 {
			let err = io::Error::last_os_error();
			let bus_error = errno_to_bus_error(err.raw_os_error().unwrap_or(0));
			trace!("I2C {}: transfer failed: {} ({})", self.path.display(), err, bus_error);
			return Err(bus_error);
		}
		Ok(())
	}
}

impl I2cBus for I2cDev {
	fn write(&mut self, address: I2cAddress, bytes: &[u8]) -> Result<(), BusError> {
		let mut msgs = [I2cMsg {
			addr: u16::from(address.get()),
			flags: 0,
			len: msg_len(bytes.len())?,
			// the kernel doesn't write through the buffer of a write message
			buf: bytes.as_ptr() as *mut u8,
		}];
		self.transfer(&mut msgs)
	}

	fn read(&mut self, address: I2cAddress, buffer: &mut [u8]) -> Result<(), BusError> {
		let mut msgs = [I2cMsg {
			addr: u16::from(address.get()),
			flags: I2C_M_RD,
			len: msg_len(buffer.len())?,
			buf: buffer.as_mut_ptr(),
		}];
		self.transfer(&mut msgs)
	}

	fn write_read(&mut self, address: I2cAddress, bytes: &[u8], buffer: &mut [u8]) -> Result<(), BusError> {
		let mut msgs = [
			I2cMsg {
				addr: u16::from(address.get()),
				flags: 0,
				len: msg_len(bytes.len())?,
				buf: bytes.as_ptr() as *mut u8,
			},
			I2cMsg {
				addr: u16::from(address.get()),
				flags: I2C_M_RD,
				len: msg_len(buffer.len())?,
				buf: buffer.as_mut_ptr(),
			},
		];
		self.transfer(&mut msgs)
	}
}

// TODO: exclusive open / file locking?
pub fn inner_open(path: &Path) -> crate::AResult<I2cDev> {
	let file = fs::OpenOptions::new()
		.read(true)
		.write(true)
		.open(path)?;

	let mut funcs: c_ulong = 0;
	let res = unsafe {
		ioctl(file.as_raw_fd(), I2C_FUNCS as _, &mut funcs as *mut c_ulong)
	};
	if res < 0 {
		return Err(io::Error::last_os_error().into());
	}
	ensure!(0 != funcs & I2C_FUNC_I2C, "adapter doesn't support plain I2C transfers (functionality: 0x{:08x})", funcs);

	debug!("I2C {}: opened (functionality: 0x{:08x})", path.display(), funcs);

	Ok(I2cDev {
		file,
		path: path.to_path_buf(),
	})
}
