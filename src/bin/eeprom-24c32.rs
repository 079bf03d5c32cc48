#[macro_use]
extern crate clap;
#[macro_use]
extern crate failure;
#[macro_use]
extern crate log;

extern crate eeprom_24c32;
use eeprom_24c32::*;

use std::fs;
use std::io::{
	self,
	Write,
};
use std::process::exit;

use eeprom_24c32::eeprom::{
	DEFAULT_ADDRESS,
	SIZE_BYTES,
};
use eeprom_24c32::i2c::{
	I2cAddress,
	I2cBus,
	MemoryEeprom,
};

const DEFAULT_BUS: &str = "/dev/i2c-1";

fn get_param(matches: &clap::ArgMatches, name: &str) -> AResult<u32> {
	let param = match matches.value_of(name) {
		Some(p) => p,
		None => bail!("missing parameter {}", name),
	};
	parse_number(param).map_err(|e| {
		let msg = format!("invalid parameter {}: {}", name, e);
		e.context(msg).into()
	})
}

fn get_address(matches: &clap::ArgMatches, name: &str) -> AResult<u16> {
	let address = get_param(matches, name)?;
	ensure!((address as usize) < SIZE_BYTES, "{} 0x{:x} out of range (EEPROM has {} bytes)", name, address, SIZE_BYTES);
	Ok(address as u16)
}

fn parse_hex_bytes(s: &str) -> AResult<Vec<u8>> {
	let digits: String = s.chars().filter(|c| !c.is_whitespace() && *c != ':' && *c != ',').collect();
	ensure!(digits.is_ascii(), "invalid hex digits in {:?}", s);
	let digits = if digits.starts_with("0x") { &digits[2..] } else { &digits[..] };
	ensure!(!digits.is_empty(), "no data bytes given");
	ensure!(0 == digits.len() % 2, "odd number of hex digits in {:?}", s);
	let mut bytes = Vec::with_capacity(digits.len() / 2);
	for pair in digits.as_bytes().chunks(2) {
		let pair = std::str::from_utf8(pair)?;
		let byte = u8::from_str_radix(pair, 16).map_err(|e| {
			format_err!("invalid hex byte {:?}: {}", pair, e)
		})?;
		bytes.push(byte);
	}
	Ok(bytes)
}

// checked before allocating the buffer
fn read_buffer(address: u16, length: u32) -> AResult<Vec<u8>> {
	let length = length as usize;
	eeprom::check_range(address, length)?;
	Ok(vec![0u8; length])
}

fn open_eeprom<B: I2cBus>(bus: B, address: I2cAddress) -> AResult<Eeprom24c32<B>> {
	Ok(Eeprom24c32::new(bus, address.get())?)
}

fn read(ee: &mut Eeprom24c32<impl I2cBus>, sub_m: &clap::ArgMatches) -> AResult<()> {
	let address = get_address(sub_m, "OFFSET")?;
	let mut buf = read_buffer(address, get_param(sub_m, "LENGTH")?)?;
	ee.read(address, &mut buf)?;
	image::hexdump(&mut io::stdout(), usize::from(address), &buf)?;
	Ok(())
}

fn dump(ee: &mut Eeprom24c32<impl I2cBus>) -> AResult<()> {
	let data = image::dump(ee)?;
	io::stdout().write_all(&data)?;
	Ok(())
}

fn write(ee: &mut Eeprom24c32<impl I2cBus>, sub_m: &clap::ArgMatches) -> AResult<()> {
	let address = get_address(sub_m, "OFFSET")?;
	let data = parse_hex_bytes(sub_m.value_of("DATA").unwrap_or(""))?;
	ee.write(address, &data)?;
	info!("I2C {}: wrote {} bytes at 0x{:04x}", ee.address(), data.len(), address);
	Ok(())
}

fn program(ee: &mut Eeprom24c32<impl I2cBus>, sub_m: &clap::ArgMatches) -> AResult<()> {
	let address = if sub_m.is_present("offset") { get_address(sub_m, "offset")? } else { 0 };
	let file = sub_m.value_of("FILE").unwrap_or("");
	let data = fs::read(file).map_err(|e| {
		format_err!("read image file {:?}: {}", file, e)
	})?;
	image::program(ee, address, &data)
}

fn erase(ee: &mut Eeprom24c32<impl I2cBus>, sub_m: &clap::ArgMatches) -> AResult<()> {
	let fill = if sub_m.is_present("fill") { get_param(sub_m, "fill")? } else { 0xff };
	ensure!(fill <= 0xff, "fill value 0x{:x} doesn't fit into a byte", fill);
	let pages = image::erase(ee, fill as u8)?;
	info!("I2C {}: {} pages erased", ee.address(), pages);
	Ok(())
}

/// Exit status 2 if the device doesn't respond
fn probe(ee: &mut Eeprom24c32<impl I2cBus>) -> AResult<i32> {
	if ee.is_ready() {
		println!("I2C {}: ready", ee.address());
		Ok(0)
	} else {
		println!("I2C {}: not responding", ee.address());
		Ok(2)
	}
}

/// Returns the process exit status
fn run<B: I2cBus>(bus: B, address: I2cAddress, matches: &clap::ArgMatches) -> AResult<i32> {
	let mut ee = open_eeprom(bus, address)?;

	match matches.subcommand() {
		("read", Some(sub_m)) => read(&mut ee, sub_m)?,
		("dump", _) => dump(&mut ee)?,
		("write", Some(sub_m)) => write(&mut ee, sub_m)?,
		("program", Some(sub_m)) => program(&mut ee, sub_m)?,
		("erase", Some(sub_m)) => erase(&mut ee, sub_m)?,
		("probe", _) => return probe(&mut ee),
		("", _) => bail!("no subcommand"),
		(cmd, _) => bail!("not implemented subcommand {:?}", cmd),
	}
	Ok(0)
}

fn main_app() -> AResult<i32> {
	let matches = clap_app!(@app (app_from_crate!())
		(@setting SubcommandRequiredElseHelp)
		(global_setting: clap::AppSettings::VersionlessSubcommands)
		(@arg bus: -b --bus +takes_value "I2C bus device (path or bus number; default /dev/i2c-1)")
		(@arg address: -a --address +takes_value "7-bit device address (default 0x50)")
		(@arg simulate: --simulate "use an in-memory EEPROM instead of hardware")
		(@subcommand read =>
			(about: "read bytes and print them as hex dump")
			(@arg OFFSET: +required "EEPROM address to start at")
			(@arg LENGTH: +required "number of bytes to read")
		)
		(@subcommand dump =>
			(about: "dump the whole EEPROM as binary to stdout")
		)
		(@subcommand write =>
			(about: "write bytes")
			(@arg OFFSET: +required "EEPROM address to start at")
			(@arg DATA: +required "bytes as hex digits (e.g. \"de ad be ef\")")
		)
		(@subcommand program =>
			(about: "write a binary image and verify it")
			(@arg offset: -o --offset +takes_value "EEPROM address to start at (default 0)")
			(@arg FILE: +required "image file")
		)
		(@subcommand erase =>
			(about: "fill the whole EEPROM")
			(@arg fill: -f --fill +takes_value "fill byte (default 0xff)")
		)
		(@subcommand probe =>
			(about: "check whether the EEPROM acknowledges")
		)
	).get_matches();

	let address: I2cAddress = match matches.value_of("address") {
		Some(a) => a.parse()?,
		None => I2cAddress::new(DEFAULT_ADDRESS).ok_or_else(|| format_err!("invalid default address"))?,
	};

	if matches.is_present("simulate") {
		let mut sim = MemoryEeprom::new(address);
		sim.set_busy_cycles(2);
		return run(&mut sim, address, &matches);
	}

	open_hardware(matches.value_of("bus").unwrap_or(DEFAULT_BUS), address, &matches)
}

#[cfg(target_os = "linux")]
fn open_hardware(bus: &str, address: I2cAddress, matches: &clap::ArgMatches) -> AResult<i32> {
	let dev = i2c::linux::open_bus_by_name(bus)?;
	run(dev, address, matches)
}

#[cfg(not(target_os = "linux"))]
fn open_hardware(bus: &str, _address: I2cAddress, _matches: &clap::ArgMatches) -> AResult<i32> {
	bail!("I2C bus {}: hardware access only supported on linux (try --simulate)", bus)
}

fn main() {
	env_logger::from_env(env_logger::Env::default().default_filter_or("info")).init();

	match main_app() {
		Ok(0) => (),
		Ok(status) => exit(status),
		Err(e) => {
			error!("Error: {}", e);
			exit(1);
		},
	}
}
