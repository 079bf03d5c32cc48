#[macro_use]
extern crate failure;
#[macro_use]
extern crate log;

macro_rules! with_context {
	(( $fmt:tt $($t:tt)* ), $e:expr) => {{
		use failure::Error;

		match (|| { $e })() {
			Ok(v) => Ok(v),
			Err(e) => {
				let e: Error = e;
				let msg = format!(concat!($fmt, ": {}") $($t)*, e);
				Err(Error::from(e.context(msg)))
			}
		}
	}};

	($msg:expr, $e:expr) => {
		with_context!(("{}", $msg), $e)
	};
}

pub type AResult<T> = Result<T, failure::Error>;

pub mod eeprom;
pub mod i2c;
pub mod image;

pub use self::eeprom::Eeprom24c32;

/// Parse an unsigned number, either decimal or hexadecimal with a `0x` prefix
pub fn parse_number(s: &str) -> AResult<u32> {
	let s = s.trim();
	ensure!(!s.is_empty(), "empty number");
	if s.starts_with("0x") || s.starts_with("0X") {
		with_context!(("invalid hexadecimal number {:?}", s),
			Ok(u32::from_str_radix(&s[2..], 16)?)
		)
	} else {
		with_context!(("invalid number {:?}", s),
			Ok(s.parse::<u32>()?)
		)
	}
}

#[cfg(test)]
mod test {
	use super::parse_number;

	#[test]
	fn parse_numbers() {
		assert_eq!(parse_number("0").unwrap(), 0);
		assert_eq!(parse_number("4095").unwrap(), 4095);
		assert_eq!(parse_number("0x50").unwrap(), 0x50);
		assert_eq!(parse_number("0XfF").unwrap(), 0xff);
		assert_eq!(parse_number(" 12 ").unwrap(), 12);
		assert!(parse_number("").is_err());
		assert!(parse_number("0x").is_err());
		assert!(parse_number("-1").is_err());
		assert!(parse_number("0x1g").is_err());
	}
}
