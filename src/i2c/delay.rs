use std::thread;
use std::time::{
	Duration,
	Instant,
};

pub fn reliable_sleep(mut duration: Duration) {
	loop {
		let now = Instant::now();
		thread::sleep(duration);
		let elapsed = now.elapsed();
		if elapsed >= duration {
			return;
		}
		duration -= elapsed;
	}
}

/// Blocking delay used between readiness polls
pub trait Delay {
	fn delay_ms(&mut self, ms: u32);
}

/// Sleeps the current thread (for at least the requested time)
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct StdDelay;

impl Delay for StdDelay {
	fn delay_ms(&mut self, ms: u32) {
		reliable_sleep(Duration::from_millis(u64::from(ms)));
	}
}

/// Doesn't wait at all; the poll budget then only counts iterations
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct NoDelay;

impl Delay for NoDelay {
	fn delay_ms(&mut self, _ms: u32) {
	}
}

impl<F: FnMut(u32)> Delay for F {
	fn delay_ms(&mut self, ms: u32) {
		self(ms)
	}
}
