use std::io;
use std::sync::{Arc, Weak};
use std::thread;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

use crate::cache::Inner;

/// Stop flag shared between a [`Sweeper`] handle and its thread.
#[derive(Default)]
pub(crate) struct Signal {
	stopped: Mutex<bool>,
	cvar: Condvar,
}

impl Signal {
	pub fn stop(&self) {
		*self.stopped.lock() = true;
		self.cvar.notify_all();
	}

	pub fn is_stopped(&self) -> bool {
		*self.stopped.lock()
	}

	/// Sleep for `interval` or until stopped. Returns true if stopped.
	fn wait(&self, interval: Duration) -> bool {
		let deadline = Instant::now().checked_add(interval);
		let mut stopped = self.stopped.lock();
		while !*stopped {
			match deadline {
				Some(deadline) => {
					if self.cvar.wait_until(&mut stopped, deadline).timed_out() {
						break;
					}
				}
				None => self.cvar.wait(&mut stopped),
			}
		}
		*stopped
	}
}

/// Handle to the periodic sweep thread.
///
/// The thread only holds a `Weak` reference to the cache, so it never keeps
/// the cache alive. Dropping the handle stops the thread at its next wake-up,
/// which happens immediately since the stop is signalled through the condvar.
pub(crate) struct Sweeper {
	signal: Arc<Signal>,
}

impl Sweeper {
	/// Start a thread that calls [`Inner::sweep_tick`] every `interval`.
	pub fn spawn(inner: Weak<Inner>, interval: Duration) -> io::Result<Self> {
		let signal = Arc::new(Signal::default());
		let thread_signal = Arc::clone(&signal);

		thread::Builder::new().name("smart-cache-sweeper".into()).spawn(move || {
			loop {
				if thread_signal.wait(interval) {
					return;
				}
				// Cache dropped while we slept
				let Some(inner) = inner.upgrade() else {
					return;
				};
				if !inner.sweep_tick(&thread_signal) {
					return;
				}
			}
		})?;

		Ok(Self {
			signal,
		})
	}
}

impl Drop for Sweeper {
	fn drop(&mut self) {
		self.signal.stop();
	}
}
