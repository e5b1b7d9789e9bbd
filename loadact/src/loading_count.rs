//! Loading count
//!
//! Process-wide count of loads in flight across all actions.
//!
//! The count starts at 0 and is only ever changed through a
//! [`LoadingGuard`], which each action acquires when it starts loading
//! and releases when the load finishes or is abandoned.

// Imports
use {
	crate::LoadStatus,
	std::sync::LazyLock,
	tokio::sync::watch,
};

/// Count
static COUNT: LazyLock<watch::Sender<usize>> = LazyLock::new(|| watch::Sender::new(0));

/// Returns the number of loads in flight
#[must_use]
pub fn count() -> usize {
	*COUNT.borrow()
}

/// Returns the aggregate status of all actions.
///
/// This is [`LoadStatus::Loading`] while any action is loading.
#[must_use]
pub fn status() -> LoadStatus {
	match self::count() {
		0 => LoadStatus::Ready,
		_ => LoadStatus::Loading,
	}
}

/// Subscribes to changes of the count
#[must_use]
pub fn subscribe() -> watch::Receiver<usize> {
	COUNT.subscribe()
}

/// Guard over a single load in flight.
///
/// Releases its count on drop.
#[derive(Debug)]
pub struct LoadingGuard {
	/// Private
	_priv: (),
}

impl LoadingGuard {
	/// Acquires a new guard, increasing the count
	pub(crate) fn acquire() -> Self {
		COUNT.send_modify(|count| *count += 1);
		Self { _priv: () }
	}
}

impl Drop for LoadingGuard {
	fn drop(&mut self) {
		COUNT.send_modify(|count| match count.checked_sub(1) {
			Some(new_count) => *count = new_count,
			None => tracing::error!("Loading count was released more times than acquired"),
		});
	}
}
