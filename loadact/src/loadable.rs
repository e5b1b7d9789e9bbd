//! Loadable
//!
//! Type-erased capability shared by every action, regardless of its value type.

// Imports
use {
	crate::{DisplayState, LoadError, LoadMode, LoadResult, LoadStatus, Observer, ObserverId},
	core::any::Any,
	futures::future::LocalBoxFuture,
	std::{rc::Rc, time::SystemTime},
};

/// Loadable
pub trait Loadable: 'static {
	/// Returns the current status
	fn status(&self) -> LoadStatus;

	/// Returns the last error
	fn error(&self) -> Option<LoadError>;

	/// Returns when the value was last updated
	fn updated_at(&self) -> Option<SystemTime>;

	/// Returns if a value is present
	fn has_value(&self) -> bool;

	/// Returns a copy of the value, type-erased
	fn value_any(&self) -> Option<Box<dyn Any>>;

	/// Loads this action, type-erasing the value
	fn load_any(&self, mode: LoadMode) -> LocalBoxFuture<'static, LoadResult<Box<dyn Any>>>;

	/// Adds an observer.
	///
	/// If `notify_now`, the observer is immediately notified with no changes.
	fn add_observer(&self, observer: &Rc<dyn Observer>, notify_now: bool) -> ObserverId;

	/// Removes an observer.
	///
	/// Returns if the observer was registered.
	fn remove_observer(&self, id: ObserverId) -> bool;

	/// Sends pending changes to all observers.
	///
	/// If nothing changed, nothing is sent, unless `forced`.
	fn send_updates(&self, forced: bool);

	/// Returns if loading
	fn is_loading(&self) -> bool {
		self.status() == LoadStatus::Loading
	}

	/// Returns what a view should display for this action
	fn display_state(&self) -> DisplayState {
		DisplayState::new(self.has_value(), self.status(), self.error())
	}
}

impl<'a> dyn Loadable + 'a {
	/// Returns a copy of the value, if it has type `T`.
	#[must_use]
	pub fn value<T: 'static>(&self) -> Option<T> {
		let value = self.value_any()?;
		value.downcast::<T>().ok().map(|value| *value)
	}
}
