//! Observers
//!
//! Observers are registered on an action by weak reference and receive
//! a notification each time the action sends its pending changes.
//!
//! The action never keeps an observer alive: once the last strong
//! reference to an observer is dropped, it simply stops being notified.

// Imports
use {
	crate::{Loadable, Properties},
	std::rc::{Rc, Weak},
};

/// Observer
pub trait Observer: 'static {
	/// Called when `action` changed.
	///
	/// An empty `changed` set asks the observer to initialize itself
	/// from the action's current state.
	fn updated(&self, action: &dyn Loadable, changed: Properties);
}

impl<F> Observer for F
where
	F: Fn(&dyn Loadable, Properties) + 'static,
{
	fn updated(&self, action: &dyn Loadable, changed: Properties) {
		self(action, changed);
	}
}

/// Observer registration id
#[derive(PartialEq, Eq, Clone, Copy, Debug, Hash)]
pub struct ObserverId(u64);

/// Observer list
#[derive(Default)]
pub(crate) struct Observers {
	/// Registrations
	entries: Vec<(ObserverId, Weak<dyn Observer>)>,

	/// Next id
	next_id: u64,
}

impl Observers {
	/// Adds an observer.
	///
	/// Returns its id, and whether it was newly added.
	/// Adding the same observer twice returns the existing id.
	pub fn add(&mut self, observer: &Rc<dyn Observer>) -> (ObserverId, bool) {
		let ptr = Rc::as_ptr(observer).cast::<()>();
		if let Some(&(id, _)) = self
			.entries
			.iter()
			.find(|(_, entry)| Weak::as_ptr(entry).cast::<()>() == ptr && entry.strong_count() != 0)
		{
			return (id, false);
		}

		let id = ObserverId(self.next_id);
		self.next_id += 1;
		self.entries.push((id, Rc::downgrade(observer)));

		(id, true)
	}

	/// Removes an observer.
	///
	/// Returns if it existed.
	pub fn remove(&mut self, id: ObserverId) -> bool {
		let len = self.entries.len();
		self.entries.retain(|&(entry_id, _)| entry_id != id);
		self.entries.len() != len
	}

	/// Returns all observers still alive, in registration order.
	///
	/// Dead registrations are removed.
	pub fn live(&mut self) -> Vec<Rc<dyn Observer>> {
		let mut live = Vec::with_capacity(self.entries.len());
		self.entries.retain(|(_, entry)| match entry.upgrade() {
			Some(observer) => {
				live.push(observer);
				true
			},
			None => false,
		});

		live
	}

	/// Returns the number of registrations, including dead ones
	pub fn len(&self) -> usize {
		self.entries.len()
	}
}
