//! Group reducers
//!
//! Reducers compute a group's value and error from the current state of
//! all of its children. They're called after each child finishes loading,
//! so must only read the children's state.

// Imports
use crate::{LoadError, Loadable};

/// Marker value for groups that don't produce a value
#[derive(PartialEq, Eq, Clone, Copy, Default, Debug, Hash)]
pub struct Ignored;

/// Extension trait for reading the state of group children
#[extend::ext(name = LoadableChildren)]
pub impl [Box<dyn Loadable>] {
	/// Returns the first value of type `T`, in list order
	fn first_value<T: 'static>(&self) -> Option<T> {
		self.iter().find_map(|child| child.value::<T>())
	}

	/// Returns the last value of type `T`, in list order
	fn last_value<T: 'static>(&self) -> Option<T> {
		self.iter().rev().find_map(|child| child.value::<T>())
	}

	/// Returns the first error, in list order
	fn first_error(&self) -> Option<LoadError> {
		self.iter().find_map(|child| child.error())
	}
}

/// Value reducer that ignores all values
#[must_use]
pub fn ignore(_children: &[Box<dyn Loadable>]) -> Option<Ignored> {
	Some(Ignored)
}

/// Value reducer that uses the first child with a value
#[must_use]
pub fn first_value<T: 'static>(children: &[Box<dyn Loadable>]) -> Option<T> {
	children.first_value()
}

/// Value reducer that uses the last child with a value
#[must_use]
pub fn last_value<T: 'static>(children: &[Box<dyn Loadable>]) -> Option<T> {
	children.last_value()
}

/// Error reducer that uses the first child with an error
#[must_use]
pub fn first_error(children: &[Box<dyn Loadable>]) -> Option<LoadError> {
	children.first_error()
}
