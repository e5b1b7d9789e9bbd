//! Load status

// Imports
use crate::LoadError;

/// Load status
#[derive(PartialEq, Eq, Clone, Copy, Default, Debug, Hash)]
pub enum LoadStatus {
	/// Not loading
	#[default]
	Ready,

	/// Loading
	Loading,
}

/// What a view displaying an action should show
#[derive(Clone, Debug)]
pub enum DisplayState {
	/// A (non-empty) value is available
	Loaded,

	/// No value yet, but loading
	Loading,

	/// No value, and the last load failed
	Error(LoadError),

	/// No value, not loading, and no error
	Empty,
}

impl DisplayState {
	/// Computes the display state from an action's state.
	///
	/// A value takes priority over everything else, so stale values stay
	/// visible while reloading or after a failure.
	#[must_use]
	pub fn new(has_value: bool, status: LoadStatus, error: Option<LoadError>) -> Self {
		match (has_value, status, error) {
			(true, ..) => Self::Loaded,
			(false, LoadStatus::Loading, _) => Self::Loading,
			(false, LoadStatus::Ready, Some(err)) => Self::Error(err),
			(false, LoadStatus::Ready, None) => Self::Empty,
		}
	}

	/// Returns if this is [`Self::Loaded`]
	#[must_use]
	pub const fn is_loaded(&self) -> bool {
		matches!(self, Self::Loaded)
	}
}
