//! Loaders
//!
//! A loader is the strategy an action uses to actually produce a value.

// Imports
use {
	crate::{LoadCx, LoadResult},
	core::future::Future,
	futures::{FutureExt, future::LocalBoxFuture},
};

/// Load mode
#[derive(PartialEq, Eq, Clone, Copy, Default, Debug, Hash)]
pub enum LoadMode {
	/// Allow shortcuts, such as using a fresh cache
	#[default]
	Normal,

	/// Bypass any shortcuts and load from the authoritative source
	Forced,
}

impl LoadMode {
	/// Returns if this is [`Self::Forced`]
	#[must_use]
	pub const fn is_forced(self) -> bool {
		matches!(self, Self::Forced)
	}
}

/// Loader
pub trait Loader<T>: 'static {
	/// Starts a load.
	///
	/// The action polls the returned future exactly once to completion,
	/// and only one load per action is ever in flight.
	fn load(&self, cx: LoadCx<T>) -> LocalBoxFuture<'static, LoadResult<T>>;
}

impl<T, F, Fut> Loader<T> for F
where
	F: Fn(LoadCx<T>) -> Fut + 'static,
	Fut: Future<Output = LoadResult<T>> + 'static,
{
	fn load(&self, cx: LoadCx<T>) -> LocalBoxFuture<'static, LoadResult<T>> {
		self(cx).boxed_local()
	}
}
