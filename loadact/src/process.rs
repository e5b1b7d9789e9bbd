//! Process load action
//!
//! Loads a base action and transforms its value.

// Modules
pub mod helpers;

// Imports
use {
	crate::{LoadAction, LoadCx, LoadError, LoadResult, Loader},
	futures::{FutureExt, future::LocalBoxFuture},
	std::rc::Rc,
};

/// Process load action
pub struct ProcessLoadAction<A, T> {
	/// Base action
	base: LoadAction<A>,

	/// Transform
	transform: Rc<dyn Fn(A) -> LoadResult<T>>,
}

impl<A: Clone + 'static, T: Clone + 'static> ProcessLoadAction<A, T> {
	/// Creates a new process action.
	///
	/// Failures of `base` are passed through unchanged, while failures of
	/// `transform` become this action's failure.
	pub fn new<F, E>(base: LoadAction<A>, transform: F) -> Self
	where
		F: Fn(A) -> Result<T, E> + 'static,
		E: Into<LoadError>,
	{
		Self {
			base,
			transform: Rc::new(move |value| transform(value).map_err(Into::into)),
		}
	}

	/// Returns the base action
	#[must_use]
	pub const fn base(&self) -> &LoadAction<A> {
		&self.base
	}

	/// Creates an action that loads through this process
	#[must_use]
	pub fn into_action(self) -> LoadAction<T> {
		LoadAction::from_loader(self)
	}
}

impl<A: Clone + 'static, T: Clone + 'static> Loader<T> for ProcessLoadAction<A, T> {
	fn load(&self, cx: LoadCx<T>) -> LocalBoxFuture<'static, LoadResult<T>> {
		let base = self.base.load_mode(cx.mode());
		let transform = Rc::clone(&self.transform);
		async move {
			let value = base.await?;
			transform(value).inspect_err(|err| tracing::debug!(%err, "Process failed"))
		}
		.boxed_local()
	}
}
