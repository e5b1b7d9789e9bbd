//! Completion load action
//!
//! Loads a base action, and uses its value to create and load another action.

// Imports
use {
	crate::{LoadAction, LoadCx, LoadError, LoadResult, Loader},
	futures::{FutureExt, future::LocalBoxFuture},
	std::rc::Rc,
};

/// Completion load action
pub struct CompletionLoadAction<A, T> {
	/// Base action
	base: LoadAction<A>,

	/// Continuation
	continuation: Rc<dyn Fn(A) -> LoadResult<LoadAction<T>>>,
}

impl<A: Clone + 'static, T: Clone + 'static> CompletionLoadAction<A, T> {
	/// Creates a new completion action.
	///
	/// The action returned by `continuation` is loaded with the same mode
	/// as this action, and its result becomes this action's result.
	pub fn new<F, E>(base: LoadAction<A>, continuation: F) -> Self
	where
		F: Fn(A) -> Result<LoadAction<T>, E> + 'static,
		E: Into<LoadError>,
	{
		Self {
			base,
			continuation: Rc::new(move |value| continuation(value).map_err(Into::into)),
		}
	}

	/// Returns the base action
	#[must_use]
	pub const fn base(&self) -> &LoadAction<A> {
		&self.base
	}

	/// Creates an action that loads through this completion
	#[must_use]
	pub fn into_action(self) -> LoadAction<T> {
		LoadAction::from_loader(self)
	}
}

impl<A: Clone + 'static, T: Clone + 'static> Loader<T> for CompletionLoadAction<A, T> {
	fn load(&self, cx: LoadCx<T>) -> LocalBoxFuture<'static, LoadResult<T>> {
		let mode = cx.mode();
		let base = self.base.load_mode(mode);
		let continuation = Rc::clone(&self.continuation);
		async move {
			let value = base.await?;
			let next = continuation(value).inspect_err(|err| tracing::debug!(%err, "Continuation failed"))?;
			next.load_mode(mode).await
		}
		.boxed_local()
	}
}
