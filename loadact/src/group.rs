//! Group load action
//!
//! Loads a heterogeneous list of actions, either in parallel or one at a
//! time, and reduces their state into a single value and error.
//!
//! After each child finishes, the value and error reducers are run over
//! all children and the result is recorded as the group's progress. Once
//! all children are done, the group finishes with the reduced error if
//! there is one, otherwise with the reduced value, or
//! [`CompositionError::NoValueProduced`] if neither exists.

// Modules
pub mod reducer;

// Exports
pub use self::reducer::{Ignored, LoadableChildren};

// Imports
use {
	crate::{CompositionError, LoadAction, LoadCx, LoadError, LoadResult, Loadable, Loader},
	core::fmt,
	futures::{FutureExt, StreamExt, future::LocalBoxFuture, stream::FuturesUnordered},
	std::rc::Rc,
};

/// Group order
#[derive(PartialEq, Eq, Clone, Copy, Default, Debug, Hash)]
pub enum GroupOrder {
	/// All children load at once
	#[default]
	Parallel,

	/// Children load one at a time, in order.
	///
	/// A failing child doesn't stop the rest from loading.
	Sequential,

	/// Children load one at a time, in order.
	///
	/// A failing child stops the rest from loading and fails the group.
	SequentialForced,
}

/// Value reducer
type ReduceValueFn<T> = dyn Fn(&[Box<dyn Loadable>]) -> Option<T>;

/// Error reducer
type ReduceErrorFn = dyn Fn(&[Box<dyn Loadable>]) -> Option<LoadError>;

/// Group load action
pub struct GroupLoadAction<T> {
	/// Order
	order: GroupOrder,

	/// Children
	children: Rc<[Box<dyn Loadable>]>,

	/// Value reducer
	reduce_value: Rc<ReduceValueFn<T>>,

	/// Error reducer
	reduce_error: Rc<ReduceErrorFn>,
}

impl GroupLoadAction<Ignored> {
	/// Creates a new group.
	///
	/// The group's value is [`Ignored`] and its error is the first error of
	/// its children, until other reducers are set.
	pub fn new<I>(order: GroupOrder, children: I) -> Self
	where
		I: IntoIterator<Item = Box<dyn Loadable>>,
	{
		Self {
			order,
			children: children.into_iter().collect(),
			reduce_value: Rc::new(reducer::ignore),
			reduce_error: Rc::new(reducer::first_error),
		}
	}
}

impl<T: Clone + 'static> GroupLoadAction<T> {
	/// Sets the value reducer
	#[must_use]
	pub fn reduce_value<U, F>(self, reduce_value: F) -> GroupLoadAction<U>
	where
		F: Fn(&[Box<dyn Loadable>]) -> Option<U> + 'static,
	{
		GroupLoadAction {
			order:        self.order,
			children:     self.children,
			reduce_value: Rc::new(reduce_value),
			reduce_error: self.reduce_error,
		}
	}

	/// Sets the error reducer
	#[must_use]
	pub fn reduce_error<F>(mut self, reduce_error: F) -> Self
	where
		F: Fn(&[Box<dyn Loadable>]) -> Option<LoadError> + 'static,
	{
		self.reduce_error = Rc::new(reduce_error);
		self
	}

	/// Returns the order
	#[must_use]
	pub const fn order(&self) -> GroupOrder {
		self.order
	}

	/// Returns the children
	#[must_use]
	pub fn children(&self) -> &[Box<dyn Loadable>] {
		&self.children
	}

	/// Creates an action that loads this group
	#[must_use]
	pub fn into_action(self) -> LoadAction<T> {
		LoadAction::from_loader(self)
	}

	/// Reduces the children's state and records it as progress
	fn reduce(&self, cx: &LoadCx<T>) -> Reduced<T> {
		let value = (self.reduce_value)(self.children());
		let error = (self.reduce_error)(self.children());
		cx.record_progress(value.clone(), error.clone());

		Reduced { value, error }
	}

	/// Loads all children at once
	async fn load_parallel(self, cx: LoadCx<T>) -> LoadResult<T> {
		let mut pending = self
			.children
			.iter()
			.map(|child| child.load_any(cx.mode()))
			.collect::<FuturesUnordered<_>>();

		let mut reduced = None;
		while pending.next().await.is_some() {
			reduced = Some(self.reduce(&cx));
			if !pending.is_empty() {
				cx.send_updates();
			}
		}

		// Note: Without any children, we still need to reduce once
		reduced.unwrap_or_else(|| self.reduce(&cx)).finish()
	}

	/// Loads all children one at a time
	async fn load_sequential(self, cx: LoadCx<T>) -> LoadResult<T> {
		let mut reduced = None;
		for (idx, child) in self.children.iter().enumerate() {
			let res = child.load_any(cx.mode()).await;
			let cur = self.reduce(&cx);

			if self.order == GroupOrder::SequentialForced &&
				let Err(err) = res
			{
				tracing::debug!(child = idx, %err, "Group child failed, stopping");
				return Err(cur.error.unwrap_or_else(|| CompositionError::NoErrorProduced.into()));
			}

			if idx + 1 < self.children.len() {
				cx.send_updates();
			}
			reduced = Some(cur);
		}

		reduced.unwrap_or_else(|| self.reduce(&cx)).finish()
	}
}

impl<T: Clone + 'static> Loader<T> for GroupLoadAction<T> {
	fn load(&self, cx: LoadCx<T>) -> LocalBoxFuture<'static, LoadResult<T>> {
		let this = self.clone();
		match self.order {
			GroupOrder::Parallel => this.load_parallel(cx).boxed_local(),
			GroupOrder::Sequential | GroupOrder::SequentialForced => this.load_sequential(cx).boxed_local(),
		}
	}
}

impl<T> Clone for GroupLoadAction<T> {
	fn clone(&self) -> Self {
		Self {
			order:        self.order,
			children:     Rc::clone(&self.children),
			reduce_value: Rc::clone(&self.reduce_value),
			reduce_error: Rc::clone(&self.reduce_error),
		}
	}
}

impl<T> fmt::Debug for GroupLoadAction<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("GroupLoadAction")
			.field("order", &self.order)
			.field("children", &self.children.len())
			.finish_non_exhaustive()
	}
}

/// Reduced state of a group
struct Reduced<T> {
	/// Value
	value: Option<T>,

	/// Error
	error: Option<LoadError>,
}

impl<T> Reduced<T> {
	/// Finishes a group load with this state
	fn finish(self) -> LoadResult<T> {
		match (self.error, self.value) {
			(Some(err), _) => Err(err),
			(None, Some(value)) => Ok(value),
			(None, None) => Err(CompositionError::NoValueProduced.into()),
		}
	}
}
