//! Load action
//!
//! An asynchronous value holder with single-flight loading.
//!
//! # Loading
//! Calling any of the load methods while the action is ready starts its
//! loader on the dispatch context. Calling them while it's already loading
//! doesn't start a new load, the caller's completion is instead queued
//! onto the load in flight. Once the load finishes, the state is updated,
//! observers are notified and every queued completion is called, in the
//! order it was queued, with the same result.
//!
//! There is no way to cancel a load once started.
//!
//! # State
//! A successful load replaces the value and clears the error, while a
//! failed load only sets the error, so the last good value stays available.

// Modules
#[cfg(test)]
mod tests;

// Imports
use {
	crate::{
		CompletionLoadAction,
		DisplayState,
		LoadError,
		LoadMode,
		LoadResult,
		LoadStatus,
		Loadable,
		Loader,
		Observer,
		ObserverId,
		ProcessLoadAction,
		Properties,
		Property,
		dispatch,
		loading_count::LoadingGuard,
		observer::Observers,
	},
	core::{any::Any, cell::RefCell, fmt, future::Future, mem},
	futures::{FutureExt, channel::oneshot, future::LocalBoxFuture},
	std::{
		collections::VecDeque,
		rc::{Rc, Weak},
		time::SystemTime,
	},
};

/// Completion called with the result of a load
pub type Completion<T> = Box<dyn FnOnce(LoadResult<T>)>;

/// Inner state
struct State<T> {
	/// Value
	value: Option<T>,

	/// Error
	error: Option<LoadError>,

	/// Status
	status: LoadStatus,

	/// Last time the value was set
	updated_at: Option<SystemTime>,

	/// Properties changed since the last notification
	changed: Properties,

	/// Completions waiting on the current load
	completions: VecDeque<Completion<T>>,

	/// Observers
	observers: Observers,

	/// Loading guard, while loading
	loading: Option<LoadingGuard>,
}

impl<T> State<T> {
	/// Sets the status
	fn set_status(&mut self, status: LoadStatus) {
		self.status = status;
		self.changed.insert(Property::Status);
	}

	/// Sets the error
	fn set_error(&mut self, error: Option<LoadError>) {
		self.error = error;
		self.changed.insert(Property::Error);
	}

	/// Sets the value.
	///
	/// Setting a value also updates the date.
	fn set_value(&mut self, value: Option<T>) {
		if value.is_some() {
			self.updated_at = Some(SystemTime::now());
			self.changed.insert(Property::Date);
		}
		self.value = value;
		self.changed.insert(Property::Value);
	}

	/// Records a successful load
	fn record_success(&mut self, value: T) {
		self.set_value(Some(value));
		self.set_error(None);
	}

	/// Records a failed load.
	///
	/// The previous value is kept.
	fn record_failure(&mut self, error: LoadError) {
		self.set_error(Some(error));
	}
}

/// Shared
struct Shared<T> {
	/// State
	state: RefCell<State<T>>,

	/// Loader
	loader: Box<dyn Loader<T>>,
}

/// Load action
pub struct LoadAction<T> {
	/// Shared
	shared: Rc<Shared<T>>,
}

impl<T: Clone + 'static> LoadAction<T> {
	/// Creates a new action from a load function
	pub fn new<F, Fut>(load: F) -> Self
	where
		F: Fn() -> Fut + 'static,
		Fut: Future<Output = LoadResult<T>> + 'static,
	{
		Self::from_loader(move |_cx: LoadCx<T>| load())
	}

	/// Creates a new action from a loader
	pub fn from_loader<L: Loader<T>>(loader: L) -> Self {
		let state = State {
			value:       None,
			error:       None,
			status:      LoadStatus::Ready,
			updated_at:  None,
			changed:     Properties::empty(),
			completions: VecDeque::new(),
			observers:   Observers::default(),
			loading:     None,
		};
		let shared = Shared {
			state:  RefCell::new(state),
			loader: Box::new(loader),
		};
		Self {
			shared: Rc::new(shared),
		}
	}

	/// Creates an action that always loads `value`
	pub fn ready(value: T) -> Self {
		Self::new(move || futures::future::ready(LoadResult::Ok(value.clone())))
	}

	/// Creates an action that always fails with `error`
	pub fn failed(error: LoadError) -> Self {
		Self::new(move || futures::future::ready(LoadResult::Err(error.clone())))
	}

	/// Returns a copy of the value
	#[must_use]
	pub fn value(&self) -> Option<T> {
		self.with_value(|value| value.cloned())
	}

	/// Uses the value
	pub fn with_value<O>(&self, f: impl FnOnce(Option<&T>) -> O) -> O {
		let state = self.shared.state.borrow();
		f(state.value.as_ref())
	}

	/// Returns the last error
	#[must_use]
	pub fn error(&self) -> Option<LoadError> {
		self.shared.state.borrow().error.clone()
	}

	/// Returns the status
	#[must_use]
	pub fn status(&self) -> LoadStatus {
		self.shared.state.borrow().status
	}

	/// Returns if loading
	#[must_use]
	pub fn is_loading(&self) -> bool {
		self.status() == LoadStatus::Loading
	}

	/// Returns when the value was last updated
	#[must_use]
	pub fn updated_at(&self) -> Option<SystemTime> {
		self.shared.state.borrow().updated_at
	}

	/// Returns what a view should display for this action
	#[must_use]
	pub fn display_state(&self) -> DisplayState {
		self.display_state_by(|_| false)
	}

	/// Returns what a view should display for this action.
	///
	/// Values for which `is_empty` returns true are displayed as if there was no value.
	pub fn display_state_by(&self, is_empty: impl FnOnce(&T) -> bool) -> DisplayState {
		let state = self.shared.state.borrow();
		let has_value = state.value.as_ref().is_some_and(|value| !is_empty(value));
		DisplayState::new(has_value, state.status, state.error.clone())
	}

	/// Returns a unique identifier to this action.
	///
	/// Cloning and downgrading the action retains the same id
	#[must_use]
	pub fn id(&self) -> usize {
		Rc::as_ptr(&self.shared).addr()
	}

	/// Downgrades this action
	#[must_use]
	pub fn downgrade(&self) -> WeakLoadAction<T> {
		WeakLoadAction {
			shared: Rc::downgrade(&self.shared),
		}
	}

	/// Loads the value.
	///
	/// If already loading, waits on the load in flight.
	///
	/// The load starts immediately, even if the returned future isn't polled.
	///
	/// # Panics
	/// With `rt-tokio`, panics if a load must be started outside of a `LocalSet`.
	pub fn load(&self) -> LocalBoxFuture<'static, LoadResult<T>> {
		self.load_mode(LoadMode::Normal)
	}

	/// Loads a new value, bypassing any shortcuts.
	///
	/// If already loading, waits on the load in flight.
	///
	/// # Panics
	/// With `rt-tokio`, panics if a load must be started outside of a `LocalSet`.
	pub fn load_new(&self) -> LocalBoxFuture<'static, LoadResult<T>> {
		self.load_mode(LoadMode::Forced)
	}

	/// Loads the value with `mode`.
	///
	/// # Panics
	/// With `rt-tokio`, panics if a load must be started outside of a `LocalSet`.
	pub fn load_mode(&self, mode: LoadMode) -> LocalBoxFuture<'static, LoadResult<T>> {
		let (tx, rx) = oneshot::channel();
		self.load_inner(
			mode,
			Some(Box::new(move |res: LoadResult<T>| {
				// Note: The receiver may have been dropped, if the caller doesn't care.
				_ = tx.send(res);
			})),
		);

		async move { rx.await.unwrap_or(Err(LoadError::Dropped)) }.boxed_local()
	}

	/// Loads the value and calls `completion` with the result.
	///
	/// If already loading, `completion` is queued onto the load in flight.
	///
	/// # Panics
	/// With `rt-tokio`, panics if a load must be started outside of a `LocalSet`.
	pub fn load_with<F>(&self, mode: LoadMode, completion: F)
	where
		F: FnOnce(LoadResult<T>) + 'static,
	{
		self.load_inner(mode, Some(Box::new(completion)));
	}

	/// Starts loading, if not already loading.
	///
	/// # Panics
	/// With `rt-tokio`, panics if a load must be started outside of a `LocalSet`.
	pub fn start_loading(&self, mode: LoadMode) {
		self.load_inner(mode, None);
	}

	/// Inner function for all loads
	fn load_inner(&self, mode: LoadMode, completion: Option<Completion<T>>) {
		tracing::debug!(action = self.id(), ?mode, "Load began");

		let mut state = self.shared.state.borrow_mut();
		if let Some(completion) = completion {
			state.completions.push_back(completion);
		}

		// If we're already loading, the completion will be called once it finishes
		if state.status == LoadStatus::Loading {
			drop(state);
			tracing::debug!(action = self.id(), "Load batched");
			self.send_updates(false);
			return;
		}

		state.set_status(LoadStatus::Loading);
		state.loading = Some(LoadingGuard::acquire());
		drop(state);
		self.send_updates(false);

		// Note: The task keeps the action alive until the load finishes or is abandoned.
		let cx = LoadCx {
			mode,
			action: self.downgrade(),
		};
		let fut = self.shared.loader.load(cx);
		let flight = Flight {
			action: Some(self.clone()),
		};
		dispatch::spawn(async move {
			let res = fut.await;
			flight.finish(res);
		});
	}

	/// Finishes the load in flight with `res`
	fn finish(&self, res: LoadResult<T>) {
		let completions = self.record_result(&res);
		for completion in completions {
			completion(res.clone());
		}
	}

	/// Abandons the load in flight.
	///
	/// The load is recorded as failed with [`LoadError::Dropped`], and its
	/// completions are dropped without being called, so anyone waiting on
	/// them sees the load as dropped.
	fn abandon(&self) {
		tracing::warn!(action = self.id(), "Load abandoned");
		let completions = self.record_result(&Err(LoadError::Dropped));
		drop(completions);
	}

	/// Records the result of the load in flight and notifies observers.
	///
	/// Returns the completions waiting on it.
	fn record_result(&self, res: &LoadResult<T>) -> VecDeque<Completion<T>> {
		let completions = {
			let mut state = self.shared.state.borrow_mut();
			match res {
				Ok(value) => {
					tracing::debug!(action = self.id(), "Loaded success");
					state.record_success(value.clone());
				},
				Err(err) => {
					tracing::error!(action = self.id(), %err, "Loaded failure");
					state.record_failure(err.clone());
				},
			}
			state.set_status(LoadStatus::Ready);
			state.loading = None;

			// Note: Completions queued from within the completions belong to the next load.
			mem::take(&mut state.completions)
		};

		self.send_updates(false);
		completions
	}

	/// Adds an observer.
	///
	/// If `notify_now`, the observer is immediately notified with no changes,
	/// so it can initialize itself. Adding an observer twice returns the
	/// existing id and doesn't notify it.
	pub fn add_observer(&self, observer: &Rc<dyn Observer>, notify_now: bool) -> ObserverId {
		let (id, added) = self.shared.state.borrow_mut().observers.add(observer);
		if added && notify_now {
			observer.updated(self, Properties::empty());
		}

		id
	}

	/// Removes an observer.
	///
	/// Returns if the observer was registered.
	pub fn remove_observer(&self, id: ObserverId) -> bool {
		self.shared.state.borrow_mut().observers.remove(id)
	}

	/// Returns the number of registered observers
	#[must_use]
	pub fn observer_count(&self) -> usize {
		self.shared.state.borrow().observers.len()
	}

	/// Sends pending changes to all observers.
	///
	/// If nothing changed, nothing is sent, unless `forced`.
	pub fn send_updates(&self, forced: bool) {
		let (changed, observers) = {
			let mut state = self.shared.state.borrow_mut();
			if state.changed.is_empty() && !forced {
				return;
			}

			let changed = mem::take(&mut state.changed);
			(changed, state.observers.live())
		};

		tracing::trace!(action = self.id(), ?changed, observers = observers.len(), "Sending updates");
		for observer in observers {
			observer.updated(self, changed);
		}
	}

	/// Processes the loaded value with `transform`.
	///
	/// See [`ProcessLoadAction`].
	#[must_use]
	pub fn then<U, F, E>(&self, transform: F) -> LoadAction<U>
	where
		U: Clone + 'static,
		F: Fn(T) -> Result<U, E> + 'static,
		E: Into<LoadError>,
	{
		ProcessLoadAction::new(self.clone(), transform).into_action()
	}

	/// Chains another action onto the loaded value.
	///
	/// See [`CompletionLoadAction`].
	#[must_use]
	pub fn and_then<U, F, E>(&self, continuation: F) -> LoadAction<U>
	where
		U: Clone + 'static,
		F: Fn(T) -> Result<LoadAction<U>, E> + 'static,
		E: Into<LoadError>,
	{
		CompletionLoadAction::new(self.clone(), continuation).into_action()
	}

	/// Type-erases this action
	#[must_use]
	pub fn erased(&self) -> Box<dyn Loadable> {
		Box::new(self.clone())
	}
}

impl<T> Clone for LoadAction<T> {
	fn clone(&self) -> Self {
		Self {
			shared: Rc::clone(&self.shared),
		}
	}
}

impl<T> PartialEq for LoadAction<T> {
	fn eq(&self, other: &Self) -> bool {
		Rc::ptr_eq(&self.shared, &other.shared)
	}
}

impl<T> Eq for LoadAction<T> {}

impl<T: fmt::Debug> fmt::Debug for LoadAction<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let mut s = f.debug_struct("LoadAction");
		match self.shared.state.try_borrow() {
			Ok(state) => s
				.field("status", &state.status)
				.field("value", &state.value)
				.field("error", &state.error)
				.field("updated_at", &state.updated_at)
				.finish_non_exhaustive(),
			Err(_) => s.finish_non_exhaustive(),
		}
	}
}

impl<T: Clone + 'static> Loadable for LoadAction<T> {
	fn status(&self) -> LoadStatus {
		Self::status(self)
	}

	fn error(&self) -> Option<LoadError> {
		Self::error(self)
	}

	fn updated_at(&self) -> Option<SystemTime> {
		Self::updated_at(self)
	}

	fn has_value(&self) -> bool {
		self.shared.state.borrow().value.is_some()
	}

	fn value_any(&self) -> Option<Box<dyn Any>> {
		self.value().map(|value| Box::new(value) as Box<dyn Any>)
	}

	fn load_any(&self, mode: LoadMode) -> LocalBoxFuture<'static, LoadResult<Box<dyn Any>>> {
		self.load_mode(mode)
			.map(|res| res.map(|value| Box::new(value) as Box<dyn Any>))
			.boxed_local()
	}

	fn add_observer(&self, observer: &Rc<dyn Observer>, notify_now: bool) -> ObserverId {
		Self::add_observer(self, observer, notify_now)
	}

	fn remove_observer(&self, id: ObserverId) -> bool {
		Self::remove_observer(self, id)
	}

	fn send_updates(&self, forced: bool) {
		Self::send_updates(self, forced);
	}
}

/// Load in flight.
///
/// Owned by the task running the load. If the task is dropped before the
/// load finishes, such as when the dispatch context shuts down, the load is
/// abandoned, so the action doesn't stay loading forever.
struct Flight<T: Clone + 'static> {
	/// Action being loaded
	action: Option<LoadAction<T>>,
}

impl<T: Clone + 'static> Flight<T> {
	/// Finishes this load with `res`
	fn finish(mut self, res: LoadResult<T>) {
		if let Some(action) = self.action.take() {
			action.finish(res);
		}
	}
}

impl<T: Clone + 'static> Drop for Flight<T> {
	fn drop(&mut self) {
		if let Some(action) = self.action.take() {
			action.abandon();
		}
	}
}

/// Weak load action
pub struct WeakLoadAction<T> {
	/// Shared
	shared: Weak<Shared<T>>,
}

impl<T> WeakLoadAction<T> {
	/// Upgrades this action
	#[must_use]
	pub fn upgrade(&self) -> Option<LoadAction<T>> {
		let shared = self.shared.upgrade()?;
		Some(LoadAction { shared })
	}
}

impl<T> Clone for WeakLoadAction<T> {
	fn clone(&self) -> Self {
		Self {
			shared: Weak::clone(&self.shared),
		}
	}
}

impl<T> fmt::Debug for WeakLoadAction<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("WeakLoadAction").finish_non_exhaustive()
	}
}

/// Load context.
///
/// Passed to a loader for each load. Gives access to the load mode, and
/// lets composite loaders publish intermediate state on their own action
/// while the load is still in flight.
pub struct LoadCx<T> {
	/// Mode
	mode: LoadMode,

	/// Action being loaded
	action: WeakLoadAction<T>,
}

impl<T: Clone + 'static> LoadCx<T> {
	/// Returns the load mode
	#[must_use]
	pub const fn mode(&self) -> LoadMode {
		self.mode
	}

	/// Returns if this load is forced
	#[must_use]
	pub const fn is_forced(&self) -> bool {
		self.mode.is_forced()
	}

	/// Returns the action being loaded
	#[must_use]
	pub fn action(&self) -> Option<LoadAction<T>> {
		self.action.upgrade()
	}

	/// Publishes a provisional value to observers.
	///
	/// The value is visible until the load finishes, at which point it's
	/// replaced on success, or kept on failure.
	pub fn publish_provisional(&self, value: T) {
		let Some(action) = self.action() else { return };
		action.shared.state.borrow_mut().set_value(Some(value));
		action.send_updates(false);
	}

	/// Records an intermediate value and error, without notifying observers.
	pub fn record_progress(&self, value: Option<T>, error: Option<LoadError>) {
		let Some(action) = self.action() else { return };
		let mut state = action.shared.state.borrow_mut();
		state.set_value(value);
		state.set_error(error);
	}

	/// Sends any pending changes to observers
	pub fn send_updates(&self) {
		if let Some(action) = self.action() {
			action.send_updates(false);
		}
	}
}

impl<T> Clone for LoadCx<T> {
	fn clone(&self) -> Self {
		Self {
			mode:   self.mode,
			action: self.action.clone(),
		}
	}
}

impl<T> fmt::Debug for LoadCx<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("LoadCx").field("mode", &self.mode).finish_non_exhaustive()
	}
}
