//! Test utilities

// Imports
use {
	crate::{LoadAction, LoadCx, LoadMode, LoadResult},
	core::{cell::RefCell, future::Future},
	futures::channel::oneshot,
	std::{collections::VecDeque, rc::Rc},
	tokio::task::LocalSet,
};

/// Runs `fut` within a local set, with logging enabled
pub async fn run_local<F: Future>(fut: F) -> F::Output {
	loadact_logger::init_test();
	LocalSet::new().run_until(fut).await
}

/// Lets all spawned loads make progress
pub async fn settle() {
	for _ in 0..64 {
		tokio::task::yield_now().await;
	}
}

/// Probe inner
struct ProbeInner<T> {
	/// Modes of each load, in order
	modes: Vec<LoadMode>,

	/// Loads waiting on a result
	pending: VecDeque<oneshot::Sender<LoadResult<T>>>,
}

/// A loader whose loads only finish once resolved
pub struct Probe<T> {
	/// Inner
	inner: Rc<RefCell<ProbeInner<T>>>,
}

impl<T: Clone + 'static> Probe<T> {
	/// Creates a new probe
	pub fn new() -> Self {
		let inner = ProbeInner {
			modes:   vec![],
			pending: VecDeque::new(),
		};
		Self {
			inner: Rc::new(RefCell::new(inner)),
		}
	}

	/// Creates an action loading through this probe
	pub fn action(&self) -> LoadAction<T> {
		let inner = Rc::clone(&self.inner);
		LoadAction::from_loader(move |cx: LoadCx<T>| {
			let (tx, rx) = oneshot::channel();
			let mut inner = inner.borrow_mut();
			inner.modes.push(cx.mode());
			inner.pending.push_back(tx);
			async move { rx.await.expect("Probe was dropped") }
		})
	}

	/// Returns the number of times the loader was called
	pub fn calls(&self) -> usize {
		self.inner.borrow().modes.len()
	}

	/// Returns the mode of each load, in order
	pub fn modes(&self) -> Vec<LoadMode> {
		self.inner.borrow().modes.clone()
	}

	/// Returns the number of loads waiting on a result
	pub fn pending(&self) -> usize {
		self.inner.borrow().pending.len()
	}

	/// Resolves the oldest pending load with `res`
	pub fn resolve(&self, res: LoadResult<T>) {
		let tx = self
			.inner
			.borrow_mut()
			.pending
			.pop_front()
			.expect("No pending loads to resolve");
		tx.send(res).unwrap_or_else(|_| panic!("Load was dropped"));
	}
}
