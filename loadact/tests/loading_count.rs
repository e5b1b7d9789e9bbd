//! Loading count tests
//!
//! The loading count is process-wide, so this is the only test within this binary.

// Imports
use {
	futures::{channel::oneshot, future},
	loadact::{LoadAction, LoadError, LoadMode, LoadResult, LoadStatus, loading_count},
	std::{
		cell::{Cell, RefCell},
		rc::Rc,
	},
	tokio::task::LocalSet,
};

/// Ensures the loading count returns to 0 after any sequence of loads
#[tokio::test]
async fn balanced() {
	loadact_logger::init_test();
	assert_eq!(loading_count::count(), 0);
	assert_eq!(loading_count::status(), LoadStatus::Ready);
	let mut counts = loading_count::subscribe();

	LocalSet::new()
		.run_until(async {
			// Gated loads, one succeeding and one failing
			let gates = Rc::new(RefCell::new(vec![]));
			let action = LoadAction::<i32>::new({
				let gates = Rc::clone(&gates);
				move || {
					let (tx, rx) = oneshot::channel::<LoadResult<i32>>();
					gates.borrow_mut().push(tx);
					async move { rx.await.unwrap_or(Err(LoadError::Dropped)) }
				}
			});
			let other = LoadAction::ready(1);

			let first = action.load();
			let batched = action.load_new();
			let second = other.load();
			assert_eq!(loading_count::count(), 2);
			assert_eq!(loading_count::status(), LoadStatus::Loading);
			assert!(counts.has_changed().expect("Sender is static"));

			_ = second.await;
			assert_eq!(loading_count::count(), 1);

			let gate = gates.borrow_mut().pop().expect("Load should be gated");
			_ = gate.send(Ok(5));
			assert_eq!(first.await.ok(), Some(5));
			assert_eq!(batched.await.ok(), Some(5));
			assert_eq!(loading_count::count(), 0);

			action.start_loading(LoadMode::Normal);
			let gate = gates.borrow_mut().pop().expect("Load should be gated");
			_ = gate.send(Err(LoadError::msg("boom")));
			assert!(action.load().await.is_err());
			assert_eq!(loading_count::count(), 0);

			// Composite actions count each of their children too
			let composed = action.then(|value| Ok::<_, LoadError>(value * 2));
			let res = composed.load();
			assert_eq!(loading_count::count(), 2);
			let gate = gates.borrow_mut().pop().expect("Load should be gated");
			_ = gate.send(Ok(2));
			assert_eq!(res.await.ok(), Some(4));
			assert_eq!(loading_count::count(), 0);
		})
		.await;

	// Dropping the dispatch context mid-load still releases the count
	let local = LocalSet::new();
	let res = local
		.run_until(async {
			let action = LoadAction::new(future::pending::<LoadResult<i32>>);
			action.load()
		})
		.await;
	assert_eq!(loading_count::count(), 1);
	drop(local);
	assert_eq!(loading_count::count(), 0);
	assert!(matches!(res.await, Err(LoadError::Dropped)));

	// Even if the action outlives it, in which case it can still be loaded afterwards
	let calls = Rc::new(Cell::new(0_usize));
	let action = LoadAction::new({
		let calls = Rc::clone(&calls);
		move || {
			calls.set(calls.get() + 1);
			let first = calls.get() == 1;
			async move {
				match first {
					true => future::pending::<LoadResult<i32>>().await,
					false => Ok(7),
				}
			}
		}
	});
	let local = LocalSet::new();
	let res = local.run_until(async { action.load() }).await;
	assert_eq!(loading_count::count(), 1);
	assert_eq!(action.status(), LoadStatus::Loading);
	drop(local);
	assert_eq!(loading_count::count(), 0);
	assert_eq!(action.status(), LoadStatus::Ready);
	assert!(matches!(action.error(), Some(LoadError::Dropped)));
	assert!(matches!(res.await, Err(LoadError::Dropped)));

	let res = LocalSet::new().run_until(async { action.load().await }).await;
	assert_eq!(res.ok(), Some(7));
	assert_eq!(calls.get(), 2);
	assert!(action.error().is_none());
	assert_eq!(loading_count::count(), 0);

	counts.mark_unchanged();
	assert_eq!(*counts.borrow(), 0);
	assert_eq!(loading_count::status(), LoadStatus::Ready);
}
