//! Tests

// Imports
use {
	super::*,
	crate::test_util::{self, Probe},
	core::cell::Cell,
};

/// Ensures concurrent loads only call the loader once, and all receive the same result
#[tokio::test]
async fn single_flight() {
	test_util::run_local(async {
		let probe = Probe::<i32>::new();
		let action = probe.action();

		let first = action.load();
		let second = action.load();
		assert!(action.is_loading());
		assert_eq!(probe.calls(), 1);

		probe.resolve(Ok(5));
		assert_eq!(first.await.ok(), Some(5));
		assert_eq!(second.await.ok(), Some(5));
		assert_eq!(probe.calls(), 1);
		assert_eq!(action.status(), LoadStatus::Ready);
		assert_eq!(action.value(), Some(5));
	})
	.await;
}

/// Ensures a failed load keeps the previous value
#[tokio::test]
async fn stale_value_on_error() {
	test_util::run_local(async {
		let probe = Probe::<i32>::new();
		let action = probe.action();

		let res = action.load();
		probe.resolve(Ok(1));
		assert_eq!(res.await.ok(), Some(1));
		let loaded_at = action.updated_at();
		assert!(loaded_at.is_some());

		let res = action.load();
		probe.resolve(Err(LoadError::msg("boom")));
		let err = res.await.expect_err("Load should fail");
		assert_eq!(err.to_string(), "boom");

		assert_eq!(action.value(), Some(1));
		assert_eq!(action.error().map(|err| err.to_string()).as_deref(), Some("boom"));
		assert_eq!(action.updated_at(), loaded_at);
		assert!(action.display_state().is_loaded());

		// And a successful load clears the error again
		let res = action.load();
		probe.resolve(Ok(2));
		assert_eq!(res.await.ok(), Some(2));
		assert!(action.error().is_none());
	})
	.await;
}

/// Ensures completions are called in the order they were queued, with the same result
#[tokio::test]
async fn completions_fifo() {
	test_util::run_local(async {
		let probe = Probe::<i32>::new();
		let action = probe.action();

		let calls = Rc::new(RefCell::new(vec![]));
		for idx in 0..3 {
			let calls = Rc::clone(&calls);
			action.load_with(LoadMode::Normal, move |res| calls.borrow_mut().push((idx, res.ok())));
		}
		assert_eq!(probe.calls(), 1);

		probe.resolve(Ok(7));
		test_util::settle().await;
		assert_eq!(*calls.borrow(), [(0, Some(7)), (1, Some(7)), (2, Some(7))]);
	})
	.await;
}

/// Ensures loading from within a completion starts a new load
#[tokio::test]
async fn load_within_completion() {
	test_util::run_local(async {
		let probe = Probe::<i32>::new();
		let action = probe.action();

		let reloaded = Rc::new(Cell::new(None));
		action.load_with(LoadMode::Normal, {
			let action = action.clone();
			let reloaded = Rc::clone(&reloaded);
			move |_| action.load_with(LoadMode::Normal, move |res| reloaded.set(res.ok()))
		});

		probe.resolve(Ok(1));
		test_util::settle().await;
		assert_eq!(probe.calls(), 2);
		assert_eq!(reloaded.get(), None);

		probe.resolve(Ok(2));
		test_util::settle().await;
		assert_eq!(reloaded.get(), Some(2));
	})
	.await;
}

/// Ensures observers are notified of every change
#[tokio::test]
async fn observers() {
	test_util::run_local(async {
		let probe = Probe::<i32>::new();
		let action = probe.action();

		let changes = Rc::new(RefCell::new(vec![]));
		let observer = Rc::new({
			let changes = Rc::clone(&changes);
			move |action: &dyn Loadable, changed: Properties| changes.borrow_mut().push((changed, action.status()))
		}) as Rc<dyn Observer>;

		let id = action.add_observer(&observer, true);
		assert_eq!(*changes.borrow(), [(Properties::empty(), LoadStatus::Ready)]);

		// Adding it again shouldn't register it twice
		assert_eq!(action.add_observer(&observer, true), id);
		assert_eq!(action.observer_count(), 1);
		changes.borrow_mut().clear();

		let res = action.load();
		assert_eq!(*changes.borrow(), [(Properties::from(Property::Status), LoadStatus::Loading)]);
		changes.borrow_mut().clear();

		probe.resolve(Ok(3));
		_ = res.await;
		let all = Property::ALL.into_iter().collect::<Properties>();
		assert_eq!(*changes.borrow(), [(all, LoadStatus::Ready)]);
		changes.borrow_mut().clear();

		// Nothing changed, so nothing is sent, unless forced
		action.send_updates(false);
		assert!(changes.borrow().is_empty());
		action.send_updates(true);
		assert_eq!(*changes.borrow(), [(Properties::empty(), LoadStatus::Ready)]);
		changes.borrow_mut().clear();

		assert!(action.remove_observer(id));
		assert!(!action.remove_observer(id));
		let res = action.load();
		probe.resolve(Ok(4));
		_ = res.await;
		assert!(changes.borrow().is_empty());
	})
	.await;
}

/// Ensures dropped observers aren't kept alive, nor notified
#[tokio::test]
async fn observer_dropped() {
	test_util::run_local(async {
		let action = LoadAction::ready(1);

		let count = Rc::new(Cell::new(0));
		let observer = Rc::new({
			let count = Rc::clone(&count);
			move |_: &dyn Loadable, _: Properties| count.set(count.get() + 1)
		}) as Rc<dyn Observer>;
		action.add_observer(&observer, false);
		drop(observer);

		assert_eq!(action.load().await.ok(), Some(1));
		assert_eq!(count.get(), 0);
		assert_eq!(action.observer_count(), 0);
	})
	.await;
}

/// Ensures observers may read the action while being notified
#[tokio::test]
async fn observer_reentrant() {
	test_util::run_local(async {
		let action = LoadAction::ready(5);

		let seen = Rc::new(Cell::new(None));
		let observer = Rc::new({
			let seen = Rc::clone(&seen);
			move |action: &dyn Loadable, changed: Properties| {
				if changed.contains(Property::Value) {
					seen.set(action.value::<i32>());
				}
			}
		}) as Rc<dyn Observer>;
		action.add_observer(&observer, false);

		_ = action.load().await;
		assert_eq!(seen.get(), Some(5));
	})
	.await;
}

/// Ensures the display state follows the action's state
#[tokio::test]
async fn display_state() {
	test_util::run_local(async {
		let probe = Probe::<Vec<i32>>::new();
		let action = probe.action();
		assert!(matches!(action.display_state(), DisplayState::Empty));

		let res = action.load();
		assert!(matches!(action.display_state(), DisplayState::Loading));
		probe.resolve(Err(LoadError::msg("boom")));
		_ = res.await;
		assert!(matches!(action.display_state(), DisplayState::Error(_)));

		let res = action.load();
		probe.resolve(Ok(vec![]));
		_ = res.await;
		assert!(action.display_state().is_loaded());
		assert!(matches!(action.display_state_by(Vec::is_empty), DisplayState::Empty));
	})
	.await;
}

/// Ensures constant actions always load their value or error
#[tokio::test]
async fn constant() {
	test_util::run_local(async {
		let action = LoadAction::ready("a");
		assert_eq!(action.load().await.ok(), Some("a"));
		assert_eq!(action.load_new().await.ok(), Some("a"));

		let action = LoadAction::<i32>::failed(LoadError::msg("nope"));
		assert!(action.load().await.is_err());
		assert!(action.value().is_none());
	})
	.await;
}

/// Ensures the mode is passed to the loader
#[tokio::test]
async fn mode() {
	test_util::run_local(async {
		let probe = Probe::<i32>::new();
		let action = probe.action();

		let res = action.load_new();
		probe.resolve(Ok(1));
		_ = res.await;
		action.start_loading(LoadMode::Normal);
		probe.resolve(Ok(2));
		test_util::settle().await;

		assert_eq!(probe.modes(), [LoadMode::Forced, LoadMode::Normal]);
		assert_eq!(action.value(), Some(2));
		assert_eq!(probe.pending(), 0);
	})
	.await;
}

/// Ensures clones share state, and ids are stable
#[tokio::test]
async fn identity() {
	test_util::run_local(async {
		let action = LoadAction::ready(1);
		let clone = action.clone();
		assert_eq!(action, clone);
		assert_eq!(action.id(), clone.id());
		assert_eq!(action.downgrade().upgrade().map(|action| action.id()), Some(action.id()));
		assert_ne!(action, LoadAction::ready(1));

		_ = clone.load().await;
		assert_eq!(action.value(), Some(1));
	})
	.await;
}

/// Ensures loads can't be started outside of a local set
#[test]
#[should_panic = "called from outside of a `task::LocalSet`"]
fn load_outside_local_set() {
	let action = LoadAction::ready(1);
	drop(action.load());
}
