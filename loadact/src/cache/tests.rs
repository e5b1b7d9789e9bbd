//! Tests

// Imports
use {
	super::*,
	crate::test_util::{self, Probe},
	core::cell::RefCell,
};

/// Creates a cache action over two probes, refreshing with `refresh`
fn setup(
	refresh: impl Fn(&CacheLoadAction<i32>) -> LoadResult<bool> + 'static,
) -> (Probe<i32>, Probe<i32>, CacheLoadAction<i32>) {
	let cache = Probe::new();
	let base = Probe::new();
	let action = CacheLoadAction::new(cache.action(), base.action(), refresh);

	(cache, base, action)
}

/// Ensures a fresh cache is used without loading the base
#[tokio::test]
async fn fresh() {
	test_util::run_local(async {
		let (cache, base, action) = setup(|_| Ok(false));
		let action = action.into_action();

		let res = action.load();
		test_util::settle().await;
		cache.resolve(Ok(1));

		assert_eq!(res.await.ok(), Some(1));
		assert_eq!(base.calls(), 0);
		assert_eq!(action.value(), Some(1));
	})
	.await;
}

/// Ensures a stale cache is published, and then replaced by the base
#[tokio::test]
async fn stale() {
	test_util::run_local(async {
		let (cache, base, action) = setup(|this| Ok(this.cache().value() != Some(2)));
		let action = action.into_action();

		let res = action.load();
		test_util::settle().await;
		cache.resolve(Ok(1));
		test_util::settle().await;

		assert_eq!(action.value(), Some(1));
		assert!(action.is_loading());
		assert_eq!(base.calls(), 1);

		base.resolve(Ok(2));
		assert_eq!(res.await.ok(), Some(2));
		assert_eq!(action.value(), Some(2));
	})
	.await;
}

/// Ensures a failing base is reported even if the cache succeeded
#[tokio::test]
async fn stale_base_failure() {
	test_util::run_local(async {
		let (cache, base, action) = setup(|_| Ok(true));
		let action = action.into_action();

		let res = action.load();
		test_util::settle().await;
		cache.resolve(Ok(1));
		test_util::settle().await;
		base.resolve(Err(LoadError::msg("offline")));

		let err = res.await.expect_err("Load should fail");
		assert_eq!(err.to_string(), "offline");
		assert_eq!(action.value(), Some(1));
	})
	.await;
}

/// Ensures a failing refresh check loads from the base
#[tokio::test]
async fn refresh_failure() {
	test_util::run_local(async {
		let (cache, base, action) = setup(|_| Err(LoadError::msg("no date")));
		let action = action.into_action();

		let res = action.load();
		test_util::settle().await;
		cache.resolve(Ok(1));
		test_util::settle().await;
		base.resolve(Ok(2));

		assert_eq!(res.await.ok(), Some(2));
		assert_eq!(base.calls(), 1);
	})
	.await;
}

/// Ensures a failing cache loads from the base, without surfacing the cache's error
#[tokio::test]
async fn cache_failure() {
	test_util::run_local(async {
		let (cache, base, action) = setup(|_| Ok(false));
		let action = action.into_action();

		let res = action.load();
		test_util::settle().await;
		cache.resolve(Err(LoadError::msg("missing")));
		test_util::settle().await;
		base.resolve(Ok(2));

		assert_eq!(res.await.ok(), Some(2));
		assert!(action.error().is_none());

		// And when both fail, the base's error is the result
		let res = action.load();
		test_util::settle().await;
		cache.resolve(Err(LoadError::msg("missing")));
		test_util::settle().await;
		base.resolve(Err(LoadError::msg("offline")));

		let err = res.await.expect_err("Load should fail");
		assert_eq!(err.to_string(), "offline");
		assert_eq!(action.value(), Some(2));
	})
	.await;
}

/// Ensures forced loads always load the base, forced
#[tokio::test]
async fn forced() {
	test_util::run_local(async {
		let (cache, base, action) = setup(|_| Ok(false));
		let action = action.into_action();

		let res = action.load_new();
		test_util::settle().await;
		cache.resolve(Ok(1));
		test_util::settle().await;
		assert_eq!(action.value(), Some(1));

		base.resolve(Ok(2));
		assert_eq!(res.await.ok(), Some(2));
		assert_eq!(cache.modes(), [LoadMode::Normal]);
		assert_eq!(base.modes(), [LoadMode::Forced]);

		// A later normal load uses the cache again
		let res = action.load();
		test_util::settle().await;
		cache.resolve(Ok(3));
		assert_eq!(res.await.ok(), Some(3));
		assert_eq!(base.calls(), 1);
	})
	.await;
}

/// Ensures forced loads with a failing cache load the base, forced, without publishing anything
#[tokio::test]
async fn forced_cache_failure() {
	test_util::run_local(async {
		let (cache, base, action) = setup(|_| Ok(false));
		let action = action.into_action();

		let res = action.load_new();
		test_util::settle().await;
		cache.resolve(Err(LoadError::msg("missing")));
		test_util::settle().await;
		assert_eq!(action.value(), None);
		assert!(action.is_loading());

		base.resolve(Ok(2));
		assert_eq!(res.await.ok(), Some(2));
		assert!(action.error().is_none());

		// The base's failure is final, keeping the previous value
		let res = action.load_new();
		test_util::settle().await;
		cache.resolve(Err(LoadError::msg("missing")));
		test_util::settle().await;
		assert_eq!(action.value(), Some(2));
		base.resolve(Err(LoadError::msg("offline")));

		let err = res.await.expect_err("Load should fail");
		assert_eq!(err.to_string(), "offline");
		assert_eq!(action.value(), Some(2));
		assert_eq!(cache.modes(), [LoadMode::Normal, LoadMode::Normal]);
		assert_eq!(base.modes(), [LoadMode::Forced, LoadMode::Forced]);
	})
	.await;
}

/// Ensures base values are written back
#[tokio::test]
async fn write_back() {
	test_util::run_local(async {
		let written = Rc::new(RefCell::new(vec![]));
		let (cache, base, action) = setup(|_| Ok(true));
		let action = action
			.write_back({
				let written = Rc::clone(&written);
				move |&value: &i32, _: &CacheLoadAction<i32>| {
					written.borrow_mut().push(value);
					Ok::<_, LoadError>(())
				}
			})
			.into_action();

		let res = action.load();
		test_util::settle().await;
		cache.resolve(Ok(1));
		test_util::settle().await;
		base.resolve(Ok(2));

		assert_eq!(res.await.ok(), Some(2));
		assert_eq!(*written.borrow(), [2]);
	})
	.await;
}

/// Ensures a failing write-back fails the load
#[tokio::test]
async fn write_back_failure() {
	test_util::run_local(async {
		let (cache, base, action) = setup(|_| Ok(true));
		let action = action
			.write_back(|_: &i32, _: &CacheLoadAction<i32>| Err(LoadError::msg("read-only")))
			.into_action();

		let res = action.load();
		test_util::settle().await;
		cache.resolve(Err(LoadError::msg("missing")));
		test_util::settle().await;
		base.resolve(Ok(2));

		let err = res.await.expect_err("Load should fail");
		assert!(matches!(err, LoadError::CacheWrite(_)));
	})
	.await;
}
