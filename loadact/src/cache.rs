//! Cache load action
//!
//! Loads a value from a cache, falling back to a base action when the cache
//! fails or is stale.
//!
//! # Cycle
//! On a normal load, the cache is loaded first. If it succeeds and the
//! refresh predicate says it's still fresh, its value is the result and the
//! base is never loaded. Otherwise, the cached value (if any) is published
//! as a provisional value and the base is loaded, with its result being final.
//!
//! On a forced load, the cache is still loaded to publish a provisional
//! value, but the base is always loaded afterwards.
//!
//! Every successful base load is written back to the cache, if a write-back
//! function was given.

// Modules
#[cfg(test)]
mod tests;

// Imports
use {
	crate::{LoadAction, LoadCx, LoadError, LoadMode, LoadResult, Loader},
	core::fmt,
	futures::{FutureExt, future::LocalBoxFuture},
	std::rc::Rc,
};

/// Refresh predicate
type RefreshFn<T> = dyn Fn(&CacheLoadAction<T>) -> LoadResult<bool>;

/// Write-back function
type WriteBackFn<T> = dyn Fn(&T, &CacheLoadAction<T>) -> LoadResult<()>;

/// Cache load action
pub struct CacheLoadAction<T> {
	/// Cache action
	cache: LoadAction<T>,

	/// Base action
	base: LoadAction<T>,

	/// Returns whether the cached value must be refreshed from the base
	refresh: Rc<RefreshFn<T>>,

	/// Writes freshly loaded values back to the cache
	write_back: Option<Rc<WriteBackFn<T>>>,
}

impl<T: Clone + 'static> CacheLoadAction<T> {
	/// Creates a new cache action.
	///
	/// `refresh` is called after each successful cache load, and the base
	/// is loaded if it returns `true` or fails.
	pub fn new<F, E>(cache: LoadAction<T>, base: LoadAction<T>, refresh: F) -> Self
	where
		F: Fn(&Self) -> Result<bool, E> + 'static,
		E: Into<LoadError>,
	{
		Self {
			cache,
			base,
			refresh: Rc::new(move |this| refresh(this).map_err(Into::into)),
			write_back: None,
		}
	}

	/// Sets the write-back function.
	///
	/// Called with each value successfully loaded from the base, before the
	/// load is considered successful.
	#[must_use]
	pub fn write_back<F, E>(mut self, write_back: F) -> Self
	where
		F: Fn(&T, &Self) -> Result<(), E> + 'static,
		E: Into<LoadError>,
	{
		self.write_back = Some(Rc::new(move |value, this| write_back(value, this).map_err(Into::into)));
		self
	}

	/// Returns the cache action
	#[must_use]
	pub const fn cache(&self) -> &LoadAction<T> {
		&self.cache
	}

	/// Returns the base action
	#[must_use]
	pub const fn base(&self) -> &LoadAction<T> {
		&self.base
	}

	/// Creates an action that loads through this cache
	#[must_use]
	pub fn into_action(self) -> LoadAction<T> {
		LoadAction::from_loader(self)
	}

	/// Runs a single load cycle
	async fn load_cycle(self, cx: LoadCx<T>) -> LoadResult<T> {
		// Note: The cache itself has no shortcuts to bypass, so it's always loaded normally.
		let cached = self.cache.load_mode(LoadMode::Normal).await;

		if cx.is_forced() {
			if let Ok(value) = cached {
				cx.publish_provisional(value);
			}
			return self.load_base(LoadMode::Forced).await;
		}

		let value = match cached {
			Ok(value) => value,
			Err(err) => {
				tracing::error!(%err, "Cache load failed, loading from base");
				return self.load_base(cx.mode()).await;
			},
		};

		match (self.refresh)(&self) {
			Ok(false) => {
				tracing::debug!("Cache is fresh");
				Ok(value)
			},
			Ok(true) => {
				tracing::debug!("Cache is stale, loading from base");
				cx.publish_provisional(value);
				self.load_base(cx.mode()).await
			},
			Err(err) => {
				tracing::error!(%err, "Cache refresh check failed, loading from base");
				cx.publish_provisional(value);
				self.load_base(cx.mode()).await
			},
		}
	}

	/// Loads the base, writing back the value on success
	async fn load_base(&self, mode: LoadMode) -> LoadResult<T> {
		let value = self.base.load_mode(mode).await?;
		if let Some(write_back) = &self.write_back {
			write_back(&value, self).map_err(|err| {
				tracing::error!(%err, "Unable to write back loaded value");
				LoadError::CacheWrite(Box::new(err))
			})?;
			tracing::debug!("Wrote back loaded value");
		}

		Ok(value)
	}
}

impl<T: Clone + 'static> Loader<T> for CacheLoadAction<T> {
	fn load(&self, cx: LoadCx<T>) -> LocalBoxFuture<'static, LoadResult<T>> {
		self.clone().load_cycle(cx).boxed_local()
	}
}

impl<T> Clone for CacheLoadAction<T> {
	fn clone(&self) -> Self {
		Self {
			cache:      self.cache.clone(),
			base:       self.base.clone(),
			refresh:    Rc::clone(&self.refresh),
			write_back: self.write_back.as_ref().map(Rc::clone),
		}
	}
}

impl<T: fmt::Debug> fmt::Debug for CacheLoadAction<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("CacheLoadAction")
			.field("cache", &self.cache)
			.field("base", &self.base)
			.field("write_back", &self.write_back.is_some())
			.finish_non_exhaustive()
	}
}
