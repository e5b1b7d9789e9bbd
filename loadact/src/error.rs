//! Load errors
//!
//! Every action stores and hands out the same error to all of its
//! observers and completions, so all errors here are cheap to clone.

// Imports
use {
	core::{error::Error as StdError, fmt},
	std::{io, sync::Arc},
};

/// Result of a load
pub type LoadResult<T> = Result<T, LoadError>;

/// Load error
#[derive(Clone, Debug, thiserror::Error)]
pub enum LoadError {
	/// A byte source failed
	#[error(transparent)]
	Transport(#[from] TransportError),

	/// The structured store failed
	#[error(transparent)]
	Store(#[from] StoreError),

	/// A transform, continuation or check function failed
	#[error(transparent)]
	Transform(SharedError),

	/// A group was unable to produce a result
	#[error(transparent)]
	Composition(#[from] CompositionError),

	/// Writing a freshly loaded value to the cache failed
	#[error("Unable to write loaded value to cache")]
	CacheWrite(#[source] Box<LoadError>),

	/// The load was dropped before completing.
	///
	/// Happens when the dispatch context shuts down with loads in flight.
	#[error("Load was dropped before completing")]
	Dropped,
}

impl LoadError {
	/// Creates a transform error from a message
	pub fn msg<M>(msg: M) -> Self
	where
		M: fmt::Display + fmt::Debug + Send + Sync + 'static,
	{
		Self::Transform(SharedError::new(anyhow::Error::msg(msg)))
	}

	/// Creates a transform error from any error
	pub fn transform<E>(err: E) -> Self
	where
		E: StdError + Send + Sync + 'static,
	{
		Self::Transform(SharedError::new(anyhow::Error::new(err)))
	}
}

impl From<anyhow::Error> for LoadError {
	fn from(err: anyhow::Error) -> Self {
		Self::Transform(SharedError::new(err))
	}
}

/// Byte source errors
#[derive(Clone, Debug, thiserror::Error)]
pub enum TransportError {
	/// Connectivity is unavailable
	#[error("No internet connection")]
	NoInternet,

	/// The response had no body
	#[error("Empty response")]
	EmptyResponse,

	/// Underlying I/O failure
	#[error("I/O failure")]
	Io(#[source] Arc<io::Error>),
}

impl From<io::Error> for TransportError {
	fn from(err: io::Error) -> Self {
		Self::Io(Arc::new(err))
	}
}

/// Structured store errors
#[derive(Clone, Debug, thiserror::Error)]
pub enum StoreError {
	/// No rows matched a fetch that requires one
	#[error("Unable to fetch {0:?}")]
	FetchFailure(String),

	/// The store doesn't know the requested type
	#[error("Unknown entity type {0:?}")]
	NoEntity(String),

	/// Committing the pending changes failed
	#[error("Unable to commit store changes")]
	Commit(#[source] SharedError),
}

/// Group composition errors
#[derive(PartialEq, Eq, Clone, Copy, Debug, thiserror::Error)]
pub enum CompositionError {
	/// The value reducer produced no value
	#[error("No value was produced")]
	NoValueProduced,

	/// A child failed, but the error reducer produced no error
	#[error("No error was produced")]
	NoErrorProduced,
}

/// Shared, clonable, type-erased error
#[derive(Clone)]
pub struct SharedError(Arc<anyhow::Error>);

impl SharedError {
	/// Wraps an error
	#[must_use]
	pub fn new(err: anyhow::Error) -> Self {
		Self(Arc::new(err))
	}

	/// Returns the inner error
	#[must_use]
	pub fn inner(&self) -> &anyhow::Error {
		&self.0
	}
}

impl fmt::Debug for SharedError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		fmt::Debug::fmt(&*self.0, f)
	}
}

impl fmt::Display for SharedError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		fmt::Display::fmt(&*self.0, f)
	}
}

impl StdError for SharedError {
	fn source(&self) -> Option<&(dyn StdError + 'static)> {
		self.0.chain().nth(1)
	}
}
