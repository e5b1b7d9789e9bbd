//! Byte sources

// Imports
use {
	bytes::Bytes,
	futures::future::LocalBoxFuture,
	loadact::{LoadAction, LoadError, LoadResult},
};

/// A source of raw bytes
pub trait ByteSource: 'static {
	/// Fetches the bytes
	fn fetch(&self) -> LocalBoxFuture<'static, LoadResult<Bytes>>;
}

/// Creates an action that loads the bytes of `source`
pub fn load_action<S: ByteSource>(source: S) -> LoadAction<Bytes> {
	LoadAction::new(move || source.fetch())
}

/// Creates an action that loads the bytes of `source` and processes them with `process`
pub fn load_action_with<S, T, F, E>(source: S, process: F) -> LoadAction<T>
where
	S: ByteSource,
	T: Clone + 'static,
	F: Fn(Bytes) -> Result<T, E> + 'static,
	E: Into<LoadError>,
{
	self::load_action(source).then(process)
}
