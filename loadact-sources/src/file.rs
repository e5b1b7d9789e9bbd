//! File source
//!
//! Reads a file relative to a root directory, and saves it atomically.

// Imports
use {
	crate::ByteSource,
	bytes::Bytes,
	futures::{FutureExt, future::LocalBoxFuture},
	loadact::{LoadResult, TransportError},
	std::{
		fs,
		io::{self, Write},
		path::{Path, PathBuf},
	},
	tempfile::NamedTempFile,
};

/// File source
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct FileSource {
	/// Root directory
	root: PathBuf,

	/// Path, relative to `root`
	path: PathBuf,
}

impl FileSource {
	/// Creates a new file source for `path` within `root`
	pub fn new(root: impl Into<PathBuf>, path: impl Into<PathBuf>) -> Self {
		Self {
			root: root.into(),
			path: path.into(),
		}
	}

	/// Returns the root directory
	#[must_use]
	pub fn root(&self) -> &Path {
		&self.root
	}

	/// Returns the full path of the file
	#[must_use]
	pub fn full_path(&self) -> PathBuf {
		self.root.join(&self.path)
	}

	/// Saves `contents` to the file.
	///
	/// The contents are written to a temporary file next to it, which then
	/// replaces the file, so readers never see a partially written file.
	pub fn save(&self, contents: &[u8]) -> Result<(), TransportError> {
		let path = self.full_path();
		tracing::debug!(?path, "Save began");

		self::save_atomic(&path, contents).map_err(|err| {
			tracing::error!(?path, %err, "Save failure");
			TransportError::from(err)
		})?;

		tracing::trace!(?path, "Save success");
		Ok(())
	}
}

impl ByteSource for FileSource {
	fn fetch(&self) -> LocalBoxFuture<'static, LoadResult<Bytes>> {
		let path = self.full_path();
		async move {
			tracing::debug!(?path, "Load began");
			match tokio::fs::read(&path).await {
				Ok(contents) => {
					tracing::trace!(?path, len = contents.len(), "Load success");
					Ok(Bytes::from(contents))
				},
				Err(err) => {
					tracing::error!(?path, %err, "Load failure");
					Err(TransportError::from(err).into())
				},
			}
		}
		.boxed_local()
	}
}

/// Writes `contents` to `path` through a temporary file in the same directory
fn save_atomic(path: &Path, contents: &[u8]) -> Result<(), io::Error> {
	let dir = path.parent().unwrap_or_else(|| Path::new("."));
	fs::create_dir_all(dir)?;

	let mut file = NamedTempFile::new_in(dir)?;
	file.write_all(contents)?;
	file.persist(path).map_err(|err| err.error)?;

	Ok(())
}
