//! Web source
//!
//! Fetches the body of a url through a [`Transport`].
//!
//! Connectivity failures are reported as [`TransportError::NoInternet`],
//! and absent or empty bodies as [`TransportError::EmptyResponse`].

// Imports
use {
	crate::ByteSource,
	bytes::Bytes,
	futures::{FutureExt, future::LocalBoxFuture},
	loadact::{LoadResult, TransportError},
	std::{io, rc::Rc},
	url::Url,
};

/// Http transport
pub trait Transport: 'static {
	/// Requests `url`, returning its body, if any
	fn get(&self, url: &Url) -> LocalBoxFuture<'static, io::Result<Option<Bytes>>>;
}

/// Web source
pub struct WebSource<T: ?Sized> {
	/// Transport
	transport: Rc<T>,

	/// Url
	url: Url,
}

impl<T: ?Sized + Transport> WebSource<T> {
	/// Creates a new web source
	pub const fn new(transport: Rc<T>, url: Url) -> Self {
		Self { transport, url }
	}

	/// Returns the url
	#[must_use]
	pub const fn url(&self) -> &Url {
		&self.url
	}
}

impl<T: ?Sized + Transport> ByteSource for WebSource<T> {
	fn fetch(&self) -> LocalBoxFuture<'static, LoadResult<Bytes>> {
		let url = self.url.clone();
		tracing::debug!(%url, "Load began");
		let body = self.transport.get(&url);

		async move {
			let res = match body.await {
				Ok(Some(body)) if !body.is_empty() => Ok(body),
				Ok(_) => Err(TransportError::EmptyResponse),
				Err(err) => Err(self::classify(err)),
			};

			match res {
				Ok(body) => {
					tracing::trace!(%url, len = body.len(), "Load success");
					Ok(body)
				},
				Err(err) => {
					tracing::error!(%url, %err, "Load failure");
					Err(err.into())
				},
			}
		}
		.boxed_local()
	}
}

impl<T: ?Sized> Clone for WebSource<T> {
	fn clone(&self) -> Self {
		Self {
			transport: Rc::clone(&self.transport),
			url:       self.url.clone(),
		}
	}
}

/// Classifies a transport error
#[must_use]
pub fn classify(err: io::Error) -> TransportError {
	match err.kind() {
		io::ErrorKind::TimedOut |
		io::ErrorKind::NotConnected |
		io::ErrorKind::HostUnreachable |
		io::ErrorKind::NetworkUnreachable |
		io::ErrorKind::NetworkDown => TransportError::NoInternet,
		_ => TransportError::from(err),
	}
}
