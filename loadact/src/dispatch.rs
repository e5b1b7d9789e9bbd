//! Serial dispatch context
//!
//! All loads, observer notifications and completions run on a single
//! thread-local context, so actions never see concurrent access.
//!
//! With the `rt-tokio` feature this is the current [`tokio::task::LocalSet`],
//! with `wasm-js-promise` it's the browser's event loop.

// Imports
use core::future::Future;

#[cfg(not(any(feature = "rt-tokio", feature = "wasm-js-promise")))]
compile_error!("One of the `rt-tokio` or `wasm-js-promise` features must be enabled");

/// Spawns a task on the current context.
///
/// # Panics
/// With `rt-tokio`, panics if called outside of a `LocalSet`.
#[track_caller]
pub fn spawn<F>(fut: F)
where
	F: Future<Output = ()> + 'static,
{
	#[cfg(feature = "rt-tokio")]
	drop(tokio::task::spawn_local(fut));

	#[cfg(all(feature = "wasm-js-promise", not(feature = "rt-tokio")))]
	wasm_bindgen_futures::spawn_local(fut);
}
