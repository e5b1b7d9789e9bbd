//! Composable loadable values.
//!
//! A [`LoadAction`] holds a value that's loaded asynchronously, alongside
//! the last load error and its status. Actions can be composed into larger
//! ones, such as processing the value of another action
//! ([`ProcessLoadAction`]), chaining actions ([`CompletionLoadAction`]),
//! falling back from a cache to a base ([`CacheLoadAction`]) or loading many
//! actions together ([`GroupLoadAction`]).
//!
//! Every state change is reported to the action's [`Observer`]s.
//!
//! All actions live on a single thread, and load on the current
//! [`tokio::task::LocalSet`] (or the browser's event loop, with the
//! `wasm-js-promise` feature).

// Modules
pub mod action;
pub mod cache;
pub mod completion;
mod dispatch;
pub mod error;
pub mod group;
pub mod loadable;
pub mod loader;
pub mod loading_count;
pub mod observer;
pub mod process;
pub mod properties;
pub mod status;
#[cfg(test)]
mod test_util;

// Exports
pub use self::{
	action::{Completion, LoadAction, LoadCx, WeakLoadAction},
	cache::CacheLoadAction,
	completion::CompletionLoadAction,
	error::{CompositionError, LoadError, LoadResult, SharedError, StoreError, TransportError},
	group::{GroupLoadAction, GroupOrder, Ignored, LoadableChildren},
	loadable::Loadable,
	loader::{LoadMode, Loader},
	loading_count::LoadingGuard,
	observer::{Observer, ObserverId},
	process::ProcessLoadAction,
	properties::{Properties, Property},
	status::{DisplayState, LoadStatus},
};
