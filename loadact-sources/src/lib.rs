//! Leaf sources for `loadact`.
//!
//! Provides the byte sources ([`FileSource`] and [`WebSource`]) and the
//! structured store contract ([`StructuredStore`]) that leaf actions load from.

// Modules
pub mod file;
pub mod memory;
pub mod source;
pub mod store;
pub mod web;

// Exports
pub use self::{
	file::FileSource,
	memory::{Filter, MemoryStore, Record, Sort},
	source::{ByteSource, load_action, load_action_with},
	store::{StoreQuery, StructuredStore},
	web::{Transport, WebSource},
};
