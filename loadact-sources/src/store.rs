//! Structured store
//!
//! Contract for an object store, and the actions that load from it.

// Imports
use {
	core::fmt,
	futures::future,
	loadact::{LoadAction, LoadError, StoreError},
	std::rc::Rc,
};

/// Structured store
///
/// Handles refer to live objects within the store. Changes made through
/// them, as well as created and deleted objects, are pending until
/// [`save`](Self::save) commits them.
pub trait StructuredStore: 'static {
	/// Handle to a stored object
	type Handle: Clone + 'static;

	/// Predicate to filter objects by
	type Predicate: 'static;

	/// Order to sort objects by
	type SortOrder: 'static;

	/// Creates a new object of type `type_tag`
	fn create(&self, type_tag: &str) -> Result<Self::Handle, StoreError>;

	/// Fetches all objects of type `type_tag` matching `predicate`, sorted by `sort`
	fn fetch(
		&self,
		type_tag: &str,
		predicate: Option<&Self::Predicate>,
		sort: Option<&Self::SortOrder>,
	) -> Result<Vec<Self::Handle>, StoreError>;

	/// Fetches the first object of type `type_tag` matching `predicate`
	fn fetch_single(
		&self,
		type_tag: &str,
		predicate: Option<&Self::Predicate>,
	) -> Result<Option<Self::Handle>, StoreError>;

	/// Deletes an object
	fn delete(&self, handle: &Self::Handle) -> Result<(), StoreError>;

	/// Commits all pending changes
	fn save(&self) -> Result<(), StoreError>;

	/// Fetches the first object of type `type_tag` matching `predicate`,
	/// or creates one if none exist.
	///
	/// `init` is called on the object only if it was created.
	fn fetch_single_or_create(
		&self,
		type_tag: &str,
		predicate: &Self::Predicate,
		init: impl FnOnce(&Self::Handle),
	) -> Result<Self::Handle, StoreError> {
		if let Some(handle) = self.fetch_single(type_tag, Some(predicate))? {
			return Ok(handle);
		}

		let handle = self.create(type_tag)?;
		init(&handle);
		Ok(handle)
	}
}

/// Store query.
///
/// Builds actions that load objects from a store.
pub struct StoreQuery<S: StructuredStore> {
	/// Store
	store: Rc<S>,

	/// Type tag
	type_tag: Rc<str>,

	/// Predicate
	predicate: Option<Rc<S::Predicate>>,

	/// Sort order
	sort: Option<Rc<S::SortOrder>>,
}

impl<S: StructuredStore> StoreQuery<S> {
	/// Creates a query for all objects of type `type_tag`
	pub fn new(store: Rc<S>, type_tag: impl Into<Rc<str>>) -> Self {
		Self {
			store,
			type_tag: type_tag.into(),
			predicate: None,
			sort: None,
		}
	}

	/// Filters objects by `predicate`
	#[must_use]
	pub fn predicate(mut self, predicate: S::Predicate) -> Self {
		self.predicate = Some(Rc::new(predicate));
		self
	}

	/// Sorts objects by `sort`
	#[must_use]
	pub fn sort(mut self, sort: S::SortOrder) -> Self {
		self.sort = Some(Rc::new(sort));
		self
	}

	/// Fetches all matching objects.
	pub fn fetch_list(&self) -> Result<Vec<S::Handle>, StoreError> {
		tracing::debug!(type_tag = %self.type_tag, "Load began");
		let handles = self
			.store
			.fetch(&self.type_tag, self.predicate.as_deref(), self.sort.as_deref())?;
		tracing::debug!(type_tag = %self.type_tag, len = handles.len(), "Load success");

		Ok(handles)
	}

	/// Fetches the first matching object, if any
	pub fn fetch_single_optional(&self) -> Result<Option<S::Handle>, StoreError> {
		tracing::debug!(type_tag = %self.type_tag, "Load single began");
		let handle = self.store.fetch_single(&self.type_tag, self.predicate.as_deref())?;
		tracing::debug!(type_tag = %self.type_tag, found = handle.is_some(), "Load single success");

		Ok(handle)
	}

	/// Fetches the first matching object, failing if there is none
	pub fn fetch_single(&self) -> Result<S::Handle, StoreError> {
		self.fetch_single_optional()?
			.ok_or_else(|| StoreError::FetchFailure(self.type_tag.to_string()))
	}

	/// Creates an action that loads all matching objects.
	///
	/// Loads an empty list if there are none.
	#[must_use]
	pub fn list(self) -> LoadAction<Vec<S::Handle>> {
		LoadAction::new(move || future::ready(self.fetch_list().map_err(LoadError::from)))
	}

	/// Creates an action that loads the first matching object.
	///
	/// Fails with [`StoreError::FetchFailure`] if there are none.
	#[must_use]
	pub fn single(self) -> LoadAction<S::Handle> {
		LoadAction::new(move || future::ready(self.fetch_single().map_err(LoadError::from)))
	}

	/// Creates an action that loads the first matching object, if any.
	#[must_use]
	pub fn single_optional(self) -> LoadAction<Option<S::Handle>> {
		LoadAction::new(move || future::ready(self.fetch_single_optional().map_err(LoadError::from)))
	}
}

impl<S: StructuredStore> Clone for StoreQuery<S> {
	fn clone(&self) -> Self {
		Self {
			store:     Rc::clone(&self.store),
			type_tag:  Rc::clone(&self.type_tag),
			predicate: self.predicate.clone(),
			sort:      self.sort.clone(),
		}
	}
}

impl<S: StructuredStore> fmt::Debug for StoreQuery<S> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("StoreQuery")
			.field("type_tag", &self.type_tag)
			.field("predicate", &self.predicate.is_some())
			.field("sort", &self.sort.is_some())
			.finish_non_exhaustive()
	}
}
