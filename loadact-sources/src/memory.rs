//! In-memory store
//!
//! A [`StructuredStore`] that keeps all objects in memory.
//!
//! Like any other store, created objects, deleted objects and changes to
//! existing objects are pending until saved. Fetches see pending changes.

// Imports
use {
	crate::StructuredStore,
	core::{
		cell::{Cell, RefCell},
		cmp::Ordering,
		fmt,
		mem,
	},
	loadact::StoreError,
	std::{collections::HashMap, rc::Rc},
};

/// Record inner
struct RecordInner<R> {
	/// Id
	id: u64,

	/// Type tag
	type_tag: Rc<str>,

	/// Data
	data: RefCell<R>,

	/// Whether the data changed since the last save
	dirty: Cell<bool>,
}

/// Handle to an object of a [`MemoryStore`]
pub struct Record<R> {
	/// Inner
	inner: Rc<RecordInner<R>>,
}

impl<R> Record<R> {
	/// Returns the id of this record.
	///
	/// Ids are unique within a store.
	#[must_use]
	pub fn id(&self) -> u64 {
		self.inner.id
	}

	/// Returns the type tag of this record
	#[must_use]
	pub fn type_tag(&self) -> &str {
		&self.inner.type_tag
	}

	/// Uses the data of this record
	pub fn with<O>(&self, f: impl FnOnce(&R) -> O) -> O {
		f(&self.inner.data.borrow())
	}

	/// Updates the data of this record.
	///
	/// The change is pending until the store is saved.
	pub fn update<O>(&self, f: impl FnOnce(&mut R) -> O) -> O {
		let output = f(&mut self.inner.data.borrow_mut());
		self.inner.dirty.set(true);
		output
	}
}

impl<R: Clone> Record<R> {
	/// Returns a copy of the data of this record
	#[must_use]
	pub fn get(&self) -> R {
		self.with(R::clone)
	}
}

impl<R> Clone for Record<R> {
	fn clone(&self) -> Self {
		Self {
			inner: Rc::clone(&self.inner),
		}
	}
}

impl<R> PartialEq for Record<R> {
	fn eq(&self, other: &Self) -> bool {
		Rc::ptr_eq(&self.inner, &other.inner)
	}
}

impl<R> Eq for Record<R> {}

impl<R: fmt::Debug> fmt::Debug for Record<R> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Record")
			.field("id", &self.inner.id)
			.field("type_tag", &self.inner.type_tag)
			.field("data", &self.inner.data)
			.field("dirty", &self.inner.dirty.get())
			.finish()
	}
}

/// Predicate over the data of records
pub struct Filter<R>(Box<dyn Fn(&R) -> bool>);

impl<R> Filter<R> {
	/// Creates a new filter
	#[must_use]
	pub fn new<F>(f: F) -> Self
	where
		F: Fn(&R) -> bool + 'static,
	{
		Self(Box::new(f))
	}

	/// Returns if `data` matches this filter
	#[must_use]
	pub fn matches(&self, data: &R) -> bool {
		(self.0)(data)
	}
}

/// Sort order over the data of records
pub struct Sort<R>(Box<dyn Fn(&R, &R) -> Ordering>);

impl<R> Sort<R> {
	/// Creates a new sort order
	#[must_use]
	pub fn new<F>(f: F) -> Self
	where
		F: Fn(&R, &R) -> Ordering + 'static,
	{
		Self(Box::new(f))
	}

	/// Sorts by a key
	#[must_use]
	pub fn by_key<K, F>(f: F) -> Self
	where
		K: Ord,
		F: Fn(&R) -> K + 'static,
	{
		Self::new(move |lhs, rhs| f(lhs).cmp(&f(rhs)))
	}

	/// Compares two values
	#[must_use]
	pub fn compare(&self, lhs: &R, rhs: &R) -> Ordering {
		(self.0)(lhs, rhs)
	}
}

/// Factory for new records
type Factory<R> = Rc<dyn Fn() -> R>;

/// Inner
struct Inner<R> {
	/// Factories for each type tag
	factories: HashMap<Rc<str>, Factory<R>>,

	/// Saved records
	committed: Vec<Record<R>>,

	/// Records created since the last save
	created: Vec<Record<R>>,

	/// Records deleted since the last save
	deleted: Vec<Record<R>>,

	/// Next record id
	next_id: u64,

	/// Number of commits
	commits: usize,
}

impl<R> Inner<R> {
	/// Returns all live records of `type_tag`, including pending ones
	fn live<'a>(&'a self, type_tag: &'a str) -> impl Iterator<Item = &'a Record<R>> + 'a {
		self.committed
			.iter()
			.chain(&self.created)
			.filter(move |&record| *record.inner.type_tag == *type_tag && !self.deleted.contains(record))
	}

	/// Returns if there are any pending changes
	fn has_changes(&self) -> bool {
		!self.created.is_empty() ||
			!self.deleted.is_empty() ||
			self.committed.iter().any(|record| record.inner.dirty.get())
	}
}

/// In-memory store
pub struct MemoryStore<R> {
	/// Inner
	inner: RefCell<Inner<R>>,
}

impl<R: 'static> MemoryStore<R> {
	/// Creates a new, empty, store
	#[must_use]
	pub fn new() -> Self {
		let inner = Inner {
			factories: HashMap::new(),
			committed: vec![],
			created:   vec![],
			deleted:   vec![],
			next_id:   0,
			commits:   0,
		};
		Self {
			inner: RefCell::new(inner),
		}
	}

	/// Registers a type, with a factory for new records of it
	pub fn register<F>(&self, type_tag: &str, factory: F)
	where
		F: Fn() -> R + 'static,
	{
		self.inner.borrow_mut().factories.insert(type_tag.into(), Rc::new(factory));
	}

	/// Returns if there are any pending changes
	#[must_use]
	pub fn has_changes(&self) -> bool {
		self.inner.borrow().has_changes()
	}

	/// Returns the number of times changes were committed
	#[must_use]
	pub fn commits(&self) -> usize {
		self.inner.borrow().commits
	}

	/// Ensures `type_tag` is registered
	fn check_entity(inner: &Inner<R>, type_tag: &str) -> Result<(), StoreError> {
		match inner.factories.contains_key(type_tag) {
			true => Ok(()),
			false => Err(StoreError::NoEntity(type_tag.to_owned())),
		}
	}
}

impl<R: 'static> Default for MemoryStore<R> {
	fn default() -> Self {
		Self::new()
	}
}

impl<R: 'static> StructuredStore for MemoryStore<R> {
	type Handle = Record<R>;
	type Predicate = Filter<R>;
	type SortOrder = Sort<R>;

	fn create(&self, type_tag: &str) -> Result<Self::Handle, StoreError> {
		let (type_tag, factory) = match self.inner.borrow().factories.get_key_value(type_tag) {
			Some((type_tag, factory)) => (Rc::clone(type_tag), Rc::clone(factory)),
			None => return Err(StoreError::NoEntity(type_tag.to_owned())),
		};

		// Note: The factory may use the store, so we can't be borrowing it here.
		let data = factory();

		let mut inner = self.inner.borrow_mut();
		let record = RecordInner {
			id:    inner.next_id,
			type_tag,
			data:  RefCell::new(data),
			dirty: Cell::new(false),
		};
		let record = Record {
			inner: Rc::new(record),
		};
		inner.next_id += 1;
		inner.created.push(record.clone());
		tracing::trace!(id = record.id(), type_tag = record.type_tag(), "Created record");

		Ok(record)
	}

	fn fetch(
		&self,
		type_tag: &str,
		predicate: Option<&Self::Predicate>,
		sort: Option<&Self::SortOrder>,
	) -> Result<Vec<Self::Handle>, StoreError> {
		let inner = self.inner.borrow();
		Self::check_entity(&inner, type_tag)?;

		let mut records = inner
			.live(type_tag)
			.filter(|record| predicate.is_none_or(|predicate| record.with(|data| predicate.matches(data))))
			.cloned()
			.collect::<Vec<_>>();
		if let Some(sort) = sort {
			records.sort_by(|lhs, rhs| lhs.with(|lhs| rhs.with(|rhs| sort.compare(lhs, rhs))));
		}

		Ok(records)
	}

	fn fetch_single(
		&self,
		type_tag: &str,
		predicate: Option<&Self::Predicate>,
	) -> Result<Option<Self::Handle>, StoreError> {
		let inner = self.inner.borrow();
		Self::check_entity(&inner, type_tag)?;

		let record = inner
			.live(type_tag)
			.find(|record| predicate.is_none_or(|predicate| record.with(|data| predicate.matches(data))))
			.cloned();
		Ok(record)
	}

	fn delete(&self, handle: &Self::Handle) -> Result<(), StoreError> {
		let mut inner = self.inner.borrow_mut();
		Self::check_entity(&inner, handle.type_tag())?;

		// Note: Deleting a record created since the last save just forgets it
		if let Some(idx) = inner.created.iter().position(|record| record == handle) {
			inner.created.remove(idx);
		} else if !inner.deleted.contains(handle) {
			inner.deleted.push(handle.clone());
		}
		tracing::trace!(id = handle.id(), type_tag = handle.type_tag(), "Deleted record");

		Ok(())
	}

	fn save(&self) -> Result<(), StoreError> {
		let mut inner = self.inner.borrow_mut();
		if !inner.has_changes() {
			tracing::debug!("No changes to save");
			return Ok(());
		}

		let inner = &mut *inner;
		let deleted = mem::take(&mut inner.deleted);
		inner.committed.retain(|record| !deleted.contains(record));
		inner.committed.append(&mut inner.created);
		for record in &inner.committed {
			record.inner.dirty.set(false);
		}
		inner.commits += 1;
		tracing::debug!(records = inner.committed.len(), "Saved changes");

		Ok(())
	}
}

impl<R> fmt::Debug for MemoryStore<R> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let Ok(inner) = self.inner.try_borrow() else {
			return f.debug_struct("MemoryStore").finish_non_exhaustive();
		};

		f.debug_struct("MemoryStore")
			.field("committed", &inner.committed.len())
			.field("created", &inner.created.len())
			.field("deleted", &inner.deleted.len())
			.field("commits", &inner.commits)
			.finish_non_exhaustive()
	}
}
