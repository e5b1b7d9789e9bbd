//! Changed properties

// Imports
use core::fmt;

/// An observable property of an action
#[derive(PartialEq, Eq, Clone, Copy, Debug, Hash)]
pub enum Property {
	/// Loading status
	Status,

	/// Last error
	Error,

	/// Last value
	Value,

	/// Last update date
	Date,
}

impl Property {
	/// All properties
	pub const ALL: [Self; 4] = [Self::Status, Self::Error, Self::Value, Self::Date];

	/// Bit of this property within [`Properties`]
	const fn bit(self) -> u8 {
		match self {
			Self::Status => 1 << 0,
			Self::Error => 1 << 1,
			Self::Value => 1 << 2,
			Self::Date => 1 << 3,
		}
	}
}

/// Set of properties changed since the last notification
#[derive(PartialEq, Eq, Clone, Copy, Default, Hash)]
pub struct Properties {
	/// Bits
	bits: u8,
}

impl Properties {
	/// Creates an empty set
	#[must_use]
	pub const fn empty() -> Self {
		Self { bits: 0 }
	}

	/// Returns if no property changed
	#[must_use]
	pub const fn is_empty(self) -> bool {
		self.bits == 0
	}

	/// Returns if `property` changed
	#[must_use]
	pub const fn contains(self, property: Property) -> bool {
		self.bits & property.bit() != 0
	}

	/// Marks `property` as changed
	pub const fn insert(&mut self, property: Property) {
		self.bits |= property.bit();
	}

	/// Returns the union of both sets
	#[must_use]
	pub const fn union(self, other: Self) -> Self {
		Self {
			bits: self.bits | other.bits,
		}
	}

	/// Iterates over all changed properties
	pub fn iter(self) -> impl Iterator<Item = Property> {
		Property::ALL.into_iter().filter(move |&property| self.contains(property))
	}
}

impl From<Property> for Properties {
	fn from(property: Property) -> Self {
		Self { bits: property.bit() }
	}
}

impl FromIterator<Property> for Properties {
	fn from_iter<I: IntoIterator<Item = Property>>(iter: I) -> Self {
		let mut properties = Self::empty();
		for property in iter {
			properties.insert(property);
		}

		properties
	}
}

impl fmt::Debug for Properties {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_set().entries(self.iter()).finish()
	}
}
