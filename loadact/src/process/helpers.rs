//! Process helpers
//!
//! Common transforms for use with [`LoadAction::then`](crate::LoadAction::then).

// Imports
use crate::{LoadError, LoadResult};

/// Unwraps an optional value, failing if it's missing
pub fn unwrap<T>(value: Option<T>) -> LoadResult<T> {
	value.ok_or_else(|| LoadError::msg("Loaded value was missing"))
}

/// Wraps a value in `Some`
pub fn make_optional<T>(value: T) -> LoadResult<Option<T>> {
	Ok(Some(value))
}

/// Returns the first element
pub fn first<T>(values: Vec<T>) -> LoadResult<Option<T>> {
	Ok(values.into_iter().next())
}

/// Returns the last element
pub fn last<T>(values: Vec<T>) -> LoadResult<Option<T>> {
	Ok(values.into_iter().next_back())
}

/// Reverses all elements
pub fn reverse<T>(mut values: Vec<T>) -> LoadResult<Vec<T>> {
	values.reverse();
	Ok(values)
}

/// Sorts all elements
pub fn sort<T: Ord>(mut values: Vec<T>) -> LoadResult<Vec<T>> {
	values.sort();
	Ok(values)
}

/// Removes all missing elements
pub fn filter_nones<T>(values: Vec<Option<T>>) -> LoadResult<Vec<T>> {
	Ok(values.into_iter().flatten().collect())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn unwrap_missing() {
		assert!(self::unwrap::<i32>(None).is_err());
		assert_eq!(self::unwrap(Some(5)).ok(), Some(5));
	}

	#[test]
	fn collections() {
		assert_eq!(self::first(vec![1, 2, 3]).ok(), Some(Some(1)));
		assert_eq!(self::last(vec![1, 2, 3]).ok(), Some(Some(3)));
		assert_eq!(self::last(Vec::<i32>::new()).ok(), Some(None));
		assert_eq!(self::reverse(vec![1, 2, 3]).ok(), Some(vec![3, 2, 1]));
		assert_eq!(self::sort(vec![3, 1, 2]).ok(), Some(vec![1, 2, 3]));
		assert_eq!(self::filter_nones(vec![Some(1), None, Some(2)]).ok(), Some(vec![1, 2]));
		assert_eq!(self::make_optional(4).ok(), Some(Some(4)));
	}
}
