use crate::error::QueueError;
use crate::priority_queue::MedianPriorityQueue;
use std::fmt::{self, Display, Formatter};
use std::marker::PhantomData;
use thiserror::Error;
use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
	Insert,
	DeleteMax,
	DeleteMin,
	Clear,
}

impl Display for Operation {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		let name = match self {
			Self::Insert => "insert",
			Self::DeleteMax => "delete_max",
			Self::DeleteMin => "delete_min",
			Self::Clear => "clear",
		};
		f.write_str(name)
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
	Max,
	Min,
	Median,
}

impl Display for View {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		let name = match self {
			Self::Max => "max",
			Self::Min => "min",
			Self::Median => "median",
		};
		f.write_str(name)
	}
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DivergenceError {
	#[error("count diverged after {operation}: {first} != {second}")]
	Count { operation: Operation, first: usize, second: usize },
	#[error("{view} diverged after {operation}")]
	View { operation: Operation, view: View },
	#[error("{view} query failed after {operation}: {source}")]
	Query {
		operation: Operation,
		view: View,
		#[source]
		source: QueueError,
	},
}

/// Drives two median queues in lockstep and compares count, max, min and median after every call.
///
/// `equivalent` decides whether two reported elements match; it is usually equality, but can be
/// looser when the predicate ranks distinct values equally.
pub struct DifferentialTester<T, A, B, E> {
	first: A,
	second: B,
	equivalent: E,
	checks: usize,
	_marker: PhantomData<fn(T)>,
}

impl<T, A, B, E> DifferentialTester<T, A, B, E>
where
	A: MedianPriorityQueue<T>,
	B: MedianPriorityQueue<T>,
	E: Fn(&T, &T) -> bool,
{
	pub const fn new(first: A, second: B, equivalent: E) -> Self {
		Self {
			first,
			second,
			equivalent,
			checks: 0,
			_marker: PhantomData,
		}
	}

	/// # Errors
	///
	/// Returns the first disagreement between the two queues.
	pub fn test_insert(&mut self, item: T) -> Result<(), DivergenceError>
	where
		T: Clone,
	{
		self.first.insert(item.clone());
		self.second.insert(item);
		self.verify(Operation::Insert)
	}

	/// # Errors
	///
	/// Returns the first disagreement between the two queues.
	pub fn test_delete_max(&mut self) -> Result<(), DivergenceError> {
		self.first.delete_max();
		self.second.delete_max();
		self.verify(Operation::DeleteMax)
	}

	/// # Errors
	///
	/// Returns the first disagreement between the two queues.
	pub fn test_delete_min(&mut self) -> Result<(), DivergenceError> {
		self.first.delete_min();
		self.second.delete_min();
		self.verify(Operation::DeleteMin)
	}

	/// # Errors
	///
	/// Returns the first disagreement between the two queues.
	pub fn test_clear(&mut self) -> Result<(), DivergenceError> {
		self.first.clear();
		self.second.clear();
		self.verify(Operation::Clear)
	}

	/// Number of successful comparisons so far
	#[must_use]
	pub const fn checks(&self) -> usize {
		self.checks
	}

	#[must_use]
	pub const fn first(&self) -> &A {
		&self.first
	}

	#[must_use]
	pub const fn second(&self) -> &B {
		&self.second
	}

	pub fn into_inner(self) -> (A, B) {
		(self.first, self.second)
	}

	fn verify(&mut self, operation: Operation) -> Result<(), DivergenceError> {
		let (first, second) = (self.first.count(), self.second.count());
		if first != second {
			return Err(DivergenceError::Count { operation, first, second });
		}

		if first > 0 {
			for view in [View::Max, View::Min, View::Median] {
				self.compare_view(operation, view)?;
			}
		}

		self.checks += 1;
		trace!(%operation, count = first, checks = self.checks, "queues agree");
		Ok(())
	}

	fn compare_view(&self, operation: Operation, view: View) -> Result<(), DivergenceError> {
		let (first, second) = match view {
			View::Max => (self.first.max(), self.second.max()),
			View::Min => (self.first.min(), self.second.min()),
			View::Median => (self.first.median(), self.second.median()),
		};
		let first = first.map_err(|source| DivergenceError::Query { operation, view, source })?;
		let second = second.map_err(|source| DivergenceError::Query { operation, view, source })?;

		if (self.equivalent)(first, second) {
			Ok(())
		} else {
			Err(DivergenceError::View { operation, view })
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{LinearMedianQueue, MedianQueue};

	fn same(a: &i32, b: &i32) -> bool {
		a == b
	}

	#[test]
	fn test_agreeing_queues() {
		let mut tester = DifferentialTester::new(MedianQueue::by_ord(), LinearMedianQueue::by_ord(), same);
		for value in [5, 1, 9, 3, 3, 12, -4] {
			tester.test_insert(value).unwrap();
		}
		tester.test_delete_max().unwrap();
		tester.test_delete_min().unwrap();
		tester.test_delete_min().unwrap();
		tester.test_clear().unwrap();
		tester.test_delete_max().unwrap();

		assert_eq!(tester.checks(), 12);
		assert!(tester.first().is_empty());
		assert!(tester.second().is_empty());
	}

	#[test]
	fn test_detects_view_divergence() {
		let mut tester = DifferentialTester::new(MedianQueue::by_ord(), LinearMedianQueue::by_reverse_ord(), same);
		tester.test_insert(1).unwrap();
		let err = tester.test_insert(2).unwrap_err();
		assert_eq!(
			err,
			DivergenceError::View {
				operation: Operation::Insert,
				view: View::Max
			}
		);
		assert_eq!(err.to_string(), "max diverged after insert");
	}

	#[test]
	fn test_detects_count_divergence() {
		let mut ahead = MedianQueue::by_ord();
		ahead.extend([1, 2]);
		let mut tester = DifferentialTester::new(ahead, LinearMedianQueue::by_ord(), same);

		let err = tester.test_delete_max().unwrap_err();
		assert_eq!(
			err,
			DivergenceError::Count {
				operation: Operation::DeleteMax,
				first: 1,
				second: 0
			}
		);
		assert_eq!(tester.checks(), 0);
	}

	#[test]
	fn test_loose_equivalence() {
		let by_tens = |a: &i32, b: &i32| a / 10 > b / 10;
		let mut tester = DifferentialTester::new(MedianQueue::new(by_tens), LinearMedianQueue::new(by_tens), |a: &i32, b: &i32| a / 10 == b / 10);
		for value in [11, 15, 23, 27, 31, 19] {
			tester.test_insert(value).unwrap();
		}
		tester.test_delete_max().unwrap();
		tester.test_delete_min().unwrap();

		let (first, second) = tester.into_inner();
		assert_eq!(first.len(), second.len());
	}
}
