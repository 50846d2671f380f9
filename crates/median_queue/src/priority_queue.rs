use crate::error::QueueError;

pub trait PriorityQueue<T> {
	fn count(&self) -> usize;

	/// # Errors
	///
	/// Returns `QueueError::EmptyContainer` if the queue is empty.
	fn top(&self) -> Result<&T, QueueError>;

	fn insert(&mut self, item: T);

	fn delete_top(&mut self) -> Option<T>;

	fn clear(&mut self);

	fn is_empty(&self) -> bool {
		self.count() == 0
	}
}

/// A priority queue that also exposes its minimum and median.
///
/// `top` is `max` and `delete_top` is `delete_max`. The median is the lower median: with an even
/// count it is the element just below the middle in priority order.
pub trait MedianPriorityQueue<T>: PriorityQueue<T> {
	/// # Errors
	///
	/// Returns `QueueError::EmptyContainer` if the queue is empty.
	fn max(&self) -> Result<&T, QueueError>;

	/// # Errors
	///
	/// Returns `QueueError::EmptyContainer` if the queue is empty.
	fn min(&self) -> Result<&T, QueueError>;

	/// # Errors
	///
	/// Returns `QueueError::EmptyContainer` if the queue is empty.
	fn median(&self) -> Result<&T, QueueError>;

	fn delete_max(&mut self) -> Option<T>;

	fn delete_min(&mut self) -> Option<T>;
}
