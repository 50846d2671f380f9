use crate::error::QueueError;
use crate::priority_queue::{MedianPriorityQueue, PriorityQueue};
use std::cmp::Ordering;
use std::fmt::{self, Debug, Formatter};

/// Linear-scan median queue used as an oracle for [`crate::MedianQueue`].
///
/// Every query scans or sorts the whole buffer, so max and min are O(n) and median is
/// O(n log n). It takes the same predicate and picks the same lower median.
pub struct LinearMedianQueue<T, F = fn(&T, &T) -> bool> {
	items: Vec<T>,
	higher_priority: F,
}

impl<T> LinearMedianQueue<T> {
	#[must_use]
	pub fn by_ord() -> Self
	where
		T: Ord,
	{
		Self::new(<T as PartialOrd>::gt)
	}

	#[must_use]
	pub fn by_reverse_ord() -> Self
	where
		T: Ord,
	{
		Self::new(<T as PartialOrd>::lt)
	}
}

impl<T, F> LinearMedianQueue<T, F>
where
	F: Fn(&T, &T) -> bool,
{
	pub const fn new(higher_priority: F) -> Self {
		Self {
			items: Vec::new(),
			higher_priority,
		}
	}

	/// # Errors
	///
	/// Returns `QueueError::InvalidArgument` if `higher_priority` is `None`.
	pub fn try_new(higher_priority: Option<F>) -> Result<Self, QueueError> {
		higher_priority
			.map(Self::new)
			.ok_or_else(|| QueueError::InvalidArgument("priority predicate is required".to_string()))
	}

	#[must_use]
	pub fn len(&self) -> usize {
		self.items.len()
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.items.is_empty()
	}

	/// # Errors
	///
	/// Returns `QueueError::EmptyContainer` if the queue is empty.
	pub fn max(&self) -> Result<&T, QueueError> {
		self.max_index().map(|index| &self.items[index]).ok_or(QueueError::EmptyContainer)
	}

	/// # Errors
	///
	/// Returns `QueueError::EmptyContainer` if the queue is empty.
	pub fn min(&self) -> Result<&T, QueueError> {
		self.min_index().map(|index| &self.items[index]).ok_or(QueueError::EmptyContainer)
	}

	/// # Errors
	///
	/// Returns `QueueError::EmptyContainer` if the queue is empty.
	pub fn median(&self) -> Result<&T, QueueError> {
		if self.items.is_empty() {
			return Err(QueueError::EmptyContainer);
		}

		let mut ranked: Vec<&T> = self.items.iter().collect();
		ranked.sort_by(|a, b| self.compare(a, b));
		Ok(ranked[(ranked.len() - 1) / 2])
	}

	pub fn insert(&mut self, item: T) {
		self.items.push(item);
	}

	pub fn delete_max(&mut self) -> Option<T> {
		self.max_index().map(|index| self.items.swap_remove(index))
	}

	pub fn delete_min(&mut self) -> Option<T> {
		self.min_index().map(|index| self.items.swap_remove(index))
	}

	pub fn clear(&mut self) {
		self.items.clear();
	}

	/// Values in storage order
	pub fn iter(&self) -> std::slice::Iter<'_, T> {
		self.items.iter()
	}

	fn compare(&self, a: &T, b: &T) -> Ordering {
		if (self.higher_priority)(a, b) {
			Ordering::Greater
		} else if (self.higher_priority)(b, a) {
			Ordering::Less
		} else {
			Ordering::Equal
		}
	}

	fn max_index(&self) -> Option<usize> {
		self.scan(|candidate, best| (self.higher_priority)(candidate, best))
	}

	fn min_index(&self) -> Option<usize> {
		self.scan(|candidate, best| (self.higher_priority)(best, candidate))
	}

	fn scan(&self, replaces: impl Fn(&T, &T) -> bool) -> Option<usize> {
		if self.items.is_empty() {
			return None;
		}

		let mut best = 0;
		for index in 1..self.items.len() {
			if replaces(&self.items[index], &self.items[best]) {
				best = index;
			}
		}
		Some(best)
	}
}

impl<T: Debug, F> Debug for LinearMedianQueue<T, F> {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_struct("LinearMedianQueue").field("items", &self.items).finish_non_exhaustive()
	}
}

impl<T, F> PriorityQueue<T> for LinearMedianQueue<T, F>
where
	F: Fn(&T, &T) -> bool,
{
	fn count(&self) -> usize {
		self.len()
	}

	fn top(&self) -> Result<&T, QueueError> {
		self.max()
	}

	fn insert(&mut self, item: T) {
		Self::insert(self, item);
	}

	fn delete_top(&mut self) -> Option<T> {
		self.delete_max()
	}

	fn clear(&mut self) {
		Self::clear(self);
	}
}

impl<T, F> MedianPriorityQueue<T> for LinearMedianQueue<T, F>
where
	F: Fn(&T, &T) -> bool,
{
	fn max(&self) -> Result<&T, QueueError> {
		Self::max(self)
	}

	fn min(&self) -> Result<&T, QueueError> {
		Self::min(self)
	}

	fn median(&self) -> Result<&T, QueueError> {
		Self::median(self)
	}

	fn delete_max(&mut self) -> Option<T> {
		Self::delete_max(self)
	}

	fn delete_min(&mut self) -> Option<T> {
		Self::delete_min(self)
	}
}
