use crate::error::QueueError;
use crate::priority_queue::{MedianPriorityQueue, PriorityQueue};
use crate::trees::indexed_heap;
use crate::trees::{Handle, IndexedHeap, Priority};
use std::fmt::{self, Debug, Display, Formatter};
use std::iter::Chain;
use std::marker::PhantomData;
use std::rc::Rc;
use tracing::{debug, trace};

/// Max-ordered view: `a` ranks above `b` when the predicate says so.
struct Outranks<F>(Rc<F>);

/// Min-ordered view: `a` ranks above `b` when `b` outranks `a`.
struct Outranked<F>(Rc<F>);

impl<T, F> Priority<Rc<T>> for Outranks<F>
where
	F: Fn(&T, &T) -> bool,
{
	fn higher_priority(&self, a: &Rc<T>, b: &Rc<T>) -> bool {
		(self.0)(&**a, &**b)
	}
}

impl<T, F> Priority<Rc<T>> for Outranked<F>
where
	F: Fn(&T, &T) -> bool,
{
	fn higher_priority(&self, a: &Rc<T>, b: &Rc<T>) -> bool {
		(self.0)(&**b, &**a)
	}
}

/// One half of the queue, held twice: once max-ordered and once min-ordered.
///
/// Both entries of a twin pair share the value and the handle, so the twin of any entry sits at
/// `mirror.position_of(handle)`.
struct Half<T, F> {
	max: IndexedHeap<Rc<T>, Outranks<F>>,
	min: IndexedHeap<Rc<T>, Outranked<F>>,
}

impl<T, F> Half<T, F>
where
	F: Fn(&T, &T) -> bool,
{
	fn new(higher_priority: &Rc<F>) -> Self {
		Self {
			max: IndexedHeap::new(Outranks(Rc::clone(higher_priority))),
			min: IndexedHeap::new(Outranked(Rc::clone(higher_priority))),
		}
	}

	fn len(&self) -> usize {
		self.max.len()
	}

	fn is_empty(&self) -> bool {
		self.max.is_empty()
	}

	fn insert(&mut self, handle: Handle, value: Rc<T>) {
		self.min.insert(handle, Rc::clone(&value));
		self.max.insert(handle, value);
	}

	fn pop_max(&mut self) -> Option<(Handle, Rc<T>)> {
		let (handle, value) = self.max.delete_top()?;
		let twin = self.min.remove(handle);
		debug_assert!(twin.is_some(), "entry {handle} lost its min-ordered twin");
		Some((handle, value))
	}

	fn pop_min(&mut self) -> Option<(Handle, Rc<T>)> {
		let (handle, value) = self.min.delete_top()?;
		let twin = self.max.remove(handle);
		debug_assert!(twin.is_some(), "entry {handle} lost its max-ordered twin");
		Some((handle, value))
	}

	fn clear(&mut self) {
		self.max.clear();
		self.min.clear();
	}

	fn is_valid(&self) -> bool {
		self.max.is_valid()
			&& self.min.is_valid()
			&& self.max.len() == self.min.len()
			&& self.max.handles().all(|handle| self.min.contains(handle))
	}
}

/// Hands out handles for twin pairs and takes them back when a pair dies.
#[derive(Debug, Default)]
struct HandleArena {
	next: usize,
	free: Vec<Handle>,
}

impl HandleArena {
	fn allocate(&mut self) -> Handle {
		self.free.pop().unwrap_or_else(|| {
			let handle = Handle::new(self.next);
			self.next += 1;
			handle
		})
	}

	fn release(&mut self, handle: Handle) {
		self.free.push(handle);
	}

	fn reset(&mut self) {
		self.next = 0;
		self.free.clear();
	}

	fn live(&self) -> usize {
		self.next - self.free.len()
	}
}

/// A priority queue with O(1) access to its maximum, minimum and median.
///
/// `higher_priority(a, b)` must return true iff `a` strictly outranks `b`, and must be a
/// consistent preorder over everything inserted. Elements are split into a lower half of size `s`
/// and an upper half of size `b` with `0 <= s - b <= 1`:
///
/// * median is the top of the lower half's max-ordered heap (the lower median for even counts)
/// * min is the top of the lower half's min-ordered heap
/// * max is the top of the upper half's max-ordered heap, or the median while `b == 0`
///
/// Insertion and deletion of max or min are O(log n). Ties are broken arbitrarily.
///
/// ```
/// use median_queue::MedianQueue;
///
/// let mut queue = MedianQueue::by_ord();
/// for value in [5, 1, 9, 3] {
/// 	queue.insert(value);
/// }
/// assert_eq!(queue.max(), Ok(&9));
/// assert_eq!(queue.min(), Ok(&1));
/// assert_eq!(queue.median(), Ok(&3));
/// ```
pub struct MedianQueue<T, F = fn(&T, &T) -> bool> {
	lower: Half<T, F>,
	upper: Half<T, F>,
	handles: HandleArena,
	higher_priority: Rc<F>,
}

impl<T> MedianQueue<T> {
	#[must_use]
	pub const fn builder() -> MedianQueueBuilder<T> {
		MedianQueueBuilder::new()
	}

	/// Queue where a greater value has higher priority
	#[must_use]
	pub fn by_ord() -> Self
	where
		T: Ord,
	{
		Self::new(<T as PartialOrd>::gt)
	}

	/// Queue where a smaller value has higher priority
	#[must_use]
	pub fn by_reverse_ord() -> Self
	where
		T: Ord,
	{
		Self::new(<T as PartialOrd>::lt)
	}
}

impl<T, F> MedianQueue<T, F>
where
	F: Fn(&T, &T) -> bool,
{
	pub fn new(higher_priority: F) -> Self {
		let higher_priority = Rc::new(higher_priority);
		Self {
			lower: Half::new(&higher_priority),
			upper: Half::new(&higher_priority),
			handles: HandleArena::default(),
			higher_priority,
		}
	}

	/// Builds a queue from a predicate that may be absent
	///
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
		self.lower.len() + self.upper.len()
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.lower.is_empty()
	}

	/// Size of the lower half, median included
	#[must_use]
	pub fn lower_len(&self) -> usize {
		self.lower.len()
	}

	#[must_use]
	pub fn upper_len(&self) -> usize {
		self.upper.len()
	}

	/// # Errors
	///
	/// Returns `QueueError::EmptyContainer` if the queue is empty.
	pub fn max(&self) -> Result<&T, QueueError> {
		if self.upper.is_empty() {
			return self.median();
		}
		self.upper.max.top().map(|value| &**value)
	}

	/// # Errors
	///
	/// Returns `QueueError::EmptyContainer` if the queue is empty.
	pub fn min(&self) -> Result<&T, QueueError> {
		self.lower.min.top().map(|value| &**value)
	}

	/// Lower median: for an even count, the higher-priority element of the lower half
	///
	/// # Errors
	///
	/// Returns `QueueError::EmptyContainer` if the queue is empty.
	pub fn median(&self) -> Result<&T, QueueError> {
		self.lower.max.top().map(|value| &**value)
	}

	pub fn insert(&mut self, item: T) {
		let handle = self.handles.allocate();
		let value = Rc::new(item);

		let below_median = match self.lower.max.top() {
			Ok(median) => (self.higher_priority)(&**median, &*value),
			Err(_) => true,
		};

		if below_median {
			self.lower.insert(handle, value);
			if self.lower.len() > self.upper.len() + 1 {
				self.promote();
			}
		} else {
			self.upper.insert(handle, value);
			if self.lower.len() < self.upper.len() {
				self.demote();
			}
		}
	}

	/// Removes and returns the highest-priority element
	pub fn delete_max(&mut self) -> Option<T> {
		if self.upper.is_empty() {
			// Max and median coincide only while the queue holds at most one element.
			debug_assert!(
				self.lower.len() <= 1,
				"upper half is empty but the lower half holds {} entries",
				self.lower.len()
			);
			return self.delete_min();
		}

		let removed = self.upper.pop_max();
		if self.lower.len() > self.upper.len() + 1 {
			self.promote();
		}
		removed.and_then(|entry| self.release(entry))
	}

	/// Removes and returns the lowest-priority element
	pub fn delete_min(&mut self) -> Option<T> {
		let removed = self.lower.pop_min()?;
		if self.lower.len() < self.upper.len() {
			self.demote();
		}
		self.release(removed)
	}

	pub fn clear(&mut self) {
		self.lower.clear();
		self.upper.clear();
		self.handles.reset();
		debug!("cleared median queue");
	}

	/// Lower-half values first, then upper-half values, each in heap order
	pub fn iter(&self) -> Iter<'_, T> {
		Iter {
			inner: self.lower.max.iter().chain(self.upper.max.iter()),
		}
	}

	/// Checks every heap, every twin link, the half balance and the split around the median
	#[must_use]
	pub fn is_valid(&self) -> bool {
		let balanced = self.lower.len() >= self.upper.len() && self.lower.len() <= self.upper.len() + 1;
		let split = match (self.lower.max.top(), self.upper.min.top()) {
			(Ok(median), Ok(upper_min)) => !(self.higher_priority)(&**median, &**upper_min),
			_ => true,
		};

		self.lower.is_valid() && self.upper.is_valid() && balanced && split && self.handles.live() == self.len()
	}

	/// Moves the lower half's highest pair into the upper half
	fn promote(&mut self) {
		if let Some((handle, value)) = self.lower.pop_max() {
			self.upper.insert(handle, value);
			trace!(%handle, lower = self.lower.len(), upper = self.upper.len(), "promoted pair to upper half");
		}
	}

	/// Moves the upper half's lowest pair into the lower half
	fn demote(&mut self) {
		if let Some((handle, value)) = self.upper.pop_min() {
			self.lower.insert(handle, value);
			trace!(%handle, lower = self.lower.len(), upper = self.upper.len(), "demoted pair to lower half");
		}
	}

	fn release(&mut self, (handle, value): (Handle, Rc<T>)) -> Option<T> {
		self.handles.release(handle);
		trace!(%handle, count = self.len(), "released pair");
		// Both twins have left their heaps, so this is the last reference.
		Rc::try_unwrap(value).ok()
	}
}

impl<T, F> Extend<T> for MedianQueue<T, F>
where
	F: Fn(&T, &T) -> bool,
{
	fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
		for item in iter {
			self.insert(item);
		}
	}
}

impl<T, F> Debug for MedianQueue<T, F>
where
	F: Fn(&T, &T) -> bool,
{
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_struct("MedianQueue")
			.field("lower", &self.lower.len())
			.field("upper", &self.upper.len())
			.finish_non_exhaustive()
	}
}

/// Prints the max-ordered heap of each half; the lower root is the median.
impl<T: Display, F> Display for MedianQueue<T, F>
where
	F: Fn(&T, &T) -> bool,
{
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		writeln!(f, "lower ({}):", self.lower.len())?;
		write!(f, "{}", self.lower.max)?;
		writeln!(f, "upper ({}):", self.upper.len())?;
		write!(f, "{}", self.upper.max)
	}
}

impl<T, F> PriorityQueue<T> for MedianQueue<T, F>
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

impl<T, F> MedianPriorityQueue<T> for MedianQueue<T, F>
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

impl<'a, T, F> IntoIterator for &'a MedianQueue<T, F>
where
	F: Fn(&T, &T) -> bool,
{
	type Item = &'a T;
	type IntoIter = Iter<'a, T>;

	fn into_iter(self) -> Self::IntoIter {
		self.iter()
	}
}

pub struct Iter<'a, T> {
	inner: Chain<indexed_heap::Iter<'a, Rc<T>>, indexed_heap::Iter<'a, Rc<T>>>,
}

impl<'a, T> Iterator for Iter<'a, T> {
	type Item = &'a T;

	fn next(&mut self) -> Option<Self::Item> {
		self.inner.next().map(|value| &**value)
	}

	fn size_hint(&self) -> (usize, Option<usize>) {
		self.inner.size_hint()
	}
}

/// Builder for [`MedianQueue`] that rejects a missing predicate at `build` time
pub struct MedianQueueBuilder<T, F = fn(&T, &T) -> bool> {
	higher_priority: Option<F>,
	_marker: PhantomData<fn(&T)>,
}

impl<T> MedianQueueBuilder<T> {
	#[must_use]
	pub const fn new() -> Self {
		Self {
			higher_priority: None,
			_marker: PhantomData,
		}
	}
}

impl<T> Default for MedianQueueBuilder<T> {
	fn default() -> Self {
		Self::new()
	}
}

impl<T, F> MedianQueueBuilder<T, F> {
	#[must_use]
	pub fn priority<G>(self, higher_priority: G) -> MedianQueueBuilder<T, G>
	where
		G: Fn(&T, &T) -> bool,
	{
		MedianQueueBuilder {
			higher_priority: Some(higher_priority),
			_marker: PhantomData,
		}
	}

	/// # Errors
	///
	/// Returns `QueueError::InvalidArgument` if no priority predicate was supplied.
	pub fn build(self) -> Result<MedianQueue<T, F>, QueueError>
	where
		F: Fn(&T, &T) -> bool,
	{
		MedianQueue::try_new(self.higher_priority)
	}
}
