use crate::error::QueueError;
use std::fmt::{self, Debug, Display, Formatter};

/// Stable identifier of a heap entry.
///
/// Handles are chosen by the caller and survive every internal move, so an entry can be located
/// with [`IndexedHeap::position_of`] in O(1) no matter how often it has been sifted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Handle(usize);

impl Handle {
	#[must_use]
	pub const fn new(index: usize) -> Self {
		Self(index)
	}

	#[must_use]
	pub const fn index(self) -> usize {
		self.0
	}
}

impl Display for Handle {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		write!(f, "#{}", self.0)
	}
}

/// Strict priority predicate: true iff `a` outranks `b`.
pub trait Priority<V> {
	fn higher_priority(&self, a: &V, b: &V) -> bool;
}

impl<V, F> Priority<V> for F
where
	F: Fn(&V, &V) -> bool,
{
	fn higher_priority(&self, a: &V, b: &V) -> bool {
		self(a, b)
	}
}

/// A node in the heap storing a handle-value pair
#[derive(Debug)]
struct HeapNode<V> {
	handle: Handle,
	value: V,
}

/// An array-backed binary heap ordered by a strict priority predicate.
///
/// The predicate must be a consistent preorder; the heap never validates it. Besides the usual
/// peek/insert/pop the heap can delete an entry at an arbitrary slot in O(log n): it keeps a side
/// table from [`Handle`] to slot that is rewritten on every move.
///
/// Deleted slots are vacated rather than popped. An insert reuses the first vacant slot, and the
/// vacant tail is truncated once it makes up at least half of the backing array.
pub struct IndexedHeap<V, P> {
	nodes: Vec<Option<HeapNode<V>>>,
	positions: Vec<Option<usize>>,
	vacant: usize,
	priority: P,
}

impl<V, P> IndexedHeap<V, P>
where
	P: Priority<V>,
{
	/// Creates a new empty heap
	pub const fn new(priority: P) -> Self {
		Self {
			nodes: Vec::new(),
			positions: Vec::new(),
			vacant: 0,
			priority,
		}
	}

	/// Returns the number of live entries
	#[must_use]
	pub fn len(&self) -> usize {
		self.nodes.len() - self.vacant
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Returns the highest-priority value
	///
	/// # Errors
	///
	/// Returns `QueueError::EmptyContainer` if the heap holds no entries.
	pub fn top(&self) -> Result<&V, QueueError> {
		self.peek().map(|(_, value)| value).ok_or(QueueError::EmptyContainer)
	}

	/// Returns the handle and value at the root without removing them
	#[must_use]
	pub fn peek(&self) -> Option<(Handle, &V)> {
		self.nodes.first().and_then(Option::as_ref).map(|node| (node.handle, &node.value))
	}

	/// Returns the slot currently occupied by `handle`
	#[must_use]
	pub fn position_of(&self, handle: Handle) -> Option<usize> {
		self.positions.get(handle.index()).copied().flatten()
	}

	#[must_use]
	pub fn contains(&self, handle: Handle) -> bool {
		self.position_of(handle).is_some()
	}

	/// Inserts `value` under `handle`, reusing a vacant slot when one is available.
	///
	/// The handle must not already be live in this heap.
	pub fn insert(&mut self, handle: Handle, value: V) {
		debug_assert!(!self.contains(handle), "handle {handle} is already in the heap");

		let index = self.len();
		let node = Some(HeapNode { handle, value });
		if self.vacant > 0 {
			self.nodes[index] = node;
			self.vacant -= 1;
		} else {
			self.nodes.push(node);
		}
		self.set_position(handle, Some(index));
		self.sift_up(index);
	}

	/// Removes and returns the highest-priority entry
	pub fn delete_top(&mut self) -> Option<(Handle, V)> {
		if self.is_empty() {
			return None;
		}

		let last = self.len() - 1;
		self.swap(0, last);
		let removed = self.vacate(last);
		self.sift_down(0);
		self.compact();
		removed
	}

	/// Removes the entry at slot `position`.
	///
	/// The last live entry takes over the slot. It may belong either above or below it, so both
	/// sifts run.
	pub(crate) fn delete_at(&mut self, position: usize) -> Option<(Handle, V)> {
		if position >= self.len() {
			return None;
		}

		let last = self.len() - 1;
		self.swap(position, last);
		let removed = self.vacate(last);
		if position < self.len() {
			self.sift_up(position);
			self.sift_down(position);
		}
		self.compact();
		removed
	}

	/// Removes the entry stored under `handle`
	pub(crate) fn remove(&mut self, handle: Handle) -> Option<(Handle, V)> {
		let position = self.position_of(handle)?;
		self.delete_at(position)
	}

	pub fn clear(&mut self) {
		self.nodes.clear();
		self.positions.clear();
		self.vacant = 0;
	}

	/// Iterates over live values in backing order (heap order, not sorted)
	pub fn iter(&self) -> Iter<'_, V> {
		Iter {
			inner: self.nodes[..self.len()].iter(),
		}
	}

	/// Iterates over the handles of live entries in backing order
	pub fn handles(&self) -> impl Iterator<Item = Handle> + '_ {
		self.nodes[..self.len()].iter().flatten().map(|node| node.handle)
	}

	/// Returns true if no child outranks its parent and every handle maps to its slot
	#[must_use]
	pub fn is_valid(&self) -> bool {
		let len = self.len();
		if (1..len).any(|index| self.outranks(index, Self::parent(index))) {
			return false;
		}

		let live_tracked = self.nodes[..len]
			.iter()
			.enumerate()
			.all(|(index, slot)| slot.as_ref().is_some_and(|node| self.position_of(node.handle) == Some(index)));
		let tail_vacant = self.nodes[len..].iter().all(Option::is_none);
		let tracked = self.positions.iter().filter(|position| position.is_some()).count();

		live_tracked && tail_vacant && tracked == len
	}

	#[cfg(test)]
	pub(crate) fn backing_len(&self) -> usize {
		self.nodes.len()
	}

	// Helper methods
	const fn parent(index: usize) -> usize {
		(index.saturating_sub(1)) / 2
	}

	const fn left_child(index: usize) -> usize {
		2 * index + 1
	}

	const fn right_child(index: usize) -> usize {
		2 * index + 2
	}

	fn outranks(&self, a: usize, b: usize) -> bool {
		match (&self.nodes[a], &self.nodes[b]) {
			(Some(a), Some(b)) => self.priority.higher_priority(&a.value, &b.value),
			_ => false,
		}
	}

	fn set_position(&mut self, handle: Handle, position: Option<usize>) {
		let index = handle.index();
		if index >= self.positions.len() {
			self.positions.resize(index + 1, None);
		}
		self.positions[index] = position;
	}

	fn record_position(&mut self, index: usize) {
		if let Some(handle) = self.nodes[index].as_ref().map(|node| node.handle) {
			self.set_position(handle, Some(index));
		}
	}

	fn swap(&mut self, a: usize, b: usize) {
		if a == b {
			return;
		}
		self.nodes.swap(a, b);
		self.record_position(a);
		self.record_position(b);
	}

	fn vacate(&mut self, index: usize) -> Option<(Handle, V)> {
		let HeapNode { handle, value } = self.nodes[index].take()?;
		self.vacant += 1;
		self.set_position(handle, None);
		Some((handle, value))
	}

	fn compact(&mut self) {
		if self.vacant > 0 && self.nodes.len() <= 2 * self.vacant {
			let live = self.len();
			self.nodes.truncate(live);
			self.vacant = 0;
		}
	}

	fn sift_up(&mut self, mut index: usize) {
		while index > 0 {
			let parent = Self::parent(index);
			if !self.outranks(index, parent) {
				break;
			}
			self.swap(parent, index);
			index = parent;
		}
	}

	fn sift_down(&mut self, mut index: usize) {
		let len = self.len();
		loop {
			let left = Self::left_child(index);
			let right = Self::right_child(index);
			let mut highest = index;

			if left < len && self.outranks(left, highest) {
				highest = left;
			}
			if right < len && self.outranks(right, highest) {
				highest = right;
			}

			if highest == index {
				break;
			}

			self.swap(index, highest);
			index = highest;
		}
	}
}

impl<V, P> Debug for IndexedHeap<V, P> {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_struct("IndexedHeap")
			.field("len", &(self.nodes.len() - self.vacant))
			.field("vacant", &self.vacant)
			.finish_non_exhaustive()
	}
}

impl<V: Display, P> Display for IndexedHeap<V, P>
where
	P: Priority<V>,
{
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		if self.is_empty() {
			return writeln!(f, "IndexedHeap: <empty>");
		}

		writeln!(f, "IndexedHeap:")?;
		self.format_level(f, 0, 0)
	}
}

// Helper methods for display
impl<V: Display, P> IndexedHeap<V, P>
where
	P: Priority<V>,
{
	fn format_level(&self, f: &mut Formatter<'_>, index: usize, level: usize) -> fmt::Result {
		let Some(node) = self.nodes.get(index).and_then(Option::as_ref) else {
			return Ok(());
		};

		let indent = "    ".repeat(level);
		writeln!(f, "{indent}└── ({}, {})", node.handle, node.value)?;

		self.format_level(f, Self::left_child(index), level + 1)?;
		self.format_level(f, Self::right_child(index), level + 1)
	}
}

impl<'a, V, P> IntoIterator for &'a IndexedHeap<V, P>
where
	P: Priority<V>,
{
	type Item = &'a V;
	type IntoIter = Iter<'a, V>;

	fn into_iter(self) -> Self::IntoIter {
		self.iter()
	}
}

pub struct Iter<'a, V> {
	inner: std::slice::Iter<'a, Option<HeapNode<V>>>,
}

impl<'a, V> Iterator for Iter<'a, V> {
	type Item = &'a V;

	fn next(&mut self) -> Option<Self::Item> {
		self.inner.by_ref().find_map(|slot| slot.as_ref().map(|node| &node.value))
	}

	fn size_hint(&self) -> (usize, Option<usize>) {
		self.inner.size_hint()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn max_heap() -> IndexedHeap<i32, impl Fn(&i32, &i32) -> bool> {
		IndexedHeap::new(|a: &i32, b: &i32| a > b)
	}

	fn filled(values: &[i32]) -> IndexedHeap<i32, impl Fn(&i32, &i32) -> bool> {
		let mut heap = max_heap();
		for (i, &value) in values.iter().enumerate() {
			heap.insert(Handle::new(i), value);
		}
		heap
	}

	fn drain(heap: &mut IndexedHeap<i32, impl Fn(&i32, &i32) -> bool>) -> Vec<i32> {
		let mut out = Vec::new();
		while let Some((_, value)) = heap.delete_top() {
			assert!(heap.is_valid());
			out.push(value);
		}
		out
	}

	#[test]
	fn test_new_heap_is_empty() {
		let heap = max_heap();
		assert!(heap.is_empty());
		assert_eq!(heap.len(), 0);
		assert_eq!(heap.top(), Err(QueueError::EmptyContainer));
		assert_eq!(heap.peek().map(|(handle, _)| handle), None);
	}

	#[test]
	fn test_insert_keeps_highest_on_top() {
		let heap = filled(&[30, 20, 40, 10]);
		assert_eq!(heap.len(), 4);
		assert_eq!(heap.top(), Ok(&40));
		assert_eq!(heap.peek().map(|(handle, _)| handle), Some(Handle::new(2)));
		assert!(heap.is_valid());
	}

	#[test]
	fn test_delete_top_yields_priority_order() {
		let mut heap = filled(&[5, 1, 9, 3, 7, 7, 2]);
		assert_eq!(drain(&mut heap), vec![9, 7, 7, 5, 3, 2, 1]);
		assert!(heap.delete_top().is_none());
	}

	#[test]
	fn test_delete_top_returns_handle() {
		let mut heap = filled(&[5, 8]);
		assert_eq!(heap.delete_top(), Some((Handle::new(1), 8)));
		assert!(!heap.contains(Handle::new(1)));
		assert!(heap.contains(Handle::new(0)));
	}

	#[test]
	fn test_reverse_predicate_builds_min_heap() {
		let mut heap = IndexedHeap::new(|a: &i32, b: &i32| b > a);
		for (i, value) in [4, 8, 1, 6].into_iter().enumerate() {
			heap.insert(Handle::new(i), value);
		}
		assert_eq!(heap.top(), Ok(&1));
		heap.delete_top();
		assert_eq!(heap.top(), Ok(&4));
	}

	#[test]
	fn test_positions_follow_moves() {
		let heap = filled(&[1, 2, 3, 4, 5, 6]);
		for i in 0..6 {
			let handle = Handle::new(i);
			let position = heap.position_of(handle).unwrap();
			assert_eq!(heap.nodes[position].as_ref().unwrap().handle, handle);
		}
		assert_eq!(heap.position_of(Handle::new(5)), Some(0));
		assert_eq!(heap.position_of(Handle::new(42)), None);
	}

	#[test]
	fn test_delete_at_sifts_down() {
		let mut heap = filled(&[50, 40, 45, 10, 20, 30, 35]);
		let root = heap.position_of(Handle::new(0)).unwrap();
		assert_eq!(root, 0);
		assert_eq!(heap.delete_at(root), Some((Handle::new(0), 50)));
		assert!(heap.is_valid());
		assert_eq!(heap.top(), Ok(&45));
	}

	#[test]
	fn test_delete_at_sifts_up() {
		// The replacement for a deep slot in the left subtree comes from the right subtree and
		// outranks its new parent.
		let mut heap = filled(&[100, 10, 90, 5, 6, 80, 85]);
		let position = heap.position_of(Handle::new(3)).unwrap();
		assert_eq!(heap.delete_at(position), Some((Handle::new(3), 5)));
		assert!(heap.is_valid());
		assert_eq!(drain(&mut heap), vec![100, 90, 85, 80, 10, 6]);
	}

	#[test]
	fn test_delete_at_last_slot() {
		let mut heap = filled(&[3, 2, 1]);
		assert_eq!(heap.delete_at(2), Some((Handle::new(2), 1)));
		assert!(heap.is_valid());
		assert_eq!(heap.len(), 2);
	}

	#[test]
	fn test_delete_at_out_of_range() {
		let mut heap = filled(&[3, 2, 1]);
		assert_eq!(heap.delete_at(3), None);
		assert_eq!(heap.delete_at(100), None);
		assert_eq!(heap.len(), 3);
	}

	#[test]
	fn test_remove_by_handle() {
		let mut heap = filled(&[7, 3, 9, 1]);
		assert_eq!(heap.remove(Handle::new(2)), Some((Handle::new(2), 9)));
		assert_eq!(heap.remove(Handle::new(2)), None);
		assert_eq!(heap.top(), Ok(&7));
		assert!(heap.is_valid());
	}

	#[test]
	fn test_lazy_compaction() {
		let mut heap = filled(&[1, 2, 3, 4, 5, 6, 7, 8]);
		assert_eq!(heap.backing_len(), 8);

		for _ in 0..3 {
			heap.delete_top();
		}
		assert_eq!(heap.len(), 5);
		assert_eq!(heap.backing_len(), 8);

		// Reuses a vacated slot instead of growing
		heap.insert(Handle::new(20), 100);
		assert_eq!(heap.backing_len(), 8);
		assert_eq!(heap.top(), Ok(&100));

		for _ in 0..4 {
			heap.delete_top();
		}
		assert_eq!(heap.len(), 2);
		assert_eq!(heap.backing_len(), 2);
		assert!(heap.is_valid());
	}

	#[test]
	fn test_single_entry_delete_compacts_to_empty() {
		let mut heap = filled(&[1]);
		heap.delete_top();
		assert!(heap.is_empty());
		assert_eq!(heap.backing_len(), 0);
	}

	#[test]
	fn test_handles_can_be_reused_after_removal() {
		let mut heap = filled(&[1, 2]);
		heap.remove(Handle::new(0));
		heap.insert(Handle::new(0), 10);
		assert_eq!(heap.peek().map(|(handle, _)| handle), Some(Handle::new(0)));
		assert!(heap.is_valid());
	}

	#[test]
	fn test_equal_priorities() {
		let mut heap = filled(&[4, 4, 4, 4]);
		assert_eq!(heap.top(), Ok(&4));
		assert_eq!(drain(&mut heap), vec![4, 4, 4, 4]);
	}

	#[test]
	fn test_clear() {
		let mut heap = filled(&[1, 2, 3]);
		heap.delete_top();
		heap.clear();
		assert!(heap.is_empty());
		assert_eq!(heap.backing_len(), 0);
		assert!(!heap.contains(Handle::new(0)));
		assert_eq!(heap.top(), Err(QueueError::EmptyContainer));
		heap.insert(Handle::new(0), 5);
		assert_eq!(heap.top(), Ok(&5));
	}

	#[test]
	fn test_iter_skips_vacant_slots() {
		let mut heap = filled(&[1, 2, 3, 4, 5, 6, 7, 8]);
		heap.delete_top();
		heap.delete_top();

		let mut values: Vec<i32> = heap.iter().copied().collect();
		values.sort_unstable();
		assert_eq!(values, vec![1, 2, 3, 4, 5, 6]);
		assert_eq!((&heap).into_iter().count(), heap.len());
	}

	#[test]
	fn test_display_empty_heap() {
		let heap = max_heap();
		assert_eq!(format!("{heap}"), "IndexedHeap: <empty>\n");
	}

	#[test]
	fn test_display_non_empty_heap() {
		let heap = filled(&[30, 20, 40]);
		let display = format!("{heap}");
		assert!(display.contains("IndexedHeap:"));
		assert!(display.contains("└── (#2, 40)"));
		assert!(display.contains("    └── (#1, 20)"));
		assert!(display.contains("    └── (#0, 30)"));
	}
}
