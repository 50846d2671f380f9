//! Priority queue with O(1) access to its maximum, minimum and median.
//!
//! [`MedianQueue`] keeps four [`trees::IndexedHeap`]s: a max-ordered and a min-ordered view of the
//! lower half of the elements, and the same pair for the upper half. [`LinearMedianQueue`] and
//! [`DifferentialTester`] cross-check it.

pub mod config;
pub mod error;
pub mod median_queue;
pub mod priority_queue;
pub mod reference;
pub mod soak;
pub mod tester;
pub mod trees;

pub use error::QueueError;
pub use median_queue::{MedianQueue, MedianQueueBuilder};
pub use priority_queue::{MedianPriorityQueue, PriorityQueue};
pub use reference::LinearMedianQueue;
pub use tester::{DifferentialTester, DivergenceError};
