use median_queue::{MedianQueue, QueueError};

fn print_views(label: &str, queue: &MedianQueue<i32>) -> Result<(), QueueError> {
	println!(
		"{label:<14} count={} max={} min={} median={}",
		queue.len(),
		queue.max()?,
		queue.min()?,
		queue.median()?
	);
	Ok(())
}

fn main() -> Result<(), QueueError> {
	let mut queue = MedianQueue::by_ord();
	for value in [5, 1, 9, 3] {
		queue.insert(value);
	}
	print_views("after inserts", &queue)?; // count=4 max=9 min=1 median=3

	queue.delete_max();
	print_views("delete_max", &queue)?; // count=3 max=5 min=1 median=3

	queue.delete_min();
	print_views("delete_min", &queue)?; // count=2 max=5 min=3 median=3

	queue.clear();
	match queue.median() {
		Err(err) => println!("after clear: {err}"),
		Ok(value) => println!("after clear: unexpected median {value}"),
	}
	Ok(())
}
