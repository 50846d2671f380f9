use criterion::{black_box, criterion_group, criterion_main, Criterion};
use median_queue::{LinearMedianQueue, MedianQueue};

fn benchmark_insert(c: &mut Criterion) {
	c.bench_function("MedianQueue insert", |b| {
		b.iter(|| {
			let mut queue = MedianQueue::by_ord();
			for i in 1..1000 {
				queue.insert(black_box((i * 7919) % 1009));
			}
		});
	});
}

fn benchmark_median(c: &mut Criterion) {
	let mut queue = MedianQueue::by_ord();
	let mut linear = LinearMedianQueue::by_ord();
	for i in 1..1000 {
		queue.insert((i * 7919) % 1009);
		linear.insert((i * 7919) % 1009);
	}

	c.bench_function("MedianQueue median", |b| {
		b.iter(|| {
			black_box(queue.median().ok());
		});
	});

	c.bench_function("LinearMedianQueue median", |b| {
		b.iter(|| {
			black_box(linear.median().ok());
		});
	});
}

fn benchmark_churn(c: &mut Criterion) {
	c.bench_function("MedianQueue insert/delete churn", |b| {
		b.iter(|| {
			let mut queue = MedianQueue::by_ord();
			for i in 0..1000 {
				queue.insert(black_box(i % 97));
				if i % 3 == 0 {
					queue.delete_max();
				} else if i % 3 == 1 {
					queue.delete_min();
				}
			}
		});
	});
}

criterion_group!(benches, benchmark_insert, benchmark_median, benchmark_churn);
criterion_main!(benches);
