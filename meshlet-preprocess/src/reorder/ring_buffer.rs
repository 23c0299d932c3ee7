use std::fmt::{Debug, Formatter};

/// Fixed capacity LIFO that silently drops its oldest entry once full.
#[derive(Clone)]
pub struct RingBuffer<T: Copy + Default, const N: usize> {
	slots: [T; N],
	/// slot the next push writes to
	head: usize,
	len: usize,
}

impl<T: Copy + Default, const N: usize> Default for RingBuffer<T, N> {
	fn default() -> Self {
		Self::new()
	}
}

impl<T: Copy + Default, const N: usize> RingBuffer<T, N> {
	pub fn new() -> Self {
		const { assert!(N > 0, "RingBuffer must have a capacity of at least 1") };
		Self {
			slots: [T::default(); N],
			head: 0,
			len: 0,
		}
	}

	/// Pushes `value` as the newest entry, returning the oldest entry if it had to be overwritten.
	pub fn push(&mut self, value: T) -> Option<T> {
		let evicted = (self.len == N).then(|| self.slots[self.head]);
		self.slots[self.head] = value;
		self.head = (self.head + 1) % N;
		self.len = (self.len + 1).min(N);
		evicted
	}

	pub fn pop_newest(&mut self) -> Option<T> {
		if self.len == 0 {
			return None;
		}
		self.head = (self.head + N - 1) % N;
		self.len -= 1;
		Some(self.slots[self.head])
	}

	pub fn iter_newest_first(&self) -> impl Iterator<Item = T> + '_ {
		(1..=self.len).map(move |i| self.slots[(self.head + N - i) % N])
	}

	pub fn len(&self) -> usize {
		self.len
	}

	pub fn is_empty(&self) -> bool {
		self.len == 0
	}
}

impl<T: Copy + Default + Debug, const N: usize> Debug for RingBuffer<T, N> {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.debug_list().entries(self.iter_newest_first()).finish()
	}
}
