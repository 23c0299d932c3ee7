//! Fanning vertex cache optimization after Sander, Nehab and Barczak, "Fast Triangle Reordering for Vertex Locality
//! and Reduced Overdraw" (2007).
//!
//! Emits all remaining triangles around a fanning vertex, then continues with the neighbour most likely to still be
//! in a cache of `cache_size` entries.

use crate::error::{Result, validate_triangle_list};
use crate::reorder::VertexCacheReorderResult;
use crate::reorder::adjacency::VertexTriangles;
use crate::reorder::ring_buffer::RingBuffer;
use smallvec::SmallVec;

/// How many recently fanned vertices are remembered to escape dead ends.
pub const MAX_USED_VERTICES: usize = 128;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct TipsifySettings {
	/// Target vertex cache size. Sensible values are 5 to 50, smaller values favour locality.
	pub cache_size: u32,
}

impl TipsifySettings {
	pub const DEFAULT_CACHE_SIZE: u32 = 20;

	pub fn new(cache_size: u32) -> Self {
		Self { cache_size }
	}
}

impl Default for TipsifySettings {
	fn default() -> Self {
		Self::new(Self::DEFAULT_CACHE_SIZE)
	}
}

/// Reorders the triangles of `indices`. On invalid input the error is logged and `indices` is returned unchanged.
pub fn tipsify_reorder(indices: &[u32], vertex_count: u32, settings: &TipsifySettings) -> VertexCacheReorderResult {
	reorder(indices, vertex_count, settings).unwrap_or_else(|err| {
		log::warn!("tipsify reorder failed: {err}");
		VertexCacheReorderResult::unchanged(indices)
	})
}

#[profiling::function]
pub fn reorder(indices: &[u32], vertex_count: u32, settings: &TipsifySettings) -> Result<VertexCacheReorderResult> {
	validate_triangle_list(indices, vertex_count)?;
	Ok(Tipsify::new(indices, vertex_count, settings.cache_size).run())
}

struct Tipsify<'a> {
	indices: &'a [u32],
	adjacency: VertexTriangles,
	cache_size: u64,
	/// triangles not yet emitted per vertex
	living_triangles: Vec<u32>,
	/// wide enough that `cache_size + 1` plus one tick per emitted index never overflows
	last_timestamp: Vec<u64>,
	current_timestamp: u64,
	emitted: Vec<bool>,
	used_vertices: RingBuffer<u32, MAX_USED_VERTICES>,
	/// every vertex below has no living triangles left
	lowest_living_vertex: u32,
	/// triangles in emission order
	order: Vec<u32>,
}

impl<'a> Tipsify<'a> {
	fn new(indices: &'a [u32], vertex_count: u32, cache_size: u32) -> Self {
		let adjacency = VertexTriangles::new(indices, vertex_count);
		let living_triangles = (0..vertex_count).map(|v| adjacency.valence(v) as u32).collect();
		Self {
			indices,
			adjacency,
			cache_size: cache_size as u64,
			living_triangles,
			last_timestamp: vec![0; vertex_count as usize],
			current_timestamp: cache_size as u64 + 1,
			emitted: vec![false; indices.len() / 3],
			used_vertices: RingBuffer::new(),
			lowest_living_vertex: 0,
			order: Vec::with_capacity(indices.len() / 3),
		}
	}

	fn run(mut self) -> VertexCacheReorderResult {
		let mut out = VertexCacheReorderResult::default();
		let mut candidates = SmallVec::<[u32; 32]>::new();
		let mut current = Some(0);
		while let Some(fanning) = current {
			candidates.clear();
			self.fan(fanning, &mut candidates);
			current = self
				.next_vertex(&candidates)
				.or_else(|| self.skip_dead_end(&mut out));
		}

		out.index_buffer = self
			.order
			.iter()
			.flat_map(|&t| {
				let t = t as usize * 3;
				[self.indices[t], self.indices[t + 1], self.indices[t + 2]]
			})
			.collect();
		out
	}

	/// Emits every living triangle around `fanning`, collecting their vertices as `candidates`.
	fn fan(&mut self, fanning: u32, candidates: &mut SmallVec<[u32; 32]>) {
		for &t in self.adjacency.triangles(fanning) {
			if self.emitted[t as usize] {
				continue;
			}
			self.emitted[t as usize] = true;
			self.order.push(t);

			let t = t as usize * 3;
			for &v in &self.indices[t..t + 3] {
				self.used_vertices.push(v);
				candidates.push(v);
				self.living_triangles[v as usize] -= 1;
				// only advance time for vertices that would have been a cache miss
				if self.current_timestamp - self.last_timestamp[v as usize] > self.cache_size {
					self.last_timestamp[v as usize] = self.current_timestamp;
					self.current_timestamp += 1;
				}
			}
		}
	}

	/// Prefers the candidate that entered the cache longest ago, as long as fanning it would not push its own
	/// vertices out of the cache. Candidates failing that test are only used if nothing better exists.
	fn next_vertex(&self, candidates: &[u32]) -> Option<u32> {
		let mut best: Option<(u32, u64)> = None;
		for &v in candidates {
			let living = self.living_triangles[v as usize];
			if living == 0 {
				continue;
			}
			let age = self.current_timestamp - self.last_timestamp[v as usize];
			let priority = if age + 2 * living as u64 <= self.cache_size { age } else { 0 };
			if best.is_none_or(|(_, best_priority)| priority > best_priority) {
				best = Some((v, priority));
			}
		}
		best.map(|(v, _)| v)
	}

	fn skip_dead_end(&mut self, out: &mut VertexCacheReorderResult) -> Option<u32> {
		while let Some(v) = self.used_vertices.pop_newest() {
			if self.living_triangles[v as usize] > 0 {
				return Some(v);
			}
		}

		let vertex_count = self.living_triangles.len() as u32;
		while self.lowest_living_vertex < vertex_count {
			let v = self.lowest_living_vertex;
			if self.living_triangles[v as usize] > 0 {
				if !self.order.is_empty() {
					out.record_restart(v, self.order.len());
				}
				return Some(v);
			}
			self.lowest_living_vertex += 1;
		}
		None
	}
}
