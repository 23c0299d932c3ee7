use std::collections::VecDeque;

/// Result of replaying an index buffer through a simulated FIFO post-transform vertex cache.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct VertexCacheStats {
	pub cache_size: u32,
	pub misses: u32,
	pub triangles: u32,
	/// distinct vertices referenced by the index buffer
	pub vertices: u32,
}

impl VertexCacheStats {
	#[profiling::function]
	pub fn fifo(indices: &[u32], cache_size: u32) -> Self {
		let mut cache = VecDeque::with_capacity(cache_size as usize + 1);
		let mut seen = vec![false; indices.iter().max().map_or(0, |m| *m as usize + 1)];
		let mut misses = 0;
		let mut vertices = 0;
		for &v in indices {
			if !seen[v as usize] {
				seen[v as usize] = true;
				vertices += 1;
			}
			if !cache.contains(&v) {
				misses += 1;
				cache.push_back(v);
				if cache.len() > cache_size as usize {
					cache.pop_front();
				}
			}
		}
		Self {
			cache_size,
			misses,
			triangles: (indices.len() / 3) as u32,
			vertices,
		}
	}

	/// Average Cache Miss Ratio: misses per triangle, between 0.5 for an ideal large mesh and 3.
	pub fn acmr(&self) -> f32 {
		if self.triangles == 0 {
			0.
		} else {
			self.misses as f32 / self.triangles as f32
		}
	}

	/// Average Transformed Vertex Ratio: misses per referenced vertex, 1 is optimal.
	pub fn atvr(&self) -> f32 {
		if self.vertices == 0 {
			0.
		} else {
			self.misses as f32 / self.vertices as f32
		}
	}
}

/// ACMR of `indices` replayed through a FIFO cache of `cache_size` entries.
pub fn average_cache_miss_ratio(indices: &[u32], cache_size: u32) -> f32 {
	VertexCacheStats::fifo(indices, cache_size).acmr()
}
