//! Greedy vertex cache optimization after Tom Forsyth's "Linear-Speed Vertex Cache Optimisation".
//!
//! Every vertex has a score from its position in a simulated LRU cache and from the number of triangles still
//! needing it. A triangle's score is the sum of its vertex scores, and the best scoring triangle touching the cache
//! is emitted next.

use crate::error::{MeshletError, Result, validate_triangle_list};
use crate::reorder::VertexCacheReorderResult;
use crate::reorder::adjacency::VertexTriangles;
use once_cell::sync::Lazy;

pub const VERTEX_CACHE_SIZE: usize = 8;
/// cache entries being pushed out by the triangle currently emitted
const CACHE_SCRATCH: usize = 3;
const CACHE_FUNCTION_LENGTH: usize = 32;
const CACHE_SCORE_TABLE_SIZE: usize = 32;
const VALENCE_SCORE_TABLE_SIZE: usize = 32;
/// live triangle counts are tracked in a `u8`
pub const MAX_ADJACENCY: usize = u8::MAX as usize;

const CACHE_DECAY_POWER: f32 = 1.5;
const LAST_TRI_SCORE: f32 = 0.75;
const VALENCE_BOOST_SCALE: f32 = 2.0;
const VALENCE_BOOST_POWER: f32 = 0.5;
/// fixed point scale, chosen so a triangle score of three maximum vertex scores still fits in a `u16`
const SCORE_SCALING: f32 = 7281.;

type Score = u16;

struct ScoreTables {
	cache_position: [Score; CACHE_SCORE_TABLE_SIZE],
	valence: [Score; VALENCE_SCORE_TABLE_SIZE],
}

static SCORE_TABLES: Lazy<ScoreTables> = Lazy::new(|| {
	let cache_position = core::array::from_fn(|i| {
		let score = if i < 3 {
			// vertices of the last triangle share one score, so its vertex order doesn't matter
			LAST_TRI_SCORE
		} else {
			let scaler = 1. / (CACHE_FUNCTION_LENGTH - 3) as f32;
			(1. - (i - 3) as f32 * scaler).powf(CACHE_DECAY_POWER)
		};
		(SCORE_SCALING * score) as Score
	});
	let valence = core::array::from_fn(|i| {
		if i == 0 {
			0
		} else {
			let boost = (i as f32).powf(-VALENCE_BOOST_POWER);
			(SCORE_SCALING * VALENCE_BOOST_SCALE * boost) as Score
		}
	});
	ScoreTables { cache_position, valence }
});

fn find_vertex_score(active_triangles: u8, cache_position: i8) -> Score {
	if active_triangles == 0 {
		return 0;
	}

	let tables = &*SCORE_TABLES;
	let mut score = if cache_position < 0 {
		0
	} else {
		tables.cache_position[cache_position as usize]
	};
	if (active_triangles as usize) < VALENCE_SCORE_TABLE_SIZE {
		score += tables.valence[active_triangles as usize];
	}
	score
}

/// Reorders the triangles of `indices`, logging any error and returning an empty result on failure. Callers must
/// then keep using their unmodified index buffer.
pub fn forsyth_reorder(indices: &[u32], vertex_count: u32) -> VertexCacheReorderResult {
	if indices.is_empty() {
		return VertexCacheReorderResult::default();
	}
	reorder(indices, vertex_count).unwrap_or_else(|err| {
		log::warn!("forsyth reorder failed: {err}");
		VertexCacheReorderResult::default()
	})
}

#[profiling::function]
pub fn reorder(indices: &[u32], vertex_count: u32) -> Result<VertexCacheReorderResult> {
	validate_triangle_list(indices, vertex_count)?;
	let mut adjacency = VertexTriangles::new(indices, vertex_count);
	if let Some(vertex) = (0..vertex_count).find(|v| adjacency.valence(*v) > MAX_ADJACENCY) {
		return Err(MeshletError::VertexOverloaded {
			vertex,
			triangles: adjacency.valence(vertex),
		});
	}
	Ok(Forsyth::new(indices, &mut adjacency).run())
}

struct Forsyth<'a> {
	indices: &'a [u32],
	/// per vertex, its first `active_triangles[v]` entries are the triangles not yet emitted
	adjacency: &'a mut VertexTriangles,
	active_triangles: Vec<u8>,
	/// position in `cache`, -1 if not cached
	cache_tag: Vec<i8>,
	last_score: Vec<Score>,
	triangle_score: Vec<Score>,
	triangle_added: Vec<bool>,
	cache: [Option<u32>; VERTEX_CACHE_SIZE + CACHE_SCRATCH],
}

impl<'a> Forsyth<'a> {
	fn new(indices: &'a [u32], adjacency: &'a mut VertexTriangles) -> Self {
		let vertex_count = adjacency.vertex_count();
		let triangle_count = indices.len() / 3;
		let active_triangles = (0..vertex_count as u32)
			.map(|v| adjacency.valence(v) as u8)
			.collect::<Vec<_>>();
		let cache_tag = vec![-1; vertex_count];

		let mut last_score = vec![0; vertex_count];
		let mut triangle_score = vec![0 as Score; triangle_count];
		for v in 0..vertex_count {
			let score = find_vertex_score(active_triangles[v], cache_tag[v]);
			last_score[v] = score;
			for &t in adjacency.triangles(v as u32) {
				triangle_score[t as usize] += score;
			}
		}

		Self {
			indices,
			adjacency,
			active_triangles,
			cache_tag,
			last_score,
			triangle_score,
			triangle_added: vec![false; triangle_count],
			cache: [None; VERTEX_CACHE_SIZE + CACHE_SCRATCH],
		}
	}

	fn triangle(&self, t: usize) -> [u32; 3] {
		[self.indices[t * 3], self.indices[t * 3 + 1], self.indices[t * 3 + 2]]
	}

	fn run(mut self) -> VertexCacheReorderResult {
		let triangle_count = self.triangle_added.len();
		let mut out = VertexCacheReorderResult {
			index_buffer: Vec::with_capacity(self.indices.len()),
			..VertexCacheReorderResult::default()
		};

		let mut best = self.best_overall();
		let mut scan_pos = 0;
		let mut emitted = 0;
		while let Some(t) = best {
			self.emit(t);
			out.index_buffer.extend_from_slice(&self.triangle(t));
			emitted += 1;
			self.update_cached_scores();

			best = self.best_in_cache();
			if best.is_none() {
				// cache ran dry, continue with the first triangle not added yet
				while scan_pos < triangle_count && self.triangle_added[scan_pos] {
					scan_pos += 1;
				}
				if scan_pos < triangle_count {
					best = Some(scan_pos);
					out.record_restart(self.indices[scan_pos * 3], emitted);
				}
			}
		}
		out
	}

	fn best_overall(&self) -> Option<usize> {
		let mut best = None;
		for (t, &score) in self.triangle_score.iter().enumerate() {
			if best.is_none_or(|(_, best_score)| score > best_score) {
				best = Some((t, score));
			}
		}
		best.map(|(t, _)| t)
	}

	fn best_in_cache(&self) -> Option<usize> {
		let mut best = None;
		for v in self.cache[..VERTEX_CACHE_SIZE].iter().map_while(|v| *v) {
			let active = self.active_triangles[v as usize] as usize;
			for &t in &self.adjacency.triangles(v)[..active] {
				let score = self.triangle_score[t as usize];
				if best.is_none_or(|(_, best_score)| score > best_score) {
					best = Some((t as usize, score));
				}
			}
		}
		best.map(|(t, _)| t)
	}

	fn emit(&mut self, t: usize) {
		self.triangle_added[t] = true;
		for (i, v) in self.triangle(t).into_iter().enumerate() {
			// move v to slot i, shifting everything in between one slot back
			let end_pos = match self.cache_tag[v as usize] {
				tag if tag < 0 => VERTEX_CACHE_SIZE + i,
				tag => tag as usize,
			};
			if end_pos > i {
				for j in (i + 1..=end_pos).rev() {
					self.cache[j] = self.cache[j - 1];
					if let Some(shifted) = self.cache[j] {
						self.cache_tag[shifted as usize] += 1;
					}
				}
				self.cache[i] = Some(v);
				self.cache_tag[v as usize] = i as i8;
			}

			// swap remove t from the active triangles of v
			let active = &mut self.active_triangles[v as usize];
			let list = &mut self.adjacency.triangles_mut(v)[..*active as usize];
			if let Some(pos) = list.iter().position(|&other| other as usize == t) {
				list.swap(pos, list.len() - 1);
			}
			*active -= 1;
		}
	}

	fn update_cached_scores(&mut self) {
		for i in 0..VERTEX_CACHE_SIZE + CACHE_SCRATCH {
			let Some(v) = self.cache[i] else {
				break;
			};
			if i >= VERTEX_CACHE_SIZE {
				// pushed out of the actual cache
				self.cache_tag[v as usize] = -1;
				self.cache[i] = None;
			}

			let vi = v as usize;
			let new_score = find_vertex_score(self.active_triangles[vi], self.cache_tag[vi]);
			let diff = new_score.wrapping_sub(self.last_score[vi]);
			let active = self.active_triangles[vi] as usize;
			for &t in &self.adjacency.triangles(v)[..active] {
				let score = &mut self.triangle_score[t as usize];
				*score = score.wrapping_add(diff);
			}
			self.last_score[vi] = new_score;
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::reorder::stats::average_cache_miss_ratio;
	use crate::test_meshes::{assert_same_triangles, grid, shuffle_triangles, tetrahedron, vertex_fan};

	#[test]
	fn score_tables() {
		let tables = &*SCORE_TABLES;
		assert_eq!(tables.cache_position[0], (SCORE_SCALING * 0.75) as Score);
		assert_eq!(tables.cache_position[2], tables.cache_position[0]);
		assert_eq!(tables.cache_position[3], SCORE_SCALING as Score);
		assert!(tables.cache_position[4] < tables.cache_position[3]);
		assert_eq!(tables.valence[0], 0);
		assert_eq!(tables.valence[1], (SCORE_SCALING * 2.) as Score);
		assert_eq!(tables.valence[4], (SCORE_SCALING * 2. * 0.5) as Score);
	}

	#[test]
	fn vertex_score() {
		assert_eq!(find_vertex_score(0, 0), 0);
		assert_eq!(find_vertex_score(1, -1), SCORE_TABLES.valence[1]);
		assert_eq!(
			find_vertex_score(1, 0),
			SCORE_TABLES.valence[1] + SCORE_TABLES.cache_position[0]
		);
		// valence beyond the table gets no boost
		assert_eq!(find_vertex_score(40, 5), SCORE_TABLES.cache_position[5]);
	}

	#[test]
	fn tetrahedron_is_permutation() {
		let (_, indices) = tetrahedron();
		let result = forsyth_reorder(&indices, 4);
		assert_eq!(result.index_buffer.len(), 12);
		assert_same_triangles(&indices, &result.index_buffer);
		assert!(result.skipped_indices.is_empty());
	}

	#[test]
	fn empty_input_gives_empty_output() {
		assert_eq!(forsyth_reorder(&[], 0), VertexCacheReorderResult::default());
	}

	#[test]
	fn overloaded_vertex() {
		let indices = vertex_fan(256);
		assert_eq!(
			reorder(&indices, 258),
			Err(MeshletError::VertexOverloaded {
				vertex: 0,
				triangles: 256
			})
		);
		assert!(forsyth_reorder(&indices, 258).index_buffer.is_empty());
	}

	#[test]
	fn vertex_at_limit_is_fine() {
		let indices = vertex_fan(255);
		let result = forsyth_reorder(&indices, 257);
		assert_same_triangles(&indices, &result.index_buffer);
	}

	#[test]
	fn invalid_index() {
		assert!(reorder(&[0, 1, 5], 3).is_err());
		assert!(forsyth_reorder(&[0, 1, 5], 3).index_buffer.is_empty());
	}

	#[test]
	fn grid_improves_cache() {
		let (_, indices) = grid(10);
		let result = forsyth_reorder(&indices, 121);
		assert_same_triangles(&indices, &result.index_buffer);
		assert!(average_cache_miss_ratio(&result.index_buffer, 8) <= average_cache_miss_ratio(&indices, 8));
	}

	#[test]
	fn shuffled_grid_improves_cache() {
		let (_, indices) = grid(16);
		let shuffled = shuffle_triangles(&indices, 42);
		let result = forsyth_reorder(&shuffled, 17 * 17);
		assert_same_triangles(&shuffled, &result.index_buffer);
		assert!(average_cache_miss_ratio(&result.index_buffer, 8) < average_cache_miss_ratio(&shuffled, 8));
	}

	#[test]
	fn disconnected_components_restart() {
		// two triangles far apart, the second can only be found by scanning
		let indices = [0, 1, 2, 3, 4, 5];
		let result = forsyth_reorder(&indices, 6);
		assert_same_triangles(&indices, &result.index_buffer);
		assert_eq!(result.skipped_indices.len(), 1);
		assert_eq!(result.restart_triangles, [1]);
		let restart = &result.index_buffer[3..6];
		assert_eq!(restart[0], result.skipped_indices[0]);
	}

	#[test]
	fn deterministic() {
		let (_, indices) = grid(7);
		let shuffled = shuffle_triangles(&indices, 7);
		assert_eq!(forsyth_reorder(&shuffled, 64), forsyth_reorder(&shuffled, 64));
	}
}
