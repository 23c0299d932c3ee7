use crate::reorder::tipsify::TipsifySettings;

pub mod adjacency;
pub mod forsyth;
pub mod ring_buffer;
pub mod stats;
pub mod tipsify;

/// A reordered triangle list plus the places where the pass had to jump to an unrelated part of the mesh.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct VertexCacheReorderResult {
	pub index_buffer: Vec<u32>,
	/// vertices the pass restarted from after running out of local work
	pub skipped_indices: Vec<u32>,
	/// for each entry of `skipped_indices`, the triangle in `index_buffer` that was emitted first after the restart
	pub restart_triangles: Vec<u32>,
}

impl VertexCacheReorderResult {
	/// Result of not reordering at all.
	pub fn unchanged(indices: &[u32]) -> Self {
		Self {
			index_buffer: indices.to_vec(),
			skipped_indices: Vec::new(),
			restart_triangles: Vec::new(),
		}
	}

	pub fn triangle_count(&self) -> usize {
		self.index_buffer.len() / 3
	}

	fn record_restart(&mut self, vertex: u32, triangle: usize) {
		self.skipped_indices.push(vertex);
		self.restart_triangles.push(triangle as u32);
	}
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum ReorderStrategy {
	None,
	#[default]
	Forsyth,
	Tipsify(TipsifySettings),
}

impl ReorderStrategy {
	/// Runs the selected pass. Never fails: if the pass rejects the input, the input order is kept.
	pub fn apply(&self, indices: &[u32], vertex_count: u32) -> VertexCacheReorderResult {
		if indices.is_empty() {
			return VertexCacheReorderResult::default();
		}
		let result = match self {
			ReorderStrategy::None => return VertexCacheReorderResult::unchanged(indices),
			ReorderStrategy::Forsyth => forsyth::reorder(indices, vertex_count),
			ReorderStrategy::Tipsify(settings) => tipsify::reorder(indices, vertex_count, settings),
		};
		result.unwrap_or_else(|err| {
			log::warn!("{self:?} vertex cache reorder failed, keeping input order: {err}");
			VertexCacheReorderResult::unchanged(indices)
		})
	}
}
