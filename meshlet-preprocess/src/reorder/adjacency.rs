use std::ops::Range;

/// Vertex to triangle adjacency in Compressed Sparse Row layout: the triangles touching vertex `v` are
/// `triangles[offsets[v]..offsets[v + 1]]`, in ascending triangle order.
#[derive(Clone, Debug)]
pub struct VertexTriangles {
	offsets: Vec<u32>,
	triangles: Vec<u32>,
}

impl VertexTriangles {
	/// `indices` must be a triangle list with all indices below `vertex_count`.
	#[profiling::function]
	pub fn new(indices: &[u32], vertex_count: u32) -> Self {
		let mut offsets = vec![0u32; vertex_count as usize + 1];
		for &v in indices {
			offsets[v as usize + 1] += 1;
		}
		for v in 0..vertex_count as usize {
			offsets[v + 1] += offsets[v];
		}

		let mut fill = offsets[..vertex_count as usize].to_vec();
		let mut triangles = vec![0u32; indices.len()];
		for (i, &v) in indices.iter().enumerate() {
			let slot = &mut fill[v as usize];
			triangles[*slot as usize] = (i / 3) as u32;
			*slot += 1;
		}

		Self { offsets, triangles }
	}

	pub fn vertex_count(&self) -> usize {
		self.offsets.len() - 1
	}

	fn range(&self, vertex: u32) -> Range<usize> {
		self.offsets[vertex as usize] as usize..self.offsets[vertex as usize + 1] as usize
	}

	/// Number of triangle references of `vertex`, a degenerate triangle referencing it twice counts twice.
	pub fn valence(&self, vertex: u32) -> usize {
		self.range(vertex).len()
	}

	pub fn triangles(&self, vertex: u32) -> &[u32] {
		&self.triangles[self.range(vertex)]
	}

	pub fn triangles_mut(&mut self, vertex: u32) -> &mut [u32] {
		let range = self.range(vertex);
		&mut self.triangles[range]
	}
}
