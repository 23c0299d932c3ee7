//! Procedural meshes shared by the tests.

use glam::Vec3;
use meshlet_model::meshlet::vertex::Vertex;
use rustc_hash::FxHashMap;

pub fn tetrahedron() -> (Vec<Vertex>, Vec<u32>) {
	let positions = [
		Vec3::new(1., 1., 1.),
		Vec3::new(1., -1., -1.),
		Vec3::new(-1., 1., -1.),
		Vec3::new(-1., -1., 1.),
	];
	let vertices = positions
		.iter()
		.map(|p| Vertex::new(*p, p.normalize()))
		.collect();
	let indices = vec![0, 1, 2, 0, 3, 1, 0, 2, 3, 1, 3, 2];
	(vertices, indices)
}

/// A flat grid of `n` x `n` quads with `(n + 1)^2` vertices, triangles emitted row by row.
pub fn grid(n: u32) -> (Vec<Vertex>, Vec<u32>) {
	let side = n + 1;
	let vertices = (0..side)
		.flat_map(|y| (0..side).map(move |x| Vertex::new(Vec3::new(x as f32, y as f32, 0.), Vec3::Z)))
		.collect();
	let mut indices = Vec::with_capacity((n * n * 6) as usize);
	for y in 0..n {
		for x in 0..n {
			let v = |dx: u32, dy: u32| (y + dy) * side + x + dx;
			indices.extend_from_slice(&[v(0, 0), v(1, 0), v(0, 1), v(1, 0), v(1, 1), v(0, 1)]);
		}
	}
	(vertices, indices)
}

/// `triangles` triangles all sharing vertex 0.
pub fn vertex_fan(triangles: u32) -> Vec<u32> {
	(0..triangles).flat_map(|i| [0, i + 1, i + 2]).collect()
}

/// Deterministically shuffles the triangle order, keeping each triangle intact.
pub fn shuffle_triangles(indices: &[u32], seed: u64) -> Vec<u32> {
	let mut triangles = indices.chunks_exact(3).collect::<Vec<_>>();
	let mut state = seed;
	for i in (1..triangles.len()).rev() {
		state = state
			.wrapping_mul(6364136223846793005)
			.wrapping_add(1442695040888963407);
		let j = (state >> 33) as usize % (i + 1);
		triangles.swap(i, j);
	}
	triangles.concat()
}

pub fn triangle_counts(indices: &[u32]) -> FxHashMap<[u32; 3], usize> {
	let mut map = FxHashMap::default();
	for tri in indices.chunks_exact(3) {
		*map.entry([tri[0], tri[1], tri[2]]).or_insert(0) += 1;
	}
	map
}

/// Asserts both index buffers contain the same triangles with the same winding, in any order.
pub fn assert_same_triangles(expected: &[u32], actual: &[u32]) {
	assert_eq!(expected.len(), actual.len(), "index count changed");
	assert_eq!(triangle_counts(expected), triangle_counts(actual), "triangles changed");
}
