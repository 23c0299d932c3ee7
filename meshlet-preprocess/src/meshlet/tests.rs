use crate::error::{InvalidInputKind, MeshletError};
use crate::meshlet::build::{MeshletBuildSettings, build_meshlets, build_meshlets_from_reorder, build_meshlets_split_at};
use crate::reorder::forsyth::forsyth_reorder;
use crate::reorder::tipsify::{TipsifySettings, tipsify_reorder};
use crate::test_meshes::{assert_same_triangles, grid, shuffle_triangles, tetrahedron};
use meshlet_model::meshlet::model::MeshShaderModelData;
use meshlet_model::meshlet::vertex::Vertex;
use rustc_hash::FxHashMap;

fn settings(max_vertices: u32, max_indices: u32) -> MeshletBuildSettings {
	MeshletBuildSettings {
		max_vertices,
		max_indices,
		split_at_restarts: false,
	}
}

/// Maps the meshlet local triangles back to global indices, vertices are identified by their position.
fn global_indices(vertices: &[Vertex], model: &MeshShaderModelData) -> Vec<u32> {
	let lookup = vertices
		.iter()
		.enumerate()
		.map(|(i, v)| (v.position.to_array().map(f32::to_bits), i as u32))
		.collect::<FxHashMap<_, _>>();
	let lookup = &lookup;
	model
		.meshlet_readers()
		.flat_map(move |m| {
			(0..m.triangle_count())
				.flat_map(move |t| m.load_triangle_vertices(t))
				.map(move |v| lookup[&v.position.to_array().map(f32::to_bits)])
		})
		.collect()
}

fn assert_valid(vertices: &[Vertex], indices: &[u32], model: &MeshShaderModelData, settings: &MeshletBuildSettings) {
	let index_sum: u32 = model.meshlets.iter().map(|m| m.index_count).sum();
	assert_eq!(index_sum as usize, indices.len());
	assert_eq!(model.local_indices.len(), indices.len());
	assert_same_triangles(indices, &global_indices(vertices, model));

	for m in model.meshlet_readers() {
		assert!(m.vertex_count <= settings.max_vertices, "{:?}", m.data);
		assert!(m.index_count <= settings.max_indices, "{:?}", m.data);
		assert!(m.local_indices().iter().all(|i| *i < m.vertex_count));
		let bounds = m.bounds();
		for v in m.vertices() {
			assert!(bounds.contains(v.position, 1e-4), "{:?} not in {:?}", v.position, bounds);
		}
	}
}

#[test]
fn tetrahedron_single_meshlet() {
	let (vertices, indices) = tetrahedron();
	let settings = MeshletBuildSettings::default();
	let model = build_meshlets(&vertices, &indices, &settings).unwrap();
	assert_eq!(model.meshlets.len(), 1);
	assert_eq!(model.meshlets[0].vertex_count, 4);
	assert_eq!(model.meshlets[0].index_count, 12);
	assert_valid(&vertices, &indices, &model, &settings);
}

#[test]
fn tetrahedron_after_reorder() {
	let (vertices, indices) = tetrahedron();
	let settings = MeshletBuildSettings::default();
	for reordered in [
		forsyth_reorder(&indices, 4),
		tipsify_reorder(&indices, 4, &TipsifySettings::default()),
	] {
		let model = build_meshlets_from_reorder(&vertices, &reordered, &settings).unwrap();
		assert_eq!(model.meshlets.len(), 1);
		assert_valid(&vertices, &indices, &model, &settings);
	}
}

#[test]
fn grid_vertex_limit() {
	let (vertices, indices) = grid(10);
	let settings = settings(64, 384);
	let model = build_meshlets(&vertices, &indices, &settings).unwrap();
	assert!(model.meshlets.len() >= (indices.len()).div_ceil(384));
	assert!(model.meshlets.len() >= vertices.len().div_ceil(64));
	assert_valid(&vertices, &indices, &model, &settings);
}

#[test]
fn grid_index_limit() {
	let (vertices, indices) = grid(10);
	let settings = settings(128, 30);
	let model = build_meshlets(&vertices, &indices, &settings).unwrap();
	assert_eq!(model.meshlets.len(), 20);
	assert!(model.meshlets.iter().all(|m| m.index_count == 30));
	assert_valid(&vertices, &indices, &model, &settings);
}

#[test]
fn minimal_capacity() {
	let (vertices, indices) = grid(4);
	let settings = settings(3, 3);
	let model = build_meshlets(&vertices, &indices, &settings).unwrap();
	assert_eq!(model.meshlets.len(), indices.len() / 3);
	assert_eq!(model.vertices.len(), indices.len());
	assert_valid(&vertices, &indices, &model, &settings);
}

#[test]
fn reordered_shuffled_grid() {
	let (vertices, indices) = grid(20);
	let shuffled = shuffle_triangles(&indices, 3);
	let settings = MeshletBuildSettings::mesh_shader();
	let unordered = build_meshlets(&vertices, &shuffled, &settings).unwrap();
	assert_valid(&vertices, &shuffled, &unordered, &settings);
	for reordered in [
		forsyth_reorder(&shuffled, vertices.len() as u32),
		tipsify_reorder(&shuffled, vertices.len() as u32, &TipsifySettings::default()),
	] {
		let model = build_meshlets_from_reorder(&vertices, &reordered, &settings).unwrap();
		assert_valid(&vertices, &shuffled, &model, &settings);
		// locality means fewer duplicated vertices than a random order
		assert!(model.vertices.len() < unordered.vertices.len());
	}
}

#[test]
fn split_at_restarts() {
	let vertices = tetrahedron().0.into_iter().chain(grid(1).0).collect::<Vec<_>>();
	// a tetrahedron followed by an unconnected quad
	let indices = [0, 1, 2, 0, 3, 1, 0, 2, 3, 1, 3, 2, 4, 5, 6, 5, 7, 6];
	let reordered = tipsify_reorder(&indices, vertices.len() as u32, &TipsifySettings::default());
	assert_eq!(reordered.restart_triangles, [4]);

	let joined = build_meshlets_from_reorder(&vertices, &reordered, &MeshletBuildSettings::default()).unwrap();
	assert_eq!(joined.meshlets.len(), 1);

	let settings = MeshletBuildSettings::default().with_split_at_restarts(true);
	let split = build_meshlets_from_reorder(&vertices, &reordered, &settings).unwrap();
	assert_eq!(split.meshlets.len(), 2);
	assert_eq!(split.meshlets[0].index_count, 12);
	assert_eq!(split.meshlets[1].vertex_count, 4);
	assert_valid(&vertices, &indices, &split, &settings);
}

#[test]
fn split_at_start_is_ignored() {
	let (vertices, indices) = tetrahedron();
	let model = build_meshlets_split_at(&vertices, &indices, &[0, 2, 2, 9], &MeshletBuildSettings::default()).unwrap();
	assert_eq!(model.meshlets.len(), 2);
	assert_eq!(model.meshlets[0].index_count, 6);
	assert_eq!(model.meshlets[1].index_count, 6);
}

#[test]
fn empty_indices() {
	let (vertices, _) = tetrahedron();
	let model = build_meshlets(&vertices, &[], &MeshletBuildSettings::default()).unwrap();
	assert!(model.is_empty());
	assert!(model.vertices.is_empty());
}

#[test]
fn invalid_input() {
	let (vertices, _) = tetrahedron();
	assert_eq!(
		build_meshlets(&vertices, &[0, 1, 4], &MeshletBuildSettings::default()),
		Err(MeshletError::InvalidInput(InvalidInputKind::IndexOutOfRange {
			index: 4,
			vertex_count: 4
		}))
	);
	assert_eq!(
		build_meshlets(&vertices, &[0, 1], &MeshletBuildSettings::default()),
		Err(MeshletError::InvalidInput(InvalidInputKind::NotTriangleList(2)))
	);
	assert_eq!(
		build_meshlets(&vertices, &[0, 1, 2], &settings(2, 300)),
		Err(MeshletError::InvalidInput(InvalidInputKind::MeshletCapacity {
			max_vertices: 2,
			max_indices: 300
		}))
	);
}

#[test]
fn degenerate_triangle() {
	let (vertices, _) = tetrahedron();
	let indices = [0, 0, 1, 1, 2, 3];
	let settings = settings(3, 384);
	let model = build_meshlets(&vertices, &indices, &settings).unwrap();
	// the degenerate triangle only needs 2 vertex slots
	assert_eq!(model.meshlets.len(), 2);
	assert_eq!(model.meshlets[0].vertex_count, 2);
	assert_eq!(&model.local_indices[..3], &[0, 0, 1]);
}
