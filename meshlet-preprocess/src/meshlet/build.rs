use crate::error::{InvalidInputKind, Result, validate_triangle_list};
use crate::reorder::VertexCacheReorderResult;
use meshlet_model::meshlet::mesh::Meshlet;
use meshlet_model::meshlet::model::MeshShaderModelData;
use meshlet_model::meshlet::vertex::Vertex;
use meshlet_model::meshlet::{MESHLET_MAX_INDICES, MESHLET_MAX_VERTICES};
use meshlet_model::shape::sphere::Sphere;
use rustc_hash::FxHashMap;
use std::iter::Peekable;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct MeshletBuildSettings {
	pub max_vertices: u32,
	pub max_indices: u32,
	/// start a new meshlet wherever the reorder pass had to restart in an unrelated part of the mesh
	pub split_at_restarts: bool,
}

impl Default for MeshletBuildSettings {
	fn default() -> Self {
		Self {
			max_vertices: MESHLET_MAX_VERTICES,
			max_indices: MESHLET_MAX_INDICES,
			split_at_restarts: false,
		}
	}
}

impl MeshletBuildSettings {
	/// Conservative limits that fit mesh shader output limits of most vendors.
	pub fn mesh_shader() -> Self {
		Self {
			max_vertices: 64,
			max_indices: 126 * 3,
			split_at_restarts: true,
		}
	}

	pub fn with_split_at_restarts(self, split_at_restarts: bool) -> Self {
		Self {
			split_at_restarts,
			..self
		}
	}

	fn validate(&self) -> Result<()> {
		if self.max_vertices < 3 || self.max_indices < 3 {
			Err(InvalidInputKind::MeshletCapacity {
				max_vertices: self.max_vertices,
				max_indices: self.max_indices,
			})?;
		}
		Ok(())
	}
}

/// Splits the triangle list `indices` into meshlets, keeping the triangle order.
pub fn build_meshlets(
	vertices: &[Vertex],
	indices: &[u32],
	settings: &MeshletBuildSettings,
) -> Result<MeshShaderModelData> {
	build_meshlets_split_at(vertices, indices, &[], settings)
}

/// Like [`build_meshlets`], additionally using the restarts of a reorder pass as meshlet boundaries if
/// [`MeshletBuildSettings::split_at_restarts`] is set.
pub fn build_meshlets_from_reorder(
	vertices: &[Vertex],
	reorder: &VertexCacheReorderResult,
	settings: &MeshletBuildSettings,
) -> Result<MeshShaderModelData> {
	let restarts: &[u32] = if settings.split_at_restarts {
		&reorder.restart_triangles[..]
	} else {
		&[]
	};
	build_meshlets_split_at(vertices, &reorder.index_buffer, restarts, settings)
}

/// `split_at` are ascending triangle indices that must each start a new meshlet.
#[profiling::function]
pub fn build_meshlets_split_at(
	vertices: &[Vertex],
	indices: &[u32],
	split_at: &[u32],
	settings: &MeshletBuildSettings,
) -> Result<MeshShaderModelData> {
	settings.validate()?;
	if indices.is_empty() {
		return Ok(MeshShaderModelData::default());
	}
	validate_triangle_list(indices, vertices.len() as u32)?;

	let mut builder = MeshletBuilder::new(vertices, indices.len(), settings);
	let mut split_at = split_at.iter().copied().peekable();
	for (t, triangle) in indices.chunks_exact(3).enumerate() {
		if next_split_is(&mut split_at, t) {
			builder.finish_meshlet();
		}
		builder.add_triangle([triangle[0], triangle[1], triangle[2]]);
	}
	builder.finish_meshlet();

	let model = builder.out;
	log::trace!(
		"built {} meshlets with {} vertices from {} triangles",
		model.meshlets.len(),
		model.vertices.len(),
		indices.len() / 3
	);
	Ok(model)
}

fn next_split_is(split_at: &mut Peekable<impl Iterator<Item = u32>>, triangle: usize) -> bool {
	let mut hit = false;
	while let Some(next) = split_at.next_if(|next| *next as usize <= triangle) {
		hit |= next as usize == triangle;
	}
	hit
}

struct MeshletBuilder<'a> {
	vertices: &'a [Vertex],
	max_vertices: usize,
	max_indices: usize,
	/// global vertex index to index local to the current meshlet
	remap: FxHashMap<u32, u32>,
	vertex_start: usize,
	index_start: usize,
	out: MeshShaderModelData,
}

impl<'a> MeshletBuilder<'a> {
	fn new(vertices: &'a [Vertex], index_count: usize, settings: &MeshletBuildSettings) -> Self {
		let max_vertices = settings.max_vertices as usize;
		let max_indices = settings.max_indices as usize;
		Self {
			vertices,
			max_vertices,
			max_indices,
			remap: FxHashMap::with_capacity_and_hasher(max_vertices, Default::default()),
			vertex_start: 0,
			index_start: 0,
			out: MeshShaderModelData {
				vertices: Vec::with_capacity(index_count),
				local_indices: Vec::with_capacity(index_count),
				meshlets: Vec::with_capacity(index_count.div_ceil(max_indices)),
			},
		}
	}

	fn add_triangle(&mut self, triangle: [u32; 3]) {
		let new_vertices = (0..3)
			.filter(|&i| !self.remap.contains_key(&triangle[i]) && !triangle[..i].contains(&triangle[i]))
			.count();
		let vertex_count = self.out.vertices.len() - self.vertex_start;
		let index_count = self.out.local_indices.len() - self.index_start;
		if vertex_count + new_vertices > self.max_vertices || index_count + 3 > self.max_indices {
			self.finish_meshlet();
		}

		let Self {
			vertices,
			remap,
			vertex_start,
			out,
			..
		} = self;
		for v in triangle {
			let local = *remap.entry(v).or_insert_with(|| {
				out.vertices.push(vertices[v as usize]);
				(out.vertices.len() - 1 - *vertex_start) as u32
			});
			out.local_indices.push(local);
		}
	}

	fn finish_meshlet(&mut self) {
		let index_count = self.out.local_indices.len() - self.index_start;
		if index_count == 0 {
			return;
		}

		let local_vertices = &self.out.vertices[self.vertex_start..];
		let bounds = Sphere::bounding_sphere_centered(|| local_vertices.iter().map(|v| v.position))
			.unwrap_or_default();
		self.out.meshlets.push(Meshlet {
			vertex_offset: self.vertex_start as u32,
			vertex_count: local_vertices.len() as u32,
			index_offset: self.index_start as u32,
			index_count: index_count as u32,
			mean_position: bounds.center(),
			bounding_sphere_radius: bounds.radius(),
		});

		self.remap.clear();
		self.vertex_start = self.out.vertices.len();
		self.index_start = self.out.local_indices.len();
	}
}
