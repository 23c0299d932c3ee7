use crate::meshlet::mesh::Meshlet;
use crate::meshlet::stats::MeshletStats;
use crate::meshlet::vertex::Vertex;
use crate::shape::sphere::Sphere;
use glam::UVec3;
use rayon::prelude::*;
use std::ops::Deref;

/// Output of the meshlet builder, ready to be uploaded as three flat buffers.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshShaderModelData {
	pub vertices: Vec<Vertex>,
	pub local_indices: Vec<u32>,
	pub meshlets: Vec<Meshlet>,
}

impl MeshShaderModelData {
	pub fn meshlet(&self, index: usize) -> MeshletReader<'_> {
		MeshletReader {
			data: self.meshlets[index],
			model: self,
		}
	}

	pub fn meshlet_readers(&self) -> impl ExactSizeIterator<Item = MeshletReader<'_>> + '_ {
		(0..self.meshlets.len()).map(move |i| self.meshlet(i))
	}

	pub fn triangle_count(&self) -> usize {
		self.local_indices.len() / 3
	}

	pub fn is_empty(&self) -> bool {
		self.meshlets.is_empty()
	}

	pub fn append(&mut self, other: &mut Self) {
		let vertex_start = self.vertices.len() as u32;
		let index_start = self.local_indices.len() as u32;
		self.vertices.append(&mut other.vertices);
		self.local_indices.append(&mut other.local_indices);
		self.meshlets
			.extend(other.meshlets.drain(..).map(|m| m.rebase(vertex_start, index_start)));
	}

	/// Sphere enclosing all meshlet bounds, `None` if there are no meshlets.
	pub fn bounds(&self) -> Option<Sphere> {
		let spheres = self.meshlets.iter().map(Meshlet::bounds).collect::<Vec<_>>();
		Sphere::merge_spheres_approx(&spheres)
	}

	#[profiling::function]
	pub fn stats(&self) -> MeshletStats {
		self.meshlet_readers()
			.map(|m| MeshletStats::from_meshlet(m.data, m.vertices()))
			.sum()
	}

	pub fn vertex_bytes(&self) -> &[u8] {
		bytemuck::cast_slice(&self.vertices)
	}

	pub fn index_bytes(&self) -> &[u8] {
		bytemuck::cast_slice(&self.local_indices)
	}

	pub fn meshlet_bytes(&self) -> &[u8] {
		bytemuck::cast_slice(&self.meshlets)
	}
}

#[derive(Copy, Clone)]
pub struct MeshletReader<'a> {
	pub data: Meshlet,
	pub model: &'a MeshShaderModelData,
}

impl Deref for MeshletReader<'_> {
	type Target = Meshlet;

	fn deref(&self) -> &Self::Target {
		&self.data
	}
}

impl<'a> MeshletReader<'a> {
	pub fn vertices(&self) -> &'a [Vertex] {
		&self.model.vertices[self.data.vertex_range()]
	}

	pub fn local_indices(&self) -> &'a [u32] {
		&self.model.local_indices[self.data.index_range()]
	}

	pub fn load_vertex(&self, index: usize) -> Vertex {
		let len = self.data.vertex_count as usize;
		assert!(
			index < len,
			"index out of bounds: the len is {len} but the index is {index}"
		);
		self.model.vertices[self.data.vertex_offset as usize + index]
	}

	pub fn load_triangle(&self, triangle: usize) -> UVec3 {
		let len = self.data.triangle_count();
		assert!(
			triangle < len,
			"index out of bounds: the len is {len} but the index is {triangle}"
		);
		let start = self.data.index_offset as usize + triangle * 3;
		UVec3::from_slice(&self.model.local_indices[start..start + 3])
	}

	pub fn load_triangle_vertices(&self, triangle: usize) -> [Vertex; 3] {
		self.load_triangle(triangle)
			.to_array()
			.map(|i| self.load_vertex(i as usize))
	}
}

impl Extend<MeshShaderModelData> for MeshShaderModelData {
	fn extend<T: IntoIterator<Item = MeshShaderModelData>>(&mut self, iter: T) {
		iter.into_iter().for_each(|mut model| self.append(&mut model));
	}
}

impl FromIterator<MeshShaderModelData> for MeshShaderModelData {
	fn from_iter<T: IntoIterator<Item = MeshShaderModelData>>(iter: T) -> Self {
		iter.into_iter().fold(Self::default(), |mut acc, mut model| {
			acc.append(&mut model);
			acc
		})
	}
}

/// Models are processed in parallel but appended in order, after reserving the combined size once.
impl ParallelExtend<MeshShaderModelData> for MeshShaderModelData {
	fn par_extend<I>(&mut self, par_iter: I)
	where
		I: IntoParallelIterator<Item = MeshShaderModelData>,
	{
		let models = par_iter.into_par_iter().collect::<Vec<_>>();
		self.vertices.reserve(models.iter().map(|m| m.vertices.len()).sum());
		self.local_indices.reserve(models.iter().map(|m| m.local_indices.len()).sum());
		self.meshlets.reserve(models.iter().map(|m| m.meshlets.len()).sum());
		self.extend(models);
	}
}

impl FromParallelIterator<MeshShaderModelData> for MeshShaderModelData {
	fn from_par_iter<I>(par_iter: I) -> Self
	where
		I: IntoParallelIterator<Item = MeshShaderModelData>,
	{
		let mut model = Self::default();
		model.par_extend(par_iter);
		model
	}
}
