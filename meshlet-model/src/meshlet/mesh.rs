use crate::shape::sphere::Sphere;
use core::mem::size_of;
use core::ops::Range;
use glam::Vec3;
use static_assertions::const_assert_eq;

/// A bounded cluster of triangles. `vertex_*` index into [`MeshShaderModelData::vertices`] and `index_*` into
/// [`MeshShaderModelData::local_indices`], whose values are relative to `vertex_offset`.
///
/// [`MeshShaderModelData::vertices`]: crate::meshlet::model::MeshShaderModelData::vertices
/// [`MeshShaderModelData::local_indices`]: crate::meshlet::model::MeshShaderModelData::local_indices
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck_derive::Zeroable, bytemuck_derive::Pod)]
pub struct Meshlet {
	pub vertex_offset: u32,
	pub vertex_count: u32,
	pub index_offset: u32,
	pub index_count: u32,
	pub mean_position: Vec3,
	pub bounding_sphere_radius: f32,
}
const_assert_eq!(size_of::<Meshlet>(), 8 * 4);

impl Meshlet {
	#[inline]
	pub fn vertex_range(&self) -> Range<usize> {
		self.vertex_offset as usize..(self.vertex_offset + self.vertex_count) as usize
	}

	#[inline]
	pub fn index_range(&self) -> Range<usize> {
		self.index_offset as usize..(self.index_offset + self.index_count) as usize
	}

	#[inline]
	pub fn triangle_count(&self) -> usize {
		self.index_count as usize / 3
	}

	pub fn bounds(&self) -> Sphere {
		Sphere::new(self.mean_position, self.bounding_sphere_radius)
	}

	/// Shifts both offsets, used when concatenating the buffers of multiple models.
	pub fn rebase(self, vertex_start: u32, index_start: u32) -> Self {
		Self {
			vertex_offset: vertex_start + self.vertex_offset,
			index_offset: index_start + self.index_offset,
			..self
		}
	}
}
