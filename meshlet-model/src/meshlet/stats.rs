use crate::meshlet::mesh::Meshlet;
use crate::meshlet::vertex::Vertex;
use glam::Vec3;
use std::iter::Sum;
use std::ops::{Add, AddAssign};

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct MeshletStats {
	pub triangles: u32,
	pub meshlets: u32,
	/// vertices may be duplicated across multiple meshlets
	pub meshlet_vertices: u32,
	pub max_meshlet_vertices: u32,
	pub max_meshlet_triangles: u32,
	pub bounds_min: Vec3,
	pub bounds_max: Vec3,
}

impl MeshletStats {
	pub fn from_meshlet(meshlet: Meshlet, vertices: &[Vertex]) -> Self {
		let (bounds_min, bounds_max) = vertices
			.iter()
			.fold((Vec3::INFINITY, Vec3::NEG_INFINITY), |a, v| {
				(a.0.min(v.position), a.1.max(v.position))
			});
		Self {
			triangles: meshlet.triangle_count() as u32,
			meshlets: 1,
			meshlet_vertices: meshlet.vertex_count,
			max_meshlet_vertices: meshlet.vertex_count,
			max_meshlet_triangles: meshlet.triangle_count() as u32,
			bounds_min,
			bounds_max,
		}
	}

	pub fn avg_vertices_per_meshlet(&self) -> f32 {
		if self.meshlets == 0 {
			0.
		} else {
			self.meshlet_vertices as f32 / self.meshlets as f32
		}
	}

	pub fn avg_triangles_per_meshlet(&self) -> f32 {
		if self.meshlets == 0 {
			0.
		} else {
			self.triangles as f32 / self.meshlets as f32
		}
	}
}

impl Default for MeshletStats {
	fn default() -> Self {
		Self {
			triangles: 0,
			meshlets: 0,
			meshlet_vertices: 0,
			max_meshlet_vertices: 0,
			max_meshlet_triangles: 0,
			bounds_min: Vec3::INFINITY,
			bounds_max: Vec3::NEG_INFINITY,
		}
	}
}

impl Add for MeshletStats {
	type Output = MeshletStats;

	fn add(self, rhs: Self) -> Self::Output {
		Self {
			triangles: self.triangles + rhs.triangles,
			meshlets: self.meshlets + rhs.meshlets,
			meshlet_vertices: self.meshlet_vertices + rhs.meshlet_vertices,
			max_meshlet_vertices: self.max_meshlet_vertices.max(rhs.max_meshlet_vertices),
			max_meshlet_triangles: self.max_meshlet_triangles.max(rhs.max_meshlet_triangles),
			bounds_min: self.bounds_min.min(rhs.bounds_min),
			bounds_max: self.bounds_max.max(rhs.bounds_max),
		}
	}
}

impl AddAssign for MeshletStats {
	fn add_assign(&mut self, rhs: Self) {
		*self = *self + rhs;
	}
}

impl Sum for MeshletStats {
	fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
		iter.fold(Self::default(), |acc, x| acc + x)
	}
}
