use crate::error::{AttributeFault, AttributeSemantic, MeshletError, Result};
use core::mem::size_of;
use glam::Vec3;
use meshlet_model::meshlet::vertex::Vertex;

/// Where an attribute lives within a vertex buffer. A `stride` of 0 means tightly packed `vec3<f32>`.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct AttributeDescriptor {
	pub offset: usize,
	pub stride: usize,
	pub component_count: u32,
}

impl AttributeDescriptor {
	pub fn vec3(offset: usize, stride: usize) -> Self {
		Self {
			offset,
			stride,
			component_count: 3,
		}
	}

	pub fn effective_stride(&self) -> usize {
		if self.stride == 0 { size_of::<Vec3>() } else { self.stride }
	}
}

/// Reads all `vertex_count` positions and normals from `buffer`.
#[profiling::function]
pub fn extract_vertices(
	buffer: &[u8],
	vertex_count: u32,
	position: &AttributeDescriptor,
	normal: &AttributeDescriptor,
) -> Result<Vec<Vertex>> {
	let positions = AttributeReader::new(buffer, vertex_count, position, AttributeSemantic::Position)?;
	let normals = AttributeReader::new(buffer, vertex_count, normal, AttributeSemantic::Normal)?;
	Ok((0..vertex_count as usize)
		.map(|i| Vertex::new(positions.read(i), normals.read(i)))
		.collect())
}

/// A validated attribute: every read within `0..vertex_count` is in bounds.
struct AttributeReader<'a> {
	buffer: &'a [u8],
	offset: usize,
	stride: usize,
}

impl<'a> AttributeReader<'a> {
	fn new(
		buffer: &'a [u8],
		vertex_count: u32,
		attr: &AttributeDescriptor,
		semantic: AttributeSemantic,
	) -> Result<Self> {
		let invalid = |fault| MeshletError::InvalidAttribute { semantic, fault };
		if attr.component_count != 3 {
			return Err(invalid(AttributeFault::ComponentCount(attr.component_count)));
		}

		let stride = attr.effective_stride();
		if vertex_count > 0 {
			let end = (vertex_count as usize - 1)
				.checked_mul(stride)
				.and_then(|a| a.checked_add(attr.offset))
				.and_then(|a| a.checked_add(size_of::<Vec3>()))
				.unwrap_or(usize::MAX);
			if end > buffer.len() {
				return Err(invalid(AttributeFault::OutOfBounds {
					end,
					len: buffer.len(),
				}));
			}
		}

		Ok(Self {
			buffer,
			offset: attr.offset,
			stride,
		})
	}

	fn read(&self, index: usize) -> Vec3 {
		let start = self.offset + index * self.stride;
		let bytes = &self.buffer[start..start + size_of::<Vec3>()];
		let f = |i: usize| f32::from_le_bytes([bytes[i * 4], bytes[i * 4 + 1], bytes[i * 4 + 2], bytes[i * 4 + 3]]);
		Vec3::new(f(0), f(1), f(2))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn interleaved(vertices: &[Vertex]) -> Vec<u8> {
		bytemuck::cast_slice::<Vertex, u8>(vertices).to_vec()
	}

	#[test]
	fn interleaved_buffer() {
		let vertices = [
			Vertex::new(Vec3::new(1., 2., 3.), Vec3::X),
			Vertex::new(Vec3::new(4., 5., 6.), Vec3::Y),
			Vertex::new(Vec3::new(-7., 8., 9.5), Vec3::Z),
		];
		let buffer = interleaved(&vertices);
		let stride = size_of::<Vertex>();
		let out = extract_vertices(
			&buffer,
			3,
			&AttributeDescriptor::vec3(0, stride),
			&AttributeDescriptor::vec3(12, stride),
		)
		.unwrap();
		assert_eq!(out, vertices);
	}

	#[test]
	fn planar_buffer_with_packed_stride() {
		let positions = [Vec3::new(1., 1., 1.), Vec3::new(2., 2., 2.)];
		let normals = [Vec3::Y, Vec3::NEG_Y];
		let mut buffer = bytemuck::cast_slice::<Vec3, u8>(&positions).to_vec();
		buffer.extend_from_slice(bytemuck::cast_slice(&normals));
		let out = extract_vertices(
			&buffer,
			2,
			&AttributeDescriptor::vec3(0, 0),
			&AttributeDescriptor::vec3(24, 0),
		)
		.unwrap();
		assert_eq!(out[1], Vertex::new(positions[1], normals[1]));
	}

	#[test]
	fn wrong_component_count() {
		let buffer = [0u8; 64];
		let normal = AttributeDescriptor {
			component_count: 4,
			..AttributeDescriptor::vec3(0, 16)
		};
		let err = extract_vertices(&buffer, 2, &AttributeDescriptor::vec3(0, 0), &normal).unwrap_err();
		assert_eq!(
			err,
			MeshletError::InvalidAttribute {
				semantic: AttributeSemantic::Normal,
				fault: AttributeFault::ComponentCount(4),
			}
		);
	}

	#[test]
	fn out_of_bounds() {
		let buffer = [0u8; 24];
		let err = extract_vertices(
			&buffer,
			2,
			&AttributeDescriptor::vec3(4, 0),
			&AttributeDescriptor::vec3(0, 0),
		)
		.unwrap_err();
		assert_eq!(
			err,
			MeshletError::InvalidAttribute {
				semantic: AttributeSemantic::Position,
				fault: AttributeFault::OutOfBounds { end: 28, len: 24 },
			}
		);
	}

	#[test]
	fn no_vertices() {
		let out = extract_vertices(&[], 0, &AttributeDescriptor::vec3(0, 0), &AttributeDescriptor::vec3(0, 0)).unwrap();
		assert!(out.is_empty());
	}
}
