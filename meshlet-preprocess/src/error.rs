use std::fmt::{Display, Formatter};
use thiserror::Error;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum AttributeSemantic {
	Position,
	Normal,
}

impl Display for AttributeSemantic {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		match self {
			AttributeSemantic::Position => f.write_str("POSITION"),
			AttributeSemantic::Normal => f.write_str("NORMAL"),
		}
	}
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Error)]
pub enum AttributeFault {
	#[error("expected 3 components but got {0}")]
	ComponentCount(u32),
	#[error("reads up to byte {end} of a {len} byte buffer")]
	OutOfBounds { end: usize, len: usize },
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Error)]
pub enum InvalidInputKind {
	#[error("index buffer is empty")]
	EmptyIndices,
	#[error("vertex count is zero")]
	NoVertices,
	#[error("index count {0} is not a multiple of 3")]
	NotTriangleList(usize),
	#[error("index {index} is out of range for {vertex_count} vertices")]
	IndexOutOfRange { index: u32, vertex_count: u32 },
	#[error("meshlets must fit at least one triangle, but max_vertices is {max_vertices} and max_indices is {max_indices}")]
	MeshletCapacity { max_vertices: u32, max_indices: u32 },
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Error)]
pub enum MeshletError {
	#[error("{semantic} attribute is invalid: {fault}")]
	InvalidAttribute {
		semantic: AttributeSemantic,
		fault: AttributeFault,
	},
	#[error("index type with {bits} bits is not supported, must be 8, 16 or 32")]
	UnsupportedIndexType { bits: u32 },
	#[error("index buffer of {len} bytes is not a multiple of the index size {stride}")]
	InvalidIndexBuffer { len: usize, stride: usize },
	#[error("vertex {vertex} is referenced by {triangles} triangles, exceeding the limit of 255")]
	VertexOverloaded { vertex: u32, triangles: usize },
	#[error("invalid input: {0}")]
	InvalidInput(#[from] InvalidInputKind),
}

pub type Result<T> = core::result::Result<T, MeshletError>;

/// Checks that `indices` form a non-empty triangle list referencing only vertices below `vertex_count`.
pub fn validate_triangle_list(indices: &[u32], vertex_count: u32) -> Result<()> {
	if indices.is_empty() {
		Err(InvalidInputKind::EmptyIndices)?;
	}
	if vertex_count == 0 {
		Err(InvalidInputKind::NoVertices)?;
	}
	if indices.len() % 3 != 0 {
		Err(InvalidInputKind::NotTriangleList(indices.len()))?;
	}
	if let Some(&index) = indices.iter().find(|&&i| i >= vertex_count) {
		Err(InvalidInputKind::IndexOutOfRange { index, vertex_count })?;
	}
	Ok(())
}
