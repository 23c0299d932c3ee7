use crate::error::{MeshletError, Result};
use num_enum::TryFromPrimitive;

/// Width of a single element in an index buffer, the discriminant is the width in bits.
#[repr(u32)]
#[derive(Copy, Clone, Debug, Eq, PartialEq, TryFromPrimitive)]
pub enum IndexType {
	U8 = 8,
	U16 = 16,
	U32 = 32,
}

impl IndexType {
	pub fn from_bits(bits: u32) -> Result<Self> {
		Self::try_from(bits).map_err(|e| MeshletError::UnsupportedIndexType { bits: e.number })
	}

	pub fn size(&self) -> usize {
		*self as usize / 8
	}
}

/// Widens a little-endian index buffer with elements of `bits` width to `u32` indices.
pub fn normalize_indices(bytes: &[u8], bits: u32) -> Result<Vec<u32>> {
	normalize_indices_typed(bytes, IndexType::from_bits(bits)?)
}

#[profiling::function]
pub fn normalize_indices_typed(bytes: &[u8], index_type: IndexType) -> Result<Vec<u32>> {
	let stride = index_type.size();
	if bytes.len() % stride != 0 {
		return Err(MeshletError::InvalidIndexBuffer {
			len: bytes.len(),
			stride,
		});
	}

	let chunks = bytes.chunks_exact(stride);
	Ok(match index_type {
		IndexType::U8 => chunks.map(|c| c[0] as u32).collect(),
		IndexType::U16 => chunks.map(|c| u16::from_le_bytes([c[0], c[1]]) as u32).collect(),
		IndexType::U32 => chunks.map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]])).collect(),
	})
}
