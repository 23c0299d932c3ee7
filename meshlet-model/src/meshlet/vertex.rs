use core::mem::size_of;
use glam::Vec3;
use static_assertions::const_assert_eq;

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck_derive::Zeroable, bytemuck_derive::Pod)]
pub struct Vertex {
	pub position: Vec3,
	pub normal: Vec3,
}
const_assert_eq!(size_of::<Vertex>(), 6 * 4);

impl Vertex {
	pub fn new(position: Vec3, normal: Vec3) -> Self {
		Self { position, normal }
	}
}
