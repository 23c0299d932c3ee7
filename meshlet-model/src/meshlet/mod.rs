use static_assertions::const_assert;

pub mod mesh;
pub mod model;
pub mod stats;
pub mod vertex;

/// Default vertex capacity of a single meshlet, matching common mesh shader output limits.
pub const MESHLET_MAX_VERTICES: u32 = 128;
pub const MESHLET_MAX_TRIANGLES: u32 = 128;
pub const MESHLET_MAX_INDICES: u32 = 3 * MESHLET_MAX_TRIANGLES;
const_assert!(MESHLET_MAX_VERTICES >= 3);
const_assert!(MESHLET_MAX_INDICES % 3 == 0);
