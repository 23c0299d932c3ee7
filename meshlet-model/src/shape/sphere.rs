use glam::{Vec3, Vec4, Vec4Swizzles};

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Sphere(Vec4);

impl Sphere {
	pub fn new(center: Vec3, radius: f32) -> Sphere {
		Self(Vec4::from((center, radius)))
	}

	/// Centers the sphere on the mean of all points and grows it to the furthest one. Not minimal, but every point is
	/// guaranteed to be contained. `iter` must yield the same values every time.
	pub fn bounding_sphere_centered<I: Iterator<Item = Vec3>>(iter: impl Fn() -> I) -> Option<Self> {
		let center = Self::mean(iter())?;
		let radius = iter().map(|p| p.distance(center)).fold(0., f32::max);
		Some(Self::new(center, radius))
	}

	/// Encloses all `spheres`, centered on their radius weighted mean.
	pub fn merge_spheres_approx(spheres: &[Sphere]) -> Option<Sphere> {
		let total_radius = spheres.iter().map(Sphere::radius).sum::<f32>();
		let center = if total_radius > 0. {
			spheres.iter().map(|s| s.center() * s.radius()).sum::<Vec3>() / total_radius
		} else {
			// only points
			Self::mean(spheres.iter().map(Sphere::center))?
		};
		let radius = spheres
			.iter()
			.map(|s| s.center().distance(center) + s.radius())
			.fold(0., f32::max);
		Some(Self::new(center, radius))
	}

	fn mean(points: impl Iterator<Item = Vec3>) -> Option<Vec3> {
		let (sum, count) = points.fold((Vec3::ZERO, 0u32), |(sum, count), p| (sum + p, count + 1));
		(count != 0).then(|| sum / count as f32)
	}

	pub fn center(&self) -> Vec3 {
		self.0.xyz()
	}

	pub fn radius(&self) -> f32 {
		self.0.w
	}

	pub fn contains(&self, point: Vec3, epsilon: f32) -> bool {
		point.distance(self.center()) <= self.radius() + epsilon
	}
}
