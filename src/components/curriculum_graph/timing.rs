use kurbo::Point;

use super::types::CameraTransform;

/// Cubic in-out easing shared by every animated step.
pub fn ease_cubic_in_out(t: f64) -> f64 {
	let t = t.clamp(0.0, 1.0);
	if t < 0.5 {
		4.0 * t * t * t
	} else {
		1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
	}
}

pub trait Interpolate: Copy {
	fn interpolate(self, to: Self, t: f64) -> Self;
}

impl Interpolate for f64 {
	fn interpolate(self, to: Self, t: f64) -> Self {
		self + (to - self) * t
	}
}

impl Interpolate for Point {
	fn interpolate(self, to: Self, t: f64) -> Self {
		self.lerp(to, t)
	}
}

impl Interpolate for CameraTransform {
	fn interpolate(self, to: Self, t: f64) -> Self {
		CameraTransform::new(
			self.x.interpolate(to.x, t),
			self.y.interpolate(to.y, t),
			self.k.interpolate(to.k, t),
		)
	}
}

/// A value animated from `from` to `to` over `duration` seconds of engine
/// clock, starting at `start`.
#[derive(Clone, Copy, Debug)]
pub struct Tween<T> {
	pub from: T,
	pub to: T,
	start: f64,
	duration: f64,
}

impl<T: Interpolate> Tween<T> {
	pub fn new(from: T, to: T, start: f64, duration: f64) -> Self {
		Self {
			from,
			to,
			start,
			duration,
		}
	}

	pub fn end(&self) -> f64 {
		self.start + self.duration
	}

	pub fn is_done(&self, now: f64) -> bool {
		now >= self.end()
	}

	pub fn sample(&self, now: f64) -> T {
		if self.duration <= 0.0 || self.is_done(now) {
			return self.to;
		}
		let t = ((now - self.start) / self.duration).clamp(0.0, 1.0);
		self.from.interpolate(self.to, ease_cubic_in_out(t))
	}
}
