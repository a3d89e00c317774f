use kurbo::{Point, Size, Vec2};

use super::geometry::{MAX_ZOOM, MIN_ZOOM};
use super::timing::Tween;
use super::types::CameraTransform;

/// Pan/zoom controller for the drawing surface.
///
/// Every move is either instant or eased over the shared transition
/// duration. Animated moves return how long the caller has to wait before
/// the next step may start.
#[derive(Clone, Debug)]
pub struct Camera {
	current: CameraTransform,
	tween: Option<Tween<CameraTransform>>,
	duration: f64,
}

fn clamped(t: CameraTransform) -> CameraTransform {
	CameraTransform::new(t.x, t.y, t.k.clamp(MIN_ZOOM, MAX_ZOOM))
}

impl Camera {
	pub fn new(duration: f64) -> Self {
		Self {
			current: CameraTransform::default(),
			tween: None,
			duration,
		}
	}

	pub fn transform(&self) -> CameraTransform {
		self.current
	}

	/// Where the camera ends up once the running animation, if any, settles.
	pub fn target(&self) -> CameraTransform {
		self.tween.map(|t| t.to).unwrap_or(self.current)
	}

	pub fn is_animating(&self) -> bool {
		self.tween.is_some()
	}

	pub fn frame_to(&mut self, transform: CameraTransform, animated: bool, now: f64) -> f64 {
		let transform = clamped(transform);
		if !animated || self.duration <= 0.0 {
			self.current = transform;
			self.tween = None;
			return 0.0;
		}
		self.tween = Some(Tween::new(self.current, transform, now, self.duration));
		self.duration
	}

	pub fn pan_to(&mut self, x: f64, y: f64, animated: bool, now: f64) -> f64 {
		let k = self.target().k;
		self.frame_to(CameraTransform::new(x, y, k), animated, now)
	}

	pub fn zoom_to(&mut self, k: f64, animated: bool, now: f64) -> f64 {
		let target = self.target();
		self.frame_to(CameraTransform::new(target.x, target.y, k), animated, now)
	}

	pub fn zoom_step(&mut self, multiplier: f64, animated: bool, now: f64) -> f64 {
		let k = self.target().k * multiplier;
		self.zoom_to(k, animated, now)
	}

	pub fn advance(&mut self, now: f64) {
		if let Some(tween) = self.tween {
			self.current = tween.sample(now);
			if tween.is_done(now) {
				self.tween = None;
			}
		}
	}

	pub fn world_to_screen(&self, world: Point, viewport: Size) -> Point {
		let c = self.current;
		Point::new(
			(world.x - c.x) * c.k + viewport.width / 2.0,
			(world.y - c.y) * c.k + viewport.height / 2.0,
		)
	}

	pub fn screen_to_world(&self, screen: Point, viewport: Size) -> Point {
		let c = self.current;
		Point::new(
			(screen.x - viewport.width / 2.0) / c.k + c.x,
			(screen.y - viewport.height / 2.0) / c.k + c.y,
		)
	}

	/// Instant pan by a screen-space delta; dragging the background right
	/// moves the focus left.
	pub fn pan_by_screen(&mut self, delta: Vec2) {
		self.tween = None;
		self.current.x -= delta.x / self.current.k;
		self.current.y -= delta.y / self.current.k;
	}

	/// Instant zoom that keeps the world point under `anchor` fixed.
	pub fn zoom_about(&mut self, anchor: Point, factor: f64, viewport: Size) {
		self.tween = None;
		let world = self.screen_to_world(anchor, viewport);
		let k = (self.current.k * factor).clamp(MIN_ZOOM, MAX_ZOOM);
		self.current = CameraTransform::new(
			world.x - (anchor.x - viewport.width / 2.0) / k,
			world.y - (anchor.y - viewport.height / 2.0) / k,
			k,
		);
	}
}
