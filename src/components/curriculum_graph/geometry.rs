//! Stateless geometry: zoom-to-fit framing and edge routing.

use kurbo::{Line, Point, Rect, Size};

use super::types::CameraTransform;

/// Smallest camera scale.
pub const MIN_ZOOM: f64 = 0.1;
/// Largest camera scale.
pub const MAX_ZOOM: f64 = 2.0;

/// Frames a set of node centers inside the viewport.
///
/// Every node footprint (`node_size` around its center) is grown by
/// `margin`, the union is grown by `padding`, and the result is centered in
/// the viewport at the largest scale that still fits, clamped to
/// `[MIN_ZOOM, MAX_ZOOM]`. An empty set frames the origin at scale 1.
pub fn bounding_frame<I>(
	nodes: I,
	margin: f64,
	padding: f64,
	viewport: Size,
	node_size: Size,
) -> CameraTransform
where
	I: IntoIterator<Item = Point>,
{
	let Some(bounds) = nodes
		.into_iter()
		.map(|center| Rect::from_center_size(center, node_size).inflate(margin, margin))
		.reduce(|acc, rect| acc.union(rect))
	else {
		return CameraTransform::default();
	};
	frame_rect(bounds.inflate(padding, padding), viewport)
}

/// Centers `rect` in the viewport at the largest scale that fits.
pub fn frame_rect(rect: Rect, viewport: Size) -> CameraTransform {
	let center = rect.center();
	let k = (viewport.width / rect.width().max(f64::MIN_POSITIVE))
		.min(viewport.height / rect.height().max(f64::MIN_POSITIVE))
		.clamp(MIN_ZOOM, MAX_ZOOM);
	CameraTransform::new(center.x, center.y, k)
}

/// Routes an edge from the center of `source` to the boundary of the
/// rectangle around `target`, so an arrowhead drawn at the end lands on the
/// target's outline.
///
/// When the two rectangles overlap the segment runs center to center and is
/// hidden under the nodes; see [`is_degenerate`].
pub fn route_edge(source: Point, target: Point, node_size: Size, node_margin: f64) -> Line {
	let half_w = node_size.width / 2.0 + node_margin;
	let half_h = node_size.height / 2.0 + node_margin;
	let (dx, dy) = (target.x - source.x, target.y - source.y);

	if (dx == 0.0 && dy == 0.0) || (dx.abs() < half_w && dy.abs() < half_h) {
		return Line::new(source, target);
	}

	// The rectangle diagonals split the plane into four quadrants; the
	// quadrant holding the target decides which side the segment crosses.
	let end = if dx != 0.0 && dy.abs() * half_w <= dx.abs() * half_h {
		// left or right side
		let t = half_w / dx.abs();
		Point::new(target.x - dx.signum() * half_w, target.y - dy * t)
	} else {
		// top or bottom side
		let t = half_h / dy.abs();
		Point::new(target.x - dx * t, target.y - dy.signum() * half_h)
	};
	Line::new(source, end)
}

/// True when the route was produced by the overlap branch of [`route_edge`].
pub fn is_degenerate(route: Line, target: Point) -> bool {
	route.p1 == target
}
