use kurbo::{Point, Rect, Size};
use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use super::engine::GraphEngine;
use super::geometry::is_degenerate;
use super::positions::{Column, LectureColumns};
use super::recipes::Background;

const CANVAS_FILL: &str = "#fafafa";
const GRID_DOT: &str = "rgba(0, 0, 0, 0.15)";
const EDGE_STROKE: &str = "rgba(60, 60, 60, 0.8)";
const COLUMN_FILLS: [&str; 2] = ["rgba(31, 119, 180, 0.05)", "rgba(31, 119, 180, 0.1)"];

pub fn render(engine: &GraphEngine, ctx: &CanvasRenderingContext2d, viewport: Size) {
	ctx.set_fill_style_str(CANVAS_FILL);
	ctx.fill_rect(0.0, 0.0, viewport.width, viewport.height);

	let t = engine.camera_transform();
	ctx.save();
	let _ = ctx.translate(viewport.width / 2.0, viewport.height / 2.0);
	let _ = ctx.scale(t.k, t.k);
	let _ = ctx.translate(-t.x, -t.y);

	let visible = Rect::from_center_size(t.focus(), (viewport.width / t.k, viewport.height / t.k));
	match engine.background() {
		Background::Blank => {}
		Background::Grid => draw_grid(ctx, visible, engine.config().grid_spacing, t.k),
		Background::Columns(columns) => draw_columns(ctx, columns, t.k),
	}
	draw_edges(engine, ctx, t.k);
	draw_nodes(engine, ctx, t.k);
	ctx.restore();
}

fn draw_grid(ctx: &CanvasRenderingContext2d, visible: Rect, spacing: f64, k: f64) {
	// Dots closer than a few pixels just turn into noise.
	if spacing <= 0.0 || spacing * k < 8.0 {
		return;
	}
	let radius = 1.0 / k;
	ctx.set_fill_style_str(GRID_DOT);
	let mut x = (visible.x0 / spacing).floor() * spacing;
	while x <= visible.x1 {
		let mut y = (visible.y0 / spacing).floor() * spacing;
		while y <= visible.y1 {
			ctx.fill_rect(x - radius, y - radius, 2.0 * radius, 2.0 * radius);
			y += spacing;
		}
		x += spacing;
	}
}

fn draw_columns(ctx: &CanvasRenderingContext2d, columns: &LectureColumns, k: f64) {
	for (i, column) in Column::ALL.into_iter().enumerate() {
		let rect = columns.column_rect(column);
		ctx.set_fill_style_str(COLUMN_FILLS[i % 2]);
		ctx.fill_rect(rect.x0, rect.y0, rect.width(), rect.height());

		ctx.set_fill_style_str("rgba(0, 0, 0, 0.6)");
		ctx.set_font(&format!("bold {}px sans-serif", 14.0 / k.max(0.5)));
		ctx.set_text_align("center");
		let _ = ctx.fill_text(column.title(), rect.center().x, rect.y0 - 8.0 / k);
	}
	ctx.set_text_align("start");
}

fn draw_edges(engine: &GraphEngine, ctx: &CanvasRenderingContext2d, k: f64) {
	let (line_width, arrow_size) = (1.5 / k.max(0.5), 8.0 / k.max(0.5));
	ctx.set_stroke_style_str(EDGE_STROKE);
	ctx.set_fill_style_str(EDGE_STROKE);
	ctx.set_line_width(line_width);

	for edge in engine.scene().edges() {
		let target = engine
			.scene()
			.node(edge.edge.target)
			.map(|n| n.position)
			.unwrap_or(edge.route.p1);
		if is_degenerate(edge.route, target) {
			continue;
		}
		let (p0, p1) = (edge.route.p0, edge.route.p1);
		let d = p1 - p0;
		let len = d.hypot();
		if len < 0.001 {
			continue;
		}
		let u = d / len;

		ctx.set_global_alpha(edge.opacity());
		ctx.begin_path();
		ctx.move_to(p0.x, p0.y);
		ctx.line_to(p1.x - u.x * arrow_size, p1.y - u.y * arrow_size);
		ctx.stroke();

		let back = p1 - u * arrow_size;
		let (px, py) = (-u.y * arrow_size * 0.5, u.x * arrow_size * 0.5);
		ctx.begin_path();
		ctx.move_to(p1.x, p1.y);
		ctx.line_to(back.x + px, back.y + py);
		ctx.line_to(back.x - px, back.y - py);
		ctx.close_path();
		ctx.fill();
	}
	ctx.set_global_alpha(1.0);
}

fn draw_nodes(engine: &GraphEngine, ctx: &CanvasRenderingContext2d, k: f64) {
	let size = engine.config().node_size();
	let graph = engine.graph();
	let dash = js_sys::Array::of2(&JsValue::from_f64(6.0 / k), &JsValue::from_f64(4.0 / k));

	for scene_node in engine.scene().nodes() {
		let node = graph.node(scene_node.key);
		let rect = Rect::from_center_size(scene_node.position, size);

		ctx.set_global_alpha(scene_node.opacity());
		ctx.set_fill_style_str(graph.color_of(scene_node.key));
		ctx.fill_rect(rect.x0, rect.y0, rect.width(), rect.height());

		// Free nodes get a dashed outline.
		if node.is_pinned() {
			let _ = ctx.set_line_dash(&js_sys::Array::new());
		} else {
			let _ = ctx.set_line_dash(&dash);
		}
		ctx.set_stroke_style_str("rgba(0, 0, 0, 0.7)");
		ctx.set_line_width(1.5 / k.max(0.5));
		ctx.stroke_rect(rect.x0, rect.y0, rect.width(), rect.height());

		draw_label(ctx, &node.label, scene_node.position, rect.width(), k);
	}
	let _ = ctx.set_line_dash(&js_sys::Array::new());
	ctx.set_global_alpha(1.0);
}

fn draw_label(ctx: &CanvasRenderingContext2d, label: &str, center: Point, max_width: f64, k: f64) {
	ctx.set_fill_style_str("white");
	ctx.set_font(&format!("{}px sans-serif", 12.0 / k.max(1.0)));
	ctx.set_text_align("center");
	ctx.set_text_baseline("middle");
	let _ = ctx.fill_text_with_max_width(label, center.x, center.y, max_width - 8.0);
	ctx.set_text_align("start");
	ctx.set_text_baseline("alphabetic");
}
