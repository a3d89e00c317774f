use std::cell::RefCell;
use std::rc::Rc;

use kurbo::{Point, Size};
use leptos::callback::Callable;
use leptos::prelude::*;
use log::{info, warn};
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, WheelEvent, Window};

use super::config::EngineConfig;
use super::engine::{GraphEngine, WheelOutcome};
use super::error::{EngineError, SaveError};
use super::render;
use super::store::{LogStore, NodeStore};
use super::types::{GraphData, LectureKey, Node, RunState, View, ViewStatus};

type SharedEngine = Rc<RefCell<Option<GraphEngine>>>;

/// Runs `f` against the engine if it exists, logging any error.
fn dispatch(engine: &SharedEngine, f: impl FnOnce(&mut GraphEngine) -> Result<bool, EngineError>) {
	if let Some(engine) = engine.borrow_mut().as_mut() {
		if let Err(err) = f(engine) {
			warn!("{err}");
		}
	}
}

fn window_size(window: &Window) -> Size {
	let w = window.inner_width().ok().and_then(|v| v.as_f64()).unwrap_or(800.0);
	let h = window.inner_height().ok().and_then(|v| v.as_f64()).unwrap_or(600.0);
	Size::new(w, h)
}

fn pointer(canvas_ref: NodeRef<leptos::html::Canvas>, ev: &MouseEvent) -> Option<Point> {
	let canvas: HtmlCanvasElement = canvas_ref.get()?;
	let rect = canvas.get_bounding_client_rect();
	Some(Point::new(
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	))
}

/// Canvas view of a curriculum graph with a toolbar for switching views,
/// picking a lecture, toggling auto-layout and zooming.
///
/// Node positions are persisted through `on_save` when given, otherwise
/// only logged.
#[component]
pub fn CurriculumCanvas(
	/// Curriculum to show; a change reloads the engine.
	#[prop(into)]
	data: Signal<GraphData>,
	/// Engine tunables.
	#[prop(optional)]
	config: EngineConfig,
	/// View shown first, without animation.
	#[prop(default = View::Domains)]
	initial_view: View,
	/// Persists a node whose pin state changed.
	#[prop(optional, into)]
	on_save: Option<Callback<Node, Result<(), SaveError>>>,
	/// Size the canvas to the window and follow resizes.
	#[prop(default = false)]
	fullscreen: bool,
	/// Canvas width; defaults to the parent's width.
	#[prop(default = None)]
	width: Option<f64>,
	/// Canvas height; defaults to the parent's height.
	#[prop(default = None)]
	height: Option<f64>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let engine: SharedEngine = Rc::new(RefCell::new(None));
	let animate: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let resize_cb: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let status = RwSignal::new(ViewStatus::default());
	let lectures = RwSignal::new(Vec::<(usize, String)>::new());
	let zoom_step = config.zoom_step;
	let (engine_init, animate_init, resize_cb_init) = (engine.clone(), animate.clone(), resize_cb.clone());

	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let Some(window) = web_sys::window() else {
			return;
		};

		let size = if fullscreen {
			window_size(&window)
		} else {
			let parent = canvas.parent_element();
			Size::new(
				width.unwrap_or_else(|| parent.as_ref().map(|p| p.client_width() as f64).unwrap_or(800.0)),
				height.unwrap_or_else(|| parent.as_ref().map(|p| p.client_height() as f64).unwrap_or(600.0)),
			)
		};
		canvas.set_width(size.width as u32);
		canvas.set_height(size.height as u32);

		let Some(ctx) = canvas
			.get_context("2d")
			.ok()
			.flatten()
			.and_then(|c| c.dyn_into::<CanvasRenderingContext2d>().ok())
		else {
			warn!("canvas has no 2d context");
			return;
		};

		let store: Box<dyn NodeStore> = match on_save {
			Some(callback) => Box::new(move |node: &Node| callback.run(node.clone())),
			None => Box::new(LogStore),
		};
		let mut next = GraphEngine::new(&data.get(), config.clone(), store);
		next.attach(size);
		next.set_observer(move |s| status.set(s));
		lectures.set(next.lectures().map(|(k, l)| (k.0, l.label.clone())).collect());
		if let Err(err) = next.snap_to(initial_view) {
			warn!("{err}");
		}
		info!("curriculum canvas ready at {}x{}", size.width, size.height);
		*engine_init.borrow_mut() = Some(next);

		if fullscreen && resize_cb_init.borrow().is_none() {
			let (engine_resize, canvas_resize) = (engine_init.clone(), canvas.clone());
			*resize_cb_init.borrow_mut() = Some(Closure::new(move || {
				let Some(win) = web_sys::window() else {
					return;
				};
				let size = window_size(&win);
				canvas_resize.set_width(size.width as u32);
				canvas_resize.set_height(size.height as u32);
				if let Some(e) = engine_resize.borrow_mut().as_mut() {
					e.attach(size);
				}
			}));
			if let Some(ref cb) = *resize_cb_init.borrow() {
				let _ = window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
			}
		}

		// The frame loop outlives data reloads; only start it once.
		if animate_init.borrow().is_some() {
			return;
		}
		let (engine_anim, animate_inner) = (engine_init.clone(), animate_init.clone());
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			if let Some(e) = engine_anim.borrow_mut().as_mut() {
				e.tick(0.016);
				if let Some(viewport) = e.viewport() {
					render::render(e, &ctx, viewport);
				}
			}
			if let (Some(cb), Some(win)) = (animate_inner.borrow().as_ref(), web_sys::window()) {
				let _ = win.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	let engine_md = engine.clone();
	let on_mousedown = move |ev: MouseEvent| {
		let Some(p) = pointer(canvas_ref, &ev) else {
			return;
		};
		if let Some(e) = engine_md.borrow_mut().as_mut() {
			e.pointer_down(p);
		}
	};

	let engine_mm = engine.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let Some(p) = pointer(canvas_ref, &ev) else {
			return;
		};
		if let Some(e) = engine_mm.borrow_mut().as_mut() {
			e.pointer_move(p);
		}
	};

	let engine_mu = engine.clone();
	let on_mouseup = move |_: MouseEvent| {
		if let Some(e) = engine_mu.borrow_mut().as_mut() {
			e.pointer_up();
		}
	};

	let engine_ml = engine.clone();
	let on_mouseleave = move |_: MouseEvent| {
		if let Some(e) = engine_ml.borrow_mut().as_mut() {
			e.pointer_up();
		}
	};

	let engine_wh = engine.clone();
	let on_wheel = move |ev: WheelEvent| {
		let Some(p) = pointer(canvas_ref, &ev) else {
			return;
		};
		let modifier = ev.shift_key() || ev.ctrl_key() || ev.meta_key();
		if let Some(e) = engine_wh.borrow_mut().as_mut() {
			// Let the page scroll unless the wheel actually zoomed.
			if e.wheel(p, ev.delta_y(), modifier) == WheelOutcome::Zoomed {
				ev.prevent_default();
			}
		}
	};

	let busy = move || status.get().run == RunState::Transitioning;
	let locked = move || busy() || status.get().view == View::Lectures;
	let view_button = {
		let engine = engine.clone();
		move |view: View| {
			let engine = engine.clone();
			view! {
				<button
					class:active={move || status.get().view == view}
					disabled=busy
					on:click=move |_| dispatch(&engine, |e| e.set_view(view))
				>
					{view.label()}
				</button>
			}
		}
	};

	let engine_lecture = engine.clone();
	let on_lecture = move |ev: web_sys::Event| {
		let lecture = event_target_value(&ev).parse::<usize>().ok().map(LectureKey);
		dispatch(&engine_lecture, |e| e.select_lecture(lecture));
	};

	let engine_auto = engine.clone();
	let engine_zoom_in = engine.clone();
	let engine_zoom_out = engine.clone();
	let engine_fit = engine.clone();
	let engine_dismiss = engine.clone();
	let engine_retry = engine.clone();

	view! {
		<div class="curriculum-canvas" style="position: relative;">
			<div class="curriculum-toolbar">
				{view_button(View::Domains)}
				{view_button(View::Subjects)}
				{view_button(View::Lectures)}
				<select
					on:change=on_lecture
					disabled=busy
					prop:value={move || status.get().lecture.map(|k| k.0.to_string()).unwrap_or_default()}
				>
					<option value="">"No lecture"</option>
					{move || {
						lectures
							.get()
							.into_iter()
							.map(|(i, name)| view! { <option value=i.to_string()>{name}</option> })
							.collect_view()
					}}
				</select>
				<button
					disabled=locked
					on:click=move |_| {
						if let Some(e) = engine_auto.borrow_mut().as_mut() {
							e.toggle_autolayout();
						}
					}
				>
					{move || if status.get().run == RunState::Simulating { "Freeze layout" } else { "Auto-layout" }}
				</button>
				<button disabled=locked on:click=move |_| dispatch(&engine_zoom_in, |e| e.zoom_step(zoom_step, true))>
					"+"
				</button>
				<button disabled=locked on:click=move |_| dispatch(&engine_zoom_out, |e| e.zoom_step(1.0 / zoom_step, true))>
					"-"
				</button>
				<button disabled=locked on:click=move |_| dispatch(&engine_fit, |e| e.fit_content(true))>
					"Fit"
				</button>
				<span
					class="unsaved"
					style:display={move || if status.get().unsaved > 0 { "inline" } else { "none" }}
				>
					{move || format!("{} unsaved", status.get().unsaved)}
					<button on:click=move |_| {
						if let Some(e) = engine_retry.borrow_mut().as_mut() {
							e.retry_unsaved();
						}
					}>"Retry"</button>
				</span>
			</div>
			<canvas
				node_ref=canvas_ref
				class="curriculum-graph-canvas"
				on:mousedown=on_mousedown
				on:mousemove=on_mousemove
				on:mouseup=on_mouseup
				on:mouseleave=on_mouseleave
				on:wheel=on_wheel
				style="display: block; cursor: grab;"
			/>
			<div
				class="zoom-warning"
				style="position: absolute; inset: 0; align-items: center; justify-content: center; background: rgba(0, 0, 0, 0.4);"
				style:display={move || if status.get().zoom_warning { "flex" } else { "none" }}
			>
				<div class="zoom-warning-box">
					<p>"Hold Shift or Ctrl while scrolling to zoom."</p>
					<button on:click=move |_| {
						if let Some(e) = engine_dismiss.borrow_mut().as_mut() {
							e.dismiss_zoom_warning();
						}
					}>"Got it"</button>
				</div>
			</div>
		</div>
	}
}
