use leptos::prelude::*;

use crate::components::curriculum_graph::{
	CurriculumCanvas, DomainRecord, GraphData, GraphLink, LectureRecord, SubjectRecord,
};

const PALETTE: [&str; 6] = ["#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b"];
const DOMAINS: [&str; 6] = ["Algebra", "Analysis", "Geometry", "Probability", "Statistics", "Numerics"];
const SUBJECTS_PER_DOMAIN: usize = 4;

/// Generate a sample curriculum: domains on a loose grid, a handful of
/// subjects around each, prerequisite links pointing forward and lectures
/// covering neighbouring subjects.
fn generate_sample_data(lectures: usize) -> GraphData {
	let domains: Vec<DomainRecord> = DOMAINS
		.iter()
		.enumerate()
		.map(|(i, name)| DomainRecord {
			id: format!("d{i}"),
			name: name.to_string(),
			style: Some(PALETTE[i % PALETTE.len()].to_string()),
			x: (i % 3) as f64 * 600.0,
			y: (i / 3) as f64 * 400.0,
		})
		.collect();

	let subjects: Vec<SubjectRecord> = domains
		.iter()
		.enumerate()
		.flat_map(|(d, domain)| {
			(0..SUBJECTS_PER_DOMAIN).map(move |j| {
				let angle = j as f64 / SUBJECTS_PER_DOMAIN as f64 * std::f64::consts::TAU;
				SubjectRecord {
					id: format!("s{d}-{j}"),
					name: format!("{} {}", domain.name, j + 1),
					domain: domain.id.clone(),
					x: domain.x + 220.0 * angle.cos(),
					y: domain.y + 140.0 * angle.sin(),
				}
			})
		})
		.collect();

	let domain_links = (1..domains.len())
		.map(|i| GraphLink {
			source: domains[(rand_simple(i) * i as f64) as usize].id.clone(),
			target: domains[i].id.clone(),
		})
		.collect();

	let subject_links = (1..subjects.len())
		.map(|i| GraphLink {
			source: subjects[(rand_simple(i + 100) * i as f64) as usize].id.clone(),
			target: subjects[i].id.clone(),
		})
		.collect();

	let lectures = (0..lectures)
		.map(|i| {
			let first = (rand_simple(i + 200) * (subjects.len() - 1) as f64) as usize;
			LectureRecord {
				id: format!("l{i}"),
				name: format!("Lecture {}", i + 1),
				subjects: vec![subjects[first].id.clone(), subjects[first + 1].id.clone()],
			}
		})
		.collect();

	GraphData {
		domains,
		subjects,
		domain_links,
		subject_links,
		lectures,
	}
}

/// Simple pseudo-random number generator (deterministic for consistency).
fn rand_simple(seed: usize) -> f64 {
	let x = ((seed + 1) * 9301 + 49297) % 233280;
	(x as f64) / 233280.0
}

/// Default Home Page
#[component]
pub fn Home() -> impl IntoView {
	let graph_data = Signal::derive(move || generate_sample_data(8));

	view! {
		<ErrorBoundary fallback=|errors| {
			view! {
				<h1>"Uh oh! Something went wrong!"</h1>

				<p>"Errors: "</p>
				<ul>
					{move || {
						errors
							.get()
							.into_iter()
							.map(|(_, e)| view! { <li>{e.to_string()}</li> })
							.collect_view()
					}}
				</ul>
			}
		}>

			<div class="fullscreen-graph">
				<CurriculumCanvas data=graph_data fullscreen=true />
				<div class="graph-overlay">
					<h1>"Curriculum Graph"</h1>
					<p class="subtitle">
						"Drag nodes to reposition. Hold Shift and scroll to zoom. Drag background to pan."
					</p>
				</div>
			</div>
		</ErrorBoundary>
	}
}

#[cfg(test)]
mod tests {
	use super::generate_sample_data;
	use crate::components::curriculum_graph::Graph;

	#[test]
	fn sample_data_survives_projection() {
		let data = generate_sample_data(8);
		let graph = Graph::from_data(&data, 1.0);
		assert_eq!(graph.domains().nodes.len(), 6);
		assert_eq!(graph.subjects().nodes.len(), 24);
		assert_eq!(graph.lecture_keys().len(), 8);
		for key in graph.lecture_keys() {
			assert_eq!(graph.lecture(key).present_nodes.len(), 2);
		}
	}
}
