mod camera;
mod component;
mod config;
mod engine;
mod error;
mod geometry;
mod layout;
mod positions;
mod projection;
mod recipes;
mod render;
mod scene;
mod state;
mod store;
mod timing;
mod types;

pub use component::CurriculumCanvas;
pub use config::EngineConfig;
pub use engine::{GraphEngine, WheelOutcome};
pub use error::{EngineError, SaveError};
pub use geometry::{MAX_ZOOM, MIN_ZOOM};
pub use positions::{Column, LectureColumns};
pub use projection::Graph;
pub use recipes::Background;
pub use scene::{Scene, SceneEdge, SceneNode};
pub use store::{LogStore, NodeStore};
pub use types::{
	CameraTransform, DomainRecord, Edge, EdgeKey, GraphData, GraphLink, Lecture, LectureKey, LectureRecord, Node,
	NodeKey, Projection, RunState, SubjectRecord, View, ViewStatus,
};
