pub mod curriculum_graph;
