pub mod bars;
pub mod colors;
pub mod popup;
pub mod tags;
pub mod time_graph;
