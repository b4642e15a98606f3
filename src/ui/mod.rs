pub mod heatmap;
pub mod panels;
pub mod preview;
