pub mod auto_scroll;
pub mod coordinate_mapper;
pub mod gaze_filter;
pub mod input_fusion;
pub mod zoom_drift;
