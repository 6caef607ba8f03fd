pub mod left_mouse_button_click;
pub mod text_input;
pub mod zoom_coordinate;

pub use left_mouse_button_click::LeftMouseButtonClickAction;
pub use text_input::TextInputAction;
pub use zoom_coordinate::ZoomCoordinateAction;
