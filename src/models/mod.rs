pub mod input;
pub mod page;
pub mod recording;
pub mod settings;
