// Module exports for models

pub mod color;
pub mod event;
pub mod grid;
pub mod segment;
pub mod settings;
