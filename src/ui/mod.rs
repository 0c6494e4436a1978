pub mod canvas;
pub mod gamepad;
pub mod input;
pub mod renderer;
pub mod resources;
pub mod scene;
pub mod sound;
