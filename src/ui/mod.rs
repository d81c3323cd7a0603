pub mod input;
pub mod renderer;
pub mod scene;
pub mod view;
