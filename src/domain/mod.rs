pub mod ai;
pub mod command;
pub mod grid;
pub mod ring;
pub mod tile;
