pub mod level;
pub mod motion;
pub mod session;
pub mod stage;
pub mod step;
pub mod validate;
