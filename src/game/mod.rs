pub mod camera;
pub mod constants;
pub mod entity;
pub mod overlay;
pub mod performance;
pub mod world;
