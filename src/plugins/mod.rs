pub mod camera;
pub mod canvas;
pub mod frame_limit;
pub mod simulation;
