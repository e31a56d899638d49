pub mod body;
pub mod math;
pub mod trail;
