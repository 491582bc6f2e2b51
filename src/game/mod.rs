pub mod constants;
pub mod emit;
pub mod math;
pub mod room;
pub mod snake;
pub mod types;
