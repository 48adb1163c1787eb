// Core data models for stageboard

pub mod item;
pub mod stage;
pub mod stage_move;

pub use item::*;
pub use stage::*;
pub use stage_move::*;
