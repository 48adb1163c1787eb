pub mod moves;
pub mod record;
pub mod store;

pub use moves::*;
pub use record::*;
pub use store::*;
