pub mod capacity;
pub mod common;
pub mod item;
pub mod matrix;
pub mod plan;
pub mod relation;

pub use capacity::*;
pub use common::*;
pub use item::*;
pub use matrix::*;
pub use plan::*;
pub use relation::*;
