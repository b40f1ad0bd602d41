pub mod capacity;
pub mod content;
pub mod critical_path;
pub mod effort;
pub mod heat;
pub mod matrix;
pub mod validate;

pub use capacity::*;
pub use content::*;
pub use critical_path::*;
pub use effort::*;
pub use heat::*;
pub use matrix::*;
pub use validate::*;
