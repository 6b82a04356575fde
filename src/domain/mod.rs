pub mod comment;
pub mod error;
pub mod sort;

pub use comment::*;
pub use error::*;
pub use sort::*;
