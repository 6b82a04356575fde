pub mod comment_store;
pub mod error;
pub mod intent;

pub use comment_store::*;
pub use error::*;
pub use intent::*;
