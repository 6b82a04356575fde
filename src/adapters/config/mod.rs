pub mod file_store;
pub mod preference_store;

pub use file_store::*;
pub use preference_store::*;
