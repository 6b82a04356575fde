pub mod output;
pub mod prompt;

pub use output::*;
pub use prompt::*;
