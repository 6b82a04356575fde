pub mod comment_gateway;
pub mod config_store;
pub mod notifier;
pub mod preference_store;

pub use comment_gateway::*;
pub use config_store::*;
pub use notifier::*;
pub use preference_store::*;
