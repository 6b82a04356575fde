pub mod app;
pub mod event;
pub mod notifier;
pub mod widgets;

pub use app::*;
pub use notifier::ChannelNotifier;
