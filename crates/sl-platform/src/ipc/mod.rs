mod command;
mod event;

pub use command::{PlatformCommand, WatcherReply};
pub use event::PlatformEvent;
