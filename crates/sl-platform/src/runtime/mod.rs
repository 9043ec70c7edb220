pub mod event_bus;
mod host;
#[allow(clippy::module_inception)]
mod runtime;

pub use host::BackgroundHost;
pub use runtime::PlatformRuntime;
