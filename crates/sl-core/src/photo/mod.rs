//! Photo and session domain model.

mod identity;
mod instance;
mod record;
mod screenshot;
mod session;
mod world;

pub use identity::{Identity, Roster};
pub use instance::{AccessType, InstanceId};
pub use record::PhotoRecord;
pub use screenshot::{ScreenshotName, SCREENSHOT_PREFIX};
pub use session::SessionMetadata;
pub use world::WorldDescriptor;
