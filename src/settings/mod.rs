//! Settings state synchronization: a saved and a working copy of the user's
//! settings, a live preview of the working copy, and durable persistence.

pub mod palette;
pub mod persist;
pub mod preview;
pub mod record;
pub mod store;

pub use persist::{DurableSlot, FileSlot, MemorySlot, SettingsRepository};
pub use preview::{DocumentPresentation, PresentationEffect};
pub use record::{SettingChange, SettingKey, SettingsRecord, SidebarPosition, ViewMode};
pub use store::SettingsStore;
