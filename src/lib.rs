//! Client-side settings for SketchQuest.
//!
//! [`settings::SettingsStore`] keeps the last saved settings next to the
//! copy the user is editing, previews every edit through a
//! [`settings::PresentationEffect`], and persists through a swappable
//! [`settings::DurableSlot`].

pub mod commands;
pub mod config;
pub mod error;
pub mod settings;
pub mod util;

pub use error::{Result, SettingsError};
