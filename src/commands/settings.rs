use std::path::Path;
use std::str::FromStr;

use log::warn;
use serde::Serialize;
use serde_json::Value;

use crate::error::{Result, SettingsError};
use crate::settings::palette::is_known_palette;
use crate::settings::persist::{DurableSlot, FileSlot, SettingsRepository};
use crate::settings::preview::{DocumentPresentation, PresentationEffect};
use crate::settings::record::{is_supported_language, SettingChange, SettingKey, SettingsRecord};
use crate::settings::store::SettingsStore;

pub type FileSettingsStore = SettingsStore<FileSlot, DocumentPresentation>;

/// What the document looks like with the current working settings.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewReport {
    pub theme: Option<String>,
    pub root_font_size: Option<String>,
    pub body_classes: Vec<String>,
}

/// A setting name and its default value.
#[derive(Clone, Debug, Serialize)]
pub struct KeyInfo {
    pub key: &'static str,
    pub default: Value,
}

/// Mount a store backed by the settings file at `path`.
pub fn open_store(path: &Path) -> FileSettingsStore {
    SettingsStore::mount(
        SettingsRepository::new(FileSlot::new(path)),
        DocumentPresentation::default(),
    )
}

pub fn show<S: DurableSlot, P: PresentationEffect>(store: &SettingsStore<S, P>) -> Result<String> {
    Ok(serde_json::to_string_pretty(store.settings())?)
}

pub fn get<S: DurableSlot, P: PresentationEffect>(
    store: &SettingsStore<S, P>,
    key: &str,
) -> Result<Value> {
    let key = SettingKey::from_str(key)?;
    Ok(store.settings().get(key).value_json())
}

/// Update one setting and save it.
pub fn set<S: DurableSlot, P: PresentationEffect>(
    store: &mut SettingsStore<S, P>,
    key: &str,
    raw_value: &str,
) -> Result<SettingChange> {
    let key = SettingKey::from_str(key)?;
    let change = SettingChange::parse(key, raw_value)?;
    if let Some(message) = unrecognized_value(&change) {
        warn!("{message}");
    }
    store.update_field(change.clone());
    commit(store)?;
    Ok(change)
}

/// Reset one setting, or all of them when `key` is `None`, and save.
/// Returns the keys whose value actually changed.
pub fn reset<S: DurableSlot, P: PresentationEffect>(
    store: &mut SettingsStore<S, P>,
    key: Option<&str>,
) -> Result<Vec<SettingKey>> {
    match key {
        Some(key) => store.reset_field(SettingKey::from_str(key)?),
        None => {
            for key in SettingKey::ALL {
                store.reset_field(*key);
            }
        }
    }
    let changed = store.dirty_fields();
    commit(store)?;
    Ok(changed)
}

pub fn keys() -> Vec<KeyInfo> {
    let defaults = SettingsRecord::default();
    SettingKey::ALL
        .iter()
        .map(|key| KeyInfo {
            key: key.as_str(),
            default: defaults.get(*key).value_json(),
        })
        .collect()
}

pub fn preview<S: DurableSlot>(store: &SettingsStore<S, DocumentPresentation>) -> PreviewReport {
    let doc = store.effect();
    PreviewReport {
        theme: doc.theme().map(str::to_string),
        root_font_size: doc.root_font_size().map(str::to_string),
        body_classes: doc.body_classes().map(str::to_string).collect(),
    }
}

/// Describes a value the web client has no entry for. Such values are still
/// stored; only their type is checked.
pub fn unrecognized_value(change: &SettingChange) -> Option<String> {
    match change {
        SettingChange::Language(code) if !is_supported_language(code) => {
            Some(format!("Language {code:?} is not offered by the settings page"))
        }
        SettingChange::ColorPalette(name) if !is_known_palette(name) => {
            Some(format!("Palette {name:?} is not in the palette catalog"))
        }
        _ => None,
    }
}

// Unreadable stored data is overwritten even when nothing changed, since
// the store is already running on defaults.
fn commit<S: DurableSlot, P: PresentationEffect>(store: &mut SettingsStore<S, P>) -> Result<()> {
    if !store.is_dirty() && !store.repository().holds_unreadable() {
        return Ok(());
    }
    if store.save() {
        Ok(())
    } else {
        Err(SettingsError::Custom(format!(
            "Failed to save settings to {}",
            store.repository().slot().describe()
        )))
    }
}
