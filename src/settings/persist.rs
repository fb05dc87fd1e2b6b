use std::cell::RefCell;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::rc::Rc;

use log::{debug, warn};
use serde_json::{Map, Value};

use crate::error::{Result, SettingsError};
use crate::settings::record::{SettingKey, SettingsRecord};

/// Key the settings are stored under. Also the file stem of the on-disk slot.
pub const SETTINGS_KEY: &str = "sketchQuestSettings";

/// Version written into every stored record.
pub const SCHEMA_VERSION: u64 = 1;

const VERSION_FIELD: &str = "version";

/// Fields added in version 1. Records written before versioning lack them.
const V1_FIELDS: [SettingKey; 4] = [
    SettingKey::ScreenReaderNote,
    SettingKey::SidebarPosition,
    SettingKey::ViewMode,
    SettingKey::TestMode,
];

/// A single durable key-value slot holding the serialized settings.
pub trait DurableSlot {
    /// `Ok(None)` when nothing has been stored yet.
    fn read(&self) -> Result<Option<String>>;

    fn write(&mut self, contents: &str) -> Result<()>;

    /// Human-readable location, for diagnostics.
    fn describe(&self) -> String;
}

/// A JSON file on disk.
#[derive(Clone, Debug)]
pub struct FileSlot {
    path: PathBuf,
}

impl FileSlot {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl DurableSlot for FileSlot {
    fn read(&self) -> Result<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&mut self, contents: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, contents)?;
        Ok(())
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

#[derive(Debug, Default)]
struct MemoryCell {
    contents: Option<String>,
    fail_reads: bool,
    fail_writes: bool,
}

/// In-process slot. Clones share one storage cell, so a clone handed to a
/// second store sees what the first one saved.
#[derive(Clone, Debug, Default)]
pub struct MemorySlot {
    cell: Rc<RefCell<MemoryCell>>,
}

impl MemorySlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_contents(contents: impl Into<String>) -> Self {
        let slot = Self::new();
        slot.set_contents(Some(contents.into()));
        slot
    }

    pub fn contents(&self) -> Option<String> {
        self.cell.borrow().contents.clone()
    }

    pub fn set_contents(&self, contents: Option<String>) {
        self.cell.borrow_mut().contents = contents;
    }

    /// Make reads fail as if storage were disabled.
    pub fn fail_reads(&self, fail: bool) {
        self.cell.borrow_mut().fail_reads = fail;
    }

    /// Make writes fail as if the storage quota were exhausted.
    pub fn fail_writes(&self, fail: bool) {
        self.cell.borrow_mut().fail_writes = fail;
    }
}

impl DurableSlot for MemorySlot {
    fn read(&self) -> Result<Option<String>> {
        let cell = self.cell.borrow();
        if cell.fail_reads {
            let err = std::io::Error::new(ErrorKind::PermissionDenied, "storage disabled");
            return Err(err.into());
        }
        Ok(cell.contents.clone())
    }

    fn write(&mut self, contents: &str) -> Result<()> {
        let mut cell = self.cell.borrow_mut();
        if cell.fail_writes {
            return Err(std::io::Error::other("storage quota exceeded").into());
        }
        cell.contents = Some(contents.to_string());
        Ok(())
    }

    fn describe(&self) -> String {
        format!("memory:{SETTINGS_KEY}")
    }
}

/// Serialize a record with its schema version.
pub fn encode(record: &SettingsRecord) -> Result<String> {
    let mut value = serde_json::to_value(record)?;
    if let Value::Object(map) = &mut value {
        map.insert(VERSION_FIELD.to_string(), Value::from(SCHEMA_VERSION));
    }
    Ok(serde_json::to_string_pretty(&value)?)
}

/// Parse a stored record, migrating older versions forward.
///
/// Every field must be present after migration; a record missing fields is
/// an error rather than something to patch with defaults.
pub fn decode(raw: &str) -> Result<SettingsRecord> {
    let mut value: Value = serde_json::from_str(raw)?;
    let map = value
        .as_object_mut()
        .ok_or_else(|| SettingsError::Custom("stored settings are not a JSON object".into()))?;

    // Unversioned records predate the version field.
    let version = match map.remove(VERSION_FIELD) {
        None => 0,
        Some(v) => v
            .as_u64()
            .ok_or_else(|| SettingsError::Custom(format!("invalid settings version: {v}")))?,
    };
    if version > SCHEMA_VERSION {
        return Err(SettingsError::UnsupportedVersion {
            found: version,
            supported: SCHEMA_VERSION,
        });
    }
    if version == 0 {
        migrate_v0(map);
    }

    Ok(serde_json::from_value(value)?)
}

fn migrate_v0(map: &mut Map<String, Value>) {
    let defaults = SettingsRecord::default();
    for key in V1_FIELDS {
        map.entry(key.as_str())
            .or_insert_with(|| defaults.get(key).value_json());
    }
}

/// Typed access to the durable slot. Failures never escape: reads come
/// back as `None`, writes as `false`, and both are logged.
#[derive(Debug)]
pub struct SettingsRepository<S> {
    slot: S,
}

impl<S: DurableSlot> SettingsRepository<S> {
    pub fn new(slot: S) -> Self {
        Self { slot }
    }

    pub fn slot(&self) -> &S {
        &self.slot
    }

    pub fn read_durable(&self) -> Option<SettingsRecord> {
        let at = self.slot.describe();
        let raw = match self.slot.read() {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!("No stored settings at {at}");
                return None;
            }
            Err(e) => {
                warn!("Failed to read settings from {at}: {e}");
                return None;
            }
        };

        match decode(&raw) {
            Ok(record) => {
                debug!("Loaded settings from {at}");
                Some(record)
            }
            Err(e) => {
                warn!("Ignoring stored settings at {at}: {e}");
                None
            }
        }
    }

    /// Whether the slot holds data that [`read_durable`](Self::read_durable)
    /// discards, so that defaults are in use until the next write.
    pub fn holds_unreadable(&self) -> bool {
        matches!(self.slot.read(), Ok(Some(raw)) if decode(&raw).is_err())
    }

    pub fn write_durable(&mut self, record: &SettingsRecord) -> bool {
        let at = self.slot.describe();
        match encode(record).and_then(|json| self.slot.write(&json)) {
            Ok(()) => {
                debug!("Saved settings to {at}");
                true
            }
            Err(e) => {
                warn!("Failed to save settings to {at}: {e}");
                false
            }
        }
    }
}
