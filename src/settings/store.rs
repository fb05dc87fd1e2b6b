use log::{debug, info};
use rand::Rng;

use crate::settings::palette::random_palette;
use crate::settings::persist::{DurableSlot, SettingsRepository};
use crate::settings::preview::{apply_preview, PresentationEffect};
use crate::settings::record::{SettingChange, SettingKey, SettingsRecord};

/// Owns the saved and working copies of the settings.
///
/// The working copy is what the UI renders and what the preview reflects.
/// The saved copy is the last value that reached durable storage and is
/// only used for dirty checks and revert. Every mutation goes through this
/// type, and every change to the working copy is pushed to the effect sink
/// before the call returns.
#[derive(Debug)]
pub struct SettingsStore<S, P> {
    repository: SettingsRepository<S>,
    effect: P,
    saved: SettingsRecord,
    working: SettingsRecord,
}

impl<S: DurableSlot, P: PresentationEffect> SettingsStore<S, P> {
    /// A store seeded with defaults, before durable storage has been read.
    pub fn new(repository: SettingsRepository<S>, effect: P) -> Self {
        let mut store = Self {
            repository,
            effect,
            saved: SettingsRecord::default(),
            working: SettingsRecord::default(),
        };
        store.preview();
        store
    }

    /// Create the store and load whatever durable storage holds.
    pub fn mount(repository: SettingsRepository<S>, effect: P) -> Self {
        let mut store = Self::new(repository, effect);
        store.load();
        store
    }

    /// Replace both copies with the stored record, or with defaults when
    /// nothing usable is stored.
    pub fn load(&mut self) {
        let record = self.repository.read_durable().unwrap_or_else(|| {
            debug!("Using default settings");
            SettingsRecord::default()
        });
        self.saved = record.clone();
        self.working = record;
        self.preview();
    }

    /// The working copy.
    pub fn settings(&self) -> &SettingsRecord {
        &self.working
    }

    pub fn saved(&self) -> &SettingsRecord {
        &self.saved
    }

    pub fn effect(&self) -> &P {
        &self.effect
    }

    pub fn repository(&self) -> &SettingsRepository<S> {
        &self.repository
    }

    /// Change one field of the working copy. Nothing is persisted.
    pub fn update_field(&mut self, change: SettingChange) {
        debug!("Setting {} = {}", change.key(), change.value_json());
        self.working = self.working.with(change);
        self.preview();
    }

    /// Put one field of the working copy back to its default value.
    pub fn reset_field(&mut self, key: SettingKey) {
        self.update_field(SettingsRecord::default().get(key));
    }

    /// Switch the working copy to a random palette and return its name.
    pub fn randomize_palette<R: Rng + ?Sized>(&mut self, rng: &mut R) -> &str {
        let palette = random_palette(rng);
        self.update_field(SettingChange::ColorPalette(palette.to_string()));
        &self.working.color_palette
    }

    pub fn is_dirty(&self) -> bool {
        self.working != self.saved
    }

    /// Fields whose working value differs from the saved one.
    pub fn dirty_fields(&self) -> Vec<SettingKey> {
        self.saved.diff(&self.working)
    }

    /// Persist the working copy. On failure both copies are left as they
    /// were, so the store stays dirty.
    pub fn save(&mut self) -> bool {
        if !self.repository.write_durable(&self.working) {
            return false;
        }
        self.saved = self.working.clone();
        info!("Settings saved");
        true
    }

    /// Discard unsaved edits and re-apply the saved values to the preview.
    pub fn revert(&mut self) {
        if self.is_dirty() {
            info!("Reverting {} unsaved setting(s)", self.dirty_fields().len());
        }
        self.working = self.saved.clone();
        self.preview();
    }

    fn preview(&mut self) {
        apply_preview(&self.working, &mut self.effect);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::palette::DEFAULT_PALETTE;
    use crate::settings::persist::{encode, MemorySlot};
    use crate::settings::preview::{DocumentPresentation, DYSLEXIC_FONT_CLASS};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    /// Records every call so tests can check ordering and counts.
    #[derive(Debug, Default)]
    struct CallLog {
        calls: Vec<String>,
    }

    impl PresentationEffect for CallLog {
        fn apply_palette(&mut self, palette: &str) {
            self.calls.push(format!("palette:{palette}"));
        }

        fn apply_text_scale(&mut self, base_percent: f64) {
            self.calls.push(format!("scale:{base_percent}"));
        }

        fn apply_font(&mut self, dyslexic: bool) {
            self.calls.push(format!("font:{dyslexic}"));
        }
    }

    fn mounted(slot: &MemorySlot) -> SettingsStore<MemorySlot, DocumentPresentation> {
        SettingsStore::mount(
            SettingsRepository::new(slot.clone()),
            DocumentPresentation::default(),
        )
    }

    #[test]
    fn test_mount_with_empty_slot_uses_defaults() {
        let store = mounted(&MemorySlot::new());
        assert_eq!(store.settings(), &SettingsRecord::default());
        assert_eq!(store.saved(), &SettingsRecord::default());
        assert!(!store.is_dirty());
        assert_eq!(store.effect().root_font_size(), Some("62.5%"));
    }

    #[test]
    fn test_mount_with_corrupt_slot_uses_defaults() {
        let store = mounted(&MemorySlot::with_contents("{\"language\": \"fr\""));
        assert_eq!(store.settings(), &SettingsRecord::default());
        assert_eq!(store.saved(), &SettingsRecord::default());
    }

    #[test]
    fn test_mount_loads_stored_record() {
        let teal = SettingChange::ColorPalette("teal".into());
        let stored = SettingsRecord::default().with(teal);
        let slot = MemorySlot::with_contents(encode(&stored).unwrap());
        let store = mounted(&slot);
        assert_eq!(store.settings(), &stored);
        assert_eq!(store.saved(), &stored);
        assert_eq!(store.effect().theme(), Some("teal"));
    }

    #[test]
    fn test_update_field_touches_working_copy_only() {
        let slot = MemorySlot::new();
        let mut store = mounted(&slot);
        store.update_field(SettingChange::Language("fr".into()));

        assert_eq!(store.settings().language, "fr");
        assert_eq!(store.saved(), &SettingsRecord::default());
        assert_eq!(store.dirty_fields(), vec![SettingKey::Language]);
        assert!(store.is_dirty());
        assert_eq!(slot.contents(), None);
    }

    #[test]
    fn test_dirty_tracks_value_equality() {
        let mut store = mounted(&MemorySlot::new());
        store.update_field(SettingChange::SfxVolume(20));
        assert!(store.is_dirty());
        store.update_field(SettingChange::SfxVolume(80));
        assert!(!store.is_dirty());
    }

    #[test]
    fn test_every_change_is_previewed_in_order() {
        let repository = SettingsRepository::new(MemorySlot::new());
        let mut store = SettingsStore::new(repository, CallLog::default());
        store.update_field(SettingChange::TextSize(100));
        store.update_field(SettingChange::DyslexiaFont(true));
        store.revert();

        assert_eq!(
            store.effect().calls,
            vec![
                "palette:crimson",
                "scale:62.5",
                "font:false",
                "palette:crimson",
                "scale:125",
                "font:false",
                "palette:crimson",
                "scale:125",
                "font:true",
                "palette:crimson",
                "scale:62.5",
                "font:false",
            ]
        );
    }

    #[test]
    fn test_save_commits_working_copy() {
        let slot = MemorySlot::new();
        let mut store = mounted(&slot);
        store.update_field(SettingChange::QuietHours(true));
        assert!(store.save());
        assert!(!store.is_dirty());
        assert!(store.saved().is_quiet_hours);
        assert!(slot.contents().is_some());
    }

    #[test]
    fn test_failed_save_keeps_store_dirty() {
        let slot = MemorySlot::new();
        let mut store = mounted(&slot);
        store.update_field(SettingChange::MusicOn(false));
        slot.fail_writes(true);

        assert!(!store.save());
        assert!(store.is_dirty());
        assert_eq!(store.saved(), &SettingsRecord::default());
        assert!(!store.settings().is_music_on);

        slot.fail_writes(false);
        assert!(store.save());
        assert!(!store.is_dirty());
    }

    #[test]
    fn test_revert_restores_saved_copy_and_preview() {
        let mut store = mounted(&MemorySlot::new());
        store.update_field(SettingChange::DyslexiaFont(true));
        store.update_field(SettingChange::ColorPalette("rose".into()));
        assert!(store.effect().has_class(DYSLEXIC_FONT_CLASS));

        store.revert();
        assert!(!store.is_dirty());
        assert_eq!(store.settings(), &SettingsRecord::default());
        assert!(!store.effect().has_class(DYSLEXIC_FONT_CLASS));
        assert_eq!(store.effect().theme(), Some("crimson"));

        let after_once = store.settings().clone();
        store.revert();
        assert_eq!(store.settings(), &after_once);
    }

    #[test]
    fn test_reset_field() {
        let mut store = mounted(&MemorySlot::new());
        store.update_field(SettingChange::TextSize(90));
        store.update_field(SettingChange::Gamification(false));
        store.reset_field(SettingKey::TextSize);
        assert_eq!(store.settings().text_size, 50);
        assert_eq!(store.dirty_fields(), vec![SettingKey::Gamification]);
    }

    #[test]
    fn test_randomize_palette() {
        let mut store = mounted(&MemorySlot::new());
        let mut rng = StdRng::seed_from_u64(42);
        let picked = store.randomize_palette(&mut rng).to_string();
        assert_ne!(picked, DEFAULT_PALETTE);
        assert_eq!(store.settings().color_palette, picked);
        assert_eq!(store.effect().theme(), Some(picked.as_str()));
    }

    #[test]
    fn test_reload_after_save_round_trips() {
        let slot = MemorySlot::new();
        let mut store = mounted(&slot);
        store.update_field(SettingChange::Language("ur".into()));
        store.update_field(SettingChange::PlaytimeLimited(true));
        store.update_field(SettingChange::PlaytimeLimitMinutes(45));
        assert!(store.save());
        let saved = store.saved().clone();

        let next_session = mounted(&slot);
        assert_eq!(next_session.saved(), &saved);
        assert_eq!(next_session.settings(), &saved);
    }
}
