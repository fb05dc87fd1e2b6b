use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Result, SettingsError};

/// Viewport widths below this many pixels count as mobile in `Auto` view mode.
pub const MOBILE_BREAKPOINT: u32 = 768;

/// Locale codes offered by the settings page, with their display names.
pub const SUPPORTED_LANGUAGES: &[(&str, &str)] = &[
    ("en", "English"),
    ("es", "Español (Spanish)"),
    ("fr", "Français (French)"),
    ("de", "Deutsch (German)"),
    ("hi", "हिन्दी (Hindi)"),
    ("ur", "اردو (Urdu)"),
];

/// Whether `code` is one of [`SUPPORTED_LANGUAGES`].
pub fn is_supported_language(code: &str) -> bool {
    SUPPORTED_LANGUAGES.iter().any(|(supported, _)| *supported == code)
}

/// Where the dashboard sidebar docks.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SidebarPosition {
    #[default]
    Left,
    Right,
    Top,
}

/// Layout the dashboard renders with.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    Desktop,
    Mobile,
    /// Follow the viewport width.
    #[default]
    Auto,
}

impl ViewMode {
    /// Whether the mobile layout should be used for a viewport `viewport_width` pixels wide.
    pub fn is_mobile(self, viewport_width: u32) -> bool {
        match self {
            ViewMode::Mobile => true,
            ViewMode::Desktop => false,
            ViewMode::Auto => viewport_width < MOBILE_BREAKPOINT,
        }
    }
}

/// One flat snapshot of every user setting.
///
/// Field names serialize in camelCase, the shape the web client has always
/// written to its durable slot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsRecord {
    // Language
    pub language: String,

    // Accessibility
    /// Text size slider position, 0..=100. The default maps to the reference font size.
    pub text_size: u8,
    pub is_dyslexia_font: bool,
    pub is_screen_reader_note: bool,

    // Audio
    pub is_music_on: bool,
    pub sfx_volume: u8,
    pub is_voice_narration: bool,

    // Gamification
    pub is_gamification: bool,
    pub is_achievement_notifications: bool,

    // Notifications
    pub is_daily_reminders: bool,
    pub is_event_announcements: bool,
    pub is_quiet_hours: bool,

    // Parental controls
    pub is_playtime_limited: bool,
    pub playtime_limit_hours: u8,
    pub playtime_limit_minutes: u8,
    pub is_social_restricted: bool,

    // Appearance
    pub color_palette: String,
    pub sidebar_position: SidebarPosition,
    pub view_mode: ViewMode,

    // Developer
    pub is_test_mode: bool,
}

impl Default for SettingsRecord {
    fn default() -> Self {
        Self {
            language: "en".to_string(),
            text_size: 50,
            is_dyslexia_font: false,
            is_screen_reader_note: false,
            is_music_on: true,
            sfx_volume: 80,
            is_voice_narration: false,
            is_gamification: true,
            is_achievement_notifications: true,
            is_daily_reminders: true,
            is_event_announcements: false,
            is_quiet_hours: false,
            is_playtime_limited: false,
            playtime_limit_hours: 1,
            playtime_limit_minutes: 0,
            is_social_restricted: false,
            color_palette: "crimson".to_string(),
            sidebar_position: SidebarPosition::Left,
            view_mode: ViewMode::Auto,
            is_test_mode: false,
        }
    }
}

impl SettingsRecord {
    /// Daily playtime allowance, or `None` when playtime is not limited.
    pub fn playtime_limit(&self) -> Option<Duration> {
        self.is_playtime_limited.then(|| {
            Duration::from_secs(
                u64::from(self.playtime_limit_hours) * 3600
                    + u64::from(self.playtime_limit_minutes) * 60,
            )
        })
    }

    /// Keys of every field whose value differs between `self` and `other`.
    pub fn diff(&self, other: &SettingsRecord) -> Vec<SettingKey> {
        SettingKey::ALL
            .iter()
            .copied()
            .filter(|key| self.get(*key) != other.get(*key))
            .collect()
    }
}

// Generates `SettingKey`, `SettingChange` and the per-field accessors from one table,
// so a new field cannot be added to one and forgotten in another.
macro_rules! setting_fields {
    ($($variant:ident($ty:ty) => $field:ident, $json:literal;)+) => {
        /// Names one field of [`SettingsRecord`].
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        pub enum SettingKey {
            $($variant,)+
        }

        impl SettingKey {
            pub const ALL: &'static [SettingKey] = &[$(SettingKey::$variant,)+];

            /// The JSON key the field is stored under.
            pub fn as_str(self) -> &'static str {
                match self {
                    $(SettingKey::$variant => $json,)+
                }
            }
        }

        impl FromStr for SettingKey {
            type Err = SettingsError;

            fn from_str(s: &str) -> Result<Self> {
                match s {
                    $($json => Ok(SettingKey::$variant),)+
                    _ => Err(SettingsError::UnknownSetting(s.to_string())),
                }
            }
        }

        /// A new value for exactly one field, typed as that field.
        #[derive(Clone, Debug, PartialEq)]
        pub enum SettingChange {
            $($variant($ty),)+
        }

        impl SettingChange {
            pub fn key(&self) -> SettingKey {
                match self {
                    $(SettingChange::$variant(_) => SettingKey::$variant,)+
                }
            }

            pub fn value_json(&self) -> Value {
                let value = match self {
                    $(SettingChange::$variant(v) => serde_json::to_value(v),)+
                };
                value.unwrap_or(Value::Null)
            }

            /// Parse user-supplied text into a change for `key`.
            ///
            /// `raw` is read as JSON when it is valid JSON of the right type
            /// (`true`, `80`, `"left"`), and as a bare string otherwise (`fr`, `left`).
            pub fn parse(key: SettingKey, raw: &str) -> Result<Self> {
                let value = serde_json::from_str::<Value>(raw)
                    .unwrap_or_else(|_| Value::String(raw.to_string()));
                let invalid = |e: serde_json::Error| SettingsError::InvalidValue {
                    key: key.as_str().to_string(),
                    reason: e.to_string(),
                };
                match key {
                    $(SettingKey::$variant => serde_json::from_value::<$ty>(value)
                        .or_else(|_| serde_json::from_value::<$ty>(Value::String(raw.to_string())))
                        .map(SettingChange::$variant)
                        .map_err(invalid),)+
                }
            }
        }

        impl SettingsRecord {
            /// A copy of this record with the one field named by `change` replaced.
            pub fn with(&self, change: SettingChange) -> Self {
                let mut next = self.clone();
                match change {
                    $(SettingChange::$variant(v) => next.$field = v,)+
                }
                next
            }

            pub fn get(&self, key: SettingKey) -> SettingChange {
                match key {
                    $(SettingKey::$variant => SettingChange::$variant(self.$field.clone()),)+
                }
            }
        }
    };
}

setting_fields! {
    Language(String) => language, "language";
    TextSize(u8) => text_size, "textSize";
    DyslexiaFont(bool) => is_dyslexia_font, "isDyslexiaFont";
    ScreenReaderNote(bool) => is_screen_reader_note, "isScreenReaderNote";
    MusicOn(bool) => is_music_on, "isMusicOn";
    SfxVolume(u8) => sfx_volume, "sfxVolume";
    VoiceNarration(bool) => is_voice_narration, "isVoiceNarration";
    Gamification(bool) => is_gamification, "isGamification";
    AchievementNotifications(bool) => is_achievement_notifications, "isAchievementNotifications";
    DailyReminders(bool) => is_daily_reminders, "isDailyReminders";
    EventAnnouncements(bool) => is_event_announcements, "isEventAnnouncements";
    QuietHours(bool) => is_quiet_hours, "isQuietHours";
    PlaytimeLimited(bool) => is_playtime_limited, "isPlaytimeLimited";
    PlaytimeLimitHours(u8) => playtime_limit_hours, "playtimeLimitHours";
    PlaytimeLimitMinutes(u8) => playtime_limit_minutes, "playtimeLimitMinutes";
    SocialRestricted(bool) => is_social_restricted, "isSocialRestricted";
    ColorPalette(String) => color_palette, "colorPalette";
    SidebarPosition(SidebarPosition) => sidebar_position, "sidebarPosition";
    ViewMode(ViewMode) => view_mode, "viewMode";
    TestMode(bool) => is_test_mode, "isTestMode";
}

impl fmt::Display for SettingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
