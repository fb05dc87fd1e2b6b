use std::collections::BTreeSet;

use crate::settings::record::SettingsRecord;

/// Root font size, in percent, that the default text size maps to.
pub const REFERENCE_FONT_PERCENT: f64 = 62.5;

/// Text size slider value that maps to [`REFERENCE_FONT_PERCENT`].
/// Equal to the default record's `text_size`.
pub const REFERENCE_TEXT_SIZE: u8 = 50;

/// Body class that switches to the dyslexia-friendly font.
pub const DYSLEXIC_FONT_CLASS: &str = "font-dyslexic";

/// Global presentation state driven by the working settings.
///
/// One method per visual concern. Implementations must be idempotent:
/// applying the same values twice leaves the same state as applying them once.
pub trait PresentationEffect {
    fn apply_palette(&mut self, palette: &str);

    /// `base_percent` is the root font size as a percentage of the browser default.
    fn apply_text_scale(&mut self, base_percent: f64);

    fn apply_font(&mut self, dyslexic: bool);
}

/// Root font size for a text size slider value.
pub fn base_font_percent(text_size: u8) -> f64 {
    REFERENCE_FONT_PERCENT * (f64::from(text_size) / f64::from(REFERENCE_TEXT_SIZE))
}

/// Project `record` onto `effect`.
pub fn apply_preview<P: PresentationEffect + ?Sized>(record: &SettingsRecord, effect: &mut P) {
    effect.apply_palette(&record.color_palette);
    effect.apply_text_scale(base_font_percent(record.text_size));
    effect.apply_font(record.is_dyslexia_font);
}

/// Document-level presentation state: the theme attribute, the root inline
/// font size and the body class list.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DocumentPresentation {
    theme: Option<String>,
    root_font_size: Option<String>,
    body_classes: BTreeSet<String>,
}

impl DocumentPresentation {
    /// Current value of the `data-theme` attribute.
    pub fn theme(&self) -> Option<&str> {
        self.theme.as_deref()
    }

    /// Current inline `font-size` of the root element, e.g. `"62.5%"`.
    pub fn root_font_size(&self) -> Option<&str> {
        self.root_font_size.as_deref()
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.body_classes.contains(class)
    }

    pub fn body_classes(&self) -> impl Iterator<Item = &str> {
        self.body_classes.iter().map(String::as_str)
    }
}

impl PresentationEffect for DocumentPresentation {
    fn apply_palette(&mut self, palette: &str) {
        self.theme = Some(palette.to_string());
    }

    fn apply_text_scale(&mut self, base_percent: f64) {
        self.root_font_size = Some(format!("{base_percent}%"));
    }

    fn apply_font(&mut self, dyslexic: bool) {
        if dyslexic {
            self.body_classes.insert(DYSLEXIC_FONT_CLASS.to_string());
        } else {
            self.body_classes.remove(DYSLEXIC_FONT_CLASS);
        }
    }
}
