use rand::seq::SliceRandom;
use rand::Rng;

/// Reserved palette name; the stylesheet's fallback theme.
pub const DEFAULT_PALETTE: &str = "default";

/// Palette identifiers offered by the palette picker.
///
/// Only `default` and `crimson` are known to exist in the web client's
/// stylesheet; the rest are assumed to have matching `data-theme` blocks.
pub const PALETTES: &[&str] = &[
    DEFAULT_PALETTE,
    "crimson",
    "ocean",
    "forest",
    "sunset",
    "lavender",
    "amber",
    "teal",
    "rose",
    "slate",
];

pub fn is_known_palette(name: &str) -> bool {
    PALETTES.contains(&name)
}

/// Pick a palette at random, never the reserved default.
pub fn random_palette<R: Rng + ?Sized>(rng: &mut R) -> &'static str {
    let choices: Vec<&'static str> = PALETTES
        .iter()
        .copied()
        .filter(|name| *name != DEFAULT_PALETTE)
        .collect();
    choices.choose(rng).copied().unwrap_or(DEFAULT_PALETTE)
}
