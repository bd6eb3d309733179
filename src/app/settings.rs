use anyhow::Result;

use crate::{
    db::{Store, utils::SETTINGS},
    models::{ColorScheme, Settings},
};

pub async fn load_settings(store: &Store) -> Settings {
    store
        .read_or(SETTINGS, Settings::default())
        .await
        .normalized()
}

pub fn save_settings(store: &Store, settings: &Settings) -> Result<()> {
    store.save_debounced(SETTINGS, settings)
}

/// Applies optional changes; per-row values are clamped to their bounds.
pub fn apply_settings(
    settings: &mut Settings,
    color_scheme: Option<ColorScheme>,
    metal_per_row: Option<u8>,
    market_per_row: Option<u8>,
) {
    if let Some(scheme) = color_scheme {
        settings.set_color_scheme(scheme);
    }
    if let Some(n) = metal_per_row {
        settings.set_metal_items_per_row(n);
    }
    if let Some(n) = market_per_row {
        settings.set_market_items_per_row(n);
    }
}
