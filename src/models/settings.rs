use clap::ValueEnum;
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use strum_macros::Display;

pub const MIN_ITEMS_PER_ROW: u8 = 1;
pub const MAX_ITEMS_PER_ROW: u8 = 4;

/// Whether gains are drawn in red (mainland convention) or green.
#[derive(Clone, Copy, Debug, Default, Deserialize, Display, PartialEq, Serialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ColorScheme {
    #[default]
    #[strum(to_string = "red-up")]
    RedUp,
    #[strum(to_string = "red-down")]
    RedDown,
}

impl ColorScheme {
    pub fn toggled(&self) -> Self {
        match self {
            ColorScheme::RedUp => ColorScheme::RedDown,
            ColorScheme::RedDown => ColorScheme::RedUp,
        }
    }
}

#[derive(Clone, Debug, Deserialize, Getters, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    metal_items_per_row: u8,
    market_items_per_row: u8,
    color_scheme: ColorScheme,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            metal_items_per_row: 2,
            market_items_per_row: 2,
            color_scheme: ColorScheme::RedUp,
        }
    }
}

impl Settings {
    pub fn new(metal_items_per_row: u8, market_items_per_row: u8, color_scheme: ColorScheme) -> Self {
        Self {
            metal_items_per_row: clamp_items_per_row(metal_items_per_row),
            market_items_per_row: clamp_items_per_row(market_items_per_row),
            color_scheme,
        }
    }

    pub fn set_metal_items_per_row(&mut self, n: u8) {
        self.metal_items_per_row = clamp_items_per_row(n);
    }

    pub fn set_market_items_per_row(&mut self, n: u8) {
        self.market_items_per_row = clamp_items_per_row(n);
    }

    pub fn set_color_scheme(&mut self, scheme: ColorScheme) {
        self.color_scheme = scheme;
    }

    /// Re-applies bounds after loading a document written by hand.
    pub fn normalized(self) -> Self {
        Self::new(
            self.metal_items_per_row,
            self.market_items_per_row,
            self.color_scheme,
        )
    }
}

pub fn clamp_items_per_row(n: u8) -> u8 {
    n.clamp(MIN_ITEMS_PER_ROW, MAX_ITEMS_PER_ROW)
}
