use chrono::Local;
use derive_getters::Getters;
use derive_new::new;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::{
    api::utils::lenient_decimal,
    models::{BankGoldBar, BrandPrice, GoldRecyclePrice, MetalBoard},
};

#[derive(Debug, Deserialize, Getters, new)]
pub struct GoldPriceResponseDto {
    code: i64,
    #[serde(default)]
    msg: Option<String>,
    data: Option<GoldPriceDataDto>,
}

#[derive(Debug, Deserialize, Getters, new)]
pub struct GoldPriceDataDto {
    #[serde(default)]
    bank_gold_bar_price: Vec<BankGoldBarDto>,
    #[serde(default)]
    gold_recycle_price: Vec<GoldRecycleDto>,
    #[serde(default)]
    precious_metal_price: Vec<BrandPriceDto>,
}

#[derive(Debug, Deserialize, Getters, new)]
pub struct BankGoldBarDto {
    bank: String,
    #[serde(default, deserialize_with = "lenient_decimal")]
    price: Option<Decimal>,
}

#[derive(Debug, Deserialize, Getters, new)]
pub struct GoldRecycleDto {
    gold_type: String,
    #[serde(default, deserialize_with = "lenient_decimal")]
    recycle_price: Option<Decimal>,
    #[serde(default)]
    updated_date: String,
}

#[derive(Debug, Deserialize, Getters, new)]
pub struct BrandPriceDto {
    brand: String,
    #[serde(default, deserialize_with = "lenient_decimal")]
    bullion_price: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient_decimal")]
    gold_price: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient_decimal")]
    platinum_price: Option<Decimal>,
    #[serde(default)]
    updated_date: String,
}

impl GoldPriceDataDto {
    pub fn to_board(&self) -> MetalBoard {
        MetalBoard::new(
            self.bank_gold_bar_price
                .iter()
                .map(|b| BankGoldBar::new(b.bank.clone(), b.price))
                .collect(),
            self.gold_recycle_price
                .iter()
                .map(|r| {
                    GoldRecyclePrice::new(
                        r.gold_type.clone(),
                        r.recycle_price,
                        r.updated_date.clone(),
                    )
                })
                .collect(),
            self.precious_metal_price
                .iter()
                .map(|p| {
                    BrandPrice::new(
                        p.brand.clone(),
                        p.bullion_price,
                        p.gold_price,
                        p.platinum_price,
                        p.updated_date.clone(),
                    )
                })
                .collect(),
            Local::now(),
        )
    }
}
