use clap::ValueEnum;
use strum_macros::{Display, EnumIter};

#[derive(Clone, Copy, Debug, Default, Display, EnumIter, PartialEq, ValueEnum)]
pub enum SortField {
    #[default]
    #[strum(to_string = "Change %")]
    ChangeRate,
    #[strum(to_string = "Estimate")]
    EstimatedValue,
    #[strum(to_string = "Net Value")]
    NetValue,
    Name,
    Code,
}

#[derive(Clone, Copy, Debug, Default, Display, PartialEq)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn flipped(&self) -> Self {
        match self {
            SortOrder::Asc => SortOrder::Desc,
            SortOrder::Desc => SortOrder::Asc,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FundSort {
    pub field: SortField,
    pub order: SortOrder,
}

impl FundSort {
    pub fn new(field: SortField, order: SortOrder) -> Self {
        Self { field, order }
    }

    /// Same field flips the order; a new field starts descending.
    pub fn toggle(&mut self, field: SortField) {
        if self.field == field {
            self.order = self.order.flipped();
        } else {
            self.field = field;
            self.order = SortOrder::Desc;
        }
    }
}
