pub mod app;
pub mod calc;
pub mod commands;
pub mod markets;
pub mod portfolio;
pub mod schedule;
pub mod settings;
pub mod tracker;
pub mod ui;
pub mod utils;

pub use app::App;
pub use markets::Markets;
pub use portfolio::Portfolio;
pub use tracker::FundTracker;
