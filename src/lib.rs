pub mod api;
pub mod app;
pub mod config;
pub mod db;
pub mod errors;
pub mod logging;
pub mod models;
pub mod services;

#[cfg(test)]
mod test;
