mod api;
mod app;
mod markets;
mod portfolio;
mod support;
mod tracker;
