pub mod app;
pub mod catalog;
pub mod config;
pub mod engine;
pub mod event;
pub mod session;
pub mod store;
pub mod ui;
