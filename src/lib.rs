pub mod cache;
pub mod commands;
pub mod config;
pub mod data_provider;
pub mod dev;
pub mod error;
pub mod fixtures;
pub mod formatting;
pub mod layout_constants;
pub mod preferences;
pub mod screen;
pub mod scroll;
pub mod timeline;
pub mod types;
