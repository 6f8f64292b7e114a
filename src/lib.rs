pub mod app_context;
pub mod common;
pub mod config;
pub mod errors;
pub mod model;

pub mod database;
#[cfg(feature = "server")]
pub mod server;
pub mod services;
