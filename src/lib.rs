pub mod cleanup;
pub mod config;
pub mod constants;
pub mod database;
pub mod error;
pub mod handlers;
pub mod models;
pub mod services;
