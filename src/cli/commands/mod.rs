pub mod admin;
pub mod config;
pub mod database;
pub mod server;
