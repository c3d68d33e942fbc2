pub mod components;
pub mod config;
pub mod models;
pub mod utils;
