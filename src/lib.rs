pub mod api;
pub mod bootstrap;
pub mod clients;
pub mod config;
pub mod errors;
pub mod models;
pub mod service;
pub mod utils;
