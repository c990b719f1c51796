pub mod commands;
pub mod config;
pub mod dto;
pub mod errors;
pub mod services;
pub mod state;
pub mod store;
pub mod workspace;
