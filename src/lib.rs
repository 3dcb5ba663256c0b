pub mod api;
pub mod config;
pub mod error;
pub mod feed;
pub mod forms;
pub mod models;
pub mod notify;
pub mod remote;
pub mod services;
pub mod state;
