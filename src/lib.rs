pub mod app;
pub mod auth;
pub mod config;
pub mod db;
pub mod entries;
pub mod error;
pub mod http;
pub mod projects;
pub mod state;
