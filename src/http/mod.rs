//! HTTP surface: routing, controllers, extractors, and wire models.

pub mod app_server;
pub mod controllers;
pub mod error;
pub mod extract;
pub mod models;

pub use app_server::AppServer;
